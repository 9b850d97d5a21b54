//! The fixed list of assets pre-cached at install time.

use pwa_cache_client::resolve;
use pwa_cache_core::{AssetRequest, Error};
use std::collections::HashSet;
use url::Url;

/// Ordered manifest paths resolved to the requests that install fetches.
#[derive(Debug, Clone)]
pub struct AssetManifest {
    paths: Vec<String>,
    requests: Vec<AssetRequest>,
}

impl AssetManifest {
    /// Resolve `paths` against `origin`.
    ///
    /// Fails if a path does not resolve or two paths name the same URL.
    pub fn resolve(origin: &Url, paths: &[String]) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        let mut requests = Vec::with_capacity(paths.len());

        for path in paths {
            let url = resolve(origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;
            if !seen.insert(url.clone()) {
                return Err(Error::InvalidInput(format!("manifest lists {url} more than once")));
            }
            requests.push(AssetRequest::get(url));
        }

        Ok(Self { paths: paths.to_vec(), requests })
    }

    /// Paths as configured.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn requests(&self) -> &[AssetRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:8000").unwrap()
    }

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_in_order() {
        let manifest =
            AssetManifest::resolve(&origin(), &paths(&["/", "/static/app.js", "/static/manifest.json"])).unwrap();
        let urls: Vec<&str> = manifest.requests().iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:8000/",
                "http://localhost:8000/static/app.js",
                "http://localhost:8000/static/manifest.json"
            ]
        );
        assert!(manifest.requests().iter().all(|r| r.method == "GET"));
        assert_eq!(manifest.len(), 3);
    }

    #[test]
    fn test_duplicate_after_resolution() {
        let result = AssetManifest::resolve(&origin(), &paths(&["/static/app.js", "static/app.js"]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_unsupported_scheme() {
        let result = AssetManifest::resolve(&origin(), &paths(&["file:///etc/passwd"]));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
