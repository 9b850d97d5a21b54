//! URL canonicalization for consistent cache keys.

use url::Url;

/// Why a URL could not be turned into a request identity.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize an absolute URL string so equal resources produce equal
/// cache keys.
///
/// Surrounding whitespace is trimmed and a missing scheme defaults to
/// `https://`. The host is lowercased and any fragment dropped; the query
/// string is kept in its original order.
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let parsed = Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    normalize(parsed)
}

/// Resolve a manifest path or intercepted request target against `origin`.
///
/// Absolute URLs are canonicalized as-is; anything else (`/`, `/static/app.js`,
/// `static/app.js`) is joined onto the origin first.
pub fn resolve(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    if trimmed.contains("://") {
        return canonicalize(trimmed);
    }

    let joined = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    normalize(joined)
}

fn normalize(mut parsed: Url) -> Result<Url, UrlError> {
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
