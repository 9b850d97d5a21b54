//! Request identities and stored responses.

use bytes::Bytes;
use url::Url;

use super::hash::compute_request_key;

/// Identity of an intercepted or pre-cached request.
///
/// Two requests are the same cache entry when their upper-cased method and
/// canonical URL match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub method: String,
    pub url: Url,
}

impl AssetRequest {
    /// Build a request with an explicit method.
    pub fn new(method: &str, url: Url) -> Self {
        Self { method: method.trim().to_ascii_uppercase(), url }
    }

    /// Build a GET request, the only method used for pre-caching.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// Store key for this request.
    pub fn cache_key(&self) -> String {
        compute_request_key(&self.method, self.url.as_str())
    }
}

impl std::fmt::Display for AssetRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response as fetched from the network or read back from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    /// Header name/value pairs in the order they were received.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl AssetResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_method_normalized() {
        let req = AssetRequest::new(" get ", url("http://localhost:8000/"));
        assert_eq!(req.method, "GET");
        assert_eq!(req, AssetRequest::get(url("http://localhost:8000/")));
    }

    #[test]
    fn test_cache_key_depends_on_method() {
        let get = AssetRequest::get(url("http://localhost:8000/static/app.js"));
        let head = AssetRequest::new("HEAD", url("http://localhost:8000/static/app.js"));
        assert_ne!(get.cache_key(), head.cache_key());
    }

    #[test]
    fn test_display() {
        let req = AssetRequest::get(url("http://localhost:8000/static/app.js"));
        assert_eq!(req.to_string(), "GET http://localhost:8000/static/app.js");
    }

    #[test]
    fn test_response_header_lookup() {
        let response = AssetResponse {
            url: "http://localhost:8000/".into(),
            status: 200,
            headers: vec![("Content-Type".into(), "text/html".into())],
            body: Bytes::from_static(b"<html></html>"),
        };
        assert!(response.is_ok());
        assert_eq!(response.content_type(), Some("text/html"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_response_not_ok() {
        let response = AssetResponse { url: String::new(), status: 404, headers: Vec::new(), body: Bytes::new() };
        assert!(!response.is_ok());
    }
}
