//! Request-identity cache key generation.

use sha2::{Digest, Sha256};

/// Compute the store key for a request identity.
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_request_key("GET", "http://localhost:8000/");
        let hash2 = compute_request_key("GET", "http://localhost:8000/");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_request_key("GET", "http://localhost:8000/");
        let post = compute_request_key("POST", "http://localhost:8000/");
        assert_ne!(get, post);
    }

    #[test]
    fn test_hash_different_url() {
        let app = compute_request_key("GET", "http://localhost:8000/static/app.js");
        let manifest = compute_request_key("GET", "http://localhost:8000/static/manifest.json");
        assert_ne!(app, manifest);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_request_key("GET", "http://localhost:8000/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
