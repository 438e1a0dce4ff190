//! API utilities for editor-backend communication

/// Build a full API URL from the configured base and a path
///
/// # Example
/// ```rust
/// use editor::shared::api_utils::api_url;
/// assert_eq!(api_url("http://localhost:3000/", "/api/category"), "http://localhost:3000/api/category");
/// ```
pub fn api_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Path of a single category resource, id percent-encoded
pub fn category_path(id: &str) -> String {
    format!("/api/category/{}", urlencoding::encode(id))
}
