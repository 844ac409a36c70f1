//! URL helpers
//!
//! Joining archive URLs onto a base URL and validating URL schemes.

/// Allowed URL schemes for archive downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlScheme {
    Http,
    Https,
}

impl UrlScheme {
    /// Get the scheme prefix string
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Http => "http://",
            Self::Https => "https://",
        }
    }
}

/// Check that a URL uses one of the allowed schemes.
pub fn has_allowed_scheme(url: &str, allowed: &[UrlScheme]) -> bool {
    let url_lower = url.to_lowercase();
    allowed
        .iter()
        .any(|scheme| url_lower.starts_with(scheme.prefix()))
}

/// Join path segments onto a base URL with exactly one `/` between them.
///
/// # Example
/// ```ignore
/// assert_eq!(join("https://github.com/o/r/", &["archive", "1.0.zip"]), "https://github.com/o/r/archive/1.0.zip");
/// ```
pub fn join(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(segment.trim_matches('/'));
    }
    url
}

/// Extract filename from a URL, ignoring query string and fragment.
///
/// Returns "download" when the URL has no usable last segment.
pub fn extract_filename(url: &str) -> String {
    let clean_url = url.split('?').next().unwrap_or(url);
    let clean_url = clean_url.split('#').next().unwrap_or(clean_url);

    clean_url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .map(str::to_string)
        .unwrap_or_else(|| "download".to_string())
}
