//! Version parsing for layout selection
//!
//! Upstream tags are not always strict semver (`1.2`, `v2.0.0`), so versions
//! are normalized before being matched against a range:
//!
//! ```toml
//! [[layout]]
//! versions = ">=1.0, <2.0"
//! path = "{name}-{version}/src"
//! ```

use semver::{Version, VersionReq};

/// Strip common tag prefixes like `v` or `release-`
pub fn strip_tag_prefix(version_str: &str) -> &str {
    let s = version_str;
    let s = s.strip_prefix("release-").unwrap_or(s);
    let s = s.strip_prefix("version-").unwrap_or(s);
    s.strip_prefix('v').unwrap_or(s)
}

/// Pad a version string to be semver-compatible (X.Y.Z)
fn pad_version(version: &str) -> String {
    let parts: Vec<&str> = version.split('.').collect();
    match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    }
}

/// Parse an upstream version, tolerating tag prefixes and missing components.
///
/// Returns `None` for versions that cannot be read as semver at all.
pub fn parse_lenient(version_str: &str) -> Option<Version> {
    let stripped = strip_tag_prefix(version_str.trim());
    Version::parse(stripped)
        .or_else(|_| Version::parse(&pad_version(stripped)))
        .ok()
}

/// Check whether `version` falls inside `req`.
///
/// Unparsable versions never satisfy a constraint.
pub fn satisfies(req: &VersionReq, version: &str) -> bool {
    parse_lenient(version).is_some_and(|v| req.matches(&v))
}
