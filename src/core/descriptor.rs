//! Package descriptor and archive reference
//!
//! A descriptor names an upstream library release. The archive for that
//! release lives at `{url}/archive/{version}.zip`, the convention used by
//! GitHub-style source hosts for tagged trees.

use crate::core::error::{Result, StageError};
use crate::helpers::internal::url_utils::{self, UrlScheme};
use serde::Deserialize;
use std::fmt;

/// Archive container published by the source host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ArchiveFormat {
    #[default]
    #[serde(rename = "zip")]
    Zip,
    #[serde(rename = "tar.gz")]
    TarGz,
}

impl ArchiveFormat {
    /// File extension, without leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Immutable description of the package being staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    pub license: String,
    pub description: Option<String>,
    /// Upstream base URL; archives are resolved relative to it.
    pub url: String,
    pub archive_format: ArchiveFormat,
}

impl PackageDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        license: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            license: license.into(),
            description: None,
            url: url.into(),
            archive_format: ArchiveFormat::Zip,
        }
    }

    /// Same package, different upstream release.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    /// Reject descriptors that cannot name a remote archive or a local path.
    pub fn validate(&self) -> Result<()> {
        validate_component("name", &self.name)?;
        validate_component("version", &self.version)?;

        if !url_utils::has_allowed_scheme(&self.url, &[UrlScheme::Http, UrlScheme::Https]) {
            return Err(StageError::InvalidDescriptor(format!(
                "url must start with http:// or https://, got: {}",
                self.url
            )));
        }

        Ok(())
    }

    /// Local name of the downloaded archive, e.g. `1.2.1.zip`
    pub fn archive_name(&self) -> String {
        format!("{}.{}", self.version, self.archive_format.extension())
    }

    /// Remote location of the archive: `{url}/archive/{version}.zip`
    pub fn archive_url(&self) -> String {
        url_utils::join(&self.url, &["archive", &self.archive_name()])
    }

    /// Top-level folder produced by the host's archive convention
    pub fn source_root(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

fn validate_component(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StageError::InvalidDescriptor(format!("{} must not be empty", field)));
    }
    if value == "." || value == ".." {
        return Err(StageError::InvalidDescriptor(format!(
            "{} must not be '{}'",
            field, value
        )));
    }
    if value
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(StageError::InvalidDescriptor(format!(
            "{} contains a path separator or whitespace: {:?}",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transwarp(version: &str) -> PackageDescriptor {
        PackageDescriptor::new("transwarp", version, "MIT", "https://github.com/bloomen/transwarp")
    }

    #[test]
    fn test_archive_url_is_exact() {
        for version in ["1.2.1", "2.2.2", "0.1", "v3.0.0-rc1"] {
            let desc = transwarp(version);
            assert_eq!(
                desc.archive_url(),
                format!("https://github.com/bloomen/transwarp/archive/{}.zip", version)
            );
        }
    }

    #[test]
    fn test_archive_url_trailing_slash() {
        let mut desc = transwarp("1.2.1");
        desc.url.push('/');
        assert_eq!(
            desc.archive_url(),
            "https://github.com/bloomen/transwarp/archive/1.2.1.zip"
        );
    }

    #[test]
    fn test_archive_name_follows_format() {
        let mut desc = transwarp("2.2.2");
        assert_eq!(desc.archive_name(), "2.2.2.zip");
        desc.archive_format = ArchiveFormat::TarGz;
        assert_eq!(desc.archive_name(), "2.2.2.tar.gz");
        assert!(desc.archive_url().ends_with("/archive/2.2.2.tar.gz"));
    }

    #[test]
    fn test_source_root() {
        assert_eq!(transwarp("1.2.1").source_root(), "transwarp-1.2.1");
    }

    #[test]
    fn test_validate_ok() {
        assert!(transwarp("1.2.1").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_version() {
        let err = transwarp("").validate().unwrap_err();
        assert!(matches!(err, StageError::InvalidDescriptor(_)));
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_validate_rejects_traversal() {
        assert!(transwarp("..").validate().is_err());
        assert!(transwarp("1.0/../../etc").validate().is_err());
        assert!(transwarp("1.0 beta").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let desc = PackageDescriptor::new("transwarp", "1.2.1", "MIT", "ftp://example.com/t");
        assert!(desc.validate().is_err());
    }

    #[test]
    fn test_with_version_keeps_other_fields() {
        let desc = transwarp("1.2.1").with_version("2.2.2");
        assert_eq!(desc.version, "2.2.2");
        assert_eq!(desc.name, "transwarp");
        assert_eq!(desc.license, "MIT");
    }
}
