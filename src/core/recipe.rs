//! Recipe files
//!
//! A recipe is a TOML document describing one upstream package and how to
//! stage it:
//!
//! ```toml
//! name = "transwarp"
//! version = "2.2.2"
//! license = "MIT"
//! url = "https://github.com/bloomen/transwarp"
//!
//! [stage]
//! pattern = "*.h"
//! dest = "include"
//!
//! [[layout]]
//! versions = "<2.0.0"
//! path = "{name}-{version}/src"
//!
//! [[layout]]
//! versions = ">=2.0.0"
//! path = "{name}-{version}/include"
//!
//! [transport]
//! insecure = false
//! timeout_secs = 30
//! ```

use crate::core::descriptor::{ArchiveFormat, PackageDescriptor};
use crate::core::error::{Result, StageError};
use crate::core::layout::{LayoutRule, LayoutTable, LayoutTemplate};
use crate::helpers::acquire::TransportOptions;
use crate::helpers::stage;
use semver::VersionReq;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Layout used when a recipe declares none: the archive's top-level folder
pub const DEFAULT_LAYOUT: &str = "{name}-{version}";
pub const DEFAULT_PATTERN: &str = "*.h";
pub const DEFAULT_DEST: &str = "include";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeToml {
    name: String,
    version: String,
    #[serde(default)]
    license: String,
    description: Option<String>,
    url: String,
    #[serde(default)]
    archive_format: ArchiveFormat,
    #[serde(default)]
    stage: StageToml,
    #[serde(default)]
    layout: Vec<LayoutToml>,
    #[serde(default)]
    transport: TransportToml,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct StageToml {
    pattern: Option<String>,
    dest: Option<PathBuf>,
    recursive: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutToml {
    versions: Option<String>,
    path: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TransportToml {
    insecure: Option<bool>,
    timeout_secs: Option<u64>,
}

/// Which files to copy and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    /// Glob matched against file names in the layout directory
    pub pattern: String,
    /// Destination, relative to the package directory unless absolute
    pub dest: PathBuf,
    /// Descend into subdirectories, keeping relative paths
    pub recursive: bool,
}

impl Default for StageSpec {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            dest: PathBuf::from(DEFAULT_DEST),
            recursive: false,
        }
    }
}

/// A loaded and validated recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub descriptor: PackageDescriptor,
    pub layouts: LayoutTable,
    pub stage: StageSpec,
    pub transport: TransportOptions,
}

impl Recipe {
    /// Build a recipe from parts, e.g. for programmatic use.
    pub fn new(descriptor: PackageDescriptor, layouts: LayoutTable, stage: StageSpec) -> Self {
        Self {
            descriptor,
            layouts,
            stage,
            transport: TransportOptions::default(),
        }
    }

    /// Load a recipe file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StageError::io(format!("cannot read recipe {}", path.display()), e))?;
        Self::parse(&contents, path)
    }

    /// Parse recipe text; `origin` is only used in error messages.
    pub fn parse(contents: &str, origin: &Path) -> Result<Self> {
        let recipe_err = |reason: String| StageError::Recipe {
            path: origin.to_path_buf(),
            reason,
        };

        let raw: RecipeToml = toml::from_str(contents).map_err(|e| recipe_err(e.to_string()))?;

        let descriptor = PackageDescriptor {
            name: raw.name,
            version: raw.version,
            license: raw.license,
            description: raw.description,
            url: raw.url,
            archive_format: raw.archive_format,
        };
        descriptor.validate().map_err(|e| recipe_err(e.to_string()))?;

        let mut rules = Vec::with_capacity(raw.layout.len());
        for entry in raw.layout {
            let versions = entry
                .versions
                .map(|v| {
                    VersionReq::parse(&v)
                        .map_err(|e| recipe_err(format!("invalid version range '{}': {}", v, e)))
                })
                .transpose()?;
            let template =
                LayoutTemplate::parse(&entry.path).map_err(|e| recipe_err(e.to_string()))?;
            rules.push(LayoutRule { versions, template });
        }
        let layouts = if rules.is_empty() {
            LayoutTable::single(
                LayoutTemplate::parse(DEFAULT_LAYOUT).map_err(|e| recipe_err(e.to_string()))?,
            )
        } else {
            LayoutTable::new(rules)
        };

        let defaults = StageSpec::default();
        let stage = StageSpec {
            pattern: raw.stage.pattern.unwrap_or(defaults.pattern),
            dest: raw.stage.dest.unwrap_or(defaults.dest),
            recursive: raw.stage.recursive.unwrap_or(defaults.recursive),
        };
        stage::validate_pattern(&stage.pattern).map_err(|e| recipe_err(e.to_string()))?;

        let transport = TransportOptions {
            insecure: raw.transport.insecure,
            timeout_secs: raw.transport.timeout_secs,
        };

        Ok(Self {
            descriptor,
            layouts,
            stage,
            transport,
        })
    }

    /// Same recipe pointed at a different upstream release.
    pub fn with_version(mut self, version: &str) -> Result<Self> {
        self.descriptor = self.descriptor.with_version(version);
        self.descriptor.validate()?;
        Ok(self)
    }

    /// Source subdirectory for the current version, relative to the work dir.
    pub fn source_dir(&self) -> Result<PathBuf> {
        self.layouts.resolve(&self.descriptor)
    }

    /// Destination directory for staged files.
    pub fn dest_dir(&self, package_dir: &Path) -> PathBuf {
        package_dir.join(&self.stage.dest)
    }
}
