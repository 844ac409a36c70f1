//! Source layout templates
//!
//! A layout template names the directory inside an extracted archive that
//! holds the files to stage, e.g. `{name}-{version}/include`. Upstream
//! projects move their headers around between releases, so a recipe carries
//! a table of templates keyed by version range instead of one recipe per
//! release.

use crate::core::descriptor::PackageDescriptor;
use crate::core::error::{Result, StageError};
use crate::core::version;
use semver::VersionReq;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A path template with `{name}` and `{version}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutTemplate {
    raw: String,
}

impl LayoutTemplate {
    /// Parse a template, rejecting unknown placeholders up front.
    pub fn parse(raw: &str) -> Result<Self> {
        let template = Self {
            raw: raw.to_string(),
        };
        // Render with dummy values so syntax errors surface at load time.
        template.render("name", "0")?;
        Ok(template)
    }

    /// Substitute placeholders and return a relative path.
    pub fn render(&self, name: &str, version: &str) -> Result<PathBuf> {
        let mut out = String::with_capacity(self.raw.len() + name.len() + version.len());
        let mut rest = self.raw.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                StageError::Template(format!("unclosed '{{' in '{}'", self.raw))
            })?;
            match &after[..close] {
                "name" => out.push_str(name),
                "version" => out.push_str(version),
                other => {
                    return Err(StageError::Template(format!(
                        "unknown placeholder '{{{}}}' in '{}'",
                        other, self.raw
                    )));
                }
            }
            rest = &after[close + 1..];
        }
        if rest.contains('}') {
            return Err(StageError::Template(format!(
                "unmatched '}}' in '{}'",
                self.raw
            )));
        }
        out.push_str(rest);

        let path = PathBuf::from(out.trim_end_matches('/'));
        if path.as_os_str().is_empty() {
            return Err(StageError::Template(format!(
                "'{}' renders to an empty path",
                self.raw
            )));
        }
        if !is_contained(&path) {
            return Err(StageError::Template(format!(
                "'{}' must stay inside the extracted tree, got {}",
                self.raw,
                path.display()
            )));
        }
        Ok(path)
    }

    /// Render against a descriptor's name and version.
    pub fn resolve(&self, descriptor: &PackageDescriptor) -> Result<PathBuf> {
        self.render(&descriptor.name, &descriptor.version)
    }
}

impl fmt::Display for LayoutTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// One entry of a layout table.
#[derive(Debug, Clone)]
pub struct LayoutRule {
    /// Versions this rule applies to; `None` matches every version.
    pub versions: Option<VersionReq>,
    pub template: LayoutTemplate,
}

impl LayoutRule {
    pub fn any(template: LayoutTemplate) -> Self {
        Self {
            versions: None,
            template,
        }
    }

    pub fn matches(&self, version: &str) -> bool {
        match &self.versions {
            None => true,
            Some(req) => version::satisfies(req, version),
        }
    }
}

/// Ordered version-range lookup; the first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct LayoutTable {
    rules: Vec<LayoutRule>,
}

impl LayoutTable {
    pub fn new(rules: Vec<LayoutRule>) -> Self {
        Self { rules }
    }

    /// Table with a single unconstrained template.
    pub fn single(template: LayoutTemplate) -> Self {
        Self::new(vec![LayoutRule::any(template)])
    }

    pub fn rules(&self) -> &[LayoutRule] {
        &self.rules
    }

    /// Find the template for a version.
    pub fn template_for(&self, version: &str) -> Result<&LayoutTemplate> {
        self.rules
            .iter()
            .find(|rule| rule.matches(version))
            .map(|rule| &rule.template)
            .ok_or_else(|| StageError::NoLayout {
                version: version.to_string(),
            })
    }

    /// Resolve the source subdirectory for a descriptor.
    pub fn resolve(&self, descriptor: &PackageDescriptor) -> Result<PathBuf> {
        self.template_for(&descriptor.version)?.resolve(descriptor)
    }
}
