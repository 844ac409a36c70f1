//! Stage engine
//!
//! Holds the directories a run works in and the transport overrides from
//! the command line, and exposes the lifecycle steps over recipes.

mod lifecycle;

pub use lifecycle::{SourceOutcome, StagePlan, fetch_in};

use crate::core::descriptor::PackageDescriptor;
use crate::core::error::Result;
use crate::core::layout::LayoutTemplate;
use crate::core::recipe::Recipe;
use crate::helpers::acquire::TransportOptions;
use crate::helpers::stage::StagingResult;
use std::path::{Path, PathBuf};

/// Fetch-stage engine
pub struct StageEngine {
    work_dir: PathBuf,
    package_dir: PathBuf,
    transport: TransportOptions,
}

impl StageEngine {
    /// Create an engine extracting into `work_dir` and staging under `package_dir`
    pub fn new(work_dir: PathBuf, package_dir: PathBuf) -> Self {
        Self {
            work_dir,
            package_dir,
            transport: TransportOptions::default(),
        }
    }

    /// Transport settings that take precedence over each recipe's own
    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    fn transport_for(&self, recipe: &Recipe) -> TransportOptions {
        self.transport.clone().or(&recipe.transport)
    }

    /// Source step: download, extract, remove archive
    pub fn source(&self, recipe: &Recipe) -> Result<SourceOutcome> {
        lifecycle::source(&recipe.descriptor, &self.work_dir, &self.transport_for(recipe))
    }

    /// Package step: copy matching files out of the extracted tree
    pub fn package(&self, recipe: &Recipe) -> Result<StagingResult> {
        lifecycle::package_recipe(recipe, &self.work_dir, &self.package_dir)
    }

    /// Both steps in order
    pub fn fetch(&self, recipe: &Recipe) -> Result<StagingResult> {
        lifecycle::run(recipe, &self.work_dir, &self.package_dir, &self.transport_for(recipe))
    }

    /// Remove the extracted tree and leftover archive
    pub fn clean(&self, recipe: &Recipe) -> Result<bool> {
        lifecycle::clean(&recipe.descriptor, &self.work_dir)
    }

    /// Describe what a fetch would do
    pub fn plan(&self, recipe: &Recipe) -> Result<StagePlan> {
        lifecycle::plan(recipe, &self.work_dir, &self.package_dir, &self.transport_for(recipe))
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }
}

/// Fetch `descriptor`'s archive into the current directory and stage the
/// files matching `file_pattern` from the `layout` directory into `dest_dir`.
pub fn fetch(
    descriptor: &PackageDescriptor,
    layout: &LayoutTemplate,
    file_pattern: &str,
    dest_dir: &Path,
) -> Result<StagingResult> {
    let work_dir = std::env::current_dir()
        .map_err(|e| crate::core::error::StageError::io("cannot read current directory", e))?;
    fetch_in(
        &work_dir,
        descriptor,
        layout,
        file_pattern,
        dest_dir,
        &TransportOptions::default(),
    )
}
