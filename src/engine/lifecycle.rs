//! Step orchestration
//!
//! The lifecycle flow mirrors the two hooks of a package recipe:
//! 1. source()  - download the archive, extract it, delete the archive
//! 2. package() - resolve the layout, select files, copy into dest
//!
//! The steps are independent. `package()` only needs the extracted tree
//! left behind by an earlier `source()` in the same working directory.
//! Every step that reads or writes the working directory holds its lock.

use crate::core::descriptor::PackageDescriptor;
use crate::core::error::{Result, StageError};
use crate::core::layout::LayoutTemplate;
use crate::core::lock;
use crate::core::output;
use crate::core::recipe::Recipe;
use crate::helpers::acquire::{self, TransportOptions};
use crate::helpers::extract;
use crate::helpers::internal::fs_utils::{self, ArchiveGuard};
use crate::helpers::stage::{self, StagingResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What the source step left in the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub archive_url: String,
    pub bytes: u64,
    pub files_extracted: usize,
}

/// Download, extract, and always remove the archive.
pub fn source(
    descriptor: &PackageDescriptor,
    work_dir: &Path,
    transport: &TransportOptions,
) -> Result<SourceOutcome> {
    descriptor.validate()?;
    let _lock = lock_work_dir(work_dir)?;
    source_locked(descriptor, work_dir, transport)
}

fn lock_work_dir(work_dir: &Path) -> Result<lock::WorkDirLock> {
    std::fs::create_dir_all(work_dir).map_err(|e| {
        StageError::io(
            format!("cannot create working directory {}", work_dir.display()),
            e,
        )
    })?;
    lock::acquire_work_dir_lock(work_dir)
}

/// Source step body; the caller holds the working directory lock.
fn source_locked(
    descriptor: &PackageDescriptor,
    work_dir: &Path,
    transport: &TransportOptions,
) -> Result<SourceOutcome> {
    let archive_url = descriptor.archive_url();
    output::detail(&format!("fetching {}", archive_url));

    let archive = ArchiveGuard::new(work_dir.join(descriptor.archive_name()));
    let bytes = acquire::download(&archive_url, archive.path(), transport)?;
    let files_extracted = extract::extract(archive.path(), work_dir, descriptor.archive_format)?;
    output::detail(&format!(
        "extracted {} files from {}",
        files_extracted,
        descriptor.archive_name()
    ));

    Ok(SourceOutcome {
        archive_url,
        bytes,
        files_extracted,
    })
}

/// Copy matching files from the resolved source directory into `dest_dir`.
pub fn package(source_dir: &Path, pattern: &str, recursive: bool, dest_dir: &Path) -> Result<StagingResult> {
    stage::stage(source_dir, pattern, recursive, dest_dir)
}

/// Run the full fetch-stage step for one recipe.
pub fn run(
    recipe: &Recipe,
    work_dir: &Path,
    package_dir: &Path,
    transport: &TransportOptions,
) -> Result<StagingResult> {
    output::action(&format!("Fetching {}", recipe.descriptor));

    // Layout and pattern errors surface before any download.
    let source_dir = work_dir.join(recipe.source_dir()?);
    stage::validate_pattern(&recipe.stage.pattern)?;
    recipe.descriptor.validate()?;
    let _lock = lock_work_dir(work_dir)?;

    output::sub_action("source");
    source_locked(&recipe.descriptor, work_dir, transport)?;

    output::sub_action("package");
    let staged = package(
        &source_dir,
        &recipe.stage.pattern,
        recipe.stage.recursive,
        &recipe.dest_dir(package_dir),
    )?;

    output::success(&format!(
        "{} staged ({} files in {})",
        recipe.descriptor,
        staged.len(),
        staged.dest_dir.display()
    ));
    Ok(staged)
}

/// Package step driven by a recipe's layout table and stage settings.
pub fn package_recipe(recipe: &Recipe, work_dir: &Path, package_dir: &Path) -> Result<StagingResult> {
    let source_dir = work_dir.join(recipe.source_dir()?);
    // A missing working directory has no tree to copy from; selection
    // reports that as a layout mismatch.
    let _lock = if work_dir.is_dir() {
        Some(lock::acquire_work_dir_lock(work_dir)?)
    } else {
        None
    };
    package(
        &source_dir,
        &recipe.stage.pattern,
        recipe.stage.recursive,
        &recipe.dest_dir(package_dir),
    )
}

/// Single-template fetch: download, extract, stage, clean up.
///
/// `work_dir` receives the archive and the extracted tree.
pub fn fetch_in(
    work_dir: &Path,
    descriptor: &PackageDescriptor,
    layout: &LayoutTemplate,
    file_pattern: &str,
    dest_dir: &Path,
    transport: &TransportOptions,
) -> Result<StagingResult> {
    // Resolve up front so a broken template fails before any download.
    let source_dir = work_dir.join(layout.resolve(descriptor)?);
    stage::validate_pattern(file_pattern)?;
    descriptor.validate()?;

    let _lock = lock_work_dir(work_dir)?;
    source_locked(descriptor, work_dir, transport)?;
    package(&source_dir, file_pattern, false, dest_dir)
}

/// Remove the extracted tree and any archive left from an interrupted run.
///
/// Returns true if anything was removed.
pub fn clean(descriptor: &PackageDescriptor, work_dir: &Path) -> Result<bool> {
    descriptor.validate()?;
    let _lock = lock::acquire_work_dir_lock(work_dir)?;
    let tree = fs_utils::remove_if_exists(&work_dir.join(descriptor.source_root()))?;
    let archive = fs_utils::remove_if_exists(&work_dir.join(descriptor.archive_name()))?;
    Ok(tree || archive)
}

/// Everything a run would do, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagePlan {
    pub name: String,
    pub version: String,
    pub license: String,
    pub archive_url: String,
    pub archive_name: String,
    pub layout: String,
    pub source_dir: PathBuf,
    pub pattern: String,
    pub dest_dir: PathBuf,
    pub insecure: bool,
    pub timeout_secs: u64,
}

pub fn plan(
    recipe: &Recipe,
    work_dir: &Path,
    package_dir: &Path,
    transport: &TransportOptions,
) -> Result<StagePlan> {
    let descriptor = &recipe.descriptor;
    let template = recipe.layouts.template_for(&descriptor.version)?;
    Ok(StagePlan {
        name: descriptor.name.clone(),
        version: descriptor.version.clone(),
        license: descriptor.license.clone(),
        archive_url: descriptor.archive_url(),
        archive_name: descriptor.archive_name(),
        layout: template.to_string(),
        source_dir: work_dir.join(template.resolve(descriptor)?),
        pattern: recipe.stage.pattern.clone(),
        dest_dir: recipe.dest_dir(package_dir),
        insecure: transport.is_insecure(),
        timeout_secs: transport.timeout().as_secs(),
    })
}
