//! Fetch-extract-stage recipes for header-only libraries
//!
//! A recipe names an upstream release and says which files to take from its
//! source archive. Running it downloads `{url}/archive/{version}.zip`,
//! unpacks it into the working directory, copies the matching files into the
//! package's include directory and deletes the archive.
//!
//! # Example Recipe
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
//! ```
//!
//! # Steps
//!
//! - `source` - download, extract, delete the archive
//! - `package` - resolve the layout for the version, copy matching files
//! - `fetch` - both, in order
//!
//! # Library use
//!
//! ```no_run
//! use stage_recipe::{Recipe, StageEngine};
//! use std::path::{Path, PathBuf};
//!
//! let recipe = Recipe::load(Path::new("recipes/transwarp.toml"))?;
//! let engine = StageEngine::new(PathBuf::from("work"), PathBuf::from("pkg"));
//! let staged = engine.fetch(&recipe)?;
//! println!("{} headers staged", staged.len());
//! # Ok::<(), stage_recipe::StageError>(())
//! ```

pub mod core;
mod engine;
pub mod helpers;

pub use crate::core::descriptor::{ArchiveFormat, PackageDescriptor};
pub use crate::core::error::{Result, StageError};
pub use crate::core::layout::{LayoutRule, LayoutTable, LayoutTemplate};
pub use crate::core::output;
pub use crate::core::recipe::{Recipe, StageSpec};
pub use engine::{SourceOutcome, StageEngine, StagePlan, fetch, fetch_in};
pub use helpers::acquire::TransportOptions;
pub use helpers::stage::StagingResult;
