//! Stage CLI - fetch upstream archives and stage their headers
//!
//! Usage:
//!   stage source <recipe>          Download and extract into the work dir
//!   stage package <recipe>         Copy matching files into the package dir
//!   stage fetch <recipe>           source + package
//!   stage info <recipe>            Show what fetch would do
//!   stage clean <recipe>           Remove the extracted tree

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use stage_recipe::{Recipe, StageEngine, StagingResult, TransportOptions, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Default recipes directory (XDG compliant)
fn default_recipes_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stage/recipes")
}

#[derive(Parser)]
#[command(name = "stage")]
#[command(about = "Fetch upstream source archives and stage selected files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to recipes directory
    #[arg(short = 'r', long, global = true, env = "STAGE_RECIPES_PATH")]
    recipes_path: Option<PathBuf>,

    /// Working directory for the archive and the extracted tree
    #[arg(short, long, global = true)]
    work_dir: Option<PathBuf>,

    /// Stage a different upstream version than the recipe declares
    #[arg(long, global = true, value_name = "VERSION")]
    version_override: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true, conflicts_with = "verify_tls")]
    insecure: bool,

    /// Verify TLS certificates even if the recipe disables verification
    #[arg(long, global = true)]
    verify_tls: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and extract the source archive
    Source {
        /// Recipe name or path to a .toml recipe
        recipe: String,
    },

    /// Copy matching files from the extracted tree into the package
    Package {
        /// Recipe name or path to a .toml recipe
        recipe: String,

        #[command(flatten)]
        target: PackageTarget,
    },

    /// Run source then package
    Fetch {
        /// Recipe name or path to a .toml recipe
        recipe: String,

        #[command(flatten)]
        target: PackageTarget,
    },

    /// Show the archive URL, layout and destination for a recipe
    Info {
        /// Recipe name or path to a .toml recipe
        recipe: String,

        /// Package directory the include dir is placed under
        #[arg(short, long, default_value = ".")]
        package_dir: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the extracted tree and any leftover archive
    Clean {
        /// Recipe name or path to a .toml recipe
        recipe: String,
    },
}

#[derive(clap::Args)]
struct PackageTarget {
    /// Package directory the include dir is placed under
    #[arg(short, long, default_value = ".")]
    package_dir: PathBuf,

    /// Print the staged files as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let recipes_path = cli.recipes_path.clone().unwrap_or_else(default_recipes_path);
    let work_dir = match &cli.work_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let insecure = match (cli.insecure, cli.verify_tls) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let transport = TransportOptions {
        insecure,
        timeout_secs: cli.timeout,
    };
    let load = |name: &str| load_recipe(name, &recipes_path, cli.version_override.as_deref());
    let engine = |package_dir: &Path| {
        StageEngine::new(work_dir.clone(), package_dir.to_path_buf()).with_transport(transport.clone())
    };

    match &cli.command {
        Commands::Source { recipe } => {
            let recipe = load(recipe)?;
            output::action(&format!("Source {}", recipe.descriptor));
            let outcome = engine(&work_dir).source(&recipe)?;
            output::success(&format!(
                "extracted {} files into {}",
                outcome.files_extracted,
                work_dir.display()
            ));
        }

        Commands::Package { recipe, target } => {
            let recipe = load(recipe)?;
            output::action(&format!("Package {}", recipe.descriptor));
            let staged = engine(&target.package_dir).package(&recipe)?;
            report(&staged, target.json)?;
        }

        Commands::Fetch { recipe, target } => {
            let recipe = load(recipe)?;
            let staged = engine(&target.package_dir).fetch(&recipe)?;
            report(&staged, target.json)?;
        }

        Commands::Info {
            recipe,
            package_dir,
            json,
        } => {
            let recipe = load(recipe)?;
            let plan = engine(package_dir).plan(&recipe)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::action(&format!("{} {}", plan.name, plan.version));
                if let Some(desc) = &recipe.descriptor.description {
                    output::field("description", desc);
                }
                output::field("license", &plan.license);
                output::field("archive", &plan.archive_url);
                output::field("layout", &plan.layout);
                output::field("source", &plan.source_dir.display().to_string());
                output::field("pattern", &plan.pattern);
                output::field("dest", &plan.dest_dir.display().to_string());
                output::field("timeout", &format!("{}s", plan.timeout_secs));
                if plan.insecure {
                    output::field("tls", "verification disabled");
                }
            }
        }

        Commands::Clean { recipe } => {
            let recipe = load(recipe)?;
            if engine(&work_dir).clean(&recipe)? {
                output::success(&format!("cleaned {}", recipe.descriptor));
            } else {
                output::detail("nothing to clean");
            }
        }
    }

    Ok(())
}

/// Resolve a recipe argument to a file: an existing path, or a name in the
/// recipes directory.
fn resolve_recipe(name: &str, recipes_path: &Path) -> Result<PathBuf> {
    let direct = PathBuf::from(name);
    if direct.is_file() {
        return Ok(direct);
    }

    let candidate = recipes_path.join(format!("{}.toml", name));
    if candidate.is_file() {
        return Ok(candidate);
    }

    bail!(
        "Recipe '{}' not found (looked for {} and {})",
        name,
        direct.display(),
        candidate.display()
    )
}

fn load_recipe(name: &str, recipes_path: &Path, version: Option<&str>) -> Result<Recipe> {
    let path = resolve_recipe(name, recipes_path)?;
    let recipe =
        Recipe::load(&path).with_context(|| format!("Failed to load recipe {}", path.display()))?;
    match version {
        Some(v) => Ok(recipe.with_version(v)?),
        None => Ok(recipe),
    }
}

fn report(staged: &StagingResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(staged)?);
    } else {
        output::success(&format!(
            "{} files staged into {}",
            staged.len(),
            staged.dest_dir.display()
        ));
    }
    Ok(())
}
