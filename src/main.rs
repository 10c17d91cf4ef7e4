//! `inscribe` - batch compiler for view documents
//!
//! # Usage
//!
//! ```bash
//! # Compile every view under the configured source directory
//! inscribe compile
//!
//! # Compile specific files or directories into another folder
//! inscribe compile views/Hud.xml views/menus --out-dir src/ui
//!
//! # Translate without writing, machine-readable diagnostics
//! inscribe check --format json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use inscribe_compiler::cache::IncrementalCache;
use inscribe_compiler::config::ProjectConfig;
use inscribe_compiler::{
    compile_view, discovery, logging, CompileError, CompileOptions, CompiledView, Diagnostic,
};

#[derive(Parser)]
#[command(name = "inscribe")]
#[command(version)]
#[command(about = "Compiles declarative view documents into TypeScript classes", long_about = None)]
struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of searching for inscribeConfig.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile view documents and write one `.ts` file per class
    Compile {
        /// Files or directories; defaults to the configured source directory
        paths: Vec<PathBuf>,

        /// Output directory (overrides the config)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Reuse outputs of unchanged documents
        #[arg(long)]
        cache: bool,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Translate view documents without writing anything
    Check {
        paths: Vec<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

struct Outcome {
    path: PathBuf,
    result: std::result::Result<CompiledView, Diagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    checked: usize,
    written: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

fn main() {
    let cli = Cli::parse();
    logging::init_with_level(logging::level_for_verbosity(cli.verbose));

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(2);
        }
    }
}

/// `Ok(false)` when any document failed to compile.
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compile {
            paths,
            out_dir,
            cache,
            format,
        } => {
            let out_dir = out_dir.unwrap_or_else(|| config.out_dir.clone());
            let cache = cache.then(|| IncrementalCache::new(&config.cache_dir));
            let mut outcomes = compile_all(&config, &paths, cache.as_ref())?;
            claim_targets(&mut outcomes, &out_dir);

            let mut written = Vec::new();
            if outcomes.iter().any(|o| o.result.is_ok()) {
                fs::create_dir_all(&out_dir)
                    .with_context(|| format!("cannot create {}", out_dir.display()))?;
            }
            for outcome in &outcomes {
                if let Ok(view) = &outcome.result {
                    let target = out_dir.join(view.file_name());
                    fs::write(&target, &view.code)
                        .with_context(|| format!("cannot write {}", target.display()))?;
                    debug!("{} -> {}", outcome.path.display(), target.display());
                    written.push(target.display().to_string());
                }
            }
            report(&outcomes, written, format)
        }
        Commands::Check { paths, format } => {
            let mut outcomes = compile_all(&config, &paths, None)?;
            claim_targets(&mut outcomes, &config.out_dir);
            report(&outcomes, Vec::new(), format)
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<ProjectConfig> {
    match explicit {
        Some(path) => Ok(ProjectConfig::load(path)?),
        None => {
            let cwd = std::env::current_dir().context("cannot read the working directory")?;
            Ok(ProjectConfig::discover(&cwd)?)
        }
    }
}

fn compile_all(
    config: &ProjectConfig,
    paths: &[PathBuf],
    cache: Option<&IncrementalCache>,
) -> Result<Vec<Outcome>> {
    let files = discovery::collect_inputs(paths, &config.source_dir, &config.extension);
    info!("{} view documents", files.len());

    files
        .par_iter()
        .map(|path| compile_file(path, &config.compile, cache))
        .collect()
}

fn compile_file(path: &Path, options: &CompileOptions, cache: Option<&IncrementalCache>) -> Result<Outcome> {
    let source =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;

    if let Some(view) = cache.and_then(|c| c.get(path, &source, options)) {
        return Ok(Outcome {
            path: path.to_path_buf(),
            result: Ok(view),
        });
    }

    let result = compile_view(&source, options);
    if let (Some(cache), Ok(view)) = (cache, &result) {
        cache.set(path, &source, options, view);
    }
    Ok(Outcome {
        path: path.to_path_buf(),
        result: result.map_err(|e| e.to_diagnostic(&path.display().to_string())),
    })
}

/// Fails every document whose output file an earlier document already writes.
fn claim_targets(outcomes: &mut [Outcome], out_dir: &Path) {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    for outcome in outcomes.iter_mut() {
        let Ok(view) = &outcome.result else {
            continue;
        };
        let target = out_dir.join(view.file_name());
        match claimed.get(&target) {
            Some(first) => {
                let error = CompileError::conflict(format!(
                    "class '{}' is also compiled from {}; both would write {}",
                    view.class_name,
                    first.display(),
                    target.display()
                ));
                outcome.result = Err(error.to_diagnostic(&outcome.path.display().to_string()));
            }
            None => {
                claimed.insert(target, outcome.path.clone());
            }
        }
    }
}

fn report(outcomes: &[Outcome], written: Vec<String>, format: OutputFormat) -> Result<bool> {
    let diagnostics: Vec<Diagnostic> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().err().cloned())
        .collect();
    let ok = diagnostics.is_empty();

    match format {
        OutputFormat::Json => {
            let report = Report {
                checked: outcomes.len(),
                written,
                diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic);
            }
            for target in &written {
                println!("wrote {}", target);
            }
            println!(
                "{} of {} documents compiled",
                outcomes.len() - diagnostics.len(),
                outcomes.len()
            );
        }
    }
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(path: &str, class_name: &str) -> Outcome {
        Outcome {
            path: PathBuf::from(path),
            result: Ok(CompiledView {
                class_name: class_name.to_string(),
                code: String::new(),
            }),
        }
    }

    #[test]
    fn test_second_document_for_same_class_is_rejected() {
        let mut outcomes = vec![
            outcome("views/a/Hud.xml", "Hud"),
            outcome("views/Menu.xml", "Menu"),
            outcome("views/b/Hud.xml", "Hud"),
        ];
        claim_targets(&mut outcomes, Path::new("out"));

        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_ok());
        let diagnostic = outcomes[2].result.as_ref().unwrap_err();
        assert_eq!(diagnostic.code, "INS-ERR-CONFLICT-001");
        assert_eq!(diagnostic.file, "views/b/Hud.xml");
        assert!(diagnostic.message.contains("views/a/Hud.xml"));
    }
}
