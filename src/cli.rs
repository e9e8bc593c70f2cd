//! Command-line interface for declscan.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::lang::Language;
use crate::orchestrator::Orchestrator;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules", "vendor"];

/// Grammar-free declaration scanner.
///
/// Extracts functions, types, constants and imports with line ranges from
/// source files in many languages.
#[derive(Parser)]
#[command(name = "declscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan files or directories and print their declarations
    Scan(ScanArgs),
    /// List supported languages and their extensions
    Languages,
}

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Worker threads (overrides the configuration file)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Skip import extraction
    #[arg(long)]
    pub no_imports: bool,

    /// Draw a progress bar on stderr
    #[arg(long)]
    pub progress: bool,
}

/// Load the configuration named on the command line, or the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ScanConfig> {
    match path {
        Some(p) => ScanConfig::from_file(p)
            .map_err(|e| anyhow::anyhow!("cannot load config {}: {}", p.display(), e)),
        None => Ok(ScanConfig::default()),
    }
}

/// Collect scannable files under `root`.
///
/// Hidden directories and the usual build and dependency directories are
/// skipped. Files whose extension has no language are left out.
pub fn collect_files(root: &Path, config: &ScanConfig) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if config.language_for_extension(ext).is_some() {
                files.push(path.to_path_buf());
            }
        }
    }

    Ok(files)
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs, config_path: Option<&Path>) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", args.format);
        return Ok(EXIT_ERROR);
    }

    let mut config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.no_imports {
        config.extract_imports = false;
    }
    if args.progress {
        config.show_progress = true;
    }

    let mut files = Vec::new();
    for path in &args.paths {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: cannot access path {:?}: {}", path, e);
                return Ok(EXIT_ERROR);
            }
        };
        if metadata.is_dir() {
            files.extend(collect_files(path, &config)?);
        } else {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let orchestrator = match Orchestrator::new(config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let mut batch = orchestrator.scan_paths(&files);
    batch.sort_by_path();

    // Paths in the report are shown relative to a single directory argument
    let base = match args.paths.as_slice() {
        [only] if only.is_dir() => only.to_string_lossy().to_string(),
        _ => String::new(),
    };

    match args.format.as_str() {
        "json" => report::write_json(&base, &batch)?,
        _ => report::write_pretty(&base, &batch),
    }

    if batch.errors.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the languages command.
pub fn run_languages() -> anyhow::Result<i32> {
    println!("Supported languages:");
    println!();
    for lang in Language::ALL {
        println!("  {:<12} {}", lang.name(), lang.extensions().join(", "));
    }
    Ok(EXIT_SUCCESS)
}
