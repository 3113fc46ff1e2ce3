//! Command-line interface for classloc.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, Config, DEFAULT_CONFIG_NAMES};
use crate::locator::{ClassFile, ClassFileLocator, IoErrorPolicy, SourceRoot};
use crate::report::{self, Format};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_NOT_FOUND: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default config written by `classloc init`.
const DEFAULT_CONFIG: &str = include_str!("templates/default.yaml");

/// Locate PHP files that declare classes, interfaces, traits and enums.
///
/// Source files are scanned statically; nothing is executed. Each file that
/// declares at least one type is reported with its namespaces and the
/// fully-qualified names of its types.
#[derive(Parser)]
#[command(name = "classloc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan directories or files for type declarations
    #[command(visible_alias = "locate")]
    Scan(ScanArgs),
    /// Write a default config file
    Init(InitArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Directories or files to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path to config YAML file (default: auto-discover in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or list
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_links: bool,

    /// Continue past unreadable files instead of stopping
    #[arg(long)]
    pub skip_io_errors: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "classloc.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Load the explicit config, a discovered one, or defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Config::discover(Path::new(".")),
    };

    let Some(path) = path else {
        tracing::debug!(
            "no config file found (looked for {}), using defaults",
            DEFAULT_CONFIG_NAMES.join(", ")
        );
        return Ok(Config::default());
    };

    tracing::debug!("using config {}", path.display());
    let config = Config::parse_file(&path)?;
    config::validate(&config).context("invalid config")?;
    Ok(config)
}

/// Run the locator over `root` and collect every yielded file.
fn locate(root: SourceRoot, config: &Config, args: &ScanArgs) -> anyhow::Result<Vec<ClassFile>> {
    let mut options = config.locator_options()?;
    if args.follow_links {
        options = options.follow_links(true);
    }
    if args.skip_io_errors {
        options = options.on_io_error(IoErrorPolicy::Skip);
    }

    let locator = ClassFileLocator::new(root)?.with_options(options);
    let files = locator.iter().collect::<Result<Vec<_>, _>>()?;
    Ok(files)
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    let format: Format = match args.format.parse() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let root = match args.paths.as_slice() {
        [single] if single.is_dir() => SourceRoot::from(single.clone()),
        paths => SourceRoot::from(paths.to_vec()),
    };

    let files = match locate(root, &config, args) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    tracing::info!("located {} file(s) declaring types", files.len());

    match format {
        Format::Json => report::write_json(&args.paths, &files)?,
        Format::List => report::write_list(&files),
        Format::Pretty => report::write_pretty(&args.paths, &files),
    }

    if files.is_empty() {
        Ok(EXIT_NOT_FOUND)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or pass --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CONFIG) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to exclude vendor or cache directories", args.output.display());
    println!("  2. Run: classloc scan . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
