//! notelinks CLI tool
//!
//! Command-line interface for preparing a SiYuan markdown export for Hugo.
//!
//! ## Commands
//!
//! - `index <notes_dir>`: move `foo.md` to `foo/_index.md` wherever a `foo/` directory exists
//! - `backlinks <notes_dir>`: rebuild the link graph and rewrite every note's backlinks section
//!
//! Run `index` before `backlinks`; directory references resolve to `_index.md` files.
//!
//! **Warning**: both commands modify files in place. Use version control or a scratch copy of
//! the export.

use clap::{Args, Parser, Subcommand};
use notelinks::{config::LinkConfig, index_files::promote_index_files, pipeline::run_blocking};
use std::{fs::File, path::PathBuf, sync::Mutex};

#[derive(Parser)]
#[command(name = "notelinks")]
#[command(author, version, about = "Link graph and backlinks for notes published with Hugo", long_about = None)]
struct Cli {
    /// Also write log output to this file (truncated on start)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LayoutArgs {
    /// The folder containing markdown notes exported from SiYuan
    notes_dir: PathBuf,

    /// TOML file with link settings. Flags override values from the file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Promote notes with same-named directories to the directory's _index.md
    Index {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Record every ref between notes and inject backlinks sections
    Backlinks {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Directory below the notes dir that is published (default: Publish)
        #[arg(long)]
        export_prefix: Option<String>,

        /// Site path that note refs start with (default: /notes/)
        #[arg(long)]
        content_prefix: Option<String>,

        /// Heading that opens the backlinks section (default: "## Backlinks")
        #[arg(long)]
        heading: Option<String>,

        /// sqlite file for the link store (default: logs/relations.db)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter()).init();
        }
    }
    Ok(())
}

fn load_config(layout: LayoutArgs) -> Result<LinkConfig, Box<dyn std::error::Error>> {
    let mut config = match layout.config {
        Some(ref path) => LinkConfig::from_toml_file(path)?,
        None => LinkConfig::default(),
    };
    config.notes_dir = layout.notes_dir;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    match cli.command {
        Commands::Index { layout } => {
            let config = load_config(layout)?.validated()?;
            let stats = promote_index_files(&config)?;

            println!("\n=== Index Files ===");
            println!("Promoted: {}", stats.promoted);
            println!("Conflicts: {}", stats.conflicts);
            println!(
                "Directories without index: {}",
                stats.directories_without_index.len()
            );
            for dir in &stats.directories_without_index {
                println!("  {}", dir.display());
            }
            Ok(())
        }

        Commands::Backlinks {
            layout,
            export_prefix,
            content_prefix,
            heading,
            db,
            verbose,
        } => {
            let mut config = load_config(layout)?;
            if let Some(export_prefix) = export_prefix {
                config.export_prefix = export_prefix;
            }
            if let Some(content_prefix) = content_prefix {
                config.content_prefix = content_prefix;
            }
            if let Some(heading) = heading {
                config.backlinks_heading = heading;
            }
            if let Some(db) = db {
                config.db_path = db;
            }
            let config = config.validated()?;

            if verbose {
                println!("Notes dir: {:?}", config.notes_dir);
                println!("Export root: {:?}", config.export_root());
                println!("Content prefix: {}", config.content_prefix);
                println!("Link store: {:?}", config.db_path);
            }

            let stats = run_blocking(&config)?;

            println!("\n=== Link Graph ===");
            println!("Notes scanned: {}", stats.extract.notes_scanned);
            println!("Notes skipped: {}", stats.extract.notes_skipped);
            println!("Edges recorded: {}", stats.extract.edges_recorded);
            println!("Broken references: {}", stats.extract.broken_references);
            println!("\n=== Backlinks ===");
            println!("Notes rewritten: {}", stats.inject.targets_rewritten);
            println!("Backlinks written: {}", stats.inject.backlinks_written);
            println!("Failures: {}", stats.inject.targets_failed);
            Ok(())
        }
    }
}
