use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cli::output::{entry_table, index_table, stats_table};
use crate::cli::progress::{IndexProgress, MaterializeProgress, bar};
use crate::indexer::{self, IndexMode};
use crate::ops::{self, SetOp};
use crate::store::Store;
use crate::utils::{STORE_ENV, store_path};

#[derive(Parser)]
#[command(name = "venndex")]
#[command(version)]
#[command(about = "Index file trees by content hash and combine the indexes", long_about = None)]
pub struct Cli {
    /// Store file [default: ./venndex.db]
    #[arg(long, global = true, env = STORE_ENV, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, empty store
    Init,
    /// Build, inspect and export indexes
    #[command(subcommand)]
    Index(IndexCommand),
    /// Combine two indexes into a new one
    #[command(subcommand)]
    Set(SetCommand),
}

#[derive(Subcommand)]
pub enum IndexCommand {
    /// Add every file under a directory to an index
    AddFiles(TreeArgs),
    /// Add a Google Photos Takeout export, attaching JSON sidecars to their photos
    AddTakeout(TreeArgs),
    /// List indexes
    Ls,
    /// Show every entry of an index
    Cat { index: String },
    /// Show aggregate figures for an index
    Stats { index: String },
    /// Split an index into <prefix>-0, <prefix>-1, ... of at most <size> entries
    Chunk { index: String, prefix: String, size: u64 },
    /// Delete an index
    Rm { index: String },
    /// Copy an index into a deduplicated, content-addressed directory tree
    Materialize { index: String, root: PathBuf },
}

#[derive(Args)]
pub struct TreeArgs {
    pub index: String,
    pub root: PathBuf,
}

#[derive(Subcommand)]
pub enum SetCommand {
    /// target = a ∪ b
    Union(SetArgs),
    /// target = a ∩ b
    Intersection(SetArgs),
    /// target = a − b
    Difference(SetArgs),
}

#[derive(Args)]
pub struct SetArgs {
    pub target: String,
    pub a: String,
    pub b: String,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let db = store_path(cli.db);
    match cli.command {
        Commands::Init => {
            Store::initialize(&db)
                .with_context(|| format!("Failed to initialize store {}", db.display()))?;
            println!("Initialized empty store at {}", db.display());
        }
        Commands::Index(command) => run_index(&open_store(&db)?, command, cli.quiet)?,
        Commands::Set(command) => run_set(&open_store(&db)?, command)?,
    }

    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` overrides the flags
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn open_store(db: &Path) -> Result<Store> {
    Store::open(db).with_context(|| {
        format!("Failed to open store {} (run `venndex init` first?)", db.display())
    })
}

fn run_index(store: &Store, command: IndexCommand, quiet: bool) -> Result<()> {
    match command {
        IndexCommand::AddFiles(args) => add_tree(store, IndexMode::Files, &args, quiet)?,
        IndexCommand::AddTakeout(args) => add_tree(store, IndexMode::Takeout, &args, quiet)?,
        IndexCommand::Ls => {
            let names = ops::list_indexes(store)?;
            if names.is_empty() {
                println!("No indexes");
                return Ok(());
            }
            let mut rows = Vec::with_capacity(names.len());
            for name in names {
                let count = ops::entry_count(store, &name)?;
                rows.push((name, count));
            }
            println!("{}", index_table(&rows));
        }
        IndexCommand::Cat { index } => {
            let entries = ops::entries(store, &index)
                .with_context(|| format!("Failed to read index {index}"))?;
            if entries.is_empty() {
                println!("Index {index} is empty");
            } else {
                println!("{}", entry_table(&entries));
            }
        }
        IndexCommand::Stats { index } => {
            let stats = ops::stats(store, &index)
                .with_context(|| format!("Failed to read index {index}"))?;
            println!("{}", stats_table(&index, &stats));
        }
        IndexCommand::Chunk { index, prefix, size } => {
            let report = ops::chunk(store, &index, &prefix, size)
                .with_context(|| format!("Failed to chunk index {index}"))?;
            println!(
                "Split {} entries of {index} into {} chunks",
                report.entries,
                report.chunks.len()
            );
            for name in &report.chunks {
                println!("  {name}");
            }
        }
        IndexCommand::Rm { index } => {
            ops::delete_index(store, &index)
                .with_context(|| format!("Failed to delete index {index}"))?;
            println!("Deleted index {index}");
        }
        IndexCommand::Materialize { index, root } => {
            let total = ops::entry_count(store, &index)
                .with_context(|| format!("Failed to read index {index}"))?;
            let mut progress = MaterializeProgress::new(bar(total, "copying", quiet));
            let result = ops::materialize(store, &index, &root, &mut progress);
            progress.finish();

            let report = result.with_context(|| {
                format!("Failed to materialize {index} into {}", root.display())
            })?;
            println!(
                "Materialized {index} into {}: {} copied, {} already present, {} attachments",
                root.display(),
                report.entries_copied,
                report.entries_skipped,
                report.attachments_copied
            );
        }
    }

    Ok(())
}

fn add_tree(store: &Store, mode: IndexMode, args: &TreeArgs, quiet: bool) -> Result<()> {
    let total = if quiet { 0 } else { indexer::count_files(&args.root).unwrap_or(0) };
    let mut progress = IndexProgress::new(bar(total, "indexing", quiet));
    let result = indexer::index_tree(store, mode, &args.index, &args.root, &mut progress);
    progress.finish();

    let report = result.with_context(|| {
        format!("Failed to index {} into {}", args.root.display(), args.index)
    })?;
    println!(
        "Indexed {} files into {} ({} new entries, {} total)",
        report.files_indexed, args.index, report.entries_created, report.entry_count
    );
    if mode == IndexMode::Takeout {
        println!("Attached {} of {} sidecars", report.sidecars_attached, report.sidecars_skipped);
    }
    Ok(())
}

fn run_set(store: &Store, command: SetCommand) -> Result<()> {
    let (op, args) = match command {
        SetCommand::Union(args) => (SetOp::Union, args),
        SetCommand::Intersection(args) => (SetOp::Intersection, args),
        SetCommand::Difference(args) => (SetOp::Difference, args),
    };

    let count = ops::apply(store, op, &args.target, &args.a, &args.b)
        .with_context(|| format!("Failed to compute {op} of {} and {}", args.a, args.b))?;
    println!("Created {} with {count} entries ({op} of {} and {})", args.target, args.a, args.b);
    Ok(())
}
