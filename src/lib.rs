//! Trailmark: a bounding-box labeling toolkit for trail-camera photos.
//!
//! The heart of the crate is the [`session::LabelSession`] engine, which
//! a frontend drives to draw boxes, assign classes from keystrokes, and
//! commit files — with bounded undo covering both box edits and file
//! operations (saves, skips, and two-phase deletes). Around it sit the
//! supporting passes a photo set needs: duplicate cleanup and
//! EXIF-timestamp renaming.
//!
//! # Modules
//!
//! - [`annot`]: Box geometry and the JSON/YOLO sidecar formats
//! - [`session`]: The labeling session engine and its undo system
//! - [`view`]: Zoom/pan viewport math for frontends
//! - [`cleanup`]: Duplicate-image detection and removal
//! - [`rename`]: EXIF-driven batch renaming
//! - [`config`]: Keystroke bindings and the class registry
//! - [`error`]: Error types for trailmark operations

pub mod annot;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod rename;
pub mod session;
pub mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use error::TrailmarkError;

use config::{ClassRegistry, KeyMap};
use rename::{EmptyPolicy, RenameOptions};
use session::ScanMode;

/// The trailmark CLI application.
#[derive(Parser)]
#[command(name = "trailmark")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the images a labeling session would queue up.
    Scan(ScanArgs),
    /// Remove byte-identical duplicate images.
    Cleanup(CleanupArgs),
    /// Rename labeled images by EXIF capture time and class counts.
    Rename(RenameArgs),
}

/// Arguments for the scan subcommand.
#[derive(clap::Args)]
struct ScanArgs {
    /// Directories to search for images.
    #[arg(default_value = ".")]
    roots: Vec<PathBuf>,

    /// Select images that already have label sidecars.
    #[arg(long, conflicts_with = "all")]
    labeled: bool,

    /// Select every image regardless of label state.
    #[arg(long)]
    all: bool,
}

/// Arguments for the cleanup subcommand.
#[derive(clap::Args)]
struct CleanupArgs {
    /// Directories to deduplicate.
    #[arg(default_value = ".")]
    roots: Vec<PathBuf>,

    /// Report duplicates without deleting anything.
    #[arg(long)]
    dry_run: bool,
}

/// What the rename pass does with images that carry no labels.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum EmptyArg {
    #[default]
    Keep,
    Remove,
    Move,
}

impl From<EmptyArg> for EmptyPolicy {
    fn from(arg: EmptyArg) -> Self {
        match arg {
            EmptyArg::Keep => EmptyPolicy::Keep,
            EmptyArg::Remove => EmptyPolicy::Remove,
            EmptyArg::Move => EmptyPolicy::Move,
        }
    }
}

/// Arguments for the rename subcommand.
#[derive(clap::Args)]
struct RenameArgs {
    /// Directory whose images are renamed (non-recursive).
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Key map config file; class ids are derived from its class names.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report what would happen without renaming anything.
    #[arg(long)]
    dry_run: bool,

    /// What to do with images that have no labels.
    #[arg(long, value_enum, default_value = "keep")]
    empty: EmptyArg,

    /// Restore original names from a previous rename pass.
    #[arg(long, conflicts_with_all = ["empty", "config"])]
    undo: bool,
}

/// Run the trailmark CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), TrailmarkError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Scan(args)) => run_scan(args),
        Some(Commands::Cleanup(args)) => run_cleanup(args),
        Some(Commands::Rename(args)) => run_rename(args),
        None => {
            // No subcommand: print a banner and exit successfully.
            println!("trailmark {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("A bounding-box labeling toolkit for trail-camera photos.");
            println!();
            println!("Run 'trailmark --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the scan subcommand.
fn run_scan(args: ScanArgs) -> Result<(), TrailmarkError> {
    let mode = if args.all {
        ScanMode::All
    } else if args.labeled {
        ScanMode::Labeled
    } else {
        ScanMode::Unlabeled
    };

    let images = session::find_images(&args.roots, mode)?;
    for image in &images {
        println!("{}", image.display());
    }
    println!("{} image(s)", images.len());
    Ok(())
}

/// Execute the cleanup subcommand.
fn run_cleanup(args: CleanupArgs) -> Result<(), TrailmarkError> {
    let hits = cleanup::cleanup_images(&args.roots, args.dry_run)?;

    for hit in &hits {
        if args.dry_run {
            println!(
                "would remove {} (duplicate of {})",
                hit.path.display(),
                hit.kept.display()
            );
        } else {
            println!(
                "removed {} (duplicate of {})",
                hit.path.display(),
                hit.kept.display()
            );
        }
    }
    println!("{} duplicate(s) found", hits.len());
    Ok(())
}

/// Execute the rename subcommand.
fn run_rename(args: RenameArgs) -> Result<(), TrailmarkError> {
    if args.undo {
        let restored = rename::undo_rename(&args.dir, args.dry_run)?;
        for (from, to) in &restored {
            let verb = if args.dry_run { "would restore" } else { "restored" };
            println!("{verb} {} -> {}", from.display(), to.display());
        }
        println!("{} file(s) restored", restored.len());
        return Ok(());
    }

    let key_map = KeyMap::load(args.config.as_deref())?;
    let registry = ClassRegistry::from_key_map(&key_map);
    let options = RenameOptions {
        dry_run: args.dry_run,
        empty: args.empty.into(),
    };

    let report = rename::rename_files(&args.dir, &registry, options)?;
    let verb = if args.dry_run { "would rename" } else { "renamed" };
    for (from, to) in &report.renamed {
        println!("{verb} {} -> {}", from.display(), to.display());
    }
    for path in &report.removed {
        println!("removed empty {}", path.display());
    }
    for path in &report.moved_empty {
        println!("moved empty {}", path.display());
    }
    for (path, reason) in &report.skipped {
        println!("skipped {} ({reason})", path.display());
    }
    println!(
        "{} renamed, {} removed, {} moved, {} skipped",
        report.renamed.len(),
        report.removed.len(),
        report.moved_empty.len(),
        report.skipped.len()
    );
    Ok(())
}
