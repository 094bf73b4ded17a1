//! treefm - a tree-oriented file manager core, driven from the command line.
//!
//! Usage:
//!   treefm tree [PATH]             Show the folder tree
//!   treefm ls [PATH]               List a directory, folders first
//!   treefm info PATH               Show what a path is
//!   treefm cp SRC DST              Copy a file or folder
//!   treefm mv SRC DST              Move or rename across folders
//!   treefm rm PATH                 Delete a file or folder
//!   treefm devices                 Watch removable devices
//!   treefm --help                  Show help

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, eyre, Context, Result};
use tracing_subscriber::EnvFilter;

use treefm_browser::{launch, open_default, DirectoryTreeCache, Expansion, KNOWN_APPLICATIONS};
use treefm_core::{list_directory, PathInfo, PathKind, Theme, UserSettings};
use treefm_devices::{DeviceWatcher, WatcherConfig, DEFAULT_MOUNT_TABLE};
use treefm_ops::{
    detect_conflict, validate_filename, OperationExecutor, OperationRequest, OperationResult,
};

#[derive(Parser)]
#[command(
    name = "treefm",
    version,
    about = "A tree-oriented file manager",
    long_about = "treefm browses folders as a lazily expanded tree and runs copy, \
                  move and delete operations in the background.\n\n\
                  Every subcommand works headlessly on the same core the \
                  interactive browser uses."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the folder tree
    Tree {
        /// Root of the tree (defaults to "/" and the home folder)
        path: Option<PathBuf>,

        /// Levels to expand below each root
        #[arg(short, long, default_value = "1")]
        depth: usize,
    },

    /// List a directory, folders first
    Ls {
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show what a path is
    Info {
        path: PathBuf,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Copy a file or folder to a full destination path
    Cp {
        source: PathBuf,
        destination: PathBuf,

        /// Replace an existing destination
        #[arg(short, long)]
        force: bool,
    },

    /// Move a file or folder to a full destination path
    Mv {
        source: PathBuf,
        destination: PathBuf,

        /// Replace an existing destination
        #[arg(short, long)]
        force: bool,
    },

    /// Delete a file or folder recursively
    Rm { path: PathBuf },

    /// Create a folder, including missing parents
    Mkdir { path: PathBuf },

    /// Rename a file or folder in place
    Rename { path: PathBuf, new_name: String },

    /// Print the removable devices seen on each poll
    Devices {
        /// Number of polls before exiting
        #[arg(short = 'n', long, default_value = "1")]
        ticks: u64,

        /// Delay between polls in milliseconds
        #[arg(short, long, default_value = "2000")]
        interval_ms: u64,

        /// Mount table to read
        #[arg(long, default_value = DEFAULT_MOUNT_TABLE)]
        mount_table: PathBuf,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Open a path with the default application or a given command
    Open {
        path: PathBuf,

        /// Command to run instead of the system default, e.g. "gedit"
        #[arg(short, long)]
        with: Option<String>,

        /// List the suggested applications and exit
        #[arg(long)]
        list_apps: bool,
    },

    /// Show or change persisted settings
    Settings {
        /// Switch to the given theme
        #[arg(long)]
        theme: Option<Theme>,

        /// Increase the font size by one point
        #[arg(long, conflicts_with = "zoom_out")]
        zoom_in: bool,

        /// Decrease the font size by one point
        #[arg(long)]
        zoom_out: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Tree { path, depth } => run_tree(path, depth)?,
        Command::Ls { path, format } => run_ls(&path, format)?,
        Command::Info { path, format } => run_info(&path, format)?,
        Command::Cp {
            source,
            destination,
            force,
        } => {
            let request = OperationRequest::copy(source, destination);
            run_operation(request, force).await?;
        }
        Command::Mv {
            source,
            destination,
            force,
        } => {
            let request = OperationRequest::move_to(source, destination);
            run_operation(request, force).await?;
        }
        Command::Rm { path } => run_operation(OperationRequest::delete(path), false).await?,
        Command::Mkdir { path } => {
            run_operation(OperationRequest::create_directory(path), false).await?;
        }
        Command::Rename { path, new_name } => run_rename(&path, &new_name).await?,
        Command::Devices {
            ticks,
            interval_ms,
            mount_table,
            format,
        } => run_devices(ticks, interval_ms, mount_table, format).await?,
        Command::Open {
            path,
            with,
            list_apps,
        } => run_open(&path, with.as_deref(), list_apps)?,
        Command::Settings {
            theme,
            zoom_in,
            zoom_out,
        } => run_settings(theme, zoom_in, zoom_out)?,
    }

    Ok(())
}

/// Log to stderr, `warn` by default.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print the folder tree, expanding `depth` levels below each root.
fn run_tree(path: Option<PathBuf>, depth: usize) -> Result<()> {
    let mut tree = match path {
        Some(path) => {
            let path = path.canonicalize().context("Invalid path")?;
            let label = path.display().to_string();
            DirectoryTreeCache::with_roots([(path, label)])
        }
        None => DirectoryTreeCache::new(),
    };

    if tree.is_empty() {
        bail!("No folder to show");
    }

    // Roots are expanded already; each pass expands one more level
    for _ in 1..depth {
        let frontier: Vec<PathBuf> = tree
            .rows()
            .into_iter()
            .filter(|row| row.expansion == Expansion::NotExpanded)
            .map(|row| row.path)
            .collect();
        for path in frontier {
            tree.expand(&path);
        }
    }

    for row in tree.rows() {
        let marker = match row.expansion {
            Expansion::NotExpanded => "▸ ",
            Expansion::Expanded(_) => "▾ ",
            Expansion::ExpandedEmpty => "  ",
        };
        println!("{}{}{}", "  ".repeat(row.depth), marker, row.label);
    }

    Ok(())
}

/// List a directory for the file pane.
fn run_ls(path: &Path, format: OutputFormat) -> Result<()> {
    let listing = list_directory(path)?;

    match format {
        OutputFormat::Text => {
            for entry in listing.entries() {
                let suffix = if entry.is_dir { "/" } else { "" };
                println!("{}{}", entry.name, suffix);
            }
            eprintln!("{}", listing.summary());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }

    Ok(())
}

/// Describe a path.
fn run_info(path: &Path, format: OutputFormat) -> Result<()> {
    let info = PathInfo::resolve(path);

    match format {
        OutputFormat::Text => {
            let kind = if info.is_symlink {
                format!("{} (symlink)", info.kind)
            } else {
                info.kind.to_string()
            };

            println!("{:<12} {}", "Path:", info.path.display());
            println!("{:<12} {}", "Type:", kind);
            if matches!(info.kind, PathKind::File | PathKind::Directory) {
                println!("{:<12} {}", "Size:", format_size(info.size));
                println!("{:<12} {}", "Modified:", format_time(info.modified));
                println!("{:<12} {}", "Permissions:", info.mode_string());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}

/// Submit one request and wait for its result.
async fn run_operation(request: OperationRequest, force: bool) -> Result<()> {
    if let Some(destination) = &request.destination {
        if let Some(conflict) = detect_conflict(&request.source, destination) {
            if !conflict.can_overwrite() {
                bail!("{}", conflict.kind);
            }
            if !force {
                bail!("{} Pass --force to replace it.", conflict.prompt());
            }
        }
    }

    let executor = OperationExecutor::new();
    let result = executor.submit(request.with_overwrite(force)).wait().await;
    report(result)
}

async fn run_rename(path: &Path, new_name: &str) -> Result<()> {
    validate_filename(new_name)?;
    let destination = path
        .parent()
        .map(|parent| parent.join(new_name))
        .ok_or_else(|| eyre!("Cannot rename {}", path.display()))?;

    if destination == path {
        return Ok(());
    }
    run_operation(OperationRequest::move_to(path, destination), false).await
}

fn report(result: OperationResult) -> Result<()> {
    if result.success {
        println!("{result}");
        Ok(())
    } else {
        Err(eyre!(result.message))
    }
}

/// Poll the mount table `ticks` times and print each snapshot.
async fn run_devices(
    ticks: u64,
    interval_ms: u64,
    mount_table: PathBuf,
    format: OutputFormat,
) -> Result<()> {
    let config = WatcherConfig::builder()
        .interval(Duration::from_millis(interval_ms))
        .mount_table(mount_table)
        .build()
        .map_err(|e| eyre!("Invalid watcher settings: {e}"))?;

    let (watcher, mut rx) = DeviceWatcher::spawn(config);

    for _ in 0..ticks {
        let snapshot = rx.recv().await.context("Device watcher stopped")?;
        match format {
            OutputFormat::Text => {
                if snapshot.devices.is_empty() {
                    println!("[{}] no removable devices", snapshot.tick);
                }
                for device in &snapshot.devices {
                    println!(
                        "[{}] {}  {}",
                        snapshot.tick,
                        device.label(),
                        device.mount_point.display()
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(&snapshot.devices)?);
            }
        }
    }

    watcher.stop().await;
    Ok(())
}

fn run_open(path: &Path, with: Option<&str>, list_apps: bool) -> Result<()> {
    if list_apps {
        for (label, command) in KNOWN_APPLICATIONS {
            println!("{label:<14} {command}");
        }
        return Ok(());
    }

    match with {
        Some(command) => launch(command, path)?,
        None => open_default(path)?,
    }
    Ok(())
}

fn run_settings(theme: Option<Theme>, zoom_in: bool, zoom_out: bool) -> Result<()> {
    let path = UserSettings::config_path().ok_or_else(|| eyre!("No config directory"))?;
    let mut settings = UserSettings::load_from(&path);
    let mut changed = false;

    if let Some(theme) = theme {
        changed |= settings.theme != theme;
        settings.theme = theme;
    }
    if zoom_in {
        settings.zoom_in();
        changed = true;
    }
    if zoom_out {
        changed |= settings.zoom_out();
    }

    if changed {
        settings
            .save_to(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }

    println!("theme     = {}", settings.theme);
    println!("font_size = {}", settings.font_size);
    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

fn format_time(time: Option<std::time::SystemTime>) -> String {
    time.map(|t| {
        chrono::DateTime::<chrono::Local>::from(t)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    })
    .unwrap_or_else(|| "-".to_string())
}
