use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

use posey::clipboard::PoseClipboard;
use posey::config::PoseyConfig;
use posey::host::{HostAdapter, HostKind, SceneHost, StubHost};
use posey::library::read_pose;
use posey::mirror::MirrorAxis;
use posey::transfer::Transfer;

const DEFAULT_CONFIG: &str = "posey.toml";

/// Copy and paste world-space poses between object selections
#[derive(Parser)]
#[command(name = "posey", version)]
struct Cli {
    /// Config file (defaults to ./posey.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Scene file for the scene-file host (overrides config)
    #[arg(long, global = true)]
    scene: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

/// Where a pose is read from or written to. Neither flag means the clipboard.
#[derive(Args)]
struct PoseSource {
    /// Pose file path
    #[arg(long, conflicts_with = "name")]
    file: Option<PathBuf>,

    /// Pose name in the library
    #[arg(long)]
    name: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Copy the pose of the selected objects
    Copy {
        #[command(flatten)]
        target: PoseSource,
    },
    /// Paste a pose onto the selected objects
    Paste {
        #[command(flatten)]
        source: PoseSource,
        /// Match by selection order instead of by name
        #[arg(long)]
        by_order: bool,
        /// Paste relative to this object's current transform
        #[arg(long)]
        reference: Option<String>,
        /// Mirror axis: x, y, z or none
        #[arg(long)]
        mirror: Option<String>,
        /// Print the resulting transforms without changing the scene
        #[arg(long)]
        dry_run: bool,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print a stored pose as JSON
    Show {
        #[command(flatten)]
        source: PoseSource,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List poses in the library
    List,
    /// Delete a pose from the library
    Remove {
        /// Pose name in the library
        #[arg(long)]
        name: String,
    },
}

#[derive(Serialize)]
struct OutputApplication {
    object: String,
    source: String,
    matrix: [f64; 16],
}

#[derive(Serialize)]
struct OutputPreview {
    applied: Vec<OutputApplication>,
    skipped: Vec<String>,
}

impl From<Transfer> for OutputPreview {
    fn from(transfer: Transfer) -> Self {
        let applied = transfer
            .applications
            .into_iter()
            .map(|a| OutputApplication {
                matrix: a.transform.to_row_major(),
                object: a.object,
                source: a.source,
            })
            .collect();
        OutputPreview {
            applied,
            skipped: transfer.skipped,
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PoseyConfig> {
    if let Some(path) = path {
        return PoseyConfig::load(path).with_context(|| format!("loading {}", path.display()));
    }
    let default = Path::new(DEFAULT_CONFIG);
    if default.exists() {
        return PoseyConfig::load(default).context("loading posey.toml");
    }
    Ok(PoseyConfig::default())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(scene) = &cli.scene {
        config.scene = Some(scene.clone());
    }

    if !cli.command.needs_host() {
        return run_library(&config, cli.command);
    }

    let host = config.host;
    match host {
        HostKind::SceneFile => {
            let scene_path = config
                .scene
                .clone()
                .context("no scene file; pass --scene or set `scene` in the config")?;
            let scene = SceneHost::load(&scene_path)?;
            let mut clipboard = PoseClipboard::new(scene, config);
            let modified = run(&mut clipboard, cli.command)?;
            if modified {
                clipboard.host().save(&scene_path)?;
                tracing::debug!("saved scene to {}", scene_path.display());
            }
        }
        HostKind::Stub => {
            let mut clipboard = PoseClipboard::new(StubHost, config);
            run(&mut clipboard, cli.command)?;
        }
    }

    Ok(())
}

impl Command {
    /// Whether the command reads or writes the live scene.
    fn needs_host(&self) -> bool {
        matches!(self, Command::Copy { .. } | Command::Paste { .. })
    }
}

/// Resolve a pose source to a path; `None` means the clipboard.
fn resolve_path(config: &PoseyConfig, source: &PoseSource) -> Result<Option<PathBuf>> {
    match (&source.file, &source.name) {
        (Some(file), _) => Ok(Some(file.clone())),
        (None, Some(name)) => Ok(Some(config.library().path_for(name)?)),
        (None, None) => Ok(None),
    }
}

/// Run a command that only touches pose files.
fn run_library(config: &PoseyConfig, command: Command) -> Result<()> {
    match command {
        Command::Show { source, pretty } => {
            let path = resolve_path(config, &source)?.unwrap_or_else(|| config.clipboard_path());
            let pose = read_pose(&path)?;
            let json = if pretty {
                pose.to_json_pretty()?
            } else {
                pose.to_json()?
            };
            println!("{json}");
        }
        Command::List => {
            let library = config.library();
            let names = library.list()?;
            if names.is_empty() {
                tracing::info!("no poses in {}", library.dir().display());
            }
            for name in names {
                println!("{name}");
            }
        }
        Command::Remove { name } => {
            config.library().remove(&name)?;
            tracing::info!("removed {name}");
        }
        Command::Copy { .. } | Command::Paste { .. } => {
            bail!("this command needs a scene host")
        }
    }
    Ok(())
}

/// Run a command against the host. Returns whether the scene was modified.
fn run<H: HostAdapter>(clipboard: &mut PoseClipboard<H>, command: Command) -> Result<bool> {
    match command {
        Command::Copy { target } => {
            let path = resolve_path(clipboard.config(), &target)?;
            clipboard.copy(path.as_deref())?;
            Ok(false)
        }
        Command::Paste {
            source,
            by_order,
            reference,
            mirror,
            dry_run,
            pretty,
        } => {
            let mut options = clipboard.config().paste_options();
            if by_order {
                options.by_name = false;
            }
            if let Some(mirror) = mirror {
                options.mirror = mirror.parse::<MirrorAxis>()?;
            }
            if let Some(reference) = reference {
                options.reference = Some(reference.trim().to_string()).filter(|r| !r.is_empty());
            }

            let path = resolve_path(clipboard.config(), &source)?;
            if dry_run {
                let transfer = clipboard.preview(path.as_deref(), &options)?;
                println!("{}", to_json(&OutputPreview::from(transfer), pretty)?);
                return Ok(false);
            }

            let report = clipboard.paste(path.as_deref(), &options)?;
            println!("{}", to_json(&report, pretty)?);
            Ok(report.applied_count() > 0)
        }
        command => {
            run_library(clipboard.config(), command)?;
            Ok(false)
        }
    }
}
