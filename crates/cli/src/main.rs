use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand, ValueEnum};
use diagram::{RenderOptions, render_svg};
use legis_core::config::Settings;
use legis_core::layout::{GridConfig, Layout, LayoutMode, fit_scale, layout};
use legis_core::schema::{ProcessRecord, TimelineNode};
use legis_core::stats::stage_breakdown;
use legis_core::{ProcessOutcome, TimelineBuilder, db};
use schemars::schema_for;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "legis")]
#[command(about = "Legislative process timelines and diagrams", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export JSON Schemas to the ./schemas directory
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Build timelines from fetched processes
    Timeline {
        #[command(subcommand)]
        command: TimelineCommands,
    },
    /// Lay out a built timeline and print the layout as JSON
    Layout {
        /// Timeline JSON produced by `timeline build`
        #[arg(long)]
        timeline: PathBuf,

        #[command(flatten)]
        draw: DrawArgs,

        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Build, lay out and draw a process as SVG
    Render {
        /// Process JSON
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        draw: DrawArgs,

        /// Leave out the "now" marker
        #[arg(long)]
        no_now_line: bool,

        /// Node id to draw with a selection ring
        #[arg(long)]
        selected: Option<String>,
    },
    /// Local SQLite cache of processes and timelines
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for the process input and timeline outputs
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum TimelineCommands {
    /// Fold a process's stages into timeline nodes
    Build {
        /// Process JSON
        #[arg(long)]
        input: PathBuf,

        /// Directory holding layout.toml / vocabulary.yaml
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Build and store timelines for one process or a JSON array of them
    Import {
        #[arg(long)]
        db: PathBuf,

        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Count in-progress processes by their current stage
    Stats {
        #[arg(long)]
        db: PathBuf,
    },
    /// Print the stored timeline of one process
    Show {
        #[arg(long)]
        db: PathBuf,

        #[arg(long)]
        term: u32,

        #[arg(long)]
        number: String,
    },
}

#[derive(Args)]
struct DrawArgs {
    #[arg(long, value_enum, default_value_t = Mode::Sequential)]
    mode: Mode,

    /// Place alternative branches below their parents
    #[arg(long)]
    alternatives: bool,

    /// Multiply every spatial setting by this factor
    #[arg(long, conflicts_with = "fit_width")]
    scale: Option<f64>,

    /// Pick the scale that fits the diagram into this many pixels
    #[arg(long)]
    fit_width: Option<f64>,

    /// Directory holding layout.toml / vocabulary.yaml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Sequential,
    Proportional,
}

impl From<Mode> for LayoutMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Sequential => LayoutMode::Sequential,
            Mode::Proportional => LayoutMode::Proportional,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProcessInput {
    Many(Vec<ProcessRecord>),
    One(Box<ProcessRecord>),
}

impl ProcessInput {
    fn into_vec(self) -> Vec<ProcessRecord> {
        match self {
            Self::Many(processes) => processes,
            Self::One(process) => vec![*process],
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs, if cli.verbose { Level::DEBUG } else { Level::WARN });

    match cli.command {
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(&out_dir),
        },
        Commands::Timeline { command } => match command {
            TimelineCommands::Build { input, config, out } => {
                timeline_build(&input, config.as_deref(), out.as_deref())
            }
        },
        Commands::Layout { timeline, draw, out } => {
            layout_timeline(&timeline, &draw, out.as_deref())
        }
        Commands::Render {
            input,
            out,
            draw,
            no_now_line,
            selected,
        } => {
            let options = RenderOptions {
                show_now_line: !no_now_line,
                show_alternatives: draw.alternatives,
                selected_node_id: selected,
            };
            render(&input, &out, &draw, &options)
        }
        Commands::Db { command } => match command {
            DbCommands::Import { db, input, config } => db_import(&db, &input, config.as_deref()),
            DbCommands::Stats { db } => db_stats(&db),
            DbCommands::Show { db, term, number } => db_show(&db, term, &number),
        },
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}

fn schema_export(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    let process_schema = schema_for!(legis_core::schema::ProcessRecord);
    fs::write(
        out_dir.join("ProcessRecord.schema.json"),
        serde_json::to_string_pretty(&process_schema)?,
    )?;

    let node_schema = schema_for!(legis_core::schema::TimelineNode);
    fs::write(
        out_dir.join("TimelineNode.schema.json"),
        serde_json::to_string_pretty(&node_schema)?,
    )?;

    let layout_schema = schema_for!(legis_core::layout::Layout);
    fs::write(
        out_dir.join("Layout.schema.json"),
        serde_json::to_string_pretty(&layout_schema)?,
    )?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}

fn timeline_build(input: &Path, config: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let process: ProcessRecord = read_json(input)?;
    let nodes = TimelineBuilder::new(&settings.vocabulary).build_process(&process);
    info!(process = %process.number, nodes = nodes.len(), "built timeline");
    write_output(out, &serde_json::to_string_pretty(&nodes)?)
}

fn layout_timeline(timeline: &Path, draw: &DrawArgs, out: Option<&Path>) -> Result<()> {
    let settings = load_settings(draw.config.as_deref())?;
    let nodes: Vec<TimelineNode> = read_json(timeline)?;
    let (placed, _) = compute_layout(&nodes, draw, &settings)?;
    write_output(out, &serde_json::to_string_pretty(&placed)?)
}

fn render(input: &Path, out: &Path, draw: &DrawArgs, options: &RenderOptions) -> Result<()> {
    let settings = load_settings(draw.config.as_deref())?;
    let process: ProcessRecord = read_json(input)?;
    let nodes = TimelineBuilder::new(&settings.vocabulary).build_process(&process);
    let (placed, grid) = compute_layout(&nodes, draw, &settings)?;
    let svg = render_svg(&placed, &grid, options)?;
    fs::write(out, svg).with_context(|| format!("failed to write {}", out.display()))?;
    println!("Rendered {} nodes to {}", placed.nodes.len(), out.display());
    Ok(())
}

/// Lays out `nodes` at the requested scale and returns the grid it was laid out with.
fn compute_layout(
    nodes: &[TimelineNode],
    draw: &DrawArgs,
    settings: &Settings,
) -> Result<(Layout, GridConfig)> {
    let mode = LayoutMode::from(draw.mode);
    let base = settings.layout;
    let scale = match (draw.scale, draw.fit_width) {
        (Some(scale), _) => scale,
        (None, Some(width)) => {
            let natural = layout(nodes, mode, &base.grid, &base.proportional, draw.alternatives);
            fit_scale(width, natural.total_width)
        }
        (None, None) => 1.0,
    };
    ensure!(scale.is_finite() && scale > 0.0, "scale must be a positive number, got {scale}");
    debug!(scale, "layout scale");

    let scaled = base.scaled(scale);
    let placed = layout(nodes, mode, &scaled.grid, &scaled.proportional, draw.alternatives);
    Ok((placed, scaled.grid))
}

fn db_import(db_path: &Path, input: &Path, config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let processes = read_json::<ProcessInput>(input)?.into_vec();
    let conn = db::open(&db_path.to_string_lossy())?;
    let builder = TimelineBuilder::new(&settings.vocabulary);

    for process in &processes {
        let outcome = ProcessOutcome::of(process, &settings.vocabulary);
        let nodes = builder.build_process(process);
        db::upsert_process(&conn, process, &nodes, outcome).with_context(|| {
            format!("failed to store process {}/{}", process.term, process.number)
        })?;
    }

    println!("Imported {} processes into {}", processes.len(), db_path.display());
    Ok(())
}

fn db_stats(db_path: &Path) -> Result<()> {
    let conn = db::open(&db_path.to_string_lossy())?;
    let timelines = db::in_progress_timelines(&conn)?;
    let breakdown = stage_breakdown(timelines.iter().map(Vec::as_slice));

    let mut rows: Vec<(&String, &usize)> = breakdown.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!("{} processes in progress", timelines.len());
    for (stage, count) in rows {
        println!("{count:>6}  {stage}");
    }
    Ok(())
}

fn db_show(db_path: &Path, term: u32, number: &str) -> Result<()> {
    let conn = db::open(&db_path.to_string_lossy())?;
    let nodes = db::load_timeline(&conn, term, number)?
        .with_context(|| format!("no process {term}/{number} in {}", db_path.display()))?;
    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}

fn load_settings(config: Option<&Path>) -> Result<Settings> {
    match config {
        Some(dir) => Settings::load_from_dir(dir)
            .with_context(|| format!("failed to load configuration from {}", dir.display())),
        None => Ok(Settings::default()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(path) => fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}
