use crate::config::load_config;
use crate::diagram::Diagram;
use crate::error::FocusError;
use crate::geometry::Orientation;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::parser::parse_and_prepare;
use crate::text_metrics::{FixedMeasurer, FontMeasurer, LabelMeasurer};
use crate::viewport::Viewport;
use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pipediag", version, about = "Lay out and focus pipeline diagrams")]
pub struct Args {
    /// Input graph (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout dump. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Treat the graph as left-to-right
    #[arg(long)]
    pub horizontal: bool,

    /// Measure labels with fixed-width glyphs instead of system fonts
    #[arg(long = "fixed-metrics")]
    pub fixed_metrics: bool,

    /// Containers to collapse
    #[arg(long, value_delimiter = ',')]
    pub collapse: Vec<String>,

    /// Containers to expand
    #[arg(long, value_delimiter = ',')]
    pub expand: Vec<String>,

    /// Containers to toggle
    #[arg(long, value_delimiter = ',')]
    pub toggle: Vec<String>,

    /// Nodes to mark selected
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Focus this node id and its neighbours
    #[arg(long, conflicts_with_all = ["focus_label", "focus_random"])]
    pub focus: Option<String>,

    /// Focus the first node with this label
    #[arg(long = "focus-label", conflicts_with = "focus_random")]
    pub focus_label: Option<String>,

    /// Focus a random node
    #[arg(long = "focus-random")]
    pub focus_random: bool,

    /// Seed for --focus-random
    #[arg(long)]
    pub seed: Option<u64>,

    /// Zoom steps after focusing; negative values zoom out
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub zoom: i32,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.viewport.height = height;
    }
    if args.horizontal {
        config.viewport.orientation = Orientation::Horizontal;
    }

    let input = read_input(args.input.as_deref())?;
    let prepared = parse_and_prepare(&input, &config.layout)?;
    let measurer: Box<dyn LabelMeasurer> = if args.fixed_metrics {
        Box::new(FixedMeasurer::default())
    } else {
        Box::new(FontMeasurer::new(&config.theme))
    };
    let mut diagram = Diagram::new(prepared, measurer, config.layout.clone());
    tracing::info!(nodes = diagram.index().len(), "diagram loaded");

    for id in &args.collapse {
        diagram.set_collapsed(id, true)?;
    }
    for id in &args.expand {
        diagram.set_collapsed(id, false)?;
    }
    for id in &args.toggle {
        diagram.toggle_collapsed(id)?;
    }
    for id in &args.select {
        diagram.select(id, true)?;
    }

    let mut viewport = Viewport::new(config.viewport.clone());
    let focused = if let Some(id) = args.focus.as_deref() {
        Some(viewport.focus(&diagram, id))
    } else if let Some(label) = args.focus_label.as_deref() {
        Some(viewport.focus_by_label(&diagram, label))
    } else if args.focus_random {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Some(viewport.focus_random(&diagram, &mut rng))
    } else {
        None
    };
    match focused {
        Some(Err(err @ (FocusError::TargetNotFound(_) | FocusError::LabelNotFound(_)))) => {
            tracing::warn!(%err, "focus skipped");
        }
        Some(Err(err)) => return Err(err.into()),
        Some(Ok(_)) | None => {}
    }

    for _ in 0..args.zoom.max(0) {
        viewport.zoom_in();
    }
    for _ in 0..args.zoom.min(0).unsigned_abs() {
        viewport.zoom_out();
    }

    let dump = LayoutDump::from_diagram(&diagram, &viewport);
    write_layout_dump(args.output.as_deref(), &dump)?;
    if let Some(path) = args.output.as_deref() {
        tracing::info!(path = %path.display(), "layout dump written");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
