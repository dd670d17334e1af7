//! Winkel Tripel render CLI.
//!
//! Loads a gridded field and palette definitions from JSON, composites the
//! colorized field onto a Winkel Tripel map, and writes the frame as PNG.
//! Optional vector features are projected into the same screen space and
//! written as JSON polylines.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use climate_common::GriddedData;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use renderer::{
    png, Color, CompositeOptions, PaletteRegistry, ProjectionEngine, RenderConfig,
    SampleableImage, VectorFeature, ViewParams,
};

#[derive(Parser, Debug)]
#[command(name = "winkel-render")]
#[command(about = "Render gridded climate data on a Winkel Tripel map")]
struct Args {
    /// Gridded data JSON (`lat`, `lon`, `values`, optional `mask`, `min`, `max`)
    #[arg(long, env = "WINKEL_GRID")]
    grid: PathBuf,

    /// Palette definitions JSON (`FullName`, `BuildFunction`, `Values`)
    #[arg(long, env = "WINKEL_PALETTES")]
    palettes: PathBuf,

    /// Palette name; unknown names fall back to the first palette
    #[arg(long, default_value = "Temperature")]
    palette: String,

    /// Overlay opacity in [0, 1]
    #[arg(long, default_value_t = 1.0)]
    opacity: f64,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1024, env = "WINKEL_WIDTH")]
    width: usize,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 512, env = "WINKEL_HEIGHT")]
    height: usize,

    /// Zoom factor relative to the fitted map
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Horizontal pan in pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_x: f64,

    /// Vertical pan in pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_y: f64,

    /// Render every Nth pixel in each direction
    #[arg(long, default_value_t = 1)]
    downsample: usize,

    /// Solid base map color drawn under the overlay, as `#rrggbb`
    #[arg(long)]
    base_color: Option<String>,

    /// Vector features JSON (`[{"id": .., "points": [{"lon": .., "lat": ..}]}]`)
    #[arg(long)]
    vectors: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "winkel.png")]
    output: PathBuf,

    /// Output path for projected vectors (stdout when omitted)
    #[arg(long)]
    vectors_output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    run(&args)
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: &Args) -> Result<()> {
    let config = RenderConfig::from_env();
    let palettes = PaletteRegistry::from_file(&args.palettes)
        .with_context(|| format!("Failed to load palettes from {}", args.palettes.display()))?;
    let engine = ProjectionEngine::new(config, palettes).context("Invalid render configuration")?;

    let grid = load_grid(&args.grid)?;
    let overlay = engine
        .colorize(&grid, &args.palette, args.opacity)
        .with_context(|| format!("Failed to colorize grid with palette '{}'", args.palette))?;

    let view = ViewParams::new(args.scale, args.offset_x, args.offset_y);
    let mut options = CompositeOptions::new(args.width, args.height)
        .with_downsample(args.downsample)
        .with_view(view)
        .with_overlay(overlay);

    if let Some(hex) = &args.base_color {
        let color =
            Color::from_hex(hex).ok_or_else(|| anyhow!("Invalid base color '{}'", hex))?;
        options = options.with_base(SampleableImage::filled(2, 2, color)?);
    }

    let frame = engine.render_composite(&options).context("Render failed")?;
    png::write_png(&args.output, &frame)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        width = frame.width,
        height = frame.height,
        drawn = frame.drawn_pixels(),
        "Frame written"
    );

    if let Some(path) = &args.vectors {
        let features = load_features(path)?;
        let projected = engine
            .project_vectors(&features, args.width, args.height, &view)
            .context("Vector projection failed")?;
        let json = serde_json::to_string_pretty(&projected)?;

        match &args.vectors_output {
            Some(out) => {
                fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
                info!(
                    output = %out.display(),
                    features = projected.len(),
                    "Projected vectors written"
                );
            }
            None => println!("{}", json),
        }
    }

    Ok(())
}

fn load_grid(path: &Path) -> Result<GriddedData> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read grid {}", path.display()))?;
    GriddedData::from_json(&json).with_context(|| format!("Invalid grid in {}", path.display()))
}

fn load_features(path: &Path) -> Result<Vec<VectorFeature>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read vectors {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid vectors in {}", path.display()))
}
