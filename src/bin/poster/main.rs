// poster - Render a visual to PNG without a browser
//
// Pipeline:
//   1. Load engine config (TOML, optional) and validate it
//   2. Build the visual at the requested size with a fixed seed
//   3. Tick it N times at 60 Hz into the software raster
//   4. Write the raster as PNG
//
// Usage: cargo run --bin poster -- --visual cosmos --ticks 240 --out cosmos.png

mod export;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use nucleus_engine::{EngineConfig, Raster, Simulation, Visual, VisualKind};

const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Parser)]
#[command(name = "poster", about = "Render a nucleus-engine visual to PNG")]
struct Args {
    /// cosmos, network, nucleus or fallback
    #[arg(long, default_value = "cosmos")]
    visual: VisualKind,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Frames to simulate before capturing
    #[arg(long, default_value_t = 180)]
    ticks: u32,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Engine config in TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start a query this many ticks in (nucleus and fallback only)
    #[arg(long)]
    query_at: Option<u32>,

    #[arg(long, default_value = "poster.png")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    info!("rendering {} at {}x{} for {} ticks", args.visual, args.width, args.height, args.ticks);

    let mut raster = Raster::new(args.width, args.height)
        .with_context(|| format!("allocating a {}x{} raster", args.width, args.height))?;
    let mut visual = Visual::new(args.visual, args.width, args.height, &config, args.seed);

    for tick in 0..args.ticks {
        if args.query_at == Some(tick) {
            visual.trigger_query();
        }
        visual.tick(FRAME_DT, &mut raster);
    }

    export::save_png(&raster, &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
