//! # wraith_app
//!
//! Runs the demo scene through the frame loop.
//!
//! Configuration comes from an optional JSON file (`--config`), with
//! command-line flags taking precedence. Logging honours `RUST_LOG`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wraith_app::systems::{AnimationSystem, LifetimeSystem, SpriteSystem};
use wraith_app::{Engine, EngineConfig, scene};

#[derive(Parser)]
#[command(name = "wraith_app", about = "Archetype ECS frame loop demo")]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to run (0 = unlimited)
    #[arg(short, long)]
    frames: Option<u64>,

    /// Target frames per second
    #[arg(long)]
    frame_rate: Option<f64>,

    /// Minimum time between prunes of empty archetypes, in milliseconds
    #[arg(long)]
    cleanup_interval_ms: Option<u64>,

    /// Number of entities in the demo scene
    #[arg(short, long, default_value_t = 64)]
    entities: usize,
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(frames) = self.frames {
            config.max_frames = frames;
        }
        if let Some(frame_rate) = self.frame_rate {
            config.frame_rate = frame_rate;
        }
        if let Some(ms) = self.cleanup_interval_ms {
            config.manager.cleanup_interval = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wraith_app=info".parse()?))
        .init();

    let args = Args::parse();
    let config = args.engine_config()?;
    info!(?config, "wraith starting");

    let mut engine = Engine::new(config)?;
    engine.add_system(LifetimeSystem)?;
    engine.add_system(AnimationSystem)?;
    engine.add_system(SpriteSystem)?;

    scene::spawn(&mut engine, args.entities)?;
    engine.run()?;

    engine.manager().verify_integrity()?;
    info!(
        frames = engine.frame_count(),
        entities = engine.manager().entity_count(),
        archetypes = engine.manager().archetype_count(),
        "wraith shut down"
    );
    Ok(())
}
