//! Headless scene runner
//!
//! Loads a scene file, steps it for a number of frames the way a game loop
//! would (update, sync transforms, clear events), then prints where every
//! object ended up.
//!
//! Usage:
//!   bonnie-compose scene.ron                  # 60 frames at 60 Hz
//!   bonnie-compose scene.ron --frames 300 --dt 0.0333

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use bonnie_compose::game::inspector::Inspector;
use bonnie_compose::{load_scene, World, VERSION};

#[derive(Parser)]
#[command(name = "bonnie-compose")]
#[command(about = "Step a BONNIE-32 scene headlessly and print the final poses")]
struct Cli {
    /// Scene file (RON)
    scene: PathBuf,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    info!("bonnie-compose v{}", VERSION);

    let scene = load_scene(&cli.scene)
        .with_context(|| format!("failed to load {}", cli.scene.display()))?;

    let mut world = World::with_config(scene.config.clone());
    scene
        .instantiate(&mut world)
        .context("failed to build scene")?;
    info!("{} objects, {} components", world.object_count(), world.component_count());

    let mut inspector = Inspector::new();
    for _ in 0..cli.frames {
        world.update(cli.dt);
        world.sync_all_transforms();
        inspector.observe_events(world.events());
        world.clear_events();
    }

    println!("after {} frames ({:.3}s):", cli.frames, cli.frames as f32 * cli.dt);
    for summary in inspector.snapshot(&world) {
        let kinds: Vec<_> = summary.components.iter().map(|c| c.type_name).collect();
        println!(
            "  {:<16} pos ({:>9.3}, {:>9.3})  rot {:>8.2}  scale {:.3}  [{}]",
            summary.name,
            summary.position.x,
            summary.position.y,
            summary.rotation,
            summary.scale,
            kinds.join(", ")
        );
    }
    Ok(())
}
