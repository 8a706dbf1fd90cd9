#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]

use std::path::Path;

use anyhow::{Context as _, Result};
use compute::Tensor;
use glam::{Vec2, Vec3};
use sim::scenery::PATTERN_LENGTH;
use sim::{
    bake, boxed_room, initialize, painted, physics, render, respawn, uniform_frame, Command, Context, DroneState,
    Light, Movement, Respawns, SceneBuilder, SimConfig, SpawnVolume,
};

const N_SCENES: usize = 128;
const DRONES_PER_SCENE: usize = 2;
const DEFAULT_TICKS: usize = 200;
const REPORT_EVERY: usize = 50;

/// Usage: `runtime_main [config.json] [ticks]`.
fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => SimConfig::default(),
    };
    let ticks = match args.next() {
        Some(n) => n.parse::<usize>().with_context(|| format!("tick count {n:?} is not a number"))?,
        None => DEFAULT_TICKS,
    };

    let ctx = initialize(config)?;
    run(&ctx, ticks)
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: SimConfig = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    tracing::info!("Loaded configuration from {}.", path.display());
    Ok(config)
}

fn run(ctx: &Context, ticks: usize) -> Result<()> {
    tracing::info!("Building {N_SCENES} box rooms with {DRONES_PER_SCENE} drones each...");
    let mut builder = SceneBuilder::new().patterned(PATTERN_LENGTH).random_intensities();
    let mut volumes = Vec::with_capacity(N_SCENES);
    for s in 0..N_SCENES {
        let half = 2.0 + (s % 4) as f32;
        let light = Light::new(Vec2::new(0.5 * half, 0.5 * half), 1.0);
        let walls = painted(boxed_room(half, Vec3::ONE).into_iter().map(|w| w.line));
        builder.push_scene(vec![light], walls);
        volumes.push(vec![SpawnVolume::disc(Vec2::ZERO, 0.5 * half)]);
    }
    let mut scene = builder.build(ctx, uniform_frame(&ctx.device, 64, Vec3::splat(0.1)))?;
    let respawns = Respawns::from_volumes(&ctx.device, &volumes)?;
    let mut drones = DroneState::new(&ctx.device, N_SCENES, DRONES_PER_SCENE);
    let n_drones = drones.len();

    respawn(ctx, &vec![true; n_drones], &respawns, &mut drones)?;
    bake(ctx, &mut scene, 0)?;

    let rng = fastrand::Rng::with_seed(ctx.config.seed);
    tracing::info!("Starting simulation loop for {ticks} ticks with dt = {}...", ctx.config.dt);
    for tick in 1..=ticks {
        let commands = (0..n_drones)
            .map(|_| Command::new(rng.i32(-1..=1), rng.i32(-1..=1), rng.i32(-1..=1)))
            .collect();
        let movement = Movement::new(&ctx.device, Tensor::vector(&ctx.device, commands))?;
        physics(ctx, &movement, &scene, &mut drones)?;
        let seen = render(ctx, &drones, &scene)?;

        if tick % REPORT_EVERY == 0 {
            let hits = seen.hits().as_slice();
            let walls = hits.iter().filter(|h| !h.is_background()).count();
            let mean = hits.iter().map(|h| h.color.length()).sum::<f32>() / hits.len().max(1) as f32;
            tracing::info!(
                "Tick {tick} complete. Drone 0 at {:?}, {walls}/{} rays on walls, mean brightness {mean:.3}",
                drones.drones()[0].position,
                hits.len()
            );
        }
    }

    tracing::info!("Simulation loop finished after {ticks} ticks.");
    Ok(())
}
