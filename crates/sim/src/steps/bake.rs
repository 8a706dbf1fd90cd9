use glam::Vec2;

use crate::config::Occlusion;
use crate::context::Context;
use crate::error::{ensure_device, SimError};
use crate::geometry::properly_crosses;
use crate::scene::Scene;
use crate::types::Light;

/// Fills the scene's baked lighting cache and marks it fresh.
///
/// Each texel sums `intensity / (1 + (d / light_falloff)^2)` over the lights
/// of its scene. With [`Occlusion::Walls`], a light is dropped when a wall
/// crosses the path to it. The first `dynamic_lines` lines of every scene
/// are treated as movable and never shadow, as is the texel's own line.
///
/// # Errors
///
/// Fails with a device mismatch, leaving the cache untouched, when `scene`
/// lives on a device other than `ctx.device`.
pub fn bake(ctx: &Context, scene: &mut Scene, dynamic_lines: usize) -> Result<(), SimError> {
    ensure_device(&ctx.device, scene.device())?;
    let falloff = ctx.config.light_falloff;
    let occlusion = ctx.config.occlusion;
    let lines = scene.lines();
    let lights = scene.lights();
    let textures = scene.textures();
    tracing::debug!(lanes = textures.rows(), dynamic_lines, ?occlusion, "bake");

    let baked = ctx.device.map_lanes(textures.rows(), |k| {
        let l = textures.inverse_of(k);
        let s = lines.inverse_of(l);
        let j = k - textures.starts()[l] as usize;
        let w = textures.widths()[l] as usize;
        let line = &lines.values()[l];
        let texel = line.point_at((j as f32 + 0.5) / w as f32);

        let own = l - lines.starts()[s] as usize;
        let blockers = lines
            .group(s)
            .iter()
            .enumerate()
            .skip(dynamic_lines)
            .filter(move |&(i, _)| i != own)
            .map(|(_, blocker)| blocker);
        illuminate(texel, lights.group(s), falloff, |light| match occlusion {
            Occlusion::None => false,
            Occlusion::Walls => blockers.clone().any(|b| properly_crosses(texel, light.position, b)),
        })
    });

    scene.baked_mut().store(&baked);
    Ok(())
}

fn illuminate(texel: Vec2, lights: &[Light], falloff: f32, blocked: impl Fn(&Light) -> bool) -> f32 {
    lights
        .iter()
        .filter(|&light| !blocked(light))
        .map(|light| {
            let d = texel.distance(light.position) / falloff;
            light.intensity / (1.0 + d * d)
        })
        .sum()
}
