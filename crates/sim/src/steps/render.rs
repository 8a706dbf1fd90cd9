use std::f32::consts::TAU;

use compute::Tensor;
use glam::{Vec2, Vec3};

use crate::context::Context;
use crate::drones::DroneState;
use crate::error::{ensure_device, SimError};
use crate::geometry::ray_segment;
use crate::ragged::RaggedBatch;
use crate::scene::Scene;
use crate::types::{Drone, Line, RayHit, Texel};

/// What every drone sees: `resolution` hits per drone, drone-major.
#[derive(Debug, Clone)]
pub struct RenderResult {
    hits: Tensor<RayHit>,
}

impl RenderResult {
    /// All hits as a `[n_drones, resolution]` tensor.
    #[must_use]
    pub fn hits(&self) -> &Tensor<RayHit> {
        &self.hits
    }

    #[must_use]
    pub fn n_drones(&self) -> usize {
        self.hits.shape()[0]
    }

    #[must_use]
    pub fn resolution(&self) -> usize {
        self.hits.shape()[1]
    }

    /// The rays of drone `d`, left edge of the field of view first.
    ///
    /// # Panics
    ///
    /// Panics if `d >= self.n_drones()`.
    #[must_use]
    pub fn drone(&self, d: usize) -> &[RayHit] {
        let res = self.resolution();
        &self.hits.as_slice()[d * res..(d + 1) * res]
    }
}

/// Read-only view of one scene group used by a render lane.
struct View<'a> {
    lines: &'a [Line],
    first_line: usize,
    textures: &'a RaggedBatch<Texel>,
    baked: &'a [f32],
    frame: &'a [Vec3],
}

/// Casts `ctx.config.resolution` rays from every drone across `ctx.config.fov`
/// and reports the nearest wall each one meets.
///
/// # Errors
///
/// Returns [`SimError::NotBaked`] while the lighting cache is stale, and a
/// shape or device error when drones and scenes disagree.
pub fn render(ctx: &Context, drones: &DroneState, scene: &Scene) -> Result<RenderResult, SimError> {
    ensure_device(&ctx.device, drones.device())?;
    ensure_device(&ctx.device, scene.device())?;
    if scene.n_scenes() != drones.n_scenes() {
        return Err(SimError::shape(format!(
            "scene batch holds {} scenes, drones span {}",
            scene.n_scenes(),
            drones.n_scenes()
        )));
    }
    let baked = scene.baked().values()?;

    let resolution = ctx.config.resolution;
    let fov = ctx.config.fov;
    let per_scene = drones.drones_per_scene();
    let lines = scene.lines();
    tracing::debug!(lanes = drones.len(), resolution, "render");

    let rows = ctx.device.map_lanes(drones.len(), |d| {
        let s = d / per_scene;
        let view = View {
            lines: lines.group(s),
            first_line: lines.starts()[s] as usize,
            textures: scene.textures(),
            baked: baked.values(),
            frame: scene.frame().as_slice(),
        };
        cast_rays(&view, &drones.drones()[d], resolution, fov)
    });

    let hits = rows.into_iter().flatten().collect();
    Ok(RenderResult {
        hits: Tensor::from_vec(&ctx.device, hits, vec![drones.len(), resolution])?,
    })
}

fn cast_rays(view: &View<'_>, drone: &Drone, resolution: usize, fov: f32) -> Vec<RayHit> {
    (0..resolution)
        .map(|i| {
            let offset = fov * ((i as f32 + 0.5) / resolution as f32 - 0.5);
            cast_ray(view, drone.position, drone.angle + offset)
        })
        .collect()
}

fn cast_ray(view: &View<'_>, origin: Vec2, angle: f32) -> RayHit {
    let dir = Vec2::from_angle(angle);

    // Strict `<` keeps the earliest line on equal distances.
    let mut nearest: Option<(usize, f32, f32)> = None;
    for (j, line) in view.lines.iter().enumerate() {
        if let Some((s, t)) = ray_segment(origin, dir, line) {
            let closer = match nearest {
                Some((_, best, _)) => s < best,
                None => true,
            };
            if closer {
                nearest = Some((j, s, t));
            }
        }
    }

    let Some((j, distance, t)) = nearest else {
        return RayHit::background(origin, background(view.frame, angle));
    };
    let line = &view.lines[j];
    RayHit {
        index: j as i32,
        location: origin + distance * dir,
        dot: dir.dot(line.normal()),
        distance,
        color: texel_color(view, view.first_line + j, t),
    }
}

/// Lit colour of the texel covering parameter `t` along flat line `l`.
fn texel_color(view: &View<'_>, l: usize, t: f32) -> Vec3 {
    let width = view.textures.widths()[l] as usize;
    if width == 0 {
        return Vec3::ZERO;
    }
    let k = view.textures.starts()[l] as usize + ((t * width as f32) as usize).min(width - 1);
    view.textures.values()[k].color * view.baked[k]
}

/// Frame column facing `angle`, with column 0 at angle 0 and columns
/// advancing counter-clockwise.
fn background(frame: &[Vec3], angle: f32) -> Vec3 {
    let columns = frame.len();
    let column = ((angle.rem_euclid(TAU) / TAU * columns as f32) as usize).min(columns - 1);
    frame[column]
}
