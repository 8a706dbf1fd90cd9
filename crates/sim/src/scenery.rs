//! Building [`Scene`] batches from plain wall and light lists.
//!
//! Besides flat colours the builder can give each wall a brightness pattern
//! that steps at random points along the wall, and can draw light
//! intensities at random. Both are seeded from `SimConfig::seed` per scene,
//! so a build is reproducible and does not depend on the other scenes.

use std::f32::consts::TAU;

use compute::{Device, Tensor};
use glam::{Vec2, Vec3};

use crate::context::Context;
use crate::error::SimError;
use crate::ragged::RaggedBatch;
use crate::scene::Scene;
use crate::steps::respawn::lane_seed;
use crate::types::{Light, Line, Texel};

const PALETTE: [u32; 10] = [
    0x00c1_85ae,
    0x0073_a171,
    0x0056_66a4,
    0x009f_7c4a,
    0x0080_9cd5,
    0x0056_6e40,
    0x008e_537b,
    0x004f_9fa4,
    0x00b5_6d66,
    0x005a_728c,
];

/// Default distance between brightness steps of a patterned wall.
pub const PATTERN_LENGTH: f32 = 0.5;

/// Range that random light intensities are drawn from.
pub const RANDOM_INTENSITY: std::ops::Range<f32> = 0.1..1.0;

const PATTERN_STREAM: u64 = 0x5041_5454;
const LIGHT_STREAM: u64 = 0x4c49_4748;

/// Colour `i` of a fixed ten-colour palette, cycling, in linear RGB.
#[must_use]
pub fn palette_color(i: usize) -> Vec3 {
    let rgb = PALETTE[i % PALETTE.len()];
    let channel = |shift: u32| (((rgb >> shift) & 0xff) as f32 / 255.0).powf(2.2);
    Vec3::new(channel(16), channel(8), channel(0))
}

/// Walls along `lines`, wall `i` painted with [`palette_color`]`(i)`.
#[must_use]
pub fn painted(lines: impl IntoIterator<Item = Line>) -> Vec<Wall> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| Wall {
            line,
            color: palette_color(i),
        })
        .collect()
}

/// A wall painted in one colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub line: Line,
    pub color: Vec3,
}

impl Wall {
    #[must_use]
    pub const fn new(a: Vec2, b: Vec2, color: Vec3) -> Self {
        Self {
            line: Line::new(a, b),
            color,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SceneSpec {
    lights: Vec<Light>,
    walls: Vec<Wall>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    scenes: Vec<SceneSpec>,
    pattern: Option<f32>,
    random_intensities: bool,
}

impl SceneBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scene, chaining.
    #[must_use]
    pub fn scene(mut self, lights: Vec<Light>, walls: Vec<Wall>) -> Self {
        self.push_scene(lights, walls);
        self
    }

    pub fn push_scene(&mut self, lights: Vec<Light>, walls: Vec<Wall>) {
        self.scenes.push(SceneSpec { lights, walls });
    }

    /// Modulates every texel by a brightness in `[0.5, 1)` that holds steady
    /// along a wall and jumps on average once per `length` of wall.
    #[must_use]
    pub fn patterned(mut self, length: f32) -> Self {
        self.pattern = Some(length);
        self
    }

    /// Replaces every light's intensity with a draw from [`RANDOM_INTENSITY`].
    #[must_use]
    pub fn random_intensities(mut self) -> Self {
        self.random_intensities = true;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Builds the batch on `ctx.device`. Each wall becomes one line carrying
    /// `ceil(length / texel_size)` texels of its colour, at least one.
    ///
    /// # Errors
    ///
    /// Fails on a pattern length that is not positive, and propagates any
    /// shape or device failure from [`Scene::new`].
    pub fn build(&self, ctx: &Context, frame: Tensor<Vec3>) -> Result<Scene, SimError> {
        if let Some(length) = self.pattern {
            if !(length.is_finite() && length > 0.0) {
                return Err(SimError::InvalidConfig(format!("pattern length {length} must be positive")));
            }
        }
        let device = &ctx.device;
        let seed = ctx.config.seed;
        let texel_size = ctx.config.texel_size;

        let lights = RaggedBatch::from_groups(
            device,
            self.scenes
                .iter()
                .enumerate()
                .map(|(s, spec)| {
                    if !self.random_intensities {
                        return spec.lights.clone();
                    }
                    let rng = fastrand::Rng::with_seed(lane_seed(seed, LIGHT_STREAM, s));
                    spec.lights
                        .iter()
                        .map(|light| {
                            let span = RANDOM_INTENSITY.end - RANDOM_INTENSITY.start;
                            Light::new(light.position, RANDOM_INTENSITY.start + span * rng.f32())
                        })
                        .collect()
                })
                .collect(),
        )?;
        let lines = RaggedBatch::from_groups(
            device,
            self.scenes
                .iter()
                .map(|s| s.walls.iter().map(|w| w.line).collect())
                .collect(),
        )?;

        let mut strips = Vec::with_capacity(lines.rows());
        for (s, spec) in self.scenes.iter().enumerate() {
            let mut pattern = self
                .pattern
                .map(|length| Pattern::new(lane_seed(seed, PATTERN_STREAM, s), texel_size / length));
            for wall in &spec.walls {
                let texels = (wall.line.length() / texel_size).ceil().max(1.0) as usize;
                let strip: Vec<Texel> = (0..texels)
                    .map(|_| {
                        let brightness = pattern.as_mut().map_or(1.0, Pattern::brightness);
                        Texel {
                            color: brightness * wall.color,
                        }
                    })
                    .collect();
                strips.push(strip);
            }
        }
        let textures = RaggedBatch::from_groups(device, strips)?;

        Scene::new(device, lights, lines, textures, frame)
    }
}

/// Brightness walk over consecutive texels of a scene: each texel jumps with
/// probability `p` by a standard normal step, and the running total wraps
/// into `[0.5, 1)`.
struct Pattern {
    rng: fastrand::Rng,
    p: f32,
    total: f32,
}

impl Pattern {
    fn new(seed: u64, p: f32) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            p,
            total: 0.0,
        }
    }

    fn brightness(&mut self) -> f32 {
        if self.rng.f32() < self.p {
            self.total = (self.total + self.normal()).rem_euclid(1.0);
            if self.total >= 1.0 {
                self.total = 0.0;
            }
        }
        0.5 + 0.5 * self.total
    }

    /// Box-Muller.
    fn normal(&self) -> f32 {
        let u = 1.0 - self.rng.f32();
        let v = self.rng.f32();
        (-2.0 * u.ln()).sqrt() * (TAU * v).cos()
    }
}

/// Four walls enclosing the square `[-half_extent, half_extent]^2`, listed
/// counter-clockwise so every normal points into the room.
#[must_use]
pub fn boxed_room(half_extent: f32, color: Vec3) -> Vec<Wall> {
    let h = half_extent;
    let corners = [
        Vec2::new(-h, -h),
        Vec2::new(h, -h),
        Vec2::new(h, h),
        Vec2::new(-h, h),
    ];
    (0..4)
        .map(|i| Wall::new(corners[i], corners[(i + 1) % 4], color))
        .collect()
}

/// A background of `columns` identical columns.
#[must_use]
pub fn uniform_frame(device: &Device, columns: usize, color: Vec3) -> Tensor<Vec3> {
    Tensor::full(device, vec![columns], color)
}
