//! # Scenes
//!
//! A [`Scene`] batches every scene of the run: lights and walls grouped per
//! scene, texel strips grouped per wall, a panoramic background shared by all
//! scenes, and the [`BakedLighting`] cache over the texels.
//!
//! Two ragged levels link texels to scenes: texel `k` lies on line
//! `textures.inverse[k]`, which belongs to scene `lines.inverse[l]`.

use compute::{Device, DeviceId, Tensor};
use glam::{Vec2, Vec3};

use crate::error::{ensure_device, SimError};
use crate::ragged::RaggedBatch;
use crate::types::{Light, Line, Texel};

/// Axis-aligned box around a scene's wall endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    fn around(lines: &[Line]) -> Option<Self> {
        let first = lines.first()?;
        let (min, max) = lines.iter().fold((first.a, first.a), |(min, max), l| {
            (min.min(l.a).min(l.b), max.max(l.a).max(l.b))
        });
        Some(Self { min, max })
    }

    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Per-texel light levels computed by `bake`.
///
/// Starts out stale with every texel at `1.0`. Reading requires a fresh cache;
/// a bake makes it fresh and a lighting change makes it stale again.
#[derive(Debug, Clone)]
pub struct BakedLighting {
    values: RaggedBatch<f32>,
    fresh: bool,
    generation: u64,
}

impl BakedLighting {
    fn neutral(device: &Device, textures: &RaggedBatch<Texel>) -> Result<Self, SimError> {
        let values = textures.with_values(device, Tensor::ones(device, vec![textures.rows()]))?;
        Ok(Self {
            values,
            fresh: false,
            generation: 0,
        })
    }

    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Number of completed bakes.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The cached values, grouped like the textures.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotBaked`] while the cache is stale.
    pub fn values(&self) -> Result<&RaggedBatch<f32>, SimError> {
        if self.fresh {
            Ok(&self.values)
        } else {
            Err(SimError::NotBaked)
        }
    }

    /// The cached values regardless of freshness.
    #[must_use]
    pub fn current(&self) -> &RaggedBatch<f32> {
        &self.values
    }

    pub(crate) fn store(&mut self, baked: &[f32]) {
        self.values.values_mut().copy_from_slice(baked);
        self.fresh = true;
        self.generation += 1;
    }

    pub(crate) fn invalidate(&mut self) {
        self.fresh = false;
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    lights: RaggedBatch<Light>,
    lines: RaggedBatch<Line>,
    textures: RaggedBatch<Texel>,
    frame: Tensor<Vec3>,
    bounds: Vec<Option<Bounds>>,
    baked: BakedLighting,
}

impl Scene {
    /// Assembles a scene batch and derives per-scene bounds.
    ///
    /// # Errors
    ///
    /// Fails when lights and lines disagree on the scene count, when textures
    /// do not have exactly one group per line, when `frame` is not a
    /// non-empty column strip, or on any device mismatch.
    pub fn new(
        device: &Device,
        lights: RaggedBatch<Light>,
        lines: RaggedBatch<Line>,
        textures: RaggedBatch<Texel>,
        frame: Tensor<Vec3>,
    ) -> Result<Self, SimError> {
        for id in [lights.device(), lines.device(), textures.device()] {
            ensure_device(device, id)?;
        }
        device.check(&frame)?;
        if lights.groups() != lines.groups() {
            return Err(SimError::shape(format!(
                "{} light groups but {} line groups",
                lights.groups(),
                lines.groups()
            )));
        }
        if textures.groups() != lines.rows() {
            return Err(SimError::shape(format!(
                "{} texture groups but {} lines",
                textures.groups(),
                lines.rows()
            )));
        }
        if frame.rank() != 1 || frame.is_empty() {
            return Err(SimError::shape("background frame must be a non-empty strip of columns"));
        }

        let bounds = device.map_lanes(lines.groups(), |s| Bounds::around(lines.group(s)));
        let unbounded = bounds.iter().filter(|b| b.is_none()).count();
        if unbounded > 0 {
            tracing::warn!(scenes = unbounded, "Scenes without lines have no bounds.");
        }
        let bare = textures.widths().iter().filter(|&&w| w == 0).count();
        if bare > 0 {
            tracing::warn!(lines = bare, "Lines without texels render black.");
        }

        let baked = BakedLighting::neutral(device, &textures)?;
        tracing::info!(
            scenes = lines.groups(),
            lights = lights.rows(),
            lines = lines.rows(),
            texels = textures.rows(),
            "Built scene batch."
        );
        Ok(Self {
            lights,
            lines,
            textures,
            frame,
            bounds,
            baked,
        })
    }

    /// Number of scenes.
    #[must_use]
    pub fn n_scenes(&self) -> usize {
        self.lines.groups()
    }

    #[must_use]
    pub fn lights(&self) -> &RaggedBatch<Light> {
        &self.lights
    }

    /// Replaces the lights and marks the baked cache stale.
    ///
    /// # Errors
    ///
    /// Fails when `lights` has a different scene count or lives elsewhere.
    pub fn set_lights(&mut self, device: &Device, lights: RaggedBatch<Light>) -> Result<(), SimError> {
        ensure_device(device, lights.device())?;
        if lights.groups() != self.n_scenes() {
            return Err(SimError::shape(format!(
                "{} light groups for {} scenes",
                lights.groups(),
                self.n_scenes()
            )));
        }
        self.lights = lights;
        self.baked.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn lines(&self) -> &RaggedBatch<Line> {
        &self.lines
    }

    #[must_use]
    pub fn textures(&self) -> &RaggedBatch<Texel> {
        &self.textures
    }

    #[must_use]
    pub fn frame(&self) -> &Tensor<Vec3> {
        &self.frame
    }

    /// Bounds of scene `s`, `None` for a scene without lines.
    #[must_use]
    pub fn bounds(&self, s: usize) -> Option<Bounds> {
        self.bounds.get(s).copied().flatten()
    }

    #[must_use]
    pub fn baked(&self) -> &BakedLighting {
        &self.baked
    }

    pub(crate) fn baked_mut(&mut self) -> &mut BakedLighting {
        &mut self.baked
    }

    #[must_use]
    pub fn device(&self) -> DeviceId {
        self.lines.device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(device: &Device) -> (RaggedBatch<Light>, RaggedBatch<Line>, RaggedBatch<Texel>) {
        let lines = vec![
            Line::new(Vec2::new(-1.0, -2.0), Vec2::new(3.0, -2.0)),
            Line::new(Vec2::new(3.0, -2.0), Vec2::new(3.0, 1.0)),
        ];
        let lights = RaggedBatch::from_groups(device, vec![vec![Light::new(Vec2::ZERO, 1.0)], vec![]]).unwrap();
        let lines = RaggedBatch::from_groups(device, vec![lines, vec![]]).unwrap();
        let texel = Texel { color: Vec3::ONE };
        let textures = RaggedBatch::from_groups(device, vec![vec![texel; 2], vec![texel]]).unwrap();
        (lights, lines, textures)
    }

    #[test]
    fn bounds_cover_line_endpoints() {
        let device = Device::cpu();
        let (lights, lines, textures) = square(&device);
        let frame = Tensor::vector(&device, vec![Vec3::ZERO]);
        let scene = Scene::new(&device, lights, lines, textures, frame).unwrap();

        let bounds = scene.bounds(0).unwrap();
        assert_eq!(bounds.min, Vec2::new(-1.0, -2.0));
        assert_eq!(bounds.max, Vec2::new(3.0, 1.0));
        assert!(scene.bounds(1).is_none());
    }

    #[test]
    fn cache_starts_stale_and_neutral() {
        let device = Device::cpu();
        let (lights, lines, textures) = square(&device);
        let frame = Tensor::vector(&device, vec![Vec3::ZERO]);
        let scene = Scene::new(&device, lights, lines, textures, frame).unwrap();

        assert!(!scene.baked().is_fresh());
        assert!(matches!(scene.baked().values(), Err(SimError::NotBaked)));
        assert!(scene.baked().current().values().iter().all(|&v| v == 1.0));
        assert!(scene.baked().current().shares_grouping(scene.textures()));
    }

    #[test]
    fn one_texture_group_per_line_is_required() {
        let device = Device::cpu();
        let (lights, lines, _) = square(&device);
        let textures = RaggedBatch::from_groups(&device, vec![vec![Texel::default()]]).unwrap();
        let frame = Tensor::vector(&device, vec![Vec3::ZERO]);
        assert!(matches!(
            Scene::new(&device, lights, lines, textures, frame),
            Err(SimError::Shape(_))
        ));
    }

    #[test]
    fn replacing_lights_makes_the_cache_stale() {
        let device = Device::cpu();
        let (lights, lines, textures) = square(&device);
        let frame = Tensor::vector(&device, vec![Vec3::ZERO]);
        let mut scene = Scene::new(&device, lights.clone(), lines, textures, frame).unwrap();
        scene.baked_mut().store(&[0.5; 3]);
        assert!(scene.baked().is_fresh());

        scene.set_lights(&device, lights).unwrap();
        assert!(!scene.baked().is_fresh());
        assert_eq!(scene.baked().generation(), 1);
    }
}
