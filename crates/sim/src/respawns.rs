use std::sync::Arc;

use compute::{Device, DeviceId, Tensor};
use glam::Vec2;

use crate::error::SimError;
use crate::ragged::{Grouping, RaggedBatch};

/// A disc of candidate spawn points, clipped to an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnVolume {
    pub center: Vec2,
    pub radius: f32,
    pub lower: Vec2,
    pub upper: Vec2,
}

impl SpawnVolume {
    /// A disc with no box clipping.
    #[must_use]
    pub fn disc(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            lower: Vec2::NEG_INFINITY,
            upper: Vec2::INFINITY,
        }
    }

    #[must_use]
    pub fn clipped(self, lower: Vec2, upper: Vec2) -> Self {
        Self { lower, upper, ..self }
    }
}

/// Spawn volumes per scene, stored as four columns over one shared grouping.
#[derive(Debug, Clone)]
pub struct Respawns {
    centers: RaggedBatch<Vec2>,
    radii: RaggedBatch<f32>,
    lowers: RaggedBatch<Vec2>,
    uppers: RaggedBatch<Vec2>,
}

impl Respawns {
    /// Builds the four columns over a single grouping derived from `widths`.
    ///
    /// # Errors
    ///
    /// Fails on any device or row-count mismatch, a negative or non-finite
    /// radius, or a box whose lower corner exceeds its upper corner.
    pub fn new(
        device: &Device,
        centers: Tensor<Vec2>,
        radii: Tensor<f32>,
        lowers: Tensor<Vec2>,
        uppers: Tensor<Vec2>,
        widths: Tensor<u32>,
    ) -> Result<Self, SimError> {
        let grouping = Arc::new(Grouping::new(device, widths)?);
        let centers = RaggedBatch::with_grouping(device, centers, Arc::clone(&grouping))?;
        let radii = RaggedBatch::with_grouping(device, radii, Arc::clone(&grouping))?;
        let lowers = RaggedBatch::with_grouping(device, lowers, Arc::clone(&grouping))?;
        let uppers = RaggedBatch::with_grouping(device, uppers, grouping)?;

        if let Some(r) = radii.values().iter().find(|r| !(r.is_finite() && **r >= 0.0)) {
            return Err(SimError::shape(format!("spawn radius {r} must be finite and non-negative")));
        }
        let inverted = lowers
            .values()
            .iter()
            .zip(uppers.values())
            .position(|(lo, hi)| lo.cmpgt(*hi).any());
        if let Some(i) = inverted {
            return Err(SimError::shape(format!("spawn volume {i} has lower bound above upper bound")));
        }
        Ok(Self { centers, radii, lowers, uppers })
    }

    /// One group per scene, one volume per element.
    ///
    /// # Errors
    ///
    /// Same as [`Respawns::new`].
    pub fn from_volumes(device: &Device, scenes: &[Vec<SpawnVolume>]) -> Result<Self, SimError> {
        let widths = scenes
            .iter()
            .map(|s| u32::try_from(s.len()))
            .collect::<Result<Vec<u32>, _>>()
            .map_err(|_| SimError::shape("too many spawn volumes in one scene"))?;
        let volumes = || scenes.iter().flatten();
        Self::new(
            device,
            Tensor::vector(device, volumes().map(|v| v.center).collect()),
            Tensor::vector(device, volumes().map(|v| v.radius).collect()),
            Tensor::vector(device, volumes().map(|v| v.lower).collect()),
            Tensor::vector(device, volumes().map(|v| v.upper).collect()),
            Tensor::vector(device, widths),
        )
    }

    /// Number of scenes.
    #[must_use]
    pub fn groups(&self) -> usize {
        self.centers.groups()
    }

    #[must_use]
    pub fn widths(&self) -> &[u32] {
        self.centers.widths()
    }

    #[must_use]
    pub fn starts(&self) -> &[u32] {
        self.centers.starts()
    }

    /// Volume at flat index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is past the last volume.
    #[must_use]
    pub fn volume(&self, i: usize) -> SpawnVolume {
        SpawnVolume {
            center: self.centers.values()[i],
            radius: self.radii.values()[i],
            lower: self.lowers.values()[i],
            upper: self.uppers.values()[i],
        }
    }

    #[must_use]
    pub fn centers(&self) -> &RaggedBatch<Vec2> {
        &self.centers
    }

    #[must_use]
    pub fn radii(&self) -> &RaggedBatch<f32> {
        &self.radii
    }

    #[must_use]
    pub fn lowers(&self) -> &RaggedBatch<Vec2> {
        &self.lowers
    }

    #[must_use]
    pub fn uppers(&self) -> &RaggedBatch<Vec2> {
        &self.uppers
    }

    #[must_use]
    pub fn device(&self) -> DeviceId {
        self.centers.device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_share_one_grouping() {
        let device = Device::cpu();
        let respawns = Respawns::from_volumes(
            &device,
            &[
                vec![SpawnVolume::disc(Vec2::ZERO, 1.0)],
                vec![],
                vec![SpawnVolume::disc(Vec2::ONE, 0.5), SpawnVolume::disc(Vec2::X, 0.0)],
            ],
        )
        .unwrap();

        assert_eq!(respawns.groups(), 3);
        assert_eq!(respawns.widths(), &[1, 0, 2]);
        assert!(respawns.centers().shares_grouping(respawns.radii()));
        assert!(respawns.lowers().shares_grouping(respawns.uppers()));
        assert_eq!(respawns.volume(2).center, Vec2::X);
    }

    #[test]
    fn inverted_box_is_rejected() {
        let device = Device::cpu();
        let bad = SpawnVolume::disc(Vec2::ZERO, 1.0).clipped(Vec2::ONE, Vec2::ZERO);
        assert!(matches!(
            Respawns::from_volumes(&device, &[vec![bad]]),
            Err(SimError::Shape(_))
        ));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let device = Device::cpu();
        let bad = SpawnVolume::disc(Vec2::ZERO, -1.0);
        assert!(Respawns::from_volumes(&device, &[vec![bad]]).is_err());
    }
}
