use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::context::Context;
use crate::drones::DroneState;
use crate::error::{ensure_device, SimError};
use crate::geometry::wrap_angle;
use crate::respawns::Respawns;
use crate::types::Drone;

/// Places every drone flagged in `reset` at a random point of one of its
/// scene's spawn volumes, at rest. Other drones are left as they are.
///
/// # Errors
///
/// Fails without touching any drone when `reset` does not have one flag per
/// drone, when `respawns` does not have one group per scene, or when a drone
/// to reset sits in a scene with no spawn volumes. `respawns` and `drones`
/// must both live on `ctx.device`.
pub fn respawn(ctx: &Context, reset: &[bool], respawns: &Respawns, drones: &mut DroneState) -> Result<(), SimError> {
    ensure_device(&ctx.device, respawns.device())?;
    ensure_device(&ctx.device, drones.device())?;
    if reset.len() != drones.len() {
        return Err(SimError::shape(format!(
            "{} reset flags for {} drones",
            reset.len(),
            drones.len()
        )));
    }
    if respawns.groups() != drones.n_scenes() {
        return Err(SimError::shape(format!(
            "{} spawn groups for {} scenes",
            respawns.groups(),
            drones.n_scenes()
        )));
    }
    let widths = respawns.widths();
    let stranded = (0..drones.len()).find(|&d| reset[d] && widths[drones.scene_of(d)] == 0);
    if let Some(d) = stranded {
        return Err(SimError::shape(format!(
            "drone {d} must respawn but scene {} has no spawn volumes",
            drones.scene_of(d)
        )));
    }

    let seed = ctx.config.seed;
    let epoch = drones.epoch();
    let per_scene = drones.drones_per_scene();
    let randomize = ctx.config.randomize_orientation;
    let starts = respawns.starts();
    tracing::debug!(
        lanes = drones.len(),
        resets = reset.iter().filter(|&&r| r).count(),
        epoch,
        "respawn"
    );

    ctx.device.update_lanes(drones.drones_mut(), |d, drone| {
        if !reset[d] {
            return;
        }
        let scene = d / per_scene;
        let rng = fastrand::Rng::with_seed(lane_seed(seed, epoch, d));
        let volume = respawns.volume(starts[scene] as usize + rng.usize(..widths[scene] as usize));

        let r = volume.radius * rng.f32().sqrt();
        let offset = r * Vec2::from_angle(TAU * rng.f32());
        let position = (volume.center + offset).clamp(volume.lower, volume.upper);
        let angle = if randomize {
            wrap_angle(-PI + TAU * rng.f32())
        } else {
            0.0
        };
        *drone = Drone::at(position, angle);
    });
    drones.advance_epoch();
    Ok(())
}

/// Independent stream per `(seed, epoch, lane)`.
pub(crate) fn lane_seed(seed: u64, epoch: u64, lane: usize) -> u64 {
    let mut z = seed;
    for word in [epoch, lane as u64] {
        z = splitmix64(z ^ word);
    }
    z
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_seeds_differ_across_lanes_and_epochs() {
        let a = lane_seed(7, 0, 0);
        assert_ne!(a, lane_seed(7, 0, 1));
        assert_ne!(a, lane_seed(7, 1, 0));
        assert_ne!(a, lane_seed(8, 0, 0));
        assert_eq!(a, lane_seed(7, 0, 0));
    }
}
