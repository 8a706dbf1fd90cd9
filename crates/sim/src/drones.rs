use compute::{Device, DeviceId, Tensor};

use crate::error::SimError;
use crate::types::{Command, Drone};

/// Every drone of the run, `drones_per_scene` per scene, scene-major.
#[derive(Debug, Clone)]
pub struct DroneState {
    drones: Tensor<Drone>,
    epoch: u64,
}

impl DroneState {
    /// `n_scenes * drones_per_scene` drones at the origin, facing `+x`.
    #[must_use]
    pub fn new(device: &Device, n_scenes: usize, drones_per_scene: usize) -> Self {
        Self {
            drones: Tensor::zeros(device, vec![n_scenes, drones_per_scene]),
            epoch: 0,
        }
    }

    /// # Errors
    ///
    /// Fails unless `drones` is a `[n_scenes, drones_per_scene]` tensor on
    /// `device`.
    pub fn from_drones(device: &Device, drones: Tensor<Drone>) -> Result<Self, SimError> {
        device.check(&drones)?;
        if drones.rank() != 2 {
            return Err(SimError::shape(format!(
                "drones must be [n_scenes, drones_per_scene], got {:?}",
                drones.shape()
            )));
        }
        Ok(Self { drones, epoch: 0 })
    }

    /// Total drone count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    #[must_use]
    pub fn n_scenes(&self) -> usize {
        self.drones.shape()[0]
    }

    #[must_use]
    pub fn drones_per_scene(&self) -> usize {
        self.drones.shape()[1]
    }

    /// Scene of flat drone `d`.
    #[must_use]
    pub fn scene_of(&self, d: usize) -> usize {
        d / self.drones_per_scene()
    }

    #[must_use]
    pub fn drones(&self) -> &[Drone] {
        self.drones.as_slice()
    }

    pub fn drones_mut(&mut self) -> &mut [Drone] {
        self.drones.as_mut_slice()
    }

    /// Number of completed respawn calls.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn advance_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    #[must_use]
    pub fn device(&self) -> DeviceId {
        self.drones.device()
    }
}

/// One [`Command`] per drone, in drone order.
#[derive(Debug, Clone)]
pub struct Movement {
    commands: Tensor<Command>,
}

impl Movement {
    /// # Errors
    ///
    /// Fails when `commands` is on another device or not one-dimensional.
    pub fn new(device: &Device, commands: Tensor<Command>) -> Result<Self, SimError> {
        device.check(&commands)?;
        if commands.rank() != 1 {
            return Err(SimError::shape("movement must hold one command per drone"));
        }
        Ok(Self { commands })
    }

    /// All-zero commands for `n_drones` drones.
    #[must_use]
    pub fn idle(device: &Device, n_drones: usize) -> Self {
        Self {
            commands: Tensor::zeros(device, vec![n_drones]),
        }
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        self.commands.as_slice()
    }

    pub fn commands_mut(&mut self) -> &mut [Command] {
        self.commands.as_mut_slice()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[must_use]
    pub fn device(&self) -> DeviceId {
        self.commands.device()
    }
}
