//! # Devices and lane launch
//!
//! A [`Device`] is the explicit compute target every tensor is created on.
//! It owns the backend that runs dense kernels and launches per-lane work.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{default_backend, ComputeBackend, ComputeError, CpuBackend, Tensor};

const WORKGROUP_SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone)]
pub struct Device {
    id: DeviceId,
    backend: Arc<dyn ComputeBackend>,
}

impl Device {
    #[must_use]
    pub fn new(id: DeviceId, backend: Arc<dyn ComputeBackend>) -> Self {
        Self { id, backend }
    }

    /// Device `#0` backed by [`CpuBackend`].
    #[must_use]
    pub fn cpu() -> Self {
        Self::new(DeviceId(0), Arc::new(CpuBackend::new()))
    }

    /// Device with the given id backed by [`default_backend`].
    #[must_use]
    pub fn with_default_backend(id: DeviceId) -> Self {
        Self::new(id, default_backend())
    }

    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    #[must_use]
    pub fn backend(&self) -> &dyn ComputeBackend {
        self.backend.as_ref()
    }

    /// Fails unless `tensor` was created on this device.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::DeviceMismatch`] naming both devices.
    pub fn check<T: bytemuck::Pod>(&self, tensor: &Tensor<T>) -> Result<(), ComputeError> {
        if tensor.device() == self.id {
            Ok(())
        } else {
            Err(ComputeError::DeviceMismatch {
                expected: self.id,
                found: tensor.device(),
            })
        }
    }

    /// Runs `kernel(i)` for every lane `i in 0..lanes` and collects the results
    /// in lane order.
    pub fn map_lanes<T, F>(&self, lanes: usize, kernel: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            (0..lanes).into_par_iter().map(kernel).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..lanes).map(kernel).collect()
        }
    }

    /// Runs `kernel(i, &mut items[i])` for every lane. Each lane owns exactly
    /// one slot, so lanes never observe each other's writes.
    pub fn update_lanes<T, F>(&self, items: &mut [T], kernel: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            items
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, item)| kernel(i, item));
        }
        #[cfg(not(feature = "parallel"))]
        {
            items
                .iter_mut()
                .enumerate()
                .for_each(|(i, item)| kernel(i, item));
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Calculate number of workgroups for a dispatch over `num_elements`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn calculate_workgroups(num_elements: usize) -> u32 {
    (num_elements as u32).div_ceil(WORKGROUP_SIZE).max(1)
}
