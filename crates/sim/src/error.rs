use compute::{ComputeError, Device, DeviceId};
use thiserror::Error;

/// Contract violations raised by the simulation core.
///
/// None of these are retryable: each one means a caller handed the core data
/// that breaks a shape, placement or ordering rule.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("shape violation: {0}")]
    Shape(String),
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error("baked lighting is stale; run bake before render")]
    NotBaked,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }
}

/// Fails unless data tagged with `found` belongs to `device`.
pub(crate) fn ensure_device(device: &Device, found: DeviceId) -> Result<(), SimError> {
    if found == device.id() {
        Ok(())
    } else {
        Err(ComputeError::DeviceMismatch {
            expected: device.id(),
            found,
        }
        .into())
    }
}
