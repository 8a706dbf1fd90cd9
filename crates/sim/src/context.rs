use compute::{Device, DeviceId};

use crate::config::SimConfig;
use crate::error::SimError;

/// Everything a stage needs besides its data: the compute device and the
/// validated configuration. Passed explicitly to every stage.
#[derive(Debug, Clone)]
pub struct Context {
    pub device: Device,
    pub config: SimConfig,
}

/// Validates `config` and binds it to device `#0` on the default backend.
///
/// # Errors
///
/// Returns [`SimError::InvalidConfig`] when validation fails.
pub fn initialize(config: SimConfig) -> Result<Context, SimError> {
    initialize_on(Device::with_default_backend(DeviceId(0)), config)
}

/// Like [`initialize`], on a caller-chosen device.
///
/// # Errors
///
/// Returns [`SimError::InvalidConfig`] when validation fails.
pub fn initialize_on(device: Device, config: SimConfig) -> Result<Context, SimError> {
    config.validate()?;
    tracing::info!(
        device = %device.id(),
        resolution = config.resolution,
        dt = config.dt,
        occlusion = ?config.occlusion,
        "Initialized simulation context."
    );
    Ok(Context { device, config })
}
