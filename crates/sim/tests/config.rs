use compute::Device;
use sim::{initialize, initialize_on, Occlusion, SimConfig, SimError};

#[test]
fn partial_json_falls_back_to_defaults() -> anyhow::Result<()> {
    let config: SimConfig = serde_json::from_str(r#"{ "resolution": 8, "occlusion": "walls", "seed": 3 }"#)?;
    assert_eq!(config.resolution, 8);
    assert_eq!(config.occlusion, Occlusion::Walls);
    assert_eq!(config.seed, 3);
    assert_eq!(config.dt, SimConfig::default().dt);
    assert!(config.randomize_orientation);
    Ok(())
}

#[test]
fn config_survives_a_json_round_trip() -> anyhow::Result<()> {
    let config = SimConfig {
        damping: 0.25,
        occlusion: Occlusion::Walls,
        ..SimConfig::default()
    };
    let back: SimConfig = serde_json::from_str(&serde_json::to_string(&config)?)?;
    assert_eq!(back, config);
    Ok(())
}

#[test]
fn initialize_rejects_invalid_config() {
    let config = SimConfig {
        dt: 0.0,
        ..SimConfig::default()
    };
    assert!(matches!(initialize(config), Err(SimError::InvalidConfig(_))));
}

#[test]
fn initialize_binds_the_requested_device() {
    let ctx = initialize_on(Device::cpu(), SimConfig::default()).unwrap();
    assert_eq!(ctx.device.id(), Device::cpu().id());
    assert_eq!(ctx.config, SimConfig::default());
}
