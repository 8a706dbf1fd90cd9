use compute::Device;
use glam::{Vec2, Vec3};
use sim::{
    bake, initialize_on, render, uniform_frame, Context, DroneState, Light, Occlusion, RaggedBatch, Scene,
    SceneBuilder, SimConfig, SimError, Wall,
};

fn context(occlusion: Occlusion) -> Context {
    let config = SimConfig {
        occlusion,
        texel_size: 1.0,
        ..SimConfig::default()
    };
    initialize_on(Device::cpu(), config).unwrap()
}

/// A two-texel floor from (-1, 0) to (1, 0) under a light, with an optional
/// shelf at y = 0.5 listed before it.
fn floor_scene(ctx: &Context, with_shelf: bool) -> Scene {
    let floor = Wall::new(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0), Vec3::ONE);
    let shelf = Wall::new(Vec2::new(-2.0, 0.5), Vec2::new(2.0, 0.5), Vec3::ONE);
    let walls = if with_shelf { vec![shelf, floor] } else { vec![floor] };
    SceneBuilder::new()
        .scene(vec![Light::new(Vec2::new(0.5, 1.0), 2.0)], walls)
        .build(ctx, uniform_frame(&ctx.device, 4, Vec3::ZERO))
        .unwrap()
}

fn floor_values(scene: &Scene) -> Vec<f32> {
    let baked = scene.baked().values().unwrap();
    let floor = scene.lines().rows() - 1;
    let start = scene.textures().starts()[floor] as usize;
    baked.values()[start..start + 2].to_vec()
}

#[test]
fn texels_follow_inverse_square_falloff() {
    let ctx = context(Occlusion::None);
    let mut scene = floor_scene(&ctx, false);
    bake(&ctx, &mut scene, 0).unwrap();

    let values = floor_values(&scene);
    // Texel centres sit at x = -0.5 and x = 0.5.
    assert!((values[0] - 2.0 / 3.0).abs() < 1e-6, "{values:?}");
    assert!((values[1] - 1.0).abs() < 1e-6, "{values:?}");
    assert!(scene.baked().is_fresh());
}

#[test]
fn baking_twice_is_bit_identical() {
    let ctx = context(Occlusion::Walls);
    let mut scene = floor_scene(&ctx, true);
    bake(&ctx, &mut scene, 0).unwrap();
    let first: Vec<u32> = scene.baked().current().values().iter().map(|v| v.to_bits()).collect();
    bake(&ctx, &mut scene, 0).unwrap();
    let second: Vec<u32> = scene.baked().current().values().iter().map(|v| v.to_bits()).collect();

    assert_eq!(first, second);
    assert_eq!(scene.baked().generation(), 2);
}

#[test]
fn walls_cast_shadows_only_when_occlusion_is_on() {
    let open = context(Occlusion::None);
    let mut lit = floor_scene(&open, true);
    bake(&open, &mut lit, 0).unwrap();
    assert!(floor_values(&lit).iter().all(|&v| v > 0.0));

    let shaded = context(Occlusion::Walls);
    let mut dark = floor_scene(&shaded, true);
    bake(&shaded, &mut dark, 0).unwrap();
    assert_eq!(floor_values(&dark), vec![0.0, 0.0]);

    // The shelf's own texels still see the light.
    assert!(dark.baked().current().group(0).iter().all(|&v| v > 0.0));
}

#[test]
fn dynamic_lines_cast_no_baked_shadows() {
    let ctx = context(Occlusion::Walls);
    let mut scene = floor_scene(&ctx, true);
    bake(&ctx, &mut scene, 1).unwrap();

    let mut reference = floor_scene(&ctx, false);
    bake(&ctx, &mut reference, 0).unwrap();
    assert_eq!(floor_values(&scene), floor_values(&reference));
}

#[test]
fn render_requires_a_fresh_bake() {
    let ctx = context(Occlusion::None);
    let mut scene = floor_scene(&ctx, false);
    let drones = DroneState::new(&ctx.device, 1, 1);

    assert!(matches!(render(&ctx, &drones, &scene), Err(SimError::NotBaked)));

    bake(&ctx, &mut scene, 0).unwrap();
    assert!(render(&ctx, &drones, &scene).is_ok());

    let dimmer = RaggedBatch::from_groups(&ctx.device, vec![vec![Light::new(Vec2::ZERO, 0.5)]]).unwrap();
    scene.set_lights(&ctx.device, dimmer).unwrap();
    assert!(matches!(render(&ctx, &drones, &scene), Err(SimError::NotBaked)));
}
