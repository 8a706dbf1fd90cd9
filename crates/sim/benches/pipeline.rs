use criterion::{criterion_group, criterion_main, Criterion};
use glam::{Vec2, Vec3};
use sim::{
    bake, boxed_room, initialize, physics, render, respawn, uniform_frame, DroneState, Light, Movement, Respawns,
    SceneBuilder, SimConfig, SpawnVolume,
};

const SCENES: usize = 64;
const PER_SCENE: usize = 4;

fn pipeline(c: &mut Criterion) {
    let ctx = initialize(SimConfig::default()).expect("valid default config");
    let mut builder = SceneBuilder::new();
    for s in 0..SCENES {
        let half = 2.0 + (s % 5) as f32;
        builder.push_scene(vec![Light::new(Vec2::ZERO, 1.0)], boxed_room(half, Vec3::ONE));
    }
    let mut scene = builder
        .build(&ctx, uniform_frame(&ctx.device, 64, Vec3::splat(0.1)))
        .expect("scene builds");
    let respawns = Respawns::from_volumes(&ctx.device, &vec![vec![SpawnVolume::disc(Vec2::ZERO, 1.0)]; SCENES])
        .expect("respawns build");
    let mut drones = DroneState::new(&ctx.device, SCENES, PER_SCENE);
    respawn(&ctx, &[true; SCENES * PER_SCENE], &respawns, &mut drones).expect("respawn");
    bake(&ctx, &mut scene, 0).expect("bake");

    c.bench_function("bake", |b| b.iter(|| bake(&ctx, &mut scene, 0)));
    let movement = Movement::idle(&ctx.device, SCENES * PER_SCENE);
    c.bench_function("physics", |b| b.iter(|| physics(&ctx, &movement, &scene, &mut drones)));
    c.bench_function("render", |b| b.iter(|| render(&ctx, &drones, &scene)));
}

criterion_group!(benches, pipeline);
criterion_main!(benches);
