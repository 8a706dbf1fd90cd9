use compute::Device;
use glam::{Vec2, Vec3};
use sim::{
    boxed_room, initialize_on, painted, palette_color, uniform_frame, Context, Light, Scene, SceneBuilder, SimConfig,
    SimError,
};

fn context(seed: u64) -> Context {
    let config = SimConfig {
        seed,
        texel_size: 0.25,
        ..SimConfig::default()
    };
    initialize_on(Device::cpu(), config).unwrap()
}

fn rooms() -> SceneBuilder {
    let lights = vec![Light::new(Vec2::ZERO, 5.0), Light::new(Vec2::ONE, 5.0)];
    let walls = || painted(boxed_room(2.0, Vec3::ONE).into_iter().map(|w| w.line));
    SceneBuilder::new()
        .scene(lights.clone(), walls())
        .scene(lights, walls())
}

fn build(ctx: &Context, builder: &SceneBuilder) -> Scene {
    builder.build(ctx, uniform_frame(&ctx.device, 4, Vec3::ZERO)).unwrap()
}

#[test]
fn random_intensities_fall_in_range_and_follow_the_seed() {
    let builder = rooms().random_intensities();
    let a = build(&context(3), &builder);
    let b = build(&context(3), &builder);
    let c = build(&context(4), &builder);

    let intensities = |scene: &Scene| scene.lights().values().iter().map(|l| l.intensity).collect::<Vec<_>>();
    assert!(intensities(&a).iter().all(|i| (0.1..=1.0).contains(i)), "{:?}", intensities(&a));
    assert_eq!(intensities(&a), intensities(&b));
    assert_ne!(intensities(&a), intensities(&c));
    assert_eq!(a.lights().values()[3].position, Vec2::ONE);
}

#[test]
fn patterned_walls_darken_their_palette_colour() {
    let builder = rooms().patterned(0.5);
    let scene = build(&context(7), &builder);
    let again = build(&context(7), &builder);
    assert_eq!(scene.textures().values(), again.textures().values());

    let mut varied = false;
    for l in 0..scene.lines().rows() {
        let base = palette_color(l % 4);
        let strip = scene.textures().group(l);
        for texel in strip {
            let scale = texel.color.x / base.x;
            assert!((0.5..=1.0).contains(&scale), "{scale}");
            assert!((texel.color - scale * base).length() < 1e-5);
        }
        varied |= strip.windows(2).any(|w| w[0] != w[1]);
    }
    assert!(varied);
}

#[test]
fn unpatterned_walls_keep_their_colour() {
    let scene = build(&context(7), &rooms());
    for (l, strip) in (0..8).map(|l| (l, scene.textures().group(l))) {
        assert!(strip.iter().all(|t| t.color == palette_color(l % 4)));
    }
    assert_eq!(scene.lights().values()[0].intensity, 5.0);
}

#[test]
fn pattern_length_must_be_positive() {
    let ctx = context(0);
    let result = rooms().patterned(0.0).build(&ctx, uniform_frame(&ctx.device, 4, Vec3::ZERO));
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));
}
