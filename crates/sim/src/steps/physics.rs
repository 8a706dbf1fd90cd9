use glam::Vec2;

use crate::config::SimConfig;
use crate::context::Context;
use crate::drones::{DroneState, Movement};
use crate::error::{ensure_device, SimError};
use crate::geometry::{move_crosses, point_segment_distance, wrap_angle};
use crate::scene::{Bounds, Scene};
use crate::types::{Command, Drone, Line};

/// Advances every drone by one tick of `ctx.config.dt`.
///
/// Commands push momentum in the drone's own frame, momentum decays by
/// `damping`, and walls absorb the momentum component normal to them. A
/// drone inside its scene's bounds cannot leave them: axes along which the
/// move would exit lose their momentum. Drones outside the bounds move freely.
///
/// # Errors
///
/// Fails without moving anything when `movement` does not hold one command
/// per drone, when the scene count differs from the drones' scene count, or
/// when any operand lives on a device other than `ctx.device`.
pub fn physics(ctx: &Context, movement: &Movement, scene: &Scene, drones: &mut DroneState) -> Result<(), SimError> {
    for id in [movement.device(), scene.device(), drones.device()] {
        ensure_device(&ctx.device, id)?;
    }
    if movement.len() != drones.len() {
        return Err(SimError::shape(format!(
            "{} commands for {} drones",
            movement.len(),
            drones.len()
        )));
    }
    if scene.n_scenes() != drones.n_scenes() {
        return Err(SimError::shape(format!(
            "scene batch holds {} scenes, drones span {}",
            scene.n_scenes(),
            drones.n_scenes()
        )));
    }
    tracing::debug!(lanes = drones.len(), "physics");

    let config = &ctx.config;
    let commands = movement.commands();
    let per_scene = drones.drones_per_scene();
    ctx.device.update_lanes(drones.drones_mut(), |d, drone| {
        let s = d / per_scene;
        step_drone(config, commands[d], scene.lines().group(s), scene.bounds(s), drone);
    });
    Ok(())
}

fn step_drone(config: &SimConfig, command: Command, lines: &[Line], bounds: Option<Bounds>, drone: &mut Drone) {
    let command = command.clamped(config.max_command);
    let forward = drone.forward();
    let left = forward.perp();

    let push = config.accel * (command.mesial as f32 * forward + command.lateral as f32 * left);
    drone.momentum = config.damping * drone.momentum + push;
    drone.angmomentum = config.damping * drone.angmomentum + config.yaw_accel * command.yaw as f32;
    drone.angle = wrap_angle(drone.angle + drone.angmomentum * config.dt);

    let start = drone.position;
    let radius = config.drone_radius;
    let mut momentum = drone.momentum;
    let mut end = start + momentum * config.dt;
    for line in lines {
        if contacts(start, end, line, radius) {
            let normal = line.normal();
            momentum -= momentum.dot(normal) * normal;
            end = start + momentum * config.dt;
        }
    }
    if lines.iter().any(|line| contacts(start, end, line, radius)) {
        end = start;
        momentum = Vec2::ZERO;
    }

    if let Some(bounds) = bounds.filter(|b| b.contains(start)) {
        let leaving = end.cmplt(bounds.min) | end.cmpgt(bounds.max);
        if leaving.any() {
            momentum = Vec2::select(leaving, Vec2::ZERO, momentum);
            end = start + momentum * config.dt;
            if lines.iter().any(|line| contacts(start, end, line, radius)) {
                end = start;
                momentum = Vec2::ZERO;
            }
        }
    }

    drone.position = end;
    drone.momentum = momentum;
}

/// Whether the move `start -> end` hits `line` or ends closer to it than
/// `radius` while approaching.
fn contacts(start: Vec2, end: Vec2, line: &Line, radius: f32) -> bool {
    if move_crosses(start, end, line) {
        return true;
    }
    if radius <= 0.0 || start == end {
        return false;
    }
    let after = point_segment_distance(end, line);
    after < radius && after < point_segment_distance(start, line)
}
