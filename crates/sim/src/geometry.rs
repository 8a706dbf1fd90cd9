//! Planar intersection and distance queries shared by the stages.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::types::Line;

const EPSILON: f32 = 1e-6;

/// Solves `origin + s * dir == line.a + t * line.edge()`.
///
/// Returns `(s, t)` when the two are not parallel; `s` is measured in units of
/// `dir`, `t` along the segment with `0` at `a` and `1` at `b`. The caller
/// decides which ranges count as a hit.
#[must_use]
pub fn ray_line(origin: Vec2, dir: Vec2, line: &Line) -> Option<(f32, f32)> {
    let edge = line.edge();
    let denom = dir.perp_dot(edge);
    if denom.abs() <= EPSILON * dir.length() * edge.length() {
        return None;
    }
    let w = line.a - origin;
    Some((w.perp_dot(edge) / denom, w.perp_dot(dir) / denom))
}

/// Distance along a unit `dir` to the segment, if the ray meets it ahead of
/// `origin`.
#[must_use]
pub fn ray_segment(origin: Vec2, dir: Vec2, line: &Line) -> Option<(f32, f32)> {
    let (s, t) = ray_line(origin, dir, line)?;
    (s > 0.0 && (0.0..=1.0).contains(&t)).then_some((s, t))
}

/// Whether the move `p -> q` reaches or passes through the segment.
/// Touching at `p` itself does not count, so a body resting on a wall can
/// still leave it.
#[must_use]
pub fn move_crosses(p: Vec2, q: Vec2, line: &Line) -> bool {
    match ray_line(p, q - p, line) {
        Some((s, t)) => s > EPSILON && s <= 1.0 && (0.0..=1.0).contains(&t),
        None => false,
    }
}

/// Whether the open segment `p -> q` crosses the interior of `line`. Shared
/// endpoints and grazing contacts are not crossings.
#[must_use]
pub fn properly_crosses(p: Vec2, q: Vec2, line: &Line) -> bool {
    match ray_line(p, q - p, line) {
        Some((s, t)) => s > EPSILON && s < 1.0 - EPSILON && t > EPSILON && t < 1.0 - EPSILON,
        None => false,
    }
}

#[must_use]
pub fn point_segment_distance(p: Vec2, line: &Line) -> f32 {
    let edge = line.edge();
    let len2 = edge.length_squared();
    if len2 == 0.0 {
        return p.distance(line.a);
    }
    let t = ((p - line.a).dot(edge) / len2).clamp(0.0, 1.0);
    p.distance(line.point_at(t))
}

/// Maps any finite angle into `[-π, π)`. Angles already in range come back
/// bit-for-bit unchanged.
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    if (-PI..PI).contains(&angle) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped >= PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Line {
        Line::new(Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0))
    }

    #[test]
    fn ray_hits_segment_ahead() {
        let (s, t) = ray_segment(Vec2::ZERO, Vec2::X, &wall()).unwrap();
        assert!((s - 1.0).abs() < 1e-6);
        assert!((t - 0.5).abs() < 1e-6);
        assert!(ray_segment(Vec2::ZERO, -Vec2::X, &wall()).is_none());
        assert!(ray_segment(Vec2::ZERO, Vec2::Y, &wall()).is_none());
    }

    #[test]
    fn move_must_reach_the_wall() {
        assert!(move_crosses(Vec2::ZERO, Vec2::new(2.0, 0.0), &wall()));
        assert!(!move_crosses(Vec2::ZERO, Vec2::new(0.5, 0.0), &wall()));
        assert!(!move_crosses(Vec2::ZERO, Vec2::ZERO, &wall()));
    }

    #[test]
    fn proper_crossing_excludes_endpoints() {
        assert!(properly_crosses(Vec2::ZERO, Vec2::new(2.0, 0.0), &wall()));
        assert!(!properly_crosses(Vec2::ZERO, Vec2::new(1.0, 0.0), &wall()));
        assert!(!properly_crosses(Vec2::ZERO, Vec2::new(2.0, 2.0), &wall()));
    }

    #[test]
    fn distance_to_segment_clamps_to_endpoints() {
        assert!((point_segment_distance(Vec2::ZERO, &wall()) - 1.0).abs() < 1e-6);
        assert!((point_segment_distance(Vec2::new(1.0, 3.0), &wall()) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn wrap_angle_lands_in_half_open_range() {
        assert_eq!(wrap_angle(0.3), 0.3);
        assert!((wrap_angle(PI) + PI).abs() < 1e-6);
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
    }
}
