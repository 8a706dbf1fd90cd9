use glam::{Vec2, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Light {
    pub position: Vec2,
    pub intensity: f32,
}

impl Light {
    #[must_use]
    pub const fn new(position: Vec2, intensity: f32) -> Self {
        Self { position, intensity }
    }
}

/// A wall segment from `a` to `b`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Line {
    pub a: Vec2,
    pub b: Vec2,
}

impl Line {
    #[must_use]
    pub const fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    #[must_use]
    pub fn edge(&self) -> Vec2 {
        self.b - self.a
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        self.edge().length()
    }

    /// Unit normal, the edge rotated a quarter turn counter-clockwise. Zero for
    /// a degenerate segment.
    #[must_use]
    pub fn normal(&self) -> Vec2 {
        self.edge().perp().normalize_or_zero()
    }

    /// Point at parameter `t` along the segment, `t = 0` at `a`.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.a + t * self.edge()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Texel {
    pub color: Vec3,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Drone {
    /// Yaw in radians, kept in `[-π, π)`.
    pub angle: f32,
    pub position: Vec2,
    pub angmomentum: f32,
    pub momentum: Vec2,
}

impl Drone {
    #[must_use]
    pub const fn at(position: Vec2, angle: f32) -> Self {
        Self {
            angle,
            position,
            angmomentum: 0.0,
            momentum: Vec2::ZERO,
        }
    }

    /// Unit vector along the drone's heading.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }
}

/// Per-drone control input, one step in each axis.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Command {
    /// Forward (+) or backward (-).
    pub mesial: i32,
    /// Left (+) or right (-).
    pub lateral: i32,
    /// Counter-clockwise (+) or clockwise (-).
    pub yaw: i32,
}

impl Command {
    #[must_use]
    pub const fn new(mesial: i32, lateral: i32, yaw: i32) -> Self {
        Self { mesial, lateral, yaw }
    }

    #[must_use]
    pub fn clamped(self, max_command: i32) -> Self {
        let clamp = |v: i32| v.clamp(-max_command, max_command);
        Self::new(clamp(self.mesial), clamp(self.lateral), clamp(self.yaw))
    }
}

/// Outcome of one ray.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RayHit {
    /// In-scene index of the line hit, `-1` for background.
    pub index: i32,
    pub location: Vec2,
    /// Unit ray direction dotted with the line's unit normal.
    pub dot: f32,
    pub distance: f32,
    pub color: Vec3,
}

impl RayHit {
    pub const BACKGROUND_INDEX: i32 = -1;

    #[must_use]
    pub fn background(origin: Vec2, color: Vec3) -> Self {
        Self {
            index: Self::BACKGROUND_INDEX,
            location: origin,
            dot: 0.0,
            distance: f32::INFINITY,
            color,
        }
    }

    #[must_use]
    pub fn is_background(&self) -> bool {
        self.index == Self::BACKGROUND_INDEX
    }
}

impl Default for RayHit {
    fn default() -> Self {
        Self::background(Vec2::ZERO, Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_normal_is_left_of_edge() {
        let line = Line::new(Vec2::ZERO, Vec2::new(2.0, 0.0));
        assert_eq!(line.normal(), Vec2::Y);
        assert_eq!(line.point_at(0.25), Vec2::new(0.5, 0.0));
        assert_eq!(Line::new(Vec2::ONE, Vec2::ONE).normal(), Vec2::ZERO);
    }

    #[test]
    fn commands_clamp_per_axis() {
        let c = Command::new(5, -3, 1).clamped(2);
        assert_eq!(c, Command::new(2, -2, 1));
    }

    #[test]
    fn records_have_no_padding() {
        assert_eq!(std::mem::size_of::<Drone>(), 24);
        assert_eq!(std::mem::size_of::<RayHit>(), 32);
        assert_eq!(std::mem::size_of::<Light>(), 12);
    }
}
