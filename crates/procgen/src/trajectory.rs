//! Approach trajectory of the impactor: a quadratic Bézier from deep space
//! to the impact point on the globe.

use glam::Vec3;

#[derive(Debug, Clone)]
pub struct Trajectory {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
    /// Polyline samples for the host to draw, `start` to `end` inclusive.
    pub points: Vec<Vec3>,
}

impl Trajectory {
    /// Curve ending at `target`, starting `start_distance` from the origin,
    /// bowed outward by `arc_height`.
    pub fn approach(target: Vec3, start_distance: f32, arc_height: f32, samples: usize) -> Self {
        let dir = target.normalize_or_zero();
        let dir = if dir == Vec3::ZERO { Vec3::X } else { dir };
        let mut side = dir.cross(Vec3::Y).normalize_or_zero();
        if side == Vec3::ZERO {
            log::debug!("approach target on the polar axis, bending along +X");
            side = Vec3::X;
        }
        let start = (dir + side).normalize() * start_distance;
        let control = (start + target) * 0.5 + dir * arc_height;

        let mut trajectory = Self {
            start,
            control,
            end: target,
            points: Vec::new(),
        };
        let samples = samples.max(2);
        trajectory.points = (0..samples)
            .map(|i| trajectory.point_at(i as f32 / (samples - 1) as f32))
            .collect();
        trajectory
    }

    /// Point on the curve at parameter `t` in [0, 1].
    pub fn point_at(&self, t: f32) -> Vec3 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let u = 1.0 - t;
        self.start * (u * u) + self.control * (2.0 * u * t) + self.end * (t * t)
    }

    /// Approximate arc length from the polyline samples.
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match() {
        let target = Vec3::new(0.0, 0.0, -5.0);
        let t = Trajectory::approach(target, 60.0, 10.0, 32);
        assert_eq!(t.points.len(), 32);
        assert!((t.points[0] - t.start).length() < 1e-4);
        assert!((t.points[31] - target).length() < 1e-4);
        assert!((t.start.length() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn polar_target_is_handled() {
        let t = Trajectory::approach(Vec3::new(0.0, 5.0, 0.0), 60.0, 10.0, 8);
        assert!(t.points.iter().all(|p| p.is_finite()));
        assert!(t.length() > 0.0);
    }

    #[test]
    fn parameter_is_clamped() {
        let t = Trajectory::approach(Vec3::X * 5.0, 50.0, 5.0, 4);
        assert_eq!(t.point_at(-1.0), t.start);
        assert!((t.point_at(2.0) - t.end).length() < 1e-5);
        assert_eq!(t.point_at(f32::NAN), t.start);
    }
}
