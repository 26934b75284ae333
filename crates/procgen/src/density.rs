//! Stochastic danger-density point field.
//!
//! Dots are placed at a uniformly random angle and a uniformly random
//! *linear* distance from the centre. That is not area-uniform: density
//! rises toward the centre, which produces the intended hot core.

use glam::Vec2;
use rand::Rng;

/// One sampled dot, relative to the field centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityDot {
    pub offset: Vec2,
    /// Distance from the centre in pixels.
    pub distance: f32,
    /// Opacity from the radial falloff.
    pub alpha: f32,
}

/// Linear falloff: `floor_alpha` at the rim, 1.0 at the centre.
pub fn falloff_alpha(normalized_distance: f32, floor_alpha: f32) -> f32 {
    let n = normalized_distance.clamp(0.0, 1.0);
    let floor = floor_alpha.clamp(0.0, 1.0);
    floor + (1.0 - n) * (1.0 - floor)
}

/// Sample one dot inside `radius`.
pub fn sample_dot<R: Rng + ?Sized>(rng: &mut R, radius: f32, floor_alpha: f32) -> DensityDot {
    let radius = radius.max(0.0);
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    let distance = rng.gen::<f32>() * radius;
    let normalized = if radius > 0.0 { distance / radius } else { 0.0 };
    DensityDot {
        offset: Vec2::new(distance * angle.cos(), distance * angle.sin()),
        distance,
        alpha: falloff_alpha(normalized, floor_alpha),
    }
}

/// Lazily sample `count` dots inside `radius`.
pub fn sample_dots<'a, R: Rng + ?Sized>(
    rng: &'a mut R,
    count: usize,
    radius: f32,
    floor_alpha: f32,
) -> impl Iterator<Item = DensityDot> + 'a {
    (0..count).map(move |_| sample_dot(rng, radius, floor_alpha))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn falloff_endpoints() {
        assert!((falloff_alpha(0.0, 0.3) - 1.0).abs() < 1e-6);
        assert!((falloff_alpha(1.0, 0.3) - 0.3).abs() < 1e-6);
        assert!((falloff_alpha(0.5, 0.3) - 0.65).abs() < 1e-6);
        // Out-of-range distances clamp instead of going below the floor.
        assert!((falloff_alpha(2.0, 0.3) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn dots_stay_inside_radius() {
        let mut rng = StdRng::seed_from_u64(42);
        for dot in sample_dots(&mut rng, 5000, 100.0, 0.3) {
            assert!(dot.offset.length() <= 100.0 + 1e-3);
            assert!((dot.offset.length() - dot.distance).abs() < 1e-3);
            assert!(dot.alpha >= 0.3 - 1e-6 && dot.alpha <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn linear_radius_biases_toward_centre() {
        // Linear radius puts half the dots inside r/2, area-uniform would put a quarter.
        let mut rng = StdRng::seed_from_u64(5);
        let inner = sample_dots(&mut rng, 10_000, 100.0, 0.3)
            .filter(|d| d.distance < 50.0)
            .count();
        let ratio = inner as f32 / 10_000.0;
        assert!((ratio - 0.5).abs() < 0.03, "ratio = {ratio}");
    }

    #[test]
    fn zero_radius_collapses_to_centre() {
        let mut rng = StdRng::seed_from_u64(1);
        let dot = sample_dot(&mut rng, 0.0, 0.3);
        assert_eq!(dot.offset, Vec2::ZERO);
        assert!((dot.alpha - 1.0).abs() < 1e-6);
    }
}
