//! Severity scaler: raw impact magnitudes to bounded visual parameters.

use engine_core::ImpactDescription;
use renderer::Rgb;

use crate::config::ScalerConfig;

/// Opacity falloff of the density field and its reference ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityCurve {
    /// Alpha of dots at the rim; dots at the centre are fully opaque.
    pub floor_alpha: f32,
    pub ring_alpha: f32,
}

/// Everything the 2D renderers need, derived from one impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    pub color_rgb: Rgb,
    /// Number of dots in the density field.
    pub density: usize,
    pub dot_radius: f32,
    pub opacity: OpacityCurve,
    /// Capped blast radius in pixels.
    pub radius_px: f32,
    /// Line width of the reference ring.
    pub ring_width: f32,
    pub energy_factor: f32,
    pub population_factor: f32,
}

/// `clamp(value / reference, 0, 1)`, with non-finite, negative or
/// zero-reference inputs mapping to 0.
pub fn severity_factor(value: f64, reference: f64) -> f32 {
    if !value.is_finite() || value <= 0.0 || !reference.is_finite() || reference <= 0.0 {
        return 0.0;
    }
    (value / reference).clamp(0.0, 1.0) as f32
}

/// `min(radius_km * scale, max_px)`. The cap holds for any input.
pub fn capped_radius(radius_km: f64, config: &ScalerConfig) -> f32 {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return 0.0;
    }
    let max = config.max_radius_px.max(0.0);
    let raw = radius_km * config.radius_scale.max(0.0) as f64;
    raw.min(max as f64) as f32
}

pub fn scale(impact: &ImpactDescription, config: &ScalerConfig) -> VisualParams {
    let energy_factor = severity_factor(impact.energy_megatons, config.energy_reference_max);
    let population_factor = severity_factor(
        impact.affected_population as f64,
        config.population_reference_max,
    );

    let density =
        config.base_count + (config.range_count as f32 * population_factor).round() as usize;
    let dot_radius = config.base_dot_radius + (1.0 - energy_factor) * config.dot_radius_spread;

    VisualParams {
        color_rgb: config.low_color.lerp(config.high_color, energy_factor),
        density,
        dot_radius,
        opacity: OpacityCurve {
            floor_alpha: config.floor_alpha.clamp(0.0, 1.0),
            ring_alpha: config.ring_alpha.clamp(0.0, 1.0),
        },
        radius_px: capped_radius(impact.blast_radius_km, config),
        ring_width: config.ring_width.max(0.0),
        energy_factor,
        population_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{GeoPosition, PopulationBreakdown};

    fn impact(blast: f64, energy: f64, population: u64) -> ImpactDescription {
        ImpactDescription::new(
            GeoPosition::new(23.8, 90.4),
            blast,
            energy,
            PopulationBreakdown::from_parts(population, 0, 0),
        )
    }

    #[test]
    fn dhaka_scenario() {
        let config = ScalerConfig::default();
        let p = scale(&impact(50.0, 500.0, 4500), &config);
        assert_eq!(p.radius_px, 100.0);
        assert!((p.energy_factor - 0.5).abs() < 1e-6);
        assert!((p.population_factor - 0.009).abs() < 1e-6);
        assert_eq!(p.density, 1000 + 18);
        assert!((p.dot_radius - 1.75).abs() < 1e-6);
        assert!((p.color_rgb.r - 127.5).abs() < 1e-3);
        assert!((p.color_rgb.g - 94.0).abs() < 1e-3);
        assert!((p.color_rgb.b - 106.0).abs() < 1e-3);
    }

    #[test]
    fn radius_is_capped_for_absurd_inputs() {
        let config = ScalerConfig::default();
        let p = scale(&impact(10_000_000.0, 1.0, 0), &config);
        assert_eq!(p.radius_px, config.max_radius_px);
        assert_eq!(capped_radius(f64::MAX, &config), config.max_radius_px);
        assert_eq!(capped_radius(f64::INFINITY, &config), 0.0);
    }

    #[test]
    fn monotonic_in_energy() {
        let config = ScalerConfig::default();
        let mut last_blend = -1.0;
        let mut last_radius = f32::MAX;
        for energy in [0.0, 1.0, 10.0, 250.0, 999.0, 1000.0, 5000.0, 1e12] {
            let p = scale(&impact(50.0, energy, 4500), &config);
            assert!(p.energy_factor >= last_blend);
            assert!(p.dot_radius <= last_radius);
            last_blend = p.energy_factor;
            last_radius = p.dot_radius;
        }
        assert_eq!(last_blend, 1.0);
        assert_eq!(last_radius, config.base_dot_radius);
    }

    #[test]
    fn population_saturates_density() {
        let config = ScalerConfig::default();
        let p = scale(&impact(50.0, 0.0, 50_000_000), &config);
        assert_eq!(p.density, 3000);
        let p = scale(&impact(50.0, 0.0, 0), &config);
        assert_eq!(p.density, 1000);
        assert_eq!(p.color_rgb, config.low_color);
    }

    #[test]
    fn invalid_magnitudes_read_as_zero() {
        assert_eq!(severity_factor(f64::NAN, 1000.0), 0.0);
        assert_eq!(severity_factor(-5.0, 1000.0), 0.0);
        assert_eq!(severity_factor(5.0, 0.0), 0.0);
        let config = ScalerConfig::default();
        let p = scale(&impact(-3.0, f64::NAN, 0), &config);
        assert_eq!(p.radius_px, 0.0);
        assert_eq!(p.energy_factor, 0.0);
    }
}
