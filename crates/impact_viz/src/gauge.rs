//! Horizontal bar gauges for the headline impact metrics.

use engine_core::ImpactDescription;
use glam::Vec2;
use renderer::{DrawSurface, Rgb, TextAlign, TextStyle};

use crate::config::GaugeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Energy,
    BlastRadius,
    Population,
    WaveHeight,
}

impl MetricKind {
    /// Fixed caption printed under the bar.
    pub fn caption(self) -> &'static str {
        match self {
            MetricKind::Energy => "TNT EQUIVALENT",
            MetricKind::BlastRadius => "DAMAGE ZONE",
            MetricKind::Population => "DIRECT IMPACT ZONE",
            MetricKind::WaveHeight => "MAXIMUM WAVE HEIGHT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricGauge {
    pub kind: MetricKind,
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub max: f64,
}

const TRACK: Rgb = Rgb::new(55.0, 65.0, 81.0);
const FILL: Rgb = Rgb::new(239.0, 68.0, 68.0);
const TEXT: Rgb = Rgb::new(224.0, 224.0, 224.0);
const BAR_HEIGHT: f32 = 8.0;

impl MetricGauge {
    pub fn new(
        kind: MetricKind,
        label: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        max: f64,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            value,
            unit: unit.into(),
            max,
        }
    }

    /// Fill level in [0, 100]. Zero for a non-positive max or invalid value.
    pub fn percentage(&self) -> f64 {
        if !self.value.is_finite() || !self.max.is_finite() || self.max <= 0.0 {
            return 0.0;
        }
        (self.value / self.max * 100.0).clamp(0.0, 100.0)
    }

    pub fn caption(&self) -> &'static str {
        self.kind.caption()
    }

    /// Draw label, value, bar and caption inside the `width` wide band at `origin`.
    pub fn draw(&self, origin: Vec2, width: f32, surface: &mut dyn DrawSurface) {
        let text = TextStyle::new(12.0, TEXT.opaque(), TextAlign::Left);
        surface.draw_text(origin, &self.label, text);
        surface.draw_text(
            origin + Vec2::new(0.0, 18.0),
            &format!("{:.1} {}", self.value, self.unit),
            TextStyle::new(16.0, TEXT.opaque(), TextAlign::Left),
        );

        let bar_origin = origin + Vec2::new(0.0, 30.0);
        surface.fill_rect(bar_origin, Vec2::new(width, BAR_HEIGHT), TRACK.opaque());
        let filled = width * (self.percentage() / 100.0) as f32;
        if filled > 0.0 {
            surface.fill_rect(bar_origin, Vec2::new(filled, BAR_HEIGHT), FILL.opaque());
        }

        surface.draw_text(
            bar_origin + Vec2::new(0.0, BAR_HEIGHT + 14.0),
            self.caption(),
            TextStyle::new(10.0, TEXT.with_alpha(0.6), TextAlign::Left),
        );
    }
}

/// The three gauges shown next to the result charts.
pub fn impact_gauges(impact: &ImpactDescription, config: &GaugeConfig) -> [MetricGauge; 3] {
    [
        MetricGauge::new(
            MetricKind::Energy,
            "Impact Energy",
            impact.energy_megatons,
            "MT",
            config.energy_max_megatons,
        ),
        MetricGauge::new(
            MetricKind::BlastRadius,
            "Blast Radius",
            impact.blast_radius_km,
            "km",
            config.blast_radius_max_km,
        ),
        MetricGauge::new(
            MetricKind::Population,
            "Affected Population",
            impact.affected_population as f64,
            "people",
            config.population_max,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{GeoPosition, PopulationBreakdown};
    use renderer::DrawList;

    #[test]
    fn percentage_is_capped() {
        let g = MetricGauge::new(MetricKind::Energy, "E", 500.0, "MT", 1000.0);
        assert!((g.percentage() - 50.0).abs() < 1e-9);
        let g = MetricGauge::new(MetricKind::Energy, "E", 5000.0, "MT", 1000.0);
        assert_eq!(g.percentage(), 100.0);
        let g = MetricGauge::new(MetricKind::Energy, "E", 5.0, "MT", 0.0);
        assert_eq!(g.percentage(), 0.0);
    }

    #[test]
    fn captions_per_kind() {
        assert_eq!(MetricKind::Energy.caption(), "TNT EQUIVALENT");
        assert_eq!(MetricKind::BlastRadius.caption(), "DAMAGE ZONE");
        assert_eq!(MetricKind::Population.caption(), "DIRECT IMPACT ZONE");
        assert_eq!(MetricKind::WaveHeight.caption(), "MAXIMUM WAVE HEIGHT");
    }

    #[test]
    fn bar_fill_tracks_percentage() {
        let g = MetricGauge::new(MetricKind::BlastRadius, "Blast Radius", 125.0, "km", 500.0);
        let mut list = DrawList::new(300.0, 80.0);
        g.draw(Vec2::ZERO, 200.0, &mut list);
        let rects = list.rects();
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].1.x, 200.0);
        assert!((rects[1].1.x - 50.0).abs() < 1e-4);
        let texts = list.texts();
        assert!(texts.contains(&"125.0 km"));
        assert!(texts.contains(&"DAMAGE ZONE"));
    }

    #[test]
    fn empty_gauge_draws_only_the_track() {
        let g = MetricGauge::new(MetricKind::Population, "Affected Population", 0.0, "people", 1e7);
        let mut list = DrawList::new(300.0, 80.0);
        g.draw(Vec2::ZERO, 200.0, &mut list);
        assert_eq!(list.rects().len(), 1);
    }

    #[test]
    fn gauges_from_impact() {
        let impact = ImpactDescription::new(
            GeoPosition::new(23.8, 90.4),
            50.0,
            500.0,
            PopulationBreakdown::new(1000, 3000, 500, 4500),
        );
        let [energy, blast, people] = impact_gauges(&impact, &GaugeConfig::default());
        assert!((energy.percentage() - 50.0).abs() < 1e-9);
        assert!((blast.percentage() - 10.0).abs() < 1e-9);
        assert_eq!(people.value, 4500.0);
    }
}
