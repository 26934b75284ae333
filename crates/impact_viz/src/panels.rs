//! The 2D result panels: impact zone, population chart and metric gauges.
//!
//! Each panel is a recorded [`DrawList`] that is rebuilt from scratch
//! whenever the impact changes.

use engine_core::{FeedWatch, ImpactDescription, ImpactFeed};
use glam::Vec2;
use renderer::{DrawList, DrawSurface};

use crate::breakdown::{render_breakdown, ChartOutcome};
use crate::config::VizConfig;
use crate::density::DensityRenderer;
use crate::gauge::impact_gauges;
use crate::severity::VisualParams;

const GAUGE_ROW_HEIGHT: f32 = 70.0;
const GAUGE_MARGIN: f32 = 20.0;

pub struct ResultPanels {
    config: VizConfig,
    density: DensityRenderer,
    pub zone: DrawList,
    pub chart: DrawList,
    pub gauges: DrawList,
    params: Option<VisualParams>,
    chart_outcome: ChartOutcome,
}

impl ResultPanels {
    pub fn new(config: VizConfig) -> Self {
        Self::with_renderer(config, DensityRenderer::new())
    }

    pub fn with_renderer(config: VizConfig, density: DensityRenderer) -> Self {
        let (w, h) = (config.canvas.width, config.canvas.height);
        let mut panels = Self {
            density,
            zone: DrawList::new(w, h),
            chart: DrawList::new(w, h),
            gauges: DrawList::new(w, GAUGE_ROW_HEIGHT * 3.0 + GAUGE_MARGIN),
            params: None,
            chart_outcome: ChartOutcome::NoData,
            config,
        };
        panels.render(None);
        panels
    }

    /// Redraw every panel for `impact`.
    pub fn render(&mut self, impact: Option<&ImpactDescription>) {
        self.params = self
            .density
            .render_zone(impact, &self.config.scaler, &mut self.zone);

        let breakdown = impact.and_then(|i| i.population_breakdown.as_ref());
        self.chart_outcome = render_breakdown(breakdown, &self.config.chart, &mut self.chart);

        self.gauges.clear();
        if let Some(impact) = impact {
            let width = self.gauges.size().x - GAUGE_MARGIN * 2.0;
            for (i, gauge) in impact_gauges(impact, &self.config.gauges).iter().enumerate() {
                let origin = Vec2::new(GAUGE_MARGIN, GAUGE_MARGIN + i as f32 * GAUGE_ROW_HEIGHT);
                gauge.draw(origin, width, &mut self.gauges);
            }
        }
    }

    /// Redraw only if the feed changed since `watch` last looked.
    pub fn sync_feed(&mut self, feed: &ImpactFeed, watch: &mut FeedWatch) -> bool {
        if !watch.changed(feed) {
            return false;
        }
        self.render(feed.current());
        true
    }

    /// Parameters behind the current zone panel, if one is drawn.
    pub fn params(&self) -> Option<&VisualParams> {
        self.params.as_ref()
    }

    pub fn chart_outcome(&self) -> &ChartOutcome {
        &self.chart_outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{GeoPosition, PopulationBreakdown};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn panels() -> ResultPanels {
        ResultPanels::with_renderer(
            VizConfig::default(),
            DensityRenderer::with_rng(Box::new(StdRng::seed_from_u64(12))),
        )
    }

    fn dhaka() -> ImpactDescription {
        ImpactDescription::new(
            GeoPosition::new(23.8, 90.4),
            50.0,
            500.0,
            PopulationBreakdown::new(1000, 3000, 500, 4500),
        )
    }

    #[test]
    fn starts_with_placeholders() {
        let p = panels();
        assert!(p.params().is_none());
        assert_eq!(p.chart_outcome(), &ChartOutcome::NoData);
        assert_eq!(p.zone.texts(), vec!["No impact data available for visualization."]);
        assert_eq!(p.gauges.rects().len(), 0);
    }

    #[test]
    fn renders_every_panel_on_feed_change() {
        let mut p = panels();
        let mut feed = ImpactFeed::new();
        let mut watch = feed.watch();
        assert!(!p.sync_feed(&feed, &mut watch));

        feed.publish(dhaka());
        assert!(p.sync_feed(&feed, &mut watch));
        let params = *p.params().unwrap();
        assert_eq!(p.zone.filled_circles().count(), params.density);
        assert!(matches!(p.chart_outcome(), ChartOutcome::Chart(_)));
        assert_eq!(p.chart.wedges().len(), 3);
        assert!(p.gauges.texts().contains(&"TNT EQUIVALENT"));

        assert!(!p.sync_feed(&feed, &mut watch));
    }

    #[test]
    fn rerender_replaces_previous_drawing() {
        let mut p = panels();
        p.render(Some(&dhaka()));
        let first = p.zone.commands.len();
        p.render(Some(&dhaka()));
        assert_eq!(p.zone.commands.len(), first);
        assert_eq!(p.chart.wedges().len(), 3);
    }

    #[test]
    fn zero_total_breakdown_shows_message() {
        let mut p = panels();
        let mut impact = dhaka();
        impact.population_breakdown = Some(PopulationBreakdown::new(0, 0, 0, 0));
        impact.affected_population = 0;
        p.render(Some(&impact));
        assert_eq!(p.chart_outcome(), &ChartOutcome::NoPopulation);
        assert!(p.chart.wedges().is_empty());
        assert_eq!(p.chart.texts(), vec!["No population affected."]);
    }
}
