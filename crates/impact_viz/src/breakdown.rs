//! Population breakdown pie chart with its legend.

use std::f32::consts::TAU;

use engine_core::{PopulationBreakdown, VizError};
use glam::Vec2;
use renderer::{DrawSurface, Rgb, TextAlign, TextStyle};

use crate::config::ChartConfig;

const NO_DATA: &str = "No population impact data.";
const NO_POPULATION: &str = "No population affected.";

/// Chart segments in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Direct,
    Secondary,
    LongTerm,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Direct, Segment::Secondary, Segment::LongTerm];

    pub fn label(self) -> &'static str {
        match self {
            Segment::Direct => "Direct Impact",
            Segment::Secondary => "Secondary",
            Segment::LongTerm => "Long Term",
        }
    }

    pub fn color(self, config: &ChartConfig) -> Rgb {
        match self {
            Segment::Direct => config.direct_color,
            Segment::Secondary => config.secondary_color,
            Segment::LongTerm => config.long_term_color,
        }
    }

    fn count(self, breakdown: &PopulationBreakdown) -> u64 {
        match self {
            Segment::Direct => breakdown.direct_impact,
            Segment::Secondary => breakdown.secondary,
            Segment::LongTerm => breakdown.long_term,
        }
    }
}

/// One angular slice, radians clockwise from +X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    pub segment: Segment,
    pub start: f32,
    pub end: f32,
}

impl Wedge {
    pub fn span(&self) -> f32 {
        self.end - self.start
    }
}

/// Contiguous spans starting at 0, each `part / total` of the full circle.
///
/// Spans are scaled off `total_affected`, not the part sum, so a breakdown
/// whose parts undershoot the total leaves a gap at the end of the circle.
/// Overshooting parts are cut at 2π. Wedges never overlap.
pub fn wedge_spans(breakdown: &PopulationBreakdown) -> Result<[Wedge; 3], VizError> {
    if breakdown.total_affected == 0 {
        return Err(VizError::DegenerateData("total affected population is zero"));
    }
    let total = breakdown.total_affected as f64;

    let mut start = 0.0f32;
    let wedges = Segment::ALL.map(|segment| {
        let fraction = (segment.count(breakdown) as f64 / total).clamp(0.0, 1.0);
        let end = (start + (fraction * TAU as f64) as f32).min(TAU);
        let wedge = Wedge { segment, start, end };
        start = end;
        wedge
    });
    Ok(wedges)
}

/// What `render_breakdown` ended up drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Chart([Wedge; 3]),
    /// Breakdown present but the total is zero.
    NoPopulation,
    /// No breakdown at all.
    NoData,
}

/// Clear `surface` and draw the chart and legend, or a placeholder.
pub fn render_breakdown(
    breakdown: Option<&PopulationBreakdown>,
    config: &ChartConfig,
    surface: &mut dyn DrawSurface,
) -> ChartOutcome {
    surface.clear();
    let size = surface.size();
    let center = size * 0.5;
    let message = TextStyle::new(16.0, config.text_color.opaque(), TextAlign::Center);

    let Some(breakdown) = breakdown else {
        surface.draw_text(center, NO_DATA, message);
        return ChartOutcome::NoData;
    };

    let wedges = match wedge_spans(breakdown) {
        Ok(wedges) => wedges,
        Err(err) => {
            log::debug!("breakdown chart: {err}");
            surface.draw_text(center, NO_POPULATION, message);
            return ChartOutcome::NoPopulation;
        }
    };
    if !breakdown.is_consistent() {
        log::warn!(
            "Population parts sum to {} but total is {}; chart will not close",
            breakdown.part_sum(),
            breakdown.total_affected
        );
    }

    let radius = size.x.min(size.y) * config.radius_fraction * config.radius_shrink;
    for wedge in &wedges {
        if wedge.span() > 0.0 {
            surface.fill_wedge(
                center,
                radius,
                wedge.start,
                wedge.end,
                wedge.segment.color(config).opaque(),
            );
        }
    }

    draw_legend(breakdown, center, radius, config, surface);
    ChartOutcome::Chart(wedges)
}

fn draw_legend(
    breakdown: &PopulationBreakdown,
    pie_center: Vec2,
    radius: f32,
    config: &ChartConfig,
    surface: &mut dyn DrawSurface,
) {
    let x = pie_center.x + radius + config.legend_gap;
    let mut y = pie_center.y - config.legend_rise;
    let row = TextStyle::new(12.0, config.text_color.opaque(), TextAlign::Left);
    let swatch = Vec2::splat(config.swatch_size);
    let text_x = x + config.swatch_size + 10.0;
    // Baseline sits just below the swatch's vertical middle.
    let baseline = config.swatch_size * 0.5 + 4.0;

    for segment in Segment::ALL {
        surface.fill_rect(Vec2::new(x, y), swatch, segment.color(config).opaque());
        surface.draw_text(
            Vec2::new(text_x, y + baseline),
            &format!("{}: {}", segment.label(), format_count(segment.count(breakdown))),
            row,
        );
        y += config.row_spacing;
    }

    surface.draw_text(
        Vec2::new(text_x, y + baseline),
        &format!("Total Affected: {}", format_count(breakdown.total_affected)),
        row,
    );
}

/// `4500` -> `"4,500"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{DrawCommand, DrawList};

    const EPS: f32 = 1e-5;

    #[test]
    fn dhaka_wedges_in_order() {
        let b = PopulationBreakdown::new(1000, 3000, 500, 4500);
        let w = wedge_spans(&b).unwrap();
        assert_eq!(w[0].segment, Segment::Direct);
        assert_eq!(w[1].segment, Segment::Secondary);
        assert_eq!(w[2].segment, Segment::LongTerm);
        assert_eq!(w[0].start, 0.0);
        assert!((w[0].span() - TAU * 1000.0 / 4500.0).abs() < EPS);
        assert!((w[1].span() - TAU * 3000.0 / 4500.0).abs() < EPS);
        assert!((w[2].span() - TAU * 500.0 / 4500.0).abs() < EPS);
        assert!((w[2].end - TAU).abs() < EPS);
    }

    #[test]
    fn wedges_are_contiguous() {
        for b in [
            PopulationBreakdown::from_parts(1, 1, 1),
            PopulationBreakdown::from_parts(7, 0, 3),
            PopulationBreakdown::from_parts(0, 0, 9),
            PopulationBreakdown::from_parts(123_456, 7_890, 42),
        ] {
            let w = wedge_spans(&b).unwrap();
            assert_eq!(w[0].end, w[1].start);
            assert_eq!(w[1].end, w[2].start);
            let sum: f32 = w.iter().map(Wedge::span).sum();
            assert!((sum - TAU).abs() < EPS, "sum = {sum}");
        }
    }

    #[test]
    fn zero_total_is_degenerate() {
        let b = PopulationBreakdown::new(0, 0, 0, 0);
        assert!(matches!(wedge_spans(&b), Err(VizError::DegenerateData(_))));
    }

    #[test]
    fn mismatched_parts_are_clamped() {
        // Parts undershoot: gap at the end.
        let w = wedge_spans(&PopulationBreakdown::new(100, 100, 100, 600)).unwrap();
        assert!((w[2].end - TAU / 2.0).abs() < EPS);
        // Parts overshoot: cut at the full circle, never overlapping.
        let w = wedge_spans(&PopulationBreakdown::new(500, 500, 500, 600)).unwrap();
        assert!(w.iter().all(|w| w.end <= TAU && w.start <= w.end));
        assert_eq!(w[2].span(), 0.0);
    }

    #[test]
    fn chart_draws_three_wedges_and_legend() {
        let b = PopulationBreakdown::new(1000, 3000, 500, 4500);
        let config = ChartConfig::default();
        let mut list = DrawList::new(500.0, 400.0);
        let outcome = render_breakdown(Some(&b), &config, &mut list);
        assert!(matches!(outcome, ChartOutcome::Chart(_)));

        let wedges = list.wedges();
        assert_eq!(wedges.len(), 3);
        assert_eq!(wedges[0].2.rgb, Rgb::from_hex(0xdc2626));
        assert_eq!(wedges[1].2.rgb, Rgb::from_hex(0xfb923c));
        assert_eq!(wedges[2].2.rgb, Rgb::from_hex(0xfacc15));

        let texts = list.texts();
        assert_eq!(
            texts,
            vec![
                "Direct Impact: 1,000",
                "Secondary: 3,000",
                "Long Term: 500",
                "Total Affected: 4,500",
            ]
        );
        assert_eq!(list.rects().len(), 3);

        // Total row lines up with the row labels, not the swatches.
        let positions: Vec<Vec2> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        assert_eq!(positions[3].x, positions[0].x);
        assert!(positions[3].x > list.rects()[0].0.x + config.swatch_size);
    }

    #[test]
    fn pie_is_centred_on_the_canvas() {
        let b = PopulationBreakdown::new(1000, 3000, 500, 4500);
        let config = ChartConfig::default();
        let mut list = DrawList::new(500.0, 400.0);
        render_breakdown(Some(&b), &config, &mut list);
        let expected_radius = 400.0 * config.radius_fraction * config.radius_shrink;
        for command in &list.commands {
            if let DrawCommand::FillWedge { center, radius, .. } = command {
                assert_eq!(*center, Vec2::new(250.0, 200.0));
                assert!((radius - expected_radius).abs() < EPS);
            }
        }
    }

    #[test]
    fn overshooting_parts_draw_only_the_wedges_that_fit() {
        let b = PopulationBreakdown::new(500, 500, 500, 600);
        let mut list = DrawList::new(500.0, 400.0);
        let outcome = render_breakdown(Some(&b), &ChartConfig::default(), &mut list);
        assert!(matches!(outcome, ChartOutcome::Chart(_)));
        let fills = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillWedge { .. }))
            .count();
        assert_eq!(fills, 2);
        let wedges = list.wedges();
        assert!((wedges[1].1 - TAU).abs() < EPS);
        // Legend still lists every segment.
        assert_eq!(list.rects().len(), 3);
        assert_eq!(list.texts()[2], "Long Term: 500");
    }

    #[test]
    fn legend_clears_the_pie() {
        let b = PopulationBreakdown::from_parts(1, 2, 3);
        let config = ChartConfig::default();
        let mut list = DrawList::new(500.0, 400.0);
        render_breakdown(Some(&b), &config, &mut list);
        let radius = 400.0 * config.radius_fraction * config.radius_shrink;
        let pie_right = 250.0 + radius;
        for (origin, _, _) in list.rects() {
            assert!(origin.x >= pie_right + config.legend_gap - EPS);
        }
        // Rows are evenly spaced.
        let rows: Vec<f32> = list.rects().iter().map(|r| r.0.y).collect();
        assert!((rows[1] - rows[0] - config.row_spacing).abs() < EPS);
        assert!((rows[2] - rows[1] - config.row_spacing).abs() < EPS);
    }

    #[test]
    fn zero_total_renders_message_only() {
        let b = PopulationBreakdown::new(0, 0, 0, 0);
        let mut list = DrawList::new(500.0, 400.0);
        let outcome = render_breakdown(Some(&b), &ChartConfig::default(), &mut list);
        assert_eq!(outcome, ChartOutcome::NoPopulation);
        assert!(list.wedges().is_empty());
        assert_eq!(list.texts(), vec![NO_POPULATION]);
    }

    #[test]
    fn missing_breakdown_renders_no_data() {
        let mut list = DrawList::new(500.0, 400.0);
        let outcome = render_breakdown(None, &ChartConfig::default(), &mut list);
        assert_eq!(outcome, ChartOutcome::NoData);
        assert_eq!(list.texts(), vec![NO_DATA]);
    }

    #[test]
    fn counts_get_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(4500), "4,500");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
