//! Stochastic danger-density field for the 2D impact-zone canvas.
//!
//! Output is intentionally not reproducible between runs: the renderer draws
//! from an entropy-seeded generator unless a source is injected with
//! [`DensityRenderer::with_rng`].

use engine_core::{ImpactDescription, VizError, WarnOnce};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use renderer::{DrawSurface, Rgb, TextAlign, TextStyle};

use crate::config::ScalerConfig;
use crate::severity::{self, VisualParams};

const PLACEHOLDER: &str = "No impact data available for visualization.";
const CAPTION_COLOR: Rgb = Rgb::new(224.0, 224.0, 224.0);

pub struct DensityRenderer {
    rng: Box<dyn RngCore>,
    invalid_input: WarnOnce,
}

impl Default for DensityRenderer {
    fn default() -> Self {
        Self::with_rng(Box::new(StdRng::from_entropy()))
    }
}

impl DensityRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `rng` for dot placement, e.g. a seeded generator in tests.
    pub fn with_rng(rng: Box<dyn RngCore>) -> Self {
        Self {
            rng,
            invalid_input: WarnOnce::new(),
        }
    }

    /// Draw `params.density` dots inside `radius_px` of `center`, then the
    /// reference ring. Returns the number of dots drawn.
    ///
    /// Does not clear the surface.
    pub fn render_field(
        &mut self,
        center: Vec2,
        radius_px: f32,
        params: &VisualParams,
        surface: &mut dyn DrawSurface,
    ) -> usize {
        if !center.is_finite() {
            self.invalid_input
                .report("density field", &VizError::invalid("center", center.x as f64));
            return 0;
        }
        if !radius_px.is_finite() || radius_px < 0.0 {
            self.invalid_input
                .report("density field", &VizError::invalid("radius_px", radius_px as f64));
            return 0;
        }

        let color = params.color_rgb;
        let mut drawn = 0;
        for dot in procgen::sample_dots(
            &mut *self.rng,
            params.density,
            radius_px,
            params.opacity.floor_alpha,
        ) {
            surface.fill_circle(center + dot.offset, params.dot_radius, color.with_alpha(dot.alpha));
            drawn += 1;
        }

        surface.stroke_circle(
            center,
            radius_px,
            color.with_alpha(params.opacity.ring_alpha),
            params.ring_width,
        );
        drawn
    }

    /// Full impact-zone canvas: clear, field centred on the canvas, caption
    /// along the bottom. Without an impact, or with unusable magnitudes, only
    /// the placeholder is drawn. The impact's location plays no part here.
    ///
    /// Returns the parameters used, or `None` if no field was drawn.
    pub fn render_zone(
        &mut self,
        impact: Option<&ImpactDescription>,
        config: &ScalerConfig,
        surface: &mut dyn DrawSurface,
    ) -> Option<VisualParams> {
        surface.clear();
        let size = surface.size();
        let center = size * 0.5;

        let Some(impact) = impact else {
            draw_placeholder(surface, center);
            return None;
        };
        if let Err(err) = impact.validate_magnitudes() {
            self.invalid_input.report("impact zone", &err);
            draw_placeholder(surface, center);
            return None;
        }

        let params = severity::scale(impact, config);
        self.render_field(center, params.radius_px, &params, surface);
        surface.draw_text(
            Vec2::new(center.x, size.y - 20.0),
            &format!("Impact Zone: {:.1} km Radius", impact.blast_radius_km),
            TextStyle::new(14.0, CAPTION_COLOR.opaque(), TextAlign::Center),
        );
        Some(params)
    }
}

fn draw_placeholder(surface: &mut dyn DrawSurface, center: Vec2) {
    surface.draw_text(
        center,
        PLACEHOLDER,
        TextStyle::new(16.0, CAPTION_COLOR.opaque(), TextAlign::Center),
    );
}
