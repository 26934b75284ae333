//! Engine tuning, loaded from `impact_viz.ron` at startup.
//!
//! Every field has a serde default, so a partial file (or none at all) is
//! fine. These are tunable parameters, not derived values.

use std::path::{Path, PathBuf};

use renderer::{HostConfig, Rgb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VizConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub scaler: ScalerConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub gauges: GaugeConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub host: HostConfig,
}

/// Size of the 2D result canvases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_width")]
    pub width: f32,
    #[serde(default = "default_canvas_height")]
    pub height: f32,
}

fn default_canvas_width() -> f32 {
    500.0
}
fn default_canvas_height() -> f32 {
    400.0
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
        }
    }
}

/// Severity scaler tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerConfig {
    /// Pixels per kilometre of blast radius.
    #[serde(default = "default_radius_scale")]
    pub radius_scale: f32,
    /// Hard cap on the drawn radius. Default is half a 500 px canvas minus a 20 px margin.
    #[serde(default = "default_max_radius_px")]
    pub max_radius_px: f32,
    /// Energy (megatons) at which color saturates to `high_color`.
    #[serde(default = "default_energy_reference_max")]
    pub energy_reference_max: f64,
    /// Affected population at which dot count saturates.
    #[serde(default = "default_population_reference_max")]
    pub population_reference_max: f64,
    #[serde(default = "default_low_color")]
    pub low_color: Rgb,
    #[serde(default = "default_high_color")]
    pub high_color: Rgb,
    #[serde(default = "default_base_count")]
    pub base_count: usize,
    #[serde(default = "default_range_count")]
    pub range_count: usize,
    #[serde(default = "default_base_dot_radius")]
    pub base_dot_radius: f32,
    #[serde(default = "default_dot_radius_spread")]
    pub dot_radius_spread: f32,
    /// Dot opacity at the rim of the field.
    #[serde(default = "default_floor_alpha")]
    pub floor_alpha: f32,
    /// Opacity of the reference ring.
    #[serde(default = "default_ring_alpha")]
    pub ring_alpha: f32,
    #[serde(default = "default_ring_width")]
    pub ring_width: f32,
}

fn default_radius_scale() -> f32 {
    2.0
}
fn default_max_radius_px() -> f32 {
    default_canvas_width() / 2.0 - 20.0
}
fn default_energy_reference_max() -> f64 {
    1000.0
}
fn default_population_reference_max() -> f64 {
    500_000.0
}
fn default_low_color() -> Rgb {
    Rgb::new(0.0, 188.0, 212.0)
}
fn default_high_color() -> Rgb {
    Rgb::new(255.0, 0.0, 0.0)
}
fn default_base_count() -> usize {
    1000
}
fn default_range_count() -> usize {
    2000
}
fn default_base_dot_radius() -> f32 {
    1.0
}
fn default_dot_radius_spread() -> f32 {
    1.5
}
fn default_floor_alpha() -> f32 {
    0.3
}
fn default_ring_alpha() -> f32 {
    0.8
}
fn default_ring_width() -> f32 {
    2.0
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            radius_scale: default_radius_scale(),
            max_radius_px: default_max_radius_px(),
            energy_reference_max: default_energy_reference_max(),
            population_reference_max: default_population_reference_max(),
            low_color: default_low_color(),
            high_color: default_high_color(),
            base_count: default_base_count(),
            range_count: default_range_count(),
            base_dot_radius: default_base_dot_radius(),
            dot_radius_spread: default_dot_radius_spread(),
            floor_alpha: default_floor_alpha(),
            ring_alpha: default_ring_alpha(),
            ring_width: default_ring_width(),
        }
    }
}

/// Population pie chart layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Pie radius as a fraction of the smaller canvas side.
    #[serde(default = "default_radius_fraction")]
    pub radius_fraction: f32,
    /// Extra shrink applied to leave room for the legend.
    #[serde(default = "default_radius_shrink")]
    pub radius_shrink: f32,
    /// Horizontal gap between the pie's bounding circle and the legend.
    #[serde(default = "default_legend_gap")]
    pub legend_gap: f32,
    /// Legend starts this far above the chart centre.
    #[serde(default = "default_legend_rise")]
    pub legend_rise: f32,
    #[serde(default = "default_row_spacing")]
    pub row_spacing: f32,
    #[serde(default = "default_swatch_size")]
    pub swatch_size: f32,
    #[serde(default = "default_direct_color")]
    pub direct_color: Rgb,
    #[serde(default = "default_secondary_color")]
    pub secondary_color: Rgb,
    #[serde(default = "default_long_term_color")]
    pub long_term_color: Rgb,
    #[serde(default = "default_text_color")]
    pub text_color: Rgb,
}

fn default_radius_fraction() -> f32 {
    1.0 / 3.0
}
fn default_radius_shrink() -> f32 {
    0.8
}
fn default_legend_gap() -> f32 {
    30.0
}
fn default_legend_rise() -> f32 {
    60.0
}
fn default_row_spacing() -> f32 {
    25.0
}
fn default_swatch_size() -> f32 {
    15.0
}
fn default_direct_color() -> Rgb {
    Rgb::from_hex(0xdc2626)
}
fn default_secondary_color() -> Rgb {
    Rgb::from_hex(0xfb923c)
}
fn default_long_term_color() -> Rgb {
    Rgb::from_hex(0xfacc15)
}
fn default_text_color() -> Rgb {
    Rgb::from_hex(0xe0e0e0)
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            radius_fraction: default_radius_fraction(),
            radius_shrink: default_radius_shrink(),
            legend_gap: default_legend_gap(),
            legend_rise: default_legend_rise(),
            row_spacing: default_row_spacing(),
            swatch_size: default_swatch_size(),
            direct_color: default_direct_color(),
            secondary_color: default_secondary_color(),
            long_term_color: default_long_term_color(),
            text_color: default_text_color(),
        }
    }
}

/// Full-scale values of the metric gauges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugeConfig {
    #[serde(default = "default_energy_reference_max")]
    pub energy_max_megatons: f64,
    #[serde(default = "default_blast_radius_max")]
    pub blast_radius_max_km: f64,
    #[serde(default = "default_population_max")]
    pub population_max: f64,
}

fn default_blast_radius_max() -> f64 {
    500.0
}
fn default_population_max() -> f64 {
    10_000_000.0
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            energy_max_megatons: default_energy_reference_max(),
            blast_radius_max_km: default_blast_radius_max(),
            population_max: default_population_max(),
        }
    }
}

/// Animated globe scene.
///
/// Rates are angular increments per reference frame (`reference_fps`). The
/// animator multiplies them by elapsed seconds times `reference_fps`, so the
/// on-screen speed is the same at any real frame rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_reference_fps")]
    pub reference_fps: f32,
    #[serde(default = "default_globe_spin")]
    pub globe_spin_per_frame: f32,
    #[serde(default = "default_cloud_spin")]
    pub cloud_spin_per_frame: f32,
    #[serde(default = "default_starfield_spin")]
    pub starfield_spin_per_frame: f32,
    /// Axial tilt of the globe in degrees.
    #[serde(default = "default_axial_tilt")]
    pub axial_tilt_deg: f32,
    #[serde(default = "default_moon_orbit_radius")]
    pub moon_orbit_radius: f32,
    /// Orbital angular speed in radians per second.
    #[serde(default = "default_moon_orbit_speed")]
    pub moon_orbit_speed: f32,
    #[serde(default = "default_moon_vertical_amplitude")]
    pub moon_vertical_amplitude: f32,
    #[serde(default = "default_moon_spin")]
    pub moon_spin_per_frame: f32,
    #[serde(default = "default_moon_scale")]
    pub moon_scale: f32,
    #[serde(default = "default_cloud_scale")]
    pub cloud_scale: f32,
    #[serde(default = "default_star_count")]
    pub star_count: usize,
    #[serde(default = "default_star_inner_radius")]
    pub star_inner_radius: f32,
    #[serde(default = "default_star_outer_radius")]
    pub star_outer_radius: f32,
    #[serde(default = "default_trajectory_samples")]
    pub trajectory_samples: usize,
    #[serde(default = "default_trajectory_start_distance")]
    pub trajectory_start_distance: f32,
    #[serde(default = "default_trajectory_arc_height")]
    pub trajectory_arc_height: f32,
    /// Seconds for the asteroid to travel the whole trajectory once.
    #[serde(default = "default_approach_seconds")]
    pub approach_seconds: f32,
}

fn default_reference_fps() -> f32 {
    60.0
}
fn default_globe_spin() -> f32 {
    0.001
}
fn default_cloud_spin() -> f32 {
    0.0015
}
fn default_starfield_spin() -> f32 {
    0.0001
}
fn default_axial_tilt() -> f32 {
    23.4
}
fn default_moon_orbit_radius() -> f32 {
    15.0
}
fn default_moon_orbit_speed() -> f32 {
    0.1
}
fn default_moon_vertical_amplitude() -> f32 {
    2.0
}
fn default_moon_spin() -> f32 {
    0.005
}
fn default_moon_scale() -> f32 {
    0.27
}
fn default_cloud_scale() -> f32 {
    1.01
}
fn default_star_count() -> usize {
    5000
}
fn default_star_inner_radius() -> f32 {
    300.0
}
fn default_star_outer_radius() -> f32 {
    600.0
}
fn default_trajectory_samples() -> usize {
    64
}
fn default_trajectory_start_distance() -> f32 {
    60.0
}
fn default_trajectory_arc_height() -> f32 {
    12.0
}
fn default_approach_seconds() -> f32 {
    8.0
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            reference_fps: default_reference_fps(),
            globe_spin_per_frame: default_globe_spin(),
            cloud_spin_per_frame: default_cloud_spin(),
            starfield_spin_per_frame: default_starfield_spin(),
            axial_tilt_deg: default_axial_tilt(),
            moon_orbit_radius: default_moon_orbit_radius(),
            moon_orbit_speed: default_moon_orbit_speed(),
            moon_vertical_amplitude: default_moon_vertical_amplitude(),
            moon_spin_per_frame: default_moon_spin(),
            moon_scale: default_moon_scale(),
            cloud_scale: default_cloud_scale(),
            star_count: default_star_count(),
            star_inner_radius: default_star_inner_radius(),
            star_outer_radius: default_star_outer_radius(),
            trajectory_samples: default_trajectory_samples(),
            trajectory_start_distance: default_trajectory_start_distance(),
            trajectory_arc_height: default_trajectory_arc_height(),
            approach_seconds: default_approach_seconds(),
        }
    }
}

impl VizConfig {
    /// Load from `impact_viz.ron` in the working directory. Missing or invalid
    /// files fall back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::debug!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }

    /// Write the current config as pretty RON. Logs on error.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("impact_viz.ron")
}
