//! Capability surface of the map / 3D scene host.
//!
//! The engine never talks to a concrete map or WebGL library. It drives
//! anything implementing [`SceneHost`], created through a [`HostFactory`]
//! from an explicit [`HostConfig`].

use engine_core::{GeoPosition, VizError};
use glam::{Mat4, Vec2};
use serde::{Deserialize, Serialize};

use crate::surface::Rgb;

/// Flat web map or full 3D globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMode {
    Flat,
    Globe,
}

/// Sky / atmosphere layer applied once the host is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereConfig {
    /// Sun position as [azimuth, polar] degrees.
    #[serde(default = "default_sun_position")]
    pub sun_position: [f32; 2],
    #[serde(default = "default_sun_intensity")]
    pub sun_intensity: f32,
}

fn default_sun_position() -> [f32; 2] {
    [0.0, 90.0]
}
fn default_sun_intensity() -> f32 {
    15.0
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            sun_position: default_sun_position(),
            sun_intensity: default_sun_intensity(),
        }
    }
}

/// Everything a host needs at creation time. Passed explicitly to the
/// factory; there is no process-wide host state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Initial centre used when no impact is known yet.
    #[serde(default = "default_center")]
    pub center: GeoPosition,
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    #[serde(default = "default_zoom")]
    pub min_zoom: f32,
    #[serde(default = "default_zoom")]
    pub max_zoom: f32,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default = "default_projection")]
    pub projection: ProjectionMode,
    /// Access key for the tile / style provider, if it needs one.
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub atmosphere: AtmosphereConfig,
    /// Viewport in pixels.
    #[serde(default = "default_viewport")]
    pub viewport: [f32; 2],
    /// Zoom used when flying to a new impact.
    #[serde(default = "default_fly_zoom")]
    pub fly_to_zoom: f32,
    #[serde(default = "default_fly_speed")]
    pub fly_to_speed: f32,
    /// Frames the headless host waits before signalling `Loaded`.
    #[serde(default = "default_load_frames")]
    pub load_frames: u32,
}

fn default_center() -> GeoPosition {
    GeoPosition::new(23.807_133, 90.368_603)
}
fn default_zoom() -> f32 {
    4.0
}
fn default_projection() -> ProjectionMode {
    ProjectionMode::Globe
}
fn default_viewport() -> [f32; 2] {
    [960.0, 864.0]
}
fn default_fly_zoom() -> f32 {
    5.0
}
fn default_fly_speed() -> f32 {
    0.8
}
fn default_load_frames() -> u32 {
    3
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            min_zoom: default_zoom(),
            max_zoom: default_zoom(),
            interactive: false,
            projection: default_projection(),
            access_key: None,
            atmosphere: AtmosphereConfig::default(),
            viewport: default_viewport(),
            fly_to_zoom: default_fly_zoom(),
            fly_to_speed: default_fly_speed(),
            load_frames: default_load_frames(),
        }
    }
}

impl HostConfig {
    pub fn viewport(&self) -> Vec2 {
        Vec2::from(self.viewport)
    }

    /// Zoom clamped to the configured bounds.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        let (lo, hi) = if self.min_zoom <= self.max_zoom {
            (self.min_zoom, self.max_zoom)
        } else {
            (self.max_zoom, self.min_zoom)
        };
        zoom.clamp(lo, hi)
    }
}

/// Asynchronous signals raised by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Style, tiles or scene graph finished loading.
    Loaded,
}

/// Identifier of an overlay owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// Animated 3D bodies whose model matrices the host accepts each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneBody {
    Globe,
    Clouds,
    Moon,
    Starfield,
    Asteroid,
}

/// What to create on the host.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlaySpec {
    /// Geo-anchored pin that the host keeps in place by itself.
    Marker { at: GeoPosition, color: Rgb },
    /// Screen-space explosion effect; the engine positions it every frame.
    Explosion { debris_angles_deg: Vec<f32> },
    /// Fixed text label at a viewport pixel position.
    Label { text: String, at: Vec2 },
    /// Static point buffer (the starfield), raw vertex bytes.
    PointBuffer { bytes: Vec<u8>, vertex_count: usize },
}

impl OverlaySpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            OverlaySpec::Marker { .. } => "marker",
            OverlaySpec::Explosion { .. } => "explosion",
            OverlaySpec::Label { .. } => "label",
            OverlaySpec::PointBuffer { .. } => "point-buffer",
        }
    }
}

/// The map / scene host as seen by the engine.
///
/// Every mutating call on a destroyed host must fail with
/// `VizError::ResourceReleased` instead of panicking.
pub trait SceneHost {
    /// Next pending host event, if any.
    fn poll_event(&mut self) -> Option<HostEvent>;

    fn is_ready(&self) -> bool;

    /// Current pixel position of `geo`; `None` while not ready or while the
    /// point is occluded (far side of the globe).
    fn project(&self, geo: GeoPosition) -> Option<Vec2>;

    fn add_overlay(&mut self, spec: OverlaySpec) -> Result<OverlayId, VizError>;

    fn set_overlay_position(&mut self, id: OverlayId, screen: Vec2) -> Result<(), VizError>;

    /// Show or hide a screen-space overlay without removing it.
    fn set_overlay_visible(&mut self, id: OverlayId, visible: bool) -> Result<(), VizError>;

    fn remove_overlay(&mut self, id: OverlayId) -> Result<(), VizError>;

    /// Start an animated camera move toward `target`.
    fn fly_to(&mut self, target: GeoPosition, zoom: f32, speed: f32) -> Result<(), VizError>;

    fn apply_atmosphere(&mut self, atmosphere: &AtmosphereConfig) -> Result<(), VizError>;

    fn set_body_transform(&mut self, body: SceneBody, model: Mat4) -> Result<(), VizError>;

    /// Host-side per-frame work (loading progress, camera animation).
    fn on_frame(&mut self, dt: f64);

    /// Release everything. Must be safe to call more than once.
    fn destroy(&mut self);

    fn is_destroyed(&self) -> bool;
}

/// Creates hosts from configuration.
pub trait HostFactory {
    type Host: SceneHost;

    fn create(&mut self, config: &HostConfig) -> Self::Host;
}
