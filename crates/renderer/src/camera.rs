//! Camera and map projections used by the headless host.

use engine_core::GeoPosition;
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::projector::{self, Projection, GLOBE_RADIUS};

/// Pixel size of one map tile at zoom 0.
pub const TILE_SIZE: f64 = 512.0;
/// Web-Mercator latitude limit.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Perspective camera orbiting the globe and looking at its centre.
#[derive(Debug, Clone)]
pub struct GlobeCamera {
    /// Geographic point directly under the camera.
    pub center: GeoPosition,
    /// Map-style zoom level; mapped to an orbit distance.
    pub zoom: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport in pixels.
    pub viewport: Vec2,
}

impl GlobeCamera {
    pub fn new(center: GeoPosition, zoom: f32, viewport: Vec2) -> Self {
        Self {
            center,
            zoom,
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            viewport,
        }
    }

    /// Orbit distance from the globe centre in globe radii.
    /// Each zoom step halves the altitude above the surface.
    pub fn distance_radii(&self) -> f32 {
        1.0 + 24.0 / 2f32.powf(self.zoom.max(0.0))
    }

    pub fn eye(&self) -> Vec3 {
        let distance = GLOBE_RADIUS * self.distance_radii() as f64;
        projector::to_world(self.center.latitude, self.center.longitude, distance)
            .map(|p| p.as_vec3())
            .unwrap_or(Vec3::new(distance as f32, 0.0, 0.0))
    }

    pub fn view_matrix(&self) -> Mat4 {
        // Looking straight down a pole makes +Y degenerate as an up vector.
        let up = if self.center.latitude.abs() > 89.0 {
            Vec3::NEG_Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.viewport.x / self.viewport.y.max(1.0);
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project an arbitrary world-space point. `None` if behind the camera.
    pub fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }
}

impl Projection for GlobeCamera {
    fn project(&self, geo: GeoPosition) -> Option<Vec2> {
        let world = projector::to_world(geo.latitude, geo.longitude, GLOBE_RADIUS)?.as_vec3();
        // Points on the far hemisphere are occluded by the globe itself.
        let to_eye = self.eye() - world;
        if world.dot(to_eye) <= 0.0 {
            return None;
        }
        self.world_to_screen(world)
    }

    fn viewport(&self) -> Vec2 {
        self.viewport
    }
}

/// Flat Web-Mercator map view centred on a geographic point.
#[derive(Debug, Clone)]
pub struct MapView {
    pub center: GeoPosition,
    pub zoom: f32,
    pub viewport: Vec2,
}

impl MapView {
    pub fn new(center: GeoPosition, zoom: f32, viewport: Vec2) -> Self {
        Self {
            center,
            zoom,
            viewport,
        }
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom as f64)
    }

    /// Mercator world pixel coordinates at the current zoom.
    pub fn mercator(&self, geo: GeoPosition) -> (f64, f64) {
        let size = self.world_size();
        let lat = geo.latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let x = (geo.longitude + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
        (x, y)
    }
}

impl Projection for MapView {
    fn project(&self, geo: GeoPosition) -> Option<Vec2> {
        let (px, py) = self.mercator(geo);
        let (cx, cy) = self.mercator(self.center);
        let size = self.world_size();
        // Take the horizontally nearest copy of the world.
        let mut dx = px - cx;
        if dx > size / 2.0 {
            dx -= size;
        } else if dx < -size / 2.0 {
            dx += size;
        }
        Some(Vec2::new(
            (dx + self.viewport.x as f64 / 2.0) as f32,
            (py - cy + self.viewport.y as f64 / 2.0) as f32,
        ))
    }

    fn viewport(&self) -> Vec2 {
        self.viewport
    }
}
