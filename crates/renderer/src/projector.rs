//! Geodetic projector: geographic coordinates to world space and screen space.

use engine_core::GeoPosition;
use glam::{DVec3, Vec2};

/// Radius of the rendered globe in scene units.
pub const GLOBE_RADIUS: f64 = 5.0;

/// A host-side projection from geographic coordinates to viewport pixels.
pub trait Projection {
    /// Pixel position of `geo`, or `None` while the projection is not ready
    /// or the point cannot be shown (e.g. behind the globe).
    fn project(&self, geo: GeoPosition) -> Option<Vec2>;

    /// Viewport size in pixels.
    fn viewport(&self) -> Vec2;
}

/// Convert (lat, lon) in degrees to a point on a sphere of `radius`.
///
/// Scene frame is right-handed with +Y up and the prime meridian on +X.
/// Longitude is negated before use so that east runs toward -Z, which is
/// what the globe texture and camera in this engine treat as east. The
/// negation is a rendering convention, not a geodetic one.
///
/// Returns `None` for non-finite input so callers skip drawing.
pub fn to_world(latitude: f64, longitude: f64, radius: f64) -> Option<DVec3> {
    if !(latitude.is_finite() && longitude.is_finite() && radius.is_finite()) {
        return None;
    }
    let lat = latitude.to_radians();
    let lon = -longitude.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    Some(DVec3::new(
        radius * cos_lat * cos_lon,
        radius * sin_lat,
        radius * cos_lat * sin_lon,
    ))
}

/// Inverse of [`to_world`] for a point anywhere off the origin.
pub fn to_geo(world: DVec3) -> Option<GeoPosition> {
    let r = world.length();
    if !r.is_finite() || r == 0.0 {
        return None;
    }
    let latitude = (world.y / r).clamp(-1.0, 1.0).asin().to_degrees();
    let longitude = -world.z.atan2(world.x).to_degrees();
    Some(GeoPosition::new(latitude, longitude))
}

/// Project `geo` through the host's current projection.
///
/// There is no fallback: `None` means "skip this frame". Callers are expected
/// to retry on the next frame rather than draw a stale position.
pub fn to_screen(geo: GeoPosition, projection: &dyn Projection) -> Option<Vec2> {
    if !geo.latitude.is_finite() || !geo.longitude.is_finite() {
        return None;
    }
    projection.project(geo).filter(|p| p.is_finite())
}

/// Shortest signed longitude difference from `from` to `to`, in degrees.
pub fn longitude_delta(from: f64, to: f64) -> f64 {
    let mut delta = (to - from) % 360.0;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    delta
}

/// Wrap a longitude into [-180, 180].
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}
