//! Headless scene host: a software stand-in for the map / WebGL host.
//!
//! It loads after a configurable number of frames, projects through a
//! [`GlobeCamera`] or [`MapView`] depending on the projection mode, animates
//! fly-to moves and records every overlay so callers can inspect them.

use std::collections::{BTreeMap, HashMap, VecDeque};

use engine_core::{GeoPosition, ResourceKind, VizError};
use glam::{Mat4, Vec2};

use crate::camera::{GlobeCamera, MapView};
use crate::host::{
    AtmosphereConfig, HostConfig, HostEvent, HostFactory, OverlayId, OverlaySpec, ProjectionMode,
    SceneBody, SceneHost,
};
use crate::projector::{self, Projection};

#[derive(Debug, Clone)]
enum View {
    Globe(GlobeCamera),
    Flat(MapView),
}

impl View {
    fn center(&self) -> GeoPosition {
        match self {
            View::Globe(c) => c.center,
            View::Flat(m) => m.center,
        }
    }

    fn zoom(&self) -> f32 {
        match self {
            View::Globe(c) => c.zoom,
            View::Flat(m) => m.zoom,
        }
    }

    fn set(&mut self, center: GeoPosition, zoom: f32) {
        match self {
            View::Globe(c) => {
                c.center = center;
                c.zoom = zoom;
            }
            View::Flat(m) => {
                m.center = center;
                m.zoom = zoom;
            }
        }
    }

    fn projection(&self) -> &dyn Projection {
        match self {
            View::Globe(c) => c,
            View::Flat(m) => m,
        }
    }
}

#[derive(Debug, Clone)]
struct FlyTo {
    from: GeoPosition,
    from_zoom: f32,
    to: GeoPosition,
    to_zoom: f32,
    duration_s: f64,
    t: f64,
}

/// One overlay as the host sees it.
#[derive(Debug, Clone)]
pub struct OverlayRecord {
    pub spec: OverlaySpec,
    /// Last position written by the engine (screen-space overlays only).
    pub position: Option<Vec2>,
    pub position_writes: u64,
    pub visible: bool,
}

#[derive(Debug)]
pub struct HeadlessHost {
    config: HostConfig,
    view: View,
    frames_until_ready: u32,
    ready: bool,
    destroyed: bool,
    events: VecDeque<HostEvent>,
    overlays: BTreeMap<OverlayId, OverlayRecord>,
    next_overlay: u64,
    atmosphere: Option<AtmosphereConfig>,
    bodies: HashMap<SceneBody, Mat4>,
    fly: Option<FlyTo>,
}

impl HeadlessHost {
    pub fn new(config: &HostConfig) -> Self {
        let zoom = config.clamp_zoom(config.zoom);
        let view = match config.projection {
            ProjectionMode::Globe => View::Globe(GlobeCamera::new(config.center, zoom, config.viewport())),
            ProjectionMode::Flat => View::Flat(MapView::new(config.center, zoom, config.viewport())),
        };
        if config.access_key.is_none() {
            log::debug!("headless host created without an access key");
        }
        Self {
            config: config.clone(),
            view,
            frames_until_ready: config.load_frames,
            ready: false,
            destroyed: false,
            events: VecDeque::new(),
            overlays: BTreeMap::new(),
            next_overlay: 1,
            atmosphere: None,
            bodies: HashMap::new(),
            fly: None,
        }
    }

    /// Queue a host event by hand (e.g. a late `Loaded`).
    pub fn push_event(&mut self, event: HostEvent) {
        self.events.push_back(event);
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn center(&self) -> GeoPosition {
        self.view.center()
    }

    pub fn zoom(&self) -> f32 {
        self.view.zoom()
    }

    pub fn is_flying(&self) -> bool {
        self.fly.is_some()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&OverlayRecord> {
        self.overlays.get(&id)
    }

    pub fn overlays(&self) -> impl Iterator<Item = (&OverlayId, &OverlayRecord)> {
        self.overlays.iter()
    }

    /// Number of live overlays of the given kind.
    pub fn count_kind(&self, kind: &str) -> usize {
        self.overlays.values().filter(|o| o.spec.kind_name() == kind).count()
    }

    pub fn atmosphere(&self) -> Option<&AtmosphereConfig> {
        self.atmosphere.as_ref()
    }

    pub fn body_transform(&self, body: SceneBody) -> Option<Mat4> {
        self.bodies.get(&body).copied()
    }

    fn check_alive(&self) -> Result<(), VizError> {
        if self.destroyed {
            Err(VizError::ResourceReleased(ResourceKind::Scene))
        } else {
            Ok(())
        }
    }

    fn check_ready(&self) -> Result<(), VizError> {
        self.check_alive()?;
        if self.ready {
            Ok(())
        } else {
            Err(VizError::NotReady)
        }
    }

    fn advance_fly(&mut self, dt: f64) {
        let Some(fly) = self.fly.as_mut() else {
            return;
        };
        fly.t = (fly.t + dt / fly.duration_s).min(1.0);
        // Smoothstep easing.
        let s = fly.t * fly.t * (3.0 - 2.0 * fly.t);
        let lat = fly.from.latitude + (fly.to.latitude - fly.from.latitude) * s;
        let lon = fly.from.longitude + projector::longitude_delta(fly.from.longitude, fly.to.longitude) * s;
        let zoom = fly.from_zoom + (fly.to_zoom - fly.from_zoom) * s as f32;
        let done = fly.t >= 1.0;
        self.view
            .set(GeoPosition::new(lat, projector::normalize_longitude(lon)), zoom);
        if done {
            self.fly = None;
        }
    }
}

impl SceneHost for HeadlessHost {
    fn poll_event(&mut self) -> Option<HostEvent> {
        self.events.pop_front()
    }

    fn is_ready(&self) -> bool {
        self.ready && !self.destroyed
    }

    fn project(&self, geo: GeoPosition) -> Option<Vec2> {
        if !self.is_ready() {
            return None;
        }
        projector::to_screen(geo, self.view.projection())
    }

    fn add_overlay(&mut self, spec: OverlaySpec) -> Result<OverlayId, VizError> {
        self.check_ready()?;
        let id = OverlayId(self.next_overlay);
        self.next_overlay += 1;
        log::debug!("host: add {} overlay {:?}", spec.kind_name(), id);
        self.overlays.insert(
            id,
            OverlayRecord {
                spec,
                position: None,
                position_writes: 0,
                visible: true,
            },
        );
        Ok(id)
    }

    fn set_overlay_position(&mut self, id: OverlayId, screen: Vec2) -> Result<(), VizError> {
        self.check_alive()?;
        let record = self
            .overlays
            .get_mut(&id)
            .ok_or(VizError::ResourceReleased(ResourceKind::Explosion))?;
        record.position = Some(screen);
        record.position_writes += 1;
        Ok(())
    }

    fn set_overlay_visible(&mut self, id: OverlayId, visible: bool) -> Result<(), VizError> {
        self.check_alive()?;
        let record = self
            .overlays
            .get_mut(&id)
            .ok_or(VizError::ResourceReleased(ResourceKind::Explosion))?;
        if record.visible != visible {
            log::debug!("host: overlay {:?} visible={}", id, visible);
        }
        record.visible = visible;
        Ok(())
    }

    fn remove_overlay(&mut self, id: OverlayId) -> Result<(), VizError> {
        self.check_alive()?;
        match self.overlays.remove(&id) {
            Some(record) => {
                log::debug!("host: removed {} overlay {:?}", record.spec.kind_name(), id);
                Ok(())
            }
            None => Err(VizError::ResourceReleased(ResourceKind::Marker)),
        }
    }

    fn fly_to(&mut self, target: GeoPosition, zoom: f32, speed: f32) -> Result<(), VizError> {
        self.check_ready()?;
        target.validate()?;
        let speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
        self.fly = Some(FlyTo {
            from: self.view.center(),
            from_zoom: self.view.zoom(),
            to: target,
            to_zoom: self.config.clamp_zoom(zoom),
            duration_s: 1.2 / speed as f64,
            t: 0.0,
        });
        Ok(())
    }

    fn apply_atmosphere(&mut self, atmosphere: &AtmosphereConfig) -> Result<(), VizError> {
        self.check_ready()?;
        self.atmosphere = Some(atmosphere.clone());
        Ok(())
    }

    fn set_body_transform(&mut self, body: SceneBody, model: Mat4) -> Result<(), VizError> {
        self.check_alive()?;
        self.bodies.insert(body, model);
        Ok(())
    }

    fn on_frame(&mut self, dt: f64) {
        if self.destroyed {
            return;
        }
        if !self.ready {
            if self.frames_until_ready == 0 {
                self.ready = true;
                self.events.push_back(HostEvent::Loaded);
                log::info!("host loaded ({:?} projection)", self.config.projection);
            } else {
                self.frames_until_ready -= 1;
            }
            return;
        }
        self.advance_fly(dt);
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.ready = false;
        if !self.overlays.is_empty() {
            log::debug!("host destroyed with {} overlays still attached", self.overlays.len());
        }
        self.overlays.clear();
        self.bodies.clear();
        self.fly = None;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Factory for [`HeadlessHost`]; counts hosts it has created.
#[derive(Debug, Default)]
pub struct HeadlessFactory {
    pub created: usize,
}

impl HostFactory for HeadlessFactory {
    type Host = HeadlessHost;

    fn create(&mut self, config: &HostConfig) -> HeadlessHost {
        self.created += 1;
        HeadlessHost::new(config)
    }
}
