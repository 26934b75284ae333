//! Lifecycle of one visualization instance on a scene host.
//!
//! `Uninitialized -> Mounting -> Ready -> TearingDown -> Destroyed`.
//!
//! The manager owns the host, every overlay created on it and every pending
//! frame request. Overlays for the current impact are created on the host's
//! `Loaded` event, never before; impacts that arrive earlier are only
//! remembered. Teardown cancels frame requests first, then releases overlays,
//! then destroys the host. Anything arriving after `Destroyed` is ignored.

use engine_core::{FeedWatch, ImpactDescription, ImpactFeed, ResourceKind, VizError, WarnOnce};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use renderer::{
    projector, HostEvent, HostFactory, OverlayId, OverlaySpec, ProjectionMode, Rgb, SceneHost,
    GLOBE_RADIUS,
};

use crate::animator::SceneAnimator;
use crate::config::VizConfig;
use crate::overlay::{explosion_spec, FrameHandle, FrameLoop, FrameTask, OverlaySync};

const MARKER_COLOR: Rgb = Rgb::new(255.0, 0.0, 0.0);
const LABEL_OFFSET: Vec2 = Vec2::new(16.0, 16.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Mounting,
    Ready,
    TearingDown,
    Destroyed,
}

/// Sole owner of one host overlay. Released at most once.
#[derive(Debug)]
struct OverlayHandle {
    kind: ResourceKind,
    id: OverlayId,
}

impl OverlayHandle {
    fn create(
        host: &mut dyn SceneHost,
        kind: ResourceKind,
        spec: OverlaySpec,
    ) -> Option<OverlayHandle> {
        match host.add_overlay(spec) {
            Ok(id) => Some(OverlayHandle { kind, id }),
            Err(err) => {
                report(kind, &err);
                None
            }
        }
    }

    /// Consumes the handle, so a second release cannot be expressed.
    fn release(self, host: &mut dyn SceneHost) {
        if let Err(err) = host.remove_overlay(self.id) {
            log::debug!("release {:?} {:?}: {err}", self.kind, self.id);
        }
    }
}

fn report(kind: ResourceKind, err: &VizError) {
    if err.is_silent() {
        log::debug!("{kind:?}: {err}");
    } else {
        log::warn!("{kind:?}: {err}");
    }
}

/// Overlays belonging to the current impact.
#[derive(Debug, Default)]
struct ImpactOverlays {
    marker: Option<OverlayHandle>,
    explosion: Option<OverlayHandle>,
    label: Option<OverlayHandle>,
    sync: Option<OverlaySync>,
}

impl ImpactOverlays {
    fn release(&mut self, host: &mut dyn SceneHost, frames: &mut FrameLoop) {
        if let Some(mut sync) = self.sync.take() {
            sync.cancel(frames);
        }
        for handle in [self.marker.take(), self.explosion.take(), self.label.take()]
            .into_iter()
            .flatten()
        {
            handle.release(host);
        }
    }
}

pub struct LifecycleManager<H: SceneHost> {
    state: LifecycleState,
    config: VizConfig,
    host: Option<H>,
    frames: FrameLoop,
    impact: Option<ImpactDescription>,
    overlays: ImpactOverlays,
    starfield: Option<OverlayHandle>,
    animator: Option<SceneAnimator>,
    animate_request: Option<FrameHandle>,
    rng: Box<dyn RngCore>,
    invalid_input: WarnOnce,
}

impl<H: SceneHost> LifecycleManager<H> {
    pub fn new(config: VizConfig) -> Self {
        Self::with_rng(config, Box::new(StdRng::from_entropy()))
    }

    /// `rng` seeds the starfield.
    pub fn with_rng(config: VizConfig, rng: Box<dyn RngCore>) -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            config,
            host: None,
            frames: FrameLoop::new(),
            impact: None,
            overlays: ImpactOverlays::default(),
            starfield: None,
            animator: None,
            animate_request: None,
            rng,
            invalid_input: WarnOnce::new(),
        }
    }

    /// Create the host. Only valid once, from `Uninitialized`.
    pub fn mount<F>(&mut self, factory: &mut F) -> Result<(), VizError>
    where
        F: HostFactory<Host = H>,
    {
        match self.state {
            LifecycleState::Uninitialized => {}
            LifecycleState::Destroyed | LifecycleState::TearingDown => {
                return Err(VizError::ResourceReleased(ResourceKind::Scene));
            }
            _ => {
                log::debug!("mount ignored in state {:?}", self.state);
                return Ok(());
            }
        }
        self.host = Some(factory.create(&self.config.host));
        self.transition(LifecycleState::Mounting);
        Ok(())
    }

    /// Replace the current impact. Overlays follow immediately when ready,
    /// otherwise on `Loaded`.
    pub fn set_impact(&mut self, impact: Option<ImpactDescription>) {
        if self.is_finished() {
            log::debug!("impact update after teardown ignored");
            return;
        }
        self.impact = impact;
        if self.state == LifecycleState::Ready {
            self.apply_impact();
        }
    }

    /// Pull the feed's value if it changed since `watch` last looked.
    pub fn sync_feed(&mut self, feed: &ImpactFeed, watch: &mut FeedWatch) {
        if watch.changed(feed) {
            self.set_impact(feed.current().cloned());
        }
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        if self.is_finished() {
            log::debug!("{event:?} after teardown ignored");
            return;
        }
        match event {
            HostEvent::Loaded if self.state == LifecycleState::Mounting => self.on_ready(),
            HostEvent::Loaded => log::debug!("duplicate Loaded in state {:?}", self.state),
        }
    }

    /// Run one frame: host work, host events, then the frame requests due.
    /// Returns how many requests ran.
    pub fn frame(&mut self, dt: f64) -> usize {
        if self.is_finished() {
            return 0;
        }
        let Some(host) = self.host.as_mut() else {
            return 0;
        };
        host.on_frame(dt);
        while let Some(event) = self.host.as_mut().and_then(|h| h.poll_event()) {
            self.handle_event(event);
        }

        let due = self.frames.take_due();
        let ran = due.len();
        for (handle, task) in due {
            self.run_task(handle, task, dt);
        }

        if self.host.as_ref().is_some_and(|h| h.is_destroyed()) {
            log::debug!("host destroyed underneath the manager; tearing down");
            self.teardown();
        }
        ran
    }

    fn run_task(&mut self, handle: FrameHandle, task: FrameTask, dt: f64) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        match task {
            FrameTask::SyncOverlay(id) => {
                let Some(sync) = self.overlays.sync.as_mut().filter(|s| s.overlay() == id) else {
                    return;
                };
                if sync.run(handle, host).wants_next_frame() {
                    sync.schedule(&mut self.frames);
                }
            }
            FrameTask::AnimateScene => {
                if self.animate_request != Some(handle) {
                    return;
                }
                self.animate_request = None;
                let Some(animator) = self.animator.as_mut() else {
                    return;
                };
                animator.tick(dt);
                match animator.push_to_host(host) {
                    Ok(()) => {
                        self.animate_request = Some(self.frames.request(FrameTask::AnimateScene));
                    }
                    Err(err) => log::debug!("scene animation stopped: {err}"),
                }
            }
        }
    }

    /// Release everything and destroy the host. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.is_finished() {
            return;
        }
        self.transition(LifecycleState::TearingDown);

        let cancelled = self.frames.cancel_all();
        self.animate_request = None;
        if cancelled > 0 {
            log::debug!("cancelled {cancelled} frame requests");
        }

        if let Some(host) = self.host.as_mut() {
            self.overlays.release(host, &mut self.frames);
            if let Some(starfield) = self.starfield.take() {
                starfield.release(host);
            }
            host.destroy();
        }
        self.animator = None;
        self.transition(LifecycleState::Destroyed);
    }

    fn on_ready(&mut self) {
        self.transition(LifecycleState::Ready);
        let Some(host) = self.host.as_mut() else {
            return;
        };
        log::info!("scene ready ({:?})", self.config.host.projection);

        if let Err(err) = host.apply_atmosphere(&self.config.host.atmosphere) {
            report(ResourceKind::Scene, &err);
        }

        if self.config.host.projection == ProjectionMode::Globe {
            let animator = SceneAnimator::new(&self.config.scene, &mut *self.rng);
            let stars = animator.starfield();
            self.starfield = OverlayHandle::create(
                host,
                ResourceKind::Starfield,
                OverlaySpec::PointBuffer {
                    bytes: stars.as_bytes().to_vec(),
                    vertex_count: stars.len(),
                },
            );
            self.animator = Some(animator);
            self.animate_request = Some(self.frames.request(FrameTask::AnimateScene));
        }

        self.apply_impact();
    }

    /// Destroy the previous impact's overlays, then create the new ones.
    fn apply_impact(&mut self) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        self.overlays.release(host, &mut self.frames);

        let Some(impact) = self.impact.as_ref() else {
            if let Some(animator) = self.animator.as_mut() {
                animator.set_impact_target(None);
            }
            return;
        };
        // Overlays and the asteroid only need the location.
        if let Err(err) = impact.position().validate() {
            self.invalid_input.report("impact overlays", &err);
            if let Some(animator) = self.animator.as_mut() {
                animator.set_impact_target(None);
            }
            return;
        }
        let at = impact.position();

        self.overlays.marker = OverlayHandle::create(
            host,
            ResourceKind::Marker,
            OverlaySpec::Marker { at, color: MARKER_COLOR },
        );
        let (zoom, speed) = (self.config.host.fly_to_zoom, self.config.host.fly_to_speed);
        if let Err(err) = host.fly_to(at, zoom, speed) {
            report(ResourceKind::Scene, &err);
        }

        self.overlays.explosion =
            OverlayHandle::create(host, ResourceKind::Explosion, explosion_spec());
        if let Some(explosion) = &self.overlays.explosion {
            let mut sync = OverlaySync::new(at, explosion.id);
            sync.schedule(&mut self.frames);
            self.overlays.sync = Some(sync);
        }

        if let Some(text) = &impact.location_label {
            self.overlays.label = OverlayHandle::create(
                host,
                ResourceKind::Label,
                OverlaySpec::Label { text: text.clone(), at: LABEL_OFFSET },
            );
        }

        if let Some(animator) = self.animator.as_mut() {
            let target = projector::to_world(at.latitude, at.longitude, GLOBE_RADIUS)
                .map(|w| w.as_vec3());
            animator.set_impact_target(target);
        }
    }

    fn transition(&mut self, next: LifecycleState) {
        log::debug!("lifecycle: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn is_finished(&self) -> bool {
        matches!(
            self.state,
            LifecycleState::TearingDown | LifecycleState::Destroyed
        )
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    /// The host, kept after teardown so callers can inspect it.
    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    pub fn impact(&self) -> Option<&ImpactDescription> {
        self.impact.as_ref()
    }

    pub fn animator(&self) -> Option<&SceneAnimator> {
        self.animator.as_ref()
    }

    pub fn overlay_sync(&self) -> Option<&OverlaySync> {
        self.overlays.sync.as_ref()
    }

    pub fn marker(&self) -> Option<OverlayId> {
        self.overlays.marker.as_ref().map(|h| h.id)
    }

    pub fn explosion(&self) -> Option<OverlayId> {
        self.overlays.explosion.as_ref().map(|h| h.id)
    }

    pub fn label(&self) -> Option<OverlayId> {
        self.overlays.label.as_ref().map(|h| h.id)
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.pending_count()
    }
}

impl<H: SceneHost> Drop for LifecycleManager<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
