//! Per-frame scheduling and the screen-space overlay synchronizer.
//!
//! Frame requests are one-shot, like `requestAnimationFrame`: a task that
//! wants to run again asks for the next frame explicitly and gets a fresh
//! [`FrameHandle`]. Every handle can be cancelled, and a cancelled handle
//! never runs.

use engine_core::{GeoPosition, VizError};
use glam::Vec2;
use renderer::{OverlayId, OverlaySpec, SceneHost};

/// Cancellation handle for one frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

/// Work that can be requested for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTask {
    /// Re-project the overlay and write its screen position.
    SyncOverlay(OverlayId),
    /// Advance the animated globe scene.
    AnimateScene,
}

/// Pending frame requests, run in request order.
#[derive(Debug, Default)]
pub struct FrameLoop {
    next_handle: u64,
    pending: Vec<(FrameHandle, FrameTask)>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, task: FrameTask) -> FrameHandle {
        let handle = FrameHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.pending.push((handle, task));
        handle
    }

    /// Returns false if the request already ran or was cancelled.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(h, _)| *h != handle);
        self.pending.len() != before
    }

    /// Cancel everything; returns how many requests were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Take the requests due this frame. Requests made while running them
    /// land in the next frame.
    pub fn take_due(&mut self) -> Vec<(FrameHandle, FrameTask)> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.iter().any(|(h, _)| *h == handle)
    }
}

/// Result of one synchronizer run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncStep {
    /// Overlay written at this screen position.
    Moved(Vec2),
    /// Projection not available this frame; try again next frame.
    Skipped,
    /// Target is on the far side of the globe; the overlay is hidden until
    /// it comes back into view.
    Hidden,
    /// Overlay or host is gone. Do not reschedule.
    Released,
    /// Handle was not the pending one (cancelled or superseded). Nothing done.
    Stale,
}

impl SyncStep {
    pub fn wants_next_frame(&self) -> bool {
        matches!(self, SyncStep::Moved(_) | SyncStep::Skipped | SyncStep::Hidden)
    }
}

/// Keeps one screen-space overlay pinned to a geo position.
///
/// Screen positions are never cached across frames: every run projects
/// again against the host's current camera.
#[derive(Debug)]
pub struct OverlaySync {
    target: GeoPosition,
    overlay: OverlayId,
    pending: Option<FrameHandle>,
    released: bool,
    hidden: bool,
    skipped_frames: u64,
    last_screen: Option<Vec2>,
}

impl OverlaySync {
    pub fn new(target: GeoPosition, overlay: OverlayId) -> Self {
        Self {
            target,
            overlay,
            pending: None,
            released: false,
            hidden: false,
            skipped_frames: 0,
            last_screen: None,
        }
    }

    pub fn overlay(&self) -> OverlayId {
        self.overlay
    }

    pub fn target(&self) -> GeoPosition {
        self.target
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Whether the overlay is currently hidden behind the globe.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// Screen position written by the most recent successful run.
    pub fn last_screen(&self) -> Option<Vec2> {
        self.last_screen
    }

    /// Request the next frame. At most one request is ever outstanding, so a
    /// second call returns the existing handle. Returns `None` once released.
    pub fn schedule(&mut self, frames: &mut FrameLoop) -> Option<FrameHandle> {
        if self.released {
            return None;
        }
        if let Some(handle) = self.pending {
            if frames.is_pending(handle) {
                return Some(handle);
            }
        }
        let handle = frames.request(FrameTask::SyncOverlay(self.overlay));
        self.pending = Some(handle);
        Some(handle)
    }

    /// Run the frame request `handle`.
    pub fn run(&mut self, handle: FrameHandle, host: &mut dyn SceneHost) -> SyncStep {
        if self.pending != Some(handle) {
            return SyncStep::Stale;
        }
        self.pending = None;

        if self.released || host.is_destroyed() {
            self.released = true;
            log::debug!("overlay {:?}: host torn down, update dropped", self.overlay);
            return SyncStep::Released;
        }

        let Some(screen) = host.project(self.target) else {
            if !host.is_ready() {
                self.skipped_frames += 1;
                return SyncStep::Skipped;
            }
            if !self.hidden {
                if let Err(err) = host.set_overlay_visible(self.overlay, false) {
                    return self.failed(err);
                }
                self.hidden = true;
            }
            return SyncStep::Hidden;
        };

        if self.hidden {
            if let Err(err) = host.set_overlay_visible(self.overlay, true) {
                return self.failed(err);
            }
            self.hidden = false;
        }
        match host.set_overlay_position(self.overlay, screen) {
            Ok(()) => {
                self.last_screen = Some(screen);
                SyncStep::Moved(screen)
            }
            Err(err) => self.failed(err),
        }
    }

    fn failed(&mut self, err: VizError) -> SyncStep {
        if err == VizError::NotReady {
            self.skipped_frames += 1;
            return SyncStep::Skipped;
        }
        log::debug!("overlay {:?}: {err}", self.overlay);
        self.released = true;
        SyncStep::Released
    }

    /// Stop synchronizing: cancel the pending request and refuse new ones.
    pub fn cancel(&mut self, frames: &mut FrameLoop) {
        if let Some(handle) = self.pending.take() {
            frames.cancel(handle);
        }
        self.released = true;
    }
}

/// Explosion effect with eight debris spokes, one every 45 degrees.
pub fn explosion_spec() -> OverlaySpec {
    OverlaySpec::Explosion {
        debris_angles_deg: (0..8).map(|i| i as f32 * 45.0).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{HeadlessHost, HostConfig, HostEvent, ProjectionMode};

    fn loaded(projection: ProjectionMode) -> HeadlessHost {
        let mut host = HeadlessHost::new(&HostConfig {
            projection,
            load_frames: 0,
            ..Default::default()
        });
        host.on_frame(0.016);
        assert_eq!(host.poll_event(), Some(HostEvent::Loaded));
        host
    }

    fn dhaka() -> GeoPosition {
        GeoPosition::new(23.8, 90.4)
    }

    #[test]
    fn frame_requests_are_one_shot_and_cancellable() {
        let mut frames = FrameLoop::new();
        let a = frames.request(FrameTask::AnimateScene);
        let b = frames.request(FrameTask::AnimateScene);
        assert_ne!(a, b);
        assert!(frames.cancel(a));
        assert!(!frames.cancel(a));
        let due = frames.take_due();
        assert_eq!(due, vec![(b, FrameTask::AnimateScene)]);
        assert_eq!(frames.pending_count(), 0);
        assert!(!frames.cancel(b));
    }

    #[test]
    fn only_one_pending_update() {
        let mut frames = FrameLoop::new();
        let mut sync = OverlaySync::new(dhaka(), OverlayId(1));
        let first = sync.schedule(&mut frames);
        let second = sync.schedule(&mut frames);
        assert_eq!(first, second);
        assert_eq!(frames.pending_count(), 1);
    }

    #[test]
    fn follows_the_projection_every_frame() {
        for projection in [ProjectionMode::Globe, ProjectionMode::Flat] {
            let mut host = loaded(projection);
            let id = host.add_overlay(explosion_spec()).unwrap();
            let mut frames = FrameLoop::new();
            let mut sync = OverlaySync::new(dhaka(), id);
            sync.schedule(&mut frames);

            for _ in 0..3 {
                for (handle, task) in frames.take_due() {
                    assert_eq!(task, FrameTask::SyncOverlay(id));
                    let step = sync.run(handle, &mut host);
                    assert_eq!(step, SyncStep::Moved(host.project(dhaka()).unwrap()));
                    sync.schedule(&mut frames);
                }
            }
            assert_eq!(host.overlay(id).unwrap().position_writes, 3);
        }
    }

    #[test]
    fn not_ready_is_skipped_then_resumes() {
        let mut host = HeadlessHost::new(&HostConfig {
            load_frames: 1,
            ..Default::default()
        });
        let mut frames = FrameLoop::new();
        let mut sync = OverlaySync::new(dhaka(), OverlayId(1));

        let h = sync.schedule(&mut frames).unwrap();
        assert_eq!(sync.run(h, &mut host), SyncStep::Skipped);
        host.on_frame(0.016);
        host.on_frame(0.016);
        assert!(host.is_ready());
        let id = host.add_overlay(explosion_spec()).unwrap();

        let mut sync = OverlaySync::new(dhaka(), id);
        let h = sync.schedule(&mut frames).unwrap();
        assert!(matches!(sync.run(h, &mut host), SyncStep::Moved(_)));
        assert!(sync.last_screen().is_some());
    }

    #[test]
    fn teardown_mid_frame_is_a_no_op() {
        let mut host = loaded(ProjectionMode::Globe);
        let id = host.add_overlay(explosion_spec()).unwrap();
        let mut frames = FrameLoop::new();
        let mut sync = OverlaySync::new(dhaka(), id);
        let h = sync.schedule(&mut frames).unwrap();

        host.destroy();
        let step = sync.run(h, &mut host);
        assert_eq!(step, SyncStep::Released);
        assert!(!step.wants_next_frame());
        assert_eq!(sync.schedule(&mut frames), None);
    }

    #[test]
    fn cancelled_handle_never_runs() {
        let mut host = loaded(ProjectionMode::Globe);
        let id = host.add_overlay(explosion_spec()).unwrap();
        let mut frames = FrameLoop::new();
        let mut sync = OverlaySync::new(dhaka(), id);
        let h = sync.schedule(&mut frames).unwrap();
        sync.cancel(&mut frames);
        assert_eq!(frames.pending_count(), 0);
        assert_eq!(sync.run(h, &mut host), SyncStep::Stale);
        assert_eq!(host.overlay(id).unwrap().position_writes, 0);
    }

    #[test]
    fn removed_overlay_stops_sync() {
        let mut host = loaded(ProjectionMode::Flat);
        let id = host.add_overlay(explosion_spec()).unwrap();
        host.remove_overlay(id).unwrap();
        let mut frames = FrameLoop::new();
        let mut sync = OverlaySync::new(dhaka(), id);
        let h = sync.schedule(&mut frames).unwrap();
        assert_eq!(sync.run(h, &mut host), SyncStep::Released);
        assert!(sync.is_released());
    }

    #[test]
    fn far_side_target_is_hidden_until_in_view() {
        let mut host = loaded(ProjectionMode::Globe);
        let center = host.center();
        let antipode = GeoPosition::new(
            -center.latitude,
            renderer::normalize_longitude(center.longitude + 180.0),
        );
        let id = host.add_overlay(explosion_spec()).unwrap();
        let mut frames = FrameLoop::new();
        let mut sync = OverlaySync::new(antipode, id);

        let h = sync.schedule(&mut frames).unwrap();
        let step = sync.run(h, &mut host);
        assert_eq!(step, SyncStep::Hidden);
        assert!(step.wants_next_frame());
        assert!(sync.is_hidden());
        assert!(!host.overlay(id).unwrap().visible);
        assert_eq!(sync.skipped_frames(), 0);

        host.fly_to(antipode, 4.0, 1.0).unwrap();
        let mut moved = None;
        for _ in 0..200 {
            host.on_frame(0.016);
            let h = sync.schedule(&mut frames).unwrap();
            if let SyncStep::Moved(screen) = sync.run(h, &mut host) {
                moved = Some(screen);
                break;
            }
        }
        assert!(moved.is_some());
        assert!(!sync.is_hidden());
        let record = host.overlay(id).unwrap();
        assert!(record.visible);
        assert_eq!(record.position, moved);
    }

    #[test]
    fn explosion_has_eight_spokes() {
        match explosion_spec() {
            OverlaySpec::Explosion { debris_angles_deg } => {
                assert_eq!(debris_angles_deg.len(), 8);
                assert_eq!(debris_angles_deg[1], 45.0);
                assert_eq!(debris_angles_deg[7], 315.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
