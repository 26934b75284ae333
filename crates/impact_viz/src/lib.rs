//! Impact visualization engine.
//!
//! Turns a simulated asteroid impact into renderable artifacts (density
//! field, population chart, metric gauges, globe overlays) and keeps the
//! overlays synchronised with a moving camera for the lifetime of a scene.

pub mod animator;
pub mod breakdown;
pub mod config;
pub mod density;
pub mod gauge;
pub mod lifecycle;
pub mod overlay;
pub mod panels;
pub mod severity;

pub use animator::SceneAnimator;
pub use breakdown::{render_breakdown, wedge_spans, ChartOutcome, Segment, Wedge};
pub use config::VizConfig;
pub use density::DensityRenderer;
pub use gauge::{MetricGauge, MetricKind};
pub use lifecycle::{LifecycleManager, LifecycleState};
pub use overlay::{explosion_spec, FrameHandle, FrameLoop, FrameTask, OverlaySync, SyncStep};
pub use panels::ResultPanels;
pub use severity::{scale, VisualParams};
