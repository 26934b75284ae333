//! Projection, drawing-surface and scene-host abstractions for the impact engine.
//!
//! The real map/3D libraries are external collaborators. This crate defines
//! the capability surface the engine talks to, plus a headless host used by
//! the demo binary and the tests.

pub mod camera;
pub mod headless;
pub mod host;
pub mod projector;
pub mod surface;

pub use camera::*;
pub use headless::*;
pub use host::*;
pub use projector::*;
pub use surface::*;
