//! Core types shared by every part of the impact visualization engine.
//!
//! This crate provides the foundational pieces used across the workspace:
//! - The impact description data model and its change feed
//! - Scene clock (elapsed-time driven animation timebase)
//! - Transform component for animated scene bodies
//! - The engine-wide error taxonomy

pub mod error;
pub mod impact;
pub mod time;
pub mod transform;

pub use error::*;
pub use impact::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{DVec3, Mat4, Quat, Vec2, Vec3};
pub use hecs::{Entity, World};
