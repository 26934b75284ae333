//! Procedural generation for the impact scene: starfield, danger-density
//! point fields and approach trajectories.

pub mod density;
pub mod starfield;
pub mod trajectory;

pub use density::*;
pub use starfield::*;
pub use trajectory::*;
