//! Shared types for the rooftop gallery workspace.
//!
//! # Invariants
//! - Ids are derived from a seeded RNG so identical seeds give identical worlds.
//! - Geometry helpers never allocate.

mod geometry;
mod types;

pub use geometry::{Aabb, Ray, RayHit, segment_ray};
pub use types::{EntityId, Transform};

pub fn crate_info() -> &'static str {
    "rooftop-common v0.1.0"
}
