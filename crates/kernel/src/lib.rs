//! Game kernel: the authoritative round state and its fixed-step simulation.
//!
//! # Invariants
//! - A round is a pure function of its config (seed included) and the input frames.
//! - All state mutations flow through [`GameWorld::step`] and the round commands.
//! - Splats never exceed the configured cap; the oldest is evicted first.

pub mod avatar;
pub mod clock;
pub mod config;
pub mod paint;
pub mod target;
pub mod world;

pub use avatar::{AnimState, Avatar, AvatarEvents};
pub use clock::FixedTimestep;
pub use config::{AvatarConfig, ConfigError, GameConfig, SplatConfig, TargetConfig, WeaponConfig};
pub use paint::{PAINT_PALETTE, Paintball, Splat, SplatBuffer};
pub use target::{HitZone, RingTarget, TargetState};
pub use world::{GameError, GameEvent, GameWorld, RoundStats};

pub fn crate_info() -> &'static str {
    "rooftop-kernel v0.1.0"
}
