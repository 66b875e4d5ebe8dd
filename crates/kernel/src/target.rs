use std::f32::consts::TAU;

use glam::Vec3;
use rooftop_common::EntityId;
use serde::{Deserialize, Serialize};

use crate::config::TargetConfig;

/// Scoring zone of a ring hit, from the centre outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitZone {
    Bull,
    Inner,
    Outer,
}

impl HitZone {
    pub fn multiplier(self) -> u32 {
        match self {
            HitZone::Bull => 3,
            HitZone::Inner => 2,
            HitZone::Outer => 1,
        }
    }

    fn from_radial(distance: f32, ring_radius: f32) -> Self {
        if distance <= ring_radius / 3.0 {
            HitZone::Bull
        } else if distance <= ring_radius * 2.0 / 3.0 {
            HitZone::Inner
        } else {
            HitZone::Outer
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetState {
    Active,
    Popped { respawn_in: f32 },
}

/// A floating ring that drifts around its anchor and spins slowly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingTarget {
    pub id: EntityId,
    /// Centre of the drift circle.
    pub anchor: Vec3,
    /// Per-target offset so rings do not move in lockstep.
    pub phase: f32,
    pub state: TargetState,
    pub position: Vec3,
    pub facing_yaw: f32,
}

impl RingTarget {
    pub fn new(id: EntityId, anchor: Vec3, phase: f32, time: f32, config: &TargetConfig) -> Self {
        let mut target = Self {
            id,
            anchor,
            phase,
            state: TargetState::Active,
            position: anchor,
            facing_yaw: phase,
        };
        target.update_pose(time, config);
        target
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TargetState::Active)
    }

    /// Advance the drift and the respawn countdown. Returns true when the
    /// target came back this tick.
    pub fn update(&mut self, time: f32, dt: f32, config: &TargetConfig) -> bool {
        let mut respawned = false;
        if let TargetState::Popped { respawn_in } = self.state {
            let left = respawn_in - dt;
            if left <= 0.0 {
                self.state = TargetState::Active;
                respawned = true;
            } else {
                self.state = TargetState::Popped { respawn_in: left };
            }
        }
        self.update_pose(time, config);
        respawned
    }

    /// Move the drift circle to a new anchor.
    pub fn relocate(&mut self, anchor: Vec3, phase: f32, time: f32, config: &TargetConfig) {
        self.anchor = anchor;
        self.phase = phase;
        self.update_pose(time, config);
    }

    pub fn pop(&mut self, config: &TargetConfig) {
        self.state = TargetState::Popped {
            respawn_in: config.respawn_delay,
        };
    }

    fn update_pose(&mut self, time: f32, config: &TargetConfig) {
        let drift = config.drift_speed * time + self.phase;
        let bob = (TAU * config.bob_frequency * time + self.phase).sin() * config.bob_amplitude;
        self.position = self.anchor
            + Vec3::new(
                drift.cos() * config.drift_radius,
                bob,
                drift.sin() * config.drift_radius,
            );
        self.facing_yaw = self.phase + config.spin_speed * time;
    }

    /// Normal of the ring face. Rings stand upright and turn about +Y.
    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.facing_yaw.cos(), 0.0, self.facing_yaw.sin())
    }

    /// Swept test of a ball moving `from -> to` against the ring face.
    ///
    /// Returns the fraction along the segment where the ball meets the face
    /// and the zone it struck. The ring is treated as a solid disc, so a shot
    /// through the hole scores as a bull. A ball that starts within its own
    /// radius of the face plane is tested at its closest approach to the ring
    /// centre while it stays inside that slab.
    pub fn sweep(&self, from: Vec3, to: Vec3, ball_radius: f32, config: &TargetConfig) -> Option<(f32, HitZone)> {
        let n = self.normal();
        let d0 = (from - self.position).dot(n);
        let d1 = (to - self.position).dot(n);

        let fraction = if d0.abs() <= ball_radius {
            let dd = d1 - d0;
            let leave = if dd.abs() < 1e-8 {
                1.0
            } else {
                let edge = if dd > 0.0 { ball_radius } else { -ball_radius };
                ((edge - d0) / dd).clamp(0.0, 1.0)
            };
            // In-plane offsets from the centre at both ends of the segment.
            let p0 = from - self.position - n * d0;
            let dp = (to - from) - n * dd;
            let len2 = dp.length_squared();
            let closest = if len2 < 1e-12 { 0.0 } else { -p0.dot(dp) / len2 };
            closest.clamp(0.0, leave)
        } else if (d0 > 0.0) != (d1 > 0.0) || d1.abs() <= ball_radius {
            let denom = d0 - d1;
            if denom.abs() < 1e-8 {
                return None;
            }
            (d0 / denom).clamp(0.0, 1.0)
        } else {
            return None;
        };

        let point = from + (to - from) * fraction;
        let offset = point - self.position;
        let radial = (offset - n * offset.dot(n)).length();
        if radial > config.ring_radius + config.tube_radius + ball_radius {
            return None;
        }
        Some((fraction, HitZone::from_radial(radial, config.ring_radius)))
    }
}
