use std::collections::VecDeque;

use glam::Vec3;
use rooftop_common::EntityId;
use serde::{Deserialize, Serialize};

/// Saturated paint colours; shots cycle through them in order.
pub const PAINT_PALETTE: [[f32; 4]; 6] = [
    [0.95, 0.20, 0.25, 1.0],
    [1.00, 0.60, 0.10, 1.0],
    [0.98, 0.90, 0.15, 1.0],
    [0.25, 0.85, 0.30, 1.0],
    [0.15, 0.55, 0.95, 1.0],
    [0.70, 0.30, 0.90, 1.0],
];

/// A paintball in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paintball {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: [f32; 4],
    /// Seconds since it left the muzzle.
    pub age: f32,
}

impl Paintball {
    /// Integrate one step; returns the segment travelled.
    pub fn integrate(&mut self, dt: f32, gravity: f32) -> (Vec3, Vec3) {
        let from = self.position;
        self.velocity.y -= gravity * dt;
        self.position += self.velocity * dt;
        self.age += dt;
        (from, self.position)
    }
}

/// A paint mark left on city geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Splat {
    pub id: EntityId,
    pub position: Vec3,
    /// Normal of the surface it sticks to.
    pub normal: Vec3,
    pub radius: f32,
    pub color: [f32; 4],
    /// City piece the splat landed on.
    pub piece: Option<usize>,
}

/// Bounded splat store; the oldest splat goes first once full.
#[derive(Debug, Clone, Default)]
pub struct SplatBuffer {
    capacity: usize,
    splats: VecDeque<Splat>,
}

impl SplatBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            splats: VecDeque::with_capacity(capacity),
        }
    }

    /// Add a splat, returning the one it evicted, if any.
    pub fn push(&mut self, splat: Splat) -> Option<Splat> {
        if self.capacity == 0 {
            return Some(splat);
        }
        let evicted = if self.splats.len() >= self.capacity {
            self.splats.pop_front()
        } else {
            None
        };
        self.splats.push_back(splat);
        evicted
    }

    pub fn len(&self) -> usize {
        self.splats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Splat> {
        self.splats.iter()
    }

    pub fn clear(&mut self) {
        self.splats.clear();
    }
}
