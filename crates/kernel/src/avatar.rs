use glam::{Vec2, Vec3};
use rooftop_city::City;
use rooftop_common::Aabb;
use rooftop_input::InputFrame;
use serde::{Deserialize, Serialize};

use crate::config::AvatarConfig;

/// Animation state derived from movement, used to pick an avatar clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimState {
    Idle,
    Walk,
    Run,
    Jump,
    Fall,
}

impl AnimState {
    pub fn name(self) -> &'static str {
        match self {
            AnimState::Idle => "idle",
            AnimState::Walk => "walk",
            AnimState::Run => "run",
            AnimState::Jump => "jump",
            AnimState::Fall => "fall",
        }
    }
}

/// What happened to the avatar during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvatarEvents {
    pub jumped: bool,
    pub landed: bool,
    pub respawned: bool,
}

/// The player's body. `position` is the centre of the feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Heading in radians; zero looks down +X, increasing turns toward +Z.
    pub yaw: f32,
    pub pitch: f32,
    pub grounded: bool,
    pub anim: AnimState,
}

impl Avatar {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw,
            pitch: 0.0,
            grounded: true,
            anim: AnimState::Idle,
        }
    }

    /// Apply a mouse delta in pixels.
    pub fn look(&mut self, delta: Vec2, config: &AvatarConfig) {
        let limit = config.pitch_limit_degrees.to_radians();
        self.yaw += delta.x * config.look_sensitivity;
        self.pitch -= delta.y * config.look_sensitivity;
        self.pitch = self.pitch.clamp(-limit, limit);
    }

    /// Unit view direction including pitch.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Heading projected onto the ground plane.
    pub fn flat_forward(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn right(&self) -> Vec3 {
        self.flat_forward().cross(Vec3::Y)
    }

    pub fn eye(&self, config: &AvatarConfig) -> Vec3 {
        self.position + Vec3::Y * config.eye_height
    }

    pub fn bounds(&self, config: &AvatarConfig) -> Aabb {
        body_at(self.position, config)
    }

    /// Advance movement by `dt` seconds against the city geometry.
    pub fn step(&mut self, input: &InputFrame, dt: f32, city: &City, config: &AvatarConfig) -> AvatarEvents {
        let mut events = AvatarEvents::default();
        let was_grounded = self.grounded;

        let speed = if input.run {
            config.walk_speed * config.run_multiplier
        } else {
            config.walk_speed
        };
        let wish = self.right() * input.move_axis.x + self.flat_forward() * input.move_axis.y;
        self.velocity.x = wish.x * speed;
        self.velocity.z = wish.z * speed;

        if input.jump && self.grounded {
            self.velocity.y = config.jump_speed;
            events.jumped = true;
        }
        self.velocity.y -= config.gravity * dt;
        self.grounded = false;

        let delta = self.velocity * dt;
        self.move_horizontal(0, delta.x, city, config);
        self.move_horizontal(2, delta.z, city, config);
        self.move_vertical(delta.y, city, config);

        if self.position.y < config.kill_plane {
            self.respawn(city.spawn_point);
            events.respawned = true;
        } else if self.grounded && !was_grounded {
            events.landed = true;
        }

        self.anim = if !self.grounded {
            if self.velocity.y > 0.0 {
                AnimState::Jump
            } else {
                AnimState::Fall
            }
        } else {
            let ground_speed = Vec2::new(self.velocity.x, self.velocity.z).length();
            if ground_speed < 0.1 {
                AnimState::Idle
            } else if ground_speed > config.walk_speed * 1.2 {
                AnimState::Run
            } else {
                AnimState::Walk
            }
        };
        events
    }

    /// Put the avatar back on its feet at `spawn`, keeping the view direction.
    pub fn respawn(&mut self, spawn: Vec3) {
        self.position = spawn;
        self.velocity = Vec3::ZERO;
        self.grounded = true;
        self.anim = AnimState::Idle;
    }

    fn move_horizontal(&mut self, axis: usize, amount: f32, city: &City, config: &AvatarConfig) {
        if amount == 0.0 {
            return;
        }
        let mut target = self.position;
        target[axis] += amount;

        let mut climb_to = target.y;
        for piece in city.overlapping(&body_at(target, config)) {
            let top = piece.bounds.top();
            if top - self.position.y > config.step_height {
                self.velocity[axis] = 0.0;
                return;
            }
            climb_to = climb_to.max(top);
        }

        if climb_to > target.y {
            let raised = Vec3::new(target.x, climb_to, target.z);
            if city.overlapping(&body_at(raised, config)).next().is_some() {
                self.velocity[axis] = 0.0;
                return;
            }
            target = raised;
            self.velocity.y = self.velocity.y.max(0.0);
            self.grounded = true;
        }
        self.position = target;
    }

    fn move_vertical(&mut self, amount: f32, city: &City, config: &AvatarConfig) {
        if amount == 0.0 {
            return;
        }
        let mut target = self.position;
        target.y += amount;
        let body = body_at(target, config);

        if amount < 0.0 {
            let support = city
                .overlapping(&body)
                .map(|p| p.bounds.top())
                .filter(|top| *top <= self.position.y + 1e-4)
                .reduce(f32::max);
            if let Some(top) = support {
                target.y = top;
                self.velocity.y = 0.0;
                self.grounded = true;
            }
        } else {
            let ceiling = city
                .overlapping(&body)
                .map(|p| p.bounds.min.y)
                .filter(|bottom| *bottom >= self.position.y + config.height - 1e-4)
                .reduce(f32::min);
            if let Some(bottom) = ceiling {
                target.y = bottom - config.height;
                self.velocity.y = 0.0;
            }
        }
        self.position = target;
    }
}

fn body_at(feet: Vec3, config: &AvatarConfig) -> Aabb {
    Aabb::new(
        Vec3::new(feet.x - config.radius, feet.y, feet.z - config.radius),
        Vec3::new(feet.x + config.radius, feet.y + config.height, feet.z + config.radius),
    )
}
