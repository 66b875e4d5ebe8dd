use std::f32::consts::TAU;

use glam::Vec3;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use rooftop_city::{City, CityError};
use rooftop_common::{EntityId, segment_ray};
use rooftop_input::InputFrame;
use serde::{Deserialize, Serialize};

use crate::avatar::Avatar;
use crate::config::{ConfigError, GameConfig};
use crate::paint::{PAINT_PALETTE, Paintball, Splat, SplatBuffer};
use crate::target::{HitZone, RingTarget};

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("city generation failed: {0}")]
    City(#[from] CityError),
}

/// An event record produced by the simulation.
///
/// The app drains these each frame for logging and effects; tests use them to
/// observe what a tick did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Fired { ball: EntityId, origin: Vec3, velocity: Vec3 },
    TargetHit { target: EntityId, zone: HitZone, points: u32 },
    Splatted { splat: EntityId, piece: Option<usize> },
    TargetRespawned { target: EntityId, anchor: Vec3 },
    Jumped,
    Landed,
    AvatarRespawned,
    RoundReset,
}

/// Score keeping for the current round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub score: u64,
    pub shots: u32,
    pub hits: u32,
    /// Consecutive hits since the last miss.
    pub streak: u32,
    pub best_streak: u32,
}

impl RoundStats {
    fn record_hit(&mut self, points: u32) {
        self.hits += 1;
        self.score += u64::from(points);
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
    }

    fn record_miss(&mut self) {
        self.streak = 0;
    }
}

/// The authoritative game state.
///
/// All mutations go through [`GameWorld::step`] and the round commands. Every
/// random choice comes from one seeded RNG, so the same config and the same
/// input frames always produce the same round.
#[derive(Debug, Clone)]
pub struct GameWorld {
    config: GameConfig,
    city: City,
    avatar: Avatar,
    targets: Vec<RingTarget>,
    paintballs: Vec<Paintball>,
    splats: SplatBuffer,
    stats: RoundStats,
    tick: u64,
    time: f64,
    rng: Pcg64Mcg,
    cooldown: f32,
    palette_index: usize,
    paused: bool,
    event_log: Vec<GameEvent>,
}

enum Impact {
    Target { index: usize, zone: HitZone },
    Surface { piece: usize, point: Vec3, normal: Vec3 },
}

impl GameWorld {
    /// Validate the config, generate the city and set up a fresh round.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let city = City::generate(&config.city, config.seed)?;
        let avatar = Avatar::new(city.spawn_point, yaw_toward(city.spawn_point, city.bounds.center()));
        let splats = SplatBuffer::new(config.splats.max_splats);
        // A stream separate from the city's so layout and gameplay rolls do not alias.
        let rng = Pcg64Mcg::seed_from_u64(splitmix64(config.seed));

        let mut world = Self {
            config,
            city,
            avatar,
            targets: Vec::new(),
            paintballs: Vec::new(),
            splats,
            stats: RoundStats::default(),
            tick: 0,
            time: 0.0,
            rng,
            cooldown: 0.0,
            palette_index: 0,
            paused: false,
            event_log: Vec::new(),
        };
        world.place_targets();
        tracing::info!(
            seed = world.config.seed,
            targets = world.targets.len(),
            "round ready"
        );
        Ok(world)
    }

    /// Re-simulate a recorded input log from a fresh world.
    pub fn replay(config: GameConfig, frames: &[InputFrame]) -> Result<Self, GameError> {
        let mut world = Self::new(config)?;
        for frame in frames {
            world.step(frame);
        }
        Ok(world)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn city(&self) -> &City {
        &self.city
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn targets(&self) -> &[RingTarget] {
        &self.targets
    }

    pub fn paintballs(&self) -> &[Paintball] {
        &self.paintballs
    }

    pub fn splats(&self) -> &SplatBuffer {
        &self.splats
    }

    pub fn stats(&self) -> RoundStats {
        self.stats
    }

    /// Hits per shot in `[0, 1]`; zero before the first shot.
    pub fn accuracy(&self) -> f32 {
        if self.stats.shots == 0 {
            0.0
        } else {
            self.stats.hits as f32 / self.stats.shots as f32
        }
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since the world was created.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            tracing::info!(paused, "pause toggled");
        }
        self.paused = paused;
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[GameEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Start a new round on the same city.
    pub fn reset_round(&mut self) {
        let spawn = self.city.spawn_point;
        self.avatar = Avatar::new(spawn, yaw_toward(spawn, self.city.bounds.center()));
        self.stats = RoundStats::default();
        self.paintballs.clear();
        self.splats.clear();
        self.cooldown = 0.0;
        self.palette_index = 0;
        self.place_targets();
        self.event_log.push(GameEvent::RoundReset);
        tracing::info!(tick = self.tick, "round reset");
    }

    /// Advance the simulation by one fixed tick. A paused world ignores input.
    pub fn step(&mut self, input: &InputFrame) {
        if self.paused {
            return;
        }
        let _span = tracing::debug_span!("game_step", tick = self.tick).entered();
        let dt = self.config.tick_rate;

        self.avatar.look(input.look_delta, &self.config.avatar);
        let moved = self
            .avatar
            .step(input, dt, &self.city, &self.config.avatar);
        if moved.jumped {
            self.event_log.push(GameEvent::Jumped);
        }
        if moved.landed {
            self.event_log.push(GameEvent::Landed);
        }
        if moved.respawned {
            tracing::debug!("avatar fell out of the city");
            self.event_log.push(GameEvent::AvatarRespawned);
        }

        self.cooldown = (self.cooldown - dt).max(0.0);
        if input.fire && self.cooldown <= 0.0 {
            self.fire();
        }

        let now = (self.time + f64::from(dt)) as f32;
        for i in 0..self.targets.len() {
            if self.targets[i].update(now, dt, &self.config.targets) {
                let anchor = self.free_anchor(i);
                let phase = self.rng.gen_range(0.0..TAU);
                let target = &mut self.targets[i];
                target.relocate(anchor, phase, now, &self.config.targets);
                self.event_log.push(GameEvent::TargetRespawned {
                    target: target.id,
                    anchor,
                });
            }
        }

        self.update_paintballs(dt);

        self.tick += 1;
        self.time += f64::from(dt);
        tracing::trace!(
            tick = self.tick,
            balls = self.paintballs.len(),
            splats = self.splats.len(),
            "stepped"
        );
    }

    fn fire(&mut self) {
        let weapon = &self.config.weapon;
        if self.paintballs.len() >= weapon.max_paintballs {
            tracing::debug!(in_flight = self.paintballs.len(), "paintball cap reached, shot skipped");
            return;
        }
        let forward = self.avatar.forward();
        let eye = self.avatar.eye(&self.config.avatar);
        let origin = eye + forward * (self.config.avatar.radius + weapon.ball_radius);
        let velocity = forward * weapon.muzzle_speed + self.avatar.velocity;
        let cooldown = weapon.cooldown;
        let color = PAINT_PALETTE[self.palette_index % PAINT_PALETTE.len()];
        self.palette_index = (self.palette_index + 1) % PAINT_PALETTE.len();

        let id = EntityId::from_rng(&mut self.rng);
        self.cooldown = cooldown;
        self.stats.shots += 1;
        self.event_log.push(GameEvent::Fired {
            ball: id,
            origin,
            velocity,
        });

        // Flush against a wall the muzzle is already inside it; burst on the face instead.
        let point_blank = segment_ray(eye, origin).and_then(|(ray, len)| self.city.raycast(&ray, len));
        if let Some(hit) = point_blank {
            tracing::debug!(ball = %id.short(), piece = hit.piece, "point-blank shot");
            self.stats.record_miss();
            self.splat(hit.point, hit.normal, color, hit.piece);
            return;
        }

        self.paintballs.push(Paintball {
            id,
            position: origin,
            velocity,
            color,
            age: 0.0,
        });
    }

    fn update_paintballs(&mut self, dt: f32) {
        let gravity = self.config.avatar.gravity * self.config.weapon.gravity_scale;
        let radius = self.config.weapon.ball_radius;

        let mut i = 0;
        while i < self.paintballs.len() {
            let (from, to) = self.paintballs[i].integrate(dt, gravity);

            match self.first_impact(from, to, radius) {
                Some(Impact::Target { index, zone }) => {
                    let points = self.config.targets.points * zone.multiplier();
                    let target = &mut self.targets[index];
                    target.pop(&self.config.targets);
                    self.stats.record_hit(points);
                    tracing::debug!(ring = %target.id.short(), ?zone, points, "target hit");
                    self.event_log.push(GameEvent::TargetHit {
                        target: target.id,
                        zone,
                        points,
                    });
                    self.paintballs.swap_remove(i);
                }
                Some(Impact::Surface { piece, point, normal }) => {
                    let ball = self.paintballs.swap_remove(i);
                    self.stats.record_miss();
                    self.splat(point, normal, ball.color, piece);
                }
                None => {
                    let ball = &self.paintballs[i];
                    if ball.age > self.config.weapon.lifetime || ball.position.y < self.config.avatar.kill_plane {
                        tracing::trace!(ball = %ball.id.short(), "paintball expired");
                        self.stats.record_miss();
                        self.paintballs.swap_remove(i);
                    } else {
                        i += 1;
                    }
                }
            }
        }
    }

    /// Earliest impact along a ball's motion segment. Targets win ties.
    fn first_impact(&self, from: Vec3, to: Vec3, radius: f32) -> Option<Impact> {
        let mut best: Option<(f32, Impact)> = None;
        for (index, target) in self.targets.iter().enumerate() {
            if !target.is_active() {
                continue;
            }
            if let Some((fraction, zone)) = target.sweep(from, to, radius, &self.config.targets) {
                if best.as_ref().is_none_or(|(f, _)| fraction < *f) {
                    best = Some((fraction, Impact::Target { index, zone }));
                }
            }
        }

        if let Some((ray, len)) = segment_ray(from, to) {
            if let Some(hit) = self.city.raycast(&ray, len) {
                let fraction = hit.t / len;
                if best.as_ref().is_none_or(|(f, _)| fraction < *f) {
                    best = Some((
                        fraction,
                        Impact::Surface {
                            piece: hit.piece,
                            point: hit.point,
                            normal: hit.normal,
                        },
                    ));
                }
            }
        }
        best.map(|(_, impact)| impact)
    }

    fn splat(&mut self, position: Vec3, normal: Vec3, color: [f32; 4], piece: usize) {
        let cfg = &self.config.splats;
        let radius = self.rng.gen_range(cfg.min_radius..=cfg.max_radius);
        let id = EntityId::from_rng(&mut self.rng);
        let evicted = self.splats.push(Splat {
            id,
            position,
            normal,
            radius,
            color,
            piece: Some(piece),
        });
        if let Some(old) = evicted {
            tracing::trace!(splat = %old.id.short(), "oldest splat evicted");
        }
        self.event_log.push(GameEvent::Splatted {
            splat: id,
            piece: Some(piece),
        });
    }

    /// Scatter the configured number of targets over shuffled anchors.
    fn place_targets(&mut self) {
        self.targets.clear();
        let anchors = &self.city.target_anchors;
        if anchors.is_empty() {
            tracing::warn!("city has no target anchors");
            return;
        }
        let mut order: Vec<usize> = (0..anchors.len()).collect();
        order.shuffle(&mut self.rng);

        let now = self.time as f32;
        for i in 0..self.config.targets.count {
            let anchor = self.city.target_anchors[order[i % order.len()]];
            let id = EntityId::from_rng(&mut self.rng);
            let phase = self.rng.gen_range(0.0..TAU);
            self.targets
                .push(RingTarget::new(id, anchor, phase, now, &self.config.targets));
        }
    }

    /// A random anchor no other target is using, or any anchor if all are taken.
    fn free_anchor(&mut self, skip: usize) -> Vec3 {
        let anchors = &self.city.target_anchors;
        let free: Vec<Vec3> = anchors
            .iter()
            .copied()
            .filter(|a| {
                !self
                    .targets
                    .iter()
                    .enumerate()
                    .any(|(i, t)| i != skip && t.anchor == *a)
            })
            .collect();
        let pool = if free.is_empty() { anchors.clone() } else { free };
        pool[self.rng.gen_range(0..pool.len())]
    }

    /// Compute a deterministic hash of the game state for comparison.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        let mix_vec = |h: &mut u64, v: Vec3| {
            for c in v.to_array() {
                mix(h, &c.to_le_bytes());
            }
        };

        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.config.seed.to_le_bytes());
        mix_vec(&mut h, self.avatar.position);
        mix_vec(&mut h, self.avatar.velocity);
        mix(&mut h, &self.avatar.yaw.to_le_bytes());
        mix(&mut h, &self.avatar.pitch.to_le_bytes());
        mix(&mut h, &[u8::from(self.avatar.grounded)]);
        for t in &self.targets {
            mix(&mut h, t.id.0.as_bytes());
            mix_vec(&mut h, t.position);
            mix(&mut h, &[u8::from(t.is_active())]);
        }
        for b in &self.paintballs {
            mix(&mut h, b.id.0.as_bytes());
            mix_vec(&mut h, b.position);
        }
        mix(&mut h, &(self.splats.len() as u64).to_le_bytes());
        mix(&mut h, &self.stats.score.to_le_bytes());
        mix(&mut h, &self.stats.shots.to_le_bytes());
        mix(&mut h, &self.stats.hits.to_le_bytes());
        mix(&mut h, &self.stats.streak.to_le_bytes());
        h
    }

    /// Teleport the avatar and set its view, for tooling and tests.
    pub fn place_avatar(&mut self, position: Vec3, yaw: f32, pitch: f32) {
        self.avatar.respawn(position);
        self.avatar.yaw = yaw;
        self.avatar.pitch = pitch;
    }
}

fn yaw_toward(from: Vec3, to: Vec3) -> f32 {
    let d = to - from;
    d.z.atan2(d.x)
}

/// One splitmix64 step; derives the gameplay RNG seed from the round seed.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetState;
    use glam::Vec2;
    use rooftop_city::PieceKind;

    fn world() -> GameWorld {
        GameWorld::new(GameConfig::default()).unwrap()
    }

    fn idle() -> InputFrame {
        InputFrame::default()
    }

    fn fire() -> InputFrame {
        InputFrame {
            fire: true,
            ..InputFrame::default()
        }
    }

    /// A config with motionless targets, for aimed shots.
    fn still_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.targets.drift_radius = 0.0;
        config.targets.bob_amplitude = 0.0;
        config.targets.spin_speed = 0.0;
        config
    }

    #[test]
    fn world_starts_clean() {
        let w = world();
        assert_eq!(w.tick(), 0);
        assert_eq!(w.targets().len(), 10);
        assert!(w.paintballs().is_empty());
        assert!(w.splats().is_empty());
        assert_eq!(w.stats(), RoundStats::default());
        assert_eq!(w.accuracy(), 0.0);
        assert_eq!(w.avatar().position, w.city().spawn_point);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = GameConfig::default();
        config.tick_rate = 0.0;
        assert!(matches!(GameWorld::new(config), Err(GameError::Config(_))));
    }

    #[test]
    fn step_increments_tick_and_time() {
        let mut w = world();
        w.step(&idle());
        w.step(&idle());
        w.step(&idle());
        assert_eq!(w.tick(), 3);
        assert!((w.time() - 3.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn paused_world_does_not_step() {
        let mut w = world();
        w.set_paused(true);
        w.step(&fire());
        assert_eq!(w.tick(), 0);
        assert!(w.paintballs().is_empty());
        w.set_paused(false);
        w.step(&idle());
        assert_eq!(w.tick(), 1);
    }

    #[test]
    fn firing_respects_cooldown() {
        let mut w = world();
        w.step(&fire());
        assert_eq!(w.stats().shots, 1);
        assert_eq!(w.paintballs().len(), 1);
        // 0.16 s cooldown is ~10 ticks at 60 Hz.
        for _ in 0..5 {
            w.step(&fire());
        }
        assert_eq!(w.stats().shots, 1);
        for _ in 0..10 {
            w.step(&fire());
        }
        assert_eq!(w.stats().shots, 2);
        assert!(matches!(w.events()[0], GameEvent::Fired { .. }));
    }

    #[test]
    fn shots_cycle_palette() {
        let mut w = world();
        // Aim at the sky so no ball lands while the others are fired.
        let spawn = w.city().spawn_point;
        w.place_avatar(spawn, 0.0, 80f32.to_radians());
        let mut colors = Vec::new();
        for _ in 0..3 {
            w.step(&fire());
            colors.push(w.paintballs().last().unwrap().color);
            for _ in 0..10 {
                w.step(&idle());
            }
        }
        assert_eq!(colors, PAINT_PALETTE[..3].to_vec());
    }

    #[test]
    fn paintball_cap_limits_shots_in_flight() {
        let mut config = GameConfig::default();
        config.weapon.max_paintballs = 1;
        config.weapon.cooldown = 1.0 / 120.0;
        let mut w = GameWorld::new(config).unwrap();
        // Aim at the sky so the first ball stays in flight.
        let spawn = w.city().spawn_point;
        w.place_avatar(spawn, 0.0, 80f32.to_radians());
        for _ in 0..5 {
            w.step(&fire());
        }
        assert_eq!(w.stats().shots, 1);
        assert_eq!(w.paintballs().len(), 1);
    }

    #[test]
    fn shot_at_ground_leaves_splat_and_breaks_streak() {
        let mut w = world();
        let spawn = w.city().spawn_point;
        w.place_avatar(spawn, 0.0, -80f32.to_radians());
        w.step(&fire());
        for _ in 0..30 {
            w.step(&idle());
        }
        assert!(w.paintballs().is_empty());
        assert_eq!(w.splats().len(), 1);
        let splat = w.splats().iter().next().unwrap();
        assert_eq!(splat.normal, Vec3::Y);
        assert!(splat.position.y.abs() < 1e-3);
        assert!(splat.radius >= 0.25 && splat.radius <= 0.55);
        assert!(
            w.events()
                .iter()
                .any(|e| matches!(e, GameEvent::Splatted { .. }))
        );
        assert_eq!(w.stats().streak, 0);
    }

    #[test]
    fn aimed_shot_pops_target_and_scores() {
        let mut w = GameWorld::new(still_config()).unwrap();
        // Pick a ring hovering over a roof so nothing stands between it and the shooter.
        let city = &w.config().city;
        let roofs = city.blocks_x * city.blocks_z * city.targets_per_roof;
        let roof_anchors = &w.city().target_anchors[..roofs as usize];
        let index = w
            .targets()
            .iter()
            .position(|t| roof_anchors.contains(&t.anchor))
            .unwrap();
        let target = w.targets()[index].clone();

        // Stand in front of its face and shoot straight through the centre.
        let n = target.normal();
        let eye_offset = Vec3::Y * w.config().avatar.eye_height;
        let feet = target.position + n * 6.0 - eye_offset;
        let back = -n;
        w.place_avatar(feet, back.z.atan2(back.x), 0.0);
        w.step(&fire());
        let mut hit = false;
        for _ in 0..30 {
            w.step(&idle());
            hit = w
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::TargetHit { zone: HitZone::Bull, .. }));
            if hit {
                break;
            }
        }
        assert!(hit, "ball should strike the bull");
        assert_eq!(w.stats().hits, 1);
        assert_eq!(w.stats().score, 300);
        assert_eq!(w.stats().streak, 1);
        assert_eq!(w.accuracy(), 1.0);
        assert!(matches!(w.targets()[index].state, TargetState::Popped { .. }));
    }

    #[test]
    fn popped_target_respawns_at_an_anchor() {
        let mut w = GameWorld::new(still_config()).unwrap();
        w.targets[0].pop(&w.config.targets);
        let id = w.targets[0].id;
        let mut respawned = false;
        for _ in 0..200 {
            w.step(&idle());
            respawned |= w.events().iter().any(
                |e| matches!(e, GameEvent::TargetRespawned { target, .. } if *target == id),
            );
        }
        assert!(respawned);
        assert!(w.targets()[0].is_active());
        assert!(w.city().target_anchors.contains(&w.targets()[0].anchor));
        let anchor = w.targets()[0].anchor;
        assert!(w.targets()[1..].iter().all(|t| t.anchor != anchor));
    }

    #[test]
    fn free_anchor_avoids_anchors_in_use() {
        let mut w = world();
        assert!(w.city().target_anchors.len() > w.targets().len());
        for _ in 0..100 {
            let anchor = w.free_anchor(0);
            assert!(w.city().target_anchors.contains(&anchor));
            assert!(w.targets()[1..].iter().all(|t| t.anchor != anchor));
        }
    }

    #[test]
    fn free_anchor_reuses_when_every_anchor_is_taken() {
        let mut config = GameConfig::default();
        config.city.blocks_x = 1;
        config.city.blocks_z = 1;
        config.targets.count = 3;
        let mut w = GameWorld::new(config).unwrap();
        // One roof anchor, shared by all three rings.
        assert_eq!(w.city().target_anchors.len(), 1);
        assert_eq!(w.free_anchor(0), w.city().target_anchors[0]);
    }

    /// Feet position flush against the west wall of a building with nothing
    /// else around, plus that wall's x.
    fn west_wall_spot(w: &GameWorld) -> (Vec3, f32) {
        let cfg = &w.config().avatar;
        w.city()
            .pieces
            .iter()
            .filter(|p| p.kind == PieceKind::Building)
            .find_map(|p| {
                let wall = p.bounds;
                // Stairs wrap part of the wall, so try a few spots along it.
                [0.5f32, 0.3, 0.7, 0.15, 0.85].into_iter().find_map(|along| {
                    let z = wall.min.z + (wall.max.z - wall.min.z) * along;
                    let feet = Vec3::new(wall.min.x - cfg.radius - 0.01, 0.0, z);
                    let body = Avatar::new(feet, 0.0).bounds(cfg).expanded(0.05);
                    let clear = w
                        .city()
                        .overlapping(&body)
                        .all(|q| q.id == p.id || q.kind == PieceKind::Ground);
                    clear.then_some((feet, wall.min.x))
                })
            })
            .expect("some west wall has room to stand")
    }

    #[test]
    fn point_blank_wall_shot_splats_on_the_face() {
        let mut w = world();
        let (feet, wall_x) = west_wall_spot(&w);
        w.place_avatar(feet, 0.0, 0.0);
        w.stats.streak = 2;
        w.step(&fire());

        assert_eq!(w.stats().shots, 1);
        assert_eq!(w.stats().streak, 0);
        assert!(w.paintballs().is_empty());
        assert_eq!(w.splats().len(), 1);
        let splat = w.splats().iter().next().unwrap();
        assert_eq!(splat.normal, Vec3::NEG_X);
        assert!((splat.position.x - wall_x).abs() < 1e-3);
        assert!(
            w.city()
                .pieces
                .iter()
                .all(|p| !p.bounds.expanded(-1e-3).contains_point(splat.position)),
            "splat must sit on a surface, not inside one"
        );
    }

    /// A world with one active ring parked at `x` in front of a clear west
    /// wall, facing along X. Returns the world, the ring's centre and the wall x.
    fn ring_by_wall(offset: f32) -> (GameWorld, Vec3, f32) {
        let mut w = GameWorld::new(still_config()).unwrap();
        let (feet, wall_x) = west_wall_spot(&w);
        let centre = Vec3::new(wall_x + offset, 1.0, feet.z);
        w.targets[0].position = centre;
        w.targets[0].facing_yaw = 0.0;
        let popped = TargetState::Popped { respawn_in: 10.0 };
        for t in &mut w.targets[1..] {
            t.state = popped;
        }
        (w, centre, wall_x)
    }

    #[test]
    fn ring_in_front_of_wall_takes_the_hit() {
        let (w, centre, wall_x) = ring_by_wall(-0.3);
        let from = Vec3::new(wall_x - 0.7, centre.y, centre.z);
        let to = Vec3::new(wall_x + 0.5, centre.y, centre.z);
        let radius = w.config().weapon.ball_radius;
        assert!(matches!(
            w.first_impact(from, to, radius),
            Some(Impact::Target { index: 0, zone: HitZone::Bull })
        ));
    }

    #[test]
    fn wall_in_front_of_ring_takes_the_hit() {
        let (w, centre, wall_x) = ring_by_wall(0.3);
        let from = Vec3::new(wall_x - 0.7, centre.y, centre.z);
        let to = Vec3::new(wall_x + 0.5, centre.y, centre.z);
        let radius = w.config().weapon.ball_radius;
        match w.first_impact(from, to, radius) {
            Some(Impact::Surface { point, normal, .. }) => {
                assert!((point.x - wall_x).abs() < 1e-3);
                assert_eq!(normal, Vec3::NEG_X);
            }
            _ => panic!("the wall is struck before the ring behind it"),
        }
    }

    #[test]
    fn expired_ball_is_dropped_and_breaks_streak() {
        let mut config = GameConfig::default();
        config.weapon.lifetime = 0.5;
        let mut w = GameWorld::new(config).unwrap();
        let spawn = w.city().spawn_point;
        w.place_avatar(spawn, 0.0, 80f32.to_radians());
        w.stats.streak = 3;
        w.step(&fire());
        assert_eq!(w.paintballs().len(), 1);
        // Still rising after 0.5 s, so only the lifetime can remove it.
        for _ in 0..40 {
            w.step(&idle());
        }
        assert!(w.paintballs().is_empty());
        assert!(w.splats().is_empty());
        assert_eq!(w.stats().streak, 0);
        assert!(!w.events().iter().any(|e| matches!(e, GameEvent::Splatted { .. })));
    }

    #[test]
    fn ball_below_kill_plane_is_dropped_and_breaks_streak() {
        let mut w = world();
        w.stats.streak = 2;
        let id = EntityId::from_rng(&mut w.rng);
        let kill_plane = w.config().avatar.kill_plane;
        // Far outside the city, already under the kill plane.
        w.paintballs.push(Paintball {
            id,
            position: Vec3::new(-500.0, kill_plane - 1.0, -500.0),
            velocity: Vec3::ZERO,
            color: PAINT_PALETTE[0],
            age: 0.0,
        });
        w.step(&idle());
        assert!(w.paintballs().is_empty());
        assert!(w.splats().is_empty());
        assert_eq!(w.stats().streak, 0);
    }

    #[test]
    fn reset_round_clears_everything() {
        let mut w = world();
        let spawn = w.city().spawn_point;
        w.place_avatar(spawn, 0.0, -80f32.to_radians());
        w.step(&fire());
        for _ in 0..30 {
            w.step(&idle());
        }
        assert_eq!(w.stats().shots, 1);
        w.reset_round();
        assert_eq!(w.stats(), RoundStats::default());
        assert!(w.paintballs().is_empty());
        assert!(w.splats().is_empty());
        assert_eq!(w.avatar().position, spawn);
        assert_eq!(w.targets().len(), 10);
        assert!(w.targets().iter().all(|t| t.is_active()));
        assert_eq!(w.events().last(), Some(&GameEvent::RoundReset));
    }

    #[test]
    fn drain_events_clears_log() {
        let mut w = world();
        w.step(&fire());
        let events = w.drain_events();
        assert!(!events.is_empty());
        assert!(w.events().is_empty());
    }

    #[test]
    fn look_input_turns_avatar() {
        let mut w = world();
        let yaw = w.avatar().yaw;
        let frame = InputFrame {
            look_delta: Vec2::new(100.0, 0.0),
            ..InputFrame::default()
        };
        w.step(&frame);
        assert!((w.avatar().yaw - yaw - 0.25).abs() < 1e-5);
    }

    fn scripted_frames(n: usize) -> Vec<InputFrame> {
        (0..n)
            .map(|i| InputFrame {
                move_axis: Vec2::new(0.0, if i % 120 < 60 { 1.0 } else { -1.0 }),
                run: i % 200 > 150,
                jump: i % 90 == 0,
                fire: i % 7 == 0,
                look_delta: Vec2::new(((i % 50) as f32 - 25.0) * 0.5, ((i % 30) as f32 - 15.0) * 0.2),
            })
            .collect()
    }

    #[test]
    fn deterministic_same_seed() {
        let frames = scripted_frames(600);
        let a = GameWorld::replay(GameConfig::default(), &frames).unwrap();
        let b = GameWorld::replay(GameConfig::default(), &frames).unwrap();
        assert_eq!(a.state_hash(), b.state_hash());
        assert_eq!(a.stats(), b.stats());
        assert_eq!(a.events(), b.events());
    }

    #[test]
    fn replay_equivalence() {
        let frames = scripted_frames(300);
        let mut live = world();
        for f in &frames {
            live.step(f);
        }
        let replayed = GameWorld::replay(GameConfig::default(), &frames).unwrap();
        assert_eq!(live.state_hash(), replayed.state_hash());
        assert_eq!(live.tick(), replayed.tick());
    }

    #[test]
    fn different_seeds_diverge() {
        let frames = scripted_frames(10);
        let a = GameWorld::replay(GameConfig::default(), &frames).unwrap();
        let config = GameConfig {
            seed: 7,
            ..GameConfig::default()
        };
        let b = GameWorld::replay(config, &frames).unwrap();
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn splat_cap_evicts_oldest() {
        let mut config = GameConfig::default();
        config.splats.max_splats = 3;
        let mut w = GameWorld::new(config).unwrap();
        let spawn = w.city().spawn_point;
        w.place_avatar(spawn, 0.0, -80f32.to_radians());
        for _ in 0..6 {
            w.step(&fire());
            for _ in 0..12 {
                w.step(&idle());
            }
        }
        assert_eq!(w.stats().shots, 6);
        assert_eq!(w.splats().len(), 3);
    }
}
