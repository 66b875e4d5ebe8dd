use std::fmt;

use glam::Vec3;
use rooftop_common::EntityId;
use rooftop_kernel::{GameWorld, HitZone, TargetState};

/// Read-only queries against the game for the HUD, CLI and logs.
pub struct GameInspector;

impl GameInspector {
    pub fn summary(world: &GameWorld) -> GameSummary {
        let stats = world.stats();
        let avatar = world.avatar();
        GameSummary {
            tick: world.tick(),
            seed: world.seed(),
            score: stats.score,
            shots: stats.shots,
            hits: stats.hits,
            accuracy: world.accuracy(),
            streak: stats.streak,
            best_streak: stats.best_streak,
            targets_active: world.targets().iter().filter(|t| t.is_active()).count(),
            targets_total: world.targets().len(),
            paintballs: world.paintballs().len(),
            splats: world.splats().len(),
            avatar_position: avatar.position,
            anim: avatar.anim.name(),
        }
    }

    pub fn inspect_target(world: &GameWorld, id: EntityId) -> Option<TargetInfo> {
        world.targets().iter().find(|t| t.id == id).map(|t| TargetInfo {
            id: t.id,
            position: t.position,
            anchor: t.anchor,
            respawn_in: match t.state {
                TargetState::Active => None,
                TargetState::Popped { respawn_in } => Some(respawn_in),
            },
        })
    }

    /// Nearest active target to a point, for aim assists and bots.
    pub fn nearest_active_target(world: &GameWorld, from: Vec3) -> Option<TargetInfo> {
        let nearest = world
            .targets()
            .iter()
            .filter(|t| t.is_active())
            .min_by(|a, b| {
                a.position
                    .distance_squared(from)
                    .total_cmp(&b.position.distance_squared(from))
            });
        match nearest {
            Some(t) => {
                tracing::trace!(ring = %t.id.short(), distance = t.position.distance(from), "nearest ring");
                Self::inspect_target(world, t.id)
            }
            None => {
                tracing::debug!(tick = world.tick(), "every ring is popped");
                None
            }
        }
    }

    /// Points a hit in `zone` is worth under the current config.
    pub fn points_for(world: &GameWorld, zone: HitZone) -> u32 {
        world.config().targets.points * zone.multiplier()
    }
}

/// Snapshot of round progress.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub tick: u64,
    pub seed: u64,
    pub score: u64,
    pub shots: u32,
    pub hits: u32,
    pub accuracy: f32,
    pub streak: u32,
    pub best_streak: u32,
    pub targets_active: usize,
    pub targets_total: usize,
    pub paintballs: usize,
    pub splats: usize,
    pub avatar_position: Vec3,
    pub anim: &'static str,
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Round: tick={} seed={}", self.tick, self.seed)?;
        writeln!(
            f,
            "Score: {} | shots={} hits={} accuracy={:.1}% | streak={} best={}",
            self.score,
            self.shots,
            self.hits,
            self.accuracy * 100.0,
            self.streak,
            self.best_streak
        )?;
        writeln!(
            f,
            "Targets: {}/{} active | paintballs={} splats={}",
            self.targets_active, self.targets_total, self.paintballs, self.splats
        )?;
        let p = self.avatar_position;
        write!(f, "Avatar: pos=({:.2}, {:.2}, {:.2}) anim={}", p.x, p.y, p.z, self.anim)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetInfo {
    pub id: EntityId,
    pub position: Vec3,
    pub anchor: Vec3,
    /// Seconds until it returns, when popped.
    pub respawn_in: Option<f32>,
}

impl fmt::Display for TargetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.position;
        write!(f, "Target [{}] pos=({:.2}, {:.2}, {:.2})", self.id.short(), p.x, p.y, p.z)?;
        match self.respawn_in {
            Some(t) => write!(f, " popped, back in {t:.1}s"),
            None => write!(f, " active"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rooftop_input::InputFrame;
    use rooftop_kernel::GameConfig;

    fn world() -> GameWorld {
        GameWorld::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn summary_of_a_fresh_round() {
        let w = world();
        let s = GameInspector::summary(&w);
        assert_eq!(s.tick, 0);
        assert_eq!(s.score, 0);
        assert_eq!(s.targets_active, s.targets_total);
        assert_eq!(s.targets_total, w.config().targets.count);
        assert_eq!(s.anim, "idle");
    }

    #[test]
    fn summary_tracks_shots() {
        let mut w = world();
        let fire = InputFrame {
            fire: true,
            ..InputFrame::default()
        };
        w.step(&fire);
        let s = GameInspector::summary(&w);
        assert_eq!(s.tick, 1);
        assert_eq!(s.shots, 1);
        assert_eq!(s.paintballs + s.splats, 1);
    }

    #[test]
    fn summary_display() {
        let s = GameInspector::summary(&world());
        let text = format!("{s}");
        assert!(text.contains("tick=0"));
        assert!(text.contains("accuracy=0.0%"));
    }

    #[test]
    fn inspect_known_and_unknown_targets() {
        let mut w = world();
        w.step(&InputFrame {
            fire: true,
            ..InputFrame::default()
        });
        let first = w.targets()[0].id;
        let info = GameInspector::inspect_target(&w, first).unwrap();
        assert_eq!(info.position, w.targets()[0].position);
        assert!(info.respawn_in.is_none());
        assert!(format!("{info}").ends_with("active"));

        // A paintball id is never a target id.
        let ball = w.paintballs()[0].id;
        assert!(GameInspector::inspect_target(&w, ball).is_none());
    }

    #[test]
    fn nearest_target_is_closest() {
        let w = world();
        let from = w.targets()[1].position + Vec3::new(0.1, 0.0, 0.0);
        let nearest = GameInspector::nearest_active_target(&w, from).unwrap();
        assert_eq!(nearest.id, w.targets()[1].id);
    }

    #[test]
    fn no_nearest_target_in_an_empty_round() {
        let mut config = GameConfig::default();
        config.targets.count = 0;
        let w = GameWorld::new(config).unwrap();
        assert!(GameInspector::nearest_active_target(&w, Vec3::ZERO).is_none());
    }

    #[test]
    fn bull_is_worth_triple() {
        let w = world();
        assert_eq!(GameInspector::points_for(&w, HitZone::Bull), 3 * w.config().targets.points);
    }
}
