use std::path::Path;

use rooftop_city::CityConfig;
use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {field} {reason}")]
    Invalid { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Ground speed in m/s.
    pub walk_speed: f32,
    pub run_multiplier: f32,
    /// Initial upward speed of a jump in m/s.
    pub jump_speed: f32,
    pub gravity: f32,
    /// Half-width of the collision box.
    pub radius: f32,
    pub height: f32,
    pub eye_height: f32,
    /// Ledges up to this tall are climbed without jumping.
    pub step_height: f32,
    /// Radians of rotation per pixel of mouse motion.
    pub look_sensitivity: f32,
    pub pitch_limit_degrees: f32,
    /// Falling below this height respawns the avatar.
    pub kill_plane: f32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            walk_speed: 6.0,
            run_multiplier: 1.8,
            jump_speed: 8.0,
            gravity: 20.0,
            radius: 0.35,
            height: 1.8,
            eye_height: 1.6,
            step_height: 0.45,
            look_sensitivity: 0.0025,
            pitch_limit_degrees: 85.0,
            kill_plane: -25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub muzzle_speed: f32,
    /// Seconds between shots while the trigger is held.
    pub cooldown: f32,
    pub ball_radius: f32,
    /// Seconds before an unlanded paintball is discarded.
    pub lifetime: f32,
    /// Fraction of avatar gravity applied to paintballs.
    pub gravity_scale: f32,
    pub max_paintballs: usize,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            muzzle_speed: 38.0,
            cooldown: 0.16,
            ball_radius: 0.12,
            lifetime: 4.0,
            gravity_scale: 0.35,
            max_paintballs: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub count: usize,
    /// Outer radius of the ring face.
    pub ring_radius: f32,
    pub tube_radius: f32,
    /// Horizontal radius of the drift circle around the anchor.
    pub drift_radius: f32,
    /// Angular speed of the drift in rad/s.
    pub drift_speed: f32,
    pub bob_amplitude: f32,
    /// Bob frequency in Hz.
    pub bob_frequency: f32,
    /// Spin about the vertical axis in rad/s.
    pub spin_speed: f32,
    pub respawn_delay: f32,
    /// Base points per hit, multiplied by the hit zone.
    pub points: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            count: 10,
            ring_radius: 1.1,
            tube_radius: 0.12,
            drift_radius: 2.5,
            drift_speed: 0.35,
            bob_amplitude: 0.4,
            bob_frequency: 0.8,
            spin_speed: 0.5,
            respawn_delay: 2.5,
            points: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplatConfig {
    /// Oldest splats are evicted past this count.
    pub max_splats: usize,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for SplatConfig {
    fn default() -> Self {
        Self {
            max_splats: 300,
            min_radius: 0.25,
            max_radius: 0.55,
        }
    }
}

/// Everything needed to build and run a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub avatar: AvatarConfig,
    pub weapon: WeaponConfig,
    pub targets: TargetConfig,
    pub splats: SplatConfig,
    pub city: CityConfig,
    /// Fixed simulation step in seconds.
    pub tick_rate: f32,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            avatar: AvatarConfig::default(),
            weapon: WeaponConfig::default(),
            targets: TargetConfig::default(),
            splats: SplatConfig::default(),
            city: CityConfig::default(),
            tick_rate: 1.0 / 60.0,
            seed: 42,
        }
    }
}

impl GameConfig {
    /// Parse and validate a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), seed = config.seed, "config loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.avatar;
        let w = &self.weapon;
        let t = &self.targets;
        let s = &self.splats;
        let positive = [
            ("tick_rate", self.tick_rate),
            ("avatar.walk_speed", a.walk_speed),
            ("avatar.run_multiplier", a.run_multiplier),
            ("avatar.jump_speed", a.jump_speed),
            ("avatar.gravity", a.gravity),
            ("avatar.radius", a.radius),
            ("avatar.height", a.height),
            ("avatar.eye_height", a.eye_height),
            ("avatar.look_sensitivity", a.look_sensitivity),
            ("weapon.muzzle_speed", w.muzzle_speed),
            ("weapon.cooldown", w.cooldown),
            ("weapon.ball_radius", w.ball_radius),
            ("weapon.lifetime", w.lifetime),
            ("targets.ring_radius", t.ring_radius),
            ("targets.tube_radius", t.tube_radius),
            ("targets.respawn_delay", t.respawn_delay),
            ("splats.min_radius", s.min_radius),
            ("splats.max_radius", s.max_radius),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, "must be positive"));
            }
        }
        let non_negative = [
            ("avatar.step_height", a.step_height),
            ("weapon.gravity_scale", w.gravity_scale),
            ("targets.drift_radius", t.drift_radius),
            ("targets.drift_speed", t.drift_speed),
            ("targets.bob_amplitude", t.bob_amplitude),
            ("targets.bob_frequency", t.bob_frequency),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must not be negative"));
            }
        }
        let finite = [
            ("avatar.kill_plane", a.kill_plane),
            ("targets.spin_speed", t.spin_speed),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }
        if a.eye_height > a.height {
            return Err(invalid("avatar.eye_height", "must not exceed avatar.height"));
        }
        if !(a.pitch_limit_degrees > 0.0 && a.pitch_limit_degrees <= 89.0) {
            return Err(invalid("avatar.pitch_limit_degrees", "must be within (0, 89]"));
        }
        if t.tube_radius >= t.ring_radius {
            return Err(invalid("targets.tube_radius", "ring inner edge must lie inside the outer edge"));
        }
        if s.max_radius < s.min_radius {
            return Err(invalid("splats.max_radius", "must not be below splats.min_radius"));
        }
        if w.max_paintballs == 0 {
            return Err(invalid("weapon.max_paintballs", "must be at least 1"));
        }
        if s.max_splats == 0 {
            return Err(invalid("splats.max_splats", "must be at least 1"));
        }
        self.city
            .validate()
            .map_err(|e| invalid("city", &e.to_string()))?;
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
