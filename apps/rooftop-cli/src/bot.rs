use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use rooftop_input::InputFrame;
use rooftop_kernel::GameWorld;
use rooftop_tools::GameInspector;

/// Aim error, in radians, under which the bot pulls the trigger.
const FIRE_CONE: f32 = 0.02;

/// Stands still, turns toward the nearest active ring and fires when lined up.
#[derive(Debug, Default)]
pub struct AimBot;

impl AimBot {
    pub fn frame(&self, world: &GameWorld) -> InputFrame {
        let config = world.config();
        let avatar = world.avatar();
        let eye = avatar.eye(&config.avatar);
        let Some(target) = GameInspector::nearest_active_target(world, eye) else {
            return InputFrame::default();
        };

        // Hold high to cancel the paintball's drop over the flight time.
        let distance = target.position.distance(eye);
        let flight = distance / config.weapon.muzzle_speed;
        let gravity = config.avatar.gravity * config.weapon.gravity_scale;
        let aim_point = target.position + Vec3::Y * (0.5 * gravity * flight * flight);

        let (yaw, pitch) = yaw_pitch(aim_point - eye);
        let yaw_error = wrap_angle(yaw - avatar.yaw);
        let pitch_error = pitch - avatar.pitch;
        let s = config.avatar.look_sensitivity;

        InputFrame {
            fire: yaw_error.abs() < FIRE_CONE && pitch_error.abs() < FIRE_CONE,
            look_delta: Vec2::new(yaw_error / s, -pitch_error / s),
            ..InputFrame::default()
        }
    }
}

fn yaw_pitch(dir: Vec3) -> (f32, f32) {
    let flat = Vec2::new(dir.x, dir.z).length();
    (dir.z.atan2(dir.x), dir.y.atan2(flat))
}

fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}
