use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{Action, Bindings, Key, MouseButton};

/// Everything the simulation needs from the player for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// x = strafe right, y = forward; each component in `[-1, 1]`.
    pub move_axis: Vec2,
    pub run: bool,
    pub jump: bool,
    pub fire: bool,
    /// Mouse motion in pixels since the previous frame.
    pub look_delta: Vec2,
}

/// Accumulates device events between ticks.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: Bindings,
    keys_down: BTreeSet<Key>,
    buttons_down: BTreeSet<MouseButton>,
    /// Held actions pressed at least once since the last frame, so a tap
    /// shorter than a tick still registers.
    latched: BTreeSet<Action>,
    look: Vec2,
    triggers: Vec<Action>,
}

impl InputState {
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    /// Record a key press or release. OS key repeat is ignored.
    pub fn key(&mut self, key: Key, pressed: bool) {
        let action = self.bindings.action_for_key(key);
        if pressed {
            if self.keys_down.insert(key) {
                self.on_press(action);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub fn button(&mut self, button: MouseButton, pressed: bool) {
        let action = self.bindings.action_for_button(button);
        if pressed {
            if self.buttons_down.insert(button) {
                self.on_press(action);
            }
        } else {
            self.buttons_down.remove(&button);
        }
    }

    fn on_press(&mut self, action: Action) {
        match action {
            Action::Noop => {}
            a if a.is_trigger() => self.triggers.push(a),
            a => {
                self.latched.insert(a);
            }
        }
    }

    /// Accumulate raw mouse motion in pixels.
    pub fn mouse_motion(&mut self, dx: f64, dy: f64) {
        self.look += Vec2::new(dx as f32, dy as f32);
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.keys_down
            .iter()
            .any(|k| self.bindings.action_for_key(*k) == action)
            || self
                .buttons_down
                .iter()
                .any(|b| self.bindings.action_for_button(*b) == action)
    }

    fn active(&self, action: Action) -> bool {
        self.latched.contains(&action) || self.is_held(action)
    }

    /// Snapshot the current input and reset per-frame state: look deltas,
    /// tap latches and any undrained triggers.
    pub fn take_frame(&mut self) -> InputFrame {
        let axis = |pos: Action, neg: Action| {
            let p = if self.active(pos) { 1.0 } else { 0.0 };
            let n = if self.active(neg) { 1.0 } else { 0.0 };
            p - n
        };
        let mut move_axis = Vec2::new(
            axis(Action::StrafeRight, Action::StrafeLeft),
            axis(Action::MoveForward, Action::MoveBack),
        );
        if move_axis.length_squared() > 1.0 {
            move_axis = move_axis.normalize();
        }

        let frame = InputFrame {
            move_axis,
            run: self.active(Action::Run),
            jump: self.active(Action::Jump),
            fire: self.active(Action::Fire),
            look_delta: self.look,
        };
        self.look = Vec2::ZERO;
        self.latched.clear();
        self.triggers.clear();
        frame
    }

    /// Edge-triggered actions pressed since the last drain, in press order.
    pub fn drain_triggers(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.triggers)
    }

    /// Forget all held state, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys_down.clear();
        self.buttons_down.clear();
        self.latched.clear();
        self.look = Vec2::ZERO;
        self.triggers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> InputState {
        InputState::new(Bindings::default())
    }

    #[test]
    fn forward_and_strafe() {
        let mut s = state();
        s.key(Key::W, true);
        let f = s.take_frame();
        assert_eq!(f.move_axis, Vec2::new(0.0, 1.0));
        s.key(Key::W, false);
        s.key(Key::A, true);
        assert_eq!(s.take_frame().move_axis, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut s = state();
        s.key(Key::W, true);
        s.key(Key::S, true);
        assert_eq!(s.take_frame().move_axis, Vec2::ZERO);
    }

    #[test]
    fn diagonal_is_normalized() {
        let mut s = state();
        s.key(Key::W, true);
        s.key(Key::D, true);
        let f = s.take_frame();
        assert!((f.move_axis.length() - 1.0).abs() < 1e-5);
        assert!(f.move_axis.x > 0.0 && f.move_axis.y > 0.0);
    }

    #[test]
    fn look_delta_resets_each_frame() {
        let mut s = state();
        s.mouse_motion(3.0, -2.0);
        s.mouse_motion(1.0, 1.0);
        assert_eq!(s.take_frame().look_delta, Vec2::new(4.0, -1.0));
        assert_eq!(s.take_frame().look_delta, Vec2::ZERO);
    }

    #[test]
    fn quick_click_still_fires_once() {
        let mut s = state();
        s.button(MouseButton::Left, true);
        s.button(MouseButton::Left, false);
        assert!(s.take_frame().fire);
        assert!(!s.take_frame().fire);
    }

    #[test]
    fn held_fire_persists() {
        let mut s = state();
        s.button(MouseButton::Left, true);
        assert!(s.take_frame().fire);
        assert!(s.take_frame().fire);
    }

    #[test]
    fn triggers_fire_once_per_press() {
        let mut s = state();
        s.key(Key::H, true);
        // OS key repeat
        s.key(Key::H, true);
        s.key(Key::V, true);
        assert_eq!(s.drain_triggers(), vec![Action::ToggleHud, Action::ToggleCamera]);
        assert!(s.drain_triggers().is_empty());
        s.key(Key::H, false);
        s.key(Key::H, true);
        assert_eq!(s.drain_triggers(), vec![Action::ToggleHud]);
    }

    #[test]
    fn clear_drops_held_keys() {
        let mut s = state();
        s.key(Key::W, true);
        s.key(Key::ShiftLeft, true);
        s.clear();
        let f = s.take_frame();
        assert_eq!(f, InputFrame::default());
    }

    #[test]
    fn frame_roundtrips_through_json() {
        let frame = InputFrame {
            move_axis: Vec2::new(0.5, -0.5),
            run: true,
            jump: false,
            fire: true,
            look_delta: Vec2::new(2.0, 3.0),
        };
        let json = serde_json::to_string(&frame).unwrap();
        let back: InputFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, back);
    }
}
