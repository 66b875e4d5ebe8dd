use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Action, Key, MouseButton};

/// Maps keys and mouse buttons to actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    keys: BTreeMap<Key, Action>,
    buttons: BTreeMap<MouseButton, Action>,
}

impl Default for Bindings {
    fn default() -> Self {
        let keys = BTreeMap::from([
            (Key::W, Action::MoveForward),
            (Key::S, Action::MoveBack),
            (Key::A, Action::StrafeLeft),
            (Key::D, Action::StrafeRight),
            (Key::ShiftLeft, Action::Run),
            (Key::Space, Action::Jump),
            (Key::H, Action::ToggleHud),
            (Key::F1, Action::ToggleHelp),
            (Key::V, Action::ToggleCamera),
            (Key::P, Action::TogglePause),
            (Key::R, Action::ResetRound),
            (Key::Escape, Action::ReleaseCursor),
        ]);
        let buttons = BTreeMap::from([(MouseButton::Left, Action::Fire)]);
        Self { keys, buttons }
    }
}

impl Bindings {
    pub fn action_for_key(&self, key: Key) -> Action {
        self.keys.get(&key).copied().unwrap_or(Action::Noop)
    }

    pub fn action_for_button(&self, button: MouseButton) -> Action {
        self.buttons.get(&button).copied().unwrap_or(Action::Noop)
    }

    /// Bind `key` to `action`, returning the action it was bound to before.
    pub fn rebind(&mut self, key: Key, action: Action) -> Option<Action> {
        tracing::debug!(?key, ?action, "rebind key");
        if action == Action::Noop {
            return self.keys.remove(&key);
        }
        self.keys.insert(key, action)
    }

    pub fn rebind_button(&mut self, button: MouseButton, action: Action) -> Option<Action> {
        if action == Action::Noop {
            return self.buttons.remove(&button);
        }
        self.buttons.insert(button, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let b = Bindings::default();
        assert_eq!(b.action_for_key(Key::W), Action::MoveForward);
        assert_eq!(b.action_for_key(Key::Space), Action::Jump);
        assert_eq!(b.action_for_key(Key::Escape), Action::ReleaseCursor);
        assert_eq!(b.action_for_button(MouseButton::Left), Action::Fire);
        assert_eq!(b.action_for_button(MouseButton::Right), Action::Noop);
        assert_eq!(b.action_for_key(Key::ControlLeft), Action::Noop);
    }

    #[test]
    fn rebind_replaces_and_unbinds() {
        let mut b = Bindings::default();
        assert_eq!(b.rebind(Key::E, Action::Jump), None);
        assert_eq!(b.action_for_key(Key::E), Action::Jump);
        assert_eq!(b.rebind(Key::Space, Action::Noop), Some(Action::Jump));
        assert_eq!(b.action_for_key(Key::Space), Action::Noop);
    }

    #[test]
    fn bindings_serialize() {
        let b = Bindings::default();
        let json = serde_json::to_string(&b).unwrap();
        let back: Bindings = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }
}
