use serde::{Deserialize, Serialize};

/// Keys the game understands, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    ShiftLeft,
    ControlLeft,
    E,
    F1,
    H,
    V,
    R,
    P,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

/// A high-level action produced by any input device.
///
/// The simulation and the app shell consume actions, never raw input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBack,
    StrafeLeft,
    StrafeRight,
    Run,
    Jump,
    Fire,
    ToggleHud,
    ToggleHelp,
    ToggleCamera,
    TogglePause,
    ResetRound,
    ReleaseCursor,
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

impl Action {
    /// Edge-triggered actions fire once per press; the rest act while held.
    pub fn is_trigger(self) -> bool {
        matches!(
            self,
            Action::ToggleHud
                | Action::ToggleHelp
                | Action::ToggleCamera
                | Action::TogglePause
                | Action::ResetRound
                | Action::ReleaseCursor
        )
    }
}
