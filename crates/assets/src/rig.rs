use std::collections::BTreeMap;

use crate::AnimationClip;

/// Animation states an avatar rig can map, in fallback-resolution order.
pub const RIG_STATES: [&str; 5] = ["idle", "walk", "run", "jump", "fall"];

/// Maps avatar animation states to imported clips.
///
/// Only selection happens here; clips are never blended.
#[derive(Debug, Clone, Default)]
pub struct AvatarRig {
    by_state: BTreeMap<&'static str, AnimationClip>,
}

impl AvatarRig {
    /// Match each state to the first clip whose name contains it, ignoring case.
    ///
    /// A missing `fall` borrows `jump`, a missing `run` borrows `walk`, and
    /// anything still missing uses `idle`.
    pub fn from_clips(clips: &[AnimationClip]) -> Self {
        let mut by_state = BTreeMap::new();
        for state in RIG_STATES {
            if let Some(clip) = clips.iter().find(|c| c.name.to_lowercase().contains(state)) {
                by_state.insert(state, clip.clone());
            }
        }
        for (state, fallback) in [("fall", "jump"), ("run", "walk")] {
            if !by_state.contains_key(state) {
                if let Some(clip) = by_state.get(fallback).cloned() {
                    by_state.insert(state, clip);
                }
            }
        }
        if let Some(idle) = by_state.get("idle").cloned() {
            for state in RIG_STATES {
                by_state.entry(state).or_insert_with(|| idle.clone());
            }
        }
        tracing::debug!(mapped = by_state.len(), clips = clips.len(), "avatar rig built");
        Self { by_state }
    }

    /// Clip for an animation state name such as `"run"`. Unknown names get the idle clip.
    pub fn clip_for(&self, state: &str) -> Option<&AnimationClip> {
        let state = state.to_lowercase();
        self.by_state
            .get(state.as_str())
            .or_else(|| self.by_state.get("idle"))
    }

    pub fn is_empty(&self) -> bool {
        self.by_state.is_empty()
    }
}
