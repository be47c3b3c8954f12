use bevy::prelude::*;

/// Input intent: written by the input set, consumed by the locomotion set in the same frame.
#[derive(Component, Debug, Clone, Default)]
pub struct MoveIntent {
    /// Move axis in [-1, 1]²; x = strafe right, y = forward.
    pub axis: Vec2,
    /// Level-triggered: true while the sprint key is held.
    pub sprint_held: bool,
    /// Edge-triggered, cleared once consumed.
    pub jump_requested: bool,
    /// Edge-triggered, cleared once consumed.
    pub attack_requested: bool,
}

impl MoveIntent {
    /// Whether the axis is far enough from rest to count as input.
    pub fn has_input(&self) -> bool {
        self.axis.length_squared() > 0.01
    }

    /// Drop the one-shot requests after a frame has seen them.
    pub fn consume_one_shots(&mut self) {
        self.jump_requested = false;
        self.attack_requested = false;
    }
}
