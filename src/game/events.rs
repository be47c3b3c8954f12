use bevy::prelude::*;

/// Raised by the animation system when an attack clip finishes.
#[derive(Message, Debug, Clone, Copy)]
pub struct AttackEnd {
    pub entity: Entity,
}
