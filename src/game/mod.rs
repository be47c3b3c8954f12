pub mod animator;
pub mod components;
pub mod events;
pub mod head_orbit;
pub mod intent;
pub mod locomotion;
pub mod math;
pub mod mover;
