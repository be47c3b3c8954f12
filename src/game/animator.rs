use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use super::math::smooth_damp;

/// Parameter names shared with the animation graph.
pub mod params {
    pub const SPEED: &str = "Speed";
    pub const IS_GROUNDED: &str = "IsGrounded";
    pub const VELOCITY_Y: &str = "VelocityY";
    pub const JUMP: &str = "Jump";
    pub const ATTACK: &str = "Attack";
    pub const ATTACK_COUNT: &str = "AttackCount";
}

/// Named-parameter sink of an animation system.
pub trait AnimationSink {
    fn float(&self, name: &'static str) -> f32;
    fn set_float(&mut self, name: &'static str, value: f32);
    /// Approach `value` with the given damp time instead of jumping to it.
    fn set_float_damped(&mut self, name: &'static str, value: f32, damp_time: f32, dt: f32);
    fn set_bool(&mut self, name: &'static str, value: bool);
    fn set_integer(&mut self, name: &'static str, value: i32);
    fn set_trigger(&mut self, name: &'static str);
}

/// In-memory animator parameter store.
#[derive(Component, Debug, Default, Clone)]
pub struct AnimatorParams {
    floats: HashMap<&'static str, f32>,
    /// Smoothing derivatives for damped floats.
    damp_velocities: HashMap<&'static str, f32>,
    bools: HashMap<&'static str, bool>,
    integers: HashMap<&'static str, i32>,
    triggers: HashSet<&'static str>,
}

impl AnimatorParams {
    #[cfg(test)]
    pub fn bool(&self, name: &'static str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }

    #[cfg(test)]
    pub fn integer(&self, name: &'static str) -> i32 {
        self.integers.get(name).copied().unwrap_or(0)
    }

    /// Consume a trigger; true if it was set.
    pub fn take_trigger(&mut self, name: &'static str) -> bool {
        self.triggers.remove(name)
    }
}

impl AnimationSink for AnimatorParams {
    fn float(&self, name: &'static str) -> f32 {
        self.floats.get(name).copied().unwrap_or(0.0)
    }

    fn set_float(&mut self, name: &'static str, value: f32) {
        self.floats.insert(name, value);
        self.damp_velocities.remove(name);
    }

    fn set_float_damped(&mut self, name: &'static str, value: f32, damp_time: f32, dt: f32) {
        let current = self.float(name);
        let velocity = self.damp_velocities.get(name).copied().unwrap_or(0.0);
        let (next, velocity) = smooth_damp(current, value, velocity, damp_time, dt);
        self.floats.insert(name, next);
        self.damp_velocities.insert(name, velocity);
    }

    fn set_bool(&mut self, name: &'static str, value: bool) {
        self.bools.insert(name, value);
    }

    fn set_integer(&mut self, name: &'static str, value: i32) {
        self.integers.insert(name, value);
    }

    fn set_trigger(&mut self, name: &'static str) {
        self.triggers.insert(name);
    }
}

/// Stand-in for the attack clip: plays for `length` seconds after the `Attack` trigger.
#[derive(Component, Debug, Clone)]
pub struct AttackClip {
    pub length: f32,
    remaining: Option<f32>,
}

impl AttackClip {
    pub fn new(length: f32) -> Self {
        Self {
            length,
            remaining: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn start(&mut self) {
        self.remaining = Some(self.length.max(0.0));
    }

    /// Advance the clip; true on the frame it finishes.
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(t) if t - dt <= 0.0 => {
                self.remaining = None;
                true
            }
            Some(t) => {
                self.remaining = Some(t - dt);
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damped_float_approaches_without_jumping() {
        let mut anim = AnimatorParams::default();
        anim.set_float_damped(params::SPEED, 5.0, 0.1, 0.02);
        let first = anim.float(params::SPEED);
        assert!(first > 0.0 && first < 5.0);
        for _ in 0..100 {
            anim.set_float_damped(params::SPEED, 5.0, 0.1, 0.02);
        }
        assert!((anim.float(params::SPEED) - 5.0).abs() < 1e-3);
    }

    #[test]
    fn triggers_are_consumed_once() {
        let mut anim = AnimatorParams::default();
        anim.set_trigger(params::JUMP);
        assert!(anim.take_trigger(params::JUMP));
        assert!(!anim.take_trigger(params::JUMP));
    }

    #[test]
    fn attack_clip_finishes_once() {
        let mut clip = AttackClip::new(0.05);
        assert!(!clip.tick(0.02));
        clip.start();
        assert!(!clip.tick(0.02));
        assert!(!clip.tick(0.02));
        assert!(clip.tick(0.02));
        assert!(!clip.is_playing());
        assert!(!clip.tick(0.02));
    }
}
