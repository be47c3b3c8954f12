use bevy::prelude::*;

use super::animator::{params, AnimationSink};
use super::components::MotionState;
use super::intent::MoveIntent;
use super::math::{
    clamp_length, flatten, horizontal, move_towards_vec2, yaw_of, yaw_of_direction, yaw_rotation,
};
use super::mover::CapsuleMover;
use crate::config::tuning::LocomotionTuning;

/// Horizontal speeds below this are published as exactly zero.
pub const IDLE_SPEED_SNAP: f32 = 0.05;
/// Squared camera-forward length required to re-aim at attack start.
const ATTACK_AIM_MIN_SQ: f32 = 0.001;
/// Squared move-direction length required to turn the character.
const TURN_MIN_SQ: f32 = 0.0001;

/// Camera directions in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub forward: Vec3,
    pub right: Vec3,
}

impl CameraView {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            forward: transform.forward().as_vec3(),
            right: transform.right().as_vec3(),
        }
    }
}

/// Time of the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    /// Elapsed seconds since start.
    pub now: f32,
    pub dt: f32,
}

/// Animation parameters produced by one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimFrame {
    pub speed: f32,
    pub speed_damp_time: f32,
    pub is_grounded: bool,
    pub velocity_y: f32,
    pub jump: bool,
    pub attack: bool,
    pub attack_count: Option<i32>,
}

impl AnimFrame {
    pub fn publish(&self, sink: &mut impl AnimationSink, dt: f32) {
        if self.jump {
            sink.set_trigger(params::JUMP);
        }
        if self.attack {
            sink.set_trigger(params::ATTACK);
        }
        if let Some(count) = self.attack_count {
            sink.set_integer(params::ATTACK_COUNT, count);
        }
        sink.set_float_damped(params::SPEED, self.speed, self.speed_damp_time, dt);
        sink.set_bool(params::IS_GROUNDED, self.is_grounded);
        sink.set_float(params::VELOCITY_Y, self.velocity_y);
    }
}

/// Everything the step reads besides its own state and the mover.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub intent: &'a MoveIntent,
    /// `None` when no camera is available; movement input is then ignored.
    pub view: Option<CameraView>,
    pub facing: Quat,
    /// Current value of the `Speed` parameter, used to pick the damp time.
    pub prev_speed: f32,
    pub clock: FrameClock,
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionFrame {
    pub facing: Quat,
    pub displacement: Vec3,
    pub anim: AnimFrame,
}

/// Camera-relative move direction with magnitude ≤ 1; zero if the camera gives no usable plane.
pub fn desired_direction(axis: Vec2, view: Option<&CameraView>) -> Vec3 {
    let Some(view) = view else {
        return Vec3::ZERO;
    };
    let forward = flatten(view.forward);
    let right = flatten(view.right);
    let dir = forward * axis.y + right * axis.x;
    if dir.length_squared() > 1.0 {
        dir.normalize_or_zero()
    } else {
        dir
    }
}

/// Enter the attack state. Returns the new facing; a no-op while already attacking.
pub fn start_attack(
    state: &mut MotionState,
    facing: Quat,
    camera_forward: Vec3,
    anim: &mut AnimFrame,
) -> Quat {
    if state.is_attacking {
        return facing;
    }
    state.attack_count = 0;
    state.is_attacking = true;
    anim.attack = true;
    anim.attack_count = Some(state.attack_count);

    let flat = Vec3::new(camera_forward.x, 0.0, camera_forward.z);
    let facing = if flat.length_squared() > ATTACK_AIM_MIN_SQ {
        yaw_rotation(yaw_of_direction(flat))
    } else {
        facing
    };
    state.locked_yaw = yaw_of(facing);
    debug!("attack start, yaw locked at {:.1}", state.locked_yaw);
    facing
}

/// Leave the attack state (animation completion).
pub fn end_attack(state: &mut MotionState) {
    state.is_attacking = false;
}

/// Launch a jump when grounded and free. Returns whether it fired.
pub fn try_jump(
    state: &mut MotionState,
    grounded: bool,
    mover_velocity: Vec3,
    tuning: &LocomotionTuning,
    anim: &mut AnimFrame,
) -> bool {
    if !grounded || state.is_attacking {
        return false;
    }
    anim.jump = true;
    // Take off with what the mover actually did, not the internal target.
    state.horizontal_velocity = horizontal(mover_velocity);
    state.vertical_velocity = (tuning.jump_height * -2.0 * tuning.gravity).sqrt();
    state.last_grounded_time = -1.0;
    true
}

/// New facing for this frame.
pub fn rotate(
    state: &MotionState,
    facing: Quat,
    dir: Vec3,
    dt: f32,
    tuning: &LocomotionTuning,
) -> Quat {
    if state.is_attacking {
        return yaw_rotation(state.locked_yaw);
    }
    if dir.length_squared() > TURN_MIN_SQ {
        let target = yaw_rotation(yaw_of_direction(dir));
        facing.slerp(target, (tuning.rotation_lerp * dt).clamp(0.0, 1.0))
    } else {
        yaw_rotation(yaw_of(facing))
    }
}

pub fn apply_gravity(
    state: &mut MotionState,
    grounded: bool,
    clock: FrameClock,
    tuning: &LocomotionTuning,
) {
    if grounded {
        state.last_grounded_time = clock.now;
        if state.vertical_velocity <= 0.0 {
            state.vertical_velocity = tuning.grounded_stick;
        }
    } else {
        state.vertical_velocity += tuning.gravity * clock.dt;
    }
}

/// Blend horizontal velocity toward the intent with the ground or air curve.
pub fn blend_horizontal(
    state: &mut MotionState,
    dir: Vec3,
    intent: &MoveIntent,
    grounded: bool,
    dt: f32,
    tuning: &LocomotionTuning,
) {
    let has_input = intent.has_input();
    let target = if has_input {
        let speed = if intent.sprint_held { tuning.run_speed } else { tuning.walk_speed };
        horizontal(dir) * speed
    } else {
        Vec2::ZERO
    };
    let current = state.horizontal_velocity;

    state.horizontal_velocity = if grounded {
        if state.is_attacking {
            move_towards_vec2(current, Vec2::ZERO, tuning.decel_rate * dt)
        } else {
            let rate = if target.length() > current.length() {
                tuning.accel_rate
            } else {
                tuning.decel_rate
            };
            move_towards_vec2(current, target, rate * dt)
        }
    } else {
        let mut v = current;
        if !state.is_attacking {
            v = move_towards_vec2(v, target, tuning.air_accel_rate * dt);
        }
        if (state.is_attacking || !has_input) && tuning.air_drag > 0.0 {
            v = move_towards_vec2(v, Vec2::ZERO, tuning.air_drag * dt);
        }
        clamp_length(v, tuning.max_air_speed)
    };
}

/// Run one frame of locomotion against `mover`, moving `position`.
pub fn step<M: CapsuleMover>(
    state: &mut MotionState,
    input: StepInput<'_>,
    mover: &mut M,
    position: &mut Vec3,
    tuning: &LocomotionTuning,
) -> LocomotionFrame {
    let StepInput {
        intent,
        view,
        mut facing,
        prev_speed,
        clock,
    } = input;
    let mut anim = AnimFrame::default();

    if intent.attack_requested {
        let camera_forward = view.map(|v| v.forward).unwrap_or(Vec3::ZERO);
        facing = start_attack(state, facing, camera_forward, &mut anim);
    }
    if intent.jump_requested {
        let (grounded, velocity) = (mover.is_grounded(), mover.velocity());
        if try_jump(state, grounded, velocity, tuning, &mut anim) {
            debug!("jump, v_y = {:.2}", state.vertical_velocity);
        }
    }

    let dir = desired_direction(intent.axis, view.as_ref());
    facing = rotate(state, facing, dir, clock.dt, tuning);

    let grounded = mover.is_grounded();
    apply_gravity(state, grounded, clock, tuning);
    blend_horizontal(state, dir, intent, grounded, clock.dt, tuning);

    let h = state.horizontal_velocity;
    let displacement = Vec3::new(h.x, state.vertical_velocity, h.y) * clock.dt;
    mover.move_by(position, displacement, clock.dt);

    // Gravity may have gone negative on the landing frame.
    if mover.is_grounded() && state.vertical_velocity < 0.0 {
        state.vertical_velocity = tuning.grounded_stick;
    }

    let mut speed = horizontal(mover.velocity()).length();
    if speed < IDLE_SPEED_SNAP {
        speed = 0.0;
    }
    anim.speed = speed;
    anim.speed_damp_time = if speed > prev_speed {
        tuning.accel_damp_time
    } else {
        tuning.decel_damp_time
    };
    anim.is_grounded = mover.is_grounded();
    anim.velocity_y = state.vertical_velocity;

    LocomotionFrame {
        facing,
        displacement,
        anim,
    }
}
