use bevy::prelude::*;

// +Y is up and the ground plane is XZ. Zero yaw faces +Z; yaw is `atan2(x, z)` in degrees.

/// Squared length below which a projected direction counts as degenerate.
pub const DEGENERATE_SQ: f32 = 1e-6;

/// Critically damped approach of `current` toward `target`.
///
/// `smooth_time` is roughly the time to reach the target; `velocity` is the smoothing
/// derivative carried between calls. Returns `(value, velocity)`. The result never passes
/// the target, and a non-positive `dt` leaves both untouched.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: f32,
    smooth_time: f32,
    dt: f32,
) -> (f32, f32) {
    if dt <= 0.0 {
        return (current, velocity);
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;

    // Padé approximation of exp(-omega * dt).
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (velocity + omega * change) * dt;
    let mut velocity = (velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    if (target - current > 0.0) == (output > target) {
        output = target;
        velocity = 0.0;
    }
    (output, velocity)
}

/// Move `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Vector form of [`move_towards`]: a capped linear approach, not an exponential one.
pub fn move_towards_vec2(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist == 0.0 {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Clamp the length of `v` to `max`.
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    if v.length_squared() > max * max {
        v.normalize_or_zero() * max
    } else {
        v
    }
}

/// Project onto the horizontal plane and normalize; zero if the projection is degenerate.
pub fn flatten(v: Vec3) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z);
    if flat.length_squared() < DEGENERATE_SQ {
        Vec3::ZERO
    } else {
        flat.normalize_or_zero()
    }
}

/// World XZ components of a vector as a plane vector.
pub fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Yaw (degrees) of a horizontal direction.
pub fn yaw_of_direction(dir: Vec3) -> f32 {
    dir.x.atan2(dir.z).to_degrees()
}

/// Yaw (degrees) of a rotation, ignoring pitch and roll.
pub fn yaw_of(rotation: Quat) -> f32 {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    yaw.to_degrees()
}

/// Pure yaw rotation about +Y.
pub fn yaw_rotation(yaw_deg: f32) -> Quat {
    Quat::from_rotation_y(yaw_deg.to_radians())
}

/// Forward direction of a character rotation (+Z in model space).
pub fn facing_forward(rotation: Quat) -> Vec3 {
    rotation * Vec3::Z
}

/// Signed angle (degrees, in (-180, 180]) about +Y from `from` to `to`.
pub fn signed_angle_deg(from: Vec3, to: Vec3) -> f32 {
    let cross = from.cross(to);
    cross.dot(Vec3::Y).atan2(from.dot(to)).to_degrees()
}
