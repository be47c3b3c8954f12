use bevy::prelude::*;

use super::components::OrbitState;
use super::math::{flatten, signed_angle_deg, smooth_damp};
use crate::config::tuning::HeadOrbitTuning;

/// Desired angles within this of the limit count as "at the limit".
const LIMIT_EPSILON: f32 = 0.001;

/// Result of one orbit step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitOutput {
    /// Clamped, unsmoothed angle from character forward to camera forward.
    pub desired_angle_deg: f32,
    /// Proxy position for the look-at rig.
    pub target: Vec3,
    /// Smoothed rig weight in [0, 1].
    pub weight: f32,
}

/// Desired azimuth from `character_forward` to `camera_forward`, clamped to ±limit.
/// `None` when either direction has no horizontal component.
pub fn desired_angle(
    character_forward: Vec3,
    camera_forward: Vec3,
    back_angle_limit: f32,
) -> Option<f32> {
    let forward = flatten(character_forward);
    let camera = flatten(camera_forward);
    if forward == Vec3::ZERO || camera == Vec3::ZERO {
        return None;
    }
    let limit = back_angle_limit.abs();
    Some(signed_angle_deg(forward, camera).clamp(-limit, limit))
}

/// Advance the orbit by one frame.
///
/// The look target sits on a fixed-radius circle around the head; the azimuth is smoothed,
/// not the position, so it stays on the circle while moving. Returns `None` and leaves
/// `state` untouched on degenerate input.
pub fn step(
    state: &mut OrbitState,
    character_forward: Vec3,
    camera_forward: Vec3,
    head_base: Vec3,
    current_weight: f32,
    tuning: &HeadOrbitTuning,
    dt: f32,
) -> Option<OrbitOutput> {
    let desired = desired_angle(character_forward, camera_forward, tuning.back_angle_limit)?;
    let forward = flatten(character_forward);

    (state.current_angle_deg, state.angle_velocity) = smooth_damp(
        state.current_angle_deg,
        desired,
        state.angle_velocity,
        tuning.angular_smooth_time,
        dt,
    );

    let orbit_dir = Quat::from_axis_angle(Vec3::Y, state.current_angle_deg.to_radians()) * forward;
    let mut target = head_base + orbit_dir * tuning.follow_distance;
    target.y = head_base.y + tuning.height_offset;

    let limit = tuning.back_angle_limit.abs();
    let target_weight = if desired.abs() >= limit - LIMIT_EPSILON { 0.0 } else { 1.0 };
    let (weight, weight_velocity) = smooth_damp(
        current_weight,
        target_weight,
        state.weight_velocity,
        tuning.weight_smooth_time,
        dt,
    );
    state.weight_velocity = weight_velocity;

    Some(OrbitOutput {
        desired_angle_deg: desired,
        target,
        weight: weight.clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::math::yaw_rotation;

    const DT: f32 = 1.0 / 60.0;
    const EPS: f32 = 1e-3;

    fn tuning() -> HeadOrbitTuning {
        HeadOrbitTuning::default()
    }

    fn dir(yaw_deg: f32) -> Vec3 {
        yaw_rotation(yaw_deg) * Vec3::Z
    }

    #[test]
    fn desired_angle_stays_within_limit() {
        let limit = 165.0;
        for character in (0..360).step_by(15) {
            for camera in (0..360).step_by(7) {
                let a = desired_angle(dir(character as f32), dir(camera as f32), limit).unwrap();
                assert!((-limit..=limit).contains(&a), "{character} -> {camera}: {a}");
            }
        }
    }

    #[test]
    fn camera_behind_clamps_and_fades_weight() {
        let tuning = tuning();
        let mut state = OrbitState::default();
        let mut weight = 1.0;
        let mut last = None;
        for _ in 0..120 {
            let out =
                step(&mut state, Vec3::Z, Vec3::NEG_Z, Vec3::ZERO, weight, &tuning, DT).unwrap();
            weight = out.weight;
            last = Some(out);
        }
        let out = last.unwrap();
        assert!((out.desired_angle_deg.abs() - 165.0).abs() < EPS);
        assert!(weight < 0.01, "weight = {weight}");
    }

    #[test]
    fn target_stays_on_the_circle_at_fixed_height() {
        let tuning = HeadOrbitTuning {
            height_offset: 0.3,
            ..tuning()
        };
        let head = Vec3::new(2.0, 1.7, -4.0);
        let mut state = OrbitState::default();
        for frame in 0..90 {
            let camera = dir(frame as f32 * 3.0);
            let out = step(&mut state, dir(10.0), camera, head, 1.0, &tuning, DT).unwrap();
            let flat = Vec2::new(out.target.x - head.x, out.target.z - head.z);
            assert!((flat.length() - tuning.follow_distance).abs() < EPS);
            assert_eq!(out.target.y, head.y + tuning.height_offset);
        }
    }

    #[test]
    fn converged_target_points_along_camera() {
        let tuning = tuning();
        let mut state = OrbitState::default();
        let camera = dir(60.0);
        let mut out = None;
        for _ in 0..300 {
            out = step(&mut state, Vec3::Z, camera, Vec3::ZERO, 1.0, &tuning, DT);
        }
        let out = out.unwrap();
        assert!((state.current_angle_deg - 60.0).abs() < EPS);
        assert!((out.target.normalize() - camera).length() < EPS);
        assert_eq!(out.weight, 1.0);
    }

    #[test]
    fn degenerate_input_skips_the_frame() {
        let mut state = OrbitState {
            current_angle_deg: 20.0,
            angle_velocity: 1.0,
            weight_velocity: 0.5,
        };
        let before = state;
        assert!(step(&mut state, Vec3::Y, Vec3::Z, Vec3::ZERO, 1.0, &tuning(), DT).is_none());
        assert!(step(&mut state, Vec3::Z, Vec3::NEG_Y, Vec3::ZERO, 1.0, &tuning(), DT).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn angle_moves_smoothly_not_instantly() {
        let mut state = OrbitState::default();
        step(&mut state, Vec3::Z, dir(90.0), Vec3::ZERO, 1.0, &tuning(), DT).unwrap();
        assert!(state.current_angle_deg > 0.0 && state.current_angle_deg < 90.0);
    }
}
