use bevy::prelude::*;

// ── Marker components ───────────────────────────────────────────────

/// Character root driven by the locomotion step.
#[derive(Component)]
pub struct LocomotionController;

/// Camera whose transform defines "forward" for movement and head look.
#[derive(Component)]
pub struct PlayerCamera {
    /// Orbit angle around the character (radians about +Y).
    pub orbit_yaw: f32,
}

impl Default for PlayerCamera {
    fn default() -> Self {
        Self {
            orbit_yaw: std::f32::consts::PI,
        }
    }
}

/// Head bone (parented to the character root) used as the orbit center.
#[derive(Component)]
pub struct HeadBone;

/// Empty entity moved onto the orbit circle; the aim rig looks at it.
#[derive(Component)]
pub struct LookTargetProxy;

// ── Locomotion state ────────────────────────────────────────────────

/// Per-character motion state, mutated once per frame by the locomotion step.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct MotionState {
    /// World XZ velocity (x → world x, y → world z).
    pub horizontal_velocity: Vec2,
    pub vertical_velocity: f32,
    pub is_attacking: bool,
    /// Facing yaw (degrees) frozen while attacking.
    pub locked_yaw: f32,
    /// Elapsed time of the last grounded frame; -1 right after a jump.
    pub last_grounded_time: f32,
    /// Combo step published as `AttackCount`. Reset on every attack start.
    pub attack_count: i32,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            horizontal_velocity: Vec2::ZERO,
            vertical_velocity: 0.0,
            is_attacking: false,
            locked_yaw: 0.0,
            last_grounded_time: 0.0,
            attack_count: 0,
        }
    }
}

// ── Head orbit ──────────────────────────────────────────────────────

/// Wiring for the head-look orbit. Lives on its own entity next to [`LookAtRig`].
#[derive(Component, Debug, Clone, Copy)]
pub struct HeadOrbitController {
    pub character: Entity,
    /// Head bone, anywhere under the character's `ChildOf` chain. Its position is composed
    /// from local transforms. Falls back to the character root when unset.
    pub head: Option<Entity>,
    pub camera: Entity,
    pub proxy: Entity,
}

/// Smoothing state of the orbit; persists across frames, never reset.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitState {
    pub current_angle_deg: f32,
    pub angle_velocity: f32,
    pub weight_velocity: f32,
}

/// Output consumed by an external look-at rig.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct LookAtRig {
    pub target: Vec3,
    /// Blend weight in [0, 1].
    pub weight: f32,
}
