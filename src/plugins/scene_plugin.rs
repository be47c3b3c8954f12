use bevy::prelude::*;

use super::game_plugin::FrameSet;
use crate::config::tuning::Tuning;
use crate::game::{
    animator::{AnimatorParams, AttackClip},
    components::*,
    intent::MoveIntent,
    mover::PlaneMover,
};

/// Radius of the walkable disc in the demo scene.
const ARENA_RADIUS: f32 = 18.0;
const HEAD_HEIGHT: f32 = 1.7;
const ATTACK_CLIP_SECS: f32 = 0.6;

/// Placeholder scene, keyboard/mouse input and the follow camera.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene);
        app.add_systems(Update, read_player_input.in_set(FrameSet::Input));
        app.add_systems(Update, update_player_camera.in_set(FrameSet::Camera));
    }
}

// ── Startup ─────────────────────────────────────────────────────────

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Ground
    commands.spawn((
        Mesh3d(meshes.add(Circle::new(ARENA_RADIUS))),
        MeshMaterial3d(materials.add(Color::srgb(0.15, 0.15, 0.2))),
        Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let camera = commands
        .spawn((
            Camera3d::default(),
            PlayerCamera::default(),
            Transform::from_xyz(0.0, 3.0, -7.0).looking_at(Vec3::Y, Vec3::Y),
        ))
        .id();

    // Character root sits at the feet; the body mesh is offset upward.
    let player = commands
        .spawn((
            LocomotionController,
            MotionState::default(),
            MoveIntent::default(),
            PlaneMover::new(0.0).with_bounds(ARENA_RADIUS),
            AnimatorParams::default(),
            AttackClip::new(ATTACK_CLIP_SECS),
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    commands.spawn((
        Mesh3d(meshes.add(Capsule3d::new(0.35, 1.1))),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.6, 1.0))),
        Transform::from_xyz(0.0, 0.9, 0.0),
        ChildOf(player),
    ));

    // Nose marker so facing is visible.
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(0.15, 0.15, 0.3))),
        MeshMaterial3d(materials.add(Color::srgb(1.0, 0.85, 0.0))),
        Transform::from_xyz(0.0, 1.4, 0.4),
        ChildOf(player),
    ));

    let head = commands
        .spawn((
            HeadBone,
            Mesh3d(meshes.add(Sphere::new(0.2))),
            MeshMaterial3d(materials.add(Color::srgb(0.9, 0.9, 1.0))),
            Transform::from_xyz(0.0, HEAD_HEIGHT, 0.0),
            ChildOf(player),
        ))
        .id();

    let proxy = commands
        .spawn((
            LookTargetProxy,
            Mesh3d(meshes.add(Sphere::new(0.1))),
            MeshMaterial3d(materials.add(Color::srgb(0.2, 1.0, 0.2))),
            Transform::from_xyz(0.0, HEAD_HEIGHT, 5.0),
        ))
        .id();

    commands.spawn((
        HeadOrbitController {
            character: player,
            head: Some(head),
            camera,
            proxy,
        },
        OrbitState::default(),
        LookAtRig::default(),
    ));

    info!("Scene ready: WASD move, Shift sprint, Space jump, LMB/F attack, Q/E orbit, F5 reload");
}

// ── Input ───────────────────────────────────────────────────────────

/// WASD axis and sprint are level-triggered; jump and attack latch until consumed.
fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut query: Query<&mut MoveIntent, With<LocomotionController>>,
) {
    let mut axis = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    let sprint = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let jump = keyboard.just_pressed(KeyCode::Space);
    let attack = mouse.just_pressed(MouseButton::Left) || keyboard.just_pressed(KeyCode::KeyF);

    for mut intent in &mut query {
        intent.axis = axis;
        intent.sprint_held = sprint;
        intent.jump_requested |= jump;
        intent.attack_requested |= attack;
    }
}

// ── Camera ──────────────────────────────────────────────────────────

/// Orbit with Q/E (or Left/Right) and keep framing the character.
fn update_player_camera(
    time: Res<Time>,
    tuning: Res<Tuning>,
    keyboard: Res<ButtonInput<KeyCode>>,
    player: Query<&Transform, (With<LocomotionController>, Without<PlayerCamera>)>,
    mut cameras: Query<(&mut Transform, &mut PlayerCamera)>,
) {
    let Some(player_tf) = player.iter().next() else {
        return;
    };
    let cfg = &tuning.camera;
    let step = cfg.orbit_speed * time.delta_secs();

    for (mut transform, mut camera) in &mut cameras {
        if keyboard.any_pressed([KeyCode::KeyQ, KeyCode::ArrowLeft]) {
            camera.orbit_yaw += step;
        }
        if keyboard.any_pressed([KeyCode::KeyE, KeyCode::ArrowRight]) {
            camera.orbit_yaw -= step;
        }
        let offset = Vec3::new(camera.orbit_yaw.sin(), 0.0, camera.orbit_yaw.cos()) * cfg.distance
            + Vec3::Y * cfg.height;
        let focus = player_tf.translation + Vec3::Y * HEAD_HEIGHT;
        *transform =
            Transform::from_translation(player_tf.translation + offset).looking_at(focus, Vec3::Y);
    }
}
