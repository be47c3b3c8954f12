use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::{
    animator::{params, AnimatorParams, AnimationSink, AttackClip},
    components::*,
    events::AttackEnd,
    intent::MoveIntent,
    locomotion::{self, CameraView, FrameClock, StepInput},
    mover::PlaneMover,
};

// ── SystemSets (strict per-frame ordering) ──────────────────────────

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Input,
    Camera,
    Locomotion,
    Animation,
    HeadOrbit,
}

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<AttackEnd>();

        app.configure_sets(
            Update,
            (
                FrameSet::Input,
                FrameSet::Camera,
                FrameSet::Locomotion,
                FrameSet::Animation,
                FrameSet::HeadOrbit,
            )
                .chain(),
        );

        app.add_systems(PostStartup, validate_locomotion_entities);

        app.add_systems(Update, drive_locomotion.in_set(FrameSet::Locomotion));
        app.add_systems(Update, drive_attack_clips.in_set(FrameSet::Animation));

        // ── Always-on ───────────────────────────────────────────────────
        app.add_systems(Update, tuning_reload_input);
    }
}

// ── Startup ─────────────────────────────────────────────────────────

/// Report characters that are missing a collaborator. They are skipped every frame.
fn validate_locomotion_entities(
    query: Query<
        (Entity, Has<PlaneMover>, Has<AnimatorParams>, Has<MotionState>, Has<MoveIntent>),
        With<LocomotionController>,
    >,
) {
    for (entity, has_mover, has_animator, has_state, has_intent) in &query {
        if !has_mover {
            error!("{entity:?}: LocomotionController has no mover component");
        }
        if !has_animator {
            error!("{entity:?}: LocomotionController has no animator component");
        }
        if !has_state || !has_intent {
            error!("{entity:?}: LocomotionController needs MotionState and MoveIntent");
        }
    }
}

// ── Per-frame systems ───────────────────────────────────────────────

/// Locomotion set: apply attack completions, then step every character once.
fn drive_locomotion(
    time: Res<Time>,
    tuning: Res<Tuning>,
    mut attack_ends: MessageReader<AttackEnd>,
    cameras: Query<&Transform, (With<PlayerCamera>, Without<LocomotionController>)>,
    mut characters: Query<
        (
            &mut Transform,
            &mut MotionState,
            &mut MoveIntent,
            &mut PlaneMover,
            &mut AnimatorParams,
        ),
        With<LocomotionController>,
    >,
) {
    for end in attack_ends.read() {
        if let Ok((_, mut state, ..)) = characters.get_mut(end.entity) {
            locomotion::end_attack(&mut state);
            debug!("{:?}: attack end", end.entity);
        }
    }

    let view = cameras.iter().next().map(CameraView::from_transform);
    if view.is_none() {
        warn_once!("No player camera; movement input is ignored");
    }

    let clock = FrameClock {
        now: time.elapsed_secs(),
        dt: time.delta_secs(),
    };
    let tuning = &tuning.locomotion;

    for (mut transform, mut state, mut intent, mut mover, mut anim) in &mut characters {
        let input = StepInput {
            intent: &*intent,
            view,
            facing: transform.rotation,
            prev_speed: anim.float(params::SPEED),
            clock,
        };
        let mut position = transform.translation;
        let frame = locomotion::step(&mut state, input, &mut *mover, &mut position, tuning);

        let blocked = position - transform.translation - frame.displacement;
        if blocked.length_squared() > 1e-8 {
            trace!("mover clipped the step by {blocked:?}");
        }
        transform.translation = position;
        transform.rotation = frame.facing;
        frame.anim.publish(&mut *anim, clock.dt);
        intent.consume_one_shots();
    }
}

/// Animation set: play attack clips off the `Attack` trigger and report when they end.
fn drive_attack_clips(
    time: Res<Time>,
    mut query: Query<(Entity, &mut AnimatorParams, &mut AttackClip)>,
    mut attack_ends: MessageWriter<AttackEnd>,
) {
    let dt = time.delta_secs();
    for (entity, mut anim, mut clip) in &mut query {
        anim.take_trigger(params::JUMP);
        if anim.take_trigger(params::ATTACK) && !clip.is_playing() {
            clip.start();
        }
        if clip.tick(dt) {
            attack_ends.write(AttackEnd { entity });
        }
    }
}

// ── Always-on ───────────────────────────────────────────────────────

/// Reload tuning with F5.
fn tuning_reload_input(keyboard: Res<ButtonInput<KeyCode>>, mut tuning: ResMut<Tuning>) {
    if keyboard.just_pressed(KeyCode::F5) {
        tuning.reload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::math::yaw_of;
    use std::time::Duration;

    fn test_app() -> App {
        let mut app = App::new();
        app.insert_resource(Tuning::default())
            .init_resource::<Time>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_plugins(GamePlugin);
        app
    }

    fn tick(app: &mut App) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(20));
        app.update();
    }

    fn spawn_player(app: &mut App, axis: Vec2) -> Entity {
        app.world_mut()
            .spawn((
                LocomotionController,
                MotionState::default(),
                MoveIntent { axis, ..default() },
                PlaneMover::default(),
                AnimatorParams::default(),
                AttackClip::new(0.1),
                Transform::default(),
            ))
            .id()
    }

    fn spawn_camera(app: &mut App) {
        app.world_mut().spawn((
            PlayerCamera::default(),
            Transform::from_xyz(0.0, 2.0, -6.0).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
        ));
    }

    #[test]
    fn walking_forward_moves_along_camera_forward() {
        let mut app = test_app();
        spawn_camera(&mut app);
        let player = spawn_player(&mut app, Vec2::Y);

        for _ in 0..60 {
            tick(&mut app);
        }

        let world = app.world();
        let transform = world.get::<Transform>(player).unwrap();
        assert!(transform.translation.z > 1.0, "z = {}", transform.translation.z);
        assert!(transform.translation.x.abs() < 1e-3);
        assert_eq!(transform.translation.y, 0.0);

        let anim = world.get::<AnimatorParams>(player).unwrap();
        assert!(anim.float(params::SPEED) > 4.0);
        assert!(anim.bool(params::IS_GROUNDED));
    }

    #[test]
    fn attack_locks_facing_until_the_clip_ends() {
        let mut app = test_app();
        spawn_camera(&mut app);
        let player = spawn_player(&mut app, Vec2::ZERO);
        tick(&mut app);

        {
            let mut intent = app.world_mut().get_mut::<MoveIntent>(player).unwrap();
            intent.attack_requested = true;
        }
        tick(&mut app);

        let state = app.world().get::<MotionState>(player).unwrap().clone();
        assert!(state.is_attacking);
        assert!(state.locked_yaw.abs() < 1e-3);
        assert!(!app.world().get::<MoveIntent>(player).unwrap().attack_requested);
        let anim = app.world().get::<AnimatorParams>(player).unwrap();
        assert_eq!(anim.integer(params::ATTACK_COUNT), 0);

        app.world_mut().get_mut::<MoveIntent>(player).unwrap().axis = Vec2::X;
        tick(&mut app);
        let rotation = app.world().get::<Transform>(player).unwrap().rotation;
        assert!(yaw_of(rotation).abs() < 1e-3);

        for _ in 0..10 {
            tick(&mut app);
        }
        assert!(!app.world().get::<MotionState>(player).unwrap().is_attacking);
    }

    #[test]
    fn character_without_mover_is_skipped() {
        let mut app = test_app();
        spawn_camera(&mut app);
        let player = app
            .world_mut()
            .spawn((
                LocomotionController,
                MotionState::default(),
                MoveIntent {
                    axis: Vec2::Y,
                    ..default()
                },
                AnimatorParams::default(),
                Transform::default(),
            ))
            .id();

        for _ in 0..5 {
            tick(&mut app);
        }
        assert_eq!(app.world().get::<Transform>(player).unwrap().translation, Vec3::ZERO);
    }
}
