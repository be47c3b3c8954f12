use bevy::prelude::*;

use super::game_plugin::FrameSet;
use crate::config::tuning::Tuning;
use crate::game::{
    components::*,
    head_orbit,
    math::facing_forward,
};

pub struct HeadOrbitPlugin;

impl Plugin for HeadOrbitPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostStartup, validate_head_orbits);
        // After the character's rotation has been written for this frame.
        app.add_systems(Update, drive_head_orbit.in_set(FrameSet::HeadOrbit));
    }
}

/// Report orbit controllers whose referenced entities are missing. They are skipped every frame.
fn validate_head_orbits(
    controllers: Query<(Entity, &HeadOrbitController)>,
    transforms: Query<&Transform, Without<LookTargetProxy>>,
    proxies: Query<(), With<LookTargetProxy>>,
) {
    for (entity, controller) in &controllers {
        if transforms.get(controller.character).is_err() {
            error!("{entity:?}: head orbit character {:?} has no transform", controller.character);
        }
        if transforms.get(controller.camera).is_err() {
            error!("{entity:?}: head orbit camera {:?} has no transform", controller.camera);
        }
        if proxies.get(controller.proxy).is_err() {
            let proxy = controller.proxy;
            error!("{entity:?}: head orbit proxy {proxy:?} is not a LookTargetProxy");
        }
        if let Some(head) = controller.head {
            if transforms.get(head).is_err() {
                warn!("{entity:?}: head {head:?} has no transform, orbiting around the root");
            }
        }
    }
}

/// World position of `entity`, composing local transforms up its `ChildOf` chain.
fn world_position(
    entity: Entity,
    transforms: &Query<(&Transform, Option<&ChildOf>), Without<LookTargetProxy>>,
) -> Option<Vec3> {
    let (transform, mut link) = transforms.get(entity).ok()?;
    let mut point = transform.translation;
    while let Some(child_of) = link {
        let Ok((parent, next)) = transforms.get(child_of.parent()) else {
            break;
        };
        point = parent.transform_point(point);
        link = next;
    }
    Some(point)
}

/// Move each look-target proxy along its orbit circle and update the rig weight.
fn drive_head_orbit(
    time: Res<Time>,
    tuning: Res<Tuning>,
    mut controllers: Query<(&HeadOrbitController, &mut OrbitState, &mut LookAtRig)>,
    transforms: Query<(&Transform, Option<&ChildOf>), Without<LookTargetProxy>>,
    mut proxies: Query<&mut Transform, With<LookTargetProxy>>,
) {
    let dt = time.delta_secs();
    for (controller, mut state, mut rig) in &mut controllers {
        let (Ok((character, _)), Ok((camera, _))) = (
            transforms.get(controller.character),
            transforms.get(controller.camera),
        ) else {
            continue;
        };
        let Ok(mut proxy) = proxies.get_mut(controller.proxy) else {
            continue;
        };

        // Local transforms, so the root rotation written this frame is already included.
        let head_base = controller
            .head
            .and_then(|head| world_position(head, &transforms))
            .unwrap_or(character.translation);

        let Some(out) = head_orbit::step(
            &mut state,
            facing_forward(character.rotation),
            camera.forward().as_vec3(),
            head_base,
            rig.weight,
            &tuning.head_orbit,
            dt,
        ) else {
            continue;
        };

        proxy.translation = out.target;
        rig.target = out.target;
        rig.weight = out.weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::game_plugin::GamePlugin;
    use std::time::Duration;

    struct Rig {
        controller: Entity,
        character: Entity,
        head: Entity,
        camera: Entity,
        proxy: Entity,
    }

    fn setup() -> (App, Rig) {
        let mut app = App::new();
        app.insert_resource(Tuning::default())
            .init_resource::<Time>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_plugins((GamePlugin, HeadOrbitPlugin));

        let world = app.world_mut();
        let character = world.spawn(Transform::from_xyz(1.0, 0.0, 2.0)).id();
        let head = world
            .spawn((HeadBone, Transform::from_xyz(0.0, 1.7, 0.0), ChildOf(character)))
            .id();
        let camera_transform = Transform::default().looking_to(Vec3::X, Vec3::Y);
        let camera = world.spawn((PlayerCamera::default(), camera_transform)).id();
        let proxy = world.spawn((LookTargetProxy, Transform::default())).id();
        let controller = world
            .spawn((
                HeadOrbitController {
                    character,
                    head: Some(head),
                    camera,
                    proxy,
                },
                OrbitState::default(),
                LookAtRig::default(),
            ))
            .id();
        (
            app,
            Rig {
                controller,
                character,
                head,
                camera,
                proxy,
            },
        )
    }

    fn run(app: &mut App, frames: usize) {
        for _ in 0..frames {
            app.world_mut()
                .resource_mut::<Time>()
                .advance_by(Duration::from_millis(16));
            app.update();
        }
    }

    #[test]
    fn proxy_settles_on_circle_toward_camera() {
        let (mut app, rig) = setup();
        run(&mut app, 200);

        let world = app.world();
        let proxy = world.get::<Transform>(rig.proxy).unwrap().translation;
        let head_base = Vec3::new(1.0, 1.7, 2.0);
        assert_eq!(proxy.y, head_base.y);
        let offset = Vec2::new(proxy.x - head_base.x, proxy.z - head_base.z);
        assert!((offset.length() - 5.0).abs() < 1e-3);
        assert!(offset.normalize().distance(Vec2::X) < 1e-2);

        let look = world.get::<LookAtRig>(rig.controller).unwrap();
        assert_eq!(look.target, proxy);
        assert!((look.weight - 1.0).abs() < 1e-3);
    }

    #[test]
    fn camera_behind_fades_the_rig_out() {
        let (mut app, rig) = setup();
        app.world_mut().get_mut::<LookAtRig>(rig.controller).unwrap().weight = 1.0;
        *app.world_mut().get_mut::<Transform>(rig.camera).unwrap() =
            Transform::default().looking_to(Vec3::NEG_Z, Vec3::Y);
        run(&mut app, 120);

        let state = *app.world().get::<OrbitState>(rig.controller).unwrap();
        assert!((state.current_angle_deg.abs() - 165.0).abs() < 0.1);
        assert!(app.world().get::<LookAtRig>(rig.controller).unwrap().weight < 0.01);
    }

    #[test]
    fn missing_proxy_skips_the_controller() {
        let (mut app, rig) = setup();
        app.world_mut().despawn(rig.proxy);
        run(&mut app, 10);
        assert_eq!(
            *app.world().get::<OrbitState>(rig.controller).unwrap(),
            OrbitState::default()
        );
        assert!(app.world().get::<Transform>(rig.character).is_some());
    }

    #[test]
    fn head_base_follows_a_nested_bone_chain() {
        let (mut app, rig) = setup();
        {
            let world = app.world_mut();
            world
                .get_mut::<Transform>(rig.character)
                .unwrap()
                .rotate_y(std::f32::consts::FRAC_PI_2);
            let neck = world
                .spawn((Transform::from_xyz(0.0, 1.5, 0.0), ChildOf(rig.character)))
                .id();
            world
                .entity_mut(rig.head)
                .insert((Transform::from_xyz(0.0, 0.2, 0.5), ChildOf(neck)));
        }
        run(&mut app, 200);

        // Root at (1, 0, 2) turned +90° about Y maps the local (0, 1.7, 0.5) to (1.5, 1.7, 2).
        let head_base = Vec3::new(1.5, 1.7, 2.0);
        let proxy = app.world().get::<Transform>(rig.proxy).unwrap().translation;
        assert!((proxy.y - head_base.y).abs() < 1e-4);
        let offset = Vec2::new(proxy.x - head_base.x, proxy.z - head_base.z);
        assert!((offset.length() - 5.0).abs() < 1e-3, "offset = {offset:?}");
    }
}
