mod config;
mod game;
mod plugins;

use bevy::prelude::*;

use config::tuning::Tuning;
use plugins::{
    game_plugin::GamePlugin, head_orbit_plugin::HeadOrbitPlugin, scene_plugin::ScenePlugin,
};

fn main() {
    let tuning = Tuning::load_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Stride Rig".into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(tuning)
        .add_plugins(GamePlugin)
        .add_plugins(HeadOrbitPlugin)
        .add_plugins(ScenePlugin)
        .run();
}
