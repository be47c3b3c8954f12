pub mod game_plugin;
pub mod head_orbit_plugin;
pub mod scene_plugin;
