use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest smoothing time accepted; zero would divide by zero inside `smooth_damp`.
pub const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Ground/air movement, jumping and animation damping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionTuning {
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Slerp rate toward the move direction (per second).
    pub rotation_lerp: f32,

    pub jump_height: f32,
    /// Negative = down.
    pub gravity: f32,
    /// Vertical speed held while grounded so the mover keeps ground contact.
    pub grounded_stick: f32,

    /// Damp time for the `Speed` parameter while speeding up.
    pub accel_damp_time: f32,
    /// Damp time for the `Speed` parameter while slowing down.
    pub decel_damp_time: f32,

    /// Max change of horizontal speed per second on the ground.
    pub accel_rate: f32,
    pub decel_rate: f32,

    pub air_accel_rate: f32,
    /// 0 = keep momentum in the air.
    pub air_drag: f32,
    pub max_air_speed: f32,
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            run_speed: 10.0,
            rotation_lerp: 10.0,
            jump_height: 2.0,
            gravity: -9.8,
            grounded_stick: -2.0,
            accel_damp_time: 0.10,
            decel_damp_time: 0.04,
            accel_rate: 12.0,
            decel_rate: 18.0,
            air_accel_rate: 3.0,
            air_drag: 0.0,
            max_air_speed: 12.0,
        }
    }
}

/// Head-look orbit around the character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadOrbitTuning {
    /// Radius of the look-target circle.
    pub follow_distance: f32,
    /// Fixed height of the look target above the head.
    pub height_offset: f32,
    /// Max deviation (degrees) of the look target from the character's forward, in [0, 180].
    pub back_angle_limit: f32,
    pub angular_smooth_time: f32,
    pub weight_smooth_time: f32,
}

impl Default for HeadOrbitTuning {
    fn default() -> Self {
        Self {
            follow_distance: 5.0,
            height_offset: 0.0,
            back_angle_limit: 165.0,
            angular_smooth_time: 0.25,
            weight_smooth_time: 0.10,
        }
    }
}

/// Player camera placement (demo camera provider).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub distance: f32,
    pub height: f32,
    /// Orbit speed in radians per second.
    pub orbit_speed: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            distance: 7.0,
            height: 3.0,
            orbit_speed: 2.0,
        }
    }
}

/// All tunable parameters, loaded from tuning.ron.
#[derive(Debug, Clone, Default, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub locomotion: LocomotionTuning,
    pub head_orbit: HeadOrbitTuning,
    pub camera: CameraTuning,
}

impl Tuning {
    /// `<data dir>/stride_rig/tuning.ron`, relative to the working directory without a data dir.
    pub fn path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stride_rig")
            .join("tuning.ron")
    }

    /// Startup load. A missing file is created with defaults; a broken one is left alone.
    pub fn load_or_default() -> Self {
        let path = Self::path();
        if !path.exists() {
            let tuning = Self::default();
            tuning.write_to(&path);
            return tuning;
        }
        Self::read_from(&path).unwrap_or_default()
    }

    /// Reload from file (F5). Keeps the current values when the file is unusable.
    pub fn reload(&mut self) {
        match Self::read_from(&Self::path()) {
            Some(tuning) => {
                *self = tuning;
                info!("Tuning reloaded");
            }
            None => warn!("Tuning reload failed, keeping current values"),
        }
    }

    /// Parse a ron document. Missing fields take their defaults, bad values are clamped.
    pub fn parse(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str::<Tuning>(contents).map(Self::sanitized)
    }

    fn read_from(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path)
            .inspect_err(|e| warn!("Failed to read {}: {e}", path.display()))
            .ok()?;
        let tuning = Self::parse(&contents)
            .inspect_err(|e| warn!("Failed to parse {}: {e}", path.display()))
            .ok()?;
        info!("Loaded tuning from {}", path.display());
        Some(tuning)
    }

    fn write_to(&self, path: &Path) {
        let text = match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to serialize tuning: {e}");
                return;
            }
        };
        let written = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(path, text));
        if let Err(e) = written {
            warn!("Failed to write {}: {e}", path.display());
        }
    }

    /// Clamp out-of-range values instead of rejecting the file.
    pub fn sanitized(mut self) -> Self {
        let orbit = &mut self.head_orbit;
        clamp_field("head_orbit.back_angle_limit", &mut orbit.back_angle_limit, 0.0, 180.0);
        clamp_field(
            "head_orbit.angular_smooth_time",
            &mut orbit.angular_smooth_time,
            MIN_SMOOTH_TIME,
            f32::MAX,
        );
        clamp_field(
            "head_orbit.weight_smooth_time",
            &mut orbit.weight_smooth_time,
            MIN_SMOOTH_TIME,
            f32::MAX,
        );

        let loco = &mut self.locomotion;
        for (name, value) in [
            ("locomotion.walk_speed", &mut loco.walk_speed),
            ("locomotion.run_speed", &mut loco.run_speed),
            ("locomotion.rotation_lerp", &mut loco.rotation_lerp),
            ("locomotion.jump_height", &mut loco.jump_height),
            ("locomotion.accel_damp_time", &mut loco.accel_damp_time),
            ("locomotion.decel_damp_time", &mut loco.decel_damp_time),
            ("locomotion.accel_rate", &mut loco.accel_rate),
            ("locomotion.decel_rate", &mut loco.decel_rate),
            ("locomotion.air_accel_rate", &mut loco.air_accel_rate),
            ("locomotion.air_drag", &mut loco.air_drag),
            ("locomotion.max_air_speed", &mut loco.max_air_speed),
        ] {
            clamp_field(name, value, 0.0, f32::MAX);
        }
        // A positive gravity would make the jump velocity NaN.
        clamp_field("locomotion.gravity", &mut loco.gravity, f32::MIN, 0.0);
        self
    }
}

fn clamp_field(name: &str, value: &mut f32, min: f32, max: f32) {
    let clamped = if value.is_finite() { value.clamp(min, max) } else { min.max(0.0).min(max) };
    if clamped != *value {
        warn!("tuning: {name} = {} out of range, using {clamped}", *value);
        *value = clamped;
    }
}
