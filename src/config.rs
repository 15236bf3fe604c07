use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default tuning. Distances are playfield units, velocities are units per frame.
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Playfield
    pub const WIDTH: f64 = 800.0;
    pub const HEIGHT: f64 = 300.0;
    pub const GROUND_Y: f64 = 260.0;
    pub const GROUND_HEIGHT: f64 = 40.0;

    // Avatar
    pub const AVATAR_X: f64 = 80.0;
    pub const AVATAR_SIZE: f64 = 60.0;
    pub const GRAVITY: f64 = 0.9;

    // Jumping
    pub const KEY_JUMP_IMPULSE: f64 = 16.0;
    pub const SOUND_THRESHOLD: f64 = 5.0;
    pub const LOUDNESS_GAIN: f64 = 1.2;
    pub const MIN_JUMP: f64 = 8.0;
    pub const MAX_JUMP: f64 = 22.0;

    // Pace
    pub const START_SPEED: f64 = 6.0;
    pub const MAX_SPEED: f64 = 16.0;
    pub const SPEED_INCREMENT: f64 = 1.0;
    pub const JUMPS_PER_SPEEDUP: u32 = 3;

    // Logs
    pub const LOG_INTERVAL: u32 = 120;
    pub const LOG_WIDTH_MIN: f64 = 25.0;
    pub const LOG_WIDTH_MAX: f64 = 40.0;
    pub const LOG_HEIGHT: f64 = 40.0;

    // Ground
    pub const GAP_CHANCE: f64 = 0.25;
    pub const GAP_WIDTH_MIN: f64 = 80.0;
    pub const GAP_WIDTH_MAX: f64 = 160.0;
    pub const SOLID_WIDTH_MIN: f64 = 120.0;
    pub const SOLID_WIDTH_MAX: f64 = 200.0;
    pub const SUPPORT_BAND: f64 = 20.0;

    // Simulation
    pub const TICK_RATE: u32 = 60; // frames per second
}

/// Game configuration, loadable from TOML. Missing keys fall back to [`Params`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub width: f64,
    pub height: f64,
    pub ground_y: f64,
    pub ground_height: f64,
    pub avatar_x: f64,
    pub avatar_size: f64,
    pub gravity: f64,
    pub key_jump_impulse: f64,
    pub sound_threshold: f64,
    pub loudness_gain: f64,
    pub min_jump: f64,
    pub max_jump: f64,
    pub start_speed: f64,
    pub max_speed: f64,
    pub speed_increment: f64,
    pub jumps_per_speedup: u32,
    pub log_interval: u32,
    pub log_width_min: f64,
    pub log_width_max: f64,
    pub log_height: f64,
    /// Ground is made of solid segments and gaps instead of a flat floor.
    pub gaps: bool,
    pub gap_chance: f64,
    pub gap_width_min: f64,
    pub gap_width_max: f64,
    pub solid_width_min: f64,
    pub solid_width_max: f64,
    pub support_band: f64,
    /// A run can only start once the microphone is live.
    pub require_microphone: bool,
    pub tick_rate: u32,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: Params::WIDTH,
            height: Params::HEIGHT,
            ground_y: Params::GROUND_Y,
            ground_height: Params::GROUND_HEIGHT,
            avatar_x: Params::AVATAR_X,
            avatar_size: Params::AVATAR_SIZE,
            gravity: Params::GRAVITY,
            key_jump_impulse: Params::KEY_JUMP_IMPULSE,
            sound_threshold: Params::SOUND_THRESHOLD,
            loudness_gain: Params::LOUDNESS_GAIN,
            min_jump: Params::MIN_JUMP,
            max_jump: Params::MAX_JUMP,
            start_speed: Params::START_SPEED,
            max_speed: Params::MAX_SPEED,
            speed_increment: Params::SPEED_INCREMENT,
            jumps_per_speedup: Params::JUMPS_PER_SPEEDUP,
            log_interval: Params::LOG_INTERVAL,
            log_width_min: Params::LOG_WIDTH_MIN,
            log_width_max: Params::LOG_WIDTH_MAX,
            log_height: Params::LOG_HEIGHT,
            gaps: true,
            gap_chance: Params::GAP_CHANCE,
            gap_width_min: Params::GAP_WIDTH_MIN,
            gap_width_max: Params::GAP_WIDTH_MAX,
            solid_width_min: Params::SOLID_WIDTH_MIN,
            solid_width_max: Params::SOLID_WIDTH_MAX,
            support_band: Params::SUPPORT_BAND,
            require_microphone: true,
            tick_rate: Params::TICK_RATE,
            seed: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("ground_height", self.ground_height),
            ("avatar_size", self.avatar_size),
            ("gravity", self.gravity),
            ("key_jump_impulse", self.key_jump_impulse),
            ("min_jump", self.min_jump),
            ("start_speed", self.start_speed),
            ("log_width_min", self.log_width_min),
            ("log_height", self.log_height),
            ("gap_width_min", self.gap_width_min),
            ("solid_width_min", self.solid_width_min),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }

        let ranges = [
            ("jump", self.min_jump, self.max_jump),
            ("speed", self.start_speed, self.max_speed),
            ("log_width", self.log_width_min, self.log_width_max),
            ("gap_width", self.gap_width_min, self.gap_width_max),
            ("solid_width", self.solid_width_min, self.solid_width_max),
        ];
        for (name, min, max) in ranges {
            if min > max {
                return Err(invalid(format!("{name} range is inverted: {min} > {max}")));
            }
        }

        if !(0.0..=1.0).contains(&self.gap_chance) {
            return Err(invalid(format!(
                "gap_chance must be within [0, 1], got {}",
                self.gap_chance
            )));
        }
        if self.ground_y <= 0.0 || self.ground_y >= self.height {
            return Err(invalid(format!(
                "ground_y must lie inside the playfield (0, {}), got {}",
                self.height, self.ground_y
            )));
        }
        if self.speed_increment < 0.0 || self.support_band < 0.0 {
            return Err(invalid("speed_increment and support_band must not be negative"));
        }
        if self.jumps_per_speedup == 0 || self.tick_rate == 0 {
            return Err(invalid("jumps_per_speedup and tick_rate must be at least 1"));
        }
        Ok(())
    }

    /// Ground segments only ever come out solid when gaps are off.
    pub fn effective_gap_chance(&self) -> f64 {
        if self.gaps { self.gap_chance } else { 0.0 }
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}
