use crate::config::Config;

/// What made the avatar jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpSource {
    Key,
    Voice,
}

/// Upward impulse for a shout of the given loudness.
pub fn voice_impulse(loudness: f64, config: &Config) -> f64 {
    (loudness * config.loudness_gain).clamp(config.min_jump, config.max_jump)
}

/// One-shot gate so a sustained shout only jumps once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceLatch {
    armed: bool,
}

impl Default for VoiceLatch {
    fn default() -> Self {
        Self { armed: true }
    }
}

impl VoiceLatch {
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns true when this sample should trigger a jump. Re-arms only once
    /// loudness drops strictly below the threshold.
    pub fn update(&mut self, loudness: f64, threshold: f64, on_ground: bool) -> bool {
        let fire = loudness > threshold && on_ground && self.armed;
        if fire {
            self.armed = false;
        }
        if loudness < threshold {
            self.armed = true;
        }
        fire
    }
}

/// Forward speed and the jump counter that ratchets it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pace {
    pub speed: f64,
    pub jumps: u32,
}

impl Pace {
    pub fn new(config: &Config) -> Self {
        Self {
            speed: config.start_speed,
            jumps: 0,
        }
    }

    /// Counts a jump; returns the new speed if this jump sped things up.
    pub fn record_jump(&mut self, config: &Config) -> Option<f64> {
        self.jumps += 1;
        if self.jumps % config.jumps_per_speedup == 0 && self.speed < config.max_speed {
            self.speed = (self.speed + config.speed_increment).min(config.max_speed);
            return Some(self.speed);
        }
        None
    }
}
