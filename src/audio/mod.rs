//! Microphone loudness and sound effects.
//!
//! Loudness is the mean absolute deviation of an unsigned-byte waveform from
//! its midpoint, 128. A silent input reads 0 and a full-scale square wave
//! reads about 128.

mod mic;
mod sfx;

pub use mic::Microphone;
pub use sfx::{Effect, Sfx};

/// Samples held for one loudness reading (half of a 256-point transform).
pub const WINDOW: usize = 128;

const MIDPOINT: f64 = 128.0;

/// Anything that can report the current input loudness.
pub trait LoudnessSampler {
    fn poll(&mut self) -> f64;
}

/// Always silent. Used while no input is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl LoudnessSampler for Silence {
    fn poll(&mut self) -> f64 {
        0.0
    }
}

/// Maps a float sample in `[-1, 1]` to an unsigned byte centered on 128.
pub fn to_byte(sample: f32) -> u8 {
    (MIDPOINT as f32 * (1.0 + sample)).clamp(0.0, 255.0) as u8
}

pub fn loudness(window: &[u8]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: f64 = window.iter().map(|&b| (f64::from(b) - MIDPOINT).abs()).sum();
    sum / window.len() as f64
}
