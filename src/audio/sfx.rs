use fundsp::prelude::*;
use rodio::{OutputStream, OutputStreamHandle, Sink, buffer::SamplesBuffer};

use crate::error::AudioError;

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Jump,
    GameOver,
}

/// Pre-rendered sound effects played on the default output device.
pub struct Sfx {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    jump: Vec<f32>,
    game_over: Vec<f32>,
}

impl Sfx {
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            jump: jump_blip(),
            game_over: death_sweep(),
        })
    }

    pub fn play(&self, effect: Effect) {
        let samples = match effect {
            Effect::Jump => &self.jump,
            Effect::GameOver => &self.game_over,
        };
        match Sink::try_new(&self.handle) {
            Ok(sink) => {
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.clone()));
                sink.detach(); // Play in background
            }
            Err(err) => log::warn!("Could not play {effect:?}: {}", AudioError::from(err)),
        }
    }
}

/// Short rising chirp: 300 Hz to 900 Hz sine, fading out over 0.15 s.
fn jump_blip() -> Vec<f32> {
    let freq = lfo(|t: f64| 300.0 + 600.0 * (t / 0.12).min(1.0));
    let gain = lfo(|t: f64| 0.12 * (1.0 - (t / 0.15).min(1.0)));
    render(Box::new((freq >> sine::<f32>()) * gain), 0.15)
}

/// Falling sawtooth: 400 Hz to 80 Hz over 0.4 s, gain 0.15 to 0 over 0.5 s.
fn death_sweep() -> Vec<f32> {
    let freq = lfo(|t: f64| 400.0 + (80.0 - 400.0) * (t / 0.4).min(1.0));
    let gain = lfo(|t: f64| 0.15 * (1.0 - (t / 0.5).min(1.0)));
    render(Box::new((freq >> saw()) * gain), 0.5)
}

fn render(mut unit: Box<dyn AudioUnit>, seconds: f64) -> Vec<f32> {
    unit.set_sample_rate(f64::from(SAMPLE_RATE));
    let len = (f64::from(SAMPLE_RATE) * seconds).round() as usize;
    (0..len).map(|_| unit.get_mono() as f32).collect()
}
