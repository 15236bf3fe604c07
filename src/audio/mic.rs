use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rodio::cpal::{
    self, FromSample, InputCallbackInfo, Sample, SampleFormat, SizedSample, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};

use super::{LoudnessSampler, WINDOW, loudness, to_byte};
use crate::error::AudioError;

type Window = Arc<Mutex<VecDeque<u8>>>;

enum State {
    Off,
    Live { _stream: Stream, window: Window },
    Failed,
}

/// Live microphone input. Reads 0 until enabled.
pub struct Microphone {
    state: State,
}

impl Default for Microphone {
    fn default() -> Self {
        Self::new()
    }
}

impl Microphone {
    pub fn new() -> Self {
        Self { state: State::Off }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.state, State::Live { .. })
    }

    /// Opens the default input device. Enabling twice is a no-op; a failed
    /// attempt disables the microphone for the rest of the session.
    pub fn enable(&mut self) -> Result<(), AudioError> {
        match self.state {
            State::Live { .. } => return Ok(()),
            State::Failed => return Err(AudioError::PreviouslyFailed),
            State::Off => {}
        }
        match open_input() {
            Ok((stream, window)) => {
                self.state = State::Live {
                    _stream: stream,
                    window,
                };
                Ok(())
            }
            Err(err) => {
                log::warn!("Microphone unavailable: {err}");
                self.state = State::Failed;
                Err(err)
            }
        }
    }
}

impl LoudnessSampler for Microphone {
    fn poll(&mut self) -> f64 {
        let State::Live { window, .. } = &self.state else {
            return 0.0;
        };
        let Ok(mut window) = window.lock() else {
            return 0.0;
        };
        loudness(window.make_contiguous())
    }
}

fn open_input() -> Result<(Stream, Window), AudioError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(AudioError::NoInputDevice)?;
    let supported = device.default_input_config()?;
    let format = supported.sample_format();
    let config: StreamConfig = supported.into();
    log::info!(
        "Microphone: {} ({} ch @ {} Hz, {:?})",
        device.name().unwrap_or_else(|_| "unknown device".into()),
        config.channels,
        config.sample_rate.0,
        format
    );

    let window: Window = Arc::new(Mutex::new(VecDeque::with_capacity(WINDOW)));
    let stream = match format {
        SampleFormat::F32 => build::<f32>(&device, &config, window.clone())?,
        SampleFormat::I16 => build::<i16>(&device, &config, window.clone())?,
        SampleFormat::U16 => build::<u16>(&device, &config, window.clone())?,
        other => return Err(AudioError::UnsupportedFormat(other)),
    };
    stream.play()?;
    Ok((stream, window))
}

fn build<T>(device: &cpal::Device, config: &StreamConfig, window: Window) -> Result<Stream, AudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels.max(1));
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &InputCallbackInfo| push_frames(&window, data, channels),
        |err| log::warn!("Microphone stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

/// Downmixes interleaved frames to mono bytes and keeps the newest `WINDOW`.
fn push_frames<T>(window: &Window, data: &[T], channels: usize)
where
    T: Sample,
    f32: FromSample<T>,
{
    let Ok(mut window) = window.lock() else {
        return;
    };
    for frame in data.chunks(channels) {
        let sum: f32 = frame.iter().map(|&s| f32::from_sample_(s)).sum();
        window.push_back(to_byte(sum / frame.len() as f32));
        if window.len() > WINDOW {
            window.pop_front();
        }
    }
}
