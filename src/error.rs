use std::io;
use std::path::PathBuf;

use rodio::cpal;
use thiserror::Error;

/// Errors raised while loading or validating a [`crate::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from the microphone and the sound-effect output.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no microphone input device available")]
    NoInputDevice,
    #[error("microphone was unavailable earlier in this session")]
    PreviouslyFailed,
    #[error("could not query microphone config: {0}")]
    InputConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported microphone sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("could not open microphone stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("could not start microphone stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("no audio output: {0}")]
    Output(#[from] rodio::StreamError),
    #[error("could not play sound: {0}")]
    Play(#[from] rodio::PlayError),
}
