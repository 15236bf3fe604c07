//! Endless-runner dinosaur game for the terminal.
//!
//! The simulation (`game`, `avatar`, `obstacle`, `jump`, `collision`) has no
//! terminal, clock or audio dependency: the binary feeds it commands, frame
//! time and loudness, and draws what it reports.

pub mod audio;
pub mod avatar;
pub mod collision;
pub mod config;
pub mod error;
pub mod game;
pub mod jump;
pub mod obstacle;
pub mod render;
pub mod time;

pub use audio::{LoudnessSampler, Microphone, Silence};
pub use collision::Fatal;
pub use config::{Config, Params};
pub use error::{AudioError, ConfigError};
pub use game::{Command, Game, GameEvent, Phase, RunState};
pub use jump::JumpSource;
