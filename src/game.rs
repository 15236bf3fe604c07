//! Run state and the Idle/Running state machine.
//!
//! Input arrives as [`Command`]s, time as [`Game::tick`], and everything the
//! host may want to react to (sounds, messages) leaves as [`GameEvent`]s.
//! A frame is one call to [`Game::step`]:
//!
//!   1. voice trigger (loudness sampled at the start of the frame)
//!   2. gravity
//!   3. ground scroll and support
//!   4. log spawn, scroll and collision
//!   5. fall check

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::audio::LoudnessSampler;
use crate::avatar::Avatar;
use crate::collision::{self, Fatal};
use crate::config::Config;
use crate::error::ConfigError;
use crate::jump::{self, JumpSource, Pace, VoiceLatch};
use crate::obstacle::{self, Ground, Log, SpawnTimer};
use crate::time::FixedStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    EnableAudio,
    Start,
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    AudioEnabled,
    Started,
    StartRejected,
    Jumped {
        source: JumpSource,
        impulse: f64,
        jumps: u32,
    },
    SpedUp {
        speed: f64,
    },
    GameOver {
        cause: Fatal,
        jumps: u32,
    },
}

/// Everything that is reset between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub avatar: Avatar,
    pub logs: Vec<Log>,
    pub ground: Ground,
    pub log_timer: SpawnTimer,
    pub pace: Pace,
    pub latch: VoiceLatch,
    pub loudness: f64,
}

impl RunState {
    pub fn new(config: &Config) -> Self {
        Self {
            avatar: Avatar::grounded(config),
            logs: Vec::new(),
            ground: Ground::solid(config),
            log_timer: SpawnTimer::new(config.log_interval),
            pace: Pace::new(config),
            latch: VoiceLatch::default(),
            loudness: 0.0,
        }
    }
}

pub struct Game {
    config: Config,
    rng: StdRng,
    clock: FixedStep,
    phase: Phase,
    audio_enabled: bool,
    run: RunState,
    last_outcome: Option<Fatal>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Fails if `config` does not pass [`Config::validate`].
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            clock: FixedStep::new(config.tick_rate),
            run: RunState::new(&config),
            rng,
            phase: Phase::Idle,
            audio_enabled: false,
            last_outcome: None,
            events: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    /// Why the previous run ended, until the next one starts.
    pub fn last_outcome(&self) -> Option<Fatal> {
        self.last_outcome
    }

    pub fn can_start(&self) -> bool {
        self.audio_enabled || !self.config.require_microphone
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::EnableAudio => self.enable_audio(),
            Command::Start => self.start(),
            Command::Jump => self.jump_key_pressed(),
        }
    }

    /// Records that the host attached a live loudness source.
    pub fn enable_audio(&mut self) {
        if self.audio_enabled {
            return;
        }
        self.audio_enabled = true;
        self.events.push(GameEvent::AudioEnabled);
    }

    pub fn start(&mut self) {
        if !self.can_start() {
            log::info!("Start rejected: microphone not enabled");
            self.events.push(GameEvent::StartRejected);
            return;
        }
        self.reset();
        self.phase = Phase::Running;
        self.last_outcome = None;
        log::info!("Run started");
        self.events.push(GameEvent::Started);
    }

    pub fn jump_key_pressed(&mut self) {
        if self.phase == Phase::Running && self.run.avatar.on_ground {
            self.jump(JumpSource::Key, self.config.key_jump_impulse);
        }
    }

    /// Back to the initial run state. Does not change the phase.
    pub fn reset(&mut self) {
        self.run = RunState::new(&self.config);
        self.clock.reset();
    }

    /// Advances by wall-clock `dt`, running one frame per fixed step and
    /// polling `sampler` once per frame. Returns the number of frames run.
    pub fn tick(&mut self, dt: Duration, sampler: &mut impl LoudnessSampler) -> u32 {
        let steps = self.clock.advance(dt);
        for _ in 0..steps {
            let loudness = sampler.poll();
            self.step(loudness);
        }
        steps
    }

    /// One frame. Returns the fatal condition if this frame ended the run.
    pub fn step(&mut self, loudness: f64) -> Option<Fatal> {
        self.run.loudness = loudness;
        if self.phase != Phase::Running {
            return None;
        }
        let config = &self.config;

        if self.audio_enabled
            && self
                .run
                .latch
                .update(loudness, config.sound_threshold, self.run.avatar.on_ground)
        {
            let impulse = jump::voice_impulse(loudness, config);
            self.jump(JumpSource::Voice, impulse);
        }

        let config = &self.config;
        let run = &mut self.run;
        let speed = run.pace.speed;

        run.avatar.integrate(config.gravity);

        run.ground.advance(speed, config, &mut self.rng);
        if config.gaps {
            if collision::supported_by(
                &run.avatar,
                run.ground.segments(),
                config.ground_y,
                config.support_band,
            ) {
                run.avatar.land(config.ground_y);
            }
        } else {
            run.avatar.resolve_flat_ground(config.ground_y);
        }

        if run.log_timer.tick() {
            run.logs.push(obstacle::new_log(config, &mut self.rng));
        }
        obstacle::scroll(&mut run.logs, speed);

        let fatal = if collision::hits_any_log(&run.avatar, &run.logs) {
            Some(Fatal::HitLog)
        } else if collision::fell_out(&run.avatar, config.height) {
            Some(Fatal::FellIntoGap)
        } else {
            None
        };

        if let Some(cause) = fatal {
            self.end_run(cause);
        }
        fatal
    }

    fn jump(&mut self, source: JumpSource, impulse: f64) {
        self.run.avatar.launch(impulse);
        let sped_up = self.run.pace.record_jump(&self.config);
        let jumps = self.run.pace.jumps;
        log::debug!("Jump #{jumps} ({source:?}) impulse {impulse:.1}");
        self.events.push(GameEvent::Jumped {
            source,
            impulse,
            jumps,
        });
        if let Some(speed) = sped_up {
            log::debug!("Speed up to {speed}");
            self.events.push(GameEvent::SpedUp { speed });
        }
    }

    fn end_run(&mut self, cause: Fatal) {
        let jumps = self.run.pace.jumps;
        log::info!("Run over after {jumps} jumps: {cause:?}");
        self.phase = Phase::Idle;
        self.last_outcome = Some(cause);
        self.events.push(GameEvent::GameOver { cause, jumps });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard_config() -> Config {
        Config {
            require_microphone: false,
            seed: Some(11),
            ..Config::default()
        }
    }

    fn running(config: Config) -> Game {
        let mut game = Game::new(config).unwrap();
        game.enable_audio();
        game.start();
        assert_eq!(game.phase(), Phase::Running);
        game.drain_events();
        game
    }

    #[test]
    fn start_requires_microphone_by_default() {
        let mut game = Game::new(Config::default()).unwrap();
        game.start();
        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.drain_events(), vec![GameEvent::StartRejected]);

        game.apply(Command::EnableAudio);
        game.apply(Command::Start);
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::AudioEnabled, GameEvent::Started]
        );
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let result = Game::new(Config {
            jumps_per_speedup: 0,
            ..keyboard_config()
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = Game::new(Config {
            solid_width_min: 0.0,
            ..keyboard_config()
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn standing_over_gaps_falls_out_of_the_playfield() {
        let mut game = running(Config {
            gap_chance: 1.0,
            log_interval: 100_000,
            ..keyboard_config()
        });
        let mut outcome = None;
        for _ in 0..1000 {
            if let Some(fatal) = game.step(0.0) {
                outcome = Some(fatal);
                break;
            }
        }
        assert_eq!(outcome, Some(Fatal::FellIntoGap));
        assert!(game.run().logs.is_empty());
        assert!(game.run().avatar.y > game.config().height);
        assert_eq!(game.last_outcome(), Some(Fatal::FellIntoGap));
    }

    #[test]
    fn keyboard_ruleset_starts_without_microphone() {
        let mut game = Game::new(keyboard_config()).unwrap();
        game.start();
        assert_eq!(game.phase(), Phase::Running);
    }

    #[test]
    fn reset_twice_matches_reset_once() {
        let mut game = running(keyboard_config());
        for _ in 0..300 {
            game.step(0.0);
            game.jump_key_pressed();
        }
        game.reset();
        let once = game.run().clone();
        game.reset();
        assert_eq!(game.run(), &once);
        assert_eq!(once, RunState::new(game.config()));
        assert!(once.logs.is_empty());
        assert_eq!(once.pace.jumps, 0);
        assert!(once.avatar.on_ground);
        assert_eq!(once.avatar.vy, 0.0);
    }

    #[test]
    fn key_jump_is_suppressed_mid_air() {
        let mut game = running(keyboard_config());
        game.jump_key_pressed();
        assert_eq!(game.run().avatar.vy, -16.0);
        game.step(0.0);
        let vy = game.run().avatar.vy;
        assert!(!game.run().avatar.on_ground);

        game.jump_key_pressed();
        assert_eq!(game.run().avatar.vy, vy);
        assert_eq!(game.run().pace.jumps, 1);
    }

    #[test]
    fn key_jump_ignored_while_idle() {
        let mut game = Game::new(keyboard_config()).unwrap();
        game.jump_key_pressed();
        assert_eq!(game.run().pace.jumps, 0);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn short_shout_jumps_exactly_once() {
        let mut game = running(Config {
            seed: Some(2),
            ..Config::default()
        });
        game.step(0.0);
        game.step(6.0);
        for _ in 0..5 {
            game.step(0.0);
        }
        let jumps: Vec<_> = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Jumped { .. }))
            .collect();
        assert_eq!(
            jumps,
            vec![GameEvent::Jumped {
                source: JumpSource::Voice,
                impulse: 8.0,
                jumps: 1
            }]
        );
    }

    #[test]
    fn sustained_shout_does_not_rejump_after_landing() {
        let mut game = running(Config {
            seed: Some(2),
            gaps: false,
            ..Config::default()
        });
        for _ in 0..120 {
            game.step(30.0);
        }
        assert_eq!(game.run().pace.jumps, 1);
        assert!(game.run().avatar.on_ground);
    }

    #[test]
    fn voice_ignored_until_audio_enabled() {
        let mut game = Game::new(keyboard_config()).unwrap();
        game.start();
        game.step(50.0);
        assert_eq!(game.run().pace.jumps, 0);
    }

    #[test]
    fn log_spawns_on_the_frame_after_the_interval() {
        let mut game = running(Config {
            log_interval: 90,
            gaps: false,
            ..keyboard_config()
        });
        for _ in 0..90 {
            game.step(0.0);
        }
        assert!(game.run().logs.is_empty());
        assert_eq!(game.run().log_timer.ticks(), 90);

        game.step(0.0);
        assert_eq!(game.run().logs.len(), 1);
        assert_eq!(game.run().log_timer.ticks(), 0);
        let log = game.run().logs[0];
        assert_eq!(log.x, game.config().width - game.run().pace.speed);
    }

    #[test]
    fn standing_still_eventually_hits_a_log() {
        let mut game = running(Config {
            gaps: false,
            ..keyboard_config()
        });
        let mut outcome = None;
        for _ in 0..1000 {
            if let Some(fatal) = game.step(0.0) {
                outcome = Some(fatal);
                break;
            }
        }
        assert_eq!(outcome, Some(Fatal::HitLog));
        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.last_outcome(), Some(Fatal::HitLog));
        assert!(
            game.drain_events()
                .contains(&GameEvent::GameOver { cause: Fatal::HitLog, jumps: 0 })
        );
    }

    #[test]
    fn restart_clears_previous_outcome() {
        let mut game = running(Config {
            gaps: false,
            ..keyboard_config()
        });
        while game.step(0.0).is_none() {}
        game.start();
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.last_outcome(), None);
        assert!(game.run().logs.is_empty());
    }

    #[test]
    fn speed_never_leaves_its_bounds() {
        let mut game = running(Config {
            gaps: false,
            log_interval: 100_000,
            ..keyboard_config()
        });
        let mut last = game.run().pace.speed;
        for _ in 0..5000 {
            game.jump_key_pressed();
            game.step(0.0);
            let speed = game.run().pace.speed;
            assert!((6.0..=16.0).contains(&speed));
            assert!(speed == last || speed == last + 1.0);
            last = speed;
        }
        assert_eq!(last, 16.0);
    }

    #[test]
    fn tick_runs_fixed_steps_and_polls_once_per_step() {
        struct Counting(u32);
        impl LoudnessSampler for Counting {
            fn poll(&mut self) -> f64 {
                self.0 += 1;
                0.0
            }
        }

        let mut game = running(keyboard_config());
        let mut sampler = Counting(0);
        let step = Duration::from_secs(1) / 60;
        assert_eq!(game.tick(step * 4, &mut sampler), 4);
        assert_eq!(sampler.0, 4);
        assert_eq!(game.run().log_timer.ticks(), 4);
    }
}
