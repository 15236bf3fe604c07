use std::fs::File;
use std::io::{self, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, terminal,
};

use dino_tui::audio::{Effect, Sfx};
use dino_tui::render::{self, Hud, PixelBuf};
use dino_tui::{Command, Config, Game, GameEvent, Microphone};

#[derive(Parser, Debug)]
#[command(name = "dino-tui")]
#[command(about = "Endless-runner dinosaur that jumps when you press B or shout", long_about = None)]
struct Args {
    /// TOML file overriding the default tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for obstacle placement
    #[arg(long)]
    seed: Option<u64>,

    /// Allow starting without a microphone
    #[arg(long, default_value_t = false)]
    keyboard: bool,

    /// Flat ground, logs only
    #[arg(long, default_value_t = false)]
    no_gaps: bool,

    /// No sound effects
    #[arg(long, default_value_t = false)]
    mute: bool,

    /// Redraw rate. The simulation always runs at the configured tick rate.
    #[arg(long, default_value_t = 30)]
    fps: u64,

    /// Write logs here (RUST_LOG sets the filter)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.keyboard {
            config.require_microphone = false;
        }
        if self.no_gaps {
            config.gaps = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    // Logging to the terminal would tear up the display.
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Terminal-side state the simulation does not know about.
struct Host {
    mic: Microphone,
    sfx: Option<Sfx>,
    mic_status: &'static str,
}

impl Host {
    fn new(mute: bool) -> Self {
        let sfx = if mute {
            None
        } else {
            match Sfx::open() {
                Ok(sfx) => Some(sfx),
                Err(err) => {
                    log::warn!("Sound effects disabled: {err}");
                    None
                }
            }
        };
        Self {
            mic: Microphone::new(),
            sfx,
            mic_status: "Mic: off",
        }
    }

    fn enable_mic(&mut self, game: &mut Game) {
        match self.mic.enable() {
            Ok(()) => {
                self.mic_status = "Mic: on";
                game.apply(Command::EnableAudio);
            }
            Err(err) => {
                log::warn!("Could not enable microphone: {err}");
                self.mic_status = "Mic: unavailable";
            }
        }
    }

    fn react(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::AudioEnabled => log::info!("Microphone enabled"),
                GameEvent::Jumped { .. } => self.play(Effect::Jump),
                GameEvent::GameOver { cause, jumps } => {
                    log::info!("{} ({jumps} jumps)", cause.message());
                    self.play(Effect::GameOver);
                }
                GameEvent::Started | GameEvent::StartRejected | GameEvent::SpedUp { .. } => {}
            }
        }
    }

    fn play(&self, effect: Effect) {
        if let Some(sfx) = &self.sfx {
            sfx.play(effect);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;
    let config = args.load_config()?;
    log::info!("Starting dino-tui (gaps: {}, microphone required: {})", config.gaps, config.require_microphone);

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let res = run(&mut out, config, &args);

    execute!(
        out,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()?;
    res
}

fn run(out: &mut io::Stdout, config: Config, args: &Args) -> Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);
    let mut game = Game::new(config)?;
    let mut host = Host::new(args.mute);

    let frame_dur = Duration::from_millis(1000 / args.fps.clamp(1, 240));
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();

        // Input
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('b') | KeyCode::Char('B') => game.apply(Command::Jump),
                    KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Enter => {
                        game.apply(Command::Start)
                    }
                    KeyCode::Char('m') | KeyCode::Char('M') => host.enable_mic(&mut game),
                    _ => {}
                },
                Event::Resize(c, r) => {
                    cols = c;
                    rows = r;
                    buf.resize(c as usize, r as usize * 2);
                }
                _ => {}
            }
        }

        // Update
        let now = Instant::now();
        game.tick(now - last, &mut host.mic);
        last = now;
        host.react(game.drain_events());

        // Render
        render::draw(&game, &mut buf);
        buf.render(out)?;
        let hud = Hud {
            mic_status: host.mic_status,
        };
        render::draw_text(&game, &hud, cols, rows, out)?;
        out.flush()?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
