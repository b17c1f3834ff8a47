mod framebuffer;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dithervox_config::{Config, ConfigError};
use dithervox_core::{AnimationSpeed, EngineConfig, RenderMode};
use dithervox_engine::Engine;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Stylize},
    text::Line,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::framebuffer::Framebuffer;

/// Frame interval of roughly 60 Hz.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Rows reserved under the canvas for the help line.
const HELP_HEIGHT: u16 = 1;

/// Dithered voxel animations in the terminal.
#[derive(Debug, Parser)]
#[command(name = "dithervox", version, about)]
struct Args {
    /// What to draw: bird, wave or both.
    #[arg(short, long)]
    mode: Option<RenderMode>,

    /// Animation speed: slow, medium or fast.
    #[arg(short, long)]
    speed: Option<AnimationSpeed>,

    /// Fixed seed for the particle trail.
    #[arg(long)]
    seed: Option<u64>,

    /// Config file to read instead of the default location.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write debug logs to this file.
    #[arg(long)]
    log: Option<PathBuf>,
}

impl Args {
    /// Load the config file and apply the command-line overrides.
    fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => match Config::load() {
                Err(ConfigError::NoConfigDir) => Config::default(),
                other => other?,
            },
        };
        Ok(self.apply(config.engine))
    }

    fn apply(&self, mut engine: EngineConfig) -> EngineConfig {
        if let Some(mode) = self.mode {
            engine.mode = mode;
        }
        if let Some(speed) = self.speed {
            engine.speed = speed;
        }
        if self.seed.is_some() {
            engine.seed = self.seed;
        }
        engine
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    if let Some(path) = &args.log {
        init_tracing(path)?;
    }
    let config = args.engine_config()?;
    info!(mode = %config.mode, speed = %config.speed, seed = ?config.seed, "starting");

    let terminal = ratatui::init();
    let result = App::new(config).run(terminal);
    ratatui::restore();
    result
}

/// Log to `path`; stdout belongs to the terminal UI.
fn init_tracing(path: &Path) -> color_eyre::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!(e))
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    engine: Engine,
    framebuffer: Framebuffer,
    /// Origin of the timestamps fed to the engine.
    started: Instant,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: EngineConfig) -> Self {
        Self {
            running: false,
            engine: Engine::new(config),
            framebuffer: Framebuffer::new(0, 0),
            started: Instant::now(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let size = terminal.size()?;
        self.resize(canvas_area(Rect::new(0, 0, size.width, size.height)));
        self.engine.start(self.framebuffer.surface_size());

        self.running = true;
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }
        self.engine.stop();
        Ok(())
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Fill(1),             // Canvas
            Constraint::Length(HELP_HEIGHT), // Help text
        ])
        .split(frame.area());

        self.resize(chunks[0]);
        // A paused engine keeps its last frame on screen.
        if self.engine.is_running() {
            self.framebuffer.clear();
            let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
            self.engine.tick(now_ms, &mut self.framebuffer);
        }
        frame.render_widget(&self.framebuffer, chunks[0]);

        let accent = Color::Rgb(118, 210, 255);
        let state = if self.engine.is_running() {
            " "
        } else {
            " (paused) "
        };
        let help = Line::from(vec![
            "q".bold().fg(accent),
            " quit  ".dark_gray(),
            "m".bold().fg(accent),
            format!(" mode: {}  ", self.engine.mode()).dark_gray(),
            "s".bold().fg(accent),
            format!(" speed: {}  ", self.engine.speed()).dark_gray(),
            "space".bold().fg(accent),
            format!(" pause{state}").dark_gray(),
        ])
        .centered();
        frame.render_widget(help, chunks[1]);
    }

    /// Match the framebuffer and engine to the canvas area.
    fn resize(&mut self, canvas: Rect) {
        if self.framebuffer.resize_to(canvas) {
            self.engine.resize(self.framebuffer.surface_size());
        }
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(width, height) => {
                    self.resize(canvas_area(Rect::new(0, 0, width, height)))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('m')) => self.engine.set_mode(self.engine.mode().next()),
            (_, KeyCode::Char('s')) => self.engine.set_speed(self.engine.speed().next()),
            (_, KeyCode::Char(' ')) => self.toggle_pause(),
            _ => {}
        }
    }

    fn toggle_pause(&mut self) {
        if self.engine.is_running() {
            self.engine.stop();
        } else {
            self.engine.start(self.framebuffer.surface_size());
        }
        debug!(running = self.engine.is_running(), "pause toggled");
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

/// Terminal area left for the animation once the help line is taken.
fn canvas_area(terminal: Rect) -> Rect {
    Rect {
        height: terminal.height.saturating_sub(HELP_HEIGHT),
        ..terminal
    }
}
