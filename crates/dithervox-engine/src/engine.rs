//! Engine lifecycle: the single tick entry point a host drives.

use dithervox_core::{AnimationSpeed, EngineConfig, RenderMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::bird::BirdRenderer;
use crate::palette::Palette;
use crate::stats::FrameStats;
use crate::surface::{Surface, SurfaceSize};
use crate::wave::WaveRenderer;

/// Composes the bird and wave renderers behind a start/stop/tick lifecycle.
///
/// The animation clock advances by the scaled difference between successive
/// host timestamps, so changing speed or pausing never makes the pure time
/// functions jump.
#[derive(Debug)]
pub struct Engine<R = StdRng> {
    mode: RenderMode,
    speed: AnimationSpeed,
    bird: BirdRenderer<R>,
    wave: WaveRenderer,
    size: SurfaceSize,
    running: bool,
    /// Host timestamp of the previous valid tick since the last start.
    last_timestamp_ms: Option<f64>,
    /// Scaled animation time in milliseconds.
    clock_ms: f64,
    /// A non-finite timestamp was already reported for the current run.
    clamping: bool,
}

impl Engine<StdRng> {
    /// Create an engine; particle spawns use `config.seed` when set and OS
    /// entropy otherwise.
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Engine<R> {
    /// Create an engine with an explicit random source for particle spawns.
    pub fn with_rng(config: EngineConfig, rng: R) -> Self {
        Self {
            mode: config.mode,
            speed: config.speed,
            bird: BirdRenderer::new(config.bird, &Palette::bird(), rng),
            wave: WaveRenderer::new(config.wave, Palette::wave()),
            size: SurfaceSize::default(),
            running: false,
            last_timestamp_ms: None,
            clock_ms: 0.0,
            clamping: false,
        }
    }

    /// Begin ticking on a surface of `size`.
    pub fn start(&mut self, size: SurfaceSize) {
        debug!(?size, mode = %self.mode, "engine started");
        self.running = true;
        self.last_timestamp_ms = None;
        self.resize(size);
    }

    /// Stop drawing. Particles and the animation clock are kept, so a later
    /// [`Engine::start`] resumes where this left off.
    pub fn stop(&mut self) {
        if self.running {
            debug!(clock_ms = self.clock_ms, "engine stopped");
        }
        self.running = false;
        self.last_timestamp_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Re-derive grid extents for a new surface size. Particle state and the
    /// animation clock are untouched.
    pub fn resize(&mut self, size: SurfaceSize) {
        if size != self.size {
            debug!(?size, "surface resized");
        }
        self.size = size;
        self.wave.resize(size);
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        if mode != self.mode {
            debug!(from = %self.mode, to = %mode, "render mode changed");
            self.mode = mode;
        }
    }

    pub fn set_speed(&mut self, speed: AnimationSpeed) {
        if speed != self.speed {
            debug!(from = %self.speed, to = %speed, "animation speed changed");
            self.speed = speed;
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn speed(&self) -> AnimationSpeed {
        self.speed
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Scaled animation time in milliseconds.
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn bird(&self) -> &BirdRenderer<R> {
        &self.bird
    }

    pub fn wave(&self) -> &WaveRenderer {
        &self.wave
    }

    /// Advance to `timestamp_ms` and draw one frame.
    ///
    /// Returns `None` without drawing while stopped or when the surface is
    /// degenerate. A non-finite timestamp redraws the last valid instant.
    pub fn tick(&mut self, timestamp_ms: f64, surface: &mut dyn Surface) -> Option<FrameStats> {
        if !self.running || self.size.is_degenerate() {
            return None;
        }
        self.advance(timestamp_ms);

        let mut stats = FrameStats::default();
        if self.mode.draws_wave() {
            stats += self.wave.render(self.clock_ms, self.size, surface);
        }
        if self.mode.draws_bird() {
            stats += self.bird.render(self.clock_ms, self.size, surface);
        }
        trace!(
            clock_ms = self.clock_ms,
            cells = stats.cells_visited,
            draws = stats.draws(),
            "frame"
        );
        Some(stats)
    }

    fn advance(&mut self, timestamp_ms: f64) {
        if !timestamp_ms.is_finite() {
            if !self.clamping {
                warn!(timestamp_ms, "ignoring non-finite timestamp");
                self.clamping = true;
            }
            return;
        }
        self.clamping = false;
        if let Some(last) = self.last_timestamp_ms {
            // Clocks that step backwards hold the frame instead of rewinding.
            let delta = (timestamp_ms - last).max(0.0);
            self.clock_ms += delta * self.speed.time_scale();
        }
        self.last_timestamp_ms = Some(timestamp_ms);
    }
}
