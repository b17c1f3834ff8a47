//! Dotted wave field (stateless apart from its grid and draw batches).
//!
//! Every frame evaluates a height field over a rows×cols grid, projects it
//! with a cheap fake perspective, dithers the brightness between adjacent
//! palette stops and draws the dots in two batches: plain dots first, then
//! the bright ones with a glow halo.

use dithervox_core::WaveConfig;

use crate::dither::DitherMatrix;
use crate::palette::Palette;
use crate::stats::FrameStats;
use crate::surface::{PixelRect, Surface, SurfaceSize};

/// Edge of the wave dither tile.
const DITHER_SIZE: usize = 4;

/// Lifts the vignetted brightness so the crests reach the glow stops.
const BRIGHTNESS_GAIN: f32 = 1.2;

/// Height of the surface at world grid position `(x, z)` and time `t`
/// (seconds). Four weighted sine terms with unrelated frequencies; the
/// result stays within `[-1, 1]`.
pub fn height_at(x: f32, z: f32, t: f32) -> f32 {
    (0.45 * (x * 0.22 + t * 0.9).sin()
        + 0.30 * (z * 0.31 - t * 0.7).cos()
        + 0.15 * ((x + z) * 0.13 + t * 1.3).sin()
        + 0.10 * ((x * x + z * z).sqrt() * 0.18 - t * 0.5).cos())
    .clamp(-1.0, 1.0)
}

/// Radial falloff from the grid center; `nx`, `ny` are in `[-1, 1]`.
pub fn vignette(nx: f32, ny: f32, power: f32) -> f32 {
    let r = ((nx * nx + ny * ny).sqrt() / std::f32::consts::SQRT_2).clamp(0.0, 1.0);
    (1.0 - r.powf(power.max(0.01))).clamp(0.0, 1.0)
}

/// A projected, quantized grid point waiting to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub palette_index: usize,
}

/// Grid extents derived from a surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveGrid {
    pub cols: usize,
    pub rows: usize,
    /// Grid spacing in surface pixels.
    pub spacing: f32,
    /// Screen `y` of the farthest row before displacement.
    pub top: f32,
}

impl WaveGrid {
    pub fn new(config: &WaveConfig, size: SurfaceSize) -> Option<Self> {
        if size.is_degenerate() {
            return None;
        }
        let spacing = (config.spacing * size.pixel_ratio).max(1.0);
        let tilt = config.tilt.clamp(0.05, 1.0);
        let cols = (size.width / spacing).ceil() as usize + 1;
        let rows = ((size.height * 0.9) / (spacing * tilt)).floor() as usize;
        if cols < 2 || rows < 2 {
            return None;
        }
        let depth_span = (rows - 1) as f32 * spacing * tilt;
        Some(Self {
            cols,
            rows,
            spacing,
            top: (size.height - depth_span) * 0.5,
        })
    }

    pub fn cells(&self) -> usize {
        self.cols * self.rows
    }
}

/// Renderer for the wave field.
#[derive(Debug)]
pub struct WaveRenderer {
    config: WaveConfig,
    palette: Palette,
    dither: DitherMatrix,
    size: Option<SurfaceSize>,
    grid: Option<WaveGrid>,
    dim: Vec<Dot>,
    glow: Vec<Dot>,
}

impl WaveRenderer {
    pub fn new(config: WaveConfig, palette: Palette) -> Self {
        Self {
            config,
            palette,
            dither: DitherMatrix::bayer(DITHER_SIZE),
            size: None,
            grid: None,
            dim: Vec::new(),
            glow: Vec::new(),
        }
    }

    pub fn grid(&self) -> Option<WaveGrid> {
        self.grid
    }

    /// Re-derive the grid and re-allocate the draw batches for `size`.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = Some(size);
        self.grid = WaveGrid::new(&self.config, size);
        let capacity = self.grid.map(|g| g.cells()).unwrap_or(0);
        self.dim = Vec::with_capacity(capacity);
        self.glow = Vec::with_capacity(capacity / 4);
    }

    /// Draw one frame at animation time `t_ms`.
    pub fn render(&mut self, t_ms: f64, size: SurfaceSize, surface: &mut dyn Surface) -> FrameStats {
        if self.size != Some(size) {
            self.resize(size);
        }
        let mut stats = FrameStats::default();
        let Some(grid) = self.grid else {
            return stats;
        };

        self.collect(grid, (t_ms / 1000.0) as f32, size);
        stats.cells_visited = grid.cells();

        for dot in &self.dim {
            surface.fill_rect(
                PixelRect::square(dot.x, dot.y, dot.size),
                self.palette.color(dot.palette_index),
            );
        }
        let blur = self.config.glow_blur * size.pixel_ratio;
        for dot in &self.glow {
            let color = self.palette.color(dot.palette_index);
            surface.fill_glow(
                PixelRect::square(dot.x, dot.y, dot.size),
                color,
                blur,
                color.darken(0.35),
            );
        }
        stats.blocks_drawn = self.dim.len();
        stats.glows_drawn = self.glow.len();
        stats
    }

    /// Project and quantize every grid point into the two batches.
    fn collect(&mut self, grid: WaveGrid, t: f32, size: SurfaceSize) {
        self.dim.clear();
        self.glow.clear();

        let c = &self.config;
        let levels = self.palette.len();
        let top_level = levels.saturating_sub(1) as f32;
        let tilt = c.tilt.clamp(0.05, 1.0);
        let half_cols = (grid.cols - 1) as f32 * 0.5;
        let center_x = size.width * 0.5;

        for row in 0..grid.rows {
            let depth = row as f32 / (grid.rows - 1) as f32;
            let hscale = 1.0 - c.depth_compression.clamp(0.0, 0.95) * (1.0 - depth);
            let dot = c.dot_size * size.pixel_ratio * hscale;
            for col in 0..grid.cols {
                let wx = col as f32 - half_cols;
                let h = height_at(wx, row as f32, t);

                let sx = center_x + wx * grid.spacing * hscale;
                let sy = grid.top + row as f32 * grid.spacing * tilt
                    - h * c.amplitude * grid.spacing * tilt * hscale;
                let x = sx - dot * 0.5;
                let y = sy - dot * 0.5;
                if x + dot <= 0.0 || y + dot <= 0.0 || x >= size.width || y >= size.height {
                    continue;
                }

                let light = (h + 1.0) * 0.5
                    * (0.55 + 0.45 * depth)
                    * vignette(wx / half_cols, depth * 2.0 - 1.0, c.vignette_power)
                    * BRIGHTNESS_GAIN;
                let index = self
                    .dither
                    .index(col as i32, row as i32, light * top_level, levels);
                if index == 0 {
                    continue;
                }

                let entry = Dot {
                    x,
                    y,
                    size: dot,
                    palette_index: index,
                };
                if index >= c.glow_threshold {
                    self.glow.push(entry);
                } else {
                    self.dim.push(entry);
                }
            }
        }
    }
}
