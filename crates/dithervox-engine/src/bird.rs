//! Flying voxel bird: composes the flight path, the particle trail and the
//! shape sampler into dithered, bevelled pixel blocks.

use std::f64::consts::TAU;

use dithervox_core::{BirdConfig, Rgb};
use rand::Rng;
use rand::rngs::StdRng;

use crate::dither::DitherMatrix;
use crate::motion::{Motion, Trajectory, Vec2};
use crate::palette::Palette;
use crate::particles::{ParticlePool, Viewport};
use crate::sampler::BirdSampler;
use crate::stats::FrameStats;
use crate::surface::{PixelRect, Surface, SurfaceSize};

/// Trail particle colors, by palette stop name.
const TRAIL_COLORS: [&str; 3] = ["ember", "mint", "pearl"];

/// Edge of the bird dither tile.
const DITHER_SIZE: usize = 8;

/// Grid placement of the bird for one surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdLayout {
    /// Block edge in surface pixels.
    pub cell: f32,
    /// Surface pixels per local shape unit.
    pub scale: f32,
    pub cols: i32,
    pub rows: i32,
    /// Half-width of the iteration window in cells.
    pub reach: i32,
}

impl BirdLayout {
    /// Derive the grid for `size`, or `None` when nothing fits.
    pub fn new(config: &BirdConfig, size: SurfaceSize) -> Option<Self> {
        if size.is_degenerate() || !config.scale.is_finite() {
            return None;
        }
        let cell = (config.cell_size * size.pixel_ratio).max(1.0);
        let cols = (size.width / cell).floor() as i32;
        let rows = (size.height / cell).floor() as i32;
        if cols <= 0 || rows <= 0 {
            return None;
        }
        let scale = (config.scale * size.width.min(size.height)).max(f32::EPSILON);
        // Never wider than the grid itself.
        let reach = (BirdSampler::MAX_EXTENT * scale / cell)
            .ceil()
            .min(cols.max(rows) as f32) as i32;
        Some(Self {
            cell,
            scale,
            cols,
            rows,
            reach,
        })
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.cols as f32, self.rows as f32)
    }

    /// Upper bound on cells visited per frame, whatever the surface size.
    pub fn max_window_cells(&self) -> usize {
        let side = 2 * self.reach.max(0) as usize + 1;
        side.saturating_mul(side)
    }
}

/// Map an offset from the anchor (surface pixels) into local shape space:
/// mirror when facing right, undo the banking, divide by the scale.
pub fn to_local(dx: f32, dy: f32, trajectory: &Trajectory, scale: f32) -> (f32, f32) {
    let mx = if trajectory.facing_right { -dx } else { dx };
    let (s, c) = trajectory.pitch.sin_cos();
    ((mx * c - dy * s) / scale, (mx * s + dy * c) / scale)
}

/// Renderer for the bird and its trail.
#[derive(Debug)]
pub struct BirdRenderer<R = StdRng> {
    config: BirdConfig,
    sampler: BirdSampler,
    motion: Motion,
    dither: DitherMatrix,
    particles: ParticlePool<R>,
}

impl<R: Rng> BirdRenderer<R> {
    pub fn new(config: BirdConfig, palette: &Palette, rng: R) -> Self {
        Self {
            sampler: BirdSampler::new(palette),
            motion: Motion::new(config.motion),
            dither: DitherMatrix::bayer(DITHER_SIZE),
            particles: ParticlePool::new(config.particles, palette.subset(&TRAIL_COLORS), rng),
            config,
        }
    }

    pub fn particles(&self) -> &ParticlePool<R> {
        &self.particles
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Wingbeat phase in `[0, 1]`, independent of the flight path.
    pub fn phase(&self, t_ms: f64) -> f32 {
        let period = self.config.flap_period_ms.max(1.0) as f64;
        (0.5 + 0.5 * (TAU * t_ms / period).sin()) as f32
    }

    /// Anchor of the bird in surface pixels.
    pub fn anchor(&self, trajectory: &Trajectory, size: SurfaceSize) -> Vec2 {
        Vec2::new(
            size.width * 0.5 * (1.0 + trajectory.position.x),
            size.height * 0.5 * (1.0 + trajectory.position.y),
        )
    }

    /// Draw one frame at animation time `t_ms`.
    pub fn render(&mut self, t_ms: f64, size: SurfaceSize, surface: &mut dyn Surface) -> FrameStats {
        let mut stats = FrameStats::default();
        let Some(layout) = BirdLayout::new(&self.config, size) else {
            return stats;
        };

        let phase = self.phase(t_ms);
        let trajectory = self.motion.trajectory(t_ms / 1000.0);
        let anchor = self.anchor(&trajectory, size);

        // Trail first so the bird covers it.
        let anchor_cells = Vec2::new(anchor.x / layout.cell, anchor.y / layout.cell);
        let viewport = layout.viewport();
        self.particles.seed(anchor_cells, viewport);
        self.particles.tick(anchor_cells, viewport);
        stats.particles_drawn = self.particles.draw(surface, &self.dither, layout.cell);

        let acx = anchor_cells.x.floor() as i32;
        let acy = anchor_cells.y.floor() as i32;
        let x0 = acx.saturating_sub(layout.reach).max(0);
        let x1 = acx.saturating_add(layout.reach).min(layout.cols - 1);
        let y0 = acy.saturating_sub(layout.reach).max(0);
        let y1 = acy.saturating_add(layout.reach).min(layout.rows - 1);
        let edge = size.pixel_ratio.max(1.0);

        for cy in y0..=y1 {
            for cx in x0..=x1 {
                stats.cells_visited += 1;
                let px = cx as f32 * layout.cell;
                let py = cy as f32 * layout.cell;
                let dx = px + layout.cell * 0.5 - anchor.x;
                let dy = py + layout.cell * 0.5 - anchor.y;
                let (lx, ly) = to_local(dx, dy, &trajectory, layout.scale);

                let Some(sample) = self.sampler.sample(lx, ly, phase) else {
                    continue;
                };
                if !self.dither.should_draw(cx, cy, sample.intensity) {
                    continue;
                }
                draw_voxel(surface, PixelRect::square(px, py, layout.cell), sample.color, edge);
                stats.blocks_drawn += 1;
            }
        }

        stats
    }
}

/// A filled block with a light top/left and a dark bottom/right edge.
fn draw_voxel(surface: &mut dyn Surface, block: PixelRect, color: Rgb, edge: f32) {
    surface.fill_rect(block, color);
    if block.width <= edge * 2.0 {
        return;
    }
    let light = color.lighten(0.28);
    let dark = color.darken(0.30);
    let PixelRect {
        x,
        y,
        width,
        height,
    } = block;
    surface.fill_rect(PixelRect::new(x, y, width, edge), light);
    surface.fill_rect(PixelRect::new(x, y, edge, height), light);
    surface.fill_rect(PixelRect::new(x, y + height - edge, width, edge), dark);
    surface.fill_rect(PixelRect::new(x + width - edge, y, edge, height), dark);
}
