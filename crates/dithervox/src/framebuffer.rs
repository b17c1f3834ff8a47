//! RGB framebuffer the engine draws into, presented with half-block cells.

use std::ops::Range;

use dithervox_core::{Rgb, mix};
use dithervox_engine::{PixelRect, Surface, SurfaceSize};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Engine display units covered by one framebuffer pixel. Bird voxels come
/// out one pixel wide, too small for their bevel edges.
pub const UNITS_PER_PIXEL: f32 = 6.0;

/// Peak opacity of a glow halo next to its dot.
const GLOW_ALPHA: f32 = 0.55;

/// Color of pixels nothing was drawn on.
pub const BACKGROUND: Rgb = Rgb::new(8, 10, 18);

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: char = '▀';

/// One pixel per half terminal cell.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    /// Create a framebuffer of `width`×`height` pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
        }
    }

    /// Framebuffer covering a terminal area.
    pub fn for_area(area: Rect) -> Self {
        Self::new(area.width as usize, area.height as usize * 2)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Re-allocate for a new terminal area. Returns `true` when the size
    /// changed.
    pub fn resize_to(&mut self, area: Rect) -> bool {
        let resized = Self::for_area(area);
        if resized.width == self.width && resized.height == self.height {
            return false;
        }
        *self = resized;
        true
    }

    /// Size to hand to the engine.
    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width as f32, self.height as f32, 1.0 / UNITS_PER_PIXEL)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(BACKGROUND);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Pixel range covered by `[start, start + len)`. Anything with positive
    /// length covers at least one pixel.
    fn span(start: f32, len: f32, limit: usize) -> Range<usize> {
        if !start.is_finite() || !len.is_finite() || len <= 0.0 {
            return 0..0;
        }
        let lo = start.round();
        let hi = (start + len).round().max(lo + 1.0);
        let clamp = |v: f32| v.clamp(0.0, limit as f32) as usize;
        clamp(lo)..clamp(hi)
    }
}

impl Surface for Framebuffer {
    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        let xs = Self::span(rect.x, rect.width, self.width);
        for y in Self::span(rect.y, rect.height, self.height) {
            let row = y * self.width;
            self.pixels[row + xs.start..row + xs.end].fill(color);
        }
    }

    fn fill_glow(&mut self, rect: PixelRect, color: Rgb, blur: f32, halo: Rgb) {
        let reach = if blur.is_finite() { blur.max(0.0) } else { 0.0 };
        if reach > 0.0 {
            let xs = Self::span(rect.x - reach, rect.width + 2.0 * reach, self.width);
            let ys = Self::span(rect.y - reach, rect.height + 2.0 * reach, self.height);
            for y in ys {
                let cy = y as f32 + 0.5;
                let dy = (rect.y - cy).max(cy - (rect.y + rect.height)).max(0.0);
                for x in xs.clone() {
                    let cx = x as f32 + 0.5;
                    let dx = (rect.x - cx).max(cx - (rect.x + rect.width)).max(0.0);
                    let d = dx.hypot(dy);
                    if d >= reach {
                        continue;
                    }
                    let p = &mut self.pixels[y * self.width + x];
                    *p = mix(*p, halo, GLOW_ALPHA * (1.0 - d / reach));
                }
            }
        }
        self.fill_rect(rect, color);
    }
}

impl Widget for &Framebuffer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let (x, y) = (col as usize, row as usize * 2);
                let upper = self.pixel(x, y).unwrap_or(BACKGROUND);
                let lower = self.pixel(x, y + 1).unwrap_or(BACKGROUND);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_char(HALF_BLOCK)
                        .set_fg(upper.into())
                        .set_bg(lower.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    const RED: Rgb = Rgb::new(255, 0, 0);

    #[test]
    fn test_for_area_doubles_rows() {
        let fb = Framebuffer::for_area(Rect::new(0, 0, 80, 23));
        assert_eq!((fb.width(), fb.height()), (80, 46));
        let size = fb.surface_size();
        assert_eq!((size.width, size.height), (80.0, 46.0));
        assert!(!size.is_degenerate());
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut fb = Framebuffer::new(4, 4);
        fb.fill_rect(PixelRect::new(-2.0, 2.0, 4.0, 10.0), RED);
        assert_eq!(fb.pixel(0, 2), Some(RED));
        assert_eq!(fb.pixel(1, 3), Some(RED));
        assert_eq!(fb.pixel(2, 2), Some(BACKGROUND));
        assert_eq!(fb.pixel(0, 1), Some(BACKGROUND));
        assert_eq!(fb.pixel(4, 0), None);
    }

    #[test]
    fn test_small_rect_covers_a_pixel() {
        let mut fb = Framebuffer::new(4, 4);
        fb.fill_rect(PixelRect::square(1.6, 1.6, 0.5), RED);
        assert_eq!(fb.pixel(2, 2), Some(RED));
    }

    #[test]
    fn test_non_finite_rect_is_ignored() {
        let mut fb = Framebuffer::new(4, 4);
        fb.fill_rect(PixelRect::square(f32::NAN, 0.0, 2.0), RED);
        fb.fill_glow(PixelRect::square(0.0, f32::INFINITY, 2.0), RED, 2.0, RED);
        assert!((0..4).all(|x| (0..4).all(|y| fb.pixel(x, y) == Some(BACKGROUND))));
    }

    #[test]
    fn test_glow_halo_fades_out() {
        let mut fb = Framebuffer::new(9, 1);
        let halo = Rgb::new(0, 200, 0);
        fb.fill_glow(PixelRect::new(4.0, 0.0, 1.0, 1.0), RED, 3.0, halo);
        assert_eq!(fb.pixel(4, 0), Some(RED));
        let near = fb.pixel(3, 0).unwrap();
        let far = fb.pixel(2, 0).unwrap();
        assert!(near.g > far.g && far.g > BACKGROUND.g);
        assert_eq!(fb.pixel(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn test_render_half_blocks() {
        let mut fb = Framebuffer::new(2, 2);
        fb.fill_rect(PixelRect::new(0.0, 0.0, 2.0, 1.0), RED);
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        (&fb).render(area, &mut buf);
        let cell = &buf[(1, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::from(BACKGROUND));
    }

    #[test]
    fn test_bird_voxels_are_one_pixel() {
        let fb = Framebuffer::for_area(Rect::new(0, 0, 80, 23));
        let size = fb.surface_size();
        let cell = dithervox_core::BirdConfig::default().cell_size * size.pixel_ratio;
        assert!((cell - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_resize_reports_change() {
        let mut fb = Framebuffer::new(4, 4);
        assert!(!fb.resize_to(Rect::new(0, 0, 4, 2)));
        assert!(fb.resize_to(Rect::new(0, 0, 10, 5)));
        assert_eq!((fb.width(), fb.height()), (10, 10));
    }
}
