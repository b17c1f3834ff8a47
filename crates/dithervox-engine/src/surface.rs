//! The drawing boundary between the engine and its host.

use dithervox_core::Rgb;

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A square block of edge `size` with its top-left corner at `(x, y)`.
    pub const fn square(x: f32, y: f32, size: f32) -> Self {
        Self::new(x, y, size, size)
    }
}

/// Current dimensions of the host surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    /// Width in surface pixels.
    pub width: f32,
    /// Height in surface pixels.
    pub height: f32,
    /// Surface pixels per display unit.
    pub pixel_ratio: f32,
}

impl SurfaceSize {
    pub const fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// True when nothing can be drawn: zero, negative or non-finite extents.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.pixel_ratio.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
            || self.pixel_ratio <= 0.0
    }
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

/// Primitive draw operations a host exposes to the engine.
///
/// Implementations are borrowed for exactly one tick; the engine never keeps
/// a reference between frames.
pub trait Surface {
    /// Fill `rect` with a solid color.
    fn fill_rect(&mut self, rect: PixelRect, color: Rgb);

    /// Fill `rect` and surround it with a soft halo of `blur` pixels.
    ///
    /// Hosts without a glow primitive fall back to a plain fill.
    fn fill_glow(&mut self, rect: PixelRect, color: Rgb, blur: f32, halo: Rgb) {
        let _ = (blur, halo);
        self.fill_rect(rect, color);
    }
}

/// A single recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    Fill {
        rect: PixelRect,
        color: Rgb,
    },
    Glow {
        rect: PixelRect,
        color: Rgb,
        blur: f32,
        halo: Rgb,
    },
}

impl DrawOp {
    pub fn rect(&self) -> PixelRect {
        match self {
            DrawOp::Fill { rect, .. } | DrawOp::Glow { rect, .. } => *rect,
        }
    }
}

/// Surface that records every call, for tests and frame inspection.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn glow_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Glow { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.ops.push(DrawOp::Fill { rect, color });
    }

    fn fill_glow(&mut self, rect: PixelRect, color: Rgb, blur: f32, halo: Rgb) {
        self.ops.push(DrawOp::Glow {
            rect,
            color,
            blur,
            halo,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_sizes() {
        assert!(SurfaceSize::new(0.0, 100.0, 1.0).is_degenerate());
        assert!(SurfaceSize::new(100.0, -4.0, 1.0).is_degenerate());
        assert!(SurfaceSize::new(100.0, 100.0, 0.0).is_degenerate());
        assert!(SurfaceSize::new(f32::NAN, 100.0, 1.0).is_degenerate());
        assert!(SurfaceSize::new(f32::INFINITY, 100.0, 1.0).is_degenerate());
        assert!(!SurfaceSize::new(640.0, 360.0, 2.0).is_degenerate());
    }

    #[test]
    fn test_default_glow_falls_back_to_fill() {
        struct FillOnly(Vec<PixelRect>);
        impl Surface for FillOnly {
            fn fill_rect(&mut self, rect: PixelRect, _color: Rgb) {
                self.0.push(rect);
            }
        }

        let mut s = FillOnly(Vec::new());
        s.fill_glow(PixelRect::square(1.0, 2.0, 3.0), Rgb::WHITE, 4.0, Rgb::BLACK);
        assert_eq!(s.0, vec![PixelRect::square(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_recording_surface() {
        let mut s = RecordingSurface::new();
        s.fill_rect(PixelRect::square(0.0, 0.0, 1.0), Rgb::WHITE);
        s.fill_glow(PixelRect::square(1.0, 1.0, 2.0), Rgb::WHITE, 3.0, Rgb::BLACK);
        assert_eq!(s.ops().len(), 2);
        assert_eq!(s.glow_count(), 1);
        assert_eq!(s.ops()[1].rect(), PixelRect::square(1.0, 1.0, 2.0));
        s.clear();
        assert!(s.is_empty());
    }
}
