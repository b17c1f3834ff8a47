//! RGB color values and linear blending.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Construct a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend toward `other` by `t` (clamped to 0..=1).
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        mix(self, other, t)
    }

    /// Blend toward white.
    pub fn lighten(self, amount: f32) -> Rgb {
        mix(self, Rgb::WHITE, amount)
    }

    /// Blend toward black.
    pub fn darken(self, amount: f32) -> Rgb {
        mix(self, Rgb::BLACK, amount)
    }
}

/// Linear interpolation between two colors with `t` clamped to `[0, 1]`.
///
/// A NaN `t` is treated as `0.0` so the result is always `a` or a blend of
/// the two inputs.
pub fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let channel = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb::new(
        channel(a.r, b.r),
        channel(a.g, b.g),
        channel(a.b, b.b),
    )
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.r, c.g, c.b)
    }
}
