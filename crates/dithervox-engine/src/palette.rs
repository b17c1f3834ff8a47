//! Fixed color stops for the bird and the wave field.

use dithervox_core::Rgb;

pub use dithervox_core::mix;

/// A named color stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteStop {
    pub name: &'static str,
    pub color: Rgb,
}

impl PaletteStop {
    pub const fn new(name: &'static str, color: Rgb) -> Self {
        Self { name, color }
    }
}

/// Ordered, immutable list of color stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    stops: Vec<PaletteStop>,
}

impl Palette {
    pub fn new(stops: Vec<PaletteStop>) -> Self {
        Self { stops }
    }

    /// Colors of the voxel bird and its trail.
    pub fn bird() -> Self {
        Self::new(vec![
            PaletteStop::new("ink", Rgb::new(18, 22, 38)),
            PaletteStop::new("glint", Rgb::new(255, 255, 255)),
            PaletteStop::new("crown", Rgb::new(122, 204, 255)),
            PaletteStop::new("sky", Rgb::new(72, 152, 240)),
            PaletteStop::new("deep", Rgb::new(34, 74, 172)),
            PaletteStop::new("night", Rgb::new(22, 40, 112)),
            PaletteStop::new("belly", Rgb::new(250, 236, 205)),
            PaletteStop::new("belly_shade", Rgb::new(226, 190, 150)),
            PaletteStop::new("beak", Rgb::new(255, 178, 62)),
            PaletteStop::new("beak_tip", Rgb::new(218, 108, 40)),
            PaletteStop::new("ember", Rgb::new(255, 202, 92)),
            PaletteStop::new("mint", Rgb::new(140, 240, 212)),
            PaletteStop::new("pearl", Rgb::new(230, 236, 255)),
        ])
    }

    /// Dark-to-bright ramp of the wave field; index 0 is the void entry.
    pub fn wave() -> Self {
        Self::new(vec![
            PaletteStop::new("void", Rgb::new(6, 10, 24)),
            PaletteStop::new("deep", Rgb::new(16, 40, 80)),
            PaletteStop::new("mid", hsl_to_rgb(196.0, 0.70, 0.35)),
            PaletteStop::new("bright", hsl_to_rgb(184.0, 0.80, 0.55)),
            PaletteStop::new("glow", hsl_to_rgb(170.0, 0.90, 0.78)),
        ])
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[PaletteStop] {
        &self.stops
    }

    /// Color at `index`, clamped to the last stop. Black for an empty palette.
    pub fn color(&self, index: usize) -> Rgb {
        self.stops
            .get(index.min(self.stops.len().saturating_sub(1)))
            .map(|s| s.color)
            .unwrap_or(Rgb::BLACK)
    }

    /// Look a stop up by name.
    pub fn named(&self, name: &str) -> Option<Rgb> {
        self.stops.iter().find(|s| s.name == name).map(|s| s.color)
    }

    /// Colors of the named stops, skipping unknown names.
    pub fn subset(&self, names: &[&str]) -> Vec<Rgb> {
        names.iter().filter_map(|n| self.named(n)).collect()
    }
}

/// Convert HSL (hue in degrees, saturation and lightness in 0..=1) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    if s == 0.0 {
        let v = (l * 255.0) as u8;
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let h = h.rem_euclid(360.0) / 360.0;

    let r = hue_to_channel(p, q, h + 1.0 / 3.0);
    let g = hue_to_channel(p, q, h);
    let b = hue_to_channel(p, q, h - 1.0 / 3.0);

    Rgb::new((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_lookup() {
        let p = Palette::bird();
        assert_eq!(p.named("glint"), Some(Rgb::WHITE));
        assert_eq!(p.named("missing"), None);
        assert_eq!(p.subset(&["ember", "nope", "mint"]).len(), 2);
    }

    #[test]
    fn test_color_index_clamps() {
        let p = Palette::wave();
        assert_eq!(p.len(), 5);
        assert_eq!(p.color(99), p.color(4));
        assert_eq!(Palette::new(Vec::new()).color(0), Rgb::BLACK);
    }

    #[test]
    fn test_wave_ramp_gets_brighter() {
        let p = Palette::wave();
        let luma = |c: Rgb| c.r as u32 * 3 + c.g as u32 * 6 + c.b as u32;
        for pair in p.stops().windows(2) {
            assert!(luma(pair[0].color) < luma(pair[1].color));
        }
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 1.0), Rgb::new(255, 255, 255));
    }
}
