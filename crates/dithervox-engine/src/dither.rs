//! Ordered (Bayer) dithering.
//!
//! All decisions are pure functions of `(px mod N, py mod N, value)`, so a
//! static image keeps a stable stipple and a slowly changing value animates
//! one threshold rank at a time.

/// An N×N threshold tile with values evenly spaced in `[0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DitherMatrix {
    size: usize,
    cells: Vec<f32>,
}

impl DitherMatrix {
    /// Build the Bayer matrix of edge `size`, rounded up to a power of two.
    pub fn bayer(size: usize) -> Self {
        let size = size.max(1).next_power_of_two();
        let ranks = bayer_ranks(size);
        let levels = (size * size) as f32;
        Self {
            size,
            cells: ranks.into_iter().map(|r| r as f32 / levels).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Threshold of the tile cell covering grid position `(px, py)`.
    #[inline]
    pub fn threshold(&self, px: i32, py: i32) -> f32 {
        let n = self.size as i32;
        let row = py.rem_euclid(n) as usize;
        let col = px.rem_euclid(n) as usize;
        self.cells[row * self.size + col]
    }

    /// Binary gate: draw iff `value` exceeds the local threshold.
    #[inline]
    pub fn should_draw(&self, px: i32, py: i32, value: f32) -> bool {
        value > self.threshold(px, py)
    }

    /// Quantize a fractional palette position to one of `levels` stops.
    ///
    /// `fraction` is in palette units (`0.0..=levels - 1`); the integer part
    /// picks the lower stop and the remainder decides, against the local
    /// threshold, whether the cell is promoted to the next stop.
    pub fn index(&self, px: i32, py: i32, fraction: f32, levels: usize) -> usize {
        if levels == 0 {
            return 0;
        }
        let top = (levels - 1) as f32;
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, top)
        };
        let base = fraction.floor();
        let rest = fraction - base;
        let base = base as usize;
        if base + 1 < levels && rest > self.threshold(px, py) {
            base + 1
        } else {
            base
        }
    }
}

/// Recursive Bayer construction: each doubling places four scaled copies of
/// the previous tile offset by 0, 2, 3 and 1.
fn bayer_ranks(size: usize) -> Vec<u32> {
    let mut n = 1;
    let mut ranks = vec![0u32];
    while n < size {
        let next = n * 2;
        let mut grown = vec![0u32; next * next];
        for y in 0..next {
            for x in 0..next {
                let quadrant = match (y / n, x / n) {
                    (0, 0) => 0,
                    (0, _) => 2,
                    (_, 0) => 3,
                    _ => 1,
                };
                grown[y * next + x] = 4 * ranks[(y % n) * n + (x % n)] + quadrant;
            }
        }
        ranks = grown;
        n = next;
    }
    ranks
}
