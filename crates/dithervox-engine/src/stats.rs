//! Per-frame counters.

use std::ops::AddAssign;

/// What a single frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Grid cells evaluated by a renderer.
    pub cells_visited: usize,
    /// Blocks or dots drawn without a halo.
    pub blocks_drawn: usize,
    /// Dots drawn with a glow halo.
    pub glows_drawn: usize,
    /// Trail particles that passed the dither gate.
    pub particles_drawn: usize,
}

impl FrameStats {
    /// Total draw primitives issued, bevel edges excluded.
    pub fn draws(&self) -> usize {
        self.blocks_drawn + self.glows_drawn + self.particles_drawn
    }
}

impl AddAssign for FrameStats {
    fn add_assign(&mut self, rhs: Self) {
        self.cells_visited += rhs.cells_visited;
        self.blocks_drawn += rhs.blocks_drawn;
        self.glows_drawn += rhs.glows_drawn;
        self.particles_drawn += rhs.particles_drawn;
    }
}
