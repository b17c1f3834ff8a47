//! Procedural dithered voxel animation engine.
//!
//! The engine is a closed numerical pipeline: a host timestamp and surface
//! size go in, rectangle fills come out through the [`Surface`] trait. It
//! renders two hero visuals, a flying voxel bird with a particle trail and a
//! dotted wave field, both quantized with ordered dithering.
//!
//! Everything apart from the particle pool is a pure function of the
//! animation clock, so frames can be dropped or resized without visible
//! discontinuity.

mod bird;
mod dither;
mod engine;
mod motion;
mod palette;
mod particles;
mod sampler;
mod stats;
mod surface;
mod wave;

pub use bird::{BirdLayout, BirdRenderer, to_local};
pub use dither::DitherMatrix;
pub use engine::Engine;
pub use motion::{GOLDEN_RATIO, Motion, Trajectory, Vec2};
pub use palette::{Palette, PaletteStop, hsl_to_rgb, mix};
pub use particles::{MAX_PARTICLES, Particle, ParticlePool, Viewport};
pub use sampler::{
    ACCEPT, BirdSampler, Sample, edge_intensity, ellipse_distance, rotated_ellipse_distance,
};
pub use stats::FrameStats;
pub use surface::{DrawOp, PixelRect, RecordingSurface, Surface, SurfaceSize};
pub use wave::{Dot, WaveGrid, WaveRenderer, height_at, vignette};
