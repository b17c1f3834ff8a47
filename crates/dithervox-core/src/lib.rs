//! Core types shared by the dithervox engine, its configuration loader and
//! the terminal host.

mod color;
mod settings;

pub use color::{Rgb, mix};
pub use settings::{
    AnimationSpeed, BirdConfig, EngineConfig, MotionConfig, ParticleConfig, RenderMode, WaveConfig,
};
