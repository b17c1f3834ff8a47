//! Animation settings and engine configuration records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Animation speed setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl AnimationSpeed {
    /// Multiplier applied to elapsed time before it reaches the time-driven
    /// parts of the engine (wingbeat, flight path, wave field).
    pub fn time_scale(&self) -> f64 {
        match self {
            AnimationSpeed::Slow => 0.6,
            AnimationSpeed::Medium => 1.0,
            AnimationSpeed::Fast => 1.6,
        }
    }

    /// Cycle to the next speed.
    pub fn next(&self) -> Self {
        match self {
            AnimationSpeed::Slow => AnimationSpeed::Medium,
            AnimationSpeed::Medium => AnimationSpeed::Fast,
            AnimationSpeed::Fast => AnimationSpeed::Slow,
        }
    }

    /// Display name.
    pub fn label(&self) -> &'static str {
        match self {
            AnimationSpeed::Slow => "slow",
            AnimationSpeed::Medium => "medium",
            AnimationSpeed::Fast => "fast",
        }
    }
}

impl fmt::Display for AnimationSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnimationSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow" => Ok(AnimationSpeed::Slow),
            "medium" => Ok(AnimationSpeed::Medium),
            "fast" => Ok(AnimationSpeed::Fast),
            other => Err(format!("unknown speed `{other}` (expected slow, medium or fast)")),
        }
    }
}

/// Which hero visual the engine draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// The flying voxel bird with its particle trail.
    #[default]
    Bird,
    /// The undulating dotted wave field.
    Wave,
    /// Wave field behind the bird.
    Both,
}

impl RenderMode {
    /// Cycle to the next mode.
    pub fn next(&self) -> Self {
        match self {
            RenderMode::Bird => RenderMode::Wave,
            RenderMode::Wave => RenderMode::Both,
            RenderMode::Both => RenderMode::Bird,
        }
    }

    /// Display name.
    pub fn label(&self) -> &'static str {
        match self {
            RenderMode::Bird => "bird",
            RenderMode::Wave => "wave",
            RenderMode::Both => "both",
        }
    }

    pub fn draws_bird(&self) -> bool {
        matches!(self, RenderMode::Bird | RenderMode::Both)
    }

    pub fn draws_wave(&self) -> bool {
        matches!(self, RenderMode::Wave | RenderMode::Both)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bird" => Ok(RenderMode::Bird),
            "wave" => Ok(RenderMode::Wave),
            "both" => Ok(RenderMode::Both),
            other => Err(format!("unknown mode `{other}` (expected bird, wave or both)")),
        }
    }
}

/// Flight path parameters.
///
/// Amplitudes are fractions of the surface half-extent, so the path stays
/// inside `±(amplitude + secondary)` of the surface center on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Primary horizontal amplitude (`Ax`).
    pub amplitude_x: f32,
    /// Secondary horizontal amplitude (`Bx`).
    pub secondary_x: f32,
    /// Primary vertical amplitude (`Ay`).
    pub amplitude_y: f32,
    /// Secondary vertical amplitude (`By`).
    pub secondary_y: f32,
    /// Base angular frequency in radians per second.
    pub frequency: f32,
    /// Vertical base frequency as a multiple of the horizontal one.
    pub vertical_ratio: f32,
    /// Added to `|vx|` before the pitch `atan2`, keeps slow turns level.
    pub pitch_softening: f32,
    /// Multiplier applied to the raw pitch angle.
    pub pitch_damping: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            amplitude_x: 0.42,
            secondary_x: 0.18,
            amplitude_y: 0.30,
            secondary_y: 0.12,
            frequency: 0.35,
            vertical_ratio: 1.37,
            pitch_softening: 0.15,
            pitch_damping: 0.6,
        }
    }
}

/// Particle trail parameters. Distances are in grid cells, lifetimes in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Number of particles in the pool.
    pub count: usize,
    /// Maximum spawn offset from the anchor on each axis.
    pub jitter: f32,
    /// Maximum drift speed per tick on each axis.
    pub drift: f32,
    /// Shortest lifetime a spawn can draw.
    pub min_life: u32,
    /// Longest lifetime a spawn can draw.
    pub max_life: u32,
    /// Ticks spent fading in after a spawn.
    pub fade_in_ticks: u32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 36,
            jitter: 3.0,
            drift: 0.25,
            min_life: 40,
            max_life: 120,
            fade_in_ticks: 8,
        }
    }
}

/// Voxel bird parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    /// Edge of one voxel block in display units (before device scaling).
    pub cell_size: f32,
    /// One local shape unit as a fraction of the surface's smaller side.
    pub scale: f32,
    /// Duration of one wingbeat in milliseconds.
    pub flap_period_ms: f32,
    /// Flight path.
    pub motion: MotionConfig,
    /// Trail behind the bird.
    pub particles: ParticleConfig,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            cell_size: 6.0,
            scale: 0.22,
            flap_period_ms: 900.0,
            motion: MotionConfig::default(),
            particles: ParticleConfig::default(),
        }
    }
}

/// Height-field wave parameters. Lengths are in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Distance between neighbouring grid points.
    pub spacing: f32,
    /// Edge of a dot in the nearest row.
    pub dot_size: f32,
    /// Vertical squash of the grid (0 flat line, 1 top-down).
    pub tilt: f32,
    /// Horizontal shrink of the farthest row relative to the nearest.
    pub depth_compression: f32,
    /// Height displacement in grid spacings.
    pub amplitude: f32,
    /// Exponent of the radial vignette falloff.
    pub vignette_power: f32,
    /// Palette index from which dots get a glow halo.
    pub glow_threshold: usize,
    /// Halo blur radius.
    pub glow_blur: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            spacing: 14.0,
            dot_size: 6.0,
            tilt: 0.55,
            depth_compression: 0.45,
            amplitude: 1.4,
            vignette_power: 2.2,
            glow_threshold: 3,
            glow_blur: 8.0,
        }
    }
}

/// Everything needed to build an engine instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which visual to draw.
    pub mode: RenderMode,
    /// Time scale for the time-driven parts.
    pub speed: AnimationSpeed,
    /// Fixed particle seed; a fresh one is drawn when absent.
    pub seed: Option<u64>,
    /// Bird renderer settings.
    pub bird: BirdConfig,
    /// Wave renderer settings.
    pub wave: WaveConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_cycle() {
        assert_eq!(AnimationSpeed::Slow.next(), AnimationSpeed::Medium);
        assert_eq!(AnimationSpeed::Medium.next(), AnimationSpeed::Fast);
        assert_eq!(AnimationSpeed::Fast.next(), AnimationSpeed::Slow);
    }

    #[test]
    fn test_mode_cycle_and_flags() {
        assert_eq!(RenderMode::Bird.next(), RenderMode::Wave);
        assert_eq!(RenderMode::Both.next(), RenderMode::Bird);
        assert!(RenderMode::Both.draws_bird() && RenderMode::Both.draws_wave());
        assert!(!RenderMode::Wave.draws_bird());
        assert!(!RenderMode::Bird.draws_wave());
    }

    #[test]
    fn test_parse_mode_and_speed() {
        assert_eq!("Wave".parse::<RenderMode>(), Ok(RenderMode::Wave));
        assert_eq!("fast".parse::<AnimationSpeed>(), Ok(AnimationSpeed::Fast));
        assert!("sideways".parse::<RenderMode>().is_err());
        assert!("warp".parse::<AnimationSpeed>().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: EngineConfig = toml::from_str(
            r#"
            mode = "both"
            [bird]
            cell_size = 4.0
            [bird.particles]
            count = 12
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mode, RenderMode::Both);
        assert_eq!(cfg.speed, AnimationSpeed::Medium);
        assert_eq!(cfg.bird.cell_size, 4.0);
        assert_eq!(cfg.bird.particles.count, 12);
        assert_eq!(cfg.bird.particles.max_life, ParticleConfig::default().max_life);
        assert_eq!(cfg.wave, WaveConfig::default());
        assert_eq!(cfg.seed, None);
    }
}
