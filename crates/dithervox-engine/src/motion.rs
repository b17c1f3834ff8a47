//! Closed-form flight path.
//!
//! Position is evaluated directly from time, never integrated, so the path is
//! drift-free and any `t` can be rendered without replaying earlier ones.

use dithervox_core::MotionConfig;

/// Frequency ratio between the two sinusoids on each axis. Irrational, so
/// the summed path does not repeat.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Plain 2D vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Where the subject is at a given instant and how it is oriented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    /// Offset from the surface center in half-extent units.
    pub position: Vec2,
    /// Analytic time derivative of `position`, per second.
    pub velocity: Vec2,
    /// Moving toward positive `x`; the shape is mirrored.
    pub facing_right: bool,
    /// Banking angle in radians, never reaching a quarter turn.
    pub pitch: f32,
}

/// Evaluates the flight path for a motion configuration.
#[derive(Debug, Clone, Copy)]
pub struct Motion {
    config: MotionConfig,
}

impl Motion {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    /// Largest possible `|position|` on each axis.
    pub fn bounds(&self) -> Vec2 {
        let c = &self.config;
        Vec2::new(
            c.amplitude_x.abs() + c.secondary_x.abs(),
            c.amplitude_y.abs() + c.secondary_y.abs(),
        )
    }

    /// Trajectory at `t` seconds.
    pub fn trajectory(&self, t: f64) -> Trajectory {
        let c = &self.config;
        let omega = c.frequency as f64;
        let omega_y = omega * c.vertical_ratio as f64;

        let (x, vx) = axis(
            t,
            omega,
            c.amplitude_x as f64,
            c.secondary_x as f64,
        );
        let (y, vy) = axis(
            t,
            omega_y,
            c.amplitude_y as f64,
            c.secondary_y as f64,
        );

        let pitch = vy.atan2(vx.abs() + c.pitch_softening.max(0.0) as f64)
            * c.pitch_damping.clamp(0.0, 1.0) as f64;

        Trajectory {
            position: Vec2::new(x as f32, y as f32),
            velocity: Vec2::new(vx as f32, vy as f32),
            facing_right: vx > 0.0,
            pitch: pitch as f32,
        }
    }
}

/// Position and velocity of one axis: `sin(ωt)·a + sin(ωtφ)·b`.
fn axis(t: f64, omega: f64, a: f64, b: f64) -> (f64, f64) {
    let p1 = omega * t;
    let p2 = p1 * GOLDEN_RATIO;
    let pos = p1.sin() * a + p2.sin() * b;
    let vel = omega * p1.cos() * a + omega * GOLDEN_RATIO * p2.cos() * b;
    (pos, vel)
}
