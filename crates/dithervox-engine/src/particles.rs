//! Particle trail (stateful).
//!
//! A fixed pool of particles lives in grid-cell space around the moving
//! subject. Expired or escaped particles are reset in place at the subject's
//! current position, so the pool never grows or reallocates.

use dithervox_core::{ParticleConfig, Rgb};
use rand::Rng;
use rand::rngs::StdRng;

use crate::dither::DitherMatrix;
use crate::motion::Vec2;
use crate::surface::{PixelRect, Surface};

/// Grid extent particles may occupy, in cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when the grid cell `(x, y)` rounds to lies inside the viewport.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (cx, cy) = (x.round(), y.round());
        cx >= 0.0 && cx < self.width && cy >= 0.0 && cy < self.height
    }
}

/// State for a single trail particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in grid cells.
    pub x: f32,
    pub y: f32,
    /// Drift in cells per tick.
    pub vx: f32,
    pub vy: f32,
    /// Ticks since the last spawn.
    pub age: u32,
    /// Ticks the particle lives before respawning.
    pub max_life: u32,
    /// Trail color drawn at spawn.
    pub color: Rgb,
}

/// Fixed-size pool of trail particles.
#[derive(Debug)]
pub struct ParticlePool<R = StdRng> {
    config: ParticleConfig,
    colors: Vec<Rgb>,
    particles: Vec<Particle>,
    rng: R,
    respawns: u64,
}

impl<R: Rng> ParticlePool<R> {
    /// Create an empty pool; call [`ParticlePool::seed`] once the first
    /// anchor and viewport are known.
    pub fn new(mut config: ParticleConfig, colors: Vec<Rgb>, rng: R) -> Self {
        config.count = config.count.min(MAX_PARTICLES);
        Self {
            particles: Vec::with_capacity(config.count),
            config,
            colors,
            rng,
            respawns: 0,
        }
    }

    pub fn is_seeded(&self) -> bool {
        !self.particles.is_empty() || self.config.count == 0
    }

    /// Fill the pool around `anchor`. Does nothing once seeded.
    pub fn seed(&mut self, anchor: Vec2, viewport: Viewport) {
        if !self.particles.is_empty() {
            return;
        }
        for _ in 0..self.config.count {
            let p = spawn(&self.config, &self.colors, &mut self.rng, anchor, viewport);
            self.particles.push(p);
        }
    }

    /// Advance every particle one tick, respawning the expired and escaped
    /// ones at `anchor`.
    pub fn tick(&mut self, anchor: Vec2, viewport: Viewport) {
        let Self {
            config,
            colors,
            particles,
            rng,
            respawns,
        } = self;
        for p in particles.iter_mut() {
            p.x += p.vx;
            p.y += p.vy;
            p.age = p.age.saturating_add(1);
            if p.age > p.max_life || !viewport.contains(p.x, p.y) {
                *p = spawn(config, colors, rng, anchor, viewport);
                *respawns += 1;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Total respawns since creation.
    pub fn respawn_count(&self) -> u64 {
        self.respawns
    }

    /// Opacity: a linear fade-in over the first ticks times a linear fade-out
    /// over the whole life.
    pub fn alpha(&self, p: &Particle) -> f32 {
        let fade_in = if self.config.fade_in_ticks == 0 {
            1.0
        } else {
            (p.age as f32 / self.config.fade_in_ticks as f32).min(1.0)
        };
        let fade_out = if p.max_life == 0 {
            0.0
        } else {
            (1.0 - p.age as f32 / p.max_life as f32).clamp(0.0, 1.0)
        };
        fade_in * fade_out
    }

    /// Draw the visible particles as `cell`-sized blocks. Visibility is
    /// ordered-dithered on the particle's grid cell, so fading particles
    /// stipple instead of blending. Returns the number of blocks drawn.
    pub fn draw(&self, surface: &mut dyn Surface, dither: &DitherMatrix, cell: f32) -> usize {
        let mut drawn = 0;
        for p in &self.particles {
            let cx = p.x.round() as i32;
            let cy = p.y.round() as i32;
            if !dither.should_draw(cx, cy, self.alpha(p)) {
                continue;
            }
            surface.fill_rect(
                PixelRect::square(cx as f32 * cell, cy as f32 * cell, cell),
                p.color,
            );
            drawn += 1;
        }
        drawn
    }
}

/// Largest jitter or drift honoured, in cells.
const MAX_SPREAD: f32 = 1.0e6;

/// Upper bound on the pool size.
pub const MAX_PARTICLES: usize = 4096;

/// Half-width of a symmetric random range. Non-finite values mean no spread.
fn spread(value: f32) -> f32 {
    if value.is_finite() {
        value.abs().min(MAX_SPREAD)
    } else {
        0.0
    }
}

fn spawn<R: Rng>(
    config: &ParticleConfig,
    colors: &[Rgb],
    rng: &mut R,
    anchor: Vec2,
    viewport: Viewport,
) -> Particle {
    let jitter = spread(config.jitter);
    let drift = spread(config.drift);
    let x = anchor.x + rng.gen_range(-jitter..=jitter);
    let y = anchor.y + rng.gen_range(-jitter..=jitter);
    let lo = config.min_life.min(config.max_life);
    let hi = config.min_life.max(config.max_life);
    let color = if colors.is_empty() {
        Rgb::WHITE
    } else {
        colors[rng.gen_range(0..colors.len())]
    };
    Particle {
        x: x.clamp(0.0, (viewport.width - 1.0).max(0.0)),
        y: y.clamp(0.0, (viewport.height - 1.0).max(0.0)),
        vx: rng.gen_range(-drift..=drift),
        vy: rng.gen_range(-drift..=drift),
        age: 0,
        max_life: rng.gen_range(lo..=hi),
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use rand::SeedableRng;

    const VIEW: Viewport = Viewport::new(80.0, 40.0);

    fn pool(config: ParticleConfig, seed: u64) -> ParticlePool {
        ParticlePool::new(
            config,
            vec![Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)],
            StdRng::seed_from_u64(seed),
        )
    }

    fn still() -> ParticleConfig {
        ParticleConfig {
            count: 1,
            drift: 0.0,
            ..ParticleConfig::default()
        }
    }

    #[test]
    fn test_seed_fills_pool_once() {
        let mut p = pool(ParticleConfig::default(), 1);
        assert!(!p.is_seeded());
        p.seed(Vec2::new(40.0, 20.0), VIEW);
        assert_eq!(p.particles().len(), ParticleConfig::default().count);
        let before = p.particles().to_vec();
        p.seed(Vec2::new(10.0, 10.0), VIEW);
        assert_eq!(p.particles(), &before[..]);
    }

    #[test]
    fn test_spawn_near_anchor_and_inside_viewport() {
        let cfg = ParticleConfig::default();
        let mut p = pool(cfg, 2);
        p.seed(Vec2::new(40.0, 20.0), VIEW);
        for part in p.particles() {
            assert!((part.x - 40.0).abs() <= cfg.jitter);
            assert!((part.y - 20.0).abs() <= cfg.jitter);
            assert!(part.max_life >= cfg.min_life && part.max_life <= cfg.max_life);
            assert_eq!(part.age, 0);
        }

        // Anchored in a corner: spawns are clamped into the viewport.
        let mut corner = pool(cfg, 3);
        corner.seed(Vec2::new(0.0, 0.0), VIEW);
        assert!(corner.particles().iter().all(|q| VIEW.contains(q.x, q.y)));
    }

    #[test]
    fn test_age_increases_until_respawn() {
        let mut p = pool(ParticleConfig::default(), 4);
        let anchor = Vec2::new(40.0, 20.0);
        p.seed(anchor, VIEW);
        for _ in 0..500 {
            let before = p.particles().to_vec();
            let respawns = p.respawn_count();
            p.tick(anchor, VIEW);
            let mut reset = 0;
            for (old, new) in before.iter().zip(p.particles()) {
                if new.age == 0 {
                    reset += 1;
                } else {
                    assert_eq!(new.age, old.age + 1);
                }
            }
            assert_eq!(p.respawn_count() - respawns, reset);
        }
    }

    #[test]
    fn test_expired_particle_respawns() {
        let mut p = pool(still(), 5);
        let anchor = Vec2::new(40.0, 20.0);
        p.seed(anchor, VIEW);
        {
            let part = &mut p.particles_mut()[0];
            part.max_life = 150;
            part.age = 0;
            part.x = 40.0;
            part.y = 20.0;
        }
        for _ in 0..151 {
            p.tick(anchor, VIEW);
        }
        assert!(p.respawn_count() >= 1);
        let part = p.particles()[0];
        assert!(part.age < 150);
        let cfg = still();
        assert!(part.max_life >= cfg.min_life && part.max_life <= cfg.max_life);
    }

    #[test]
    fn test_escaped_particle_respawns_at_current_anchor() {
        let mut p = pool(still(), 6);
        p.seed(Vec2::new(40.0, 20.0), VIEW);
        {
            let part = &mut p.particles_mut()[0];
            part.vx = 500.0;
        }
        let moved = Vec2::new(10.0, 10.0);
        p.tick(moved, VIEW);
        let part = p.particles()[0];
        assert_eq!(part.age, 0);
        assert!((part.x - moved.x).abs() <= still().jitter);
        assert!((part.y - moved.y).abs() <= still().jitter);
    }

    #[test]
    fn test_unusable_spread_is_ignored() {
        let anchor = Vec2::new(40.0, 20.0);
        for (jitter, drift) in [
            (f32::NAN, 0.25),
            (3.0, f32::INFINITY),
            (f32::NEG_INFINITY, f32::NAN),
            (f32::MAX, -f32::MAX),
        ] {
            let mut p = pool(
                ParticleConfig {
                    jitter,
                    drift,
                    ..ParticleConfig::default()
                },
                10,
            );
            p.seed(anchor, VIEW);
            for _ in 0..50 {
                p.tick(anchor, VIEW);
            }
            for part in p.particles() {
                assert!(part.x.is_finite() && part.y.is_finite());
                assert!(part.vx.is_finite() && part.vy.is_finite());
                assert!(VIEW.contains(part.x, part.y));
            }
        }
    }

    #[test]
    fn test_pool_size_is_capped() {
        let mut p = pool(
            ParticleConfig {
                count: usize::MAX,
                ..ParticleConfig::default()
            },
            11,
        );
        p.seed(Vec2::new(40.0, 20.0), VIEW);
        assert_eq!(p.particles().len(), MAX_PARTICLES);
    }

    #[test]
    fn test_alpha_fades_in_and_out() {
        let p = pool(ParticleConfig::default(), 7);
        let mut part = Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            age: 0,
            max_life: 100,
            color: Rgb::WHITE,
        };
        assert_eq!(p.alpha(&part), 0.0);
        part.age = 4;
        assert!((p.alpha(&part) - 0.5 * 0.96).abs() < 1e-6);
        part.age = 50;
        assert!((p.alpha(&part) - 0.5).abs() < 1e-6);
        part.age = 100;
        assert_eq!(p.alpha(&part), 0.0);
        part.age = 130;
        assert_eq!(p.alpha(&part), 0.0);
    }

    #[test]
    fn test_same_seed_same_pool() {
        let anchor = Vec2::new(30.0, 15.0);
        let mut a = pool(ParticleConfig::default(), 42);
        let mut b = pool(ParticleConfig::default(), 42);
        a.seed(anchor, VIEW);
        b.seed(anchor, VIEW);
        for _ in 0..200 {
            a.tick(anchor, VIEW);
            b.tick(anchor, VIEW);
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_draw_is_dither_gated() {
        let mut p = pool(ParticleConfig::default(), 8);
        let anchor = Vec2::new(40.0, 20.0);
        p.seed(anchor, VIEW);
        let dither = DitherMatrix::bayer(8);
        let mut surface = RecordingSurface::new();
        // Freshly spawned particles have zero alpha.
        assert_eq!(p.draw(&mut surface, &dither, 4.0), 0);

        for _ in 0..20 {
            p.tick(anchor, VIEW);
        }
        let expected = p
            .particles()
            .iter()
            .filter(|q| dither.should_draw(q.x.round() as i32, q.y.round() as i32, p.alpha(q)))
            .count();
        surface.clear();
        assert_eq!(p.draw(&mut surface, &dither, 4.0), expected);
        assert_eq!(surface.ops().len(), expected);
        for op in surface.ops() {
            let r = op.rect();
            assert_eq!(r.width, 4.0);
            assert_eq!(r.x % 4.0, 0.0);
        }
    }
}
