//! Procedural voxel bird shape.
//!
//! The bird is described in a local coordinate space centered on the body,
//! `y` pointing down and the beak toward negative `x`. Every part is an
//! ellipse distance (1.0 on the nominal boundary), unions take the minimum,
//! and regions are tested in priority order with the first match winning:
//!
//! 1. eye glint
//! 2. eye
//! 3. beak
//! 4. body (torso, head, belly)
//! 5. near wing
//! 6. far wing
//! 7. tail (only behind the body)

use dithervox_core::{Rgb, mix};

use crate::palette::Palette;

/// Distance at which body, limb and tail regions stop matching.
pub const ACCEPT: f32 = 1.30;

/// Distance at which the eye and its glint stop matching.
const FEATURE_ACCEPT: f32 = 1.0;

/// Piecewise-linear falloff: solid core, soft rim, nothing past [`ACCEPT`].
const FALLOFF: [(f32, f32); 5] = [
    (0.55, 0.98),
    (0.80, 0.80),
    (1.00, 0.40),
    (1.15, 0.12),
    (1.30, 0.0),
];

/// Intensity of a point at normalized distance `d` from a part.
pub fn edge_intensity(d: f32) -> f32 {
    if d.is_nan() {
        return 0.0;
    }
    let (d0, i0) = FALLOFF[0];
    if d <= d0 {
        return i0;
    }
    for pair in FALLOFF.windows(2) {
        let (a, ia) = pair[0];
        let (b, ib) = pair[1];
        if d <= b {
            return (ia + (ib - ia) * (d - a) / (b - a)).clamp(ib, ia);
        }
    }
    0.0
}

/// Axis-aligned ellipse distance, `1.0` on the boundary.
#[inline]
pub fn ellipse_distance(x: f32, y: f32, cx: f32, cy: f32, rx: f32, ry: f32) -> f32 {
    let u = (x - cx) / rx;
    let v = (y - cy) / ry;
    u * u + v * v
}

/// Ellipse distance for an ellipse whose major axis points along `angle`.
#[inline]
pub fn rotated_ellipse_distance(
    x: f32,
    y: f32,
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
    angle: f32,
) -> f32 {
    let (s, c) = angle.sin_cos();
    let dx = x - cx;
    let dy = y - cy;
    let u = (dx * c + dy * s) / rx;
    let v = (-dx * s + dy * c) / ry;
    u * u + v * v
}

/// A color and coverage returned for a sampled point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub color: Rgb,
    /// Coverage in `[0, 1]`, fed to the dither gate.
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
struct Ellipse {
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
}

impl Ellipse {
    const fn new(cx: f32, cy: f32, rx: f32, ry: f32) -> Self {
        Self { cx, cy, rx, ry }
    }

    #[inline]
    fn distance(&self, x: f32, y: f32) -> f32 {
        ellipse_distance(x, y, self.cx, self.cy, self.rx, self.ry)
    }
}

const GLINT: Ellipse = Ellipse::new(-0.56, -0.31, 0.035, 0.035);
const EYE: Ellipse = Ellipse::new(-0.53, -0.27, 0.08, 0.085);
const TORSO: Ellipse = Ellipse::new(0.05, 0.04, 0.56, 0.38);
const HEAD: Ellipse = Ellipse::new(-0.45, -0.20, 0.30, 0.28);
const BELLY: Ellipse = Ellipse::new(-0.02, 0.18, 0.42, 0.24);

const BEAK_BASE: (f32, f32) = (-0.70, -0.20);
const BEAK_TIP: (f32, f32) = (-1.02, -0.13);
const BEAK_ROOT_WIDTH: f32 = 0.085;
const BEAK_TIP_WIDTH: f32 = 0.012;

/// Tail feathers are only considered behind this local `x`.
const TAIL_START_X: f32 = 0.35;
const TAIL_ROOT: (f32, f32) = (0.52, 0.06);
const TAIL_SPREAD: [f32; 3] = [-0.22, 0.0, 0.22];

/// A two-segment wing hinged at `shoulder`.
#[derive(Debug, Clone, Copy)]
struct WingGeometry {
    shoulder: (f32, f32),
    base_angle: f32,
    sweep: f32,
    arm: f32,
    arm_width: f32,
    hand: f32,
    hand_width: f32,
}

const NEAR_WING: WingGeometry = WingGeometry {
    shoulder: (-0.02, -0.12),
    base_angle: -1.35,
    sweep: 2.2,
    arm: 0.52,
    arm_width: 0.13,
    hand: 0.44,
    hand_width: 0.09,
};

const FAR_WING: WingGeometry = WingGeometry {
    shoulder: (0.10, -0.16),
    base_angle: -1.55,
    sweep: 1.9,
    arm: 0.44,
    arm_width: 0.11,
    hand: 0.40,
    hand_width: 0.08,
};

impl WingGeometry {
    /// Distances to the arm and hand segments at `phase`.
    fn distances(&self, x: f32, y: f32, phase: f32) -> (f32, f32) {
        let angle = self.base_angle + phase * self.sweep;
        let (s, c) = angle.sin_cos();
        let (sx, sy) = self.shoulder;
        let half = self.arm * 0.5;
        let arm = rotated_ellipse_distance(
            x,
            y,
            sx + c * half,
            sy + s * half,
            half * 1.15,
            self.arm_width,
            angle,
        );

        // Primaries lag the arm: bent back on the upstroke, open on the down.
        let hand_angle = angle + 0.45 - phase * 0.6;
        let (hs, hc) = hand_angle.sin_cos();
        let ex = sx + c * self.arm;
        let ey = sy + s * self.arm;
        let hand_half = self.hand * 0.5;
        let hand = rotated_ellipse_distance(
            x,
            y,
            ex + hc * hand_half,
            ey + hs * hand_half,
            hand_half * 1.15,
            self.hand_width,
            hand_angle,
        );
        (arm, hand)
    }
}

/// Resolved palette entries used by the sampler.
#[derive(Debug, Clone, Copy)]
struct BirdColors {
    ink: Rgb,
    glint: Rgb,
    crown: Rgb,
    sky: Rgb,
    deep: Rgb,
    night: Rgb,
    belly: Rgb,
    belly_shade: Rgb,
    beak: Rgb,
    beak_tip: Rgb,
}

impl BirdColors {
    fn from_palette(p: &Palette) -> Self {
        let get = |name: &str, fallback: Rgb| p.named(name).unwrap_or(fallback);
        Self {
            ink: get("ink", Rgb::BLACK),
            glint: get("glint", Rgb::WHITE),
            crown: get("crown", Rgb::new(122, 204, 255)),
            sky: get("sky", Rgb::new(72, 152, 240)),
            deep: get("deep", Rgb::new(34, 74, 172)),
            night: get("night", Rgb::new(22, 40, 112)),
            belly: get("belly", Rgb::new(250, 236, 205)),
            belly_shade: get("belly_shade", Rgb::new(226, 190, 150)),
            beak: get("beak", Rgb::new(255, 178, 62)),
            beak_tip: get("beak_tip", Rgb::new(218, 108, 40)),
        }
    }
}

/// Point sampler for the voxel bird.
#[derive(Debug, Clone)]
pub struct BirdSampler {
    colors: BirdColors,
}

impl Default for BirdSampler {
    fn default() -> Self {
        Self::new(&Palette::bird())
    }
}

impl BirdSampler {
    /// Largest distance from the local origin at which any part can match,
    /// over every phase.
    pub const MAX_EXTENT: f32 = 1.45;

    pub fn new(palette: &Palette) -> Self {
        Self {
            colors: BirdColors::from_palette(palette),
        }
    }

    /// Sample the bird at local `(x, y)` for wingbeat `phase` in `[0, 1]`.
    pub fn sample(&self, x: f32, y: f32, phase: f32) -> Option<Sample> {
        let phase = if phase.is_nan() {
            0.0
        } else {
            phase.clamp(0.0, 1.0)
        };
        let c = &self.colors;

        if GLINT.distance(x, y) <= FEATURE_ACCEPT {
            return Some(Sample {
                color: c.glint,
                intensity: 1.0,
            });
        }

        if EYE.distance(x, y) <= FEATURE_ACCEPT {
            return Some(Sample {
                color: c.ink,
                intensity: 1.0,
            });
        }

        if let Some(sample) = self.sample_beak(x, y) {
            return Some(sample);
        }

        let torso = TORSO.distance(x, y);
        let head = HEAD.distance(x, y);
        let belly = BELLY.distance(x, y);
        let body = torso.min(head).min(belly);
        if body <= ACCEPT {
            return Some(Sample {
                color: self.body_color(x, y, torso, head, belly),
                intensity: edge_intensity(body),
            });
        }

        let (arm, hand) = NEAR_WING.distances(x, y, phase);
        let wing = arm.min(hand);
        if wing <= ACCEPT {
            let color = if hand < arm {
                mix(c.deep, c.night, 0.3)
            } else {
                mix(c.sky, c.deep, 0.4 + 0.3 * phase)
            };
            return Some(Sample {
                color,
                intensity: edge_intensity(wing),
            });
        }

        let (arm, hand) = FAR_WING.distances(x, y, phase);
        let wing = arm.min(hand);
        if wing <= ACCEPT {
            let color = if hand < arm {
                c.night
            } else {
                mix(c.deep, c.night, 0.5)
            };
            return Some(Sample {
                color,
                intensity: edge_intensity(wing),
            });
        }

        if x > TAIL_START_X {
            let tail = tail_distance(x, y, phase);
            if tail <= ACCEPT {
                let t = ((x - TAIL_ROOT.0) / 0.6).clamp(0.0, 1.0);
                return Some(Sample {
                    color: mix(c.deep, c.night, t),
                    intensity: edge_intensity(tail),
                });
            }
        }

        None
    }

    /// The beak is a tapered segment; `progress` runs from root (0) to tip (1).
    fn sample_beak(&self, x: f32, y: f32) -> Option<Sample> {
        let (bx, by) = BEAK_BASE;
        let ax = BEAK_TIP.0 - bx;
        let ay = BEAK_TIP.1 - by;
        let len = (ax * ax + ay * ay).sqrt();
        let (nx, ny) = (ax / len, ay / len);

        let rx = x - bx;
        let ry = y - by;
        let along = (rx * nx + ry * ny) / len;
        if along < 0.0 {
            return None;
        }
        let progress = along.clamp(0.0, 1.0);
        let across = rx * -ny + ry * nx;
        let half_width = BEAK_ROOT_WIDTH + (BEAK_TIP_WIDTH - BEAK_ROOT_WIDTH) * progress;
        let overshoot = (along - progress) * len;
        let d = (across / half_width).powi(2) + (overshoot / half_width).powi(2);
        if d > ACCEPT {
            return None;
        }
        Some(Sample {
            color: mix(self.colors.beak, self.colors.beak_tip, progress),
            intensity: edge_intensity(d),
        })
    }

    /// Body coloring: belly, head or back depending on the closest sub-part.
    fn body_color(&self, x: f32, y: f32, torso: f32, head: f32, belly: f32) -> Rgb {
        let c = &self.colors;
        if belly <= torso && belly <= head && y > 0.02 {
            let down = ((y - 0.02) / 0.40).clamp(0.0, 1.0);
            let back = ((x + 0.40) / 0.85).clamp(0.0, 1.0);
            let cream = mix(c.belly, c.belly_shade, down);
            // The belly blends into the flank color toward the tail.
            if back > 0.7 {
                mix(cream, c.sky, (back - 0.7) / 0.3 * 0.5)
            } else {
                cream
            }
        } else if head < torso {
            let t = ((y + 0.48) / 0.45).clamp(0.0, 1.0);
            mix(c.crown, c.sky, t)
        } else {
            self.torso_gradient(x, y)
        }
    }

    /// Back color: sky on top fading to deep below and toward the tail.
    fn torso_gradient(&self, x: f32, y: f32) -> Rgb {
        let c = &self.colors;
        let vertical = ((y + 0.42) / 0.84).clamp(0.0, 1.0);
        let horizontal = ((x + 0.75) / 1.36).clamp(0.0, 1.0);
        let back = mix(c.sky, c.deep, vertical);
        mix(back, c.deep, horizontal * 0.35)
    }
}

/// Union of three fanned tail feathers; the fan tilts slightly with `phase`.
fn tail_distance(x: f32, y: f32, phase: f32) -> f32 {
    let base = 0.18 + (phase - 0.5) * 0.16;
    TAIL_SPREAD
        .iter()
        .map(|spread| {
            let angle = base + spread;
            let (s, c) = angle.sin_cos();
            rotated_ellipse_distance(
                x,
                y,
                TAIL_ROOT.0 + c * 0.26,
                TAIL_ROOT.1 + s * 0.26,
                0.30,
                0.07,
                angle,
            )
        })
        .fold(f32::INFINITY, f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Angle that points straight up in local space.
    const UP: f32 = -std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_edge_intensity_knots() {
        assert_eq!(edge_intensity(0.0), 0.98);
        assert_eq!(edge_intensity(0.55), 0.98);
        assert!((edge_intensity(0.80) - 0.80).abs() < 1e-6);
        assert!((edge_intensity(1.00) - 0.40).abs() < 1e-6);
        assert!((edge_intensity(1.15) - 0.12).abs() < 1e-6);
        assert_eq!(edge_intensity(1.30), 0.0);
        assert_eq!(edge_intensity(5.0), 0.0);
        assert_eq!(edge_intensity(f32::NAN), 0.0);
        assert!((edge_intensity(0.9) - 0.60).abs() < 1e-5);
    }

    #[test]
    fn test_rotated_matches_axis_aligned_at_zero() {
        let a = ellipse_distance(0.3, -0.2, 0.1, 0.1, 0.5, 0.25);
        let b = rotated_ellipse_distance(0.3, -0.2, 0.1, 0.1, 0.5, 0.25, 0.0);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_turns_major_axis() {
        // A tall ellipse built by rotating a wide one a quarter turn.
        let wide_tip = rotated_ellipse_distance(0.0, -0.5, 0.0, 0.0, 0.5, 0.1, UP);
        assert!((wide_tip - 1.0).abs() < 1e-5);
        let side = rotated_ellipse_distance(0.5, 0.0, 0.0, 0.0, 0.5, 0.1, UP);
        assert!(side > 20.0);
    }

    #[test]
    fn test_center_is_torso_gradient() {
        let sampler = BirdSampler::default();
        let sample = sampler.sample(0.0, 0.0, 0.0).expect("body center");
        assert_eq!(sample.color, sampler.torso_gradient(0.0, 0.0));
        assert_eq!(sample.intensity, 0.98);
    }

    #[test]
    fn test_far_point_is_empty() {
        let sampler = BirdSampler::default();
        for phase in [0.0, 0.5, 1.0] {
            assert!(sampler.sample(3.0, 3.0, phase).is_none());
            assert!(sampler.sample(-4.0, 0.0, phase).is_none());
            assert!(sampler.sample(0.0, -BirdSampler::MAX_EXTENT * 2.0, phase).is_none());
        }
    }

    #[test]
    fn test_priority_glint_over_eye_over_body() {
        let sampler = BirdSampler::default();
        let glint = sampler.sample(GLINT.cx, GLINT.cy, 0.3).unwrap();
        assert_eq!(glint.color, Rgb::WHITE);
        let eye = sampler.sample(EYE.cx + 0.04, EYE.cy + 0.04, 0.3).unwrap();
        assert_eq!(eye.color, Palette::bird().named("ink").unwrap());
    }

    #[test]
    fn test_beak_colors_progress_to_tip() {
        let sampler = BirdSampler::default();
        let palette = Palette::bird();
        let near_tip = sampler.sample(-0.98, -0.14, 0.0).unwrap();
        let root = sampler.sample(-0.76, -0.19, 0.0).unwrap();
        let tip_color = palette.named("beak_tip").unwrap();
        let dist = |a: Rgb, b: Rgb| (a.r as i32 - b.r as i32).abs() + (a.g as i32 - b.g as i32).abs();
        assert!(dist(near_tip.color, tip_color) < dist(root.color, tip_color));
        // Past the tip there is nothing.
        assert!(sampler.sample(-1.10, -0.11, 0.0).is_none());
    }

    #[test]
    fn test_belly_is_cream() {
        let sampler = BirdSampler::default();
        let palette = Palette::bird();
        let s = sampler.sample(-0.10, 0.30, 0.0).unwrap();
        let belly = palette.named("belly").unwrap();
        let shade = palette.named("belly_shade").unwrap();
        assert!(s.color.r >= shade.r.min(belly.r) && s.color.r <= shade.r.max(belly.r));
    }

    #[test]
    fn test_near_wing_moves_with_phase() {
        let sampler = BirdSampler::default();
        // Elbow of the raised wing at the top of the stroke.
        assert!(sampler.sample(0.094, -0.628, 0.0).is_some());
        assert!(sampler.sample(0.094, -0.628, 1.0).is_none());
    }

    #[test]
    fn test_tail_only_behind_body() {
        let sampler = BirdSampler::default();
        let tail = sampler.sample(0.95, 0.14, 0.5);
        assert!(tail.is_some());
        assert!(tail_distance(0.95, 0.14, 0.5) <= ACCEPT);
    }

    #[test]
    fn test_nan_phase_is_treated_as_zero() {
        let sampler = BirdSampler::default();
        assert_eq!(
            sampler.sample(0.094, -0.628, f32::NAN),
            sampler.sample(0.094, -0.628, 0.0)
        );
    }

    proptest! {
        #[test]
        fn prop_edge_intensity_bounded_and_monotone(a in 0.0f32..3.0, b in 0.0f32..3.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (ilo, ihi) = (edge_intensity(lo), edge_intensity(hi));
            prop_assert!((0.0..=1.0).contains(&ilo));
            prop_assert!((0.0..=1.0).contains(&ihi));
            prop_assert!(ihi <= ilo);
        }

        #[test]
        fn prop_nothing_beyond_max_extent(
            angle in 0.0f32..std::f32::consts::TAU,
            extra in 0.01f32..4.0,
            phase in 0.0f32..=1.0,
        ) {
            let r = BirdSampler::MAX_EXTENT + extra;
            let sampler = BirdSampler::default();
            prop_assert!(sampler.sample(angle.cos() * r, angle.sin() * r, phase).is_none());
        }

        #[test]
        fn prop_sample_intensity_in_range(x in -1.5f32..1.5, y in -1.5f32..1.5, phase in 0.0f32..=1.0) {
            if let Some(s) = BirdSampler::default().sample(x, y, phase) {
                prop_assert!((0.0..=1.0).contains(&s.intensity));
            }
        }
    }
}
