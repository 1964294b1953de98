//! Raw evaluators of the continuous noise and geometric patterns.
//!
//! Each function returns the unshaped pattern value; the caller applies the wave
//! shaping afterwards.
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec3;

use crate::noise::{
    cycloidal, dturbulence, hash3, noise, pattern_rand, triangle_wave, turbulence, NoiseGenerator,
    EPSILON,
};
use crate::warp::TurbulenceWarp;

const INV_SQRT_3_4: f64 = 1.154_700_538_379_251_7;

/// Linear fall-off from 1 at distance 0 to 0 at distance 1.
#[inline]
fn clip_density(r: f64) -> f64 {
    if r < 0.0 {
        1.0
    } else if r > 1.0 {
        0.0
    } else {
        1.0 - r
    }
}

/// Keeps values up to 1 and wraps larger ones.
#[inline]
fn wrap_above_one(v: f64) -> f64 {
    if v > 1.0 {
        v % 1.0
    } else {
        v
    }
}

/// Octave contribution of one noise sample for generator-dependent fractal sums.
#[inline]
fn clipped_octave(p: DVec3, generator: NoiseGenerator) -> f64 {
    match generator {
        NoiseGenerator::Default | NoiseGenerator::Original => noise(p, generator),
        _ => (noise(p, generator) * 2.0 - 0.5).clamp(0.0, 1.0),
    }
}

/// Angle around the Z axis in `[0, 2π)`, 0 on the axis itself.
#[inline]
fn spiral_angle(x: f64, y: f64, rad: f64) -> f64 {
    if rad == 0.0 {
        0.0
    } else if x < 0.0 {
        3.0 * FRAC_PI_2 - (y / rad).asin()
    } else {
        FRAC_PI_2 + (y / rad).asin()
    }
}

fn turbulence_value(p: DVec3, turb: Option<&TurbulenceWarp>, generator: NoiseGenerator) -> f64 {
    turb.map_or(0.0, |t| t.turbulence.x * turbulence(p, t, generator))
}

pub(crate) fn agate(
    p: DVec3,
    turb: Option<&TurbulenceWarp>,
    turbulence_scale: f64,
    generator: NoiseGenerator,
) -> f64 {
    let fallback = TurbulenceWarp::default();
    let turb = turb.unwrap_or(&fallback);
    let turb_val = turbulence_scale * turbulence(p, turb, generator);
    let n = 0.5 * (cycloidal(1.3 * turb_val + 1.1 * p.z) + 1.0);
    if n < 0.0 {
        0.0
    } else {
        n.min(1.0).powf(0.77)
    }
}

pub(crate) fn boxed(p: DVec3) -> f64 {
    clip_density(p.abs().max_element())
}

pub(crate) fn cylindrical(p: DVec3) -> f64 {
    clip_density((p.x * p.x + p.z * p.z).sqrt())
}

pub(crate) fn planar(p: DVec3) -> f64 {
    clip_density(p.y.abs())
}

pub(crate) fn spherical(p: DVec3) -> f64 {
    clip_density(p.length())
}

/// One random value per unit cell.
pub(crate) fn cells(p: DVec3) -> f64 {
    let cell = (p + EPSILON).floor().as_ivec3();
    pattern_rand(hash3(cell.x, cell.y, cell.z)).min(1.0)
}

pub(crate) fn dents(p: DVec3, generator: NoiseGenerator) -> f64 {
    noise(p, generator).powi(3)
}

pub(crate) fn function(v: f64) -> f64 {
    wrap_above_one(v)
}

pub(crate) fn gradient(p: DVec3, direction: DVec3) -> f64 {
    wrap_above_one(p.dot(direction))
}

pub(crate) fn granite(p: DVec3, generator: NoiseGenerator) -> f64 {
    let base = p * 4.0;
    let mut value = 0.0;
    let mut freq = 1.0;
    for _ in 0..6 {
        let sample = noise(base * freq, generator);
        let temp = match generator {
            NoiseGenerator::Default | NoiseGenerator::Original => (0.5 - sample).abs(),
            _ => (1.0 - 2.0 * sample).abs().min(0.5),
        };
        value += temp / freq;
        freq *= 2.0;
    }
    value
}

pub(crate) fn leopard(p: DVec3) -> f64 {
    let v = (p.x.sin() + p.y.sin() + p.z.sin()) / 3.0;
    v * v
}

pub(crate) fn marble(p: DVec3, turb: Option<&TurbulenceWarp>, generator: NoiseGenerator) -> f64 {
    p.x + turbulence_value(p, turb, generator)
}

pub(crate) fn onion(p: DVec3) -> f64 {
    p.length() % 1.0
}

fn quilt_cubic(t: f64, p1: f64, p2: f64) -> f64 {
    let it = 1.0 - t;
    let it2 = it * it;
    let t2 = t * t;
    (t * t2 + 3.0 * t * it2 * p1 + 3.0 * t2 * it * p2) * INV_SQRT_3_4
}

pub(crate) fn quilted(p: DVec3, control0: f64, control1: f64) -> f64 {
    let value = p - p.floor() - 0.5;
    let t = quilt_cubic(value.length(), control0, control1);
    let v = value * t;
    (v.x.abs() + v.y.abs() + v.z.abs()) / 3.0
}

pub(crate) fn radial(p: DVec3) -> f64 {
    if p.x.abs() < 0.001 && p.z.abs() < 0.001 {
        0.25
    } else {
        0.25 + (p.x.atan2(p.z) + PI) / TAU
    }
}

/// Concentric ripples around every wave source.
pub(crate) fn ripples(p: DVec3, sources: &[DVec3], frequency: f64, phase: f64) -> f64 {
    if sources.is_empty() {
        return 0.5;
    }
    let scalar: f64 = sources
        .iter()
        .map(|source| {
            let mut length = (p - *source).length();
            if length == 0.0 {
                length = 1.0;
            }
            cycloidal(length * frequency + phase)
        })
        .sum();
    0.5 * (1.0 + scalar / sources.len() as f64)
}

/// Like [`ripples`], but every source oscillates at its own relative frequency.
pub(crate) fn waves(
    p: DVec3,
    sources: &[DVec3],
    frequencies: &[f64],
    frequency: f64,
    phase: f64,
) -> f64 {
    if sources.is_empty() {
        return 0.5;
    }
    let scalar: f64 = sources
        .iter()
        .zip(frequencies)
        .map(|(source, f)| {
            let mut length = (p - *source).length();
            if length == 0.0 {
                length = 1.0;
            }
            cycloidal(length * frequency * f + phase) / f
        })
        .sum();
    0.2 * (2.5 + scalar / sources.len() as f64)
}

pub(crate) fn spiral1(
    p: DVec3,
    arms: i32,
    turb: Option<&TurbulenceWarp>,
    generator: NoiseGenerator,
) -> f64 {
    let turb_val = turbulence_value(p, turb, generator);
    let rad = (p.x * p.x + p.y * p.y).sqrt();
    let phi = spiral_angle(p.x, p.y, rad);
    p.z + rad + f64::from(arms) * phi / TAU + turb_val
}

pub(crate) fn spiral2(
    p: DVec3,
    arms: i32,
    turb: Option<&TurbulenceWarp>,
    generator: NoiseGenerator,
) -> f64 {
    let turb_val = turbulence_value(p, turb, generator);
    let rad = (p.x * p.x + p.y * p.y).sqrt();
    let phi = spiral_angle(p.x, p.y, rad);
    triangle_wave(rad) + triangle_wave(p.z + rad + f64::from(arms) * phi / TAU + turb_val)
}

/// Distance from the Z axis, disturbed by vector turbulence.
pub(crate) fn wood(p: DVec3, turb: Option<&TurbulenceWarp>) -> f64 {
    let (dx, dy) = match turb {
        Some(t) => {
            let d = dturbulence(p, t);
            (
                cycloidal((p.x + d.x) * t.turbulence.x),
                cycloidal((p.y + d.y) * t.turbulence.y),
            )
        }
        None => (0.0, 0.0),
    };
    (dx + p.x).hypot(dy + p.y)
}

pub(crate) fn wrinkles(p: DVec3, generator: NoiseGenerator) -> f64 {
    let mut value = clipped_octave(p, generator);
    let mut lambda = 2.0;
    let mut omega = 0.5;
    for _ in 1..10 {
        value += omega * clipped_octave(p * lambda, generator);
        lambda *= 2.0;
        omega *= 0.5;
    }
    value / 2.0
}

/// Angle between the surface normal and the incoming ray, `0` facing along it and
/// `1` facing against it.
pub(crate) fn angle_of_incidence(normal: DVec3, ray_direction: DVec3) -> f64 {
    let cos = normal
        .normalize_or_zero()
        .dot(ray_direction.normalize_or_zero())
        .clamp(-1.0, 1.0);
    cos.acos() / PI
}
