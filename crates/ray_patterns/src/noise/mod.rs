//! Lattice noise, vector noise and fractal turbulence.
//!
//! All functions are pure and deterministic: they read the process-wide tables in
//! [`tables`] and never touch per-thread state.
//!
//! - [`noise`] samples scalar noise in `[0, 1]` with a selectable [`NoiseGenerator`].
//! - [`dnoise`] samples a vector-valued noise used for displacement.
//! - [`turbulence`] and [`dturbulence`] sum octaves of the above.
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::warp::TurbulenceWarp;

pub(crate) mod tables;

use tables::{Lcg, TABLES};

/// Small bias used when flooring lattice coordinates.
pub const EPSILON: f64 = 1.0e-10;

const NOISE_MIN: i32 = -10_000;
const ROLLOVER: f64 = 10_000_000.023_157_213;

/// Selects the noise implementation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoiseGenerator {
    /// Defer to the scene-wide generator.
    #[default]
    Default,
    /// Classic lattice noise; values pile up around 0.5 and rarely reach the ends.
    Original,
    /// Lattice noise stretched to cover `[0, 1]`.
    RangeCorrected,
    /// Gradient noise.
    Perlin,
}

impl NoiseGenerator {
    /// Resolves [`NoiseGenerator::Default`] against the scene-wide choice.
    pub fn or(self, scene: NoiseGenerator) -> NoiseGenerator {
        match self {
            NoiseGenerator::Default => scene,
            other => other,
        }
    }

    fn is_original(self) -> bool {
        matches!(self, NoiseGenerator::Default | NoiseGenerator::Original)
    }

    /// Maps a noise sample into the octave contribution this generator uses.
    ///
    /// The stretched generators are rescaled so fractal sums keep the classic look.
    #[inline]
    pub(crate) fn octave(self, sample: f64) -> f64 {
        if self.is_original() {
            sample
        } else {
            2.0 * sample - 0.5
        }
    }
}

impl TryFrom<u8> for NoiseGenerator {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(NoiseGenerator::Default),
            1 => Ok(NoiseGenerator::Original),
            2 => Ok(NoiseGenerator::RangeCorrected),
            3 => Ok(NoiseGenerator::Perlin),
            other => Err(Error::UnknownNoiseGenerator(other.to_string())),
        }
    }
}

impl FromStr for NoiseGenerator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(NoiseGenerator::Default),
            "original" => Ok(NoiseGenerator::Original),
            "range_corrected" => Ok(NoiseGenerator::RangeCorrected),
            "perlin" => Ok(NoiseGenerator::Perlin),
            other => Err(Error::UnknownNoiseGenerator(other.to_owned())),
        }
    }
}

impl fmt::Display for NoiseGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoiseGenerator::Default => "default",
            NoiseGenerator::Original => "original",
            NoiseGenerator::RangeCorrected => "range_corrected",
            NoiseGenerator::Perlin => "perlin",
        };
        f.write_str(name)
    }
}

/// `sin(2πx)`.
#[inline]
pub fn cycloidal(x: f64) -> f64 {
    (x * TAU).sin()
}

/// Periodic triangle wave with period 1 and range `[0, 1]`.
#[inline]
pub fn triangle_wave(x: f64) -> f64 {
    let offset = if x >= 0.0 {
        x % 1.0
    } else {
        1.0 - (-x % 1.0)
    };
    if offset >= 0.5 {
        2.0 * (1.0 - offset)
    } else {
        2.0 * offset
    }
}

#[inline]
fn scurve(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Value of the pattern random sequence at `seed`, in `[0, 1)`.
#[inline]
pub fn pattern_rand(seed: usize) -> f64 {
    TABLES.pattern_rands[seed % tables::PATTERN_RANDS]
}

/// Hash of an integer lattice cell; each coordinate is folded to 12 bits first.
#[inline]
pub fn hash3(x: i32, y: i32, z: i32) -> usize {
    TABLES.hash3(x, y, z)
}

/// Scalar noise in `[0, 1]`.
pub fn noise(p: DVec3, generator: NoiseGenerator) -> f64 {
    if generator == NoiseGenerator::Perlin {
        let sum = 0.5 * (1.59 * solid_noise(p) + 0.985);
        return sum.clamp(0.0, 1.0);
    }

    let sum = Lattice::new(p).sum();
    if generator == NoiseGenerator::RangeCorrected {
        ((sum + 1.052_42) * 0.489_855_82).clamp(0.0, 1.0)
    } else {
        (sum + 0.5).clamp(0.0, 1.0)
    }
}

/// Vector-valued noise; each component is roughly in `[-0.5, 0.5]`.
pub fn dnoise(p: DVec3) -> DVec3 {
    Lattice::new(p).vector_sum()
}

/// Fractal sum of [`noise`] octaves driven by a turbulence warp's parameters.
pub fn turbulence(p: DVec3, turb: &TurbulenceWarp, generator: NoiseGenerator) -> f64 {
    let mut value = generator.octave(noise(p, generator));
    if !generator.is_original() {
        value = value.clamp(0.0, 1.0);
    }

    let mut l = turb.lambda;
    let mut o = turb.omega;
    for i in 2..=turb.octaves {
        value += o * generator.octave(noise(p * l, generator));
        if i < turb.octaves {
            l *= turb.lambda;
            o *= turb.omega;
        }
    }
    value
}

/// Fractal sum of [`dnoise`] octaves.
pub fn dturbulence(p: DVec3, turb: &TurbulenceWarp) -> DVec3 {
    let mut result = dnoise(p);
    let mut l = turb.lambda;
    let mut o = turb.omega;
    for i in 2..=turb.octaves {
        result += o * dnoise(p * l);
        if i < turb.octaves {
            l *= turb.lambda;
            o *= turb.omega;
        }
    }
    result
}

/// Wave sources and their relative frequencies for the ripples and waves patterns.
pub fn wave_sources(count: usize) -> (Vec<DVec3>, Vec<f64>) {
    let mut sources = Vec::with_capacity(count);
    let mut frequencies = Vec::with_capacity(count);
    let mut lcg = Lcg::new(-560_851_967);
    for i in 0..count {
        let point = dnoise(DVec3::new(i as f64, 0.0, 0.0));
        sources.push(point.normalize_or_zero());
        frequencies.push(f64::from(lcg.next_u15()) * 0.000_030_518_509_476 + 0.01);
    }
    (sources, frequencies)
}

/// Integer lattice cell and fractional offsets of one noise query.
struct Lattice {
    ix: usize,
    iy: usize,
    iz: usize,
    frac: DVec3,
}

impl Lattice {
    fn new(p: DVec3) -> Self {
        let (ix, fx) = Self::axis(p.x);
        let (iy, fy) = Self::axis(p.y);
        let (iz, fz) = Self::axis(p.z);
        Self {
            ix,
            iy,
            iz,
            frac: DVec3::new(fx, fy, fz),
        }
    }

    fn axis(v: f64) -> (usize, f64) {
        let cell = if v >= 0.0 {
            v as i32
        } else {
            (v - (1.0 - EPSILON)) as i32
        };
        let index = (cell.wrapping_sub(NOISE_MIN) & 0xFFF) as usize;
        (index, v - f64::from(cell))
    }

    /// Visits the eight corners with their blend weight and corner-relative offset.
    fn corners(&self, mut f: impl FnMut(usize, f64, DVec3)) {
        let t = &*TABLES;
        let s = DVec3::new(scurve(self.frac.x), scurve(self.frac.y), scurve(self.frac.z));
        let c = DVec3::ONE - s;
        let hashes = [
            t.hash2(self.ix, self.iy),
            t.hash2(self.ix + 1, self.iy),
            t.hash2(self.ix, self.iy + 1),
            t.hash2(self.ix + 1, self.iy + 1),
        ];
        for (dz, wz) in [(0usize, c.z), (1, s.z)] {
            for (corner, &hashed) in hashes.iter().enumerate() {
                let dx = corner & 1;
                let dy = corner >> 1;
                let wx = if dx == 0 { c.x } else { s.x };
                let wy = if dy == 0 { c.y } else { s.y };
                let offset = self.frac - DVec3::new(dx as f64, dy as f64, dz as f64);
                f(t.rtable_index(hashed, self.iz + dz), wx * wy * wz, offset);
            }
        }
    }

    #[inline]
    fn incr(m: usize, s: f64, d: DVec3) -> f64 {
        let r = &TABLES.rtable;
        s * (r[m + 1] + r[m + 2] * d.x + r[m + 4] * d.y + r[m + 6] * d.z)
    }

    fn sum(&self) -> f64 {
        let mut sum = 0.0;
        self.corners(|m, s, d| sum += Self::incr(m, s, d));
        sum
    }

    fn vector_sum(&self) -> DVec3 {
        let mut sum = DVec3::ZERO;
        self.corners(|m, s, d| {
            sum.x += Self::incr(m, s, d);
            sum.y += Self::incr(m + 8, s, d);
            sum.z += Self::incr(m + 16, s, d);
        });
        sum
    }
}

fn solid_setup(v: f64) -> (usize, usize, f64, f64) {
    let t = v + ROLLOVER;
    let floor = t.floor();
    let it = floor as i64;
    let mask = tables::SOLID_ENTRIES as i64 - 1;
    let b0 = (it & mask) as usize;
    let b1 = ((b0 as i64 + 1) & mask) as usize;
    let r0 = t - floor;
    (b0, b1, r0, r0 - 1.0)
}

/// Gradient noise in roughly `[-0.63, 0.63]`.
fn solid_noise(p: DVec3) -> f64 {
    let t = &*TABLES;
    let (bx0, bx1, rx0, rx1) = solid_setup(p.x);
    let (by0, by1, ry0, ry1) = solid_setup(p.y);
    let (bz0, bz1, rz0, rz1) = solid_setup(p.z);

    let i = t.permutation[bx0];
    let j = t.permutation[bx1];
    let b00 = t.permutation[i + by0];
    let b10 = t.permutation[j + by0];
    let b01 = t.permutation[i + by1];
    let b11 = t.permutation[j + by1];

    let sx = scurve(rx0);
    let sy = scurve(ry0);
    let sz = scurve(rz0);

    let at = |index: usize, rx: f64, ry: f64, rz: f64| t.gradients[index].dot(DVec3::new(rx, ry, rz));

    let a = lerp(sx, at(b00 + bz0, rx0, ry0, rz0), at(b10 + bz0, rx1, ry0, rz0));
    let b = lerp(sx, at(b01 + bz0, rx0, ry1, rz0), at(b11 + bz0, rx1, ry1, rz0));
    let c = lerp(sy, a, b);

    let a = lerp(sx, at(b00 + bz1, rx0, ry0, rz1), at(b10 + bz1, rx1, ry0, rz1));
    let b = lerp(sx, at(b01 + bz1, rx0, ry1, rz1), at(b11 + bz1, rx1, ry1, rz1));
    let d = lerp(sy, a, b);

    lerp(sz, c, d)
}
