//! Escape-time fractals: Mandelbrot and Julia sets of integer degree, and the two
//! magnetic families.
//!
//! The iterate `z = a + bi` starts at the query point (x, y). Mandelbrot sets add the
//! starting point as the constant, Julia sets a fixed seed. Iteration stops once
//! `|z|^2 > 4`; the result then depends on an exterior mode, otherwise on an interior
//! mode evaluated with the last iterate.
//!
//! Magnet sets iterate a rational map instead. Their Mandelbrot forms start at zero with
//! the query point as the constant. They stop when `|z|^2 > 10000` or when `z` lands on
//! the attracting fixed point 1.
use std::sync::LazyLock;

use glam::{DVec2, DVec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Highest supported exponent.
pub const MAX_EXPONENT: u32 = 33;

const ESCAPE_RADIUS_SQUARED: f64 = 4.0;
const MAGNET_ESCAPE_SQUARED: f64 = 10_000.0;
const MAGNET_FIXED_POINT_SQUARED: f64 = 1.0 / 10_000.0;

/// Signed binomial coefficients; row `n` starts at `n (n + 1) / 2`.
///
/// Coefficient `k` carries the sign of the real or imaginary part of `i^k`, so the
/// even entries of row `n` expand `Re((a + bi)^n)` and the odd entries `Im((a + bi)^n)`.
static BINOMIAL: LazyLock<Vec<f64>> = LazyLock::new(|| {
    let rows = MAX_EXPONENT as usize + 1;
    let mut table = Vec::with_capacity(rows * (rows + 1) / 2);
    let mut row: Vec<f64> = vec![1.0];
    for n in 0..rows {
        if n > 0 {
            let mut next = vec![1.0; n + 1];
            for k in 1..n {
                next[k] = row[k - 1] + row[k];
            }
            row = next;
        }
        table.extend(row.iter().enumerate().map(|(k, &c)| if k & 2 != 0 { -c } else { c }));
    }
    table
});

fn binomial_row(n: u32) -> &'static [f64] {
    let start = (n as usize * (n as usize + 1)) / 2;
    &BINOMIAL[start..start + n as usize + 1]
}

/// Which set is drawn.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FractalFamily {
    /// `z -> z^n + p`.
    Mandel { exponent: u32 },
    /// `z -> z^n + seed`.
    Julia { exponent: u32, seed: DVec2 },
    /// `z -> ((z^2 + c - 1) / (2z + c - 2))^2` with `c = p`, starting at zero.
    Magnet1Mandel,
    /// First magnet map with `c = seed`, starting at the query point.
    Magnet1Julia { seed: DVec2 },
    /// `z -> ((z^3 + 3(c-1)z + (c-1)(c-2)) / (3z^2 + 3(c-2)z + (c-1)(c-2) + 1))^2`
    /// with `c = p`, starting at zero.
    Magnet2Mandel,
    /// Second magnet map with `c = seed`, starting at the query point.
    Magnet2Julia { seed: DVec2 },
}

impl FractalFamily {
    /// Degree of the update polynomial; magnet maps have none.
    pub fn exponent(&self) -> Option<u32> {
        match *self {
            FractalFamily::Mandel { exponent } | FractalFamily::Julia { exponent, .. } => {
                Some(exponent)
            }
            _ => None,
        }
    }
}

/// Value produced for points that escape.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExteriorMode {
    Constant,
    /// Iteration count divided by the iteration limit.
    #[default]
    IterationRatio,
    Real,
    Imaginary,
    RealSquared,
    ImaginarySquared,
    Modulus,
    /// `(iterations mod factor) / factor`.
    Cycle,
    /// `(iterations mod (1 + factor)) / factor`.
    CycleInclusive,
}

/// Value produced for points that never escape.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteriorMode {
    #[default]
    Constant,
    /// Square root of the smallest squared modulus seen.
    MinModulus,
    Real,
    Imaginary,
    RealSquared,
    ImaginarySquared,
    ModulusSquared,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    pub family: FractalFamily,
    pub max_iterations: u32,
    pub exterior: (ExteriorMode, f64),
    pub interior: (InteriorMode, f64),
}

impl FractalParams {
    pub fn mandel(exponent: u32, max_iterations: u32) -> Self {
        Self {
            family: FractalFamily::Mandel { exponent },
            max_iterations,
            exterior: (ExteriorMode::IterationRatio, 1.0),
            interior: (InteriorMode::Constant, 1.0),
        }
    }

    pub fn julia(exponent: u32, seed: DVec2, max_iterations: u32) -> Self {
        Self {
            family: FractalFamily::Julia { exponent, seed },
            ..Self::mandel(exponent, max_iterations)
        }
    }

    pub fn magnet(family: FractalFamily, max_iterations: u32) -> Self {
        Self {
            family,
            ..Self::mandel(2, max_iterations)
        }
    }

    pub fn with_exterior(mut self, mode: ExteriorMode, factor: f64) -> Self {
        self.exterior = (mode, factor);
        self
    }

    pub fn with_interior(mut self, mode: InteriorMode, factor: f64) -> Self {
        self.interior = (mode, factor);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "fractal max_iterations must be > 0".into(),
            ));
        }
        if let Some(exponent) = self.family.exponent() {
            if !(2..=MAX_EXPONENT).contains(&exponent) {
                return Err(Error::InvalidConfig(format!(
                    "fractal exponent must be in 2..={MAX_EXPONENT}, got {exponent}"
                )));
            }
        }
        if matches!(self.exterior.0, ExteriorMode::Cycle | ExteriorMode::CycleInclusive)
            && self.exterior.1 < 1.0
        {
            return Err(Error::InvalidConfig(
                "cyclic exterior modes need a factor >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Runs the iteration for the x/y coordinates of `p`.
    pub fn evaluate(&self, p: DVec3) -> f64 {
        let point = DVec2::new(p.x, p.y);
        match self.family {
            FractalFamily::Mandel { exponent } => self.escape_time(exponent, point, point),
            FractalFamily::Julia { exponent, seed } => self.escape_time(exponent, point, seed),
            FractalFamily::Magnet1Mandel => {
                self.magnet_escape_time(magnet1_step, DVec2::ZERO, point, MAGNET_ESCAPE_SQUARED)
            }
            FractalFamily::Magnet1Julia { seed } => {
                self.magnet_escape_time(magnet1_step, point, seed, point.length_squared())
            }
            FractalFamily::Magnet2Mandel => {
                self.magnet_escape_time(magnet2_step, DVec2::ZERO, point, MAGNET_ESCAPE_SQUARED)
            }
            FractalFamily::Magnet2Julia { seed } => {
                self.magnet_escape_time(magnet2_step, point, seed, point.length_squared())
            }
        }
    }

    fn escape_time(&self, exponent: u32, start: DVec2, c: DVec2) -> f64 {
        let step: fn(DVec2, u32) -> DVec2 = match exponent {
            2 => |z, _| DVec2::new(z.x * z.x - z.y * z.y, 2.0 * z.x * z.y),
            3 => |z, _| {
                let (a2, b2) = (z.x * z.x, z.y * z.y);
                DVec2::new(a2 * z.x - 3.0 * z.x * b2, 3.0 * a2 * z.y - b2 * z.y)
            },
            4 => |z, _| {
                let (a2, b2) = (z.x * z.x, z.y * z.y);
                DVec2::new(
                    a2 * a2 - 6.0 * a2 * b2 + b2 * b2,
                    4.0 * (a2 * z.x * z.y - z.x * b2 * z.y),
                )
            },
            _ => power,
        };

        let mut z = start;
        let mut min_dist2 = z.length_squared();
        for iteration in 0..self.max_iterations {
            z = step(z, exponent) + c;
            let dist2 = z.length_squared();
            min_dist2 = min_dist2.min(dist2);
            if dist2 > ESCAPE_RADIUS_SQUARED {
                return self.exterior_value(iteration, z);
            }
        }
        self.interior_value(z, min_dist2)
    }

    /// A zero denominator in the map counts as escaping at that iteration.
    fn magnet_escape_time(
        &self,
        step: fn(DVec2, DVec2) -> Option<DVec2>,
        start: DVec2,
        c: DVec2,
        mut min_dist2: f64,
    ) -> f64 {
        let mut z = start;
        for iteration in 0..self.max_iterations {
            let Some(next) = step(z, c) else {
                return self.exterior_value(iteration, z);
            };
            z = next;
            let dist2 = z.length_squared();
            min_dist2 = min_dist2.min(dist2);
            if dist2 > MAGNET_ESCAPE_SQUARED
                || (z - DVec2::X).length_squared() < MAGNET_FIXED_POINT_SQUARED
            {
                return self.exterior_value(iteration, z);
            }
        }
        self.interior_value(z, min_dist2)
    }

    fn exterior_value(&self, iterations: u32, z: DVec2) -> f64 {
        let (mode, factor) = self.exterior;
        match mode {
            ExteriorMode::Constant => factor,
            ExteriorMode::IterationRatio => f64::from(iterations) / f64::from(self.max_iterations),
            ExteriorMode::Real => z.x * factor,
            ExteriorMode::Imaginary => z.y * factor,
            ExteriorMode::RealSquared => z.x * z.x * factor,
            ExteriorMode::ImaginarySquared => z.y * z.y * factor,
            ExteriorMode::Modulus => z.length() * factor,
            ExteriorMode::Cycle => f64::from(iterations % (factor as u32).max(1)) / factor,
            ExteriorMode::CycleInclusive => f64::from(iterations % (1 + factor as u32)) / factor,
        }
    }

    fn interior_value(&self, z: DVec2, min_dist2: f64) -> f64 {
        let (mode, factor) = self.interior;
        match mode {
            InteriorMode::Constant => factor,
            InteriorMode::MinModulus => min_dist2.sqrt() * factor,
            InteriorMode::Real => z.x * factor,
            InteriorMode::Imaginary => z.y * factor,
            InteriorMode::RealSquared => z.x * z.x * factor,
            InteriorMode::ImaginarySquared => z.y * z.y * factor,
            InteriorMode::ModulusSquared => z.length_squared() * factor,
        }
    }
}

fn complex_mul(a: DVec2, b: DVec2) -> DVec2 {
    DVec2::new(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x)
}

fn complex_div(n: DVec2, d: DVec2) -> Option<DVec2> {
    let den = d.length_squared();
    if den == 0.0 {
        return None;
    }
    Some(DVec2::new(n.x * d.x + n.y * d.y, n.y * d.x - n.x * d.y) / den)
}

fn magnet1_step(z: DVec2, c: DVec2) -> Option<DVec2> {
    let numerator = complex_mul(z, z) + c - DVec2::X;
    let denominator = 2.0 * z + c - 2.0 * DVec2::X;
    let q = complex_div(numerator, denominator)?;
    Some(complex_mul(q, q))
}

fn magnet2_step(z: DVec2, c: DVec2) -> Option<DVec2> {
    let c1 = c - DVec2::X;
    let c2 = c - 2.0 * DVec2::X;
    let c1c2 = complex_mul(c1, c2);
    let z2 = complex_mul(z, z);
    let numerator = complex_mul(z2, z) + 3.0 * complex_mul(c1, z) + c1c2;
    let denominator = 3.0 * z2 + 3.0 * complex_mul(c2, z) + c1c2 + DVec2::X;
    let q = complex_div(numerator, denominator)?;
    Some(complex_mul(q, q))
}

/// `(a + bi)^n` through the binomial expansion.
fn power(z: DVec2, n: u32) -> DVec2 {
    let coeff = binomial_row(n);
    let mut re = z.x.powi(n as i32);
    for k in (2..=n).step_by(2) {
        re += coeff[k as usize] * z.x.powi((n - k) as i32) * z.y.powi(k as i32);
    }
    let mut im = 0.0;
    for k in (1..=n).step_by(2) {
        im += coeff[k as usize] * z.x.powi((n - k) as i32) * z.y.powi(k as i32);
    }
    DVec2::new(re, im)
}
