//! Tilings of the X-Z plane.
//!
//! Each classifier folds the point into one fundamental tile by mirroring and returns a
//! value that reaches 1 on the tile border.
use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const SQRT_3: f64 = 1.732_050_807_568_877_2;
const HALF_SQRT_3: f64 = SQRT_3 / 2.0;

/// Tiling families.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TilingKind {
    /// Unit squares.
    Square,
    /// Regular hexagons with unit edges.
    Hexagon,
    /// Equilateral triangles with unit edges.
    Triangle,
    /// Rhombi made of two triangles.
    Lozenge,
}

impl TilingKind {
    pub fn evaluate(self, p: DVec3) -> f64 {
        match self {
            TilingKind::Square => square(p.x, p.z),
            TilingKind::Hexagon => hexagon(p.x, p.z),
            TilingKind::Triangle => triangle(p.x, p.z),
            TilingKind::Lozenge => lozenge(p.x, p.z),
        }
    }
}

#[inline]
fn modulo(v: f64, period: f64) -> f64 {
    v - (v / period).floor() * period
}

fn square(x: f64, z: f64) -> f64 {
    let edge = |v: f64| {
        let f = v.abs().fract();
        (2.0 * (f - 0.5)).abs()
    };
    edge(x).max(edge(z))
}

fn hexagon(x: f64, z: f64) -> f64 {
    let mut x = modulo(x + 0.5, 3.0);
    let mut z = modulo(z, SQRT_3);
    if z > HALF_SQRT_3 {
        z = SQRT_3 - z;
    }
    if x > 1.5 {
        x -= 1.5;
        z = HALF_SQRT_3 - z;
    }
    if SQRT_3 * x + z < HALF_SQRT_3 {
        x = 0.5 - x;
        z = HALF_SQRT_3 - z;
    }
    if x > 1.0 {
        x = 2.0 - x;
    }
    let d1 = 1.0 - z / HALF_SQRT_3;
    let d2 = 1.0 - (SQRT_3 * x + z - HALF_SQRT_3) / SQRT_3;
    d1.max(d2).clamp(0.0, 1.0)
}

/// Odd triangles map to `[0.5, 1]`, even ones to `[0, 0.5]`.
fn triangle(x: f64, z: f64) -> f64 {
    let mut x = x - x.floor();
    let mut z = modulo(z, SQRT_3);
    let mut delta = 0.0;
    if z > HALF_SQRT_3 {
        z = SQRT_3 - z;
        delta = 1.0 - delta;
    }
    if x > 0.5 {
        x = 1.0 - x;
    }
    if x != 0.0 {
        if z / x > SQRT_3 {
            z = HALF_SQRT_3 - z;
            x = 0.5 - x;
            delta = 1.0 - delta;
        }
    } else {
        z = HALF_SQRT_3 - z;
        x = 0.5;
    }
    let d1 = 1.0 - z * 2.0 * SQRT_3;
    let d2 = 1.0 - (SQRT_3 * x - z) * SQRT_3;
    delta / 2.0 + 0.5 * d1.max(d2)
}

fn lozenge(x: f64, z: f64) -> f64 {
    let mut x = x - x.floor();
    let mut z = modulo(z, SQRT_3);
    if z > HALF_SQRT_3 {
        z -= HALF_SQRT_3;
        x += 0.5;
    }
    if 2.0 * z > HALF_SQRT_3 {
        z = HALF_SQRT_3 - z;
        x = 1.5 - x;
    }
    if x > 0.75 {
        x -= 1.0;
    }
    if x != 0.0 && z / x > SQRT_3 {
        z = HALF_SQRT_3 - z;
        x = 0.5 - x;
    }
    let d1 = 1.0 - z * 4.0 * SQRT_3 / 3.0;
    let d2 = 1.0 - (SQRT_3 * x - z).abs() * 2.0 * SQRT_3 / 3.0;
    d1.max(d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, z: f64) -> DVec3 {
        DVec3::new(x, 0.0, z)
    }

    #[test]
    fn square_is_zero_at_centers_and_one_on_edges() {
        assert!(TilingKind::Square.evaluate(at(0.5, 0.5)).abs() < 1e-12);
        assert!(TilingKind::Square.evaluate(at(-3.5, 7.5)).abs() < 1e-12);
        assert!((TilingKind::Square.evaluate(at(1.0, 0.5)) - 1.0).abs() < 1e-12);
        assert!((TilingKind::Square.evaluate(at(0.75, 0.5)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn hexagon_border_passes_through_origin() {
        assert!((TilingKind::Hexagon.evaluate(at(0.0, 0.0)) - 1.0).abs() < 1e-9);
        assert!(TilingKind::Hexagon.evaluate(at(1.0, HALF_SQRT_3)) < 1.0);
    }

    #[test]
    fn tilings_are_periodic() {
        let cases = [
            (TilingKind::Square, 1.0, 1.0),
            (TilingKind::Hexagon, 3.0, SQRT_3),
            (TilingKind::Triangle, 1.0, SQRT_3),
            (TilingKind::Lozenge, 1.0, SQRT_3),
        ];
        for (kind, px, pz) in cases {
            for i in 0..25 {
                let x = i as f64 * 0.137 + 0.01;
                let z = i as f64 * 0.071 + 0.02;
                let a = kind.evaluate(at(x, z));
                let b = kind.evaluate(at(x + 2.0 * px, z - pz));
                assert!((a - b).abs() < 1e-9, "{kind:?} at ({x}, {z})");
            }
        }
    }

    #[test]
    fn square_and_hexagon_stay_in_unit_range() {
        for kind in [TilingKind::Square, TilingKind::Hexagon] {
            for i in 0..200 {
                let x = (i as f64 * 0.377).sin() * 9.0;
                let z = (i as f64 * 0.213).cos() * 9.0;
                let v = kind.evaluate(at(x, z));
                assert!((-1e-9..=1.0 + 1e-9).contains(&v), "{kind:?}: {v}");
            }
        }
    }

    #[test]
    fn triangle_halves_separate_orientations() {
        // An upward triangle center and its downward neighbor land in different halves.
        let up = TilingKind::Triangle.evaluate(at(0.5, HALF_SQRT_3 / 3.0));
        let down = TilingKind::Triangle.evaluate(at(0.5, SQRT_3 - HALF_SQRT_3 / 3.0));
        assert!(up <= 0.5 + 1e-9);
        assert!(down >= 0.5 - 1e-9);
    }
}
