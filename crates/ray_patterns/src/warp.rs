//! Coordinate warps applied to a point before a pattern is evaluated.
use glam::{DAffine3, DVec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::noise::dturbulence;

/// Warped coordinates are clamped to this magnitude.
pub const COORDINATE_LIMIT: f64 = 1.0e17;

/// Fractal displacement of the evaluation point.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbulenceWarp {
    /// Per-axis displacement strength.
    pub turbulence: DVec3,
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lambda: f64,
    /// Amplitude multiplier between octaves.
    pub omega: f64,
}

impl Default for TurbulenceWarp {
    fn default() -> Self {
        Self {
            turbulence: DVec3::ZERO,
            octaves: 6,
            lambda: 2.0,
            omega: 0.5,
        }
    }
}

impl TurbulenceWarp {
    pub fn new(turbulence: DVec3) -> Self {
        Self {
            turbulence,
            ..Default::default()
        }
    }

    pub fn with_octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves;
        self
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.octaves == 0 {
            return Err(Error::InvalidConfig("turbulence octaves must be > 0".into()));
        }
        Ok(())
    }

    fn warp_point(&self, p: DVec3) -> DVec3 {
        p + dturbulence(p, self) * self.turbulence
    }
}

/// Periodic copy of a slab of space along one axis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatWarp {
    /// 0 = x, 1 = y, 2 = z.
    pub axis: usize,
    pub width: f64,
    /// Translation added per repeated block.
    pub offset: DVec3,
    /// Per-axis scale applied to odd blocks; -1 mirrors.
    pub flip: DVec3,
}

impl RepeatWarp {
    pub fn new(axis: usize, width: f64) -> Self {
        Self {
            axis,
            width,
            offset: DVec3::ZERO,
            flip: DVec3::ONE,
        }
    }

    pub fn with_offset(mut self, offset: DVec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_flip(mut self, flip: DVec3) -> Self {
        self.flip = flip;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.axis > 2 {
            return Err(Error::InvalidConfig("repeat warp axis must be 0, 1 or 2".into()));
        }
        if self.width <= 0.0 {
            return Err(Error::InvalidConfig("repeat warp width must be > 0".into()));
        }
        Ok(())
    }

    fn warp_point(&self, mut p: DVec3) -> DVec3 {
        let block = (p[self.axis] / self.width).floor();
        p[self.axis] -= block * self.width;
        if (block as i64) & 1 != 0 {
            p *= self.flip;
            if self.flip[self.axis] < 0.0 {
                p[self.axis] += self.width;
            }
        }
        p + block * self.offset
    }
}

/// A single coordinate warp.
#[derive(Debug, Clone, PartialEq)]
pub enum Warp {
    Turbulence(TurbulenceWarp),
    /// Moves the point through the inverse of the stored transform.
    Transform(DAffine3),
    Repeat(RepeatWarp),
}

impl Warp {
    pub fn validate(&self) -> Result<()> {
        match self {
            Warp::Turbulence(t) => t.validate(),
            Warp::Transform(m) => {
                if m.matrix3.determinant().abs() < f64::EPSILON {
                    return Err(Error::InvalidConfig("transform warp is not invertible".into()));
                }
                Ok(())
            }
            Warp::Repeat(r) => r.validate(),
        }
    }

    pub fn warp_point(&self, p: DVec3) -> DVec3 {
        match self {
            Warp::Turbulence(t) => t.warp_point(p),
            Warp::Transform(m) => m.inverse().transform_point3(p),
            Warp::Repeat(r) => r.warp_point(p),
        }
    }
}

/// Applies `warps` in order, skipping the warp at `skip`, then clamps the result.
pub fn warp_point(warps: &[Warp], p: DVec3, skip: Option<usize>) -> DVec3 {
    let warped = warps
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .fold(p, |acc, (_, w)| w.warp_point(acc));
    warped.clamp(DVec3::splat(-COORDINATE_LIMIT), DVec3::splat(COORDINATE_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_warp_applies_the_inverse() {
        let w = Warp::Transform(DAffine3::from_translation(DVec3::new(1.0, 0.0, 0.0)));
        assert_eq!(w.warp_point(DVec3::new(1.5, 2.0, 3.0)), DVec3::new(0.5, 2.0, 3.0));
    }

    #[test]
    fn warps_apply_in_order_and_clamp() {
        let warps = [
            Warp::Transform(DAffine3::from_scale(DVec3::splat(0.5))),
            Warp::Transform(DAffine3::from_translation(DVec3::new(-1.0, 0.0, 0.0))),
        ];
        // scale back by 2 first, then shift by +1
        assert_eq!(warp_point(&warps, DVec3::new(1.0, 1.0, 1.0), None), DVec3::new(3.0, 2.0, 2.0));
        assert_eq!(warp_point(&warps, DVec3::ONE, Some(0)), DVec3::new(2.0, 1.0, 1.0));

        let huge = warp_point(&[], DVec3::new(1e20, -1e20, 0.0), None);
        assert_eq!(huge, DVec3::new(COORDINATE_LIMIT, -COORDINATE_LIMIT, 0.0));
    }

    #[test]
    fn repeat_warp_mirrors_odd_blocks() {
        let r = RepeatWarp::new(0, 2.0).with_flip(DVec3::new(-1.0, 1.0, 1.0));
        let even = r.warp_point(DVec3::new(4.5, 1.0, 0.0));
        assert_eq!(even, DVec3::new(0.5, 1.0, 0.0));
        let odd = r.warp_point(DVec3::new(2.5, 1.0, 0.0));
        assert_eq!(odd, DVec3::new(1.5, 1.0, 0.0));
    }

    #[test]
    fn zero_turbulence_leaves_points_in_place() {
        let w = Warp::Turbulence(TurbulenceWarp::default());
        let p = DVec3::new(0.1, 0.2, 0.3);
        assert_eq!(w.warp_point(p), p);
    }

    #[test]
    fn invalid_warps_are_rejected() {
        assert!(Warp::Repeat(RepeatWarp::new(3, 1.0)).validate().is_err());
        assert!(Warp::Repeat(RepeatWarp::new(1, 0.0)).validate().is_err());
        assert!(Warp::Turbulence(TurbulenceWarp::default().with_octaves(0))
            .validate()
            .is_err());
        assert!(Warp::Transform(DAffine3::from_scale(DVec3::ZERO))
            .validate()
            .is_err());
    }
}
