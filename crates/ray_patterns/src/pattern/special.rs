//! Extension points for patterns backed by data the host application owns.
//!
//! - [`ScalarFunction`]: user function of the evaluation point (function pattern).
//! - [`Solid`]: inside/outside test of a scene object (object pattern).
//! - [`ImageSource`]: 2-D color raster (image pattern and image pigment).
//!
//! [`TexelGrid`] is a plain in-memory [`ImageSource`].
use std::fmt;

use glam::{DVec2, DVec3};
use tracing::warn;

use crate::color::TransColor;
use crate::error::{Error, Result};

/// Scalar function of a point.
pub trait ScalarFunction: Send + Sync {
    fn evaluate(&self, p: DVec3) -> f64;
}

impl<F> ScalarFunction for F
where
    F: Fn(DVec3) -> f64 + Send + Sync,
{
    fn evaluate(&self, p: DVec3) -> f64 {
        self(p)
    }
}

/// Closed volume that can be tested for containment.
pub trait Solid: Send + Sync {
    fn contains(&self, p: DVec3) -> bool;
}

/// Color raster sampled in normalized `[0, 1)²` coordinates.
///
/// `v` grows upwards; implementors flip it if their rows are stored top-down.
pub trait ImageSource: Send + Sync {
    fn size(&self) -> (u32, u32);

    fn sample(&self, uv: DVec2) -> TransColor;

    /// `false` if any texel has non-zero filter or transmit.
    fn is_opaque(&self) -> bool {
        true
    }
}

impl fmt::Debug for dyn ScalarFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScalarFunction")
    }
}

impl fmt::Debug for dyn Solid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Solid")
    }
}

impl fmt::Debug for dyn ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.size();
        write!(f, "ImageSource({w}x{h})")
    }
}

/// Projects `p` onto the unit square of the X-Y plane.
///
/// Repeats the image unless `once` is set, in which case points outside the square
/// map to `None`.
pub fn planar_uv(p: DVec3, once: bool) -> Option<DVec2> {
    let uv = DVec2::new(p.x, p.y);
    if once {
        if uv.x < 0.0 || uv.x >= 1.0 || uv.y < 0.0 || uv.y >= 1.0 {
            return None;
        }
        Some(uv)
    } else {
        Some(uv - uv.floor())
    }
}

/// Samples `source` at `uv`, logging and returning `None` for empty images.
pub(crate) fn sample_image(source: &dyn ImageSource, uv: DVec2) -> Option<TransColor> {
    let (w, h) = source.size();
    if w == 0 || h == 0 {
        warn!("Sampled an empty {}x{} image; no color contributed.", w, h);
        return None;
    }
    Some(source.sample(uv))
}

/// Row-major raster with nearest-texel lookup. Row 0 is the bottom row.
#[derive(Debug, Clone, PartialEq)]
pub struct TexelGrid {
    width: u32,
    height: u32,
    texels: Vec<TransColor>,
    opaque: bool,
}

impl TexelGrid {
    pub fn new(width: u32, height: u32, texels: Vec<TransColor>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig("texel grid must not be empty".into()));
        }
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(Error::InvalidConfig(format!(
                "texel grid {width}x{height} needs {expected} texels, got {}",
                texels.len()
            )));
        }
        let opaque = texels.iter().all(|t| t.filter == 0.0 && t.transmit == 0.0);
        Ok(Self {
            width,
            height,
            texels,
            opaque,
        })
    }

    pub fn texel(&self, x: u32, y: u32) -> TransColor {
        self.texels[y as usize * self.width as usize + x as usize]
    }
}

impl ImageSource for TexelGrid {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn sample(&self, uv: DVec2) -> TransColor {
        let x = ((uv.x * f64::from(self.width)) as u32).min(self.width - 1);
        let y = ((uv.y * f64::from(self.height)) as u32).min(self.height - 1);
        self.texel(x, y)
    }

    fn is_opaque(&self) -> bool {
        self.opaque
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_scalar_functions() {
        let f = |p: DVec3| p.x + p.y;
        assert_eq!(ScalarFunction::evaluate(&f, DVec3::new(1.0, 2.0, 0.0)), 3.0);
    }

    #[test]
    fn planar_uv_repeats_unless_once() {
        let uv = planar_uv(DVec3::new(1.25, -0.5, 9.0), false).unwrap();
        assert!((uv - DVec2::new(0.25, 0.5)).length() < 1e-12);
        assert!(planar_uv(DVec3::new(1.25, 0.5, 0.0), true).is_none());
        assert!(planar_uv(DVec3::new(0.25, 0.5, 0.0), true).is_some());
    }

    #[test]
    fn texel_grid_uses_nearest_texel() {
        let grid = TexelGrid::new(
            2,
            2,
            vec![
                TransColor::rgb(1.0, 0.0, 0.0),
                TransColor::rgb(0.0, 1.0, 0.0),
                TransColor::rgb(0.0, 0.0, 1.0),
                TransColor::rgbft(1.0, 1.0, 1.0, 0.0, 0.5),
            ],
        )
        .unwrap();
        assert_eq!(grid.sample(DVec2::new(0.1, 0.1)), TransColor::rgb(1.0, 0.0, 0.0));
        assert_eq!(grid.sample(DVec2::new(0.9, 0.1)), TransColor::rgb(0.0, 1.0, 0.0));
        assert_eq!(grid.sample(DVec2::new(0.1, 0.99)), TransColor::rgb(0.0, 0.0, 1.0));
        assert!(!grid.is_opaque());
    }

    #[test]
    fn texel_grid_rejects_wrong_sizes() {
        assert!(TexelGrid::new(2, 2, vec![TransColor::BLACK; 3]).is_err());
        assert!(TexelGrid::new(0, 2, Vec::new()).is_err());
    }
}
