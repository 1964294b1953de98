//! Planar image mapping shared by the image pigment and the image pattern.
use std::sync::Arc;

use glam::DVec3;

use crate::color::TransColor;
use crate::pattern::special::{planar_uv, sample_image, ImageSource};

/// An image projected onto the X-Y plane, covering `[0, 1)²`.
#[derive(Debug, Clone)]
pub struct ImageMap {
    pub source: Arc<dyn ImageSource>,
    /// Show the image once instead of tiling it.
    pub once: bool,
    /// As a pattern, read the transmit channel instead of the brightness.
    pub use_alpha: bool,
}

impl ImageMap {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self {
            source,
            once: false,
            use_alpha: false,
        }
    }

    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn with_use_alpha(mut self, use_alpha: bool) -> Self {
        self.use_alpha = use_alpha;
        self
    }

    /// Color at `p`, `None` outside a once-only image.
    pub fn color(&self, p: DVec3) -> Option<TransColor> {
        planar_uv(p, self.once).and_then(|uv| sample_image(self.source.as_ref(), uv))
    }

    /// Pattern value at `p` in `[0, 1]`, 0 outside a once-only image.
    ///
    /// With `use_alpha`, opaque images fall back to the red channel.
    pub fn value(&self, p: DVec3) -> f64 {
        let Some(color) = self.color(p) else {
            return 0.0;
        };
        let value = if self.use_alpha {
            if self.source.is_opaque() {
                color.rgb.x
            } else {
                color.transmit
            }
        } else {
            color.greyscale()
        };
        value.clamp(0.0, 1.0)
    }

    /// Whether the map can let light through.
    pub fn has_filter(&self) -> bool {
        self.once || !self.source.is_opaque()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::special::TexelGrid;

    fn grid() -> Arc<dyn ImageSource> {
        Arc::new(
            TexelGrid::new(
                2,
                1,
                vec![
                    TransColor::rgbft(1.0, 0.0, 0.0, 0.0, 0.25),
                    TransColor::rgb(0.0, 0.0, 0.0),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn tiled_maps_repeat_the_image() {
        let map = ImageMap::new(grid());
        let a = map.color(DVec3::new(0.25, 0.5, 0.0)).unwrap();
        let b = map.color(DVec3::new(3.25, -4.5, 7.0)).unwrap();
        assert_eq!(a, b);
        assert!(map.has_filter());
    }

    #[test]
    fn once_maps_are_empty_outside_the_unit_square() {
        let map = ImageMap::new(grid()).with_once(true);
        assert!(map.color(DVec3::new(1.25, 0.5, 0.0)).is_none());
        assert_eq!(map.value(DVec3::new(1.25, 0.5, 0.0)), 0.0);
    }

    #[test]
    fn pattern_values_use_brightness_or_alpha() {
        let p = DVec3::new(0.25, 0.5, 0.0);
        let grey = ImageMap::new(grid());
        assert!((grey.value(p) - 0.297).abs() < 1e-12);
        let alpha = ImageMap::new(grid()).with_use_alpha(true);
        assert!((alpha.value(p) - 0.25).abs() < 1e-12);
    }
}
