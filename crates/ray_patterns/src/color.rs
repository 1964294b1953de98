//! Colors with filter/transmit channels and gamma curves.
use std::ops::{Add, AddAssign, Div, Mul};

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Weights used to reduce an RGB triple to a single brightness value.
pub const GREYSCALE_WEIGHTS: DVec3 = DVec3::new(0.297, 0.589, 0.114);

/// RGB color plus filter and transmit channels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransColor {
    pub rgb: DVec3,
    pub filter: f64,
    pub transmit: f64,
}

impl TransColor {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Opaque color from RGB components.
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            rgb: DVec3::new(red, green, blue),
            filter: 0.0,
            transmit: 0.0,
        }
    }

    pub const fn rgbft(red: f64, green: f64, blue: f64, filter: f64, transmit: f64) -> Self {
        Self {
            rgb: DVec3::new(red, green, blue),
            filter,
            transmit,
        }
    }

    pub fn grey(level: f64) -> Self {
        Self::rgb(level, level, level)
    }

    /// Resets every channel to zero.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn greyscale(&self) -> f64 {
        self.rgb.dot(GREYSCALE_WEIGHTS)
    }

    /// Returns `true` when light passes through this color.
    pub fn is_transparent(&self, epsilon: f64) -> bool {
        self.filter.abs() > epsilon || self.transmit.abs() > epsilon
    }

    fn map_channels(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            rgb: DVec3::new(f(self.rgb.x), f(self.rgb.y), f(self.rgb.z)),
            filter: f(self.filter),
            transmit: f(self.transmit),
        }
    }
}

impl Add for TransColor {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            rgb: self.rgb + rhs.rgb,
            filter: self.filter + rhs.filter,
            transmit: self.transmit + rhs.transmit,
        }
    }
}

impl AddAssign for TransColor {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for TransColor {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            rgb: self.rgb * rhs,
            filter: self.filter * rhs,
            transmit: self.transmit * rhs,
        }
    }
}

impl Div<f64> for TransColor {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self {
            rgb: self.rgb / rhs,
            filter: self.filter / rhs,
            transmit: self.transmit / rhs,
        }
    }
}

/// Transfer function between linear light and an encoded color space.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GammaCurve {
    #[default]
    Neutral,
    /// Pure power law; `Power(2.2)` decodes with `x^2.2`.
    Power(f64),
    Srgb,
}

impl GammaCurve {
    pub fn is_neutral(&self) -> bool {
        match *self {
            GammaCurve::Neutral => true,
            GammaCurve::Power(g) => (g - 1.0).abs() < 1e-6,
            GammaCurve::Srgb => false,
        }
    }

    /// Linear to encoded.
    pub fn encode(&self, x: f64) -> f64 {
        match *self {
            GammaCurve::Neutral => x,
            GammaCurve::Power(g) => signed(x, |v| v.powf(1.0 / g)),
            GammaCurve::Srgb => signed(x, |v| {
                if v <= 0.003_130_8 {
                    v * 12.92
                } else {
                    1.055 * v.powf(1.0 / 2.4) - 0.055
                }
            }),
        }
    }

    /// Encoded to linear.
    pub fn decode(&self, x: f64) -> f64 {
        match *self {
            GammaCurve::Neutral => x,
            GammaCurve::Power(g) => signed(x, |v| v.powf(g)),
            GammaCurve::Srgb => signed(x, |v| {
                if v <= 0.040_45 {
                    v / 12.92
                } else {
                    ((v + 0.055) / 1.055).powf(2.4)
                }
            }),
        }
    }

    pub fn encode_color(&self, c: TransColor) -> TransColor {
        if self.is_neutral() {
            return c;
        }
        c.map_channels(|v| self.encode(v))
    }

    pub fn decode_color(&self, c: TransColor) -> TransColor {
        if self.is_neutral() {
            return c;
        }
        c.map_channels(|v| self.decode(v))
    }

    pub fn encode_rgb(&self, rgb: DVec3) -> DVec3 {
        DVec3::new(self.encode(rgb.x), self.encode(rgb.y), self.encode(rgb.z))
    }

    pub fn decode_rgb(&self, rgb: DVec3) -> DVec3 {
        DVec3::new(self.decode(rgb.x), self.decode(rgb.y), self.decode(rgb.z))
    }
}

// Odd extension so negative channel values survive a round trip.
fn signed(x: f64, f: impl Fn(f64) -> f64) -> f64 {
    if x < 0.0 {
        -f(-x)
    } else {
        f(x)
    }
}
