//! Gamma-aware blending of two colors.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::{GammaCurve, TransColor};
use crate::error::{Error, Result};

const BRIGHTNESS_EPSILON: f64 = 1.0e-10;

/// How two colors selected by a blend map are mixed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Decode both colors from working gamma, mix in linear light, re-encode.
    Linear,
    /// Mix RGB in the blend gamma space; filter and transmit always mix linearly.
    Gamma,
    /// Mix linearly, then rescale RGB to the brightness of a blend-gamma mix.
    LinearBrightness,
    /// Mix the stored values as they are.
    #[default]
    Default,
}

impl TryFrom<u8> for BlendMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(BlendMode::Linear),
            2 => Ok(BlendMode::Gamma),
            3 => Ok(BlendMode::LinearBrightness),
            0 | 4 => Ok(BlendMode::Default),
            other => Err(Error::InvalidConfig(format!("unknown blend mode {other}"))),
        }
    }
}

/// Mixes `c1 * w1 + c2 * w2` according to `mode`.
pub fn blend_colors(
    mode: BlendMode,
    working_gamma: GammaCurve,
    blend_gamma: GammaCurve,
    c1: TransColor,
    w1: f64,
    c2: TransColor,
    w2: f64,
) -> TransColor {
    match mode {
        BlendMode::Linear => linear(working_gamma, c1, w1, c2, w2),
        BlendMode::Gamma => {
            if blend_gamma.is_neutral() {
                return c1 * w1 + c2 * w2;
            }
            let trans = linear(working_gamma, c1, w1, c2, w2);
            let rgb = blend_gamma.decode_rgb(
                blend_gamma.encode_rgb(c1.rgb) * w1 + blend_gamma.encode_rgb(c2.rgb) * w2,
            );
            TransColor { rgb, ..trans }
        }
        BlendMode::LinearBrightness => {
            if blend_gamma.is_neutral() && working_gamma.is_neutral() {
                return c1 * w1 + c2 * w2;
            }
            let target = blend_gamma.decode(
                blend_gamma.encode(c1.greyscale()) * w1 + blend_gamma.encode(c2.greyscale()) * w2,
            );
            let mut result = linear(working_gamma, c1, w1, c2, w2);
            let actual = result.greyscale();
            if actual.abs() >= BRIGHTNESS_EPSILON {
                result.rgb *= target / actual;
            }
            result
        }
        BlendMode::Default => c1 * w1 + c2 * w2,
    }
}

fn linear(working_gamma: GammaCurve, c1: TransColor, w1: f64, c2: TransColor, w2: f64) -> TransColor {
    if working_gamma.is_neutral() {
        return c1 * w1 + c2 * w2;
    }
    working_gamma.encode_color(working_gamma.decode_color(c1) * w1 + working_gamma.decode_color(c2) * w2)
}
