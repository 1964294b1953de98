//! Wave shaping shared by every continuous pattern.
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::noise::{cycloidal, triangle_wave};

/// Folding modulus; slightly above 1 so a raw value of exactly 1 is not sent back to 0.
const FOLD_MODULUS: f64 = 1.00001;

/// Reshaping applied to a folded pattern value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaveType {
    #[default]
    Ramp,
    Sine,
    Triangle,
    Scallop,
    Cubic,
    Poly,
}

impl FromStr for WaveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ramp" | "ramp_wave" => Ok(WaveType::Ramp),
            "sine" | "sine_wave" => Ok(WaveType::Sine),
            "triangle" | "triangle_wave" => Ok(WaveType::Triangle),
            "scallop" | "scallop_wave" => Ok(WaveType::Scallop),
            "cubic" | "cubic_wave" => Ok(WaveType::Cubic),
            "poly" | "poly_wave" => Ok(WaveType::Poly),
            other => Err(Error::UnknownWaveType(other.to_owned())),
        }
    }
}

impl TryFrom<u8> for WaveType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WaveType::Ramp),
            1 => Ok(WaveType::Sine),
            2 => Ok(WaveType::Triangle),
            3 => Ok(WaveType::Scallop),
            4 => Ok(WaveType::Cubic),
            5 => Ok(WaveType::Poly),
            other => Err(Error::UnknownWaveType(other.to_string())),
        }
    }
}

/// Frequency, phase and wave form of a continuous pattern.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveShaping {
    pub wave: WaveType,
    pub frequency: f64,
    pub phase: f64,
    /// Exponent of [`WaveType::Poly`].
    pub exponent: f64,
}

impl Default for WaveShaping {
    fn default() -> Self {
        Self {
            wave: WaveType::Ramp,
            frequency: 1.0,
            phase: 0.0,
            exponent: 1.0,
        }
    }
}

/// Scales, offsets and folds `raw` into `[0, 1)`, then applies the wave form.
///
/// A zero frequency skips the scaling and folding; negative values are still folded.
pub fn shape_wave(raw: f64, shaping: &WaveShaping) -> f64 {
    let mut v = raw;
    if shaping.frequency != 0.0 {
        v = (v * shaping.frequency + shaping.phase) % FOLD_MODULUS;
    }
    if v < 0.0 {
        v -= v.floor();
    }

    match shaping.wave {
        WaveType::Ramp => v,
        WaveType::Sine => (1.0 + cycloidal(v)) * 0.5,
        WaveType::Triangle => triangle_wave(v),
        WaveType::Scallop => cycloidal(v * 0.5).abs(),
        WaveType::Cubic => v * v * (3.0 - 2.0 * v),
        WaveType::Poly => v.powf(shaping.exponent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shaping(wave: WaveType) -> WaveShaping {
        WaveShaping {
            wave,
            ..Default::default()
        }
    }

    #[test]
    fn ramp_is_identity_in_unit_range() {
        let s = shaping(WaveType::Ramp);
        for &raw in &[0.0, 0.1, 0.5, 0.75, 0.999] {
            assert!((shape_wave(raw, &s) - raw).abs() < 1e-12);
        }
    }

    #[test]
    fn negative_values_fold_into_unit_range() {
        let s = shaping(WaveType::Ramp);
        let v = shape_wave(-0.25, &s);
        assert!((v - 0.75).abs() < 1e-12);
        let v = shape_wave(-0.6, &s);
        assert!((v - 0.4).abs() < 1e-12);
    }

    #[test]
    fn zero_frequency_skips_scaling() {
        let s = WaveShaping {
            frequency: 0.0,
            phase: 0.5,
            ..Default::default()
        };
        assert_eq!(shape_wave(0.3, &s), 0.3);
        assert!((shape_wave(-1.25, &s) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn frequency_and_phase_are_applied_before_folding() {
        let s = WaveShaping {
            frequency: 2.0,
            phase: 0.1,
            ..Default::default()
        };
        assert!((shape_wave(0.2, &s) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn wave_forms_match_their_formulas() {
        let v = 0.3;
        assert!((shape_wave(v, &shaping(WaveType::Sine)) - (1.0 + (v * std::f64::consts::TAU).sin()) / 2.0).abs() < 1e-12);
        assert!((shape_wave(v, &shaping(WaveType::Triangle)) - 0.6).abs() < 1e-12);
        assert!((shape_wave(v, &shaping(WaveType::Scallop)) - (v * std::f64::consts::PI).sin().abs()).abs() < 1e-12);
        assert!((shape_wave(v, &shaping(WaveType::Cubic)) - v * v * (3.0 - 2.0 * v)).abs() < 1e-12);
        let poly = WaveShaping {
            wave: WaveType::Poly,
            exponent: 2.0,
            ..Default::default()
        };
        assert!((shape_wave(v, &poly) - 0.09).abs() < 1e-12);
    }

    #[test]
    fn unknown_wave_tags_are_errors() {
        assert_eq!("sine".parse::<WaveType>().ok(), Some(WaveType::Sine));
        assert_eq!(WaveType::try_from(5).ok(), Some(WaveType::Poly));
        assert!(matches!("zigzag".parse::<WaveType>(), Err(Error::UnknownWaveType(_))));
        assert!(matches!(WaveType::try_from(6), Err(Error::UnknownWaveType(_))));
    }
}
