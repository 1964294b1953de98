//! Render-wide settings consumed by pattern and pigment evaluation.
use crate::color::GammaCurve;
use crate::error::{Error, Result};
use crate::noise::NoiseGenerator;

/// Per-thread memory budget for cached crackle cells, in bytes.
pub const DEFAULT_CRACKLE_CACHE_BUDGET: usize = 30 * 1024 * 1024;

/// Number of wave sources shared by the ripples and waves patterns.
pub const DEFAULT_NUMBER_OF_WAVES: usize = 10;

/// Settings shared by every render thread.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Gamma of the space colors are stored and blended in.
    pub working_gamma: GammaCurve,
    /// Noise generator used by patterns that do not pick one themselves.
    pub noise_generator: NoiseGenerator,
    /// Upper bound for the crackle cache of one thread, in bytes.
    pub crackle_cache_budget: usize,
    /// Number of wave sources for ripples and waves.
    pub number_of_waves: usize,
    /// Return pigment preview colors instead of evaluating patterns.
    pub quick_color: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            working_gamma: GammaCurve::Neutral,
            noise_generator: NoiseGenerator::RangeCorrected,
            crackle_cache_budget: DEFAULT_CRACKLE_CACHE_BUDGET,
            number_of_waves: DEFAULT_NUMBER_OF_WAVES,
            quick_color: false,
        }
    }
}

impl RenderSettings {
    /// Creates settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working gamma.
    pub fn with_working_gamma(mut self, working_gamma: GammaCurve) -> Self {
        self.working_gamma = working_gamma;
        self
    }

    /// Sets the scene-wide noise generator.
    pub fn with_noise_generator(mut self, noise_generator: NoiseGenerator) -> Self {
        self.noise_generator = noise_generator;
        self
    }

    /// Sets the crackle cache budget in bytes.
    pub fn with_crackle_cache_budget(mut self, bytes: usize) -> Self {
        self.crackle_cache_budget = bytes;
        self
    }

    /// Sets the number of wave sources.
    pub fn with_number_of_waves(mut self, number_of_waves: usize) -> Self {
        self.number_of_waves = number_of_waves;
        self
    }

    /// Enables or disables quick colors.
    pub fn with_quick_color(mut self, quick_color: bool) -> Self {
        self.quick_color = quick_color;
        self
    }

    /// Validates the settings, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.noise_generator == NoiseGenerator::Default {
            return Err(Error::InvalidConfig(
                "scene noise generator must name a concrete generator".into(),
            ));
        }
        if self.number_of_waves == 0 {
            return Err(Error::InvalidConfig("number_of_waves must be > 0".into()));
        }
        if let GammaCurve::Power(g) = self.working_gamma {
            if !(g > 0.0 && g.is_finite()) {
                return Err(Error::InvalidConfig(
                    "working gamma must be finite and > 0".into(),
                ));
            }
        }
        Ok(())
    }
}
