//! Per-render-thread evaluation state.
//!
//! A [`ThreadContext`] is owned by exactly one render thread. It carries the crackle
//! cache, statistics counters and the render-wide settings the patterns consult.
//! Pattern and pigment definitions stay immutable and are shared between threads.
use glam::{DVec2, DVec3};

use crate::color::GammaCurve;
use crate::config::RenderSettings;
use crate::error::Result;
use crate::noise::{wave_sources, NoiseGenerator};
use crate::pattern::crackle::CrackleCache;

/// Surface data of the intersection being shaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitContext {
    /// Surface normal at the hit point.
    pub normal: DVec3,
    /// Direction of the ray that produced the hit.
    pub ray_direction: DVec3,
    /// Surface UV coordinates, if the object provides them.
    pub uv: Option<DVec2>,
}

impl HitContext {
    pub fn new(normal: DVec3, ray_direction: DVec3) -> Self {
        Self {
            normal,
            ray_direction,
            uv: None,
        }
    }

    pub fn with_uv(mut self, uv: DVec2) -> Self {
        self.uv = Some(uv);
        self
    }
}

/// Counters collected while evaluating patterns on one thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Crackle cache lookups.
    pub crackle_tests: u64,
    /// Crackle cache lookups that found an entry.
    pub crackle_hits: u64,
    /// Crackle cells computed without being cached because the budget was exhausted.
    pub crackle_transient: u64,
}

impl RenderStats {
    /// Adds the counters of another thread.
    pub fn merge(&mut self, other: &RenderStats) {
        self.crackle_tests += other.crackle_tests;
        self.crackle_hits += other.crackle_hits;
        self.crackle_transient += other.crackle_transient;
    }
}

/// Mutable state private to one render thread.
#[derive(Debug)]
pub struct ThreadContext {
    settings: RenderSettings,
    pub crackle_cache: CrackleCache,
    pub stats: RenderStats,
    wave_sources: Vec<DVec3>,
    wave_frequencies: Vec<f64>,
}

impl ThreadContext {
    /// Creates a context after validating `settings`.
    pub fn new(settings: RenderSettings) -> Result<Self> {
        settings.validate()?;
        let (wave_sources, wave_frequencies) = wave_sources(settings.number_of_waves);
        Ok(Self {
            crackle_cache: CrackleCache::new(settings.crackle_cache_budget),
            stats: RenderStats::default(),
            wave_sources,
            wave_frequencies,
            settings,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Scene-wide noise generator used when a pattern does not choose one.
    pub fn noise_generator(&self) -> NoiseGenerator {
        self.settings.noise_generator
    }

    pub fn working_gamma(&self) -> GammaCurve {
        self.settings.working_gamma
    }

    /// Wave source directions for ripples and waves.
    pub fn wave_sources(&self) -> &[DVec3] {
        &self.wave_sources
    }

    /// Relative frequency of each wave source.
    pub fn wave_frequencies(&self) -> &[f64] {
        &self.wave_frequencies
    }
}

impl Default for ThreadContext {
    fn default() -> Self {
        let settings = RenderSettings::default();
        let (wave_sources, wave_frequencies) = wave_sources(settings.number_of_waves);
        Self {
            crackle_cache: CrackleCache::new(settings.crackle_cache_budget),
            stats: RenderStats::default(),
            wave_sources,
            wave_frequencies,
            settings,
        }
    }
}
