#![forbid(unsafe_code)]
//! ray_patterns: procedural pattern evaluation for ray tracers.
//!
//! Modules:
//! - blend: blend maps (value to data tables) and gamma-aware color blending
//! - pattern: continuous, discrete, fractal, crackle, tiling and special patterns
//! - pigment: pattern + blend map to color, incl. average, UV-mapped and image pigments
//! - density: voxel density files with nearest, trilinear and tricubic sampling
//! - noise / warp: lattice noise, turbulence and coordinate warps
//! - context: per-render-thread state (crackle cache, statistics, settings)
//!
//! For examples, see the `ray_patterns_examples` crate.
pub mod blend;
pub mod color;
pub mod config;
pub mod context;
pub mod density;
pub mod error;
pub mod noise;
pub mod pattern;
pub mod pigment;
pub mod warp;

/// Convenient re-exports for common types. Import with `use ray_patterns::prelude::*;`.
pub mod prelude {
    pub use crate::blend::{
        blend_colors, Blend, BlendMap, BlendMapEntry, BlendMapKind, BlendMode, BlendSearch,
    };
    pub use crate::color::{GammaCurve, TransColor};
    pub use crate::config::RenderSettings;
    pub use crate::context::{HitContext, RenderStats, ThreadContext};
    pub use crate::density::{DensityFile, DensityInterpolation};
    pub use crate::error::{Error, Result};
    pub use crate::noise::NoiseGenerator;
    pub use crate::pattern::crackle::{CrackleCache, CrackleCellKey, CrackleParams};
    pub use crate::pattern::fractal::{ExteriorMode, FractalFamily, FractalParams, InteriorMode};
    pub use crate::pattern::special::{ImageSource, ScalarFunction, Solid, TexelGrid};
    pub use crate::pattern::tiling::TilingKind;
    pub use crate::pattern::wave::{shape_wave, WaveShaping, WaveType};
    pub use crate::pattern::{Pattern, PatternKind};
    pub use crate::pigment::image::ImageMap;
    pub use crate::pigment::{evaluate_density, Pigment, PigmentKind, PigmentMap, PigmentRef};
    pub use crate::warp::{RepeatWarp, TurbulenceWarp, Warp};
}
