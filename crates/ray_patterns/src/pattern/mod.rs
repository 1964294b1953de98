//! Patterns: scalar fields evaluated at a point in object space.
//!
//! A [`Pattern`] pairs a [`PatternKind`] with wave shaping, an ordered warp list and an
//! optional noise generator override. Evaluation warps the point, computes the raw
//! value of the kind and, for continuous kinds, folds and reshapes it with
//! [`shape_wave`]. Discrete kinds return an exact label in `0..n` instead, where `n` is
//! [`Pattern::discrete_entry_count`].
//!
//! Patterns are immutable once built and can be shared between render threads; all
//! mutable state lives in the [`ThreadContext`] passed to [`Pattern::evaluate`].
use std::sync::Arc;

use glam::DVec3;

use crate::blend::{BlendMap, BlendMapKind};
use crate::color::TransColor;
use crate::context::{HitContext, ThreadContext};
use crate::density::DensityFile;
use crate::error::{Error, Result};
use crate::noise::NoiseGenerator;
use crate::pigment::image::ImageMap;
use crate::pigment::PigmentRef;
use crate::warp::{warp_point, TurbulenceWarp, Warp};

mod continuous;
pub mod crackle;
mod discrete;
pub mod fractal;
pub mod special;
pub mod tiling;
pub mod wave;

use crackle::CrackleParams;
use fractal::{FractalFamily, FractalParams};
use special::{ScalarFunction, Solid};
use tiling::TilingKind;
pub use wave::{shape_wave, WaveShaping, WaveType};

/// Default brick dimensions.
pub const DEFAULT_BRICK_SIZE: DVec3 = DVec3::new(8.0, 3.0, 4.5);

/// Default mortar width between bricks.
pub const DEFAULT_BRICK_MORTAR: f64 = 0.5;

/// The pattern families.
#[derive(Debug, Clone)]
pub enum PatternKind {
    Agate {
        turbulence_scale: f64,
    },
    /// Noise with its own default color map.
    Bozo,
    Noise,
    Boxed,
    Cells,
    Cylindrical,
    Dents,
    Function(Arc<dyn ScalarFunction>),
    /// Projection onto a direction vector.
    Gradient(DVec3),
    Granite,
    Leopard,
    Marble,
    Onion,
    Planar,
    Quilted {
        control0: f64,
        control1: f64,
    },
    Radial,
    Ripples,
    Spherical,
    Spiral1 {
        arms: i32,
    },
    Spiral2 {
        arms: i32,
    },
    Waves,
    Wood,
    Wrinkles,
    /// Angle between the surface normal and the incoming ray.
    AngleOfIncidence,
    /// Brightness of another pigment.
    Pigment(PigmentRef),
    Image(ImageMap),
    DensityFile(DensityFile),
    Fractal(FractalParams),
    Crackle(CrackleParams),
    Tiling(TilingKind),

    Checker,
    Brick {
        size: DVec3,
        mortar: f64,
    },
    Hexagon,
    Square,
    Triangular,
    Cubic,
    /// 1 inside the solid, 0 outside.
    Object(Arc<dyn Solid>),
    Plain,
}

impl PatternKind {
    /// Brick with the default size and mortar.
    pub fn brick() -> Self {
        PatternKind::Brick {
            size: DEFAULT_BRICK_SIZE,
            mortar: DEFAULT_BRICK_MORTAR,
        }
    }

    /// Agate with unit turbulence scale.
    pub fn agate() -> Self {
        PatternKind::Agate {
            turbulence_scale: 1.0,
        }
    }

    /// Quilted with both control points at 1.
    pub fn quilted() -> Self {
        PatternKind::Quilted {
            control0: 1.0,
            control1: 1.0,
        }
    }

    pub fn is_discrete(&self) -> bool {
        self.discrete_entry_count().is_some()
    }

    /// Number of labels a discrete kind produces.
    pub fn discrete_entry_count(&self) -> Option<usize> {
        match self {
            PatternKind::Checker | PatternKind::Brick { .. } | PatternKind::Object(_) => Some(2),
            PatternKind::Hexagon => Some(3),
            PatternKind::Square => Some(4),
            PatternKind::Triangular | PatternKind::Cubic => Some(6),
            PatternKind::Plain => Some(1),
            _ => None,
        }
    }

    /// Kinds that read the first turbulence warp themselves instead of being displaced
    /// by it.
    pub fn has_special_turbulence(&self) -> bool {
        matches!(
            self,
            PatternKind::Marble | PatternKind::Wood | PatternKind::Plain
        )
    }
}

/// A pattern kind with its shaping, warps and noise settings.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub shaping: WaveShaping,
    /// Applied in order before evaluation.
    pub warps: Vec<Warp>,
    /// [`NoiseGenerator::Default`] defers to the thread context.
    pub noise_generator: NoiseGenerator,
}

impl Pattern {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            kind,
            shaping: WaveShaping::default(),
            warps: Vec::new(),
            noise_generator: NoiseGenerator::Default,
        }
    }

    pub fn with_wave(mut self, wave: WaveType) -> Self {
        self.shaping.wave = wave;
        self
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.shaping.frequency = frequency;
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.shaping.phase = phase;
        self
    }

    /// Exponent of [`WaveType::Poly`].
    pub fn with_exponent(mut self, exponent: f64) -> Self {
        self.shaping.exponent = exponent;
        self
    }

    /// Appends a warp.
    pub fn with_warp(mut self, warp: Warp) -> Self {
        self.warps.push(warp);
        self
    }

    /// Sets the pattern's own turbulence, which is always the first warp.
    ///
    /// Replaces an existing leading turbulence warp, otherwise inserts one in front.
    pub fn with_turbulence(mut self, turbulence: TurbulenceWarp) -> Self {
        match self.warps.first_mut() {
            Some(Warp::Turbulence(t)) => *t = turbulence,
            _ => self.warps.insert(0, Warp::Turbulence(turbulence)),
        }
        self
    }

    pub fn with_noise_generator(mut self, noise_generator: NoiseGenerator) -> Self {
        self.noise_generator = noise_generator;
        self
    }

    pub fn is_discrete(&self) -> bool {
        self.kind.is_discrete()
    }

    pub fn discrete_entry_count(&self) -> Option<usize> {
        self.kind.discrete_entry_count()
    }

    pub fn has_special_turbulence(&self) -> bool {
        self.kind.has_special_turbulence()
    }

    /// The leading turbulence warp, if any.
    pub fn turbulence(&self) -> Option<&TurbulenceWarp> {
        match self.warps.first() {
            Some(Warp::Turbulence(t)) => Some(t),
            _ => None,
        }
    }

    /// Applies the warps, skipping a leading turbulence the kind consumes itself.
    pub fn warp_point(&self, p: DVec3) -> DVec3 {
        let skip = (self.has_special_turbulence() && self.turbulence().is_some()).then_some(0);
        warp_point(&self.warps, p, skip)
    }

    /// Rejects a blend map whose length does not match a discrete kind.
    pub fn check_blend_map(&self, len: usize) -> Result<()> {
        match self.discrete_entry_count() {
            Some(expected) if expected != len => Err(Error::BlendMapEntryCount {
                expected,
                found: len,
            }),
            _ => Ok(()),
        }
    }

    /// Validates the pattern, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        for warp in &self.warps {
            warp.validate()?;
        }
        if !self.shaping.frequency.is_finite() || !self.shaping.phase.is_finite() {
            return Err(Error::InvalidConfig(
                "pattern frequency and phase must be finite".into(),
            ));
        }
        if self.shaping.wave == WaveType::Poly && !self.shaping.exponent.is_finite() {
            return Err(Error::InvalidConfig("poly wave exponent must be finite".into()));
        }
        match &self.kind {
            PatternKind::Fractal(params) => params.validate()?,
            PatternKind::Crackle(params) => params.validate()?,
            PatternKind::Brick { size, mortar } => {
                if size.min_element() <= 0.0 {
                    return Err(Error::InvalidConfig("brick size must be > 0".into()));
                }
                if *mortar < 0.0 {
                    return Err(Error::InvalidConfig("brick mortar must be >= 0".into()));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Evaluates the pattern at `p`, returning a value in `[0, 1]` for continuous kinds
    /// and a label for discrete ones.
    ///
    /// Fails only if a nested pigment fails.
    pub fn evaluate(
        &self,
        p: DVec3,
        hit: Option<&HitContext>,
        ctx: &mut ThreadContext,
    ) -> Result<f64> {
        let tp = self.warp_point(p);
        if let Some(label) = self.discrete_value(tp) {
            return Ok(label);
        }
        let raw = self.raw_value(tp, hit, ctx)?;
        Ok(shape_wave(raw, &self.shaping))
    }

    /// [`Pattern::evaluate`] for a point given as any `mint` compatible type, without
    /// surface information.
    pub fn value_at(
        &self,
        point: impl Into<mint::Point3<f64>>,
        ctx: &mut ThreadContext,
    ) -> Result<f64> {
        self.evaluate(DVec3::from(point.into()), None, ctx)
    }

    fn discrete_value(&self, p: DVec3) -> Option<f64> {
        let label = match &self.kind {
            PatternKind::Checker => discrete::checker(p),
            PatternKind::Brick { size, mortar } => discrete::brick(p, *size, *mortar),
            PatternKind::Hexagon => discrete::hexagon(p),
            PatternKind::Square => discrete::square(p),
            PatternKind::Triangular => discrete::triangular(p),
            PatternKind::Cubic => discrete::cubic(p),
            PatternKind::Object(solid) => {
                if solid.contains(p) {
                    1.0
                } else {
                    0.0
                }
            }
            PatternKind::Plain => 0.0,
            _ => return None,
        };
        Some(label)
    }

    /// Unshaped value of a continuous kind.
    fn raw_value(
        &self,
        p: DVec3,
        hit: Option<&HitContext>,
        ctx: &mut ThreadContext,
    ) -> Result<f64> {
        let generator = self.noise_generator.or(ctx.noise_generator());
        let turb = self.turbulence();
        let value = match &self.kind {
            PatternKind::Agate { turbulence_scale } => {
                continuous::agate(p, turb, *turbulence_scale, generator)
            }
            PatternKind::Bozo | PatternKind::Noise => crate::noise::noise(p, generator),
            PatternKind::Boxed => continuous::boxed(p),
            PatternKind::Cells => continuous::cells(p),
            PatternKind::Cylindrical => continuous::cylindrical(p),
            PatternKind::Dents => continuous::dents(p, generator),
            PatternKind::Function(f) => continuous::function(f.evaluate(p)),
            PatternKind::Gradient(direction) => continuous::gradient(p, *direction),
            PatternKind::Granite => continuous::granite(p, generator),
            PatternKind::Leopard => continuous::leopard(p),
            PatternKind::Marble => continuous::marble(p, turb, generator),
            PatternKind::Onion => continuous::onion(p),
            PatternKind::Planar => continuous::planar(p),
            PatternKind::Quilted { control0, control1 } => {
                continuous::quilted(p, *control0, *control1)
            }
            PatternKind::Radial => continuous::radial(p),
            PatternKind::Ripples => continuous::ripples(
                p,
                ctx.wave_sources(),
                self.shaping.frequency,
                self.shaping.phase,
            ),
            PatternKind::Spherical => continuous::spherical(p),
            PatternKind::Spiral1 { arms } => continuous::spiral1(p, *arms, turb, generator),
            PatternKind::Spiral2 { arms } => continuous::spiral2(p, *arms, turb, generator),
            PatternKind::Waves => continuous::waves(
                p,
                ctx.wave_sources(),
                ctx.wave_frequencies(),
                self.shaping.frequency,
                self.shaping.phase,
            ),
            PatternKind::Wood => continuous::wood(p, turb),
            PatternKind::Wrinkles => continuous::wrinkles(p, generator),
            PatternKind::AngleOfIncidence => match hit {
                Some(hit) => continuous::angle_of_incidence(hit.normal, hit.ray_direction),
                None => 0.0,
            },
            PatternKind::Pigment(pigment) => pigment
                .compute(p, hit, ctx)?
                .map_or(0.0, |color| color.greyscale()),
            PatternKind::Image(map) => map.value(p),
            PatternKind::DensityFile(file) => file.sample(p),
            PatternKind::Fractal(params) => params.evaluate(p),
            PatternKind::Crackle(params) => {
                params.evaluate(p, generator, &mut ctx.crackle_cache, &mut ctx.stats)
            }
            PatternKind::Tiling(kind) => kind.evaluate(p),
            PatternKind::Checker
            | PatternKind::Brick { .. }
            | PatternKind::Hexagon
            | PatternKind::Square
            | PatternKind::Triangular
            | PatternKind::Cubic
            | PatternKind::Object(_)
            | PatternKind::Plain => 0.0,
        };
        Ok(value)
    }

    /// Color map used when a pigment does not provide one.
    pub fn default_color_map(&self) -> Result<BlendMap<TransColor>> {
        default_color_map(&self.kind)
    }
}

const RED: TransColor = TransColor::rgb(1.0, 0.0, 0.0);
const GREEN: TransColor = TransColor::rgb(0.0, 1.0, 0.0);
const BLUE: TransColor = TransColor::rgb(0.0, 0.0, 1.0);
const YELLOW: TransColor = TransColor::rgb(1.0, 1.0, 0.0);
const CYAN: TransColor = TransColor::rgb(0.0, 1.0, 1.0);
const MAGENTA: TransColor = TransColor::rgb(1.0, 0.0, 1.0);

const CUBIC_COLORS: [TransColor; 6] = [RED, GREEN, BLUE, YELLOW, CYAN, MAGENTA];

fn ramp(entries: &[(f64, TransColor)]) -> Result<BlendMap<TransColor>> {
    BlendMap::new(BlendMapKind::Color, entries.iter().copied())
}

fn labels(colors: &[TransColor]) -> Result<BlendMap<TransColor>> {
    BlendMap::discrete(BlendMapKind::Color, colors.iter().copied())
}

fn default_color_map(kind: &PatternKind) -> Result<BlendMap<TransColor>> {
    match kind {
        PatternKind::Agate { .. } => ramp(&[
            (0.0, TransColor::rgb(1.0, 1.0, 1.0)),
            (0.5, TransColor::rgb(0.95, 0.75, 0.5)),
            (0.5, TransColor::rgb(0.9, 0.7, 0.5)),
            (0.6, TransColor::rgb(0.9, 0.7, 0.4)),
            (0.6, TransColor::rgb(1.0, 0.7, 0.4)),
            (1.0, TransColor::rgb(0.6, 0.3, 0.0)),
        ]),
        PatternKind::Bozo => ramp(&[
            (0.4, TransColor::WHITE),
            (0.4, GREEN),
            (0.6, GREEN),
            (0.6, BLUE),
            (0.8, BLUE),
            (0.8, RED),
        ]),
        PatternKind::Brick { .. } => labels(&[
            TransColor::grey(0.5),
            TransColor::rgb(0.6, 0.15, 0.15),
        ]),
        PatternKind::Checker | PatternKind::Object(_) => labels(&[BLUE, GREEN]),
        PatternKind::Cubic | PatternKind::Triangular => labels(&CUBIC_COLORS),
        PatternKind::Hexagon => labels(&[BLUE, GREEN, RED]),
        PatternKind::Square => labels(&CUBIC_COLORS[..4]),
        PatternKind::Plain => labels(&[TransColor::BLACK]),
        PatternKind::Fractal(FractalParams {
            family: FractalFamily::Mandel { exponent: 2 },
            ..
        }) => ramp(&[
            (0.001, TransColor::BLACK),
            (0.001, CYAN),
            (0.012, YELLOW),
            (0.015, MAGENTA),
            (0.1, CYAN),
        ]),
        PatternKind::Marble => ramp(&[
            (0.0, TransColor::rgb(0.9, 0.8, 0.8)),
            (0.9, TransColor::rgb(0.9, 0.08, 0.08)),
            (0.9, TransColor::BLACK),
        ]),
        PatternKind::Radial => ramp(&[
            (0.0, CYAN),
            (0.333, YELLOW),
            (0.666, MAGENTA),
            (1.0, CYAN),
        ]),
        PatternKind::Wood => ramp(&[
            (0.6, TransColor::rgb(0.666, 0.312, 0.2)),
            (0.6, TransColor::rgb(0.4, 0.1333, 0.066)),
        ]),
        _ => ramp(&[(0.0, TransColor::BLACK), (1.0, TransColor::WHITE)]),
    }
}
