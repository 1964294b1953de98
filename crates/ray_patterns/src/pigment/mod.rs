//! Pigments: patterns resolved through blend maps into colors.
//!
//! [`Pigment::compute`] returns `Ok(None)` when a pigment contributes no color at a
//! point (for example outside a once-only image). Callers treat that as absent, not as
//! an error. Nested pigments are shared through [`PigmentRef`].
//!
//! Call [`Pigment::post`] once after building a pigment tree. It installs default
//! color maps, checks discrete entry counts and computes [`Pigment::has_filter`].
use std::sync::Arc;

use glam::DVec3;

use crate::blend::{blend_colors, BlendMap, BlendMode};
use crate::color::{GammaCurve, TransColor};
use crate::context::{HitContext, ThreadContext};
use crate::error::{Error, Result};
use crate::noise::EPSILON;
use crate::pattern::{Pattern, PatternKind};
use crate::warp::{warp_point, Warp};

pub mod image;

use image::ImageMap;

/// Shared handle to a nested pigment.
pub type PigmentRef = Arc<Pigment>;

/// Blend map of a patterned or average pigment.
#[derive(Debug, Clone)]
pub enum PigmentMap {
    Colors(BlendMap<TransColor>),
    Pigments(BlendMap<PigmentRef>),
}

impl PigmentMap {
    pub fn len(&self) -> usize {
        match self {
            PigmentMap::Colors(map) => map.len(),
            PigmentMap::Pigments(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<BlendMap<TransColor>> for PigmentMap {
    fn from(map: BlendMap<TransColor>) -> Self {
        PigmentMap::Colors(map)
    }
}

impl From<BlendMap<PigmentRef>> for PigmentMap {
    fn from(map: BlendMap<PigmentRef>) -> Self {
        PigmentMap::Pigments(map)
    }
}

#[derive(Debug, Clone)]
pub enum PigmentKind {
    /// A single color everywhere.
    Plain(TransColor),
    /// Average of the map entries, weighted by their values.
    Average(Option<PigmentMap>),
    /// Nested pigment evaluated at the surface UV coordinates.
    UvMapped(PigmentRef),
    Image(ImageMap),
    Patterned {
        pattern: Pattern,
        /// `None` until [`Pigment::post`] installs the pattern's default map.
        map: Option<PigmentMap>,
        blend_mode: BlendMode,
        blend_gamma: GammaCurve,
    },
}

#[derive(Debug, Clone)]
pub struct Pigment {
    pub kind: PigmentKind,
    /// Applied in order before the pattern's own warps.
    pub warps: Vec<Warp>,
    /// Preview color returned when the render settings ask for quick colors.
    pub quick_color: Option<TransColor>,
    has_filter: bool,
}

impl Pigment {
    pub fn new(kind: PigmentKind) -> Self {
        Self {
            kind,
            warps: Vec::new(),
            quick_color: None,
            has_filter: false,
        }
    }

    pub fn plain(color: TransColor) -> Self {
        Self::new(PigmentKind::Plain(color))
    }

    pub fn patterned(pattern: Pattern, map: impl Into<PigmentMap>) -> Self {
        Self::new(PigmentKind::Patterned {
            pattern,
            map: Some(map.into()),
            blend_mode: BlendMode::Default,
            blend_gamma: GammaCurve::Neutral,
        })
    }

    /// Patterned pigment that uses the pattern's default color map.
    pub fn with_default_map(pattern: Pattern) -> Self {
        Self::new(PigmentKind::Patterned {
            pattern,
            map: None,
            blend_mode: BlendMode::Default,
            blend_gamma: GammaCurve::Neutral,
        })
    }

    pub fn average(map: impl Into<PigmentMap>) -> Self {
        Self::new(PigmentKind::Average(Some(map.into())))
    }

    pub fn uv_mapped(inner: PigmentRef) -> Self {
        Self::new(PigmentKind::UvMapped(inner))
    }

    pub fn image(map: ImageMap) -> Self {
        Self::new(PigmentKind::Image(map))
    }

    pub fn with_warp(mut self, warp: Warp) -> Self {
        self.warps.push(warp);
        self
    }

    pub fn with_quick_color(mut self, color: TransColor) -> Self {
        self.quick_color = Some(color);
        self
    }

    /// Sets how neighbouring map entries are mixed. Ignored by non-patterned kinds.
    pub fn with_blend_mode(mut self, mode: BlendMode, gamma: GammaCurve) -> Self {
        if let PigmentKind::Patterned {
            blend_mode,
            blend_gamma,
            ..
        } = &mut self.kind
        {
            *blend_mode = mode;
            *blend_gamma = gamma;
        }
        self
    }

    /// Whether any part of the pigment can let light through. Valid after
    /// [`Pigment::post`].
    pub fn has_filter(&self) -> bool {
        self.has_filter
    }

    /// Finishes a pigment tree after construction.
    ///
    /// Shared nested pigments are cloned on write, so every handle in the tree is
    /// posted.
    pub fn post(&mut self) -> Result<()> {
        for warp in &self.warps {
            warp.validate()?;
        }
        let mut has_filter = false;
        match &mut self.kind {
            PigmentKind::Plain(color) => {
                has_filter = color.is_transparent(EPSILON);
            }
            PigmentKind::Average(map) => {
                let map = map.as_mut().ok_or(Error::MissingBlendMap("average"))?;
                has_filter |= post_map(map)?;
            }
            PigmentKind::UvMapped(inner) => {
                let inner = Arc::make_mut(inner);
                inner.post()?;
                has_filter = inner.has_filter;
            }
            PigmentKind::Image(map) => {
                has_filter = map.has_filter();
            }
            PigmentKind::Patterned { pattern, map, .. } => {
                pattern.validate()?;
                if let PatternKind::Pigment(inner) = &mut pattern.kind {
                    Arc::make_mut(inner).post()?;
                }
                if map.is_none() {
                    *map = Some(PigmentMap::Colors(pattern.default_color_map()?));
                }
                if let Some(map) = map {
                    pattern.check_blend_map(map.len())?;
                    has_filter |= post_map(map)?;
                }
            }
        }
        self.has_filter = has_filter;
        Ok(())
    }

    /// Color of the pigment at `p`, or `None` if it contributes nothing there.
    ///
    /// Fails for a UV mapped pigment without UV coordinates and for a patterned
    /// pigment that was never posted and has no map.
    pub fn compute(
        &self,
        p: DVec3,
        hit: Option<&HitContext>,
        ctx: &mut ThreadContext,
    ) -> Result<Option<TransColor>> {
        if ctx.settings().quick_color {
            if let Some(color) = self.quick_color {
                return Ok(Some(color));
            }
        }

        match &self.kind {
            PigmentKind::Plain(color) => Ok(Some(*color)),
            PigmentKind::Average(map) => {
                let map = map.as_ref().ok_or(Error::MissingBlendMap("average"))?;
                let tp = warp_point(&self.warps, p, None);
                average(map, tp, hit, ctx).map(Some)
            }
            PigmentKind::UvMapped(inner) => {
                let uv = hit.and_then(|h| h.uv).ok_or(Error::MissingUv)?;
                inner.compute(uv.extend(0.0), hit, ctx)
            }
            PigmentKind::Image(map) => Ok(map.color(warp_point(&self.warps, p, None))),
            PigmentKind::Patterned {
                pattern,
                map,
                blend_mode,
                blend_gamma,
            } => {
                let map = map.as_ref().ok_or(Error::MissingBlendMap("patterned"))?;
                let tp = warp_point(&self.warps, p, None);
                let value = pattern.evaluate(tp, hit, ctx)?;
                resolve(map, value, tp, hit, ctx, *blend_mode, *blend_gamma)
            }
        }
    }

    /// [`Pigment::compute`] for a point given as any `mint` compatible type, without
    /// surface information.
    pub fn color_at(
        &self,
        point: impl Into<mint::Point3<f64>>,
        ctx: &mut ThreadContext,
    ) -> Result<Option<TransColor>> {
        self.compute(DVec3::from(point.into()), None, ctx)
    }
}

/// Posts nested pigments and reports whether the map can let light through.
fn post_map(map: &mut PigmentMap) -> Result<bool> {
    match map {
        PigmentMap::Colors(colors) => Ok(colors
            .entries()
            .iter()
            .any(|e| e.data.is_transparent(EPSILON))),
        PigmentMap::Pigments(pigments) => {
            let mut has_filter = false;
            for pigment in pigments.data_mut() {
                let pigment = Arc::make_mut(pigment);
                pigment.post()?;
                has_filter |= pigment.has_filter;
            }
            Ok(has_filter)
        }
    }
}

/// Looks `value` up in `map` and mixes the two bracketing entries.
fn resolve(
    map: &PigmentMap,
    value: f64,
    p: DVec3,
    hit: Option<&HitContext>,
    ctx: &mut ThreadContext,
    mode: BlendMode,
    blend_gamma: GammaCurve,
) -> Result<Option<TransColor>> {
    match map {
        PigmentMap::Colors(colors) => {
            let s = colors.search(value);
            if s.is_exact() {
                return Ok(Some(s.next.data));
            }
            Ok(Some(blend_colors(
                mode,
                ctx.working_gamma(),
                blend_gamma,
                s.prev.data,
                s.prev_weight,
                s.next.data,
                s.next_weight,
            )))
        }
        PigmentMap::Pigments(pigments) => {
            let s = pigments.search(value);
            let next = s.next.data.compute(p, hit, ctx)?;
            if s.is_exact() {
                return Ok(next);
            }
            let prev = s.prev.data.compute(p, hit, ctx)?;
            if prev.is_none() && next.is_none() {
                return Ok(None);
            }
            Ok(Some(blend_colors(
                mode,
                ctx.working_gamma(),
                blend_gamma,
                prev.unwrap_or_default(),
                s.prev_weight,
                next.unwrap_or_default(),
                s.next_weight,
            )))
        }
    }
}

/// Value-weighted average of every entry; a zero total weight yields a cleared color.
fn average(
    map: &PigmentMap,
    p: DVec3,
    hit: Option<&HitContext>,
    ctx: &mut ThreadContext,
) -> Result<TransColor> {
    let mut sum = TransColor::default();
    let mut total = 0.0;
    match map {
        PigmentMap::Colors(colors) => {
            for entry in colors.entries() {
                sum += entry.data * entry.value;
                total += entry.value;
            }
        }
        PigmentMap::Pigments(pigments) => {
            for entry in pigments.entries() {
                let color = entry.data.compute(p, hit, ctx)?.unwrap_or_default();
                sum += color * entry.value;
                total += entry.value;
            }
        }
    }
    if total == 0.0 {
        return Ok(TransColor::default());
    }
    Ok(sum / total)
}

/// Attenuation of a media density pigment list: the product of the RGB of every
/// pigment, evaluated last to first.
///
/// A pigment that contributes no color zeroes the product.
pub fn evaluate_density(
    pigments: &[PigmentRef],
    p: DVec3,
    ctx: &mut ThreadContext,
) -> Result<DVec3> {
    let mut attenuation = DVec3::ONE;
    for pigment in pigments.iter().rev() {
        let color = pigment.compute(p, None, ctx)?.unwrap_or_default();
        attenuation *= color.rgb;
    }
    Ok(attenuation)
}
