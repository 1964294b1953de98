//! Crackle: a cellular (Worley/Voronoi) pattern with a per-thread nucleus cache.
//!
//! Every unit lattice cell holds one pseudo-random nucleus. The value at a point is a
//! weighted sum of the distances to its three nearest nuclei, or noise sampled at the
//! nearest nucleus in solid mode. A nucleus can sit up to two cells away along one axis
//! while being one cell away along the others, so the 81 cells of the pruned ±2
//! neighborhood are always enough.
//!
//! Nuclei for a cell neighborhood are memoized in a [`CrackleCache`] owned by one render
//! thread. The cache never evicts; once its byte budget is exhausted new neighborhoods
//! are computed transiently instead.
use std::borrow::Cow;
use std::collections::HashMap;
use std::mem::size_of;
use std::sync::LazyLock;

use glam::{DVec3, IVec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::RenderStats;
use crate::error::{Error, Result};
use crate::noise::{hash3, noise, pattern_rand, NoiseGenerator, EPSILON};

/// Number of cells in the pruned neighborhood.
pub const NEIGHBORHOOD: usize = 81;

/// Offsets in `-2..=2` with at most one axis at distance 2.
static NEIGHBOR_OFFSETS: LazyLock<[IVec3; NEIGHBORHOOD]> = LazyLock::new(|| {
    let mut table = [IVec3::ZERO; NEIGHBORHOOD];
    let mut i = 0;
    for x in -2..=2 {
        for y in -2..=2 {
            for z in -2..=2 {
                let far = [x, y, z].iter().filter(|c: &&i32| c.abs() == 2).count();
                if far <= 1 {
                    table[i] = IVec3::new(x, y, z);
                    i += 1;
                }
            }
        }
    }
    table
});

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrackleParams {
    /// Exponent of the distance metric; 2 is Euclidean, 1 Manhattan.
    pub metric: f64,
    /// Weights of the nearest, second and third nearest distance.
    pub form: DVec3,
    /// Added to every distance.
    pub offset: f64,
    /// Returns noise at the nearest nucleus instead of a distance combination.
    pub solid: bool,
    /// Per-axis period in cells; 0 disables repetition.
    pub repeat: IVec3,
}

impl Default for CrackleParams {
    fn default() -> Self {
        Self {
            metric: 2.0,
            form: DVec3::new(-1.0, 1.0, 0.0),
            offset: 0.0,
            solid: false,
            repeat: IVec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Metric {
    Euclidean,
    Manhattan,
    Power(f64),
}

impl Metric {
    fn from_exponent(metric: f64) -> Self {
        if metric == 2.0 {
            Metric::Euclidean
        } else if metric == 1.0 {
            Metric::Manhattan
        } else {
            Metric::Power(metric)
        }
    }

    /// Distance raised to the metric exponent.
    #[inline]
    fn powered(self, d: DVec3) -> f64 {
        match self {
            Metric::Euclidean => d.length_squared(),
            Metric::Manhattan => d.x.abs() + d.y.abs() + d.z.abs(),
            Metric::Power(p) => d.x.abs().powf(p) + d.y.abs().powf(p) + d.z.abs().powf(p),
        }
    }

    #[inline]
    fn power_of(self, v: f64) -> f64 {
        match self {
            Metric::Euclidean => v * v,
            Metric::Manhattan => v,
            Metric::Power(p) => v.powf(p),
        }
    }

    #[inline]
    fn root_of(self, v: f64) -> f64 {
        match self {
            Metric::Euclidean => v.sqrt(),
            Metric::Manhattan => v,
            Metric::Power(p) => v.powf(1.0 / p),
        }
    }
}

impl CrackleParams {
    pub fn with_metric(mut self, metric: f64) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_form(mut self, form: DVec3) -> Self {
        self.form = form;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    pub fn with_repeat(mut self, repeat: IVec3) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.metric > 0.0 && self.metric.is_finite()) {
            return Err(Error::InvalidConfig(
                "crackle metric must be finite and > 0".into(),
            ));
        }
        if self.repeat.min_element() < 0 {
            return Err(Error::InvalidConfig(
                "crackle repeat must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Evaluates the pattern, consulting and filling `cache`.
    pub fn evaluate(
        &self,
        p: DVec3,
        generator: NoiseGenerator,
        cache: &mut CrackleCache,
        stats: &mut RenderStats,
    ) -> f64 {
        let metric = Metric::from_exponent(self.metric);

        let mut point = p;
        for axis in 0..3 {
            if self.repeat[axis] != 0 {
                point[axis] = wrap(point[axis], f64::from(self.repeat[axis]));
            }
        }
        let cell = (point - EPSILON).floor().as_ivec3();
        let entry = cache.lookup(cell, self.repeat, stats);

        let mut nearest = [f64::INFINITY; 3];
        let mut nearest_index = 0;
        for (i, nucleus) in entry.nuclei.iter().enumerate() {
            let d = metric.powered(*nucleus - point);
            if d < nearest[0] {
                nearest = [d, nearest[0], nearest[1]];
                nearest_index = i;
            } else if d < nearest[1] {
                nearest = [nearest[0], d, nearest[1]];
            } else if d < nearest[2] {
                nearest[2] = d;
            }
        }

        if self.offset != 0.0 {
            let bias = metric.power_of(self.offset);
            for d in &mut nearest {
                *d += bias;
            }
        }

        let value = if self.solid {
            noise(entry.nuclei[nearest_index], generator)
        } else {
            self.form.x * metric.root_of(nearest[0])
                + self.form.y * metric.root_of(nearest[1])
                + self.form.z * metric.root_of(nearest[2])
        };
        value.clamp(0.0, 1.0)
    }
}

/// Cache key: lattice cell plus the repeat periods it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CrackleCellKey {
    pub cell: IVec3,
    pub repeat: IVec3,
}

impl CrackleCellKey {
    /// Builds a key, dropping the period of axes where no neighbor wraps around.
    ///
    /// Cells at least two cells away from both ends of a period see the same nuclei
    /// as in the non-repeating pattern, so they share those entries. The cell itself
    /// is kept as given: a cell just below a period start has its nuclei on that side
    /// of the seam, not one period away.
    pub fn new(cell: IVec3, repeat: IVec3) -> Self {
        let mut repeat = repeat;
        for axis in 0..3 {
            let r = repeat[axis];
            if r != 0 && cell[axis] >= 2 && cell[axis] < r - 2 {
                repeat[axis] = 0;
            }
        }
        Self { cell, repeat }
    }
}

/// Nuclei of the 81 cells around one lattice cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CrackleCacheEntry {
    pub nuclei: [DVec3; NEIGHBORHOOD],
}

impl CrackleCacheEntry {
    /// Places one jittered nucleus in every neighbor of `cell`.
    ///
    /// Neighbors are wrapped into the repeat period before hashing so the pattern
    /// tiles; the nucleus is then moved back by the wrap distance.
    pub fn build(cell: IVec3, repeat: IVec3) -> Self {
        let mut nuclei = [DVec3::ZERO; NEIGHBORHOOD];
        for (nucleus, offset) in nuclei.iter_mut().zip(NEIGHBOR_OFFSETS.iter()) {
            let neighbor = cell + *offset;
            let mut wrapped = neighbor;
            for axis in 0..3 {
                if repeat[axis] != 0 {
                    wrapped[axis] = neighbor[axis].rem_euclid(repeat[axis]);
                }
            }
            let seed = hash3(wrapped.x, wrapped.y, wrapped.z);
            let jitter = DVec3::new(pattern_rand(seed), pattern_rand(seed + 1), pattern_rand(seed + 2));
            *nucleus = wrapped.as_dvec3() + jitter + (neighbor - wrapped).as_dvec3();
        }
        Self { nuclei }
    }
}

/// Memory used by one cached cell, in bytes.
pub const CRACKLE_ENTRY_SIZE: usize = size_of::<(CrackleCellKey, CrackleCacheEntry)>();

/// Per-thread crackle cache bounded by a byte budget.
#[derive(Debug)]
pub struct CrackleCache {
    entries: HashMap<CrackleCellKey, CrackleCacheEntry>,
    budget: usize,
    refusal_logged: bool,
}

impl CrackleCache {
    /// Creates an empty cache that stops admitting entries past `budget` bytes.
    pub fn new(budget: usize) -> Self {
        Self {
            entries: HashMap::new(),
            budget,
            refusal_logged: false,
        }
    }

    /// Number of cached cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no cell is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Approximate memory held by the cached cells, in bytes.
    pub fn memory_usage(&self) -> usize {
        self.entries.len() * CRACKLE_ENTRY_SIZE
    }

    /// Drops every cached cell.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.refusal_logged = false;
    }

    /// Returns the nuclei around `cell`, computing them on a miss.
    ///
    /// The entry is inserted while the cache is under budget and returned as an
    /// owned value otherwise.
    pub fn lookup(
        &mut self,
        cell: IVec3,
        repeat: IVec3,
        stats: &mut RenderStats,
    ) -> Cow<'_, CrackleCacheEntry> {
        let key = CrackleCellKey::new(cell, repeat);
        let (cell, repeat) = (key.cell, key.repeat);
        stats.crackle_tests += 1;

        if self.entries.contains_key(&key) {
            stats.crackle_hits += 1;
        } else if self.memory_usage() < self.budget {
            self.entries.insert(key, CrackleCacheEntry::build(cell, repeat));
        } else {
            stats.crackle_transient += 1;
            if !self.refusal_logged {
                debug!(
                    "Crackle cache budget of {} bytes reached with {} cells; computing further cells without caching.",
                    self.budget,
                    self.entries.len()
                );
                self.refusal_logged = true;
            }
            return Cow::Owned(CrackleCacheEntry::build(cell, repeat));
        }

        match self.entries.get(&key) {
            Some(entry) => Cow::Borrowed(entry),
            None => Cow::Owned(CrackleCacheEntry::build(cell, repeat)),
        }
    }
}

impl Default for CrackleCache {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CRACKLE_CACHE_BUDGET)
    }
}

#[inline]
fn wrap(v: f64, period: f64) -> f64 {
    v - (v / period).floor() * period
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(params: &CrackleParams, p: DVec3, cache: &mut CrackleCache) -> f64 {
        let mut stats = RenderStats::default();
        params.evaluate(p, NoiseGenerator::RangeCorrected, cache, &mut stats)
    }

    fn sample_points() -> Vec<DVec3> {
        (0..64)
            .map(|i| {
                let f = i as f64;
                DVec3::new(f * 0.61 - 17.0, f * 0.37 + 0.2, -f * 0.29 + 3.0)
            })
            .collect()
    }

    #[test]
    fn neighbor_table_has_81_distinct_offsets() {
        let table = &*NEIGHBOR_OFFSETS;
        let mut seen = std::collections::HashSet::new();
        for o in table.iter() {
            assert!(o.abs().max_element() <= 2);
            assert!(o.to_array().iter().filter(|c| c.abs() == 2).count() <= 1);
            assert!(seen.insert(*o));
        }
        assert_eq!(seen.len(), NEIGHBORHOOD);
        assert!(seen.contains(&IVec3::ZERO));
    }

    #[test]
    fn nuclei_lie_in_their_cells() {
        let entry = CrackleCacheEntry::build(IVec3::new(3, -4, 7), IVec3::ZERO);
        for (nucleus, offset) in entry.nuclei.iter().zip(NEIGHBOR_OFFSETS.iter()) {
            let cell = IVec3::new(3, -4, 7) + *offset;
            assert_eq!(nucleus.floor().as_ivec3(), cell);
        }
    }

    #[test]
    fn cold_and_warm_cache_agree() {
        let params = CrackleParams::default();
        let mut cache = CrackleCache::new(usize::MAX);
        let cold: Vec<f64> = sample_points().iter().map(|p| eval(&params, *p, &mut cache)).collect();
        assert!(!cache.is_empty());
        let warm: Vec<f64> = sample_points().iter().map(|p| eval(&params, *p, &mut cache)).collect();
        assert_eq!(cold, warm);

        let mut uncached = CrackleCache::new(0);
        let transient: Vec<f64> = sample_points().iter().map(|p| eval(&params, *p, &mut uncached)).collect();
        assert_eq!(cold, transient);
        assert!(uncached.is_empty());
    }

    #[test]
    fn budget_caps_cache_growth() {
        let params = CrackleParams::default();
        let mut cache = CrackleCache::new(3 * CRACKLE_ENTRY_SIZE);
        let mut reference = CrackleCache::new(usize::MAX);
        let mut stats = RenderStats::default();
        for i in 0..20 {
            let p = DVec3::new(i as f64 * 1.5 + 0.25, 0.5, 0.5);
            let a = params.evaluate(p, NoiseGenerator::Perlin, &mut cache, &mut stats);
            let b = eval(&params, p, &mut reference);
            assert_eq!(a, b);
        }
        assert_eq!(cache.len(), 3);
        assert!(stats.crackle_transient > 0);
        assert_eq!(stats.crackle_tests, 20);
    }

    #[test]
    fn repeated_lookups_count_hits() {
        let mut cache = CrackleCache::new(usize::MAX);
        let mut stats = RenderStats::default();
        cache.lookup(IVec3::ONE, IVec3::ZERO, &mut stats);
        cache.lookup(IVec3::ONE, IVec3::ZERO, &mut stats);
        assert_eq!(stats.crackle_tests, 2);
        assert_eq!(stats.crackle_hits, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn default_form_is_clamped_to_unit_range() {
        let params = CrackleParams::default();
        let mut cache = CrackleCache::default();
        for p in sample_points() {
            let v = eval(&params, p, &mut cache);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn all_metrics_find_the_same_nearest_nucleus_at_a_nucleus() {
        let entry = CrackleCacheEntry::build(IVec3::ZERO, IVec3::ZERO);
        let center = entry.nuclei[NEIGHBOR_OFFSETS.iter().position(|o| *o == IVec3::ZERO).unwrap()];
        let nearest_only = DVec3::new(1.0, 0.0, 0.0);
        for metric in [1.0, 2.0, 3.0] {
            let params = CrackleParams::default().with_metric(metric).with_form(nearest_only);
            let mut cache = CrackleCache::default();
            assert!(eval(&params, center, &mut cache) < 1e-9, "metric {metric}");
        }
    }

    #[test]
    fn offset_shifts_distances() {
        let entry = CrackleCacheEntry::build(IVec3::ZERO, IVec3::ZERO);
        let center = entry.nuclei[NEIGHBOR_OFFSETS.iter().position(|o| *o == IVec3::ZERO).unwrap()];
        let params = CrackleParams::default()
            .with_form(DVec3::new(1.0, 0.0, 0.0))
            .with_offset(0.5);
        let mut cache = CrackleCache::default();
        assert!((eval(&params, center, &mut cache) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn solid_mode_is_constant_within_a_cell_region() {
        let entry = CrackleCacheEntry::build(IVec3::ZERO, IVec3::ZERO);
        let center = entry.nuclei[NEIGHBOR_OFFSETS.iter().position(|o| *o == IVec3::ZERO).unwrap()];
        let params = CrackleParams::default().with_solid(true);
        let mut cache = CrackleCache::default();
        let expected = noise(center, NoiseGenerator::RangeCorrected).clamp(0.0, 1.0);
        assert_eq!(eval(&params, center, &mut cache), expected);
    }

    #[test]
    fn repeat_makes_the_pattern_periodic() {
        let params = CrackleParams::default().with_repeat(IVec3::new(4, 0, 5));
        let mut cache = CrackleCache::default();
        for p in sample_points() {
            let shifted = p + DVec3::new(8.0, 0.0, -5.0);
            let a = eval(&params, p, &mut cache);
            let b = eval(&params, shifted, &mut cache);
            assert!((a - b).abs() < 1e-9, "{p} vs {shifted}");
        }
    }

    #[test]
    fn metric_exponents_pick_closed_forms() {
        assert_eq!(Metric::from_exponent(2.0), Metric::Euclidean);
        assert_eq!(Metric::from_exponent(1.0), Metric::Manhattan);
        assert_eq!(Metric::from_exponent(3.5), Metric::Power(3.5));
        let d = DVec3::new(1.0, -2.0, 0.5);
        let power = Metric::Power(2.0);
        assert!((power.powered(d) - Metric::Euclidean.powered(d)).abs() < 1e-12);
    }

    #[test]
    fn keys_far_from_period_edges_drop_the_period() {
        let key = CrackleCellKey::new(IVec3::new(5, 0, 9), IVec3::new(10, 0, 10));
        assert_eq!(key.cell, IVec3::new(5, 0, 9));
        assert_eq!(key.repeat, IVec3::new(0, 0, 10));

        let below_seam = CrackleCellKey::new(IVec3::new(-1, 0, 0), IVec3::new(4, 0, 0));
        let last_cell = CrackleCellKey::new(IVec3::new(3, 0, 0), IVec3::new(4, 0, 0));
        assert_ne!(below_seam, last_cell);
    }

    #[test]
    fn repeating_cells_near_the_seam_do_not_depend_on_query_order() {
        let params = CrackleParams::default().with_repeat(IVec3::new(4, 0, 3));
        let points = [
            DVec3::new(1.0e-12, 0.5, 0.5),
            DVec3::new(3.5, 0.5, 0.5),
            DVec3::new(3.999_999, 0.5, 2.5),
            DVec3::new(4.0, 0.5, 1.0e-12),
            DVec3::new(0.5, 0.5, 2.9),
            DVec3::new(-0.25, 0.5, -0.1),
        ];

        let mut fresh = Vec::new();
        for p in points {
            fresh.push(eval(&params, p, &mut CrackleCache::new(usize::MAX)));
        }

        let mut shared = CrackleCache::new(usize::MAX);
        let forward: Vec<f64> = points.iter().map(|p| eval(&params, *p, &mut shared)).collect();
        let warm: Vec<f64> = points.iter().map(|p| eval(&params, *p, &mut shared)).collect();
        let mut backward_cache = CrackleCache::new(usize::MAX);
        let mut backward: Vec<f64> = points
            .iter()
            .rev()
            .map(|p| eval(&params, *p, &mut backward_cache))
            .collect();
        backward.reverse();

        assert_eq!(forward, fresh);
        assert_eq!(warm, fresh);
        assert_eq!(backward, fresh);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(CrackleParams::default().with_metric(0.0).validate().is_err());
        assert!(CrackleParams::default()
            .with_repeat(IVec3::new(-1, 0, 0))
            .validate()
            .is_err());
        assert!(CrackleParams::default().validate().is_ok());
    }
}
