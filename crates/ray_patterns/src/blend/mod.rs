//! Blend maps: ordered tables that turn a pattern value into typed data.
//!
//! A [`BlendMap`] holds `(value, data)` entries in non-decreasing value order.
//! [`BlendMap::search`] finds the two entries bracketing a pattern value together with
//! their interpolation weights; two consecutive entries with the same value form a
//! hard step. The same table drives colors, nested pigments, normals, slopes,
//! textures and densities, distinguished by a [`BlendMapKind`] tag.
use glam::{DVec2, DVec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::TransColor;
use crate::error::{Error, Result};

pub mod mode;

pub use mode::{blend_colors, BlendMode};

/// What the data of a blend map represents.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMapKind {
    Color,
    Pigment,
    Normal,
    Slope,
    Texture,
    Density,
}

/// One `(value, data)` pair of a blend map.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BlendMapEntry<T> {
    pub value: f64,
    pub data: T,
}

impl<T> BlendMapEntry<T> {
    pub fn new(value: f64, data: T) -> Self {
        Self { value, data }
    }
}

impl<T> From<(f64, T)> for BlendMapEntry<T> {
    fn from((value, data): (f64, T)) -> Self {
        Self { value, data }
    }
}

/// Result of [`BlendMap::search`].
#[derive(Debug)]
pub struct BlendSearch<'a, T> {
    pub prev: &'a BlendMapEntry<T>,
    pub next: &'a BlendMapEntry<T>,
    pub prev_index: usize,
    pub next_index: usize,
    pub prev_weight: f64,
    pub next_weight: f64,
}

impl<T> BlendSearch<'_, T> {
    /// Returns `true` when a single entry is selected and no blending is needed.
    pub fn is_exact(&self) -> bool {
        self.prev_index == self.next_index
    }
}

// Manual impls: derived ones would require `T: Clone`.
impl<T> Clone for BlendSearch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BlendSearch<'_, T> {}

/// Ordered value to data table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BlendMap<T> {
    kind: BlendMapKind,
    entries: Vec<BlendMapEntry<T>>,
}

impl<T> BlendMap<T> {
    /// Creates a blend map, rejecting empty or unsorted entry lists.
    pub fn new<E>(kind: BlendMapKind, entries: impl IntoIterator<Item = E>) -> Result<Self>
    where
        E: Into<BlendMapEntry<T>>,
    {
        let entries: Vec<BlendMapEntry<T>> = entries.into_iter().map(Into::into).collect();
        validate_entries(&entries)?;
        Ok(Self { kind, entries })
    }

    /// Creates a map for a discrete pattern: item `i` is stored at value `i`.
    pub fn discrete(kind: BlendMapKind, items: impl IntoIterator<Item = T>) -> Result<Self> {
        Self::new(
            kind,
            items
                .into_iter()
                .enumerate()
                .map(|(i, data)| BlendMapEntry::new(i as f64, data)),
        )
    }

    /// Replaces the entries, keeping caller order.
    pub fn set<E>(&mut self, entries: impl IntoIterator<Item = E>) -> Result<()>
    where
        E: Into<BlendMapEntry<T>>,
    {
        let entries: Vec<BlendMapEntry<T>> = entries.into_iter().map(Into::into).collect();
        validate_entries(&entries)?;
        self.entries = entries;
        Ok(())
    }

    pub fn kind(&self) -> BlendMapKind {
        self.kind
    }

    pub fn entries(&self) -> &[BlendMapEntry<T>] {
        &self.entries
    }

    /// Mutable access to the entry data; values stay fixed so ordering is preserved.
    pub fn data_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|e| &mut e.data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> &BlendMapEntry<T> {
        &self.entries[0]
    }

    /// Finds the entries bracketing `value` and their weights.
    ///
    /// Values at or above the last entry select the last entry. Otherwise the first
    /// entry with `entry.value >= value` is `next`; if it matches exactly, or has no
    /// predecessor, it is selected alone. Among equal values the earliest entry wins.
    pub fn search(&self, value: f64) -> BlendSearch<'_, T> {
        let last = self.entries.len() - 1;
        if value >= self.entries[last].value {
            return self.exact(last);
        }

        let next = self.entries.partition_point(|e| e.value < value);
        if next == 0 || value == self.entries[next].value {
            return self.exact(next);
        }

        let prev = next - 1;
        let (pv, nv) = (self.entries[prev].value, self.entries[next].value);
        let prev_weight = (nv - value) / (nv - pv);
        BlendSearch {
            prev: &self.entries[prev],
            next: &self.entries[next],
            prev_index: prev,
            next_index: next,
            prev_weight,
            next_weight: 1.0 - prev_weight,
        }
    }

    fn exact(&self, index: usize) -> BlendSearch<'_, T> {
        BlendSearch {
            prev: &self.entries[index],
            next: &self.entries[index],
            prev_index: index,
            next_index: index,
            prev_weight: 0.0,
            next_weight: 1.0,
        }
    }
}

impl<T: Blend> BlendMap<T> {
    /// Linearly interpolates the data bracketing `value`.
    pub fn interpolate(&self, value: f64) -> T {
        let s = self.search(value);
        if s.is_exact() {
            s.next.data.clone()
        } else {
            T::blend(&s.prev.data, s.prev_weight, &s.next.data, s.next_weight)
        }
    }
}

fn validate_entries<T>(entries: &[BlendMapEntry<T>]) -> Result<()> {
    if entries.is_empty() {
        return Err(Error::BlendMap("blend map needs at least one entry".into()));
    }
    if let Some(e) = entries.iter().find(|e| !e.value.is_finite()) {
        return Err(Error::BlendMap(format!("entry value {} is not finite", e.value)));
    }
    if let Some(w) = entries.windows(2).find(|w| w[1].value < w[0].value) {
        return Err(Error::BlendMap(format!(
            "entry values must not decrease ({} follows {})",
            w[1].value, w[0].value
        )));
    }
    Ok(())
}

/// Weighted combination of two blend map values.
pub trait Blend: Clone {
    fn blend(a: &Self, wa: f64, b: &Self, wb: f64) -> Self;
}

impl Blend for f64 {
    fn blend(a: &Self, wa: f64, b: &Self, wb: f64) -> Self {
        a * wa + b * wb
    }
}

impl Blend for DVec2 {
    fn blend(a: &Self, wa: f64, b: &Self, wb: f64) -> Self {
        *a * wa + *b * wb
    }
}

impl Blend for DVec3 {
    fn blend(a: &Self, wa: f64, b: &Self, wb: f64) -> Self {
        *a * wa + *b * wb
    }
}

impl Blend for TransColor {
    fn blend(a: &Self, wa: f64, b: &Self, wb: f64) -> Self {
        *a * wa + *b * wb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn letters() -> BlendMap<char> {
        BlendMap::<char>::new(
            BlendMapKind::Color,
            [(0.0, 'A'), (0.5, 'B'), (0.5, 'C'), (1.0, 'D')],
        )
        .unwrap()
    }

    #[test]
    fn search_interpolates_between_neighbours() {
        let map = letters();
        let s = map.search(0.25);
        assert_eq!((s.prev.data, s.next.data), ('A', 'B'));
        assert_eq!((s.prev_weight, s.next_weight), (0.5, 0.5));
    }

    #[test]
    fn search_tie_selects_the_earlier_entry() {
        let map = letters();
        let s = map.search(0.5);
        assert_eq!((s.prev.data, s.next.data), ('B', 'B'));
        assert_eq!((s.prev_weight, s.next_weight), (0.0, 1.0));
        assert!(s.is_exact());
    }

    #[test]
    fn search_just_above_a_step_uses_the_later_entry() {
        let map = letters();
        let s = map.search(0.75);
        assert_eq!((s.prev.data, s.next.data), ('C', 'D'));
        assert!((s.prev_weight - 0.5).abs() < 1e-12);
    }

    #[test]
    fn search_clamps_outside_the_range() {
        let map = letters();
        let below = map.search(-3.0);
        assert_eq!((below.prev.data, below.next.data, below.next_weight), ('A', 'A', 1.0));
        let above = map.search(7.0);
        assert_eq!((above.prev.data, above.next.data, above.next_weight), ('D', 'D', 1.0));
        let first = map.search(0.0);
        assert_eq!((first.prev_index, first.next_index, first.prev_weight), (0, 0, 0.0));
    }

    #[test]
    fn all_equal_entries_select_the_last_one() {
        let map = BlendMap::<i32>::new(BlendMapKind::Density, [(0.5, 1), (0.5, 2), (0.5, 3)]).unwrap();
        assert_eq!(map.search(0.5).next.data, 3);
        assert_eq!(map.search(0.1).next.data, 1);
    }

    #[test]
    fn interpolate_blends_scalars() {
        let map = BlendMap::<f64>::new(BlendMapKind::Density, [(0.0, 0.0), (1.0, 10.0)]).unwrap();
        assert!((map.interpolate(0.3) - 3.0).abs() < 1e-12);
        assert_eq!(map.interpolate(2.0), 10.0);
    }

    #[test]
    fn discrete_maps_use_index_values() {
        let map = BlendMap::discrete(BlendMapKind::Color, ["a", "b", "c"]).unwrap();
        let values: Vec<f64> = map.entries().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0]);
        assert_eq!(map.search(1.0).next.data, "b");
        assert_eq!(map.search(2.0).next.data, "c");
    }

    #[test]
    fn invalid_tables_are_rejected() {
        let empty: Vec<(f64, u8)> = Vec::new();
        assert!(matches!(
            BlendMap::<u8>::new(BlendMapKind::Color, empty),
            Err(Error::BlendMap(_))
        ));
        assert!(BlendMap::<u8>::new(BlendMapKind::Color, [(0.5, 1u8), (0.2, 2)]).is_err());
        assert!(BlendMap::<u8>::new(BlendMapKind::Color, [(f64::NAN, 1u8)]).is_err());

        let mut map = letters();
        assert!(map.set([(1.0, 'x'), (0.0, 'y')]).is_err());
        assert_eq!(map.len(), 4);
        map.set([(0.0, 'x')]).unwrap();
        assert_eq!(map.search(0.9).next.data, 'x');
    }

    /// Straightforward forward scan used as the reference for `search`.
    fn reference_search(values: &[f64], value: f64) -> (usize, usize, f64, f64) {
        let last = values.len() - 1;
        if value >= values[last] {
            return (last, last, 0.0, 1.0);
        }
        let mut prev = 0;
        let mut next = 0;
        while value > values[next] {
            prev = next;
            next += 1;
        }
        if value == values[next] || prev == next {
            return (next, next, 0.0, 1.0);
        }
        let pw = (values[next] - value) / (values[next] - values[prev]);
        (prev, next, pw, 1.0 - pw)
    }

    fn sorted_values() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0u8..20, 1..12).prop_map(|mut v| {
            v.sort_unstable();
            v.into_iter().map(|x| f64::from(x) / 10.0).collect()
        })
    }

    proptest! {
        #[test]
        fn search_weights_sum_to_one(values in sorted_values(), t in -0.5f64..2.5) {
            let map = BlendMap::<f64>::new(BlendMapKind::Density, values.iter().map(|&v| (v, v))).unwrap();
            let s = map.search(t);
            prop_assert!((s.prev_weight + s.next_weight - 1.0).abs() < 1e-12);
            prop_assert!(s.prev_weight >= 0.0 && s.next_weight >= 0.0);
            prop_assert!(s.prev_index <= s.next_index);
        }

        #[test]
        fn search_matches_forward_scan(values in sorted_values(), t in -0.5f64..2.5) {
            let map = BlendMap::<()>::new(BlendMapKind::Density, values.iter().map(|&v| (v, ()))).unwrap();
            let s = map.search(t);
            let (p, n, pw, nw) = reference_search(&values, t);
            prop_assert_eq!((s.prev_index, s.next_index), (p, n));
            prop_assert!((s.prev_weight - pw).abs() < 1e-12);
            prop_assert!((s.next_weight - nw).abs() < 1e-12);
        }

        #[test]
        fn search_at_first_value_selects_first_entry(values in sorted_values()) {
            let map = BlendMap::<()>::new(BlendMapKind::Density, values.iter().map(|&v| (v, ()))).unwrap();
            let s = map.search(values[0]);
            if values[0] < values[values.len() - 1] {
                prop_assert_eq!((s.prev_index, s.next_index), (0, 0));
            }
            prop_assert_eq!((s.prev_weight, s.next_weight), (0.0, 1.0));
        }
    }
}
