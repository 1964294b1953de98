//! Process-wide lookup tables behind the noise functions.
//!
//! Built once on first use and read-only afterwards. The hash permutation and the
//! solid-noise gradients come from the classic linear congruential sequence so the
//! lattice is identical on every platform; the lattice coefficient table and the
//! pattern random sequence are drawn from a fixed-seed [`StdRng`].
use std::sync::LazyLock;

use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub(crate) const HASH_ENTRIES: usize = 4096;
pub(crate) const SOLID_ENTRIES: usize = 2048;
pub(crate) const RTABLE_PAIRS: usize = 267;
pub(crate) const PATTERN_RANDS: usize = 32768;

const RTABLE_SEED: u64 = 0x5EED_0267;
const PATTERN_RANDS_SEED: u64 = 0x5EED_8000;

pub(crate) static TABLES: LazyLock<NoiseTables> = LazyLock::new(NoiseTables::build);

pub(crate) struct NoiseTables {
    /// Shuffled `0..4096`, stored twice so xor-folded indices never need a modulus.
    pub hash: Vec<u16>,
    /// Lattice coefficients; every odd slot holds half of the preceding even slot.
    pub rtable: Vec<f64>,
    pub permutation: Vec<usize>,
    pub gradients: Vec<DVec3>,
    pub pattern_rands: Vec<f64>,
}

/// The classic `x * 1812433253 + 12345` generator, yielding 15-bit values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lcg(i32);

impl Lcg {
    pub const fn new(seed: i32) -> Self {
        Self(seed)
    }

    pub fn next_u15(&mut self) -> i32 {
        self.0 = self.0.wrapping_mul(1_812_433_253).wrapping_add(12_345);
        (self.0 >> 16) & 0x7FFF
    }
}

impl NoiseTables {
    fn build() -> Self {
        let (permutation, gradients) = build_solid_noise();
        Self {
            hash: build_hash_table(),
            rtable: build_rtable(),
            permutation,
            gradients,
            pattern_rands: build_pattern_rands(),
        }
    }

    #[inline]
    pub fn hash2(&self, a: usize, b: usize) -> usize {
        self.hash[self.hash[a] as usize ^ b] as usize
    }

    #[inline]
    pub fn hash3(&self, a: i32, b: i32, c: i32) -> usize {
        let h = self.hash[(a & 0xFFF) as usize] as usize ^ (b & 0xFFF) as usize;
        let h = self.hash[h] as usize ^ (c & 0xFFF) as usize;
        self.hash[h] as usize
    }

    #[inline]
    pub fn rtable_index(&self, hashed: usize, b: usize) -> usize {
        (self.hash[hashed ^ b] as usize & 0xFF) * 2
    }
}

fn build_hash_table() -> Vec<u16> {
    let mut table: Vec<u16> = (0..HASH_ENTRIES as u16).collect();
    let mut lcg = Lcg::new(0);
    for i in (0..HASH_ENTRIES).rev() {
        let j = lcg.next_u15() as usize % HASH_ENTRIES;
        table.swap(i, j);
    }
    table.extend_from_within(..);
    table
}

fn build_rtable() -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(RTABLE_SEED);
    let mut table = vec![0.0; RTABLE_PAIRS * 2];
    for pair in table.chunks_exact_mut(2) {
        pair[0] = rand_signed(&mut rng);
        pair[1] = pair[0] * 0.5;
    }
    table
}

fn build_solid_noise() -> (Vec<usize>, Vec<DVec3>) {
    let n = SOLID_ENTRIES;
    let mut gradients = vec![DVec3::ZERO; 2 * (n + 1)];
    let mut lcg = Lcg::new(1);
    for gradient in gradients.iter_mut().take(n) {
        loop {
            let mut v = DVec3::ZERO;
            for j in 0..3 {
                let r = lcg.next_u15() % (n as i32 * 2) - n as i32;
                v[j] = f64::from(r) / n as f64;
            }
            let s = v.length_squared();
            if (1.0e-5..=1.0).contains(&s) {
                *gradient = v / s.sqrt();
                break;
            }
        }
    }

    let mut permutation = vec![0usize; 2 * (n + 1)];
    for (i, slot) in permutation.iter_mut().enumerate().take(n) {
        *slot = i;
    }
    let mut i = n;
    while i > 0 {
        let k = permutation[i];
        let j = lcg.next_u15() as usize % n;
        permutation[i] = permutation[j];
        permutation[j] = k;
        i -= 2;
    }

    for i in 0..n + 2 {
        permutation[n + i] = permutation[i];
        gradients[n + i] = gradients[i];
    }
    (permutation, gradients)
}

fn build_pattern_rands() -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(PATTERN_RANDS_SEED);
    (0..PATTERN_RANDS).map(|_| rand01(&mut rng)).collect()
}

/// Uniform value in `[0, 1)` with 53 bits of precision.
#[inline]
fn rand01<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

#[inline]
fn rand_signed<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rand01(rng) * 2.0 - 1.0
}
