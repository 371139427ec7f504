//! Deterministic randomness.
//!
//! Two sources live here:
//! - [`scenario_noise`], the `frac(sin(x) * 10000)` hash that shapes scenario
//!   paths. It is not a statistically sound generator; it exists so the same
//!   scenario always yields the same path, bit for bit.
//! - [`SeedHierarchy`], which expands a master seed into per-(label, iteration)
//!   sub-seeds via BLAKE3, independently of thread scheduling order.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic hash in `[0, 1)`: the fractional part of `sin(x) * 10000`.
pub fn scenario_noise(x: f64) -> f64 {
    let v = x.sin() * 10_000.0;
    v - v.floor()
}

/// Deterministic seed hierarchy.
///
/// Because derivation is hash-based (not order-dependent), the same master
/// seed produces identical sub-seeds regardless of the order in which
/// iterations are processed.
#[derive(Debug, Clone)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a specific (label, iteration).
    pub fn sub_seed(&self, label: &str, iteration: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(label.as_bytes());
        hasher.update(&iteration.to_le_bytes());
        let hash = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    /// Create a seeded StdRng from a sub-seed.
    pub fn rng_for(&self, label: &str, iteration: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(label, iteration))
    }
}
