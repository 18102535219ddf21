use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::engine::ScanEngine;
use crate::error::Result;

/// Seeded random input generator.
///
/// Between scans, each watched input cell flips with probability `rate`.
/// The same seed always produces the same flip sequence.
pub struct Stimulus {
    addresses: Vec<usize>,
    rate: f64,
    rng: SmallRng,
}

impl Stimulus {
    pub fn new(addresses: Vec<usize>, rate: f64, seed: u64) -> Self {
        Self {
            addresses,
            rate,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn addresses(&self) -> &[usize] {
        &self.addresses
    }

    /// Flip inputs on `engine`. Returns the addresses that changed.
    pub fn apply(&mut self, engine: &mut ScanEngine) -> Result<Vec<usize>> {
        let mut flipped = Vec::new();
        if self.rate <= 0.0 {
            return Ok(flipped);
        }
        for &address in &self.addresses {
            if self.rng.r#gen::<f64>() < self.rate {
                let current = engine.read(address)?;
                engine.set_input(address, !current)?;
                flipped.push(address);
            }
        }
        if !flipped.is_empty() {
            tracing::debug!(?flipped, "stimulus applied");
        }
        Ok(flipped)
    }
}
