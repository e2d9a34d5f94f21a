use std::collections::BTreeMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Owns the run seed and hands every randomizer its own generator.
///
/// Streams are derived from the master generator the first time a name is
/// requested, so a run is reproducible as long as randomizers execute in the
/// same order.
pub struct RngManager {
    seed: u64,
    master: ChaCha8Rng,
    streams: BTreeMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: BTreeMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stream(&mut self, name: &str) -> RandomizerRng<'_> {
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_bytes = [0u8; 32];
            self.master.fill_bytes(&mut seed_bytes);
            ChaCha8Rng::from_seed(seed_bytes)
        });
        RandomizerRng { inner: entry }
    }
}

pub struct RandomizerRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for RandomizerRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
