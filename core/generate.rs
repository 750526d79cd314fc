//! Randomized value generation, grounded on the teacher's own `generate.rs`:
//! a small seeded RNG plus a `Generate` trait, used by the demo binary and
//! by tests that want a reproducible random sequence outside of proptest's
//! own generators.

use rand_chacha::{
    rand_core::{RngCore, SeedableRng},
    ChaCha8Rng,
};

use crate::{Key, Value};

pub struct Rng {
    rng: ChaCha8Rng,
}

impl Rng {
    /// Creates a new generator using a random seed.
    pub fn new() -> Self {
        let seed: u64 = rand::random();
        Rng::from_seed(seed)
    }

    /// Creates a new generator using the provided seed.
    pub fn from_seed(seed: u64) -> Self {
        Rng {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn next_value(&mut self) -> u32 {
        self.rng.next_u32()
    }
}

impl Default for Rng {
    fn default() -> Self {
        Rng::new()
    }
}

pub trait Generate {
    fn generate(rng: &mut Rng) -> Self;
}

impl Generate for Key {
    fn generate(rng: &mut Rng) -> Self {
        rng.next_value() as Key
    }
}
