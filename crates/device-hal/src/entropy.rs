//! True-random entropy source (C2)
//!
//! The original reads 32-bit words from a TRNG peripheral, blocking until the
//! status register reports a word is ready. [`TrueRng`] is that interface kept
//! abstract so the DRBG and the rest of the core never depend on real silicon;
//! [`SimulatedTrng`] is the hosted/test backend.

/// A blocking source of true-random 32-bit words.
pub trait TrueRng {
    /// Block until one true-random word is available and return it.
    fn next_word(&mut self) -> u32;

    /// Fill `state[8..16]` with eight fresh words, the DRBG's reseed operation.
    fn reseed_words(&mut self, out: &mut [u32; 8]) {
        for word in out.iter_mut() {
            *word = self.next_word();
        }
    }
}

/// Simulated TRNG backed by a host CSPRNG, used for hosted builds and tests.
#[cfg(feature = "std")]
pub struct SimulatedTrng {
    rng: rand::rngs::StdRng,
}

#[cfg(feature = "std")]
impl SimulatedTrng {
    /// Seed a simulated TRNG from OS entropy.
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        SimulatedTrng {
            rng: rand::rngs::StdRng::from_entropy(),
        }
    }

    /// Seed a simulated TRNG deterministically, for reproducible tests.
    pub fn from_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        SimulatedTrng {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }
}

#[cfg(feature = "std")]
impl TrueRng for SimulatedTrng {
    fn next_word(&mut self) -> u32 {
        use rand::RngCore;
        self.rng.next_u32()
    }
}
