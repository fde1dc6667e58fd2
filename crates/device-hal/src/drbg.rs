//! Blake2s-in-counter-mode deterministic bit generator (C3)
//!
//! State is 16 words (64 bytes): words 0..8 carry forward the previous digest,
//! words 8..16 are TRNG-seeded and periodically reseeded. Word 15 additionally
//! absorbs a monotonically increasing counter before each compression, so two
//! consecutive blocks never compress the same 64-byte state even between
//! reseeds.

use crate::cdi::DeviceSecret;
use crate::entropy::TrueRng;
use crate::{HalError, HalResult};
use blake2::{Blake2s256, Digest};
use zeroize::Zeroize;

/// Output blocks between automatic TRNG reseeds of the upper state half.
pub const RESEED_TIME: u32 = 1000;

/// Blake2s counter-mode DRBG, seeded from the CDI and a [`TrueRng`].
pub struct Drbg<R: TrueRng> {
    state: [u32; 16],
    counter: u32,
    rng: R,
}

impl<R: TrueRng> Drbg<R> {
    /// Initialize: words 0..8 from the CDI, words 8..16 from eight TRNG draws,
    /// counter at zero.
    pub fn new(cdi: &DeviceSecret, mut rng: R) -> Self {
        let mut state = [0u32; 16];
        for (i, word) in cdi.as_bytes().chunks_exact(4).enumerate() {
            state[i] = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
        }
        let mut upper = [0u32; 8];
        rng.reseed_words(&mut upper);
        state[8..16].copy_from_slice(&upper);
        upper.zeroize();

        Drbg {
            state,
            counter: 0,
            rng,
        }
    }

    /// Fill `out` with `out.len()` bytes of DRBG output.
    ///
    /// `out.len()` must be a multiple of 16; a length of zero succeeds trivially.
    pub fn generate(&mut self, out: &mut [u8]) -> HalResult<()> {
        if out.is_empty() {
            return Ok(());
        }
        if out.len() % 16 != 0 {
            return Err(HalError::BadGenerateLength(out.len()));
        }

        for block in out.chunks_exact_mut(16) {
            let mut state_bytes = [0u8; 64];
            for (i, word) in self.state.iter().enumerate() {
                state_bytes[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
            }

            let mut hasher = Blake2s256::new();
            hasher.update(state_bytes);
            let digest = hasher.finalize();
            state_bytes.zeroize();

            for (i, chunk) in block.chunks_exact_mut(4).enumerate() {
                chunk.copy_from_slice(&digest[i * 4..i * 4 + 4]);
            }

            self.advance(&digest);
        }

        Ok(())
    }

    fn advance(&mut self, digest: &[u8]) {
        for i in 0..8 {
            self.state[i] = u32::from_be_bytes([
                digest[i * 4],
                digest[i * 4 + 1],
                digest[i * 4 + 2],
                digest[i * 4 + 3],
            ]);
        }

        self.counter = self.counter.wrapping_add(1);
        self.state[15] = self.state[15].wrapping_add(self.counter);

        if self.counter == RESEED_TIME {
            log::trace!("DRBG reseed at {RESEED_TIME} output blocks");
            let mut upper = [0u32; 8];
            self.rng.reseed_words(&mut upper);
            self.state[8..16].copy_from_slice(&upper);
            upper.zeroize();
            self.counter = 0;
        }
    }
}

impl<R: TrueRng> Drop for Drbg<R> {
    fn drop(&mut self) {
        self.state.zeroize();
        self.counter.zeroize();
    }
}
