//! Hardware abstraction layer for the U2F token
//!
//! Provides the four leaf components the protocol core builds on:
//! - [`cdi`]: the device's Compound Device Identity, the secret root of all keys
//! - [`entropy`]: a blocking true-random-number word source
//! - [`drbg`]: a Blake2s-in-counter-mode deterministic bit generator seeded from the two above
//! - [`touch`]: the timed user-presence gate and LED
//!
//! [`framing`] implements the byte-oriented link the host talks over, and [`config`]
//! collects the timing/clock constants the original firmware hard-codes as C macros.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

pub mod cdi;
pub mod config;
pub mod drbg;
pub mod entropy;
pub mod framing;
pub mod hal;
pub mod touch;

pub use cdi::DeviceSecret;
pub use config::DeviceConfig;
pub use drbg::Drbg;
pub use entropy::TrueRng;
#[cfg(feature = "std")]
pub use entropy::SimulatedTrng;
pub use hal::DeviceHal;
#[cfg(feature = "std")]
pub use hal::SimulatedHal;
pub use touch::{LedColor, UserPresence};
#[cfg(feature = "std")]
pub use touch::SimulatedPresence;

use thiserror::Error;

/// Errors surfaced by the hardware abstraction layer
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HalError {
    /// `Drbg::generate` was asked for an output length that is not a multiple of 16
    #[error("DRBG output length must be a multiple of 16 bytes, got {0}")]
    BadGenerateLength(usize),

    /// A frame header byte could not be parsed
    #[error("malformed frame header byte {0:#04x}")]
    MalformedFrame(u8),

    /// The frame body length did not match what the header declared
    #[error("frame body length {got} does not match header length {expected}")]
    ShortRead {
        /// Bytes actually available
        got: usize,
        /// Bytes the header declared
        expected: usize,
    },
}

/// Result type for hardware abstraction operations
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_display() {
        let err = HalError::BadGenerateLength(17);
        assert_eq!(
            err.to_string(),
            "DRBG output length must be a multiple of 16 bytes, got 17"
        );
    }
}
