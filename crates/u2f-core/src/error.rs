//! Errors raised by the U2F protocol core.
//!
//! Grounded on `FrostError` (`frost-core/src/lib.rs`): a flat, `thiserror`-derived
//! enum, one variant per failure kind the three U2F operations can actually
//! raise. The distilled spec's §7 error table also lists `BadLength`
//! (cmd body length ≠ expected), but that check happens entirely in
//! `crate::dispatcher` against the raw frame body before any operation is
//! called — there is no parsed value to hand an operation in that case, so
//! it never reaches this enum.

use thiserror::Error;

/// Errors surfaced by U2F core operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// `p256_keypair_from_bytes` or `p256_ecdsa_sign` rejected its input.
    /// The original treats this as vanishingly unlikely (~2⁻³²) for keygen;
    /// the wrapped byte is the primitive-defined code surfaced to the host.
    #[error("cryptographic primitive failure, code {0}")]
    CryptoPrimitiveFailure(u8),
}

/// Result type for U2F core operations.
pub type CoreResult<T> = Result<T, CoreError>;
