//! The two P-256 primitives the core consumes: keypair derivation from a raw
//! scalar, and deterministic ECDSA signing over a pre-hashed digest.
//!
//! Both are thin wrappers over RustCrypto's `p256` crate (see SPEC_FULL.md §9
//! Open Questions: `blake2`/`sha2`/`p256`, the same family the teacher crate
//! already depends on `sha2` from). Errors collapse to
//! [`CoreError::CryptoPrimitiveFailure`] with a fixed code, since `p256`'s own
//! `Error` carries no further detail the way the original's `p256-m` return
//! codes do.

use crate::error::CoreError;
use crate::keyhandle::PrivateKeyBytes;
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey};
use p256::FieldBytes;

/// Code surfaced in [`CoreError::CryptoPrimitiveFailure`] when `p256` rejects
/// a derived scalar as outside `[1, n-1]`. The original's `p256-m` returns a
/// library-specific non-zero code here; RustCrypto's `p256` does not expose
/// one, so this is a fixed sentinel.
pub const KEYGEN_REJECTED: u8 = 1;

/// Code surfaced when ECDSA signing itself fails (practically unreachable
/// once keygen from the same scalar has already succeeded).
pub const SIGN_FAILED: u8 = 2;

/// Derive the 64-byte uncompressed public point (`X ‖ Y`) for `priv`.
///
/// Fails if `priv` is not a valid P-256 scalar in `[1, n-1]` — matching
/// `p256_keypair_from_bytes`'s rejection criterion, at probability ~2⁻³².
pub fn derive_public_key(priv_key: &PrivateKeyBytes) -> Result<[u8; 64], CoreError> {
    let signing_key = SigningKey::from_bytes(FieldBytes::from_slice(&priv_key.0))
        .map_err(|_| CoreError::CryptoPrimitiveFailure(KEYGEN_REJECTED))?;
    let encoded = signing_key.verifying_key().to_encoded_point(false);
    let mut out = [0u8; 64];
    out.copy_from_slice(&encoded.as_bytes()[1..65]);
    Ok(out)
}

/// Deterministic (RFC 6979) ECDSA signature over a 32-byte pre-hashed digest,
/// returned as the 64-byte `r ‖ s` the original's `p256_ecdsa_sign` produces.
pub fn sign_prehashed(priv_key: &PrivateKeyBytes, hash: &[u8; 32]) -> Result<[u8; 64], CoreError> {
    let signing_key = SigningKey::from_bytes(FieldBytes::from_slice(&priv_key.0))
        .map_err(|_| CoreError::CryptoPrimitiveFailure(KEYGEN_REJECTED))?;
    let signature: Signature = signing_key
        .sign_prehash(hash)
        .map_err(|_| CoreError::CryptoPrimitiveFailure(SIGN_FAILED))?;
    let mut out = [0u8; 64];
    out.copy_from_slice(&signature.to_bytes());
    Ok(out)
}
