//! Stateless credential scheme: key derivation, the key-handle format, and the
//! constant-time comparison that authenticates a handle.
//!
//! Outline, mirrored from the original `u2f.c` comment block:
//!
//! - `priv = MAC_S(app_param ‖ nonce)` — the private key is never stored, only
//!   ever recomputed from the two 32-byte values that produced it.
//! - `tag = MAC_S(app_param ‖ priv)` — the tag binds the handle to both the
//!   relying party and this device's secret.
//! - `key_handle = nonce ‖ tag` — the 64-byte opaque blob the host holds.
//!
//! Grounded on the teacher's `derived_key.rs` `kdf` (hash-based key derivation
//! from a secret plus external material) and on `hardware-hal/src/memory.rs`
//! `MemoryGuard::constant_time_eq` (branchless byte comparison), generalized
//! here to compare MAC tags instead of arbitrary buffers.

use blake2::digest::{KeyInit, Mac};
use blake2::Blake2sMac256;
use device_hal::DeviceSecret;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length in bytes of `app_param`, `chall_param`, a nonce, and a MAC tag.
pub const FIELD_LEN: usize = 32;
/// Length in bytes of a key handle (`nonce ‖ tag`).
pub const KEY_HANDLE_LEN: usize = 64;

/// A derived private key. Zeroized on drop; never serialized or logged.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyBytes(pub [u8; 32]);

impl AsRef<[u8]> for PrivateKeyBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 64-byte key handle: `nonce ‖ tag`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyHandle {
    /// The per-registration nonce drawn from the DRBG.
    pub nonce: [u8; FIELD_LEN],
    /// `MAC_S(app_param ‖ priv)`, authenticating the handle.
    pub tag: [u8; FIELD_LEN],
}

impl KeyHandle {
    /// Split a 64-byte wire key handle into its nonce and tag halves.
    pub fn from_bytes(bytes: &[u8; KEY_HANDLE_LEN]) -> Self {
        let mut nonce = [0u8; FIELD_LEN];
        let mut tag = [0u8; FIELD_LEN];
        nonce.copy_from_slice(&bytes[0..32]);
        tag.copy_from_slice(&bytes[32..64]);
        KeyHandle { nonce, tag }
    }

    /// Serialize back to the 64-byte wire format.
    pub fn to_bytes(&self) -> [u8; KEY_HANDLE_LEN] {
        let mut out = [0u8; KEY_HANDLE_LEN];
        out[0..32].copy_from_slice(&self.nonce);
        out[32..64].copy_from_slice(&self.tag);
        out
    }
}

/// `MAC_S(part1 ‖ part2)`, the keyed Blake2s MAC used for both the private
/// key and the handle tag.
pub fn blake2s_mac(secret: &DeviceSecret, part1: &[u8; 32], part2: &[u8; 32]) -> [u8; 32] {
    let mut mac = Blake2sMac256::new_from_slice(secret.as_bytes())
        .expect("a 32-byte key is always valid for Blake2sMac256");
    mac.update(part1);
    mac.update(part2);
    let tag = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&tag);
    out
}

/// Recompute the private key for `(app_param, nonce)`.
pub fn derive_private_key(
    secret: &DeviceSecret,
    app_param: &[u8; 32],
    nonce: &[u8; 32],
) -> PrivateKeyBytes {
    PrivateKeyBytes(blake2s_mac(secret, app_param, nonce))
}

/// Recompute the handle tag for `(app_param, priv)`.
pub fn derive_tag(secret: &DeviceSecret, app_param: &[u8; 32], priv_key: &PrivateKeyBytes) -> [u8; 32] {
    blake2s_mac(secret, app_param, &priv_key.0)
}

/// Constant-time comparison: traverses both slices in full regardless of
/// where they first diverge, accumulating differences with OR rather than
/// returning early. Equal-length inputs only; differing lengths are simply
/// unequal (this is never reached on a 32-byte tag vs. 32-byte tag compare).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (&x, &y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Recompute `priv` and the tag for a key handle, and report whether the
/// handle's embedded tag matches. Returns the recomputed private key either
/// way — callers must check `valid` before using it.
pub fn recompute(
    secret: &DeviceSecret,
    app_param: &[u8; 32],
    handle: &KeyHandle,
) -> (PrivateKeyBytes, bool) {
    let priv_key = derive_private_key(secret, app_param, &handle.nonce);
    let tag = derive_tag(secret, app_param, &priv_key);
    let valid = constant_time_eq(&tag, &handle.tag);
    (priv_key, valid)
}
