//! Compound Device Identity (C1)
//!
//! The CDI is handed to the application once, by the boot loader, derived from a
//! device root secret and the measurement of the loaded application. From the
//! application's point of view it is simply an immutable 32-byte secret, read at
//! startup and never rewritten.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// The device's 32-byte Compound Device Identity.
///
/// Used exclusively as the key of a keyed Blake2s MAC elsewhere in the core; never
/// serialized, logged, or otherwise exposed through the command surface.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DeviceSecret([u8; 32]);

impl DeviceSecret {
    /// Wrap raw CDI bytes read from the boot loader at startup.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        DeviceSecret(bytes)
    }

    /// Borrow the raw bytes for use as a MAC key. Callers must not copy this out
    /// anywhere that isn't itself zeroized on drop.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl core::fmt::Debug for DeviceSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceSecret").finish_non_exhaustive()
    }
}
