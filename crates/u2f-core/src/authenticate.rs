//! `U2F_AUTHENTICATE`: validate a key handle, optionally gate on user
//! presence, and produce an ECDSA signature over the challenge.
//!
//! Grounded on `u2f_authenticate` in the original `u2f.c`. The signing
//! preimage layout (`app_param ‖ presence ‖ counter ‖ chall_param`, SHA-256'd
//! before signing) is carried over unchanged from `sig_data` there.

use crate::ecdsa::sign_prehashed;
use crate::error::CoreError;
use crate::keyhandle::{recompute, KeyHandle};
use device_hal::{DeviceHal, LedColor};
use sha2::{Digest, Sha256};

/// Length of the signing preimage: `app_param(32) ‖ presence(1) ‖ counter(4) ‖ chall_param(32)`.
const PREIMAGE_LEN: usize = 32 + 1 + 4 + 32;

/// Result of an authentication attempt.
pub enum AuthenticateOutcome {
    /// The key handle's embedded tag did not match what this device's secret
    /// recomputes for `app_param`. Short-circuits without consulting the
    /// touch sensor or any cryptographic primitive beyond the MAC check.
    InvalidHandle,
    /// The handle was valid, `check_user` was set, and the user did not
    /// touch the sensor within the timeout.
    UserAbsent,
    /// The handle was valid and a signature was produced.
    Signed {
        /// Whether user presence was asserted in the signed preimage (always
        /// `false` when the caller did not request a presence check).
        presence: bool,
        /// The 64-byte `r ‖ s` ECDSA signature.
        signature: [u8; 64],
    },
}

/// Run `U2F_AUTHENTICATE` for `(app_param, chall_param, handle)`.
///
/// `counter` is supplied by the host and folded into the signed preimage
/// verbatim; the device does not maintain or validate it (§4.3, §9).
pub fn authenticate<H: DeviceHal>(
    hal: &mut H,
    app_param: &[u8; 32],
    chall_param: &[u8; 32],
    handle: &KeyHandle,
    check_user: bool,
    counter: [u8; 4],
) -> Result<AuthenticateOutcome, CoreError> {
    let (priv_key, valid) = recompute(hal.device_secret(), app_param, handle);
    if !valid {
        return Ok(AuthenticateOutcome::InvalidHandle);
    }

    let presence = if check_user {
        if !hal.wait_touched(LedColor::Green) {
            return Ok(AuthenticateOutcome::UserAbsent);
        }
        true
    } else {
        false
    };

    let mut preimage = [0u8; PREIMAGE_LEN];
    preimage[0..32].copy_from_slice(app_param);
    preimage[32] = presence as u8;
    preimage[33..37].copy_from_slice(&counter);
    preimage[37..69].copy_from_slice(chall_param);

    let hash: [u8; 32] = Sha256::digest(preimage).into();
    let signature = sign_prehashed(&priv_key, &hash)?;

    Ok(AuthenticateOutcome::Signed { presence, signature })
}
