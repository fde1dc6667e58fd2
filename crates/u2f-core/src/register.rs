//! `U2F_REGISTER`: draw a fresh nonce, derive a private key bound to it, and
//! return the resulting key handle and public key.
//!
//! Grounded on `u2f_register` in the original `u2f.c`, restated as a
//! `Result`-returning function over a [`device_hal::DeviceHal`] instead of an
//! out-parameter C function writing into a flat 129-byte buffer.

use crate::ecdsa::derive_public_key;
use crate::error::CoreError;
use crate::keyhandle::{derive_private_key, derive_tag, KeyHandle};
use device_hal::{DeviceHal, LedColor};

/// Result of a registration attempt.
pub enum RegisterOutcome {
    /// The user did not touch the sensor within the timeout. Per §4.3 step 1
    /// this is the terminal "not touched" case, not an error: the original
    /// returns a one-byte `{0}` payload and stops, without drawing a nonce or
    /// touching the cryptographic primitives at all.
    UserAbsent,
    /// A fresh key handle and the public key for its private key.
    Registered {
        /// The 64-byte `nonce ‖ tag` handle to return to the host.
        key_handle: KeyHandle,
        /// The 64-byte uncompressed public point (`X ‖ Y`).
        public_key: [u8; 64],
    },
}

/// Run `U2F_REGISTER` for `app_param`.
pub fn register<H: DeviceHal>(
    hal: &mut H,
    app_param: &[u8; 32],
) -> Result<RegisterOutcome, CoreError> {
    if !hal.wait_touched(LedColor::Blue) {
        return Ok(RegisterOutcome::UserAbsent);
    }

    let mut nonce = [0u8; 32];
    hal.generate(&mut nonce)
        .expect("a 32-byte draw is always a multiple of 16");

    let priv_key = derive_private_key(hal.device_secret(), app_param, &nonce);
    let public_key = derive_public_key(&priv_key)?;
    let tag = derive_tag(hal.device_secret(), app_param, &priv_key);

    Ok(RegisterOutcome::Registered {
        key_handle: KeyHandle { nonce, tag },
        public_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_hal::{DeviceConfig, DeviceSecret, SimulatedHal, SimulatedPresence, SimulatedTrng};

    fn hal_that_touches() -> SimulatedHal<SimulatedTrng, SimulatedPresence> {
        SimulatedHal::new(
            DeviceSecret::from_bytes([1u8; 32]),
            SimulatedTrng::from_seed(1),
            SimulatedPresence::always_touches(),
            DeviceConfig::default(),
        )
    }

    fn hal_that_times_out() -> SimulatedHal<SimulatedTrng, SimulatedPresence> {
        SimulatedHal::new(
            DeviceSecret::from_bytes([1u8; 32]),
            SimulatedTrng::from_seed(1),
            SimulatedPresence::never_touches(),
            DeviceConfig::default(),
        )
    }

    #[test]
    fn test_timeout_returns_user_absent_without_touching_crypto() {
        let mut hal = hal_that_times_out();
        let outcome = register(&mut hal, &[0u8; 32]).unwrap();
        assert!(matches!(outcome, RegisterOutcome::UserAbsent));
    }

    #[test]
    fn test_happy_path_yields_nonzero_nonce_and_public_key() {
        let mut hal = hal_that_touches();
        let outcome = register(&mut hal, &[0u8; 32]).unwrap();
        match outcome {
            RegisterOutcome::Registered {
                key_handle,
                public_key,
            } => {
                assert_ne!(key_handle.nonce, [0u8; 32]);
                assert_ne!(public_key, [0u8; 64]);
            }
            RegisterOutcome::UserAbsent => panic!("expected registration to succeed"),
        }
    }

    #[test]
    fn test_consecutive_registrations_yield_fresh_nonces() {
        let mut hal = hal_that_touches();
        let first = match register(&mut hal, &[0u8; 32]).unwrap() {
            RegisterOutcome::Registered { key_handle, .. } => key_handle,
            _ => panic!("expected registration to succeed"),
        };
        let second = match register(&mut hal, &[0u8; 32]).unwrap() {
            RegisterOutcome::Registered { key_handle, .. } => key_handle,
            _ => panic!("expected registration to succeed"),
        };
        assert_ne!(first.nonce, second.nonce);
    }

    #[test]
    fn test_resulting_handle_is_valid_under_checkonly() {
        let mut hal = hal_that_touches();
        let app_param = [0x42u8; 32];
        let key_handle = match register(&mut hal, &app_param).unwrap() {
            RegisterOutcome::Registered { key_handle, .. } => key_handle,
            _ => panic!("expected registration to succeed"),
        };
        assert!(crate::checkonly::check_only(
            hal.device_secret(),
            &app_param,
            &key_handle
        ));
    }
}
