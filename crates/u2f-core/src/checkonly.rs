//! `U2F_CHECKONLY`: validate a previously issued key handle without signing
//! anything or consulting the touch sensor.
//!
//! Grounded on `u2f_checkonly` in the original `u2f.c`.

use crate::keyhandle::{recompute, KeyHandle};
use device_hal::DeviceSecret;

/// Recompute the private key and tag for `(app_param, handle)` and report
/// whether the embedded tag matches — i.e. whether this device's secret
/// produced `handle` under this `app_param`.
pub fn check_only(secret: &DeviceSecret, app_param: &[u8; 32], handle: &KeyHandle) -> bool {
    recompute(secret, app_param, handle).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyhandle::{derive_private_key, derive_tag};

    fn handle_for(secret: &DeviceSecret, app_param: &[u8; 32], nonce: [u8; 32]) -> KeyHandle {
        let priv_key = derive_private_key(secret, app_param, &nonce);
        let tag = derive_tag(secret, app_param, &priv_key);
        KeyHandle { nonce, tag }
    }

    #[test]
    fn test_genuine_handle_is_valid() {
        let secret = DeviceSecret::from_bytes([3u8; 32]);
        let app_param = [0x10u8; 32];
        let handle = handle_for(&secret, &app_param, [0x20u8; 32]);
        assert!(check_only(&secret, &app_param, &handle));
    }

    #[test]
    fn test_forged_tag_is_invalid() {
        let secret = DeviceSecret::from_bytes([3u8; 32]);
        let app_param = [0x10u8; 32];
        let mut handle = handle_for(&secret, &app_param, [0x20u8; 32]);
        handle.tag[0] ^= 0xFF;
        assert!(!check_only(&secret, &app_param, &handle));
    }

    #[test]
    fn test_handle_from_other_relying_party_is_invalid() {
        let secret = DeviceSecret::from_bytes([3u8; 32]);
        let app_a = [0xAAu8; 32];
        let app_b = [0xBBu8; 32];
        let handle = handle_for(&secret, &app_a, [0x30u8; 32]);
        assert!(!check_only(&secret, &app_b, &handle));
    }
}
