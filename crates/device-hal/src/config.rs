//! Device timing configuration
//!
//! The original hard-codes these as C preprocessor constants
//! (`U2F_TOUCH_TIMEOUT_SECS`, `TKEY_HZ`). The touch timeout and device clock
//! rate are deployment-specific enough (a hosted simulation has no physical
//! clock at all) to be constructor parameters instead, the way the teacher
//! crate's threshold parameters are passed to `DkgCoordinator::new` rather
//! than baked in as constants. The DRBG's `RESEED_TIME` stays a protocol
//! constant (see [`crate::drbg::RESEED_TIME`]): it's part of the wire-visible
//! derivation scheme, not a timing knob.

/// Timing parameters for the touch gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// How long [`crate::touch::UserPresence::wait_touched`] waits for a touch
    /// before giving up. The original's `U2F_TOUCH_TIMEOUT_SECS`.
    pub touch_timeout_secs: u32,

    /// Device clock frequency in Hz, used to program the real timer's
    /// prescaler on hardware backends. The original's `TKEY_HZ`. Unused by
    /// the simulated backend, which has no physical timer to program.
    pub clock_hz: u32,
}

impl Default for DeviceConfig {
    /// The original firmware's constants: a 10 second touch timeout on an
    /// 18 MHz device clock.
    fn default() -> Self {
        DeviceConfig {
            touch_timeout_secs: 10,
            clock_hz: 18_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_original_firmware_constants() {
        let config = DeviceConfig::default();
        assert_eq!(config.touch_timeout_secs, 10);
        assert_eq!(config.clock_hz, 18_000_000);
    }
}
