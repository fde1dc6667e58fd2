//! The device hardware bundle (C1–C4) behind one trait.
//!
//! Grounded on the teacher's `SecureElement` trait (`crates/hardware-hal/src/traits.rs`):
//! a single interface the protocol core programs against, with interchangeable
//! backends behind it. Here there is one real backend (memory-mapped registers,
//! not implemented in this hosted build) and one simulated backend used by tests
//! and the CLI harness.

use crate::cdi::DeviceSecret;
use crate::config::DeviceConfig;
use crate::drbg::Drbg;
use crate::entropy::TrueRng;
use crate::touch::{LedColor, UserPresence};
use crate::HalResult;

/// Everything the U2F protocol core needs from the device: the secret, the
/// DRBG, and the user-presence gate with its LED.
pub trait DeviceHal {
    /// Borrow the device secret (C1), for use as a MAC key.
    fn device_secret(&self) -> &DeviceSecret;

    /// Draw `out.len()` bytes from the DRBG (C3). See [`Drbg::generate`].
    fn generate(&mut self, out: &mut [u8]) -> HalResult<()>;

    /// Run the user-presence gate (C4) with the given LED color.
    fn wait_touched(&mut self, color: LedColor) -> bool;

    /// Drive the LED directly, without waiting — used by the dispatcher to set
    /// the idle "ready" color and to turn the LED off after a touch-gated
    /// operation completes.
    fn set_led(&mut self, color: LedColor);

    /// The timing configuration this HAL instance was constructed with.
    fn config(&self) -> &DeviceConfig;
}

/// A fully simulated [`DeviceHal`]: CDI supplied by the caller, DRBG backed by
/// a [`TrueRng`], touch gate backed by a [`UserPresence`].
#[cfg(feature = "std")]
pub struct SimulatedHal<R: TrueRng, P: UserPresence> {
    secret: DeviceSecret,
    drbg: Drbg<R>,
    presence: P,
    config: DeviceConfig,
}

#[cfg(feature = "std")]
impl<R: TrueRng, P: UserPresence> SimulatedHal<R, P> {
    /// Build a simulated HAL from a CDI, a TRNG backend, a touch backend, and
    /// a timing configuration.
    pub fn new(secret: DeviceSecret, rng: R, presence: P, config: DeviceConfig) -> Self {
        let drbg = Drbg::new(&secret, rng);
        SimulatedHal {
            secret,
            drbg,
            presence,
            config,
        }
    }
}

#[cfg(feature = "std")]
impl<R: TrueRng, P: UserPresence> DeviceHal for SimulatedHal<R, P> {
    fn device_secret(&self) -> &DeviceSecret {
        &self.secret
    }

    fn generate(&mut self, out: &mut [u8]) -> HalResult<()> {
        self.drbg.generate(out)
    }

    fn wait_touched(&mut self, color: LedColor) -> bool {
        self.presence.wait_touched(color, &self.config)
    }

    fn set_led(&mut self, color: LedColor) {
        self.presence.set_led(color);
    }

    fn config(&self) -> &DeviceConfig {
        &self.config
    }
}
