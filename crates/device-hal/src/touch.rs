//! User-presence gate (C4): timed wait for a physical touch, with LED feedback.

use crate::config::DeviceConfig;

/// LED colors the touch gate can drive while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    /// LED off
    Black,
    /// Steady/flashing blue — registration in progress
    Blue,
    /// Steady/flashing green — authentication in progress
    Green,
    /// Steady yellow — dispatcher idle, waiting for the next request
    Yellow,
}

/// Abstraction over the touch sensor, countdown timer, and LED.
///
/// A real implementation polls memory-mapped touch/timer/LED registers; a
/// simulated implementation (used in hosted builds and tests) can answer
/// immediately or never, driven by test fixtures.
pub trait UserPresence {
    /// Drive the LED to the given color (or off, for [`LedColor::Black`]).
    fn set_led(&mut self, color: LedColor);

    /// Block until either a touch event is observed or `timeout_secs` elapses.
    ///
    /// Implementations must clear any touch event latched before this call is
    /// entered — a stale touch must never satisfy the wait — and must leave no
    /// touch event latched on return, whichever way it resolves. Returns `true`
    /// on touch, `false` on timeout.
    fn wait_for_touch(&mut self, timeout_secs: u32) -> bool;

    /// Run the full user-presence gate for a given operation's LED color, using
    /// the touch timeout from `config`. Drives the LED off before returning,
    /// regardless of outcome.
    fn wait_touched(&mut self, color: LedColor, config: &DeviceConfig) -> bool {
        self.set_led(color);
        let touched = self.wait_for_touch(config.touch_timeout_secs);
        log::debug!("touch gate resolved: touched={touched}");
        self.set_led(LedColor::Black);
        touched
    }
}

/// Simulated touch gate for hosted builds and tests: the caller decides in
/// advance whether the simulated user touches the sensor.
#[cfg(feature = "std")]
pub struct SimulatedPresence {
    will_touch: bool,
    led: LedColor,
    touch_calls: u32,
}

#[cfg(feature = "std")]
impl SimulatedPresence {
    /// A simulated device where the user always touches when asked.
    pub fn always_touches() -> Self {
        SimulatedPresence {
            will_touch: true,
            led: LedColor::Black,
            touch_calls: 0,
        }
    }

    /// A simulated device where the user never touches, so every wait times out.
    pub fn never_touches() -> Self {
        SimulatedPresence {
            will_touch: false,
            led: LedColor::Black,
            touch_calls: 0,
        }
    }

    /// The LED color most recently set (for asserting on dispatcher behavior).
    pub fn current_led(&self) -> LedColor {
        self.led
    }

    /// How many times a touch wait has been entered, for asserting a gate was
    /// (or was not) consulted.
    pub fn touch_call_count(&self) -> u32 {
        self.touch_calls
    }
}

#[cfg(feature = "std")]
impl UserPresence for SimulatedPresence {
    fn set_led(&mut self, color: LedColor) {
        self.led = color;
    }

    fn wait_for_touch(&mut self, _timeout_secs: u32) -> bool {
        self.touch_calls += 1;
        self.will_touch
    }
}
