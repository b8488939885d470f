//! Status LED - blinks at a rate that reflects the USB link state.
//!
//! ```text
//! NotAttached  →  250 ms
//! Attached     → 1000 ms
//! Suspended    → 2500 ms
//! ```
//!
//! The indicator is a pure consumer of the link state: the transport event
//! handlers change the interval, and `tick` is the only place the LED and
//! its phase move.

use crate::config;
use crate::error::Error;
use embedded_hal::digital::{OutputPin, PinState};

/// Coarse USB link state as observed by the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Not enumerated by a host (boot state).
    #[default]
    NotAttached,
    /// Configured by the host.
    Attached,
    /// Bus suspended by the host.
    Suspended,
}

/// LED blink period. Zero disables blinking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkInterval(u32);

impl BlinkInterval {
    /// Blinking disabled; `tick` leaves the LED alone.
    pub const DISABLED: Self = Self(0);

    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// The fixed link state → period mapping.
    pub const fn for_link_state(state: LinkState) -> Self {
        match state {
            LinkState::NotAttached => Self(config::BLINK_NOT_ATTACHED_MS),
            LinkState::Attached => Self(config::BLINK_ATTACHED_MS),
            LinkState::Suspended => Self(config::BLINK_SUSPENDED_MS),
        }
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    pub const fn is_disabled(self) -> bool {
        self.0 == 0
    }
}

impl From<LinkState> for BlinkInterval {
    fn from(state: LinkState) -> Self {
        Self::for_link_state(state)
    }
}

/// Drives one LED pin with a fixed-cadence toggle.
pub struct StatusIndicator<P> {
    pin: P,
    interval: BlinkInterval,
    /// Deadline base: advances by exactly one interval per toggle.
    last_toggle_ms: u64,
    phase: bool,
}

impl<P: OutputPin> StatusIndicator<P> {
    /// Create an indicator in the boot (not attached) cadence.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            interval: BlinkInterval::for_link_state(LinkState::NotAttached),
            last_toggle_ms: 0,
            phase: false,
        }
    }

    /// Current blink period.
    pub fn interval(&self) -> BlinkInterval {
        self.interval
    }

    /// Change the blink period. The next toggle is due one new period after
    /// the last toggle, so the cadence switches without resetting the phase.
    pub fn set_interval(&mut self, interval: BlinkInterval) {
        self.interval = interval;
    }

    /// Level last written to the LED (`false` before the first toggle).
    /// The next toggle writes its inverse.
    pub fn phase(&self) -> bool {
        self.phase
    }

    /// Toggle the LED if a full period has elapsed since the last toggle.
    ///
    /// Writes the pin at most once per call. When the caller fell behind by
    /// several periods the deadline catches up one period per call.
    pub fn tick(&mut self, now_ms: u64) {
        if self.interval.is_disabled() {
            return;
        }

        let interval = u64::from(self.interval.as_millis());
        if now_ms.saturating_sub(self.last_toggle_ms) < interval {
            return;
        }
        self.last_toggle_ms += interval;

        if let Err(e) = self.write(!self.phase) {
            warn!("Status LED write failed: {}", e);
        }
        self.phase = !self.phase;
    }

    fn write(&mut self, on: bool) -> Result<(), Error> {
        self.pin
            .set_state(PinState::from(on))
            .map_err(|_| Error::Indicator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingPin {
        writes: Rc<RefCell<Vec<bool>>>,
    }

    impl ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.writes.borrow_mut().push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.writes.borrow_mut().push(true);
            Ok(())
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = embedded_hal::digital::ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }
    }

    fn indicator() -> (StatusIndicator<RecordingPin>, Rc<RefCell<Vec<bool>>>) {
        let pin = RecordingPin::default();
        let writes = pin.writes.clone();
        (StatusIndicator::new(pin), writes)
    }

    #[test]
    fn interval_mapping() {
        assert_eq!(BlinkInterval::from(LinkState::NotAttached).as_millis(), 250);
        assert_eq!(BlinkInterval::from(LinkState::Attached).as_millis(), 1000);
        assert_eq!(BlinkInterval::from(LinkState::Suspended).as_millis(), 2500);
        assert!(BlinkInterval::DISABLED.is_disabled());
    }

    #[test]
    fn boots_in_not_attached_cadence() {
        let (led, _) = indicator();
        assert_eq!(led.interval(), BlinkInterval::for_link_state(LinkState::NotAttached));
        assert!(!led.phase());
    }

    #[test]
    fn no_toggle_before_interval() {
        let (mut led, writes) = indicator();
        led.set_interval(BlinkInterval::from_millis(1000));
        for now in 0..1000 {
            led.tick(now);
        }
        assert!(writes.borrow().is_empty());

        led.tick(1000);
        assert_eq!(*writes.borrow(), vec![true]);
        assert!(led.phase());
    }

    #[test]
    fn toggle_writes_inverted_phase() {
        let (mut led, writes) = indicator();
        let before = led.phase();
        led.tick(250);
        assert_eq!(*writes.borrow(), vec![!before]);
        assert_eq!(led.phase(), !before);

        // The pin always shows the phase after a toggle.
        led.tick(500);
        assert_eq!(writes.borrow().last().copied(), Some(led.phase()));
        assert_eq!(*writes.borrow(), vec![true, false]);
    }

    #[test]
    fn toggles_alternate_levels() {
        let (mut led, writes) = indicator();
        led.set_interval(BlinkInterval::from_millis(100));
        for now in (0..=400).step_by(10) {
            led.tick(now);
        }
        assert_eq!(*writes.borrow(), vec![true, false, true, false]);
    }

    #[test]
    fn period_does_not_drift_under_jitter() {
        let (mut led, writes) = indicator();
        led.set_interval(BlinkInterval::from_millis(1000));

        // Steps of 7 ms never land on a multiple of 1000 exactly, so a
        // "reset to now" implementation would lose up to 6 ms per toggle.
        let mut now = 0u64;
        let mut toggle_times = Vec::new();
        while now < 100_000 {
            let before = writes.borrow().len();
            led.tick(now);
            if writes.borrow().len() != before {
                toggle_times.push(now);
            }
            now += 7;
        }

        assert_eq!(toggle_times.len(), 99);
        for (n, t) in toggle_times.iter().enumerate() {
            let deadline = (n as u64 + 1) * 1000;
            assert!(*t >= deadline && *t < deadline + 7, "toggle {} at {}", n, t);
        }
    }

    #[test]
    fn disabled_never_toggles() {
        let (mut led, writes) = indicator();
        led.set_interval(BlinkInterval::DISABLED);
        for now in (0..1_000_000).step_by(1000) {
            led.tick(now);
        }
        assert!(writes.borrow().is_empty());
        assert!(!led.phase());
    }

    #[test]
    fn catches_up_one_period_per_tick() {
        let (mut led, writes) = indicator();
        led.set_interval(BlinkInterval::from_millis(100));

        // Stalled for 350 ms: three periods are due, one write per tick.
        led.tick(350);
        assert_eq!(writes.borrow().len(), 1);
        led.tick(350);
        led.tick(350);
        assert_eq!(writes.borrow().len(), 3);
        led.tick(350);
        assert_eq!(writes.borrow().len(), 3);
    }

    #[test]
    fn interval_change_keeps_deadline_base() {
        let (mut led, writes) = indicator();
        led.set_interval(BlinkInterval::from_millis(1000));
        led.tick(1000);
        assert_eq!(writes.borrow().len(), 1);

        led.set_interval(BlinkInterval::from_millis(2500));
        led.tick(2000);
        led.tick(3499);
        assert_eq!(writes.borrow().len(), 1);
        led.tick(3500);
        assert_eq!(writes.borrow().len(), 2);
    }

    #[test]
    fn pin_error_still_advances_phase() {
        let mut led = StatusIndicator::new(BrokenPin);
        led.set_interval(BlinkInterval::from_millis(10));
        led.tick(10);
        assert!(led.phase());
        led.tick(20);
        assert!(!led.phase());
    }
}
