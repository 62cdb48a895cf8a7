use std::fmt::Debug;
use std::thread;
use std::time::Duration;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use tracing::{debug, warn};

/// Feedback patterns shown to the person at the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Slow blink while waiting for a finger
    Waiting,
    /// Short fast blink after a failed step
    Failure,
    /// Solid light after a successful step
    Success,
    /// Blink shown before the lockout wait
    Lockout,
}

pub trait Indicator {
    fn signal(&mut self, signal: Signal);

    /// Blocks for `duration`.
    fn pause(&mut self, duration: Duration);
}

const SUCCESS_HOLD: Duration = Duration::from_secs(3);

/// A single LED on a digital output pin.
#[derive(Debug)]
pub struct Led<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Led<P, D>
where
    P: OutputPin,
    P::Error: Debug,
    D: DelayMs<u64>,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    pub fn on(&mut self) {
        if let Err(e) = self.pin.set_high() {
            warn!(error = ?e, "could not switch LED on");
        }
    }

    pub fn off(&mut self) {
        if let Err(e) = self.pin.set_low() {
            warn!(error = ?e, "could not switch LED off");
        }
    }

    /// On for `rate`, off for `rate`, `times` times over.
    pub fn blink(&mut self, rate: Duration, times: u32) {
        for _ in 0..times {
            self.on();
            self.sleep(rate);
            self.off();
            self.sleep(rate);
        }
    }

    /// Solid light for `duration`, then off.
    pub fn hold(&mut self, duration: Duration) {
        self.on();
        self.sleep(duration);
        self.off();
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn sleep(&mut self, duration: Duration) {
        self.delay.delay_ms(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
    }
}

impl<P, D> Indicator for Led<P, D>
where
    P: OutputPin,
    P::Error: Debug,
    D: DelayMs<u64>,
{
    fn signal(&mut self, signal: Signal) {
        debug!(?signal, "LED");
        match signal {
            Signal::Waiting => self.blink(Duration::from_secs(1), 5),
            Signal::Failure => self.blink(Duration::from_millis(100), 3),
            Signal::Success => self.hold(SUCCESS_HOLD),
            Signal::Lockout => self.blink(Duration::from_millis(500), 5),
        }
    }

    fn pause(&mut self, duration: Duration) {
        self.sleep(duration);
    }
}

/// Used when no LED is wired up. Signals are only logged.
#[derive(Debug, Default)]
pub struct NoLed;

impl Indicator for NoLed {
    fn signal(&mut self, signal: Signal) {
        debug!(?signal, "no LED configured");
    }

    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
