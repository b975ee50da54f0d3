//! Mock delay and watchdog implementations for testing

use crate::platform::traits::Watchdog;
use embedded_hal::delay::DelayNs;

/// Mock delay
///
/// Accumulates simulated time instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    elapsed_ns: u64,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self { elapsed_ns: 0 }
    }

    /// Total simulated time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns = self.elapsed_ns.wrapping_add(u64::from(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ns = self
            .elapsed_ns
            .wrapping_add(u64::from(ms).saturating_mul(1_000_000));
    }
}

/// Mock watchdog counting kicks
#[derive(Debug, Default)]
pub struct MockWatchdog {
    clears: u32,
}

impl MockWatchdog {
    /// Create a new mock watchdog
    pub fn new() -> Self {
        Self { clears: 0 }
    }

    /// Number of times the watchdog was kicked
    pub fn clears(&self) -> u32 {
        self.clears
    }
}

impl Watchdog for MockWatchdog {
    fn clear(&mut self) {
        self.clears += 1;
    }
}
