//! Watchdog trait

/// Hardware watchdog
///
/// Long configuration waits are split into short delays with a kick between
/// each so the watchdog never fires during sensor bring-up.
pub trait Watchdog {
    /// Reload the watchdog counter
    fn clear(&mut self);
}
