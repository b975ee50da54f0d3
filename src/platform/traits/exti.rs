//! External interrupt line trait

use crate::platform::Result;

/// External interrupt (pin trigger) line
///
/// The driver only initialises the line; dispatching the edge to the
/// driver's interrupt entry point is the board's job.
pub trait ExtiLine {
    /// Configure the pin and enable the interrupt for `line`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Exti` if the line cannot be routed.
    fn init(&mut self, line: u32) -> Result<()>;
}
