//! Mock external interrupt line for testing

use crate::platform::{traits::ExtiLine, ExtiError, PlatformError, Result};
use std::vec::Vec;

/// Mock EXTI controller
#[derive(Debug, Default)]
pub struct MockExti {
    lines: Vec<u32>,
    fail: bool,
}

impl MockExti {
    /// Create a new mock EXTI controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `init` fail
    pub fn set_fail(&mut self, fail: bool) {
        self.fail = fail;
    }

    /// Lines initialised so far
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }
}

impl ExtiLine for MockExti {
    fn init(&mut self, line: u32) -> Result<()> {
        if self.fail {
            return Err(PlatformError::Exti(ExtiError::InvalidLine));
        }
        self.lines.push(line);
        Ok(())
    }
}
