//! Core traits shared between task context and interrupt handlers.

pub mod sync;

pub use sync::{CsState, SharedState};
