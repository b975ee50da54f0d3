//! Synchronized state abstraction for state shared with interrupt handlers.
//!
//! The `SharedState` trait abstracts over the synchronisation mechanism so the
//! sensor registry can be exercised on the host with the same code that runs
//! on target.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Platform-agnostic synchronized state access.
///
/// # Example
///
/// ```ignore
/// fn bump<S: SharedState<u32>>(state: &S) -> u32 {
///     state.with_mut(|v| {
///         *v += 1;
///         *v
///     })
/// }
/// ```
pub trait SharedState<T> {
    /// Access state immutably.
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Access state mutably.
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

/// Critical-section protected state.
///
/// Safe to touch from both task context and interrupt handlers; each access
/// runs with interrupts masked, so closures must stay short.
pub struct CsState<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<T>>,
}

impl<T> CsState<T> {
    /// Creates a new `CsState` wrapping the given value.
    ///
    /// This is a const fn, allowing static initialization.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }
}

impl<T> SharedState<T> for CsState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}
