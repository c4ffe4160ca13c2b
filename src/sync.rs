// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Global Scheduler Holder
//!
//! The trap layer needs one scheduler context reachable from interrupt and
//! syscall entry. [`KernelCell`] is a once-initialized, spinlock-protected
//! slot for it:
//!
//! ```ignore
//! static SCHEDULER: KernelCell<Scheduler<PageTables, CpuState>> = KernelCell::new();
//!
//! SCHEDULER.init(Scheduler::new(page_tables));
//! SCHEDULER.with(|sched| sched.schedule_next().pid);
//! ```

use spin::{Mutex, Once};

use crate::error::{fatal, FatalError};

/// Once-initialized, lock-protected kernel global
pub struct KernelCell<T> {
    inner: Once<Mutex<T>>,
}

impl<T> KernelCell<T> {
    /// Create an uninitialized cell
    pub const fn new() -> Self {
        Self { inner: Once::new() }
    }

    /// Store the value
    ///
    /// Returns `false` (and drops `value`) if the cell was already
    /// initialized.
    pub fn init(&self, value: T) -> bool {
        let mut stored = false;
        self.inner.call_once(|| {
            stored = true;
            Mutex::new(value)
        });
        stored
    }

    /// Check whether the cell holds a value
    pub fn is_initialized(&self) -> bool {
        self.inner.is_completed()
    }

    /// Run `f` with exclusive access to the value
    ///
    /// Halts the kernel if the cell is uninitialized.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.try_with(f)
            .unwrap_or_else(|| fatal(FatalError::Uninitialized))
    }

    /// Run `f` with exclusive access, or return `None` if uninitialized
    pub fn try_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mutex = self.inner.get()?;
        let mut guard = mutex.lock();
        Some(f(&mut guard))
    }
}

impl<T> Default for KernelCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_once() {
        let cell = KernelCell::new();
        assert!(!cell.is_initialized());
        assert!(cell.init(1u32));
        assert!(!cell.init(2u32));
        assert_eq!(cell.with(|value| *value), 1);
    }

    #[test]
    fn test_with_mutates() {
        let cell = KernelCell::new();
        cell.init(0u32);
        cell.with(|value| *value += 5);
        assert_eq!(cell.try_with(|value| *value), Some(5));
    }

    #[test]
    fn test_try_with_uninitialized() {
        let cell: KernelCell<u32> = KernelCell::new();
        assert_eq!(cell.try_with(|value| *value), None);
    }

    #[test]
    #[should_panic(expected = "scheduler used before initialization")]
    fn test_with_uninitialized_halts() {
        let cell: KernelCell<u32> = KernelCell::new();
        cell.with(|value| *value);
    }
}
