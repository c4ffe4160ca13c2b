// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Error Handling
//!
//! Two classes of failure exist in the scheduling core:
//!
//! - [`FatalError`] - a broken kernel invariant (no free pid, nothing to
//!   schedule, null entry point). These are never returned. They go through
//!   [`fatal`], which logs and halts; no scheduling decision happens after it.
//! - [`ProcessError`] / [`MemoryError`] - recoverable conditions returned to
//!   the syscall layer, which turns them into negative status codes.
//!
//! Page faults outside the stack region are neither: they come back as
//! `handled = false` and the fault dispatcher escalates.

use core::fmt;

/// ============================================================================
/// Fatal Errors
/// ============================================================================

/// Unrecoverable kernel conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalError {
    /// Every process table slot is occupied
    OutOfProcessIds,

    /// No process is in the Runnable state
    NoRunnableProcess,

    /// A process was started with a null entry point
    NullEntryPoint,

    /// The static data bounds of a process image are inverted
    InvalidImageBounds,

    /// The global scheduler context was used before initialization
    Uninitialized,

    /// Table state contradicts the scheduling cursor
    CorruptedInvariant(&'static str),
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfProcessIds => f.write_str("out of process ids"),
            Self::NoRunnableProcess => f.write_str("no process to schedule"),
            Self::NullEntryPoint => f.write_str("tried to start process without entry"),
            Self::InvalidImageBounds => f.write_str("process data segment ends before it starts"),
            Self::Uninitialized => f.write_str("scheduler used before initialization"),
            Self::CorruptedInvariant(what) => write!(f, "corrupted scheduler invariant: {}", what),
        }
    }
}

/// Halt the kernel on a broken invariant
///
/// This is the single top-level halt routine. The kernel is built with
/// `panic = "abort"`, so the panic never unwinds back into the scheduler.
#[cold]
#[track_caller]
pub fn fatal(error: FatalError) -> ! {
    log::error!("[fatal] {}", error);
    panic!("kernel halted: {}", error);
}

/// ============================================================================
/// Memory Manager Errors
/// ============================================================================

/// Failures reported by a [`MemoryManager`](crate::mm::MemoryManager)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// No physical frame available
    OutOfFrames,

    /// Page table structures could not be allocated
    OutOfPageTables,

    /// The page is already mapped in the target address space
    AlreadyMapped,

    /// The source page of a copy is not mapped
    NotMapped,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfFrames => f.write_str("out of physical frames"),
            Self::OutOfPageTables => f.write_str("out of page table memory"),
            Self::AlreadyMapped => f.write_str("page already mapped"),
            Self::NotMapped => f.write_str("page not mapped"),
        }
    }
}

/// ============================================================================
/// Process Errors
/// ============================================================================

/// Recoverable failures of lifecycle and heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessError {
    /// The operation needs a Running process and there is none
    NoRunningProcess,

    /// The requested heap end is below the heap start, overflows, or
    /// reaches into the stack region
    InvalidHeapSize,

    /// The memory manager ran out of memory
    OutOfMemory(MemoryError),

    /// A syscall argument is not a valid user address
    InvalidArgument,
}

impl ProcessError {
    /// Negative status code returned to user space
    pub const fn status(&self) -> i64 {
        match self {
            Self::NoRunningProcess => -1,
            Self::InvalidHeapSize => -2,
            Self::OutOfMemory(_) => -3,
            Self::InvalidArgument => -4,
        }
    }
}

impl From<MemoryError> for ProcessError {
    fn from(error: MemoryError) -> Self {
        Self::OutOfMemory(error)
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRunningProcess => f.write_str("no process is running"),
            Self::InvalidHeapSize => f.write_str("invalid heap size"),
            Self::OutOfMemory(inner) => write!(f, "out of memory: {}", inner),
            Self::InvalidArgument => f.write_str("invalid argument"),
        }
    }
}
