// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! # lfos-sched - Process Lifecycle and Scheduling Core
//!
//! This crate decides which process runs next, creates, clones and
//! terminates processes, and folds demand-paged memory growth (stack growth
//! on fault, heap `sbrk`) into process state.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── arch/              # Architecture register snapshots (amd64)
//! ├── mm/                # MemoryManager contract, regions, demand paging
//! ├── process/           # PCB, process table, lifecycle operations
//! ├── sched/             # Round-robin scheduler context
//! ├── ipc/               # Inter-process message wire format
//! ├── syscall.rs         # Raw-argument syscall entry points
//! ├── sync.rs            # Global holder for the scheduler context
//! └── error.rs           # Fatal halt routine and recoverable errors
//! ```
//!
//! ## Collaborators
//!
//! The core never touches page tables or physical memory itself. It is
//! generic over a [`MemoryManager`] (address spaces, frames, mappings) and a
//! [`CpuSnapshot`] (saved register state). The trap layer drives it:
//!
//! ```ignore
//! // Timer interrupt
//! let next = scheduler.preempt(frame);
//! install(next.snapshot, next.address_space);
//! ```
//!
//! ## Concurrency
//!
//! One core, one scheduling cursor. Calls into this crate are serialized by
//! the trap layer; [`sync::KernelCell`] holds the scheduler context when a
//! global is needed.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// Kernel tunables and user memory layout
pub mod config;

// Fatal halt routine and recoverable error types
pub mod error;

// Architecture-specific register snapshots
pub mod arch;

// Memory manager contract, regions, demand paging
pub mod mm;

// Process control blocks and lifecycle
pub mod process;

// Round-robin scheduler
pub mod sched;

// Inter-process message wire format
pub mod ipc;

// Syscall entry points
pub mod syscall;

// Global scheduler holder
pub mod sync;

// Test doubles for the memory manager
#[cfg(test)]
pub mod testing;

// Cross-module scenario tests
#[cfg(test)]
mod tests;

pub use config::{UserLayout, MAX_PROCS, PAGE_SIZE, USER_STACK_SIZE, USER_STACK_TOP};

pub use error::{fatal, FatalError, MemoryError, ProcessError};

pub use arch::{CpuSnapshot, amd64::CpuState};

pub use mm::{FaultFlags, MemoryManager, Region};

pub use process::{Process, ProcessId, ProcessState, ProcessTable};

pub use sched::{Dispatch, Scheduler};

pub use ipc::{Message, MessageError, MessageHeader};

pub use sync::KernelCell;
