// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Process Management
//!
//! Process control blocks, the fixed-size process table, and the lifecycle
//! operations (setup, start, exit, kill, clone).
//!
//! # Process States
//!
//! ```text
//! Empty -> Runnable <-> Running -> Exited
//!                               -> Killed
//! ```
//!
//! A process only becomes `Running` through the scheduler. `Exited` and
//! `Killed` are terminal; the slot is never handed out again.

pub mod table;
pub mod lifecycle;

pub use table::ProcessTable;

use x86_64::VirtAddr;

use crate::arch::CpuSnapshot;
use crate::config::UserLayout;
use crate::mm::Region;

/// Process ID type (index into the process table)
pub type ProcessId = usize;

/// ============================================================================
/// Process State
/// ============================================================================

/// Process state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Slot is free
    Empty = 0,

    /// Process is waiting for the CPU
    Runnable = 1,

    /// Process owns the CPU
    Running = 2,

    /// Process terminated itself
    Exited = 3,

    /// Process was terminated by the kernel
    Killed = 4,
}

impl ProcessState {
    /// Check if the process can be picked by the scheduler
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Runnable)
    }

    /// Check if the process has terminated
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exited | Self::Killed)
    }
}

/// ============================================================================
/// Process Control Block
/// ============================================================================

/// Process control block
///
/// Exclusively owns its address space and saved register state.
pub struct Process<A, C> {
    pub(crate) state: ProcessState,

    /// Virtual memory context
    pub(crate) address_space: A,

    /// Registers the process resumes with
    pub(crate) snapshot: C,

    /// Heap, grows up from `start`
    pub(crate) heap: Region,

    /// Stack, `start` is the lowest mapped page, `end` the stack top
    pub(crate) stack: Region,

    /// Exit code or kill reason, once terminated
    pub(crate) exit_code: Option<i64>,

    /// Heap range whose frames are also mapped by a clone
    pub(crate) shared_heap: Option<Region>,
}

impl<A, C: CpuSnapshot> Process<A, C> {
    /// Create a Runnable process with default user registers
    pub(crate) fn new(address_space: A, layout: &UserLayout) -> Self {
        let mut snapshot = C::user_default();
        snapshot.set_stack_pointer(layout.stack_top);

        Self {
            state: ProcessState::Runnable,
            address_space,
            snapshot,
            heap: Region::default(),
            stack: Region::empty_at(layout.stack_top),
            exit_code: None,
            shared_heap: None,
        }
    }
}

impl<A, C> Process<A, C> {
    /// Get the process state
    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Get the address space
    pub fn address_space(&self) -> &A {
        &self.address_space
    }

    /// Get the saved register state
    pub fn snapshot(&self) -> &C {
        &self.snapshot
    }

    /// Get the heap region
    pub fn heap(&self) -> Region {
        self.heap
    }

    /// Get the stack region
    pub fn stack(&self) -> Region {
        self.stack
    }

    /// Current program break
    pub fn heap_end(&self) -> VirtAddr {
        self.heap.end
    }

    /// Exit code (or kill reason) of a terminated process
    pub fn exit_code(&self) -> Option<i64> {
        self.exit_code
    }

    /// Check whether heap frames are shared with a clone
    pub fn shares_heap(&self) -> bool {
        self.shared_heap.is_some()
    }

    /// Heap range mapped to the same frames as a clone
    pub fn shared_heap(&self) -> Option<Region> {
        self.shared_heap
    }
}
