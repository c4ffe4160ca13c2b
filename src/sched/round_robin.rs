// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Round-Robin Scheduler
//!
//! Every call to [`Scheduler::schedule_next`] moves the cursor forward to the
//! next Runnable slot, wrapping around the table. With `k` Runnable
//! processes, `k` consecutive calls dispatch each of them exactly once.

use crate::arch::CpuSnapshot;
use crate::config::{UserLayout, MAX_PROCS};
use crate::error::{fatal, FatalError};
use crate::mm::MemoryManager;
use crate::process::{ProcessId, ProcessState, ProcessTable};

/// ============================================================================
/// Dispatch Decision
/// ============================================================================

/// What the trap layer must install to resume the chosen process
#[derive(Debug)]
pub struct Dispatch<'a, A, C> {
    /// Process that now owns the CPU
    pub pid: ProcessId,

    /// Registers to restore
    pub snapshot: &'a C,

    /// Address space to activate
    pub address_space: &'a A,
}

/// ============================================================================
/// Scheduler Context
/// ============================================================================

/// Scheduling context: process table, memory manager and user layout
pub struct Scheduler<M: MemoryManager, C, const N: usize = MAX_PROCS> {
    pub(crate) table: ProcessTable<M::AddressSpace, C, N>,
    pub(crate) memory: M,
    pub(crate) layout: UserLayout,
}

impl<M: MemoryManager, C: CpuSnapshot, const N: usize> Scheduler<M, C, N> {
    /// Create a scheduler with the default user layout
    pub fn new(memory: M) -> Self {
        Self::with_layout(memory, UserLayout::default())
    }

    /// Create a scheduler with a custom user layout
    pub fn with_layout(memory: M, layout: UserLayout) -> Self {
        Self {
            table: ProcessTable::new(),
            memory,
            layout,
        }
    }

    /// Get the process table
    pub fn table(&self) -> &ProcessTable<M::AddressSpace, C, N> {
        &self.table
    }

    /// Get the memory manager
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Get the memory manager (mutable)
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Get the user layout
    pub fn layout(&self) -> &UserLayout {
        &self.layout
    }

    /// PID of the Running process
    pub fn current_pid(&self) -> Option<ProcessId> {
        self.table.running_pid()
    }

    /// Choose the next process to run
    ///
    /// 1. Demote the Running process (if any) to Runnable
    /// 2. Find the next Runnable slot after the cursor, wrapping around
    /// 3. Promote it to Running and move the cursor
    ///
    /// Terminated processes are skipped. Halts the kernel if nothing is
    /// Runnable.
    pub fn schedule_next(&mut self) -> Dispatch<'_, M::AddressSpace, C> {
        let previous = self.table.current_pid();

        if let Some(process) = self.table.running_mut() {
            process.state = ProcessState::Runnable;
        }

        let next = self
            .table
            .find_next_runnable(previous)
            .unwrap_or_else(|| fatal(FatalError::NoRunnableProcess));

        self.table.set_current(next);

        let process = self
            .table
            .get_mut(next)
            .unwrap_or_else(|| fatal(FatalError::CorruptedInvariant("runnable slot is vacant")));
        process.state = ProcessState::Running;

        #[cfg(feature = "trace-sched")]
        log::trace!(
            "[sched] dispatch pid {} (from {:?}) ip={:#x}",
            next,
            previous,
            process.snapshot.instruction_pointer().as_u64()
        );

        Dispatch {
            pid: next,
            snapshot: &process.snapshot,
            address_space: &process.address_space,
        }
    }

    /// Store the interrupted registers into the Running process
    ///
    /// No-op when nothing is Running (the interrupt came from the idle
    /// path or a terminated process).
    pub fn process_save(&mut self, snapshot: &C) {
        if let Some(process) = self.table.running_mut() {
            process.snapshot.clone_from(snapshot);
        }
    }

    /// Timer preemption: save the interrupted registers, then reschedule
    pub fn preempt(&mut self, snapshot: &C) -> Dispatch<'_, M::AddressSpace, C> {
        self.process_save(snapshot);
        self.schedule_next()
    }
}
