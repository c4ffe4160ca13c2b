// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Process Lifecycle
//!
//! Admission ([`setup_process`](Scheduler::setup_process),
//! [`start_task`](Scheduler::start_task)), termination
//! ([`exit`](Scheduler::exit), [`kill`](Scheduler::kill)) and duplication
//! ([`clone_process`](Scheduler::clone_process)).
//!
//! Termination does not reschedule. The caller runs `schedule_next` before
//! returning to user space.

use x86_64::VirtAddr;

use super::{Process, ProcessId, ProcessState};
use crate::arch::CpuSnapshot;
use crate::error::{fatal, FatalError, MemoryError, ProcessError};
use crate::mm::{MemoryManager, Region};
use crate::sched::Scheduler;

impl<M: MemoryManager, C: CpuSnapshot, const N: usize> Scheduler<M, C, N> {
    /// Admit a process in the lowest free slot
    ///
    /// The process is Runnable with default user registers, an empty heap at
    /// address zero and an empty stack at the stack top. Halts the kernel if
    /// the table is full.
    pub fn setup_process(&mut self, address_space: M::AddressSpace) -> ProcessId {
        let pid = self
            .table
            .free_slot()
            .unwrap_or_else(|| fatal(FatalError::OutOfProcessIds));

        self.table.insert(pid, Process::new(address_space, &self.layout));
        log::debug!("[proc] pid {} admitted", pid);

        pid
    }

    /// Admit a process that starts executing at `entry`
    ///
    /// The heap begins as the static data segment `[data_start, data_end)`.
    pub fn start_task(
        &mut self,
        address_space: M::AddressSpace,
        entry: VirtAddr,
        data_start: VirtAddr,
        data_end: VirtAddr,
    ) -> ProcessId {
        if entry.is_null() {
            fatal(FatalError::NullEntryPoint);
        }
        if data_start > data_end {
            fatal(FatalError::InvalidImageBounds);
        }

        let stack_top = self.layout.stack_top;
        let pid = self.setup_process(address_space);

        let process = self
            .table
            .get_mut(pid)
            .unwrap_or_else(|| fatal(FatalError::CorruptedInvariant("admitted slot is vacant")));
        process.snapshot.set_instruction_pointer(entry);
        process.snapshot.set_stack_pointer(stack_top);
        process.heap = Region::new(data_start, data_end);

        log::info!(
            "[proc] pid {} started at {:#x} (data {:#x}..{:#x})",
            pid,
            entry.as_u64(),
            data_start.as_u64(),
            data_end.as_u64()
        );

        pid
    }

    /// Terminate the Running process voluntarily
    pub fn exit(&mut self, code: i64) -> Result<ProcessId, ProcessError> {
        let pid = self.terminate(ProcessState::Exited, code)?;
        log::info!("[proc] pid {} exited with code {}", pid, code);
        Ok(pid)
    }

    /// Terminate the Running process on a kernel decision
    pub fn kill(&mut self, reason: i64) -> Result<ProcessId, ProcessError> {
        let pid = self.terminate(ProcessState::Killed, reason)?;
        log::warn!("[proc] pid {} killed (reason {})", pid, reason);
        Ok(pid)
    }

    fn terminate(&mut self, state: ProcessState, code: i64) -> Result<ProcessId, ProcessError> {
        let pid = self.table.running_pid().ok_or(ProcessError::NoRunningProcess)?;
        let process = self.table.get_mut(pid).ok_or(ProcessError::NoRunningProcess)?;

        process.state = state;
        process.exit_code = Some(code);

        Ok(pid)
    }

    /// Duplicate the Running process
    ///
    /// The child gets a new address space. Heap pages are copied, or mapped
    /// to the same frames when `share_memory` is set. Stack pages are always
    /// copied. A shared clone with an `entry` starts there (thread style);
    /// otherwise it resumes where the parent does. The child sees a return
    /// value of 0.
    ///
    /// On memory exhaustion the partial child address space is destroyed
    /// and nothing is admitted.
    pub fn clone_process(
        &mut self,
        share_memory: bool,
        entry: Option<VirtAddr>,
    ) -> Result<ProcessId, ProcessError> {
        let parent_pid = self.table.running_pid().ok_or(ProcessError::NoRunningProcess)?;
        if share_memory && entry.is_some_and(|entry| entry.is_null()) {
            fatal(FatalError::NullEntryPoint);
        }
        if self.table.free_slot().is_none() {
            fatal(FatalError::OutOfProcessIds);
        }

        let parent = self
            .table
            .get(parent_pid)
            .ok_or(ProcessError::NoRunningProcess)?;

        let mut child_space = self.memory.create_address_space()?;
        if let Err(error) = duplicate_memory(&mut self.memory, parent, &mut child_space, share_memory) {
            self.memory.destroy_address_space(child_space);
            log::warn!("[proc] clone of pid {} failed: {}", parent_pid, error);
            return Err(error.into());
        }

        let heap = parent.heap;
        let stack = parent.stack;
        let mut snapshot = parent.snapshot.clone();
        if let (true, Some(entry)) = (share_memory, entry) {
            snapshot.set_instruction_pointer(entry);
        }
        snapshot.set_return_value(0);

        let child_pid = self.setup_process(child_space);
        let child = self
            .table
            .get_mut(child_pid)
            .unwrap_or_else(|| fatal(FatalError::CorruptedInvariant("admitted slot is vacant")));
        child.heap = heap;
        child.stack = stack;
        child.snapshot = snapshot;
        let shared = (share_memory && !heap.is_empty()).then_some(heap);
        child.shared_heap = shared;

        if let (Some(shared), Some(parent)) = (shared, self.table.get_mut(parent_pid)) {
            parent.shared_heap = Some(match parent.shared_heap {
                Some(earlier) => Region::new(
                    earlier.start.min(shared.start),
                    earlier.end.max(shared.end),
                ),
                None => shared,
            });
        }

        log::debug!(
            "[proc] pid {} cloned into pid {} ({} heap)",
            parent_pid,
            child_pid,
            if share_memory { "shared" } else { "copied" }
        );

        Ok(child_pid)
    }
}

/// Populate `child` with the parent's mapped heap and stack pages
fn duplicate_memory<M: MemoryManager, C>(
    memory: &mut M,
    parent: &Process<M::AddressSpace, C>,
    child: &mut M::AddressSpace,
    share_heap: bool,
) -> Result<(), MemoryError> {
    for page in parent.heap.pages() {
        let Some(frame) = memory.translate(&parent.address_space, page) else {
            continue;
        };

        if share_heap {
            memory.map(child, page, frame)?;
        } else {
            memory.copy_page(&parent.address_space, child, page)?;
        }
    }

    for page in parent.stack.pages() {
        if memory.translate(&parent.address_space, page).is_some() {
            memory.copy_page(&parent.address_space, child, page)?;
        }
    }

    Ok(())
}
