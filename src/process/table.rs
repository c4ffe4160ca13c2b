// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Process Table
//!
//! Fixed-capacity table of process control blocks, indexed by pid, plus the
//! single scheduling cursor. A vacant slot is `Empty`; terminated processes
//! keep their slot so their exit code stays readable.

use super::{Process, ProcessId, ProcessState};
use crate::config::MAX_PROCS;

/// ============================================================================
/// Process Table
/// ============================================================================

/// Process table with `N` slots
pub struct ProcessTable<A, C, const N: usize = MAX_PROCS> {
    /// Process array (indexed by PID)
    processes: [Option<Process<A, C>>; N],

    /// Most recently scheduled process
    current: Option<ProcessId>,
}

impl<A, C, const N: usize> ProcessTable<A, C, N> {
    /// Create an empty process table
    pub fn new() -> Self {
        Self {
            processes: core::array::from_fn(|_| None),
            current: None,
        }
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Get a process by PID
    pub fn get(&self, pid: ProcessId) -> Option<&Process<A, C>> {
        self.processes.get(pid)?.as_ref()
    }

    /// Get a process by PID (mutable)
    pub fn get_mut(&mut self, pid: ProcessId) -> Option<&mut Process<A, C>> {
        self.processes.get_mut(pid)?.as_mut()
    }

    /// State of a slot, `Empty` when vacant or out of range
    pub fn state(&self, pid: ProcessId) -> ProcessState {
        self.get(pid).map_or(ProcessState::Empty, |process| process.state)
    }

    /// Lowest-numbered empty slot
    pub fn free_slot(&self) -> Option<ProcessId> {
        self.processes.iter().position(Option::is_none)
    }

    /// Install a process into an empty slot
    pub(crate) fn insert(&mut self, pid: ProcessId, process: Process<A, C>) {
        debug_assert!(self.processes[pid].is_none(), "slot {} already in use", pid);
        self.processes[pid] = Some(process);
    }

    /// Scheduling cursor (last process dispatched)
    pub fn current_pid(&self) -> Option<ProcessId> {
        self.current
    }

    pub(crate) fn set_current(&mut self, pid: ProcessId) {
        self.current = Some(pid);
    }

    /// PID of the Running process, if any
    pub fn running_pid(&self) -> Option<ProcessId> {
        self.current
            .filter(|&pid| self.state(pid) == ProcessState::Running)
    }

    /// The Running process
    pub fn running(&self) -> Option<&Process<A, C>> {
        self.get(self.running_pid()?)
    }

    /// The Running process (mutable)
    pub fn running_mut(&mut self) -> Option<&mut Process<A, C>> {
        let pid = self.running_pid()?;
        self.get_mut(pid)
    }

    /// Find the next Runnable process after `current`
    ///
    /// Scans `current + 1 .. N`, then wraps around to `0 ..= current`, so
    /// the process that just ran is picked only if nothing else is ready.
    /// With no cursor the scan starts at slot 0.
    pub fn find_next_runnable(&self, current: Option<ProcessId>) -> Option<ProcessId> {
        let start = current.map_or(0, |pid| pid + 1);

        (start..N)
            .chain(0..start)
            .find(|&pid| self.state(pid).is_runnable())
    }

    /// Occupied slots in pid order
    pub fn iter(&self) -> impl Iterator<Item = (ProcessId, &Process<A, C>)> {
        self.processes
            .iter()
            .enumerate()
            .filter_map(|(pid, slot)| slot.as_ref().map(|process| (pid, process)))
    }

    /// Number of slots in `state`
    pub fn count_in(&self, state: ProcessState) -> usize {
        (0..N).filter(|&pid| self.state(pid) == state).count()
    }
}

impl<A, C, const N: usize> Default for ProcessTable<A, C, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::amd64::CpuState;
    use crate::config::UserLayout;

    type Table = ProcessTable<(), CpuState, 4>;

    fn admit(table: &mut Table) -> ProcessId {
        let pid = table.free_slot().expect("table full");
        table.insert(pid, Process::new((), &UserLayout::default()));
        pid
    }

    #[test]
    fn test_free_slot_is_lowest() {
        let mut table = Table::new();
        assert_eq!(table.free_slot(), Some(0));
        assert_eq!(admit(&mut table), 0);
        assert_eq!(admit(&mut table), 1);
        assert_eq!(table.free_slot(), Some(2));
    }

    #[test]
    fn test_full_table_has_no_free_slot() {
        let mut table = Table::new();
        for _ in 0..4 {
            admit(&mut table);
        }
        assert_eq!(table.free_slot(), None);
        assert_eq!(table.count_in(ProcessState::Runnable), 4);
    }

    #[test]
    fn test_find_next_runnable_wraps() {
        let mut table = Table::new();
        for _ in 0..3 {
            admit(&mut table);
        }

        assert_eq!(table.find_next_runnable(None), Some(0));
        assert_eq!(table.find_next_runnable(Some(0)), Some(1));
        assert_eq!(table.find_next_runnable(Some(2)), Some(0));
        // Slot 3 is empty, so the scan wraps past it
        assert_eq!(table.find_next_runnable(Some(3)), Some(0));
    }

    #[test]
    fn test_find_next_runnable_picks_current_last() {
        let mut table = Table::new();
        admit(&mut table);
        assert_eq!(table.find_next_runnable(Some(0)), Some(0));

        table.get_mut(0).unwrap().state = ProcessState::Exited;
        assert_eq!(table.find_next_runnable(Some(0)), None);
    }

    #[test]
    fn test_running_requires_running_state() {
        let mut table = Table::new();
        let pid = admit(&mut table);
        table.set_current(pid);
        assert_eq!(table.running_pid(), None);

        table.get_mut(pid).unwrap().state = ProcessState::Running;
        assert_eq!(table.running_pid(), Some(pid));
        assert!(table.running().is_some());
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let table = Table::new();
        assert_eq!(table.state(17), ProcessState::Empty);
        assert!(table.get(17).is_none());
        assert_eq!(table.iter().count(), 0);
    }
}
