// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Integration Tests
//!
//! Scenarios that drive the scheduler the way the trap and syscall layers
//! do, across process, scheduling and memory operations.


use x86_64::VirtAddr;

use crate::arch::amd64::CpuState;
use crate::mm::MemoryManager;
use crate::process::ProcessId;
use crate::sched::Scheduler;
use crate::testing::FakeMemory;

/// Scheduler with a four-slot table
type SmallScheduler = Scheduler<FakeMemory, CpuState, 4>;

const ENTRY: u64 = 0x40_0000;
const DATA_START: u64 = 0x60_0000;
const DATA_END: u64 = 0x60_1000;

/// Admit a process whose heap starts at the data segment
fn spawn<const N: usize>(sched: &mut Scheduler<FakeMemory, CpuState, N>) -> ProcessId {
    let space = sched
        .memory_mut()
        .create_address_space()
        .expect("fake address space");
    sched.start_task(
        space,
        VirtAddr::new(ENTRY),
        VirtAddr::new(DATA_START),
        VirtAddr::new(DATA_END),
    )
}
