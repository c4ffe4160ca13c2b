// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! System Call Entry Points
//!
//! The syscall dispatcher decodes the syscall number and raw argument
//! registers, then calls one of these. Arguments arrive as raw `u64`
//! register values; results go back as a raw value.
//!
//! # Error Return Convention
//!
//! ```text
//! Success: return value (positive or zero)
//! Failure: negative error code (ProcessError::status)
//! ```
//!
//! After `sys_exit` the caller has no process to return to and must run
//! `schedule_next`.

use x86_64::VirtAddr;

use crate::arch::CpuSnapshot;
use crate::error::ProcessError;
use crate::mm::MemoryManager;
use crate::sched::Scheduler;

/// Syscall return type
pub type SyscallRet = i64;

/// Convert a result into a syscall return value
pub fn into_ret(result: Result<u64, ProcessError>) -> SyscallRet {
    match result {
        Ok(value) => value as SyscallRet,
        Err(error) => error.status(),
    }
}

/// exit(code): terminate the calling process
pub fn sys_exit<M: MemoryManager, C: CpuSnapshot, const N: usize>(
    sched: &mut Scheduler<M, C, N>,
    exit_code: u64,
) -> SyscallRet {
    into_ret(sched.exit(exit_code as i64).map(|_| 0))
}

/// clone(share_memory, entry): duplicate the calling process
///
/// `frame` is the live register state of the caller. It is saved into the
/// caller's PCB first so the child resumes from the syscall, not from the
/// last preemption point. The child's pid (or an error code) is written
/// back into `frame` and returned.
pub fn sys_clone<M: MemoryManager, C: CpuSnapshot, const N: usize>(
    sched: &mut Scheduler<M, C, N>,
    frame: &mut C,
    share_memory: u64,
    entry: u64,
) -> SyscallRet {
    sched.process_save(frame);

    let ret = into_ret(clone_entry(entry).and_then(|entry| {
        sched
            .clone_process(share_memory != 0, entry)
            .map(|pid| pid as u64)
    }));

    frame.set_return_value(ret as u64);
    ret
}

/// sbrk(delta): move the program break, returns the new break
pub fn sys_sbrk<M: MemoryManager, C: CpuSnapshot, const N: usize>(
    sched: &mut Scheduler<M, C, N>,
    delta: u64,
) -> SyscallRet {
    into_ret(sched.sbrk(delta as i64).map(|end| end.as_u64()))
}

/// Decode the clone entry argument, 0 means "resume like the parent"
fn clone_entry(raw: u64) -> Result<Option<VirtAddr>, ProcessError> {
    if raw == 0 {
        return Ok(None);
    }

    VirtAddr::try_new(raw)
        .map(Some)
        .map_err(|_| ProcessError::InvalidArgument)
}
