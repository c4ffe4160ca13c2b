// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! x86-64 Saved CPU State
//!
//! Register layout pushed by the amd64 interrupt entry stub. The trap layer
//! hands this to [`Scheduler::process_save`](crate::Scheduler::process_save)
//! and installs whatever `schedule_next` returns before `iretq`.

use x86_64::registers::rflags::RFlags;
use x86_64::structures::gdt::SegmentSelector;
use x86_64::{PrivilegeLevel, VirtAddr};

use super::CpuSnapshot;

/// GDT index of the user data/stack segment
pub const USER_DATA_INDEX: u16 = 4;

/// GDT index of the 64-bit user code segment
pub const USER_CODE_INDEX: u16 = 5;

/// User code selector (0x2B)
pub fn user_code_selector() -> SegmentSelector {
    SegmentSelector::new(USER_CODE_INDEX, PrivilegeLevel::Ring3)
}

/// User stack selector (0x23)
pub fn user_stack_selector() -> SegmentSelector {
    SegmentSelector::new(USER_DATA_INDEX, PrivilegeLevel::Ring3)
}

/// RFLAGS for a fresh user process: IF set, reserved bit 1 set
pub fn user_rflags() -> u64 {
    RFlags::INTERRUPT_FLAG.bits() | 0x2
}

/// Saved CPU state of a user process
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    // General-purpose registers
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub r8:  u64,
    pub r9:  u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,

    // Interrupt return frame
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

impl CpuState {
    /// Create a zeroed register set
    pub const fn new() -> Self {
        Self {
            rax: 0, rbx: 0, rcx: 0, rdx: 0,
            rsi: 0, rdi: 0, rbp: 0,
            r8: 0, r9: 0, r10: 0, r11: 0,
            r12: 0, r13: 0, r14: 0, r15: 0,
            rip: 0,
            cs: 0,
            rflags: 0,
            rsp: 0,
            ss: 0,
        }
    }
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSnapshot for CpuState {
    fn user_default() -> Self {
        Self {
            cs: u64::from(user_code_selector().0),
            ss: u64::from(user_stack_selector().0),
            rflags: user_rflags(),
            ..Self::new()
        }
    }

    fn instruction_pointer(&self) -> VirtAddr {
        VirtAddr::new_truncate(self.rip)
    }

    fn set_instruction_pointer(&mut self, ip: VirtAddr) {
        self.rip = ip.as_u64();
    }

    fn stack_pointer(&self) -> VirtAddr {
        VirtAddr::new_truncate(self.rsp)
    }

    fn set_stack_pointer(&mut self, sp: VirtAddr) {
        self.rsp = sp.as_u64();
    }

    // Syscall results come back in RAX
    fn return_value(&self) -> u64 {
        self.rax
    }

    fn set_return_value(&mut self, value: u64) {
        self.rax = value;
    }
}
