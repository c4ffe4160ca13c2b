// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Architecture Abstraction
//!
//! The scheduling core never looks inside a saved register set. It only
//! needs the handful of operations in [`CpuSnapshot`]; each architecture
//! provides the concrete layout its trap entry code saves and restores.

pub mod amd64;

use x86_64::VirtAddr;

/// Saved user register state of a suspended process
///
/// Implementations are plain values: the table stores one per process and
/// copies them in and out on preemption.
pub trait CpuSnapshot: Clone {
    /// Register state of a fresh user process
    ///
    /// User code/stack selectors, interrupts enabled, everything else zero.
    fn user_default() -> Self;

    /// Address execution resumes at
    fn instruction_pointer(&self) -> VirtAddr;

    /// Set the address execution resumes at
    fn set_instruction_pointer(&mut self, ip: VirtAddr);

    /// User stack pointer
    fn stack_pointer(&self) -> VirtAddr;

    /// Set the user stack pointer
    fn set_stack_pointer(&mut self, sp: VirtAddr);

    /// Value the interrupted syscall returns
    fn return_value(&self) -> u64;

    /// Set the value the interrupted syscall returns
    fn set_return_value(&mut self, value: u64);
}
