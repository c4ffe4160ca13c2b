// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel tunables and the user address-space layout

use x86_64::structures::paging::{Page, PageSize, Size4KiB};
use x86_64::VirtAddr;

/// Number of process table slots
pub const MAX_PROCS: usize = 256;

/// Page granularity used for stack growth and heap resizing
pub const PAGE_SIZE: u64 = Size4KiB::SIZE;

/// Top of the user stack region (exclusive), first push lands just below it
pub const USER_STACK_TOP: u64 = 0x0000_7FFF_FFFF_F000;

/// Maximum size the user stack may grow to (8 MiB)
pub const USER_STACK_SIZE: u64 = 8 * 1024 * 1024;

/// User memory layout
///
/// The stack region is `[stack_top - stack_size, stack_top)`. Faults inside
/// it grow the stack; the heap may never grow into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserLayout {
    /// Top of the stack region (exclusive, page aligned)
    pub stack_top: VirtAddr,

    /// Size of the stack region in bytes (page multiple)
    pub stack_size: u64,
}

impl UserLayout {
    /// Create a layout with a custom stack region
    ///
    /// # Panics
    ///
    /// Panics if the region is not page aligned or does not fit below `stack_top`.
    pub fn new(stack_top: VirtAddr, stack_size: u64) -> Self {
        assert!(stack_top.is_aligned(PAGE_SIZE), "stack top not page aligned");
        assert!(stack_size % PAGE_SIZE == 0, "stack size not a page multiple");
        assert!(stack_size <= stack_top.as_u64(), "stack region underflows");

        Self { stack_top, stack_size }
    }

    /// Lowest address of the stack region
    pub fn stack_bottom(&self) -> VirtAddr {
        self.stack_top - self.stack_size
    }

    /// Check whether an address lies inside the stack region
    pub fn in_stack_region(&self, addr: VirtAddr) -> bool {
        addr >= self.stack_bottom() && addr < self.stack_top
    }

    /// Page holding the first stack slot below the top
    pub fn top_page(&self) -> Page<Size4KiB> {
        Page::containing_address(self.stack_top - 1u64)
    }
}

impl Default for UserLayout {
    fn default() -> Self {
        Self::new(VirtAddr::new(USER_STACK_TOP), USER_STACK_SIZE)
    }
}
