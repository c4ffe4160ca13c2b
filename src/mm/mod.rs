// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Memory Management Integration
//!
//! The scheduling core decides *when* memory is mapped, copied, shared or
//! released; the [`MemoryManager`] decides *how*. This module holds that
//! contract, the [`Region`] type tracked per process, and the page-fault
//! error code decoding.
//!
//! # Modules
//!
//! - [`demand`] - stack growth on fault and heap resizing (`sbrk`)

pub mod demand;

use bitflags::bitflags;
use x86_64::structures::paging::page::PageRange;
use x86_64::structures::paging::{Page, PhysFrame, Size4KiB};
use x86_64::VirtAddr;

use crate::config::PAGE_SIZE;
use crate::error::MemoryError;

/// ============================================================================
/// Memory Manager Contract
/// ============================================================================

/// Address-space and physical page services used by the scheduling core
///
/// The kernel's page-table code implements this. All operations are on 4 KiB
/// pages.
pub trait MemoryManager {
    /// Per-process virtual memory context (page table root)
    type AddressSpace;

    /// Create an empty user address space
    fn create_address_space(&mut self) -> Result<Self::AddressSpace, MemoryError>;

    /// Tear down an address space that was never admitted
    fn destroy_address_space(&mut self, space: Self::AddressSpace);

    /// Allocate one physical frame
    fn allocate_frame(&mut self) -> Result<PhysFrame<Size4KiB>, MemoryError>;

    /// Return a frame to the allocator
    fn free_frame(&mut self, frame: PhysFrame<Size4KiB>);

    /// Fill a frame with zeroes
    fn zero_frame(&mut self, frame: PhysFrame<Size4KiB>);

    /// Map `page` to `frame` as user read/write
    fn map(
        &mut self,
        space: &mut Self::AddressSpace,
        page: Page<Size4KiB>,
        frame: PhysFrame<Size4KiB>,
    ) -> Result<(), MemoryError>;

    /// Remove the mapping of `page`, returning the frame it referenced
    fn unmap(
        &mut self,
        space: &mut Self::AddressSpace,
        page: Page<Size4KiB>,
    ) -> Option<PhysFrame<Size4KiB>>;

    /// Frame currently backing `page`, if any
    fn translate(
        &self,
        space: &Self::AddressSpace,
        page: Page<Size4KiB>,
    ) -> Option<PhysFrame<Size4KiB>>;

    /// Give `to` a private copy of `page` from `from`
    ///
    /// Allocates a frame, copies the contents, and maps it at the same
    /// virtual address in `to`.
    fn copy_page(
        &mut self,
        from: &Self::AddressSpace,
        to: &mut Self::AddressSpace,
        page: Page<Size4KiB>,
    ) -> Result<(), MemoryError>;

    /// Allocate a zeroed frame and map it at `page`
    fn map_zeroed(
        &mut self,
        space: &mut Self::AddressSpace,
        page: Page<Size4KiB>,
    ) -> Result<PhysFrame<Size4KiB>, MemoryError> {
        let frame = self.allocate_frame()?;
        self.zero_frame(frame);

        if let Err(error) = self.map(space, page, frame) {
            self.free_frame(frame);
            return Err(error);
        }

        Ok(frame)
    }
}

/// ============================================================================
/// Region
/// ============================================================================

/// Half-open virtual address range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: VirtAddr,
    pub end: VirtAddr,
}

impl Region {
    /// Create a region
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: VirtAddr, end: VirtAddr) -> Self {
        assert!(
            start <= end,
            "region start {:#x} after end {:#x}",
            start.as_u64(),
            end.as_u64()
        );
        Self { start, end }
    }

    /// Empty region anchored at `addr`
    pub const fn empty_at(addr: VirtAddr) -> Self {
        Self { start: addr, end: addr }
    }

    /// Size in bytes
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Check whether the region covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether `addr` lies inside the region
    pub fn contains(&self, addr: VirtAddr) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Check whether any byte of `page` lies inside the region
    pub fn overlaps_page(&self, page: Page<Size4KiB>) -> bool {
        let page_start = page.start_address();
        !self.is_empty() && page_start < self.end && page_start + PAGE_SIZE > self.start
    }

    /// Every page overlapping the region
    pub fn pages(&self) -> PageRange<Size4KiB> {
        let first = Page::containing_address(self.start);
        if self.is_empty() {
            return Page::range(first, first);
        }

        Page::range(first, Page::containing_address(self.end.align_up(PAGE_SIZE)))
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::empty_at(VirtAddr::zero())
    }
}

// ============================================================================
// Page Fault Error Code
// ============================================================================

bitflags! {
    /// Page fault error code pushed by the CPU
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FaultFlags: u64 {
        /// Fault on a present page (protection violation)
        const PRESENT = 1 << 0;
        /// Write access
        const WRITE = 1 << 1;
        /// Access from user mode
        const USER = 1 << 2;
        /// Reserved bit set in a paging structure
        const RESERVED = 1 << 3;
        /// Instruction fetch
        const INSTRUCTION = 1 << 4;
        /// Protection key violation
        const PROTECTION_KEY = 1 << 5;
        /// SGX violation
        const SGX = 1 << 15;
    }
}

impl FaultFlags {
    /// Check whether the fault can be resolved by mapping a page
    pub fn is_demand_fault(&self) -> bool {
        !self.intersects(Self::PRESENT | Self::RESERVED | Self::PROTECTION_KEY | Self::SGX)
    }
}
