// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Demand Paging
//!
//! Stack pages are mapped lazily when the Running process faults inside the
//! stack region. Heap pages are mapped eagerly when the program break moves
//! up and released when it moves down.

use x86_64::structures::paging::{Page, Size4KiB};
use x86_64::VirtAddr;

use super::{FaultFlags, MemoryManager, Region};
use crate::arch::CpuSnapshot;
use crate::config::PAGE_SIZE;
use crate::error::ProcessError;
use crate::sched::Scheduler;

impl<M: MemoryManager, C: CpuSnapshot, const N: usize> Scheduler<M, C, N> {
    /// Try to resolve a page fault of the Running process
    ///
    /// Returns `true` if the faulting access can be retried: the address lies
    /// in the stack region, the fault is a not-present fault, and the page is
    /// now mapped (freshly, with a zeroed frame, or already by an earlier
    /// fault). Anything else returns `false` without touching process state
    /// and the caller escalates.
    pub fn handle_page_fault(&mut self, address: VirtAddr, error_code: u64) -> bool {
        let flags = FaultFlags::from_bits_truncate(error_code);

        if !self.layout.in_stack_region(address) {
            return false;
        }
        if !flags.is_demand_fault() {
            log::warn!(
                "[mm] protection fault at {:#x} ({:?})",
                address.as_u64(),
                flags
            );
            return false;
        }

        let Some(pid) = self.table.running_pid() else {
            return false;
        };
        let Some(process) = self.table.get_mut(pid) else {
            return false;
        };

        let page: Page<Size4KiB> = Page::containing_address(address);
        if self.memory.translate(&process.address_space, page).is_some() {
            return true;
        }

        if let Err(error) = self.memory.map_zeroed(&mut process.address_space, page) {
            log::warn!(
                "[mm] pid {} stack growth at {:#x} failed: {}",
                pid,
                address.as_u64(),
                error
            );
            return false;
        }

        let page_start = page.start_address();
        if page_start < process.stack.start {
            process.stack.start = page_start;
        }

        log::debug!("[mm] pid {} stack page {:#x} mapped", pid, page_start.as_u64());
        true
    }

    /// Move the program break of the Running process by `delta` bytes
    ///
    /// Growing maps a zeroed frame for every page of `[old_end, new_end)`
    /// that is not mapped yet. Shrinking unmaps every page lying entirely
    /// above the new end; frames are freed unless the page was shared with a
    /// clone. Returns the new break.
    ///
    /// The break may not drop below the heap start, overflow, or reach the
    /// stack region. If a frame cannot be allocated the break is unchanged;
    /// pages mapped before the failure stay mapped and are reused by the
    /// next attempt.
    pub fn sbrk(&mut self, delta: i64) -> Result<VirtAddr, ProcessError> {
        let pid = self.table.running_pid().ok_or(ProcessError::NoRunningProcess)?;
        let limit = self.layout.stack_bottom();
        let process = self.table.get_mut(pid).ok_or(ProcessError::NoRunningProcess)?;

        let old_end = process.heap.end;
        let new_end = old_end
            .as_u64()
            .checked_add_signed(delta)
            .and_then(|end| VirtAddr::try_new(end).ok())
            .filter(|&end| end >= process.heap.start && end <= limit)
            .ok_or(ProcessError::InvalidHeapSize)?;

        if new_end > old_end {
            let mut mapped = 0;
            for page in Region::new(old_end, new_end).pages() {
                if self.memory.translate(&process.address_space, page).is_none() {
                    self.memory.map_zeroed(&mut process.address_space, page)?;
                    mapped += 1;
                }
            }
            log::debug!("[mm] pid {} heap grew to {:#x} ({} new pages)", pid, new_end.as_u64(), mapped);
        } else if new_end < old_end {
            let released = Region::new(new_end.align_up(PAGE_SIZE), old_end.align_up(PAGE_SIZE));
            let mut unmapped = 0;
            for page in released.pages() {
                if let Some(frame) = self.memory.unmap(&mut process.address_space, page) {
                    let shared = process.shared_heap.is_some_and(|shared| shared.overlaps_page(page));
                    if !shared {
                        self.memory.free_frame(frame);
                    }
                    unmapped += 1;
                }
            }

            // Released pages are no longer shared from this side
            process.shared_heap = process.shared_heap.and_then(|shared| {
                let end = shared.end.min(released.start);
                (end > shared.start).then(|| Region::new(shared.start, end))
            });
            log::debug!("[mm] pid {} heap shrank to {:#x} ({} pages released)", pid, new_end.as_u64(), unmapped);
        }

        process.heap.end = new_end;
        Ok(new_end)
    }
}
