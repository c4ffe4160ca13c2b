// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! In-memory memory manager
//!
//! Frames are real 4 KiB buffers, so copies and shared mappings can be
//! observed by writing through one address space and reading through another.
//! Fresh frames are filled with garbage to catch missing zeroing.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use x86_64::structures::paging::{Page, PhysFrame, Size4KiB};
use x86_64::{PhysAddr, VirtAddr};

use crate::config::PAGE_SIZE;
use crate::error::MemoryError;
use crate::mm::MemoryManager;

/// Byte pattern of a frame that was never zeroed
pub const DIRTY_BYTE: u8 = 0xA5;

const FRAME_BASE: u64 = 0x10_0000;

/// Address space of the fake memory manager
#[derive(Debug, Default)]
pub struct FakeSpace {
    id: usize,
    mappings: BTreeMap<Page<Size4KiB>, PhysFrame<Size4KiB>>,
}

impl FakeSpace {
    /// Identifier assigned at creation
    pub fn id(&self) -> usize {
        self.id
    }
}

/// Memory manager backed by heap buffers
pub struct FakeMemory {
    frames: BTreeMap<PhysFrame<Size4KiB>, Box<[u8; PAGE_SIZE as usize]>>,
    free_list: Vec<PhysFrame<Size4KiB>>,
    next_frame: u64,
    frame_limit: Option<usize>,
    next_space: usize,
    destroyed: usize,
}

impl FakeMemory {
    /// Create a manager with unlimited frames
    pub fn new() -> Self {
        Self {
            frames: BTreeMap::new(),
            free_list: Vec::new(),
            next_frame: 0,
            frame_limit: None,
            next_space: 0,
            destroyed: 0,
        }
    }

    /// Create a manager that hands out at most `limit` frames at a time
    pub fn with_frame_limit(limit: usize) -> Self {
        Self {
            frame_limit: Some(limit),
            ..Self::new()
        }
    }

    /// Change the frame limit
    pub fn set_frame_limit(&mut self, limit: Option<usize>) {
        self.frame_limit = limit;
    }

    /// Frames currently allocated
    pub fn allocated_frames(&self) -> usize {
        self.frames.len()
    }

    /// Address spaces destroyed so far
    pub fn destroyed_spaces(&self) -> usize {
        self.destroyed
    }

    /// Pages mapped in `space`
    pub fn mapped_count(&self, space: &FakeSpace) -> usize {
        space.mappings.len()
    }

    /// Frame backing the page of `addr`
    pub fn frame_of(&self, space: &FakeSpace, addr: VirtAddr) -> Option<PhysFrame<Size4KiB>> {
        space.mappings.get(&Page::containing_address(addr)).copied()
    }

    /// Read one byte through `space`
    pub fn read_byte(&self, space: &FakeSpace, addr: VirtAddr) -> Option<u8> {
        let frame = self.frame_of(space, addr)?;
        let offset = (addr.as_u64() % PAGE_SIZE) as usize;
        self.frames.get(&frame).map(|data| data[offset])
    }

    /// Write one byte through `space`, returns `false` if unmapped
    pub fn write_byte(&mut self, space: &FakeSpace, addr: VirtAddr, value: u8) -> bool {
        let Some(frame) = self.frame_of(space, addr) else {
            return false;
        };
        let offset = (addr.as_u64() % PAGE_SIZE) as usize;
        match self.frames.get_mut(&frame) {
            Some(data) => {
                data[offset] = value;
                true
            }
            None => false,
        }
    }
}

impl Default for FakeMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryManager for FakeMemory {
    type AddressSpace = FakeSpace;

    fn create_address_space(&mut self) -> Result<FakeSpace, MemoryError> {
        let id = self.next_space;
        self.next_space += 1;
        Ok(FakeSpace { id, mappings: BTreeMap::new() })
    }

    fn destroy_address_space(&mut self, space: FakeSpace) {
        // Mapped frames may be shared, the owner frees them
        drop(space);
        self.destroyed += 1;
    }

    fn allocate_frame(&mut self) -> Result<PhysFrame<Size4KiB>, MemoryError> {
        if self.frame_limit.is_some_and(|limit| self.frames.len() >= limit) {
            return Err(MemoryError::OutOfFrames);
        }

        let frame = match self.free_list.pop() {
            Some(frame) => frame,
            None => {
                let addr = PhysAddr::new(FRAME_BASE + self.next_frame * PAGE_SIZE);
                self.next_frame += 1;
                PhysFrame::containing_address(addr)
            }
        };

        self.frames.insert(frame, Box::new([DIRTY_BYTE; PAGE_SIZE as usize]));
        Ok(frame)
    }

    fn free_frame(&mut self, frame: PhysFrame<Size4KiB>) {
        if self.frames.remove(&frame).is_some() {
            self.free_list.push(frame);
        }
    }

    fn zero_frame(&mut self, frame: PhysFrame<Size4KiB>) {
        if let Some(data) = self.frames.get_mut(&frame) {
            data.fill(0);
        }
    }

    fn map(
        &mut self,
        space: &mut FakeSpace,
        page: Page<Size4KiB>,
        frame: PhysFrame<Size4KiB>,
    ) -> Result<(), MemoryError> {
        if space.mappings.contains_key(&page) {
            return Err(MemoryError::AlreadyMapped);
        }
        space.mappings.insert(page, frame);
        Ok(())
    }

    fn unmap(&mut self, space: &mut FakeSpace, page: Page<Size4KiB>) -> Option<PhysFrame<Size4KiB>> {
        space.mappings.remove(&page)
    }

    fn translate(&self, space: &FakeSpace, page: Page<Size4KiB>) -> Option<PhysFrame<Size4KiB>> {
        space.mappings.get(&page).copied()
    }

    fn copy_page(
        &mut self,
        from: &FakeSpace,
        to: &mut FakeSpace,
        page: Page<Size4KiB>,
    ) -> Result<(), MemoryError> {
        let source = self.translate(from, page).ok_or(MemoryError::NotMapped)?;
        let contents = self.frames.get(&source).ok_or(MemoryError::NotMapped)?.clone();

        let frame = self.allocate_frame()?;
        self.frames.insert(frame, contents);

        if let Err(error) = self.map(to, page, frame) {
            self.free_frame(frame);
            return Err(error);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_start_dirty() {
        let mut memory = FakeMemory::new();
        let mut space = memory.create_address_space().unwrap();
        let page = Page::containing_address(VirtAddr::new(0x1000));

        let frame = memory.allocate_frame().unwrap();
        memory.map(&mut space, page, frame).unwrap();
        assert_eq!(memory.read_byte(&space, VirtAddr::new(0x1001)), Some(DIRTY_BYTE));

        memory.zero_frame(frame);
        assert_eq!(memory.read_byte(&space, VirtAddr::new(0x1001)), Some(0));
    }

    #[test]
    fn test_frame_limit() {
        let mut memory = FakeMemory::with_frame_limit(1);
        let frame = memory.allocate_frame().unwrap();
        assert_eq!(memory.allocate_frame(), Err(MemoryError::OutOfFrames));

        memory.free_frame(frame);
        assert!(memory.allocate_frame().is_ok());
    }

    #[test]
    fn test_copy_page_is_private() {
        let mut memory = FakeMemory::new();
        let mut parent = memory.create_address_space().unwrap();
        let mut child = memory.create_address_space().unwrap();
        let addr = VirtAddr::new(0x2000);
        let page = Page::containing_address(addr);

        memory.map_zeroed(&mut parent, page).unwrap();
        memory.write_byte(&parent, addr, 1);
        memory.copy_page(&parent, &mut child, page).unwrap();
        memory.write_byte(&parent, addr, 2);

        assert_eq!(memory.read_byte(&child, addr), Some(1));
        assert_ne!(memory.frame_of(&parent, addr), memory.frame_of(&child, addr));
    }

    #[test]
    fn test_double_map_rejected() {
        let mut memory = FakeMemory::new();
        let mut space = memory.create_address_space().unwrap();
        let page = Page::containing_address(VirtAddr::new(0x3000));

        memory.map_zeroed(&mut space, page).unwrap();
        assert_eq!(memory.map_zeroed(&mut space, page), Err(MemoryError::AlreadyMapped));
        assert_eq!(memory.allocated_frames(), 1);
    }
}
