// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Testing infrastructure for the scheduling core
//!
//! # Usage
//! ```ignore
//! use crate::testing::FakeMemory;
//!
//! let mut sched: Scheduler<FakeMemory, CpuState, 4> = Scheduler::new(FakeMemory::new());
//! let space = sched.memory_mut().create_address_space()?;
//! sched.start_task(space, entry, data_start, data_end);
//! ```

pub mod harness;

pub use harness::{FakeMemory, FakeSpace, DIRTY_BYTE};
