// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Scheduler
//!
//! The [`Scheduler`] owns the process table and the memory manager. The
//! lifecycle operations ([`process::lifecycle`](crate::process::lifecycle))
//! and demand paging ([`mm::demand`](crate::mm::demand)) are implemented on
//! it as well, since each of them needs both.

pub mod round_robin;

pub use round_robin::{Dispatch, Scheduler};
