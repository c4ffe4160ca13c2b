// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Inter-Process Communication
//!
//! Only the message byte layout lives here. Queueing and delivery belong
//! to the IPC subsystem that carries these bytes between processes.

pub mod message;

pub use message::{Message, MessageError, MessageHeader};
