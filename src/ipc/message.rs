// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Message Wire Format
//!
//! Little-endian header followed by the user payload:
//!
//! ```text
//! offset  size  field
//!      0     8  total size (header + payload)
//!      8     8  payload size
//!     16     8  sender pid
//!     24     4  type tag
//!     28     -  payload
//! ```
//!
//! Tags below [`TYPE_USER_DEFINED`] belong to the kernel. Only [`TYPE_IO`]
//! and [`TYPE_SIGNAL`] are defined; the rest of that range is rejected.

use alloc::vec::Vec;
use core::fmt;

/// Header length in bytes
pub const HEADER_SIZE: usize = 28;

/// I/O payload: `i32` fd followed by data bytes
pub const TYPE_IO: u32 = 0;

/// Signal payload: `u16` signal id
pub const TYPE_SIGNAL: u32 = 1;

/// First tag available to user-defined messages
pub const TYPE_USER_DEFINED: u32 = 1024;

const FD_SIZE: usize = 4;
const SIGNAL_SIZE: usize = 2;

/// ============================================================================
/// Header
/// ============================================================================

/// Fixed message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Header plus payload, in bytes
    pub size: u64,

    /// Payload, in bytes
    pub user_size: u64,

    /// Sending process
    pub sender: u64,

    /// Type tag
    pub kind: u32,
}

impl MessageHeader {
    /// Parse the header at the start of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self, MessageError> {
        if bytes.len() < HEADER_SIZE {
            return Err(MessageError::Truncated);
        }

        Ok(Self {
            size: read_u64(bytes, 0),
            user_size: read_u64(bytes, 8),
            sender: read_u64(bytes, 16),
            kind: u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.user_size.to_le_bytes());
        out.extend_from_slice(&self.sender.to_le_bytes());
        out.extend_from_slice(&self.kind.to_le_bytes());
    }
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

/// ============================================================================
/// Message
/// ============================================================================

/// Decoded message payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Data for a file descriptor
    Io { fd: i32, data: Vec<u8> },

    /// Signal delivery
    Signal { signal: u16 },

    /// Opaque user message, `tag >= TYPE_USER_DEFINED`
    UserDefined { tag: u32, data: Vec<u8> },
}

impl Message {
    /// Type tag written into the header
    pub fn kind(&self) -> u32 {
        match self {
            Self::Io { .. } => TYPE_IO,
            Self::Signal { .. } => TYPE_SIGNAL,
            Self::UserDefined { tag, .. } => *tag,
        }
    }

    /// Payload length in bytes
    pub fn user_size(&self) -> usize {
        match self {
            Self::Io { data, .. } => FD_SIZE + data.len(),
            Self::Signal { .. } => SIGNAL_SIZE,
            Self::UserDefined { data, .. } => data.len(),
        }
    }

    /// Serialize with `sender` as the sending pid
    pub fn encode(&self, sender: u64) -> Result<Vec<u8>, MessageError> {
        if let Self::UserDefined { tag, .. } = self {
            if *tag < TYPE_USER_DEFINED {
                return Err(MessageError::ReservedType(*tag));
            }
        }
        let kind = self.kind();

        let user_size = self.user_size();
        let header = MessageHeader {
            size: (HEADER_SIZE + user_size) as u64,
            user_size: user_size as u64,
            sender,
            kind,
        };

        let mut out = Vec::with_capacity(HEADER_SIZE + user_size);
        header.write(&mut out);

        match self {
            Self::Io { fd, data } => {
                out.extend_from_slice(&fd.to_le_bytes());
                out.extend_from_slice(data);
            }
            Self::Signal { signal } => out.extend_from_slice(&signal.to_le_bytes()),
            Self::UserDefined { data, .. } => out.extend_from_slice(data),
        }

        Ok(out)
    }

    /// Parse one message occupying exactly `bytes`
    pub fn decode(bytes: &[u8]) -> Result<(MessageHeader, Self), MessageError> {
        let header = MessageHeader::parse(bytes)?;

        let user_size =
            usize::try_from(header.user_size).map_err(|_| MessageError::SizeMismatch)?;
        let total = HEADER_SIZE
            .checked_add(user_size)
            .ok_or(MessageError::SizeMismatch)?;
        if header.size != total as u64 {
            return Err(MessageError::SizeMismatch);
        }
        if bytes.len() < total {
            return Err(MessageError::Truncated);
        }
        if bytes.len() > total {
            return Err(MessageError::SizeMismatch);
        }

        let payload = &bytes[HEADER_SIZE..];
        let message = match header.kind {
            TYPE_IO => {
                if payload.len() < FD_SIZE {
                    return Err(MessageError::SizeMismatch);
                }
                let (fd, data) = payload.split_at(FD_SIZE);
                Self::Io {
                    fd: i32::from_le_bytes([fd[0], fd[1], fd[2], fd[3]]),
                    data: data.to_vec(),
                }
            }
            TYPE_SIGNAL => {
                if payload.len() != SIGNAL_SIZE {
                    return Err(MessageError::SizeMismatch);
                }
                Self::Signal {
                    signal: u16::from_le_bytes([payload[0], payload[1]]),
                }
            }
            kind if kind < TYPE_USER_DEFINED => return Err(MessageError::ReservedType(kind)),
            tag => Self::UserDefined {
                tag,
                data: payload.to_vec(),
            },
        };

        Ok((header, message))
    }
}

/// ============================================================================
/// Errors
/// ============================================================================

/// Malformed message bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// Fewer bytes than the header announces
    Truncated,

    /// Header sizes disagree with each other, the buffer, or the type
    SizeMismatch,

    /// Kernel type tag with no defined layout
    ReservedType(u32),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => f.write_str("message truncated"),
            Self::SizeMismatch => f.write_str("message size mismatch"),
            Self::ReservedType(kind) => write!(f, "reserved message type {}", kind),
        }
    }
}
