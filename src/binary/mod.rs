//! Binary BYML documents.
//!
//! A document is a 16-byte header followed by nodes addressed by byte
//! offset. The buffer is the arena: offsets are indices into it and
//! resolution always goes through the [`Document`].
//!
//! ## Format
//!
//! - **Header**: magic `BY` (big endian) or `YB` (little endian), `u16`
//!   version, then `u32` offsets of the key table, string table and root
//!   node (0 when absent).
//! - **Container header**: one type byte followed by a 24-bit entry count.
//! - **Values**: null, booleans, 32-bit scalars and string indices live in
//!   the 4-byte value field of their parent; everything else is referenced
//!   by offset.
//!
//! Views read host byte order. A document written in the other order must
//! be passed through [`Document::normalize`] before it can be read.

mod array;
mod document;
mod map;
mod reverse;
mod string_table;
mod writer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::node::NodeType;

pub use array::{ArrayIter, ArrayView};
pub use document::Document;
pub use map::{MapEntry, MapIter, MapView};
pub use reverse::{reverse_document, reverse_node};
pub use string_table::StringTable;
pub use writer::Writer;

/// Size of the document header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Size of a container header (type byte + 24-bit count).
pub const CONTAINER_HEADER_SIZE: usize = 4;

/// Version written by [`Writer`].
pub const VERSION: u16 = 7;

/// Oldest version accepted by [`Document::new`].
pub const MIN_VERSION: u16 = 2;

/// Largest entry count a container header can hold.
pub const MAX_COUNT: usize = 0x00FF_FFFF;

/// Byte order of a binary document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Endian {
    /// Most significant byte first (`BY` magic)
    Big,
    /// Least significant byte first (`YB` magic)
    Little,
}

impl Endian {
    /// Byte order of the host.
    #[inline]
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// The opposite byte order.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Endian::Big => Endian::Little,
            Endian::Little => Endian::Big,
        }
    }

    /// Check if this is the host byte order.
    #[inline]
    pub fn is_native(self) -> bool {
        self == Self::native()
    }

    /// The two magic bytes that open a document in this byte order.
    pub fn magic(self) -> [u8; 2] {
        match self {
            Endian::Big => *b"BY",
            Endian::Little => *b"YB",
        }
    }

    /// Detect the byte order from a document's magic bytes.
    pub fn from_magic(magic: [u8; 2]) -> Result<Self> {
        match &magic {
            b"BY" => Ok(Endian::Big),
            b"YB" => Ok(Endian::Little),
            _ => Err(Error::InvalidMagic { found: magic }),
        }
    }

    /// Read a `u16` at `offset`.
    pub fn read_u16(self, data: &[u8], offset: usize) -> Result<u16> {
        let bytes: [u8; 2] = read_array(data, offset)?;
        Ok(match self {
            Endian::Big => u16::from_be_bytes(bytes),
            Endian::Little => u16::from_le_bytes(bytes),
        })
    }

    /// Read a 24-bit unsigned integer at `offset`.
    pub fn read_u24(self, data: &[u8], offset: usize) -> Result<u32> {
        let [b0, b1, b2]: [u8; 3] = read_array(data, offset)?;
        Ok(match self {
            Endian::Big => u32::from_be_bytes([0, b0, b1, b2]),
            Endian::Little => u32::from_le_bytes([b0, b1, b2, 0]),
        })
    }

    /// Read a `u32` at `offset`.
    pub fn read_u32(self, data: &[u8], offset: usize) -> Result<u32> {
        let bytes: [u8; 4] = read_array(data, offset)?;
        Ok(match self {
            Endian::Big => u32::from_be_bytes(bytes),
            Endian::Little => u32::from_le_bytes(bytes),
        })
    }

    /// Encode a 24-bit unsigned integer. The top byte of `value` is dropped.
    pub fn u24_bytes(self, value: u32) -> [u8; 3] {
        match self {
            Endian::Big => {
                let [_, b0, b1, b2] = value.to_be_bytes();
                [b0, b1, b2]
            }
            Endian::Little => {
                let [b0, b1, b2, _] = value.to_le_bytes();
                [b0, b1, b2]
            }
        }
    }
}

/// Type and entry count read from a container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Declared node type
    pub node_type: NodeType,
    /// Number of entries
    pub count: usize,
}

impl ContainerHeader {
    /// Read the header at `offset` in the given byte order.
    pub fn read(data: &[u8], offset: usize, endian: Endian) -> Result<Self> {
        let tag = *data.get(offset).ok_or(Error::OutOfBounds {
            offset,
            len: CONTAINER_HEADER_SIZE,
            size: data.len(),
        })?;
        let node_type = NodeType::from_tag(tag, offset)?;
        let count = endian.read_u24(data, offset + 1)? as usize;
        Ok(Self { node_type, count })
    }

    /// Read the header at `offset` and require the given node type.
    pub fn expect(data: &[u8], offset: usize, endian: Endian, expected: NodeType) -> Result<Self> {
        let header = Self::read(data, offset, endian)?;
        if header.node_type != expected {
            return Err(Error::NotAContainer {
                found: header.node_type,
                offset,
            });
        }
        Ok(header)
    }
}

/// Borrow `len` bytes at `offset`.
#[inline]
pub(crate) fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(Error::OutOfBounds {
            offset,
            len,
            size: data.len(),
        })
}

/// Mutably borrow `len` bytes at `offset`.
#[inline]
pub(crate) fn slice_mut(data: &mut [u8], offset: usize, len: usize) -> Result<&mut [u8]> {
    let size = data.len();
    offset
        .checked_add(len)
        .and_then(|end| data.get_mut(offset..end))
        .ok_or(Error::OutOfBounds { offset, len, size })
}

#[inline]
fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(slice(data, offset, N)?);
    Ok(bytes)
}

/// Read a host-order `u32` at `offset`.
#[inline]
pub(crate) fn read_ne_u32(data: &[u8], offset: usize) -> Result<u32> {
    read_array(data, offset).map(u32::from_ne_bytes)
}

/// Read a host-order 8-byte value at `offset`.
#[inline]
pub(crate) fn read_ne_u64(data: &[u8], offset: usize) -> Result<u64> {
    read_array(data, offset).map(u64::from_ne_bytes)
}

/// Read and decode the type tag byte at `offset`.
#[inline]
pub(crate) fn read_node_type(data: &[u8], offset: usize) -> Result<NodeType> {
    let tag = *data.get(offset).ok_or(Error::OutOfBounds {
        offset,
        len: 1,
        size: data.len(),
    })?;
    NodeType::from_tag(tag, offset)
}

/// Reverse the bytes of a `width`-byte field in place.
#[inline]
pub(crate) fn swap_field(data: &mut [u8], offset: usize, width: usize) -> Result<()> {
    slice_mut(data, offset, width)?.reverse();
    Ok(())
}

/// Convert a stored value field into a buffer offset.
#[inline]
pub(crate) fn to_offset(value: i32, size: usize) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::OutOfBounds {
        offset: value as u32 as usize,
        len: 0,
        size,
    })
}

/// Round `n` up to a multiple of 4.
#[inline]
pub(crate) fn align4(n: usize) -> usize {
    (n + 3) & !3
}
