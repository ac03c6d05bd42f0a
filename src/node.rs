//! On-disk node type tags.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Type tag stored alongside every value in a BYML container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum NodeType {
    /// Map keyed by 32-bit hashes
    HashMap32 = 0x20,
    /// Map keyed by 64-bit hashes
    HashMap64 = 0x21,
    /// Index into the string table
    String = 0xA0,
    /// Length-prefixed byte blob
    Binary = 0xA1,
    /// Ordered sequence
    Array = 0xC0,
    /// Map keyed by key-table strings
    Map = 0xC1,
    /// Key or string table
    StringTable = 0xC2,
    /// Boolean
    Bool = 0xD0,
    /// Signed 32-bit integer
    I32 = 0xD1,
    /// 32-bit float
    F32 = 0xD2,
    /// Unsigned 32-bit integer
    U32 = 0xD3,
    /// Signed 64-bit integer
    I64 = 0xD4,
    /// Unsigned 64-bit integer
    U64 = 0xD5,
    /// 64-bit float
    F64 = 0xD6,
    /// Null
    Null = 0xFF,
}

impl NodeType {
    /// Decode a raw tag byte read at `offset`.
    pub fn from_tag(tag: u8, offset: usize) -> Result<Self> {
        Ok(match tag {
            0x20 => NodeType::HashMap32,
            0x21 => NodeType::HashMap64,
            0xA0 => NodeType::String,
            0xA1 => NodeType::Binary,
            0xC0 => NodeType::Array,
            0xC1 => NodeType::Map,
            0xC2 => NodeType::StringTable,
            0xD0 => NodeType::Bool,
            0xD1 => NodeType::I32,
            0xD2 => NodeType::F32,
            0xD3 => NodeType::U32,
            0xD4 => NodeType::I64,
            0xD5 => NodeType::U64,
            0xD6 => NodeType::F64,
            0xFF => NodeType::Null,
            _ => return Err(Error::UnknownNodeType { tag, offset }),
        })
    }

    /// The raw tag byte.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Array, map or either hash map.
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(
            self,
            NodeType::Array | NodeType::Map | NodeType::HashMap32 | NodeType::HashMap64
        )
    }

    /// Stored directly in a 4-byte value field rather than behind an offset.
    #[inline]
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            NodeType::Null
                | NodeType::Bool
                | NodeType::I32
                | NodeType::F32
                | NodeType::U32
                | NodeType::String
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for ty in [
            NodeType::HashMap32,
            NodeType::HashMap64,
            NodeType::String,
            NodeType::Binary,
            NodeType::Array,
            NodeType::Map,
            NodeType::StringTable,
            NodeType::Bool,
            NodeType::I32,
            NodeType::F32,
            NodeType::U32,
            NodeType::I64,
            NodeType::U64,
            NodeType::F64,
            NodeType::Null,
        ] {
            assert_eq!(NodeType::from_tag(ty.tag(), 0).unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            NodeType::from_tag(0x42, 7),
            Err(Error::UnknownNodeType { tag: 0x42, offset: 7 })
        );
    }

    #[test]
    fn test_classification() {
        assert!(NodeType::HashMap32.is_container());
        assert!(!NodeType::HashMap32.is_inline());
        assert!(NodeType::String.is_inline());
        assert!(!NodeType::U64.is_inline());
        assert!(!NodeType::U64.is_container());
    }
}
