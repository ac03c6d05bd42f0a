//! Fixed-size hash map entry records.

use core::fmt::{Debug, LowerHex};
use core::num::ParseIntError;

use bytemuck::{Pod, Zeroable};
use indexmap::IndexMap;

use crate::node::NodeType;
use crate::value::Byml;

/// An on-disk hash map entry: a hash key and a 4-byte value field.
///
/// The two fields have different meanings and are byte-swapped separately;
/// a record is never reversed as one wide integer.
pub trait HashEntry: Pod + Debug {
    /// Key type (`u32` or `u64`).
    type Hash: Copy + Ord + core::hash::Hash + Debug + LowerHex;

    /// Node type of containers built from these records.
    const NODE_TYPE: NodeType;

    /// YAML tag for containers built from these records.
    const TAG: &'static str;

    /// Number of hex digits a key is rendered with.
    const HEX_DIGITS: usize;

    /// Size of one record in bytes.
    const SIZE: usize = core::mem::size_of::<Self>();

    /// Build a record in host byte order.
    fn new(hash: Self::Hash, value: i32) -> Self;

    /// The hash key.
    fn hash(&self) -> Self::Hash;

    /// The value field (inline value or offset).
    fn value(&self) -> i32;

    /// This record with both fields byte-swapped.
    fn swapped(self) -> Self;

    /// Parse the hex digits of a key (without `0x`).
    ///
    /// Callers check for ASCII hex digits first: `from_str_radix` also
    /// takes a leading `+`.
    fn parse_hash(digits: &str) -> Result<Self::Hash, ParseIntError>;

    /// Wrap a materialized map as an owned value.
    fn into_value(map: IndexMap<Self::Hash, Byml>) -> Byml;
}

/// Entry of a 32-bit hash map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Entry32 {
    /// Hash key
    pub hash: u32,
    /// Inline value or offset
    pub value: i32,
}

/// Entry of a 64-bit hash map.
///
/// Packed so the record is 12 bytes on disk, matching the 32-bit layout
/// apart from key width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Entry64 {
    /// Hash key
    pub hash: u64,
    /// Inline value or offset
    pub value: i32,
}

impl HashEntry for Entry32 {
    type Hash = u32;

    const NODE_TYPE: NodeType = NodeType::HashMap32;
    const TAG: &'static str = "!h32";
    const HEX_DIGITS: usize = 8;

    #[inline]
    fn new(hash: u32, value: i32) -> Self {
        Self { hash, value }
    }

    #[inline]
    fn hash(&self) -> u32 {
        self.hash
    }

    #[inline]
    fn value(&self) -> i32 {
        self.value
    }

    #[inline]
    fn swapped(self) -> Self {
        Self {
            hash: self.hash.swap_bytes(),
            value: self.value.swap_bytes(),
        }
    }

    fn parse_hash(digits: &str) -> Result<u32, ParseIntError> {
        u32::from_str_radix(digits, 16)
    }

    fn into_value(map: IndexMap<u32, Byml>) -> Byml {
        Byml::HashMap32(map)
    }
}

impl HashEntry for Entry64 {
    type Hash = u64;

    const NODE_TYPE: NodeType = NodeType::HashMap64;
    const TAG: &'static str = "!h64";
    const HEX_DIGITS: usize = 16;

    #[inline]
    fn new(hash: u64, value: i32) -> Self {
        Self { hash, value }
    }

    #[inline]
    fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    fn value(&self) -> i32 {
        self.value
    }

    #[inline]
    fn swapped(self) -> Self {
        let (hash, value) = (self.hash, self.value);
        Self {
            hash: hash.swap_bytes(),
            value: value.swap_bytes(),
        }
    }

    fn parse_hash(digits: &str) -> Result<u64, ParseIntError> {
        u64::from_str_radix(digits, 16)
    }

    fn into_value(map: IndexMap<u64, Byml>) -> Byml {
        Byml::HashMap64(map)
    }
}
