//! Owned BYML values.
//!
//! Values read out of a binary document through
//! [`Document::resolve`](crate::binary::Document::resolve), or parsed from
//! YAML, are materialized into this tree. It never aliases the source buffer
//! and can be mutated freely.

use indexmap::IndexMap;

use crate::node::NodeType;

/// Mutable map keyed by 32-bit hashes, in insertion order.
pub type HashMap32 = IndexMap<u32, Byml>;

/// Mutable map keyed by 64-bit hashes, in insertion order.
pub type HashMap64 = IndexMap<u64, Byml>;

/// An owned BYML node.
#[derive(Debug, Clone, PartialEq)]
pub enum Byml {
    /// Null
    Null,
    /// Boolean
    Bool(bool),
    /// Signed 32-bit integer
    I32(i32),
    /// 32-bit float
    F32(f32),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 64-bit integer
    I64(i64),
    /// Unsigned 64-bit integer
    U64(u64),
    /// 64-bit float
    F64(f64),
    /// String
    String(String),
    /// Byte blob
    Binary(Vec<u8>),
    /// Ordered sequence
    Array(Vec<Byml>),
    /// String-keyed map (IndexMap preserves document order)
    Map(IndexMap<String, Byml>),
    /// Map keyed by 32-bit hashes
    HashMap32(HashMap32),
    /// Map keyed by 64-bit hashes
    HashMap64(HashMap64),
}

impl Byml {
    /// The on-disk type this value is written as.
    pub fn node_type(&self) -> NodeType {
        match self {
            Byml::Null => NodeType::Null,
            Byml::Bool(_) => NodeType::Bool,
            Byml::I32(_) => NodeType::I32,
            Byml::F32(_) => NodeType::F32,
            Byml::U32(_) => NodeType::U32,
            Byml::I64(_) => NodeType::I64,
            Byml::U64(_) => NodeType::U64,
            Byml::F64(_) => NodeType::F64,
            Byml::String(_) => NodeType::String,
            Byml::Binary(_) => NodeType::Binary,
            Byml::Array(_) => NodeType::Array,
            Byml::Map(_) => NodeType::Map,
            Byml::HashMap32(_) => NodeType::HashMap32,
            Byml::HashMap64(_) => NodeType::HashMap64,
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Byml::Null)
    }

    /// Convert to a string reference, if possible.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Byml::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to an array reference, if possible.
    pub fn as_array(&self) -> Option<&Vec<Byml>> {
        match self {
            Byml::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to a string-keyed map reference, if possible.
    pub fn as_map(&self) -> Option<&IndexMap<String, Byml>> {
        match self {
            Byml::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convert to a 32-bit hash map reference, if possible.
    pub fn as_hash_map32(&self) -> Option<&HashMap32> {
        match self {
            Byml::HashMap32(map) => Some(map),
            _ => None,
        }
    }

    /// Convert to a mutable 32-bit hash map reference, if possible.
    pub fn as_hash_map32_mut(&mut self) -> Option<&mut HashMap32> {
        match self {
            Byml::HashMap32(map) => Some(map),
            _ => None,
        }
    }

    /// Convert to a 64-bit hash map reference, if possible.
    pub fn as_hash_map64(&self) -> Option<&HashMap64> {
        match self {
            Byml::HashMap64(map) => Some(map),
            _ => None,
        }
    }
}

impl From<HashMap32> for Byml {
    fn from(map: HashMap32) -> Self {
        Byml::HashMap32(map)
    }
}

impl From<HashMap64> for Byml {
    fn from(map: HashMap64) -> Self {
        Byml::HashMap64(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type() {
        assert_eq!(Byml::Null.node_type(), NodeType::Null);
        assert_eq!(Byml::U64(1).node_type(), NodeType::U64);
        assert_eq!(
            Byml::from(HashMap32::new()).node_type(),
            NodeType::HashMap32
        );
    }

    #[test]
    fn test_mutate_hash_map() {
        let mut value = Byml::from(HashMap32::from_iter([(1, Byml::I32(1))]));
        value
            .as_hash_map32_mut()
            .unwrap()
            .insert(2, Byml::String("two".into()));
        let map = value.as_hash_map32().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&2].as_str(), Some("two"));
    }
}
