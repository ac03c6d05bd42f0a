//! Hash-keyed map containers.
//!
//! A hash map container stores values under integer hashes instead of
//! key-table strings:
//!
//! ```text
//! +--------+---------------------+----------------------+---------+
//! | header | count entry records | count + 1 type tags  | padding |
//! +--------+---------------------+----------------------+---------+
//! ```
//!
//! Each record is `{hash, value}`: 8 bytes with 32-bit hashes
//! ([`Entry32`]), 12 with 64-bit hashes ([`Entry64`]). The two variants
//! share every algorithm through the [`HashEntry`] trait.
//!
//! - [`HashMapView`] reads a container in place without copying.
//! - [`reverse_hash_map`] converts one between byte orders.
//! - [`emit_hash_map`] / [`parse_hash_map`] bridge it to YAML.

mod entry;
mod reverse;
mod view;
mod yaml;

pub use entry::{Entry32, Entry64, HashEntry};
pub use reverse::reverse_hash_map;
pub use view::{HashMap32View, HashMap64View, HashMapIter, HashMapView, KeyedNode};
pub use yaml::{emit_hash_map, format_hash, parse_hash_map};
