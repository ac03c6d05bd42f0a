//! # BYML
//!
//! Zero-copy reading of BYML binary documents, in-place byte order
//! conversion, and a lossless YAML text form.
//!
//! BYML is a compact binary encoding of a YAML-like tree: maps, arrays and
//! scalars addressed by byte offset inside one buffer. Besides string-keyed
//! maps it has maps keyed by 32- or 64-bit hashes, which this crate reads
//! without copying or allocating.
//!
//! ## Module Organization
//!
//! - [`binary`] - Document header, string tables, array/map views, writer and
//!   byte order reversal
//! - [`hash_map`] - Hash-keyed containers: entry records, zero-copy view,
//!   reversal and YAML form
//! - [`yaml`] - YAML parser, emitter and value conversion
//! - [`value`] - Owned value tree
//! - [`node`] - On-disk node type tags
//!
//! ## Quick Start
//!
//! ```
//! use byml::binary::Endian;
//! use byml::{from_yaml, to_yaml};
//!
//! let value = from_yaml("!h32 { 0x0000001a: 1, 0x0000002b: hello }").unwrap();
//! let bytes = value.to_binary(Endian::Big).unwrap();
//!
//! // Documents in either byte order can be rendered.
//! assert_eq!(
//!     to_yaml(&bytes).unwrap(),
//!     "!h32 { 0x0000001a: 1, 0x0000002b: hello }\n"
//! );
//! ```
//!
//! ## Features
//!
//! - `serde` - Enable serialization of [`EmitterConfig`], [`binary::Endian`]
//!   and [`NodeType`]
//! - `cli` - Build the `byml` command line tool

// =============================================================================
// Core modules
// =============================================================================

/// Errors for binary access and the YAML bridge.
pub mod error;

/// On-disk node type tags.
pub mod node;

/// Owned value tree.
pub mod value;

/// Binary document framing, views and writer.
pub mod binary;

/// Hash-keyed map containers.
pub mod hash_map;

// =============================================================================
// Text bridge
// =============================================================================

/// YAML text form of BYML documents.
pub mod yaml;

// Re-exports for convenience
pub use binary::{Document, Endian};
pub use error::{Error, Result};
pub use hash_map::{Entry32, Entry64, HashMap32View, HashMap64View, HashMapView, KeyedNode};
pub use node::NodeType;
pub use value::{Byml, HashMap32, HashMap64};
pub use yaml::{from_yaml, EmitterConfig};

/// Render a binary document in either byte order as YAML.
///
/// A document in the host's byte order is read in place; one in the other
/// order is copied and converted first.
pub fn to_yaml(data: &[u8]) -> Result<String> {
    to_yaml_with_config(data, EmitterConfig::default())
}

/// Render a binary document as YAML with the given emitter settings.
pub fn to_yaml_with_config(data: &[u8], config: EmitterConfig) -> Result<String> {
    match Document::new(data) {
        Ok(doc) => yaml::emit_document(&doc, config),
        Err(Error::ForeignByteOrder) => {
            let mut owned = data.to_vec();
            Document::normalize(&mut owned)?;
            let doc = Document::new(&owned)?;
            yaml::emit_document(&doc, config)
        }
        Err(err) => Err(err),
    }
}
