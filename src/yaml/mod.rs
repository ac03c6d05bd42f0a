//! YAML text bridge.
//!
//! Converts between binary documents and a YAML text form that keeps every
//! BYML type distinguishable:
//!
//! | Value | YAML |
//! |---|---|
//! | null | empty |
//! | bool | `true` / `false` |
//! | i32 | `-12` |
//! | f32 | `1.5` |
//! | u32 | `!u 0xff` |
//! | i64 | `!l -12` |
//! | u64 | `!ul 0xff` |
//! | f64 | `!d 1.5` |
//! | binary | `!!binary QUI=` |
//! | hash map | `!h32 { 0x0000001a: ... }` / `!h64 { 0x000000000000001a: ... }` |
//!
//! # Example
//!
//! ```
//! use byml::binary::{Document, Endian};
//! use byml::yaml::{emit_document, from_yaml, EmitterConfig};
//!
//! let value = from_yaml("!h32 { 0x1A: !u 0xff }").unwrap();
//! let bytes = value.to_binary(Endian::native()).unwrap();
//! let doc = Document::new(&bytes).unwrap();
//! let text = emit_document(&doc, EmitterConfig::default()).unwrap();
//! assert_eq!(text, "!h32 { 0x0000001a: !u 0xff }\n");
//! ```

mod convert;
mod emitter;
mod error;
mod node;
mod parser;

pub use convert::{classify_plain, from_yaml, parse_mapping, parse_node, parse_scalar};
pub use emitter::{emit_document, Emitter, EmitterConfig};
pub use error::YamlError;
pub use node::{ScalarStyle, YamlNode, YamlNodeKind};
pub use parser::parse_document;
