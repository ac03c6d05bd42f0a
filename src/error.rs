//! Errors for binary access, endianness reversal and the YAML bridge.

use core::fmt;
use core::num::{ParseFloatError, ParseIntError};

use crate::node::NodeType;
use crate::yaml::YamlError;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by this crate.
///
/// Every error surfaces directly to the caller; nothing is retried or
/// recovered locally.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A hash-map or map key is empty, null, or not a scalar.
    MalformedKey {
        /// Description of the offending key
        context: &'static str,
    },

    /// A scalar carries a tag this crate does not understand.
    UnsupportedTag {
        /// The tag as written (e.g. `!zzz`)
        tag: String,
    },

    /// A mapping carries a tag other than `!h32` / `!h64`.
    UnsupportedMappingTag {
        /// The tag as written
        tag: String,
    },

    /// A YAML node kind outside mapping, sequence and scalar.
    UnsupportedNodeKind {
        /// Name of the node kind (e.g. `alias`)
        kind: &'static str,
    },

    /// The input text contains no YAML document.
    NoDocument,

    /// Container index beyond its entry count.
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of entries in the container
        count: usize,
    },

    /// An integer literal failed to parse.
    ParseInt {
        /// The literal that was parsed
        literal: String,
        /// Underlying error, unchanged
        source: ParseIntError,
    },

    /// A float literal failed to parse.
    ParseFloat {
        /// The literal that was parsed
        literal: String,
        /// Underlying error, unchanged
        source: ParseFloatError,
    },

    /// A `0x` literal with characters other than hex digits after the prefix.
    InvalidHex {
        /// The literal as written
        literal: String,
    },

    /// `!!binary` content is not valid base64.
    Base64 {
        /// Underlying error, unchanged
        source: base64::DecodeError,
    },

    /// The YAML text itself is malformed.
    Syntax(YamlError),

    /// A read or write would fall outside the buffer.
    OutOfBounds {
        /// Byte offset of the access
        offset: usize,
        /// Number of bytes requested
        len: usize,
        /// Size of the buffer
        size: usize,
    },

    /// The document does not start with `BY` or `YB`.
    InvalidMagic {
        /// The first two bytes of the buffer
        found: [u8; 2],
    },

    /// Document version outside the supported range.
    UnsupportedVersion {
        /// The version read from the header
        version: u16,
    },

    /// A type tag byte that is not a known node type.
    UnknownNodeType {
        /// The raw tag byte
        tag: u8,
        /// Byte offset where it was read
        offset: usize,
    },

    /// A node of the wrong type where a container was expected.
    NotAContainer {
        /// The type that was found
        found: NodeType,
        /// Byte offset of the node
        offset: usize,
    },

    /// The document is stored in the opposite byte order from the host.
    ///
    /// Call [`Document::normalize`](crate::binary::Document::normalize) first.
    ForeignByteOrder,

    /// A string table entry is not valid UTF-8 or is not NUL-terminated.
    InvalidUtf8 {
        /// Byte offset of the string
        offset: usize,
    },

    /// A string or key index beyond the table.
    StringIndex {
        /// Requested index
        index: u32,
        /// Number of entries in the table
        count: usize,
    },

    /// An in-place reversal stopped part way; the buffer is corrupt.
    Reversal(Box<Error>),

    /// A container is reachable from inside itself.
    Cycle {
        /// Byte offset of the container that was entered twice
        offset: usize,
    },

    /// A value does not fit the binary format's field widths.
    TooLarge {
        /// What overflowed (e.g. `container`, `document`)
        what: &'static str,
        /// The size that was requested
        size: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedKey { context } => write!(f, "malformed key: {}", context),
            Error::UnsupportedTag { tag } => write!(f, "unsupported scalar tag '{}'", tag),
            Error::UnsupportedMappingTag { tag } => {
                write!(f, "unsupported mapping tag '{}'", tag)
            }
            Error::UnsupportedNodeKind { kind } => {
                write!(f, "unsupported YAML node kind: {}", kind)
            }
            Error::NoDocument => write!(f, "no YAML document in input"),
            Error::IndexOutOfRange { index, count } => write!(
                f,
                "index {} out of range for container with {} entries",
                index, count
            ),
            Error::ParseInt { literal, source } => {
                write!(f, "invalid integer '{}': {}", literal, source)
            }
            Error::ParseFloat { literal, source } => {
                write!(f, "invalid float '{}': {}", literal, source)
            }
            Error::InvalidHex { literal } => write!(
                f,
                "invalid hex literal '{}': expected 0x followed by hex digits",
                literal
            ),
            Error::Base64 { source } => write!(f, "invalid base64 in !!binary: {}", source),
            Error::Syntax(err) => write!(f, "YAML syntax error: {}", err),
            Error::OutOfBounds { offset, len, size } => write!(
                f,
                "access of {} bytes at offset {} exceeds buffer of {} bytes",
                len, offset, size
            ),
            Error::InvalidMagic { found } => write!(
                f,
                "invalid magic {:02x} {:02x}: expected 'BY' or 'YB'",
                found[0], found[1]
            ),
            Error::UnsupportedVersion { version } => {
                write!(f, "unsupported BYML version {}", version)
            }
            Error::UnknownNodeType { tag, offset } => {
                write!(f, "unknown node type 0x{:02x} at offset {}", tag, offset)
            }
            Error::NotAContainer { found, offset } => {
                write!(f, "expected a container at offset {}, found {:?}", offset, found)
            }
            Error::ForeignByteOrder => {
                write!(f, "document is not in host byte order; normalize it first")
            }
            Error::InvalidUtf8 { offset } => {
                write!(f, "invalid or unterminated string at offset {}", offset)
            }
            Error::StringIndex { index, count } => write!(
                f,
                "string index {} out of range for table with {} entries",
                index, count
            ),
            Error::Reversal(err) => write!(
                f,
                "byte order reversal failed, document is corrupt: {}",
                err
            ),
            Error::Cycle { offset } => {
                write!(f, "container at offset {} contains itself", offset)
            }
            Error::TooLarge { what, size } => {
                write!(f, "{} of size {} exceeds the format limit", what, size)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ParseInt { source, .. } => Some(source),
            Error::ParseFloat { source, .. } => Some(source),
            Error::Base64 { source } => Some(source),
            Error::Syntax(err) => Some(err),
            Error::Reversal(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<YamlError> for Error {
    fn from(err: YamlError) -> Self {
        Error::Syntax(err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(source: base64::DecodeError) -> Self {
        Error::Base64 { source }
    }
}
