//! Conversion of YAML syntax trees into BYML values.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;

use super::node::{ScalarStyle, YamlNode, YamlNodeKind};
use super::parser::parse_document;
use crate::error::{Error, Result};
use crate::hash_map::{parse_hash_map, Entry32, Entry64, HashEntry};
use crate::value::Byml;

/// Parse the first document of `text` into a value.
///
/// Fails with [`Error::NoDocument`] when the text holds no document.
/// Further documents are ignored.
///
/// # Example
///
/// ```
/// use byml::{from_yaml, Byml};
///
/// let value = from_yaml("!h32 { 0x0000001a: 1 }").unwrap();
/// assert_eq!(value.as_hash_map32().unwrap()[&0x1a], Byml::I32(1));
/// ```
pub fn from_yaml(text: &str) -> Result<Byml> {
    let root = parse_document(text)?.ok_or(Error::NoDocument)?;
    parse_node(&root)
}

/// Convert one YAML node, recursing into collections.
pub fn parse_node(node: &YamlNode) -> Result<Byml> {
    match &node.kind {
        YamlNodeKind::Scalar { value, style } => parse_scalar(node.tag.as_deref(), value, *style),
        YamlNodeKind::Mapping(entries) => parse_mapping(node.tag.as_deref(), entries),
        YamlNodeKind::Sequence(items) => {
            if let Some(tag) = &node.tag {
                return Err(Error::UnsupportedTag { tag: tag.clone() });
            }
            items.iter().map(parse_node).collect::<Result<_>>().map(Byml::Array)
        }
        YamlNodeKind::Alias(_) => Err(Error::UnsupportedNodeKind {
            kind: node.kind_name(),
        }),
    }
}

/// Convert a scalar according to its tag, or its content when untagged.
///
/// Quoted scalars without a tag are always strings.
pub fn parse_scalar(tag: Option<&str>, value: &str, style: ScalarStyle) -> Result<Byml> {
    let Some(tag) = tag else {
        return match style {
            ScalarStyle::Plain => classify_plain(value),
            ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted => {
                Ok(Byml::String(value.to_owned()))
            }
        };
    };
    match tag {
        "!u" | "!u32" => parse_hex(value, |digits| u32::from_str_radix(digits, 16)).map(Byml::U32),
        "!ul" | "!u64" => parse_hex(value, |digits| u64::from_str_radix(digits, 16)).map(Byml::U64),
        "!l" | "!s64" => value.parse().map(Byml::I64).map_err(|source| Error::ParseInt {
            literal: value.to_owned(),
            source,
        }),
        "!d" | "!f64" => value.parse().map(Byml::F64).map_err(|source| Error::ParseFloat {
            literal: value.to_owned(),
            source,
        }),
        "!!binary" => {
            let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
            Ok(Byml::Binary(STANDARD.decode(compact)?))
        }
        _ => Err(Error::UnsupportedTag {
            tag: tag.to_owned(),
        }),
    }
}

/// Parse a `0x`-prefixed hex literal. The first two characters are taken
/// as the prefix without being checked; the rest must be hex digits.
fn parse_hex<T>(
    value: &str,
    parse: impl FnOnce(&str) -> core::result::Result<T, core::num::ParseIntError>,
) -> Result<T> {
    let digits = value.get(2..).unwrap_or("");
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidHex {
            literal: value.to_owned(),
        });
    }
    parse(digits).map_err(|source| Error::ParseInt {
        literal: value.to_owned(),
        source,
    })
}

/// Classify an untagged plain scalar by its content.
///
/// - empty: null
/// - optional `-` and ASCII digits: `I32`
/// - optional `-`, ASCII digits and one `.`, with at least one digit: `F32`
/// - `true` / `false` in any case: `Bool`
/// - anything else: the text as a string
pub fn classify_plain(value: &str) -> Result<Byml> {
    if value.is_empty() {
        return Ok(Byml::Null);
    }
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let digits = unsigned.bytes().filter(u8::is_ascii_digit).count();
    let dots = unsigned.bytes().filter(|&b| b == b'.').count();
    if digits > 0 && digits + dots == unsigned.len() {
        if dots == 0 {
            return value.parse().map(Byml::I32).map_err(|source| Error::ParseInt {
                literal: value.to_owned(),
                source,
            });
        }
        if dots == 1 {
            return value.parse().map(Byml::F32).map_err(|source| Error::ParseFloat {
                literal: value.to_owned(),
                source,
            });
        }
    }
    if value.eq_ignore_ascii_case("true") {
        return Ok(Byml::Bool(true));
    }
    if value.eq_ignore_ascii_case("false") {
        return Ok(Byml::Bool(false));
    }
    Ok(Byml::String(value.to_owned()))
}

/// Convert a mapping: `!h32` / `!h64` build hash maps, no tag builds a
/// string-keyed map.
pub fn parse_mapping(tag: Option<&str>, entries: &[(YamlNode, YamlNode)]) -> Result<Byml> {
    match tag {
        None => {
            let mut map = IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                let key = match &key.kind {
                    YamlNodeKind::Scalar { value, .. } if !value.is_empty() => value.clone(),
                    YamlNodeKind::Scalar { .. } => {
                        return Err(Error::MalformedKey {
                            context: "empty map key",
                        })
                    }
                    _ => {
                        return Err(Error::MalformedKey {
                            context: "map key is not a scalar",
                        })
                    }
                };
                map.insert(key, parse_node(value)?);
            }
            Ok(Byml::Map(map))
        }
        Some("!h32") => parse_hash_map::<Entry32>(entries).map(Entry32::into_value),
        Some("!h64") => parse_hash_map::<Entry64>(entries).map(Entry64::into_value),
        Some(tag) => Err(Error::UnsupportedMappingTag {
            tag: tag.to_owned(),
        }),
    }
}
