//! YAML form of hash map containers.

use indexmap::IndexMap;

use super::entry::HashEntry;
use super::view::HashMapView;
use crate::error::{Error, Result};
use crate::value::Byml;
use crate::yaml::{parse_node, Emitter, YamlNode, YamlNodeKind};

/// Render a hash key as `0x` plus a fixed number of lowercase hex digits.
pub fn format_hash<E: HashEntry>(hash: E::Hash) -> String {
    format!("0x{:0width$x}", hash, width = E::HEX_DIGITS)
}

/// Emit a hash map container: its tag, then either `{ key: value, ... }` on
/// one line or one `key: value` line per entry.
///
/// The flow form is used only when block form is not forced and no value is
/// itself a container.
pub fn emit_hash_map<E: HashEntry>(
    emitter: &mut Emitter<'_>,
    view: &HashMapView<'_, E>,
) -> Result<()> {
    emitter.write(E::TAG);
    if view.is_empty() {
        emitter.write(" {}");
        return Ok(());
    }

    if !emitter.is_indented() && !view.has_container_values()? {
        emitter.write(" { ");
        for (index, node) in view.iter().enumerate() {
            if index > 0 {
                emitter.write(", ");
            }
            emitter.write(&format_hash::<E>(node.hash));
            emitter.write(":");
            emitter.emit_flow_value(node.node_type()?, node.value)?;
        }
        emitter.write(" }");
        return Ok(());
    }

    for node in view.iter() {
        emitter.newline();
        emitter.write(&format_hash::<E>(node.hash));
        emitter.write(":");
        emitter.emit_child(node.node_type()?, node.value)?;
    }
    Ok(())
}

/// Build a hash map from the entries of a `!h32` / `!h64` mapping.
///
/// Keys must be scalars of the form `0x` + hex digits. Entries keep
/// document order; a repeated key takes the later value.
pub fn parse_hash_map<E: HashEntry>(
    entries: &[(YamlNode, YamlNode)],
) -> Result<IndexMap<E::Hash, Byml>> {
    let mut map = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        let text = match &key.kind {
            YamlNodeKind::Scalar { value, .. } if !value.is_empty() => value,
            YamlNodeKind::Scalar { .. } => {
                return Err(Error::MalformedKey {
                    context: "empty hash key",
                })
            }
            _ => {
                return Err(Error::MalformedKey {
                    context: "hash key is not a scalar",
                })
            }
        };
        let digits = text.strip_prefix("0x").ok_or(Error::MalformedKey {
            context: "hash key without 0x prefix",
        })?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidHex {
                literal: text.clone(),
            });
        }
        let hash = E::parse_hash(digits).map_err(|source| Error::ParseInt {
            literal: text.clone(),
            source,
        })?;
        map.insert(hash, parse_node(value)?);
    }
    Ok(map)
}
