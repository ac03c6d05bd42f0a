//! Serialization of owned values into binary documents.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::map::MAP_ENTRY_SIZE;
use super::reverse::reverse_document;
use super::{align4, Endian, CONTAINER_HEADER_SIZE, HEADER_SIZE, MAX_COUNT, MIN_VERSION, VERSION};
use crate::error::{Error, Result};
use crate::hash_map::{Entry32, Entry64, HashEntry};
use crate::node::NodeType;
use crate::value::Byml;

/// Writes a [`Byml`] tree as a complete binary document.
///
/// Output layout: header, key table, string table, then the root container
/// with every child placed after its parent. Tables are sorted, map entries
/// follow key order and hash map entries ascend by hash.
///
/// # Example
///
/// ```
/// use byml::binary::{Document, Endian, Writer};
/// use byml::{Byml, HashMap32};
///
/// let value = Byml::HashMap32(HashMap32::from_iter([(0x1a, Byml::I32(7))]));
/// let bytes = Writer::new(Endian::native()).write(&value).unwrap();
/// let doc = Document::new(&bytes).unwrap();
/// assert_eq!(doc.to_value().unwrap(), value);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Writer {
    endian: Endian,
    version: u16,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new(Endian::native())
    }
}

impl Writer {
    /// Create a writer producing documents in the given byte order.
    pub fn new(endian: Endian) -> Self {
        Self {
            endian,
            version: VERSION,
        }
    }

    /// Set the header version (default 7).
    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Serialize `root`.
    ///
    /// The root must be a container or [`Byml::Null`]; null produces a
    /// document without a root node.
    pub fn write(&self, root: &Byml) -> Result<Vec<u8>> {
        if !(MIN_VERSION..=VERSION).contains(&self.version) {
            return Err(Error::UnsupportedVersion {
                version: self.version,
            });
        }
        let node_type = root.node_type();
        if !root.is_null() && !node_type.is_container() {
            return Err(Error::NotAContainer {
                found: node_type,
                offset: HEADER_SIZE,
            });
        }

        let mut keys = BTreeSet::new();
        let mut strings = BTreeSet::new();
        collect_strings(root, &mut keys, &mut strings);

        let mut buf = Buffer {
            data: vec![0; HEADER_SIZE],
            keys: keys.into_iter().collect(),
            strings: strings.into_iter().collect(),
        };
        let endian = Endian::native();
        buf.data[0..2].copy_from_slice(&endian.magic());
        buf.data[2..4].copy_from_slice(&self.version.to_ne_bytes());

        let key_table = buf.write_table(true)?;
        let string_table = buf.write_table(false)?;
        let root_offset = if root.is_null() {
            0
        } else {
            buf.write_node(root)?
        };
        buf.patch(4, key_table);
        buf.patch(8, string_table);
        buf.patch(12, root_offset);

        let mut data = buf.data;
        if !self.endian.is_native() {
            reverse_document(&mut data, endian)?;
        }
        Ok(data)
    }
}

impl Byml {
    /// Serialize this value as a binary document in the given byte order.
    pub fn to_binary(&self, endian: Endian) -> Result<Vec<u8>> {
        Writer::new(endian).write(self)
    }
}

fn collect_strings<'v>(
    value: &'v Byml,
    keys: &mut BTreeSet<&'v str>,
    strings: &mut BTreeSet<&'v str>,
) {
    match value {
        Byml::String(s) => {
            strings.insert(s);
        }
        Byml::Array(items) => {
            for item in items {
                collect_strings(item, keys, strings);
            }
        }
        Byml::Map(map) => {
            for (key, item) in map {
                keys.insert(key);
                collect_strings(item, keys, strings);
            }
        }
        Byml::HashMap32(map) => {
            for item in map.values() {
                collect_strings(item, keys, strings);
            }
        }
        Byml::HashMap64(map) => {
            for item in map.values() {
                collect_strings(item, keys, strings);
            }
        }
        _ => {}
    }
}

/// Output under construction, always in host byte order.
struct Buffer<'v> {
    data: Vec<u8>,
    keys: Vec<&'v str>,
    strings: Vec<&'v str>,
}

impl<'v> Buffer<'v> {
    /// Current end of the buffer as a value field.
    fn position(&self) -> Result<u32> {
        i32::try_from(self.data.len())
            .map(|pos| pos as u32)
            .map_err(|_| Error::TooLarge {
                what: "document",
                size: self.data.len(),
            })
    }

    fn align(&mut self) {
        self.data.resize(align4(self.data.len()), 0);
    }

    fn patch(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
    }

    fn container_header(&mut self, node_type: NodeType, count: usize) -> Result<u32> {
        if count > MAX_COUNT {
            return Err(Error::TooLarge {
                what: "container",
                size: count,
            });
        }
        self.align();
        let offset = self.position()?;
        self.data.push(node_type.tag());
        self.data
            .extend_from_slice(&Endian::native().u24_bytes(count as u32));
        Ok(offset)
    }

    /// Write the key table or the string table; 0 when it would be empty.
    fn write_table(&mut self, keys: bool) -> Result<u32> {
        let table = if keys {
            core::mem::take(&mut self.keys)
        } else {
            core::mem::take(&mut self.strings)
        };
        let offset = if table.is_empty() {
            0
        } else {
            let start = self.container_header(NodeType::StringTable, table.len())? as usize;
            let mut rel = CONTAINER_HEADER_SIZE + (table.len() + 1) * 4;
            for s in &table {
                self.data.extend_from_slice(&(rel as u32).to_ne_bytes());
                rel += s.len() + 1;
            }
            self.data.extend_from_slice(&(rel as u32).to_ne_bytes());
            for s in &table {
                self.data.extend_from_slice(s.as_bytes());
                self.data.push(0);
            }
            debug_assert_eq!(self.data.len(), start + rel);
            self.position()?;
            start as u32
        };
        if keys {
            self.keys = table;
        } else {
            self.strings = table;
        }
        Ok(offset)
    }

    fn string_index(table: &[&str], s: &str) -> u32 {
        table.binary_search(&s).map(|i| i as u32).unwrap_or(0)
    }

    /// Compute the value field for `value`, writing it out first when it is
    /// stored by offset.
    fn value_field(&mut self, value: &Byml) -> Result<u32> {
        Ok(match value {
            Byml::Null => 0,
            Byml::Bool(b) => *b as u32,
            Byml::I32(n) => *n as u32,
            Byml::F32(f) => f.to_bits(),
            Byml::U32(n) => *n,
            Byml::String(s) => Self::string_index(&self.strings, s),
            _ => self.write_node(value)?,
        })
    }

    /// Write a node stored by offset and return that offset.
    fn write_node(&mut self, value: &Byml) -> Result<u32> {
        match value {
            Byml::I64(n) => self.write_wide(*n as u64),
            Byml::U64(n) => self.write_wide(*n),
            Byml::F64(f) => self.write_wide(f.to_bits()),
            Byml::Binary(bytes) => {
                let len = u32::try_from(bytes.len()).map_err(|_| Error::TooLarge {
                    what: "binary",
                    size: bytes.len(),
                })?;
                self.align();
                let offset = self.position()?;
                self.data.extend_from_slice(&len.to_ne_bytes());
                self.data.extend_from_slice(bytes);
                Ok(offset)
            }
            Byml::Array(items) => self.write_array(items),
            Byml::Map(map) => self.write_map(map),
            Byml::HashMap32(map) => self.write_hash_map::<Entry32>(map),
            Byml::HashMap64(map) => self.write_hash_map::<Entry64>(map),
            // Inline values have no node of their own.
            _ => self.value_field(value),
        }
    }

    fn write_wide(&mut self, bits: u64) -> Result<u32> {
        self.align();
        let offset = self.position()?;
        self.data.extend_from_slice(&bits.to_ne_bytes());
        Ok(offset)
    }

    fn write_array(&mut self, items: &[Byml]) -> Result<u32> {
        let offset = self.container_header(NodeType::Array, items.len())?;
        self.data.extend(items.iter().map(|item| item.node_type().tag()));
        self.align();
        let values = self.data.len();
        self.data.resize(values + items.len() * 4, 0);
        for (index, item) in items.iter().enumerate() {
            let field = self.value_field(item)?;
            self.patch(values + index * 4, field);
        }
        Ok(offset)
    }

    fn write_map(&mut self, map: &IndexMap<String, Byml>) -> Result<u32> {
        let mut entries: Vec<(u32, &Byml)> = map
            .iter()
            .map(|(key, item)| (Self::string_index(&self.keys, key), item))
            .collect();
        entries.sort_by_key(|&(index, _)| index);

        let offset = self.container_header(NodeType::Map, entries.len())?;
        let start = self.data.len();
        self.data.resize(start + entries.len() * MAP_ENTRY_SIZE, 0);
        for (i, &(key_index, item)) in entries.iter().enumerate() {
            let entry = start + i * MAP_ENTRY_SIZE;
            self.data[entry..entry + 3].copy_from_slice(&Endian::native().u24_bytes(key_index));
            self.data[entry + 3] = item.node_type().tag();
            let field = self.value_field(item)?;
            self.patch(entry + 4, field);
        }
        Ok(offset)
    }

    fn write_hash_map<E: HashEntry>(&mut self, map: &IndexMap<E::Hash, Byml>) -> Result<u32> {
        let mut entries: Vec<(E::Hash, &Byml)> = map.iter().map(|(&h, v)| (h, v)).collect();
        entries.sort_by_key(|&(hash, _)| hash);

        let offset = self.container_header(E::NODE_TYPE, entries.len())?;
        let start = self.data.len();
        self.data.resize(start + entries.len() * E::SIZE, 0);
        self.data
            .extend(entries.iter().map(|(_, item)| item.node_type().tag()));
        // Trailing tag slot.
        self.data.push(0);
        self.align();

        for (i, &(hash, item)) in entries.iter().enumerate() {
            let field = self.value_field(item)? as i32;
            let record = E::new(hash, field);
            let at = start + i * E::SIZE;
            self.data[at..at + E::SIZE].copy_from_slice(bytemuck::bytes_of(&record));
        }
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::Document;
    use crate::value::HashMap32;

    fn sample() -> Byml {
        let inner = Byml::Array(vec![
            Byml::String("b".into()),
            Byml::U64(u64::MAX),
            Byml::Binary(vec![1, 2, 3]),
        ]);
        let mut map = IndexMap::new();
        map.insert("zeta".to_string(), Byml::F64(2.5));
        map.insert("alpha".to_string(), inner);
        Byml::HashMap32(HashMap32::from_iter([
            (0x30, Byml::Map(map)),
            (0x10, Byml::String("a".into())),
            (0x20, Byml::Null),
        ]))
    }

    #[test]
    fn test_native_roundtrip() {
        let value = sample();
        let bytes = value.to_binary(Endian::native()).unwrap();
        let doc = Document::new(&bytes).unwrap();
        let back = doc.to_value().unwrap();

        // Entries come back sorted by hash.
        let map = back.as_hash_map32().unwrap();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0x10, 0x20, 0x30]);
        assert_eq!(map[&0x10].as_str(), Some("a"));
        assert_eq!(map[&0x30], sample().as_hash_map32().unwrap()[&0x30]);
    }

    #[test]
    fn test_foreign_order_normalizes() {
        let value = sample();
        let mut bytes = value.to_binary(Endian::native().reversed()).unwrap();
        assert_eq!(&bytes[0..2], &Endian::native().reversed().magic());
        assert_eq!(
            Document::new(&bytes).unwrap_err(),
            Error::ForeignByteOrder
        );

        let endian = Document::normalize(&mut bytes).unwrap();
        assert_eq!(endian, Endian::native().reversed());
        assert_eq!(bytes, value.to_binary(Endian::native()).unwrap());
    }

    #[test]
    fn test_trailing_tag_written_as_zero() {
        let value = Byml::HashMap32(HashMap32::from_iter([(1, Byml::I32(1))]));
        let bytes = value.to_binary(Endian::native()).unwrap();
        let doc = Document::new(&bytes).unwrap();
        let (_, root) = doc.root().unwrap().unwrap();
        let view = doc.hash_map32(root).unwrap();
        assert_eq!(view.raw_tags(), &[NodeType::I32.tag(), 0]);
    }

    #[test]
    fn test_null_and_scalar_roots() {
        let bytes = Byml::Null.to_binary(Endian::Big).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);

        assert!(matches!(
            Byml::I32(1).to_binary(Endian::Big),
            Err(Error::NotAContainer { .. })
        ));
    }

    #[test]
    fn test_bad_version() {
        assert_eq!(
            Writer::new(Endian::Little).with_version(9).write(&Byml::Null),
            Err(Error::UnsupportedVersion { version: 9 })
        );
    }
}
