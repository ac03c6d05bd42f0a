//! Document reader and node resolution.

use indexmap::IndexMap;

use super::array::ArrayView;
use super::map::MapView;
use super::reverse::reverse_document;
use super::string_table::StringTable;
use super::{
    read_ne_u32, read_ne_u64, read_node_type, slice, to_offset, ContainerHeader, Endian,
    HEADER_SIZE, MIN_VERSION, VERSION,
};
use crate::error::{Error, Result};
use crate::hash_map::{HashMap32View, HashMap64View};
use crate::node::NodeType;
use crate::value::Byml;

/// A binary document in host byte order, borrowed from its buffer.
///
/// All node access goes through the document: child values are stored as
/// offsets into the same buffer and resolved here.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    data: &'a [u8],
    version: u16,
    keys: Option<StringTable<'a>>,
    strings: Option<StringTable<'a>>,
    root: Option<usize>,
}

impl<'a> Document<'a> {
    /// Open a document. It must already be in host byte order.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let magic: [u8; 2] = [
            *data.first().ok_or(Error::OutOfBounds {
                offset: 0,
                len: HEADER_SIZE,
                size: data.len(),
            })?,
            *data.get(1).ok_or(Error::OutOfBounds {
                offset: 0,
                len: HEADER_SIZE,
                size: data.len(),
            })?,
        ];
        if !Endian::from_magic(magic)?.is_native() {
            return Err(Error::ForeignByteOrder);
        }
        slice(data, 0, HEADER_SIZE)?;

        let endian = Endian::native();
        let version = endian.read_u16(data, 2)?;
        if !(MIN_VERSION..=VERSION).contains(&version) {
            return Err(Error::UnsupportedVersion { version });
        }
        let table = |field: usize| -> Result<Option<StringTable<'a>>> {
            match endian.read_u32(data, field)? {
                0 => Ok(None),
                offset => StringTable::new(data, offset as usize).map(Some),
            }
        };
        let keys = table(4)?;
        let strings = table(8)?;
        let root = match endian.read_u32(data, 12)? {
            0 => None,
            offset => Some(offset as usize),
        };

        Ok(Self {
            data,
            version,
            keys,
            strings,
            root,
        })
    }

    /// Convert a document to host byte order in place.
    ///
    /// Returns the byte order the document was stored in. A failure part way
    /// through leaves the buffer corrupt and is reported as
    /// [`Error::Reversal`].
    pub fn normalize(data: &mut [u8]) -> Result<Endian> {
        let magic = [
            data.first().copied().unwrap_or(0),
            data.get(1).copied().unwrap_or(0),
        ];
        let endian = Endian::from_magic(magic)?;
        if !endian.is_native() {
            reverse_document(data, endian).map_err(|err| Error::Reversal(Box::new(err)))?;
        }
        Ok(endian)
    }

    /// The underlying buffer.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Format version from the header.
    #[inline]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Type and offset of the root node, if the document has one.
    pub fn root(&self) -> Result<Option<(NodeType, i32)>> {
        match self.root {
            None => Ok(None),
            Some(offset) => {
                let node_type = read_node_type(self.data, offset)?;
                Ok(Some((node_type, offset as i32)))
            }
        }
    }

    /// Materialize the whole document. An empty document is [`Byml::Null`].
    pub fn to_value(&self) -> Result<Byml> {
        match self.root()? {
            None => Ok(Byml::Null),
            Some((node_type, value)) => self.resolve(node_type, value),
        }
    }

    /// Look up a key table entry.
    pub fn key(&self, index: u32) -> Result<&'a str> {
        match &self.keys {
            Some(table) => table.get(index),
            None => Err(Error::StringIndex { index, count: 0 }),
        }
    }

    /// Look up a string table entry.
    pub fn string(&self, index: u32) -> Result<&'a str> {
        match &self.strings {
            Some(table) => table.get(index),
            None => Err(Error::StringIndex { index, count: 0 }),
        }
    }

    fn header(&self, value: i32, expected: NodeType) -> Result<(usize, usize)> {
        let offset = to_offset(value, self.data.len())?;
        let header = ContainerHeader::expect(self.data, offset, Endian::native(), expected)?;
        Ok((offset, header.count))
    }

    /// View of the array at `value`.
    pub fn array(&self, value: i32) -> Result<ArrayView<'a>> {
        let (offset, count) = self.header(value, NodeType::Array)?;
        ArrayView::new(self.data, offset, count)
    }

    /// View of the string-keyed map at `value`.
    pub fn map(&self, value: i32) -> Result<MapView<'a>> {
        let (offset, count) = self.header(value, NodeType::Map)?;
        MapView::new(self.data, offset, count)
    }

    /// View of the 32-bit hash map at `value`.
    pub fn hash_map32(&self, value: i32) -> Result<HashMap32View<'a>> {
        let (offset, count) = self.header(value, NodeType::HashMap32)?;
        HashMap32View::new(self.data, offset, count)
    }

    /// View of the 64-bit hash map at `value`.
    pub fn hash_map64(&self, value: i32) -> Result<HashMap64View<'a>> {
        let (offset, count) = self.header(value, NodeType::HashMap64)?;
        HashMap64View::new(self.data, offset, count)
    }

    /// Read the 8-byte payload of a 64-bit scalar.
    fn wide(&self, value: i32) -> Result<u64> {
        read_ne_u64(self.data, to_offset(value, self.data.len())?)
    }

    /// Materialize the node of type `node_type` whose value field is `value`.
    ///
    /// Inline types decode `value` directly; all others treat it as an
    /// offset. Containers are resolved recursively. A container that is
    /// reachable from inside itself fails with [`Error::Cycle`]; one shared
    /// by several parents is resolved once per parent.
    pub fn resolve(&self, node_type: NodeType, value: i32) -> Result<Byml> {
        self.resolve_within(node_type, value, &mut Vec::new())
    }

    /// [`resolve`](Self::resolve) below the containers in `open`, which are
    /// still being resolved.
    pub(crate) fn resolve_within(
        &self,
        node_type: NodeType,
        value: i32,
        open: &mut Vec<usize>,
    ) -> Result<Byml> {
        if !node_type.is_container() {
            return self.resolve_scalar(node_type, value);
        }
        let offset = to_offset(value, self.data.len())?;
        if open.contains(&offset) {
            return Err(Error::Cycle { offset });
        }
        open.push(offset);
        let result = self.resolve_container(node_type, value, open);
        open.pop();
        result
    }

    fn resolve_container(
        &self,
        node_type: NodeType,
        value: i32,
        open: &mut Vec<usize>,
    ) -> Result<Byml> {
        Ok(match node_type {
            NodeType::Array => Byml::Array(
                self.array(value)?
                    .iter()
                    .map(|item| item.and_then(|(ty, v)| self.resolve_within(ty, v, open)))
                    .collect::<Result<_>>()?,
            ),
            NodeType::Map => {
                let view = self.map(value)?;
                let mut map = IndexMap::with_capacity(view.len());
                for entry in view.iter() {
                    let entry = entry?;
                    let key = self.key(entry.key_index)?.to_owned();
                    map.insert(key, self.resolve_within(entry.node_type, entry.value, open)?);
                }
                Byml::Map(map)
            }
            NodeType::HashMap32 => Byml::HashMap32(self.hash_map32(value)?.collect(self, open)?),
            NodeType::HashMap64 => Byml::HashMap64(self.hash_map64(value)?.collect(self, open)?),
            _ => return self.resolve_scalar(node_type, value),
        })
    }

    fn resolve_scalar(&self, node_type: NodeType, value: i32) -> Result<Byml> {
        Ok(match node_type {
            NodeType::Null => Byml::Null,
            NodeType::Bool => Byml::Bool(value != 0),
            NodeType::I32 => Byml::I32(value),
            NodeType::F32 => Byml::F32(f32::from_bits(value as u32)),
            NodeType::U32 => Byml::U32(value as u32),
            NodeType::String => Byml::String(self.string(value as u32)?.to_owned()),
            NodeType::I64 => Byml::I64(self.wide(value)? as i64),
            NodeType::U64 => Byml::U64(self.wide(value)?),
            NodeType::F64 => Byml::F64(f64::from_bits(self.wide(value)?)),
            NodeType::Binary => {
                let offset = to_offset(value, self.data.len())?;
                let len = read_ne_u32(self.data, offset)? as usize;
                let start = offset.checked_add(4).ok_or(Error::OutOfBounds {
                    offset,
                    len: 4,
                    size: self.data.len(),
                })?;
                Byml::Binary(slice(self.data, start, len)?.to_vec())
            }
            NodeType::Array
            | NodeType::Map
            | NodeType::HashMap32
            | NodeType::HashMap64
            | NodeType::StringTable => {
                return Err(Error::UnknownNodeType {
                    tag: node_type.tag(),
                    offset: to_offset(value, self.data.len())?,
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(magic: [u8; 2], version: u16) -> Vec<u8> {
        let mut data = magic.to_vec();
        data.extend_from_slice(&version.to_ne_bytes());
        data.extend_from_slice(&[0u8; 12]);
        data
    }

    #[test]
    fn test_empty_document() {
        let data = header(Endian::native().magic(), VERSION);
        let doc = Document::new(&data).unwrap();
        assert_eq!(doc.version(), VERSION);
        assert_eq!(doc.root().unwrap(), None);
        assert_eq!(doc.to_value().unwrap(), Byml::Null);
        assert!(matches!(doc.string(0), Err(Error::StringIndex { .. })));
    }

    #[test]
    fn test_foreign_order_rejected() {
        let data = header(Endian::native().reversed().magic(), VERSION.swap_bytes());
        assert_eq!(Document::new(&data).unwrap_err(), Error::ForeignByteOrder);
    }

    #[test]
    fn test_bad_magic_and_version() {
        assert!(matches!(
            Document::new(b"XX"),
            Err(Error::InvalidMagic { .. })
        ));
        let data = header(Endian::native().magic(), 1);
        assert_eq!(
            Document::new(&data).unwrap_err(),
            Error::UnsupportedVersion { version: 1 }
        );
        assert!(matches!(
            Document::new(&Endian::native().magic()),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_normalize_native_is_noop() {
        let mut data = header(Endian::native().magic(), VERSION);
        let before = data.clone();
        assert_eq!(Document::normalize(&mut data).unwrap(), Endian::native());
        assert_eq!(data, before);
    }

    #[test]
    fn test_resolve_inline() {
        let data = header(Endian::native().magic(), VERSION);
        let doc = Document::new(&data).unwrap();
        assert_eq!(doc.resolve(NodeType::I32, -3).unwrap(), Byml::I32(-3));
        assert_eq!(doc.resolve(NodeType::U32, -1).unwrap(), Byml::U32(u32::MAX));
        assert_eq!(doc.resolve(NodeType::Bool, 1).unwrap(), Byml::Bool(true));
        assert_eq!(
            doc.resolve(NodeType::F32, 1.5f32.to_bits() as i32).unwrap(),
            Byml::F32(1.5)
        );
        assert_eq!(doc.resolve(NodeType::Null, 0).unwrap(), Byml::Null);
    }

    /// A document whose root container holds one child pointing back at the
    /// root.
    fn self_referencing(container: NodeType) -> Vec<u8> {
        let mut data = header(Endian::native().magic(), VERSION);
        data[12..16].copy_from_slice(&16u32.to_ne_bytes());
        data.push(container.tag());
        data.extend_from_slice(&Endian::native().u24_bytes(1));
        match container {
            NodeType::Array => {
                data.push(NodeType::Array.tag());
                data.extend_from_slice(&[0; 3]);
                data.extend_from_slice(&16i32.to_ne_bytes());
            }
            _ => {
                data.extend_from_slice(&0x1au32.to_ne_bytes());
                data.extend_from_slice(&16i32.to_ne_bytes());
                data.push(NodeType::HashMap32.tag());
                data.extend_from_slice(&[0; 3]);
            }
        }
        data
    }

    #[test]
    fn test_cycle_is_an_error() {
        for container in [NodeType::Array, NodeType::HashMap32] {
            let data = self_referencing(container);
            let doc = Document::new(&data).unwrap();
            assert_eq!(doc.to_value(), Err(Error::Cycle { offset: 16 }));
        }
    }

    #[test]
    fn test_shared_container_is_not_a_cycle() {
        // Root array at 16 with two items pointing at the empty array at 32.
        let mut data = header(Endian::native().magic(), VERSION);
        data[12..16].copy_from_slice(&16u32.to_ne_bytes());
        data.push(NodeType::Array.tag());
        data.extend_from_slice(&Endian::native().u24_bytes(2));
        data.extend_from_slice(&[NodeType::Array.tag(), NodeType::Array.tag(), 0, 0]);
        data.extend_from_slice(&32i32.to_ne_bytes());
        data.extend_from_slice(&32i32.to_ne_bytes());
        data.push(NodeType::Array.tag());
        data.extend_from_slice(&Endian::native().u24_bytes(0));

        let doc = Document::new(&data).unwrap();
        assert_eq!(
            doc.to_value().unwrap(),
            Byml::Array(vec![Byml::Array(vec![]), Byml::Array(vec![])])
        );
    }
}
