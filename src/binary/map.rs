//! String-keyed map containers.

use super::{read_ne_u32, slice, Endian, CONTAINER_HEADER_SIZE};
use crate::error::{Error, Result};
use crate::node::NodeType;

/// Size of one map entry: 24-bit key index, type byte, value field.
pub const MAP_ENTRY_SIZE: usize = 8;

/// One entry of a [`MapView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    /// Index into the document's key table
    pub key_index: u32,
    /// Value type
    pub node_type: NodeType,
    /// Inline value or offset
    pub value: i32,
}

/// Zero-copy view of a map container keyed through the key table.
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    entries: &'a [u8],
    entries_offset: usize,
    count: usize,
}

impl<'a> MapView<'a> {
    /// Create a view over the map whose header is at `offset`.
    pub fn new(data: &'a [u8], offset: usize, count: usize) -> Result<Self> {
        let entries_offset = offset + CONTAINER_HEADER_SIZE;
        let entries = if count == 0 {
            &[]
        } else {
            slice(data, entries_offset, count * MAP_ENTRY_SIZE)?
        };
        Ok(Self {
            entries,
            entries_offset,
            count,
        })
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Entry at `index`.
    pub fn at(&self, index: usize) -> Result<MapEntry> {
        if index >= self.count {
            return Err(Error::IndexOutOfRange {
                index,
                count: self.count,
            });
        }
        let base = index * MAP_ENTRY_SIZE;
        let key_index = Endian::native().read_u24(self.entries, base)?;
        let node_type =
            NodeType::from_tag(self.entries[base + 3], self.entries_offset + base + 3)?;
        let value = read_ne_u32(self.entries, base + 4)? as i32;
        Ok(MapEntry {
            key_index,
            node_type,
            value,
        })
    }

    /// Iterate over entries in stored order.
    pub fn iter(&self) -> MapIter<'a> {
        MapIter {
            view: *self,
            index: 0,
        }
    }
}

/// Iterator over the entries of a [`MapView`].
#[derive(Debug, Clone)]
pub struct MapIter<'a> {
    view: MapView<'a>,
    index: usize,
}

impl<'a> Iterator for MapIter<'a> {
    type Item = Result<MapEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.view.count {
            return None;
        }
        let item = self.view.at(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.count - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for MapIter<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        let endian = Endian::native();
        let mut data = vec![NodeType::Map.tag(), 0, 0, 0];
        data.extend_from_slice(&endian.u24_bytes(3));
        data.push(NodeType::U32.tag());
        data.extend_from_slice(&7u32.to_ne_bytes());
        let view = MapView::new(&data, 0, 1).unwrap();
        assert_eq!(
            view.at(0).unwrap(),
            MapEntry {
                key_index: 3,
                node_type: NodeType::U32,
                value: 7
            }
        );
        assert!(matches!(view.at(1), Err(Error::IndexOutOfRange { .. })));
    }
}
