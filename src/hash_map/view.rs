//! Zero-copy hash map views.

use core::marker::PhantomData;

use indexmap::IndexMap;

use super::entry::{Entry32, Entry64, HashEntry};
use crate::binary::{align4, slice, Document, CONTAINER_HEADER_SIZE};
use crate::error::{Error, Result};
use crate::node::NodeType;
use crate::value::Byml;

/// One entry of a hash map, paired with its type tag.
///
/// Derived on access; nothing of this shape is stored contiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyedNode<H> {
    /// Hash key
    pub hash: H,
    /// Raw type tag byte
    pub tag: u8,
    /// Inline value or offset of the child node
    pub value: i32,
    /// Byte offset of the tag, for diagnostics
    tag_offset: usize,
}

impl<H> KeyedNode<H> {
    /// Decode the type tag.
    #[inline]
    pub fn node_type(&self) -> Result<NodeType> {
        NodeType::from_tag(self.tag, self.tag_offset)
    }
}

/// Read-only view of a hash map container inside a borrowed buffer.
///
/// Layout after the 4-byte header: `count` fixed-size entry records, then
/// `count + 1` type tags, one per entry plus a trailing tag this view
/// exposes through [`raw_tags`](Self::raw_tags) but never interprets.
///
/// The view borrows the buffer for `'a`, so the buffer cannot be mutated or
/// moved while it is alive. Indexed access does not allocate.
#[derive(Debug)]
pub struct HashMapView<'a, E> {
    entries: &'a [u8],
    tags: &'a [u8],
    tags_offset: usize,
    count: usize,
    _entry: PhantomData<E>,
}

/// View of a hash map with 32-bit keys.
pub type HashMap32View<'a> = HashMapView<'a, Entry32>;

/// View of a hash map with 64-bit keys.
pub type HashMap64View<'a> = HashMapView<'a, Entry64>;

/// Offsets of the entry records and of the type tags of the container at
/// `offset`, checked so that the tags end does not overflow.
pub(crate) fn record_layout<E: HashEntry>(
    size: usize,
    offset: usize,
    count: usize,
) -> Result<(usize, usize)> {
    let entries_offset = offset.checked_add(CONTAINER_HEADER_SIZE);
    let entries_len = count.checked_mul(E::SIZE);
    let layout = entries_offset.zip(entries_len).and_then(|(start, len)| {
        let tags_offset = start.checked_add(len)?;
        tags_offset.checked_add(count.checked_add(1)?)?;
        Some((start, tags_offset))
    });
    layout.ok_or(Error::OutOfBounds {
        offset,
        len: count.saturating_mul(E::SIZE + 1),
        size,
    })
}

impl<'a, E> Clone for HashMapView<'a, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, E> Copy for HashMapView<'a, E> {}

impl<'a, E: HashEntry> HashMapView<'a, E> {
    /// Create a view over the container whose header is at `offset`.
    ///
    /// `count` comes from the caller (normally the container header) and
    /// must match the number of records actually stored. A zero count never
    /// touches the buffer, so a bogus offset on an empty container is
    /// harmless.
    pub fn new(data: &'a [u8], offset: usize, count: usize) -> Result<Self> {
        if count == 0 {
            return Ok(Self {
                entries: &[],
                tags: &[],
                tags_offset: offset,
                count,
                _entry: PhantomData,
            });
        }
        let (entries_offset, tags_offset) = record_layout::<E>(data.len(), offset, count)?;
        Ok(Self {
            entries: slice(data, entries_offset, count * E::SIZE)?,
            tags: slice(data, tags_offset, count + 1)?,
            tags_offset,
            count,
            _entry: PhantomData,
        })
    }

    /// Total size of the container in bytes, including trailing padding.
    pub fn byte_size(count: usize) -> usize {
        align4(CONTAINER_HEADER_SIZE + count * E::SIZE + count + 1)
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the container has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Declared node type.
    #[inline]
    pub fn node_type(&self) -> NodeType {
        E::NODE_TYPE
    }

    /// The entry at `index`, paired with its type tag.
    #[inline]
    pub fn at(&self, index: usize) -> Result<KeyedNode<E::Hash>> {
        if index >= self.count {
            return Err(Error::IndexOutOfRange {
                index,
                count: self.count,
            });
        }
        let start = index * E::SIZE;
        let record: E = bytemuck::pod_read_unaligned(&self.entries[start..start + E::SIZE]);
        Ok(KeyedNode {
            hash: record.hash(),
            tag: self.tags[index],
            value: record.value(),
            tag_offset: self.tags_offset + index,
        })
    }

    /// Find an entry by hash.
    ///
    /// Binary search: assumes entries are in ascending hash order, as
    /// [`Writer`](crate::binary::Writer) produces them. The format itself
    /// does not guarantee this.
    pub fn get(&self, hash: E::Hash) -> Option<KeyedNode<E::Hash>> {
        let (mut lo, mut hi) = (0, self.count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let node = self.at(mid).ok()?;
            match node.hash.cmp(&hash) {
                core::cmp::Ordering::Less => lo = mid + 1,
                core::cmp::Ordering::Greater => hi = mid,
                core::cmp::Ordering::Equal => return Some(node),
            }
        }
        None
    }

    /// All `count + 1` stored type tags, including the trailing one.
    #[inline]
    pub fn raw_tags(&self) -> &'a [u8] {
        self.tags
    }

    /// Iterate over entries in stored order.
    pub fn iter(&self) -> HashMapIter<'a, E> {
        HashMapIter {
            view: *self,
            index: 0,
        }
    }

    /// Check if any value is itself an array, map or hash map.
    pub fn has_container_values(&self) -> Result<bool> {
        for node in self.iter() {
            if node.node_type()?.is_container() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Materialize into an owned map, resolving every value through `doc`.
    ///
    /// Nested containers are resolved recursively. On duplicate hashes the
    /// later entry's value wins and keeps the earlier entry's position.
    pub fn to_mutable_map(&self, doc: &Document<'_>) -> Result<IndexMap<E::Hash, Byml>> {
        self.collect(doc, &mut Vec::new())
    }

    /// [`to_mutable_map`](Self::to_mutable_map) below the containers in
    /// `open`, which are still being resolved.
    pub(crate) fn collect(
        &self,
        doc: &Document<'_>,
        open: &mut Vec<usize>,
    ) -> Result<IndexMap<E::Hash, Byml>> {
        let mut map = IndexMap::with_capacity(self.count);
        for node in self.iter() {
            let value = doc.resolve_within(node.node_type()?, node.value, open)?;
            map.insert(node.hash, value);
        }
        Ok(map)
    }
}

impl<'a, 'v, E: HashEntry> IntoIterator for &'v HashMapView<'a, E> {
    type Item = KeyedNode<E::Hash>;
    type IntoIter = HashMapIter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`HashMapView`].
#[derive(Debug, Clone)]
pub struct HashMapIter<'a, E> {
    view: HashMapView<'a, E>,
    index: usize,
}

impl<'a, E: HashEntry> Iterator for HashMapIter<'a, E> {
    type Item = KeyedNode<E::Hash>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.view.at(self.index).ok()?;
        self.index += 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.count.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, E: HashEntry> ExactSizeIterator for HashMapIter<'a, E> {}
