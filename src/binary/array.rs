//! Array containers.

use super::{align4, read_ne_u32, slice, CONTAINER_HEADER_SIZE};
use crate::error::{Error, Result};
use crate::node::NodeType;

/// Zero-copy view of an array container.
///
/// Layout: container header, `count` type bytes, padding to 4, then `count`
/// 4-byte value fields.
#[derive(Debug, Clone, Copy)]
pub struct ArrayView<'a> {
    tags: &'a [u8],
    values: &'a [u8],
    tags_offset: usize,
    count: usize,
}

impl<'a> ArrayView<'a> {
    /// Create a view over the array whose header is at `offset`.
    pub fn new(data: &'a [u8], offset: usize, count: usize) -> Result<Self> {
        if count == 0 {
            return Ok(Self {
                tags: &[],
                values: &[],
                tags_offset: offset,
                count,
            });
        }
        let tags_offset = offset + CONTAINER_HEADER_SIZE;
        Ok(Self {
            tags: slice(data, tags_offset, count)?,
            values: slice(data, Self::values_offset(offset, count), count * 4)?,
            tags_offset,
            count,
        })
    }

    /// Absolute offset of the value fields of the array whose header is at
    /// `offset`.
    pub(crate) fn values_offset(offset: usize, count: usize) -> usize {
        align4(offset + CONTAINER_HEADER_SIZE + count)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the array is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Type and value field of element `index`.
    pub fn at(&self, index: usize) -> Result<(NodeType, i32)> {
        if index >= self.count {
            return Err(Error::IndexOutOfRange {
                index,
                count: self.count,
            });
        }
        let node_type = NodeType::from_tag(self.tags[index], self.tags_offset + index)?;
        let value = read_ne_u32(self.values, index * 4)? as i32;
        Ok((node_type, value))
    }

    /// Iterate over elements in stored order.
    pub fn iter(&self) -> ArrayIter<'a> {
        ArrayIter {
            view: *self,
            index: 0,
        }
    }
}

/// Iterator over the elements of an [`ArrayView`].
#[derive(Debug, Clone)]
pub struct ArrayIter<'a> {
    view: ArrayView<'a>,
    index: usize,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = Result<(NodeType, i32)>;

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

impl<'a> ExactSizeIterator for ArrayIter<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        let mut data = vec![NodeType::Array.tag(), 0, 0, 0];
        data.extend_from_slice(&[NodeType::I32.tag(), NodeType::Bool.tag(), 0, 0]);
        data.extend_from_slice(&(-5i32).to_ne_bytes());
        data.extend_from_slice(&1u32.to_ne_bytes());
        let view = ArrayView::new(&data, 0, 2).unwrap();
        assert_eq!(view.at(0).unwrap(), (NodeType::I32, -5));
        assert_eq!(view.at(1).unwrap(), (NodeType::Bool, 1));
        assert_eq!(
            view.at(2),
            Err(Error::IndexOutOfRange { index: 2, count: 2 })
        );
        assert_eq!(view.iter().len(), 2);
    }

    #[test]
    fn test_empty_never_reads() {
        let view = ArrayView::new(&[], 1000, 0).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }

    #[test]
    fn test_truncated() {
        let data = [NodeType::Array.tag(), 0, 0, 0, NodeType::I32.tag()];
        assert!(matches!(
            ArrayView::new(&data, 0, 1),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
