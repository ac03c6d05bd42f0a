//! Key and string tables.

use super::{read_ne_u32, slice, ContainerHeader, Endian, CONTAINER_HEADER_SIZE};
use crate::error::{Error, Result};
use crate::node::NodeType;

/// A sorted table of NUL-terminated strings.
///
/// Layout: container header, `count + 1` offsets relative to the table
/// start, then the string bytes. Entry `i` spans from offset `i` up to its
/// terminating NUL.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    data: &'a [u8],
    offset: usize,
    count: usize,
}

impl<'a> StringTable<'a> {
    /// Open the table at `offset` (host byte order).
    pub fn new(data: &'a [u8], offset: usize) -> Result<Self> {
        let header =
            ContainerHeader::expect(data, offset, Endian::native(), NodeType::StringTable)?;
        // The offset array, including the end marker, must be present.
        slice(
            data,
            offset + CONTAINER_HEADER_SIZE,
            (header.count + 1) * 4,
        )?;
        Ok(Self {
            data,
            offset,
            count: header.count,
        })
    }

    /// Number of strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the table has no strings.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the string at `index`.
    pub fn get(&self, index: u32) -> Result<&'a str> {
        let i = index as usize;
        if i >= self.count {
            return Err(Error::StringIndex {
                index,
                count: self.count,
            });
        }
        let rel = read_ne_u32(self.data, self.offset + CONTAINER_HEADER_SIZE + i * 4)?;
        let start = self.offset + rel as usize;
        let tail = self.data.get(start..).ok_or(Error::OutOfBounds {
            offset: start,
            len: 1,
            size: self.data.len(),
        })?;
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::InvalidUtf8 { offset: start })?;
        core::str::from_utf8(&tail[..end]).map_err(|_| Error::InvalidUtf8 { offset: start })
    }

    /// Iterate over all strings in table order.
    pub fn iter(&self) -> impl Iterator<Item = Result<&'a str>> + '_ {
        (0..self.count as u32).map(move |i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(strings: &[&str]) -> Vec<u8> {
        let endian = Endian::native();
        let mut data = vec![NodeType::StringTable.tag()];
        data.extend_from_slice(&endian.u24_bytes(strings.len() as u32));
        let mut pos = CONTAINER_HEADER_SIZE + (strings.len() + 1) * 4;
        let mut bodies = Vec::new();
        for s in strings {
            data.extend_from_slice(&(pos as u32).to_ne_bytes());
            bodies.extend_from_slice(s.as_bytes());
            bodies.push(0);
            pos += s.len() + 1;
        }
        data.extend_from_slice(&(pos as u32).to_ne_bytes());
        data.extend_from_slice(&bodies);
        data
    }

    #[test]
    fn test_get() {
        let data = table(&["alpha", "beta", ""]);
        let t = StringTable::new(&data, 0).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(0).unwrap(), "alpha");
        assert_eq!(t.get(1).unwrap(), "beta");
        assert_eq!(t.get(2).unwrap(), "");
        assert_eq!(
            t.get(3),
            Err(Error::StringIndex { index: 3, count: 3 })
        );
    }

    #[test]
    fn test_unterminated() {
        let mut data = table(&["abc"]);
        data.pop();
        let t = StringTable::new(&data, 0).unwrap();
        assert!(matches!(t.get(0), Err(Error::InvalidUtf8 { .. })));
    }

    #[test]
    fn test_iter() {
        let data = table(&["a", "b"]);
        let t = StringTable::new(&data, 0).unwrap();
        let all: Vec<_> = t.iter().collect::<Result<_>>().unwrap();
        assert_eq!(all, vec!["a", "b"]);
    }
}
