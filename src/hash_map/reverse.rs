//! In-place byte order reversal of hash map containers.

use std::collections::HashSet;

use super::entry::HashEntry;
use super::view::record_layout;
use crate::binary::{read_node_type, reverse_node, slice_mut, Endian};
use crate::error::Result;

/// Reverse the entries of the hash map at `offset` and everything they
/// reference.
///
/// `source` is the byte order the container is in before the call; child
/// offsets are read in that order before the record is swapped. The header
/// itself is the caller's responsibility, as is `count`, which must be the
/// true entry count.
///
/// `visited` is shared across the whole document so that a node reachable
/// from several parents is reversed exactly once. There is no rollback: on
/// error the buffer is left part-reversed.
pub fn reverse_hash_map<E: HashEntry>(
    data: &mut [u8],
    source: Endian,
    offset: usize,
    count: usize,
    visited: &mut HashSet<usize>,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let (entries_offset, tags_offset) = record_layout::<E>(data.len(), offset, count)?;

    for index in 0..count {
        let bytes = slice_mut(data, entries_offset + index * E::SIZE, E::SIZE)?;
        let record: E = bytemuck::pod_read_unaligned(bytes);
        let swapped = record.swapped();
        let child = if source.is_native() {
            record.value()
        } else {
            swapped.value()
        };
        bytes.copy_from_slice(bytemuck::bytes_of(&swapped));

        let node_type = read_node_type(data, tags_offset + index)?;
        reverse_node(data, source, node_type, child, visited)?;
    }
    Ok(())
}
