//! In-place byte order conversion of whole documents.

use std::collections::HashSet;

use super::array::ArrayView;
use super::map::MAP_ENTRY_SIZE;
use super::{
    read_ne_u32, read_node_type, swap_field, to_offset, ContainerHeader, Endian,
    CONTAINER_HEADER_SIZE, MIN_VERSION, VERSION,
};
use crate::error::{Error, Result};
use crate::hash_map::{reverse_hash_map, Entry32, Entry64};
use crate::node::NodeType;

/// Reverse the node of type `node_type` referenced by `value`.
///
/// Inline types are a no-op: their value field belongs to the parent and
/// was swapped with it. Referenced nodes are reversed at most once per
/// offset; `visited` records the offsets already done and must be shared by
/// every call for one document.
pub fn reverse_node(
    data: &mut [u8],
    source: Endian,
    node_type: NodeType,
    value: i32,
    visited: &mut HashSet<usize>,
) -> Result<()> {
    if node_type.is_inline() {
        return Ok(());
    }
    let offset = to_offset(value, data.len())?;
    if !visited.insert(offset) {
        return Ok(());
    }

    match node_type {
        NodeType::I64 | NodeType::U64 | NodeType::F64 => swap_field(data, offset, 8),
        NodeType::Binary => swap_field(data, offset, 4),
        NodeType::Array
        | NodeType::Map
        | NodeType::HashMap32
        | NodeType::HashMap64
        | NodeType::StringTable => {
            let header = ContainerHeader::expect(data, offset, source, node_type)?;
            swap_field(data, offset + 1, 3)?;
            match node_type {
                NodeType::Array => reverse_array(data, source, offset, header.count, visited),
                NodeType::Map => reverse_map(data, source, offset, header.count, visited),
                NodeType::HashMap32 => {
                    reverse_hash_map::<Entry32>(data, source, offset, header.count, visited)
                }
                NodeType::HashMap64 => {
                    reverse_hash_map::<Entry64>(data, source, offset, header.count, visited)
                }
                _ => reverse_string_table(data, offset, header.count),
            }
        }
        NodeType::Null
        | NodeType::Bool
        | NodeType::I32
        | NodeType::F32
        | NodeType::U32
        | NodeType::String => Ok(()),
    }
}

/// Swap a 4-byte value field and return it as read in `source` order.
fn swap_value_field(data: &mut [u8], source: Endian, offset: usize) -> Result<i32> {
    let before = read_ne_u32(data, offset)?;
    swap_field(data, offset, 4)?;
    Ok(if source.is_native() {
        before as i32
    } else {
        before.swap_bytes() as i32
    })
}

fn reverse_array(
    data: &mut [u8],
    source: Endian,
    offset: usize,
    count: usize,
    visited: &mut HashSet<usize>,
) -> Result<()> {
    let tags_offset = offset + CONTAINER_HEADER_SIZE;
    let values_offset = ArrayView::values_offset(offset, count);
    for index in 0..count {
        let value = swap_value_field(data, source, values_offset + index * 4)?;
        let node_type = read_node_type(data, tags_offset + index)?;
        reverse_node(data, source, node_type, value, visited)?;
    }
    Ok(())
}

fn reverse_map(
    data: &mut [u8],
    source: Endian,
    offset: usize,
    count: usize,
    visited: &mut HashSet<usize>,
) -> Result<()> {
    let entries_offset = offset + CONTAINER_HEADER_SIZE;
    for index in 0..count {
        let entry = entries_offset + index * MAP_ENTRY_SIZE;
        // 24-bit key index, then the type byte, then the value field.
        swap_field(data, entry, 3)?;
        let node_type = read_node_type(data, entry + 3)?;
        let value = swap_value_field(data, source, entry + 4)?;
        reverse_node(data, source, node_type, value, visited)?;
    }
    Ok(())
}

fn reverse_string_table(data: &mut [u8], offset: usize, count: usize) -> Result<()> {
    let offsets = offset + CONTAINER_HEADER_SIZE;
    for index in 0..=count {
        swap_field(data, offsets + index * 4, 4)?;
    }
    Ok(())
}

/// Convert a whole document from `source` byte order to the other one.
///
/// Reverses the header, the key and string tables and every node reachable
/// from the root. Shared nodes are reversed once. An error leaves the buffer
/// partly converted; the document must then be discarded.
pub fn reverse_document(data: &mut [u8], source: Endian) -> Result<()> {
    let version = source.read_u16(data, 2)?;
    if !(MIN_VERSION..=VERSION).contains(&version) {
        return Err(Error::UnsupportedVersion { version });
    }
    let key_table = source.read_u32(data, 4)?;
    let string_table = source.read_u32(data, 8)?;
    let root = source.read_u32(data, 12)?;

    swap_field(data, 0, 2)?;
    swap_field(data, 2, 2)?;
    for field in [4, 8, 12] {
        swap_field(data, field, 4)?;
    }

    let mut visited = HashSet::new();
    for table in [key_table, string_table] {
        if table != 0 {
            reverse_node(
                data,
                source,
                NodeType::StringTable,
                table as i32,
                &mut visited,
            )?;
        }
    }
    if root != 0 {
        let node_type = read_node_type(data, root as usize)?;
        reverse_node(data, source, node_type, root as i32, &mut visited)?;
    }
    Ok(())
}
