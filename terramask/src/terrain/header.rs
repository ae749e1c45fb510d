//! Quantized-mesh header traversal.
//!
//! The mesh payload in front of the extension list is variable-length:
//! vertex and index counts decide how many bytes each section occupies,
//! and the index width itself depends on the triangle count. Nothing in
//! here decodes geometry; the walk only advances a cursor by the sizes
//! the counts imply and validates that every section fits in the file.

use super::error::TerrainError;
use super::EXTENSION_WATERMASK;

/// Byte length of the fixed tile header (bounds, center, horizon occlusion).
const FIXED_HEADER_LEN: usize = 88;

/// Bytes per vertex component (u, v, height are zig-zag encoded u16s).
const VERTEX_COMPONENT_LEN: usize = 2;

/// Bytes per edge-vertex index in the four edge lists.
const EDGE_INDEX_LEN: usize = 2;

/// Locate the watermask extension record in a tile's bytes.
///
/// Walks the fixed header and the mesh payload to the extension list,
/// then scans records in order. Returns the offset of the first type-`2`
/// record's length field (immediately after its type byte), or `None`
/// when the extension list is exhausted without finding one.
///
/// # Errors
///
/// `CorruptTile` if any count implies a section extending past the end
/// of the file.
pub fn locate_watermask(bytes: &[u8]) -> Result<Option<usize>, TerrainError> {
    let mut cursor = Cursor::new(bytes);

    cursor.skip(FIXED_HEADER_LEN, "fixed header")?;

    let vertex_count = cursor.read_u32("vertex count")? as usize;
    cursor.skip(vertex_count * 3 * VERTEX_COMPONENT_LEN, "vertex payload")?;

    let triangle_count = cursor.read_u32("triangle count")? as usize;
    let index_width = if triangle_count < 65536 { 2 } else { 4 };
    cursor.skip(triangle_count * 3 * index_width, "triangle indices")?;

    for edge in ["west", "south", "east", "north"] {
        let edge_vertex_count = cursor.read_u32(edge)? as usize;
        cursor.skip(edge_vertex_count * EDGE_INDEX_LEN, edge)?;
    }

    while !cursor.at_end() {
        let extension_type = cursor.read_u8("extension type")?;
        if extension_type == EXTENSION_WATERMASK {
            return Ok(Some(cursor.position()));
        }
        let extension_length = cursor.read_u32("extension length")? as usize;
        cursor.skip(extension_length, "extension payload")?;
    }

    Ok(None)
}

/// Bounds-checked forward-only cursor over a tile's bytes.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip(&mut self, len: usize, section: &str) -> Result<(), TerrainError> {
        let end = self.pos.checked_add(len).filter(|&e| e <= self.bytes.len());
        match end {
            Some(end) => {
                self.pos = end;
                Ok(())
            }
            None => Err(TerrainError::CorruptTile(format!(
                "{} ends past end of file (offset {}, section {} bytes, file {} bytes)",
                section,
                self.pos,
                len,
                self.bytes.len()
            ))),
        }
    }

    fn read_u8(&mut self, section: &str) -> Result<u8, TerrainError> {
        let value = *self.bytes.get(self.pos).ok_or_else(|| {
            TerrainError::CorruptTile(format!("{} missing at offset {}", section, self.pos))
        })?;
        self.pos += 1;
        Ok(value)
    }

    fn read_u32(&mut self, section: &str) -> Result<u32, TerrainError> {
        let end = self.pos + 4;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| {
            TerrainError::CorruptTile(format!("{} missing at offset {}", section, self.pos))
        })?;
        self.pos = end;
        Ok(u32::from_le_bytes(slice.try_into().unwrap()))
    }
}
