//! Synthetic tile byte builders shared by codec unit tests.

use super::EXTENSION_WATERMASK;

/// Builds a minimal but structurally valid terrain tile byte sequence.
///
/// The mesh payload is filled with zeros; only the counts matter to the
/// header walk. Extension records are emitted in the order they were
/// added.
pub struct TileBuilder {
    vertex_count: u32,
    triangle_count: u32,
    records: Vec<(u8, Vec<u8>)>,
}

impl TileBuilder {
    pub fn new() -> Self {
        Self {
            vertex_count: 4,
            triangle_count: 2,
            records: Vec::new(),
        }
    }

    pub fn triangles(mut self, count: u32) -> Self {
        self.triangle_count = count;
        self
    }

    /// Append a generic extension record.
    pub fn extension(mut self, extension_type: u8, payload: &[u8]) -> Self {
        self.records.push((extension_type, payload.to_vec()));
        self
    }

    /// Append a compact (whole-tile constant) watermask record.
    pub fn compact_watermask(self, value: u8) -> Self {
        self.extension(EXTENSION_WATERMASK, &[value])
    }

    /// Append a full-grid watermask record.
    pub fn full_watermask(self, grid: &[u8]) -> Self {
        self.extension(EXTENSION_WATERMASK, grid)
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = vec![0u8; 88];

        bytes.extend_from_slice(&self.vertex_count.to_le_bytes());
        bytes.extend(std::iter::repeat(0).take(self.vertex_count as usize * 3 * 2));

        bytes.extend_from_slice(&self.triangle_count.to_le_bytes());
        let index_width = if self.triangle_count < 65536 { 2 } else { 4 };
        bytes.extend(std::iter::repeat(0).take(self.triangle_count as usize * 3 * index_width));

        // Four empty edge-vertex lists (west, south, east, north).
        for _ in 0..4 {
            bytes.extend_from_slice(&0u32.to_le_bytes());
        }

        for (extension_type, payload) in self.records {
            bytes.push(extension_type);
            bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&payload);
        }

        bytes
    }
}
