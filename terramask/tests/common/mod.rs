//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use terramask::coord::TileCoord;
use terramask::engine::{ProgressEvent, ProgressSink};

/// Watermask extension type tag.
pub const EXT_WATERMASK: u8 = 2;

/// Builds a minimal but structurally valid terrain tile byte sequence.
pub struct TileBuilder {
    vertex_count: u32,
    triangle_count: u32,
    records: Vec<(u8, Vec<u8>)>,
}

#[allow(dead_code)]
impl TileBuilder {
    pub fn new() -> Self {
        Self {
            vertex_count: 4,
            triangle_count: 2,
            records: Vec::new(),
        }
    }

    pub fn extension(mut self, extension_type: u8, payload: &[u8]) -> Self {
        self.records.push((extension_type, payload.to_vec()));
        self
    }

    pub fn compact_watermask(self, value: u8) -> Self {
        self.extension(EXT_WATERMASK, &[value])
    }

    pub fn full_watermask(self, grid: &[u8]) -> Self {
        self.extension(EXT_WATERMASK, grid)
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = vec![0u8; 88];

        bytes.extend_from_slice(&self.vertex_count.to_le_bytes());
        bytes.extend(std::iter::repeat(0).take(self.vertex_count as usize * 3 * 2));

        bytes.extend_from_slice(&self.triangle_count.to_le_bytes());
        let index_width = if self.triangle_count < 65536 { 2 } else { 4 };
        bytes.extend(std::iter::repeat(0).take(self.triangle_count as usize * 3 * index_width));

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

/// Write tile bytes at the coordinate's canonical path under `root`.
pub fn write_tile(root: &Path, tile: TileCoord, bytes: &[u8]) {
    let path = tile.path(root);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

/// Progress sink that records every event.
pub struct RecordingSink {
    pub events: Mutex<Vec<ProgressEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn committed_values(&self) -> Vec<usize> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Committed(n) => Some(*n),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}
