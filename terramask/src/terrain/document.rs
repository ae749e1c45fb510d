//! Parsed tile-file representation.
//!
//! Rewriting a variable-length record in the middle of a file with raw
//! offset arithmetic is easy to get wrong, so the codec parses a tile
//! into `{prefix, watermask, suffix}` once and serializes the whole
//! document deterministically on write. The prefix is everything before
//! the watermask record (mesh payload plus any earlier extensions), the
//! suffix everything after its framed payload; both are carried verbatim
//! so no other extension record is ever moved or reordered.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::error::TerrainError;
use super::header::locate_watermask;
use super::watermask::Watermask;
use super::EXTENSION_WATERMASK;

/// A terrain tile file, parsed just deep enough to edit its watermask.
#[derive(Debug, Clone)]
pub struct TileDocument {
    prefix: Vec<u8>,
    watermask: Option<Watermask>,
    suffix: Vec<u8>,
}

impl TileDocument {
    /// Parse a tile's bytes.
    ///
    /// A tile without a watermask record parses with `watermask: None`
    /// (the implicitly-dry sentinel); serializing it unchanged
    /// reproduces the input bytes exactly.
    ///
    /// # Errors
    ///
    /// * `CorruptTile` if the header walk runs past the end of the file
    ///   or a compact mask byte is neither 0 nor 1.
    /// * `InvalidWatermaskLength` if the stored length is neither 1 nor
    ///   `tile_size` squared.
    pub fn parse(bytes: &[u8], tile_size: usize) -> Result<Self, TerrainError> {
        let Some(pos) = locate_watermask(bytes)? else {
            return Ok(Self {
                prefix: bytes.to_vec(),
                watermask: None,
                suffix: Vec::new(),
            });
        };

        // `pos` points at the length field; the type byte sits at pos - 1.
        let length_end = pos + 4;
        let length_bytes = bytes.get(pos..length_end).ok_or_else(|| {
            TerrainError::CorruptTile(format!("watermask length missing at offset {}", pos))
        })?;
        let length = u32::from_le_bytes(length_bytes.try_into().unwrap()) as usize;

        let payload_end = length_end.checked_add(length).filter(|&e| e <= bytes.len());
        let payload_end = payload_end.ok_or_else(|| {
            TerrainError::CorruptTile(format!(
                "watermask payload of {} bytes ends past end of file",
                length
            ))
        })?;
        let payload = &bytes[length_end..payload_end];

        let watermask = match length {
            1 => match payload[0] {
                0 => Watermask::Compact(false),
                1 => Watermask::Compact(true),
                other => {
                    return Err(TerrainError::CorruptTile(format!(
                        "compact watermask byte {} (expected 0 or 1)",
                        other
                    )))
                }
            },
            l if l == tile_size * tile_size => Watermask::Full(payload.to_vec()),
            l => {
                return Err(TerrainError::InvalidWatermaskLength {
                    found: l as u32,
                    expected: (tile_size * tile_size) as u32,
                })
            }
        };

        Ok(Self {
            prefix: bytes[..pos - 1].to_vec(),
            watermask: Some(watermask),
            suffix: bytes[payload_end..].to_vec(),
        })
    }

    /// Read and parse a tile file.
    pub fn read(path: &Path, tile_size: usize) -> Result<Self, TerrainError> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes, tile_size)
    }

    /// The tile's current watermask, `None` when implicitly dry.
    pub fn watermask(&self) -> Option<&Watermask> {
        self.watermask.as_ref()
    }

    /// Expand the current mask to a full grid (absent masks are dry).
    pub fn mask_grid(&self, tile_size: usize) -> Vec<u8> {
        match &self.watermask {
            Some(mask) => mask.to_grid(tile_size),
            None => vec![0x00; tile_size * tile_size],
        }
    }

    /// Replace (or install) the watermask.
    ///
    /// A tile that had no record gains one at the end of the file; an
    /// existing record keeps its position with only the framed payload
    /// replaced.
    pub fn set_watermask(&mut self, mask: Watermask) {
        self.watermask = Some(mask);
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mask_len = self.watermask.as_ref().map_or(0, |m| 1 + m.framed_len());
        let mut out =
            Vec::with_capacity(self.prefix.len() + mask_len + self.suffix.len());
        out.extend_from_slice(&self.prefix);
        if let Some(mask) = &self.watermask {
            out.push(EXTENSION_WATERMASK);
            mask.encode_into(&mut out);
        }
        out.extend_from_slice(&self.suffix);
        out
    }

    /// Write the document to `path`, atomically.
    ///
    /// The bytes go to a temporary file in the tile's directory which is
    /// then renamed over the target, so a crash mid-write leaves the old
    /// tile intact rather than a truncated one.
    pub fn write(&self, path: &Path) -> Result<(), TerrainError> {
        let temp_path = path.with_extension("terrain.tmp");
        fs::write(&temp_path, self.to_bytes())?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

/// Read-modify-write a tile's watermask.
///
/// Transient I/O failures (sharing violations while the viewer still
/// holds the file, for instance) get a single retry before the error is
/// surfaced. Corrupt-tile and invalid-length errors are never retried.
pub fn update_watermask(
    path: &Path,
    mask: Watermask,
    tile_size: usize,
) -> Result<(), TerrainError> {
    match try_update(path, mask.clone(), tile_size) {
        Err(TerrainError::Io(first)) if first.kind() != std::io::ErrorKind::NotFound => {
            warn!(
                path = %path.display(),
                error = %first,
                "tile update failed, retrying once"
            );
            try_update(path, mask, tile_size)
        }
        other => other,
    }
}

fn try_update(path: &Path, mask: Watermask, tile_size: usize) -> Result<(), TerrainError> {
    let mut document = TileDocument::read(path, tile_size)?;
    debug!(
        path = %path.display(),
        had_mask = document.watermask().is_some(),
        "rewriting tile watermask"
    );
    document.set_watermask(mask);
    document.write(path)
}
