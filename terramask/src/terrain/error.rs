//! Error types for the tile container codec.

use thiserror::Error;

/// Errors raised while reading or rewriting a terrain tile file.
///
/// All variants are fatal for the tile they occur on; the batch engine
/// isolates them per tile and keeps processing siblings.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// Header fields imply an offset beyond the end of the file.
    #[error("corrupt tile: {0}")]
    CorruptTile(String),

    /// On-disk watermask length is neither 1 nor `tile_size` squared.
    #[error("invalid watermask length {found} (expected 1 or {expected})")]
    InvalidWatermaskLength { found: u32, expected: u32 },

    /// Underlying file read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TerrainError {
    /// Whether this error is a plain missing-file condition.
    ///
    /// The engine treats absent tiles as silently skipped rather than
    /// failed, so this distinction matters for batch reporting.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TerrainError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_tile_display() {
        let err = TerrainError::CorruptTile("vertex payload ends at 4000, file is 120 bytes".into());
        assert!(err.to_string().starts_with("corrupt tile:"));
    }

    #[test]
    fn test_invalid_length_display() {
        let err = TerrainError::InvalidWatermaskLength {
            found: 17,
            expected: 65536,
        };
        assert_eq!(
            err.to_string(),
            "invalid watermask length 17 (expected 1 or 65536)"
        );
    }

    #[test]
    fn test_is_not_found() {
        let missing = TerrainError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let denied = TerrainError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(missing.is_not_found());
        assert!(!denied.is_not_found());
    }
}
