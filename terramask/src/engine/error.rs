//! Batch-level error types.

use thiserror::Error;

use crate::canvas::CanvasError;

/// Errors that reject a Modify batch before any tile I/O happens.
///
/// Per-tile problems never surface here; they are isolated into the
/// batch report so one bad tile cannot fail its siblings.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The segmentation canvas itself is unusable.
    #[error("invalid canvas: {0}")]
    InvalidCanvas(#[from] CanvasError),

    /// Request parameters are inconsistent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
