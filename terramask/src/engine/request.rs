//! Modify request parameters.

use std::path::PathBuf;

use crate::projector::CoverMode;

/// Parameters of one Modify batch.
///
/// The viewport spans `(ortho_width / tile_size) + 1` tiles per axis
/// starting at `bottom_left`; `offset` locates the canvas origin in the
/// viewport's pixel space. `recursive: false` is the
/// ModifyWithoutRecursive variant: commit the viewport tiles but leave
/// descendants alone.
#[derive(Debug, Clone)]
pub struct ModifyRequest {
    /// Terrain tree root directory.
    pub root: PathBuf,
    /// Level of detail of the viewport tiles.
    pub lod: u8,
    /// `(x, y)` of the viewport's bottom-left tile.
    pub bottom_left: (u32, u32),
    /// Canvas origin displacement in viewport pixels.
    pub offset: (i32, i32),
    /// Canvas coverage width in pixels.
    pub ortho_width: usize,
    /// Conflict policy against previously stored mask bytes.
    pub cover: CoverMode,
    /// Whether to propagate into descendant tiles after each commit.
    pub recursive: bool,
}
