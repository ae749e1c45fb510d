//! Quadrant mask projection.
//!
//! One Modify batch touches the grid of tiles spanned by the
//! segmentation viewport. For each target tile this module maps the
//! canvas onto the tile's local pixel space and produces the raw
//! (pre-smoothing) full-grid update. The transform is the same for
//! every viewport cell; the cell index `(i, j)` is the only parameter,
//! replacing per-corner special cases.

use crate::canvas::Canvas;

/// Conflict policy between canvas values and previously stored mask
/// bytes inside the overlap region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverMode {
    /// Only canvas-wet pixels overwrite; everything else keeps the
    /// tile's prior value. Used to extend existing water.
    Fill,
    /// The canvas wins unconditionally wherever it overlaps the tile.
    Replace,
}

/// Project the canvas onto one viewport tile.
///
/// `existing` is the tile's current mask expanded to a full grid
/// (implicitly-dry tiles pass all zeros), `cell` the tile's `(i, j)`
/// position in the viewport grid, `offset` the canvas origin in
/// viewport pixel space.
///
/// A tile pixel `(x, y)` sits at canvas-space `(x + i*tile_size,
/// y + j*tile_size)`; the canvas supplies its value when that position
/// lies within `[offset, offset + ortho_width]` on both axes. The test
/// is inclusive at BOTH bounds, faithfully double-counting a one-pixel
/// strip between adjacent viewports; see the boundary tests before
/// changing it. Pixels outside the overlap are returned unchanged,
/// which keeps every update strictly local to the viewport.
pub fn project_tile(
    canvas: &Canvas,
    existing: &[u8],
    cell: (u32, u32),
    offset: (i32, i32),
    ortho_width: usize,
    tile_size: usize,
    cover: CoverMode,
) -> Vec<u8> {
    debug_assert_eq!(existing.len(), tile_size * tile_size);

    let (i, j) = cell;
    let (offset_x, offset_y) = (offset.0 as i64, offset.1 as i64);
    let span = ortho_width as i64;

    let mut out = existing.to_vec();
    for y in 0..tile_size {
        let v = (y + j as usize * tile_size) as i64;
        if v < offset_y || v > offset_y + span {
            continue;
        }
        let row = (v - offset_y) as usize;
        for x in 0..tile_size {
            let u = (x + i as usize * tile_size) as i64;
            if u < offset_x || u > offset_x + span {
                continue;
            }
            let col = (u - offset_x) as usize;

            let wet = canvas.sample(col, row);
            let pixel = &mut out[y * tile_size + x];
            match cover {
                CoverMode::Replace => *pixel = if wet { 0xff } else { 0x00 },
                CoverMode::Fill => {
                    if wet {
                        *pixel = 0xff;
                    }
                }
            }
        }
    }
    out
}
