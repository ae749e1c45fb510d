//! Downward propagation through the quadtree.
//!
//! After a tile's mask is rewritten, every existing descendant at a
//! higher level of detail still shows the old water coverage. Each
//! child inherits one quadrant of its parent's grid, upsampled 2x by
//! nearest neighbor; the parent's values are already smoothed, so no
//! smoothing is re-applied on the way down. Children whose tile file
//! does not exist are normal leaves - propagation never creates tiles.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::coord::{Quadrant, TileCoord};
use crate::engine::TileFailure;
use crate::terrain::{update_watermask, TerrainError, Watermask};

/// Extract one quadrant of a parent grid as a `size / 2` square.
pub fn extract_quadrant(grid: &[u8], size: usize, quadrant: Quadrant) -> Vec<u8> {
    debug_assert_eq!(grid.len(), size * size);

    let cols = quadrant.cols(size);
    let mut out = Vec::with_capacity((size / 2) * (size / 2));
    for row in quadrant.rows(size) {
        out.extend_from_slice(&grid[row * size + cols.start..row * size + cols.end]);
    }
    out
}

/// Nearest-neighbor upsample by 2x per axis.
///
/// Every source pixel is replicated into a 2x2 block.
pub fn upsample_2x(src: &[u8], size: usize) -> Vec<u8> {
    debug_assert_eq!(src.len(), size * size);

    let out_size = size * 2;
    let mut out = vec![0u8; out_size * out_size];
    for y in 0..size {
        for x in 0..size {
            let value = src[y * size + x];
            let (ox, oy) = (x * 2, y * 2);
            out[oy * out_size + ox] = value;
            out[oy * out_size + ox + 1] = value;
            out[(oy + 1) * out_size + ox] = value;
            out[(oy + 1) * out_size + ox + 1] = value;
        }
    }
    out
}

/// Recursively regenerate the masks of all existing descendants.
///
/// `parent_grid` must be the full grid just committed for `parent`; the
/// orchestrator always propagates from the in-memory grid, never from a
/// compact on-disk value, and the length assert pins that precondition.
///
/// Commits are appended to `committed` and counted into `counter` as
/// they land. A failing child halts only its own subtree: the failure
/// is recorded and the remaining siblings still propagate. Cancellation
/// is honored between tiles; recursion depth is bounded by the tree's
/// maximum level of detail because every step descends one level.
#[allow(clippy::too_many_arguments)]
pub fn propagate_subtree(
    root: &Path,
    parent: TileCoord,
    parent_grid: &[u8],
    tile_size: usize,
    counter: &AtomicUsize,
    cancel: &CancellationToken,
    committed: &mut Vec<TileCoord>,
    failed: &mut Vec<TileFailure>,
) {
    assert_eq!(
        parent_grid.len(),
        tile_size * tile_size,
        "propagation requires the parent's full grid"
    );

    for quadrant in Quadrant::ALL {
        if cancel.is_cancelled() {
            return;
        }

        let child = parent.child(quadrant);
        let path = child.path(root);
        if !path.exists() {
            continue;
        }

        let half = extract_quadrant(parent_grid, tile_size, quadrant);
        let child_grid = upsample_2x(&half, tile_size / 2);

        match update_watermask(&path, Watermask::from_grid(child_grid.clone()), tile_size) {
            Ok(()) => {
                counter.fetch_add(1, Ordering::SeqCst);
                committed.push(child);
                debug!(tile = %child, quadrant = %quadrant, "propagated child mask");
                propagate_subtree(
                    root,
                    child,
                    &child_grid,
                    tile_size,
                    counter,
                    cancel,
                    committed,
                    failed,
                );
            }
            Err(TerrainError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between the existence check and the rewrite;
                // a missing child is a leaf, not a failure.
                continue;
            }
            Err(e) => {
                failed.push(TileFailure {
                    tile: child,
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_each_quadrant() {
        // 4x4 parent with a distinct byte per quadrant.
        #[rustfmt::skip]
        let grid = vec![
            1, 1, 2, 2,
            1, 1, 2, 2,
            3, 3, 4, 4,
            3, 3, 4, 4,
        ];
        assert_eq!(extract_quadrant(&grid, 4, Quadrant::NorthWest), vec![1; 4]);
        assert_eq!(extract_quadrant(&grid, 4, Quadrant::NorthEast), vec![2; 4]);
        assert_eq!(extract_quadrant(&grid, 4, Quadrant::SouthWest), vec![3; 4]);
        assert_eq!(extract_quadrant(&grid, 4, Quadrant::SouthEast), vec![4; 4]);
    }

    #[test]
    fn test_south_west_samples_lower_left_rows() {
        // SW child corresponds to rows size/2.. and columns ..size/2 of
        // the parent grid.
        let mut grid = vec![0u8; 16];
        grid[2 * 4] = 9;
        let sw = extract_quadrant(&grid, 4, Quadrant::SouthWest);
        assert_eq!(sw, vec![9, 0, 0, 0]);
    }

    #[test]
    fn test_upsample_replicates_2x2_blocks() {
        let src = vec![10, 20, 30, 40];
        let out = upsample_2x(&src, 2);
        #[rustfmt::skip]
        let expected = vec![
            10, 10, 20, 20,
            10, 10, 20, 20,
            30, 30, 40, 40,
            30, 30, 40, 40,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_checkerboard_upsample_has_no_blending() {
        // Nearest neighbor must keep a checkerboard binary; any
        // interpolation would introduce intermediate values.
        let size = 8;
        let src: Vec<u8> = (0..size * size)
            .map(|i| if (i / size + i % size) % 2 == 0 { 0xff } else { 0x00 })
            .collect();
        let out = upsample_2x(&src, size);
        assert!(out.iter().all(|&b| b == 0x00 || b == 0xff));
        assert_eq!(out[0], 0xff);
        assert_eq!(out[1], 0xff);
        assert_eq!(out[2], 0x00);
        assert_eq!(out[2 * 16], 0x00);
    }
}
