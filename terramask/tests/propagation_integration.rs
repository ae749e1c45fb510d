//! Integration tests for downward propagation over real tile trees.

mod common;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{write_tile, TileBuilder};
use tempfile::TempDir;
use terramask::coord::{Quadrant, TileCoord};
use terramask::engine::{Engine, EngineConfig, ModifyRequest};
use terramask::projector::CoverMode;
use terramask::propagate::{extract_quadrant, propagate_subtree, upsample_2x};
use terramask::terrain::{TileDocument, Watermask};
use tokio_util::sync::CancellationToken;

const TILE_SIZE: usize = 256;

fn checkerboard(size: usize) -> Vec<u8> {
    (0..size * size)
        .map(|i| {
            if (i / size + i % size) % 2 == 0 {
                0xff
            } else {
                0x00
            }
        })
        .collect()
}

fn run_propagation(root: &Path, parent: TileCoord, grid: &[u8]) -> (Vec<TileCoord>, Vec<terramask::engine::TileFailure>) {
    let counter = AtomicUsize::new(0);
    let cancel = CancellationToken::new();
    let mut committed = Vec::new();
    let mut failed = Vec::new();
    propagate_subtree(
        root,
        parent,
        grid,
        TILE_SIZE,
        &counter,
        &cancel,
        &mut committed,
        &mut failed,
    );
    assert_eq!(counter.load(Ordering::SeqCst), committed.len());
    (committed, failed)
}

/// The SW child's grid must be the 2x nearest-neighbor expansion of
/// the parent's rows 128-255, cols 0-127. A checkerboard parent makes
/// any interpolation or quadrant mix-up visible immediately.
#[test]
fn test_sw_child_inherits_lower_left_quadrant() {
    let dir = TempDir::new().unwrap();
    let parent = TileCoord::new(18, 100, 200);
    let child = parent.child(Quadrant::SouthWest);
    assert_eq!(child, TileCoord::new(19, 200, 401));
    write_tile(dir.path(), child, &TileBuilder::new().build());

    let grid = checkerboard(TILE_SIZE);
    let (committed, failed) = run_propagation(dir.path(), parent, &grid);

    assert_eq!(committed, vec![child]);
    assert!(failed.is_empty());

    let doc = TileDocument::read(&child.path(dir.path()), TILE_SIZE).unwrap();
    let child_grid = doc.mask_grid(TILE_SIZE);

    let mut expected = Vec::with_capacity(128 * 128);
    for row in 128..256 {
        expected.extend_from_slice(&grid[row * TILE_SIZE..row * TILE_SIZE + 128]);
    }
    assert_eq!(child_grid, upsample_2x(&expected, 128));
}

/// Every existing child receives its own quadrant; missing children
/// are leaves and never materialize.
#[test]
fn test_each_quadrant_routes_to_its_child() {
    let dir = TempDir::new().unwrap();
    let parent = TileCoord::new(18, 100, 200);

    // Parent grid with a distinct intensity per quadrant.
    let mut grid = vec![0u8; TILE_SIZE * TILE_SIZE];
    for quadrant in Quadrant::ALL {
        let value = 50 + 50 * quadrant.index();
        for row in quadrant.rows(TILE_SIZE) {
            for col in quadrant.cols(TILE_SIZE) {
                grid[row * TILE_SIZE + col] = value;
            }
        }
    }

    // Only three children exist.
    for quadrant in [Quadrant::SouthWest, Quadrant::NorthWest, Quadrant::NorthEast] {
        write_tile(dir.path(), parent.child(quadrant), &TileBuilder::new().build());
    }

    let (committed, failed) = run_propagation(dir.path(), parent, &grid);
    assert_eq!(committed.len(), 3);
    assert!(failed.is_empty());
    assert!(!parent.child(Quadrant::SouthEast).path(dir.path()).exists());

    for quadrant in [Quadrant::SouthWest, Quadrant::NorthWest, Quadrant::NorthEast] {
        let child = parent.child(quadrant);
        let doc = TileDocument::read(&child.path(dir.path()), TILE_SIZE).unwrap();
        let child_grid = doc.mask_grid(TILE_SIZE);
        let expected = 50 + 50 * quadrant.index();
        assert!(
            child_grid.iter().all(|&b| b == expected),
            "child {} carries quadrant value {}",
            child,
            expected
        );
    }
}

/// Propagation descends through every existing level: the grandchild
/// sees the upsampled quadrant of the already-upsampled child.
#[test]
fn test_propagation_recurses_to_grandchildren() {
    let dir = TempDir::new().unwrap();
    let parent = TileCoord::new(18, 100, 200);
    let child = parent.child(Quadrant::NorthWest);
    let grandchild = child.child(Quadrant::SouthEast);
    write_tile(dir.path(), child, &TileBuilder::new().build());
    write_tile(dir.path(), grandchild, &TileBuilder::new().build());

    let grid = checkerboard(TILE_SIZE);
    let (committed, _) = run_propagation(dir.path(), parent, &grid);
    assert_eq!(committed.len(), 2);

    let child_grid = TileDocument::read(&child.path(dir.path()), TILE_SIZE)
        .unwrap()
        .mask_grid(TILE_SIZE);
    let expected_grandchild = upsample_2x(
        &extract_quadrant(&child_grid, TILE_SIZE, Quadrant::SouthEast),
        TILE_SIZE / 2,
    );
    let grandchild_grid = TileDocument::read(&grandchild.path(dir.path()), TILE_SIZE)
        .unwrap()
        .mask_grid(TILE_SIZE);
    assert_eq!(grandchild_grid, expected_grandchild);
}

/// A corrupt child halts its own subtree only; the sibling subtree
/// still commits.
#[test]
fn test_failed_subtree_does_not_stop_siblings() {
    let dir = TempDir::new().unwrap();
    let parent = TileCoord::new(18, 100, 200);
    let bad_child = parent.child(Quadrant::SouthWest);
    let bad_grandchild = bad_child.child(Quadrant::SouthWest);
    let good_child = parent.child(Quadrant::NorthEast);

    // Truncated file: the header walk dies before the extension list.
    write_tile(dir.path(), bad_child, &[0u8; 30]);
    write_tile(dir.path(), bad_grandchild, &TileBuilder::new().build());
    write_tile(dir.path(), good_child, &TileBuilder::new().build());

    let original_grandchild = std::fs::read(bad_grandchild.path(dir.path())).unwrap();

    let grid = checkerboard(TILE_SIZE);
    let (committed, failed) = run_propagation(dir.path(), parent, &grid);

    assert_eq!(committed, vec![good_child]);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].tile, bad_child);

    // The subtree below the failure was never entered.
    assert_eq!(
        std::fs::read(bad_grandchild.path(dir.path())).unwrap(),
        original_grandchild
    );
}

/// End to end: a Modify with recursion rewrites the child consistently
/// with the parent's committed grid, and without recursion leaves the
/// child alone.
#[test]
fn test_engine_propagates_only_when_recursive() {
    for recursive in [true, false] {
        let dir = TempDir::new().unwrap();
        let parent = TileCoord::new(18, 100, 200);
        let child = parent.child(Quadrant::NorthWest);
        write_tile(dir.path(), parent, &TileBuilder::new().build());
        let child_bytes = TileBuilder::new().compact_watermask(0).build();
        write_tile(dir.path(), child, &child_bytes);

        let canvas = terramask::canvas::Canvas::new(
            TILE_SIZE,
            TILE_SIZE,
            vec![1; TILE_SIZE * TILE_SIZE],
        )
        .unwrap();
        let request = ModifyRequest {
            root: dir.path().to_path_buf(),
            lod: 18,
            bottom_left: (100, 200),
            offset: (0, 0),
            ortho_width: TILE_SIZE,
            cover: CoverMode::Replace,
            recursive,
        };

        let engine = Engine::new(
            EngineConfig::default().with_threads(2).with_tile_size(TILE_SIZE),
        );
        let report = engine.modify(&canvas, &request).unwrap();

        if recursive {
            assert!(report.committed.contains(&child));
            let doc = TileDocument::read(&child.path(dir.path()), TILE_SIZE).unwrap();
            // Parent went full wet, so the inherited quadrant is too.
            assert_eq!(doc.watermask(), Some(&Watermask::Compact(true)));
        } else {
            assert!(!report.committed.contains(&child));
            assert_eq!(std::fs::read(child.path(dir.path())).unwrap(), child_bytes);
        }
    }
}
