//! Tile coordinate and quadrant definitions.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// File extension used by terrain tiles on disk.
pub const TILE_EXTENSION: &str = "terrain";

/// Tile coordinates in the terrain quadtree.
///
/// `x` grows eastward and `y` grows southward within one level of
/// detail; each level doubles the tile count per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Level of detail (quadtree depth)
    pub lod: u8,
    /// X coordinate (east-west)
    pub x: u32,
    /// Y coordinate (north-south)
    pub y: u32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(lod: u8, x: u32, y: u32) -> Self {
        Self { lod, x, y }
    }

    /// Path of this tile's file under the given terrain root.
    ///
    /// Layout: `<root>/<lod>/<x>/<y>.terrain`.
    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(self.lod.to_string())
            .join(self.x.to_string())
            .join(format!("{}.{}", self.y, TILE_EXTENSION))
    }

    /// The child tile occupying the given quadrant at `lod + 1`.
    pub fn child(&self, quadrant: Quadrant) -> TileCoord {
        TileCoord {
            lod: self.lod + 1,
            x: self.x * 2 + quadrant.dx(),
            y: self.y * 2 + quadrant.dy(),
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.lod, self.x, self.y)
    }
}

/// One of the four quadrants of a tile's mask grid.
///
/// Mask grids are row-major with row 0 at the north edge, so the
/// southern quadrants cover the upper half of the row range. The
/// child tile for a quadrant sits at `(x*2 + dx, y*2 + dy)` and
/// inherits the parent rows `dy*half..` and columns `dx*half..`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    SouthWest,
    SouthEast,
    NorthWest,
    NorthEast,
}

impl Quadrant {
    /// All quadrants in encoding order (SW = 0, SE = 1, NW = 2, NE = 3).
    pub const ALL: [Quadrant; 4] = [
        Quadrant::SouthWest,
        Quadrant::SouthEast,
        Quadrant::NorthWest,
        Quadrant::NorthEast,
    ];

    /// Wire encoding of this quadrant (0-3).
    pub fn index(self) -> u8 {
        match self {
            Quadrant::SouthWest => 0,
            Quadrant::SouthEast => 1,
            Quadrant::NorthWest => 2,
            Quadrant::NorthEast => 3,
        }
    }

    /// Child tile X displacement (0 = west column, 1 = east column).
    pub fn dx(self) -> u32 {
        match self {
            Quadrant::SouthWest | Quadrant::NorthWest => 0,
            Quadrant::SouthEast | Quadrant::NorthEast => 1,
        }
    }

    /// Child tile Y displacement (0 = north row, 1 = south row).
    pub fn dy(self) -> u32 {
        match self {
            Quadrant::NorthWest | Quadrant::NorthEast => 0,
            Quadrant::SouthWest | Quadrant::SouthEast => 1,
        }
    }

    /// Row range of a `size`-pixel parent grid covered by this quadrant.
    pub fn rows(self, size: usize) -> Range<usize> {
        let half = size / 2;
        let start = self.dy() as usize * half;
        start..start + half
    }

    /// Column range of a `size`-pixel parent grid covered by this quadrant.
    pub fn cols(self, size: usize) -> Range<usize> {
        let half = size / 2;
        let start = self.dx() as usize * half;
        start..start + half
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quadrant::SouthWest => "SW",
            Quadrant::SouthEast => "SE",
            Quadrant::NorthWest => "NW",
            Quadrant::NorthEast => "NE",
        };
        write!(f, "{}", name)
    }
}
