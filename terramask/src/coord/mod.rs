//! Tile addressing for the terrain quadtree.
//!
//! Tiles are identified by `(lod, x, y)` and stored on disk as
//! `<root>/<lod>/<x>/<y>.terrain`. Each tile has four children at
//! `lod + 1`; which quarter of the parent's mask grid a child inherits
//! is described by [`Quadrant`].

mod types;

pub use types::{Quadrant, TileCoord};
