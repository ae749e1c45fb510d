//! Water-coverage mask representation.
//!
//! A tile's watermask is stored either as a single whole-tile constant
//! (the compact form) or as a full per-pixel grid of coverage
//! intensities. A tile with no watermask record at all is implicitly
//! fully dry; that sentinel is modeled as `Option<Watermask>::None` by
//! the container document, not here.

/// Per-tile water coverage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Watermask {
    /// Whole-tile constant: `false` = entirely dry, `true` = entirely wet.
    Compact(bool),
    /// Row-major grid of coverage intensities, one byte per pixel.
    /// 0 is dry, 255 fully wet; intermediate values are smoothed edges.
    Full(Vec<u8>),
}

impl Watermask {
    /// Build a mask from a full grid, collapsing uniform grids.
    ///
    /// Grids that are entirely `0x00` or entirely `0xff` carry no
    /// per-pixel information and are stored in the compact form.
    pub fn from_grid(grid: Vec<u8>) -> Self {
        match grid.first().copied() {
            Some(first)
                if (first == 0x00 || first == 0xff) && grid.iter().all(|&b| b == first) =>
            {
                Watermask::Compact(first == 0xff)
            }
            _ => Watermask::Full(grid),
        }
    }

    /// Expand to a `tile_size`-squared grid of intensity bytes.
    pub fn to_grid(&self, tile_size: usize) -> Vec<u8> {
        match self {
            Watermask::Compact(false) => vec![0x00; tile_size * tile_size],
            Watermask::Compact(true) => vec![0xff; tile_size * tile_size],
            Watermask::Full(grid) => grid.clone(),
        }
    }

    /// Number of payload bytes the framed record will occupy.
    pub fn framed_len(&self) -> usize {
        4 + match self {
            Watermask::Compact(_) => 1,
            Watermask::Full(grid) => grid.len(),
        }
    }

    /// Append the framed payload (`length: u32` then the mask bytes).
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Watermask::Compact(wet) => {
                out.extend_from_slice(&1u32.to_le_bytes());
                out.push(*wet as u8);
            }
            Watermask::Full(grid) => {
                out.extend_from_slice(&(grid.len() as u32).to_le_bytes());
                out.extend_from_slice(grid);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_grid_collapses_uniform_dry() {
        let mask = Watermask::from_grid(vec![0x00; 64]);
        assert_eq!(mask, Watermask::Compact(false));
    }

    #[test]
    fn test_from_grid_collapses_uniform_wet() {
        let mask = Watermask::from_grid(vec![0xff; 64]);
        assert_eq!(mask, Watermask::Compact(true));
    }

    #[test]
    fn test_from_grid_keeps_mixed_grid() {
        let mut grid = vec![0x00; 64];
        grid[10] = 0x80;
        let mask = Watermask::from_grid(grid.clone());
        assert_eq!(mask, Watermask::Full(grid));
    }

    #[test]
    fn test_from_grid_keeps_uniform_intermediate() {
        // A uniform grid of soft-edge intensity has no compact encoding.
        let grid = vec![0x40; 64];
        assert_eq!(Watermask::from_grid(grid.clone()), Watermask::Full(grid));
    }

    #[test]
    fn test_to_grid_expands_compact() {
        assert!(Watermask::Compact(true).to_grid(8).iter().all(|&b| b == 0xff));
        assert!(Watermask::Compact(false).to_grid(8).iter().all(|&b| b == 0x00));
        assert_eq!(Watermask::Compact(true).to_grid(8).len(), 64);
    }

    #[test]
    fn test_encode_compact() {
        let mut out = Vec::new();
        Watermask::Compact(true).encode_into(&mut out);
        assert_eq!(out, vec![1, 0, 0, 0, 1]);

        out.clear();
        Watermask::Compact(false).encode_into(&mut out);
        assert_eq!(out, vec![1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_full_grid() {
        let grid = vec![0x7f; 16];
        let mut out = Vec::new();
        Watermask::Full(grid.clone()).encode_into(&mut out);
        assert_eq!(&out[..4], &16u32.to_le_bytes());
        assert_eq!(&out[4..], &grid[..]);
        assert_eq!(out.len(), Watermask::Full(grid).framed_len());
    }
}
