//! Morphological mask smoothing.
//!
//! Raw projected masks are noisy: single-pixel speckles from the
//! segmentation and hard staircase edges. Before a mask is committed it
//! runs through a fixed pipeline:
//!
//! 1. binary opening (3x3, 2 iterations) - strips speckles and thin
//!    protrusions,
//! 2. binary closing (3x3, 2 iterations, wet border on the erosion
//!    half) - fills pinholes, including ones touching the tile edge,
//! 3. double pass of a 7x7 diamond averaging blur - grades the wet
//!    region's interior edge,
//! 4. re-mask against the closed image - pixels the closing left dry
//!    stay exactly 0x00, so smoothing never bleeds water outward.
//!
//! The order is fixed; callers cannot reconfigure it.

mod morphology;

use morphology::{dilate, erode};

/// Iterations for both the opening and the closing pass.
const MORPHOLOGY_ITERATIONS: usize = 2;

/// Blur kernel radius; taps cover the `|dx| + |dy| <= 3` diamond.
const KERNEL_RADIUS: isize = 3;

/// Number of taps in the diamond (1 + 3 + 5 + 7 + 5 + 3 + 1).
const KERNEL_TAPS: u32 = 25;

/// Smooth a projected mask grid.
///
/// Input bytes are treated as wet when nonzero. Returns a grid of the
/// same size with graded edge intensities; bytes are `0x00` exactly
/// where the morphologically cleaned mask is dry.
pub fn smooth(grid: &[u8], size: usize) -> Vec<u8> {
    debug_assert_eq!(grid.len(), size * size);

    let mut front: Vec<u8> = grid.iter().map(|&b| (b != 0) as u8).collect();
    let mut back = vec![0u8; front.len()];

    // Opening: erosion then dilation, out-of-bounds dry throughout.
    for _ in 0..MORPHOLOGY_ITERATIONS {
        erode(&front, &mut back, size, false);
        std::mem::swap(&mut front, &mut back);
    }
    for _ in 0..MORPHOLOGY_ITERATIONS {
        dilate(&front, &mut back, size, false);
        std::mem::swap(&mut front, &mut back);
    }

    // Closing: dilation then erosion. The erosion half treats the
    // border as wet so shapes touching the tile edge keep their edge
    // pixels and stay seam-consistent with the neighbor tile.
    for _ in 0..MORPHOLOGY_ITERATIONS {
        dilate(&front, &mut back, size, false);
        std::mem::swap(&mut front, &mut back);
    }
    for _ in 0..MORPHOLOGY_ITERATIONS {
        erode(&front, &mut back, size, true);
        std::mem::swap(&mut front, &mut back);
    }
    let closed = front;

    let mut bytes: Vec<u8> = closed.iter().map(|&b| if b != 0 { 0xff } else { 0x00 }).collect();
    let mut blurred = vec![0u8; bytes.len()];
    diamond_blur(&bytes, &mut blurred, size);
    diamond_blur(&blurred, &mut bytes, size);

    for (out, &keep) in bytes.iter_mut().zip(&closed) {
        if keep == 0 {
            *out = 0x00;
        }
    }
    bytes
}

/// One pass of the 7x7 diamond averaging kernel.
///
/// Uniform 1/25 weights over the 25 diamond taps, zero elsewhere;
/// boundaries are handled by symmetric reflection.
fn diamond_blur(src: &[u8], dst: &mut [u8], size: usize) {
    for y in 0..size {
        for x in 0..size {
            let mut sum: u32 = 0;
            for dy in -KERNEL_RADIUS..=KERNEL_RADIUS {
                let reach = KERNEL_RADIUS - dy.abs();
                let sy = reflect(y as isize + dy, size);
                for dx in -reach..=reach {
                    let sx = reflect(x as isize + dx, size);
                    sum += src[sy * size + sx] as u32;
                }
            }
            dst[y * size + x] = (sum / KERNEL_TAPS) as u8;
        }
    }
}

/// Symmetric boundary reflection: `-1` maps to `0`, `size` to `size - 1`.
fn reflect(i: isize, size: usize) -> usize {
    let n = size as isize;
    let i = if i < 0 { -i - 1 } else { i };
    let i = if i >= n { 2 * n - i - 1 } else { i };
    i as usize
}
