//! Even-odd polygon membership test.

/// Ray-casting point-in-polygon test under the even-odd rule.
///
/// Casts a ray in the +X direction and counts edge crossings. The Y
/// interval test is half-open (strict at the lower end) so a vertex
/// shared by two edges is counted once, and the small epsilon keeps the
/// intersection finite for horizontal edges.
pub(crate) fn contains(x: f64, y: f64, polygon: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let (mut x1, mut y1) = polygon[0];
    for i in 1..=n {
        let (x2, y2) = polygon[i % n];
        if y1.min(y2) < y && y <= y1.max(y2) {
            let x_cross = (y - y1) * (x2 - x1) / (y2 - y1 + 1e-10) + x1;
            if x <= x_cross {
                inside = !inside;
            }
        }
        (x1, y1) = (x2, y2);
    }
    inside
}
