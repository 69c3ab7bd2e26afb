//! Deterministic sample-point generation for the builder's prove-or-split
//! decision (§4.3 step 2): corners, center, thirds, plus `sample_k`
//! rectangle-seeded pseudo-random interior points.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::geometry::Rectangle;
use crate::hasher::seed_for_rectangle;

/// The deterministic sample point set for `rect`. Order is stable but not
/// semantically meaningful; duplicates are removed so a degenerate or tiny
/// rectangle is not over-counted.
pub fn sample_points(rect: &Rectangle, sample_k: u32, rng_seed: u64) -> Vec<(u32, u32)> {
    let mut points = Vec::with_capacity(4 + 1 + 6 + sample_k as usize);

    // Up to four corners.
    points.push((rect.y0, rect.x0));
    points.push((rect.y0, rect.x1));
    points.push((rect.y1, rect.x0));
    points.push((rect.y1, rect.x1));

    // Geometric center. Computed as `x0 + (x1 - x0) / 2` rather than
    // `(x0 + x1) / 2` so the sum never overflows `u32` for wide rectangles
    // near the top of the lattice; matches the builder/runtime midpoint
    // convention, see `geometry::Rectangle`.
    let cy = rect.y0 + (rect.y1 - rect.y0) / 2;
    let cx = rect.x0 + (rect.x1 - rect.x0) / 2;
    points.push((cy, cx));

    // Stratified thirds along each axis. The `2 * width` multiplication is
    // done in `u64` since `width` itself can be close to `u32::MAX` at high
    // precision, and the result is always back in range before casting down.
    let width = (rect.x1 - rect.x0) as u64;
    let height = (rect.y1 - rect.y0) as u64;
    let x_third1 = rect.x0 + (width / 3) as u32;
    let x_third2 = rect.x0 + (2 * width / 3) as u32;
    let y_third1 = rect.y0 + (height / 3) as u32;
    let y_third2 = rect.y0 + (2 * height / 3) as u32;
    points.push((y_third1, x_third1));
    points.push((y_third1, x_third2));
    points.push((y_third2, x_third1));
    points.push((y_third2, x_third2));

    // `sample_k` deterministic pseudo-random interior points, seeded from
    // `hash(rect, rng_seed)` (never a process-global RNG; see §9).
    let seed = seed_for_rectangle(rect, rng_seed);
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..sample_k {
        let ilat = rng.gen_range(rect.y0..=rect.y1);
        let ilon = rng.gen_range(rect.x0..=rect.x1);
        points.push((ilat, ilon));
    }

    points.sort_unstable();
    points.dedup();
    points
}
