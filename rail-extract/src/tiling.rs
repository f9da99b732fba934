//! Tile planning for large bounding boxes.
//!
//! A single Overpass query over a whole country can exceed the service's
//! time or memory limits. The planner splits a box into a grid of tiles no
//! larger than a given edge length; each tile is then queried on its own.
//! Ways crossing a tile edge come back from both neighbours, so callers must
//! deduplicate by feature id.

use crate::domain::BoundingBox;

/// Split `bbox` into tiles of at most `tile_size_deg` degrees per side.
///
/// Boxes that already fit are returned unchanged as a single tile. Larger
/// boxes are swept row-major from the south-west corner (latitude outer,
/// longitude inner); the last row and column are clipped to the box edge.
///
/// A non-positive or non-finite tile size disables tiling.
pub fn plan(bbox: &BoundingBox, tile_size_deg: f64) -> Vec<BoundingBox> {
    if !(tile_size_deg.is_finite() && tile_size_deg > 0.0) {
        return vec![*bbox];
    }

    if bbox.lat_span() <= tile_size_deg && bbox.lon_span() <= tile_size_deg {
        return vec![*bbox];
    }

    let rows = cell_count(bbox.lat_span(), tile_size_deg);
    let cols = cell_count(bbox.lon_span(), tile_size_deg);

    // Each cell's far edge is computed as the next cell's near edge, so
    // neighbouring tiles share bit-identical boundaries. The outermost edge
    // is pinned to the box so rounding can never leave a gap.
    let lat_edge = |i: usize| {
        if i >= rows {
            bbox.north()
        } else {
            (bbox.south() + i as f64 * tile_size_deg).min(bbox.north())
        }
    };
    let lon_edge = |i: usize| {
        if i >= cols {
            bbox.east()
        } else {
            (bbox.west() + i as f64 * tile_size_deg).min(bbox.east())
        }
    };

    let mut tiles = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let (south, north) = (lat_edge(row), lat_edge(row + 1));
        for col in 0..cols {
            let (west, east) = (lon_edge(col), lon_edge(col + 1));
            // Grid steps are exact multiples, so these only fail on a
            // sliver narrower than float resolution; skip such cells.
            if let Ok(tile) = BoundingBox::new(south, west, north, east) {
                tiles.push(tile);
            }
        }
    }
    tiles
}

/// Number of grid cells needed to cover `span` with steps of `step`.
fn cell_count(span: f64, step: f64) -> usize {
    let n = (span / step).ceil() as usize;
    // Guard against `ceil` overshooting by one when span is an exact multiple
    // that float division rounds up (e.g. 0.3 / 0.1).
    if n > 1 && (n - 1) as f64 * step >= span {
        n - 1
    } else {
        n.max(1)
    }
}
