//! Iso-contour tracing: marching squares followed by segment stitching.

mod marching;
mod stitch;

pub use marching::{cell_code, cell_segments, Segment};
pub use stitch::stitch;

use kurbo::Point;

use crate::field::ScalarField;

/// Ordered polyline in field grid coordinates, stored without a duplicated closing point.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub points: Vec<Point>,
    /// `false` when stitching hit a dead end (boundary defect) instead of returning to the start
    pub closed: bool,
}

impl Loop {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Trace every iso-contour of `field` at `threshold`.
///
/// `stitch_scale` sets the endpoint matching precision (100.0 = two decimal digits).
pub fn trace_contours(field: &ScalarField, threshold: f64, stitch_scale: f64) -> Vec<Loop> {
    let segments = cell_segments(field, threshold);
    let loops = stitch(&segments, stitch_scale);

    let open = loops.iter().filter(|l| !l.closed).count();
    tracing::debug!(
        "trace_contours: {} segments -> {} loops ({} open)",
        segments.len(),
        loops.len(),
        open
    );

    loops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_blob(resolution: usize, lo: usize, hi: usize) -> ScalarField {
        ScalarField::from_fn(resolution, |x, y| {
            if (lo..=hi).contains(&x) && (lo..=hi).contains(&y) {
                1.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_all_above_threshold_has_no_loops() {
        let f = ScalarField::from_fn(16, |_, _| 1.0);
        assert!(trace_contours(&f, 0.5, 100.0).is_empty());
    }

    #[test]
    fn test_all_below_threshold_has_no_loops() {
        let f = ScalarField::from_fn(16, |_, _| 0.0);
        assert!(trace_contours(&f, 0.5, 100.0).is_empty());
    }

    #[test]
    fn test_single_pixel_is_a_diamond() {
        let f = square_blob(5, 2, 2);
        let loops = trace_contours(&f, 0.5, 100.0);
        assert_eq!(loops.len(), 1);
        assert!(loops[0].closed);
        assert_eq!(loops[0].len(), 4);
    }

    #[test]
    fn test_square_blob_is_one_closed_loop() {
        let f = square_blob(12, 3, 8);
        let loops = trace_contours(&f, 0.5, 100.0);
        assert_eq!(loops.len(), 1);
        assert!(loops[0].closed);
        // every point lies on the half-integer lattice
        for p in &loops[0].points {
            assert_eq!((p.x * 2.0).fract(), 0.0);
            assert_eq!((p.y * 2.0).fract(), 0.0);
        }
    }

    #[test]
    fn test_blob_touching_border_is_open() {
        let f = ScalarField::from_fn(8, |x, _| if x < 3 { 1.0 } else { 0.0 });
        let loops = trace_contours(&f, 0.5, 100.0);
        assert_eq!(loops.len(), 1);
        assert!(!loops[0].closed);
        // a vertical line at x = 2.5 spanning all 7 rows of cells
        assert_eq!(loops[0].len(), 8);
    }

    #[test]
    fn test_two_blobs_two_loops() {
        let f = ScalarField::from_fn(12, |x, y| {
            if (2..=3).contains(&x) && (2..=3).contains(&y) {
                1.0
            } else if (7..=9).contains(&x) && (6..=9).contains(&y) {
                1.0
            } else {
                0.0
            }
        });
        assert_eq!(trace_contours(&f, 0.5, 100.0).len(), 2);
    }
}
