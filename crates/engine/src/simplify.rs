//! Douglas-Peucker polyline simplification.

use kurbo::Point;

use crate::geometry::perpendicular_distance;

/// Simplify `points` so that no removed point lies farther than `tolerance`
/// from the simplified polyline.
///
/// The first and last points are always kept. Sequences of two points or
/// fewer are returned unchanged. With `tolerance = 0` only exactly collinear
/// points are removed.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let tolerance = tolerance.max(0.0);
    let mut out = simplify_range(points, 0, points.len() - 1, tolerance);
    out.push(points[points.len() - 1]);
    out
}

/// Simplified `points[start..=end]`, excluding the final point.
///
/// Excluding the end point lets the two halves of a split concatenate without
/// duplicating the split vertex.
fn simplify_range(points: &[Point], start: usize, end: usize, tolerance: f64) -> Vec<Point> {
    let (a, b) = (points[start], points[end]);

    let mut max_dist = 0.0;
    let mut split = None;
    for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
        let d = perpendicular_distance(p, a, b);
        if d > max_dist {
            max_dist = d;
            split = Some(i);
        }
    }

    match split {
        Some(mid) if max_dist > tolerance => {
            let mut left = simplify_range(points, start, mid, tolerance);
            left.extend(simplify_range(points, mid, end, tolerance));
            left
        }
        _ => vec![a],
    }
}
