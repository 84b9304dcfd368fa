//! Property-based tests for simplification and the world frame.
//!
//! Run with: cargo test -p relief-engine --test proptest_simplify

use kurbo::Point;
use proptest::prelude::*;
use relief_engine::geometry::WorldFrame;
use relief_engine::simplify::simplify;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point> {
    (-50.0..50.0f64, -50.0..50.0f64).prop_map(|(x, y)| Point::new(x, y))
}

fn arb_polyline() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(arb_point(), 0..40)
}

// =============================================================================
// Douglas-Peucker
// =============================================================================

proptest! {
    #[test]
    fn simplify_is_idempotent(points in arb_polyline(), tol in 0.0..5.0f64) {
        let once = simplify(&points, tol);
        let twice = simplify(&once, tol);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn larger_tolerance_never_keeps_more_points(
        points in arb_polyline(),
        a in 0.0..5.0f64,
        b in 0.0..5.0f64,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(simplify(&points, hi).len() <= simplify(&points, lo).len());
    }

    #[test]
    fn output_is_an_ordered_subsequence(points in arb_polyline(), tol in 0.0..5.0f64) {
        let out = simplify(&points, tol);
        let mut it = points.iter();
        for p in &out {
            prop_assert!(it.any(|q| q == p), "{:?} not found in order", p);
        }
    }

    #[test]
    fn endpoints_survive(points in prop::collection::vec(arb_point(), 2..40), tol in 0.0..10.0f64) {
        let out = simplify(&points, tol);
        prop_assert_eq!(out.first(), points.first());
        prop_assert_eq!(out.last(), points.last());
    }

    #[test]
    fn zero_tolerance_keeps_every_turn(points in prop::collection::vec(arb_point(), 3..20)) {
        // random points are almost surely in general position: nothing is collinear
        let out = simplify(&points, 0.0);
        prop_assert_eq!(out.len(), points.len());
    }
}

// =============================================================================
// World frame
// =============================================================================

proptest! {
    #[test]
    fn world_grid_round_trip(
        resolution in 2usize..1024,
        world_size in 1.0..500.0f64,
        x in 0.0..1.0f64,
        y in 0.0..1.0f64,
    ) {
        let frame = WorldFrame::new(resolution, world_size);
        let p = Point::new(x * resolution as f64, y * resolution as f64);
        let back = frame.to_grid(frame.to_world(p));
        prop_assert!((back - p).hypot() < 1e-9);
    }

    #[test]
    fn world_points_stay_in_footprint(
        resolution in 2usize..512,
        x in 0.0..1.0f64,
        y in 0.0..1.0f64,
    ) {
        let frame = WorldFrame::new(resolution, 100.0);
        let w = frame.to_world(Point::new(x * resolution as f64, y * resolution as f64));
        let half = 50.0 + 1e-9;
        prop_assert!(w.x.abs() <= half && w.y.abs() <= half);
    }
}
