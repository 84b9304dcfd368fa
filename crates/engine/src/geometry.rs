//! Planar helpers on kurbo points: area, winding, containment and the grid/world frame.

use kurbo::{Point, Rect, Vec2};

/// Shoelace signed area. Positive for counter-clockwise rings in a y-up frame.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut prev = ring[ring.len() - 1].to_vec2();
    for p in ring {
        let cur = p.to_vec2();
        sum += prev.cross(cur);
        prev = cur;
    }
    sum * 0.5
}

/// Counter-clockwise in a y-up frame.
pub fn is_ccw(ring: &[Point]) -> bool {
    signed_area(ring) > 0.0
}

/// Even-odd ray casting test.
pub fn point_in_polygon(p: Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to the point distance when `a == b`.
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab: Vec2 = b - a;
    let len = ab.hypot();
    if len == 0.0 {
        return p.distance(a);
    }
    (ab.cross(p - a)).abs() / len
}

/// Axis-aligned bounds of a ring.
pub fn bounds(ring: &[Point]) -> Rect {
    let Some(first) = ring.first() else {
        return Rect::ZERO;
    };
    ring.iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}

/// Mapping between field grid coordinates (x right, y down, one unit per sample)
/// and world coordinates (millimetres, centred on the origin, y up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldFrame {
    resolution: f64,
    world_size: f64,
}

impl WorldFrame {
    pub fn new(resolution: usize, world_size: f64) -> Self {
        Self {
            resolution: resolution.max(1) as f64,
            world_size,
        }
    }

    /// World units per grid unit.
    pub fn scale(&self) -> f64 {
        self.world_size / self.resolution
    }

    pub fn world_size(&self) -> f64 {
        self.world_size
    }

    pub fn to_world(&self, p: Point) -> Point {
        let half = self.resolution / 2.0;
        let s = self.scale();
        Point::new((p.x - half) * s, -(p.y - half) * s)
    }

    pub fn to_grid(&self, p: Point) -> Point {
        let half = self.resolution / 2.0;
        let s = self.scale();
        Point::new(p.x / s + half, -p.y / s + half)
    }

    /// The full square footprint in world coordinates.
    pub fn footprint(&self) -> Rect {
        let h = self.world_size / 2.0;
        Rect::new(-h, -h, h, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_ccw() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_signed_area_orientation() {
        let mut sq = unit_square_ccw();
        assert!((signed_area(&sq) - 1.0).abs() < 1e-12);
        assert!(is_ccw(&sq));
        sq.reverse();
        assert!((signed_area(&sq) + 1.0).abs() < 1e-12);
        assert!(!is_ccw(&sq));
    }

    #[test]
    fn test_degenerate_area_is_zero() {
        assert_eq!(signed_area(&[Point::ZERO, Point::new(1.0, 1.0)]), 0.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let sq = unit_square_ccw();
        assert!(point_in_polygon(Point::new(0.5, 0.5), &sq));
        assert!(!point_in_polygon(Point::new(1.5, 0.5), &sq));
        assert!(!point_in_polygon(Point::new(0.5, -0.1), &sq));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upwards
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 3.0),
            Point::new(2.0, 3.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 3.0),
            Point::new(0.0, 3.0),
        ];
        assert!(point_in_polygon(Point::new(0.5, 2.0), &u));
        assert!(!point_in_polygon(Point::new(1.5, 2.0), &u));
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = perpendicular_distance(Point::new(0.5, 2.0), Point::ZERO, Point::new(1.0, 0.0));
        assert!((d - 2.0).abs() < 1e-12);
        let d = perpendicular_distance(Point::new(3.0, 4.0), Point::ZERO, Point::ZERO);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds() {
        let r = bounds(&unit_square_ccw());
        assert_eq!(r, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(bounds(&[]), Rect::ZERO);
    }

    #[test]
    fn test_world_frame_centres_and_flips() {
        let frame = WorldFrame::new(10, 100.0);
        assert_eq!(frame.scale(), 10.0);
        assert_eq!(frame.to_world(Point::new(5.0, 5.0)), Point::ZERO);
        // top-left of the grid is up-left in the world
        let tl = frame.to_world(Point::new(0.0, 0.0));
        assert_eq!(tl, Point::new(-50.0, 50.0));
    }

    #[test]
    fn test_world_frame_round_trip() {
        let frame = WorldFrame::new(37, 120.0);
        for p in [Point::new(0.5, 3.0), Point::new(36.0, 17.5), Point::new(12.25, 0.0)] {
            let back = frame.to_grid(frame.to_world(p));
            assert!((back - p).hypot() < 1e-9, "{p:?} -> {back:?}");
        }
    }
}
