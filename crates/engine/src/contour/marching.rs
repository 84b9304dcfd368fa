//! Marching squares cell classification.

use kurbo::Point;

use crate::field::ScalarField;

/// Undirected boundary segment between two cell-edge midpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

/// Midpoints of the four edges of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

const TL: u8 = 8;
const TR: u8 = 4;
const BR: u8 = 2;
const BL: u8 = 1;

/// Segments crossing a cell for each 4-bit case code (TL=8, TR=4, BR=2, BL=1).
///
/// Saddles 5 and 10 cut off the two outside corners, leaving the inside diagonal connected.
fn case_sides(code: u8) -> &'static [(Side, Side)] {
    use Side::*;
    match code {
        1 => &[(Left, Bottom)],
        2 => &[(Bottom, Right)],
        3 => &[(Left, Right)],
        4 => &[(Top, Right)],
        5 => &[(Left, Top), (Bottom, Right)],
        6 => &[(Top, Bottom)],
        7 => &[(Left, Top)],
        8 => &[(Left, Top)],
        9 => &[(Top, Bottom)],
        10 => &[(Top, Right), (Left, Bottom)],
        11 => &[(Top, Right)],
        12 => &[(Left, Right)],
        13 => &[(Bottom, Right)],
        14 => &[(Left, Bottom)],
        _ => &[],
    }
}

fn midpoint(x: usize, y: usize, side: Side) -> Point {
    let (x, y) = (x as f64, y as f64);
    match side {
        Side::Top => Point::new(x + 0.5, y),
        Side::Right => Point::new(x + 1.0, y + 0.5),
        Side::Bottom => Point::new(x + 0.5, y + 1.0),
        Side::Left => Point::new(x, y + 0.5),
    }
}

/// Case code of the cell whose top-left corner is sample `(x, y)`.
pub fn cell_code(field: &ScalarField, x: usize, y: usize, threshold: f64) -> u8 {
    let bit = |v: f64, b: u8| if v > threshold { b } else { 0 };
    bit(field.get(x, y), TL)
        | bit(field.get(x + 1, y), TR)
        | bit(field.get(x + 1, y + 1), BR)
        | bit(field.get(x, y + 1), BL)
}

/// Classify every 2×2 cell and emit its boundary segments.
pub fn cell_segments(field: &ScalarField, threshold: f64) -> Vec<Segment> {
    let n = field.resolution();
    let mut segments = Vec::new();
    if n < 2 {
        return segments;
    }

    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let code = cell_code(field, x, y, threshold);
            for &(s0, s1) in case_sides(code) {
                segments.push(Segment {
                    a: midpoint(x, y, s0),
                    b: midpoint(x, y, s1),
                });
            }
        }
    }
    segments
}
