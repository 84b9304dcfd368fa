//! Even-odd nesting classification of contours and polygon assembly.
//!
//! Built in two passes: [`ContainmentTree::build`] sorts contours by area and
//! links each one to its smallest enclosing predecessor; [`assemble_polygons`]
//! then walks the finished tree, opening a polygon for every even-depth node
//! and attaching odd-depth nodes to their parent's polygon as holes.

use kurbo::{Point, Rect};

use crate::geometry::{bounds, is_ccw, point_in_polygon, signed_area};

/// One classified contour, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourInfo {
    pub points: Vec<Point>,
    /// Absolute polygon area
    pub area: f64,
    /// Nesting depth, 0 = outermost
    pub depth: usize,
    pub is_hole: bool,
    /// Index of the immediate enclosing contour in the tree's node array
    pub parent: Option<usize>,
    bounds: Rect,
}

impl ContourInfo {
    pub fn new(points: Vec<Point>) -> Self {
        let area = signed_area(&points).abs();
        let bounds = bounds(&points);
        Self {
            points,
            area,
            depth: 0,
            is_hole: false,
            parent: None,
            bounds,
        }
    }

    /// Ray-casting containment with a bounding-box reject.
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p) && point_in_polygon(p, &self.points)
    }
}

/// Finds the parent of each contour. Contours arrive sorted by area, descending.
///
/// Implementations must only ever pick an earlier index as parent.
pub trait ContainmentStrategy {
    fn find_parents(&self, contours: &[ContourInfo]) -> Vec<Option<usize>>;
}

/// Quadratic rescan: for each contour, walk back over larger contours and
/// take the first (smallest) one containing its first point.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScan;

impl ContainmentStrategy for LinearScan {
    fn find_parents(&self, contours: &[ContourInfo]) -> Vec<Option<usize>> {
        contours
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let probe = *c.points.first()?;
                (0..i).rev().find(|&j| contours[j].contains(probe))
            })
            .collect()
    }
}

/// Immutable containment forest over a flat, area-sorted contour array.
#[derive(Debug, Clone, Default)]
pub struct ContainmentTree {
    nodes: Vec<ContourInfo>,
}

impl ContainmentTree {
    pub fn build(contours: Vec<ContourInfo>, strategy: &impl ContainmentStrategy) -> Self {
        let mut nodes = contours;
        nodes.sort_by(|a, b| b.area.total_cmp(&a.area));

        let parents = strategy.find_parents(&nodes);
        for (i, parent) in parents.into_iter().enumerate() {
            // parents precede children, so their depth is already final
            let depth = match parent {
                Some(p) if p < i => nodes[p].depth + 1,
                _ => 0,
            };
            let node = &mut nodes[i];
            node.parent = parent.filter(|&p| p < i);
            node.depth = depth;
            node.is_hole = depth % 2 == 1;
        }

        Self { nodes }
    }

    pub fn nodes(&self) -> &[ContourInfo] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A solid outline (counter-clockwise) with zero or more holes (clockwise).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub outer: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

/// Output of [`assemble_polygons`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSet {
    pub polygons: Vec<Polygon>,
    /// Holes with no instantiated parent polygon; these are dropped
    pub orphan_holes: usize,
}

/// Second pass: polygons for even-depth nodes, holes for odd-depth nodes.
pub fn assemble_polygons(tree: &ContainmentTree) -> PolygonSet {
    let nodes = tree.nodes();
    let mut polygon_of: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut set = PolygonSet::default();

    for (i, node) in nodes.iter().enumerate() {
        if !node.is_hole {
            polygon_of[i] = Some(set.polygons.len());
            set.polygons.push(Polygon {
                outer: oriented(&node.points, true),
                holes: Vec::new(),
            });
            continue;
        }

        match node.parent.and_then(|p| polygon_of[p]) {
            Some(pi) => set.polygons[pi].holes.push(oriented(&node.points, false)),
            None => set.orphan_holes += 1,
        }
    }

    if set.orphan_holes > 0 {
        tracing::warn!(
            "assemble_polygons: dropped {} hole(s) without an enclosing solid",
            set.orphan_holes
        );
    }
    set
}

fn oriented(ring: &[Point], ccw: bool) -> Vec<Point> {
    let mut out = ring.to_vec();
    if is_ccw(&out) != ccw {
        out.reverse();
    }
    out
}
