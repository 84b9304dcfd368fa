//! Vector mode: straight-walled extrusion of polygons with holes, plus the base slab.

use glam::Vec3;
use kurbo::Point;

use crate::error::Diagnostic;
use crate::geometry::{signed_area, WorldFrame};
use crate::hierarchy::Polygon;
use crate::mesh::{slab, Mesh, MeshData};

/// Parameters for [`build_solid_mesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidOptions {
    pub extrusion_height: f64,
    pub base_thickness: f64,
    pub include_base: bool,
}

/// Extrude one polygon from z = 0 to z = `height`.
///
/// Caps are triangulated with holes; every ring edge becomes a wall quad with a
/// flat outward normal. Returns `None` when the caps cannot be triangulated.
pub fn extrude_polygon(polygon: &Polygon, height: f64) -> Option<MeshData> {
    let mut rings: Vec<Vec<Point>> = Vec::with_capacity(1 + polygon.holes.len());
    rings.push(clean_ring(&polygon.outer));
    rings.extend(
        polygon
            .holes
            .iter()
            .map(|h| clean_ring(h))
            .filter(|h| h.len() >= 3),
    );
    if rings[0].len() < 3 || signed_area(&rings[0]).abs() <= f64::EPSILON {
        return None;
    }

    // earcut input: flat coordinates, hole start offsets in vertex units
    let mut flat: Vec<f64> = Vec::new();
    let mut hole_starts: Vec<usize> = Vec::new();
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            hole_starts.push(flat.len() / 2);
        }
        for p in ring {
            flat.push(p.x);
            flat.push(p.y);
        }
    }
    let triangles = earcutr::earcut(&flat, &hole_starts, 2).ok()?;
    if triangles.is_empty() {
        return None;
    }

    let ring_points: Vec<Point> = rings.iter().flatten().copied().collect();
    let h = height as f32;
    let mut data = MeshData::default();

    // Top cap (+Z, counter-clockwise from above)
    let top = data.vertex_count() as u32;
    for p in &ring_points {
        data.push_vertex(Vec3::new(p.x as f32, p.y as f32, h), Vec3::Z);
    }
    // Bottom cap (-Z, clockwise from above)
    let bottom = data.vertex_count() as u32;
    for p in &ring_points {
        data.push_vertex(Vec3::new(p.x as f32, p.y as f32, 0.0), Vec3::NEG_Z);
    }

    for tri in triangles.chunks_exact(3) {
        let (a, mut b, mut c) = (tri[0], tri[1], tri[2]);
        if cross2(ring_points[a], ring_points[b], ring_points[c]) < 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        let (a, b, c) = (a as u32, b as u32, c as u32);
        data.indices.extend_from_slice(&[top + a, top + b, top + c]);
        data.indices
            .extend_from_slice(&[bottom + a, bottom + c, bottom + b]);
    }

    // Side walls
    for ring in &rings {
        push_walls(&mut data, ring, 0.0, |_| h);
    }

    Some(data)
}

/// One quad per edge of `ring` from `z_bottom` up to `z_top(point)`.
///
/// The solid is assumed to lie to the left of the ring direction, so the
/// outward normal of edge `(dx, dy)` is `(dy, -dx)`.
pub(crate) fn push_walls(
    data: &mut MeshData,
    ring: &[Point],
    z_bottom: f32,
    z_top: impl Fn(usize) -> f32,
) {
    let n = ring.len();
    for i in 0..n {
        let j = (i + 1) % n;
        let (p0, p1) = (ring[i], ring[j]);
        let (dx, dy) = ((p1.x - p0.x) as f32, (p1.y - p0.y) as f32);
        if dx == 0.0 && dy == 0.0 {
            continue;
        }
        let normal = Vec3::new(dy, -dx, 0.0).normalize();

        let b0 = data.push_vertex(Vec3::new(p0.x as f32, p0.y as f32, z_bottom), normal);
        let b1 = data.push_vertex(Vec3::new(p1.x as f32, p1.y as f32, z_bottom), normal);
        let t1 = data.push_vertex(Vec3::new(p1.x as f32, p1.y as f32, z_top(j)), normal);
        let t0 = data.push_vertex(Vec3::new(p0.x as f32, p0.y as f32, z_top(i)), normal);
        data.indices.extend_from_slice(&[b0, b1, t1, b0, t1, t0]);
    }
}

/// Extrude every polygon and, when requested, sit the result on a full-footprint slab.
///
/// Never fails: triangulation and merge problems become diagnostics and the
/// last good geometry is returned.
pub fn build_solid_mesh(
    polygons: &[Polygon],
    options: &SolidOptions,
    frame: &WorldFrame,
) -> (Mesh, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let mut parts = Vec::with_capacity(polygons.len());
    for (i, polygon) in polygons.iter().enumerate() {
        match extrude_polygon(polygon, options.extrusion_height) {
            Some(data) => parts.push(data.to_mesh()),
            None => {
                tracing::warn!("build_solid_mesh: polygon {} could not be triangulated", i);
                diagnostics.push(Diagnostic::Triangulation { polygon: i });
            }
        }
    }

    let (extrusion, merge_diagnostics) = merge_parts(&parts);
    diagnostics.extend(merge_diagnostics);

    if extrusion.is_empty() || !options.include_base || options.base_thickness <= 0.0 {
        return (extrusion, diagnostics);
    }

    let base = options.base_thickness as f32;
    let footprint = frame.footprint();
    let slab_mesh = slab(
        Vec3::new(footprint.x0 as f32, footprint.y0 as f32, 0.0),
        Vec3::new(footprint.x1 as f32, footprint.y1 as f32, base),
    )
    .to_mesh();

    let (mesh, base_diagnostics) = with_base(extrusion, slab_mesh, base);
    diagnostics.extend(base_diagnostics);
    (mesh, diagnostics)
}

/// Merge per-polygon parts, falling back to the parts that merge cleanly.
pub fn merge_parts(parts: &[Mesh]) -> (Mesh, Vec<Diagnostic>) {
    let refs: Vec<&Mesh> = parts.iter().collect();
    match Mesh::merge(&refs) {
        Ok(mesh) => (mesh, Vec::new()),
        Err(e) => {
            tracing::warn!("build_solid_mesh: merge failed: {}", e);
            (Mesh::merge_partial(parts).0, vec![Diagnostic::MeshBuild(e)])
        }
    }
}

/// Lift `extrusion` by `base` and merge it with `slab_mesh`.
///
/// If the merge fails the extrusion is returned as it was passed in.
pub fn with_base(extrusion: Mesh, slab_mesh: Mesh, base: f32) -> (Mesh, Vec<Diagnostic>) {
    let lifted = extrusion.translated(Vec3::new(0.0, 0.0, base));
    match Mesh::merge(&[&slab_mesh, &lifted]) {
        Ok(mesh) => (mesh, Vec::new()),
        Err(e) => {
            tracing::warn!("build_solid_mesh: base merge failed, keeping extrusion: {}", e);
            (extrusion, vec![Diagnostic::MeshBuild(e)])
        }
    }
}

/// Drop repeated points and every vertex collinear with its neighbours.
///
/// Neighbours wrap around the seam, so a start point on a straight run is
/// removed too. Caps and walls must see the same ring.
fn clean_ring(ring: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len());
    for &p in ring {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }

    while out.len() >= 3 {
        let n = out.len();
        let straight =
            (0..n).find(|&i| is_collinear(out[(i + n - 1) % n], out[i], out[(i + 1) % n]));
        match straight {
            Some(i) => {
                out.remove(i);
            }
            None => break,
        }
    }
    out
}

fn is_collinear(a: Point, b: Point, c: Point) -> bool {
    let (u, v) = (b - a, c - b);
    u.cross(v).abs() <= 1e-9 * u.hypot() * v.hypot()
}

fn cross2(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshBuildError;
    use crate::validation::MeshValidator;

    fn square(half: f64, ccw: bool) -> Vec<Point> {
        let mut ring = vec![
            Point::new(-half, -half),
            Point::new(half, -half),
            Point::new(half, half),
            Point::new(-half, half),
        ];
        if !ccw {
            ring.reverse();
        }
        ring
    }

    fn options(include_base: bool) -> SolidOptions {
        SolidOptions {
            extrusion_height: 5.0,
            base_thickness: 2.0,
            include_base,
        }
    }

    #[test]
    fn test_extrude_square_closed_with_expected_volume() {
        let poly = Polygon {
            outer: square(5.0, true),
            holes: vec![],
        };
        let mesh = extrude_polygon(&poly, 3.0).unwrap().to_mesh();
        // 2 caps x 2 triangles + 4 walls x 2 triangles
        assert_eq!(mesh.triangle_count(), 12);
        let v = MeshValidator::new(&mesh);
        assert!(v.is_closed());
        assert!((v.signed_volume() - 300.0).abs() < 1e-3);
        let errors = v.validate_all();
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_extrude_with_hole_subtracts_volume() {
        let poly = Polygon {
            outer: square(5.0, true),
            holes: vec![square(2.0, false)],
        };
        let mesh = extrude_polygon(&poly, 1.0).unwrap().to_mesh();
        let v = MeshValidator::new(&mesh);
        assert!(v.is_closed());
        assert!((v.signed_volume() - (100.0 - 16.0)).abs() < 1e-3);
    }

    #[test]
    fn test_wall_normals_point_away_from_solid() {
        let poly = Polygon {
            outer: square(5.0, true),
            holes: vec![square(2.0, false)],
        };
        let mesh = extrude_polygon(&poly, 1.0).unwrap().to_mesh();
        for (tri, n) in mesh.triangles().zip(mesh.normals.chunks_exact(3)) {
            if n[0].z != 0.0 {
                continue;
            }
            let c = (tri[0] + tri[1] + tri[2]) / 3.0;
            let radial = Vec3::new(c.x, c.y, 0.0);
            let on_outer = c.x.abs().max(c.y.abs()) > 4.0;
            if on_outer {
                assert!(radial.dot(n[0]) > 0.0);
            } else {
                assert!(radial.dot(n[0]) < 0.0);
            }
        }
    }

    #[test]
    fn test_degenerate_polygon_is_rejected() {
        let flat = Polygon {
            outer: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)],
            holes: vec![],
        };
        assert!(extrude_polygon(&flat, 1.0).is_none());

        let (mesh, diags) = build_solid_mesh(&[flat], &options(true), &WorldFrame::new(10, 10.0));
        assert!(mesh.is_empty());
        assert_eq!(diags, vec![Diagnostic::Triangulation { polygon: 0 }]);
    }

    #[test]
    fn test_clean_ring() {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
        ];
        assert_eq!(clean_ring(&ring).len(), 3);
    }

    #[test]
    fn test_clean_ring_drops_collinear_vertices_across_seam() {
        // (2, 0) sits on the bottom edge and starts the ring; (4, 2) is mid-edge
        let ring = vec![
            Point::new(2.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 2.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(0.0, 0.0),
        ];
        assert_eq!(
            clean_ring(&ring),
            vec![
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
                Point::new(0.0, 4.0),
                Point::new(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_ring_with_straight_seam_extrudes_closed() {
        // last point (8, 2.5) lies between (9.5, 4) and the first point (7.5, 2)
        let poly = Polygon {
            outer: vec![
                Point::new(7.5, 2.0),
                Point::new(8.0, 1.5),
                Point::new(10.5, 4.0),
                Point::new(9.5, 5.0),
                Point::new(9.5, 4.0),
                Point::new(8.0, 2.5),
            ],
            holes: vec![],
        };
        let mesh = extrude_polygon(&poly, 1.0).unwrap().to_mesh();
        let v = MeshValidator::new(&mesh);
        assert!(v.is_closed());
        assert!((v.signed_volume() - 2.75).abs() < 1e-4);
    }

    fn malformed() -> Mesh {
        Mesh {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z],
        }
    }

    #[test]
    fn test_merge_parts_keeps_good_parts_on_failure() {
        let good = extrude_polygon(
            &Polygon {
                outer: square(1.0, true),
                holes: vec![],
            },
            1.0,
        )
        .unwrap()
        .to_mesh();

        let (mesh, diags) = merge_parts(&[good.clone(), malformed()]);
        assert_eq!(mesh, good);
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            diags[0],
            Diagnostic::MeshBuild(MeshBuildError::AttributeMismatch { part: 1, .. })
        ));
    }

    #[test]
    fn test_failed_base_merge_returns_extrusion_unchanged() {
        let extrusion = extrude_polygon(
            &Polygon {
                outer: square(1.0, true),
                holes: vec![],
            },
            1.0,
        )
        .unwrap()
        .to_mesh();

        let (mesh, diags) = with_base(extrusion.clone(), malformed(), 2.0);
        assert_eq!(mesh, extrusion);
        assert!(matches!(diags.as_slice(), [Diagnostic::MeshBuild(_)]));

        let slab_mesh = slab(Vec3::new(-2.0, -2.0, 0.0), Vec3::new(2.0, 2.0, 2.0)).to_mesh();
        let (mesh, diags) = with_base(extrusion.clone(), slab_mesh, 2.0);
        assert!(diags.is_empty());
        assert_eq!(mesh.bounds().unwrap().1.z, 3.0);
    }

    #[test]
    fn test_base_slab_added_below_extrusion() {
        let frame = WorldFrame::new(20, 20.0);
        let polys = vec![Polygon {
            outer: square(3.0, true),
            holes: vec![],
        }];

        let (without, d1) = build_solid_mesh(&polys, &options(false), &frame);
        let (with, d2) = build_solid_mesh(&polys, &options(true), &frame);
        assert!(d1.is_empty() && d2.is_empty());
        assert!(without.vertex_count() < with.vertex_count());

        let (lo, hi) = without.bounds().unwrap();
        assert_eq!(lo.z, 0.0);
        assert_eq!(hi.z, 5.0);

        let (lo, hi) = with.bounds().unwrap();
        assert_eq!(lo.z, 0.0);
        assert_eq!(hi.z, 7.0);
        assert!((hi.x - 10.0).abs() < 1e-4 && (lo.x + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_no_polygons_no_base() {
        let (mesh, diags) = build_solid_mesh(&[], &options(true), &WorldFrame::new(10, 10.0));
        assert!(mesh.is_empty());
        assert!(diags.is_empty());
    }
}
