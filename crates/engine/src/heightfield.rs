//! Relief mode: a regular grid displaced by sample brightness.

use glam::Vec3;
use kurbo::Point;

use crate::extrude::push_walls;
use crate::field::ScalarField;
use crate::geometry::WorldFrame;
use crate::mesh::{Mesh, MeshData};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliefOptions {
    pub height_scale: f64,
    pub base_thickness: f64,
    /// Close the surface with side walls and a flat bottom at z = 0
    pub skirt: bool,
}

/// One vertex per field sample at `z = value * height_scale + base_thickness`.
///
/// Fields smaller than 2×2 have no cells and produce an empty mesh.
pub fn build_heightfield_mesh(
    field: &ScalarField,
    options: &ReliefOptions,
    frame: &WorldFrame,
) -> Mesh {
    let res = field.resolution();
    if res < 2 {
        return Mesh::new();
    }

    let height = |x: usize, y: usize| {
        (field.get(x, y) * options.height_scale + options.base_thickness) as f32
    };
    let position = |x: usize, y: usize| {
        let p = frame.to_world(Point::new(x as f64, y as f64));
        Vec3::new(p.x as f32, p.y as f32, height(x, y))
    };
    let index = |x: usize, y: usize| (y * res + x) as u32;

    // Surface triangles, counter-clockwise seen from above (world y is up)
    let mut indices: Vec<u32> = Vec::with_capacity((res - 1) * (res - 1) * 6);
    for y in 0..res - 1 {
        for x in 0..res - 1 {
            let tl = index(x, y);
            let tr = index(x + 1, y);
            let bl = index(x, y + 1);
            let br = index(x + 1, y + 1);
            indices.extend_from_slice(&[tl, bl, br, tl, br, tr]);
        }
    }

    let positions: Vec<Vec3> = (0..res)
        .flat_map(|y| (0..res).map(move |x| (x, y)))
        .map(|(x, y)| position(x, y))
        .collect();

    // Area-weighted vertex normals
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    let mut data = MeshData {
        vertices: Vec::with_capacity(positions.len() * crate::mesh::STRIDE),
        indices,
    };
    for (p, n) in positions.iter().zip(&normals) {
        data.push_vertex(*p, n.try_normalize().unwrap_or(Vec3::Z));
    }

    if options.skirt {
        push_skirt(&mut data, res, frame, &position);
    }

    data.to_mesh()
}

/// Walls from the surface border down to z = 0, and a bottom fan.
fn push_skirt(
    data: &mut MeshData,
    res: usize,
    frame: &WorldFrame,
    position: &impl Fn(usize, usize) -> Vec3,
) {
    // Border in grid coordinates, counter-clockwise in world space
    let last = res - 1;
    let mut border: Vec<(usize, usize)> = Vec::with_capacity(4 * last);
    border.extend((0..last).map(|x| (x, last)));
    border.extend((1..=last).rev().map(|y| (last, y)));
    border.extend((1..=last).rev().map(|x| (x, 0)));
    border.extend((0..last).map(|y| (0, y)));

    let top: Vec<Vec3> = border.iter().map(|&(x, y)| position(x, y)).collect();
    let ring: Vec<Point> = top
        .iter()
        .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
        .collect();
    push_walls(data, &ring, 0.0, |i| top[i].z);

    // Bottom: fan around the footprint centre, clockwise seen from above
    let centre = frame.to_world(Point::new(last as f64 / 2.0, last as f64 / 2.0));
    let hub = data.push_vertex(
        Vec3::new(centre.x as f32, centre.y as f32, 0.0),
        Vec3::NEG_Z,
    );
    let first = data.vertex_count() as u32;
    for p in &ring {
        data.push_vertex(Vec3::new(p.x as f32, p.y as f32, 0.0), Vec3::NEG_Z);
    }
    let n = ring.len() as u32;
    for i in 0..n {
        let j = (i + 1) % n;
        data.indices.extend_from_slice(&[hub, first + j, first + i]);
    }
}
