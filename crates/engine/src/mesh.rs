use glam::Vec3;

use crate::error::MeshBuildError;

/// Floats per interleaved vertex in [`MeshData`]: position(3) + normal(3)
pub const STRIDE: usize = 6;

/// Indexed builder output: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / STRIDE
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&[
            position.x, position.y, position.z, normal.x, normal.y, normal.z,
        ]);
        index
    }

    fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[i * STRIDE..i * STRIDE + 3])
    }

    fn normal(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[i * STRIDE + 3..i * STRIDE + 6])
    }

    /// Expand the index buffer into a triangle soup, dropping the index data.
    ///
    /// Out-of-range indices and a trailing partial triangle are skipped.
    pub fn to_mesh(&self) -> Mesh {
        let count = self.vertex_count();
        let mut mesh = Mesh::with_capacity(self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            if tri.iter().any(|&i| i as usize >= count) {
                continue;
            }
            for &i in tri {
                mesh.positions.push(self.position(i as usize));
                mesh.normals.push(self.normal(i as usize));
            }
        }
        mesh
    }
}

/// Non-indexed triangle soup: every three consecutive vertices form a triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check that positions and normals line up as whole triangles.
    pub fn check_layout(&self, part: usize) -> Result<(), MeshBuildError> {
        if self.positions.len() != self.normals.len() {
            return Err(MeshBuildError::AttributeMismatch {
                part,
                positions: self.positions.len(),
                normals: self.normals.len(),
            });
        }
        if self.positions.len() % 3 != 0 {
            return Err(MeshBuildError::PartialTriangle {
                part,
                positions: self.positions.len(),
            });
        }
        Ok(())
    }

    /// Concatenate `parts` into a new mesh. Fails if any part's attributes disagree.
    ///
    /// Merging no parts (or only empty parts) yields an empty mesh.
    pub fn merge(parts: &[&Mesh]) -> Result<Mesh, MeshBuildError> {
        for (i, part) in parts.iter().enumerate() {
            part.check_layout(i)?;
        }
        let total = parts.iter().map(|p| p.vertex_count()).sum();
        let mut merged = Mesh::with_capacity(total);
        for part in parts {
            merged.positions.extend_from_slice(&part.positions);
            merged.normals.extend_from_slice(&part.normals);
        }
        Ok(merged)
    }

    /// Merge parts one at a time, keeping the last successful result when a part fails.
    pub fn merge_partial(parts: &[Mesh]) -> (Mesh, Vec<MeshBuildError>) {
        let mut acc = Mesh::new();
        let mut errors = Vec::new();
        for (i, part) in parts.iter().enumerate() {
            match part.check_layout(i) {
                Ok(()) => {
                    acc.positions.extend_from_slice(&part.positions);
                    acc.normals.extend_from_slice(&part.normals);
                }
                Err(e) => errors.push(e),
            }
        }
        (acc, errors)
    }

    /// A copy moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Mesh {
        Mesh {
            positions: self.positions.iter().map(|p| *p + offset).collect(),
            normals: self.normals.clone(),
        }
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Iterate triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.positions.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Box spanning `min..max`, outward normals, 4 vertices per face.
pub fn slab(min: Vec3, max: Vec3) -> MeshData {
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Top (+Z)
        ([Vec3::new(x0, y0, z1), Vec3::new(x1, y0, z1), Vec3::new(x1, y1, z1), Vec3::new(x0, y1, z1)], Vec3::Z),
        // Bottom (-Z)
        ([Vec3::new(x0, y1, z0), Vec3::new(x1, y1, z0), Vec3::new(x1, y0, z0), Vec3::new(x0, y0, z0)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(x1, y0, z0), Vec3::new(x1, y1, z0), Vec3::new(x1, y1, z1), Vec3::new(x1, y0, z1)], Vec3::X),
        // Left (-X)
        ([Vec3::new(x0, y1, z0), Vec3::new(x0, y0, z0), Vec3::new(x0, y0, z1), Vec3::new(x0, y1, z1)], Vec3::NEG_X),
        // Back (+Y)
        ([Vec3::new(x1, y1, z0), Vec3::new(x0, y1, z0), Vec3::new(x0, y1, z1), Vec3::new(x1, y1, z1)], Vec3::Y),
        // Front (-Y)
        ([Vec3::new(x0, y0, z0), Vec3::new(x1, y0, z0), Vec3::new(x1, y0, z1), Vec3::new(x0, y0, z1)], Vec3::NEG_Y),
    ];

    let mut data = MeshData {
        vertices: Vec::with_capacity(24 * STRIDE),
        indices: Vec::with_capacity(36),
    };

    for (quad, normal) in &faces {
        let base = data.vertex_count() as u32;
        for v in quad {
            data.push_vertex(*v, *normal);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    data
}
