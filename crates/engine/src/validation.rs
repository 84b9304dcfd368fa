//! Mesh validation utilities.
//!
//! `MeshValidator` checks triangle-soup integrity: matching attribute counts,
//! whole triangles, unit normals, bounding-box dimensions, and whether the
//! surface is closed and consistently oriented.

use std::collections::HashMap;

use glam::Vec3;

use crate::mesh::Mesh;

/// Positions closer than 1 / WELD_SCALE are treated as the same vertex.
const WELD_SCALE: f32 = 1.0e4;

/// Validator for `Mesh` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a Mesh,
}

impl<'a> MeshValidator<'a> {
    /// Create a new validator for the given mesh.
    pub fn new(mesh: &'a Mesh) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// One normal per position.
    pub fn are_attributes_aligned(&self) -> bool {
        self.mesh.positions.len() == self.mesh.normals.len()
    }

    /// Position count is a multiple of 3.
    pub fn is_triangle_stride_valid(&self) -> bool {
        self.mesh.positions.len() % 3 == 0
    }

    /// Check that all vertex normals have unit length (within epsilon).
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        self.mesh
            .normals
            .iter()
            .all(|n| (n.length() - 1.0).abs() <= epsilon)
    }

    pub fn are_positions_finite(&self) -> bool {
        self.mesh.positions.iter().all(|p| p.is_finite())
    }

    /// Dimensions (x, y, z) of the bounding box; zero for an empty mesh.
    pub fn dimensions(&self) -> [f32; 3] {
        match self.mesh.bounds() {
            Some((lo, hi)) => (hi - lo).to_array(),
            None => [0.0; 3],
        }
    }

    /// Check that the AABB dimensions are approximately equal to `expected`.
    pub fn assert_dimensions_approx(&self, expected: [f32; 3], tolerance: f32) -> bool {
        let dims = self.dimensions();
        (0..3).all(|i| (dims[i] - expected[i]).abs() < tolerance)
    }

    /// Every directed edge is matched by exactly as many reversed edges.
    ///
    /// Vertices are welded by quantized position, so a closed, consistently
    /// wound surface passes even though the soup duplicates every corner.
    pub fn is_closed(&self) -> bool {
        if self.mesh.is_empty() {
            return false;
        }
        let mut balance: HashMap<(Key, Key), i32> = HashMap::new();
        for tri in self.mesh.triangles() {
            let keys = tri.map(weld);
            for k in 0..3 {
                let (a, b) = (keys[k], keys[(k + 1) % 3]);
                if a == b {
                    continue;
                }
                if a < b {
                    *balance.entry((a, b)).or_default() += 1;
                } else {
                    *balance.entry((b, a)).or_default() -= 1;
                }
            }
        }
        balance.values().all(|&count| count == 0)
    }

    /// Signed volume by the divergence theorem. Positive for outward-facing windings.
    pub fn signed_volume(&self) -> f64 {
        self.mesh
            .triangles()
            .map(|[a, b, c]| a.as_dvec3().dot(b.as_dvec3().cross(c.as_dvec3())) / 6.0)
            .sum()
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.are_attributes_aligned() {
            errors.push(format!(
                "{} positions but {} normals",
                self.mesh.positions.len(),
                self.mesh.normals.len()
            ));
        }

        if !self.is_triangle_stride_valid() {
            errors.push(format!(
                "Position count {} is not a multiple of 3",
                self.mesh.positions.len()
            ));
        }

        if !self.are_positions_finite() {
            errors.push("Some positions are NaN or infinite".to_string());
        }

        if self.vertex_count() > 0 && !self.are_normals_normalized(0.1) {
            errors.push("Some normals are not unit-length (epsilon=0.1)".to_string());
        }

        errors
    }
}

type Key = (i64, i64, i64);

fn weld(p: Vec3) -> Key {
    let q = (p * WELD_SCALE).round();
    (q.x as i64, q.y as i64, q.z as i64)
}
