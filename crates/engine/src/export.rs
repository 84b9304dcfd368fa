//! Binary STL and GLB writers.

use std::path::Path;

use glam::Vec3;

use crate::error::Result;
use crate::mesh::Mesh;

/// STL header size in bytes
const STL_HEADER_LEN: usize = 80;
/// Bytes per STL triangle record: normal + 3 vertices + attribute count
const STL_TRIANGLE_LEN: usize = 50;

/// GLB magic number: "glTF"
const GLB_MAGIC: u32 = 0x46546C67;
/// GLB version 2
const GLB_VERSION: u32 = 2;
/// JSON chunk type
const CHUNK_TYPE_JSON: u32 = 0x4E4F534A;
/// BIN chunk type
const CHUNK_TYPE_BIN: u32 = 0x004E4942;

/// glTF component type
const FLOAT: u32 = 5126;
/// glTF buffer view target
const ARRAY_BUFFER: u32 = 34962;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Stl,
    Glb,
}

impl ExportFormat {
    /// Pick a format from the file extension; anything but `.glb` is STL.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("glb") => ExportFormat::Glb,
            _ => ExportFormat::Stl,
        }
    }
}

/// Encode `mesh` in `format`.
pub fn encode(mesh: &Mesh, format: ExportFormat) -> Vec<u8> {
    match format {
        ExportFormat::Stl => write_stl(mesh),
        ExportFormat::Glb => build_glb(mesh),
    }
}

/// Write `mesh` to `path`, choosing the format from the extension.
pub fn save(mesh: &Mesh, path: &Path) -> Result<()> {
    let format = ExportFormat::from_path(path);
    std::fs::write(path, encode(mesh, format))?;
    tracing::info!(
        "save: wrote {} triangles to {} ({:?})",
        mesh.triangle_count(),
        path.display(),
        format
    );
    Ok(())
}

/// Binary STL: 80-byte header, little-endian u32 triangle count, 50 bytes per triangle.
///
/// Facet normals are recomputed from the winding.
pub fn write_stl(mesh: &Mesh) -> Vec<u8> {
    let count = mesh.triangle_count();
    let mut out = Vec::with_capacity(STL_HEADER_LEN + 4 + count * STL_TRIANGLE_LEN);

    let mut header = [0u8; STL_HEADER_LEN];
    let label = b"relief binary STL";
    header[..label.len()].copy_from_slice(label);
    out.extend_from_slice(&header);
    out.extend_from_slice(&(count as u32).to_le_bytes());

    for [a, b, c] in mesh.triangles() {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        for v in [normal, a, b, c] {
            push_vec3(&mut out, v);
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }

    out
}

/// Binary glTF with one non-indexed primitive (POSITION + NORMAL).
///
/// An empty mesh produces a valid file with an empty scene.
pub fn build_glb(mesh: &Mesh) -> Vec<u8> {
    let mut bin_data: Vec<u8> = Vec::with_capacity(mesh.vertex_count() * 24);

    let gltf_json = match mesh.bounds() {
        None => serde_json::json!({
            "asset": { "version": "2.0", "generator": "relief" },
            "scene": 0,
            "scenes": [{ "name": "Scene", "nodes": [] }]
        }),
        Some((lo, hi)) => {
            for p in &mesh.positions {
                push_vec3(&mut bin_data, *p);
            }
            let norm_offset = bin_data.len();
            for n in &mesh.normals {
                push_vec3(&mut bin_data, *n);
            }
            let count = mesh.vertex_count();

            serde_json::json!({
                "asset": { "version": "2.0", "generator": "relief" },
                "scene": 0,
                "scenes": [{ "name": "Scene", "nodes": [0] }],
                "nodes": [{ "name": "relief", "mesh": 0 }],
                "meshes": [{
                    "name": "relief",
                    "primitives": [{
                        "attributes": { "POSITION": 0, "NORMAL": 1 },
                        "material": 0
                    }]
                }],
                "accessors": [
                    {
                        "bufferView": 0,
                        "componentType": FLOAT,
                        "count": count,
                        "type": "VEC3",
                        "min": lo.to_array(),
                        "max": hi.to_array()
                    },
                    {
                        "bufferView": 1,
                        "componentType": FLOAT,
                        "count": count,
                        "type": "VEC3"
                    }
                ],
                "bufferViews": [
                    {
                        "buffer": 0,
                        "byteOffset": 0,
                        "byteLength": norm_offset,
                        "target": ARRAY_BUFFER
                    },
                    {
                        "buffer": 0,
                        "byteOffset": norm_offset,
                        "byteLength": bin_data.len() - norm_offset,
                        "target": ARRAY_BUFFER
                    }
                ],
                "buffers": [{ "byteLength": bin_data.len() }],
                "materials": [{
                    "name": "Default",
                    "pbrMetallicRoughness": {
                        "baseColorFactor": [0.7, 0.7, 0.72, 1.0],
                        "metallicFactor": 0.0,
                        "roughnessFactor": 0.8
                    }
                }]
            })
        }
    };

    let mut json_bytes = gltf_json.to_string().into_bytes();

    // Pad JSON with spaces and BIN with zeros to 4-byte alignment
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    while bin_data.len() % 4 != 0 {
        bin_data.push(0);
    }

    let json_chunk_length = json_bytes.len() as u32;
    let bin_chunk_length = bin_data.len() as u32;
    let mut total_length: u32 = 12 + 8 + json_chunk_length;
    if bin_chunk_length > 0 {
        total_length += 8 + bin_chunk_length;
    }

    let mut glb = Vec::with_capacity(total_length as usize);

    // Header
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&total_length.to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&json_chunk_length.to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    glb.extend_from_slice(&json_bytes);

    // BIN chunk
    if bin_chunk_length > 0 {
        glb.extend_from_slice(&bin_chunk_length.to_le_bytes());
        glb.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
        glb.extend_from_slice(&bin_data);
    }

    glb
}

fn push_vec3(out: &mut Vec<u8>, v: Vec3) {
    for f in v.to_array() {
        out.extend_from_slice(&f.to_le_bytes());
    }
}
