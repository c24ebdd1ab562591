//! Model loading. Parses Wavefront OBJ geometry into a [`TriMesh`] plus
//! per-vertex normals ready for GPU upload.

use anyhow::{Context, Result};
use glam::Vec3;
use rayon::prelude::*;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};
use vista_core::mesh::TriMesh;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// A parsed model: the picking mesh and the shaded vertex stream.
pub struct LoadedModel {
    pub mesh: TriMesh,
    pub vertices: Vec<MeshVertex>,
}

/// Model geometry resident on the GPU.
pub struct GpuMesh {
    pub vtx: wgpu::Buffer,
    pub idx: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, model: &LoadedModel) -> Self {
        let indices: Vec<u32> = model
            .mesh
            .indices
            .iter()
            .flat_map(|tri| tri.iter().copied())
            .collect();

        let vtx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model VB"),
            contents: bytemuck::cast_slice(&model.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let idx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model IB"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vtx,
            idx,
            index_count: indices.len() as u32,
        }
    }
}

/// Loads an OBJ model from disk, reporting `(loaded_bytes, total_bytes)` as
/// lines are consumed.
pub fn load_obj_file(
    path: impl AsRef<Path>,
    progress: impl FnMut(u64, u64),
) -> Result<LoadedModel> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("opening model {}", path.display()))?;
    let total = file.metadata().map(|m| m.len()).unwrap_or(0);
    load_obj(file, total, progress)
        .with_context(|| format!("parsing model {}", path.display()))
}

/// Parse OBJ geometry from any `Read` source. Only `v` and `f` records are
/// used; faces with more than three corners are fan-triangulated.
pub fn load_obj<R: Read>(
    reader: R,
    total_bytes: u64,
    mut progress: impl FnMut(u64, u64),
) -> Result<LoadedModel> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut indices: Vec<[u32; 3]> = Vec::new();
    let mut loaded: u64 = 0;

    for line_result in BufReader::new(reader).lines() {
        let line = line_result?;
        loaded += line.len() as u64 + 1;
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("v ") {
            let mut parts = rest.split_whitespace();
            let x: f32 = parts.next().context("missing x coordinate")?.parse()?;
            let y: f32 = parts.next().context("missing y coordinate")?.parse()?;
            let z: f32 = parts.next().context("missing z coordinate")?.parse()?;
            // Skipping a bad vertex would shift every later face index, so a
            // non-finite coordinate is a hard error.
            anyhow::ensure!(
                x.is_finite() && y.is_finite() && z.is_finite(),
                "non-finite coordinate in vertex record {trimmed:?}"
            );
            positions.push(Vec3::new(x, y, z));
        } else if let Some(rest) = trimmed.strip_prefix("f ") {
            let mut corners: Vec<u32> = Vec::with_capacity(4);
            for part in rest.split_whitespace() {
                corners.push(face_index(part, positions.len())?);
            }
            anyhow::ensure!(corners.len() >= 3, "face with fewer than 3 corners");
            for i in 1..corners.len() - 1 {
                indices.push([corners[0], corners[i], corners[i + 1]]);
            }
        }

        // Total is advisory; keep the reported fraction <= 1 even if the
        // metadata size was stale.
        progress(loaded, total_bytes.max(loaded));
    }

    anyhow::ensure!(!positions.is_empty(), "model has no vertices");
    anyhow::ensure!(!indices.is_empty(), "model has no faces");

    let mesh = TriMesh { positions, indices };
    let vertices = shade_vertices(&mesh);

    Ok(LoadedModel { mesh, vertices })
}

/// Resolve one `f` corner (`7`, `7/2`, `7//3`, `7/2/3`, `-1`) to a 0-based
/// vertex index. Only the position index matters; texture and normal
/// references are discarded.
fn face_index(part: &str, vertex_count: usize) -> Result<u32> {
    let first = part
        .split('/')
        .next()
        .context("empty face corner")?;
    let raw: i64 = first
        .parse()
        .with_context(|| format!("bad face index {part:?}"))?;

    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        // Negative indices count back from the most recent vertex.
        vertex_count as i64 + raw
    } else {
        anyhow::bail!("face index 0 is not valid");
    };

    anyhow::ensure!(
        (0..vertex_count as i64).contains(&resolved),
        "face index {raw} out of range ({vertex_count} vertices)"
    );
    Ok(resolved as u32)
}

/// Area-weighted smooth normals. Face normals are computed in parallel,
/// accumulation stays serial to keep it deterministic.
fn shade_vertices(mesh: &TriMesh) -> Vec<MeshVertex> {
    let face_normals: Vec<Vec3> = mesh
        .indices
        .par_iter()
        .map(|&[a, b, c]| {
            let pa = mesh.positions[a as usize];
            let pb = mesh.positions[b as usize];
            let pc = mesh.positions[c as usize];
            (pb - pa).cross(pc - pa)
        })
        .collect();

    let mut accum = vec![Vec3::ZERO; mesh.positions.len()];
    for (tri, n) in mesh.indices.iter().zip(&face_normals) {
        for &i in tri {
            accum[i as usize] += *n;
        }
    }

    mesh.positions
        .iter()
        .zip(&accum)
        .map(|(p, n)| MeshVertex {
            position: p.to_array(),
            normal: n.normalize_or_zero().to_array(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE_FACE: &str = "\
# a single quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn parses_vertices_and_fan_triangulates_quads() {
        let model = load_obj(CUBE_FACE.as_bytes(), 0, |_, _| {}).unwrap();
        assert_eq!(model.mesh.positions.len(), 4);
        assert_eq!(model.mesh.indices, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn handles_slash_and_negative_face_indices() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1/1/1 2//2 -1
";
        let model = load_obj(src.as_bytes(), 0, |_, _| {}).unwrap();
        assert_eq!(model.mesh.indices, vec![[0, 1, 2]]);
    }

    #[test]
    fn non_finite_vertex_is_a_parse_error() {
        // Dropping the bad vertex instead would silently renumber the faces.
        let src = "\
v 0 0 0
v NaN 0 0
v 0 1 0
f 1 2 3
";
        assert!(load_obj(src.as_bytes(), 0, |_, _| {}).is_err());
    }

    #[test]
    fn rejects_out_of_range_faces() {
        let src = "v 0 0 0\nf 1 2 3\n";
        assert!(load_obj(src.as_bytes(), 0, |_, _| {}).is_err());
    }

    #[test]
    fn flat_quad_gets_unit_z_normals() {
        let model = load_obj(CUBE_FACE.as_bytes(), 0, |_, _| {}).unwrap();
        for v in &model.vertices {
            assert!((Vec3::from(v.normal) - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn progress_reaches_the_total() {
        let total = CUBE_FACE.len() as u64;
        let mut last = (0u64, 0u64);
        load_obj(CUBE_FACE.as_bytes(), total, |done, of| last = (done, of)).unwrap();
        assert_eq!(last.1, total.max(last.0));
        assert!(last.0 >= total - 1);
    }
}
