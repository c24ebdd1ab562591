//! Triangle mesh used as the pointer's ray-cast target.
//!
//! Render-side vertex data (normals, GPU buffers) lives in the viewer; the
//! core only needs positions and triangle indices for picking.

use glam::Vec3;

/// An indexed triangle mesh in world space.
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<[u32; 3]>,
}

impl TriMesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self { positions, indices }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Vertices of triangle `i`.
    #[inline]
    pub fn triangle(&self, i: usize) -> (Vec3, Vec3, Vec3) {
        let [a, b, c] = self.indices[i];
        (
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        )
    }

    /// Centroid of all vertices.
    pub fn centroid(&self) -> Vec3 {
        if self.positions.is_empty() {
            return Vec3::ZERO;
        }
        self.positions.iter().copied().sum::<Vec3>() / self.positions.len() as f32
    }

    /// Radius of the bounding sphere around the centroid.
    pub fn bounding_radius(&self) -> f32 {
        let c = self.centroid();
        self.positions
            .iter()
            .map(|p| p.distance(c))
            .fold(0.0_f32, f32::max)
    }
}
