//! CPU-side mesh representation used by loaders and procedural shapes.

use std::f32::consts::TAU;

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle mesh with tightly-packed vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Returns `true` if both vertex and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat disc in the XY plane facing +Z: one center vertex plus a closed
    /// rim of `segments + 1` vertices (first and last coincide for UVs).
    pub fn circle(radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let normal = [0.0, 0.0, 1.0];
        let mut vertices = Vec::with_capacity(segments as usize + 2);
        vertices.push(MeshVertex::new([0.0, 0.0, 0.0], normal, [0.5, 0.5]));

        for s in 0..=segments {
            let theta = s as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let (x, y) = (radius * cos, radius * sin);
            let uv = [(cos + 1.0) * 0.5, (sin + 1.0) * 0.5];
            vertices.push(MeshVertex::new([x, y, 0.0], normal, uv));
        }

        let mut indices = Vec::with_capacity(segments as usize * 3);
        for i in 1..=segments {
            indices.extend_from_slice(&[i, i + 1, 0]);
        }

        Self::new(vertices, indices)
    }
}
