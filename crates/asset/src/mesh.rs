//! CPU-side mesh representation used by loaders.

use bytemuck::{Pod, Zeroable};

/// Vertex with position/uv/normal. Values are in object space.
///
/// `#[repr(C)]` with this exact field order so the vertex buffer can be
/// built by casting the slice; the renderer's attribute layout must match
/// (Float32x3, Float32x2, Float32x3).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }
}

/// Indexed triangle mesh with tightly-packed vertices.
///
/// Indices come in runs of three, one run per triangle. An empty mesh is a
/// valid value ("no geometry"), distinct from a failed load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks the mesh invariants: whole triangles only, every index inside
    /// the vertex buffer.
    pub fn is_valid(&self) -> bool {
        self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }

    /// Unit cube centered at the origin, with per-face normals and uvs.
    /// The sandbox falls back to this when no model file is given.
    pub fn cube() -> Self {
        // (face normal, u axis, v axis)
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (n, u, v) in FACES {
            let base = vertices.len() as u32;
            for (cu, cv, uv) in [
                (-0.5, -0.5, [0.0, 0.0]),
                (0.5, -0.5, [1.0, 0.0]),
                (0.5, 0.5, [1.0, 1.0]),
                (-0.5, 0.5, [0.0, 1.0]),
            ] {
                let position = [
                    n[0] * 0.5 + u[0] * cu + v[0] * cv,
                    n[1] * 0.5 + u[1] * cu + v[1] * cv,
                    n[2] * 0.5 + u[2] * cu + v[2] * cv,
                ];
                vertices.push(MeshVertex::new(position, uv, n));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self { vertices, indices }
    }
}
