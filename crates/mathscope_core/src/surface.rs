use crate::equation_engine::{AngleMode, Bindings, Expression};
use crate::error::EngineResult;
use crate::sampling::Domain;
use crate::traits::{ExpressionFunction, SurfaceFunction};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Flat, indexed triangle mesh of `z = f(x, y)`.
///
/// `vertices` and `normals` hold `[x, y, z]` triples; vertex `(i, j)` of the
/// grid lives at index `i * (steps + 1) + j`. `indices` lists triangles as
/// vertex index triples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceMesh {
    pub steps: usize,
    pub vertices: Vec<f64>,
    pub indices: Vec<u32>,
    pub normals: Vec<f64>,
    /// Vertices whose height failed to evaluate and was set to zero.
    pub substituted_vertices: usize,
}

impl SurfaceMesh {
    /// Largest grid the mesher builds. Keeps every vertex index within `u32`.
    pub const MAX_STEPS: usize = 1000;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex(&self, index: usize) -> [f64; 3] {
        let start = index * 3;
        [
            self.vertices[start],
            self.vertices[start + 1],
            self.vertices[start + 2],
        ]
    }

    pub fn normal(&self, index: usize) -> [f64; 3] {
        let start = index * 3;
        [
            self.normals[start],
            self.normals[start + 1],
            self.normals[start + 2],
        ]
    }
}

/// Parses `expr` (in `x` and `y`) and meshes it over the square
/// `[min, max]²` with `domain.steps` cells per side.
pub fn build_surface(expr: &str, domain: &Domain, mode: AngleMode) -> EngineResult<SurfaceMesh> {
    let expression = Expression::parse(expr)?;
    Ok(build_surface_for(&expression, domain, &Bindings::new(), mode))
}

pub fn build_surface_for(
    expression: &Expression,
    domain: &Domain,
    template: &Bindings,
    mode: AngleMode,
) -> SurfaceMesh {
    let function = ExpressionFunction::new(expression, template, mode);
    mesh_surface(&function, domain)
}

/// Evaluates `function` on the grid and builds the mesh.
///
/// The mesh is always topologically complete: a vertex whose height cannot be
/// evaluated is kept at `z = 0` so every triangle stays valid. Cells per side
/// are capped at [`SurfaceMesh::MAX_STEPS`]; front-ends clamp lower through
/// their settings.
pub fn mesh_surface<F: SurfaceFunction + ?Sized>(function: &F, domain: &Domain) -> SurfaceMesh {
    let steps = domain.step_count().min(SurfaceMesh::MAX_STEPS);
    let side = steps + 1;
    let delta = (domain.max - domain.min) / steps as f64;

    let mut vertices = Vec::with_capacity(side * side * 3);
    let mut substituted_vertices = 0usize;
    for i in 0..side {
        let x = domain.min + i as f64 * delta;
        for j in 0..side {
            let y = domain.min + j as f64 * delta;
            let z = match function.height_at(x, y) {
                Ok(Some(z)) => z,
                Ok(None) | Err(_) => {
                    substituted_vertices += 1;
                    0.0
                }
            };
            vertices.extend([x, y, z]);
        }
    }

    let indices = grid_indices(steps);
    let normals = vertex_normals(&vertices, &indices);

    SurfaceMesh {
        steps,
        vertices,
        indices,
        normals,
        substituted_vertices,
    }
}

/// Two triangles per cell: `(a, b, c)` and `(b, d, c)`. `steps` is at most
/// [`SurfaceMesh::MAX_STEPS`].
fn grid_indices(steps: usize) -> Vec<u32> {
    let side = (steps + 1) as u32;
    let mut indices = Vec::with_capacity(steps * steps * 6);
    for i in 0..steps as u32 {
        for j in 0..steps as u32 {
            let a = i * side + j;
            let b = a + 1;
            let c = a + side;
            let d = c + 1;
            indices.extend([a, b, c, b, d, c]);
        }
    }
    indices
}

/// Area-weighted smooth normals: every face normal is added to its three
/// corners, then each sum is normalized. A zero sum stays zero.
fn vertex_normals(vertices: &[f64], indices: &[u32]) -> Vec<f64> {
    let position = |index: u32| {
        let start = index as usize * 3;
        Vector3::new(vertices[start], vertices[start + 1], vertices[start + 2])
    };

    let mut accum = vec![Vector3::<f64>::zeros(); vertices.len() / 3];
    for triangle in indices.chunks_exact(3) {
        let (ia, ib, ic) = (triangle[0], triangle[1], triangle[2]);
        let (pa, pb, pc) = (position(ia), position(ib), position(ic));
        let face = (pb - pa).cross(&(pc - pa));
        accum[ia as usize] += face;
        accum[ib as usize] += face;
        accum[ic as usize] += face;
    }

    let mut normals = Vec::with_capacity(vertices.len());
    for sum in accum {
        let unit = sum.try_normalize(f64::EPSILON).unwrap_or_else(|| Vector3::zeros());
        normals.extend([unit.x, unit.y, unit.z]);
    }
    normals
}
