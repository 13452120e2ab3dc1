//! Structured simplicial mesh generators.
//!
//! Generated meshes are returned unprepared; call
//! [`TriangleMesh::preprocess`] before building a Reeb graph on them.

use crate::reeb_error::ReebError;
use crate::topology::mesh::TriangleMesh;

/// Optional periodic identification for structured meshes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Periodicity {
    pub x: bool,
    pub y: bool,
}

impl Periodicity {
    /// No periodic directions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Both directions wrap; the grid becomes a torus.
    pub fn torus() -> Self {
        Self { x: true, y: true }
    }
}

/// Output from a mesh generator.
#[derive(Debug, Clone)]
pub struct GeneratedMesh {
    pub mesh: TriangleMesh,
    /// One coordinate triple per vertex.
    pub coordinates: Vec<[f64; 3]>,
}

fn invalid(message: impl Into<String>) -> ReebError {
    ReebError::InvalidGeometry(message.into())
}

/// Triangulated grid over `[min, max]` with `nx * ny` quads, each split
/// along its `(i, j)` to `(i+1, j+1)` diagonal.
///
/// A periodic direction identifies its first and last vertex rows and needs
/// at least three cells.
pub fn triangle_grid(
    nx: usize,
    ny: usize,
    min: [f64; 2],
    max: [f64; 2],
    periodic: Periodicity,
) -> Result<GeneratedMesh, ReebError> {
    if nx == 0 || ny == 0 {
        return Err(invalid("nx and ny must be positive"));
    }
    if (periodic.x && nx < 3) || (periodic.y && ny < 3) {
        return Err(invalid("periodic directions need at least 3 cells"));
    }
    let cols = if periodic.x { nx } else { nx + 1 };
    let rows = if periodic.y { ny } else { ny + 1 };
    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;

    let mut coordinates = Vec::with_capacity(cols * rows);
    for j in 0..rows {
        for i in 0..cols {
            coordinates.push([min[0] + dx * i as f64, min[1] + dy * j as f64, 0.0]);
        }
    }

    let id = |i: usize, j: usize| (j % rows) * cols + (i % cols);
    let mut triangles = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let v00 = id(i, j);
            let v10 = id(i + 1, j);
            let v01 = id(i, j + 1);
            let v11 = id(i + 1, j + 1);
            triangles.push([v00, v10, v11]);
            triangles.push([v00, v11, v01]);
        }
    }

    let mesh = TriangleMesh::new(coordinates.len(), triangles)?;
    Ok(GeneratedMesh { mesh, coordinates })
}

/// Torus of revolution sampled on an `nu * nv` periodic grid.
///
/// The axis of revolution is `y`, so the `z` coordinate is a height function
/// with one minimum, two saddles and one maximum.
pub fn torus(nu: usize, nv: usize, major: f64, minor: f64) -> Result<GeneratedMesh, ReebError> {
    let GeneratedMesh {
        mesh,
        mut coordinates,
    } = triangle_grid(
        nu,
        nv,
        [0.0, 0.0],
        [std::f64::consts::TAU, std::f64::consts::TAU],
        Periodicity::torus(),
    )?;
    for c in coordinates.iter_mut() {
        let (u, v) = (c[0], c[1]);
        let ring = major + minor * v.cos();
        *c = [ring * u.cos(), minor * v.sin(), ring * u.sin()];
    }
    Ok(GeneratedMesh { mesh, coordinates })
}

/// Tetrahedral box over `[min, max]` with `nx * ny * nz` cubes, each split
/// into six tetrahedra sharing the cube's main diagonal.
pub fn tetrahedral_box(
    nx: usize,
    ny: usize,
    nz: usize,
    min: [f64; 3],
    max: [f64; 3],
) -> Result<GeneratedMesh, ReebError> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(invalid("nx, ny and nz must be positive"));
    }
    let d = [
        (max[0] - min[0]) / nx as f64,
        (max[1] - min[1]) / ny as f64,
        (max[2] - min[2]) / nz as f64,
    ];
    let id = |i: usize, j: usize, k: usize| (k * (ny + 1) + j) * (nx + 1) + i;

    let mut coordinates = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                coordinates.push([
                    min[0] + d[0] * i as f64,
                    min[1] + d[1] * j as f64,
                    min[2] + d[2] * k as f64,
                ]);
            }
        }
    }

    const AXIS_ORDERS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let mut tetrahedra = Vec::with_capacity(6 * nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                for axes in AXIS_ORDERS {
                    let mut corner = [i, j, k];
                    let mut tet = [id(i, j, k); 4];
                    for (slot, axis) in axes.into_iter().enumerate() {
                        corner[axis] += 1;
                        tet[slot + 1] = id(corner[0], corner[1], corner[2]);
                    }
                    tetrahedra.push(tet);
                }
            }
        }
    }

    let mesh = TriangleMesh::from_tetrahedra(coordinates.len(), &tetrahedra)?;
    Ok(GeneratedMesh { mesh, coordinates })
}
