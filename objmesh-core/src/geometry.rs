/// Flat-shaded triangle geometry for one mesh group
use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

use crate::error::{MeshError, MeshResult};

/// Vertex positions in source order, `y` up. A slot is `None` when the
/// `v` line it came from had a malformed coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexPool {
    vertices: Vec<Option<Point3<f32>>>,
}

impl VertexPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f32, y: f32, z: f32) {
        self.vertices.push(Some(Point3::new(x, y, z)));
    }

    /// Reserve a slot for a vertex that could not be parsed.
    pub fn push_invalid(&mut self) {
        self.vertices.push(None);
    }

    pub fn get(&self, index: usize) -> Option<Option<Point3<f32>>> {
        self.vertices.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// A triangle as three 0-based indices into the vertex pool.
///
/// Indices are kept signed and unchecked until the geometry is built, so that
/// a bad reference can be reported against the whole group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub indices: [i64; 3],
    /// Indices as written, for error reports.
    pub source: [i64; 3],
    pub line: usize,
}

impl Face {
    /// Build a face from 1-based source indices. Anything below 1 ends up
    /// negative and is rejected when the group is built.
    pub fn from_source(source: [i64; 3], line: usize) -> Self {
        Self {
            indices: source.map(|i| i.saturating_sub(1)),
            source,
            line,
        }
    }
}

/// Calculate the face normal from the declared winding order.
///
/// Degenerate triangles have no direction and get a zero normal.
pub fn face_normal(v0: &Point3<f32>, v1: &Point3<f32>, v2: &Point3<f32>) -> Vector3<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    edge1
        .cross(&edge2)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// Flattened attribute arrays for one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupGeometry {
    /// `(x, z, y)` per vertex.
    pub positions: Vec<f32>,
    /// One normal per vertex, repeated for the three vertices of a face.
    pub normals: Vec<f32>,
    /// Always zero.
    pub tex_coords: Vec<f32>,
    /// Largest source `y` over all emitted vertices.
    pub height: f32,
    /// Faces that were skipped because they touch an invalid vertex.
    pub issues: Vec<MeshError>,
}

impl GroupGeometry {
    /// Resolve `faces` against `pool` and flatten them.
    ///
    /// Any index outside the pool rejects the whole group.
    pub fn build(pool: &VertexPool, faces: &[Face]) -> MeshResult<Self> {
        let mut geometry = Self {
            positions: Vec::with_capacity(faces.len() * 9),
            normals: Vec::with_capacity(faces.len() * 9),
            tex_coords: Vec::with_capacity(faces.len() * 6),
            height: f32::NEG_INFINITY,
            issues: Vec::new(),
        };

        for face in faces {
            match resolve(pool, face)? {
                Ok(vertices) => geometry.push_triangle(&vertices),
                Err(err) => {
                    warn!(%err, "face skipped");
                    geometry.issues.push(err);
                }
            }
        }

        debug!(
            triangles = geometry.triangle_count(),
            skipped = geometry.issues.len(),
            "built group geometry"
        );
        Ok(geometry)
    }

    fn push_triangle(&mut self, vertices: &[Point3<f32>; 3]) {
        let [v0, v1, v2] = vertices;
        let normal = face_normal(v0, v1, v2);

        for v in vertices {
            self.positions.extend_from_slice(&[v.x, v.z, v.y]);
            self.normals.extend_from_slice(normal.as_slice());
            self.tex_coords.extend_from_slice(&[0.0, 0.0]);
            self.height = self.height.max(v.y);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Outer error: out-of-range index (fatal for the group).
/// Inner error: the face touches an invalid vertex (fatal for the face).
fn resolve(pool: &VertexPool, face: &Face) -> MeshResult<Result<[Point3<f32>; 3], MeshError>> {
    let mut resolved = [Point3::origin(); 3];
    let mut invalid = None;

    for (k, slot) in resolved.iter_mut().enumerate() {
        let index = usize::try_from(face.indices[k])
            .ok()
            .filter(|&i| i < pool.len())
            .ok_or(MeshError::IndexOutOfRange {
                line: face.line,
                index: face.source[k],
                len: pool.len(),
            })?;
        match pool.get(index).flatten() {
            Some(point) => *slot = point,
            None => {
                invalid.get_or_insert(MeshError::InvalidVertex {
                    line: face.line,
                    index: index + 1,
                });
            }
        }
    }

    Ok(match invalid {
        Some(err) => Err(err),
        None => Ok(resolved),
    })
}
