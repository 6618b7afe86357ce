use crate::core::geometry::{CORNER_LABELS, Vertex};
use log::{debug, warn};
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

pub type VertexId = usize;
pub type EdgeId = usize;
pub type FaceId = usize;

/// Material color of every mesh vertex (a medium slate blue).
pub const VERTEX_COLOR: Vector3<f32> = Vector3::new(0.5, 0.45, 0.57);

/// A corner of the surface.
#[derive(Debug, Clone)]
pub struct MeshVertex {
    pub position: Point3<f32>,
    /// Normal read from the file, if any. Otherwise derived from the face fan.
    pub normal: Option<Vector3<f32>>,
    /// One out-going half-edge; after `set_first_edges` the first of its fan.
    pub edge: Option<EdgeId>,
}

/// A directed edge bordering the face to its left.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    pub source: VertexId,
    pub face: FaceId,
    /// Next edge counter-clockwise around the same face.
    pub next: EdgeId,
    /// The opposite half-edge of the neighbouring face, if the edge is a crease.
    pub twin: Option<EdgeId>,
}

/// A triangular facet, reached through one of its three sides.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub side: EdgeId,
}

/// Triangle mesh stored as a twinned half-edge structure.
///
/// Vertices, half-edges and faces live in flat arenas and refer to each other
/// by index. Twins are paired through a `(source, target)` lookup as faces are
/// added.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub edges: Vec<HalfEdge>,
    pub faces: Vec<Face>,
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from positions, optional per-vertex normals and
    /// counter-clockwise triangles.
    pub fn from_triangles(
        positions: &[Point3<f32>],
        normals: Option<&[Vector3<f32>]>,
        triangles: &[[u32; 3]],
    ) -> Result<Self, String> {
        if let Some(n) = normals
            && n.len() != positions.len()
        {
            return Err(format!(
                "Expected {} normals, got {}",
                positions.len(),
                n.len()
            ));
        }

        let mut mesh = Self::new();
        for (i, p) in positions.iter().enumerate() {
            let v = mesh.add_vertex(*p);
            if let Some(n) = normals {
                mesh.vertices[v].normal = Some(n[i]);
            }
        }
        for tri in triangles {
            mesh.add_face(tri[0] as usize, tri[1] as usize, tri[2] as usize)?;
        }
        mesh.set_first_edges();
        Ok(mesh)
    }

    pub fn add_vertex(&mut self, position: Point3<f32>) -> VertexId {
        self.vertices.push(MeshVertex {
            position,
            normal: None,
            edge: None,
        });
        self.vertices.len() - 1
    }

    /// Adds the face a-b-c and links its three half-edges to any existing twins.
    ///
    /// A directed edge that already exists means two faces disagree on
    /// orientation; that is logged and the newer edge takes over the lookup.
    /// Call `set_first_edges` once all faces are in.
    pub fn add_face(&mut self, a: VertexId, b: VertexId, c: VertexId) -> Result<FaceId, String> {
        let count = self.vertices.len();
        if a >= count || b >= count || c >= count {
            return Err(format!(
                "Face ({}, {}, {}) refers past the {} vertices",
                a, b, c, count
            ));
        }
        if a == b || b == c || c == a {
            return Err(format!("Face ({}, {}, {}) repeats a vertex", a, b, c));
        }

        let face = self.faces.len();
        let first = self.edges.len();
        self.faces.push(Face { side: first });

        for (i, (source, target)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
            let id = first + i;
            self.edges.push(HalfEdge {
                source,
                face,
                next: first + (i + 1) % 3,
                twin: None,
            });
            self.vertices[source].edge = Some(id);

            if self.edge_index.insert((source, target), id).is_some() {
                warn!(
                    "Bad orientation for face {}: edge {}->{} already used",
                    face, source, target
                );
            }
            if let Some(&twin) = self.edge_index.get(&(target, source)) {
                self.edges[id].twin = Some(twin);
                self.edges[twin].twin = Some(id);
            }
        }
        Ok(face)
    }

    /// Rewinds every vertex's out-edge to the first edge of its fan, so that
    /// fans around boundary vertices are walked completely. Vertices inside a
    /// closed fan keep whichever edge they have.
    pub fn set_first_edges(&mut self) {
        for v in 0..self.vertices.len() {
            let Some(start) = self.vertices[v].edge else {
                continue;
            };
            // A fan has fewer edges than the mesh; a longer walk means twins
            // that don't point back at each other.
            let mut e = start;
            let mut steps = 0;
            while let Some(twin) = self.edges[e].twin {
                let prev = self.edges[twin].next;
                steps += 1;
                if prev == start || steps > self.edges.len() {
                    e = start;
                    break;
                }
                e = prev;
            }
            self.vertices[v].edge = Some(e);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Target vertex of a half-edge.
    #[inline]
    pub fn target(&self, e: EdgeId) -> VertexId {
        self.edges[self.edges[e].next].source
    }

    /// The three half-edges bordering a face.
    pub fn face_edges(&self, f: FaceId) -> [EdgeId; 3] {
        let e0 = self.faces[f].side;
        let e1 = self.edges[e0].next;
        [e0, e1, self.edges[e1].next]
    }

    pub fn face_vertices(&self, f: FaceId) -> [VertexId; 3] {
        self.face_edges(f).map(|e| self.edges[e].source)
    }

    /// Out-going half-edges around a vertex, counter-clockwise.
    pub fn fan(&self, v: VertexId) -> Fan<'_> {
        let start = self.vertices[v].edge;
        Fan {
            mesh: self,
            start,
            which: start,
            remaining: self.edges.len(),
        }
    }

    /// True when the fan around `v` does not close into a cone.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        match self.fan(v).last() {
            Some(last) => {
                let incoming = self.edges[self.edges[last].next].next;
                self.edges[incoming].twin.is_none()
            }
            None => true,
        }
    }

    /// Face normal: cross product of the directions of its first two edges.
    /// Not normalised.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f32> {
        let [e0, e1, _] = self.face_edges(f);
        self.edge_direction(e0).cross(&self.edge_direction(e1))
    }

    fn edge_direction(&self, e: EdgeId) -> Vector3<f32> {
        let offset =
            self.vertices[self.target(e)].position - self.vertices[self.edges[e].source].position;
        offset.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Normal at a vertex: the stored one, or the unit sum of the normals of
    /// the faces around it.
    pub fn vertex_normal(&self, v: VertexId) -> Vector3<f32> {
        if let Some(n) = self.vertices[v].normal {
            return n;
        }
        let sum: Vector3<f32> = self
            .fan(v)
            .map(|e| self.face_normal(self.edges[e].face))
            .sum();
        sum.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    pub fn vertex_color(&self, _v: VertexId) -> Vector3<f32> {
        VERTEX_COLOR
    }

    /// Recenters and rescales the mesh into a canonical volume: x and z are
    /// centred on the bounding box, the lowest point sits at y = 0, and the
    /// farthest box corner ends up 1.4 away from the new origin.
    ///
    /// Returns the old reference point and the scale applied.
    pub fn rebox(&mut self) -> (Point3<f32>, f32) {
        if self.vertices.is_empty() {
            return (Point3::origin(), 1.0);
        }

        let mut min = Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut max = Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for v in &self.vertices {
            min = min.inf(&v.position);
            max = max.sup(&v.position);
        }

        let center = Point3::new((min.x + max.x) * 0.5, min.y, (min.z + max.z) * 0.5);
        let reach = (max - center).norm();
        let scale = if reach > 1e-6 { 1.4 / reach } else { 1.0 };

        for v in &mut self.vertices {
            v.position = Point3::from((v.position - center) * scale);
        }
        debug!("Reboxed mesh: center {:?}, scale {:.4}", center, scale);
        (center, scale)
    }

    /// Flattens the mesh into a triangle list ready for drawing: three
    /// vertices per face, each corner labelled with its barycentric axis.
    pub fn compile(&self) -> Vec<Vertex> {
        let normals: Vec<Vector3<f32>> = (0..self.vertices.len())
            .map(|v| self.vertex_normal(v))
            .collect();

        (0..self.faces.len())
            .flat_map(|f| {
                let corners = self.face_vertices(f);
                let normals = &normals;
                (0..3).map(move |i| {
                    let v = corners[i];
                    Vertex::new(
                        self.vertices[v].position,
                        normals[v],
                        self.vertex_color(v),
                        CORNER_LABELS[i],
                    )
                })
            })
            .collect()
    }
}

/// Iterator over the out-going half-edges of a vertex.
///
/// Stops at the end of an open fan or when it comes back to the first edge,
/// and after at most one visit per half-edge when twins are inconsistent.
pub struct Fan<'a> {
    mesh: &'a Mesh,
    start: Option<EdgeId>,
    which: Option<EdgeId>,
    remaining: usize,
}

impl Iterator for Fan<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        let current = self.which?;
        if self.remaining == 0 {
            warn!("Fan around edge {} does not close; stopping", current);
            self.which = None;
            return None;
        }
        self.remaining -= 1;
        let edges = &self.mesh.edges;
        let incoming = edges[edges[current].next].next;
        self.which = match edges[incoming].twin {
            Some(twin) if Some(twin) != self.start => Some(twin),
            _ => None,
        };
        Some(current)
    }
}
