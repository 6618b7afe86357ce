//! Loop subdivision.
//!
//! Every triangle is split into four by inserting a vertex on each edge; the
//! old and new vertices are then placed by Loop's weighted averages, so that
//! repeated refinement converges to a smooth limit surface.

use crate::scene::mesh::{EdgeId, Mesh, VertexId};
use log::{error, info};
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::f32::consts::PI;

/// Weight of the neighbour centroid for an interior vertex of valence `n`.
pub fn loop_beta(n: usize) -> f32 {
    let c = 3.0 / 8.0 + (2.0 * PI / n as f32).cos() / 4.0;
    5.0 / 8.0 - c * c
}

/// One round of Loop subdivision. The input is left untouched.
///
/// Vertex ids of the input are kept in the output (`0..n`); edge vertices are
/// appended after them. The refined mesh carries no explicit normals.
pub fn refine(mesh: &Mesh) -> Mesh {
    let mut refined = Mesh::new();

    for v in 0..mesh.vertex_count() {
        refined.add_vertex(smoothed_vertex(mesh, v));
    }

    // One new vertex per undirected edge.
    let mut edge_points: HashMap<(VertexId, VertexId), VertexId> = HashMap::new();
    for e in 0..mesh.edge_count() {
        let key = edge_key(mesh, e);
        if !edge_points.contains_key(&key) {
            let id = refined.add_vertex(edge_point(mesh, e));
            edge_points.insert(key, id);
        }
    }

    for f in 0..mesh.face_count() {
        let [a, b, c] = mesh.face_vertices(f);
        let [eab, ebc, eca] = mesh.face_edges(f).map(|e| edge_points[&edge_key(mesh, e)]);

        // Ids all come from `refined` itself and are distinct, so these cannot fail.
        for [x, y, z] in [[a, eab, eca], [b, ebc, eab], [c, eca, ebc], [eab, ebc, eca]] {
            if let Err(e) = refined.add_face(x, y, z) {
                error!("Skipping refined face: {}", e);
            }
        }
    }
    refined.set_first_edges();
    refined
}

/// Applies `levels` rounds of `refine`.
pub fn refine_n(mesh: &Mesh, levels: usize) -> Mesh {
    let mut current = mesh.clone();
    for level in 0..levels {
        current = refine(&current);
        info!(
            "Refinement level {}: {} vertices, {} faces",
            level + 1,
            current.vertex_count(),
            current.face_count()
        );
    }
    current
}

fn edge_key(mesh: &Mesh, e: EdgeId) -> (VertexId, VertexId) {
    let a = mesh.edges[e].source;
    let b = mesh.target(e);
    (a.min(b), a.max(b))
}

/// New position of an existing vertex.
fn smoothed_vertex(mesh: &Mesh, v: VertexId) -> Point3<f32> {
    let position = mesh.vertices[v].position;
    let fan: Vec<EdgeId> = mesh.fan(v).collect();
    let (Some(&first), Some(&last)) = (fan.first(), fan.last()) else {
        return position;
    };

    if mesh.is_boundary_vertex(v) {
        // Boundary: only the two neighbours along the boundary count.
        let ahead = mesh.vertices[mesh.target(first)].position;
        let behind_edge = mesh.edges[mesh.edges[last].next].next;
        let behind = mesh.vertices[mesh.edges[behind_edge].source].position;
        return Point3::from(
            position.coords * 0.75 + (ahead.coords + behind.coords) * 0.125,
        );
    }

    let n = fan.len();
    let centroid: Vector3<f32> = fan
        .iter()
        .map(|&e| mesh.vertices[mesh.target(e)].position.coords)
        .sum::<Vector3<f32>>()
        / n as f32;
    let beta = loop_beta(n);
    Point3::from(position.coords * (1.0 - beta) + centroid * beta)
}

/// Position of the vertex inserted on edge `e`.
fn edge_point(mesh: &Mesh, e: EdgeId) -> Point3<f32> {
    let edge = mesh.edges[e];
    let a = mesh.vertices[edge.source].position.coords;
    let b = mesh.vertices[mesh.target(e)].position.coords;

    match edge.twin {
        Some(twin) => {
            let opposite = |h: EdgeId| {
                let far = mesh.edges[mesh.edges[h].next].next;
                mesh.vertices[mesh.edges[far].source].position.coords
            };
            Point3::from((a + b) * 0.375 + (opposite(e) + opposite(twin)) * 0.125)
        }
        None => Point3::from((a + b) * 0.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh::tests::{misoriented, octahedron};
    use approx::assert_relative_eq;

    #[test]
    fn beta_matches_loops_original_weights() {
        // Valence 6 is the regular case: beta = 3/8.
        assert_relative_eq!(loop_beta(6), 0.375, epsilon = 1e-6);
        assert_relative_eq!(loop_beta(4), 31.0 / 64.0, epsilon = 1e-6);
    }

    #[test]
    fn closed_mesh_stays_closed() {
        let refined = refine(&octahedron());
        assert_eq!(refined.vertex_count(), 18);
        assert_eq!(refined.face_count(), 32);
        assert!(refined.edges.iter().all(|e| e.twin.is_some()));

        let undirected = refined.edge_count() / 2;
        let euler =
            refined.vertex_count() as i64 - undirected as i64 + refined.face_count() as i64;
        assert_eq!(euler, 2);
    }

    #[test]
    fn old_vertices_shrink_toward_their_neighbours() {
        let refined = refine(&octahedron());
        // Valence 4, neighbour centroid at the origin.
        assert_relative_eq!(
            refined.vertices[0].position,
            Point3::new(33.0 / 64.0, 0.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn interior_edge_points_use_the_opposite_corners() {
        let mesh = octahedron();
        let refined = refine(&mesh);
        // Edge +x/+y has +z and -z opposite, which cancel out.
        let expected = Point3::new(0.375, 0.375, 0.0);
        assert!(
            refined.vertices[6..]
                .iter()
                .any(|v| (v.position - expected).norm() < 1e-6)
        );
    }

    #[test]
    fn boundary_rules_apply_to_open_meshes() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(8.0, 0.0, 0.0),
            Point3::new(0.0, 8.0, 0.0),
        ];
        let mesh = Mesh::from_triangles(&positions, None, &[[0, 1, 2]]).unwrap();
        let refined = refine(&mesh);

        assert_eq!(refined.vertex_count(), 6);
        assert_eq!(refined.face_count(), 4);
        assert_relative_eq!(
            refined.vertices[0].position,
            Point3::new(1.0, 1.0, 0.0),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            refined.vertices[1].position,
            Point3::new(6.0, 1.0, 0.0),
            epsilon = 1e-6
        );
        let midpoints: Vec<_> = refined.vertices[3..].iter().map(|v| v.position).collect();
        assert!(midpoints.contains(&Point3::new(4.0, 0.0, 0.0)));
        assert!(midpoints.contains(&Point3::new(4.0, 4.0, 0.0)));
        assert!(midpoints.contains(&Point3::new(0.0, 4.0, 0.0)));
    }

    #[test]
    fn inconsistent_orientation_still_refines() {
        let refined = refine(&misoriented());
        assert_eq!(refined.face_count(), 12);
    }

    #[test]
    fn refine_n_repeats() {
        let twice = refine_n(&octahedron(), 2);
        assert_eq!(twice.face_count(), 128);
        assert_eq!(refine_n(&octahedron(), 0).face_count(), 8);
    }
}
