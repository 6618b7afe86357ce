use crate::scene::mesh::{Mesh, VertexId};
use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Loads an OBJ file into a half-edge mesh and reboxes it.
///
/// Polygons are split into fans around their first corner. There is one mesh
/// vertex per `v` record, in file order, shared by every group and object that
/// refers to it. The k-th `vn` record becomes the normal of the k-th vertex
/// when the counts agree; face normal indices are not consulted.
pub fn load_obj(path: &str) -> Result<Mesh, String> {
    let path_obj = Path::new(path);
    if !path_obj.exists() {
        return Err(format!("File not found: {}", path));
    }

    info!("Loading OBJ file: {}", path);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ..Default::default()
    };

    // Materials are not used: every vertex gets the same color.
    let (models, _materials) = tobj::load_obj(path_obj, &load_options)
        .map_err(|e| format!("Failed to load OBJ: {}", e))?;

    let text = fs::read_to_string(path_obj)
        .map_err(|e| format!("Failed to read OBJ file: {}", e))?;
    let (positions, normals) = vertex_records(&text);

    let mut mesh = Mesh::new();
    let mut welded: HashMap<[u32; 3], VertexId> = HashMap::with_capacity(positions.len());
    for p in &positions {
        let v = mesh.add_vertex(*p);
        welded.entry(position_key(p)).or_insert(v);
    }

    if normals.len() == positions.len() {
        for (vertex, n) in mesh.vertices.iter_mut().zip(&normals) {
            vertex.normal = n.try_normalize(f32::EPSILON);
        }
    } else if !normals.is_empty() {
        warn!(
            "{} normals for {} vertices; deriving them from faces",
            normals.len(),
            positions.len()
        );
    }

    for model in &models {
        let data = &model.mesh;

        // tobj numbers positions per model; map them back onto the file's vertices.
        let local: Vec<VertexId> = data
            .positions
            .chunks_exact(3)
            .map(|c| {
                let p = Point3::new(c[0], c[1], c[2]);
                *welded
                    .entry(position_key(&p))
                    .or_insert_with(|| mesh.add_vertex(p))
            })
            .collect();
        debug!("Model '{}': {} corners welded", model.name, local.len());

        for tri in data.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| local[i as usize]);
            mesh.add_face(a, b, c)
                .map_err(|e| format!("Bad face in '{}': {}", model.name, e))?;
        }
    }

    if mesh.face_count() == 0 {
        return Err(format!("No faces found in {}", path));
    }

    mesh.set_first_edges();
    mesh.rebox();

    info!(
        "OBJ loaded successfully. Vertices: {}, Faces: {}",
        mesh.vertex_count(),
        mesh.face_count()
    );

    Ok(mesh)
}

fn position_key(p: &Point3<f32>) -> [u32; 3] {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

/// `v` and `vn` records in file order. Faces and everything else are left
/// to tobj.
fn vertex_records(text: &str) -> (Vec<Point3<f32>>, Vec<Vector3<f32>>) {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let tag = parts.next();
        if tag != Some("v") && tag != Some("vn") {
            continue;
        }
        let coords: Vec<f32> = parts.take(3).filter_map(|t| t.parse().ok()).collect();
        let &[x, y, z] = coords.as_slice() else {
            warn!("Skipping malformed record: {}", line);
            continue;
        };
        match tag {
            Some("v") => positions.push(Point3::new(x, y, z)),
            _ => normals.push(Vector3::new(x, y, z)),
        }
    }
    (positions, normals)
}
