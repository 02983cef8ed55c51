use objview_mesh::MeshStore;

const PLACEHOLDER_OBJ: &[u8] = include_bytes!("../res/placeholder.obj");

/// Normal used for corners before any face supplies one.
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// One corner of a triangle as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl ModelVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Flattens the indexed faces into a triangle-list vertex buffer.
///
/// Face indices were never validated at parse time, so this is where the
/// bounds checks happen. An out-of-range vertex index drops just that
/// corner, and an out-of-range normal index leaves the current normal in
/// effect: the most recent normal sticks until replaced, in the
/// immediate-mode tradition.
pub fn flatten_mesh(mesh: &MeshStore) -> Vec<ModelVertex> {
    let mut data = Vec::with_capacity(mesh.face_count() * 3);
    let mut current_normal = DEFAULT_NORMAL;
    for face in mesh.faces() {
        for corner in 0..3 {
            if let Some(normals) = face.normals {
                if let Some(n) = mesh.normals().get(normals[corner] as usize) {
                    current_normal = [n.x, n.y, n.z];
                }
            }
            if let Some(v) = mesh.vertices().get(face.vertices[corner] as usize) {
                data.push(ModelVertex {
                    position: [v.x, v.y, v.z],
                    normal: current_normal,
                });
            }
        }
    }
    data
}

/// The model drawn when nothing is loaded.
pub fn placeholder_model() -> MeshStore {
    objview_obj::parse_obj(PLACEHOLDER_OBJ).expect("embedded placeholder model parses")
}

#[cfg(test)]
mod tests {
    use super::*;
    use objview_mesh::{Face, Vector3};

    fn v(x: f32, y: f32, z: f32) -> Vector3 {
        Vector3 { x, y, z }
    }

    #[test]
    fn flatten_resolves_positions_and_normals() {
        let mut mesh = MeshStore::new();
        mesh.push_vertex(v(0.0, 0.0, 0.0));
        mesh.push_vertex(v(1.0, 0.0, 0.0));
        mesh.push_vertex(v(0.0, 1.0, 0.0));
        mesh.push_normal(v(0.0, 1.0, 0.0));
        mesh.push_face(Face {
            vertices: [0, 1, 2],
            normals: Some([0, 0, 0]),
        });

        let data = flatten_mesh(&mesh);
        assert_eq!(3, data.len());
        assert_eq!([1.0, 0.0, 0.0], data[1].position);
        assert!(data.iter().all(|c| c.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn out_of_range_vertex_skips_only_that_corner() {
        let mut mesh = MeshStore::new();
        mesh.push_vertex(v(0.0, 0.0, 0.0));
        mesh.push_vertex(v(1.0, 0.0, 0.0));
        mesh.push_face(Face {
            vertices: [0, 9, 1],
            normals: None,
        });

        let data = flatten_mesh(&mesh);
        assert_eq!(2, data.len());
        assert_eq!([0.0, 0.0, 0.0], data[0].position);
        assert_eq!([1.0, 0.0, 0.0], data[1].position);
    }

    #[test]
    fn missing_normals_fall_back_to_most_recent() {
        let mut mesh = MeshStore::new();
        for i in 0..3 {
            mesh.push_vertex(v(i as f32, 0.0, 0.0));
        }
        mesh.push_normal(v(1.0, 0.0, 0.0));
        // First face has no normals, second face names one, third face
        // points past the normal list.
        mesh.push_face(Face {
            vertices: [0, 1, 2],
            normals: None,
        });
        mesh.push_face(Face {
            vertices: [0, 1, 2],
            normals: Some([0, 0, 0]),
        });
        mesh.push_face(Face {
            vertices: [0, 1, 2],
            normals: Some([7, 7, 7]),
        });

        let data = flatten_mesh(&mesh);
        assert_eq!(9, data.len());
        assert!(data[..3].iter().all(|c| c.normal == DEFAULT_NORMAL));
        assert!(data[3..].iter().all(|c| c.normal == [1.0, 0.0, 0.0]));
    }

    #[test]
    fn flatten_cube_fixture() {
        let mesh = objview_obj::parse_obj(objview_test_data::OBJ_CUBE.bytes).unwrap();
        let data = flatten_mesh(&mesh);
        // Every index in the fixture resolves, so no corner is dropped.
        assert_eq!(mesh.face_count() * 3, data.len());
    }

    #[test]
    fn placeholder_is_drawable() {
        let mesh = placeholder_model();
        assert!(!mesh.is_empty());
        let data = flatten_mesh(&mesh);
        assert_eq!(mesh.face_count() * 3, data.len());
    }
}
