use crate::geometry::{Face, Vector3};

// Starting allocation for each sequence; growth past this is the usual
// amortized doubling of Vec.
const INITIAL_CAPACITY: usize = 100;

/// Owns all geometry of one loaded model.
///
/// The store is the single owner of the vertex, normal, and face sequences;
/// a reload fully replaces its contents. There is exactly one execution
/// context, so no synchronization is needed: a reload completes (including
/// bounds recomputation) before the render path reads the store again.
#[derive(Debug)]
pub struct MeshStore {
    vertices: Vec<Vector3>,
    normals: Vec<Vector3>,
    faces: Vec<Face>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(INITIAL_CAPACITY),
            normals: Vec::with_capacity(INITIAL_CAPACITY),
            faces: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Drops all vertices, normals, and faces. Idempotent.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.faces.clear();
    }

    pub fn push_vertex(&mut self, v: Vector3) {
        self.vertices.push(v);
    }

    pub fn push_normal(&mut self, n: Vector3) {
        self.normals.push(n);
    }

    pub fn push_face(&mut self, f: Face) {
        self.faces.push(f);
    }

    pub fn vertices(&self) -> &[Vector3] {
        self.vertices.as_slice()
    }

    pub fn normals(&self) -> &[Vector3] {
        self.normals.as_slice()
    }

    pub fn faces(&self) -> &[Face] {
        self.faces.as_slice()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True when there are no faces to draw, in which case the viewer falls
    /// back to its placeholder model.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl Default for MeshStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> MeshStore {
        let mut mesh = MeshStore::new();
        mesh.push_vertex(Vector3 {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        });
        mesh.push_vertex(Vector3 {
            x: 1.0,
            y: 0.0,
            z: 0.0,
        });
        mesh.push_vertex(Vector3 {
            x: 0.0,
            y: 1.0,
            z: 0.0,
        });
        mesh.push_normal(Vector3 {
            x: 0.0,
            y: 0.0,
            z: 1.0,
        });
        mesh.push_face(Face {
            vertices: [0, 1, 2],
            normals: Some([0, 0, 0]),
        });
        mesh
    }

    #[test]
    fn counts_track_appends() {
        let mesh = sample_store();
        assert_eq!(3, mesh.vertex_count());
        assert_eq!(1, mesh.normal_count());
        assert_eq!(1, mesh.face_count());
        assert!(!mesh.is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut mesh = sample_store();
        mesh.clear();
        assert_eq!(0, mesh.vertex_count());
        assert_eq!(0, mesh.normal_count());
        assert_eq!(0, mesh.face_count());
        assert!(mesh.is_empty());

        // A second clear leaves the store in the same empty state.
        mesh.clear();
        assert_eq!(0, mesh.vertex_count());
        assert_eq!(0, mesh.normal_count());
        assert_eq!(0, mesh.face_count());
    }
}
