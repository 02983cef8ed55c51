use cgmath::Matrix4;

use crate::geometry::Vector3;
use crate::store::MeshStore;

/// Edge length of the viewing cube models are scaled to fit. The projection
/// spans [-50, 50] along its narrow axis, so a 60-unit model fills most of
/// the window while leaving a margin.
pub const TARGET_EXTENT: f32 = 60.0;

/// Axis-aligned bounds of a mesh plus the uniform scale that fits it into
/// the viewing cube. Recomputed on every (re)load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
    pub scale_factor: f32,
}

impl BoundingBox {
    /// The box used when there is nothing to measure: identity scale,
    /// min/max pinned to the origin.
    fn noop() -> Self {
        let zero = Vector3 {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        };
        Self {
            min: zero,
            max: zero,
            scale_factor: 1.0,
        }
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) / 2.0
    }

    /// The largest per-axis extent.
    pub fn range(&self) -> f32 {
        let d = self.max - self.min;
        d.x.max(d.y).max(d.z)
    }

    /// The model transform: scale uniformly by `scale_factor`, then
    /// recenter on the origin. The center is measured in original model
    /// units, so the translation is applied before the scale.
    pub fn transform(&self) -> Matrix4<f32> {
        let c = self.center();
        Matrix4::from_scale(self.scale_factor)
            * Matrix4::from_translation(Vector3 {
                x: -c.x,
                y: -c.y,
                z: -c.z,
            })
    }
}

/// Scans the vertex set once and derives the uniform scale factor.
///
/// A mesh with no vertices yields the no-op box. A degenerate mesh (all
/// vertices coincident, range of zero) keeps the default scale of 1.0 so we
/// never divide by zero.
pub fn compute_bounds(mesh: &MeshStore) -> BoundingBox {
    let mut vertices = mesh.vertices().iter();
    let Some(first) = vertices.next() else {
        return BoundingBox::noop();
    };

    let mut bounds = BoundingBox {
        min: *first,
        max: *first,
        scale_factor: 1.0,
    };
    for v in vertices {
        bounds.min.x = bounds.min.x.min(v.x);
        bounds.min.y = bounds.min.y.min(v.y);
        bounds.min.z = bounds.min.z.min(v.z);
        bounds.max.x = bounds.max.x.max(v.x);
        bounds.max.y = bounds.max.y.max(v.y);
        bounds.max.z = bounds.max.z.max(v.z);
    }

    let range = bounds.range();
    if range > 0.0 {
        bounds.scale_factor = TARGET_EXTENT / range;
    }
    bounds
}
