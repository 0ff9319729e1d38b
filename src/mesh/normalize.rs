use crate::mesh::types::{Bounds, MeshTransform, TriangleMesh};

/// Recenters `mesh` on the origin and rescales it so its largest bounding
/// dimension equals `reference_size`.
///
/// A mesh whose bounding box has zero extent is only recentered and is
/// flagged as degenerate. An empty mesh is left as it is.
pub fn normalize(mesh: &mut TriangleMesh, reference_size: f32) {
    let Some(bounds) = Bounds::from_points(&mesh.positions) else {
        mesh.transform = MeshTransform::default();
        mesh.degenerate = false;
        return;
    };

    // f32 extents near f32::MAX overflow, so the box is measured in f64
    let min = bounds.min.as_dvec3();
    let max = bounds.max.as_dvec3();
    let center = (min + max) * 0.5;
    let max_dim = (max - min).max_element();

    let degenerate = !(max_dim > 0.0);
    let scale = if degenerate {
        1.0
    } else {
        f64::from(reference_size) / max_dim
    };
    // scaling about the origin after the shift keeps the box centered
    for p in &mut mesh.positions {
        *p = ((p.as_dvec3() - center) * scale).as_vec3();
    }

    mesh.raw_bounds = Some(bounds);
    mesh.transform = MeshTransform {
        translation: (-center).as_vec3(),
        scale: scale as f32,
    };
    mesh.degenerate = degenerate;

    if degenerate {
        log::warn!("mesh bounding box has zero extent, skipping rescale");
    }
}
