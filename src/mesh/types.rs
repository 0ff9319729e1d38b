use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Returns `None` for an empty point set.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        self.min * 0.5 + self.max * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_dim(&self) -> f32 {
        self.size().max_element()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshTransform {
    pub translation: Vec3,
    pub scale: f32,
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

/// A non-indexed triangle soup: every three consecutive positions form one
/// triangle, and every position carries the normal of its own triangle.
#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,

    pub raw_bounds: Option<Bounds>,
    pub transform: MeshTransform,
    pub degenerate: bool,
}

impl TriangleMesh {
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        debug_assert_eq!(positions.len() % 3, 0);
        let normals = compute_flat_normals(&positions);
        let raw_bounds = Bounds::from_points(&positions);
        Self {
            positions,
            normals,
            raw_bounds,
            transform: MeshTransform::default(),
            degenerate: false,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Bounding box of the positions as they are now, after any transform.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.positions)
    }
}

/// Per-position normals over a non-indexed buffer. Shared corners are never
/// averaged because nothing is shared, so shading comes out flat.
pub fn compute_flat_normals(positions: &[Vec3]) -> Vec<Vec3> {
    let mut normals = Vec::with_capacity(positions.len());
    for tri in positions.chunks_exact(3) {
        let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
        normals.extend_from_slice(&[n, n, n]);
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_every_point() {
        let bounds = Bounds::from_points(&[
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-3.0, 4.0, 0.0),
            Vec3::new(0.0, 0.0, 2.5),
        ])
        .unwrap();
        assert_eq!(bounds.min, Vec3::new(-3.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 4.0, 2.5));
        assert_eq!(bounds.center(), Vec3::new(-1.0, 1.0, 1.25));
        assert_eq!(bounds.max_dim(), 6.0);
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn center_of_a_huge_box_stays_finite() {
        let bounds = Bounds {
            min: Vec3::new(3.0e38, -3.0e38, 0.0),
            max: Vec3::new(3.4e38, 3.0e38, 0.0),
        };
        let center = bounds.center();
        assert!(center.is_finite());
        assert_eq!(center.y, 0.0);
        assert!(center.x > 3.0e38 && center.x < 3.4e38);
    }

    #[test]
    fn collapsed_triangles_get_zero_normals() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!(compute_flat_normals(&[p, p, p]), vec![Vec3::ZERO; 3]);
    }
}
