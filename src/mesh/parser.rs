//! Reader for the `v`/`f` subset of Wavefront OBJ.
//!
//! Only vertex positions and faces are interpreted. Faces may have three or
//! four corners; quads are split along the first-to-third diagonal. Index
//! validation is deferred until the whole file has been read, since a face
//! is allowed to reference a vertex declared further down.

use glam::Vec3;

use crate::error::{ViewerError, ViewerResult};
use crate::mesh::types::TriangleMesh;

struct FaceRecord {
    line: usize,
    refs: [i64; 3],
}

pub fn parse_obj(source: &str) -> ViewerResult<TriangleMesh> {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut faces: Vec<FaceRecord> = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("v") => vertices.push(parse_vertex(line_no, fields)?),
            Some("f") => {
                let refs = fields
                    .map(|field| parse_face_ref(line_no, field))
                    .collect::<ViewerResult<Vec<i64>>>()?;

                match refs[..] {
                    [a, b, c] => faces.push(FaceRecord {
                        line: line_no,
                        refs: [a, b, c],
                    }),
                    [a, b, c, d] => {
                        faces.push(FaceRecord {
                            line: line_no,
                            refs: [a, b, c],
                        });
                        faces.push(FaceRecord {
                            line: line_no,
                            refs: [a, c, d],
                        });
                    }
                    _ => {
                        return Err(ViewerError::parse(
                            line_no,
                            format!(
                                "faces must have 3 or 4 vertices, found {}",
                                refs.len()
                            ),
                        ));
                    }
                }
            }
            // vn, vt, o, g, s, usemtl, mtllib and friends carry nothing we draw.
            _ => {}
        }
    }

    let mut positions = Vec::with_capacity(faces.len() * 3);
    for face in &faces {
        for &index in &face.refs {
            positions.push(resolve(face.line, index, &vertices)?);
        }
    }

    log::debug!(
        "parsed {} vertices into {} triangles",
        vertices.len(),
        faces.len()
    );

    Ok(TriangleMesh::from_positions(positions))
}

fn parse_vertex<'a>(line: usize, mut fields: impl Iterator<Item = &'a str>) -> ViewerResult<Vec3> {
    let mut coords = [0.0f32; 3];
    for (axis, slot) in coords.iter_mut().enumerate() {
        let field = fields.next().ok_or_else(|| {
            ViewerError::parse(line, format!("expected 3 coordinates, found {}", axis))
        })?;
        let value: f32 = field
            .parse()
            .map_err(|_| ViewerError::parse(line, format!("'{}' is not a number", field)))?;
        if !value.is_finite() {
            return Err(ViewerError::parse(
                line,
                format!("'{}' is not a finite coordinate", field),
            ));
        }
        *slot = value;
    }
    Ok(Vec3::from_array(coords))
}

fn parse_face_ref(line: usize, field: &str) -> ViewerResult<i64> {
    let position = field.split('/').next().unwrap_or(field);
    position.parse().map_err(|_| {
        ViewerError::parse(line, format!("'{}' is not a vertex index", field))
    })
}

fn resolve(line: usize, index: i64, vertices: &[Vec3]) -> ViewerResult<Vec3> {
    let out_of_range = || ViewerError::IndexOutOfRange {
        line,
        index,
        vertex_count: vertices.len(),
    };
    let slot = usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .ok_or_else(out_of_range)?;
    vertices.get(slot).copied().ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn comments_and_blank_lines_give_an_empty_mesh() {
        let mesh = parse_obj("# exported by hand\n\n   \n# nothing else\n").unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.raw_bounds.is_none());

        assert!(parse_obj("").unwrap().is_empty());
    }

    #[test]
    fn single_triangle_keeps_corner_order() {
        let mesh = parse_obj(UNIT_TRIANGLE).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(
            mesh.positions,
            vec![Vec3::ZERO, Vec3::X, Vec3::Y]
        );
        assert_eq!(mesh.normals, vec![Vec3::Z; 3]);
    }

    #[test]
    fn reversed_winding_flips_the_normal() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 3 2 1\n").unwrap();
        assert_eq!(mesh.positions, vec![Vec3::Y, Vec3::X, Vec3::ZERO]);
        assert_eq!(mesh.normals, vec![Vec3::NEG_Z; 3]);
    }

    #[test]
    fn quads_split_along_the_first_diagonal() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(mesh.triangle_count(), 2);

        let (v1, v2, v3, v4) = (Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y);
        assert_eq!(mesh.positions[..3], [v1, v2, v3]);
        assert_eq!(mesh.positions[3..], [v1, v3, v4]);
        // both halves face the same way
        assert_eq!(mesh.normals, vec![Vec3::Z; 6]);
    }

    #[test]
    fn secondary_attributes_after_slashes_are_ignored() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2//1 3/1\n";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(mesh.positions, vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
    }

    #[test]
    fn faces_may_precede_their_vertices() {
        let mesh = parse_obj("f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn out_of_range_index_fails_wherever_the_face_sits() {
        let verts = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\n";
        for src in [
            format!("{verts}f 1 2 5\n"),
            format!("f 1 2 5\n{verts}"),
            format!("v 0 0 0\nf 1 2 5\nv 1 0 0\nv 0 1 0\nv 1 1 0\n"),
        ] {
            match parse_obj(&src) {
                Err(ViewerError::IndexOutOfRange {
                    index,
                    vertex_count,
                    ..
                }) => {
                    assert_eq!(index, 5);
                    assert_eq!(vertex_count, 4);
                }
                other => panic!("expected IndexOutOfRange, got {:?}", other),
            }
        }
    }

    #[test]
    fn zero_and_negative_indices_are_out_of_range() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, ViewerError::IndexOutOfRange { index: 0, line: 4, .. }));

        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -1 -2 -3\n").unwrap_err();
        assert!(matches!(err, ViewerError::IndexOutOfRange { index: -1, .. }));
    }

    #[test]
    fn short_or_non_numeric_vertices_report_their_line() {
        let err = parse_obj("v 0 0 0\n\nv 1 2\n").unwrap_err();
        assert!(matches!(err, ViewerError::Parse { line: 3, .. }));

        let err = parse_obj("# header\nv 1 two 3\n").unwrap_err();
        assert!(matches!(err, ViewerError::Parse { line: 2, .. }));

        let err = parse_obj("v 1 nan 3\n").unwrap_err();
        assert!(matches!(err, ViewerError::Parse { line: 1, .. }));
    }

    #[test]
    fn unsupported_face_sizes_are_rejected() {
        let verts = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 2 0\n";
        let err = parse_obj(&format!("{verts}f 1 2 3 4 5\n")).unwrap_err();
        assert!(matches!(err, ViewerError::Parse { line: 6, .. }));

        let err = parse_obj(&format!("{verts}f 1 2\n")).unwrap_err();
        assert!(matches!(err, ViewerError::Parse { line: 6, .. }));

        let err = parse_obj(&format!("{verts}f 1 x 3\n")).unwrap_err();
        assert!(matches!(err, ViewerError::Parse { line: 6, .. }));
    }

    #[test]
    fn extra_vertex_fields_and_other_records_are_tolerated() {
        let src = "mtllib scene.mtl\no thing\nv 0 0 0 1.0\nv 1 0 0 0.5 0.5 0.5\nv 0 1 0\ns off\nusemtl red\nf 1 2 3\n";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn crlf_line_endings_parse() {
        let mesh = parse_obj("v 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nf 1 2 3\r\n").unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }
}
