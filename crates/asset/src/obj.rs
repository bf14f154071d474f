//! Wavefront OBJ subset loader: positions, texture coordinates, normals,
//! triangle and quad faces.
//!
//! Every face corner becomes its own vertex in the output. Corners are not
//! deduplicated even when they reference the same `p/t/n` triple, so the
//! index buffer is always `0..n` in file order.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use thiserror::Error;

use crate::mesh::{MeshData, MeshVertex};

/// Errors produced by the OBJ loader.
///
/// `Read` keeps "failed load" distinct from a successfully loaded empty
/// mesh. The malformed variants carry the source name, 1-based line number
/// and the offending line text.
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to read `{name}`: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed `{directive}` directive at {name}:{line_no}: `{line}`")]
    MalformedDirective {
        name: String,
        line_no: usize,
        directive: &'static str,
        line: String,
    },
    #[error("malformed face at {name}:{line_no}: `{line}` ({reason})")]
    MalformedFace {
        name: String,
        line_no: usize,
        line: String,
        reason: String,
    },
    #[error("`{name}` holds more vertices than a u32 index can address")]
    TooManyVertices { name: String },
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData, ObjError> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let file = File::open(path).map_err(|source| ObjError::Read {
        name: name.clone(),
        source,
    })?;
    let mesh = parse_obj(BufReader::new(file), &name)?;
    log::info!(
        "Loaded OBJ `{}`: {} vertices, {} indices, {} triangles",
        name,
        mesh.vertices.len(),
        mesh.indices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshData, ObjError> {
    parse_obj(reader, "<reader>")
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData, ObjError> {
    parse_obj(io::Cursor::new(contents), "<inline>")
}

/// Current line being parsed, for error reporting.
struct Line<'a> {
    name: &'a str,
    line_no: usize,
    text: &'a str,
}

impl Line<'_> {
    fn malformed_directive(&self, directive: &'static str) -> ObjError {
        ObjError::MalformedDirective {
            name: self.name.to_owned(),
            line_no: self.line_no,
            directive,
            line: self.text.to_owned(),
        }
    }

    fn malformed_face(&self, reason: String) -> ObjError {
        ObjError::MalformedFace {
            name: self.name.to_owned(),
            line_no: self.line_no,
            line: self.text.to_owned(),
            reason,
        }
    }
}

fn parse_obj<R: BufRead>(reader: R, name: &str) -> Result<MeshData, ObjError> {
    // Attribute tables, 1-based in the file, 0-based here. They live only
    // for the duration of the parse; the output copies everything.
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ObjError::Read {
            name: name.to_owned(),
            source,
        })?;
        let ctx = Line {
            name,
            line_no: idx + 1,
            text: line.trim(),
        };

        let mut fields = ctx.text.split_whitespace();
        let Some(tag) = fields.next() else { continue };

        match tag {
            "v" => {
                let x = parse_f32(fields.next(), &ctx, "v")?;
                let y = parse_f32(fields.next(), &ctx, "v")?;
                let z = parse_f32(fields.next(), &ctx, "v")?;
                positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(fields.next(), &ctx, "vt")?;
                let v = parse_f32(fields.next(), &ctx, "vt")?;
                texcoords.push([u, v]);
            }
            "vn" => {
                let nx = parse_f32(fields.next(), &ctx, "vn")?;
                let ny = parse_f32(fields.next(), &ctx, "vn")?;
                let nz = parse_f32(fields.next(), &ctx, "vn")?;
                normals.push([nx, ny, nz]);
            }
            "f" => {
                let tokens: Vec<&str> = fields.collect();
                match tokens.len() {
                    // Triangle: three fresh vertices in declaration order.
                    3 => {
                        for token in &tokens {
                            let corner =
                                resolve_corner(token, &positions, &texcoords, &normals, &ctx)?;
                            push_corner(&mut vertices, &mut indices, corner, &ctx)?;
                        }
                    }
                    // Quad: fixed fan (0,1,2) + (0,2,3), six fresh vertices
                    // with no sharing between the two triangles.
                    4 => {
                        let mut corners = [MeshVertex::default(); 4];
                        for (slot, token) in corners.iter_mut().zip(&tokens) {
                            *slot = resolve_corner(token, &positions, &texcoords, &normals, &ctx)?;
                        }
                        for i in [0, 1, 2, 0, 2, 3] {
                            push_corner(&mut vertices, &mut indices, corners[i], &ctx)?;
                        }
                    }
                    // Only triangles and quads are supported. Other faces
                    // contribute no triangles; their tokens stay unresolved.
                    n => {
                        log::debug!("{}:{}: skipping face with {} vertices", name, ctx.line_no, n);
                    }
                }
            }
            // o/g/s/usemtl/mtllib/comments: ignored.
            _ => {}
        }
    }

    Ok(MeshData::new(vertices, indices))
}

fn parse_f32(field: Option<&str>, ctx: &Line<'_>, directive: &'static str) -> Result<f32, ObjError> {
    field
        .and_then(|t| t.parse::<f32>().ok())
        .ok_or_else(|| ctx.malformed_directive(directive))
}

/// Resolve one `p[/t[/n]]` face token into a vertex.
///
/// The position field is mandatory and fully checked. The optional fields
/// must parse as integers when present, but an index outside the table
/// declared so far silently keeps the default attribute value.
fn resolve_corner(
    token: &str,
    positions: &[[f32; 3]],
    texcoords: &[[f32; 2]],
    normals: &[[f32; 3]],
    ctx: &Line<'_>,
) -> Result<MeshVertex, ObjError> {
    let mut fields = token.split('/');

    let pos_field = fields.next().unwrap_or("");
    let pos_no = pos_field.parse::<usize>().map_err(|_| {
        ctx.malformed_face(format!("invalid position index `{pos_field}` in `{token}`"))
    })?;
    let position = pos_no
        .checked_sub(1)
        .and_then(|i| positions.get(i))
        .copied()
        .ok_or_else(|| {
            ctx.malformed_face(format!(
                "position index {pos_no} out of range ({} declared)",
                positions.len()
            ))
        })?;

    let uv = match optional_index(fields.next(), ctx, token)? {
        Some(i) => texcoords.get(i).copied().unwrap_or([0.0, 0.0]),
        None => [0.0, 0.0],
    };
    let normal = match optional_index(fields.next(), ctx, token)? {
        Some(i) => normals.get(i).copied().unwrap_or([0.0; 3]),
        None => [0.0; 3],
    };

    Ok(MeshVertex::new(position, uv, normal))
}

/// Parse an optional `t`/`n` index field to 0-based. A 1-based index of 0
/// maps to `None`, which the caller treats like any other out-of-range
/// index: keep the default.
fn optional_index(
    field: Option<&str>,
    ctx: &Line<'_>,
    token: &str,
) -> Result<Option<usize>, ObjError> {
    match field {
        Some(s) if !s.is_empty() => {
            let no = s.parse::<usize>().map_err(|_| {
                ctx.malformed_face(format!("invalid attribute index `{s}` in `{token}`"))
            })?;
            Ok(no.checked_sub(1))
        }
        _ => Ok(None),
    }
}

fn push_corner(
    vertices: &mut Vec<MeshVertex>,
    indices: &mut Vec<u32>,
    corner: MeshVertex,
    ctx: &Line<'_>,
) -> Result<(), ObjError> {
    let index = u32::try_from(vertices.len()).map_err(|_| ObjError::TooManyVertices {
        name: ctx.name.to_owned(),
    })?;
    vertices.push(corner);
    indices.push(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_triangle() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
f 1 2 3
";
        let mesh = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].position, [1.0, 1.0, 0.0]);
        for v in &mesh.vertices {
            assert_eq!(v.uv, [0.0, 0.0]);
            assert_eq!(v.normal, [0.0, 0.0, 0.0]);
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn quad_fans_into_two_triangles() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let mesh = load_obj_from_str(src).expect("parse quad");
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        let p: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.position).collect();
        // (v1, v2, v3) then (v1, v3, v4)
        assert_eq!(p[0], [0.0, 0.0, 0.0]);
        assert_eq!(p[1], [1.0, 0.0, 0.0]);
        assert_eq!(p[2], [1.0, 1.0, 0.0]);
        assert_eq!(p[3], [0.0, 0.0, 0.0]);
        assert_eq!(p[4], [1.0, 1.0, 0.0]);
        assert_eq!(p[5], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn full_token_round_trip() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.25 0.75
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
";
        let mesh = load_obj_from_str(src).expect("parse");
        for v in &mesh.vertices {
            assert_eq!(v.uv, [0.25, 0.75]);
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn empty_texture_field_keeps_default() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 1 0
f 1//1 2//1 3//1
";
        let mesh = load_obj_from_str(src).expect("parse");
        for v in &mesh.vertices {
            assert_eq!(v.uv, [0.0, 0.0]);
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn out_of_range_optional_indices_default() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5 0.5
f 1/9 2/9/7 3/1
";
        let mesh = load_obj_from_str(src).expect("out-of-range vt/vn is not an error");
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices[1].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices[1].normal, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [0.5, 0.5]);
    }

    #[test]
    fn zero_optional_index_defaults() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5 0.5
f 1/0 2/0 3/0
";
        let mesh = load_obj_from_str(src).expect("parse");
        for v in &mesh.vertices {
            assert_eq!(v.uv, [0.0, 0.0]);
        }
    }

    #[test]
    fn unsupported_arity_is_skipped() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
f 1 2
f 1 2 3 1 2
f 1 2 3
";
        let mesh = load_obj_from_str(src).expect("load completes");
        // only the triangle contributed
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn skipped_face_tokens_are_not_resolved() {
        // arity check happens before index resolution, so a degenerate face
        // with wild indices is still non-fatal
        let src = "\
v 0 0 0
f 99 98
";
        let mesh = load_obj_from_str(src).expect("load completes");
        assert!(mesh.is_empty());
    }

    #[test]
    fn out_of_range_position_is_fatal() {
        let src = "\
v 0 0 0
v 1 0 0
f 1 2 99
";
        let err = load_obj_from_str(src).unwrap_err();
        match err {
            ObjError::MalformedFace { line_no, .. } => assert_eq!(line_no, 3),
            other => panic!("expected MalformedFace, got {other:?}"),
        }
    }

    #[test]
    fn zero_position_index_is_fatal() {
        let src = "\
v 0 0 0
f 0 1 1
";
        assert!(matches!(
            load_obj_from_str(src),
            Err(ObjError::MalformedFace { .. })
        ));
    }

    #[test]
    fn negative_position_index_is_fatal() {
        // relative OBJ indices are out of the supported subset
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f -1 -2 -3
";
        assert!(matches!(
            load_obj_from_str(src),
            Err(ObjError::MalformedFace { .. })
        ));
    }

    #[test]
    fn missing_position_field_is_fatal() {
        let src = "\
v 0 0 0
vt 0 0
f /1 1/1 1/1
";
        assert!(matches!(
            load_obj_from_str(src),
            Err(ObjError::MalformedFace { .. })
        ));
    }

    #[test]
    fn invalid_optional_index_is_fatal() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1/x 2 3
";
        assert!(matches!(
            load_obj_from_str(src),
            Err(ObjError::MalformedFace { .. })
        ));
    }

    #[test]
    fn malformed_position_directive_is_fatal() {
        let src = "v 1.0 nope 0.0\n";
        match load_obj_from_str(src) {
            Err(ObjError::MalformedDirective {
                directive, line_no, ..
            }) => {
                assert_eq!(directive, "v");
                assert_eq!(line_no, 1);
            }
            other => panic!("expected MalformedDirective, got {other:?}"),
        }
    }

    #[test]
    fn corners_are_never_shared() {
        // two triangles referencing the same attribute triples still get
        // six distinct vertices
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
f 1 2 3
";
        let mesh = load_obj_from_str(src).expect("parse");
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.vertices[0], mesh.vertices[3]);
    }

    #[test]
    fn unrecognized_directives_are_ignored() {
        let src = "\
# a comment
mtllib scene.mtl
o thing
g group1
usemtl wood
s off
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let mesh = load_obj_from_str(src).expect("parse");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn crlf_input_parses() {
        let src = "v 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nf 1 2 3\r\n";
        let mesh = load_obj_from_str(src).expect("parse");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_input_is_empty_mesh() {
        let mesh = load_obj_from_str("").expect("empty input is no geometry, not an error");
        assert!(mesh.is_empty());
        assert!(mesh.is_valid());
    }

    #[test]
    fn loading_twice_is_identical() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1 4/1/1
";
        let a = load_obj_from_str(src).expect("first load");
        let b = load_obj_from_str(src).expect("second load");
        assert_eq!(a, b);
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = load_obj_from_path("definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, ObjError::Read { .. }));
    }

    #[test]
    fn indices_continue_across_faces() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
f 1 2 3
f 1 2 3 4
";
        let mesh = load_obj_from_str(src).expect("parse");
        assert_eq!(mesh.vertices.len(), 9);
        assert_eq!(mesh.indices, (0..9).collect::<Vec<u32>>());
        assert_eq!(mesh.triangle_count(), 3);
    }
}
