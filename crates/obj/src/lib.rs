use std::io::{BufRead, BufReader};
use std::path::Path;

use objview_mesh::{Face, MeshStore, Vector3};

// The four face-corner encodings we accept. All three corners of a face
// record must share one shape; anything else (quads, mixed shapes, missing
// or zero indices) drops the whole line.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum CornerKind {
    // `f 1 2 3`
    Vertex,
    // `f 1/5 2/6 3/7` -- texture index discarded.
    VertexTexture,
    // `f 1//1 2//2 3//3`
    VertexNormal,
    // `f 1/5/1 2/6/2 3/7/3` -- texture index discarded.
    VertexTextureNormal,
}

impl CornerKind {
    fn has_normal(self) -> bool {
        matches!(self, CornerKind::VertexNormal | CornerKind::VertexTextureNormal)
    }
}

// Decodes a 1-based OBJ index into its 0-based internal form. Zero and
// non-numeric indices have no internal representation, so they fail the
// corner (negative, relative indices land here too).
fn parse_index(s: &str) -> Option<u32> {
    s.parse::<u32>().ok()?.checked_sub(1)
}

// Classifies one face corner token and extracts its vertex index and, for
// the normal-bearing shapes, its normal index.
fn parse_corner(token: &str) -> Option<(CornerKind, u32, Option<u32>)> {
    let mut parts = token.split('/');
    let vertex = parse_index(parts.next()?)?;
    let texture = parts.next();
    let normal = parts.next();
    if parts.next().is_some() {
        return None;
    }

    match (texture, normal) {
        (None, None) => Some((CornerKind::Vertex, vertex, None)),
        (Some(t), None) => {
            parse_index(t)?;
            Some((CornerKind::VertexTexture, vertex, None))
        }
        (Some(""), Some(n)) => Some((CornerKind::VertexNormal, vertex, Some(parse_index(n)?))),
        (Some(t), Some(n)) => {
            parse_index(t)?;
            Some((
                CornerKind::VertexTextureNormal,
                vertex,
                Some(parse_index(n)?),
            ))
        }
        (None, Some(_)) => unreachable!("split yields fields in order"),
    }
}

// Decodes an `f` record body into a triangle, or `None` when the record is
// not a triangle in one of the four accepted shapes.
fn parse_face(body: &str) -> Option<Face> {
    let mut tokens = body.split_whitespace();
    let a = parse_corner(tokens.next()?)?;
    let b = parse_corner(tokens.next()?)?;
    let c = parse_corner(tokens.next()?)?;
    // A fourth corner means a quad or n-gon, which we do not triangulate.
    if tokens.next().is_some() {
        return None;
    }
    if a.0 != b.0 || b.0 != c.0 {
        return None;
    }

    let normals = if a.0.has_normal() {
        Some([a.2?, b.2?, c.2?])
    } else {
        None
    };
    Some(Face {
        vertices: [a.1, b.1, c.1],
        normals,
    })
}

// Decodes exactly three floats from a `v` or `vn` record body. Records with
// fewer parsable numbers are rejected whole; we never append a vertex with
// undefined components.
fn parse_vector3(body: &str) -> Option<Vector3> {
    let mut fields = body.split_whitespace();
    let x = fields.next()?.parse().ok()?;
    let y = fields.next()?.parse().ok()?;
    let z = fields.next()?.parse().ok()?;
    Some(Vector3 { x, y, z })
}

/// Parses an OBJ text stream into a fresh [`MeshStore`].
///
/// Recognized records are `v x y z`, `vn x y z`, and triangle `f` records in
/// the four index shapes of [`CornerKind`]. Every other line (comments,
/// groups, materials, texture coordinates) is ignored, and a malformed
/// recognized record is skipped rather than failing the parse: a partially
/// loaded mesh beats an aborted load. Only I/O errors surface.
pub fn parse_reader<R: BufRead>(r: R) -> std::io::Result<MeshStore> {
    let mut mesh = MeshStore::new();
    for (n, line) in r.lines().enumerate() {
        let line = line?;
        // lines() strips \n but not the \r of CRLF files.
        let line = line.trim_end();
        if let Some(body) = line.strip_prefix("v ") {
            match parse_vector3(body) {
                Some(v) => mesh.push_vertex(v),
                None => log::debug!("line {}: skipping malformed vertex record", n + 1),
            }
        } else if let Some(body) = line.strip_prefix("vn") {
            match parse_vector3(body) {
                Some(v) => mesh.push_normal(v),
                None => log::debug!("line {}: skipping malformed normal record", n + 1),
            }
        } else if let Some(body) = line.strip_prefix("f ") {
            match parse_face(body) {
                Some(f) => mesh.push_face(f),
                None => log::debug!("line {}: skipping malformed face record", n + 1),
            }
        }
    }
    log::info!(
        "loaded model: {} vertices, {} normals, {} faces",
        mesh.vertex_count(),
        mesh.normal_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// Loads an OBJ model from a file path.
///
/// The file is opened before any mesh state exists, so a failed open leaves
/// the caller's previous model untouched and it can keep displaying it.
pub fn read_obj<P: AsRef<Path>>(p: P) -> std::io::Result<MeshStore> {
    let f = std::fs::File::open(p)?;
    parse_reader(BufReader::new(f))
}

/// Parses an OBJ model from an in-memory buffer.
pub fn parse_obj(data: &[u8]) -> std::io::Result<MeshStore> {
    parse_reader(std::io::Cursor::new(data))
}

pub trait ObjReader: BufRead {
    fn read_obj(&mut self) -> std::io::Result<MeshStore>;
}

impl<T: BufRead> ObjReader for T {
    fn read_obj(&mut self) -> std::io::Result<MeshStore> {
        parse_reader(self)
    }
}
