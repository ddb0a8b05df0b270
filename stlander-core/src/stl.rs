/// STL reader and writer for binary and ASCII formats
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::StlError;
use crate::geometry::Mesh;

/// On-disk STL flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Binary,
    Ascii,
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() < 84 {
        return Err(StlError::TooShort);
    }

    // Skip 80-byte header
    let data = &data[80..];

    // Read triangle count (4 bytes, little-endian)
    let triangle_count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

    let mut mesh = Mesh::with_capacity(triangle_count * 3, triangle_count);
    let mut offset = 4;

    for _ in 0..triangle_count {
        if offset + 50 > data.len() {
            return Err(StlError::Truncated);
        }

        // Skip the stored facet normal; normals are derived from geometry
        offset += 12;

        let mut corners = [Point3::origin(); 3];
        for corner in &mut corners {
            let x = read_f32_le(data, offset);
            let y = read_f32_le(data, offset + 4);
            let z = read_f32_le(data, offset + 8);
            *corner = Point3::new(x, y, z);
            offset += 12;
        }

        // Skip attribute byte count (2 bytes)
        offset += 2;

        mesh.add_triangle(corners[0], corners[1], corners[2]);
    }

    Ok(mesh)
}

fn read_f32_le(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(StlError::AsciiParse(format!("{e:?}"))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional solid name
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let mut mesh = Mesh::with_capacity(triangles.len() * 3, triangles.len());
    for [a, b, c] in triangles {
        mesh.add_triangle(a, b, c);
    }

    Ok((input, mesh))
}

fn parse_facet(input: &str) -> IResult<&str, [Point3<f32>; 3]> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _) = parse_vector3(input)?; // Stored normal, ignored
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, [v1, v2, v3]))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Detect and parse STL data (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    // Try to detect format
    if data.len() > 5 && &data[0..5] == b"solid" {
        // Might be ASCII
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    // Try binary format
    parse_binary_stl(data)
}

/// Read and parse an STL file from disk.
pub fn load_stl(path: impl AsRef<Path>) -> Result<Mesh, StlError> {
    let data = fs::read(path)?;
    parse_stl(&data)
}

/// Write a mesh as binary STL. Facet normals are recomputed from the
/// geometry; degenerate facets get a zero normal.
pub fn write_binary_stl<W: Write>(writer: &mut W, mesh: &Mesh) -> Result<(), StlError> {
    let faces = u32::try_from(mesh.face_count()).map_err(|_| StlError::TooManyFaces {
        faces: mesh.face_count(),
    })?;

    writer.write_all(&[0u8; 80])?;
    writer.write_all(&faces.to_le_bytes())?;

    for face in 0..mesh.face_count() {
        let normal = mesh.face_normal(face);
        for v in [normal.x, normal.y, normal.z] {
            writer.write_all(&v.to_le_bytes())?;
        }
        for corner in mesh.corners(face) {
            for v in [corner.x, corner.y, corner.z] {
                writer.write_all(&v.to_le_bytes())?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

/// Write a mesh as ASCII STL under the given solid name.
pub fn write_ascii_stl<W: Write>(writer: &mut W, mesh: &Mesh, name: &str) -> Result<(), StlError> {
    writeln!(writer, "solid {name}")?;
    for face in 0..mesh.face_count() {
        let n = mesh.face_normal(face);
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for c in mesh.corners(face) {
            writeln!(writer, "      vertex {:e} {:e} {:e}", c.x, c.y, c.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    Ok(())
}

/// Save a mesh to disk in the requested format.
pub fn save_stl(path: impl AsRef<Path>, mesh: &Mesh, format: StlFormat) -> Result<(), StlError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    match format {
        StlFormat::Binary => write_binary_stl(&mut writer, mesh)?,
        StlFormat::Ascii => write_ascii_stl(&mut writer, mesh, "aligned")?,
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        // Set triangle count to 0
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let result = parse_binary_stl(&data);
        assert!(result.is_ok());
        let mesh = result.unwrap();
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_parse_binary_too_short() {
        let data = vec![0u8; 40];
        assert!(matches!(parse_binary_stl(&data), Err(StlError::TooShort)));
    }

    #[test]
    fn test_parse_binary_truncated_facets() {
        let mut data = vec![0u8; 84];
        // Claims one triangle but carries no facet data
        data[80..84].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(parse_binary_stl(&data), Err(StlError::Truncated)));
    }

    #[test]
    fn test_parse_ascii_named_solid() {
        let input = "\
solid wedge
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid wedge
";
        let mesh = parse_ascii_stl(input).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_ascii_malformed() {
        let input = "solid broken\n  facet normal 0 0 1\n";
        assert!(parse_ascii_stl(input).is_err());
    }

    #[test]
    fn test_binary_roundtrip() {
        let mesh = Mesh::cuboid(10.0, 2.0, 1.0);
        let mut buffer = Vec::new();
        write_binary_stl(&mut buffer, &mesh).unwrap();

        let parsed = parse_stl(&buffer).unwrap();
        assert_eq!(parsed.face_count(), mesh.face_count());
        for face in 0..mesh.face_count() {
            let expected = mesh.corners(face);
            let actual = parsed.corners(face);
            for (e, a) in expected.iter().zip(&actual) {
                assert_eq!(e, a);
            }
        }
    }

    #[test]
    fn test_ascii_roundtrip() {
        let mesh = Mesh::cube(2.0);
        let mut buffer = Vec::new();
        write_ascii_stl(&mut buffer, &mesh, "cube").unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let parsed = parse_ascii_stl(&text).unwrap();
        assert_eq!(parsed.face_count(), mesh.face_count());
        for face in 0..mesh.face_count() {
            let expected = mesh.corners(face);
            let actual = parsed.corners(face);
            for (e, a) in expected.iter().zip(&actual) {
                assert!((e - a).norm() < 1e-5);
            }
        }
    }

    #[test]
    fn test_detects_binary_despite_solid_prefix() {
        // A binary file whose header happens to start with "solid"
        let mut data = vec![0u8; 84 + 50];
        data[0..5].copy_from_slice(b"solid");
        data[80..84].copy_from_slice(&1u32.to_le_bytes());
        // Facet bytes stay zero: one degenerate triangle at the origin
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }
}
