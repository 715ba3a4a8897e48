//! `ADAMESH` binary format.
//!
//! Little-endian throughout:
//!
//! | bytes      | content                       |
//! |------------|-------------------------------|
//! | 7          | `b"ADAMESH"`                  |
//! | 1          | version (`1`)                 |
//! | 4          | vertex count `V` (`u32`)      |
//! | 4          | triangle count `T` (`u32`)    |
//! | 12·V       | positions, `f32` x, y, z      |
//! | 4·V        | elevations, `f32`             |
//! | 12·T       | triangle indices, `u32`       |
//!
//! Positions and elevations are narrowed to `f32` on write.

use std::io::{self, Read, Write};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::DVec3;

use super::Mesh;
use crate::error::MeshIoError;

pub const MAGIC: &[u8; 7] = b"ADAMESH";
pub const FORMAT_VERSION: u8 = 1;
/// Magic, version and the two counts.
pub const HEADER_BYTES: usize = 16;

pub fn write_mesh<W: Write>(mesh: &Mesh, mut writer: W) -> Result<(), MeshIoError> {
    if mesh.vertices.len() != mesh.elevations.len() {
        return Err(MeshIoError::LengthMismatch {
            vertices: mesh.vertices.len(),
            elevations: mesh.elevations.len(),
        });
    }
    check_indices(&mesh.triangles, mesh.vertices.len())?;
    let num_vertices =
        u32::try_from(mesh.vertices.len()).map_err(|_| MeshIoError::TooLarge("vertex count"))?;
    let num_triangles =
        u32::try_from(mesh.triangles.len()).map_err(|_| MeshIoError::TooLarge("triangle count"))?;

    writer.write_all(MAGIC)?;
    writer.write_u8(FORMAT_VERSION)?;
    writer.write_u32::<LittleEndian>(num_vertices)?;
    writer.write_u32::<LittleEndian>(num_triangles)?;

    for v in &mesh.vertices {
        for c in v.as_vec3().to_array() {
            writer.write_f32::<LittleEndian>(c)?;
        }
    }
    for &e in &mesh.elevations {
        writer.write_f32::<LittleEndian>(e as f32)?;
    }
    for tri in &mesh.triangles {
        for &i in tri {
            writer.write_u32::<LittleEndian>(i)?;
        }
    }
    Ok(())
}

pub fn read_mesh<R: Read>(mut reader: R) -> Result<Mesh, MeshIoError> {
    let mut magic = [0u8; 7];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(MeshIoError::InvalidHeader(magic.to_vec()));
    }

    let version = reader.read_u8()?;
    if version != FORMAT_VERSION {
        return Err(MeshIoError::UnsupportedVersion(version));
    }

    let num_vertices = reader.read_u32::<LittleEndian>()? as usize;
    let num_triangles = reader.read_u32::<LittleEndian>()? as usize;

    let vertices = decode_f32(&read_block(&mut reader, 12 * num_vertices)?)
        .chunks_exact(3)
        .map(|c| DVec3::new(c[0] as f64, c[1] as f64, c[2] as f64))
        .collect();
    let elevations = decode_f32(&read_block(&mut reader, 4 * num_vertices)?)
        .into_iter()
        .map(f64::from)
        .collect();

    let block = read_block(&mut reader, 12 * num_triangles)?;
    let mut indices = vec![0u32; block.len() / 4];
    LittleEndian::read_u32_into(&block, &mut indices);
    let triangles: Vec<[u32; 3]> = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

    check_indices(&triangles, num_vertices)?;

    Ok(Mesh {
        vertices,
        elevations,
        triangles,
    })
}

fn check_indices(triangles: &[[u32; 3]], num_vertices: usize) -> Result<(), MeshIoError> {
    for (t, tri) in triangles.iter().enumerate() {
        if let Some(&index) = tri.iter().find(|&&i| i as usize >= num_vertices) {
            return Err(MeshIoError::IndexOutOfRange {
                triangle: t,
                index,
                num_vertices,
            });
        }
    }
    Ok(())
}

fn decode_f32(bytes: &[u8]) -> Vec<f32> {
    let mut values = vec![0f32; bytes.len() / 4];
    LittleEndian::read_f32_into(bytes, &mut values);
    values
}

/// Read exactly `len` bytes without trusting `len` for the allocation.
fn read_block<R: Read>(reader: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, file ends after {}", len, bytes.len()),
        ));
    }
    Ok(bytes)
}
