//! Native .prati binary format for reference models.
//!
//! All multi-byte values are little-endian.
//!
//! Format:
//! - Header (14 bytes):
//!   - Magic: "PRATI" (5 bytes)
//!   - Version: u8 (1 byte)
//!   - Reference id: u64 (8 bytes)
//! - Volume: center xyz, extent xyz (6 × f32)
//! - Origin: xyz (3 × f32)
//! - Points: count u32, then xyz per point (3 × f32)
//! - Grid flag: u8 (0 = none, 1 = present), then if present:
//!   - Volume: center xyz, extent xyz (6 × f32)
//!   - Edge: xyz (3 × f32)
//!   - Dims: nx, ny, nz (3 × u32)
//!   - Occupied: count u32, then i, j, k per voxel (3 × u32)
//! - Annotations: count u32, then sequence number, i, j, k (4 × u32)

use std::io::{Read, Write};

use super::error::ModelIoError;
use crate::annotation::Annotation;
use crate::core::{BoundingVolume, Point3, VoxelIndex};
use crate::detection::ReferenceId;
use crate::grid::{GridDims, VoxelGrid};
use crate::session::ReferenceObject;

/// Magic bytes for .prati format
const MAGIC: &[u8; 5] = b"PRATI";

/// Current format version
pub const FORMAT_VERSION: u8 = 1;

/// Upper bound on any stored element count
const MAX_COUNT: u32 = 1 << 24;

/// Reference object with its grid and annotations, as stored.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceModel {
    /// Captured reference
    pub reference: ReferenceObject,
    /// Voxel grid built from the reference, if any
    pub grid: Option<VoxelGrid>,
    /// Annotations placed on the grid
    pub annotations: Vec<Annotation>,
}

/// Write a model in .prati format
pub fn write_model<W: Write>(model: &ReferenceModel, writer: &mut W) -> Result<(), ModelIoError> {
    let mut buf = Vec::with_capacity(64 + model.reference.points.len() * 12);

    buf.extend_from_slice(MAGIC);
    buf.push(FORMAT_VERSION);
    buf.extend_from_slice(&model.reference.id.0.to_le_bytes());

    put_volume(&mut buf, &model.reference.volume);
    put_point(&mut buf, model.reference.origin);

    put_count(&mut buf, model.reference.points.len())?;
    for &p in &model.reference.points {
        put_point(&mut buf, p);
    }

    match &model.grid {
        None => buf.push(0),
        Some(grid) => {
            buf.push(1);
            put_volume(&mut buf, grid.volume());
            put_point(&mut buf, grid.edge());
            let dims = grid.dims();
            for n in [dims.nx, dims.ny, dims.nz] {
                buf.extend_from_slice(&n.to_le_bytes());
            }
            put_count(&mut buf, grid.occupied_count())?;
            for idx in grid.occupied() {
                put_index(&mut buf, idx);
            }
        }
    }

    put_count(&mut buf, model.annotations.len())?;
    for a in &model.annotations {
        buf.extend_from_slice(&a.sequence_number.to_le_bytes());
        put_index(&mut buf, a.anchor_voxel);
    }

    writer.write_all(&buf)?;
    Ok(())
}

/// Read a model in .prati format
pub fn read_model<R: Read>(reader: &mut R) -> Result<ReferenceModel, ModelIoError> {
    let mut magic = [0u8; 5];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(ModelIoError::InvalidFormat("Invalid magic bytes".to_string()));
    }

    let version = read_u8(reader)?;
    if version != FORMAT_VERSION {
        return Err(ModelIoError::VersionMismatch {
            expected: FORMAT_VERSION,
            found: version,
        });
    }

    let mut id = [0u8; 8];
    reader.read_exact(&mut id)?;
    let id = ReferenceId(u64::from_le_bytes(id));

    let volume = read_volume(reader)?;
    let origin = read_point(reader)?;

    let point_count = read_count(reader)?;
    let mut points = Vec::with_capacity(point_count);
    for _ in 0..point_count {
        points.push(read_point(reader)?);
    }

    let grid = match read_u8(reader)? {
        0 => None,
        1 => Some(read_grid(reader)?),
        flag => {
            return Err(ModelIoError::InvalidFormat(format!(
                "Invalid grid flag {}",
                flag
            )));
        }
    };

    let annotation_count = read_count(reader)?;
    let mut annotations = Vec::with_capacity(annotation_count);
    for _ in 0..annotation_count {
        let sequence_number = read_u32(reader)?;
        if sequence_number == 0 {
            return Err(ModelIoError::InvalidFormat(
                "Annotation sequence numbers start at 1".to_string(),
            ));
        }
        annotations.push(Annotation {
            sequence_number,
            anchor_voxel: read_index(reader)?,
        });
    }

    Ok(ReferenceModel {
        reference: ReferenceObject {
            id,
            points,
            volume,
            origin,
        },
        grid,
        annotations,
    })
}

fn read_grid<R: Read>(reader: &mut R) -> Result<VoxelGrid, ModelIoError> {
    let volume = read_volume(reader)?;
    let edge = read_point(reader)?;
    let dims = GridDims::new(read_u32(reader)?, read_u32(reader)?, read_u32(reader)?);

    let count = read_count(reader)?;
    let mut occupied = Vec::with_capacity(count);
    for _ in 0..count {
        occupied.push(read_index(reader)?);
    }

    VoxelGrid::from_parts(volume, edge, dims, occupied)
        .map_err(|e| ModelIoError::InvalidFormat(format!("Invalid grid: {}", e)))
}

fn put_point(buf: &mut Vec<u8>, p: Point3) {
    for v in p.to_array() {
        buf.extend_from_slice(&v.to_le_bytes());
    }
}

fn put_volume(buf: &mut Vec<u8>, volume: &BoundingVolume) {
    put_point(buf, volume.center());
    put_point(buf, volume.extent());
}

fn put_index(buf: &mut Vec<u8>, idx: VoxelIndex) {
    for v in idx.to_array() {
        buf.extend_from_slice(&v.to_le_bytes());
    }
}

fn put_count(buf: &mut Vec<u8>, count: usize) -> Result<(), ModelIoError> {
    let count = u32::try_from(count)
        .ok()
        .filter(|&c| c <= MAX_COUNT)
        .ok_or_else(|| ModelIoError::InvalidFormat(format!("Too many elements: {}", count)))?;
    buf.extend_from_slice(&count.to_le_bytes());
    Ok(())
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, ModelIoError> {
    let mut b = [0u8; 1];
    reader.read_exact(&mut b)?;
    Ok(b[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, ModelIoError> {
    let mut b = [0u8; 4];
    reader.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32, ModelIoError> {
    let mut b = [0u8; 4];
    reader.read_exact(&mut b)?;
    Ok(f32::from_le_bytes(b))
}

fn read_count<R: Read>(reader: &mut R) -> Result<usize, ModelIoError> {
    let count = read_u32(reader)?;
    if count > MAX_COUNT {
        return Err(ModelIoError::InvalidFormat(format!(
            "Element count {} exceeds limit",
            count
        )));
    }
    Ok(count as usize)
}

fn read_point<R: Read>(reader: &mut R) -> Result<Point3, ModelIoError> {
    Ok(Point3::new(
        read_f32(reader)?,
        read_f32(reader)?,
        read_f32(reader)?,
    ))
}

fn read_index<R: Read>(reader: &mut R) -> Result<VoxelIndex, ModelIoError> {
    Ok(VoxelIndex::new(
        read_u32(reader)?,
        read_u32(reader)?,
        read_u32(reader)?,
    ))
}

fn read_volume<R: Read>(reader: &mut R) -> Result<BoundingVolume, ModelIoError> {
    let center = read_point(reader)?;
    let extent = read_point(reader)?;
    BoundingVolume::new(center, extent)
        .map_err(|e| ModelIoError::InvalidFormat(format!("Invalid volume: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_model() -> ReferenceModel {
        let volume = BoundingVolume::new(Point3::ZERO, Point3::new(0.3, 0.2, 0.1)).unwrap();
        let points = vec![
            Point3::new(0.1, 0.05, 0.0),
            Point3::new(-0.1, -0.05, 0.02),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let grid = VoxelGrid::build(&points, &volume).unwrap();
        let anchor = grid.occupied().next().unwrap();
        ReferenceModel {
            reference: ReferenceObject {
                id: ReferenceId(42),
                points,
                volume,
                origin: Point3::new(0.0, -0.1, 0.0),
            },
            grid: Some(grid),
            annotations: vec![Annotation {
                sequence_number: 1,
                anchor_voxel: anchor,
            }],
        }
    }

    #[test]
    fn test_roundtrip() {
        let model = sample_model();
        let mut buf = Vec::new();
        write_model(&model, &mut buf).unwrap();
        assert_eq!(&buf[0..5], b"PRATI");
        assert_eq!(buf[5], FORMAT_VERSION);

        let loaded = read_model(&mut Cursor::new(buf)).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_roundtrip_without_grid() {
        let mut model = sample_model();
        model.grid = None;
        model.annotations.clear();
        let mut buf = Vec::new();
        write_model(&model, &mut buf).unwrap();
        assert_eq!(read_model(&mut Cursor::new(buf)).unwrap(), model);
    }

    #[test]
    fn test_invalid_magic() {
        let data = b"VASTU\x01rest".to_vec();
        let result = read_model(&mut Cursor::new(data));
        assert!(matches!(result, Err(ModelIoError::InvalidFormat(_))));
    }

    #[test]
    fn test_version_mismatch() {
        let mut buf = Vec::new();
        write_model(&sample_model(), &mut buf).unwrap();
        buf[5] = 9;
        let result = read_model(&mut Cursor::new(buf));
        assert!(matches!(
            result,
            Err(ModelIoError::VersionMismatch {
                expected: 1,
                found: 9
            })
        ));
    }

    #[test]
    fn test_truncated_data() {
        let mut buf = Vec::new();
        write_model(&sample_model(), &mut buf).unwrap();
        buf.truncate(buf.len() - 3);
        assert!(matches!(
            read_model(&mut Cursor::new(buf)),
            Err(ModelIoError::Io(_))
        ));
    }

    #[test]
    fn test_out_of_range_voxel_rejected() {
        let model = sample_model();
        let mut buf = Vec::new();
        write_model(&model, &mut buf).unwrap();

        // First occupied voxel's i sits after the grid dims and count
        let grid = model.grid.as_ref().unwrap();
        let header = 14 + 24 + 12 + 4 + model.reference.points.len() * 12 + 1;
        let voxel_at = header + 24 + 12 + 12 + 4;
        buf[voxel_at..voxel_at + 4].copy_from_slice(&grid.dims().nx.to_le_bytes());

        assert!(matches!(
            read_model(&mut Cursor::new(buf)),
            Err(ModelIoError::InvalidFormat(_))
        ));
    }
}
