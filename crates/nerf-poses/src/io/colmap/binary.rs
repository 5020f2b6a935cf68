use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use super::{CameraModel, ColmapCamera, ColmapError, ColmapImage, ColmapPoint3d};

/// Read the cameras.bin file and return a vector of ColmapCamera structs.
///
/// # Arguments
///
/// * `path` - The path to the cameras.bin file.
///
/// # Returns
///
/// A vector of ColmapCamera structs.
pub fn read_cameras_bin(path: impl AsRef<Path>) -> Result<Vec<ColmapCamera>, ColmapError> {
    let mut reader = BufReader::new(File::open(path)?);
    parse_cameras(&mut reader)
}

/// Read the images.bin file and return a vector of ColmapImage structs.
///
/// # Arguments
///
/// * `path` - The path to the images.bin file.
///
/// # Returns
///
/// A vector of ColmapImage structs.
pub fn read_images_bin(path: impl AsRef<Path>) -> Result<Vec<ColmapImage>, ColmapError> {
    let mut reader = BufReader::new(File::open(path)?);
    parse_images(&mut reader)
}

/// Read the points3D.bin file and return a vector of ColmapPoint3d structs.
///
/// # Arguments
///
/// * `path` - The path to the points3D.bin file.
///
/// # Returns
///
/// A vector of ColmapPoint3d structs.
pub fn read_points3d_bin(path: impl AsRef<Path>) -> Result<Vec<ColmapPoint3d>, ColmapError> {
    let mut reader = BufReader::new(File::open(path)?);
    parse_points3d(&mut reader)
}

/// Upper bound on the elements reserved ahead from a count read in the file.
const MAX_RESERVED: usize = 1 << 16;

// NOTE: all the values are stored in little endian.
fn read_bytes<const N: usize>(reader: &mut impl Read) -> Result<[u8; N], ColmapError> {
    let mut buffer = [0u8; N];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

fn read_u32(reader: &mut impl Read) -> Result<u32, ColmapError> {
    Ok(u32::from_le_bytes(read_bytes(reader)?))
}

fn read_i32(reader: &mut impl Read) -> Result<i32, ColmapError> {
    Ok(i32::from_le_bytes(read_bytes(reader)?))
}

fn read_u64(reader: &mut impl Read) -> Result<u64, ColmapError> {
    Ok(u64::from_le_bytes(read_bytes(reader)?))
}

fn read_i64(reader: &mut impl Read) -> Result<i64, ColmapError> {
    Ok(i64::from_le_bytes(read_bytes(reader)?))
}

fn read_f64(reader: &mut impl Read) -> Result<f64, ColmapError> {
    Ok(f64::from_le_bytes(read_bytes(reader)?))
}

fn read_f64_array<const N: usize>(reader: &mut impl Read) -> Result<[f64; N], ColmapError> {
    let mut values = [0.0; N];
    for value in values.iter_mut() {
        *value = read_f64(reader)?;
    }
    Ok(values)
}

fn read_len(reader: &mut impl Read) -> Result<usize, ColmapError> {
    let len = read_u64(reader)?;
    usize::try_from(len).map_err(|_| ColmapError::ParseError(format!("Invalid length: {len}")))
}

// counts read from the file are untrusted, a corrupt one ends in a read error
fn with_capacity_for<T>(len: usize) -> Vec<T> {
    Vec::with_capacity(len.min(MAX_RESERVED))
}

fn read_id(reader: &mut impl Read) -> Result<u32, ColmapError> {
    let id = read_i32(reader)?;
    u32::try_from(id).map_err(|_| ColmapError::ParseError(format!("Invalid id: {id}")))
}

fn read_name(reader: &mut impl BufRead) -> Result<String, ColmapError> {
    let mut bytes = Vec::new();
    reader.read_until(b'\0', &mut bytes)?;
    if bytes.pop() != Some(b'\0') {
        return Err(ColmapError::ParseError(
            "Unterminated image name".to_string(),
        ));
    }
    String::from_utf8(bytes).map_err(|e| ColmapError::ParseError(e.to_string()))
}

/// CAMERA_ID (u32), MODEL_ID (i32), WIDTH (u64), HEIGHT (u64), PARAMS (f64 x num_params)
fn parse_cameras(reader: &mut impl BufRead) -> Result<Vec<ColmapCamera>, ColmapError> {
    let num_cameras = read_len(reader)?;
    let mut cameras = with_capacity_for(num_cameras);

    for _ in 0..num_cameras {
        let camera_id = read_u32(reader)?;
        let model = CameraModel::from_id(read_i32(reader)?)?;
        let width = read_len(reader)?;
        let height = read_len(reader)?;
        let params = (0..model.num_params())
            .map(|_| read_f64(reader))
            .collect::<Result<Vec<_>, _>>()?;

        cameras.push(ColmapCamera {
            camera_id,
            model,
            width,
            height,
            params,
        });
    }

    Ok(cameras)
}

/// IMAGE_ID (u32), QVEC (f64 x 4), TVEC (f64 x 3), CAMERA_ID (u32), NAME (\0 terminated),
/// NUM_POINTS2D (u64), POINTS2D[] as (X (f64), Y (f64), POINT3D_ID (i64))
fn parse_images(reader: &mut impl BufRead) -> Result<Vec<ColmapImage>, ColmapError> {
    let num_images = read_len(reader)?;
    let mut images = with_capacity_for(num_images);

    for _ in 0..num_images {
        let image_id = read_u32(reader)?;
        let rotation = read_f64_array(reader)?;
        let translation = read_f64_array(reader)?;
        let camera_id = read_u32(reader)?;
        let name = read_name(reader)?;

        let num_points2d = read_len(reader)?;
        let points2d = (0..num_points2d)
            .map(|_| -> Result<(f64, f64, i64), ColmapError> {
                Ok((read_f64(reader)?, read_f64(reader)?, read_i64(reader)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        images.push(ColmapImage {
            name,
            image_id,
            camera_id,
            rotation,
            translation,
            points2d,
        });
    }

    Ok(images)
}

/// POINT3D_ID (u64), XYZ (f64 x 3), RGB (u8 x 3), ERROR (f64), TRACK_LENGTH (u64),
/// TRACK[] as (IMAGE_ID (i32), POINT2D_IDX (i32))
fn parse_points3d(reader: &mut impl BufRead) -> Result<Vec<ColmapPoint3d>, ColmapError> {
    let num_points = read_len(reader)?;
    let mut points = with_capacity_for(num_points);

    for _ in 0..num_points {
        let point3d_id = read_u64(reader)?;
        let xyz = read_f64_array(reader)?;
        let rgb = read_bytes::<3>(reader)?;
        let error = read_f64(reader)?;

        let track_length = read_len(reader)?;
        let track = (0..track_length)
            .map(|_| -> Result<(u32, u32), ColmapError> {
                Ok((read_id(reader)?, read_id(reader)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        points.push(ColmapPoint3d {
            point3d_id,
            xyz,
            rgb,
            error,
            track,
        });
    }

    Ok(points)
}
