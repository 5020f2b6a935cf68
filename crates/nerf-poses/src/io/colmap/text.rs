use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use super::{CameraModel, ColmapCamera, ColmapError, ColmapImage, ColmapPoint3d};

/// Read the cameras.txt file and return a vector of ColmapCamera structs.
///
/// # Arguments
///
/// * `path` - The path to the cameras.txt file.
///
/// # Returns
///
/// A vector of ColmapCamera structs.
pub fn read_cameras_txt(path: impl AsRef<Path>) -> Result<Vec<ColmapCamera>, ColmapError> {
    let reader = BufReader::new(File::open(path)?);
    parse_cameras(reader)
}

/// Read the points3D.txt file and return a vector of ColmapPoint3d structs.
///
/// # Arguments
///
/// * `path` - The path to the points3D.txt file.
///
/// # Returns
///
/// A vector of ColmapPoint3d structs.
pub fn read_points3d_txt(path: impl AsRef<Path>) -> Result<Vec<ColmapPoint3d>, ColmapError> {
    let reader = BufReader::new(File::open(path)?);
    parse_points3d(reader)
}

/// Read the images.txt file and return a vector of ColmapImage structs.
///
/// # Arguments
///
/// * `path` - The path to the images.txt file.
///
/// # Returns
///
/// A vector of ColmapImage structs.
pub fn read_images_txt(path: impl AsRef<Path>) -> Result<Vec<ColmapImage>, ColmapError> {
    let reader = BufReader::new(File::open(path)?);
    parse_images(reader)
}

fn parse_cameras(reader: impl BufRead) -> Result<Vec<ColmapCamera>, ColmapError> {
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if is_comment_or_blank(l)))
        .map(|line| parse_camera_line(&line?))
        .collect()
}

fn parse_points3d(reader: impl BufRead) -> Result<Vec<ColmapPoint3d>, ColmapError> {
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if is_comment_or_blank(l)))
        .map(|line| parse_point3d_line(&line?))
        .collect()
}

fn parse_images(reader: impl BufRead) -> Result<Vec<ColmapImage>, ColmapError> {
    // NOTE: the observations line is empty for images without keypoints,
    //       so only comments can be dropped here.
    let lines = reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim_start().starts_with('#')))
        .collect::<Result<Vec<_>, _>>()?;

    // a trailing newline at the end of the file leaves one blank line behind
    let lines = match lines.split_last() {
        Some((last, rest)) if lines.len() % 2 == 1 && last.trim().is_empty() => rest,
        _ => &lines[..],
    };

    lines
        .chunks(2)
        .map(|chunk| match chunk {
            [line1, line2] => parse_image_line(line1, line2),
            _ => Err(ColmapError::ParseError(
                "Invalid number of lines".to_string(),
            )),
        })
        .collect()
}

fn is_comment_or_blank(line: &str) -> bool {
    let line = line.trim_start();
    line.is_empty() || line.starts_with('#')
}

/// Utility functions for parsing COLMAP text files
fn parse_part<T: std::str::FromStr>(s: &str) -> Result<T, ColmapError>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| ColmapError::ParseError(format!("{}: {}", s, e)))
}

fn parse_array<T: std::str::FromStr, const N: usize>(
    parts: &[&str],
    what: &str,
) -> Result<[T; N], ColmapError>
where
    T::Err: std::fmt::Display,
{
    parts
        .iter()
        .map(|s| parse_part(s))
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| ColmapError::ParseError(format!("Invalid number of {what} coordinates")))
}

/// Parse a camera line and return a ColmapCamera struct.
/// NOTE: The number of parameters depends on the camera model.
///       CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[0], PARAMS[1], ...
fn parse_camera_line(line: &str) -> Result<ColmapCamera, ColmapError> {
    let parts = line.split_whitespace().collect::<Vec<_>>();

    if parts.len() < 5 {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of parts: {}",
            parts.len()
        )));
    }

    let model = parts[1].parse::<CameraModel>()?;
    let params = parts[4..]
        .iter()
        .map(|s| parse_part(s))
        .collect::<Result<Vec<_>, _>>()?;
    model.check_num_params(&params)?;

    Ok(ColmapCamera {
        camera_id: parse_part(parts[0])?,
        model,
        width: parse_part(parts[2])?,
        height: parse_part(parts[3])?,
        params,
    })
}

/// Parse a point3d line and return a ColmapPoint3d struct.
///       POINT3D_ID, X, Y, Z, R, G, B, ERROR, TRACK[] as (IMAGE_ID, POINT2D_IDX)
fn parse_point3d_line(line: &str) -> Result<ColmapPoint3d, ColmapError> {
    let parts = line.split_whitespace().collect::<Vec<_>>();

    if parts.len() < 8 || (parts.len() - 8) % 2 != 0 {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of parts: {}",
            parts.len()
        )));
    }

    Ok(ColmapPoint3d {
        point3d_id: parse_part(parts[0])?,
        xyz: parse_array(&parts[1..4], "xyz")?,
        rgb: parse_array(&parts[4..7], "rgb")?,
        error: parse_part(parts[7])?,
        track: parts[8..]
            .chunks_exact(2)
            .map(|chunk| -> Result<(u32, u32), ColmapError> {
                Ok((parse_part(chunk[0])?, parse_part(chunk[1])?))
            })
            .collect::<Result<Vec<_>, _>>()?,
    })
}

// The first `n` whitespace separated fields and the rest of the line, kept verbatim.
fn split_leading_fields(line: &str, n: usize) -> (Vec<&str>, &str) {
    let mut fields = Vec::with_capacity(n);
    let mut rest = line.trim_start();
    while fields.len() < n && !rest.is_empty() {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    (fields, rest.trim_end())
}

/// Parse an image line and return a ColmapImage struct.
/// #   IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, NAME
/// #   POINTS2D[] as (X, Y, POINT3D_ID)
fn parse_image_line(line1: &str, line2: &str) -> Result<ColmapImage, ColmapError> {
    // image names may contain spaces
    let (parts1, name) = split_leading_fields(line1, 9);
    let parts2 = line2.split_whitespace().collect::<Vec<_>>();

    if parts1.len() < 9 || name.is_empty() {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of parts: {}",
            parts1.len() + usize::from(!name.is_empty())
        )));
    }

    if parts2.len() % 3 != 0 {
        return Err(ColmapError::ParseError(format!(
            "Invalid number of points2d parts: {}",
            parts2.len()
        )));
    }

    Ok(ColmapImage {
        image_id: parse_part(parts1[0])?,
        rotation: parse_array(&parts1[1..5], "rotation")?,
        translation: parse_array(&parts1[5..8], "translation")?,
        camera_id: parse_part(parts1[8])?,
        name: name.to_string(),
        points2d: parts2
            .chunks_exact(3)
            .map(|chunk| -> Result<(f64, f64, i64), ColmapError> {
                Ok((
                    parse_part(chunk[0])?,
                    parse_part(chunk[1])?,
                    parse_part(chunk[2])?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?,
    })
}
