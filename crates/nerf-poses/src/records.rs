use std::{io::Write, path::Path};

use serde::Serialize;

use crate::error::PosesError;
use crate::range::DepthRange;
use crate::reconstruction::Reconstruction;
use crate::transforms::CameraTransforms;

/// The column names of the output table, in order.
pub const COLUMNS: [&str; 6] = [
    "image_name",
    "camera_model",
    "camera_params",
    "pose",
    "near",
    "far",
];

/// One row of the output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseRecord {
    /// Image file name
    pub image_name: String,
    /// Camera model name, e.g. `PINHOLE`
    pub camera_model: String,
    /// Camera parameters as a bracketed list
    pub camera_params: String,
    /// Top three rows of the camera to world matrix, row major, as a bracketed list
    pub pose: String,
    /// Near bound, empty when no point is visible
    pub near: Option<f64>,
    /// Far bound, empty when no point is visible
    pub far: Option<f64>,
}

/// Format a list of floats as `[a, b, c]`.
///
/// # Arguments
///
/// * `values` - The values to format.
/// * `precision` - The number of fractional digits, `None` for the shortest
///   representation that reads back to the same value.
pub fn format_list(values: &[f64], precision: Option<usize>) -> String {
    let items = values
        .iter()
        .map(|v| match precision {
            Some(digits) => format!("{v:.digits$}"),
            None => format!("{v:?}"),
        })
        .collect::<Vec<_>>();
    format!("[{}]", items.join(", "))
}

/// Assemble one record per image, in image order.
///
/// # Arguments
///
/// * `reconstruction` - The reconstruction the transforms and ranges were computed from.
/// * `transforms` - The camera transforms, indexed like the images.
/// * `ranges` - The depth range of each image, `None` when nothing is visible.
/// * `precision` - The list precision, see [`format_list`].
///
/// # Errors
///
/// [`PosesError::LengthMismatch`] if the transforms or the ranges do not hold
/// one entry per image, [`PosesError::MissingCamera`] if an image references
/// an unknown camera.
pub fn assemble_records(
    reconstruction: &Reconstruction,
    transforms: &CameraTransforms,
    ranges: &[Option<DepthRange>],
    precision: Option<usize>,
) -> Result<Vec<PoseRecord>, PosesError> {
    let num_images = reconstruction.num_images();
    for (what, len) in [("transforms", transforms.len()), ("depth ranges", ranges.len())] {
        if len != num_images {
            return Err(PosesError::LengthMismatch {
                what,
                expected: num_images,
                actual: len,
            });
        }
    }

    reconstruction
        .images()
        .iter()
        .zip(ranges)
        .enumerate()
        .map(|(idx, (image, range))| {
            let camera = reconstruction.camera(image.camera_id).ok_or(
                PosesError::MissingCamera {
                    image_id: image.image_id,
                    camera_id: image.camera_id,
                },
            )?;

            Ok(PoseRecord {
                image_name: image.name.clone(),
                camera_model: camera.model.name().to_string(),
                camera_params: format_list(&camera.params, precision),
                pose: format_list(&transforms.flattened_pose(idx), precision),
                near: range.map(|r| r.near),
                far: range.map(|r| r.far),
            })
        })
        .collect()
}

/// Write the records as CSV, header row first.
pub fn write_records(writer: impl Write, records: &[PoseRecord]) -> Result<(), PosesError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // written by hand so that an empty table still carries the header
    csv_writer.write_record(COLUMNS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Write the records to a CSV file, see [`write_records`].
pub fn write_records_csv(path: impl AsRef<Path>, records: &[PoseRecord]) -> Result<(), PosesError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_records(std::io::BufWriter::new(file), records)?;
    log::info!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_list() {
        assert_eq!(format_list(&[1.0, 0.25, -3.5], None), "[1.0, 0.25, -3.5]");
        assert_eq!(format_list(&[1.0, 0.25], Some(3)), "[1.000, 0.250]");
        assert_eq!(format_list(&[], None), "[]");
        assert_eq!(format_list(&[0.1 + 0.2], None), "[0.30000000000000004]");
    }

    #[test]
    fn test_write_records() -> Result<(), PosesError> {
        let records = vec![
            PoseRecord {
                image_name: "a.png".to_string(),
                camera_model: "PINHOLE".to_string(),
                camera_params: "[1.0, 2.0, 3.0, 4.0]".to_string(),
                pose: "[1.0, 0.0]".to_string(),
                near: Some(0.5),
                far: Some(12.0),
            },
            PoseRecord {
                image_name: "b.png".to_string(),
                camera_model: "PINHOLE".to_string(),
                camera_params: "[1.0]".to_string(),
                pose: "[0.0]".to_string(),
                near: None,
                far: None,
            },
        ];

        let mut buffer = Vec::new();
        write_records(&mut buffer, &records)?;
        let text = String::from_utf8(buffer).map_err(|e| std::io::Error::other(e.to_string()))?;
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "image_name,camera_model,camera_params,pose,near,far");
        assert_eq!(
            lines[1],
            "a.png,PINHOLE,\"[1.0, 2.0, 3.0, 4.0]\",\"[1.0, 0.0]\",0.5,12.0"
        );
        assert_eq!(lines[2], "b.png,PINHOLE,[1.0],[0.0],,");
        Ok(())
    }

    #[test]
    fn test_assemble_length_mismatch() -> Result<(), PosesError> {
        use crate::io::colmap::{CameraModel, ColmapCamera, ColmapImage};

        let cameras = vec![ColmapCamera {
            camera_id: 1,
            model: CameraModel::SimplePinhole,
            width: 10,
            height: 10,
            params: vec![5.0, 5.0, 5.0],
        }];
        let images = (1..=2)
            .map(|image_id| ColmapImage {
                name: format!("{image_id}.png"),
                image_id,
                camera_id: 1,
                rotation: [1.0, 0.0, 0.0, 0.0],
                translation: [0.0; 3],
                points2d: vec![],
            })
            .collect::<Vec<_>>();
        let reconstruction = Reconstruction::new(cameras, images.clone(), vec![])?;
        let range = Some(DepthRange {
            near: 1.0,
            far: 2.0,
        });

        let one_transform = CameraTransforms::from_images(&images[..1])?;
        assert!(matches!(
            assemble_records(&reconstruction, &one_transform, &[range, range], None),
            Err(PosesError::LengthMismatch {
                what: "transforms",
                expected: 2,
                actual: 1
            })
        ));

        let transforms = CameraTransforms::from_images(&images)?;
        assert!(matches!(
            assemble_records(&reconstruction, &transforms, &[range], None),
            Err(PosesError::LengthMismatch {
                what: "depth ranges",
                expected: 2,
                actual: 1
            })
        ));

        let records = assemble_records(&reconstruction, &transforms, &[range, None], None)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].near, None);
        Ok(())
    }

    #[test]
    fn test_write_empty_table_has_header() -> Result<(), PosesError> {
        let mut buffer = Vec::new();
        write_records(&mut buffer, &[])?;
        assert_eq!(buffer, b"image_name,camera_model,camera_params,pose,near,far\n");
        Ok(())
    }
}
