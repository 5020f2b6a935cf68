use approx::assert_relative_eq;

use nerf_poses::io::colmap::{CameraModel, ColmapCamera, ColmapImage, ColmapPoint3d};
use nerf_poses::range::PercentileBounds;
use nerf_poses::records;
use nerf_poses::{
    extract_pose_records, EmptyVisibilityPolicy, ExtractOptions, PosesError, Reconstruction,
};

type Scene = (Vec<ColmapCamera>, Vec<ColmapImage>, Vec<ColmapPoint3d>);

fn pinhole(camera_id: u32) -> ColmapCamera {
    ColmapCamera {
        camera_id,
        model: CameraModel::Pinhole,
        width: 640,
        height: 480,
        params: vec![500.0, 500.0, 320.0, 240.0],
    }
}

fn image(image_id: u32, rotation: [f64; 4], translation: [f64; 3]) -> ColmapImage {
    ColmapImage {
        name: format!("frame_{image_id:03}.png"),
        image_id,
        camera_id: 1,
        rotation,
        translation,
        points2d: vec![],
    }
}

fn point(point3d_id: u64, xyz: [f64; 3], image_ids: &[u32]) -> ColmapPoint3d {
    ColmapPoint3d {
        point3d_id,
        xyz,
        rgb: [128, 128, 128],
        error: 0.5,
        track: image_ids.iter().map(|&id| (id, 0)).collect(),
    }
}

fn parse_list(text: &str) -> Vec<f64> {
    text.trim_matches(|c| c == '[' || c == ']')
        .split(", ")
        .map(|v| v.parse::<f64>().unwrap())
        .collect()
}

// two cameras looking down +z, centered at z = 0 and z = 5
fn two_camera_scene() -> Scene {
    let identity = [1.0, 0.0, 0.0, 0.0];
    (
        vec![pinhole(1)],
        vec![
            image(1, identity, [0.0, 0.0, 0.0]),
            image(2, identity, [0.0, 0.0, -5.0]),
        ],
        vec![
            point(1, [0.0, 0.0, 1.0], &[1, 2]),
            point(2, [0.0, 0.0, 3.0], &[1, 2]),
            point(3, [0.0, 0.0, 10.0], &[1, 2]),
        ],
    )
}

// a ring of cameras looking at a cloud around the origin
fn ring_scene(num_images: u32, num_points: u64) -> Scene {
    let images = (0..num_images)
        .map(|k| {
            // rotation about y, camera 6 units away from the origin
            let half = k as f64 * std::f64::consts::PI / num_images as f64;
            image(100 + k, [half.cos(), 0.0, half.sin(), 0.0], [0.0, 0.0, 6.0])
        })
        .collect::<Vec<_>>();
    let points = (0..num_points)
        .map(|k| {
            let t = k as f64;
            let observers = (0..num_images)
                .filter(|i| (k + *i as u64) % 3 != 0)
                .map(|i| 100 + i)
                .collect::<Vec<_>>();
            point(
                1000 + k,
                [(t * 0.7).sin() * 2.0, (t * 1.1).cos(), (t * 0.3).sin() * 1.5],
                &observers,
            )
        })
        .collect::<Vec<_>>();
    (vec![pinhole(1)], images, points)
}

#[test]
fn test_two_cameras_min_max() -> Result<(), PosesError> {
    let (cameras, images, points) = two_camera_scene();
    let rec = Reconstruction::new(cameras, images, points)?;
    let options = ExtractOptions {
        bounds: PercentileBounds::min_max(),
        ..Default::default()
    };

    let records = extract_pose_records(&rec, &options)?;
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].image_name, "frame_001.png");
    assert_eq!(records[0].near, Some(1.0));
    assert_eq!(records[0].far, Some(10.0));

    assert_eq!(records[1].near, Some(-4.0));
    assert_eq!(records[1].far, Some(5.0));
    assert_eq!(
        parse_list(&records[1].pose),
        vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 5.0]
    );
    assert_eq!(records[1].camera_model, "PINHOLE");
    assert_eq!(records[1].camera_params, "[500.0, 500.0, 320.0, 240.0]");
    Ok(())
}

#[test]
fn test_two_cameras_default_percentiles() -> Result<(), PosesError> {
    let (cameras, images, points) = two_camera_scene();
    let rec = Reconstruction::new(cameras, images, points)?;
    let records = extract_pose_records(&rec, &ExtractOptions::default())?;

    // with three points the trimmed bounds stay next to min and max
    let near = records[0].near.unwrap();
    let far = records[0].far.unwrap();
    assert_relative_eq!(near, 1.004, epsilon = 1e-9);
    assert_relative_eq!(far, 9.986, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_bounds_inside_visible_depths() -> Result<(), PosesError> {
    let (cameras, images, points) = ring_scene(8, 200);
    let rec = Reconstruction::new(cameras, images, points)?;

    let trimmed = extract_pose_records(&rec, &ExtractOptions::default())?;
    let full = extract_pose_records(
        &rec,
        &ExtractOptions {
            bounds: PercentileBounds::min_max(),
            ..Default::default()
        },
    )?;

    for (t, f) in trimmed.iter().zip(&full) {
        let (near, far) = (t.near.unwrap(), t.far.unwrap());
        let (min, max) = (f.near.unwrap(), f.far.unwrap());
        assert!(near <= far);
        assert!(min <= near && far <= max);
        // every camera is in front of the cloud
        assert!(min > 0.0);
    }
    Ok(())
}

#[test]
fn test_order_independence() -> Result<(), PosesError> {
    let (cameras, images, points) = ring_scene(6, 50);
    let sorted = extract_pose_records(
        &Reconstruction::new(cameras.clone(), images.clone(), points.clone())?,
        &ExtractOptions::default(),
    )?;

    let mut images = images;
    let mut points = points;
    images.reverse();
    images.swap(0, 3);
    points.reverse();
    points.swap(1, 40);
    let permuted = extract_pose_records(
        &Reconstruction::new(cameras, images, points)?,
        &ExtractOptions::default(),
    )?;

    assert_eq!(sorted, permuted);
    Ok(())
}

#[test]
fn test_unknown_observer_fails() -> Result<(), PosesError> {
    let (cameras, images, mut points) = two_camera_scene();
    points.push(point(4, [0.0, 0.0, 2.0], &[1, 77]));
    let rec = Reconstruction::new(cameras, images, points)?;

    let err = extract_pose_records(&rec, &ExtractOptions::default()).unwrap_err();
    assert!(err.is_input_inconsistency());
    assert!(matches!(
        err,
        PosesError::UnknownObserver {
            point3d_id: 4,
            image_id: 77
        }
    ));
    Ok(())
}

#[test]
fn test_missing_camera_fails() -> Result<(), PosesError> {
    let (cameras, mut images, points) = two_camera_scene();
    images[1].camera_id = 9;
    let rec = Reconstruction::new(cameras, images, points)?;

    let err = extract_pose_records(&rec, &ExtractOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        PosesError::MissingCamera {
            image_id: 2,
            camera_id: 9
        }
    ));
    Ok(())
}

#[test]
fn test_empty_visibility_policies() -> Result<(), PosesError> {
    let (cameras, mut images, points) = two_camera_scene();
    images.push(image(3, [1.0, 0.0, 0.0, 0.0], [1.0, 1.0, 1.0]));
    let rec = Reconstruction::new(cameras, images, points)?;

    let err = extract_pose_records(&rec, &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, PosesError::EmptyVisibility { image_id: 3, .. }));

    let records = extract_pose_records(
        &rec,
        &ExtractOptions {
            empty_visibility: EmptyVisibilityPolicy::Sentinel,
            ..Default::default()
        },
    )?;
    assert_eq!(records.len(), 3);
    assert_eq!((records[2].near, records[2].far), (None, None));
    assert!(records[0].near.is_some());
    Ok(())
}

#[test]
fn test_text_model_to_csv() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let model_dir = dir.path().join("sparse").join("0");
    std::fs::create_dir_all(&model_dir)?;

    std::fs::write(
        model_dir.join("cameras.txt"),
        "# Camera list\n1 SIMPLE_PINHOLE 100 80 50.0 50.0 40.0\n",
    )?;
    std::fs::write(
        model_dir.join("images.txt"),
        "# Image list\n\
         2 1.0 0.0 0.0 0.0 0.0 0.0 -5.0 1 far.png\n\
         1.0 1.0 1 2.0 2.0 2\n\
         1 1.0 0.0 0.0 0.0 0.0 0.0 0.0 1 near.png\n\
         1.0 1.0 1 2.0 2.0 2\n",
    )?;
    std::fs::write(
        model_dir.join("points3D.txt"),
        "# 3D point list\n\
         2 0.0 0.0 10.0 0 0 0 0.1 1 1 2 1\n\
         1 0.0 0.0 1.0 0 0 0 0.1 1 0 2 0\n",
    )?;

    let rec = Reconstruction::read(&model_dir)?;
    let records = extract_pose_records(
        &rec,
        &ExtractOptions {
            bounds: PercentileBounds::min_max(),
            precision: Some(2),
            ..Default::default()
        },
    )?;

    let output = dir.path().join("out").join("poses.csv");
    records::write_records_csv(&output, &records)?;

    let mut reader = csv::Reader::from_path(&output)?;
    assert_eq!(
        reader.headers()?.iter().collect::<Vec<_>>(),
        records::COLUMNS.to_vec()
    );
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "near.png");
    assert_eq!(&rows[0][1], "SIMPLE_PINHOLE");
    assert_eq!(&rows[0][2], "[50.00, 50.00, 40.00]");
    assert_eq!(&rows[0][4], "1.0");
    assert_eq!(&rows[0][5], "10.0");
    assert_eq!(&rows[1][0], "far.png");
    assert_eq!(
        &rows[1][3],
        "[1.00, 0.00, 0.00, 0.00, 0.00, 1.00, 0.00, 0.00, 0.00, 0.00, 1.00, 5.00]"
    );
    assert_eq!(&rows[1][4], "-4.0");
    assert_eq!(&rows[1][5], "5.0");
    Ok(())
}
