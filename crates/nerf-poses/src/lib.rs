#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Depth of the 3d points along the optical axis of each camera.
pub mod depth;

/// Error types.
pub mod error;
pub use error::PosesError;

/// I/O utilities for reading sparse reconstructions.
pub mod io;

/// Small fixed size linear algebra utilities.
pub mod linalg;

/// End to end extraction of the per image records.
pub mod pipeline;
pub use pipeline::{extract_pose_records, EmptyVisibilityPolicy, ExtractOptions};

/// Robust near and far bounds from the visible depths.
pub mod range;

/// Sparse reconstruction container with a stable ordering.
pub mod reconstruction;
pub use reconstruction::Reconstruction;

/// Output records and CSV writing.
pub mod records;

/// World to camera and camera to world transforms.
pub mod transforms;

/// Point x image visibility.
pub mod visibility;
