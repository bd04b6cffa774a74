//! Stereo rig calibration pipeline.
//!
//! This crate orchestrates the capture-validate-solve flow for a left/right
//! camera rig:
//!
//! 1. [`dataset`] discovers and validates left/right image pairs on disk.
//! 2. [`session`] runs corner detection per pair and tracks which capture
//!    zones have been covered; the solve is gated on full coverage.
//! 3. [`solve`] drives the injected calibration solver (single-camera solves,
//!    joint stereo refinement, rectification) and derives the rectifying
//!    pixel homographies.
//! 4. [`epipolar`] warps a validation set through the rectification and
//!    measures residual vertical disparity as the acceptance metric.
//! 5. [`blob`] serializes the solved parameters into the fixed binary layout
//!    consumed by the on-device vision pipeline.
//!
//! Corner detection and the numerical solver are consumed through the
//! [`detect::CornerDetector`] and [`solve::StereoCalibrator`] capabilities, so
//! the orchestration stays deterministic and testable with the stubs in
//! [`synthetic`]. A ChESS-based detector is available behind the
//! `chess-detector` feature.
//!
//! # Example
//!
//! ```
//! use stereocal_core::BoardGeometry;
//! use stereocal_pipeline::solve::solve_calibration;
//! use stereocal_pipeline::synthetic::{observation_set, SyntheticCalibrator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let board = BoardGeometry::default();
//! let set = observation_set(&board, 13);
//! let solver = SyntheticCalibrator::default();
//!
//! let result = solve_calibration(&set, &solver)?;
//! assert_eq!(result.stereo.left.distortion.len(), 14);
//! # Ok(())
//! # }
//! ```

/// Fixed-layout binary parameter export.
pub mod blob;
/// Stereo dataset discovery and loading.
pub mod dataset;
/// Corner detection capability.
pub mod detect;
/// Epipolar-consistency validation.
pub mod epipolar;
/// End-to-end pipeline entry points.
pub mod pipeline;
/// Capture session and zone-coverage tracking.
pub mod session;
/// Calibration solve capability and result types.
pub mod solve;
/// Deterministic stubs and generators for tests.
pub mod synthetic;

pub use stereocal_core as core;

pub use blob::{blob_bytes, write_blob, write_blob_file, BlobError, BLOB_LEN};
pub use dataset::{load_gray, InputError, StereoDataset};
pub use detect::{CornerDetector, DetectOptions, RefineCriteria};
pub use epipolar::{
    evaluate_epipolar, EpipolarReport, ValidationError, EPIPOLAR_PASS_THRESHOLD_PX,
};
pub use pipeline::{
    run_calibration, run_calibration_with_options, CalibrationRunReport, PipelineError,
};
pub use session::{CaptureSession, CoverageError, IngestOutcome, RejectReason};
pub use solve::{
    rectifying_homographies, solve_calibration, solve_calibration_with_options, CalibrationResult,
    CameraSide, MonoCalibration, Rectification, SolveCriteria, SolveError, StereoCalibration,
    StereoCalibrator, StereoSolveOptions,
};

#[cfg(feature = "chess-detector")]
pub use detect::ChessCornersDetector;
