//! End-to-end pipeline entry points.
//!
//! [`run_calibration`] wires the stages together for a dataset on disk:
//! discover and pair the capture files, ingest every pair through a
//! [`CaptureSession`], gate the solve on full zone coverage, run the injected
//! solver, export the parameter blob and measure the epipolar acceptance
//! metric. The epipolar scalar is always returned; comparing it against a
//! threshold (see [`crate::epipolar::EPIPOLAR_PASS_THRESHOLD_PX`]) is the
//! caller's decision.

use std::path::Path;

use image::GrayImage;
use log::info;
use thiserror::Error;
use stereocal_core::{zone_index_from_file_name, BoardGeometry, ObservationError, ZoneError};

use crate::blob::{write_blob_file, BlobError};
use crate::dataset::{load_gray, InputError, StereoDataset};
use crate::detect::CornerDetector;
use crate::epipolar::{evaluate_epipolar, EpipolarReport, ValidationError};
use crate::session::{CaptureSession, CoverageError};
use crate::solve::{
    solve_calibration_with_options, CalibrationResult, SolveError, StereoCalibrator,
    StereoSolveOptions,
};

/// Any failure that aborts a calibration run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Zone(#[from] ZoneError),
    #[error(transparent)]
    Observation(#[from] ObservationError),
    #[error(transparent)]
    Coverage(#[from] CoverageError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Blob(#[from] BlobError),
}

/// Summary of a completed calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationRunReport {
    pub result: CalibrationResult,
    pub epipolar: EpipolarReport,
    /// Pairs accepted by detection on both sides.
    pub accepted_pairs: usize,
    /// Pairs found in the dataset.
    pub total_pairs: usize,
}

/// Run the full pipeline with default stereo solve options.
///
/// See [`run_calibration_with_options`].
pub fn run_calibration<D, S>(
    dataset_root: &Path,
    out_path: &Path,
    detector: &D,
    solver: &S,
    board: BoardGeometry,
) -> Result<CalibrationRunReport, PipelineError>
where
    D: CornerDetector,
    S: StereoCalibrator,
{
    run_calibration_with_options(
        dataset_root,
        out_path,
        detector,
        solver,
        board,
        &StereoSolveOptions::default(),
    )
}

/// Run the full pipeline over `dataset_root/left` and `dataset_root/right`.
///
/// The parameter blob is written to `out_path` once the solve succeeds and
/// before validation runs, mirroring the device flashing flow: a blob plus a
/// failing epipolar check means "solved but unacceptable", which the caller
/// distinguishes from a fatal abort.
///
/// # Errors
///
/// Fatal failures ([`InputError`], [`CoverageError`]) abort before any blob
/// is written. [`ValidationError::Degenerate`] aborts after the blob write
/// and must be treated as inconclusive rather than as a passing result.
pub fn run_calibration_with_options<D, S>(
    dataset_root: &Path,
    out_path: &Path,
    detector: &D,
    solver: &S,
    board: BoardGeometry,
    opts: &StereoSolveOptions,
) -> Result<CalibrationRunReport, PipelineError>
where
    D: CornerDetector,
    S: StereoCalibrator,
{
    let dataset = StereoDataset::discover(dataset_root)?;

    let mut session = CaptureSession::new(detector, board);
    let mut images: Vec<(GrayImage, GrayImage)> = Vec::with_capacity(dataset.len());
    for pair in &dataset.pairs {
        let name = pair
            .left
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let zone_index = zone_index_from_file_name(name)?;
        let left = load_gray(&pair.left)?;
        let right = load_gray(&pair.right)?;
        session.ingest(&left, &right, zone_index)?;
        images.push((left, right));
    }

    let accepted_pairs = session.accepted();
    let total_pairs = session.attempted();
    info!("{accepted_pairs} of {total_pairs} pairs used for calibration");

    let set = session.finalize()?;
    let result = solve_calibration_with_options(&set, solver, opts)?;
    write_blob_file(out_path, &result)?;

    let epipolar = evaluate_epipolar(detector, &board, &images, &result.h_left, &result.h_right)?;

    Ok(CalibrationRunReport {
        result,
        epipolar,
        accepted_pairs,
        total_pairs,
    })
}
