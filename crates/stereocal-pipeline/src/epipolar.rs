//! Epipolar-consistency validation.
//!
//! After the solve, each validation pair is warped through the rectifying
//! homographies; corners re-detected on the warped images should land on the
//! same row in both views. The mean absolute row disparity over every matched
//! corner is the calibration acceptance metric. Whether a given value passes
//! is caller policy; this module always reports the measured scalar.

use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{warp, Interpolation, Projection};
use log::{debug, info};
use thiserror::Error;
use stereocal_core::{mat3_row_major, BoardGeometry, Mat3, Real};

use crate::detect::{CornerDetector, DetectOptions};

/// Advisory acceptance threshold in pixels. Enforcement is caller policy.
pub const EPIPOLAR_PASS_THRESHOLD_PX: Real = 0.5;

/// Validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A rectifying homography could not be inverted for warping.
    #[error("rectifying homography is singular")]
    SingularHomography,
    /// No corner pairs survived rectification; the error is undefined and the
    /// run must be treated as inconclusive, not as a passing low-error result.
    #[error("no corner pairs survived rectification; epipolar error is undefined")]
    Degenerate,
}

/// Result of an epipolar validation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpipolarReport {
    /// Mean of `|y_left - y_right|` over all matched corners, in pixels.
    pub average_error_px: Real,
    /// Pairs where detection succeeded on both warped images.
    pub evaluated_pairs: usize,
    /// Pairs skipped because detection failed after warping.
    pub skipped_pairs: usize,
    /// Total matched corners behind the average.
    pub point_count: usize,
}

impl EpipolarReport {
    /// Convenience check against [`EPIPOLAR_PASS_THRESHOLD_PX`].
    pub fn within_default_threshold(&self) -> bool {
        self.average_error_px < EPIPOLAR_PASS_THRESHOLD_PX
    }
}

/// Measure residual vertical disparity over a validation set.
///
/// Each image is warped by the corresponding homography as an inverse map
/// (the output samples the source at `H · (x, y)`, cubic interpolation,
/// out-of-range pixels filled black), then corners are re-detected with the
/// relaxed validation options. Pairs where either detection fails contribute
/// no points and are skipped silently: a quality signal, not an error.
///
/// # Errors
///
/// - [`ValidationError::SingularHomography`] when a homography cannot be
///   inverted for warping.
/// - [`ValidationError::Degenerate`] when zero corners were matched across
///   all pairs.
pub fn evaluate_epipolar<D: CornerDetector>(
    detector: &D,
    board: &BoardGeometry,
    pairs: &[(GrayImage, GrayImage)],
    h_left: &Mat3,
    h_right: &Mat3,
) -> Result<EpipolarReport, ValidationError> {
    let warp_left = inverse_projection(h_left)?;
    let warp_right = inverse_projection(h_right)?;
    let opts = DetectOptions::validation();

    let mut left_points = Vec::new();
    let mut right_points = Vec::new();
    let mut evaluated_pairs = 0usize;
    let mut skipped_pairs = 0usize;

    for (left, right) in pairs {
        let warped_left = warp(left, &warp_left, Interpolation::Bicubic, Luma([0u8]));
        let warped_right = warp(right, &warp_right, Interpolation::Bicubic, Luma([0u8]));

        let detected_left = detector.find_corners(&warped_left, board, &opts);
        let detected_right = detector.find_corners(&warped_right, board, &opts);
        match (detected_left, detected_right) {
            (Some(l), Some(r)) => {
                left_points.extend(l);
                right_points.extend(r);
                evaluated_pairs += 1;
            }
            _ => {
                debug!("skipping validation pair: corners not found after warping");
                skipped_pairs += 1;
            }
        }
    }

    if left_points.is_empty() {
        return Err(ValidationError::Degenerate);
    }

    let total: Real = left_points
        .iter()
        .zip(&right_points)
        .map(|(l, r)| (l.y - r.y).abs())
        .sum();
    let average_error_px = total / left_points.len() as Real;
    info!(
        "average epipolar error {average_error_px:.4} px over {} corners ({evaluated_pairs} pairs, {skipped_pairs} skipped)",
        left_points.len()
    );

    Ok(EpipolarReport {
        average_error_px,
        evaluated_pairs,
        skipped_pairs,
        point_count: left_points.len(),
    })
}

/// Projection warping the output through `h` (inverse-map semantics).
fn inverse_projection(h: &Mat3) -> Result<Projection, ValidationError> {
    let m = mat3_row_major(h).map(|v| v as f32);
    Projection::from_matrix(m)
        .map(Projection::invert)
        .ok_or(ValidationError::SingularHomography)
}
