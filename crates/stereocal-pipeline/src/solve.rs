//! Calibration solve capability and result types.
//!
//! The numerical solver (single-camera calibration, joint stereo refinement,
//! rectification) is consumed through [`StereoCalibrator`]. The
//! orchestration in this module only sequences the stages and derives the
//! rectifying pixel homographies from the solver's output.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use stereocal_core::{
    CorrespondenceSet, ImageSize, Mat3, Mat3x4, Mat4, Pt2, Real, StereoObservation, Vec3,
};

/// A calibration solve stage failed.
#[derive(Debug, Error)]
#[error("calibration solve failed: {0}")]
pub struct SolveError(String);

impl SolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Which camera of the rig a single-camera solve refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraSide {
    Left,
    Right,
}

impl CameraSide {
    /// The image points of `observation` seen by this camera.
    pub fn image_points<'a>(&self, observation: &'a StereoObservation) -> &'a [Pt2] {
        match self {
            CameraSide::Left => &observation.left_points,
            CameraSide::Right => &observation.right_points,
        }
    }
}

/// Convergence criteria for the joint stereo refinement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveCriteria {
    pub max_iters: u32,
    pub eps: Real,
}

/// Options forwarded to the stereo solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StereoSolveOptions {
    /// Seed the joint solve with the single-camera intrinsics as an initial
    /// guess rather than holding them fixed.
    pub use_intrinsic_guess: bool,
    /// Solve the extended 14-coefficient rational distortion model.
    pub rational_model: bool,
    pub criteria: SolveCriteria,
}

impl Default for StereoSolveOptions {
    fn default() -> Self {
        Self {
            use_intrinsic_guess: true,
            rational_model: true,
            criteria: SolveCriteria {
                max_iters: 100,
                eps: 1e-5,
            },
        }
    }
}

/// Single-camera solve output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonoCalibration {
    /// 3×3 intrinsic matrix.
    pub intrinsics: Mat3,
    /// Distortion coefficients; up to 14 for the rational model.
    pub distortion: Vec<Real>,
}

/// Joint stereo solve output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StereoCalibration {
    pub left: MonoCalibration,
    pub right: MonoCalibration,
    /// Rotation mapping the left camera frame into the right.
    pub rotation: Mat3,
    /// Translation mapping the left camera frame into the right.
    pub translation: Vec3,
    pub essential: Mat3,
    pub fundamental: Mat3,
}

/// Stereo rectification output: per-camera rotations and projections that
/// align epipolar lines to image rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectification {
    /// Left rectification rotation.
    pub r1: Mat3,
    /// Right rectification rotation.
    pub r2: Mat3,
    /// Left projection matrix in the rectified frame.
    pub p1: Mat3x4,
    /// Right projection matrix in the rectified frame.
    pub p2: Mat3x4,
    /// Disparity-to-depth mapping.
    pub q: Mat4,
}

/// The calibration solve capability.
pub trait StereoCalibrator {
    /// Single-camera intrinsics solve over the full correspondence set.
    fn calibrate_single(
        &self,
        set: &CorrespondenceSet,
        side: CameraSide,
    ) -> Result<MonoCalibration, SolveError>;

    /// Joint stereo refinement seeded with the single-camera results.
    fn calibrate_stereo(
        &self,
        set: &CorrespondenceSet,
        left_seed: &MonoCalibration,
        right_seed: &MonoCalibration,
        opts: &StereoSolveOptions,
    ) -> Result<StereoCalibration, SolveError>;

    /// Row-aligning rectification for the calibrated pair.
    fn rectify(
        &self,
        stereo: &StereoCalibration,
        image_size: ImageSize,
    ) -> Result<Rectification, SolveError>;
}

/// Full solved parameter set for one calibration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub stereo: StereoCalibration,
    pub rectification: Rectification,
    /// Rectifying homography for raw left pixels.
    pub h_left: Mat3,
    /// Rectifying homography for raw right pixels.
    pub h_right: Mat3,
}

/// Derive the rectifying pixel homographies from intrinsics and rectification
/// rotations.
///
/// `H_left = M2 · R1 · M1⁻¹` maps raw left pixels into the rectified frame.
/// The right transform reuses `M2` on both sides, `H_right = M2 · R2 · M2⁻¹`;
/// the on-device pipeline consumes parameters built exactly this way, so the
/// asymmetry is load-bearing and must not be "corrected".
///
/// # Errors
///
/// Returns [`SolveError`] when an intrinsic matrix is not invertible.
pub fn rectifying_homographies(
    stereo: &StereoCalibration,
    rectification: &Rectification,
) -> Result<(Mat3, Mat3), SolveError> {
    let m1 = &stereo.left.intrinsics;
    let m2 = &stereo.right.intrinsics;
    let m1_inv = m1
        .try_inverse()
        .ok_or_else(|| SolveError::new("left intrinsic matrix is not invertible"))?;
    let m2_inv = m2
        .try_inverse()
        .ok_or_else(|| SolveError::new("right intrinsic matrix is not invertible"))?;

    let h_left = m2 * rectification.r1 * m1_inv;
    let h_right = m2 * rectification.r2 * m2_inv;
    Ok((h_left, h_right))
}

/// Run the full solve sequence with default stereo options.
///
/// # Errors
///
/// Propagates the first failing solver stage.
pub fn solve_calibration<S: StereoCalibrator>(
    set: &CorrespondenceSet,
    solver: &S,
) -> Result<CalibrationResult, SolveError> {
    solve_calibration_with_options(set, solver, &StereoSolveOptions::default())
}

/// Run the full solve sequence: independent single-camera solves, joint
/// stereo refinement seeded by them, rectification, homography derivation.
pub fn solve_calibration_with_options<S: StereoCalibrator>(
    set: &CorrespondenceSet,
    solver: &S,
    opts: &StereoSolveOptions,
) -> Result<CalibrationResult, SolveError> {
    let left = solver.calibrate_single(set, CameraSide::Left)?;
    let right = solver.calibrate_single(set, CameraSide::Right)?;
    let stereo = solver.calibrate_stereo(set, &left, &right, opts)?;
    let rectification = solver.rectify(&stereo, set.image_size)?;
    let (h_left, h_right) = rectifying_homographies(&stereo, &rectification)?;

    Ok(CalibrationResult {
        stereo,
        rectification,
        h_left,
        h_right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    fn mono(fx: Real, fy: Real, cx: Real, cy: Real) -> MonoCalibration {
        MonoCalibration {
            intrinsics: Mat3::new(fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0),
            distortion: vec![0.0; 14],
        }
    }

    fn stereo_fixture() -> (StereoCalibration, Rectification) {
        let stereo = StereoCalibration {
            left: mono(800.0, 790.0, 640.0, 400.0),
            right: mono(810.0, 805.0, 635.0, 395.0),
            rotation: Mat3::identity(),
            translation: Vec3::new(-7.5, 0.0, 0.0),
            essential: Mat3::zeros(),
            fundamental: Mat3::zeros(),
        };
        let rectification = Rectification {
            r1: *Rotation3::from_euler_angles(0.01, -0.02, 0.005).matrix(),
            r2: *Rotation3::from_euler_angles(-0.01, 0.015, -0.004).matrix(),
            p1: Mat3x4::zeros(),
            p2: Mat3x4::zeros(),
            q: Mat4::zeros(),
        };
        (stereo, rectification)
    }

    #[test]
    fn default_options_match_solver_contract() {
        let opts = StereoSolveOptions::default();
        assert!(opts.use_intrinsic_guess);
        assert!(opts.rational_model);
        assert_eq!(opts.criteria.max_iters, 100);
        assert_eq!(opts.criteria.eps, 1e-5);
    }

    #[test]
    fn left_homography_projects_through_both_intrinsics() {
        let (stereo, rectification) = stereo_fixture();
        let (h_left, _) = rectifying_homographies(&stereo, &rectification).unwrap();

        let expected = stereo.right.intrinsics
            * rectification.r1
            * stereo.left.intrinsics.try_inverse().unwrap();
        assert_relative_eq!(h_left, expected, epsilon = 1e-12);
    }

    #[test]
    fn right_homography_reuses_right_intrinsics_on_both_sides() {
        let (stereo, rectification) = stereo_fixture();
        let (_, h_right) = rectifying_homographies(&stereo, &rectification).unwrap();

        let m2 = stereo.right.intrinsics;
        let with_m2 = m2 * rectification.r2 * m2.try_inverse().unwrap();
        let with_m1 = m2 * rectification.r2 * stereo.left.intrinsics.try_inverse().unwrap();

        assert_relative_eq!(h_right, with_m2, epsilon = 1e-12);
        // The symmetric-looking variant is a different matrix; the consumer
        // expects the M2-on-both-sides form.
        assert!((h_right - with_m1).norm() > 1e-6);
    }

    #[test]
    fn singular_intrinsics_are_rejected() {
        let (mut stereo, rectification) = stereo_fixture();
        stereo.left.intrinsics = Mat3::zeros();
        let err = rectifying_homographies(&stereo, &rectification).unwrap_err();
        assert!(err.to_string().contains("not invertible"));
    }

    #[test]
    fn camera_side_selects_matching_points() {
        let observation = StereoObservation::new(
            0,
            vec![stereocal_core::Pt3::new(0.0, 0.0, 0.0)],
            vec![Pt2::new(1.0, 2.0)],
            vec![Pt2::new(3.0, 4.0)],
        )
        .unwrap();
        assert_eq!(CameraSide::Left.image_points(&observation)[0], Pt2::new(1.0, 2.0));
        assert_eq!(CameraSide::Right.image_points(&observation)[0], Pt2::new(3.0, 4.0));
    }
}
