//! Deterministic stubs and generators for tests.
//!
//! The corner detection and calibration solve capabilities are replaced here
//! by fully predictable substitutes, so orchestration behavior (coverage
//! gating, validation accounting, blob layout) can be tested without any real
//! image processing.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use image::GrayImage;
use stereocal_core::{
    from_homogeneous, BoardGeometry, CorrespondenceSet, ImageSize, Iso3, Mat3, Mat3x4, Mat4, Pt2,
    Pt3, Real, StereoObservation, Vec2, Vec3,
};

use crate::detect::{CornerDetector, DetectOptions};
use crate::solve::{
    CameraSide, MonoCalibration, Rectification, SolveError, StereoCalibration, StereoCalibrator,
    StereoSolveOptions,
};

/// Corner set mapping the board template 1:1 into pixel coordinates.
pub fn template_corners(board: &BoardGeometry) -> Vec<Pt2> {
    board
        .object_points()
        .iter()
        .map(|p| Pt2::new(p.x, p.y))
        .collect()
}

/// Project 3D points through an ideal pinhole camera.
pub fn project_points(intrinsics: &Mat3, cam_from_board: &Iso3, points: &[Pt3]) -> Vec<Pt2> {
    points
        .iter()
        .map(|p| {
            let pc = cam_from_board.transform_point(p);
            let uv = intrinsics * Vec3::new(pc.x / pc.z, pc.y / pc.z, 1.0);
            from_homogeneous(&uv)
        })
        .collect()
}

/// Build a correspondence set covering `zone_count` zones, one identical
/// left/right observation per zone.
pub fn observation_set(board: &BoardGeometry, zone_count: usize) -> CorrespondenceSet {
    let intrinsics = Mat3::new(800.0, 0.0, 640.0, 0.0, 800.0, 400.0, 0.0, 0.0, 1.0);
    let object = board.object_points();
    let views = (0..zone_count)
        .map(|zone| {
            let pose = Iso3::translation(
                -0.5 + 0.05 * zone as Real,
                -0.3,
                1.0 + 0.1 * zone as Real,
            );
            let pixels = project_points(&intrinsics, &pose, &object);
            StereoObservation::new(zone, object.clone(), pixels.clone(), pixels)
                .expect("template and projection lengths match")
        })
        .collect();
    CorrespondenceSet::new(views, ImageSize::new(1280, 800))
}

/// Detector stub returning the same corner set for every image.
#[derive(Debug, Clone)]
pub struct FixedCornerDetector {
    corners: Vec<Pt2>,
}

impl FixedCornerDetector {
    pub fn new(corners: Vec<Pt2>) -> Self {
        Self { corners }
    }
}

impl CornerDetector for FixedCornerDetector {
    fn find_corners(
        &self,
        _image: &GrayImage,
        _board: &BoardGeometry,
        _opts: &DetectOptions,
    ) -> Option<Vec<Pt2>> {
        Some(self.corners.clone())
    }
}

/// Detector stub replaying a scripted sequence of responses, one per call.
///
/// Once the script is exhausted every further call reports no detection.
#[derive(Debug)]
pub struct ScriptedDetector {
    responses: RefCell<VecDeque<Option<Vec<Pt2>>>>,
}

impl ScriptedDetector {
    pub fn new(responses: Vec<Option<Vec<Pt2>>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
        }
    }
}

impl CornerDetector for ScriptedDetector {
    fn find_corners(
        &self,
        _image: &GrayImage,
        _board: &BoardGeometry,
        _opts: &DetectOptions,
    ) -> Option<Vec<Pt2>> {
        self.responses.borrow_mut().pop_front().unwrap_or(None)
    }
}

/// Detector stub alternating between a base corner set (even calls) and the
/// same set shifted by `offset` (odd calls).
///
/// The validator queries left then right per pair, so this plants a fixed
/// disparity between the two views.
#[derive(Debug)]
pub struct OffsetCornerDetector {
    base: Vec<Pt2>,
    offset: Vec2,
    calls: Cell<usize>,
}

impl OffsetCornerDetector {
    pub fn new(base: Vec<Pt2>, offset: Vec2) -> Self {
        Self {
            base,
            offset,
            calls: Cell::new(0),
        }
    }
}

impl CornerDetector for OffsetCornerDetector {
    fn find_corners(
        &self,
        _image: &GrayImage,
        _board: &BoardGeometry,
        _opts: &DetectOptions,
    ) -> Option<Vec<Pt2>> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if call % 2 == 0 {
            Some(self.base.clone())
        } else {
            Some(self.base.iter().map(|p| *p + self.offset).collect())
        }
    }
}

/// Ideal solver stub: preset intrinsics, zero distortion, a pure horizontal
/// baseline and identity rectification rotations.
///
/// With identical left/right observations this makes both rectifying
/// homographies the identity, so a validation pass over the capture set
/// reports zero epipolar error.
#[derive(Debug, Clone)]
pub struct SyntheticCalibrator {
    pub intrinsics: Mat3,
    pub baseline: Real,
}

impl Default for SyntheticCalibrator {
    fn default() -> Self {
        Self {
            intrinsics: Mat3::new(800.0, 0.0, 640.0, 0.0, 800.0, 400.0, 0.0, 0.0, 1.0),
            baseline: 7.5,
        }
    }
}

impl StereoCalibrator for SyntheticCalibrator {
    fn calibrate_single(
        &self,
        _set: &CorrespondenceSet,
        _side: CameraSide,
    ) -> Result<MonoCalibration, SolveError> {
        Ok(MonoCalibration {
            intrinsics: self.intrinsics,
            distortion: vec![0.0; 14],
        })
    }

    fn calibrate_stereo(
        &self,
        _set: &CorrespondenceSet,
        left_seed: &MonoCalibration,
        right_seed: &MonoCalibration,
        _opts: &StereoSolveOptions,
    ) -> Result<StereoCalibration, SolveError> {
        let translation = Vec3::new(-self.baseline, 0.0, 0.0);
        let essential = skew(&translation);

        let m1_inv = left_seed
            .intrinsics
            .try_inverse()
            .ok_or_else(|| SolveError::new("left seed intrinsics not invertible"))?;
        let m2_inv = right_seed
            .intrinsics
            .try_inverse()
            .ok_or_else(|| SolveError::new("right seed intrinsics not invertible"))?;
        let fundamental = m2_inv.transpose() * essential * m1_inv;

        Ok(StereoCalibration {
            left: left_seed.clone(),
            right: right_seed.clone(),
            rotation: Mat3::identity(),
            translation,
            essential,
            fundamental,
        })
    }

    fn rectify(
        &self,
        stereo: &StereoCalibration,
        _image_size: ImageSize,
    ) -> Result<Rectification, SolveError> {
        let m = stereo.left.intrinsics;
        let mut p1 = Mat3x4::zeros();
        p1.fixed_view_mut::<3, 3>(0, 0).copy_from(&m);
        let mut p2 = p1;
        p2.set_column(3, &(m * stereo.translation));

        let fx = m[(0, 0)];
        let cx = m[(0, 2)];
        let cy = m[(1, 2)];
        let mut q = Mat4::zeros();
        q[(0, 0)] = 1.0;
        q[(0, 3)] = -cx;
        q[(1, 1)] = 1.0;
        q[(1, 3)] = -cy;
        q[(2, 3)] = fx;
        q[(3, 2)] = 1.0 / self.baseline;

        Ok(Rectification {
            r1: Mat3::identity(),
            r2: Mat3::identity(),
            p1,
            p2,
            q,
        })
    }
}

fn skew(v: &Vec3) -> Mat3 {
    Mat3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn project_points_hits_principal_point_on_axis() {
        let intrinsics = Mat3::new(800.0, 0.0, 640.0, 0.0, 800.0, 400.0, 0.0, 0.0, 1.0);
        let pose = Iso3::translation(0.0, 0.0, 2.0);
        let projected = project_points(&intrinsics, &pose, &[Pt3::new(0.0, 0.0, 0.0)]);
        assert_relative_eq!(projected[0].x, 640.0);
        assert_relative_eq!(projected[0].y, 400.0);
    }

    #[test]
    fn scripted_detector_replays_in_order_then_dries_up() {
        let corners = vec![Pt2::new(1.0, 1.0)];
        let detector = ScriptedDetector::new(vec![Some(corners.clone()), None]);
        let board = BoardGeometry::default();
        let image = GrayImage::new(4, 4);
        let opts = DetectOptions::capture();

        assert_eq!(detector.find_corners(&image, &board, &opts), Some(corners));
        assert_eq!(detector.find_corners(&image, &board, &opts), None);
        assert_eq!(detector.find_corners(&image, &board, &opts), None);
    }

    #[test]
    fn synthetic_solver_yields_identity_rectification() {
        let board = BoardGeometry::default();
        let set = observation_set(&board, 3);
        let solver = SyntheticCalibrator::default();

        let left = solver.calibrate_single(&set, CameraSide::Left).unwrap();
        let right = solver.calibrate_single(&set, CameraSide::Right).unwrap();
        let stereo = solver
            .calibrate_stereo(&set, &left, &right, &StereoSolveOptions::default())
            .unwrap();
        let rectification = solver.rectify(&stereo, set.image_size).unwrap();

        assert_eq!(rectification.r1, Mat3::identity());
        assert_eq!(rectification.r2, Mat3::identity());
        assert_eq!(stereo.translation.x, -7.5);
    }
}
