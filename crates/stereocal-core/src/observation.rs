//! Stereo observation containers.
//!
//! A [`StereoObservation`] stores one accepted left/right corner pair together
//! with the board template it corresponds to; a [`CorrespondenceSet`] is the
//! immutable snapshot of all accepted observations handed to the solver.

use crate::{ImageSize, Pt2, Pt3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing observation containers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObservationError {
    /// Left and right corner counts differ.
    #[error("left / right corner counts must match: {left} vs {right}")]
    CornerCountMismatch { left: usize, right: usize },
    /// Corner counts differ from the object template.
    #[error("corner count {corners} does not match object template size {object}")]
    TemplateMismatch { corners: usize, object: usize },
}

/// One accepted left/right observation of the board, tied to a capture zone.
///
/// Immutable after construction; corners are stored in template order so the
/// `k`-th entry of every field refers to the same physical board corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StereoObservation {
    /// Capture zone this pair was recorded for.
    pub zone_index: usize,
    /// Planar board template (Z=0), scaled by the physical square size.
    pub object_points: Vec<Pt3>,
    /// Refined corner positions in the left image.
    pub left_points: Vec<Pt2>,
    /// Refined corner positions in the right image.
    pub right_points: Vec<Pt2>,
}

impl StereoObservation {
    /// Construct a validated observation.
    ///
    /// # Errors
    ///
    /// Returns an error if the left/right corner counts differ, or if either
    /// differs from the object template length.
    pub fn new(
        zone_index: usize,
        object_points: Vec<Pt3>,
        left_points: Vec<Pt2>,
        right_points: Vec<Pt2>,
    ) -> Result<Self, ObservationError> {
        if left_points.len() != right_points.len() {
            return Err(ObservationError::CornerCountMismatch {
                left: left_points.len(),
                right: right_points.len(),
            });
        }
        if left_points.len() != object_points.len() {
            return Err(ObservationError::TemplateMismatch {
                corners: left_points.len(),
                object: object_points.len(),
            });
        }
        Ok(Self {
            zone_index,
            object_points,
            left_points,
            right_points,
        })
    }

    /// Number of corner correspondences in this observation.
    #[inline]
    pub fn len(&self) -> usize {
        self.object_points.len()
    }

    /// Returns true if the observation holds no correspondences.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.object_points.is_empty()
    }
}

/// Immutable solver input: every accepted observation plus the image size.
///
/// Produced by a finalized capture session once full zone coverage is proven;
/// the solver never sees partially covered data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrespondenceSet {
    /// Accepted observations in ingest order.
    pub views: Vec<StereoObservation>,
    /// Dimensions of the calibration images.
    pub image_size: ImageSize,
}

impl CorrespondenceSet {
    pub fn new(views: Vec<StereoObservation>, image_size: ImageSize) -> Self {
        Self { views, image_size }
    }

    /// Number of observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Total corner correspondences across all observations.
    pub fn total_points(&self) -> usize {
        self.views.iter().map(StereoObservation::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points2(n: usize) -> Vec<Pt2> {
        (0..n).map(|i| Pt2::new(i as f64, i as f64)).collect()
    }

    fn points3(n: usize) -> Vec<Pt3> {
        (0..n).map(|i| Pt3::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn observation_validates_counts() {
        let obs = StereoObservation::new(2, points3(4), points2(4), points2(4)).unwrap();
        assert_eq!(obs.zone_index, 2);
        assert_eq!(obs.len(), 4);
        assert!(!obs.is_empty());
    }

    #[test]
    fn observation_rejects_left_right_mismatch() {
        let err = StereoObservation::new(0, points3(4), points2(4), points2(3)).unwrap_err();
        assert_eq!(err, ObservationError::CornerCountMismatch { left: 4, right: 3 });
    }

    #[test]
    fn observation_rejects_template_mismatch() {
        let err = StereoObservation::new(0, points3(5), points2(4), points2(4)).unwrap_err();
        assert_eq!(err, ObservationError::TemplateMismatch { corners: 4, object: 5 });
    }

    #[test]
    fn correspondence_set_counts_points() {
        let views = vec![
            StereoObservation::new(0, points3(4), points2(4), points2(4)).unwrap(),
            StereoObservation::new(1, points3(4), points2(4), points2(4)).unwrap(),
        ];
        let set = CorrespondenceSet::new(views, ImageSize::new(1280, 800));
        assert_eq!(set.len(), 2);
        assert_eq!(set.total_points(), 8);
    }

    #[test]
    fn observation_serde_roundtrip() {
        let obs = StereoObservation::new(3, points3(2), points2(2), points2(2)).unwrap();
        let json = serde_json::to_string(&obs).unwrap();
        let restored: StereoObservation = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.zone_index, 3);
        assert_eq!(restored.len(), obs.len());
    }
}
