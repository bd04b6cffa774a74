//! Capture session: per-pair validation and zone-coverage tracking.
//!
//! A [`CaptureSession`] owns the correspondence accumulator for one
//! calibration run. Pairs are ingested one at a time; a pair is recorded only
//! when corner detection succeeds on both images. [`CaptureSession::finalize`]
//! proves full zone coverage and hands the solver an immutable snapshot; the
//! solve is unreachable on incomplete coverage.

use std::collections::BTreeSet;

use image::GrayImage;
use log::{debug, warn};
use thiserror::Error;
use stereocal_core::{
    BoardGeometry, CorrespondenceSet, ImageSize, ObservationError, StereoObservation, ZONE_COUNT,
};

use crate::detect::{CornerDetector, DetectOptions};

/// Zone coverage is incomplete: re-run capture for the listed zones.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing valid image pairs for {} of {zone_count} zones: {missing:?}; re-run capture for these zones", .missing.len())]
pub struct CoverageError {
    /// Every zone index without an accepted pair, ascending.
    pub missing: Vec<usize>,
    /// Configured zone count for this run.
    pub zone_count: usize,
}

/// Why a pair was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    LeftNotFound,
    RightNotFound,
    BothNotFound,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::LeftNotFound => "corners not found in left image",
            RejectReason::RightNotFound => "corners not found in right image",
            RejectReason::BothNotFound => "corners not found in either image",
        };
        f.write_str(s)
    }
}

/// Outcome of ingesting one left/right pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Both detections succeeded; the pair was recorded for `zone_index`.
    Accepted { zone_index: usize },
    /// The pair was dropped; session state is unchanged.
    Rejected {
        zone_index: usize,
        reason: RejectReason,
    },
}

/// Accumulates validated stereo observations for one calibration run.
pub struct CaptureSession<D> {
    detector: D,
    board: BoardGeometry,
    zone_count: usize,
    image_size: Option<ImageSize>,
    views: Vec<StereoObservation>,
    covered: BTreeSet<usize>,
    attempted: usize,
}

impl<D: CornerDetector> CaptureSession<D> {
    /// New session over the standard capture layout ([`ZONE_COUNT`] zones).
    pub fn new(detector: D, board: BoardGeometry) -> Self {
        Self::with_zone_count(detector, board, ZONE_COUNT)
    }

    /// New session expecting coverage of `zone_count` zones.
    pub fn with_zone_count(detector: D, board: BoardGeometry, zone_count: usize) -> Self {
        Self {
            detector,
            board,
            zone_count,
            image_size: None,
            views: Vec::new(),
            covered: BTreeSet::new(),
            attempted: 0,
        }
    }

    /// Run detection on both images and record the pair on success.
    ///
    /// Rejection leaves the session untouched apart from the attempt counter;
    /// the reason is logged so the capture tooling can report a
    /// not-used/total ratio.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError`] only when the detector violates its
    /// contract and returns corner sets that do not match the board template.
    pub fn ingest(
        &mut self,
        left: &GrayImage,
        right: &GrayImage,
        zone_index: usize,
    ) -> Result<IngestOutcome, ObservationError> {
        self.attempted += 1;
        self.image_size = Some(ImageSize::new(right.width(), right.height()));

        let opts = DetectOptions::capture();
        let left_corners = self.detector.find_corners(left, &self.board, &opts);
        let right_corners = self.detector.find_corners(right, &self.board, &opts);

        match (left_corners, right_corners) {
            (Some(left_points), Some(right_points)) => {
                let observation = StereoObservation::new(
                    zone_index,
                    self.board.object_points(),
                    left_points,
                    right_points,
                )?;
                self.views.push(observation);
                self.covered.insert(zone_index);
                debug!("accepted pair for zone {zone_index}");
                Ok(IngestOutcome::Accepted { zone_index })
            }
            (left_corners, right_corners) => {
                let reason = match (left_corners.is_some(), right_corners.is_some()) {
                    (false, true) => RejectReason::LeftNotFound,
                    (true, false) => RejectReason::RightNotFound,
                    _ => RejectReason::BothNotFound,
                };
                warn!("dropping pair for zone {zone_index}: {reason}");
                Ok(IngestOutcome::Rejected { zone_index, reason })
            }
        }
    }

    /// Number of accepted pairs so far.
    pub fn accepted(&self) -> usize {
        self.views.len()
    }

    /// Number of ingest attempts, accepted or not.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Zone indices with at least one accepted pair.
    pub fn covered_zones(&self) -> &BTreeSet<usize> {
        &self.covered
    }

    /// Zone indices still lacking an accepted pair, ascending.
    pub fn missing_zones(&self) -> Vec<usize> {
        (0..self.zone_count)
            .filter(|index| !self.covered.contains(index))
            .collect()
    }

    /// Prove full zone coverage and hand the accumulated observations to the
    /// solver as an immutable snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CoverageError`] enumerating every missing zone index when
    /// coverage is incomplete.
    pub fn finalize(self) -> Result<CorrespondenceSet, CoverageError> {
        let missing = self.missing_zones();
        if !missing.is_empty() {
            return Err(CoverageError {
                missing,
                zone_count: self.zone_count,
            });
        }
        let Some(image_size) = self.image_size else {
            // Coverage over zero zones with no ingested pairs: nothing to solve.
            return Err(CoverageError {
                missing: Vec::new(),
                zone_count: self.zone_count,
            });
        };
        Ok(CorrespondenceSet::new(self.views, image_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{template_corners, FixedCornerDetector, ScriptedDetector};

    fn gray(width: u32, height: u32) -> GrayImage {
        GrayImage::new(width, height)
    }

    fn accepting_session() -> CaptureSession<FixedCornerDetector> {
        let board = BoardGeometry::default();
        let detector = FixedCornerDetector::new(template_corners(&board));
        CaptureSession::new(detector, board)
    }

    #[test]
    fn ingest_accepts_when_both_detections_succeed() {
        let mut session = accepting_session();
        let outcome = session.ingest(&gray(64, 48), &gray(64, 48), 4).unwrap();
        assert_eq!(outcome, IngestOutcome::Accepted { zone_index: 4 });
        assert_eq!(session.accepted(), 1);
        assert_eq!(session.attempted(), 1);
        assert!(session.covered_zones().contains(&4));
    }

    #[test]
    fn ingest_rejects_without_state_changes() {
        let board = BoardGeometry::default();
        let corners = template_corners(&board);
        // Left succeeds, right fails, then the reverse, then both fail.
        let detector = ScriptedDetector::new(vec![
            Some(corners.clone()),
            None,
            None,
            Some(corners.clone()),
            None,
            None,
        ]);
        let mut session = CaptureSession::new(detector, board);

        let outcome = session.ingest(&gray(8, 8), &gray(8, 8), 0).unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::Rejected {
                zone_index: 0,
                reason: RejectReason::RightNotFound
            }
        );
        let outcome = session.ingest(&gray(8, 8), &gray(8, 8), 1).unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::Rejected {
                zone_index: 1,
                reason: RejectReason::LeftNotFound
            }
        );
        let outcome = session.ingest(&gray(8, 8), &gray(8, 8), 2).unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::Rejected {
                zone_index: 2,
                reason: RejectReason::BothNotFound
            }
        );

        assert_eq!(session.accepted(), 0);
        assert_eq!(session.attempted(), 3);
        assert!(session.covered_zones().is_empty());
    }

    #[test]
    fn finalize_succeeds_on_full_coverage() {
        let mut session = accepting_session();
        for zone in 0..ZONE_COUNT {
            session.ingest(&gray(64, 48), &gray(64, 48), zone).unwrap();
        }
        let set = session.finalize().unwrap();
        assert_eq!(set.len(), ZONE_COUNT);
        assert_eq!(set.image_size, ImageSize::new(64, 48));
    }

    #[test]
    fn finalize_fails_with_one_missing_zone() {
        let mut session = accepting_session();
        for zone in 0..ZONE_COUNT {
            if zone == 7 {
                continue;
            }
            session.ingest(&gray(64, 48), &gray(64, 48), zone).unwrap();
        }
        let err = session.finalize().unwrap_err();
        assert_eq!(err.missing, vec![7]);
        assert_eq!(err.zone_count, ZONE_COUNT);
        assert!(err.to_string().contains("[7]"));
    }

    #[test]
    fn finalize_fails_with_no_coverage_at_all() {
        let session = accepting_session();
        let err = session.finalize().unwrap_err();
        assert_eq!(err.missing, (0..ZONE_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_zone_pairs_count_once_for_coverage() {
        let mut session = accepting_session();
        session.ingest(&gray(64, 48), &gray(64, 48), 3).unwrap();
        session.ingest(&gray(64, 48), &gray(64, 48), 3).unwrap();
        assert_eq!(session.accepted(), 2);
        assert_eq!(session.covered_zones().len(), 1);
        assert_eq!(session.missing_zones().len(), ZONE_COUNT - 1);
    }
}
