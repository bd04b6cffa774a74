//! Corner detection capability.
//!
//! The pipeline never implements chessboard corner detection itself; it
//! consumes a detector through [`CornerDetector`]. This keeps the capture and
//! validation logic independent of any concrete image-processing backend and
//! testable with the stubs in [`crate::synthetic`].

use image::GrayImage;
use serde::{Deserialize, Serialize};
use stereocal_core::{BoardGeometry, Pt2, Real};

#[cfg(feature = "chess-detector")]
mod chess;
#[cfg(feature = "chess-detector")]
pub use chess::ChessCornersDetector;

/// Iterative sub-pixel refinement settings forwarded to detector backends.
///
/// Refinement stops after `max_iters` iterations or once the corner position
/// moves by less than `eps` pixels, whichever comes first. `window` is the
/// half-size of the search window around each corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefineCriteria {
    pub max_iters: u32,
    pub eps: Real,
    pub window: u32,
}

/// Options for a single detection call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectOptions {
    /// Allow the backend to bail out early on images without a visible board.
    pub fast_check: bool,
    pub refine: RefineCriteria,
}

impl DetectOptions {
    /// Capture-time settings: thorough refinement, no fast path.
    pub fn capture() -> Self {
        Self {
            fast_check: false,
            refine: RefineCriteria {
                max_iters: 30,
                eps: 1e-3,
                window: 5,
            },
        }
    }

    /// Validation-time settings: fast check enabled, relaxed refinement.
    ///
    /// Used on warped images where detection only has to confirm corner rows,
    /// not feed the solver.
    pub fn validation() -> Self {
        Self {
            fast_check: true,
            refine: RefineCriteria {
                max_iters: 10,
                eps: 5e-2,
                window: 5,
            },
        }
    }
}

/// A chessboard corner detector.
///
/// Implementations must return all `rows × cols` internal corners in
/// row-major template order (matching [`BoardGeometry::object_points`]), or
/// `None` when the board cannot be found. A `None` is a per-image quality
/// outcome, never an error: the caller decides whether to drop the pair or
/// skip it during validation.
pub trait CornerDetector {
    fn find_corners(
        &self,
        image: &GrayImage,
        board: &BoardGeometry,
        opts: &DetectOptions,
    ) -> Option<Vec<Pt2>>;
}

impl<D: CornerDetector + ?Sized> CornerDetector for &D {
    fn find_corners(
        &self,
        image: &GrayImage,
        board: &BoardGeometry,
        opts: &DetectOptions,
    ) -> Option<Vec<Pt2>> {
        (**self).find_corners(image, board, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_options_refine_thoroughly() {
        let opts = DetectOptions::capture();
        assert!(!opts.fast_check);
        assert_eq!(opts.refine.max_iters, 30);
        assert_eq!(opts.refine.eps, 1e-3);
        assert_eq!(opts.refine.window, 5);
    }

    #[test]
    fn validation_options_are_relaxed() {
        let opts = DetectOptions::validation();
        assert!(opts.fast_check);
        assert_eq!(opts.refine.max_iters, 10);
        assert_eq!(opts.refine.eps, 5e-2);
    }
}
