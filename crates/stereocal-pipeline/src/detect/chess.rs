//! Chessboard detection backed by the ChESS corner detector.

use calib_targets::chessboard::ChessboardParams;
use calib_targets::detect;
use chess_corners::ChessConfig;
use image::GrayImage;
use stereocal_core::{BoardGeometry, Pt2};

use super::{CornerDetector, DetectOptions};

/// [`CornerDetector`] adapter over `calib_targets::detect::detect_chessboard`.
///
/// The ChESS response is sub-pixel accurate by construction, so the iterative
/// refinement criteria in [`DetectOptions`] are not forwarded; `fast_check`
/// selects the cheaper single-scale corner pass.
pub struct ChessCornersDetector {
    config: ChessConfig,
    fast_config: ChessConfig,
}

impl ChessCornersDetector {
    pub fn new() -> Self {
        Self::with_config(detect::default_chess_config())
    }

    pub fn with_config(config: ChessConfig) -> Self {
        Self {
            config,
            fast_config: ChessConfig::single_scale(),
        }
    }
}

impl Default for ChessCornersDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CornerDetector for ChessCornersDetector {
    fn find_corners(
        &self,
        image: &GrayImage,
        board: &BoardGeometry,
        opts: &DetectOptions,
    ) -> Option<Vec<Pt2>> {
        let config = if opts.fast_check {
            &self.fast_config
        } else {
            &self.config
        };
        let params = ChessboardParams {
            expected_rows: Some(board.rows),
            expected_cols: Some(board.cols),
            ..ChessboardParams::default()
        };

        let result = detect::detect_chessboard(image, config, params)?;

        // Keep only grid-labeled corners and order them like the object
        // template: row-major, x fastest.
        let mut labeled = Vec::with_capacity(board.corner_count());
        for corner in result.detection.corners {
            let Some(grid) = corner.grid else {
                continue;
            };
            labeled.push((
                grid.j,
                grid.i,
                Pt2::new(corner.position.x as f64, corner.position.y as f64),
            ));
        }
        if labeled.len() != board.corner_count() {
            return None;
        }
        labeled.sort_by_key(|&(j, i, _)| (j, i));
        Some(labeled.into_iter().map(|(_, _, p)| p).collect())
    }
}
