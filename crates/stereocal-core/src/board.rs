//! Physical checkerboard target description.

use crate::{Pt3, Real};
use serde::{Deserialize, Serialize};

/// Checkerboard geometry, counted in *internal* corners.
///
/// The capture rig uses a 9×6 internal-corner target; [`BoardGeometry::default`]
/// reflects that. The solver consumes the planar Z=0 template produced by
/// [`BoardGeometry::object_points`], scaled by the physical square size so the
/// recovered translation comes out in the same unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    /// Internal corners per row (horizontal direction).
    pub cols: u32,
    /// Internal corner rows (vertical direction).
    pub rows: u32,
    /// Physical edge length of one square.
    pub square_size: Real,
}

impl BoardGeometry {
    pub fn new(cols: u32, rows: u32, square_size: Real) -> Self {
        Self {
            cols,
            rows,
            square_size,
        }
    }

    /// Total number of internal corners.
    #[inline]
    pub fn corner_count(&self) -> usize {
        (self.cols * self.rows) as usize
    }

    /// Planar object-point template in row-major order (x fastest).
    ///
    /// Point `(i, j)` maps to `(i * square_size, j * square_size, 0)`; the
    /// order matches the corner order detectors are required to return.
    pub fn object_points(&self) -> Vec<Pt3> {
        let mut points = Vec::with_capacity(self.corner_count());
        for j in 0..self.rows {
            for i in 0..self.cols {
                points.push(Pt3::new(
                    i as Real * self.square_size,
                    j as Real * self.square_size,
                    0.0,
                ));
            }
        }
        points
    }
}

impl Default for BoardGeometry {
    /// The rig's 9×6 target with a unit square size.
    fn default() -> Self {
        Self::new(9, 6, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_board_is_9x6() {
        let board = BoardGeometry::default();
        assert_eq!(board.corner_count(), 54);
        assert_eq!(board.object_points().len(), 54);
    }

    #[test]
    fn template_order_is_row_major() {
        let board = BoardGeometry::new(3, 2, 0.5);
        let pts = board.object_points();
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], Pt3::new(0.0, 0.0, 0.0));
        assert_eq!(pts[1], Pt3::new(0.5, 0.0, 0.0));
        assert_eq!(pts[3], Pt3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn template_scales_with_square_size() {
        let board = BoardGeometry::new(9, 6, 2.5);
        let pts = board.object_points();
        assert_eq!(pts[8], Pt3::new(8.0 * 2.5, 0.0, 0.0));
        assert_eq!(pts[53], Pt3::new(8.0 * 2.5, 5.0 * 2.5, 0.0));
    }
}
