//! Capture-zone layout and capture file-name conventions.
//!
//! The capture flow asks the operator to hold the checkerboard inside a fixed
//! set of 13 screen regions so the solve sees the target from diverse
//! positions and angles. The layout is a pure function of the preview
//! resolution; the same `(height, width)` always yields the same polygons.
//!
//! Capture files embed the zone they were taken for:
//! `"{stream}_p{zone}_{sequence}.png"`, e.g. `left_p10_0.png`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of zones produced by [`zone_layout`].
pub const ZONE_COUNT: usize = 13;

/// Distance kept from the frame border, in pixels.
const MARGIN: i32 = 60;
/// Vertical/horizontal inset of the slanted polygon edges, in pixels.
const SLOPE: i32 = 150;

/// Errors from zone selection and file-name parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneError {
    /// A selection index does not refer to an existing zone.
    #[error("zone index {index} out of range (layout has {count} zones)")]
    IndexOutOfRange { index: usize, count: usize },
    /// The file name carries no `p<digits>` zone token.
    #[error("no zone token `p<digits>` in file name {name:?}")]
    MissingZoneToken { name: String },
}

/// One capture zone: a quadrilateral in preview pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Position of this zone in the layout, `0..ZONE_COUNT`.
    pub index: usize,
    /// Ordered polygon vertices as `[x, y]`.
    pub vertices: [[i32; 2]; 4],
}

/// Build the 13-zone capture layout for a preview of the given resolution.
///
/// Zones 0..=2 sweep the left half with slanted right edges, zone 3 is the
/// centered inset rectangle, zones 4..=6 mirror 0..=2 from the right, zones
/// 7..=9 sweep the top half and zones 10..=12 the bottom. Deterministic and
/// bit-exact for fixed inputs.
pub fn zone_layout(height: u32, width: u32) -> Vec<Zone> {
    let h = height as i32;
    let w = width as i32;
    let horizontal_shift = w / 4;
    let vertical_shift = h / 4;

    let vertices: [[[i32; 2]; 4]; ZONE_COUNT] = [
        [[MARGIN, 0], [MARGIN, h], [w / 2, h - SLOPE], [w / 2, SLOPE]],
        [
            [horizontal_shift, 0],
            [horizontal_shift, h],
            [w / 2 + horizontal_shift, h - SLOPE],
            [w / 2 + horizontal_shift, SLOPE],
        ],
        [
            [horizontal_shift * 2 - MARGIN, 0],
            [horizontal_shift * 2 - MARGIN, h],
            [w / 2 + horizontal_shift * 2 - MARGIN, h - SLOPE],
            [w / 2 + horizontal_shift * 2 - MARGIN, SLOPE],
        ],
        [
            [MARGIN, MARGIN],
            [MARGIN, h - MARGIN],
            [w - MARGIN, h - MARGIN],
            [w - MARGIN, MARGIN],
        ],
        [[w - MARGIN, 0], [w - MARGIN, h], [w / 2, h - SLOPE], [w / 2, SLOPE]],
        [
            [w - horizontal_shift, 0],
            [w - horizontal_shift, h],
            [w / 2 - horizontal_shift, h - SLOPE],
            [w / 2 - horizontal_shift, SLOPE],
        ],
        [
            [w - horizontal_shift * 2 + MARGIN, 0],
            [w - horizontal_shift * 2 + MARGIN, h],
            [w / 2 - horizontal_shift * 2 + MARGIN, h - SLOPE],
            [w / 2 - horizontal_shift * 2 + MARGIN, SLOPE],
        ],
        [[0, MARGIN], [w, MARGIN], [w - SLOPE, h / 2], [SLOPE, h / 2]],
        [
            [0, vertical_shift],
            [w, vertical_shift],
            [w - SLOPE, h / 2 + vertical_shift],
            [SLOPE, h / 2 + vertical_shift],
        ],
        [
            [0, vertical_shift * 2 - MARGIN],
            [w, vertical_shift * 2 - MARGIN],
            [w - SLOPE, h / 2 + vertical_shift * 2 - MARGIN],
            [SLOPE, h / 2 + vertical_shift * 2 - MARGIN],
        ],
        [[0, h - MARGIN], [w, h - MARGIN], [w - SLOPE, h / 2], [SLOPE, h / 2]],
        [
            [0, h - vertical_shift],
            [w, h - vertical_shift],
            [w - SLOPE, h / 2 - vertical_shift],
            [SLOPE, h / 2 - vertical_shift],
        ],
        [
            [0, h - vertical_shift * 2 + MARGIN],
            [w, h - vertical_shift * 2 + MARGIN],
            [w - SLOPE, h / 2 - vertical_shift * 2 + MARGIN],
            [SLOPE, h / 2 - vertical_shift * 2 + MARGIN],
        ],
    ];

    vertices
        .into_iter()
        .enumerate()
        .map(|(index, vertices)| Zone { index, vertices })
        .collect()
}

/// Filter a layout to the zones at `indexes`, preserving the requested order.
///
/// `None` returns the full layout unchanged. Used to re-run capture for
/// previously missing zones only.
///
/// # Errors
///
/// Returns [`ZoneError::IndexOutOfRange`] for any index past the layout end.
pub fn select_zones(zones: &[Zone], indexes: Option<&[usize]>) -> Result<Vec<Zone>, ZoneError> {
    let Some(indexes) = indexes else {
        return Ok(zones.to_vec());
    };
    indexes
        .iter()
        .map(|&index| {
            zones.get(index).cloned().ok_or(ZoneError::IndexOutOfRange {
                index,
                count: zones.len(),
            })
        })
        .collect()
}

/// File name for a captured frame: `"{stream}_p{zone_index}_{sequence}.png"`.
pub fn capture_file_name(stream: &str, zone_index: usize, sequence: usize) -> String {
    format!("{stream}_p{zone_index}_{sequence}.png")
}

/// Recover the zone index from a capture file name.
///
/// Matches the first run of ASCII digits following a literal `p`, so
/// `"left_p10_0.png"` yields `10`.
///
/// # Errors
///
/// Returns [`ZoneError::MissingZoneToken`] when no such token exists.
pub fn zone_index_from_file_name(name: &str) -> Result<usize, ZoneError> {
    for (pos, _) in name.match_indices('p') {
        let rest = &name[pos + 1..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            continue;
        }
        if let Ok(index) = digits.parse() {
            return Ok(index);
        }
    }
    Err(ZoneError::MissingZoneToken {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_13_quadrilaterals() {
        let zones = zone_layout(800, 1280);
        assert_eq!(zones.len(), ZONE_COUNT);
        for (idx, zone) in zones.iter().enumerate() {
            assert_eq!(zone.index, idx);
            assert_eq!(zone.vertices.len(), 4);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        assert_eq!(zone_layout(800, 1280), zone_layout(800, 1280));
        assert_eq!(zone_layout(1000, 600), zone_layout(1000, 600));
    }

    #[test]
    fn layout_matches_fixed_offsets() {
        let zones = zone_layout(800, 1280);

        // Left-most vertical zone: margin column, slanted toward the middle.
        assert_eq!(
            zones[0].vertices,
            [[60, 0], [60, 800], [640, 650], [640, 150]]
        );
        // Centered inset rectangle.
        assert_eq!(
            zones[3].vertices,
            [[60, 60], [60, 740], [1220, 740], [1220, 60]]
        );
        // First horizontal-bias zone along the top edge.
        assert_eq!(
            zones[7].vertices,
            [[0, 60], [1280, 60], [1130, 400], [150, 400]]
        );
    }

    #[test]
    fn select_none_returns_all() {
        let zones = zone_layout(800, 1280);
        let selected = select_zones(&zones, None).unwrap();
        assert_eq!(selected, zones);
    }

    #[test]
    fn select_preserves_requested_order() {
        let zones = zone_layout(800, 1280);
        let selected = select_zones(&zones, Some(&[5, 2])).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].index, 5);
        assert_eq!(selected[1].index, 2);
    }

    #[test]
    fn select_rejects_out_of_range() {
        let zones = zone_layout(800, 1280);
        let err = select_zones(&zones, Some(&[0, 13])).unwrap_err();
        assert_eq!(
            err,
            ZoneError::IndexOutOfRange {
                index: 13,
                count: 13
            }
        );
    }

    #[test]
    fn zone_index_parses_from_file_name() {
        assert_eq!(zone_index_from_file_name("left_p10_0.png"), Ok(10));
        assert_eq!(zone_index_from_file_name("right_p3_17.png"), Ok(3));
    }

    #[test]
    fn zone_index_requires_token() {
        let err = zone_index_from_file_name("frame_0001.png").unwrap_err();
        assert!(matches!(err, ZoneError::MissingZoneToken { .. }));
    }

    #[test]
    fn file_name_round_trips_through_parser() {
        let name = capture_file_name("left", 12, 4);
        assert_eq!(name, "left_p12_4.png");
        assert_eq!(zone_index_from_file_name(&name), Ok(12));
    }
}
