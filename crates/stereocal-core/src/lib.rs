//! Core geometry and data types for the stereo rig calibration pipeline.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`, ...),
//! - the physical checkerboard description ([`BoardGeometry`]),
//! - the fixed capture-zone layout used for operator guidance ([`zones`]),
//! - validated stereo observation containers ([`StereoObservation`],
//!   [`CorrespondenceSet`]).
//!
//! Everything here is purely geometric and deterministic; image I/O, corner
//! detection and the calibration solve live in `stereocal-pipeline`.

/// Checkerboard target description.
pub mod board;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Stereo observation containers.
pub mod observation;
/// Capture-zone layout and file-name conventions.
pub mod zones;

pub use board::BoardGeometry;
pub use math::*;
pub use observation::{CorrespondenceSet, ObservationError, StereoObservation};
pub use zones::{
    capture_file_name, select_zones, zone_index_from_file_name, zone_layout, Zone, ZoneError,
    ZONE_COUNT,
};
