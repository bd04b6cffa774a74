//! Fixed-layout binary export for the on-device consumer.
//!
//! The blob is a flat sequence of little-endian IEEE-754 `f32` values with no
//! header or version tag, overwritten on every run:
//!
//! | field  | floats | byte offset | meaning                                  |
//! |--------|--------|-------------|------------------------------------------|
//! | R1     | 9      | 0           | left rectification rotation              |
//! | R2     | 9      | 36          | right rectification rotation             |
//! | M1     | 9      | 72          | left intrinsics                          |
//! | M2     | 9      | 108         | right intrinsics                         |
//! | R      | 9      | 144         | left→right rotation                      |
//! | T      | 3      | 180         | left→right translation                   |
//! | M3     | 9      | 192         | rgb intrinsics (zero-filled)             |
//! | R_rgb  | 9      | 228         | left→rgb rotation (zero-filled)          |
//! | T_rgb  | 3      | 264         | left→rgb translation (zero-filled)       |
//! | d1     | 14     | 276         | left distortion (rational model)         |
//! | d2     | 14     | 332         | right distortion                         |
//! | d3     | 14     | 388         | rgb distortion (zero-filled)             |
//!
//! Matrices are row-major. Distortion vectors are zero-padded to the fixed
//! 14-coefficient slots. The rgb sections are reserved for a third camera the
//! rig does not calibrate; R_rgb is written as zeros, not identity.
//!
//! This module is pure serialization: numeric plausibility is the upstream
//! validator's job.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use stereocal_core::{mat3_row_major, Mat3, Vec3};

use crate::solve::CalibrationResult;

/// Total blob size in bytes (111 `f32` values).
pub const BLOB_LEN: usize = 444;

/// Fixed coefficient slots per distortion vector.
const DIST_COEFF_SLOTS: usize = 14;

/// Blob serialization failures.
#[derive(Debug, Error)]
pub enum BlobError {
    /// A distortion vector does not fit the fixed layout.
    #[error("{side} distortion vector has {got} coefficients; the layout holds {DIST_COEFF_SLOTS}")]
    DistortionLength { side: &'static str, got: usize },
    #[error("failed to write calibration blob: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a calibration result into the fixed blob layout.
///
/// # Errors
///
/// Returns [`BlobError::DistortionLength`] when a distortion vector carries
/// more than 14 coefficients.
pub fn blob_bytes(result: &CalibrationResult) -> Result<Vec<u8>, BlobError> {
    let mut buf = Vec::with_capacity(BLOB_LEN);

    push_mat3(&mut buf, &result.rectification.r1);
    push_mat3(&mut buf, &result.rectification.r2);
    push_mat3(&mut buf, &result.stereo.left.intrinsics);
    push_mat3(&mut buf, &result.stereo.right.intrinsics);
    push_mat3(&mut buf, &result.stereo.rotation);
    push_vec3(&mut buf, &result.stereo.translation);
    push_mat3(&mut buf, &Mat3::zeros());
    push_mat3(&mut buf, &Mat3::zeros());
    push_vec3(&mut buf, &Vec3::zeros());
    push_distortion(&mut buf, &result.stereo.left.distortion, "left")?;
    push_distortion(&mut buf, &result.stereo.right.distortion, "right")?;
    push_distortion(&mut buf, &[], "rgb")?;

    debug_assert_eq!(buf.len(), BLOB_LEN);
    Ok(buf)
}

/// Serialize into an arbitrary writer.
pub fn write_blob<W: Write>(writer: &mut W, result: &CalibrationResult) -> Result<(), BlobError> {
    let bytes = blob_bytes(result)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Write the blob to `path`, replacing any previous file.
pub fn write_blob_file(path: &Path, result: &CalibrationResult) -> Result<(), BlobError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_blob(&mut writer, result)?;
    writer.flush()?;
    Ok(())
}

fn push_mat3(buf: &mut Vec<u8>, m: &Mat3) {
    for v in mat3_row_major(m) {
        buf.extend_from_slice(&(v as f32).to_le_bytes());
    }
}

fn push_vec3(buf: &mut Vec<u8>, v: &Vec3) {
    for v in [v.x, v.y, v.z] {
        buf.extend_from_slice(&(v as f32).to_le_bytes());
    }
}

fn push_distortion(buf: &mut Vec<u8>, coeffs: &[f64], side: &'static str) -> Result<(), BlobError> {
    if coeffs.len() > DIST_COEFF_SLOTS {
        return Err(BlobError::DistortionLength {
            side,
            got: coeffs.len(),
        });
    }
    for i in 0..DIST_COEFF_SLOTS {
        let v = coeffs.get(i).copied().unwrap_or(0.0);
        buf.extend_from_slice(&(v as f32).to_le_bytes());
    }
    Ok(())
}
