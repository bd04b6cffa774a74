//! Stereo dataset discovery and loading.
//!
//! A dataset root contains `left/` and `right/` directories. Both listings
//! are sorted lexically and paired index-by-index; pairing is validated
//! (equal counts, and matching zone tokens where both file names carry one)
//! instead of silently truncating to the shorter listing.

use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use log::debug;
use thiserror::Error;
use stereocal_core::zone_index_from_file_name;

/// Fatal input errors: unreadable directories or images, invalid pairing.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to list {dir}: {source}")]
    ListDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("no images found in {dir}")]
    EmptyDirectory { dir: PathBuf },
    #[error("left and right image counts differ: {left} vs {right}")]
    CountMismatch { left: usize, right: usize },
    #[error("zone indices differ within pair {left} / {right}")]
    ZoneMismatch { left: PathBuf, right: PathBuf },
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// A matched left/right capture pair on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub left: PathBuf,
    pub right: PathBuf,
}

/// Validated listing of all capture pairs under a dataset root.
#[derive(Debug, Clone)]
pub struct StereoDataset {
    pub pairs: Vec<ImagePair>,
}

impl StereoDataset {
    /// Discover and validate pairs under `root/left` and `root/right`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] when either directory is unreadable or empty,
    /// when the counts differ, or when a pair's zone tokens disagree.
    pub fn discover(root: &Path) -> Result<Self, InputError> {
        let left_dir = root.join("left");
        let right_dir = root.join("right");
        let left = list_sorted(&left_dir)?;
        let right = list_sorted(&right_dir)?;

        if left.is_empty() {
            return Err(InputError::EmptyDirectory { dir: left_dir });
        }
        if right.is_empty() {
            return Err(InputError::EmptyDirectory { dir: right_dir });
        }
        if left.len() != right.len() {
            return Err(InputError::CountMismatch {
                left: left.len(),
                right: right.len(),
            });
        }

        let pairs: Vec<ImagePair> = left
            .into_iter()
            .zip(right)
            .map(|(left, right)| ImagePair { left, right })
            .collect();

        for pair in &pairs {
            let left_zone = file_name_zone(&pair.left);
            let right_zone = file_name_zone(&pair.right);
            if let (Some(l), Some(r)) = (left_zone, right_zone) {
                if l != r {
                    return Err(InputError::ZoneMismatch {
                        left: pair.left.clone(),
                        right: pair.right.clone(),
                    });
                }
            }
        }

        debug!("discovered {} stereo pairs under {}", pairs.len(), root.display());
        Ok(Self { pairs })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Load an image as 8-bit grayscale.
///
/// # Errors
///
/// Returns [`InputError`] when the file cannot be opened or decoded. This is
/// a fatal input failure, distinct from a detection rejection.
pub fn load_gray(path: &Path) -> Result<GrayImage, InputError> {
    let img = image::ImageReader::open(path)
        .map_err(|source| InputError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|source| InputError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(img.to_luma8())
}

fn list_sorted(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let entries = fs::read_dir(dir).map_err(|source| InputError::ListDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InputError::ListDir {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name_zone(path: &Path) -> Option<usize> {
    let name = path.file_name()?.to_str()?;
    zone_index_from_file_name(name).ok()
}
