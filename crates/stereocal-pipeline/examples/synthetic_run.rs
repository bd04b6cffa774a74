//! Full pipeline run over a synthetic dataset in a temporary directory.
//!
//! Corner detection and the calibration solve are replaced by the
//! deterministic stubs from `stereocal_pipeline::synthetic`, so this
//! demonstrates the data flow (pairing, coverage gate, blob export, epipolar
//! report) without any real image processing.

use anyhow::Result;
use image::GrayImage;
use stereocal_core::{capture_file_name, BoardGeometry, ZONE_COUNT};
use stereocal_pipeline::pipeline::run_calibration;
use stereocal_pipeline::synthetic::{template_corners, FixedCornerDetector, SyntheticCalibrator};
use stereocal_pipeline::EPIPOLAR_PASS_THRESHOLD_PX;

fn main() -> Result<()> {
    let root = tempfile::tempdir()?;
    std::fs::create_dir_all(root.path().join("left"))?;
    std::fs::create_dir_all(root.path().join("right"))?;
    for zone in 0..ZONE_COUNT {
        let img = GrayImage::new(640, 400);
        img.save(root.path().join("left").join(capture_file_name("left", zone, 0)))?;
        img.save(root.path().join("right").join(capture_file_name("right", zone, 0)))?;
    }
    let out_path = root.path().join("depth.calib");

    let board = BoardGeometry::new(9, 6, 2.5);
    let detector = FixedCornerDetector::new(template_corners(&board));
    let solver = SyntheticCalibrator::default();

    let report = run_calibration(root.path(), &out_path, &detector, &solver, board)?;

    println!(
        "used {}/{} pairs, average epipolar error {:.4} px",
        report.accepted_pairs, report.total_pairs, report.epipolar.average_error_px
    );
    let verdict = if report.epipolar.average_error_px < EPIPOLAR_PASS_THRESHOLD_PX {
        "PASS"
    } else {
        "FAIL"
    };
    println!("acceptance: {verdict}");
    println!("blob written to {}", out_path.display());
    Ok(())
}
