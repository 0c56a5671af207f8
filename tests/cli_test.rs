use image::{Rgba, RgbaImage};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct StepTiming {
    name: String,
    time_ms: u64,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Stats {
    threshold: u8,
    width: u32,
    height: u32,
    total_time_ms: u64,
    steps: Vec<StepTiming>,
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_handwriting-prep"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("PREP_CONTRAST")
        .env_remove("PREP_THRESHOLD")
        .output()
        .expect("Failed to run handwriting-prep")
}

/// Writes a small "scan": dark stroke across a light page
fn write_scan(dir: &Path, name: &str) -> PathBuf {
    let img = RgbaImage::from_fn(40, 20, |x, y| {
        if y == 10 && (5..35).contains(&x) {
            Rgba([40, 40, 60, 255])
        } else {
            Rgba([230, 225, 215, 255])
        }
    });
    let path = dir.join(name);
    img.save(&path).expect("Failed to write fixture");
    path
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_cli_writes_binarized_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scan(dir.path(), "page.png");
    let output = dir.path().join("out.png");

    let result = run_cli(&[path_str(&input), "-o", path_str(&output)]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let img = image::open(&output).unwrap().into_rgba8();
    assert_eq!(img.dimensions(), (40, 20));
    for pixel in img.pixels() {
        assert!(pixel.0[..3].iter().all(|&v| v == 0 || v == 255));
    }
    assert_eq!(img.get_pixel(20, 10).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(20, 3).0, [255, 255, 255, 255]);
}

#[test]
fn test_cli_default_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scan(dir.path(), "letter.png");

    let result = run_cli(&[path_str(&input)]);

    assert!(result.status.success());
    assert!(dir.path().join("letter.prep.png").exists());
}

#[test]
fn test_cli_prints_stats_with_auto_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scan(dir.path(), "page.png");
    let output = dir.path().join("out.png");

    let result = run_cli(&[
        path_str(&input),
        "-o",
        path_str(&output),
        "--threshold",
        "auto",
        "--stats",
    ]);
    assert!(result.status.success());

    let stats: Stats = serde_json::from_slice(&result.stdout).expect("stats should be JSON");
    assert_eq!((stats.width, stats.height), (40, 20));
    let names: Vec<&str> = stats.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["grayscale", "contrast", "sharpen", "binarize"]);
}

#[test]
fn test_cli_rejects_bad_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scan(dir.path(), "page.png");

    let result = run_cli(&[path_str(&input), "--threshold", "300"]);

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("binarize"), "stderr: {}", stderr);
    assert!(!dir.path().join("page.prep.png").exists());
}

#[test]
fn test_cli_rejects_singular_contrast() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scan(dir.path(), "page.png");

    let result = run_cli(&[path_str(&input), "--contrast", "259"]);

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("contrast"), "stderr: {}", stderr);
}

#[test]
fn test_cli_reports_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.png");
    std::fs::write(&input, b"not a png").unwrap();

    let result = run_cli(&[path_str(&input)]);

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("decode"), "stderr: {}", stderr);
}

#[cfg(not(feature = "engine-tesseract"))]
#[test]
fn test_cli_accepts_tessdata_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scan(dir.path(), "page.png");

    let result = run_cli(&[path_str(&input), "--recognize", "--tessdata", path_str(dir.path())]);

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    // Reaches the engine check, so clap accepted the flag
    assert!(stderr.contains("engine-tesseract"), "stderr: {}", stderr);
    assert!(!stderr.contains("unexpected argument"), "stderr: {}", stderr);
}

#[cfg(not(feature = "engine-tesseract"))]
#[test]
fn test_cli_recognize_requires_engine_feature() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scan(dir.path(), "page.png");

    let result = run_cli(&[path_str(&input), "--recognize"]);

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("engine-tesseract"), "stderr: {}", stderr);
}
