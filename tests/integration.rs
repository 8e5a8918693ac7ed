/// Integration test suite: drives the compiled `psd-converter` binary end to end.
///
/// Every test runs the binary inside its own temporary working directory, so
/// the default `upload/` and `download/` folders never leak into the source
/// tree. PSD inputs are synthesized as minimal flattened RGB files.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_psd-converter"))
}

fn command(cwd: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(binary());
    cmd.current_dir(cwd)
        .args(args)
        .env_remove("PSD_CONVERTER_UPLOAD_DIR")
        .env_remove("PSD_CONVERTER_DOWNLOAD_DIR")
        .env_remove("PSD_CONVERTER_SETTLE_MS");
    cmd
}

fn check(args: &[&str], out: Output, expect_success: bool) -> (String, String) {
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert_eq!(
        out.status.success(),
        expect_success,
        "command {:?} exited with {:?}\nstdout: {}\nstderr: {}",
        args,
        out.status,
        stdout,
        stderr
    );
    (stdout, stderr)
}

/// Run a psd-converter command in `cwd` and assert it exits successfully.
/// Returns stdout as a String.
fn run_success(cwd: &Path, args: &[&str]) -> String {
    let out = command(cwd, args)
        .output()
        .expect("failed to invoke psd-converter binary");
    check(args, out, true).0
}

/// Run a psd-converter command in `cwd` and assert it exits with a non-zero status.
/// Returns (stdout, stderr).
fn run_failure(cwd: &Path, args: &[&str]) -> (String, String) {
    let out = command(cwd, args)
        .output()
        .expect("failed to invoke psd-converter binary");
    check(args, out, false)
}

/// Run the interactive menu with `input` on stdin. Returns stdout.
fn run_interactive(cwd: &Path, input: &str) -> String {
    let mut child = command(cwd, &[])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn psd-converter binary");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let out = child.wait_with_output().unwrap();
    check(&["<interactive>"], out, true).0
}

fn workdir() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

/// Minimal flattened PSD: 8-bit RGB, no layers, raw image data.
fn psd_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(b"8BPS");
    b.extend_from_slice(&1u16.to_be_bytes());
    b.extend_from_slice(&[0u8; 6]);
    b.extend_from_slice(&3u16.to_be_bytes());
    b.extend_from_slice(&height.to_be_bytes());
    b.extend_from_slice(&width.to_be_bytes());
    b.extend_from_slice(&8u16.to_be_bytes());
    b.extend_from_slice(&3u16.to_be_bytes());
    b.extend_from_slice(&0u32.to_be_bytes());
    b.extend_from_slice(&0u32.to_be_bytes());
    b.extend_from_slice(&10u32.to_be_bytes());
    b.extend_from_slice(&2u32.to_be_bytes());
    b.extend_from_slice(&0i16.to_be_bytes());
    b.extend_from_slice(&0u32.to_be_bytes());
    b.extend_from_slice(&0u16.to_be_bytes());
    b.extend(std::iter::repeat_n(128u8, (width * height * 3) as usize));
    b
}

fn zip_files_in(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "zip"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Conversion modes
// ---------------------------------------------------------------------------

/// test_convert_single_file_json: convert writes the PSD copy and PNG into the upload dir.
#[test]
fn test_convert_single_file_json() {
    let dir = workdir();
    let source = dir.path().join("incoming").join("Poster.PSD");
    std::fs::create_dir_all(source.parent().unwrap()).unwrap();
    std::fs::write(&source, psd_bytes(8, 5)).unwrap();

    let stdout = run_success(
        dir.path(),
        &["convert", "--json", source.to_str().unwrap()],
    );
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("convert --json output is not valid JSON");
    assert_eq!(parsed["total"], 1);
    assert_eq!(parsed["succeeded"], 1);
    assert_eq!(parsed["failed"], 0);

    let upload = dir.path().join("upload");
    assert!(upload.join("Poster.PSD").is_file(), "PSD copy missing");
    assert!(upload.join("Poster.png").is_file(), "PNG output missing");
}

/// test_convert_missing_file_is_a_failed_conversion: per-file failures do not fail the process.
#[test]
fn test_convert_missing_file_is_a_failed_conversion() {
    let dir = workdir();
    let stdout = run_success(dir.path(), &["convert", "--json", "nowhere.psd"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["failed"], 1);
    assert!(!dir.path().join("upload").join("nowhere.png").exists());
}

/// test_batch_summary_counts: batch converts each PSD and reports totals.
#[test]
fn test_batch_summary_counts() {
    let dir = workdir();
    let input = dir.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("a.psd"), psd_bytes(2, 2)).unwrap();
    std::fs::write(input.join("b.psd"), psd_bytes(3, 1)).unwrap();
    std::fs::write(input.join("notes.txt"), "ignored").unwrap();

    let out_dir = dir.path().join("pngs");
    let stdout = run_success(
        dir.path(),
        &[
            "batch",
            input.to_str().unwrap(),
            "--json",
            "--upload-dir",
            out_dir.to_str().unwrap(),
        ],
    );
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["total"], 2);
    assert_eq!(parsed["succeeded"], 2);
    assert!(out_dir.join("a.png").is_file());
    assert!(out_dir.join("b.png").is_file());
}

/// test_batch_human_summary: without --json the summary is a readable block.
#[test]
fn test_batch_human_summary() {
    let dir = workdir();
    let stdout = run_success(dir.path(), &["batch", "empty-folder"]);
    assert!(stdout.contains("total:"), "stdout: {}", stdout);
    assert!(dir.path().join("empty-folder").is_dir());
}

/// test_config_file_sets_upload_dir: `--config` layers a TOML file over the defaults.
#[test]
fn test_config_file_sets_upload_dir() {
    let dir = workdir();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "upload_dir = \"converted\"\n").unwrap();
    std::fs::write(dir.path().join("x.psd"), psd_bytes(1, 1)).unwrap();

    run_success(
        dir.path(),
        &["--config", config.to_str().unwrap(), "convert", "x.psd"],
    );
    assert!(dir.path().join("converted").join("x.png").is_file());
}

/// test_watch_missing_directory_fails: a subscription that cannot be set up is fatal.
#[test]
fn test_watch_missing_directory_fails() {
    let dir = workdir();
    let (_, stderr) = run_failure(dir.path(), &["watch", "does-not-exist"]);
    assert!(
        stderr.contains("does not exist"),
        "stderr should explain the failure\nstderr: {}",
        stderr
    );
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

/// test_archive_without_pngs_creates_nothing
#[test]
fn test_archive_without_pngs_creates_nothing() {
    let dir = workdir();
    let stdout = run_success(dir.path(), &["archive"]);
    assert!(stdout.contains("No PNG files"), "stdout: {}", stdout);
    assert!(zip_files_in(&dir.path().join("download")).is_empty());
}

/// test_archive_after_convert: converted PNGs end up as entries of one bundle.
#[test]
fn test_archive_after_convert() {
    let dir = workdir();
    std::fs::write(dir.path().join("one.psd"), psd_bytes(4, 4)).unwrap();
    std::fs::write(dir.path().join("two.psd"), psd_bytes(4, 4)).unwrap();
    run_success(dir.path(), &["batch", "."]);

    let stdout = run_success(dir.path(), &["archive", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["entries"], 2);

    let bundles = zip_files_in(&dir.path().join("download"));
    assert_eq!(bundles.len(), 1);
    let size = std::fs::metadata(&bundles[0]).unwrap().len();
    assert_eq!(parsed["size_bytes"], size);

    let name = bundles[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("png_images_"), "bundle name: {}", name);
    // png_images_YYYYMMdd_HHmmss.zip
    assert_eq!(name.len(), "png_images_".len() + 15 + ".zip".len());
}

// ---------------------------------------------------------------------------
// CLI surface
// ---------------------------------------------------------------------------

/// test_help_lists_modes
#[test]
fn test_help_lists_modes() {
    let dir = workdir();
    let stdout = run_success(dir.path(), &["--help"]);
    for mode in ["batch", "watch", "convert", "archive"] {
        assert!(stdout.contains(mode), "help should list {mode}\n{stdout}");
    }
}

/// test_interactive_invalid_choice: the menu reports a bad choice and exits cleanly.
#[test]
fn test_interactive_invalid_choice() {
    let dir = workdir();
    let stdout = run_interactive(dir.path(), "7\n");
    assert!(stdout.contains("Select a mode"), "stdout: {}", stdout);
    assert!(stdout.contains("Invalid choice"), "stdout: {}", stdout);
}

/// test_interactive_single_conversion: menu option 3 converts the named file.
#[test]
fn test_interactive_single_conversion() {
    let dir = workdir();
    let source = dir.path().join("menu.psd");
    std::fs::write(&source, psd_bytes(2, 3)).unwrap();

    let stdout = run_interactive(dir.path(), &format!("3\n{}\n", source.display()));
    assert!(stdout.contains("succeeded: 1"), "stdout: {}", stdout);
    assert!(dir.path().join("upload").join("menu.png").is_file());
}
