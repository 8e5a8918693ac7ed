use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use chrono::{DateTime, Datelike, Local, Timelike};
use serde::Serialize;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::file_kind::PNG_EXTENSION;
use crate::locator;

/// Prefix of every bundle file name.
pub const BUNDLE_PREFIX: &str = "png_images_";

/// Result of a successful archive run.
#[derive(Debug, Serialize)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub entries: usize,
    pub size_bytes: u64,
}

/// Bundle every PNG directly inside `upload_dir` into a timestamped ZIP in
/// `download_dir`.
///
/// Returns `Ok(None)` without creating anything when there is no PNG to bundle.
pub fn archive(upload_dir: &Path, download_dir: &Path) -> anyhow::Result<Option<ArchiveReport>> {
    let pngs = locator::find(upload_dir, PNG_EXTENSION)
        .with_context(|| format!("scanning {}", upload_dir.display()))?;

    if pngs.is_empty() {
        warn!("no PNG files found in {}", upload_dir.display());
        return Ok(None);
    }
    info!("found {} PNG file(s)", pngs.len());

    std::fs::create_dir_all(download_dir)
        .with_context(|| format!("creating {}", download_dir.display()))?;

    let bundle = download_dir.join(bundle_name(Local::now()));
    let paths: Vec<PathBuf> = pngs.into_iter().map(|f| f.path).collect();
    write_bundle(&bundle, &paths)?;

    let size_bytes = std::fs::metadata(&bundle)
        .with_context(|| format!("reading size of {}", bundle.display()))?
        .len();

    Ok(Some(ArchiveReport {
        path: bundle,
        entries: paths.len(),
        size_bytes,
    }))
}

/// `png_images_<YYYYMMdd_HHmmss>.zip`
pub fn bundle_name(now: DateTime<Local>) -> String {
    format!("{BUNDLE_PREFIX}{}.zip", now.format("%Y%m%d_%H%M%S"))
}

/// Write one deflated entry per file, named by its base name and stamped with
/// its last-modified time.
fn write_bundle(bundle: &Path, files: &[PathBuf]) -> anyhow::Result<()> {
    let out = File::create(bundle).with_context(|| format!("creating {}", bundle.display()))?;
    let mut writer = ZipWriter::new(BufWriter::new(out));

    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", file.display()))?;

        let modified = std::fs::metadata(file)
            .and_then(|m| m.modified())
            .with_context(|| format!("reading mtime of {}", file.display()))?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip_time(modified));

        writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("adding {name} to bundle"))?;
        let mut reader = BufReader::new(
            File::open(file).with_context(|| format!("opening {}", file.display()))?,
        );
        std::io::copy(&mut reader, &mut writer).with_context(|| format!("compressing {name}"))?;
        info!("  added {name}");
    }

    let mut out = writer.finish().context("finalising bundle")?;
    out.flush().context("flushing bundle")?;
    Ok(())
}

/// Convert a filesystem timestamp to the ZIP (MS-DOS, local time) format.
/// Times outside the representable 1980..=2107 range fall back to the ZIP epoch.
fn zip_time(time: SystemTime) -> zip::DateTime {
    let local: DateTime<Local> = time.into();
    let parts = (
        u16::try_from(local.year()),
        u8::try_from(local.month()),
        u8::try_from(local.day()),
        u8::try_from(local.hour()),
        u8::try_from(local.minute()),
        u8::try_from(local.second()),
    );
    match parts {
        (Ok(y), Ok(mo), Ok(d), Ok(h), Ok(mi), Ok(s)) => {
            zip::DateTime::from_date_and_time(y, mo, d, h, mi, s).unwrap_or_default()
        }
        _ => zip::DateTime::default(),
    }
}
