use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use tracing::info;

use crate::error::ConvertError;
use crate::file_kind::{PNG_EXTENSION, PSD_EXTENSION, has_extension};

/// Name used when there is no source name to derive from.
pub const DEFAULT_OUTPUT_NAME: &str = "output.png";

/// Outcome of one conversion attempt. Not persisted; aggregated into a run summary.
#[derive(Debug)]
pub struct ConversionResult {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub outcome: Result<Dimensions, ConvertError>,
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Derive the PNG file name for a PSD file name.
///
/// Strips one trailing `.psd` (any case) and appends `.png`. A name without
/// that suffix gets `.png` appended whole; an empty name yields `output.png`.
pub fn output_name(name: &str) -> String {
    if name.is_empty() {
        return DEFAULT_OUTPUT_NAME.to_string();
    }

    let suffix_len = PSD_EXTENSION.len() + 1;
    let stem = match name.len().checked_sub(suffix_len) {
        Some(cut)
            if name.is_char_boundary(cut)
                && name[cut..].eq_ignore_ascii_case(&format!(".{PSD_EXTENSION}")) =>
        {
            &name[..cut]
        }
        _ => name,
    };
    format!("{stem}.{PNG_EXTENSION}")
}

/// Returns true if `path` is an existing regular file with a `.psd` extension.
pub fn is_psd_file(path: &Path) -> bool {
    path.is_file() && has_extension(path, PSD_EXTENSION)
}

/// Convert the PSD at `source` into a PNG at `dest`.
///
/// Failures are reported in the returned result, never raised.
pub fn convert(source: &Path, dest: &Path) -> ConversionResult {
    let outcome = try_convert(source, dest);
    ConversionResult {
        source: source.to_path_buf(),
        dest: dest.to_path_buf(),
        outcome,
    }
}

fn try_convert(source: &Path, dest: &Path) -> Result<Dimensions, ConvertError> {
    check_source(source)?;

    info!("converting {}", source.display());
    let image = decode(source)?;
    let dims = Dimensions {
        width: image.width(),
        height: image.height(),
    };
    info!("image size: {}x{}", dims.width, dims.height);

    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|err| ConvertError::WriteFailed {
            path: parent.to_path_buf(),
            reason: err.to_string(),
        })?;
        info!("created output directory {}", parent.display());
    }

    image
        .save_with_format(dest, ImageFormat::Png)
        .map_err(|err| ConvertError::WriteFailed {
            path: dest.to_path_buf(),
            reason: err.to_string(),
        })?;
    info!("wrote {}", dest.display());

    Ok(dims)
}

/// Reject sources that are missing, not regular files, or not PSDs, in that order.
pub fn check_source(source: &Path) -> Result<(), ConvertError> {
    if !source.exists() {
        return Err(ConvertError::NotFound(source.to_path_buf()));
    }
    if !source.is_file() {
        return Err(ConvertError::NotAFile(source.to_path_buf()));
    }
    if !is_psd_file(source) {
        return Err(ConvertError::WrongKind(source.to_path_buf()));
    }
    Ok(())
}

/// Decode a PSD into its flattened RGBA raster.
fn decode(source: &Path) -> Result<RgbaImage, ConvertError> {
    let decode_failed = |reason: String| ConvertError::DecodeFailed {
        path: source.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(source).map_err(|err| decode_failed(err.to_string()))?;

    // The decoder indexes into the buffer directly and can panic on truncated input.
    let decoded = std::panic::catch_unwind(|| {
        psd::Psd::from_bytes(&bytes)
            .map(|psd| (psd.width(), psd.height(), psd.rgba()))
            .map_err(|err| err.to_string())
    })
    .map_err(|_| decode_failed("decoder panicked on malformed input".to_string()))?;
    let (width, height, rgba) = decoded.map_err(decode_failed)?;

    RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        decode_failed(format!("decoder produced no {width}x{height} RGBA raster"))
    })
}
