use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::converter::{self, ConversionResult, output_name};
use crate::error::ConvertError;

/// Copy-then-convert for one PSD, writing both the copy and the PNG into the
/// upload directory.
pub struct Pipeline {
    upload_dir: PathBuf,
}

impl Pipeline {
    pub fn new(upload_dir: &Path) -> Self {
        Self {
            upload_dir: upload_dir.to_path_buf(),
        }
    }

    /// Where the PNG for `source` ends up.
    pub fn png_path_for(&self, source: &Path) -> PathBuf {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.upload_dir.join(output_name(&name))
    }

    /// Copy `source` into the upload directory (overwriting), then convert the
    /// original into a PNG next to the copy. A failed copy skips conversion.
    pub fn process(&self, source: &Path) -> ConversionResult {
        let dest = self.png_path_for(source);

        if let Err(err) = self.stage_copy(source) {
            error!("{err}");
            return ConversionResult {
                source: source.to_path_buf(),
                dest,
                outcome: Err(err),
            };
        }

        let result = converter::convert(source, &dest);
        match &result.outcome {
            Ok(_) => info!("✓ converted {}", display_name(source)),
            Err(err) => error!("✗ failed {}: {err}", display_name(source)),
        }
        result
    }

    /// Copy `source` into the upload directory under its own name.
    pub fn stage_copy(&self, source: &Path) -> Result<PathBuf, ConvertError> {
        if !source.exists() {
            return Err(ConvertError::NotFound(source.to_path_buf()));
        }
        let Some(name) = source.file_name() else {
            return Err(ConvertError::NotAFile(source.to_path_buf()));
        };
        let target = self.upload_dir.join(name);
        let copy_failed = |err: std::io::Error| ConvertError::CopyFailed {
            from: source.to_path_buf(),
            to: target.clone(),
            source: err,
        };

        // Copying a file onto itself would truncate it.
        if same_file(source, &target) {
            return Ok(target);
        }

        std::fs::create_dir_all(&self.upload_dir).map_err(copy_failed)?;
        std::fs::copy(source, &target).map_err(copy_failed)?;
        info!("copied {} -> {}", display_name(source), target.display());
        Ok(target)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::psd_bytes;
    use std::fs;

    #[test]
    fn test_process_copies_and_converts_into_upload_dir() {
        let src_dir = tempfile::tempdir().unwrap();
        let upload = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("banner.psd");
        fs::write(&source, psd_bytes(2, 2, [1, 2, 3])).unwrap();

        let pipeline = Pipeline::new(upload.path());
        let result = pipeline.process(&source);

        assert!(result.is_success(), "{:?}", result.outcome);
        assert_eq!(result.dest, upload.path().join("banner.png"));
        assert!(upload.path().join("banner.psd").is_file());
        assert!(upload.path().join("banner.png").is_file());
    }

    #[test]
    fn test_missing_source_is_reported_not_raised() {
        let upload = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(upload.path());
        let result = pipeline.process(&upload.path().join("absent.psd"));

        assert!(matches!(result.outcome, Err(ConvertError::NotFound(_))));
        assert!(!upload.path().join("absent.png").exists());
    }

    #[test]
    fn test_stage_copy_in_place_keeps_contents() {
        let upload = tempfile::tempdir().unwrap();
        let source = upload.path().join("inplace.psd");
        fs::write(&source, b"layers").unwrap();

        let pipeline = Pipeline::new(upload.path());
        let staged = pipeline.stage_copy(&source).unwrap();
        assert_eq!(fs::read(staged).unwrap(), b"layers");
    }

    #[test]
    fn test_png_path_for() {
        let pipeline = Pipeline::new(Path::new("/up"));
        assert_eq!(
            pipeline.png_path_for(Path::new("/in/Poster.PSD")),
            PathBuf::from("/up/Poster.png")
        );
    }
}
