use std::path::{Path, PathBuf};

use serde::Serialize;

/// Extension of the layered source format, without the leading dot.
pub const PSD_EXTENSION: &str = "psd";
/// Extension of the flat raster target format, without the leading dot.
pub const PNG_EXTENSION: &str = "png";

/// Kind of an image file, derived from its lowercase extension.
///
/// A plain enum, cheap to copy and pattern-matched wherever a file is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileKind {
    Psd,
    Png,
    Other,
}

impl FileKind {
    /// Classify a path by its extension. Case-insensitive.
    pub fn from_path(path: &Path) -> FileKind {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some(PSD_EXTENSION) => FileKind::Psd,
            Some(PNG_EXTENSION) => FileKind::Png,
            _ => FileKind::Other,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FileKind::Psd => "PSD",
            FileKind::Png => "PNG",
            FileKind::Other => "other",
        }
    }
}

/// A file discovered on disk. No identity beyond its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        let kind = FileKind::from_path(&path);
        Self { path, kind }
    }

    /// Base name of the file, lossily converted for display and name derivation.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Returns true if `path` ends with `.<extension>`, ignoring ASCII case.
///
/// `extension` may be given with or without its leading dot.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}
