use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ConverterConfig;
use crate::error::LocateError;
use crate::file_kind::{SourceFile, has_extension};

/// Finds files by extension in a directory, in lexicographic path order.
pub struct Locator<'a> {
    exclude: &'a [String],
    recursive: bool,
}

impl<'a> Locator<'a> {
    pub fn new(config: &'a ConverterConfig) -> Self {
        Self {
            exclude: config.exclude.as_deref().unwrap_or(&[]),
            recursive: false,
        }
    }

    /// Descend into subdirectories instead of scanning depth 1 only.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Collect regular files under `dir` whose extension matches `extension`
    /// (case-insensitive, leading dot optional), sorted by path.
    ///
    /// A missing `dir` is created and yields an empty list.
    pub fn find(&self, dir: &Path, extension: &str) -> Result<Vec<SourceFile>, LocateError> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|source| LocateError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            info!("created missing directory {}", dir.display());
            return Ok(Vec::new());
        }
        if !dir.is_dir() {
            return Err(LocateError::NotADirectory(dir.to_path_buf()));
        }

        let max_depth = if self.recursive { None } else { Some(1) };
        let walker = ignore::WalkBuilder::new(dir)
            // Every file counts, hidden or gitignored ones included.
            .standard_filters(false)
            .max_depth(max_depth)
            .build();

        let mut paths: Vec<PathBuf> = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!("skipping unreadable entry: {err}");
                    continue;
                }
            };

            // `Path::is_file` follows symlinks; the entry's own file type does not.
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if !has_extension(path, extension) {
                continue;
            }
            if is_excluded(path, dir, self.exclude) {
                continue;
            }

            paths.push(path.to_path_buf());
        }

        paths.sort();
        info!(
            "found {} .{} file(s) in {}",
            paths.len(),
            extension.trim_start_matches('.'),
            dir.display()
        );
        Ok(paths.into_iter().map(SourceFile::new).collect())
    }
}

/// Depth-1 search with no exclusions.
pub fn find(dir: &Path, extension: &str) -> Result<Vec<SourceFile>, LocateError> {
    Locator {
        exclude: &[],
        recursive: false,
    }
    .find(dir, extension)
}

/// Returns true if `path`, relative to the scanned `root`, or any of its
/// components below `root`, matches an exclusion pattern.
fn is_excluded(path: &Path, root: &Path, patterns: &[String]) -> bool {
    let path = path.strip_prefix(root).unwrap_or(path);
    let path_str = path.to_string_lossy();

    for pattern in patterns {
        let Ok(matcher) = glob::Pattern::new(pattern) else {
            continue;
        };
        if matcher.matches(&path_str) {
            return true;
        }
        for component in path.components() {
            if let Some(s) = component.as_os_str().to_str()
                && matcher.matches(s)
            {
                return true;
            }
        }
    }

    false
}
