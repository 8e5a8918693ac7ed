use std::path::PathBuf;

/// Per-file conversion failure. Caught at the file boundary and turned into a
/// failed `ConversionResult`; never aborts a batch.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("source file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("source is not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("not a PSD file: {}", .0.display())]
    WrongKind(PathBuf),
    #[error("could not decode {}: {reason}", .path.display())]
    DecodeFailed { path: PathBuf, reason: String },
    #[error("could not copy {} to {}: {source}", .from.display(), .to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {}: {reason}", .path.display())]
    WriteFailed { path: PathBuf, reason: String },
}

/// Failure of a watch session. Fatal to that `Watcher`; there is no retry.
#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("cannot watch {}: {source}", .path.display())]
    Subscribe {
        path: PathBuf,
        source: notify::Error,
    },
    #[error("watch directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("watch interrupted")]
    Interrupted,
}

#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("i/o error while scanning {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
