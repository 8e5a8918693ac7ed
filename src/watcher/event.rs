use std::path::{Path, PathBuf};

use notify::EventKind;

/// One notification after classification, consumed once by the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file appeared in the watched directory. Carries the name as reported.
    Created(PathBuf),
    /// An existing file changed.
    Modified(PathBuf),
    /// The backend dropped notifications; nothing is known about which files.
    Overflow,
}

impl WatchEvent {
    /// Name carried by the event, if any.
    pub fn name(&self) -> Option<&Path> {
        match self {
            WatchEvent::Created(p) | WatchEvent::Modified(p) => Some(p),
            WatchEvent::Overflow => None,
        }
    }
}

/// Translate one raw `notify` result into zero or more watch events.
///
/// - backend error, or an event flagged for rescan -> `Overflow`
/// - `Create` -> `Created`, `Modify` -> `Modified`, one per path
/// - everything else (access, remove, other) is dropped
pub fn classify(raw: notify::Result<notify::Event>) -> Vec<WatchEvent> {
    let event = match raw {
        Ok(event) => event,
        Err(_) => return vec![WatchEvent::Overflow],
    };

    if event.need_rescan() {
        return vec![WatchEvent::Overflow];
    }

    let wrap: fn(PathBuf) -> WatchEvent = match event.kind {
        EventKind::Create(_) => WatchEvent::Created,
        EventKind::Modify(_) => WatchEvent::Modified,
        _ => return Vec::new(),
    };

    event.paths.into_iter().map(wrap).collect()
}
