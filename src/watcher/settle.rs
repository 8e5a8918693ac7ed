use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

/// How long to wait for a freshly detected file to stop growing.
#[derive(Debug, Clone, Copy)]
pub struct SettlePolicy {
    /// Fixed pause before the first size reading.
    pub delay: Duration,
    /// Pause between size readings.
    pub poll: Duration,
    /// Readings to take before giving up on stability.
    pub max_polls: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Two consecutive readings agreed on this size.
    Stable(u64),
    /// The size was still changing after `max_polls` readings.
    StillChanging(u64),
    /// The file vanished while waiting.
    Gone,
}

/// Wait for an external writer to finish producing `path`.
///
/// Sleeps for the fixed delay, then reads the size every `poll` until two
/// consecutive readings match. This is a heuristic: it cannot tell a paused
/// writer from a finished one.
pub fn wait_until_stable(path: &Path, policy: &SettlePolicy) -> Settled {
    thread::sleep(policy.delay);

    let Some(mut last) = file_len(path) else {
        return Settled::Gone;
    };

    for _ in 0..policy.max_polls {
        thread::sleep(policy.poll);
        let Some(current) = file_len(path) else {
            return Settled::Gone;
        };
        if current == last {
            debug!("{} settled at {} bytes", path.display(), current);
            return Settled::Stable(current);
        }
        last = current;
    }

    warn!(
        "{} still changing after {} checks; continuing anyway",
        path.display(),
        policy.max_polls
    );
    Settled::StillChanging(last)
}

fn file_len(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}
