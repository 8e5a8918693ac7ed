pub mod event;
pub mod settle;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use tracing::{debug, error, info, warn};

use crate::error::WatchError;
use crate::file_kind::has_extension;

use event::{WatchEvent, classify};

/// Lifecycle of a watch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Registered,
    Waiting,
    Dispatching,
    Stopped,
}

/// What travels from the notify backend (or an `Interrupter`) to the loop.
enum Signal {
    Notify(notify::Result<notify::Event>),
    Interrupt,
}

/// Ends a running watch session from another thread.
#[derive(Clone)]
pub struct Interrupter {
    tx: Sender<Signal>,
}

impl Interrupter {
    /// Wake the watcher and make it stop without re-arming.
    /// Has no effect once the session has ended.
    pub fn interrupt(&self) {
        let _ = self.tx.send(Signal::Interrupt);
    }
}

/// A blocking, single-threaded directory watcher.
///
/// Dispatch is synchronous: the callback runs on the watching thread, and the
/// next event is not looked at until it returns.
pub struct Watcher {
    dir: PathBuf,
    extension: String,
    state: WatchState,
    tx: Sender<Signal>,
    rx: Receiver<Signal>,
    /// Keep alive: dropping the backend watcher ends the subscription.
    _backend: RecommendedWatcher,
}

impl Watcher {
    /// Subscribe to create/modify notifications on `dir` (non-recursive),
    /// reporting files whose extension matches `extension`.
    pub fn new(dir: &Path, extension: &str) -> Result<Self, WatchError> {
        if !dir.is_dir() {
            return Err(WatchError::MissingDirectory(dir.to_path_buf()));
        }

        let (tx, rx) = mpsc::channel::<Signal>();
        let backend_tx = tx.clone();
        let subscribe_err = |source: notify::Error| WatchError::Subscribe {
            path: dir.to_path_buf(),
            source,
        };

        let mut backend = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = backend_tx.send(Signal::Notify(res));
        })
        .map_err(subscribe_err)?;
        backend
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(subscribe_err)?;

        let mut watcher = Self {
            dir: dir.to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
            state: WatchState::Idle,
            tx,
            rx,
            _backend: backend,
        };
        watcher.transition(WatchState::Registered);
        Ok(watcher)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[allow(dead_code)]
    pub fn state(&self) -> WatchState {
        self.state
    }

    // No signal handler is installed; the CLI runs until killed.
    #[allow(dead_code)]
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            tx: self.tx.clone(),
        }
    }

    /// Run until the subscription is invalidated (the directory disappears),
    /// which returns `Ok(())`, or until interrupted, which returns
    /// `Err(WatchError::Interrupted)`. There is no automatic restart.
    pub fn run<F>(mut self, mut on_file: F) -> Result<(), WatchError>
    where
        F: FnMut(&Path),
    {
        info!("watching {} for .{} files", self.dir.display(), self.extension);

        loop {
            self.transition(WatchState::Waiting);
            let batch = match self.wait_batch() {
                Ok(batch) => batch,
                Err(err) => {
                    error!("watch on {} interrupted", self.dir.display());
                    self.transition(WatchState::Stopped);
                    return Err(err);
                }
            };

            self.transition(WatchState::Dispatching);
            let handled = dispatch_batch(&self.dir, &batch, &self.extension, &mut on_file);
            debug!("batch of {} event(s), {} dispatched", batch.len(), handled);

            if !rearm(&self.dir) {
                warn!(
                    "watch on {} is no longer valid, stopping",
                    self.dir.display()
                );
                self.transition(WatchState::Stopped);
                return Ok(());
            }
        }
    }

    /// Block until at least one notification arrives, then drain whatever
    /// else is already queued into the same batch.
    fn wait_batch(&self) -> Result<Vec<WatchEvent>, WatchError> {
        let first = self.rx.recv().map_err(|_| WatchError::Interrupted)?;
        let mut batch = Vec::new();
        absorb(first, &mut batch)?;
        while let Ok(signal) = self.rx.try_recv() {
            absorb(signal, &mut batch)?;
        }
        Ok(batch)
    }

    fn transition(&mut self, next: WatchState) {
        debug!("watcher {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn absorb(signal: Signal, batch: &mut Vec<WatchEvent>) -> Result<(), WatchError> {
    match signal {
        Signal::Notify(raw) => {
            batch.extend(classify(raw));
            Ok(())
        }
        Signal::Interrupt => Err(WatchError::Interrupted),
    }
}

/// The subscription stays valid for as long as the watched directory exists.
fn rearm(dir: &Path) -> bool {
    dir.is_dir()
}

/// Run `on_file` for every event in `events`, in order, whose name resolves to
/// a file under `dir` with the given extension. Overflow events are logged
/// and skipped. Returns the number of callback invocations.
pub fn dispatch_batch<F>(
    dir: &Path,
    events: &[WatchEvent],
    extension: &str,
    on_file: &mut F,
) -> usize
where
    F: FnMut(&Path),
{
    let mut dispatched = 0;
    for event in events {
        let Some(name) = event.name() else {
            warn!("notification queue overflowed in {}; events were lost", dir.display());
            continue;
        };

        // Backends report absolute paths; `join` keeps those and resolves bare names.
        let path = dir.join(name);
        if !has_extension(&path, extension) {
            continue;
        }

        info!("detected {}", path.display());
        on_file(&path);
        dispatched += 1;
    }
    dispatched
}
