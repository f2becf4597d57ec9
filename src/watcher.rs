//! Filesystem notifications that wake an idle tail loop early.

use crate::error::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Pending notifications kept per watcher. One queued event is enough to wake
/// the loop, so overflow is dropped.
const EVENT_QUEUE_CAPACITY: usize = 16;

/// Watches the directory holding a log file and reports events for that file.
pub(crate) struct FileWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<notify::Result<Event>>,
    file_name: String,
}

impl FileWatcher {
    /// Starts watching the parent directory of `path`.
    ///
    /// The directory is watched rather than the file so that truncation and
    /// replacement by a new file keep producing events.
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref();
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

        let target = file_name.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // Other files in the directory never reach the queue.
                if let Ok(event) = &res {
                    if !is_event_relevant_to_file(event, &target) {
                        return;
                    }
                }
                let _ = tx.try_send(res);
            },
            Config::default(),
        )?;
        watcher.watch(&watch_dir(file_path), RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            file_name,
        })
    }

    /// Returns the next file system event.
    pub(crate) async fn next_event(&mut self) -> Option<notify::Result<Event>> {
        self.receiver.recv().await
    }

    /// Discards queued events, returning how many there were.
    pub(crate) fn drain(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(event) = self.receiver.try_recv() {
            if let Err(e) = event {
                tracing::debug!(error = %e, "discarding stale watcher error");
            }
            drained += 1;
        }
        drained
    }

    pub(crate) fn is_relevant(&self, event: &Event) -> bool {
        is_event_relevant_to_file(event, &self.file_name)
    }
}

/// Directory to register with the watcher; a bare file name lives in the
/// current directory.
fn watch_dir(file_path: &Path) -> PathBuf {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Check if a notify event is relevant to a specific file
pub(crate) fn is_event_relevant_to_file(event: &Event, target_file_name: &str) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy() == target_file_name)
            .unwrap_or(false)
    })
}

/// Waits for `interval`, returning early when `watcher` reports a change to
/// the tailed file.
///
/// Events queued before the wait describe data the caller has already read
/// up to end of file, so they are discarded first. A watcher that errors or
/// closes is dropped and later waits poll only.
pub(crate) async fn idle_wait(watcher: &mut Option<FileWatcher>, interval: Duration) {
    if let Some(active) = watcher.as_mut() {
        active.drain();
    }

    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        let Some(active) = watcher.as_mut() else {
            sleep.await;
            return;
        };

        let event = tokio::select! {
            _ = &mut sleep => return,
            event = active.next_event() => event,
        };

        match event {
            Some(Ok(event)) if active.is_relevant(&event) => return,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "file watcher failed, falling back to polling");
                *watcher = None;
            }
            None => {
                tracing::debug!("file watcher closed, falling back to polling");
                *watcher = None;
            }
        }
    }
}
