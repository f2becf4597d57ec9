//! The tail-and-forward loop, exposed as a stream of [`TailEvent`]s.

use crate::config::TailOptions;
use crate::error::Error;
use crate::reader::TailSession;
use crate::sse::TailEvent;
use crate::watcher::{FileWatcher, idle_wait};
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A stream that follows a log file and yields the events for one client.
///
/// The stream ends once the session terminates. Dropping it cancels the
/// session, which is how a disconnected HTTP client stops its tail loop.
pub struct LogStream {
    receiver: mpsc::Receiver<TailEvent>,
    cancel: CancellationToken,
    _task_handle: JoinHandle<()>,
}

impl LogStream {
    /// Starts following the file at `path` from its current end.
    pub fn new<P: AsRef<Path>>(path: P, options: TailOptions) -> Self {
        Self::with_cancellation(path, options, CancellationToken::new())
    }

    /// Like [`LogStream::new`], ending the session when `cancel` fires.
    pub fn with_cancellation<P: AsRef<Path>>(
        path: P,
        options: TailOptions,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel(options.channel_capacity.max(1));

        let task_handle = tokio::spawn(tail_task(
            path.as_ref().to_path_buf(),
            options,
            tx,
            cancel.clone(),
        ));

        LogStream {
            receiver: rx,
            cancel,
            _task_handle: task_handle,
        }
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Stream for LogStream {
    type Item = TailEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Why a tail loop stopped.
#[derive(Debug)]
enum TailExit {
    Disconnected,
    Sentinel,
    Failed(Error),
}

/// Background task driving one streaming session.
async fn tail_task(
    path: PathBuf,
    options: TailOptions,
    tx: mpsc::Sender<TailEvent>,
    cancel: CancellationToken,
) {
    let mut session = match TailSession::open(&path).await {
        Ok(session) => session,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot tail log file");
            forward(&tx, &cancel, TailEvent::Error(e.to_string())).await;
            return;
        }
    };

    let mut watcher = match FileWatcher::new(&path) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "file watcher unavailable, polling only");
            None
        }
    };

    let connected = TailEvent::Connected { path: path.clone() };
    if !forward(&tx, &cancel, connected).await {
        info!("Client disconnected");
        return;
    }
    info!(path = %path.display(), "Client connected, streaming log");

    match follow(&mut session, &mut watcher, &options, &tx, &cancel).await {
        TailExit::Disconnected => info!("Client disconnected"),
        TailExit::Sentinel => info!("Bootstrap complete sentinel seen, stopping stream"),
        TailExit::Failed(e) => {
            warn!(path = %session.path().display(), error = %e, "log stream failed");
            forward(&tx, &cancel, TailEvent::Error(e.to_string())).await;
        }
    }
}

/// Reads lines until the client leaves, the sentinel shows up or a read fails.
async fn follow(
    session: &mut TailSession,
    watcher: &mut Option<FileWatcher>,
    options: &TailOptions,
    tx: &mpsc::Sender<TailEvent>,
    cancel: &CancellationToken,
) -> TailExit {
    loop {
        if cancel.is_cancelled() {
            return TailExit::Disconnected;
        }

        match session.next_line().await {
            Ok(Some(line)) => {
                if options.is_sentinel(&line) {
                    return TailExit::Sentinel;
                }
                if !forward(tx, cancel, TailEvent::Line(line)).await {
                    return TailExit::Disconnected;
                }
            }
            Ok(None) => {
                tokio::select! {
                    _ = cancel.cancelled() => return TailExit::Disconnected,
                    _ = idle_wait(watcher, options.poll_interval) => {}
                }

                match session.poll_size().await {
                    Ok(true) => info!(
                        path = %session.path().display(),
                        "Log file was truncated, resetting position"
                    ),
                    Ok(false) => {}
                    Err(e) => return TailExit::Failed(e),
                }
            }
            Err(e) => return TailExit::Failed(e),
        }
    }
}

/// Hands an event to the response. Returns false once the client is gone.
async fn forward(
    tx: &mpsc::Sender<TailEvent>,
    cancel: &CancellationToken,
    event: TailEvent,
) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = tx.send(event) => {
            if sent.is_err() {
                debug!("event receiver dropped");
            }
            sent.is_ok()
        }
    }
}
