//! Error types for the log streamer.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for log streaming operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The log file could not be opened when a session started.
    #[error("open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log file's metadata could not be read when a session started.
    #[error("stat {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O errors while reading or seeking an open log file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A convenient Result type for log streaming operations.
pub type Result<T> = std::result::Result<T, Error>;
