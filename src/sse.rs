//! Server-Sent Events wire encoding for tail events.
//!
//! Events are encoded by hand instead of through `axum::response::sse::Event`
//! because log lines are forwarded byte for byte, trailing newline and any
//! carriage return included, which the typed builder rejects.

use bytes::{BufMut, Bytes, BytesMut};
use std::path::PathBuf;

/// Something a tailing session reports to its client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailEvent {
    /// The session opened the log file and is following it.
    Connected { path: PathBuf },
    /// A complete line from the log, including its trailing newline.
    Line(Vec<u8>),
    /// The session failed and is about to end.
    Error(String),
}

impl TailEvent {
    /// Encodes the event as a complete event-stream frame.
    pub fn encode(&self) -> Bytes {
        match self {
            TailEvent::Connected { path } => named_event(
                "connected",
                &format!("Streaming logs from {}", path.display()),
            ),
            TailEvent::Error(message) => named_event("error", message),
            TailEvent::Line(line) => {
                let mut buf = BytesMut::with_capacity(line.len() + 8);
                buf.put_slice(b"data: ");
                buf.put_slice(line);
                buf.put_u8(b'\n');
                buf.freeze()
            }
        }
    }
}

fn named_event(name: &str, data: &str) -> Bytes {
    Bytes::from(format!("event: {name}\ndata: {data}\n\n"))
}
