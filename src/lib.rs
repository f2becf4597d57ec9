//! An HTTP endpoint that follows a bootstrap log file and pushes each new
//! line to the connected client as a Server-Sent Event.
//!
//! Every request to `/logs/stream` opens the log file on its own, starts at
//! the current end of the file and forwards lines as they are appended. The
//! stream ends when the bootstrap process writes the `__BOOTSTRAP_DONE__`
//! sentinel line, when the client disconnects, or when the file can no longer
//! be read. A file that shrinks is treated as rotated and is followed again
//! from its start.
//!
//! # Example
//!
//! ```rust,no_run
//! use bootstrap_log_stream::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     serve(ServerConfig::default()).await?;
//!     Ok(())
//! }
//! ```
//!
//! The tail loop can also be consumed directly:
//!
//! ```rust,no_run
//! use bootstrap_log_stream::{LogStream, TailEvent, TailOptions};
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut stream = LogStream::new("/var/log/bootstrap.log", TailOptions::default());
//!
//!     while let Some(event) = stream.next().await {
//!         if let TailEvent::Line(line) = event {
//!             print!("{}", String::from_utf8_lossy(&line));
//!         }
//!     }
//! }
//! ```

pub mod config;
mod error;
mod reader;
pub mod server;
mod sse;
mod stream;
mod watcher;

#[cfg(test)]
mod test_helpers;

pub use config::{ServerConfig, TailOptions};
pub use error::{Error, Result};
pub use server::{AppState, create_router, serve};
pub use sse::TailEvent;
pub use stream::LogStream;
