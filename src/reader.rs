//! Line-by-line reading of a log file that may grow or be truncated.

use crate::error::{Error, Result};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};

/// Per-session state for a tailed file: the open handle, a buffered reader
/// over it and the size observed at the last poll.
///
/// The file handle is closed when the session is dropped.
pub(crate) struct TailSession {
    path: PathBuf,
    reader: BufReader<File>,
    last_size: u64,
    position: u64,
    pending: Vec<u8>,
}

impl TailSession {
    /// Opens `path` and positions the cursor at its current end.
    pub(crate) async fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path).await.map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = file.metadata().await.map_err(|source| Error::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        let position = file.seek(SeekFrom::End(0)).await?;

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            last_size: metadata.len(),
            position,
            pending: Vec::new(),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the next complete line, including its trailing newline.
    ///
    /// Returns `Ok(None)` when the file has no complete line past the cursor.
    /// Bytes of an unfinished line are kept and completed by a later call.
    pub(crate) async fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        let read = self.reader.read_until(b'\n', &mut self.pending).await?;
        self.position += read as u64;

        if self.pending.last() == Some(&b'\n') {
            Ok(Some(std::mem::take(&mut self.pending)))
        } else {
            Ok(None)
        }
    }

    /// Re-stats the file after an idle wait.
    ///
    /// Returns true when the file shrank and the cursor was reset to its start.
    /// A failed stat is skipped; the next poll tries again.
    pub(crate) async fn poll_size(&mut self) -> Result<bool> {
        let current_size = match self.reader.get_ref().metadata().await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "stat failed during poll");
                return Ok(false);
            }
        };

        if detect_file_truncation(current_size, self.last_size, self.position) {
            self.rewind().await?;
            return Ok(true);
        }

        self.last_size = current_size;
        Ok(false)
    }

    /// Moves the cursor back to the start with an empty read buffer.
    async fn rewind(&mut self) -> Result<()> {
        // Seeking through the BufReader drops whatever it had buffered.
        self.reader.seek(SeekFrom::Start(0)).await?;

        self.position = 0;
        self.last_size = 0;
        self.pending.clear();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn last_size(&self) -> u64 {
        self.last_size
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> u64 {
        self.position
    }
}

/// The file was truncated when it is now smaller than the size last observed,
/// or smaller than the number of bytes already consumed.
fn detect_file_truncation(current_size: u64, last_size: u64, position: u64) -> bool {
    current_size < last_size.max(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempLogFile;

    #[test]
    fn test_detect_file_truncation() {
        assert!(detect_file_truncation(100, 200, 200)); // File shrank
        assert!(!detect_file_truncation(200, 100, 100)); // File grew
        assert!(!detect_file_truncation(100, 100, 100)); // No change
    }

    #[test]
    fn test_detect_file_truncation_against_position() {
        // Appended and consumed since the last poll, then shrank below the cursor.
        assert!(detect_file_truncation(150, 100, 180));
        // Last poll already reset to zero; growth from empty is not truncation.
        assert!(!detect_file_truncation(40, 0, 0));
    }

    #[tokio::test]
    async fn test_open_seeks_to_end() {
        let log = TempLogFile::with_content("existing line").unwrap();
        let mut session = TailSession::open(log.path()).await.unwrap();

        let size = std::fs::metadata(log.path()).unwrap().len();
        assert_eq!(session.position(), size);
        assert_eq!(session.last_size(), size);

        // Existing content is never replayed.
        assert_eq!(session.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.log");

        let result = TailSession::open(&path).await;
        match result {
            Err(Error::Open { path: failed, .. }) => assert_eq!(failed, path),
            Err(e) => panic!("Expected Error::Open, got {e:?}"),
            Ok(_) => panic!("Expected opening a missing file to fail"),
        }
    }

    #[tokio::test]
    async fn test_reads_appended_lines_in_order() {
        let log = TempLogFile::new().unwrap();
        let mut session = TailSession::open(log.path()).await.unwrap();

        log.append_content("first").unwrap();
        log.append_content("second").unwrap();

        assert_eq!(session.next_line().await.unwrap(), Some(b"first\n".to_vec()));
        assert_eq!(session.next_line().await.unwrap(), Some(b"second\n".to_vec()));
        assert_eq!(session.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_partial_line_completed_by_later_append() {
        let log = TempLogFile::new().unwrap();
        let mut session = TailSession::open(log.path()).await.unwrap();

        log.append_raw(b"hello, ").unwrap();
        assert_eq!(session.next_line().await.unwrap(), None);

        log.append_raw(b"world\n").unwrap();
        assert_eq!(
            session.next_line().await.unwrap(),
            Some(b"hello, world\n".to_vec())
        );
    }

    #[tokio::test]
    async fn test_preserves_raw_bytes() {
        let log = TempLogFile::new().unwrap();
        let mut session = TailSession::open(log.path()).await.unwrap();

        log.append_raw(b"crlf line\r\n").unwrap();
        log.append_raw(&[0xff, 0xfe, b' ', b'x', b'\n']).unwrap();

        assert_eq!(
            session.next_line().await.unwrap(),
            Some(b"crlf line\r\n".to_vec())
        );
        assert_eq!(
            session.next_line().await.unwrap(),
            Some(vec![0xff, 0xfe, b' ', b'x', b'\n'])
        );
    }

    #[tokio::test]
    async fn test_poll_size_tracks_growth() {
        let log = TempLogFile::new().unwrap();
        let mut session = TailSession::open(log.path()).await.unwrap();

        log.append_content("abc").unwrap();
        assert!(!session.poll_size().await.unwrap());
        assert_eq!(session.last_size(), 4);
    }

    #[tokio::test]
    async fn test_truncation_rewinds_to_start() {
        let log = TempLogFile::with_content("old content that is fairly long").unwrap();
        let mut session = TailSession::open(log.path()).await.unwrap();

        log.truncate().unwrap();
        log.append_content("new").unwrap();

        assert!(session.poll_size().await.unwrap());
        assert_eq!(session.position(), 0);
        assert_eq!(session.last_size(), 0);

        assert_eq!(session.next_line().await.unwrap(), Some(b"new\n".to_vec()));
        assert_eq!(session.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_truncation_discards_pending_fragment() {
        let log = TempLogFile::with_content("some earlier output").unwrap();
        let mut session = TailSession::open(log.path()).await.unwrap();

        log.append_raw(b"unfinished").unwrap();
        assert_eq!(session.next_line().await.unwrap(), None);

        log.truncate().unwrap();
        assert!(session.poll_size().await.unwrap());

        log.append_content("fresh").unwrap();
        assert_eq!(session.next_line().await.unwrap(), Some(b"fresh\n".to_vec()));
    }
}
