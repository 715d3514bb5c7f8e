//! Live Reader: re-derives the corpus from disk on every lookup.
//!
//! No snapshot is retained. Each query opens its own file handle,
//! scans sequentially until the first match or EOF, and releases the
//! handle on every exit path. Lookups always reflect the file's
//! current on-disk state, including concurrent external edits.

use crate::core::types::Verdict;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

/// Lookup strategy that scans the corpus file per query
#[derive(Debug, Clone)]
pub struct LiveReader {
    path: PathBuf,
}

impl LiveReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scan the file for an exact line match.
    ///
    /// A read error mid-scan (file truncated or rotated while we
    /// hold the handle) resolves to NOT-FOUND with a warning rather
    /// than failing the session; availability is prioritized over
    /// strict correctness under file volatility.
    pub async fn lookup(&self, query: &str) -> Verdict {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corpus open failed during live lookup");
                return Verdict::NotFound;
            }
        };

        let mut lines = BufReader::new(file).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line == query {
                        return Verdict::Found;
                    }
                }
                Ok(None) => return Verdict::NotFound,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "read error mid-scan, reporting not found");
                    return Verdict::NotFound;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn corpus_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_lookup_hits_and_misses() {
        let file = corpus_file("apple\nbanana\ncherry\n");
        let reader = LiveReader::new(file.path());

        assert_eq!(reader.lookup("banana").await, Verdict::Found);
        assert_eq!(reader.lookup("grape").await, Verdict::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_sees_appended_line() {
        let mut file = corpus_file("apple\n");
        let reader = LiveReader::new(file.path());

        assert_eq!(reader.lookup("grape").await, Verdict::NotFound);

        file.write_all(b"grape\n").unwrap();
        file.flush().unwrap();

        assert_eq!(reader.lookup("grape").await, Verdict::Found);
    }

    #[tokio::test]
    async fn test_missing_file_reports_not_found() {
        let reader = LiveReader::new("/nonexistent/corpus.txt");
        assert_eq!(reader.lookup("apple").await, Verdict::NotFound);
    }

    #[tokio::test]
    async fn test_whitespace_is_significant() {
        let file = corpus_file("  indented\n");
        let reader = LiveReader::new(file.path());

        assert_eq!(reader.lookup("  indented").await, Verdict::Found);
        assert_eq!(reader.lookup("indented").await, Verdict::NotFound);
    }
}
