//! Static Index: a load-once, in-memory snapshot of the corpus.
//!
//! Built at startup when `reread_on_query` is off. Membership tests
//! are O(1) expected and never touch disk, so lookup latency is
//! independent of corpus size. The snapshot is blind to any edit of
//! the file after load; freshness requires Live mode or an explicit
//! reload.

use crate::core::error::{HaystackError, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Immutable membership snapshot of the corpus file
#[derive(Debug)]
pub struct StaticIndex {
    lines: HashSet<String>,
    line_count: usize,
}

impl StaticIndex {
    /// Read the whole file and build the membership set.
    ///
    /// Fails if the file is missing or unreadable. A zero-line file
    /// loads successfully with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| HaystackError::CorpusLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        let reader = BufReader::new(file);
        let mut lines = HashSet::new();
        let mut line_count = 0usize;

        for line in reader.lines() {
            let line = line.map_err(|e| HaystackError::CorpusLoad {
                path: path.to_path_buf(),
                source: e,
            })?;
            line_count += 1;
            lines.insert(line);
        }

        if line_count == 0 {
            warn!(path = %path.display(), "corpus file is empty; every lookup will miss");
        } else {
            info!(
                path = %path.display(),
                lines = line_count,
                distinct = lines.len(),
                "corpus snapshot loaded"
            );
        }

        Ok(Self { lines, line_count })
    }

    /// Exact, case-sensitive, whole-line membership test
    pub fn contains(&self, query: &str) -> bool {
        self.lines.contains(query)
    }

    /// Total lines read at load time (duplicates included)
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Distinct lines held in the set
    pub fn distinct_count(&self) -> usize {
        self.lines.len()
    }
}
