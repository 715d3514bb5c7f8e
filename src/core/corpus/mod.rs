//! Corpus store: the searchable representation of the text file.
//!
//! Two interchangeable strategies behind one facade, selected by
//! `reread_on_query`:
//!
//! - **Static Index** (`static_index`): precomputed immutable
//!   membership set, O(1) lookups, blind to file edits after load.
//! - **Live Reader** (`live`): sequential scan of the file on every
//!   query, O(n) worst case, always current.
//!
//! The static snapshot sits behind an `ArcSwap` so reads never lock
//! and `reload` can install a fully-formed replacement atomically
//! while lookups are in flight.

mod live;
mod static_index;

pub use live::LiveReader;
pub use static_index::StaticIndex;

use crate::core::config::CorpusConfig;
use crate::core::error::Result;
use crate::core::types::{LookupOutcome, Verdict};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Facade over the two corpus-consistency modes
#[derive(Debug)]
pub struct CorpusStore {
    mode: Mode,
}

#[derive(Debug)]
enum Mode {
    Static {
        config: CorpusConfig,
        index: ArcSwap<StaticIndex>,
    },
    Live {
        reader: LiveReader,
    },
}

impl CorpusStore {
    /// Build the store for the configured mode.
    ///
    /// Static mode reads the corpus here and fails fast when the
    /// file is missing or unreadable; Live mode defers all file
    /// access to query time.
    pub fn open(config: &CorpusConfig) -> Result<Self> {
        let mode = if config.reread_on_query {
            info!(path = %config.txt_file.display(), "corpus store in live mode");
            Mode::Live {
                reader: LiveReader::new(&config.txt_file),
            }
        } else {
            let index = StaticIndex::load(&config.txt_file)?;
            Mode::Static {
                config: config.clone(),
                index: ArcSwap::from_pointee(index),
            }
        };

        Ok(Self { mode })
    }

    /// Perform exactly one lookup, timing the search itself.
    pub async fn lookup(&self, query: &str) -> LookupOutcome {
        let start = Instant::now();
        let verdict = match &self.mode {
            Mode::Static { index, .. } => {
                if index.load().contains(query) {
                    Verdict::Found
                } else {
                    Verdict::NotFound
                }
            }
            Mode::Live { reader } => reader.lookup(query).await,
        };

        LookupOutcome {
            verdict,
            duration: start.elapsed(),
        }
    }

    /// Rebuild the static snapshot from disk and swap it in.
    ///
    /// In-flight lookups keep reading the old snapshot until the
    /// swap completes; none ever observes a partially built index.
    /// No-op in Live mode, which is always current.
    pub fn reload(&self) -> Result<()> {
        match &self.mode {
            Mode::Static { config, index } => {
                let fresh = StaticIndex::load(&config.txt_file)?;
                info!(
                    lines = fresh.line_count(),
                    distinct = fresh.distinct_count(),
                    "corpus snapshot reloaded"
                );
                index.store(Arc::new(fresh));
                Ok(())
            }
            Mode::Live { .. } => Ok(()),
        }
    }

    /// Mode name for startup logging
    pub fn mode_name(&self) -> &'static str {
        match &self.mode {
            Mode::Static { .. } => "static",
            Mode::Live { .. } => "live",
        }
    }

    /// Line count of the current static snapshot, if any
    pub fn line_count(&self) -> Option<usize> {
        match &self.mode {
            Mode::Static { index, .. } => Some(index.load().line_count()),
            Mode::Live { .. } => None,
        }
    }
}
