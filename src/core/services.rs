//! Unified service container for haystack.
//!
//! Provides shared access to the corpus store, the query log, and
//! the configuration snapshot. Cloning is cheap; every session holds
//! one clone for the duration of its connection.

use crate::core::config::Config;
use crate::core::corpus::CorpusStore;
use crate::core::error::Result;
use crate::core::querylog::QueryLog;
use std::sync::Arc;

/// Unified services container
#[derive(Debug, Clone)]
pub struct Services {
    /// Corpus store (static index or live reader)
    pub corpus: Arc<CorpusStore>,

    /// Per-query record sink
    pub query_log: Arc<QueryLog>,

    /// Application configuration, immutable after load
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration.
    ///
    /// In static mode this is where the corpus file is read; a
    /// missing or unreadable file aborts startup here.
    pub async fn new(config: Config) -> Result<Self> {
        let corpus = Arc::new(CorpusStore::open(&config.corpus)?);

        let query_log = match &config.logging.query_log_file {
            Some(path) => Arc::new(QueryLog::open(path).await?),
            None => Arc::new(QueryLog::disabled()),
        };

        Ok(Self {
            corpus,
            query_log,
            config: Arc::new(config),
        })
    }
}
