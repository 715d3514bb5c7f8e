//! Per-query records for performance validation.
//!
//! Every served lookup is emitted as a structured tracing event on
//! the `haystack::query` target. When a query log file is
//! configured, the same record is also appended as one JSON line.
//! Records travel over a channel to a dedicated writer task so
//! sessions never block on log disk IO.

use crate::core::error::{HaystackError, Result};
use crate::core::types::QueryRecord;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Handle recording served queries
#[derive(Debug, Clone)]
pub struct QueryLog {
    sink: Option<mpsc::UnboundedSender<QueryRecord>>,
}

impl QueryLog {
    /// Log to tracing only
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Log to tracing plus a JSONL file, appending if it exists
    pub async fn open(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| {
                HaystackError::Config(format!(
                    "cannot open query log file {}: {e}",
                    path.display()
                ))
            })?;

        let (tx, mut rx) = mpsc::unbounded_channel::<QueryRecord>();
        let log_path = path.to_path_buf();

        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                let mut line = match serde_json::to_vec(&record) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize query record");
                        continue;
                    }
                };
                line.push(b'\n');
                if let Err(e) = file.write_all(&line).await {
                    warn!(path = %log_path.display(), error = %e, "query log write failed");
                }
            }
            let _ = file.flush().await;
        });

        Ok(Self { sink: Some(tx) })
    }

    /// Record one served query
    pub fn record(&self, record: QueryRecord) {
        info!(
            target: "haystack::query",
            peer = %record.peer,
            query = %record.query,
            duration_us = record.duration_us,
            verdict = ?record.verdict,
            "query served"
        );

        if let Some(sink) = &self.sink {
            // Writer task gone means shutdown is underway; drop silently
            let _ = sink.send(record);
        }
    }
}
