//! Core data types for the haystack service.
//!
//! This module defines the domain structures shared between the
//! corpus store, the session layer, and the query log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a single corpus lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The query matched a corpus line exactly
    Found,
    /// No corpus line equals the query
    NotFound,
}

impl Verdict {
    /// The newline-terminated response line sent on the wire
    pub fn wire_line(&self) -> &'static str {
        match self {
            Verdict::Found => "STRING EXISTS\n",
            Verdict::NotFound => "STRING NOT FOUND\n",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Verdict::Found)
    }
}

/// A completed lookup together with its elapsed search duration
#[derive(Debug, Clone, Copy)]
pub struct LookupOutcome {
    pub verdict: Verdict,
    pub duration: Duration,
}

/// One served query, as recorded for performance validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// When the lookup completed (UTC)
    pub timestamp: DateTime<Utc>,

    /// Peer address the query arrived from
    pub peer: String,

    /// The literal query text after frame stripping
    pub query: String,

    /// Elapsed search duration in microseconds
    pub duration_us: u64,

    /// Lookup verdict
    pub verdict: Verdict,
}
