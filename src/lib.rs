//! haystack - Exact Line-Match Lookup Service
//!
//! A TCP (optionally TLS) server answering one question per
//! connection: does the configured text corpus contain a line
//! exactly equal to the query? Built to sustain many concurrent
//! clients at low per-query latency against corpora of hundreds of
//! thousands of lines.
//!
//! # Architecture
//!
//! The codebase is organized into three main modules:
//!
//! - **core**: Domain logic (transport-agnostic)
//!   - config, error, types, xdg
//!   - corpus (static index, live reader)
//!   - querylog (per-lookup records)
//!   - services (unified service container)
//!
//! - **net**: TCP/TLS adapter (depends on core)
//!   - protocol, session, server, tls, client
//!
//! - **cli**: query-client adapter (depends on core + net)
//!
//! # Key Features
//!
//! - Two corpus-consistency modes behind one `reread_on_query` knob:
//!   a load-once static index (O(1) lookups, stale on edits) or a
//!   per-query live file scan (always current)
//! - Task-per-connection with a configurable active-session bound
//! - Optional TLS with support for passphrase-protected keys
//! - Per-query records (timestamp, query, duration) for load-test
//!   validation, as tracing events and optional JSONL

// Core domain logic (transport-agnostic)
pub mod core;

// TCP/TLS transport adapter
pub mod net;

// Query-client CLI adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use crate::core::config::Config;
pub use crate::core::error::{HaystackError, Result};
pub use crate::core::services::Services;
pub use crate::core::types::{LookupOutcome, QueryRecord, Verdict};
pub use crate::net::Server;
