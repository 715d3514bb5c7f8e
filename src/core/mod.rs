//! Core domain logic (transport-agnostic)
//!
//! This module contains all business logic that is independent
//! of the TCP/TLS transport.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **corpus**: The two corpus-consistency strategies
//! - **querylog**: Per-lookup records for load-test validation
//! - **services**: Unified service container

pub mod config;
pub mod corpus;
pub mod error;
pub mod querylog;
pub mod services;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{HaystackError, Result};
pub use services::Services;
