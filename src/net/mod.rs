//! TCP/TLS transport adapter (depends on core)
//!
//! # Architecture
//!
//! - **protocol**: wire framing shared by server and client
//! - **session**: one connection's request-response lifecycle
//! - **server**: listener, dispatcher, concurrency bound, signals
//! - **tls**: rustls acceptor construction and key loading
//! - **client**: one-shot query client used by the `haystack` CLI

pub mod client;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tls;

pub use server::Server;
pub use session::Session;
