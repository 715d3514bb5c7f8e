//! Per-connection session: one query, one lookup, one verdict.
//!
//! A session owns its stream exclusively for its whole life. Every
//! failure here is scoped to the connection; the listener and all
//! other sessions continue unaffected.

use crate::core::error::{HaystackError, Result};
use crate::core::services::Services;
use crate::core::types::{QueryRecord, Verdict};
use crate::net::protocol::{self, RawRequest};
use chrono::Utc;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// One client connection's lifecycle
pub struct Session<S> {
    stream: S,
    peer: SocketAddr,
    services: Services,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, services: Services) -> Self {
        Self {
            stream,
            peer,
            services,
        }
    }

    /// Process exactly one request-response cycle, bounded by the
    /// configured session timeout, then close.
    pub async fn run(mut self) -> Result<()> {
        let timeout = Duration::from_secs(self.services.config.limits.request_timeout_secs);
        let peer = self.peer;
        let result = tokio::time::timeout(timeout, self.serve_one()).await;
        match result {
            Ok(result) => result,
            Err(_) => Err(HaystackError::Session(format!(
                "session with {peer} timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }

    async fn serve_one(&mut self) -> Result<()> {
        let max_bytes = self.services.config.limits.request_buffer_bytes;

        let request = protocol::read_request(&mut self.stream, max_bytes)
            .await
            .map_err(|e| HaystackError::Session(format!("read from {} failed: {e}", self.peer)))?;

        let query = match request {
            RawRequest::Disconnected => {
                debug!(peer = %self.peer, "peer disconnected before sending a query");
                return Ok(());
            }
            RawRequest::Oversized => {
                warn!(peer = %self.peer, max_bytes, "request exceeded buffer, rejecting");
                return self.respond(Verdict::NotFound).await;
            }
            RawRequest::Frame(bytes) => {
                let stripped = protocol::strip_padding(&bytes);
                match std::str::from_utf8(stripped) {
                    Ok(text) => text.to_string(),
                    Err(_) => {
                        // Not decodable as text, cannot equal any corpus line
                        warn!(peer = %self.peer, "query is not valid UTF-8, rejecting");
                        return self.respond(Verdict::NotFound).await;
                    }
                }
            }
        };

        let outcome = self.services.corpus.lookup(&query).await;

        self.services.query_log.record(QueryRecord {
            timestamp: Utc::now(),
            peer: self.peer.to_string(),
            query,
            duration_us: outcome.duration.as_micros() as u64,
            verdict: outcome.verdict,
        });

        self.respond(outcome.verdict).await
    }

    /// Write the verdict line and close the connection.
    async fn respond(&mut self, verdict: Verdict) -> Result<()> {
        self.stream
            .write_all(verdict.wire_line().as_bytes())
            .await
            .map_err(|e| HaystackError::Session(format!("write to {} failed: {e}", self.peer)))?;

        self.stream
            .shutdown()
            .await
            .map_err(|e| HaystackError::Session(format!("close of {} failed: {e}", self.peer)))?;

        // Discard whatever else the peer sent (bytes past the first
        // newline, oversized-request overflow) before the socket is
        // dropped; closing with unread data would reset the
        // connection and could destroy the verdict in flight. The
        // session timeout bounds this loop.
        let mut scratch = [0u8; 1024];
        loop {
            match self.stream.read(&mut scratch).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }

        Ok(())
    }
}
