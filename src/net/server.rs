//! Listener and concurrency dispatcher.
//!
//! Accepts connections and runs one tokio task per session. A
//! semaphore caps simultaneously active sessions at
//! `max_connections`; the permit is taken before `accept`, so
//! overflow waits in the listening socket's backlog instead of
//! spawning unbounded in-process work.
//!
//! Ctrl-C/SIGTERM stop the accept loop. SIGHUP swaps in a freshly
//! loaded corpus snapshot (static mode only); in-flight lookups keep
//! the old snapshot until the swap completes.

use crate::core::error::{HaystackError, Result};
use crate::core::services::Services;
use crate::net::session::Session;
use crate::net::tls;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_rustls::TlsAcceptor;
use tracing::{error, info, warn};

/// The haystack TCP/TLS server
pub struct Server {
    services: Services,
    acceptor: Option<TlsAcceptor>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("tls", &self.acceptor.is_some())
            .finish()
    }
}

impl Server {
    /// Build the server, constructing the TLS acceptor up front so
    /// certificate problems surface before the socket binds.
    pub fn new(services: Services) -> Result<Self> {
        let acceptor = if services.config.tls.use_ssl {
            Some(tls::build_acceptor(&services.config.tls)?)
        } else {
            None
        };

        Ok(Self { services, acceptor })
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(self) -> Result<()> {
        let addr = format!(
            "{}:{}",
            self.services.config.server.host, self.services.config.server.port
        );
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(HaystackError::Transport)?;

        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    ///
    /// Split from `run` so tests can bind an ephemeral port first.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr().map_err(HaystackError::Transport)?;
        info!(
            addr = %local_addr,
            tls = self.acceptor.is_some(),
            mode = self.services.corpus.mode_name(),
            "listening"
        );

        let permits = Arc::new(Semaphore::new(self.services.config.server.max_connections));

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        let mut reload = ReloadSignal::new().map_err(HaystackError::Transport)?;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown signal received, closing listener");
                    return Ok(());
                }
                _ = reload.recv() => {
                    match self.services.corpus.reload() {
                        Ok(()) => info!("corpus reload complete"),
                        Err(e) => error!(error = %e, "corpus reload failed, keeping current snapshot"),
                    }
                }
                accepted = accept_next(&listener, &permits) => {
                    match accepted {
                        Ok((stream, peer, permit)) => self.spawn_session(stream, peer, permit),
                        Err(e) => error!(error = %e, "accept failed"),
                    }
                }
            }
        }
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr, permit: OwnedSemaphorePermit) {
        let services = self.services.clone();
        let acceptor = self.acceptor.clone();

        tokio::spawn(async move {
            // Held until the session ends, releasing its slot
            let _permit = permit;

            let result = match acceptor {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(tls_stream) => Session::new(tls_stream, peer, services).run().await,
                    Err(e) => {
                        // Never reaches a lookup; the listener is unaffected
                        warn!(%peer, error = %e, "TLS handshake failed");
                        return;
                    }
                },
                None => Session::new(stream, peer, services).run().await,
            };

            if let Err(e) = result {
                warn!(%peer, error = %e, "session ended with error");
            }
        });
    }
}

/// Acquire a session slot, then accept the next connection.
async fn accept_next(
    listener: &TcpListener,
    permits: &Arc<Semaphore>,
) -> std::io::Result<(TcpStream, SocketAddr, OwnedSemaphorePermit)> {
    let permit = permits
        .clone()
        .acquire_owned()
        .await
        .map_err(std::io::Error::other)?;
    let (stream, peer) = listener.accept().await?;
    Ok((stream, peer, permit))
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// SIGHUP stream on unix; never resolves elsewhere.
struct ReloadSignal {
    #[cfg(unix)]
    inner: tokio::signal::unix::Signal,
}

impl ReloadSignal {
    fn new() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            let inner = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())?;
            Ok(Self { inner })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    async fn recv(&mut self) {
        #[cfg(unix)]
        {
            self.inner.recv().await;
        }
        #[cfg(not(unix))]
        {
            std::future::pending::<()>().await
        }
    }
}
