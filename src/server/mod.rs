//! Async TCP listener using Tokio.
//!
//! Accepts TCP connections and serves exactly one request per connection
//! with the response chosen by the [`Dispatcher`]. The listener stops on a
//! shutdown signal, drains in-flight connections, and releases its port.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, ServerConfig};
use crate::dispatch::Dispatcher;

mod conn;
mod signal;

pub use signal::shutdown_signal;

use conn::Limits;

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Pending-connection queue length passed to `listen(2)`.
const BACKLOG_SIZE: u32 = 1000;

/// The tinyhttpd server.
///
/// # Examples
///
/// ```rust,no_run
/// use tinyhttpd::config::ServerConfig;
/// use tinyhttpd::server::Server;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = Server::bind(ServerConfig::default()).await?;
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    /// Binds a listening socket for `config.addr`.
    ///
    /// The address is resolved and every candidate is tried in order until
    /// one can be bound. `SO_REUSEADDR` is set so a restarted server can
    /// reclaim its port immediately.
    ///
    /// # Errors
    ///
    /// - [`ServerError::Config`] if `config` fails validation.
    /// - [`ServerError::Bind`] if the address does not resolve or no
    ///   candidate can be bound (port in use, insufficient permissions).
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let bind_error = |source| ServerError::Bind {
            addr: config.addr.clone(),
            source,
        };

        let candidates = tokio::net::lookup_host(config.addr.as_str())
            .await
            .map_err(bind_error)?;

        let mut last_error = None;
        let mut bound = None;
        for candidate in candidates {
            match listen_on(candidate) {
                Ok(listener) => {
                    bound = Some(listener);
                    break;
                }
                Err(e) => {
                    debug!(address = %candidate, error = %e, "bind candidate failed");
                    last_error = Some(e);
                }
            }
        }

        let listener = match bound {
            Some(listener) => listener,
            None => {
                return Err(bind_error(last_error.unwrap_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::AddrNotAvailable,
                        "address resolved to no candidates",
                    )
                })));
            }
        };

        let local_addr = listener.local_addr()?;
        let dispatcher = Arc::new(Dispatcher::new(config.body.clone()));

        Ok(Self {
            listener,
            local_addr,
            config,
            dispatcher,
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves until the process receives SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// See [`run_until`](Self::run_until).
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(shutdown_signal()).await
    }

    /// Serves until `shutdown` resolves, then stops accepting, closes the
    /// listening socket, and waits up to the configured grace period for
    /// in-flight connections.
    ///
    /// At most `max_connections` connections are served concurrently; the
    /// next `accept` waits for a free slot.
    ///
    /// # Errors
    ///
    /// Currently never fails: accept errors are logged and the loop goes on.
    pub async fn run_until<S>(self, shutdown: S) -> Result<(), ServerError>
    where
        S: Future<Output = ()>,
    {
        let Self {
            listener,
            local_addr,
            config,
            dispatcher,
        } = self;

        let max_connections = config.max_connections;
        let slots = Arc::new(Semaphore::new(max_connections));
        let limits = Limits::from_config(&config);

        info!(address = %local_addr, body_len = dispatcher.body().len(), "server started");
        tokio::pin!(shutdown);

        loop {
            let permit = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                permit = Arc::clone(&slots).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (stream, peer_addr) = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                        continue;
                    }
                },
            };

            debug!(peer = %peer_addr, "connection accepted");
            let dispatcher = Arc::clone(&dispatcher);

            tokio::spawn(async move {
                if let Err(e) = conn::serve(stream, peer_addr, &dispatcher, limits).await {
                    warn!(peer = %peer_addr, error = %e, "connection closed with error");
                }
                drop(permit);
            });
        }

        drop(listener);
        info!(address = %local_addr, "stopping");

        // Every slot handed back means every connection task has finished.
        let in_flight = max_connections - slots.available_permits();
        if in_flight > 0 {
            debug!(in_flight, "waiting for in-flight connections");
            let all = u32::try_from(max_connections).unwrap_or(u32::MAX);
            let drained = tokio::time::timeout(config.shutdown_grace(), slots.acquire_many(all)).await;
            if drained.is_err() {
                warn!(
                    remaining = max_connections - slots.available_permits(),
                    "shutdown grace period elapsed with connections still open"
                );
            }
        }

        info!("server stopped");
        Ok(())
    }
}

fn listen_on(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(BACKLOG_SIZE)
}
