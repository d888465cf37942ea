//! One request/response cycle on an accepted connection.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::http::{Request, RequestError, Response, StatusCode};

/// Initial read buffer capacity per connection.
const INITIAL_BUF_SIZE: usize = 4096;

/// Per-connection resource limits, copied into every connection task.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Limits {
    pub max_request_size: usize,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Limits {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            max_request_size: config.max_request_size,
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}

/// Reads one request, writes one response, and closes the connection.
///
/// A connection that closes or goes idle before sending anything gets no
/// response at all.
pub(crate) async fn serve(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    dispatcher: &Dispatcher,
    limits: Limits,
) -> io::Result<()> {
    let Some(response) = read_request(&mut stream, peer_addr, dispatcher, limits).await? else {
        return Ok(());
    };

    let status = response.status();
    let wire = response.into_bytes();

    let write = async {
        stream.write_all(&wire).await?;
        stream.flush().await?;
        stream.shutdown().await
    };
    timeout(limits.write_timeout, write)
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "response write timed out"))??;

    debug!(peer = %peer_addr, status = status.as_u16(), "response written");
    Ok(())
}

/// Buffers bytes until a complete request (head and declared body) has
/// arrived, then returns the response for it.
///
/// Returns `Ok(None)` when the peer closes the connection early, or when it
/// times out without having sent a single byte.
async fn read_request(
    stream: &mut TcpStream,
    peer_addr: SocketAddr,
    dispatcher: &Dispatcher,
    limits: Limits,
) -> io::Result<Option<Response>> {
    let mut buf = BytesMut::with_capacity(INITIAL_BUF_SIZE);
    let deadline = Instant::now() + limits.read_timeout;

    loop {
        let bytes_read = match timeout_at(deadline, stream.read_buf(&mut buf)).await {
            Ok(result) => result?,
            Err(_) if buf.is_empty() => {
                debug!(peer = %peer_addr, "idle connection timed out");
                return Ok(None);
            }
            Err(_) => {
                warn!(peer = %peer_addr, buffered = buf.len(), "request timed out — sending 408");
                return Ok(Some(Response::new(StatusCode::RequestTimeout)));
            }
        };

        if bytes_read == 0 {
            debug!(peer = %peer_addr, buffered = buf.len(), "connection closed by peer");
            return Ok(None);
        }

        let request = match Request::parse(&buf) {
            Ok((request, _)) => request,
            Err(RequestError::Incomplete) if buf.len() > limits.max_request_size => {
                // The head never completed, so there is no version to echo.
                warn!(peer = %peer_addr, buffered = buf.len(), "request head too large — sending 413");
                return Ok(Some(Response::new(StatusCode::PayloadTooLarge)));
            }
            Err(RequestError::Incomplete) => continue,
            Err(e) => {
                let status = e.status();
                warn!(peer = %peer_addr, error = %e, status = status.as_u16(), "rejecting request");
                return Ok(Some(Response::new(status)));
            }
        };

        if request.total_len() > limits.max_request_size || buf.len() > limits.max_request_size {
            warn!(
                peer = %peer_addr,
                content_length = request.content_length(),
                buffered = buf.len(),
                "request too large — sending 413"
            );
            return Ok(Some(Response::new(StatusCode::PayloadTooLarge).version(request.version())));
        }

        // The body is never inspected, but it is drained so closing the socket
        // does not reset the connection under the client.
        if buf.len() < request.total_len() {
            continue;
        }

        debug!(
            peer = %peer_addr,
            method = %request.method(),
            target = %request.target(),
            "dispatching request"
        );

        return Ok(Some(dispatcher.dispatch(&request)));
    }
}
