//! One connection, one request.
//!
//! Every accepted connection walks the same short path:
//!
//! ```text
//!        ┌─────────────┐
//!        │  Accepted   │
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐  empty / one field / too long / timeout / I/O error
//!        │   Parsing   │ ─────────────────────────────────────┐
//!        └──────┬──────┘                                      │
//!               │ method + path                               │
//!               ▼                                             ▼
//!        ┌─────────────┐                              ┌──────────────┐
//!        │ Dispatched  │                              │ Parse failed │
//!        └──────┬──────┘                              └───────┬──────┘
//!               │ handler returned                            │
//!               └────────────────────┬────────────────────────┘
//!                                    ▼
//!                             ┌─────────────┐
//!                             │   Closed    │
//!                             └─────────────┘
//! ```
//!
//! Nothing is ever sent on the parse-failed branch; the peer just sees the
//! connection close.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::config::Config;
use crate::handlers::Handler;
use crate::http::{Request, RequestError, ResponseSink};

/// Bounds applied while waiting for a request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum bytes in the request line, terminator included.
    pub max_request_line: usize,
    /// How long the peer has to deliver the request line.
    pub read_timeout: Duration,
}

impl From<&Config> for Limits {
    fn from(config: &Config) -> Self {
        Self {
            max_request_line: config.max_request_line,
            read_timeout: config.read_timeout(),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Serves exactly one request on `stream`, then closes it.
///
/// The stream is shut down on every path, whether the handler ran or the
/// request line was unusable. Errors describe why no request was
/// dispatched; they are never reported to the peer.
///
/// # Errors
///
/// Any [`RequestError`]: the peer sent nothing, sent fewer than two fields,
/// exceeded `limits`, or the read failed.
pub async fn serve_connection<S, H>(
    mut stream: S,
    peer: SocketAddr,
    handler: &H,
    limits: Limits,
) -> Result<(), RequestError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    H: Handler,
{
    let outcome = dispatch(&mut stream, peer, handler, limits).await;

    // Signals end-of-response to the peer; it may already be gone.
    if let Err(e) = stream.shutdown().await {
        debug!(peer = %peer, error = %e, "shutdown after response failed");
    }

    match outcome {
        Ok(bytes) => {
            debug!(peer = %peer, bytes, "connection closed");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn dispatch<S, H>(
    stream: &mut S,
    peer: SocketAddr,
    handler: &H,
    limits: Limits,
) -> Result<u64, RequestError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    H: Handler,
{
    let line = tokio::time::timeout(
        limits.read_timeout,
        read_request_line(&mut *stream, limits.max_request_line),
    )
    .await
    .map_err(|_| RequestError::Timeout(limits.read_timeout))??;

    let request = Request::parse_line(&line, peer)?;

    debug!(
        peer = %peer,
        method = %request.method(),
        path = %request.path(),
        proto = %request.version(),
        "dispatching request"
    );

    let mut sink = ResponseSink::new(&mut *stream);
    handler.serve(&mut sink, request).await;
    Ok(sink.bytes_written())
}

/// Reads up to and including the first `\n`, never more than `max_bytes`.
///
/// A line cut short by end-of-stream is returned as-is; the peer may have
/// half-closed after sending it.
async fn read_request_line<R>(reader: R, max_bytes: usize) -> Result<Vec<u8>, RequestError>
where
    R: AsyncRead + Unpin,
{
    // One byte of slack tells "ended at the limit" apart from "kept going".
    let mut reader = BufReader::new(reader.take(max_bytes as u64 + 1));
    let mut line = Vec::with_capacity(max_bytes.min(256));

    if reader.read_until(b'\n', &mut line).await? == 0 {
        return Err(RequestError::Empty);
    }
    if line.len() > max_bytes {
        return Err(RequestError::LineTooLong { max_bytes });
    }
    Ok(line)
}
