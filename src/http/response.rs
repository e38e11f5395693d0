//! Response writers.
//!
//! [`ResponseWriter`] is the contract handlers write through. It carries the
//! header and status operations of a conventional HTTP response so the same
//! handler can run behind richer protocols; [`ResponseSink`] implements it
//! for HTTP/0.9 by dropping everything except body bytes.

use std::future::Future;
use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{Headers, StatusCode};

/// Destination for a handler's response.
///
/// Implementations must be `Send` because handlers run on Tokio worker
/// threads and may hold the writer across `.await` points.
pub trait ResponseWriter: Send {
    /// Returns the headers recorded so far.
    fn headers(&self) -> &Headers;

    /// Records a response header, if the protocol has somewhere to put it.
    fn set_header(&mut self, name: &str, value: &str);

    /// Records the response status, if the protocol has somewhere to put it.
    fn set_status(&mut self, status: StatusCode);

    /// Writes body bytes, returning how many were accepted.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, e.g. when the peer has reset the
    /// connection.
    fn write_body(&mut self, buf: &[u8]) -> impl Future<Output = io::Result<usize>> + Send;
}

/// The HTTP/0.9 response writer bound to one connection.
///
/// Body bytes go straight to the stream, unframed. Header and status calls
/// are accepted and discarded, and [`headers`](ResponseWriter::headers) is
/// always empty. The peer learns the response is complete when the
/// connection closes.
///
/// # Examples
///
/// ```
/// use h09::http::{ResponseSink, ResponseWriter, StatusCode};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> std::io::Result<()> {
/// let mut sink = ResponseSink::new(Vec::new());
/// sink.set_status(StatusCode::NotFound);
/// sink.set_header("Content-Type", "text/plain");
/// sink.write_body(b"Hello World!").await?;
///
/// assert!(sink.headers().is_empty());
/// assert_eq!(sink.into_inner(), b"Hello World!");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResponseSink<S> {
    stream: S,
    headers: Headers,
    bytes_written: u64,
}

impl<S> ResponseSink<S>
where
    S: AsyncWrite + Unpin + Send,
{
    /// Wraps the write side of a connection.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            headers: Headers::new(),
            bytes_written: 0,
        }
    }

    /// Total body bytes written through this sink.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> ResponseWriter for ResponseSink<S>
where
    S: AsyncWrite + Unpin + Send,
{
    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn set_header(&mut self, _name: &str, _value: &str) {}

    fn set_status(&mut self, _status: StatusCode) {}

    async fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.stream.write_all(buf).await?;
        self.bytes_written += buf.len() as u64;
        Ok(buf.len())
    }
}

/// An in-memory [`ResponseWriter`] that keeps everything a handler does.
///
/// Useful for exercising handlers without a socket: unlike [`ResponseSink`]
/// it remembers the status and headers as well as the body.
///
/// # Examples
///
/// ```
/// use h09::http::{Recorder, ResponseWriter, StatusCode};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> std::io::Result<()> {
/// let mut rec = Recorder::new();
/// rec.set_status(StatusCode::Ok);
/// rec.set_header("X-Trace", "abc");
/// rec.write_body(b"hi").await?;
///
/// assert_eq!(rec.status(), Some(StatusCode::Ok));
/// assert_eq!(rec.headers().get("x-trace"), Some("abc"));
/// assert_eq!(rec.body(), b"hi");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Recorder {
    status: Option<StatusCode>,
    headers: Headers,
    body: BytesMut,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last status set, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The body written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the recorder, returning the body.
    pub fn into_body(self) -> Bytes {
        self.body.freeze()
    }
}

impl ResponseWriter for Recorder {
    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name, value);
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    async fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}
