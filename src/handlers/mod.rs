//! Request handlers — the pluggable logic behind a [`Server`](crate::Server).
//!
//! The server knows nothing about what a handler does; it parses the request
//! line, hands over a [`Request`] and a [`ResponseWriter`], and closes the
//! connection once [`Handler::serve`] completes.
//!
//! ## Provided handlers
//!
//! - [`Text`] — writes a fixed body for every request.
//! - [`EchoPath`] — writes the request path back.
//! - [`Logged`] — wraps another handler and logs each request it serves.

use bytes::Bytes;
use std::future::Future;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::http::{Request, ResponseWriter};

/// The request-handler capability.
///
/// `serve` is generic over the writer so that one handler can run behind the
/// HTTP/0.9 [`ResponseSink`](crate::http::ResponseSink), an in-memory
/// [`Recorder`](crate::http::Recorder), or any other [`ResponseWriter`].
///
/// Implementations are shared across connection tasks behind an `Arc`, so
/// they must be `Send + Sync + 'static`. The returned future must be `Send`
/// because it runs inside a spawned Tokio task.
///
/// # Examples
///
/// ```rust,no_run
/// use h09::{Handler, http::{Request, ResponseWriter}};
///
/// struct Shout;
///
/// impl Handler for Shout {
///     async fn serve<W: ResponseWriter>(&self, w: &mut W, req: Request) {
///         let _ = w.write_body(req.path().to_uppercase().as_bytes()).await;
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Produces the response for one request.
    ///
    /// Write failures are the handler's to deal with; whatever happens, the
    /// connection is closed once the returned future resolves.
    fn serve<W: ResponseWriter>(&self, w: &mut W, req: Request)
    -> impl Future<Output = ()> + Send;
}

/// Writes the same body for every request.
///
/// # Examples
///
/// ```
/// use h09::handlers::Text;
///
/// let hello = Text::new("Hello World!");
/// assert_eq!(hello.body(), b"Hello World!".as_slice());
/// ```
#[derive(Debug, Clone)]
pub struct Text {
    body: Bytes,
}

impl Text {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl Handler for Text {
    async fn serve<W: ResponseWriter>(&self, w: &mut W, req: Request) {
        if let Err(e) = w.write_body(&self.body).await {
            warn!(peer = %req.remote_addr(), error = %e, "failed to write response");
        }
    }
}

/// Writes the request path back to the client.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoPath;

impl Handler for EchoPath {
    async fn serve<W: ResponseWriter>(&self, w: &mut W, req: Request) {
        if let Err(e) = w.write_body(req.path().as_bytes()).await {
            warn!(peer = %req.remote_addr(), error = %e, "failed to write response");
        }
    }
}

/// Wraps a handler and emits one `tracing::info!` record per request.
///
/// The record carries method, path, protocol, peer, and how long the inner
/// handler took:
///
/// ```text
/// request served method=GET path=/hello proto=HTTP/0.9 peer=127.0.0.1:50412 elapsed=48µs
/// ```
#[derive(Debug, Clone)]
pub struct Logged<H> {
    inner: H,
}

impl<H: Handler> Logged<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: Handler> Handler for Logged<H> {
    async fn serve<W: ResponseWriter>(&self, w: &mut W, req: Request) {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_owned();
        let proto = req.version();
        let peer = req.remote_addr();

        self.inner.serve(w, req).await;

        info!(
            %method,
            %path,
            %proto,
            %peer,
            elapsed = ?start.elapsed(),
            "request served"
        );
    }
}
