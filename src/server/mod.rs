//! Async TCP server using Tokio.
//!
//! Accepts TCP connections and serves exactly one HTTP/0.9 request on each,
//! one spawned task per connection. A connection is closed as soon as its
//! handler returns; there is no keep-alive.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::config::{Config, ConfigError};
use crate::handlers::Handler;

pub mod connection;

pub use connection::{Limits, serve_connection};

/// Errors produced by the server.
///
/// Per-connection failures never show up here; they end only the affected
/// connection.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to accept connection: {0}")]
    Accept(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The HTTP/0.9 server.
///
/// Owns the listening socket, the handler, and the per-connection limits.
/// All three are fixed once [`bind`](Self::bind) returns.
///
/// # Examples
///
/// ```rust,no_run
/// use h09::{Config, Server, handlers::Text};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = Server::bind(Config::new("127.0.0.1:9000"), Text::new("Hello World!")).await?;
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct Server<H> {
    listener: TcpListener,
    local_addr: SocketAddr,
    handler: Arc<H>,
    limits: Limits,
}

impl<H: Handler> Server<H> {
    /// Validates `config` and binds its address.
    ///
    /// # Errors
    ///
    /// - [`ServerError::Config`] if `config` fails validation.
    /// - [`ServerError::Bind`] if the address cannot be bound
    ///   (e.g. port already in use, insufficient permissions).
    pub async fn bind(config: Config, handler: H) -> Result<Self, ServerError> {
        config.validate()?;
        let listener = TcpListener::bind(&config.addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: config.addr.clone(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            handler: Arc::new(handler),
            limits: Limits::from(&config),
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections forever, spawning a task for each.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Accept`] if the listener itself fails. That is
    /// fatal: the listener is closed and no further connections are taken.
    /// Connections already being served are left to finish.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Like [`run`](Self::run), but stops accepting once `shutdown` resolves.
    ///
    /// Stopping closes the listener only. In-flight connections are not
    /// signalled and run to completion.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Accept`] if the listener fails first.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        accept_loop(
            self.listener,
            self.local_addr,
            self.handler,
            self.limits,
            shutdown,
        )
        .await
    }
}

/// Where the accept loop gets its connections from.
pub(crate) trait Listener: Send {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn accept(&mut self) -> impl Future<Output = io::Result<(Self::Stream, SocketAddr)>> + Send;
}

impl Listener for TcpListener {
    type Stream = TcpStream;

    async fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }
}

// Takes the listener by value so it is dropped on every return path.
async fn accept_loop<L, H, F>(
    mut listener: L,
    local_addr: SocketAddr,
    handler: Arc<H>,
    limits: Limits,
    shutdown: F,
) -> Result<(), ServerError>
where
    L: Listener,
    H: Handler,
    F: Future<Output = ()>,
{
    info!(address = %local_addr, "h09 listening");
    tokio::pin!(shutdown);

    loop {
        let (stream, peer_addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    error!(address = %local_addr, error = %e, "accept failed, stopping");
                    return Err(ServerError::Accept(e));
                }
            },
            () = &mut shutdown => {
                info!(address = %local_addr, "shutdown requested, no longer accepting");
                return Ok(());
            }
        };

        debug!(peer = %peer_addr, "connection accepted");
        let handler = Arc::clone(&handler);

        tokio::spawn(async move {
            if let Err(e) = serve_connection(stream, peer_addr, &*handler, limits).await {
                debug!(peer = %peer_addr, error = %e, "request aborted");
            }
        });
    }
}

/// Binds `config.addr` and serves `handler` until the listener fails.
///
/// Shorthand for [`Server::bind`] followed by [`Server::run`].
pub async fn serve<H: Handler>(config: Config, handler: H) -> Result<(), ServerError> {
    Server::bind(config, handler).await?.run().await
}
