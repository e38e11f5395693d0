//! # h09
//!
//! A minimal HTTP/0.9-style server built on Tokio.
//!
//! The protocol is as small as HTTP gets: the client sends one line,
//! `<METHOD> <PATH>\n`, the server writes raw bytes back, and closing the
//! connection marks the end of the response. No headers, no status line, no
//! keep-alive.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use h09::{Config, Server, handlers::Text};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(Config::new("127.0.0.1:9000"), Text::new("Hello World!")).await?;
//!     println!("Listening on {}", server.local_addr());
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod handlers;
pub mod http;
pub mod server;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use config::{Config, ConfigError};
pub use handlers::Handler;
pub use http::{Method, Request, ResponseSink, ResponseWriter, StatusCode};
pub use server::{Server, ServerError, serve};
