//! HTTP/0.9 request-line parsing.
//!
//! A request is a single line, `<METHOD> <PATH>[ <ignored fields>]`, with no
//! headers and no body. [`Request::parse_line`] turns that line into the
//! descriptor handed to a [`Handler`](crate::Handler).

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use super::Method;

/// Errors that end a connection before a request could be dispatched.
///
/// None of these ever reach the peer: HTTP/0.9 has no way to report them,
/// so the connection is simply closed.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request line is empty")]
    Empty,

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("request line exceeds maximum allowed size of {max_bytes} bytes")]
    LineTooLong { max_bytes: usize },

    #[error("no request line received within {0:?}")]
    Timeout(Duration),

    #[error("I/O error while reading request line: {0}")]
    Io(#[from] std::io::Error),
}

/// Protocol version of a request.
///
/// Only one version exists here; it is kept as a type so handlers that are
/// shared with richer protocols can tell which one served them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    #[default]
    Http09,
}

impl Version {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http09 => "HTTP/0.9",
        }
    }

    pub fn major(self) -> u8 {
        match self {
            Self::Http09 => 0,
        }
    }

    pub fn minor(self) -> u8 {
        match self {
            Self::Http09 => 9,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed HTTP/0.9 request.
///
/// Created once per connection and moved into the handler.
///
/// # Examples
///
/// ```
/// use h09::http::{Request, Version};
///
/// let peer = "127.0.0.1:50000".parse().unwrap();
/// let request = Request::parse_line(b"GET /hello\r\n", peer).unwrap();
///
/// assert_eq!(request.method().as_str(), "GET");
/// assert_eq!(request.path(), "/hello");
/// assert_eq!(request.version(), Version::Http09);
/// assert_eq!(request.remote_addr(), peer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    version: Version,
    remote_addr: SocketAddr,
}

impl Request {
    /// Builds a request directly, without going through the wire format.
    pub fn new(method: Method, path: impl Into<String>, remote_addr: SocketAddr) -> Self {
        Self {
            method,
            path: path.into(),
            version: Version::Http09,
            remote_addr,
        }
    }

    /// Parses one request line.
    ///
    /// The line is split on whitespace; a trailing `\r\n` or `\n` is just more
    /// whitespace. The first field becomes the method and the second the
    /// path, both verbatim. Further fields are ignored. Bytes that are not
    /// valid UTF-8 are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Empty`] — the line holds no fields at all.
    /// - [`RequestError::MissingField`] — a method is present but no path.
    pub fn parse_line(line: &[u8], remote_addr: SocketAddr) -> Result<Self, RequestError> {
        let text = String::from_utf8_lossy(line);
        let mut fields = text.split_whitespace();

        let method: Method = fields
            .next()
            .ok_or(RequestError::Empty)?
            .parse()
            .unwrap_or_else(|never| match never {});

        let path = fields
            .next()
            .ok_or(RequestError::MissingField { field: "path" })?;

        Ok(Self::new(method, path, remote_addr))
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path exactly as sent, query string included.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the protocol version, always [`Version::Http09`].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the peer address of the connection that carried this request.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "10.0.0.7:41234".parse().unwrap()
    }

    #[test]
    fn parse_simple_get() {
        let req = Request::parse_line(b"GET /hello\r\n", peer()).unwrap();
        assert_eq!(req.method(), &Method::Get);
        assert_eq!(req.path(), "/hello");
        assert_eq!(req.version().as_str(), "HTTP/0.9");
        assert_eq!(req.remote_addr().to_string(), "10.0.0.7:41234");
    }

    #[test]
    fn path_is_not_normalized() {
        let req = Request::parse_line(b"GET /a/../B//c?x=1&y\n", peer()).unwrap();
        assert_eq!(req.path(), "/a/../B//c?x=1&y");
    }

    #[test]
    fn method_case_is_preserved() {
        let req = Request::parse_line(b"fetch /x\n", peer()).unwrap();
        assert_eq!(req.method().as_str(), "fetch");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let req = Request::parse_line(b"POST /submit HTTP/1.1 trailing junk\r\n", peer()).unwrap();
        assert_eq!(req.method(), &Method::Post);
        assert_eq!(req.path(), "/submit");
    }

    #[test]
    fn arbitrary_whitespace_between_fields() {
        let req = Request::parse_line(b"  GET\t \t/spaced   \r\n", peer()).unwrap();
        assert_eq!(req.method(), &Method::Get);
        assert_eq!(req.path(), "/spaced");
    }

    #[test]
    fn line_without_terminator() {
        let req = Request::parse_line(b"GET /eof", peer()).unwrap();
        assert_eq!(req.path(), "/eof");
    }

    #[test]
    fn empty_line_is_rejected() {
        assert!(matches!(
            Request::parse_line(b"\r\n", peer()),
            Err(RequestError::Empty)
        ));
        assert!(matches!(
            Request::parse_line(b"", peer()),
            Err(RequestError::Empty)
        ));
    }

    #[test]
    fn method_without_path_is_rejected() {
        assert!(matches!(
            Request::parse_line(b"GET\r\n", peer()),
            Err(RequestError::MissingField { field: "path" })
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let req = Request::parse_line(b"GET /caf\xff\n", peer()).unwrap();
        assert_eq!(req.path(), "/caf\u{fffd}");
    }

    #[test]
    fn version_numbers() {
        assert_eq!(Version::Http09.major(), 0);
        assert_eq!(Version::Http09.minor(), 9);
        assert_eq!(Version::default(), Version::Http09);
    }
}
