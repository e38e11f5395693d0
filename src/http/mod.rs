//! HTTP/0.9 protocol types.
//!
//! This module provides the primitives shared by the connection layer and
//! request handlers: [`Method`], [`StatusCode`], [`Version`], [`Headers`],
//! [`Request`], and the [`ResponseWriter`] contract with its socket-backed
//! implementation [`ResponseSink`].

use std::fmt;

pub mod headers;
pub mod request;
pub mod response;

pub use headers::Headers;
pub use request::{Request, RequestError, Version};
pub use response::{Recorder, ResponseSink, ResponseWriter};

/// An HTTP response status code.
///
/// HTTP/0.9 has no status line, so nothing here ever reaches the wire. The
/// type exists so that handlers written against [`ResponseWriter`] can call
/// [`ResponseWriter::set_status`] regardless of the protocol serving them.
///
/// # Examples
///
/// ```
/// use h09::http::StatusCode;
///
/// let status = StatusCode::NotFound;
/// assert_eq!(status.as_u16(), 404);
/// assert_eq!(status.canonical_reason(), "Not Found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    Ok = 200,
    NoContent = 204,
    BadRequest = 400,
    NotFound = 404,
    MethodNotAllowed = 405,
    InternalServerError = 500,
    NotImplemented = 501,
}

impl StatusCode {
    /// Returns the numeric status code as a `u16`.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the canonical reason phrase for this status code.
    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NoContent => "No Content",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

/// A request method, taken verbatim from the first field of the request line.
///
/// Standard upper-case spellings map to unit variants. Anything else,
/// including lower-case `get`, is kept as-is in `Custom` so that
/// [`Method::as_str`] always returns exactly what the client sent.
///
/// # Examples
///
/// ```
/// use h09::http::Method;
///
/// let method: Method = "GET".parse().unwrap();
/// assert_eq!(method, Method::Get);
///
/// let odd: Method = "get".parse().unwrap();
/// assert_eq!(odd.as_str(), "get");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    /// Any method token not listed above, stored exactly as received.
    Custom(String),
}

impl Method {
    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            other => Self::Custom(other.to_owned()),
        })
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
