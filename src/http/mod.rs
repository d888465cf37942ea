//! HTTP/1.x protocol types and parsing.
//!
//! This module provides the wire-level primitives the server needs:
//! [`Method`], [`StatusCode`], [`Headers`], [`Request`], and [`Response`].

use std::fmt;

pub mod headers;
pub mod request;
pub mod response;

pub use headers::Headers;
pub use request::{Request, RequestError};
pub use response::Response;

/// An HTTP response status code.
///
/// Only the codes this server can actually emit are represented.
///
/// # Examples
///
/// ```
/// use tinyhttpd::http::StatusCode;
///
/// let status = StatusCode::NotImplemented;
/// assert_eq!(status.as_u16(), 501);
/// assert_eq!(status.canonical_reason(), "Not Implemented");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    // 2xx Success
    Ok = 200,

    // 4xx Client Error
    BadRequest = 400,
    RequestTimeout = 408,
    PayloadTooLarge = 413,

    // 5xx Server Error
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
            Self::BadRequest => "Bad Request",
            Self::RequestTimeout => "Request Timeout",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::NotImplemented => "Not Implemented",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.as_u16()
    }
}

/// An HTTP request method.
///
/// Standard methods are unit variants; any other token the parser accepts is
/// kept verbatim in `Custom`.
///
/// # Examples
///
/// ```
/// use tinyhttpd::http::Method;
///
/// let method: Method = "HEAD".parse().unwrap();
/// assert_eq!(method, Method::Head);
/// assert_eq!(method.as_str(), "HEAD");
///
/// let custom: Method = "PURGE".parse().unwrap();
/// assert_eq!(custom, Method::Custom("PURGE".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
    Connect,
    Trace,
    /// A non-standard extension method.
    Custom(String),
}

impl Method {
    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
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

    /// Method tokens are case-sensitive (RFC 9110 §9.1): `get` is a custom method.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            "CONNECT" => Self::Connect,
            "TRACE" => Self::Trace,
            other => Self::Custom(other.to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_tokens_are_case_sensitive() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!(
            "get".parse::<Method>().unwrap(),
            Method::Custom("get".to_owned())
        );
    }

    #[test]
    fn status_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(
            StatusCode::PayloadTooLarge.to_string(),
            "413 Payload Too Large"
        );
        assert_eq!(u16::from(StatusCode::RequestTimeout), 408);
    }
}
