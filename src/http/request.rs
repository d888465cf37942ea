//! HTTP/1.x request head parsing using the [`httparse`] crate.
//!
//! Only the request head is parsed. The body is framed by `Content-Length`
//! and consumed by the connection without being inspected.

use thiserror::Error;

use super::{Headers, Method, StatusCode};

/// Errors that can occur while parsing an HTTP/1.x request head.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is incomplete — more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid Content-Length header: {value:?}")]
    InvalidContentLength { value: String },

    #[error("Transfer-Encoding is not supported: {value:?}")]
    UnsupportedTransferEncoding { value: String },
}

impl RequestError {
    /// The status code sent back to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedTransferEncoding { .. } => StatusCode::NotImplemented,
            _ => StatusCode::BadRequest,
        }
    }
}

/// A parsed HTTP/1.x request head.
///
/// # Examples
///
/// ```
/// use tinyhttpd::http::{Method, Request};
///
/// let raw = b"POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 9\r\n\r\ntest=data";
/// let (request, header_len) = Request::parse(raw).unwrap();
///
/// assert_eq!(request.method(), &Method::Post);
/// assert_eq!(request.target(), "/");
/// assert_eq!(request.content_length(), 9);
/// assert_eq!(&raw[header_len..], b"test=data");
/// assert_eq!(request.total_len(), raw.len());
/// ```
#[derive(Debug)]
pub struct Request {
    method: Method,
    target: String,
    /// HTTP minor version: 0 for HTTP/1.0, 1 for HTTP/1.1.
    version: u8,
    headers: Headers,
    header_len: usize,
    content_length: usize,
}

impl Request {
    /// Maximum number of headers accepted per request.
    const MAX_HEADERS: usize = 64;

    /// Parses a request head from the start of `buf`.
    ///
    /// Returns the request and the offset at which its body begins.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Incomplete`] — the head has not been fully received.
    /// - [`RequestError::Parse`] — malformed request line or headers, or more
    ///   than 64 headers.
    /// - [`RequestError::InvalidContentLength`] — a non-numeric value, or
    ///   repeated `Content-Length` headers that disagree.
    /// - [`RequestError::UnsupportedTransferEncoding`] — the body uses
    ///   `Transfer-Encoding`, which this server cannot frame.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), RequestError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw_req = httparse::Request::new(&mut headers);

        let header_len = match raw_req.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(RequestError::Incomplete),
        };

        let Ok(method) = raw_req
            .method
            .ok_or(RequestError::MissingField { field: "method" })?
            .parse::<Method>();

        let target = raw_req
            .path
            .ok_or(RequestError::MissingField { field: "target" })?
            .to_owned();

        let version = raw_req
            .version
            .ok_or(RequestError::MissingField { field: "version" })?;

        let mut header_map = Headers::with_capacity(raw_req.headers.len());
        for header in raw_req.headers.iter() {
            // Framing headers are judged on their raw bytes.
            if header.name.eq_ignore_ascii_case("transfer-encoding") {
                return Err(RequestError::UnsupportedTransferEncoding {
                    value: String::from_utf8_lossy(header.value).into_owned(),
                });
            }
            match std::str::from_utf8(header.value) {
                Ok(value) => header_map.insert(header.name, value),
                Err(_) if header.name.eq_ignore_ascii_case("content-length") => {
                    return Err(RequestError::InvalidContentLength {
                        value: String::from_utf8_lossy(header.value).into_owned(),
                    });
                }
                // Nothing reads other headers, so undecodable values are dropped.
                Err(_) => {}
            }
        }

        let content_length = parse_content_length(&header_map)?;

        Ok((
            Self {
                method,
                target,
                version,
                headers: header_map,
                header_len,
                content_length,
            },
            header_len,
        ))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw request target, query string included.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the HTTP minor version number (0 = HTTP/1.0, 1 = HTTP/1.1).
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Declared body length; 0 when no `Content-Length` header was sent.
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Number of bytes the whole request occupies on the wire (head + body).
    pub fn total_len(&self) -> usize {
        self.header_len.saturating_add(self.content_length)
    }
}

/// Reads the `Content-Length` header. Repeated headers are accepted only when
/// every value is identical (RFC 9112 §6.3).
fn parse_content_length(headers: &Headers) -> Result<usize, RequestError> {
    let mut length = None;

    for value in headers.get_all("content-length") {
        let trimmed = value.trim_matches(|c| c == ' ' || c == '\t');
        let invalid = || RequestError::InvalidContentLength {
            value: value.to_owned(),
        };

        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let parsed: usize = trimmed.parse().map_err(|_| invalid())?;

        match length {
            Some(previous) if previous != parsed => return Err(invalid()),
            _ => length = Some(parsed),
        }
    }

    Ok(length.unwrap_or(0))
}
