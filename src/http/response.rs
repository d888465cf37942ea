//! HTTP/1.x response builder and serializer.

use bytes::{BufMut, Bytes, BytesMut};

use super::{Headers, StatusCode};

/// An HTTP/1.x response, ready to be serialized and sent.
///
/// Every response closes its connection: the serializer always writes
/// `Connection: close`.
///
/// # Examples
///
/// ```
/// use tinyhttpd::http::{Response, StatusCode};
///
/// let bytes = Response::new(StatusCode::Ok).body("hello world").into_bytes();
/// let text = std::str::from_utf8(&bytes).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.contains("Content-Length: 11\r\n"));
/// assert!(text.ends_with("\r\n\r\nhello world"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    /// HTTP minor version written in the status line.
    version: u8,
    headers: Headers,
    body: Bytes,
    omit_body: bool,
}

impl Response {
    /// Creates an `HTTP/1.1` response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: 1,
            headers: Headers::new(),
            body: Bytes::new(),
            omit_body: false,
        }
    }

    /// Appends a response header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the response body. `Content-Length` is derived from it at
    /// serialization time.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the HTTP minor version of the status line (`HTTP/1.0` or `HTTP/1.1`).
    #[must_use]
    pub fn version(mut self, minor: u8) -> Self {
        self.version = minor;
        self
    }

    /// Keeps the body's headers but drops its bytes from the wire, as a
    /// response to `HEAD` must (RFC 9110 §9.3.2).
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.omit_body = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The bytes that will follow the header block; empty for `HEAD`-style responses.
    pub fn payload(&self) -> &[u8] {
        if self.omit_body { &[] } else { &self.body[..] }
    }

    /// Serializes the response using HTTP/1.x wire format.
    ///
    /// Automatically adds, after any explicit headers:
    /// - `Content-Type: text/plain; charset=utf-8` if the body is non-empty and
    ///   no `Content-Type` header was set.
    /// - `Connection: close`.
    /// - `Content-Length: <n>`, the length of the body even when it is omitted.
    pub fn into_bytes(mut self) -> BytesMut {
        let content_length = self.body.len();

        if !self.body.is_empty() && !self.headers.contains("content-type") {
            self.headers
                .insert("Content-Type", "text/plain; charset=utf-8");
        }
        self.headers.insert("Connection", "close");

        let payload_len = self.payload().len();
        let mut buf = BytesMut::with_capacity(128 + self.headers.len() * 48 + payload_len);

        buf.put(
            format!(
                "HTTP/1.{} {} {}\r\n",
                self.version,
                self.status.as_u16(),
                self.status.canonical_reason()
            )
            .as_bytes(),
        );

        for (name, value) in self.headers.iter() {
            buf.put(format!("{name}: {value}\r\n").as_bytes());
        }
        buf.put(format!("Content-Length: {content_length}\r\n").as_bytes());

        buf.put(&b"\r\n"[..]);

        if payload_len > 0 {
            buf.put(&self.body[..]);
        }

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(bytes: BytesMut) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn ok_with_body() {
        let s = to_string(Response::new(StatusCode::Ok).body("Hello, World!").into_bytes());
        assert_eq!(
            s,
            "HTTP/1.1 200 OK\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             Connection: close\r\n\
             Content-Length: 13\r\n\
             \r\n\
             Hello, World!"
        );
    }

    #[test]
    fn head_keeps_length_drops_bytes() {
        let r = Response::new(StatusCode::Ok).body("hello world").without_body();
        assert!(r.payload().is_empty());
        let s = to_string(r.into_bytes());
        assert!(s.contains("Content-Length: 11\r\n"));
        assert!(s.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(s.ends_with("\r\n\r\n"));
    }

    #[test]
    fn empty_body_has_no_content_type() {
        let s = to_string(Response::new(StatusCode::NotImplemented).into_bytes());
        assert!(s.starts_with("HTTP/1.1 501 Not Implemented\r\n"));
        assert!(!s.contains("Content-Type"));
        assert!(s.ends_with("Content-Length: 0\r\n\r\n"));
    }

    #[test]
    fn explicit_content_type_wins() {
        let s = to_string(
            Response::new(StatusCode::Ok)
                .header("Content-Type", "text/html")
                .body("<p>hi</p>")
                .into_bytes(),
        );
        assert!(s.contains("Content-Type: text/html\r\n"));
        assert!(!s.contains("text/plain"));
    }

    #[test]
    fn version_is_echoed() {
        let s = to_string(Response::new(StatusCode::BadRequest).version(0).into_bytes());
        assert!(s.starts_with("HTTP/1.0 400 Bad Request\r\n"));
    }
}
