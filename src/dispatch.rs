//! Method-keyed dispatch to canned responses.

use bytes::Bytes;

use crate::http::{Method, Request, Response, StatusCode};

/// Maps a parsed request to its canned response.
///
/// The request target is ignored: every path is the same single endpoint.
/// The dispatcher holds no mutable state, so one instance is shared by all
/// connections.
///
/// # Examples
///
/// ```
/// use tinyhttpd::dispatch::Dispatcher;
/// use tinyhttpd::http::{Request, StatusCode};
///
/// let dispatcher = Dispatcher::new("hello world");
/// let (request, _) = Request::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
/// let response = dispatcher.dispatch(&request);
///
/// assert_eq!(response.status(), StatusCode::Ok);
/// assert_eq!(response.payload(), b"hello world");
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    body: Bytes,
}

impl Dispatcher {
    /// Creates a dispatcher answering `GET` with `body`.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }

    /// The body served to `GET` requests.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Chooses the response for `request`.
    ///
    /// - `GET`  → `200 OK` with the fixed body.
    /// - `HEAD` → `200 OK`, same headers as `GET`, no body bytes.
    /// - anything else → `501 Not Implemented`, empty body.
    pub fn dispatch(&self, request: &Request) -> Response {
        let response = match request.method() {
            Method::Get => Response::new(StatusCode::Ok).body(self.body.clone()),
            Method::Head => Response::new(StatusCode::Ok)
                .body(self.body.clone())
                .without_body(),
            _ => Response::new(StatusCode::NotImplemented),
        };

        response.version(request.version())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BODY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(raw: &[u8]) -> Request {
        Request::parse(raw).unwrap().0
    }

    fn serialize(response: Response) -> String {
        String::from_utf8(response.into_bytes().to_vec()).unwrap()
    }

    #[test]
    fn get_serves_fixed_body() {
        let d = Dispatcher::new("Hello, World!");
        let r = d.dispatch(&request(b"GET / HTTP/1.1\r\n\r\n"));
        assert_eq!(r.status(), StatusCode::Ok);
        assert_eq!(r.payload(), b"Hello, World!");
    }

    #[test]
    fn target_does_not_matter() {
        let d = Dispatcher::default();
        let r = d.dispatch(&request(b"GET /some/other/path?q=1 HTTP/1.1\r\n\r\n"));
        assert_eq!(r.status(), StatusCode::Ok);
        assert_eq!(r.payload(), b"hello world");
    }

    #[test]
    fn head_advertises_get_length() {
        let d = Dispatcher::default();
        let r = d.dispatch(&request(b"HEAD / HTTP/1.1\r\n\r\n"));
        assert_eq!(r.status(), StatusCode::Ok);
        assert!(r.payload().is_empty());

        let wire = serialize(r);
        assert!(wire.contains("Content-Length: 11\r\n"));
        assert!(wire.ends_with("\r\n\r\n"));
    }

    #[test]
    fn other_methods_are_not_implemented() {
        let d = Dispatcher::default();
        for raw in [
            &b"POST / HTTP/1.1\r\nContent-Length: 9\r\n\r\ntest=data"[..],
            b"PUT / HTTP/1.1\r\n\r\n",
            b"DELETE / HTTP/1.1\r\n\r\n",
            b"PURGE / HTTP/1.1\r\n\r\n",
        ] {
            let r = d.dispatch(&request(raw));
            assert_eq!(r.status(), StatusCode::NotImplemented);
            assert!(r.payload().is_empty());
            assert!(serialize(r).contains("Content-Length: 0\r\n"));
        }
    }

    #[test]
    fn echoes_http10() {
        let d = Dispatcher::default();
        let wire = serialize(d.dispatch(&request(b"GET / HTTP/1.0\r\n\r\n")));
        assert!(wire.starts_with("HTTP/1.0 200 OK\r\n"));
    }
}
