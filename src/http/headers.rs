//! Ordered HTTP header list with case-insensitive name lookup.

/// A case-insensitive, multi-value HTTP header list.
///
/// Insertion order is kept so responses serialize their headers in the order
/// they were added. Repeated names are allowed; framing checks such as
/// duplicate `Content-Length` values rely on [`Headers::get_all`].
///
/// # Examples
///
/// ```
/// use tinyhttpd::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.insert("Content-Length", "11");
/// headers.insert("Content-Length", "11");
///
/// assert_eq!(headers.get("content-length"), Some("11"));
/// assert_eq!(headers.get_all("CONTENT-LENGTH").count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends a header entry. Earlier entries with the same name are kept.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns the first value for `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `name` (case-insensitive), in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Total number of entries, counting repeated names separately.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let mut h = Headers::new();
        h.insert("Transfer-Encoding", "chunked");
        assert_eq!(h.get("transfer-encoding"), Some("chunked"));
        assert!(h.contains("TRANSFER-ENCODING"));
        assert!(!h.contains("content-length"));
    }

    #[test]
    fn get_with_short_lived_name() {
        let mut h = Headers::new();
        h.insert("Host", "localhost");
        let value = {
            let name = String::from("host");
            h.get(&name)
        };
        assert_eq!(value, Some("localhost"));
    }

    #[test]
    fn repeated_names_keep_order() {
        let mut h = Headers::new();
        h.insert("Content-Length", "4");
        h.insert("Host", "localhost");
        h.insert("content-length", "5");

        let lengths: Vec<_> = h.get_all("Content-Length").collect();
        assert_eq!(lengths, vec!["4", "5"]);
        assert_eq!(h.len(), 3);

        let names: Vec<_> = h.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Content-Length", "Host", "content-length"]);
    }
}
