//! Upstream header storage and the outbound header allow-list.
//!
//! # Responsibilities
//! - Keep upstream headers as an ordered, case-insensitive multimap
//! - Build the outbound header set from an allow-list
//!
//! # Design Decisions
//! - Duplicates are preserved in arrival order (`Set-Cookie` depends on it)
//! - `Cache-Control` is always `no-store`, whatever upstream sent
//! - Anything not on the list is dropped so upstream identity does not leak

use axum::http::header::{CACHE_CONTROL, CONTENT_LANGUAGE, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Ordered multimap of header name to values.
///
/// Lookups ignore ASCII case; the first spelling seen for a name is kept.
/// Values are raw bytes: obs-text from upstream is forwarded as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMultimap {
    entries: Vec<(String, Vec<Vec<u8>>)>,
}

impl HeaderMultimap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, after any existing values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// All values for `name`, in arrival order. Empty when absent.
    pub fn get_all(&self, name: &str) -> &[Vec<u8>] {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// First value for `name`.
    pub fn first(&self, name: &str) -> Option<&[u8]> {
        self.get_all(name).first().map(Vec::as_slice)
    }

    /// First value for `name`, if it is UTF-8.
    pub fn first_str(&self, name: &str) -> Option<&str> {
        self.first(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.get_all(name).is_empty()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs, grouped by name in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_slice())))
    }

    /// Copies a transport header map, value bytes unchanged.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let mut map = Self::new();
        for (name, value) in headers {
            map.append(name.as_str(), value.as_bytes());
        }
        map
    }
}

impl<N: Into<String>, V: Into<Vec<u8>>> FromIterator<(N, V)> for HeaderMultimap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.append(name, value);
        }
        map
    }
}

/// Builds the headers sent to the client from the upstream headers.
pub fn outbound_headers(upstream: &HeaderMultimap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(value) = upstream.first(CONTENT_TYPE.as_str()) {
        append_checked(&mut headers, CONTENT_TYPE, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if let Some(value) = upstream.first(CONTENT_LANGUAGE.as_str()) {
        append_checked(&mut headers, CONTENT_LANGUAGE, value);
    }
    for cookie in upstream.get_all(SET_COOKIE.as_str()) {
        append_checked(&mut headers, SET_COOKIE, cookie);
    }

    headers
}

fn append_checked(headers: &mut HeaderMap, name: HeaderName, value: &[u8]) {
    match HeaderValue::from_bytes(value) {
        Ok(value) => {
            headers.append(name, value);
        }
        Err(_) => {
            tracing::warn!(header = %name, "Dropping upstream header with invalid value");
        }
    }
}
