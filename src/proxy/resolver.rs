//! Reference resolution against the URL a page was fetched from.
//!
//! # Design Decisions
//! - The base is split by hand instead of parsed with `url::Url`: a malformed
//!   base still resolves, with an empty host, rather than failing the page
//! - Query and fragment come only from the reference, never from the base
//! - Dot-segments above the root are absorbed silently

/// Resolves `reference` against `base`, returning an absolute URL.
///
/// ```
/// use veil_proxy::proxy::resolver::resolve;
///
/// assert_eq!(resolve("http://example.com/a/b/c", "../d"), "http://example.com/a/d");
/// assert_eq!(resolve("https://example.com/", "//cdn.example.com/x.js"), "https://cdn.example.com/x.js");
/// ```
pub fn resolve(base: &str, reference: &str) -> String {
    if reference.is_empty() {
        return base.to_string();
    }
    if has_scheme(reference) {
        return reference.to_string();
    }

    let base = BaseParts::parse(base);

    if reference.starts_with("//") {
        return format!("{}:{}", base.scheme, reference);
    }

    let (ref_path, query, fragment) = split_reference(reference);
    let joined = if ref_path.starts_with('/') {
        ref_path.to_string()
    } else {
        format!("{}{}", directory_of(base.path), ref_path)
    };

    let mut resolved = format!("{}://{}{}", base.scheme, base.authority, normalize_path(&joined));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        resolved.push('?');
        resolved.push_str(query);
    }
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        resolved.push('#');
        resolved.push_str(fragment);
    }
    resolved
}

/// [`resolve`] over raw bytes, for references taken from pages or headers
/// that need not be UTF-8.
///
/// Each byte is carried through resolution as one char in `U+0000..=U+00FF`.
/// Resolution only splits on ASCII delimiters, so every byte of `base` and
/// `reference` reaches the output unchanged.
pub fn resolve_bytes(base: &[u8], reference: &[u8]) -> Vec<u8> {
    let widen = |bytes: &[u8]| bytes.iter().copied().map(char::from).collect::<String>();
    resolve(&widen(base), &widen(reference))
        .chars()
        .map(|c| c as u8)
        .collect()
}

/// True when `s` starts with `scheme://`.
fn has_scheme(s: &str) -> bool {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for (i, c) in chars {
        if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.') {
            continue;
        }
        return s[i..].starts_with("://");
    }
    false
}

/// The pieces of a base URL needed for resolution.
#[derive(Debug, PartialEq, Eq)]
struct BaseParts<'a> {
    scheme: &'a str,
    /// `host[:port]`, userinfo removed.
    authority: &'a str,
    path: &'a str,
}

impl<'a> BaseParts<'a> {
    fn parse(base: &'a str) -> Self {
        let (scheme, rest) = match base.find("://") {
            Some(idx) if has_scheme(base) => (&base[..idx], Some(&base[idx + 3..])),
            _ => match base.strip_prefix("//") {
                Some(rest) => ("http", Some(rest)),
                None => ("http", None),
            },
        };

        let (authority, after) = match rest {
            Some(rest) => {
                let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
                let authority = &rest[..end];
                let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
                (host, &rest[end..])
            }
            None => ("", base),
        };

        let path_end = after.find(['?', '#']).unwrap_or(after.len());
        let path = &after[..path_end];

        Self {
            scheme,
            authority,
            path: if path.is_empty() { "/" } else { path },
        }
    }
}

/// Strips the last path segment, keeping the trailing slash.
fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}

/// Splits a reference into path, query and fragment.
fn split_reference(reference: &str) -> (&str, Option<&str>, Option<&str>) {
    let (before_fragment, fragment) = match reference.split_once('#') {
        Some((before, fragment)) => (before, Some(fragment)),
        None => (reference, None),
    };
    match before_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query), fragment),
        None => (before_fragment, None, fragment),
    }
}

/// Removes `.`, `..` and empty segments. Always returns a path starting with `/`.
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let trailing_slash = matches!(path.rsplit('/').next(), Some("" | "." | ".."));
    let mut normalized = String::with_capacity(path.len());
    normalized.push('/');
    normalized.push_str(&segments.join("/"));
    if trailing_slash && !segments.is_empty() {
        normalized.push('/');
    }
    normalized
}
