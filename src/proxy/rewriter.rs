//! HTML link rewriting.
//!
//! Scans raw markup for `href`, `src` and `action` attributes and points them
//! back at the entry path. This is pattern scanning, not parsing: CSS
//! `url()`, `srcset`, inline scripts and meta-refresh are not touched, and
//! badly nested quotes can be mis-rewritten.
//!
//! Works on bytes so pages in any ASCII-compatible encoding pass through
//! unchanged outside the rewritten attributes. Attribute values are resolved
//! and percent-encoded as raw bytes, so a GBK or Latin-1 link keeps its
//! original byte sequence in the proxy link.

use std::sync::LazyLock;

use regex::bytes::{Captures, Regex};

use crate::proxy::html::{decode_entities, escape_html};
use crate::proxy::link::proxy_link;
use crate::proxy::resolver::resolve_bytes;

static DOUBLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i-u)\b(href|src|action)\s*=\s*"([^"]*)""#).expect("valid attribute pattern"));

static SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i-u)\b(href|src|action)\s*=\s*'([^']*)'"#).expect("valid attribute pattern"));

/// Values with these prefixes are never rewritten.
const DENIED_PREFIXES: [&[u8]; 3] = [b"mailto:", b"javascript:", b"data:"];

/// Rewrites resource links in `html` to proxy links under `entry_path`.
///
/// Double-quoted attributes are handled first, then single-quoted ones.
/// Rewritten attributes are always emitted double-quoted.
pub fn rewrite(html: &[u8], base: &str, entry_path: &str) -> Vec<u8> {
    let entry_path = entry_path.trim_end_matches('/');
    let pass = |pattern: &Regex, input: &[u8]| -> Vec<u8> {
        pattern
            .replace_all(input, |caps: &Captures<'_>| rewrite_attribute(caps, base, entry_path))
            .into_owned()
    };

    let double = pass(&DOUBLE_QUOTED, html);
    pass(&SINGLE_QUOTED, &double)
}

fn rewrite_attribute(caps: &Captures<'_>, base: &str, entry_path: &str) -> Vec<u8> {
    let value = decode_entities(&caps[2]);
    if value.is_empty() || is_denied(&value) {
        return caps[0].to_vec();
    }

    let link = proxy_link(entry_path, &resolve_bytes(base.as_bytes(), &value));
    let escaped = escape_html(&link);

    let attr = &caps[1];
    let mut out = Vec::with_capacity(attr.len() + escaped.len() + 3);
    out.extend_from_slice(attr);
    out.extend_from_slice(b"=\"");
    out.extend_from_slice(escaped.as_bytes());
    out.push(b'"');
    out
}

fn is_denied(value: &[u8]) -> bool {
    DENIED_PREFIXES.iter().any(|prefix| {
        value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://example.com/dir/page";
    const ENTRY: &str = "/portal-abc123";

    fn run(html: &str) -> String {
        String::from_utf8(rewrite(html.as_bytes(), BASE, ENTRY)).unwrap()
    }

    #[test]
    fn single_quoted_src_becomes_double_quoted_link() {
        assert_eq!(
            run("<img src='x.png'>"),
            r#"<img src="/portal-abc123?u=http%3A%2F%2Fexample.com%2Fdir%2Fx.png">"#
        );
        assert_eq!(
            run("<img src='/x.png'>"),
            r#"<img src="/portal-abc123?u=http%3A%2F%2Fexample.com%2Fx.png">"#
        );
    }

    #[test]
    fn denied_and_empty_values_are_untouched() {
        for html in [
            r#"<a href="mailto:x@y.com">mail</a>"#,
            r#"<a HREF = "JavaScript:void(0)">js</a>"#,
            "<img src='data:image/png;base64,AAAA'>",
            r#"<form action="">"#,
            r#"<a href="&#109;ailto:x@y.com">"#,
        ] {
            assert_eq!(run(html), html);
        }
    }

    #[test]
    fn attribute_name_case_is_kept() {
        assert_eq!(
            run(r#"<A HREF = "/a">"#),
            r#"<A HREF="/portal-abc123?u=http%3A%2F%2Fexample.com%2Fa">"#
        );
    }

    #[test]
    fn entities_are_decoded_before_resolving() {
        assert_eq!(
            run(r#"<a href="/s?a=1&amp;b=2">"#),
            r#"<a href="/portal-abc123?u=http%3A%2F%2Fexample.com%2Fs%3Fa%3D1%26b%3D2">"#
        );
    }

    #[test]
    fn absolute_and_form_actions_are_rewritten() {
        let out = run(r#"<form action="https://other.org/search"><script src="//cdn.net/a.js"></script>"#);
        assert!(out.contains(r#"action="/portal-abc123?u=https%3A%2F%2Fother.org%2Fsearch""#));
        assert!(out.contains(r#"src="/portal-abc123?u=http%3A%2F%2Fcdn.net%2Fa.js""#));
    }

    #[test]
    fn both_quote_styles_in_one_page() {
        let out = run(r#"<a href="one">1</a><a href='two'>2</a>"#);
        assert_eq!(
            out,
            concat!(
                r#"<a href="/portal-abc123?u=http%3A%2F%2Fexample.com%2Fdir%2Fone">1</a>"#,
                r#"<a href="/portal-abc123?u=http%3A%2F%2Fexample.com%2Fdir%2Ftwo">2</a>"#
            )
        );
    }

    #[test]
    fn unrelated_attributes_and_text_are_untouched() {
        let html = r#"<div class="x" data-id='7'>href is a word; src=nothing</div>"#;
        assert_eq!(run(html), html);
    }

    #[test]
    fn gbk_link_keeps_its_bytes() {
        let html = b"<a href=\"/\xd6\xd0.html\">\xd6\xd0</a><img src='\xc4\xe3.png'>";
        let mut expected = br#"<a href="/portal-abc123?u=http%3A%2F%2Fexample.com%2F%D6%D0.html">"#.to_vec();
        expected.extend_from_slice(b"\xd6\xd0</a>");
        expected.extend_from_slice(br#"<img src="/portal-abc123?u=http%3A%2F%2Fexample.com%2Fdir%2F%C4%E3.png">"#);
        assert_eq!(rewrite(html, BASE, ENTRY), expected);
    }

    #[test]
    fn non_utf8_bytes_outside_attributes_survive() {
        let mut html = b"<p>\xc4\xe3\xba\xc3</p><a href=\"/n\">".to_vec();
        html.push(0xff);
        let out = rewrite(&html, BASE, ENTRY);
        assert!(out.starts_with(b"<p>\xc4\xe3\xba\xc3</p>"));
        assert_eq!(out.last(), Some(&0xff));
        assert!(out
            .windows(b"u=http%3A%2F%2Fexample.com%2Fn".len())
            .any(|w| w == b"u=http%3A%2F%2Fexample.com%2Fn"));
    }
}
