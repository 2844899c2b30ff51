//! Translation of upstream redirects into proxy redirects.
//!
//! Each hop goes back through the client, which re-requests the entry path.
//! There is no hop limit: an upstream that redirects in a cycle produces a
//! loop the client sees.

use crate::proxy::fetcher::UpstreamResponse;
use crate::proxy::link::proxy_link;
use crate::proxy::resolver::resolve_bytes;

/// Upstream statuses treated as redirects.
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// A redirect to send to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Upstream status, preserved.
    pub status: u16,
    /// Proxy link to the resolved destination.
    pub location: String,
}

/// Returns the proxy redirect for `response`, if it is a redirect with a
/// `Location` header.
///
/// `target` is the URL that was fetched; relative locations resolve against
/// it.
pub fn translate(response: &UpstreamResponse, target: &str, entry_path: &str) -> Option<Redirect> {
    if !REDIRECT_STATUSES.contains(&response.status) {
        return None;
    }
    let location = response.headers.first("location")?;
    let destination = resolve_bytes(target.as_bytes(), location);

    tracing::debug!(status = response.status, "Translating upstream redirect");

    Some(Redirect {
        status: response.status,
        location: proxy_link(entry_path, &destination),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(status: u16, location: Option<&str>) -> UpstreamResponse {
        let mut response = UpstreamResponse {
            status,
            ..UpstreamResponse::new()
        };
        if let Some(location) = location {
            response.headers.append("Location", location);
        }
        response
    }

    #[test]
    fn relative_location_resolves_against_target() {
        let out = translate(&redirect(302, Some("/login")), "http://example.com/page", "/portal-abc123").unwrap();
        assert_eq!(out.status, 302);
        assert_eq!(out.location, "/portal-abc123?u=http%3A%2F%2Fexample.com%2Flogin");
    }

    #[test]
    fn every_redirect_status_is_preserved() {
        for status in REDIRECT_STATUSES {
            let out = translate(&redirect(status, Some("https://b.example/")), "http://a.example/", "/gate").unwrap();
            assert_eq!(out.status, status);
            assert_eq!(out.location, "/gate?u=https%3A%2F%2Fb.example%2F");
        }
    }

    #[test]
    fn no_location_or_other_status_is_not_a_redirect() {
        assert!(translate(&redirect(302, None), "http://a.example/", "/gate").is_none());
        assert!(translate(&redirect(304, Some("/x")), "http://a.example/", "/gate").is_none());
        assert!(translate(&redirect(200, Some("/x")), "http://a.example/", "/gate").is_none());
    }

    #[test]
    fn non_utf8_location_is_encoded_verbatim() {
        let mut response = redirect(302, None);
        response.headers.append("Location", &b"/\xd6\xd0"[..]);
        let out = translate(&response, "http://a.example/x", "/gate").unwrap();
        assert_eq!(out.location, "/gate?u=http%3A%2F%2Fa.example%2F%D6%D0");
    }

    #[test]
    fn location_lookup_is_case_insensitive() {
        let mut response = redirect(301, None);
        response.headers.append("location", "next");
        let out = translate(&response, "http://a.example/dir/page", "/gate").unwrap();
        assert_eq!(out.location, "/gate?u=http%3A%2F%2Fa.example%2Fdir%2Fnext");
    }
}
