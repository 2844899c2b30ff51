//! Static pages: setup form, decoy landing page, entry form.
//!
//! The decoy must never mention the entry path.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

const SETUP_FORM: &str = concat!(
    r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8">"#,
    r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
    "<title>First-time setup</title>",
    "<style>body{font-family:system-ui,Segoe UI,Arial;max-width:720px;margin:60px auto;padding:0 16px;color:#222}",
    "h1{font-size:22px;margin-bottom:16px}label{display:block;margin-bottom:6px;color:#444}",
    "input{padding:10px;border:1px solid #ccc;border-radius:6px;width:100%;font-size:15px}",
    "button{margin-top:12px;padding:10px 14px;border:0;border-radius:6px;background:#0b76ef;color:#fff;cursor:pointer}",
    ".tip{color:#666;margin-top:10px;font-size:13px}</style></head><body>",
    "<h1>Choose a secure path</h1>",
    r#"<form method="POST">"#,
    r#"<label for="secure_path">Secure path (letters, digits and dashes, 6 to 64 characters):</label>"#,
    r#"<input id="secure_path" name="secure_path" pattern="[A-Za-z0-9-]{6,64}" required placeholder="e.g. portal-abc123">"#,
    r#"<button type="submit">Save</button></form>"#,
    r#"<div class="tip">After saving, the home page shows a stock web server page. "#,
    "The proxy is reachable only at /{secure path}, which is not linked anywhere.</div>",
    "</body></html>"
);

const DECOY_PAGE: &str = concat!(
    r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>Welcome to nginx!</title>"#,
    "<style>body{width:35em;margin:0 auto;font-family:Tahoma,Verdana,Arial,sans-serif;color:#000}h1{color:#000}</style>",
    "</head><body><h1>Welcome to nginx!</h1>",
    "<p>If you see this page, the nginx web server is successfully installed and working. ",
    "Further configuration is required.</p>",
    r#"<p>For online documentation and support please refer to <a href="http://nginx.org/">nginx.org</a>.<br/>"#,
    r#"Commercial support is available at <a href="http://nginx.com/">nginx.com</a>.</p>"#,
    "<p><em>Thank you for using nginx.</em></p></body></html>"
);

const ENTRY_FORM: &str = concat!(
    r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8">"#,
    r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
    "<title>Entry</title>",
    "<style>body{font-family:system-ui,Segoe UI,Arial;max-width:720px;margin:40px auto;padding:0 16px;color:#222}",
    "h1{font-size:18px;margin-bottom:12px}.tip{color:#666;margin-top:10px;font-size:13px}",
    "input[type=url]{width:100%;padding:10px;border:1px solid #ccc;border-radius:6px}",
    "button{margin-top:10px;padding:10px 14px;border:0;border-radius:6px;background:#0b76ef;color:#fff;cursor:pointer}",
    "</style></head><body><h1>Open a page</h1>",
    r#"<form method="POST"><input type="url" name="url" placeholder="https://example.com" required>"#,
    r#"<button type="submit">Go</button></form>"#,
    r#"<div class="tip">Links on fetched pages are rewritten to keep browsing through this entry.</div>"#,
    "</body></html>"
);

pub fn setup_form() -> Response {
    Html(SETUP_FORM).into_response()
}

pub fn decoy_page() -> Response {
    Html(DECOY_PAGE).into_response()
}

pub fn entry_form() -> Response {
    Html(ENTRY_FORM).into_response()
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}
