//! A small site to browse through the proxy.
//!
//! Run with `cargo run --example upstream_site`, then open
//! `/{secure path}?u=http://127.0.0.1:8081/` on the proxy.

use axum::{
    http::header,
    response::{AppendHeaders, Html, IntoResponse, Redirect},
    routing::get,
    Router,
};
use std::net::SocketAddr;

const INDEX: &str = r#"<!DOCTYPE html><html><head><link rel="stylesheet" href="style.css"></head><body>
<h1>Pretend website</h1>
<ul>
<li><a href="docs/intro.html">Relative link</a></li>
<li><a href='/docs/intro.html'>Root-relative link, single quotes</a></li>
<li><a href="/old">Link that redirects</a></li>
<li><a href="/cookies">Sets two cookies</a></li>
<li><a href="mailto:owner@example.com">Mail link, left alone</a></li>
</ul>
<form action="/search"><input name="q"></form>
</body></html>"#;

const INTRO: &str = r#"<!DOCTYPE html><html><body>
<p><a href="../">Back</a> | <a href="./next.html?page=2&amp;sort=asc">Next</a></p>
</body></html>"#;

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/", get(|| async { Html(INDEX) }))
        .route("/docs/intro.html", get(|| async { Html(INTRO) }))
        .route("/style.css", get(|| async { ([(header::CONTENT_TYPE, "text/css")], "body{font-family:serif}") }))
        .route("/old", get(|| async { Redirect::temporary("/docs/intro.html") }))
        .route(
            "/cookies",
            get(|| async {
                (
                    AppendHeaders([
                        (header::SET_COOKIE, "session=abc; Path=/"),
                        (header::SET_COOKIE, "theme=dark"),
                    ]),
                    Html("<p>Two cookies set.</p>"),
                )
                    .into_response()
            }),
        );

    let addr = SocketAddr::from(([127, 0, 0, 1], 8081));
    println!("Pretend website is listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
