//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use veil_proxy::gate::{GateStore, MemoryGateStore};
use veil_proxy::{HttpServer, ProxyConfig, Shutdown};

pub const SECURE_PATH: &str = "portal-abc123";

/// Start a mock backend that answers every connection with `response`,
/// written verbatim after the request head has been read.
pub async fn start_raw_backend(response: impl Into<Vec<u8>>) -> SocketAddr {
    let (addr, _heads) = start_recording_backend(response).await;
    addr
}

/// Like [`start_raw_backend`], also sending each request head it reads.
pub async fn start_recording_backend(
    response: impl Into<Vec<u8>>,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let response: Arc<[u8]> = response.into().into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (heads_tx, heads_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            let heads_tx = heads_tx.clone();
            tokio::spawn(async move {
                let Some(head) = read_head(&mut socket).await else {
                    return;
                };
                let _ = heads_tx.send(head);
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, heads_rx)
}

/// Start a backend that reads the request and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_head(&mut socket).await;
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(socket);
            });
        }
    });

    addr
}

async fn read_head(socket: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    Some(String::from_utf8_lossy(&head).into_owned())
}

/// A `200 OK` response with a body and extra header lines.
pub fn http_response(extra_headers: &[&str], body: &str) -> String {
    let mut response = String::from("HTTP/1.1 200 OK\r\n");
    for header in extra_headers {
        response.push_str(header);
        response.push_str("\r\n");
    }
    response.push_str(&format!("Content-Length: {}\r\nConnection: close\r\n\r\n{}", body.len(), body));
    response
}

/// An address with nothing listening on it.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(mut config: ProxyConfig, gate: Arc<dyn GateStore>) -> (SocketAddr, Shutdown) {
    config.upstream.use_env_proxy = false;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_gate(config, gate).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// Start the proxy with [`SECURE_PATH`] already configured.
pub async fn start_configured_proxy() -> (SocketAddr, Shutdown) {
    start_configured_proxy_with(ProxyConfig::default()).await
}

/// [`start_configured_proxy`] with a custom config.
pub async fn start_configured_proxy_with(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let gate = MemoryGateStore::with_secure_path(SECURE_PATH).unwrap();
    start_proxy(config, Arc::new(gate)).await
}

/// Client that never follows redirects and never reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Entry URL on the proxy for `target`.
pub fn entry_url(proxy: SocketAddr, target: &str) -> String {
    format!("http://{}{}", proxy, entry_url_path(target))
}

/// Path and query of the entry URL for `target`, as rewritten links carry it.
pub fn entry_url_path(target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("/{}?u={}", SECURE_PATH, encoded)
}
