//! In-process HTTP responder for exercising the lookup flow against canned
//! bodies without touching the real service.

use crate::model::SearchConfig;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve `responses` to consecutive connections and collect each request
/// line. Every response closes its connection, so request N+1 arrives on a
/// fresh socket.
pub async fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut request_lines = Vec::new();
        for (status, body) in responses {
            let (mut sock, _) = listener.accept().await.unwrap();
            // The request line is at the front of the first read; the rest of
            // the head is irrelevant here.
            let mut buf = vec![0u8; 8192];
            let n = sock.read(&mut buf).await.unwrap();
            let head = String::from_utf8_lossy(&buf[..n]).to_string();
            request_lines.push(head.lines().next().unwrap_or_default().to_string());

            let reason = if status == 200 { "OK" } else { "Error" };
            let resp = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len(),
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
        }
        request_lines
    });
    (base_url, handle)
}

/// A base URL that refuses connections: bind an ephemeral port, then drop
/// the listener before anyone dials it.
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Reference configuration: the defaults from the CLI pointed at `base_url`.
pub fn config(base_url: &str) -> SearchConfig {
    SearchConfig {
        base_url: base_url.to_string(),
        max_rows: 10,
        username: "keep_truckin".to_string(),
        timeout: Duration::from_secs(5),
        user_agent: "city-search-cli/test".to_string(),
    }
}
