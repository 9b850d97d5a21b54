//! Minimal HTTP/1.1 server that serves a fixed set of assets for integration tests.
//!
//! Known paths get their canned status and body; everything else gets 404.
//! Every response closes the connection.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
pub struct Asset {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Asset {
    pub fn ok(content_type: &'static str, body: &[u8]) -> Self {
        Self { status: 200, content_type, body: body.to_vec() }
    }
}

/// Starts a server in a background thread. Returns the origin
/// (e.g. "http://127.0.0.1:12345"). The server runs until the process exits.
pub fn start(assets: Vec<(&'static str, Asset)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let assets: Arc<HashMap<&'static str, Asset>> = Arc::new(assets.into_iter().collect());
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let assets = Arc::clone(&assets);
            thread::spawn(move || handle(stream, &assets));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// Returns an origin nothing is listening on.
pub fn unreachable_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: std::net::TcpStream, assets: &HashMap<&'static str, Asset>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    let not_found = Asset { status: 404, content_type: "text/plain", body: b"not found".to_vec() };
    let asset = assets.get(path).unwrap_or(&not_found);
    let reason = if asset.status == 200 { "OK" } else { "Not Found" };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        asset.status,
        reason,
        asset.content_type,
        asset.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&asset.body);
    let _ = stream.flush();
}
