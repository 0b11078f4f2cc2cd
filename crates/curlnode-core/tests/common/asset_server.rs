//! Minimal HTTP/1.1 server serving one pre-gzipped asset for provisioning
//! tests. Counts requests so tests can assert that a cached binary is not
//! fetched twice.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct AssetServerOptions {
    /// If true, every request gets a 404 (simulates a missing asset).
    pub not_found: bool,
}

impl Default for AssetServerOptions {
    fn default() -> Self {
        Self { not_found: false }
    }
}

/// Handle for a running asset server.
pub struct AssetServer {
    /// Base URL without a trailing slash (e.g. "http://127.0.0.1:12345").
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl AssetServer {
    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `asset` for every GET.
/// The server runs until the process exits.
pub fn start(asset: Vec<u8>) -> AssetServer {
    start_with_options(asset, AssetServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(asset: Vec<u8>, opts: AssetServerOptions) -> AssetServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let asset = Arc::new(asset);
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_for_thread = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let asset = Arc::clone(&asset);
            let hits = Arc::clone(&hits_for_thread);
            thread::spawn(move || handle(stream, &asset, &hits, opts));
        }
    });
    AssetServer {
        base_url: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    asset: &[u8],
    hits: &AtomicUsize,
    opts: AssetServerOptions,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    hits.fetch_add(1, Ordering::SeqCst);
    if opts.not_found {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/gzip\r\n\r\n",
        asset.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(asset);
}
