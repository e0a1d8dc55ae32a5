//! Minimal HTTP/1.1 origin for integration tests.
//!
//! Serves a fixed path -> body map. Can be switched offline, in which case
//! connections are accepted and closed without a response.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

pub struct OriginServer {
    /// e.g. "http://127.0.0.1:12345" (no trailing slash).
    pub origin: String,
    offline: Arc<AtomicBool>,
    hits: Arc<AtomicUsize>,
}

impl OriginServer {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Requests answered while online.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a server in a background thread. Paths not in `routes` get 404.
/// The server runs until the process exits.
pub fn start(routes: &[(&str, &str, &[u8])]) -> OriginServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, (String, Vec<u8>)>> = Arc::new(
        routes
            .iter()
            .map(|(path, ct, body)| (path.to_string(), (ct.to_string(), body.to_vec())))
            .collect(),
    );
    let offline = Arc::new(AtomicBool::new(false));
    let hits = Arc::new(AtomicUsize::new(0));

    let (offline_srv, hits_srv) = (Arc::clone(&offline), Arc::clone(&hits));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            if offline_srv.load(Ordering::SeqCst) {
                drop(stream);
                continue;
            }
            hits_srv.fetch_add(1, Ordering::SeqCst);
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });

    OriginServer {
        origin: format!("http://127.0.0.1:{}", port),
        offline,
        hits,
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, (String, Vec<u8>)>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut first = request.lines().next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("");
    let path = first.next().unwrap_or("/");

    let (status, content_type, body): (&str, &str, &[u8]) = match routes.get(path) {
        Some((ct, body)) => ("200 OK", ct.as_str(), body.as_slice()),
        None => ("404 Not Found", "text/plain", b"not found"),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    if !method.eq_ignore_ascii_case("HEAD") {
        let _ = stream.write_all(body);
    }
}
