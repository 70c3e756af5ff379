//! Minimal HTTP server capturing requests sent by the sink.
//!
//! The server answers sequential connections with the configured status
//! codes, one per request, and forwards each parsed request over a channel.
//! Responses carry `Connection: close` so every flush opens a fresh
//! connection.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// A request observed by [`MockServer`].
#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Look up a header by lower-case name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// Handle to a running mock server.
pub struct MockServer {
    addr: SocketAddr,
    rx: mpsc::Receiver<CapturedRequest>,
}

impl MockServer {
    /// Serve one request per entry in `statuses`, then stop accepting.
    pub fn start(statuses: Vec<u16>) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
        Self::with_listener(listener, statuses)
    }

    /// Serve on an already bound listener.
    pub fn with_listener(listener: TcpListener, statuses: Vec<u16>) -> Self {
        let addr = listener.local_addr().expect("listener has address");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for status in statuses {
                let Ok((mut stream, _)) = listener.accept() else {
                    break;
                };
                let captured = read_http_request(&mut stream);
                let response = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
                if tx.send(captured).is_err() {
                    break;
                }
            }
        });

        Self { addr, rx }
    }

    /// URL pointing at `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait for the next captured request, panicking on timeout.
    pub fn expect_request(&self) -> CapturedRequest {
        self.rx
            .recv_timeout(READ_TIMEOUT)
            .expect("expected a request")
    }

    /// Assert that no request arrives within `wait`.
    pub fn expect_silence(&self, wait: Duration) {
        assert!(
            self.rx.recv_timeout(wait).is_err(),
            "unexpected request received"
        );
    }
}

/// URL on a local port with nothing listening.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener has address");
    drop(listener);
    format!("http://{addr}/api/default/app/_json")
}

fn read_http_request(stream: &mut TcpStream) -> CapturedRequest {
    let _ = stream.set_read_timeout(Some(READ_TIMEOUT));
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut head = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read request head");
        let line = line.trim_end().to_owned();
        if line.is_empty() {
            break;
        }
        head.push(line);
    }

    let mut head = head.into_iter();
    let request_line = head.next().unwrap_or_default();
    let mut words = request_line.split_whitespace();
    let method = words.next().unwrap_or_default().to_owned();
    let path = words.next().unwrap_or_default().to_owned();

    let headers: Vec<(String, String)> = head
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_ascii_lowercase(), value.trim().to_owned()))
        })
        .collect();
    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0usize);

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).expect("read request body");

    CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}
