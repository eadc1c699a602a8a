//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body, one request per connection. Every request's
//! method and headers are recorded so tests can assert what the client sent.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Shape of the body sent with a 206.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangedBody {
    /// Exactly the requested bytes.
    Exact,
    /// One byte fewer than requested (consistent `Content-Length`).
    Short,
    /// The requested bytes followed by 16 extra ones.
    Long,
}

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// Status for HEAD requests (200 normally).
    pub head_status: u16,
    /// Send `Content-Length` on HEAD.
    pub send_content_length: bool,
    /// Send `Accept-Ranges: bytes` on HEAD/GET.
    pub advertise_ranges: bool,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// Ranged GETs starting at this offset get a 500 instead of 206.
    pub fail_range_start: Option<u64>,
    /// Status for unranged GETs (200 normally).
    pub get_status: u16,
    pub ranged_body: RangedBody,
    /// Hold each 206 body this long after its headers are sent.
    pub stall_ranged_body: Option<Duration>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            head_status: 200,
            send_content_length: true,
            advertise_ranges: true,
            support_ranges: true,
            fail_range_start: None,
            get_status: 200,
            ranged_body: RangedBody::Exact,
            stall_ranged_body: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// All values sent for `name` (case-insensitive).
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

pub struct RangeServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RangeServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `body` at `/<path>`.
/// The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &body, opts, &log));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/files/payload.bin", port),
        requests,
    }
}

/// Reads until the end of the request head.
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: RangeServerOptions,
    log: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let request = match read_head(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let recorded = parse_request(&request);
    let range = recorded
        .header_values("range")
        .first()
        .and_then(|v| parse_range(v));
    let method = recorded.method.clone();
    log.lock().unwrap().push(recorded);

    let total = body.len() as u64;
    let accept_ranges = if opts.advertise_ranges {
        "Accept-Ranges: bytes\r\n"
    } else {
        ""
    };

    if method.eq_ignore_ascii_case("HEAD") {
        let length = if opts.send_content_length {
            format!("Content-Length: {}\r\n", total)
        } else {
            String::new()
        };
        let response = format!(
            "HTTP/1.1 {}\r\n{}{}Connection: close\r\n\r\n",
            status_text(opts.head_status),
            length,
            accept_ranges
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    match range.filter(|_| opts.support_ranges) {
        Some((start, _)) if opts.fail_range_start == Some(start) => {
            let _ = stream.write_all(
                b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
        Some((start, end_incl)) => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start > end_incl {
                let response = format!(
                    "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    total
                );
                let _ = stream.write_all(response.as_bytes());
                return;
            }
            let mut slice = body[start as usize..=end_incl as usize].to_vec();
            match opts.ranged_body {
                RangedBody::Exact => {}
                RangedBody::Short => {
                    slice.pop();
                }
                RangedBody::Long => slice.extend_from_slice(&[0xAB; 16]),
            }
            let response = format!(
                "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\n{}Connection: close\r\n\r\n",
                slice.len(),
                start,
                end_incl,
                total,
                accept_ranges
            );
            let _ = stream.write_all(response.as_bytes());
            if let Some(stall) = opts.stall_ranged_body {
                let _ = stream.flush();
                thread::sleep(stall);
            }
            let _ = stream.write_all(&slice);
        }
        None => {
            let payload: &[u8] = if opts.get_status == 200 { body } else { b"" };
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
                status_text(opts.get_status),
                payload.len(),
                accept_ranges
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.write_all(payload);
        }
    }
}

fn status_text(code: u16) -> String {
    let reason = match code {
        200 => "OK",
        206 => "Partial Content",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    format!("{} {}", code, reason)
}

fn parse_request(request: &str) -> RecordedRequest {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("")
        .to_string();
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    RecordedRequest { method, headers }
}

/// `bytes=X-Y` → (X, Y inclusive); `bytes=X-` → (X, u64::MAX).
fn parse_range(value: &str) -> Option<(u64, u64)> {
    let value = value.trim();
    let range = value.strip_prefix("bytes=")?;
    let (a, b) = range.split_once('-')?;
    let start = a.trim().parse::<u64>().ok()?;
    let end = b.trim();
    let end_incl = if end.is_empty() {
        u64::MAX
    } else {
        end.parse::<u64>().ok()?
    };
    Some((start, end_incl))
}
