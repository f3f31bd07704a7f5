//! Shared fixtures: a scripted HTTP server and an in-memory transfer provider

use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use haul::hooks::{Interpreter, InterpreterConfig};
use haul::notify::RetryPolicy;
use haul::transfer::{ProviderError, ProviderResult, TransferProvider};

/// A request as received by [`HttpFixture`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Request body is not JSON")
    }
}

/// HTTP server on an ephemeral port replying with scripted status codes.
///
/// The n-th request gets the n-th status; the last status repeats. Every
/// connection serves exactly one request.
pub struct HttpFixture {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl HttpFixture {
    pub fn start(statuses: &[u16]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fixture");
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let statuses = statuses.to_vec();

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let n = recorded.lock().unwrap().len();
                let status = statuses
                    .get(n)
                    .or_else(|| statuses.last())
                    .copied()
                    .unwrap_or(200);
                let Some(request) = read_request(&stream) else { continue };
                // Recorded before the reply goes out
                recorded.lock().unwrap().push(request);
                respond(stream, status);
            }
        });

        Self { port, requests }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Listener that reads each request and closes the connection without a reply.
pub struct DroppingListener {
    port: u16,
    hits: Arc<AtomicUsize>,
}

impl DroppingListener {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
        let port = listener.local_addr().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = read_request(&stream);
                drop(stream);
            }
        });

        Self { port, hits }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn read_request(stream: &TcpStream) -> Option<RecordedRequest> {
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).ok()?;

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn respond(mut stream: TcpStream, status: u16) {
    let reason = match status {
        200 => "OK",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    };
    let _ = write!(
        stream,
        "HTTP/1.1 {status} {reason}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );
    let _ = stream.flush();
}

/// Retry policy without delays, for tests.
pub fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        attempts,
        timeout: Duration::from_secs(5),
        delay: Duration::ZERO,
    }
}

/// Interpreter without the pacing delay.
pub fn quick_interpreter() -> Interpreter {
    Interpreter::new(InterpreterConfig {
        pacing: Duration::ZERO,
        timeout: Some(Duration::from_secs(30)),
    })
}

/// Provider that keeps a log of calls and moves no data.
#[derive(Default)]
pub struct RecordingProvider {
    pub calls: Mutex<Vec<String>>,
    existing: Mutex<HashSet<String>>,
    fail_copies: bool,
}

impl RecordingProvider {
    pub fn failing() -> Self {
        Self {
            fail_copies: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl TransferProvider for RecordingProvider {
    type Handle = String;

    fn open_filesystem(&self, locator: &str) -> ProviderResult<String> {
        self.record(format!("open {locator}"));
        Ok(locator.to_string())
    }

    fn list(&self, handle: &String) -> ProviderResult<Vec<String>> {
        self.record(format!("list {handle}"));
        if self.existing.lock().unwrap().contains(handle) {
            Ok(Vec::new())
        } else {
            Err(ProviderError::DirNotFound(handle.clone()))
        }
    }

    fn make_dir(&self, handle: &String) -> ProviderResult<()> {
        self.record(format!("mkdir {handle}"));
        self.existing.lock().unwrap().insert(handle.clone());
        Ok(())
    }

    fn copy_file(&self, dest: &String, src: &String, src_name: &str, dest_name: &str) -> ProviderResult<()> {
        self.record(format!("copy_file {src}/{src_name} {dest}/{dest_name}"));
        if self.fail_copies {
            return Err(ProviderError::NotFound(format!("{src}/{src_name}")));
        }
        Ok(())
    }

    fn copy_dir(&self, dest: &String, src: &String, include_empty_dirs: bool) -> ProviderResult<()> {
        self.record(format!("copy_dir {src} {dest} {include_empty_dirs}"));
        if self.fail_copies {
            return Err(ProviderError::DirNotFound(src.clone()));
        }
        Ok(())
    }
}
