//! Mock Gemini API server for testing
//!
//! Serves `POST /models/{model}:generateContent` with the same response
//! structure as the real API:
//! `{ "candidates": [ { "content": { "parts": [ { "text": "..." } ] } } ] }`
//!
//! Request bodies are recorded so tests can inspect the prompt that was sent.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::json;

/// Mock Gemini server for testing
pub struct MockGeminiServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<String>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Canned behaviour for the mock server
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Text returned in the first candidate
    pub response_text: String,
    /// Respond 403 regardless of the key
    pub fail_auth: bool,
    /// Respond 429
    pub rate_limit: bool,
    /// Respond 200 with no candidates
    pub empty_candidates: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            response_text: "SELECT * FROM students".to_string(),
            fail_auth: false,
            rate_limit: false,
            empty_candidates: false,
        }
    }
}

impl MockGeminiServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking so stop() can end the accept loop
        listener.set_nonblocking(true)?;

        let running_clone = Arc::clone(&running);
        let requests_clone = Arc::clone(&requests);
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let _ = stream.set_nonblocking(false);
                        handle_connection(stream, &config, &requests_clone);
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Bodies of the requests received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, requests: &Mutex<Vec<String>>) {
    let Some((head, body)) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    };

    let first_line = head.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    }
    let (method, path) = (parts[0], parts[1]);

    if let Ok(mut log) = requests.lock() {
        log.push(body);
    }

    if method != "POST" {
        send_response(&mut stream, 405, "Method Not Allowed", r#"{"error": "Method not allowed"}"#);
        return;
    }

    if !path.starts_with("/models/") || !path.contains(":generateContent") {
        send_response(&mut stream, 404, "Not Found", r#"{"error": "Endpoint not found"}"#);
        return;
    }

    if config.fail_auth {
        send_response(&mut stream, 403, "Forbidden", r#"{"error": "Permission denied"}"#);
        return;
    }

    // The real API answers an unknown key with 400 INVALID_ARGUMENT
    let head_lower = head.to_lowercase();
    let has_valid_key = head_lower.contains("x-goog-api-key: test_")
        || head_lower.contains("x-goog-api-key: valid_");
    if !has_valid_key {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "API key not valid"}"#);
        return;
    }

    if config.rate_limit {
        send_response(&mut stream, 429, "Too Many Requests", r#"{"error": "Resource exhausted"}"#);
        return;
    }

    let payload = if config.empty_candidates {
        json!({ "candidates": [] })
    } else {
        json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": config.response_text } ] } }
            ]
        })
    };
    send_response(&mut stream, 200, "OK", &payload.to_string());
}

/// Read the request head and a Content-Length body
fn read_request(stream: &mut TcpStream) -> Option<(String, String)> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = find_header_end(&data) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while data.len() < body_start + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body_end = data.len().min(body_start + content_length);
    let body = String::from_utf8_lossy(&data[body_start.min(body_end)..body_end]).to_string();
    Some((head, body))
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
