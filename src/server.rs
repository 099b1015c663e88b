//! HTTP Server for the lesson page
//! Simple HTTP server using tokio and basic HTTP handling
//!
//! Every request rebuilds the lesson from the shared, read-only dataset, so
//! sessions never see each other's selections.

use crate::dataset::Dataset;
use crate::error::{DemoError, Result};
use crate::lesson::Lesson;
use crate::render::html;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";

/// How long a client gets to send its request head
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest request head accepted
const MAX_REQUEST_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone)]
pub struct LessonServer {
    dataset: Arc<Dataset>,
    read_timeout: Duration,
}

impl LessonServer {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            read_timeout: READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Bind `addr` and serve until the process is stopped
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Serving lesson on http://{}", listener.local_addr()?);
        self.serve(listener).await
    }

    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            debug!("New connection from: {}", peer);
            let server = self.clone();
            tokio::spawn(async move { server.handle_connection(stream).await });
        }
    }

    async fn handle_connection(&self, mut stream: TcpStream) {
        let request = match timeout(self.read_timeout, read_request_head(&mut stream)).await {
            Ok(Ok(request)) => request,
            Ok(Err(e)) => {
                warn!("Failed to read from stream: {}", e);
                return;
            }
            Err(_) => {
                debug!("Dropping connection idle for {:?}", self.read_timeout);
                return;
            }
        };

        if request.is_empty() {
            return;
        }

        let request = String::from_utf8_lossy(&request);
        let response = self.handle_request(&request);

        if let Err(e) = stream.write_all(response.as_bytes()).await {
            warn!("Failed to write response: {}", e);
        }
    }

    /// Route one raw HTTP request to a full raw response
    pub fn handle_request(&self, request: &str) -> String {
        let Some(request_line) = request.lines().next() else {
            return create_response(400, "Bad Request", JSON, r#"{"error":"empty request"}"#);
        };

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() < 2 {
            return create_response(400, "Bad Request", JSON, r#"{"error":"malformed request line"}"#);
        }

        let method = parts[0];
        let (path, query_string) = match parts[1].split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (parts[1], None),
        };
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        let month = query_string.and_then(|qs| query_param(qs, "month"));

        debug!("Request: {} {} month={:?}", method, path, month);

        match (method, path) {
            ("GET", "/") => self.page(month.as_deref()),
            ("GET", "/api/lesson") => self.lesson_json(month.as_deref()),
            ("GET", "/api/health") => create_response(
                200,
                "OK",
                JSON,
                r#"{"status":"ok","service":"sql-for-humans"}"#,
            ),
            ("GET", _) => create_response(404, "Not Found", JSON, r#"{"error":"not found"}"#),
            _ => create_response(
                405,
                "Method Not Allowed",
                JSON,
                r#"{"error":"method not allowed"}"#,
            ),
        }
    }

    fn page(&self, month: Option<&str>) -> String {
        match Lesson::build(&self.dataset, month) {
            Ok(view) => create_response(200, "OK", HTML, &html::render(&view)),
            Err(e) => {
                let (status, text) = error_status(&e);
                let body = format!(
                    "<!DOCTYPE html>\n<html><body><h1>{}</h1><p>{}</p><p><a href=\"/\">Back</a></p></body></html>\n",
                    status,
                    html::escape(&e.to_string())
                );
                create_response(status, text, HTML, &body)
            }
        }
    }

    fn lesson_json(&self, month: Option<&str>) -> String {
        let result = Lesson::build(&self.dataset, month)
            .and_then(|view| serde_json::to_string(&view).map_err(DemoError::from));

        match result {
            Ok(json) => create_response(200, "OK", JSON, &json),
            Err(e) => {
                let (status, text) = error_status(&e);
                let body = serde_json::json!({ "error": e.to_string() }).to_string();
                create_response(status, text, JSON, &body)
            }
        }
    }
}

/// Read until the blank line ending the request head, EOF, or the size cap.
/// Routes are all GET, so any body is ignored.
async fn read_request_head(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut chunk = [0; 4096];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }

    Ok(buffer)
}

fn error_status(e: &DemoError) -> (u16, &'static str) {
    match e {
        DemoError::UnknownMonth { .. } => (400, "Bad Request"),
        _ => {
            error!("Failed to build lesson: {}", e);
            (500, "Internal Server Error")
        }
    }
}

/// First value of `key` in a query string, percent-decoded
pub fn query_param(query_string: &str, key: &str) -> Option<String> {
    query_string
        .split('&')
        .filter_map(|param| param.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, value)| percent_decode(value))
}

/// Decode `%XX` escapes and `+` as space; invalid escapes pass through unchanged
pub fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match bytes
                .get(i + 1..i + 3)
                .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                Some(byte) => {
                    out.push(byte);
                    i += 3;
                }
                None => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn create_response(status: u16, status_text: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        status,
        status_text,
        content_type,
        body.len(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> LessonServer {
        LessonServer::new(Arc::new(Dataset::sample().unwrap()))
    }

    fn get(path: &str) -> String {
        server().handle_request(&format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path))
    }

    fn body(response: &str) -> &str {
        response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("")
    }

    #[test]
    fn test_page_defaults_to_first_month() {
        let response = get("/");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Content-Type: text/html"));
        assert!(body(&response).contains("<option value=\"2024-01\" selected>"));
    }

    #[test]
    fn test_page_with_month() {
        let response = get("/?month=2024-03");
        assert!(body(&response).contains("Orders in 2024-03</div><div class=\"value\">3</div>"));
    }

    #[test]
    fn test_content_length_matches_body() {
        let response = get("/");
        let length: usize = response
            .lines()
            .find_map(|l| l.strip_prefix("Content-Length: "))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(length, body(&response).len());
    }

    #[test]
    fn test_unknown_month_is_bad_request() {
        let response = get("/?month=%3Cscript%3E");
        assert!(response.starts_with("HTTP/1.1 400 Bad Request"));
        assert!(body(&response).contains("&lt;script&gt;"));
        assert!(!body(&response).contains("<script>"));
    }

    #[test]
    fn test_lesson_json() {
        let response = get("/api/lesson?month=2024-02");
        let json: serde_json::Value = serde_json::from_str(body(&response)).unwrap();
        assert_eq!(json["selected_month"], "2024-02");
        assert_eq!(json["orders_in_month_count"], 2);
        assert_eq!(json["total_customers"], 5);
        assert_eq!(json["total_revenue"], 640);
    }

    #[test]
    fn test_other_routes() {
        assert!(get("/api/health").contains("\"status\":\"ok\""));
        assert!(get("/nowhere").starts_with("HTTP/1.1 404"));
        assert!(server()
            .handle_request("POST / HTTP/1.1\r\n\r\n")
            .starts_with("HTTP/1.1 405"));
        assert!(server().handle_request("").starts_with("HTTP/1.1 400"));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("2024-03"), "2024-03");
        assert_eq!(percent_decode("a+b%20c"), "a b c");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%+1"), "% 1");
        assert_eq!(percent_decode("%-1x"), "%-1x");
        assert_eq!(query_param("x=1&month=2024%2D02", "month").as_deref(), Some("2024-02"));
        assert_eq!(query_param("x=1", "month"), None);
    }

    #[tokio::test]
    async fn test_serves_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server().serve(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /api/health HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
    }

    #[tokio::test]
    async fn test_idle_connection_is_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(
            server()
                .with_read_timeout(Duration::from_millis(200))
                .serve(listener),
        );

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut response = Vec::new();
        let closed = timeout(Duration::from_secs(5), stream.read_to_end(&mut response)).await;

        assert!(closed.is_ok(), "server kept a silent connection open");
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_request_split_across_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server().serve(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET /api/lesson?month=2024-03 HT").await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        stream
            .write_all(b"TP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("\"selected_month\":\"2024-03\""));
    }
}
