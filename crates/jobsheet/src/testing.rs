// In-memory collaborators and a local HTTP server shared by the unit tests.

use crate::sheets::{AppendResponse, AuthError, SheetStore, SheetsError, TokenProvider, UpdateSummary};

use async_trait::async_trait;
use reqwest::Url;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct AppendCall {
    pub spreadsheet_id: String,
    pub range: String,
    pub token: String,
    pub rows: Vec<Vec<String>>,
}

/// Hands out a fixed token, or a 401 rejection when `fail` is set.
#[derive(Debug, Clone, Default)]
pub struct FakeTokens {
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
}

impl FakeTokens {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn access_token(&self, _scope: &str) -> Result<String, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AuthError::Rejected {
                status: 401,
                body: r#"{"error":"invalid_grant"}"#.to_string(),
            });
        }
        Ok("test-token".to_string())
    }
}

/// Records every append and reports the data rows (header excluded) as
/// inserted.
#[derive(Debug, Clone, Default)]
pub struct RecordingStore {
    pub reject: bool,
    pub calls: Arc<Mutex<Vec<AppendCall>>>,
}

impl RecordingStore {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<AppendCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetStore for RecordingStore {
    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        token: &str,
        rows: &[Vec<String>],
    ) -> Result<AppendResponse, SheetsError> {
        self.calls.lock().unwrap().push(AppendCall {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            token: token.to_string(),
            rows: rows.to_vec(),
        });
        if self.reject {
            return Err(SheetsError::Rejected {
                status: 403,
                body: "The caller does not have permission".to_string(),
            });
        }
        Ok(AppendResponse {
            table_range: None,
            updates: UpdateSummary {
                updated_range: Some(format!("{}:Z{}", range, rows.len())),
                updated_rows: rows.len().saturating_sub(1) as u64,
                updated_columns: rows.first().map_or(0, |r| r.len()) as u64,
                updated_cells: rows.iter().map(|r| r.len()).sum::<usize>() as u64,
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ServedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    pub fn query(&self, key: &str) -> Option<String> {
        let url = Url::parse(&format!("http://localhost{}", self.target)).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP/1.1 server on a loopback port. Every request is answered with the
/// `(status, body)` returned by the responder and the connection is closed.
pub struct FakeServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<ServedRequest>>>,
}

impl FakeServer {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&ServedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let served = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let Some(request) = read_request(&mut stream).await else {
                    continue;
                };
                let (status, body) = respond(&request);
                served.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {} Fake\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<ServedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<ServedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(ServedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&buf[head_end..]).into_owned(),
    })
}
