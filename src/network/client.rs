//! Provider client - sends the prompt and collects the image bytes

use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::error::GenerationError;
use crate::messages::{GenerateRequest, NetworkResponse};
use crate::models::ImageHandle;

/// Reports cumulative body bytes for one request back to the App layer
#[derive(Debug, Clone)]
pub struct ProgressSink {
    id: u64,
    tx: mpsc::UnboundedSender<NetworkResponse>,
}

impl ProgressSink {
    pub fn new(id: u64, tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        ProgressSink { id, tx }
    }

    pub fn report(&self, bytes_received: usize) {
        let _ = self.tx.send(NetworkResponse::Progress {
            id: self.id,
            bytes_received,
        });
    }
}

/// A hosted text-to-image service
pub trait ImageProvider: Send + Sync {
    fn generate<'a>(
        &'a self,
        request: &'a GenerateRequest,
        progress: ProgressSink,
    ) -> BoxFuture<'a, Result<ImageHandle, GenerationError>>;
}

/// Hugging Face inference router client
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HuggingFaceClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(create_client(timeout), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        HuggingFaceClient {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl ImageProvider for HuggingFaceClient {
    fn generate<'a>(
        &'a self,
        request: &'a GenerateRequest,
        progress: ProgressSink,
    ) -> BoxFuture<'a, Result<ImageHandle, GenerationError>> {
        Box::pin(async move {
            let resp = self
                .client
                .post(&self.endpoint)
                .bearer_auth(request.credential.expose())
                .header(ACCEPT, "image/*")
                .json(&serde_json::json!({ "inputs": request.prompt.as_str() }))
                .send()
                .await
                .map_err(transport_error)?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
                tracing::error!(id = request.id, status = status.as_u16(), body_len = body.len(), "Provider returned an error");
                return Err(provider_error(status.as_u16(), &body));
            }

            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let mut stream = resp.bytes_stream();
            let mut data = Vec::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk
                    .map_err(|e| GenerationError::Unknown(format!("Stream error: {}", e)))?;
                data.extend_from_slice(&chunk);
                progress.report(data.len());
            }

            ImageHandle::new(data, content_type, request.prompt.as_str())
                .ok_or_else(|| GenerationError::Unknown("provider returned an empty image".to_string()))
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<serde_json::Value>,
}

/// Map a non-2xx answer to an error: the body's string `error` field when
/// present, else a generic message carrying the status code.
pub fn provider_error(status: u16, body: &[u8]) -> GenerationError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.as_str().map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error {}", status));

    GenerationError::ProviderHttp { status, message }
}

fn transport_error(e: reqwest::Error) -> GenerationError {
    let msg = if e.is_timeout() {
        "Request timed out".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        format!("Request failed: {}", e)
    };
    GenerationError::Unknown(msg)
}

/// Create an HTTP client with default configuration
pub fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Credential, Prompt};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const PNG: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    /// Serve exactly one canned HTTP response; the task returns the raw request
    async fn serve_once(status_line: &str, content_type: &str, body: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/models/test", listener.local_addr().unwrap());
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_line,
            content_type,
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });

        (url, handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw).to_lowercase();
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn client(url: &str) -> HuggingFaceClient {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HuggingFaceClient::with_client(client, url)
    }

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            id: 1,
            prompt: Prompt::parse(prompt).unwrap(),
            credential: Credential::new("hf_test").unwrap(),
        }
    }

    #[test]
    fn test_provider_error_uses_error_field() {
        let err = provider_error(400, br#"{"error": "X"}"#);
        assert_eq!(err, GenerationError::ProviderHttp { status: 400, message: "X".into() });

        let err = provider_error(503, br#"{"error":"Model is loading","estimated_time":20.5}"#);
        assert_eq!(err.to_string(), "Model is loading");
    }

    #[test]
    fn test_provider_error_falls_back_to_status() {
        let bodies: [&[u8]; 4] = [b"<html>Bad Gateway</html>", b"", br#"{"detail":"nope"}"#, br#"{"error":["a"]}"#];
        for body in bodies {
            let err = provider_error(502, body);
            assert_eq!(err.to_string(), "HTTP error 502");
            assert_eq!(err.status(), Some(502));
        }
    }

    #[tokio::test]
    async fn test_success_returns_image_and_sends_expected_request() {
        let (url, server) = serve_once("200 OK", "image/png", PNG.to_vec()).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let image = client(&url)
            .generate(&request("a red fox"), ProgressSink::new(1, tx))
            .await
            .unwrap();
        assert_eq!(image.bytes(), &PNG[..]);
        assert_eq!(image.content_type(), Some("image/png"));
        assert_eq!(image.prompt(), "a red fox");

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("post /models/test http/1.1"));
        assert!(raw.contains("authorization: bearer hf_test"));
        assert!(raw.contains("content-type: application/json"));
        assert!(raw.ends_with(r#"{"inputs":"a red fox"}"#));

        let mut last = 0;
        while let Ok(NetworkResponse::Progress { id, bytes_received }) = rx.try_recv() {
            assert_eq!(id, 1);
            last = bytes_received;
        }
        assert_eq!(last, PNG.len());
    }

    #[tokio::test]
    async fn test_json_error_body() {
        let (url, server) = serve_once("400 Bad Request", "application/json", br#"{"error":"X"}"#.to_vec()).await;
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = client(&url).generate(&request("fox"), ProgressSink::new(1, tx)).await.unwrap_err();
        assert_eq!(err, GenerationError::ProviderHttp { status: 400, message: "X".into() });
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unparsable_error_body_mentions_status() {
        let (url, server) = serve_once("503 Service Unavailable", "text/html", b"<h1>down</h1>".to_vec()).await;
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = client(&url).generate(&request("fox"), ProgressSink::new(1, tx)).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_success_body_is_an_error() {
        let (url, server) = serve_once("200 OK", "image/png", Vec::new()).await;
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = client(&url).generate(&request("fox"), ProgressSink::new(1, tx)).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unknown(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_failure_is_unknown_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/models/test", listener.local_addr().unwrap());
        drop(listener);
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = client(&url).generate(&request("fox"), ProgressSink::new(1, tx)).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unknown(_)));
    }
}
