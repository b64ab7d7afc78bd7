//! HTTP implementation of the enhancement client.

use super::{EnhanceError, Enhancer};
use crate::config::EndpointConfig;
use crate::protocol::{EnhanceRequest, Reply};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Posts enhancement requests to a fixed JSON endpoint.
pub struct HttpEnhancer {
    url: String,
    client: Client,
}

impl HttpEnhancer {
    /// Create a new client for the configured endpoint.
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            url: config.url(),
            client,
        })
    }

    /// The URL requests are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Enhancer for HttpEnhancer {
    async fn enhance(&self, text: &str, label: &str, prompt: &str) -> Result<Reply, EnhanceError> {
        let request = EnhanceRequest::new(text, label, prompt);
        debug!(url = %self.url, action = label, chars = text.len(), "Sending enhancement request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnhanceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let reply = Reply::decode(&body)?;
        debug!(?status, enhanced = matches!(reply, Reply::Enhanced(_)), "Enhancement response decoded");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve exactly one canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &str, body: &str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            let _ = tx.send(request);
        });

        (format!("http://{}", addr), rx)
    }

    /// Read headers plus a Content-Length body.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn endpoint(base_url: String) -> EndpointConfig {
        EndpointConfig {
            base_url,
            timeout_secs: 5,
            ..EndpointConfig::default()
        }
    }

    #[tokio::test]
    async fn test_enhanced_text() {
        let (base, request) = serve_once("200 OK", r#"{"enhancedText":"I have an apple."}"#).await;
        let client = HttpEnhancer::new(&endpoint(base)).unwrap();

        let reply = client
            .enhance("I has a apple.", "Fix Grammar", "Fix it:")
            .await
            .unwrap();
        assert_eq!(reply, Reply::Enhanced("I have an apple.".to_string()));

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /api/enhance-text HTTP/1.1"));
        let body = raw.split("\r\n\r\n").nth(1).unwrap();
        let sent: EnhanceRequest = serde_json::from_str(body).unwrap();
        assert_eq!(sent, EnhanceRequest::new("I has a apple.", "Fix Grammar", "Fix it:"));
    }

    #[tokio::test]
    async fn test_zero_timeout_still_sends() {
        let (base, _request) = serve_once("200 OK", r#"{"enhancedText":"done"}"#).await;
        let config = EndpointConfig {
            timeout_secs: 0,
            ..endpoint(base)
        };
        let client = HttpEnhancer::new(&config).unwrap();

        let reply = client.enhance("ok", "Expand", "Expand:").await.unwrap();
        assert_eq!(reply, Reply::Enhanced("done".to_string()));
    }

    #[tokio::test]
    async fn test_missing_field() {
        let (base, _request) = serve_once("200 OK", r#"{"status":"ok"}"#).await;
        let client = HttpEnhancer::new(&endpoint(base)).unwrap();

        let reply = client.enhance("ok", "Expand", "Expand:").await.unwrap();
        assert_eq!(reply, Reply::Missing);
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let (base, _request) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let client = HttpEnhancer::new(&endpoint(base)).unwrap();

        let err = client.enhance("ok", "Expand", "Expand:").await.unwrap_err();
        assert!(matches!(err, EnhanceError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (base, _request) = serve_once("200 OK", "not json").await;
        let client = HttpEnhancer::new(&endpoint(base)).unwrap();

        let err = client.enhance("ok", "Expand", "Expand:").await.unwrap_err();
        assert!(matches!(err, EnhanceError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Bind then drop to get a port nobody is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpEnhancer::new(&endpoint(format!("http://{}", addr))).unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            client.enhance("ok", "Expand", "Expand:"),
        )
        .await
        .unwrap();
        assert!(matches!(result, Err(EnhanceError::Transport(_))));
    }
}
