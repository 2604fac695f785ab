//! 二维码上传到外部图片托管
//!
//! 请求体：`{public_id, folder, content_type, data}`，data 为 base64 的 SVG；
//! 响应中读取 `secure_url`（或 `url`）。

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::{debug, error};
use ureq::Agent;

use super::{QrPublisher, render_qr_svg};
use crate::config::ImageHostConfig;
use crate::errors::{QrShortenError, Result};

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    public_id: String,
    folder: &'a str,
    content_type: &'static str,
    data: String,
}

pub struct ImageHostPublisher {
    agent: Agent,
    upload_url: String,
    api_key: String,
    folder: String,
    qr_size: u32,
}

impl ImageHostPublisher {
    pub fn new(config: &ImageHostConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
            folder: config.folder.clone(),
            qr_size: config.qr_size,
        }
    }

    /// 同步上传，在 spawn_blocking 中调用
    fn upload_sync(agent: Agent, url: String, api_key: String, body: serde_json::Value) -> Result<String> {
        let mut request = agent.post(&url);
        if !api_key.is_empty() {
            request = request.header("Authorization", &format!("Bearer {}", api_key));
        }

        let resp = request
            .send_json(&body)
            .map_err(|e| QrShortenError::upstream(format!("image upload to {} failed: {}", url, e)))?;

        let json: serde_json::Value = resp.into_body().read_json().map_err(|e| {
            QrShortenError::upstream(format!("image host response parse failed: {}", e))
        })?;

        json["secure_url"]
            .as_str()
            .or_else(|| json["url"].as_str())
            .filter(|u| !u.is_empty())
            .map(String::from)
            .ok_or_else(|| QrShortenError::upstream("image host response has no url"))
    }
}

#[async_trait]
impl QrPublisher for ImageHostPublisher {
    async fn publish(&self, short_url: &str, code: &str) -> Result<Option<String>> {
        let svg = render_qr_svg(short_url, self.qr_size)?;
        let body = serde_json::to_value(UploadRequest {
            public_id: format!("qr_{}", code),
            folder: &self.folder,
            content_type: "image/svg+xml",
            data: STANDARD.encode(svg.as_bytes()),
        })?;

        let agent = self.agent.clone();
        let url = self.upload_url.clone();
        let api_key = self.api_key.clone();

        let hosted = tokio::task::spawn_blocking(move || Self::upload_sync(agent, url, api_key, body))
            .await
            .map_err(|e| QrShortenError::upstream(format!("upload task failed: {}", e)))?
            .inspect_err(|e| error!("QR publish for '{}' failed: {}", code, e))?;

        debug!("QR asset for '{}' hosted at {}", code, hosted);
        Ok(Some(hosted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    /// One-shot HTTP server answering with `status` and `body`; returns the
    /// base URL and a channel yielding the raw request.
    fn serve_once(status: u16, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let chunked = text[..end]
                        .to_ascii_lowercase()
                        .contains("transfer-encoding: chunked");
                    if chunked {
                        if text.ends_with("0\r\n\r\n") {
                            break;
                        }
                        continue;
                    }
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            tx.send(String::from_utf8_lossy(&buf).to_string()).unwrap();

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        (format!("http://{}/upload", addr), rx)
    }

    fn publisher(upload_url: String) -> ImageHostPublisher {
        ImageHostPublisher::new(&ImageHostConfig {
            enabled: true,
            upload_url,
            api_key: "k3y".to_string(),
            folder: "qr_codes".to_string(),
            timeout_secs: 5,
            qr_size: 128,
        })
    }

    #[tokio::test]
    async fn test_publish_returns_secure_url() {
        let (url, requests) =
            serve_once(200, r#"{"secure_url":"https://img.example.com/qr_codes/qr_abc.svg"}"#);

        let hosted = publisher(url)
            .publish("http://localhost:8080/abc", "abc")
            .await
            .unwrap();
        assert_eq!(
            hosted.as_deref(),
            Some("https://img.example.com/qr_codes/qr_abc.svg")
        );

        let raw = requests.recv().unwrap();
        assert!(raw.starts_with("POST /upload"));
        assert!(raw.to_ascii_lowercase().contains("authorization: bearer k3y"));
        assert!(raw.contains(r#""public_id":"qr_abc""#));
        assert!(raw.contains(r#""folder":"qr_codes""#));
    }

    #[tokio::test]
    async fn test_publish_falls_back_to_url_field() {
        let (url, _requests) = serve_once(200, r#"{"url":"http://img.example.com/qr_x.svg"}"#);

        let hosted = publisher(url).publish("http://s/x", "x").await.unwrap();
        assert_eq!(hosted.as_deref(), Some("http://img.example.com/qr_x.svg"));
    }

    #[tokio::test]
    async fn test_publish_server_error_is_upstream() {
        let (url, _requests) = serve_once(503, r#"{"error":"busy"}"#);

        let err = publisher(url).publish("http://s/x", "x").await.unwrap_err();
        assert!(matches!(err, QrShortenError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_publish_missing_url_is_upstream() {
        let (url, _requests) = serve_once(200, r#"{"ok":true}"#);

        let err = publisher(url).publish("http://s/x", "x").await.unwrap_err();
        assert!(matches!(err, QrShortenError::Upstream(_)));
    }
}
