//! Reqwest-based implementation of the `HttpClient` port trait.
//!
//! Bridges xr-types' `HttpClient` to reqwest. One instance is built at
//! startup and shared by the fetcher, IP discovery and the registrar.

use std::collections::HashMap;
use std::time::Duration;
use xr_types::ports::http::{HttpClient, HttpFuture, HttpMethod, HttpRequest, HttpResponse};
use xr_types::CoreError;

/// Release downloads bounce through a CDN; allow a handful of hops.
const MAX_REDIRECTS: usize = 10;

/// Reqwest-based HTTP client implementing the `HttpClient` port trait.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

fn transport_error(req: &HttpRequest, e: reqwest::Error) -> CoreError {
    if e.is_timeout() {
        CoreError::timeout(format!("{:?} {}", req.method, req.url), req.timeout_secs)
    } else {
        CoreError::io(format!("HTTP request to {} failed: {e}", req.url))
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, req: HttpRequest) -> HttpFuture<'_> {
        Box::pin(async move {
            let method = match req.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
            };

            let mut builder = self.client.request(method, &req.url);
            if req.timeout_secs > 0 {
                builder = builder.timeout(Duration::from_secs(req.timeout_secs));
            }
            for (key, value) in &req.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            if let Some(body) = req.body.clone() {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| transport_error(&req, e))?;
            let status = response.status().as_u16();

            let mut headers = HashMap::new();
            for (name, value) in response.headers() {
                if let Ok(v) = value.to_str() {
                    headers.insert(name.as_str().to_string(), v.to_string());
                }
            }

            let body = response.bytes().await.map_err(|e| transport_error(&req, e))?;

            Ok(HttpResponse {
                status,
                headers,
                body: body.to_vec(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP/1.1 response and hand back the raw
    /// request that was received.
    async fn one_shot(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = sock.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let len = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= head_end + 4 + len {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            sock.write_all(response.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            String::from_utf8_lossy(&buf).into_owned()
        });
        (format!("http://{addr}"), task)
    }

    #[tokio::test]
    async fn get_returns_status_headers_and_body() {
        let (base, server) = one_shot(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 11\r\nConnection: close\r\n\r\n203.0.113.9",
        )
        .await;
        let client = ReqwestHttpClient::new().unwrap();

        let rsp = client.execute(HttpRequest::get(format!("{base}/ip"), 3)).await.unwrap();
        assert_eq!(rsp.status, 200);
        assert_eq!(rsp.text(), "203.0.113.9");
        assert_eq!(rsp.headers.get("content-type").map(String::as_str), Some("text/plain"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /ip HTTP/1.1\r\n"), "{raw}");
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let (base, server) = one_shot(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops",
        )
        .await;
        let client = ReqwestHttpClient::new().unwrap();

        let body = br#"{"name":"HK-VMess-20041","config":"vmess://e30="}"#.to_vec();
        let rsp = client
            .execute(HttpRequest::post_json(format!("{base}/api/nodes"), body, 10))
            .await
            .unwrap();
        assert_eq!(rsp.status, 500);
        assert!(!rsp.is_success());

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/nodes HTTP/1.1\r\n"), "{raw}");
        assert!(raw.to_ascii_lowercase().contains("content-type: application/json"), "{raw}");
        assert!(raw.ends_with(r#"{"name":"HK-VMess-20041","config":"vmess://e30="}"#), "{raw}");
    }

    #[tokio::test]
    async fn connection_refused_is_an_io_error() {
        // Bind then drop to get a port with nothing listening.
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let client = ReqwestHttpClient::new().unwrap();
        let err = client
            .execute(HttpRequest::get(format!("http://{addr}/"), 3))
            .await
            .unwrap_err();
        assert!(!err.is_timeout());
        assert_eq!(err.class(), xr_types::ErrorClass::Io);
    }
}
