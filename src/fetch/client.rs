//! Exa contents API client

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use url::Url;

use super::error::{FetchError, FetchResult};

/// Content-extraction endpoint
pub const EXA_CONTENTS_URL: &str = "https://api.exa.ai/contents";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "EXA_API_KEY";

/// Crawl policy sent with each request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LiveCrawl {
    /// Use cached content, crawl only when nothing is cached
    Fallback,
    /// Always crawl fresh content
    Always,
}

impl LiveCrawl {
    pub fn from_flag(live: bool) -> Self {
        if live {
            Self::Always
        } else {
            Self::Fallback
        }
    }
}

/// Request body for the contents endpoint
#[derive(Debug, Serialize)]
pub struct ContentsRequest<'a> {
    pub urls: Vec<&'a str>,
    pub text: bool,
    pub context: bool,
    pub livecrawl: LiveCrawl,
}

impl<'a> ContentsRequest<'a> {
    pub fn new(url: &'a Url, live: LiveCrawl) -> Self {
        Self {
            urls: vec![url.as_str()],
            text: true,
            context: true,
            livecrawl: live,
        }
    }
}

/// The subset of the response the collector consumes
#[derive(Debug, Default, Deserialize)]
pub struct ContentsResponse {
    #[serde(default)]
    pub context: String,
}

/// Source of extracted page content.
///
/// Returns the raw `context` text for one URL; blank-content checks happen
/// in the caller.
pub trait ContentApi: Send + Sync {
    fn fetch_context(&self, url: &Url, live: LiveCrawl) -> FetchResult<String>;
}

/// Blocking client for the Exa contents endpoint
pub struct ExaClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ExaClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: EXA_CONTENTS_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl ContentApi for ExaClient {
    fn fetch_context(&self, url: &Url, live: LiveCrawl) -> FetchResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&ContentsRequest::new(url, live))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unable to read error message".to_string());
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: ContentsResponse = response.json()?;
        Ok(body.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve one canned response on a local port and hand back the raw
    /// request once it has been answered
    fn serve_once(response: &'static str, delay: Duration) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/contents", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];

            let header_end = loop {
                let n = stream.read(&mut chunk).unwrap();
                assert!(n > 0, "connection closed before headers");
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|value| value.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            while request.len() < header_end + length {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            thread::sleep(delay);
            let _ = stream.write_all(response.as_bytes());
            String::from_utf8_lossy(&request).to_string()
        });

        (endpoint, handle)
    }

    /// Same client as `ExaClient::new`, but never routed through a proxy
    fn client(endpoint: &str, timeout: Duration) -> ExaClient {
        ExaClient {
            client: Client::builder().timeout(timeout).no_proxy().build().unwrap(),
            api_key: "secret-key".to_string(),
            endpoint: EXA_CONTENTS_URL.to_string(),
        }
        .with_endpoint(endpoint)
    }

    fn docs_url() -> Url {
        Url::parse("https://example.com/docs").unwrap()
    }

    #[test]
    fn test_fetch_sends_key_and_json_body() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 41\r\nConnection: close\r\n\r\n{\"results\":[],\"context\":\"page text here\"}",
            Duration::ZERO,
        );

        let context = client(&endpoint, Duration::from_secs(5))
            .fetch_context(&docs_url(), LiveCrawl::Always)
            .unwrap();
        assert_eq!(context, "page text here");

        let request = server.join().unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        let head = head.to_lowercase();
        assert!(head.starts_with("post /contents "));
        assert!(head.contains("x-api-key: secret-key"));
        assert!(head.contains("content-type: application/json"));

        let body: Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            body,
            json!({
                "urls": ["https://example.com/docs"],
                "text": true,
                "context": true,
                "livecrawl": "always",
            })
        );
    }

    #[test]
    fn test_new_targets_exa() {
        let client = ExaClient::new("k", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint, EXA_CONTENTS_URL);
    }

    #[test]
    fn test_error_status_maps_to_upstream() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\nConnection: close\r\n\r\nbusy",
            Duration::ZERO,
        );

        let err = client(&endpoint, Duration::from_secs(5))
            .fetch_context(&docs_url(), LiveCrawl::Fallback)
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Upstream { status: 503, ref body } if body == "busy"
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_malformed_body_maps_to_decode() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 8\r\nConnection: close\r\n\r\nnot json",
            Duration::ZERO,
        );

        let err = client(&endpoint, Duration::from_secs(5))
            .fetch_context(&docs_url(), LiveCrawl::Fallback)
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        server.join().unwrap();
    }

    #[test]
    fn test_slow_endpoint_times_out() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
            Duration::from_millis(1500),
        );

        let err = client(&endpoint, Duration::from_millis(200))
            .fetch_context(&docs_url(), LiveCrawl::Fallback)
            .unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
        server.join().unwrap();
    }

    #[test]
    fn test_request_body_shape() {
        let url = Url::parse("https://example.com/docs").unwrap();
        let body = serde_json::to_value(ContentsRequest::new(&url, LiveCrawl::Fallback)).unwrap();

        assert_eq!(
            body,
            json!({
                "urls": ["https://example.com/docs"],
                "text": true,
                "context": true,
                "livecrawl": "fallback",
            })
        );
    }

    #[test]
    fn test_live_flag_selects_always() {
        assert_eq!(LiveCrawl::from_flag(true), LiveCrawl::Always);
        assert_eq!(LiveCrawl::from_flag(false).as_ref(), "fallback");
        assert_eq!(
            serde_json::to_value(LiveCrawl::Always).unwrap(),
            json!("always")
        );
    }

    #[test]
    fn test_response_without_context_decodes_blank() {
        let response: ContentsResponse =
            serde_json::from_str(r#"{"results": [{"url": "https://example.com"}]}"#).unwrap();
        assert!(response.context.is_empty());
    }
}
