//! HTTP plumbing between the exporter and the ingestion endpoint.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use thiserror::Error;
use tracing::warn;

use crate::{config::HttpConfig, Error};

/// Media type of OTLP protobuf payloads.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";
/// Response header echoing the trace of the ingestion request.
pub const TRACE_RESPONSE_HEADER: &str = "traceresponse";
/// Auth method of profiles that carry ingestion permissions by default.
pub const AUTH_METHOD_AGENT_PRINCIPAL: &str = "agent-principal";

/// Request headers in, response headers out.
#[derive(Debug, Default, Clone)]
pub struct PostOptions {
    pub headers: HeaderMap,
    pub response_headers: HeaderMap,
}

impl PostOptions {
    /// Options for posting an OTLP protobuf payload.
    pub fn protobuf() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(PROTOBUF_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(PROTOBUF_CONTENT_TYPE));
        Self {
            headers,
            response_headers: HeaderMap::new(),
        }
    }

    /// First value of the trace response header, if any.
    pub fn trace_response(&self) -> Option<String> {
        self.response_headers
            .get(TRACE_RESPONSE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    }
}

/// The endpoint answered with a non-success status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("request failed with status {status_code}: {body}")]
pub struct HttpStatusError {
    pub status_code: u16,
    pub body: String,
}

/// Posts a body to a path relative to the tenant's ingestion base URL.
pub trait HttpPost {
    /// Sends `body` with `options.headers`, filling `options.response_headers`
    /// from the response. Non-success statuses come back as
    /// [`Error::HttpStatusError`].
    async fn post(&self, path: &str, body: Vec<u8>, options: &mut PostOptions)
        -> Result<(), Error>;
}

/// Read-only view of the active profile.
pub trait AuthContext {
    fn auth_method(&self) -> &str;
}

impl AuthContext for String {
    fn auth_method(&self) -> &str {
        self
    }
}

impl AuthContext for &str {
    fn auth_method(&self) -> &str {
        self
    }
}

/// Logs a hint when an ingestion request was forbidden and the profile does
/// not use the agent principal auth method. Returns whether it did.
pub fn hint_about_permissions(err: &Error, auth: &impl AuthContext) -> bool {
    let Error::HttpStatusError(status) = err else {
        return false;
    };
    if status.status_code != 403 || auth.auth_method() == AUTH_METHOD_AGENT_PRINCIPAL {
        return false;
    }
    warn!(
        auth_method = auth.auth_method(),
        "Hint: this command requires a profile with ingestion permissions. \
         Usually, this would be a profile that uses the \"{AUTH_METHOD_AGENT_PRINCIPAL}\" auth method; \
         the selected profile uses {:?} instead. In general, any principal with ingestion \
         permissions can be used, regardless of the auth type; these permissions can be \
         assigned by adding the \"iam:agent\" role to a principal using the iam-role-binding command.",
        auth.auth_method()
    );
    true
}

/// [`HttpPost`] over a reqwest client.
pub struct ReqwestPost {
    client: reqwest::Client,
    config: HttpConfig,
}

impl ReqwestPost {
    pub fn new(config: HttpConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl HttpPost for ReqwestPost {
    async fn post(
        &self,
        path: &str,
        body: Vec<u8>,
        options: &mut PostOptions,
    ) -> Result<(), Error> {
        let mut request = self
            .client
            .post(self.url(path))
            .headers(options.headers.clone())
            .body(body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        options.response_headers = response.headers().clone();
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpStatusError {
                status_code: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::LogCapture;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn request_complete(request: &[u8]) -> bool {
        let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= end + 4 + body_len
    }

    /// Serves a single connection with a canned `response`, handing back the
    /// raw request bytes.
    async fn respond_once(
        response: &'static str,
    ) -> std::io::Result<(String, JoinHandle<std::io::Result<Vec<u8>>>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await?;
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&request) {
                let n = stream.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).await?;
            stream.shutdown().await?;
            Ok(request)
        });
        Ok((base_url, server))
    }

    fn forbidden() -> Error {
        HttpStatusError {
            status_code: 403,
            body: "forbidden".to_owned(),
        }
        .into()
    }

    #[test]
    fn test_protobuf_headers() {
        let options = PostOptions::protobuf();
        assert_eq!(options.headers[CONTENT_TYPE], "application/x-protobuf");
        assert_eq!(options.headers[ACCEPT], "application/x-protobuf");
        assert!(options.response_headers.is_empty());
    }

    #[test]
    fn test_trace_response_takes_first_value() {
        let mut options = PostOptions::protobuf();
        options
            .response_headers
            .append("Traceresponse", HeaderValue::from_static("00-first"));
        options
            .response_headers
            .append("Traceresponse", HeaderValue::from_static("00-second"));
        assert_eq!(options.trace_response().as_deref(), Some("00-first"));
    }

    #[test]
    fn test_hint_for_forbidden_non_agent_profile() {
        let logs = LogCapture::default();
        let _guard = logs.install();
        assert!(hint_about_permissions(&forbidden(), &"service-principal"));
        let output = logs.contents();
        assert!(output.contains("iam:agent"), "missing hint in {output}");
        assert!(output.contains("service-principal"));
    }

    #[test]
    fn test_no_hint_for_agent_principal() {
        assert!(!hint_about_permissions(&forbidden(), &AUTH_METHOD_AGENT_PRINCIPAL));
    }

    #[test]
    fn test_no_hint_for_other_statuses() {
        let err: Error = HttpStatusError {
            status_code: 500,
            body: String::new(),
        }
        .into();
        assert!(!hint_about_permissions(&err, &"oauth"));
    }

    #[test]
    fn test_url_joins_base_and_path() -> Result<(), Error> {
        let post = ReqwestPost::new(HttpConfig::new("https://tenant.example.com/"))?;
        assert_eq!(
            post.url("data/v1/metrics"),
            "https://tenant.example.com/data/v1/metrics"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_reqwest_post_maps_forbidden_status() -> TestResult {
        let (base_url, server) = respond_once(
            "HTTP/1.1 403 Forbidden\r\nTraceresponse: 00-x\r\nContent-Length: 4\r\nConnection: close\r\n\r\nnope",
        )
        .await?;
        let post = ReqwestPost::new(HttpConfig {
            token: Some("tok".to_owned()),
            ..HttpConfig::new(base_url)
        })?;
        let mut options = PostOptions::protobuf();

        let result = post
            .post("data/v1/metrics", b"payload".to_vec(), &mut options)
            .await;
        match result {
            Err(Error::HttpStatusError(e)) => {
                assert_eq!(e.status_code, 403);
                assert_eq!(e.body, "nope");
            }
            other => panic!("Expected status error, got {other:?}"),
        }
        assert_eq!(options.trace_response().as_deref(), Some("00-x"));

        let request = server.await??;
        let head = String::from_utf8_lossy(&request).to_ascii_lowercase();
        assert!(head.starts_with("post /data/v1/metrics http/1.1\r\n"), "{head}");
        assert!(head.contains("\r\ncontent-type: application/x-protobuf\r\n"), "{head}");
        assert!(head.contains("\r\naccept: application/x-protobuf\r\n"), "{head}");
        assert!(head.contains("\r\nauthorization: bearer tok\r\n"), "{head}");
        assert!(request.ends_with(b"payload"));
        Ok(())
    }

    #[tokio::test]
    async fn test_reqwest_post_success_without_token() -> TestResult {
        let (base_url, server) = respond_once(
            "HTTP/1.1 202 Accepted\r\nTraceresponse: 00-ok\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await?;
        let post = ReqwestPost::new(HttpConfig::new(format!("{base_url}/")))?;
        let mut options = PostOptions::protobuf();

        post.post("/data/v1/logs", vec![1, 2, 3], &mut options).await?;
        assert_eq!(options.trace_response().as_deref(), Some("00-ok"));

        let request = server.await??;
        let head = String::from_utf8_lossy(&request).to_ascii_lowercase();
        assert!(head.starts_with("post /data/v1/logs http/1.1\r\n"), "{head}");
        assert!(!head.contains("authorization:"), "{head}");
        Ok(())
    }
}
