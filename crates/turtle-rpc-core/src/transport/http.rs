use std::error::Error;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::RpcError;

use super::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// [`Transport`] backed by a `reqwest` client.
///
/// Timeouts are explicit: `timeout` bounds the whole round trip and
/// `connect_timeout` bounds connection establishment. Nothing is retried.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, RpcError> {
        if timeout.is_zero() || connect_timeout.is_zero() {
            return Err(RpcError::Config("timeouts must be non-zero".to_owned()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| RpcError::Config(format!("build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Transport using the timeouts carried by `config`.
    pub fn for_config(config: &ConnectionConfig) -> Result<Self, RpcError> {
        Self::new(config.timeout, config.connect_timeout)
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RpcError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(header::ACCEPT, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| {
                RpcError::Transport(format!(
                    "{} {}: {}",
                    request.method,
                    request.url,
                    error_chain(&e)
                ))
            })?;
        let status = response.status().as_u16();

        let body = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(format!("read response body: {}", error_chain(&e))))?;
        debug!(
            http.method = %request.method,
            http.url = %request.url,
            status,
            body_len = body.len(),
            "http response"
        );

        Ok(HttpResponse { status, body })
    }
}

/// `err` followed by each of its causes. reqwest keeps DNS and TLS failures
/// in the source chain, not in its own text.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_timeout() {
        let err = ReqwestTransport::new(Duration::ZERO, Duration::from_secs(1))
            .expect_err("must reject zero timeout");
        assert!(matches!(err, RpcError::Config(_)));
    }

    #[test]
    fn for_config_uses_config_timeouts() {
        let config = ConnectionConfig::daemon_default().with_timeout(Duration::from_secs(5));
        assert!(ReqwestTransport::for_config(&config).is_ok());
    }

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl Error for Layer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.1.as_deref().map(|inner| inner as &(dyn Error + 'static))
        }
    }

    #[test]
    fn error_chain_appends_every_cause() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("dns error: failed to lookup address", None))),
            ))),
        );
        assert_eq!(
            error_chain(&err),
            "error sending request: client error (Connect): dns error: failed to lookup address"
        );
    }

    #[tokio::test]
    async fn unresolvable_host_reports_dns_cause() {
        let transport =
            ReqwestTransport::new(Duration::from_secs(5), Duration::from_secs(2)).expect("client");
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://no-such-host.invalid:11898/getinfo".to_owned(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.send(request).await.expect_err("host does not resolve");
        assert!(err.is_transport(), "got {err:?}");
        assert!(err.to_string().contains("dns error"), "got {err}");
    }
}
