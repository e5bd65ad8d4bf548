use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::RpcError;

use super::{HttpRequest, HttpResponse, Transport};

/// A fake transport for unit tests. Records every request it is handed and
/// replays canned responses in order; once the queue is drained it answers
/// with the fallback response.
pub struct MockTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
    fallback: HttpResponse,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            responses: VecDeque::new(),
            fallback: HttpResponse {
                status: 200,
                body: "{}".to_owned(),
            },
        }
    }

    /// A transport that answers every request with `200 {}`.
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::builder().build())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests()
            .pop()
            .expect("mock transport received no request")
    }

    /// The last request body parsed as JSON.
    pub fn last_body(&self) -> serde_json::Value {
        let body = self
            .last_request()
            .body
            .expect("last request carried no body");
        serde_json::from_str(&body).expect("request body must be JSON")
    }
}

pub struct MockTransportBuilder {
    responses: VecDeque<Result<HttpResponse, String>>,
    fallback: HttpResponse,
}

impl MockTransportBuilder {
    pub fn respond(mut self, status: u16, body: &str) -> Self {
        self.responses.push_back(Ok(HttpResponse {
            status,
            body: body.to_owned(),
        }));
        self
    }

    pub fn fail(mut self, message: &str) -> Self {
        self.responses.push_back(Err(message.to_owned()));
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(self.responses),
            fallback: self.fallback,
        }
    }

    pub fn build_arc(self) -> Arc<MockTransport> {
        Arc::new(self.build())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RpcError> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request);
        let next = self
            .responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(RpcError::Transport(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpMethod;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn replays_queue_then_fallback() {
        let mock = MockTransport::builder()
            .respond(404, "")
            .fail("connection refused")
            .build();

        let first = mock.send(get("http://a/1")).await.expect("canned response");
        assert_eq!(first.status, 404);
        let second = mock.send(get("http://a/2")).await.expect_err("canned failure");
        assert!(second.is_transport());
        let third = mock.send(get("http://a/3")).await.expect("fallback");
        assert_eq!(third.status, 200);

        let urls: Vec<_> = mock.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["http://a/1", "http://a/2", "http://a/3"]);
    }
}
