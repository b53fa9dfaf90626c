//! HTTP transports: `reqwest` for real traffic, [`MockTransport`] for scripted replies.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use tether_core::HookError;

use crate::HttpTransport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

type Reply = Result<HttpResponse, HookError>;

/// Transport over a shared `reqwest::Client`. On wasm32 the returned futures run on the
/// browser's `fetch`. Native futures need a Tokio reactor, which the headless
/// [`LocalExecutor`](crate::headless::LocalExecutor) does not provide: native hosts using
/// this transport must supply a [`Spawner`](crate::Spawner) that runs inside a Tokio
/// runtime.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn builder(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        builder
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Reply> {
        let builder = self.builder(&request);
        async move {
            let response = builder
                .send()
                .await
                .map_err(|e| HookError::Transport(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HookError::Transport(e.to_string()))?;

            log::debug!("{} {} -> {}", request.method, request.url, status);
            Ok(HttpResponse { status, body })
        }
        .boxed_local()
    }
}

/// Scripted transport. With an automatic reply set, every request resolves immediately;
/// otherwise requests park until [`MockTransport::resolve`] answers them, in any order.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Rc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    auto: RefCell<Option<Reply>>,
    sent: RefCell<Vec<HttpRequest>>,
    parked: RefCell<Vec<Option<oneshot::Sender<Reply>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every following request with `reply`.
    pub fn respond_with(&self, reply: Reply) {
        *self.inner.auto.borrow_mut() = Some(reply);
    }

    /// Park every following request until resolved by hand.
    pub fn hold(&self) {
        *self.inner.auto.borrow_mut() = None;
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.sent.borrow().clone()
    }

    /// Answers the `index`-th request ever sent. Returns false when it was not parked or
    /// its caller went away.
    pub fn resolve(&self, index: usize, reply: Reply) -> bool {
        let tx = self
            .inner
            .parked
            .borrow_mut()
            .get_mut(index)
            .and_then(Option::take);
        match tx {
            Some(tx) => tx.send(reply).is_ok(),
            None => false,
        }
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Reply> {
        self.inner.sent.borrow_mut().push(request);

        let auto = self.inner.auto.borrow().clone();
        if let Some(reply) = auto {
            self.inner.parked.borrow_mut().push(None);
            return future::ready(reply).boxed_local();
        }

        let (tx, rx) = oneshot::channel();
        self.inner.parked.borrow_mut().push(Some(tx));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(HookError::Transport("request abandoned".into())))
        }
        .boxed_local()
    }
}
