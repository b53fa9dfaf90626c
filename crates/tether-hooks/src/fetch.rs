//! JSON requests against a fixed URL.
//!
//! [`use_fetch`] hands back a [`FetchHandle`] exposing `data`, `error` and `loading`
//! plus one trigger per method. Requests overlap freely: whichever resolves last wins,
//! and a failed request leaves earlier data in place.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tether_core::{HookError, Signal, remember, use_state};
use tether_platform::{HttpMethod, HttpRequest, HttpTransport, Platform, platform};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchOptions {
    pub headers: Vec<(String, String)>,
}

impl FetchOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// `content-type: application/json`, overridden or extended by `custom`. Names compare
/// case-insensitively.
pub fn merge_headers(custom: &[(String, String)]) -> Vec<(String, String)> {
    let mut headers = vec![("content-type".to_owned(), "application/json".to_owned())];
    for (name, value) in custom {
        let existing = headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name));
        match existing {
            Some(slot) => *slot = (name.clone(), value.clone()),
            None => headers.push((name.clone(), value.clone())),
        }
    }
    headers
}

/// Request triggers and observable results. `T` is the response type, `B` the body
/// type for POST and PUT.
pub struct FetchHandle<T: 'static, B> {
    data: Signal<Option<T>>,
    error: Signal<Option<String>>,
    loading: Signal<bool>,
    target: Rc<RefCell<(String, FetchOptions)>>,
    platform: Platform,
    _body: PhantomData<fn(&B)>,
}

impl<T: 'static, B> Clone for FetchHandle<T, B> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            loading: self.loading.clone(),
            target: self.target.clone(),
            platform: self.platform.clone(),
            _body: PhantomData,
        }
    }
}

impl<T: DeserializeOwned + 'static, B: Serialize> FetchHandle<T, B> {
    pub fn data(&self) -> Option<T>
    where
        T: Clone,
    {
        self.data.get()
    }

    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    pub fn get(&self) {
        self.spawn(HttpMethod::Get, None);
    }

    pub fn post(&self, body: &B) {
        self.spawn(HttpMethod::Post, Some(body));
    }

    pub fn put(&self, body: &B) {
        self.spawn(HttpMethod::Put, Some(body));
    }

    pub fn delete(&self) {
        self.spawn(HttpMethod::Delete, None);
    }

    /// Starts a request and returns the task completing it. `loading` is raised now and
    /// lowered when the task finishes or is dropped.
    pub fn request(&self, method: HttpMethod, body: Option<&B>) -> LocalBoxFuture<'static, ()> {
        self.loading.set(true);
        self.error.set(None);
        let loading = scopeguard::guard(self.loading.clone(), |l| l.set(false));

        let (url, options) = self.target.borrow().clone();
        let request = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| HookError::Encode(e.to_string()))
            .map(|body| HttpRequest {
                method,
                url,
                headers: merge_headers(&options.headers),
                body,
            });
        let transport = self.platform.http.clone();
        let (data, error) = (self.data.clone(), self.error.clone());

        async move {
            let _loading = loading;
            let result = match (request, transport) {
                (Ok(request), Some(transport)) => perform::<T>(transport, request).await,
                (Err(e), _) => Err(e),
                (_, None) => Err(HookError::Unsupported("HTTP transport")),
            };
            match result {
                Ok(value) => data.set(Some(value)),
                Err(e) => {
                    log::debug!("{method} failed: {e}");
                    error.set(Some(e.to_string()));
                }
            }
        }
        .boxed_local()
    }

    fn spawn(&self, method: HttpMethod, body: Option<&B>) {
        let task = self.request(method, body);
        match &self.platform.spawner {
            Some(spawner) => spawner.spawn_local(task),
            None => {
                drop(task);
                log::warn!(
                    "no task spawner; {method} {} not sent",
                    self.target.borrow().0
                );
                self.error
                    .set(Some(HookError::Unsupported("task spawner").to_string()));
            }
        }
    }
}

async fn perform<T: DeserializeOwned>(
    transport: Rc<dyn HttpTransport>,
    request: HttpRequest,
) -> Result<T, HookError> {
    let response = transport.send(request).await?;
    if !response.is_success() {
        return Err(HookError::HttpStatus(response.status));
    }
    serde_json::from_str(&response.body).map_err(|e| HookError::Decode(e.to_string()))
}

/// Binds a [`FetchHandle`] to `url`. Nothing is sent until a trigger is called; the
/// handle always uses the URL and options of the latest pass.
pub fn use_fetch<T: DeserializeOwned + 'static, B: Serialize>(
    url: &str,
    options: FetchOptions,
) -> FetchHandle<T, B> {
    let data = use_state(|| None::<T>);
    let error = use_state(|| None::<String>);
    let loading = use_state(|| false);
    let target = remember(|| RefCell::new((url.to_owned(), options.clone())));
    *target.borrow_mut() = (url.to_owned(), options);

    FetchHandle {
        data,
        error,
        loading,
        target,
        platform: platform(),
        _body: PhantomData,
    }
}
