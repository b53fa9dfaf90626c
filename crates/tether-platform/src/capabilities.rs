//! Capability interfaces standing in for the browser globals hooks talk to.
//!
//! Every registration returns a [`Dispose`]; hooks hand it to their binding so the
//! listener is released on unmount.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use tether_core::{Dispose, HookError};
use web_time::Duration;

use crate::http::{HttpRequest, HttpResponse};

/// Opaque handle to a rendered element. The browser backend resolves it by DOM id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementRef(Rc<str>);

impl ElementRef {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Rc::from(id.as_ref()))
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Geolocation request parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub maximum_age: Duration,
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Intersection observer parameters: visible fraction and top margin in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin: f64,
}

/// Which key-value namespace a stored value lives in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Survives restarts (`localStorage`).
    #[default]
    Local,
    /// Cleared with the session (`sessionStorage`).
    Session,
}

pub trait DocumentTitleSink {
    fn set_title(&self, title: &str);
}

pub trait GeolocationSource {
    /// One position request. `done` receives the coordinates or the failure message.
    fn current_position(
        &self,
        options: PositionOptions,
        done: Box<dyn FnOnce(Result<Coordinates, String>)>,
    );
}

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, HookError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), HookError>;
    fn remove_item(&self, key: &str) -> Result<(), HookError>;
}

pub trait ViewportEventSource {
    fn window_size(&self) -> WindowSize;
    /// Scroll offsets of `target`, or of the whole viewport for `None`.
    fn scroll_position(&self, target: Option<&ElementRef>) -> ScrollPosition;
    /// Rendered block height, `None` when the element is not attached.
    fn element_height(&self, element: &ElementRef) -> Option<f64>;
    fn on_resize(&self, listener: Rc<dyn Fn()>) -> Dispose;
    fn on_scroll(&self, target: Option<&ElementRef>, listener: Rc<dyn Fn()>) -> Dispose;
}

pub trait MediaQuerySource {
    fn matches(&self, query: &str) -> bool;
    fn on_change(&self, query: &str, listener: Rc<dyn Fn(bool)>) -> Dispose;
}

pub trait IntersectionSource {
    /// Calls `listener` with the intersecting flag on every observed change.
    fn observe(
        &self,
        element: &ElementRef,
        options: ObserverOptions,
        listener: Rc<dyn Fn(bool)>,
    ) -> Dispose;
}

pub trait Timers {
    /// Runs `f` once after `delay` unless the returned handle is disposed first.
    fn set_timeout(&self, delay: Duration, f: Box<dyn FnOnce()>) -> Dispose;
}

/// Drives futures on the UI thread.
pub trait Spawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}

pub trait HttpTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> LocalBoxFuture<'static, Result<HttpResponse, HookError>>;
}

pub trait LocaleSource {
    /// Dictionary for the triple, `None` when nothing is registered.
    fn resolve(
        &self,
        module: &str,
        route: &str,
        locale: &str,
    ) -> LocalBoxFuture<'static, Option<serde_json::Value>>;
}
