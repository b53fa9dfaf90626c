//! # Platform capabilities
//!
//! Hooks never touch `window`, `document` or `navigator` directly. They ask the
//! [`Platform`] provided around the current render pass for a capability, and treat a
//! missing one as "not available in this execution context":
//!
//! ```rust
//! use tether_platform::*;
//!
//! let headless = headless::Headless::new();
//! with_platform(headless.platform(), || {
//!     let p = platform();
//!     assert!(p.title.is_some());
//!     assert!(p.storage(StorageKind::Session).is_some());
//! });
//!
//! // Outside of `with_platform` nothing is available.
//! assert!(platform().viewport.is_none());
//! ```
//!
//! Backends:
//!
//! - [`headless`]: in-memory capabilities driven by hand (tests, demos, native hosts).
//! - `web` (wasm32 only): `web-sys` implementations, see `web::browser_platform`.
//! - [`http::ReqwestTransport`]: real HTTP on either target.

use std::rc::Rc;

pub mod capabilities;
pub mod headless;
pub mod http;
pub mod locale;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use capabilities::*;
pub use http::{HttpMethod, HttpRequest, HttpResponse, MockTransport, ReqwestTransport};
pub use locale::{LocaleRegistry, is_empty_dictionary};

/// Capability bundle. Cloning shares the underlying implementations.
#[derive(Clone, Default)]
pub struct Platform {
    pub title: Option<Rc<dyn DocumentTitleSink>>,
    pub geolocation: Option<Rc<dyn GeolocationSource>>,
    pub local_storage: Option<Rc<dyn KeyValueStore>>,
    pub session_storage: Option<Rc<dyn KeyValueStore>>,
    pub viewport: Option<Rc<dyn ViewportEventSource>>,
    pub media: Option<Rc<dyn MediaQuerySource>>,
    pub intersection: Option<Rc<dyn IntersectionSource>>,
    pub timers: Option<Rc<dyn Timers>>,
    pub spawner: Option<Rc<dyn Spawner>>,
    pub http: Option<Rc<dyn HttpTransport>>,
    pub locales: Option<Rc<dyn LocaleSource>>,
}

impl Platform {
    pub fn with_title(mut self, sink: impl DocumentTitleSink + 'static) -> Self {
        self.title = Some(Rc::new(sink));
        self
    }

    pub fn with_geolocation(mut self, source: impl GeolocationSource + 'static) -> Self {
        self.geolocation = Some(Rc::new(source));
        self
    }

    pub fn with_local_storage(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.local_storage = Some(Rc::new(store));
        self
    }

    pub fn with_session_storage(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.session_storage = Some(Rc::new(store));
        self
    }

    pub fn with_viewport(mut self, viewport: impl ViewportEventSource + 'static) -> Self {
        self.viewport = Some(Rc::new(viewport));
        self
    }

    pub fn with_media_queries(mut self, media: impl MediaQuerySource + 'static) -> Self {
        self.media = Some(Rc::new(media));
        self
    }

    pub fn with_intersection(mut self, source: impl IntersectionSource + 'static) -> Self {
        self.intersection = Some(Rc::new(source));
        self
    }

    pub fn with_timers(mut self, timers: impl Timers + 'static) -> Self {
        self.timers = Some(Rc::new(timers));
        self
    }

    pub fn with_spawner(mut self, spawner: impl Spawner + 'static) -> Self {
        self.spawner = Some(Rc::new(spawner));
        self
    }

    pub fn with_http(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.http = Some(Rc::new(transport));
        self
    }

    pub fn with_locales(mut self, source: impl LocaleSource + 'static) -> Self {
        self.locales = Some(Rc::new(source));
        self
    }

    pub fn storage(&self, kind: StorageKind) -> Option<Rc<dyn KeyValueStore>> {
        match kind {
            StorageKind::Local => self.local_storage.clone(),
            StorageKind::Session => self.session_storage.clone(),
        }
    }
}

/// Makes `platform` the capability bundle for hooks composed inside `f`.
pub fn with_platform<R>(platform: Platform, f: impl FnOnce() -> R) -> R {
    tether_core::provide(platform, f)
}

/// The innermost provided bundle; empty outside of [`with_platform`].
pub fn platform() -> Platform {
    tether_core::local::<Platform>().unwrap_or_default()
}
