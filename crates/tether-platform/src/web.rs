//! Browser capabilities (wasm32) over `web-sys`. Elements are looked up by DOM id.
use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use tether_core::{Dispose, HookError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_time::Duration;

use crate::*;

/// Routes `log` records to the browser console and panics to `console.error`.
pub fn init_logging(level: log::Level) {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    let _ = console_log::init_with_level(level);
}

/// Every capability the current browser offers. Locale sources are app-specific and must
/// be added with [`Platform::with_locales`].
pub fn browser_platform() -> Platform {
    let Some(window) = web_sys::window() else {
        log::warn!("no window object; hooks run without browser capabilities");
        return Platform::default();
    };

    let mut platform = Platform::default()
        .with_title(WebDocument)
        .with_viewport(WebViewport)
        .with_media_queries(WebMediaQueries)
        .with_intersection(WebIntersection)
        .with_timers(WebTimers)
        .with_spawner(WebSpawner)
        .with_http(ReqwestTransport::new());

    match window.local_storage() {
        Ok(Some(s)) => platform = platform.with_local_storage(WebStorage(s)),
        _ => log::warn!("localStorage unavailable"),
    }
    match window.session_storage() {
        Ok(Some(s)) => platform = platform.with_session_storage(WebStorage(s)),
        _ => log::warn!("sessionStorage unavailable"),
    }
    match window.navigator().geolocation() {
        Ok(g) => platform = platform.with_geolocation(WebGeolocation(g)),
        Err(_) => log::info!("geolocation unavailable"),
    }

    platform
}

fn js_message(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn element(el: &ElementRef) -> Option<web_sys::Element> {
    web_sys::window()?.document()?.get_element_by_id(el.id())
}

fn js_fn<T: ?Sized>(closure: &Closure<T>) -> &js_sys::Function {
    closure.as_ref().unchecked_ref()
}

fn listen(target: web_sys::EventTarget, event: &'static str, listener: Rc<dyn Fn()>) -> Dispose {
    let closure = Closure::<dyn Fn()>::new(move || listener());
    if let Err(e) = target.add_event_listener_with_callback(event, js_fn(&closure)) {
        log::error!("addEventListener({event}) failed: {}", js_message(&e));
        return Dispose::noop();
    }
    Dispose::new(move || {
        let _ = target.remove_event_listener_with_callback(event, js_fn(&closure));
        drop(closure);
    })
}

pub struct WebDocument;

impl DocumentTitleSink for WebDocument {
    fn set_title(&self, title: &str) {
        if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
            doc.set_title(title);
        }
    }
}

pub struct WebStorage(pub web_sys::Storage);

impl KeyValueStore for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HookError> {
        self.0
            .get_item(key)
            .map_err(|e| HookError::Storage(js_message(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HookError> {
        self.0
            .set_item(key, value)
            .map_err(|e| HookError::Storage(js_message(&e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), HookError> {
        self.0
            .remove_item(key)
            .map_err(|e| HookError::Storage(js_message(&e)))
    }
}

pub struct WebViewport;

impl ViewportEventSource for WebViewport {
    fn window_size(&self) -> WindowSize {
        let Some(w) = web_sys::window() else {
            return WindowSize::default();
        };
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        WindowSize {
            width: dim(w.inner_width()),
            height: dim(w.inner_height()),
        }
    }

    fn scroll_position(&self, target: Option<&ElementRef>) -> ScrollPosition {
        match target {
            Some(el) => element(el)
                .map(|e| ScrollPosition {
                    x: e.scroll_left() as f64,
                    y: e.scroll_top() as f64,
                })
                .unwrap_or_default(),
            None => web_sys::window()
                .map(|w| ScrollPosition {
                    x: w.scroll_x().unwrap_or(0.0),
                    y: w.scroll_y().unwrap_or(0.0),
                })
                .unwrap_or_default(),
        }
    }

    fn element_height(&self, el: &ElementRef) -> Option<f64> {
        let html: web_sys::HtmlElement = element(el)?.dyn_into().ok()?;
        Some(html.offset_height() as f64)
    }

    fn on_resize(&self, listener: Rc<dyn Fn()>) -> Dispose {
        match web_sys::window() {
            Some(w) => listen(w.into(), "resize", listener),
            None => Dispose::noop(),
        }
    }

    fn on_scroll(&self, target: Option<&ElementRef>, listener: Rc<dyn Fn()>) -> Dispose {
        let event_target: Option<web_sys::EventTarget> = match target {
            Some(el) => element(el).map(Into::into),
            None => web_sys::window().map(Into::into),
        };
        match event_target {
            Some(t) => listen(t, "scroll", listener),
            None => {
                log::warn!("scroll target {target:?} not found");
                Dispose::noop()
            }
        }
    }
}

pub struct WebMediaQueries;

impl WebMediaQueries {
    fn list(query: &str) -> Option<web_sys::MediaQueryList> {
        web_sys::window()?.match_media(query).ok().flatten()
    }
}

impl MediaQuerySource for WebMediaQueries {
    fn matches(&self, query: &str) -> bool {
        Self::list(query).is_some_and(|l| l.matches())
    }

    fn on_change(&self, query: &str, listener: Rc<dyn Fn(bool)>) -> Dispose {
        let Some(list) = Self::list(query) else {
            return Dispose::noop();
        };
        let closure = Closure::<dyn Fn(web_sys::MediaQueryListEvent)>::new(
            move |ev: web_sys::MediaQueryListEvent| listener(ev.matches()),
        );
        if let Err(e) = list.add_event_listener_with_callback("change", js_fn(&closure)) {
            log::error!("matchMedia listener failed: {}", js_message(&e));
            return Dispose::noop();
        }
        Dispose::new(move || {
            let _ = list.remove_event_listener_with_callback("change", js_fn(&closure));
            drop(closure);
        })
    }
}

pub struct WebIntersection;

impl IntersectionSource for WebIntersection {
    fn observe(
        &self,
        el: &ElementRef,
        options: ObserverOptions,
        listener: Rc<dyn Fn(bool)>,
    ) -> Dispose {
        let Some(target) = element(el) else {
            log::warn!("intersection target '{}' not found", el.id());
            return Dispose::noop();
        };

        let closure = Closure::<dyn Fn(js_sys::Array)>::new(move |entries: js_sys::Array| {
            if let Some(entry) = entries.iter().last() {
                let entry: web_sys::IntersectionObserverEntry = entry.unchecked_into();
                listener(entry.is_intersecting());
            }
        });

        let init = web_sys::IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&format!("{}px 0px 0px 0px", options.root_margin));

        let observer = match web_sys::IntersectionObserver::new_with_options(
            js_fn(&closure),
            &init,
        ) {
            Ok(o) => o,
            Err(e) => {
                log::error!("IntersectionObserver failed: {}", js_message(&e));
                return Dispose::noop();
            }
        };
        observer.observe(&target);

        Dispose::new(move || {
            observer.unobserve(&target);
            observer.disconnect();
            drop(closure);
        })
    }
}

pub struct WebGeolocation(pub web_sys::Geolocation);

impl GeolocationSource for WebGeolocation {
    fn current_position(
        &self,
        options: PositionOptions,
        done: Box<dyn FnOnce(Result<Coordinates, String>)>,
    ) {
        let done = Rc::new(RefCell::new(Some(done)));
        let finish = move |result: Result<Coordinates, String>| {
            if let Some(done) = done.borrow_mut().take() {
                done(result);
            }
        };

        let on_ok = {
            let finish = finish.clone();
            Closure::once_into_js(move |pos: web_sys::GeolocationPosition| {
                let c = pos.coords();
                finish(Ok(Coordinates {
                    lat: c.latitude(),
                    lng: c.longitude(),
                }));
            })
        };
        let on_err = {
            let finish = finish.clone();
            Closure::once_into_js(move |err: web_sys::GeolocationPositionError| {
                finish(Err(err.message()));
            })
        };

        let opts = web_sys::PositionOptions::new();
        opts.set_enable_high_accuracy(options.enable_high_accuracy);
        opts.set_maximum_age(options.maximum_age.as_millis() as u32);
        opts.set_timeout(options.timeout.as_millis() as u32);

        if let Err(e) = self.0.get_current_position_with_error_callback_and_options(
            on_ok.unchecked_ref(),
            Some(on_err.unchecked_ref()),
            &opts,
        ) {
            finish(Err(js_message(&e)));
        }
    }
}

pub struct WebTimers;

impl Timers for WebTimers {
    fn set_timeout(&self, delay: Duration, f: Box<dyn FnOnce()>) -> Dispose {
        let Some(window) = web_sys::window() else {
            return Dispose::noop();
        };
        let closure = Closure::once(move || f());
        let handle = match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            js_fn(&closure),
            delay.as_millis().min(i32::MAX as u128) as i32,
        ) {
            Ok(h) => h,
            Err(e) => {
                log::error!("setTimeout failed: {}", js_message(&e));
                return Dispose::noop();
            }
        };
        Dispose::new(move || {
            window.clear_timeout_with_handle(handle);
            drop(closure);
        })
    }
}

pub struct WebSpawner;

impl Spawner for WebSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
