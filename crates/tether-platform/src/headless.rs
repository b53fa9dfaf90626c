//! In-memory capabilities driven by hand.
//!
//! Each type is a cheap handle over shared state: keep a clone to drive the environment
//! (resize the viewport, flip a media query, advance time) while hooks hold another clone
//! through the [`Platform`].
//!
//! ```rust
//! use tether_platform::headless::Headless;
//! use tether_platform::{KeyValueStore, StorageKind};
//!
//! let env = Headless::new();
//! let store = env.platform().storage(StorageKind::Local).unwrap();
//! store.set_item("k", "1").unwrap();
//! assert_eq!(env.local.raw("k").as_deref(), Some("1"));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use slotmap::{SlotMap, new_key_type};
use tether_core::{Dispose, HookError};
use web_time::Duration;

use crate::{
    Coordinates, DocumentTitleSink, ElementRef, GeolocationSource, IntersectionSource,
    KeyValueStore, LocaleRegistry, MediaQuerySource, MockTransport, ObserverOptions, Platform,
    PositionOptions, ScrollPosition, Spawner, Timers, ViewportEventSource, WindowSize,
};

new_key_type! {
    struct ListenerKey;
    struct TimerKey;
}

/// Every headless capability, wired into one [`Platform`].
#[derive(Clone, Default)]
pub struct Headless {
    pub title: MemoryTitle,
    pub local: MemoryStore,
    pub session: MemoryStore,
    pub viewport: FakeViewport,
    pub media: FakeMediaQueries,
    pub intersection: FakeIntersection,
    pub geolocation: FakeGeolocation,
    pub timers: ManualTimers,
    pub executor: LocalExecutor,
    pub http: MockTransport,
    pub locales: LocaleRegistry,
}

impl Headless {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn platform(&self) -> Platform {
        Platform::default()
            .with_title(self.title.clone())
            .with_local_storage(self.local.clone())
            .with_session_storage(self.session.clone())
            .with_viewport(self.viewport.clone())
            .with_media_queries(self.media.clone())
            .with_intersection(self.intersection.clone())
            .with_geolocation(self.geolocation.clone())
            .with_timers(self.timers.clone())
            .with_spawner(self.executor.clone())
            .with_http(self.http.clone())
            .with_locales(self.locales.clone())
    }
}

// Title

#[derive(Clone, Default)]
pub struct MemoryTitle {
    current: Rc<RefCell<Option<String>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryTitle {
    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl DocumentTitleSink for MemoryTitle {
    fn set_title(&self, title: &str) {
        *self.current.borrow_mut() = Some(title.to_owned());
        self.writes.set(self.writes.get() + 1);
    }
}

// Storage

#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryStore {
    /// The stored text, bypassing JSON.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.into(), value.into());
    }

    /// Makes writes and removals fail, as a full or blocked browser store would.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, HookError> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HookError> {
        if self.failing.get() {
            return Err(HookError::Storage(format!("quota exceeded writing '{key}'")));
        }
        self.insert_raw(key, value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), HookError> {
        if self.failing.get() {
            return Err(HookError::Storage(format!("cannot remove '{key}'")));
        }
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

// Viewport

#[derive(Clone, Copy, Default)]
struct ElementBox {
    height: Option<f64>,
    scroll: ScrollPosition,
}

#[derive(Default)]
struct ViewportInner {
    size: Cell<WindowSize>,
    scroll: Cell<ScrollPosition>,
    elements: RefCell<HashMap<ElementRef, ElementBox>>,
    resize_listeners: RefCell<SlotMap<ListenerKey, Rc<dyn Fn()>>>,
    scroll_listeners: RefCell<SlotMap<ListenerKey, (Option<ElementRef>, Rc<dyn Fn()>)>>,
}

#[derive(Clone, Default)]
pub struct FakeViewport {
    inner: Rc<ViewportInner>,
}

impl FakeViewport {
    pub fn resize_to(&self, width: f64, height: f64) {
        self.inner.size.set(WindowSize { width, height });
        let listeners: Vec<_> = self
            .inner
            .resize_listeners
            .borrow()
            .values()
            .cloned()
            .collect();
        for l in listeners {
            l();
        }
    }

    /// Moves the scroll offset of `target` (or the viewport) and fires its scroll event.
    pub fn scroll_to(&self, target: Option<&ElementRef>, x: f64, y: f64) {
        let pos = ScrollPosition { x, y };
        match target {
            Some(el) => {
                self.inner
                    .elements
                    .borrow_mut()
                    .entry(el.clone())
                    .or_default()
                    .scroll = pos;
            }
            None => self.inner.scroll.set(pos),
        }

        let listeners: Vec<_> = self
            .inner
            .scroll_listeners
            .borrow()
            .values()
            .filter(|(t, _)| t.as_ref() == target)
            .map(|(_, l)| l.clone())
            .collect();
        for l in listeners {
            l();
        }
    }

    /// Sets the rendered height; `None` detaches the element.
    pub fn set_element_height(&self, element: &ElementRef, height: Option<f64>) {
        self.inner
            .elements
            .borrow_mut()
            .entry(element.clone())
            .or_default()
            .height = height;
    }

    pub fn resize_listener_count(&self) -> usize {
        self.inner.resize_listeners.borrow().len()
    }

    pub fn scroll_listener_count(&self) -> usize {
        self.inner.scroll_listeners.borrow().len()
    }
}

impl ViewportEventSource for FakeViewport {
    fn window_size(&self) -> WindowSize {
        self.inner.size.get()
    }

    fn scroll_position(&self, target: Option<&ElementRef>) -> ScrollPosition {
        match target {
            Some(el) => self
                .inner
                .elements
                .borrow()
                .get(el)
                .map(|b| b.scroll)
                .unwrap_or_default(),
            None => self.inner.scroll.get(),
        }
    }

    fn element_height(&self, element: &ElementRef) -> Option<f64> {
        self.inner
            .elements
            .borrow()
            .get(element)
            .and_then(|b| b.height)
    }

    fn on_resize(&self, listener: Rc<dyn Fn()>) -> Dispose {
        let key = self.inner.resize_listeners.borrow_mut().insert(listener);
        let inner = self.inner.clone();
        Dispose::new(move || {
            inner.resize_listeners.borrow_mut().remove(key);
        })
    }

    fn on_scroll(&self, target: Option<&ElementRef>, listener: Rc<dyn Fn()>) -> Dispose {
        let key = self
            .inner
            .scroll_listeners
            .borrow_mut()
            .insert((target.cloned(), listener));
        let inner = self.inner.clone();
        Dispose::new(move || {
            inner.scroll_listeners.borrow_mut().remove(key);
        })
    }
}

// Media queries

#[derive(Default)]
struct MediaInner {
    matches: RefCell<HashMap<String, bool>>,
    listeners: RefCell<SlotMap<ListenerKey, (String, Rc<dyn Fn(bool)>)>>,
}

#[derive(Clone, Default)]
pub struct FakeMediaQueries {
    inner: Rc<MediaInner>,
}

impl FakeMediaQueries {
    /// Updates the match state, notifying listeners only when it changes.
    pub fn set_matches(&self, query: &str, matches: bool) {
        let previous = self
            .inner
            .matches
            .borrow_mut()
            .insert(query.to_owned(), matches);
        if previous != Some(matches) {
            self.notify(query, matches);
        }
    }

    /// Updates the match state and always fires a change event.
    pub fn dispatch_change(&self, query: &str, matches: bool) {
        self.inner
            .matches
            .borrow_mut()
            .insert(query.to_owned(), matches);
        self.notify(query, matches);
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self, query: &str, matches: bool) {
        let listeners: Vec<_> = self
            .inner
            .listeners
            .borrow()
            .values()
            .filter(|(q, _)| q == query)
            .map(|(_, l)| l.clone())
            .collect();
        for l in listeners {
            l(matches);
        }
    }
}

impl MediaQuerySource for FakeMediaQueries {
    fn matches(&self, query: &str) -> bool {
        self.inner
            .matches
            .borrow()
            .get(query)
            .copied()
            .unwrap_or(false)
    }

    fn on_change(&self, query: &str, listener: Rc<dyn Fn(bool)>) -> Dispose {
        let key = self
            .inner
            .listeners
            .borrow_mut()
            .insert((query.to_owned(), listener));
        let inner = self.inner.clone();
        Dispose::new(move || {
            inner.listeners.borrow_mut().remove(key);
        })
    }
}

// Intersection

type Observer = (ElementRef, ObserverOptions, Rc<dyn Fn(bool)>);

#[derive(Clone, Default)]
pub struct FakeIntersection {
    observers: Rc<RefCell<SlotMap<ListenerKey, Observer>>>,
}

impl FakeIntersection {
    /// Reports an intersection change for every observer of `element`.
    pub fn set_intersecting(&self, element: &ElementRef, intersecting: bool) {
        let listeners: Vec<_> = self
            .observers
            .borrow()
            .values()
            .filter(|(el, _, _)| el == element)
            .map(|(_, _, l)| l.clone())
            .collect();
        for l in listeners {
            l(intersecting);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn options_for(&self, element: &ElementRef) -> Option<ObserverOptions> {
        self.observers
            .borrow()
            .values()
            .find(|(el, _, _)| el == element)
            .map(|(_, opts, _)| *opts)
    }
}

impl IntersectionSource for FakeIntersection {
    fn observe(
        &self,
        element: &ElementRef,
        options: ObserverOptions,
        listener: Rc<dyn Fn(bool)>,
    ) -> Dispose {
        let key = self
            .observers
            .borrow_mut()
            .insert((element.clone(), options, listener));
        let observers = self.observers.clone();
        Dispose::new(move || {
            observers.borrow_mut().remove(key);
        })
    }
}

// Geolocation

type PositionCallback = Box<dyn FnOnce(Result<Coordinates, String>)>;

#[derive(Default)]
struct GeoInner {
    requests: RefCell<Vec<PositionOptions>>,
    pending: RefCell<Vec<PositionCallback>>,
}

/// Position requests park until [`FakeGeolocation::respond`] answers them.
#[derive(Clone, Default)]
pub struct FakeGeolocation {
    inner: Rc<GeoInner>,
}

impl FakeGeolocation {
    /// Completes every parked request with `result`. Returns how many were answered.
    pub fn respond(&self, result: Result<Coordinates, String>) -> usize {
        let pending = std::mem::take(&mut *self.inner.pending.borrow_mut());
        let n = pending.len();
        for done in pending {
            done(result.clone());
        }
        n
    }

    /// Options of every request received so far.
    pub fn requests(&self) -> Vec<PositionOptions> {
        self.inner.requests.borrow().clone()
    }
}

impl GeolocationSource for FakeGeolocation {
    fn current_position(&self, options: PositionOptions, done: PositionCallback) {
        self.inner.requests.borrow_mut().push(options);
        self.inner.pending.borrow_mut().push(done);
    }
}

// Timers

struct PendingTimer {
    due: Duration,
    seq: u64,
    run: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct TimersInner {
    now: Cell<Duration>,
    seq: Cell<u64>,
    pending: RefCell<SlotMap<TimerKey, PendingTimer>>,
}

/// Virtual clock. Timers fire only inside [`ManualTimers::advance`], in due order.
#[derive(Clone, Default)]
pub struct ManualTimers {
    inner: Rc<TimersInner>,
}

impl ManualTimers {
    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.inner.now.get()
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Moves the clock forward, firing every timer that falls due on the way.
    pub fn advance(&self, by: Duration) {
        let target = self.inner.now.get() + by;
        loop {
            let next = {
                let mut pending = self.inner.pending.borrow_mut();
                let due = pending
                    .iter()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(k, _)| k);
                due.and_then(|k| pending.remove(k))
            };
            let Some(timer) = next else { break };
            self.inner.now.set(timer.due);
            (timer.run)();
        }
        self.inner.now.set(target);
    }
}

impl Timers for ManualTimers {
    fn set_timeout(&self, delay: Duration, f: Box<dyn FnOnce()>) -> Dispose {
        let seq = self.inner.seq.get();
        self.inner.seq.set(seq + 1);
        let key = self.inner.pending.borrow_mut().insert(PendingTimer {
            due: self.inner.now.get() + delay,
            seq,
            run: f,
        });
        let inner = self.inner.clone();
        Dispose::new(move || {
            inner.pending.borrow_mut().remove(key);
        })
    }
}

// Executor

/// Single-threaded executor; spawned tasks progress in [`LocalExecutor::run_until_stalled`].
#[derive(Clone)]
pub struct LocalExecutor {
    pool: Rc<RefCell<LocalPool>>,
    spawner: LocalSpawner,
}

impl Default for LocalExecutor {
    fn default() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: Rc::new(RefCell::new(pool)),
            spawner,
        }
    }
}

impl LocalExecutor {
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl Spawner for LocalExecutor {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(task) {
            log::error!("failed to spawn task: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_fire_in_due_order() {
        let timers = ManualTimers::default();
        let fired = Rc::new(RefCell::new(Vec::new()));

        for (name, ms) in [("late", 30), ("early", 10), ("mid", 20)] {
            let f = fired.clone();
            timers.set_timeout(
                Duration::from_millis(ms),
                Box::new(move || f.borrow_mut().push(name)),
            );
        }

        timers.advance(Duration::from_millis(25));
        assert_eq!(*fired.borrow(), vec!["early", "mid"]);
        assert_eq!(timers.now(), Duration::from_millis(25));

        timers.advance(Duration::from_millis(5));
        assert_eq!(*fired.borrow(), vec!["early", "mid", "late"]);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let timers = ManualTimers::default();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let handle = timers.set_timeout(Duration::from_millis(5), Box::new(move || f.set(true)));
        handle.run();
        timers.advance(Duration::from_millis(10));
        assert!(!fired.get());
    }

    #[test]
    fn test_timer_scheduled_from_timer() {
        let timers = ManualTimers::default();
        let fired = Rc::new(Cell::new(0));
        let (t, f) = (timers.clone(), fired.clone());
        timers.set_timeout(
            Duration::from_millis(5),
            Box::new(move || {
                f.set(f.get() + 1);
                let f = f.clone();
                t.set_timeout(
                    Duration::from_millis(5),
                    Box::new(move || f.set(f.get() + 1)),
                );
            }),
        );
        timers.advance(Duration::from_millis(10));
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_viewport_listeners_filter_by_target() {
        let vp = FakeViewport::default();
        let list = ElementRef::new("list");
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let sub = vp.on_scroll(Some(&list), Rc::new(move || h.set(h.get() + 1)));

        vp.scroll_to(None, 0.0, 100.0);
        vp.scroll_to(Some(&list), 0.0, 40.0);
        assert_eq!(hits.get(), 1);
        assert_eq!(
            vp.scroll_position(Some(&list)),
            ScrollPosition { x: 0.0, y: 40.0 }
        );
        assert_eq!(vp.scroll_position(None).y, 100.0);

        sub.run();
        assert_eq!(vp.scroll_listener_count(), 0);
    }

    #[test]
    fn test_media_set_matches_only_notifies_on_change() {
        let media = FakeMediaQueries::default();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let _sub = media.on_change("(q)", Rc::new(move |_| c.set(c.get() + 1)));

        media.set_matches("(q)", true);
        media.set_matches("(q)", true);
        media.set_matches("(other)", true);
        assert_eq!(calls.get(), 1);
        media.dispatch_change("(q)", true);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failing_store() {
        let store = MemoryStore::default();
        store.set_item("a", "1").unwrap();
        store.set_failing(true);
        assert!(store.set_item("a", "2").is_err());
        assert!(store.remove_item("a").is_err());
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_geolocation_parks_requests() {
        let geo = FakeGeolocation::default();
        let got = Rc::new(RefCell::new(None));
        let g = got.clone();
        geo.current_position(
            PositionOptions::default(),
            Box::new(move |r| *g.borrow_mut() = Some(r)),
        );
        assert!(got.borrow().is_none());
        assert_eq!(geo.respond(Err("denied".into())), 1);
        assert_eq!(*got.borrow(), Some(Err("denied".to_string())));
        assert_eq!(geo.respond(Err("again".into())), 0);
    }

    #[test]
    fn test_executor_runs_spawned_tasks() {
        let exec = LocalExecutor::default();
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        exec.spawn_local(Box::pin(async move { d.set(true) }));
        assert!(!done.get());
        exec.run_until_stalled();
        assert!(done.get());
    }
}
