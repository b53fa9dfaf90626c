//! Element visibility through an intersection observer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tether_core::{Dispose, HookError, disposable_effect, remember, use_state};
use tether_platform::{ElementRef, ObserverOptions, platform};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VisibilityOptions {
    /// Fraction of the element that must be visible, in `[0, 1]`.
    pub threshold: f64,
    /// Top margin of the observation root, in pixels. Must be finite.
    pub root_margin: f64,
}

impl VisibilityOptions {
    pub fn validate(&self) -> Result<ObserverOptions, HookError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(HookError::InvalidThreshold(self.threshold));
        }
        if !self.root_margin.is_finite() {
            return Err(HookError::InvalidRootMargin(self.root_margin));
        }
        Ok(ObserverOptions {
            threshold: self.threshold,
            root_margin: self.root_margin,
        })
    }
}

type ChangeCallback = Rc<dyn Fn(bool, &ElementRef)>;
type ElementCallback = Rc<dyn Fn(&ElementRef)>;

/// Optional notifications. The latest set passed to the hook is the one invoked.
#[derive(Clone, Default)]
pub struct VisibilityCallbacks {
    on_change_visibility: Option<ChangeCallback>,
    on_trigger_enter: Option<ElementCallback>,
    on_trigger_exit: Option<ElementCallback>,
    on_first_visible: Option<ElementCallback>,
}

impl VisibilityCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every visibility report, with the new state.
    pub fn on_change_visibility(mut self, f: impl Fn(bool, &ElementRef) + 'static) -> Self {
        self.on_change_visibility = Some(Rc::new(f));
        self
    }

    pub fn on_trigger_enter(mut self, f: impl Fn(&ElementRef) + 'static) -> Self {
        self.on_trigger_enter = Some(Rc::new(f));
        self
    }

    pub fn on_trigger_exit(mut self, f: impl Fn(&ElementRef) + 'static) -> Self {
        self.on_trigger_exit = Some(Rc::new(f));
        self
    }

    /// At most once per mounted hook.
    pub fn on_first_visible(mut self, f: impl Fn(&ElementRef) + 'static) -> Self {
        self.on_first_visible = Some(Rc::new(f));
        self
    }

    fn dispatch(&self, visible: bool, element: &ElementRef, first: bool) {
        if visible {
            if let Some(f) = &self.on_trigger_enter {
                f(element);
            }
            if first && let Some(f) = &self.on_first_visible {
                f(element);
            }
        } else if let Some(f) = &self.on_trigger_exit {
            f(element);
        }
        if let Some(f) = &self.on_change_visibility {
            f(visible, element);
        }
    }
}

/// Tracks whether `element` is on screen.
///
/// An out-of-range threshold is reported as [`HookError::InvalidThreshold`] and nothing
/// is observed. The observer is re-created when the element or options change and
/// released on unmount.
pub fn use_element_visibility(
    element: &ElementRef,
    options: VisibilityOptions,
    callbacks: VisibilityCallbacks,
) -> Result<bool, HookError> {
    let validated = options.validate();
    let visible = use_state(|| false);
    let seen = remember(|| Cell::new(false));
    let latest = remember(|| RefCell::new(VisibilityCallbacks::default()));
    *latest.borrow_mut() = callbacks;

    let source = platform().intersection;
    let observed = validated.clone().ok();
    let (state, element) = (visible.clone(), element.clone());
    disposable_effect((element.clone(), observed), move || {
        let (Some(options), Some(source)) = (observed, source) else {
            return Dispose::noop();
        };
        let target = element.clone();
        source.observe(
            &element,
            options,
            Rc::new(move |is_visible| {
                state.set_if_changed(is_visible);
                let first = is_visible && !seen.replace(true);
                let callbacks = latest.borrow().clone();
                callbacks.dispatch(is_visible, &target, first);
            }),
        )
    });

    validated?;
    Ok(visible.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&ElementRef) + 'static) {
        let n = Rc::new(Cell::new(0));
        let m = n.clone();
        (n, move |_: &ElementRef| m.set(m.get() + 1))
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let h = Harness::new();
        let el = ElementRef::new("hero");
        for threshold in [1.5, -0.1, f64::NAN] {
            let opts = VisibilityOptions {
                threshold,
                ..Default::default()
            };
            let err = h
                .render(|| use_element_visibility(&el, opts, VisibilityCallbacks::new()))
                .unwrap_err();
            assert!(matches!(err, HookError::InvalidThreshold(_)));
        }
        assert_eq!(h.env.intersection.observer_count(), 0);

        let opts = VisibilityOptions {
            threshold: 1.5,
            root_margin: 0.0,
        };
        insta::assert_snapshot!(
            opts.validate().unwrap_err(),
            @"threshold must be between 0 and 1 (got 1.5)"
        );
    }

    #[test]
    fn test_non_finite_margin_is_rejected_without_churn() {
        let h = Harness::new();
        let el = ElementRef::new("hero");
        let opts = VisibilityOptions {
            threshold: 0.5,
            root_margin: f64::NAN,
        };
        for _ in 0..3 {
            let err = h
                .render(|| use_element_visibility(&el, opts, VisibilityCallbacks::new()))
                .unwrap_err();
            assert!(matches!(err, HookError::InvalidRootMargin(_)));
        }
        assert_eq!(h.env.intersection.observer_count(), 0);

        let opts = VisibilityOptions {
            root_margin: f64::INFINITY,
            ..opts
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_first_visible_fires_once() {
        let h = Harness::new();
        let el = ElementRef::new("card");
        let (firsts, on_first) = counter();
        let (enters, on_enter) = counter();
        let (exits, on_exit) = counter();
        let callbacks = VisibilityCallbacks::new()
            .on_first_visible(on_first)
            .on_trigger_enter(on_enter)
            .on_trigger_exit(on_exit);

        let opts = VisibilityOptions::default();
        assert_eq!(
            h.render(|| use_element_visibility(&el, opts, callbacks.clone())),
            Ok(false)
        );

        for _ in 0..3 {
            h.env.intersection.set_intersecting(&el, true);
            h.env.intersection.set_intersecting(&el, false);
        }
        assert_eq!(firsts.get(), 1);
        assert_eq!(enters.get(), 3);
        assert_eq!(exits.get(), 3);

        h.env.intersection.set_intersecting(&el, true);
        assert!(h.binding.take_dirty());
        assert_eq!(
            h.render(|| use_element_visibility(&el, opts, callbacks.clone())),
            Ok(true)
        );
    }

    #[test]
    fn test_latest_callbacks_are_used() {
        let h = Harness::new();
        let el = ElementRef::new("row");
        let log = Rc::new(RefCell::new(Vec::new()));
        let opts = VisibilityOptions::default();

        for tag in ["first", "second"] {
            let log = log.clone();
            let callbacks = VisibilityCallbacks::new().on_change_visibility(move |v, el| {
                log.borrow_mut().push(format!("{tag}:{v}:{}", el.id()));
            });
            let visible = h.render(|| use_element_visibility(&el, opts, callbacks));
            assert_eq!(visible, Ok(false));
        }
        h.env.intersection.set_intersecting(&el, true);
        assert_eq!(*log.borrow(), ["second:true:row"]);
        assert_eq!(h.env.intersection.observer_count(), 1);
    }

    #[test]
    fn test_options_reach_observer_and_unmount_releases() {
        let h = Harness::new();
        let el = ElementRef::new("footer");
        let opts = VisibilityOptions {
            threshold: 0.5,
            root_margin: 24.0,
        };
        h.render(|| use_element_visibility(&el, opts, VisibilityCallbacks::new()))
            .unwrap();
        assert_eq!(
            h.env.intersection.options_for(&el),
            Some(ObserverOptions {
                threshold: 0.5,
                root_margin: 24.0
            })
        );

        let env = h.unmount();
        assert_eq!(env.intersection.observer_count(), 0);
    }
}
