#[cfg(test)]
mod tests {
    use crate::effects::*;
    use crate::effects_ext::*;
    use crate::error::HookError;
    use crate::locals::*;
    use crate::runtime::*;
    use crate::scope::*;
    use crate::signal::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
    }

    #[test]
    fn test_signal_subscription() {
        let sig = signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let id = sig.subscribe(move |v| seen_clone.borrow_mut().push(*v));

        sig.set(42);
        assert!(sig.unsubscribe(id));
        sig.set(43);
        assert_eq!(*seen.borrow(), vec![42]);
        assert_eq!(sig.subscriber_count(), 0);
    }

    #[test]
    fn test_set_if_changed_skips_equal_values() {
        let sig = signal("a".to_string());
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        sig.subscribe(move |_| c.set(c.get() + 1));

        assert!(!sig.set_if_changed("a".into()));
        assert!(sig.set_if_changed("b".into()));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_subscriber_can_read_signal() {
        let sig = signal(1);
        let mirror = Rc::new(Cell::new(0));
        let (s, m) = (sig.clone(), mirror.clone());
        sig.subscribe(move |_| m.set(s.get() * 10));
        sig.set(7);
        assert_eq!(mirror.get(), 70);
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let cleaned_up = Rc::new(Cell::new(0));

        let scope = Scope::new();
        let c = cleaned_up.clone();
        scope.add_disposer(move || c.set(c.get() + 1));

        assert_eq!(cleaned_up.get(), 0);
        scope.dispose();
        scope.dispose();
        assert_eq!(cleaned_up.get(), 1);
        assert!(scope.is_disposed());
    }

    #[test]
    fn test_scope_cleanup_on_drop() {
        let cleaned_up = Rc::new(Cell::new(false));
        {
            let scope = Scope::new();
            let c = cleaned_up.clone();
            scope.add_disposer(move || c.set(true));
        }
        assert!(cleaned_up.get());
    }

    #[test]
    fn test_child_scopes_dispose_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let parent = Scope::new();
        let child = parent.child();

        let o = order.clone();
        parent.add_disposer(move || o.borrow_mut().push("parent"));
        let o = order.clone();
        child.add_disposer(move || o.borrow_mut().push("child"));

        parent.dispose();
        assert_eq!(*order.borrow(), vec!["child", "parent"]);
    }

    #[test]
    fn test_dispose_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let d = Dispose::new(move || c.set(c.get() + 1));
        let d2 = d.clone();
        d.run();
        d2.run();
        assert_eq!(count.get(), 1);
        assert!(!d.is_pending());
    }

    #[test]
    fn test_remember_is_order_based_per_binding() {
        let a = Binding::new();
        let b = Binding::new();

        let first = a.compose(|| remember(|| 1));
        let other = b.compose(|| remember(|| 2));
        let again = a.compose(|| remember(|| 99));

        assert_eq!(*first, 1);
        assert_eq!(*other, 2);
        assert_eq!(*again, 1);
    }

    #[test]
    fn test_nested_remember_in_init() {
        let binding = Binding::new();
        let (outer, next) = binding.compose(|| {
            let outer = remember(|| *remember(|| 5) + 1);
            let next = remember(|| 100);
            (*outer, *next)
        });
        assert_eq!((outer, next), (6, 100));
    }

    #[test]
    fn test_key_based_remember() {
        let binding = Binding::new();
        let (val1, val2) = binding.compose(|| {
            (
                remember_with_key("test", || 42),
                remember_with_key("test", || 100),
            )
        });

        // Should return the same instance
        assert_eq!(*val1, 42);
        assert_eq!(*val2, 42); // Not 100, because key exists
    }

    #[test]
    fn test_use_state_marks_binding_dirty() {
        let binding = Binding::new();
        let invalidations = Rc::new(Cell::new(0));
        let i = invalidations.clone();
        binding.set_on_invalidate(move || i.set(i.get() + 1));

        let state = binding.compose(|| use_state(|| 0));
        assert!(!binding.is_dirty());

        state.set(3);
        assert!(binding.take_dirty());
        assert!(!binding.is_dirty());
        assert_eq!(invalidations.get(), 1);
        assert_eq!(binding.compose(|| use_state(|| 0)).get(), 3);
        assert_eq!(binding.render_count(), 2);
    }

    #[test]
    fn test_disposable_effect_reruns_on_key_change() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let binding = Binding::new();
        let pass = |key: &'static str| {
            let log = log.clone();
            binding.compose(move || {
                disposable_effect(key, move || {
                    log.borrow_mut().push(format!("start {key}"));
                    on_unmount(move || log.borrow_mut().push(format!("stop {key}")))
                });
            });
        };

        pass("a");
        pass("a");
        pass("b");
        binding.unmount();

        assert_eq!(
            *log.borrow(),
            vec!["start a", "stop a", "start b", "stop b"]
        );
    }

    #[test]
    fn test_binding_drop_releases_effects() {
        let released = Rc::new(Cell::new(false));
        {
            let binding = Binding::new();
            let r = released.clone();
            binding.compose(move || {
                disposable_effect((), move || on_unmount(move || r.set(true)))
            });
        }
        assert!(released.get());
    }

    #[test]
    fn test_effect_registers_in_current_scope() {
        let ran = Rc::new(Cell::new(false));
        let scope = Scope::new();
        let r = ran.clone();
        let d = scope.run(|| effect(move || Dispose::new(move || r.set(true))));
        assert!(d.is_pending());
        scope.dispose();
        assert!(ran.get());
    }

    #[test]
    fn test_locals_nest_and_unwind() {
        provide(1u8, || {
            assert_eq!(local::<u8>(), Some(1));
            provide(2u8, || assert_eq!(local::<u8>(), Some(2)));
            assert_eq!(local::<u8>(), Some(1));
        });
        assert_eq!(local::<u8>(), None);
        assert_eq!(local_or_default::<u16>(), 0);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            HookError::HttpStatus(404).to_string(),
            "HTTP Error! Status: 404"
        );
        assert_eq!(
            HookError::InvalidThreshold(1.5).to_string(),
            "threshold must be between 0 and 1 (got 1.5)"
        );
        assert_eq!(
            HookError::InvalidRootMargin(f64::NAN).to_string(),
            "root margin must be a finite number of pixels (got NaN)"
        );
    }
}
