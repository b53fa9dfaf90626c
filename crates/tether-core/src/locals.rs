//! # Composition locals
//!
//! Values handed down to every hook composed inside a closure, without globals:
//!
//! ```rust
//! use tether_core::*;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Accent(&'static str);
//!
//! assert_eq!(local::<Accent>(), None);
//! provide(Accent("teal"), || {
//!     assert_eq!(local::<Accent>(), Some(Accent("teal")));
//!     provide(Accent("plum"), || assert_eq!(local::<Accent>(), Some(Accent("plum"))));
//! });
//! ```
//!
//! The platform crate provides its capability bundle this way, and hooks read
//! configuration such as the title prefix from here.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

type Frame = HashMap<TypeId, Box<dyn Any>>;

thread_local! {
    static LOCALS_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

fn set_local_boxed(t: TypeId, v: Box<dyn Any>) {
    LOCALS_STACK.with(|st| {
        if let Some(top) = st.borrow_mut().last_mut() {
            top.insert(t, v);
        }
    });
}

/// Makes `value` visible to `local::<T>()` for the duration of `f`.
pub fn provide<T: Clone + 'static, R>(value: T, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<T>(), Box::new(value));
        f()
    })
}

/// Innermost provided `T`, if any.
pub fn local<T: Clone + 'static>() -> Option<T> {
    LOCALS_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(t) = v.downcast_ref::<T>()
            {
                return Some(t.clone());
            }
        }
        None
    })
}

/// Innermost provided `T`, or its default.
pub fn local_or_default<T: Clone + Default + 'static>() -> T {
    local::<T>().unwrap_or_default()
}
