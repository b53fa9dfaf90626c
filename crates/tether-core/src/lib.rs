//! # Bindings, state and effects
//!
//! Tether hooks are plain functions called while a [`Binding`] renders. The runtime
//! underneath them has four pieces:
//!
//! - `Signal<T>`: observable, cloneable value.
//! - `remember*` / `use_state`: per-binding storage, resolved by call order.
//! - `disposable_effect` / `scoped_effect`: side-effects with guaranteed cleanup.
//! - composition locals (`provide` / `local`): configuration handed down to hooks.
//!
//! ## Signals
//!
//! ```rust
//! use tether_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! assert!(!count.set_if_changed(2));
//! ```
//!
//! ## Bindings
//!
//! A binding is one live component instance. Each `compose` pass resets the slot cursor,
//! so the Nth `remember` call of a pass always refers to the Nth stored value:
//!
//! ```rust
//! use tether_core::*;
//!
//! fn counter() -> Signal<i32> {
//!     use_state(|| 0)
//! }
//!
//! let binding = Binding::new();
//! binding.compose(counter).update(|c| *c += 1);
//! assert!(binding.take_dirty());
//! assert_eq!(binding.compose(counter).get(), 1);
//! ```
//!
//! ## Effects and cleanup
//!
//! Every registration against the outside world returns a [`Dispose`]. Handing it to
//! `disposable_effect` ties it to the binding: it is released when the key changes and
//! when the binding unmounts.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tether_core::*;
//!
//! let released = Rc::new(Cell::new(0));
//! let binding = Binding::new();
//! for _ in 0..3 {
//!     binding.compose(|| {
//!         let released = released.clone();
//!         disposable_effect("listener", move || {
//!             on_unmount(move || released.set(released.get() + 1))
//!         });
//!     });
//! }
//! assert_eq!(released.get(), 0);
//! binding.unmount();
//! assert_eq!(released.get(), 1);
//! ```

pub mod effects;
pub mod effects_ext;
pub mod error;
pub mod locals;
pub mod prelude;
pub mod runtime;
pub mod scope;
pub mod signal;
pub mod tests;

pub use effects::*;
pub use effects_ext::*;
pub use error::*;
pub use locals::*;
pub use runtime::*;
pub use scope::*;
pub use signal::*;
