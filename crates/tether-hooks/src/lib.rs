//! # Hooks
//!
//! Stateful helpers for UI components. Each hook is a plain function called during a
//! [`Binding`](tether_core::Binding) render pass: it keeps its state in the binding's
//! slots, talks to the host through the provided [`Platform`](tether_platform::Platform)
//! and hands every listener it registers back to the binding, so unmounting leaves
//! nothing behind.
//!
//! ```rust
//! use tether_core::Binding;
//! use tether_hooks::use_window_size;
//! use tether_platform::{headless::Headless, with_platform};
//!
//! let env = Headless::new();
//! env.viewport.resize_to(800.0, 600.0);
//!
//! let binding = Binding::new();
//! let render = || with_platform(env.platform(), || binding.compose(use_window_size));
//! assert_eq!(render().width, 800.0);
//!
//! env.viewport.resize_to(1024.0, 768.0);
//! assert!(binding.take_dirty());
//! assert_eq!(render().height, 768.0);
//!
//! binding.unmount();
//! assert_eq!(env.viewport.resize_listener_count(), 0);
//! ```
//!
//! Hooks share the ordering rule of `remember`: call them unconditionally and in the
//! same order on every pass.

pub mod debounce;
pub mod fetch;
pub mod form;
pub mod geolocation;
pub mod height;
pub mod locale;
pub mod media_query;
pub mod scroll;
pub mod storage;
pub mod title;
pub mod visibility;
pub mod window_size;

#[cfg(test)]
mod testing;

pub use debounce::use_debounce;
pub use fetch::{FetchHandle, FetchOptions, use_fetch};
pub use form::{ChangeEvent, FormConfig, FormErrors, FormHandle, FormValues, SubmitEvent, use_form};
pub use geolocation::{LocationState, use_current_location};
pub use height::use_measure_height;
pub use locale::{LocaleState, use_locale_dictionary};
pub use media_query::{SMALL_SCREEN_QUERY, use_media_query, use_screen_size};
pub use scroll::use_scroll;
pub use storage::{StoredValue, use_storage};
pub use title::{TitlePrefix, format_title, use_document_title, with_title_prefix};
pub use visibility::{VisibilityCallbacks, VisibilityOptions, use_element_visibility};
pub use window_size::use_window_size;
