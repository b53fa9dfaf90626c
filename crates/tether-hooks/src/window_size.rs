use std::rc::Rc;

use tether_core::{Dispose, disposable_effect, use_state};
use tether_platform::{WindowSize, platform};

/// Inner window size, measured on mount and on every resize. Zero without a viewport.
pub fn use_window_size() -> WindowSize {
    let size = use_state(WindowSize::default);
    let viewport = platform().viewport;

    let state = size.clone();
    disposable_effect((), move || {
        let Some(viewport) = viewport else {
            return Dispose::noop();
        };
        let measure = {
            let viewport = viewport.clone();
            move || {
                state.set_if_changed(viewport.window_size());
            }
        };
        measure();
        viewport.on_resize(Rc::new(measure))
    });

    size.get()
}
