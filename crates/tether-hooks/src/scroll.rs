use std::rc::Rc;

use tether_core::{Dispose, disposable_effect, use_state};
use tether_platform::{ElementRef, ScrollPosition, platform};

/// Scroll offset of `target`, or of the viewport when `None`. Read once on mount and on
/// every scroll event after that.
pub fn use_scroll(target: Option<&ElementRef>) -> ScrollPosition {
    let position = use_state(ScrollPosition::default);
    let viewport = platform().viewport;

    let state = position.clone();
    let target = target.cloned();
    disposable_effect(target.clone(), move || {
        let Some(viewport) = viewport else {
            return Dispose::noop();
        };
        let read = {
            let (viewport, target) = (viewport.clone(), target.clone());
            move || {
                state.set_if_changed(viewport.scroll_position(target.as_ref()));
            }
        };
        read();
        viewport.on_scroll(target.as_ref(), Rc::new(read))
    });

    position.get()
}
