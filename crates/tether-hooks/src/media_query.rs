use std::rc::Rc;

use tether_core::{Dispose, disposable_effect, use_state};
use tether_platform::platform;

/// Default query of [`use_screen_size`].
pub const SMALL_SCREEN_QUERY: &str = "(max-width: 450px)";

/// Whether `query` currently matches, kept in sync with change events. `None` when the
/// host cannot evaluate media queries.
pub fn use_media_query(query: &str) -> Option<bool> {
    let media = platform().media;
    let available = media.is_some();
    let matches = use_state(|| media.as_ref().is_some_and(|m| m.matches(query)));

    let state = matches.clone();
    let query = query.to_owned();
    disposable_effect(query.clone(), move || {
        let Some(media) = media else {
            return Dispose::noop();
        };
        state.set_if_changed(media.matches(&query));
        media.on_change(
            &query,
            Rc::new(move |now| {
                state.set_if_changed(now);
            }),
        )
    });

    available.then(|| matches.get())
}

/// `true` on small screens; see [`SMALL_SCREEN_QUERY`].
pub fn use_screen_size() -> Option<bool> {
    use_media_query(SMALL_SCREEN_QUERY)
}
