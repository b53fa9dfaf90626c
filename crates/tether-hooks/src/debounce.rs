use tether_core::{Dispose, disposable_effect, use_state};
use tether_platform::platform;
use web_time::Duration;

/// Returns `value` once it has stopped changing for `delay`.
///
/// Every change of `value` or `delay` cancels the pending timer and starts a new one, so
/// a burst of updates settles on its last value. Without a timer capability the value
/// passes straight through.
pub fn use_debounce<T: Clone + PartialEq + 'static>(value: T, delay: Duration) -> T {
    let debounced = use_state(|| value.clone());
    let timers = platform().timers;

    let state = debounced.clone();
    disposable_effect((value.clone(), delay), move || match timers {
        Some(timers) => timers.set_timeout(
            delay,
            Box::new(move || {
                state.set_if_changed(value);
            }),
        ),
        None => {
            state.set_if_changed(value);
            Dispose::noop()
        }
    });

    debounced.get()
}
