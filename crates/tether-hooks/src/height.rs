use tether_core::{side_effect, use_state};
use tether_platform::{ElementRef, platform};

/// Rendered height of `element`, re-measured after every pass. Only an actual change
/// updates state, so a stable layout settles after one extra pass. `0.0` until the
/// element is attached.
pub fn use_measure_height(element: &ElementRef) -> f64 {
    let height = use_state(|| 0.0);
    let viewport = platform().viewport;

    side_effect(|| {
        if let Some(measured) = viewport.and_then(|v| v.element_height(element)) {
            height.set_if_changed(measured);
        }
    });

    height.get()
}
