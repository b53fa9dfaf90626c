use tether_core::{Dispose, disposable_effect, use_state};
use tether_platform::{Coordinates, PositionOptions, platform};

pub const UNSUPPORTED_STATUS: &str = "Geolocation is not supported by your browser.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationState {
    pub location: Option<Coordinates>,
    /// Empty while pending, `"ok"` on success, otherwise a human-readable reason.
    pub status: String,
}

/// Requests the device position once per mount, with high accuracy, no cached fixes and
/// a five second timeout.
pub fn use_current_location() -> LocationState {
    let state = use_state(LocationState::default);
    let source = platform().geolocation;

    let s = state.clone();
    disposable_effect((), move || {
        match source {
            None => s.update(|st| st.status = UNSUPPORTED_STATUS.to_owned()),
            Some(source) => source.current_position(
                PositionOptions::default(),
                Box::new(move |result| match result {
                    Ok(coords) => s.set(LocationState {
                        location: Some(coords),
                        status: "ok".to_owned(),
                    }),
                    Err(message) => {
                        log::debug!("geolocation failed: {message}");
                        s.update(|st| st.status = format!("Error getting geolocation: {message}"));
                    }
                }),
            ),
        }
        Dispose::noop()
    });

    state.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use tether_platform::Platform;
    use web_time::Duration;

    #[test]
    fn test_unsupported() {
        let h = Harness::with_platform(Platform::default());
        h.render(use_current_location);
        let state = h.render(use_current_location);
        assert_eq!(state.location, None);
        assert_eq!(state.status, UNSUPPORTED_STATUS);
    }

    #[test]
    fn test_success() {
        let h = Harness::new();
        assert_eq!(h.render(use_current_location), LocationState::default());

        let madrid = Coordinates {
            lat: 40.4,
            lng: -3.7,
        };
        assert_eq!(h.env.geolocation.respond(Ok(madrid)), 1);
        assert!(h.binding.take_dirty());

        let state = h.render(use_current_location);
        assert_eq!(state.status, "ok");
        assert_eq!(state.location, Some(madrid));
    }

    #[test]
    fn test_error_status() {
        let h = Harness::new();
        h.render(use_current_location);
        let denied = Err("User denied Geolocation".to_owned());
        h.env.geolocation.respond(denied);

        let state = h.render(use_current_location);
        assert_eq!(state.location, None);
        insta::assert_snapshot!(
            state.status,
            @"Error getting geolocation: User denied Geolocation"
        );
    }

    #[test]
    fn test_one_request_per_mount() {
        let h = Harness::new();
        for _ in 0..3 {
            h.render(use_current_location);
        }
        assert_eq!(
            h.env.geolocation.requests(),
            [PositionOptions {
                enable_high_accuracy: true,
                maximum_age: Duration::ZERO,
                timeout: Duration::from_secs(5),
            }]
        );
    }
}
