//! Route dictionaries that follow the active locale.

use futures::FutureExt;
use serde_json::Value;
use tether_core::{Dispose, disposable_effect, use_state};
use tether_platform::{is_empty_dictionary, platform};

#[derive(Clone, Debug, PartialEq)]
pub struct LocaleState {
    pub dictionary: Value,
    pub locale: String,
}

/// Starts with `initial` and swaps in the dictionary of `(module, route, locale)` each
/// time `locale` changes. An empty locale resolves nothing; a missing or empty result
/// keeps the current dictionary.
///
/// Resolutions are not cancelled: when the locale changes faster than dictionaries
/// arrive, the last one to arrive wins even if it belongs to an older locale.
pub fn use_locale_dictionary(
    initial: Value,
    module: &str,
    route: &str,
    locale: &str,
) -> LocaleState {
    let dictionary = use_state(|| initial);
    let p = platform();

    let state = dictionary.clone();
    let (module, route) = (module.to_owned(), route.to_owned());
    let requested = locale.to_owned();
    disposable_effect(locale.to_owned(), move || {
        if requested.is_empty() {
            return Dispose::noop();
        }
        let (Some(source), Some(spawner)) = (p.locales, p.spawner) else {
            log::warn!("no locale source; keeping current dictionary");
            return Dispose::noop();
        };

        let pending = source.resolve(&module, &route, &requested);
        spawner.spawn_local(
            async move {
                match pending.await {
                    Some(found) if !is_empty_dictionary(&found) => state.set(found),
                    _ => log::debug!("no dictionary for {module}/{route}/{requested}"),
                }
            }
            .boxed_local(),
        );
        Dispose::noop()
    });

    LocaleState {
        dictionary: dictionary.get(),
        locale: locale.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use futures::channel::oneshot;
    use futures::future::LocalBoxFuture;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tether_platform::headless::LocalExecutor;
    use tether_platform::{LocaleSource, Platform};

    fn seeded(h: &Harness) {
        let locales = &h.env.locales;
        locales.insert("shop", "cart", "en", json!({"title": "Cart"}));
        locales.insert("shop", "cart", "es", json!({"title": "Carrito"}));
        locales.insert("shop", "cart", "de", json!({}));
    }

    fn render(h: &Harness, locale: &str) -> LocaleState {
        h.render(|| use_locale_dictionary(json!({"title": "…"}), "shop", "cart", locale))
    }

    #[test]
    fn test_follows_locale() {
        let h = Harness::new();
        seeded(&h);

        assert_eq!(render(&h, "en").dictionary, json!({"title": "…"}));
        h.env.executor.run_until_stalled();
        assert_eq!(render(&h, "en").dictionary, json!({"title": "Cart"}));

        render(&h, "es");
        h.env.executor.run_until_stalled();
        let state = render(&h, "es");
        assert_eq!(state.dictionary, json!({"title": "Carrito"}));
        assert_eq!(state.locale, "es");
    }

    #[test]
    fn test_missing_or_empty_keeps_previous() {
        let h = Harness::new();
        seeded(&h);
        render(&h, "en");
        h.env.executor.run_until_stalled();

        for locale in ["de", "fr"] {
            render(&h, locale);
            h.env.executor.run_until_stalled();
            assert_eq!(render(&h, locale).dictionary, json!({"title": "Cart"}));
        }
    }

    #[test]
    fn test_empty_locale_resolves_nothing() {
        let h = Harness::new();
        seeded(&h);
        render(&h, "");
        h.env.executor.run_until_stalled();
        assert!(!h.binding.is_dirty());
        assert_eq!(render(&h, "").dictionary, json!({"title": "…"}));
    }

    type Parked = Rc<RefCell<Vec<(String, oneshot::Sender<Option<Value>>)>>>;

    #[derive(Clone, Default)]
    struct Deferred(Parked);

    impl LocaleSource for Deferred {
        fn resolve(
            &self,
            _: &str,
            _: &str,
            locale: &str,
        ) -> LocalBoxFuture<'static, Option<Value>> {
            let (tx, rx) = oneshot::channel();
            self.0.borrow_mut().push((locale.to_owned(), tx));
            async move { rx.await.ok().flatten() }.boxed_local()
        }
    }

    impl Deferred {
        fn answer(&self, locale: &str, dictionary: Value) {
            let mut parked = self.0.borrow_mut();
            if let Some(i) = parked.iter().position(|(l, _)| l == locale) {
                let (_, tx) = parked.remove(i);
                let _ = tx.send(Some(dictionary));
            }
        }
    }

    #[test]
    fn test_late_answer_for_old_locale_wins() {
        let source = Deferred::default();
        let executor = LocalExecutor::default();
        let h = Harness::with_platform(
            Platform::default()
                .with_locales(source.clone())
                .with_spawner(executor.clone()),
        );

        render(&h, "en");
        render(&h, "es");
        source.answer("es", json!({"title": "Carrito"}));
        executor.run_until_stalled();
        source.answer("en", json!({"title": "Cart"}));
        executor.run_until_stalled();

        assert_eq!(render(&h, "es").dictionary, json!({"title": "Cart"}));
    }
}
