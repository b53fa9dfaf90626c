//! Document title.

use tether_core::{Dispose, disposable_effect, local, provide};
use tether_platform::platform;

/// Application name prepended to every title set below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitlePrefix(pub String);

/// Provides a [`TitlePrefix`] for hooks composed inside `f`.
pub fn with_title_prefix<R>(prefix: impl Into<String>, f: impl FnOnce() -> R) -> R {
    provide(TitlePrefix(prefix.into()), f)
}

/// `"<prefix> - <title>"`, or just `title`. Titles that leaked an unresolved value
/// (containing `undefined` in any case) yield `None`.
pub fn format_title(prefix: Option<&str>, title: &str) -> Option<String> {
    if title.to_lowercase().contains("undefined") {
        return None;
    }
    Some(match prefix {
        Some(prefix) => format!("{prefix} - {title}"),
        None => title.to_owned(),
    })
}

/// Sets the document title whenever `title` changes. Nothing is restored on unmount.
pub fn use_document_title(title: &str) {
    let prefix = local::<TitlePrefix>();
    let full = format_title(prefix.as_ref().map(|p| p.0.as_str()), title);
    let sink = platform().title;

    disposable_effect(full.clone(), move || {
        match (full, sink) {
            (Some(full), Some(sink)) => sink.set_title(&full),
            (None, _) => log::debug!("title contains 'undefined'; leaving document title as is"),
            (Some(_), None) => log::debug!("no document to title"),
        }
        Dispose::noop()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[test]
    fn test_sets_title_once_per_change() {
        let h = Harness::new();
        h.render(|| use_document_title("Inbox"));
        h.render(|| use_document_title("Inbox"));
        assert_eq!(h.env.title.current().as_deref(), Some("Inbox"));
        assert_eq!(h.env.title.writes(), 1);

        h.render(|| use_document_title("Inbox (3)"));
        assert_eq!(h.env.title.current().as_deref(), Some("Inbox (3)"));
        assert_eq!(h.env.title.writes(), 2);
    }

    #[test]
    fn test_skips_undefined_titles() {
        let h = Harness::new();
        h.render(|| use_document_title("Profile"));
        h.render(|| use_document_title("Page UNDEFINED"));
        assert_eq!(h.env.title.current().as_deref(), Some("Profile"));
        assert_eq!(h.env.title.writes(), 1);
    }

    #[test]
    fn test_prefix() {
        let h = Harness::new();
        h.render(|| with_title_prefix("Shop", || use_document_title("Cart")));
        insta::assert_snapshot!(h.env.title.current().unwrap_or_default(), @"Shop - Cart");
    }

    #[test]
    fn test_format_title() {
        assert_eq!(format_title(None, "Home").as_deref(), Some("Home"));
        assert_eq!(
            format_title(Some("App"), "Home").as_deref(),
            Some("App - Home")
        );
        assert_eq!(format_title(Some("App"), "undefined"), None);
        assert_eq!(format_title(None, ""), Some(String::new()));
    }
}
