use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tether_core::Binding;
use tether_hooks::*;
use tether_platform::headless::Headless;
use tether_platform::{ElementRef, HttpResponse, StorageKind, WindowSize, with_platform};
use web_time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Settings {
    compact: bool,
    locale: String,
}

#[derive(Clone, Debug, Deserialize)]
struct Profile {
    name: String,
}

struct Frame {
    query: String,
    window: WindowSize,
    small_screen: Option<bool>,
    banner_visible: bool,
    dictionary: serde_json::Value,
    settings: StoredValue<Settings>,
    profile: FetchHandle<Profile, serde_json::Value>,
    form: FormHandle,
}

fn profile_page(typed: &str) -> anyhow::Result<Frame> {
    let settings = use_storage(
        "settings",
        Settings {
            compact: false,
            locale: "en".into(),
        },
        StorageKind::Local,
    );
    let locale = settings.get().locale;

    let query = use_debounce(typed.to_owned(), Duration::from_millis(250));
    with_title_prefix("Tether", || use_document_title(&format!("Search: {query}")));

    let window = use_window_size();
    let small_screen = use_screen_size();
    let banner_visible = use_element_visibility(
        &ElementRef::new("banner"),
        VisibilityOptions {
            threshold: 0.5,
            root_margin: 0.0,
        },
        VisibilityCallbacks::new().on_first_visible(|el| log::info!("{} seen", el.id())),
    )
    .context("banner observer")?;

    let dictionary = use_locale_dictionary(json!({}), "tour", "profile", &locale).dictionary;
    let profile = use_fetch("/api/profile", FetchOptions::default());
    let form = use_form(
        FormConfig::new([("name", "")], |values| {
            log::info!("saving profile {values:?}");
        })
        .validate(|values| {
            let mut errors = FormErrors::new();
            if values.get("name").is_none_or(|n| n.trim().is_empty()) {
                errors.insert("name".into(), "Name is required".into());
            }
            errors
        }),
    );

    Ok(Frame {
        query,
        window,
        small_screen,
        banner_visible,
        dictionary,
        settings,
        profile,
        form,
    })
}

struct Host {
    env: Headless,
    binding: Binding,
    typed: String,
}

impl Host {
    /// Renders until no hook asks for another pass.
    fn settle(&self) -> anyhow::Result<Frame> {
        let mut passes = 0;
        loop {
            let frame = with_platform(self.env.platform(), || {
                self.binding.compose(|| profile_page(&self.typed))
            })?;
            passes += 1;
            self.env.executor.run_until_stalled();
            if !self.binding.take_dirty() {
                log::debug!("settled after {passes} pass(es)");
                return Ok(frame);
            }
            anyhow::ensure!(passes < 16, "page never settled");
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let env = Headless::new();
    env.viewport.resize_to(390.0, 844.0);
    env.media.set_matches("(max-width: 450px)", true);
    env.locales
        .insert_json("tour", "profile", "en", r#"{"greeting": "Hello"}"#)?;
    env.locales
        .insert_json("tour", "profile", "es", r#"{"greeting": "Hola"}"#)?;
    env.http
        .respond_with(Ok(HttpResponse::json(200, &json!({"name": "Ada"}))));

    let mut host = Host {
        env: env.clone(),
        binding: Binding::new(),
        typed: String::new(),
    };

    let frame = host.settle()?;
    println!(
        "window {}x{}, small screen: {:?}, greeting: {}",
        frame.window.width, frame.window.height, frame.small_screen, frame.dictionary["greeting"]
    );

    for ch in "rust".chars() {
        host.typed.push(ch);
        host.settle()?;
        env.timers.advance(Duration::from_millis(100));
    }
    env.timers.advance(Duration::from_millis(250));
    let frame = host.settle()?;
    println!(
        "debounced query: {:?}, title: {:?}",
        frame.query,
        env.title.current()
    );

    let banner = ElementRef::new("banner");
    env.intersection.set_intersecting(&banner, true);
    let frame = host.settle()?;
    println!("banner visible: {}", frame.banner_visible);

    frame.profile.get();
    let frame = host.settle()?;
    let name = frame.profile.data().map(|p| p.name).unwrap_or_default();
    println!("profile: {name}, error: {:?}", frame.profile.error());

    let mut submit = SubmitEvent::new();
    frame.form.submit(&mut submit);
    println!("form errors: {:?}", frame.form.errors());
    frame.form.change("name", name);
    frame.form.submit(&mut SubmitEvent::new());

    frame.settings.set(Settings {
        compact: true,
        locale: "es".into(),
    });
    let frame = host.settle()?;
    println!(
        "stored settings: {}, compact: {}, greeting: {}",
        env.local.raw("settings").unwrap_or_default(),
        frame.settings.get().compact,
        frame.dictionary["greeting"]
    );

    host.binding.unmount();
    println!(
        "after unmount: {} resize, {} media, {} observers, {} timers",
        env.viewport.resize_listener_count(),
        env.media.listener_count(),
        env.intersection.observer_count(),
        env.timers.pending()
    );
    Ok(())
}
