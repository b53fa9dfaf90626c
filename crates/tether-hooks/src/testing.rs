use tether_core::Binding;
use tether_platform::headless::Headless;
use tether_platform::{Platform, with_platform};

pub(crate) fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One binding rendered against a headless environment.
pub(crate) struct Harness {
    pub env: Headless,
    pub binding: Binding,
    platform: Option<Platform>,
}

impl Harness {
    pub fn new() -> Self {
        init_logs();
        Self {
            env: Headless::new(),
            binding: Binding::new(),
            platform: None,
        }
    }

    /// A harness whose hooks see `platform` instead of the headless bundle.
    pub fn with_platform(platform: Platform) -> Self {
        Self {
            platform: Some(platform),
            ..Self::new()
        }
    }

    pub fn render<R>(&self, f: impl FnOnce() -> R) -> R {
        let platform = self
            .platform
            .clone()
            .unwrap_or_else(|| self.env.platform());
        with_platform(platform, || self.binding.compose(f))
    }

    /// A fresh binding over the same environment.
    pub fn remount(&self) -> Harness {
        Harness {
            env: self.env.clone(),
            binding: Binding::new(),
            platform: self.platform.clone(),
        }
    }

    pub fn unmount(self) -> Headless {
        self.binding.unmount();
        self.env
    }
}
