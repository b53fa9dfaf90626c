//! Form state: values, validation errors and a submitting flag.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tether_core::{Signal, remember, use_state};

pub type FormValues = BTreeMap<String, String>;
pub type FormErrors = BTreeMap<String, String>;

type Validator = Rc<dyn Fn(&FormValues) -> FormErrors>;
type SubmitHandler = Rc<dyn Fn(&FormValues)>;

#[derive(Clone)]
pub struct FormConfig {
    pub initial_values: FormValues,
    pub validate: Option<Validator>,
    pub on_submit: SubmitHandler,
}

impl FormConfig {
    pub fn new<K, V>(
        initial_values: impl IntoIterator<Item = (K, V)>,
        on_submit: impl Fn(&FormValues) + 'static,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            initial_values: initial_values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            validate: None,
            on_submit: Rc::new(on_submit),
        }
    }

    /// Field name to message; an empty map means valid.
    pub fn validate(mut self, f: impl Fn(&FormValues) -> FormErrors + 'static) -> Self {
        self.validate = Some(Rc::new(f));
        self
    }
}

/// Input change carrying a field name and its new value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub name: String,
    pub value: String,
}

impl ChangeEvent {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Submission event; the form always suppresses the default action.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Clone)]
pub struct FormHandle {
    values: Signal<FormValues>,
    errors: Signal<FormErrors>,
    submitting: Signal<bool>,
    initial: Rc<FormValues>,
    config: Rc<RefCell<FormConfig>>,
}

impl FormHandle {
    pub fn values(&self) -> FormValues {
        self.values.get()
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.values.with(|v| v.get(name).cloned())
    }

    pub fn errors(&self) -> FormErrors {
        self.errors.get()
    }

    pub fn error(&self, name: &str) -> Option<String> {
        self.errors.with(|e| e.get(name).cloned())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    /// Sets one field, leaving the others untouched.
    pub fn change(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        self.values.update(|v| {
            v.insert(name, value);
        });
    }

    pub fn change_event(&self, event: &ChangeEvent) {
        self.change(event.name.clone(), event.value.clone());
    }

    /// Re-validates everything; the result replaces the previous errors wholesale.
    pub fn blur(&self) {
        let validate = self.config.borrow().validate.clone();
        if let Some(validate) = validate {
            let errors = self.values.with(|v| validate(v));
            self.errors.set(errors);
        }
    }

    /// Validates, then calls `on_submit` with the current values only when no errors
    /// were found.
    pub fn submit(&self, event: &mut SubmitEvent) {
        event.prevent_default();
        let config = self.config.borrow().clone();
        let values = self.values.get();

        if let Some(validate) = &config.validate {
            let errors = validate(&values);
            let invalid = !errors.is_empty();
            self.errors.set(errors);
            if invalid {
                log::debug!(
                    "submit blocked by {} error(s)",
                    self.errors.with(|e| e.len())
                );
                return;
            }
        }

        self.submitting.set(true);
        let _submitting = scopeguard::guard(self.submitting.clone(), |s| s.set(false));
        (config.on_submit)(&values);
    }

    /// Back to the values the form was first created with, without errors.
    pub fn reset(&self) {
        self.values.set((*self.initial).clone());
        self.errors.set(FormErrors::new());
    }
}

/// Form state for one component. Initial values are captured on the first pass; the
/// validator and submit handler follow the latest `config`.
pub fn use_form(config: FormConfig) -> FormHandle {
    let initial = remember(|| config.initial_values.clone());
    let values = use_state(|| (*initial).clone());
    let errors = use_state(FormErrors::new);
    let submitting = use_state(|| false);
    let latest = remember(|| RefCell::new(config.clone()));
    *latest.borrow_mut() = config;

    FormHandle {
        values,
        errors,
        submitting,
        initial,
        config: latest,
    }
}
