use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use serde_json::Value;
use tether_core::HookError;

use crate::LocaleSource;

type Triple = (String, String, String);

/// Translation dictionaries addressed by (module, route, locale). Clones share entries.
#[derive(Clone, Default)]
pub struct LocaleRegistry {
    entries: Rc<RefCell<HashMap<Triple, Value>>>,
}

impl LocaleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, module: &str, route: &str, locale: &str, dictionary: Value) {
        self.entries
            .borrow_mut()
            .insert((module.into(), route.into(), locale.into()), dictionary);
    }

    /// Parses `json` and registers it.
    pub fn insert_json(
        &self,
        module: &str,
        route: &str,
        locale: &str,
        json: &str,
    ) -> Result<(), HookError> {
        let dictionary: Value =
            serde_json::from_str(json).map_err(|e| HookError::Decode(e.to_string()))?;
        self.insert(module, route, locale, dictionary);
        Ok(())
    }

    pub fn get(&self, module: &str, route: &str, locale: &str) -> Option<Value> {
        self.entries
            .borrow()
            .get(&(module.to_owned(), route.to_owned(), locale.to_owned()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl LocaleSource for LocaleRegistry {
    fn resolve(
        &self,
        module: &str,
        route: &str,
        locale: &str,
    ) -> LocalBoxFuture<'static, Option<Value>> {
        let found = self.get(module, route, locale);
        if found.is_none() {
            log::debug!("no dictionary for {module}/{route}/{locale}");
        }
        future::ready(found).boxed_local()
    }
}

/// Null, `{}`, `[]` and `""` carry no translations.
pub fn is_empty_dictionary(dictionary: &Value) -> bool {
    match dictionary {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn test_registry_lookup() {
        let reg = LocaleRegistry::new();
        reg.insert("shop", "home", "en", json!({"title": "Home"}));
        reg.insert_json("shop", "home", "es", r#"{"title": "Inicio"}"#)
            .unwrap();

        assert_eq!(reg.len(), 2);
        assert_eq!(
            block_on(reg.resolve("shop", "home", "es")),
            Some(json!({"title": "Inicio"}))
        );
        assert_eq!(block_on(reg.resolve("shop", "home", "fr")), None);
    }

    #[test]
    fn test_insert_json_rejects_garbage() {
        let reg = LocaleRegistry::new();
        assert!(matches!(
            reg.insert_json("a", "b", "c", "{nope"),
            Err(HookError::Decode(_))
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_empty_dictionaries() {
        assert!(is_empty_dictionary(&Value::Null));
        assert!(is_empty_dictionary(&json!({})));
        assert!(is_empty_dictionary(&json!([])));
        assert!(!is_empty_dictionary(&json!({"k": "v"})));
        assert!(!is_empty_dictionary(&json!(0)));
    }
}
