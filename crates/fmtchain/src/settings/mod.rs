mod defaults;
pub mod keys;
mod store;

use std::cell::Cell;
use std::rc::Rc;

use serde_json::Value;

pub use defaults::*;
pub use store::*;

use crate::utils::Debouncer;

pub type SettingsCallback = Box<dyn Fn(&Value)>;

/// A store of user settings that pushes changes to observers.
pub trait SettingsSource {
  /// Calls the callback immediately with the current value and again
  /// on every change until the returned subscription is dropped.
  fn observe(&self, key: &str, callback: SettingsCallback) -> Subscription;
  /// Gets the value, which is `Value::Null` for unknown keys.
  fn get(&self, key: &str) -> Value;
  fn set(&self, key: &str, value: Value);
  fn toggle(&self, key: &str) {
    let value = value_to_bool(&self.get(key));
    self.set(key, Value::Bool(!value));
  }
}

/// Stops observing a setting when dropped.
#[must_use]
pub struct Subscription {
  unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
  pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
    Self {
      unsubscribe: Some(Box::new(unsubscribe)),
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(unsubscribe) = self.unsubscribe.take() {
      unsubscribe();
    }
  }
}

/// Observes a setting where the initial value is applied immediately
/// and later changes go through the debouncer.
pub fn observe_debounced(settings: &dyn SettingsSource, debouncer: &Rc<Debouncer>, key: &str, apply: impl Fn(&Value) + 'static) -> Subscription {
  let apply = Rc::new(apply);
  let is_initial = Cell::new(true);
  let debouncer = Rc::downgrade(debouncer);
  let debounce_key = key.to_string();
  settings.observe(
    key,
    Box::new(move |value| {
      if is_initial.replace(false) {
        apply(value);
      } else if let Some(debouncer) = debouncer.upgrade() {
        let apply = apply.clone();
        let value = value.clone();
        debouncer.call(&debounce_key, move || apply(&value));
      }
    }),
  )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
  Format,
  Save,
}

impl OrderKind {
  pub fn display_name(&self) -> &'static str {
    match self {
      OrderKind::Format => "Format order",
      OrderKind::Save => "Format on save order",
    }
  }

  pub fn setting_key(&self) -> &'static str {
    match self {
      OrderKind::Format => keys::FORMAT_ORDER,
      OrderKind::Save => keys::SAVE_ORDER,
    }
  }
}

/// How errors are shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorHandling {
  /// Errors are only logged.
  Hide,
  /// Errors stay until dismissed.
  Show,
  /// Errors disappear after a while.
  #[default]
  Default,
}

impl ErrorHandling {
  pub fn from_value(value: &Value) -> Self {
    match value.as_str() {
      Some("hide") => ErrorHandling::Hide,
      Some("show") => ErrorHandling::Show,
      _ => ErrorHandling::Default,
    }
  }
}

/// Gets the strings of a list setting with empty entries removed.
pub fn value_to_string_list(value: &Value) -> Vec<String> {
  match value {
    Value::Array(items) => items
      .iter()
      .filter_map(|item| item.as_str())
      .filter(|item| !item.is_empty())
      .map(|item| item.to_string())
      .collect(),
    _ => Vec::new(),
  }
}

pub fn value_to_string(value: &Value) -> String {
  value.as_str().map(|s| s.to_string()).unwrap_or_default()
}

pub fn value_to_bool(value: &Value) -> bool {
  value.as_bool().unwrap_or(false)
}
