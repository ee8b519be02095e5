use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use indexmap::IndexMap;
use serde_json::Value;

use super::SettingsCallback;
use super::SettingsSource;
use super::Subscription;
use crate::environment::Environment;

struct Observer {
  id: u64,
  key: String,
  callback: Rc<dyn Fn(&Value)>,
}

#[derive(Default)]
struct SettingsState {
  values: IndexMap<String, Value>,
  defaults: IndexMap<String, Value>,
  observers: Vec<Observer>,
  next_observer_id: u64,
}

impl SettingsState {
  fn get(&self, key: &str) -> Value {
    self.values.get(key).or_else(|| self.defaults.get(key)).cloned().unwrap_or(Value::Null)
  }
}

/// In-memory settings keyed by dotted names (ex. `black.global.binPath`).
///
/// Clones share the same underlying settings.
#[derive(Clone, Default)]
pub struct SettingsStore {
  state: Rc<RefCell<SettingsState>>,
}

impl SettingsStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_defaults(defaults: IndexMap<String, Value>) -> Self {
    let store = Self::default();
    store.state.borrow_mut().defaults = defaults;
    store
  }

  pub fn is_known_key(&self, key: &str) -> bool {
    self.state.borrow().defaults.contains_key(key)
  }

  /// Applies the settings found in a JSON object. Nested objects are
  /// flattened into dotted keys, so `{ "black": { "local": { "bins": [] } } }`
  /// sets `black.local.bins`.
  ///
  /// Returns the keys that were set.
  pub fn apply_json_text(&self, text: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(text).context("Error parsing settings JSON.")?;
    if !value.is_object() {
      bail!("Expected the settings to be a JSON object.");
    }
    let mut entries = Vec::new();
    flatten_settings(None, value, &mut entries);
    let keys = entries.iter().map(|(key, _)| key.clone()).collect();
    for (key, value) in entries {
      self.set(&key, value);
    }
    Ok(keys)
  }

  pub fn apply_file(&self, environment: &impl Environment, file_path: &Path) -> Result<()> {
    let text = environment
      .read_file(file_path)
      .with_context(|| format!("Error reading settings file {}.", file_path.display()))?;
    let keys = self
      .apply_json_text(&text)
      .with_context(|| format!("Error loading settings file {}.", file_path.display()))?;
    for key in keys {
      if !self.is_known_key(&key) {
        log_debug!(environment, "Unknown setting in {}: {}", file_path.display(), key);
      }
    }
    Ok(())
  }

  #[cfg(test)]
  pub fn observer_count(&self) -> usize {
    self.state.borrow().observers.len()
  }
}

fn flatten_settings(prefix: Option<&str>, value: Value, entries: &mut Vec<(String, Value)>) {
  match value {
    Value::Object(object) => {
      for (key, value) in object {
        let key = match prefix {
          Some(prefix) => format!("{}.{}", prefix, key),
          None => key,
        };
        flatten_settings(Some(&key), value, entries);
      }
    }
    value => {
      if let Some(prefix) = prefix {
        entries.push((prefix.to_string(), value));
      }
    }
  }
}

impl SettingsSource for SettingsStore {
  fn observe(&self, key: &str, callback: SettingsCallback) -> Subscription {
    let callback: Rc<dyn Fn(&Value)> = Rc::from(callback);
    let (id, value) = {
      let mut state = self.state.borrow_mut();
      let id = state.next_observer_id;
      state.next_observer_id += 1;
      state.observers.push(Observer {
        id,
        key: key.to_string(),
        callback: callback.clone(),
      });
      (id, state.get(key))
    };

    callback(&value);

    let state = Rc::downgrade(&self.state);
    Subscription::new(move || {
      if let Some(state) = state.upgrade()
        && let Ok(mut state) = state.try_borrow_mut()
      {
        state.observers.retain(|o| o.id != id);
      }
    })
  }

  fn get(&self, key: &str) -> Value {
    self.state.borrow().get(key)
  }

  fn set(&self, key: &str, value: Value) {
    let callbacks = {
      let mut state = self.state.borrow_mut();
      if state.get(key) == value {
        return;
      }
      state.values.insert(key.to_string(), value.clone());
      state
        .observers
        .iter()
        .filter(|o| o.key == key)
        .map(|o| o.callback.clone())
        .collect::<Vec<_>>()
    };
    // called without the state borrowed so observers may read or write settings
    for callback in callbacks {
      callback(&value);
    }
  }
}
