use indexmap::IndexMap;
use serde_json::Value;
use serde_json::json;

use super::keys;
use crate::formatter::FormatterProfile;

const DEFAULT_ORDER: [&str; 2] = ["isort", "black"];

/// Default value of every recognized setting.
pub fn default_settings(profiles: &[FormatterProfile]) -> IndexMap<String, Value> {
  let mut defaults = IndexMap::new();
  let default_order = DEFAULT_ORDER
    .iter()
    .filter(|name| profiles.iter().any(|p| p.name == **name))
    .copied()
    .collect::<Vec<_>>();

  defaults.insert(keys::FORMAT_ORDER.to_string(), json!(default_order));
  defaults.insert(keys::ON_SAVE_ENABLED.to_string(), json!(false));
  defaults.insert(keys::SAVE_ORDER.to_string(), json!(default_order));
  defaults.insert(keys::ERROR_HANDLING.to_string(), json!("default"));
  defaults.insert(keys::BUSY_SIGNAL.to_string(), json!(true));
  defaults.insert(keys::STATUS_BAR.to_string(), json!(true));

  for profile in profiles {
    let key = |suffix: &str| keys::formatter_key(&profile.name, suffix);
    defaults.insert(key(keys::LOCAL_BINS), json!(profile.default_local_bins()));
    defaults.insert(key(keys::LOCAL_CMD_ARGS), json!([]));
    defaults.insert(key(keys::LOCAL_CONFIGS), json!(profile.default_local_configs));
    defaults.insert(key(keys::GLOBAL_BIN_PATH), json!(""));
    defaults.insert(key(keys::GLOBAL_CMD_ARGS), json!([]));
    defaults.insert(key(keys::GLOBAL_CONFIGS), json!([]));
  }

  defaults
}
