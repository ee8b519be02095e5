pub const FORMAT_ORDER: &str = "formatOrder";
pub const ON_SAVE_ENABLED: &str = "onSave.enabled";
pub const SAVE_ORDER: &str = "onSave.saveOrder";
pub const ERROR_HANDLING: &str = "errorHandling";
pub const BUSY_SIGNAL: &str = "busySignal";
pub const STATUS_BAR: &str = "statusBar";

pub const LOCAL_BINS: &str = "local.bins";
pub const LOCAL_CMD_ARGS: &str = "local.cmdArgs";
pub const LOCAL_CONFIGS: &str = "local.configs";
pub const GLOBAL_BIN_PATH: &str = "global.binPath";
pub const GLOBAL_CMD_ARGS: &str = "global.cmdArgs";
pub const GLOBAL_CONFIGS: &str = "global.configs";

/// Key of a setting namespaced to a formatter (ex. `black.local.bins`).
pub fn formatter_key(formatter_name: &str, key: &str) -> String {
  format!("{}.{}", formatter_name, key)
}
