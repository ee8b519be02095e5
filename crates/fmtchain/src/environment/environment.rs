use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;

use crate::utils::LogLevel;

/// Output of a command run through the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
  /// `None` when the process was terminated by a signal.
  pub exit_code: Option<i32>,
}

/// Everything the formatting pipeline needs from the outside world.
///
/// Filesystem probes never error. A path that can't be accessed is
/// treated the same as a path that doesn't exist.
pub trait Environment: Clone + 'static {
  fn path_exists(&self, path: &Path) -> bool;
  fn is_readable(&self, path: &Path) -> bool;
  fn is_executable(&self, path: &Path) -> bool;
  fn read_file(&self, path: &Path) -> std::io::Result<String>;
  fn get_home_dir(&self) -> Option<PathBuf>;
  /// Looks up a command name on the `PATH`.
  fn which(&self, command_name: &str) -> Option<PathBuf>;
  /// Runs the command line through the platform's shell, writing
  /// `stdin_text` to the process' stdin when provided.
  #[allow(async_fn_in_trait)]
  async fn run_shell_command(&self, command_line: &str, stdin_text: Option<String>) -> Result<CommandOutput>;
  fn log_level(&self) -> LogLevel;
  fn log_stderr_with_context(&self, text: &str, context_name: &str);
  fn log_stderr(&self, text: &str) {
    self.log_stderr_with_context(text, crate::utils::DEFAULT_CONTEXT_NAME);
  }
}

// use macros here so the expressions provided are only evaluated when the log level allows it

macro_rules! log_debug {
  ($environment:expr, $($arg:tt)*) => {
    if $environment.log_level().is_debug() {
      $environment.log_stderr(&format!($($arg)*));
    }
  }
}

macro_rules! log_warn {
  ($environment:expr, $($arg:tt)*) => {
    if $environment.log_level().is_warn() {
      $environment.log_stderr(&format!($($arg)*));
    }
  }
}

#[allow(unused_macros)]
macro_rules! log_error {
  ($environment:expr, $($arg:tt)*) => {
    if $environment.log_level().is_error() {
      $environment.log_stderr(&format!($($arg)*));
    }
  }
}
