use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

use crate::environment::Environment;
use crate::host::EditorHost;
use crate::host::Notification;
use crate::settings::ErrorHandling;
use crate::settings::OrderKind;

pub const NOTIFICATION_TITLE_PREFIX: &str = "fmtchain";

/// Something the user should be told about. The `Display` text is
/// the notification's detail.
pub trait Reportable: std::fmt::Display {
  fn title(&self) -> String;

  fn detail(&self) -> Option<String> {
    Some(self.to_string())
  }
}

/// A setting was rejected. The offending list is reset to empty.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
  #[error("'{entry}' is not a valid file name.")]
  InvalidLocalBinName { formatter: String, entry: String },
  #[error("'{}' not found or not executable.", path.display())]
  InvalidGlobalBinPath { formatter: String, path: PathBuf },
  #[error("'{entry}' is not a valid file name.")]
  InvalidConfigName { formatter: String, entry: String },
  #[error("'{}' not found or not readable.", path.display())]
  InvalidConfigPath { formatter: String, path: PathBuf },
  #[error("'{name}' is not a valid formatter name.")]
  UnknownFormatterInOrder { order: OrderKind, name: String },
  #[error("{} not defined", order.display_name())]
  OrderNotDefined { order: OrderKind },
}

impl Reportable for ConfigurationError {
  fn title(&self) -> String {
    use ConfigurationError::*;
    match self {
      InvalidLocalBinName { formatter, .. } => format!("Invalid local binary path for {}", formatter),
      InvalidGlobalBinPath { formatter, .. } => format!("Invalid global binary path for {}", formatter),
      InvalidConfigName { formatter, .. } => format!("Invalid local configs for {}", formatter),
      InvalidConfigPath { formatter, .. } => format!("Invalid global config path for {}", formatter),
      UnknownFormatterInOrder { order, .. } => format!("Invalid {}", order.display_name().to_lowercase()),
      OrderNotDefined { .. } => self.to_string(),
    }
  }

  fn detail(&self) -> Option<String> {
    match self {
      ConfigurationError::OrderNotDefined { .. } => None,
      _ => Some(self.to_string()),
    }
  }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionFailure {
  #[error("Could not find binary for {formatter}")]
  BinaryNotFound { formatter: String },
  #[error("Unknown formatter {formatter}")]
  UnknownFormatter { formatter: String },
}

impl Reportable for ResolutionFailure {
  fn title(&self) -> String {
    self.to_string()
  }

  fn detail(&self) -> Option<String> {
    None
  }
}

/// Problems running a formatter process. These never stop a chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessWarning {
  #[error("{stderr}")]
  Stderr { command_line: String, stderr: String },
  #[error("{message}")]
  SpawnFailed { command_line: String, message: String },
}

impl Reportable for ProcessWarning {
  fn title(&self) -> String {
    match self {
      ProcessWarning::Stderr { command_line, .. } => command_line.clone(),
      ProcessWarning::SpawnFailed { command_line, .. } => format!("Failed to run {}", command_line),
    }
  }
}

/// Surfaces errors through the host's notifications according to the
/// `errorHandling` setting.
pub struct ErrorReporter<TEnvironment: Environment> {
  environment: TEnvironment,
  host: Rc<dyn EditorHost>,
  handling: Rc<Cell<ErrorHandling>>,
}

impl<TEnvironment: Environment> Clone for ErrorReporter<TEnvironment> {
  fn clone(&self) -> Self {
    Self {
      environment: self.environment.clone(),
      host: self.host.clone(),
      handling: self.handling.clone(),
    }
  }
}

impl<TEnvironment: Environment> ErrorReporter<TEnvironment> {
  pub fn new(environment: TEnvironment, host: Rc<dyn EditorHost>) -> Self {
    Self {
      environment,
      host,
      handling: Default::default(),
    }
  }

  /// Changes the handling for this reporter and every clone of it.
  pub fn set_handling(&self, handling: ErrorHandling) {
    self.handling.set(handling);
  }

  pub fn handling(&self) -> ErrorHandling {
    self.handling.get()
  }

  pub fn report(&self, error: &impl Reportable) {
    let title = format!("{}: {}", NOTIFICATION_TITLE_PREFIX, error.title());
    let detail = error.detail();
    log_debug!(self.environment, "{} ({})", title, detail.as_deref().unwrap_or("no detail"));
    let sticky = match self.handling.get() {
      ErrorHandling::Hide => return,
      ErrorHandling::Show => true,
      ErrorHandling::Default => false,
    };
    self.host.report_error(Notification { title, detail, sticky });
  }
}
