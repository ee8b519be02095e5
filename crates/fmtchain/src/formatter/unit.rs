use std::cell::RefCell;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use super::ArgumentBuilder;
use super::FormatterProfile;
use crate::environment::Environment;
use crate::errors::ConfigurationError;
use crate::errors::ErrorReporter;
use crate::errors::ResolutionFailure;
use crate::host::Document;
use crate::process::ProcessRun;
use crate::process::ProcessRunner;
use crate::resolution::BinaryLocator;
use crate::resolution::ConfigLocator;
use crate::resolution::ResolutionScope;
use crate::settings::SettingsSource;
use crate::settings::Subscription;
use crate::settings::keys;
use crate::settings::observe_debounced;
use crate::settings::value_to_string;
use crate::settings::value_to_string_list;
use crate::utils::Debouncer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
  Ran { scope: ResolutionScope, run: ProcessRun },
  /// No binary could be resolved. Already reported.
  BinaryNotFound,
}

/// What to run for a particular file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub binary: PathBuf,
  pub scope: ResolutionScope,
  pub args: Vec<String>,
}

/// A single named formatter along with its settings and caches.
pub struct FormatterUnit<TEnvironment: Environment> {
  profile: Rc<FormatterProfile>,
  environment: TEnvironment,
  reporter: ErrorReporter<TEnvironment>,
  binaries: RefCell<BinaryLocator>,
  local_configs: RefCell<ConfigLocator>,
  global_configs: RefCell<ConfigLocator>,
  local_cmd_args: RefCell<Vec<String>>,
  global_cmd_args: RefCell<Vec<String>>,
  args_builder: ArgumentBuilder,
  runner: ProcessRunner<TEnvironment>,
}

impl<TEnvironment: Environment> FormatterUnit<TEnvironment> {
  pub fn new(profile: FormatterProfile, environment: TEnvironment, reporter: ErrorReporter<TEnvironment>) -> Self {
    let profile = Rc::new(profile);
    let name = profile.name.clone();
    Self {
      args_builder: ArgumentBuilder::new(profile.clone()),
      runner: ProcessRunner::new(environment.clone(), reporter.clone()),
      profile,
      environment,
      reporter,
      binaries: RefCell::new(BinaryLocator::new(&name)),
      local_configs: RefCell::new(ConfigLocator::new(&name)),
      global_configs: RefCell::new(ConfigLocator::new(&name)),
      local_cmd_args: Default::default(),
      global_cmd_args: Default::default(),
    }
  }

  pub fn name(&self) -> &str {
    &self.profile.name
  }

  pub fn profile(&self) -> &FormatterProfile {
    &self.profile
  }

  pub fn set_local_bins(&self, local_bins: Vec<String>) {
    let result = self.binaries.borrow_mut().set_local_bins(local_bins);
    self.log_applied("local binaries", &result);
    self.report_if_error(result);
  }

  pub fn set_global_bin_path(&self, value: &str) {
    let result = self.binaries.borrow_mut().set_global_bin_path(&self.environment, value);
    self.log_applied("global binary path", &result);
    self.report_if_error(result);
  }

  pub fn set_local_configs(&self, configs: Vec<String>) {
    let result = self.local_configs.borrow_mut().set_candidates(&self.environment, configs);
    self.log_applied("local configs", &result);
    self.report_if_error(result);
  }

  pub fn set_global_configs(&self, configs: Vec<String>) {
    let result = self.global_configs.borrow_mut().set_candidates(&self.environment, configs);
    self.log_applied("global configs", &result);
    self.report_if_error(result);
  }

  pub fn set_local_cmd_args(&self, args: Vec<String>) {
    *self.local_cmd_args.borrow_mut() = args;
  }

  pub fn set_global_cmd_args(&self, args: Vec<String>) {
    *self.global_cmd_args.borrow_mut() = args;
  }

  /// Subscribes to this formatter's settings. Binary and config lists
  /// are debounced since changing them invalidates the caches.
  pub fn observe_settings(self: &Rc<Self>, settings: &dyn SettingsSource, debouncer: &Rc<Debouncer>) -> Vec<Subscription> {
    let key = |key: &str| keys::formatter_key(self.name(), key);
    vec![
      observe_debounced(settings, debouncer, &key(keys::LOCAL_BINS), self.with_unit(|unit, value| unit.set_local_bins(value_to_string_list(value)))),
      observe_debounced(settings, debouncer, &key(keys::LOCAL_CONFIGS), self.with_unit(|unit, value| unit.set_local_configs(value_to_string_list(value)))),
      observe_debounced(settings, debouncer, &key(keys::GLOBAL_BIN_PATH), self.with_unit(|unit, value| unit.set_global_bin_path(&value_to_string(value)))),
      observe_debounced(settings, debouncer, &key(keys::GLOBAL_CONFIGS), self.with_unit(|unit, value| unit.set_global_configs(value_to_string_list(value)))),
      settings.observe(&key(keys::LOCAL_CMD_ARGS), Box::new(self.with_unit(|unit, value| unit.set_local_cmd_args(value_to_string_list(value))))),
      settings.observe(&key(keys::GLOBAL_CMD_ARGS), Box::new(self.with_unit(|unit, value| unit.set_global_cmd_args(value_to_string_list(value))))),
    ]
  }

  fn with_unit(self: &Rc<Self>, apply: impl Fn(&Self, &serde_json::Value) + 'static) -> impl Fn(&serde_json::Value) + 'static {
    let unit = Rc::downgrade(self);
    move |value| {
      if let Some(unit) = unit.upgrade() {
        apply(&*unit, value);
      }
    }
  }

  /// Resolves the binary, config and arguments for the file. Binaries
  /// found locally are paired with the local configs and arguments.
  pub fn resolve_invocation(&self, file_path: &Path, use_buffer: bool) -> Option<Invocation> {
    let binary = self.binaries.borrow().resolve(&self.environment, file_path)?;
    let (config_path, mut args) = match binary.scope {
      ResolutionScope::Local => (
        self.local_configs.borrow().resolve(&self.environment, file_path),
        self.local_cmd_args.borrow().clone(),
      ),
      ResolutionScope::Global => (
        self.global_configs.borrow().resolve(&self.environment, file_path),
        self.global_cmd_args.borrow().clone(),
      ),
    };
    args.extend(self.args_builder.build(file_path, config_path.as_deref(), use_buffer).iter().cloned());
    log_debug!(
      self.environment,
      "Resolved {} for {}: binary {}, config {}",
      self.name(),
      file_path.display(),
      binary.path.display(),
      config_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<none>".to_string()),
    );
    Some(Invocation {
      binary: binary.path,
      scope: binary.scope,
      args,
    })
  }

  /// Formats the document. This always completes and any problems
  /// are reported along the way.
  pub async fn format(&self, document: &Rc<dyn Document>, use_buffer: bool) -> FormatOutcome {
    let Some(invocation) = self.resolve_invocation(&document.path(), use_buffer) else {
      self.reporter.report(&ResolutionFailure::BinaryNotFound {
        formatter: self.name().to_string(),
      });
      return FormatOutcome::BinaryNotFound;
    };
    let run = self.runner.run(document, &invocation.binary, &invocation.args, use_buffer).await;
    FormatOutcome::Ran {
      scope: invocation.scope,
      run,
    }
  }

  fn log_applied(&self, what: &str, result: &Result<(), ConfigurationError>) {
    match result {
      Ok(()) => log_debug!(self.environment, "Applied {} for {}.", what, self.name()),
      Err(_) => log_debug!(self.environment, "Reset {} for {}.", what, self.name()),
    }
  }

  fn report_if_error(&self, result: Result<(), ConfigurationError>) {
    if let Err(err) = result {
      self.reporter.report(&err);
    }
  }
}
