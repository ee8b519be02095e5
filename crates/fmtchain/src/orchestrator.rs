use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use anyhow::bail;
use crossterm::style::Stylize;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::environment::Environment;
use crate::errors::ConfigurationError;
use crate::errors::ErrorReporter;
use crate::formatter::FormatterProfile;
use crate::formatter::FormatterUnit;
use crate::formatter::builtin_profiles;
use crate::host::Document;
use crate::host::DocumentId;
use crate::host::EditorHost;
use crate::host::StatusSnapshot;
use crate::progress::ProgressTracker;
use crate::sequencer::ChainStep;
use crate::sequencer::FormatterRegistry;
use crate::sequencer::Sequencer;
use crate::settings::ErrorHandling;
use crate::settings::OrderKind;
use crate::settings::SettingsSource;
use crate::settings::Subscription;
use crate::settings::keys;
use crate::settings::observe_debounced;
use crate::settings::value_to_bool;
use crate::settings::value_to_string_list;
use crate::utils::Debouncer;
use crate::utils::SETTINGS_DEBOUNCE_DELAY;

pub const COMMAND_PREFIX: &str = "fmtchain";
pub const FORMAT_COMMAND: &str = "fmtchain:format";
pub const TOGGLE_FORMAT_ON_SAVE_COMMAND: &str = "fmtchain:toggle-format-on-save";

pub type ChainHandle = JoinHandle<Vec<ChainStep>>;

/// Names of the commands an orchestrator created from these profiles
/// will register. Available before initializing it.
pub fn profile_command_names(profiles: &[FormatterProfile]) -> Vec<String> {
  command_names_for(profiles.iter().map(|profile| profile.name.as_str()))
}

fn command_names_for<'a>(formatter_names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
  let mut names = vec![FORMAT_COMMAND.to_string(), TOGGLE_FORMAT_ON_SAVE_COMMAND.to_string()];
  for formatter_name in formatter_names {
    let name = format!("{}:{}", COMMAND_PREFIX, formatter_name);
    if !names.contains(&name) {
      names.push(name);
    }
  }
  names
}

pub struct OrchestratorOptions {
  pub profiles: Vec<FormatterProfile>,
  pub settings_debounce: Duration,
}

impl Default for OrchestratorOptions {
  fn default() -> Self {
    Self {
      profiles: builtin_profiles(),
      settings_debounce: SETTINGS_DEBOUNCE_DELAY,
    }
  }
}

#[derive(Default)]
struct OrchestratorState {
  format_order: Vec<String>,
  save_order: Vec<String>,
  on_save_enabled: bool,
  status_bar: bool,
  active_document: Option<Rc<dyn Document>>,
  /// Documents in formatting scope that get formatted on save.
  save_watch: HashSet<DocumentId>,
}

/// Owns the formatters and wires them to the editor's commands,
/// settings and document events.
pub struct Orchestrator<TEnvironment: Environment> {
  environment: TEnvironment,
  host: Rc<dyn EditorHost>,
  settings: Rc<dyn SettingsSource>,
  units: Rc<FormatterRegistry<TEnvironment>>,
  sequencer: Sequencer<TEnvironment>,
  progress: ProgressTracker,
  reporter: ErrorReporter<TEnvironment>,
  debouncer: Rc<Debouncer>,
  state: RefCell<OrchestratorState>,
  subscriptions: RefCell<Vec<Subscription>>,
}

impl<TEnvironment: Environment> Orchestrator<TEnvironment> {
  /// Creates the formatters and subscribes to the settings. Current
  /// setting values are applied before this returns.
  pub fn initialize(
    environment: TEnvironment,
    host: Rc<dyn EditorHost>,
    settings: Rc<dyn SettingsSource>,
    options: OrchestratorOptions,
  ) -> Rc<Self> {
    let reporter = ErrorReporter::new(environment.clone(), host.clone());
    let mut units = IndexMap::new();
    for profile in options.profiles {
      let name = profile.name.clone();
      if units.contains_key(&name) {
        log_warn!(environment, "{} Ignoring duplicate formatter profile: {}", "Warning".yellow(), name);
        continue;
      }
      units.insert(name, Rc::new(FormatterUnit::new(profile, environment.clone(), reporter.clone())));
    }
    let units = Rc::new(units);
    let progress = ProgressTracker::new(host.clone());
    let sequencer = Sequencer::new(environment.clone(), units.clone(), progress.clone(), reporter.clone());

    let orchestrator = Rc::new(Self {
      environment,
      host,
      settings,
      units,
      sequencer,
      progress,
      reporter,
      debouncer: Rc::new(Debouncer::new(options.settings_debounce)),
      state: Default::default(),
      subscriptions: Default::default(),
    });
    orchestrator.subscribe();

    if let Some(document) = orchestrator.host.active_document() {
      orchestrator.on_document_opened(&document);
      orchestrator.on_active_document_changed(Some(document));
    } else {
      orchestrator.render_status();
    }
    log_debug!(
      orchestrator.environment,
      "Initialized with formatters: {}",
      orchestrator.units.keys().cloned().collect::<Vec<_>>().join(", ")
    );
    orchestrator
  }

  fn subscribe(self: &Rc<Self>) {
    let settings = self.settings.clone();
    let mut subscriptions = Vec::new();

    // first, so that problems found while applying the other settings are shown accordingly
    subscriptions.push(settings.observe(
      keys::ERROR_HANDLING,
      Box::new(self.with_self(|orchestrator, value| orchestrator.reporter.set_handling(ErrorHandling::from_value(value)))),
    ));
    subscriptions.push(settings.observe(
      keys::BUSY_SIGNAL,
      Box::new(self.with_self(|orchestrator, value| orchestrator.progress.set_enabled(value_to_bool(value)))),
    ));
    subscriptions.push(settings.observe(
      keys::STATUS_BAR,
      Box::new(self.with_self(|orchestrator, value| orchestrator.set_status_bar(value_to_bool(value)))),
    ));
    subscriptions.push(settings.observe(
      keys::ON_SAVE_ENABLED,
      Box::new(self.with_self(|orchestrator, value| {
        orchestrator.state.borrow_mut().on_save_enabled = value_to_bool(value);
        orchestrator.render_status();
      })),
    ));
    for kind in [OrderKind::Format, OrderKind::Save] {
      subscriptions.push(observe_debounced(
        &*settings,
        &self.debouncer,
        kind.setting_key(),
        self.with_self(move |orchestrator, value| orchestrator.set_order(kind, value_to_string_list(value))),
      ));
    }
    for unit in self.units.values() {
      subscriptions.extend(unit.observe_settings(&*settings, &self.debouncer));
    }

    self.subscriptions.borrow_mut().extend(subscriptions);
  }

  fn with_self(self: &Rc<Self>, apply: impl Fn(&Self, &Value) + 'static) -> impl Fn(&Value) + 'static {
    let orchestrator = Rc::downgrade(self);
    move |value| {
      if let Some(orchestrator) = orchestrator.upgrade() {
        apply(&*orchestrator, value);
      }
    }
  }

  pub fn formatter_names(&self) -> Vec<String> {
    self.units.keys().cloned().collect()
  }

  pub fn order(&self, kind: OrderKind) -> Vec<String> {
    let state = self.state.borrow();
    match kind {
      OrderKind::Format => state.format_order.clone(),
      OrderKind::Save => state.save_order.clone(),
    }
  }

  /// Sets a format order. Orders naming an unknown formatter are
  /// rejected as a whole.
  fn set_order(&self, kind: OrderKind, names: Vec<String>) {
    if self.order(kind) == names {
      return;
    }
    let names = match names.iter().find(|name| !self.units.contains_key(name.as_str())) {
      Some(name) => {
        self.reporter.report(&ConfigurationError::UnknownFormatterInOrder { order: kind, name: name.clone() });
        Vec::new()
      }
      None => names,
    };
    log_debug!(self.environment, "{}: [{}]", kind.display_name(), names.join(", "));
    {
      let mut state = self.state.borrow_mut();
      match kind {
        OrderKind::Format => state.format_order = names,
        OrderKind::Save => state.save_order = names,
      }
    }
    self.render_status();
  }

  pub fn command_names(&self) -> Vec<String> {
    command_names_for(self.units.keys().map(String::as_str))
  }

  /// Runs a command. Commands that format are spawned on the current
  /// `LocalSet` and their handle is returned.
  pub fn dispatch_command(self: &Rc<Self>, command_name: &str) -> Result<Option<ChainHandle>> {
    log_debug!(self.environment, "Command: {}", command_name);
    if command_name == FORMAT_COMMAND {
      let orchestrator = self.clone();
      return Ok(Some(tokio::task::spawn_local(async move { orchestrator.format_active_document().await })));
    }
    if command_name == TOGGLE_FORMAT_ON_SAVE_COMMAND {
      self.toggle_format_on_save();
      return Ok(None);
    }
    match command_name.strip_prefix(COMMAND_PREFIX).and_then(|name| name.strip_prefix(':')) {
      Some(name) if self.sequencer.contains(name) => {
        let orchestrator = self.clone();
        let name = name.to_string();
        Ok(Some(tokio::task::spawn_local(async move {
          orchestrator.run_formatter_on_active_document(&name).await
        })))
      }
      _ => bail!("Unknown command: {}", command_name),
    }
  }

  /// Runs the format order on the active document in buffer mode.
  pub async fn format_active_document(&self) -> Vec<ChainStep> {
    let Some(document) = self.host.active_document() else {
      log_debug!(self.environment, "No active document to format.");
      return Vec::new();
    };
    let order = self.order(OrderKind::Format);
    if order.is_empty() {
      self.reporter.report(&ConfigurationError::OrderNotDefined { order: OrderKind::Format });
      return Vec::new();
    }
    self.sequencer.run_chain(document, &order, true).await
  }

  /// Runs a single formatter on the active document in buffer mode.
  pub async fn run_formatter_on_active_document(&self, name: &str) -> Vec<ChainStep> {
    let Some(document) = self.host.active_document() else {
      log_debug!(self.environment, "No active document to format.");
      return Vec::new();
    };
    self.sequencer.run_chain(document, &[name.to_string()], true).await
  }

  pub fn toggle_format_on_save(&self) {
    self.settings.toggle(keys::ON_SAVE_ENABLED);
  }

  pub fn on_document_opened(&self, document: &Rc<dyn Document>) {
    self.update_save_watch(document);
  }

  /// Re-evaluates whether the document is formatted on save.
  pub fn on_scope_changed(&self, document: &Rc<dyn Document>) {
    self.update_save_watch(document);
    if self.is_active(document.id()) {
      self.render_status();
    }
  }

  pub fn on_active_document_changed(&self, document: Option<Rc<dyn Document>>) {
    self.state.borrow_mut().active_document = document;
    self.render_status();
  }

  pub fn on_document_closed(&self, id: DocumentId) {
    let was_active = {
      let mut state = self.state.borrow_mut();
      state.save_watch.remove(&id);
      let was_active = state.active_document.as_ref().is_some_and(|d| d.id() == id);
      if was_active {
        state.active_document = None;
      }
      was_active
    };
    if was_active {
      self.render_status();
    }
  }

  /// Formats the document in file mode when format on save applies to it.
  pub fn on_document_saved(self: &Rc<Self>, document: Rc<dyn Document>) -> Option<ChainHandle> {
    {
      let state = self.state.borrow();
      if !state.on_save_enabled || !state.save_watch.contains(&document.id()) {
        return None;
      }
    }
    let orchestrator = self.clone();
    Some(tokio::task::spawn_local(async move { orchestrator.format_on_save(document).await }))
  }

  async fn format_on_save(&self, document: Rc<dyn Document>) -> Vec<ChainStep> {
    let order = self.order(OrderKind::Save);
    if order.is_empty() {
      self.reporter.report(&ConfigurationError::OrderNotDefined { order: OrderKind::Save });
      return Vec::new();
    }
    self.sequencer.run_chain(document, &order, false).await
  }

  fn update_save_watch(&self, document: &Rc<dyn Document>) {
    let mut state = self.state.borrow_mut();
    if document.is_in_formatting_scope() {
      state.save_watch.insert(document.id());
    } else {
      state.save_watch.remove(&document.id());
    }
  }

  fn is_active(&self, id: DocumentId) -> bool {
    self.state.borrow().active_document.as_ref().is_some_and(|d| d.id() == id)
  }

  pub fn status_snapshot(&self) -> StatusSnapshot {
    let state = self.state.borrow();
    let active_document = state.active_document.as_ref();
    StatusSnapshot {
      show_tick: state.on_save_enabled,
      show_tile: active_document.is_some_and(|d| d.is_in_formatting_scope()),
      active_path: active_document.map(|d| d.display_path()),
      format_order: state.format_order.clone(),
      save_order: state.save_order.clone(),
    }
  }

  fn set_status_bar(&self, enabled: bool) {
    let was_enabled = std::mem::replace(&mut self.state.borrow_mut().status_bar, enabled);
    if enabled {
      self.render_status();
    } else if was_enabled {
      self.host.render_status(None);
    }
  }

  fn render_status(&self) {
    if !self.state.borrow().status_bar {
      return;
    }
    let snapshot = self.status_snapshot();
    self.host.render_status(Some(&snapshot));
  }

  /// Stops observing settings, drops pending setting updates and
  /// removes the status tile. Chains already running still complete.
  pub fn shutdown(&self) {
    let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
    drop(subscriptions);
    self.debouncer.cancel_all();
    {
      let mut state = self.state.borrow_mut();
      state.save_watch.clear();
      state.active_document = None;
    }
    self.host.render_status(None);
    log_debug!(self.environment, "Shut down.");
  }
}
