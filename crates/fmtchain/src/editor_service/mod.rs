use std::io::Write;
use std::rc::Rc;

use anyhow::Result;
use crossterm::style::Stylize;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;

mod host;
mod messages;

pub use host::*;
pub use messages::*;

use crate::environment::Environment;
use crate::host::Document;
use crate::host::DocumentId;
use crate::host::EditorHost;
use crate::orchestrator::ChainHandle;
use crate::orchestrator::Orchestrator;
use crate::orchestrator::OrchestratorOptions;
use crate::orchestrator::profile_command_names;
use crate::settings::SettingsSource;
use crate::settings::SettingsStore;

/// Runs the engine for an editor that talks to it over newline
/// delimited JSON. Returns once the input ends or a shutdown message
/// is received and every started chain has completed.
pub async fn run_editor_service<TEnvironment: Environment>(
  environment: TEnvironment,
  settings: SettingsStore,
  options: OrchestratorOptions,
  reader: impl AsyncBufRead + Unpin,
  writer: Box<dyn Write>,
) -> Result<()> {
  let writer = MessageWriter::new(writer);
  // sent before initializing since that already renders the status
  writer.send(&OutgoingMessage::Commands {
    names: profile_command_names(&options.profiles),
  })?;
  let host = Rc::new(ServiceHost::new(environment.clone(), writer.clone()));
  let orchestrator = Orchestrator::initialize(environment.clone(), host.clone(), Rc::new(settings.clone()), options);

  let mut editor_service = EditorService {
    environment,
    settings,
    writer,
    host,
    orchestrator,
    chains: Vec::new(),
  };
  let result = editor_service.run(reader).await;
  editor_service.finish().await;
  result
}

struct EditorService<TEnvironment: Environment> {
  environment: TEnvironment,
  settings: SettingsStore,
  writer: MessageWriter,
  host: Rc<ServiceHost<TEnvironment>>,
  orchestrator: Rc<Orchestrator<TEnvironment>>,
  chains: Vec<ChainHandle>,
}

impl<TEnvironment: Environment> EditorService<TEnvironment> {
  async fn run(&mut self, reader: impl AsyncBufRead + Unpin) -> Result<()> {
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
      if line.trim().is_empty() {
        continue;
      }
      let message = match serde_json::from_str::<IncomingMessage>(&line) {
        Ok(message) => message,
        Err(err) => {
          log_warn!(self.environment, "{} Skipping malformed message. {:#}", "Warning".yellow(), err);
          continue;
        }
      };
      if !self.handle_message(message) {
        break;
      }
      self.chains.retain(|chain| !chain.is_finished());
    }
    Ok(())
  }

  /// Returns `false` when the service should stop.
  fn handle_message(&mut self, message: IncomingMessage) -> bool {
    match message {
      IncomingMessage::OpenDocument {
        id,
        path,
        display_path,
        text,
        cursor,
        in_scope,
      } => {
        let document = Rc::new(ServiceDocument::new(
          id,
          path,
          display_path,
          text,
          cursor,
          in_scope,
          self.environment.clone(),
          self.writer.clone(),
        ));
        self.host.open_document(document.clone());
        let document: Rc<dyn Document> = document;
        self.orchestrator.on_document_opened(&document);
      }
      IncomingMessage::UpdateDocument { id, text, cursor } => {
        if let Some(document) = self.document(id) {
          document.update(text, cursor);
        }
      }
      IncomingMessage::CloseDocument { id } => {
        self.host.close_document(id);
        self.orchestrator.on_document_closed(id);
      }
      IncomingMessage::ScopeChanged { id, in_scope } => {
        if let Some(document) = self.document(id) {
          document.set_in_scope(in_scope);
          let document: Rc<dyn Document> = document;
          self.orchestrator.on_scope_changed(&document);
        }
      }
      IncomingMessage::ActiveDocumentChanged { id } => {
        if self.host.set_active_document(id) {
          self.orchestrator.on_active_document_changed(self.host.active_document());
        } else {
          log_warn!(self.environment, "{} Unknown document: {:?}", "Warning".yellow(), id);
        }
      }
      IncomingMessage::Saved { id } => {
        if let Some(document) = self.document(id)
          && let Some(chain) = self.orchestrator.on_document_saved(document)
        {
          self.chains.push(chain);
        }
      }
      IncomingMessage::Setting { key, value } => {
        if !self.settings.is_known_key(&key) {
          log_debug!(self.environment, "Unknown setting: {}", key);
        }
        self.settings.set(&key, value);
      }
      IncomingMessage::Command { name } => match self.orchestrator.dispatch_command(&name) {
        Ok(Some(chain)) => self.chains.push(chain),
        Ok(None) => {}
        Err(err) => log_warn!(self.environment, "{} {:#}", "Warning".yellow(), err),
      },
      IncomingMessage::Shutdown => return false,
    }
    true
  }

  fn document(&self, id: DocumentId) -> Option<Rc<ServiceDocument<TEnvironment>>> {
    let document = self.host.document(id);
    if document.is_none() {
      log_warn!(self.environment, "{} Unknown document: {}", "Warning".yellow(), id.0);
    }
    document
  }

  async fn finish(&mut self) {
    for chain in self.chains.drain(..) {
      if let Err(err) = chain.await {
        log_error!(self.environment, "Formatting task failed. {:#}", err);
      }
    }
    self.orchestrator.shutdown();
  }
}
