use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use super::messages::MessageWriter;
use super::messages::OutgoingMessage;
use crate::environment::Environment;
use crate::host::Document;
use crate::host::DocumentId;
use crate::host::EditorHost;
use crate::host::Notification;
use crate::host::Position;
use crate::host::StatusSnapshot;
use crate::host::clamp_position;

/// Mirror of a document open in the editor. Changes made while
/// formatting are sent back to the editor.
pub struct ServiceDocument<TEnvironment: Environment> {
  id: DocumentId,
  path: PathBuf,
  display_path: String,
  text: RefCell<String>,
  cursor: Cell<Position>,
  in_scope: Cell<bool>,
  environment: TEnvironment,
  writer: MessageWriter,
}

impl<TEnvironment: Environment> ServiceDocument<TEnvironment> {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    id: DocumentId,
    path: PathBuf,
    display_path: Option<String>,
    text: String,
    cursor: Position,
    in_scope: bool,
    environment: TEnvironment,
    writer: MessageWriter,
  ) -> Self {
    let display_path = display_path.unwrap_or_else(|| path.display().to_string());
    let cursor = clamp_position(&text, cursor);
    Self {
      id,
      path,
      display_path,
      text: RefCell::new(text),
      cursor: Cell::new(cursor),
      in_scope: Cell::new(in_scope),
      environment,
      writer,
    }
  }

  /// Applies an edit made in the editor. Nothing is sent back.
  pub fn update(&self, text: String, cursor: Option<Position>) {
    let cursor = clamp_position(&text, cursor.unwrap_or_else(|| self.cursor.get()));
    *self.text.borrow_mut() = text;
    self.cursor.set(cursor);
  }

  pub fn set_in_scope(&self, in_scope: bool) {
    self.in_scope.set(in_scope);
  }

  fn send(&self, message: OutgoingMessage) {
    send_message(&self.environment, &self.writer, message);
  }
}

impl<TEnvironment: Environment> Document for ServiceDocument<TEnvironment> {
  fn id(&self) -> DocumentId {
    self.id
  }

  fn path(&self) -> PathBuf {
    self.path.clone()
  }

  fn display_path(&self) -> String {
    self.display_path.clone()
  }

  fn text(&self) -> String {
    self.text.borrow().clone()
  }

  fn set_text(&self, text: &str) {
    *self.text.borrow_mut() = text.to_string();
    self.send(OutgoingMessage::SetText {
      id: self.id,
      text: text.to_string(),
    });
  }

  fn cursor_position(&self) -> Position {
    self.cursor.get()
  }

  fn set_cursor_position(&self, position: Position) {
    let position = clamp_position(&self.text.borrow(), position);
    self.cursor.set(position);
    self.send(OutgoingMessage::SetCursor {
      id: self.id,
      cursor: position,
    });
  }

  fn is_in_formatting_scope(&self) -> bool {
    self.in_scope.get()
  }
}

/// Editor host backed by the message protocol.
pub struct ServiceHost<TEnvironment: Environment> {
  environment: TEnvironment,
  writer: MessageWriter,
  documents: RefCell<HashMap<DocumentId, Rc<ServiceDocument<TEnvironment>>>>,
  active_document_id: Cell<Option<DocumentId>>,
}

impl<TEnvironment: Environment> ServiceHost<TEnvironment> {
  pub fn new(environment: TEnvironment, writer: MessageWriter) -> Self {
    Self {
      environment,
      writer,
      documents: Default::default(),
      active_document_id: Default::default(),
    }
  }

  pub fn open_document(&self, document: Rc<ServiceDocument<TEnvironment>>) {
    self.documents.borrow_mut().insert(document.id(), document);
  }

  pub fn close_document(&self, id: DocumentId) -> Option<Rc<ServiceDocument<TEnvironment>>> {
    if self.active_document_id.get() == Some(id) {
      self.active_document_id.set(None);
    }
    self.documents.borrow_mut().remove(&id)
  }

  pub fn document(&self, id: DocumentId) -> Option<Rc<ServiceDocument<TEnvironment>>> {
    self.documents.borrow().get(&id).cloned()
  }

  /// Sets the active document, which must have been opened.
  pub fn set_active_document(&self, id: Option<DocumentId>) -> bool {
    match id {
      Some(id) if !self.documents.borrow().contains_key(&id) => false,
      id => {
        self.active_document_id.set(id);
        true
      }
    }
  }
}

impl<TEnvironment: Environment> EditorHost for ServiceHost<TEnvironment> {
  fn active_document(&self) -> Option<Rc<dyn Document>> {
    let id = self.active_document_id.get()?;
    let document = self.document(id)?;
    Some(document)
  }

  fn report_progress(&self, label: &str) {
    send_message(&self.environment, &self.writer, OutgoingMessage::ProgressStarted { label: label.to_string() });
  }

  fn clear_progress(&self, label: &str) {
    send_message(&self.environment, &self.writer, OutgoingMessage::ProgressFinished { label: label.to_string() });
  }

  fn report_error(&self, notification: Notification) {
    send_message(&self.environment, &self.writer, OutgoingMessage::Notification(notification));
  }

  fn render_status(&self, status: Option<&StatusSnapshot>) {
    send_message(&self.environment, &self.writer, OutgoingMessage::Status { snapshot: status.cloned() });
  }
}

fn send_message(environment: &impl Environment, writer: &MessageWriter, message: OutgoingMessage) {
  if let Err(err) = writer.send(&message) {
    log_error!(environment, "Error sending message to the editor. {:#}", err);
  }
}
