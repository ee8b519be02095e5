use std::cell::Cell;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::host::Document;
use crate::host::DocumentId;
use crate::host::EditorHost;
use crate::host::Notification;
use crate::host::Position;
use crate::host::StatusSnapshot;
use crate::host::clamp_position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
  ProgressStarted(String),
  ProgressFinished(String),
  Notification(Notification),
  Status(Option<StatusSnapshot>),
}

/// Host that records everything reported to it.
#[derive(Default)]
pub struct TestHost {
  events: RefCell<Vec<HostEvent>>,
  active_document: RefCell<Option<Rc<dyn Document>>>,
}

impl TestHost {
  pub fn new() -> Rc<TestHost> {
    Rc::new(TestHost::default())
  }

  pub fn set_active_document(&self, document: Option<Rc<dyn Document>>) {
    *self.active_document.borrow_mut() = document;
  }

  pub fn notifications(&self) -> Vec<Notification> {
    self
      .events
      .borrow()
      .iter()
      .filter_map(|event| match event {
        HostEvent::Notification(notification) => Some(notification.clone()),
        _ => None,
      })
      .collect()
  }

  pub fn progress_events(&self) -> Vec<HostEvent> {
    self
      .events
      .borrow()
      .iter()
      .filter(|event| matches!(event, HostEvent::ProgressStarted(_) | HostEvent::ProgressFinished(_)))
      .cloned()
      .collect()
  }

  pub fn last_status(&self) -> Option<Option<StatusSnapshot>> {
    self.events.borrow().iter().rev().find_map(|event| match event {
      HostEvent::Status(status) => Some(status.clone()),
      _ => None,
    })
  }
}

impl EditorHost for TestHost {
  fn active_document(&self) -> Option<Rc<dyn Document>> {
    self.active_document.borrow().clone()
  }

  fn report_progress(&self, label: &str) {
    self.events.borrow_mut().push(HostEvent::ProgressStarted(label.to_string()));
  }

  fn clear_progress(&self, label: &str) {
    self.events.borrow_mut().push(HostEvent::ProgressFinished(label.to_string()));
  }

  fn report_error(&self, notification: Notification) {
    self.events.borrow_mut().push(HostEvent::Notification(notification));
  }

  fn render_status(&self, status: Option<&StatusSnapshot>) {
    self.events.borrow_mut().push(HostEvent::Status(status.cloned()));
  }
}

/// In-memory document. The display path is the path without its
/// leading separator.
pub struct TestDocument {
  id: DocumentId,
  path: PathBuf,
  text: RefCell<String>,
  cursor: Cell<Position>,
  in_scope: Cell<bool>,
}

impl TestDocument {
  pub fn new(id: u64, path: &str, text: &str) -> Rc<TestDocument> {
    Rc::new(TestDocument {
      id: DocumentId(id),
      path: PathBuf::from(path),
      text: RefCell::new(text.to_string()),
      cursor: Default::default(),
      in_scope: Cell::new(true),
    })
  }

  pub fn set_in_scope(&self, in_scope: bool) {
    self.in_scope.set(in_scope);
  }
}

impl Document for TestDocument {
  fn id(&self) -> DocumentId {
    self.id
  }

  fn path(&self) -> PathBuf {
    self.path.clone()
  }

  fn display_path(&self) -> String {
    let path = self.path.display().to_string();
    path.trim_start_matches('/').to_string()
  }

  fn text(&self) -> String {
    self.text.borrow().clone()
  }

  fn set_text(&self, text: &str) {
    *self.text.borrow_mut() = text.to_string();
  }

  fn cursor_position(&self) -> Position {
    self.cursor.get()
  }

  fn set_cursor_position(&self, position: Position) {
    self.cursor.set(clamp_position(&self.text.borrow(), position));
  }

  fn is_in_formatting_scope(&self) -> bool {
    self.in_scope.get()
  }
}
