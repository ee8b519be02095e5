//! The narrow surface of the editor that hosts the formatters.

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

/// Zero-based cursor position in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
  pub row: u32,
  pub column: u32,
}

/// An open text document.
///
/// Setting a cursor position outside the text is allowed; the
/// implementation clamps it.
pub trait Document {
  fn id(&self) -> DocumentId;
  fn path(&self) -> PathBuf;
  /// Path shown to the user, usually relative to the project.
  fn display_path(&self) -> String;
  fn text(&self) -> String;
  fn set_text(&self, text: &str);
  fn cursor_position(&self) -> Position;
  fn set_cursor_position(&self, position: Position);
  /// Whether the document's grammar is one the formatters apply to.
  fn is_in_formatting_scope(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub title: String,
  pub detail: Option<String>,
  /// Sticky notifications stay until the user dismisses them.
  pub sticky: bool,
}

/// Data for the status bar tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
  /// Format on save is enabled.
  pub show_tick: bool,
  /// The active document is in formatting scope.
  pub show_tile: bool,
  pub active_path: Option<String>,
  pub format_order: Vec<String>,
  pub save_order: Vec<String>,
}

/// Moves the position to the closest one that exists in the text.
pub fn clamp_position(text: &str, position: Position) -> Position {
  let lines = text.split('\n').collect::<Vec<_>>();
  let row = (position.row as usize).min(lines.len().saturating_sub(1));
  let line_len = lines.get(row).map(|line| line.trim_end_matches('\r').chars().count()).unwrap_or(0);
  Position {
    row: row as u32,
    column: (position.column as usize).min(line_len) as u32,
  }
}

pub trait EditorHost {
  fn active_document(&self) -> Option<std::rc::Rc<dyn Document>>;
  fn report_progress(&self, label: &str);
  fn clear_progress(&self, label: &str);
  fn report_error(&self, notification: Notification);
  /// Renders the status tile or removes it when `None`.
  fn render_status(&self, status: Option<&StatusSnapshot>);
}
