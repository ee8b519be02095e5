use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::host::DocumentId;
use crate::host::Notification;
use crate::host::Position;
use crate::host::StatusSnapshot;

/// A message sent by the editor. One JSON object per line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IncomingMessage {
  #[serde(rename_all = "camelCase")]
  OpenDocument {
    id: DocumentId,
    path: PathBuf,
    #[serde(default)]
    display_path: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    cursor: Position,
    #[serde(default = "default_in_scope")]
    in_scope: bool,
  },
  UpdateDocument {
    id: DocumentId,
    text: String,
    #[serde(default)]
    cursor: Option<Position>,
  },
  CloseDocument {
    id: DocumentId,
  },
  #[serde(rename_all = "camelCase")]
  ScopeChanged {
    id: DocumentId,
    in_scope: bool,
  },
  ActiveDocumentChanged {
    #[serde(default)]
    id: Option<DocumentId>,
  },
  Saved {
    id: DocumentId,
  },
  Setting {
    key: String,
    value: Value,
  },
  Command {
    name: String,
  },
  Shutdown,
}

fn default_in_scope() -> bool {
  true
}

/// A message sent to the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutgoingMessage {
  SetText { id: DocumentId, text: String },
  SetCursor { id: DocumentId, cursor: Position },
  ProgressStarted { label: String },
  ProgressFinished { label: String },
  Notification(Notification),
  Status { snapshot: Option<StatusSnapshot> },
  Commands { names: Vec<String> },
}

/// Writes newline delimited JSON messages. Clones share the writer.
#[derive(Clone)]
pub struct MessageWriter {
  writer: Rc<RefCell<Box<dyn Write>>>,
}

impl MessageWriter {
  pub fn new(writer: Box<dyn Write>) -> Self {
    Self {
      writer: Rc::new(RefCell::new(writer)),
    }
  }

  pub fn send(&self, message: &OutgoingMessage) -> Result<()> {
    let mut text = serde_json::to_string(message).context("Error serializing message.")?;
    text.push('\n');
    let mut writer = self.writer.borrow_mut();
    writer.write_all(text.as_bytes()).context("Error writing message.")?;
    writer.flush().context("Error flushing message.")?;
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use pretty_assertions::assert_eq;
  use serde_json::json;

  use super::*;

  #[test]
  fn reads_incoming_messages() {
    let message: IncomingMessage = serde_json::from_str(
      r#"{"type":"openDocument","id":3,"path":"/project/main.py","displayPath":"main.py","text":"x=1","cursor":{"row":0,"column":2}}"#,
    )
    .unwrap();
    assert_eq!(
      message,
      IncomingMessage::OpenDocument {
        id: DocumentId(3),
        path: PathBuf::from("/project/main.py"),
        display_path: Some("main.py".to_string()),
        text: "x=1".to_string(),
        cursor: Position { row: 0, column: 2 },
        in_scope: true,
      }
    );

    let message: IncomingMessage = serde_json::from_str(r#"{"type":"activeDocumentChanged","id":null}"#).unwrap();
    assert_eq!(message, IncomingMessage::ActiveDocumentChanged { id: None });

    let message: IncomingMessage = serde_json::from_str(r#"{"type":"scopeChanged","id":1,"inScope":false}"#).unwrap();
    assert_eq!(
      message,
      IncomingMessage::ScopeChanged {
        id: DocumentId(1),
        in_scope: false,
      }
    );

    let message: IncomingMessage = serde_json::from_str(r#"{"type":"shutdown"}"#).unwrap();
    assert_eq!(message, IncomingMessage::Shutdown);

    assert!(serde_json::from_str::<IncomingMessage>(r#"{"type":"format"}"#).is_err());
  }

  #[test]
  fn writes_outgoing_messages() {
    let status = serde_json::to_value(OutgoingMessage::Status {
      snapshot: Some(StatusSnapshot {
        show_tick: true,
        show_tile: false,
        active_path: None,
        format_order: vec!["black".to_string()],
        save_order: Vec::new(),
      }),
    })
    .unwrap();
    assert_eq!(
      status,
      json!({
        "type": "status",
        "snapshot": {
          "showTick": true,
          "showTile": false,
          "activePath": null,
          "formatOrder": ["black"],
          "saveOrder": [],
        },
      })
    );

    let notification = serde_json::to_value(OutgoingMessage::Notification(Notification {
      title: "fmtchain: Format order not defined".to_string(),
      detail: None,
      sticky: false,
    }))
    .unwrap();
    assert_eq!(
      notification,
      json!({
        "type": "notification",
        "title": "fmtchain: Format order not defined",
        "detail": null,
        "sticky": false,
      })
    );
  }
}
