use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;

use crate::host::EditorHost;

struct BusySignalEntry {
  label: String,
  started: Instant,
}

struct ProgressState {
  host: Rc<dyn EditorHost>,
  entries: RefCell<Vec<BusySignalEntry>>,
  enabled: Cell<bool>,
}

/// Tracks in-flight work and forwards it to the host's busy signal
/// while enabled.
///
/// Entries are tracked even when disabled so that enabling it shows
/// the work already in progress.
#[derive(Clone)]
pub struct ProgressTracker {
  state: Rc<ProgressState>,
}

impl ProgressTracker {
  pub fn new(host: Rc<dyn EditorHost>) -> Self {
    Self {
      state: Rc::new(ProgressState {
        host,
        entries: Default::default(),
        enabled: Cell::new(true),
      }),
    }
  }

  pub fn add(&self, label: &str) {
    self.state.entries.borrow_mut().push(BusySignalEntry {
      label: label.to_string(),
      started: Instant::now(),
    });
    if self.state.enabled.get() {
      self.state.host.report_progress(label);
    }
  }

  /// Removes the oldest entry with the label, returning how long it
  /// was in progress. Does nothing when no such entry exists.
  ///
  /// The host's busy signal for the label is only cleared once no
  /// other entry with the same label remains.
  pub fn remove(&self, label: &str) -> Option<Duration> {
    let (entry, label_in_use) = {
      let mut entries = self.state.entries.borrow_mut();
      let index = entries.iter().position(|e| e.label == label)?;
      let entry = entries.remove(index);
      (entry, entries.iter().any(|e| e.label == label))
    };
    if self.state.enabled.get() && !label_in_use {
      self.state.host.clear_progress(label);
    }
    Some(entry.started.elapsed())
  }

  pub fn set_enabled(&self, enabled: bool) {
    if self.state.enabled.replace(enabled) == enabled {
      return;
    }
    for label in self.active_labels() {
      if enabled {
        self.state.host.report_progress(&label);
      } else {
        self.state.host.clear_progress(&label);
      }
    }
  }

  pub fn is_enabled(&self) -> bool {
    self.state.enabled.get()
  }

  pub fn active_labels(&self) -> Vec<String> {
    self.state.entries.borrow().iter().map(|e| e.label.clone()).collect()
  }
}
