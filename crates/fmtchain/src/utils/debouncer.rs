use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Quiet period used for settings that are expensive to apply.
pub const SETTINGS_DEBOUNCE_DELAY: Duration = Duration::from_millis(1000);

/// Collapses repeated calls for the same key into one call of the
/// most recent action after the delay elapses.
///
/// The timers are local tasks, so `call` must happen within a
/// `tokio::task::LocalSet` unless the delay is zero, in which case
/// the action runs immediately.
pub struct Debouncer {
  delay: Duration,
  pending: Rc<RefCell<HashMap<String, JoinHandle<()>>>>,
}

impl Debouncer {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      pending: Default::default(),
    }
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  pub fn call(&self, key: &str, action: impl FnOnce() + 'static) {
    if let Some(handle) = self.pending.borrow_mut().remove(key) {
      handle.abort();
    }

    if self.delay.is_zero() {
      action();
      return;
    }

    let pending = self.pending.clone();
    let delay = self.delay;
    let task_key = key.to_string();
    let handle = tokio::task::spawn_local(async move {
      tokio::time::sleep(delay).await;
      pending.borrow_mut().remove(&task_key);
      action();
    });
    self.pending.borrow_mut().insert(key.to_string(), handle);
  }

  pub fn pending_count(&self) -> usize {
    self.pending.borrow().len()
  }

  pub fn cancel_all(&self) {
    for (_, handle) in self.pending.borrow_mut().drain() {
      handle.abort();
    }
  }
}

impl Drop for Debouncer {
  fn drop(&mut self) {
    self.cancel_all();
  }
}
