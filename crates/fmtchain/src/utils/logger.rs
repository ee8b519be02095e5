use parking_lot::Mutex;
use std::io::Stderr;
use std::io::Write;
use std::io::stderr;
use std::sync::Arc;

pub const DEFAULT_CONTEXT_NAME: &str = "fmtchain";

#[derive(Clone)]
pub struct LoggerOptions {
  pub initial_context_name: String,
}

impl Default for LoggerOptions {
  fn default() -> Self {
    Self {
      initial_context_name: DEFAULT_CONTEXT_NAME.to_string(),
    }
  }
}

/// Writes log text to stderr.
///
/// Stdout is reserved for the editor service protocol, so nothing
/// logged here ever goes there.
#[derive(Clone)]
pub struct Logger {
  output_lock: Arc<Mutex<LoggerState>>,
}

struct LoggerState {
  last_context_name: String,
  std_err: Stderr,
}

impl Logger {
  pub fn new(options: &LoggerOptions) -> Self {
    Logger {
      output_lock: Arc::new(Mutex::new(LoggerState {
        last_context_name: options.initial_context_name.clone(),
        std_err: stderr(),
      })),
    }
  }

  pub fn log_stderr(&self, text: &str) {
    self.log_stderr_with_context(text, DEFAULT_CONTEXT_NAME);
  }

  /// Logs the text, outputting the context name first when it differs
  /// from the context of the previous log.
  pub fn log_stderr_with_context(&self, text: &str, context_name: &str) {
    let mut state = self.output_lock.lock();
    let output_text = render_log_text(&mut state.last_context_name, text, context_name);
    // ignore failures writing to stderr since there's nowhere else to report them
    let _ = write!(state.std_err, "{}", output_text);
    let _ = state.std_err.flush();
  }
}

fn render_log_text(last_context_name: &mut String, text: &str, context_name: &str) -> String {
  let mut output_text = String::new();
  if last_context_name != context_name {
    output_text.push_str(&format!("[{}]\n", context_name));
    *last_context_name = context_name.to_string();
  }

  output_text.push_str(text);

  // only add a newline if the logged text does not end with one
  if !output_text.ends_with('\n') {
    output_text.push('\n');
  }
  output_text
}
