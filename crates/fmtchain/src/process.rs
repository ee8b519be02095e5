use std::path::Path;
use std::rc::Rc;

use crate::environment::Environment;
use crate::errors::ErrorReporter;
use crate::errors::ProcessWarning;
use crate::host::Document;
use crate::utils::quote_path_if_needed;

/// What happened when running a formatter process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRun {
  /// The process exited. The exit code is informational only.
  Exited { exit_code: Option<i32> },
  /// The shell couldn't be started. Already reported.
  SpawnFailed,
}

/// Runs formatter binaries through the shell and applies their output.
pub struct ProcessRunner<TEnvironment: Environment> {
  environment: TEnvironment,
  reporter: ErrorReporter<TEnvironment>,
}

impl<TEnvironment: Environment> ProcessRunner<TEnvironment> {
  pub fn new(environment: TEnvironment, reporter: ErrorReporter<TEnvironment>) -> Self {
    Self { environment, reporter }
  }

  /// In buffer mode the document's text is piped through the process
  /// and replaced by its stdout regardless of the exit code.
  pub async fn run(&self, document: &Rc<dyn Document>, command: &Path, args: &[String], use_buffer: bool) -> ProcessRun {
    let command_line = build_command_line(command, args);
    let cursor = document.cursor_position();
    let stdin_text = if use_buffer { Some(document.text()) } else { None };

    log_debug!(self.environment, "Running: {}", command_line);
    let output = match self.environment.run_shell_command(&command_line, stdin_text).await {
      Ok(output) => output,
      Err(err) => {
        self.reporter.report(&ProcessWarning::SpawnFailed {
          command_line,
          message: format!("{:#}", err),
        });
        return ProcessRun::SpawnFailed;
      }
    };

    match output.exit_code {
      Some(code) => log_debug!(self.environment, "Exited with code {}: {}", code, command_line),
      None => log_debug!(self.environment, "Exited without a code: {}", command_line),
    }

    if !output.stderr.trim().is_empty() {
      self.reporter.report(&ProcessWarning::Stderr {
        command_line: command_line.clone(),
        stderr: output.stderr.trim_end().to_string(),
      });
    }

    if use_buffer {
      document.set_text(&output.stdout);
      document.set_cursor_position(cursor);
    }

    ProcessRun::Exited {
      exit_code: output.exit_code,
    }
  }
}

pub fn build_command_line(command: &Path, args: &[String]) -> String {
  let mut parts = Vec::with_capacity(args.len() + 1);
  parts.push(quote_path_if_needed(command));
  parts.extend(args.iter().cloned());
  parts.join(" ")
}
