use std::rc::Rc;

use indexmap::IndexMap;

use crate::environment::Environment;
use crate::errors::ErrorReporter;
use crate::errors::ResolutionFailure;
use crate::formatter::FormatOutcome;
use crate::formatter::FormatterUnit;
use crate::host::Document;
use crate::progress::ProgressTracker;

pub type FormatterRegistry<TEnvironment> = IndexMap<String, Rc<FormatterUnit<TEnvironment>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
  pub name: String,
  /// `None` when the formatter isn't registered.
  pub outcome: Option<FormatOutcome>,
}

pub fn chain_label(display_path: &str) -> String {
  format!("Formatters on {}", display_path)
}

pub fn step_label(name: &str, display_path: &str) -> String {
  format!("{} on {}", name, display_path)
}

/// Runs formatters one after another on a document.
pub struct Sequencer<TEnvironment: Environment> {
  environment: TEnvironment,
  units: Rc<FormatterRegistry<TEnvironment>>,
  progress: ProgressTracker,
  reporter: ErrorReporter<TEnvironment>,
}

impl<TEnvironment: Environment> Clone for Sequencer<TEnvironment> {
  fn clone(&self) -> Self {
    Self {
      environment: self.environment.clone(),
      units: self.units.clone(),
      progress: self.progress.clone(),
      reporter: self.reporter.clone(),
    }
  }
}

impl<TEnvironment: Environment> Sequencer<TEnvironment> {
  pub fn new(
    environment: TEnvironment,
    units: Rc<FormatterRegistry<TEnvironment>>,
    progress: ProgressTracker,
    reporter: ErrorReporter<TEnvironment>,
  ) -> Self {
    Self {
      environment,
      units,
      progress,
      reporter,
    }
  }

  pub fn contains(&self, name: &str) -> bool {
    self.units.contains_key(name)
  }

  /// Runs the named formatters in order. A formatter only starts once
  /// the previous one completed and failures never stop the chain.
  pub async fn run_chain(&self, document: Rc<dyn Document>, names: &[String], use_buffer: bool) -> Vec<ChainStep> {
    let display_path = document.display_path();
    let chain_label = chain_label(&display_path);
    if names.is_empty() {
      self.progress.remove(&chain_label);
      return Vec::new();
    }

    self.progress.add(&chain_label);
    let mut steps = Vec::with_capacity(names.len());
    for name in names {
      let Some(unit) = self.units.get(name) else {
        self.reporter.report(&ResolutionFailure::UnknownFormatter { formatter: name.clone() });
        steps.push(ChainStep {
          name: name.clone(),
          outcome: None,
        });
        continue;
      };
      let label = step_label(name, &display_path);
      self.progress.add(&label);
      let outcome = unit.format(&document, use_buffer).await;
      if let Some(elapsed) = self.progress.remove(&label) {
        log_debug!(self.environment, "{} took {}ms", label, elapsed.as_millis());
      }
      steps.push(ChainStep {
        name: name.clone(),
        outcome: Some(outcome),
      });
    }
    if let Some(elapsed) = self.progress.remove(&chain_label) {
      log_debug!(self.environment, "{} took {}ms", chain_label, elapsed.as_millis());
    }
    steps
  }
}

#[cfg(test)]
mod test {
  use std::cell::RefCell;

  use pretty_assertions::assert_eq;

  use super::*;
  use crate::environment::CommandOutput;
  use crate::environment::TestEnvironment;
  use crate::formatter::FormatterProfile;
  use crate::host::EditorHost;
  use crate::process::ProcessRun;
  use crate::resolution::ResolutionScope;
  use crate::test_helpers::HostEvent;
  use crate::test_helpers::TestDocument;
  use crate::test_helpers::TestHost;

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  fn create_sequencer(environment: &TestEnvironment, host: &Rc<TestHost>, names: &[&str]) -> Sequencer<TestEnvironment> {
    let host: Rc<dyn EditorHost> = host.clone();
    let reporter = ErrorReporter::new(environment.clone(), host.clone());
    let mut units = IndexMap::new();
    for name in names {
      let unit = FormatterUnit::new(FormatterProfile::new(name, "--config"), environment.clone(), reporter.clone());
      unit.set_local_bins(vec![format!("venv/bin/{}", name)]);
      units.insert(name.to_string(), Rc::new(unit));
    }
    Sequencer::new(environment.clone(), Rc::new(units), ProgressTracker::new(host), reporter)
  }

  #[tokio::test]
  async fn empty_chain_does_nothing() {
    let environment = TestEnvironment::new();
    let host = TestHost::new();
    let sequencer = create_sequencer(&environment, &host, &["black"]);
    let document = TestDocument::new(1, "/project/main.py", "x=1");

    let steps = sequencer.run_chain(document, &[], true).await;

    assert!(steps.is_empty());
    assert!(environment.spawned_commands().is_empty());
    assert!(host.notifications().is_empty());
    assert!(sequencer.progress.active_labels().is_empty());
  }

  #[tokio::test]
  async fn missing_binary_does_not_stop_chain() {
    let environment = TestEnvironment::new();
    environment.add_git_repo("/project").add_executable("/project/venv/bin/b");
    let host = TestHost::new();
    let sequencer = create_sequencer(&environment, &host, &["a", "b"]);
    let document = TestDocument::new(1, "/project/main.py", "x=1");

    let steps = sequencer.run_chain(document, &strings(&["a", "b"]), true).await;

    assert_eq!(
      steps,
      vec![
        ChainStep {
          name: "a".to_string(),
          outcome: Some(FormatOutcome::BinaryNotFound),
        },
        ChainStep {
          name: "b".to_string(),
          outcome: Some(FormatOutcome::Ran {
            scope: ResolutionScope::Local,
            run: ProcessRun::Exited { exit_code: Some(0) },
          }),
        },
      ]
    );
    assert_eq!(environment.spawned_command_lines(), vec!["/project/venv/bin/b -"]);
    let titles = host.notifications().into_iter().map(|n| n.title).collect::<Vec<_>>();
    assert_eq!(titles, vec!["fmtchain: Could not find binary for a"]);
    assert_eq!(
      host.progress_events(),
      vec![
        HostEvent::ProgressStarted("Formatters on project/main.py".to_string()),
        HostEvent::ProgressStarted("a on project/main.py".to_string()),
        HostEvent::ProgressFinished("a on project/main.py".to_string()),
        HostEvent::ProgressStarted("b on project/main.py".to_string()),
        HostEvent::ProgressFinished("b on project/main.py".to_string()),
        HostEvent::ProgressFinished("Formatters on project/main.py".to_string()),
      ]
    );
  }

  #[tokio::test]
  async fn unknown_names_are_reported_and_skipped() {
    let environment = TestEnvironment::new();
    environment.add_git_repo("/project").add_executable("/project/venv/bin/black");
    let host = TestHost::new();
    let sequencer = create_sequencer(&environment, &host, &["black"]);
    let document = TestDocument::new(1, "/project/main.py", "x=1");

    let steps = sequencer.run_chain(document, &strings(&["gofmt", "black"]), true).await;

    assert_eq!(steps[0].outcome, None);
    assert_eq!(environment.spawned_command_lines(), vec!["/project/venv/bin/black -"]);
    assert_eq!(host.notifications()[0].title, "fmtchain: Unknown formatter gofmt");
  }

  #[tokio::test]
  async fn formatters_run_strictly_in_order() {
    let environment = TestEnvironment::new();
    environment
      .add_git_repo("/project")
      .add_executable("/project/venv/bin/isort")
      .add_executable("/project/venv/bin/black");
    let texts = Rc::new(RefCell::new(Vec::new()));
    {
      let texts = texts.clone();
      environment.set_process_handler(move |command| {
        let stdin_text = command.stdin_text.clone().unwrap_or_default();
        texts.borrow_mut().push(stdin_text.clone());
        let name = command.command_line.split_whitespace().next().unwrap_or_default().rsplit('/').next().unwrap_or_default().to_string();
        Ok(CommandOutput {
          stdout: format!("{}{}\n", stdin_text, name),
          stderr: String::new(),
          exit_code: Some(0),
        })
      });
    }
    let host = TestHost::new();
    let sequencer = create_sequencer(&environment, &host, &["isort", "black"]);
    let document = TestDocument::new(1, "/project/main.py", "");

    sequencer.run_chain(document.clone(), &strings(&["isort", "black"]), true).await;

    // each formatter sees the output of the previous one
    assert_eq!(*texts.borrow(), vec!["".to_string(), "isort\n".to_string()]);
    assert_eq!(document.text(), "isort\nblack\n");
  }
}
