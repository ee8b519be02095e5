use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use anyhow::bail;

use super::CommandOutput;
use super::Environment;
use crate::utils::LogLevel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedCommand {
  pub command_line: String,
  pub stdin_text: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct TestFile {
  readable: bool,
  executable: bool,
}

type ProcessHandler = Rc<dyn Fn(&SpawnedCommand) -> Result<CommandOutput>>;

struct TestEnvironmentState {
  files: RefCell<HashMap<PathBuf, TestFile>>,
  file_texts: RefCell<HashMap<PathBuf, String>>,
  probe_count: Cell<usize>,
  home_dir: RefCell<Option<PathBuf>>,
  path_commands: RefCell<HashMap<String, PathBuf>>,
  spawned_commands: RefCell<Vec<SpawnedCommand>>,
  process_handler: RefCell<Option<ProcessHandler>>,
  logged_messages: RefCell<Vec<String>>,
}

/// In-memory environment. Directories exist implicitly when a file is
/// added below them. Processes echo their stdin unless a handler is set.
#[derive(Clone)]
pub struct TestEnvironment {
  state: Rc<TestEnvironmentState>,
}

impl Default for TestEnvironment {
  fn default() -> Self {
    Self::new()
  }
}

impl TestEnvironment {
  pub fn new() -> TestEnvironment {
    TestEnvironment {
      state: Rc::new(TestEnvironmentState {
        files: Default::default(),
        file_texts: Default::default(),
        probe_count: Cell::new(0),
        home_dir: RefCell::new(Some(PathBuf::from("/home/user"))),
        path_commands: Default::default(),
        spawned_commands: Default::default(),
        process_handler: Default::default(),
        logged_messages: Default::default(),
      }),
    }
  }

  pub fn add_file(&self, path: impl AsRef<Path>) -> &Self {
    self.insert_file(path, true, false)
  }

  pub fn add_file_with_text(&self, path: impl AsRef<Path>, text: &str) -> &Self {
    self.state.file_texts.borrow_mut().insert(path.as_ref().to_path_buf(), text.to_string());
    self.add_file(path)
  }

  pub fn add_unreadable_file(&self, path: impl AsRef<Path>) -> &Self {
    self.insert_file(path, false, false)
  }

  pub fn add_executable(&self, path: impl AsRef<Path>) -> &Self {
    self.insert_file(path, true, true)
  }

  /// Marks the directory as the root of a git repository.
  pub fn add_git_repo(&self, dir_path: impl AsRef<Path>) -> &Self {
    self.insert_file(dir_path.as_ref().join(".git"), true, false)
  }

  pub fn set_home_dir(&self, home_dir: Option<&str>) -> &Self {
    *self.state.home_dir.borrow_mut() = home_dir.map(PathBuf::from);
    self
  }

  pub fn add_path_command(&self, name: &str, path: impl AsRef<Path>) -> &Self {
    self.add_executable(path.as_ref());
    self.state.path_commands.borrow_mut().insert(name.to_string(), path.as_ref().to_path_buf());
    self
  }

  pub fn set_process_handler(&self, handler: impl Fn(&SpawnedCommand) -> Result<CommandOutput> + 'static) -> &Self {
    *self.state.process_handler.borrow_mut() = Some(Rc::new(handler));
    self
  }

  pub fn spawned_commands(&self) -> Vec<SpawnedCommand> {
    self.state.spawned_commands.borrow().clone()
  }

  pub fn spawned_command_lines(&self) -> Vec<String> {
    self.state.spawned_commands.borrow().iter().map(|c| c.command_line.clone()).collect()
  }

  /// Number of filesystem probes made so far.
  pub fn probe_count(&self) -> usize {
    self.state.probe_count.get()
  }

  pub fn logged_messages(&self) -> Vec<String> {
    self.state.logged_messages.borrow().clone()
  }

  fn insert_file(&self, path: impl AsRef<Path>, readable: bool, executable: bool) -> &Self {
    self.state.files.borrow_mut().insert(path.as_ref().to_path_buf(), TestFile { readable, executable });
    self
  }

  fn probe(&self) {
    self.state.probe_count.set(self.state.probe_count.get() + 1);
  }

  fn is_implicit_dir(&self, path: &Path) -> bool {
    self.state.files.borrow().keys().any(|file_path| file_path != path && file_path.starts_with(path))
  }
}

impl Environment for TestEnvironment {
  fn path_exists(&self, path: &Path) -> bool {
    self.probe();
    self.state.files.borrow().contains_key(path) || self.is_implicit_dir(path)
  }

  fn is_readable(&self, path: &Path) -> bool {
    self.probe();
    match self.state.files.borrow().get(path) {
      Some(file) => file.readable,
      None => self.is_implicit_dir(path),
    }
  }

  fn is_executable(&self, path: &Path) -> bool {
    self.probe();
    self.state.files.borrow().get(path).map(|f| f.executable).unwrap_or(false)
  }

  fn read_file(&self, path: &Path) -> std::io::Result<String> {
    match self.state.file_texts.borrow().get(path) {
      Some(text) => Ok(text.clone()),
      None => Err(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("Could not find file at path {}", path.display()),
      )),
    }
  }

  fn get_home_dir(&self) -> Option<PathBuf> {
    self.state.home_dir.borrow().clone()
  }

  fn which(&self, command_name: &str) -> Option<PathBuf> {
    self.state.path_commands.borrow().get(command_name).cloned()
  }

  async fn run_shell_command(&self, command_line: &str, stdin_text: Option<String>) -> Result<CommandOutput> {
    let command = SpawnedCommand {
      command_line: command_line.to_string(),
      stdin_text,
    };
    self.state.spawned_commands.borrow_mut().push(command.clone());
    // give other local tasks a chance to run like a real process would
    tokio::task::yield_now().await;
    let handler = self.state.process_handler.borrow().clone();
    match handler {
      Some(handler) => handler(&command),
      None if command_line.is_empty() => bail!("Empty command line."),
      None => Ok(CommandOutput {
        stdout: command.stdin_text.unwrap_or_default(),
        stderr: String::new(),
        exit_code: Some(0),
      }),
    }
  }

  fn log_level(&self) -> LogLevel {
    LogLevel::Debug
  }

  fn log_stderr_with_context(&self, text: &str, _context_name: &str) {
    self.state.logged_messages.borrow_mut().push(text.to_string());
  }
}
