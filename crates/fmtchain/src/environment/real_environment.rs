use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::Context;
use anyhow::Result;
use tokio::io::AsyncWriteExt;

use super::CommandOutput;
use super::Environment;
use crate::utils::LogLevel;
use crate::utils::Logger;
use crate::utils::LoggerOptions;

pub struct RealEnvironmentOptions {
  pub log_level: LogLevel,
}

#[derive(Clone)]
pub struct RealEnvironment {
  logger: Logger,
  log_level: LogLevel,
}

impl RealEnvironment {
  pub fn new(options: &RealEnvironmentOptions) -> RealEnvironment {
    RealEnvironment {
      logger: Logger::new(&LoggerOptions::default()),
      log_level: options.log_level,
    }
  }
}

impl Environment for RealEnvironment {
  fn path_exists(&self, path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
  }

  fn is_readable(&self, path: &Path) -> bool {
    match std::fs::metadata(path) {
      Ok(metadata) if metadata.is_dir() => std::fs::read_dir(path).is_ok(),
      Ok(_) => std::fs::File::open(path).is_ok(),
      Err(_) => false,
    }
  }

  #[cfg(unix)]
  fn is_executable(&self, path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
      Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
      Err(_) => false,
    }
  }

  #[cfg(not(unix))]
  fn is_executable(&self, path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
  }

  fn read_file(&self, path: &Path) -> std::io::Result<String> {
    log_debug!(self, "Reading file: {}", path.display());
    std::fs::read_to_string(path)
  }

  fn get_home_dir(&self) -> Option<PathBuf> {
    dirs::home_dir()
  }

  fn which(&self, command_name: &str) -> Option<PathBuf> {
    which::which(command_name).ok()
  }

  async fn run_shell_command(&self, command_line: &str, stdin_text: Option<String>) -> Result<CommandOutput> {
    let mut command = shell_command(command_line);
    command
      .stdin(if stdin_text.is_some() { Stdio::piped() } else { Stdio::null() })
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);
    let mut child = command.spawn().with_context(|| format!("Failed spawning shell for: {}", command_line))?;

    let stdin = child.stdin.take();
    let write_stdin = async move {
      if let (Some(mut stdin), Some(text)) = (stdin, stdin_text) {
        stdin.write_all(text.as_bytes()).await?;
        stdin.shutdown().await?;
      }
      Ok::<_, std::io::Error>(())
    };
    // write and read at the same time so a large buffer can't fill the pipes and deadlock
    let (write_result, output) = tokio::join!(write_stdin, child.wait_with_output());
    if let Err(err) = write_result {
      // the process may exit without reading everything
      log_debug!(self, "Failed writing stdin of '{}': {:#}", command_line, err);
    }
    let output = output.with_context(|| format!("Failed waiting on: {}", command_line))?;

    Ok(CommandOutput {
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
      exit_code: output.status.code(),
    })
  }

  fn log_level(&self) -> LogLevel {
    self.log_level
  }

  fn log_stderr_with_context(&self, text: &str, context_name: &str) {
    if self.log_level != LogLevel::Silent {
      self.logger.log_stderr_with_context(text, context_name);
    }
  }
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> tokio::process::Command {
  let mut command = tokio::process::Command::new("cmd");
  command.arg("/C").arg(command_line);
  command
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> tokio::process::Command {
  let mut command = tokio::process::Command::new("sh");
  command.arg("-c").arg(command_line);
  command
}
