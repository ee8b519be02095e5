use std::path::Path;
use std::path::PathBuf;

use super::ResolutionCache;
use super::ResolutionScope;
use super::find_first_upward;
use crate::environment::Environment;
use crate::errors::ConfigurationError;
use crate::utils::expand_home_dir;
use crate::utils::is_valid_file_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
  pub path: PathBuf,
  pub scope: ResolutionScope,
}

/// Finds the executable to run for a file. Binaries found in the
/// file's repository are preferred over the configured global path.
#[derive(Debug)]
pub struct BinaryLocator {
  formatter: String,
  local_bins: Vec<String>,
  global_bin_path: Option<PathBuf>,
  local_cache: ResolutionCache,
}

impl BinaryLocator {
  pub fn new(formatter: &str) -> Self {
    Self {
      formatter: formatter.to_string(),
      local_bins: Vec::new(),
      global_bin_path: None,
      local_cache: Default::default(),
    }
  }

  pub fn local_bins(&self) -> &[String] {
    &self.local_bins
  }

  pub fn global_bin_path(&self) -> Option<&Path> {
    self.global_bin_path.as_deref()
  }

  /// Sets the names searched for in the repository. When any name is
  /// invalid the list is emptied and the first offender is returned.
  pub fn set_local_bins(&mut self, local_bins: Vec<String>) -> Result<(), ConfigurationError> {
    if local_bins == self.local_bins {
      return Ok(());
    }
    self.local_cache.invalidate();
    if let Some(entry) = local_bins.iter().find(|name| !is_valid_file_name(name)) {
      self.local_bins = Vec::new();
      return Err(ConfigurationError::InvalidLocalBinName {
        formatter: self.formatter.clone(),
        entry: entry.clone(),
      });
    }
    self.local_bins = local_bins;
    Ok(())
  }

  /// Sets the fallback binary. An empty value clears it without error.
  pub fn set_global_bin_path(&mut self, environment: &impl Environment, value: &str) -> Result<(), ConfigurationError> {
    let value = value.trim();
    if value.is_empty() {
      self.global_bin_path = None;
      return Ok(());
    }

    let home_dir = environment.get_home_dir();
    let expanded = expand_home_dir(value, home_dir.as_deref());
    if self.global_bin_path.as_ref() == Some(&expanded) {
      return Ok(());
    }

    if environment.is_executable(&expanded) {
      self.global_bin_path = Some(expanded);
      return Ok(());
    }
    if is_bare_command_name(value) {
      if let Some(path) = environment.which(value) {
        self.global_bin_path = Some(path);
        return Ok(());
      }
    }

    self.global_bin_path = None;
    Err(ConfigurationError::InvalidGlobalBinPath {
      formatter: self.formatter.clone(),
      path: expanded,
    })
  }

  pub fn resolve(&self, environment: &impl Environment, file_path: &Path) -> Option<ResolvedBinary> {
    let local = self.local_cache.get_or_resolve(file_path, || {
      let start_dir = file_path.parent()?;
      find_first_upward(environment, start_dir, self.local_bins.as_slice())
    });
    match local {
      Some(path) => Some(ResolvedBinary {
        path,
        scope: ResolutionScope::Local,
      }),
      None => self.global_bin_path.clone().map(|path| ResolvedBinary {
        path,
        scope: ResolutionScope::Global,
      }),
    }
  }
}

fn is_bare_command_name(value: &str) -> bool {
  !value.starts_with('~') && !value.contains(['/', '\\'])
}
