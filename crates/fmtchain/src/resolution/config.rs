use std::path::Path;
use std::path::PathBuf;

use super::ResolutionCache;
use super::find_file_in_repo;
use crate::environment::Environment;
use crate::errors::ConfigurationError;
use crate::utils::expand_home_dir;
use crate::utils::is_path_entry;
use crate::utils::is_valid_file_name;

/// Finds the config file to pass to a formatter.
///
/// Entries that are paths are used as is. Bare names are searched for
/// upward from the formatted file. Not finding a config is fine and
/// means the formatter runs with its own defaults.
#[derive(Debug)]
pub struct ConfigLocator {
  formatter: String,
  candidates: Vec<String>,
  cache: ResolutionCache,
}

impl ConfigLocator {
  pub fn new(formatter: &str) -> Self {
    Self {
      formatter: formatter.to_string(),
      candidates: Vec::new(),
      cache: Default::default(),
    }
  }

  pub fn candidates(&self) -> &[String] {
    &self.candidates
  }

  pub fn set_candidates(&mut self, environment: &impl Environment, candidates: Vec<String>) -> Result<(), ConfigurationError> {
    if candidates == self.candidates {
      return Ok(());
    }
    self.cache.invalidate();
    self.candidates = Vec::new();
    self.validate(environment, &candidates)?;
    self.candidates = candidates;
    Ok(())
  }

  fn validate(&self, environment: &impl Environment, candidates: &[String]) -> Result<(), ConfigurationError> {
    let home_dir = environment.get_home_dir();
    for entry in candidates {
      if is_path_entry(entry) {
        let path = expand_home_dir(entry, home_dir.as_deref());
        if !environment.is_readable(&path) {
          return Err(ConfigurationError::InvalidConfigPath {
            formatter: self.formatter.clone(),
            path,
          });
        }
      } else if !is_valid_file_name(entry) {
        return Err(ConfigurationError::InvalidConfigName {
          formatter: self.formatter.clone(),
          entry: entry.clone(),
        });
      }
    }
    Ok(())
  }

  pub fn resolve(&self, environment: &impl Environment, file_path: &Path) -> Option<PathBuf> {
    self.cache.get_or_resolve(file_path, || {
      let home_dir = environment.get_home_dir();
      self.candidates.iter().find_map(|entry| {
        if is_path_entry(entry) {
          Some(expand_home_dir(entry, home_dir.as_deref()))
        } else {
          find_file_in_repo(environment, file_path, entry)
        }
      })
    })
  }
}

#[cfg(test)]
mod test {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::environment::TestEnvironment;

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  #[test]
  fn first_resolved_entry_wins() {
    let environment = TestEnvironment::new();
    environment
      .add_git_repo("/project")
      .add_file("/project/setup.cfg")
      .add_file("/project/pkg/tox.ini");
    let mut locator = ConfigLocator::new("autopep8");
    locator.set_candidates(&environment, strings(&["setup.cfg", "tox.ini"])).unwrap();
    assert_eq!(
      locator.resolve(&environment, Path::new("/project/pkg/mod.py")),
      Some(PathBuf::from("/project/setup.cfg"))
    );
  }

  #[test]
  fn path_entries_are_used_directly() {
    let environment = TestEnvironment::new();
    environment.add_git_repo("/project").add_file("/home/user/.config/black.toml");
    let mut locator = ConfigLocator::new("black");
    locator.set_candidates(&environment, strings(&["~/.config/black.toml"])).unwrap();
    assert_eq!(
      locator.resolve(&environment, Path::new("/project/main.py")),
      Some(PathBuf::from("/home/user/.config/black.toml"))
    );
  }

  #[test]
  fn missing_config_is_not_an_error() {
    let environment = TestEnvironment::new();
    environment.add_git_repo("/project");
    let mut locator = ConfigLocator::new("black");
    locator.set_candidates(&environment, strings(&["pyproject.toml"])).unwrap();
    assert_eq!(locator.resolve(&environment, Path::new("/project/main.py")), None);
  }

  #[test]
  fn unreadable_path_resets_list() {
    let environment = TestEnvironment::new();
    environment.add_file("/etc/black.toml");
    let mut locator = ConfigLocator::new("black");
    let err = locator
      .set_candidates(&environment, strings(&["/etc/black.toml", "/etc/missing.toml", "bad|name"]))
      .unwrap_err();
    assert_eq!(
      err,
      ConfigurationError::InvalidConfigPath {
        formatter: "black".to_string(),
        path: PathBuf::from("/etc/missing.toml"),
      }
    );
    assert!(locator.candidates().is_empty());
  }

  #[test]
  fn invalid_name_resets_list() {
    let environment = TestEnvironment::new();
    let mut locator = ConfigLocator::new("isort");
    locator.set_candidates(&environment, strings(&[".isort.cfg"])).unwrap();
    let err = locator.set_candidates(&environment, strings(&["what?", ".isort.cfg"])).unwrap_err();
    assert_eq!(
      err,
      ConfigurationError::InvalidConfigName {
        formatter: "isort".to_string(),
        entry: "what?".to_string(),
      }
    );
    assert!(locator.candidates().is_empty());
  }

  #[test]
  fn changing_candidates_invalidates_cache() {
    let environment = TestEnvironment::new();
    environment
      .add_git_repo("/project")
      .add_file("/project/pyproject.toml")
      .add_file("/project/.isort.cfg");
    let mut locator = ConfigLocator::new("isort");
    let file_path = Path::new("/project/main.py");
    locator.set_candidates(&environment, strings(&["pyproject.toml"])).unwrap();
    assert_eq!(locator.resolve(&environment, file_path), Some(PathBuf::from("/project/pyproject.toml")));
    let probes = environment.probe_count();
    assert_eq!(locator.resolve(&environment, file_path), Some(PathBuf::from("/project/pyproject.toml")));
    assert_eq!(environment.probe_count(), probes);

    locator.set_candidates(&environment, strings(&[".isort.cfg", "pyproject.toml"])).unwrap();
    assert_eq!(locator.resolve(&environment, file_path), Some(PathBuf::from("/project/.isort.cfg")));
  }

  #[test]
  fn home_paths_without_home_dir() {
    let environment = TestEnvironment::new();
    environment.set_home_dir(None).add_file("/home/user/black.toml");
    let mut locator = ConfigLocator::new("black");
    let err = locator.set_candidates(&environment, strings(&["~/black.toml"])).unwrap_err();
    assert_eq!(
      err,
      ConfigurationError::InvalidConfigPath {
        formatter: "black".to_string(),
        path: PathBuf::from("~/black.toml"),
      }
    );
  }
}
