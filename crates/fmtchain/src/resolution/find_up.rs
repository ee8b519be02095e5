use std::path::Path;
use std::path::PathBuf;

use crate::environment::Environment;

/// Entry that marks the root of a repository.
pub const REPOSITORY_MARKER: &str = ".git";

/// Searches for a readable `file_name` in `start_dir` and its ancestors,
/// innermost first.
///
/// The search stops at the first directory containing a repository
/// marker, after checking that directory itself.
pub fn find_upward(environment: &impl Environment, start_dir: &Path, file_name: &str) -> Option<PathBuf> {
  find_first_upward(environment, start_dir, &[file_name])
}

/// Like `find_upward`, but checks each of the names in every directory.
/// The innermost directory wins and within a directory the earliest name wins.
pub fn find_first_upward(environment: &impl Environment, start_dir: &Path, file_names: &[impl AsRef<str>]) -> Option<PathBuf> {
  if file_names.is_empty() {
    return None;
  }
  for dir in start_dir.ancestors() {
    for file_name in file_names {
      let candidate = dir.join(file_name.as_ref());
      if environment.is_readable(&candidate) {
        return Some(candidate);
      }
    }
    if environment.path_exists(&dir.join(REPOSITORY_MARKER)) {
      return None;
    }
  }
  None
}

/// Searches upward starting at the directory containing `file_path`.
pub fn find_file_in_repo(environment: &impl Environment, file_path: &Path, file_name: &str) -> Option<PathBuf> {
  let start_dir = file_path.parent()?;
  find_upward(environment, start_dir, file_name)
}
