use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use super::FormatterProfile;
use crate::resolution::MAX_CACHED_FILES;
use crate::utils::quote_path;
use crate::utils::quote_path_if_needed;

/// Marker telling a formatter to read from stdin and write to stdout.
pub const STDIN_MARKER: &str = "-";

type ArgsKey = (PathBuf, Option<PathBuf>, bool);

/// Builds the arguments passed to a formatter binary.
pub struct ArgumentBuilder {
  profile: Rc<FormatterProfile>,
  cache: RefCell<HashMap<ArgsKey, Rc<Vec<String>>>>,
}

impl ArgumentBuilder {
  pub fn new(profile: Rc<FormatterProfile>) -> Self {
    Self {
      profile,
      cache: Default::default(),
    }
  }

  /// Default arguments, then the config flag and path if there is a
  /// config, then the stdin marker or the quoted file path.
  pub fn build(&self, file_path: &Path, config_path: Option<&Path>, use_buffer: bool) -> Rc<Vec<String>> {
    let key = (file_path.to_path_buf(), config_path.map(|p| p.to_path_buf()), use_buffer);
    if let Some(args) = self.cache.borrow().get(&key) {
      return args.clone();
    }

    let mut args = self.profile.default_args(use_buffer).to_vec();
    if let Some(config_path) = config_path.filter(|p| !p.as_os_str().is_empty()) {
      args.push(self.profile.config_flag.clone());
      args.push(quote_path_if_needed(config_path));
    }
    if use_buffer {
      args.push(STDIN_MARKER.to_string());
    } else {
      args.push(quote_path(file_path));
    }

    let args = Rc::new(args);
    let mut cache = self.cache.borrow_mut();
    if cache.len() >= MAX_CACHED_FILES {
      cache.clear();
    }
    cache.insert(key, args.clone());
    args
  }
}
