use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

/// Most files remembered before the cache starts over.
pub const MAX_CACHED_FILES: usize = 1024;

/// Memoized resolutions keyed by the path of the file being formatted.
///
/// Failed resolutions are remembered too. Must be invalidated whenever
/// the candidates it was resolved from change. Once it holds
/// `MAX_CACHED_FILES` entries it is cleared before the next insert.
#[derive(Debug, Default)]
pub struct ResolutionCache {
  entries: RefCell<HashMap<PathBuf, Option<PathBuf>>>,
}

impl ResolutionCache {
  pub fn get_or_resolve(&self, file_path: &Path, resolve: impl FnOnce() -> Option<PathBuf>) -> Option<PathBuf> {
    if let Some(resolved) = self.entries.borrow().get(file_path) {
      return resolved.clone();
    }
    let resolved = resolve();
    let mut entries = self.entries.borrow_mut();
    if entries.len() >= MAX_CACHED_FILES {
      entries.clear();
    }
    entries.insert(file_path.to_path_buf(), resolved.clone());
    resolved
  }

  pub fn invalidate(&self) {
    self.entries.borrow_mut().clear();
  }

  pub fn len(&self) -> usize {
    self.entries.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.borrow().is_empty()
  }
}

#[cfg(test)]
mod test {
  use std::cell::Cell;

  use super::*;

  #[test]
  fn memoizes_hits_and_misses() {
    let cache = ResolutionCache::default();
    let calls = Cell::new(0);
    let resolve = |result: Option<&str>| {
      calls.set(calls.get() + 1);
      result.map(PathBuf::from)
    };

    assert_eq!(cache.get_or_resolve(Path::new("/a.py"), || resolve(Some("/bin/black"))), Some(PathBuf::from("/bin/black")));
    assert_eq!(cache.get_or_resolve(Path::new("/a.py"), || resolve(None)), Some(PathBuf::from("/bin/black")));
    assert_eq!(cache.get_or_resolve(Path::new("/b.py"), || resolve(None)), None);
    assert_eq!(cache.get_or_resolve(Path::new("/b.py"), || resolve(Some("/bin/black"))), None);
    assert_eq!(calls.get(), 2);
    assert_eq!(cache.len(), 2);

    cache.invalidate();
    assert!(cache.is_empty());
    assert_eq!(cache.get_or_resolve(Path::new("/b.py"), || resolve(Some("/bin/black"))), Some(PathBuf::from("/bin/black")));
    assert_eq!(calls.get(), 3);
  }

  #[test]
  fn starts_over_when_full() {
    let cache = ResolutionCache::default();
    for i in 0..MAX_CACHED_FILES {
      cache.get_or_resolve(&PathBuf::from(format!("/{}.py", i)), || None);
    }
    assert_eq!(cache.len(), MAX_CACHED_FILES);
    cache.get_or_resolve(Path::new("/next.py"), || Some(PathBuf::from("/bin/black")));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get_or_resolve(Path::new("/next.py"), || None), Some(PathBuf::from("/bin/black")));
  }
}
