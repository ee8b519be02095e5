mod binary;
mod cache;
mod config;
mod find_up;

pub use binary::*;
pub use cache::*;
pub use config::*;
pub use find_up::*;

/// Which group of settings a resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionScope {
  /// Found in the file's repository.
  Local,
  /// Configured by the user as a fallback.
  Global,
}
