mod debouncer;
mod log_level;
mod logger;
mod path_utils;

pub use debouncer::*;
pub use log_level::*;
pub use logger::*;
pub use path_utils::*;
