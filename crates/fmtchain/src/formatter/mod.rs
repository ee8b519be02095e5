mod args;
mod profile;
mod unit;

pub use args::*;
pub use profile::*;
pub use unit::*;
