#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]

#[macro_use]
pub mod environment;

pub mod arg_parser;
pub mod editor_service;
pub mod errors;
pub mod formatter;
pub mod host;
pub mod orchestrator;
pub mod process;
pub mod progress;
pub mod resolution;
pub mod sequencer;
pub mod settings;
pub mod utils;

#[cfg(test)]
mod test_helpers;
