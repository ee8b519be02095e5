use anyhow::Result;
use anyhow::bail;
use thiserror::Error;

use crate::utils::LogLevel;

pub struct CliArgs {
  pub sub_command: SubCommand,
  pub verbose: bool,
  pub config: Option<String>,
}

impl CliArgs {
  pub fn log_level(&self) -> LogLevel {
    if self.verbose { LogLevel::Debug } else { LogLevel::Info }
  }

  fn new_with_sub_command(sub_command: SubCommand) -> CliArgs {
    CliArgs {
      sub_command,
      verbose: false,
      config: None,
    }
  }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubCommand {
  EditorService,
  Version,
  Help(String),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ParseArgsError(#[from] anyhow::Error);

pub fn parse_args(args: Vec<String>) -> Result<CliArgs, ParseArgsError> {
  inner_parse_args(args).map_err(ParseArgsError)
}

fn inner_parse_args(args: Vec<String>) -> Result<CliArgs> {
  if args.len() == 1 || (args.len() == 2 && (args[1] == "help" || args[1] == "--help" || args[1] == "-h")) {
    let mut cli_parser = create_cli_parser();
    let help_text = format!("{}", cli_parser.render_help());
    return Ok(CliArgs::new_with_sub_command(SubCommand::Help(help_text)));
  } else if args.len() == 2 && (args[1] == "-v" || args[1] == "-V" || args[1] == "--version") {
    return Ok(CliArgs::new_with_sub_command(SubCommand::Version));
  }

  let matches = create_cli_parser().try_get_matches_from(&args)?;
  let sub_command = match matches.subcommand() {
    Some(("editor-service", _)) => SubCommand::EditorService,
    _ => bail!("A sub command is required."),
  };

  Ok(CliArgs {
    sub_command,
    verbose: matches.get_flag("verbose"),
    config: matches.get_one::<String>("config").map(String::from),
  })
}

pub fn create_cli_parser() -> clap::Command {
  use clap::Arg;
  use clap::Command;

  Command::new("fmtchain")
    .bin_name("fmtchain")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Runs external code formatters for an editor, one after another, on demand or on save.")
    .subcommand_required(true)
    .subcommand(
      Command::new("editor-service")
        .about("Starts a process that talks to an editor over newline delimited JSON on stdin and stdout."),
    )
    .arg(
      Arg::new("config")
        .long("config")
        .short('c')
        .value_name("file")
        .help("Path to a JSON settings file applied over the defaults.")
        .global(true)
        .num_args(1),
    )
    .arg(
      Arg::new("verbose")
        .long("verbose")
        .help("Prints additional diagnostic information to stderr.")
        .global(true)
        .action(clap::ArgAction::SetTrue),
    )
}
