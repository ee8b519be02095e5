#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use fmtchain::arg_parser::CliArgs;
use fmtchain::arg_parser::SubCommand;
use fmtchain::arg_parser::parse_args;
use fmtchain::editor_service::run_editor_service;
use fmtchain::environment::Environment;
use fmtchain::environment::RealEnvironment;
use fmtchain::environment::RealEnvironmentOptions;
use fmtchain::formatter::builtin_profiles;
use fmtchain::orchestrator::OrchestratorOptions;
use fmtchain::settings::SettingsStore;
use fmtchain::settings::default_settings;
use fmtchain::utils::LogLevel;
use fmtchain::utils::expand_home_dir;

fn main() {
  let args = match parse_args(std::env::args().collect()) {
    Ok(args) => args,
    Err(err) => {
      #[allow(clippy::print_stderr)]
      {
        eprintln!("{:#}", err);
      }
      std::process::exit(1);
    }
  };
  let log_level = args.log_level();

  if let Err(err) = run(args) {
    if log_level != LogLevel::Silent {
      #[allow(clippy::print_stderr)]
      {
        eprintln!("{:#}", err);
      }
    }
    std::process::exit(1);
  }
}

fn run(args: CliArgs) -> Result<()> {
  match &args.sub_command {
    SubCommand::Help(text) => {
      #[allow(clippy::print_stdout)]
      {
        print!("{}", text);
      }
      Ok(())
    }
    SubCommand::Version => {
      #[allow(clippy::print_stdout)]
      {
        println!("fmtchain {}", env!("CARGO_PKG_VERSION"));
      }
      Ok(())
    }
    SubCommand::EditorService => {
      let environment = RealEnvironment::new(&RealEnvironmentOptions { log_level: args.log_level() });
      let settings = SettingsStore::with_defaults(default_settings(&builtin_profiles()));
      if let Some(config) = &args.config {
        let config_path: PathBuf = expand_home_dir(config, environment.get_home_dir().as_deref());
        settings.apply_file(&environment, &config_path)?;
      }

      let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Error creating the async runtime.")?;
      let local_set = tokio::task::LocalSet::new();
      local_set.block_on(
        &runtime,
        run_editor_service(
          environment,
          settings,
          OrchestratorOptions::default(),
          tokio::io::BufReader::new(tokio::io::stdin()),
          Box::new(std::io::stdout()),
        ),
      )
    }
  }
}
