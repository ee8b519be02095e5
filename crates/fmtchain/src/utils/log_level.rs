#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
  Debug = 0,
  #[default]
  Info = 1,
  Warn = 2,
  Error = 3,
  Silent = 4,
}

impl LogLevel {
  #[inline]
  pub fn is_debug(self) -> bool {
    self <= LogLevel::Debug
  }

  #[inline]
  pub fn is_info(self) -> bool {
    self <= LogLevel::Info
  }

  #[inline]
  pub fn is_warn(self) -> bool {
    self <= LogLevel::Warn
  }

  #[inline]
  pub fn is_error(self) -> bool {
    self <= LogLevel::Error
  }
}

impl std::str::FromStr for LogLevel {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "debug" => Ok(LogLevel::Debug),
      "info" => Ok(LogLevel::Info),
      "warn" => Ok(LogLevel::Warn),
      "error" => Ok(LogLevel::Error),
      "silent" => Ok(LogLevel::Silent),
      _ => anyhow::bail!("Unknown log level: {}", s),
    }
  }
}
