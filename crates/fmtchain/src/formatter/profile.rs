/// Tool specific knowledge about how to invoke a formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterProfile {
  pub name: String,
  /// Arguments always passed when formatting via stdin and stdout.
  pub buffer_args: Vec<String>,
  /// Arguments always passed when the formatter rewrites the file on disk.
  pub file_args: Vec<String>,
  /// Flag that precedes the path of a resolved config file.
  pub config_flag: String,
  /// Config file names searched for in the repository by default.
  pub default_local_configs: Vec<String>,
}

impl FormatterProfile {
  pub fn new(name: &str, config_flag: &str) -> Self {
    Self {
      name: name.to_string(),
      buffer_args: Vec::new(),
      file_args: Vec::new(),
      config_flag: config_flag.to_string(),
      default_local_configs: Vec::new(),
    }
  }

  pub fn with_buffer_args(mut self, args: &[&str]) -> Self {
    self.buffer_args = to_strings(args);
    self
  }

  pub fn with_file_args(mut self, args: &[&str]) -> Self {
    self.file_args = to_strings(args);
    self
  }

  pub fn with_default_local_configs(mut self, configs: &[&str]) -> Self {
    self.default_local_configs = to_strings(configs);
    self
  }

  pub fn default_args(&self, use_buffer: bool) -> &[String] {
    if use_buffer { &self.buffer_args } else { &self.file_args }
  }

  /// Binary locations searched for in the repository by default.
  pub fn default_local_bins(&self) -> Vec<String> {
    vec![format!("venv/bin/{}", self.name), format!(".venv/bin/{}", self.name)]
  }
}

fn to_strings(values: &[&str]) -> Vec<String> {
  values.iter().map(|v| v.to_string()).collect()
}

pub fn builtin_profiles() -> Vec<FormatterProfile> {
  vec![
    FormatterProfile::new("autoflake", "--config")
      .with_file_args(&["--in-place"])
      .with_default_local_configs(&["pyproject.toml", "setup.cfg"]),
    FormatterProfile::new("autopep8", "--global-config")
      .with_file_args(&["--in-place"])
      .with_default_local_configs(&["setup.cfg", "tox.ini", ".pep8"]),
    FormatterProfile::new("black", "--config")
      .with_buffer_args(&["-q"])
      .with_file_args(&["-q"])
      .with_default_local_configs(&["pyproject.toml"]),
    FormatterProfile::new("isort", "--settings-path")
      .with_buffer_args(&["-q"])
      .with_file_args(&["-q"])
      .with_default_local_configs(&[".isort.cfg", "pyproject.toml"]),
    FormatterProfile::new("yapf", "--style")
      .with_file_args(&["--in-place"])
      .with_default_local_configs(&[".style.yapf", "setup.cfg"]),
  ]
}
