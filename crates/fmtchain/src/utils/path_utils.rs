use std::path::Path;
use std::path::PathBuf;

/// Expands a leading `~` to the provided home directory.
///
/// Only `~` on its own or followed by a separator is expanded (`~user` is left alone).
pub fn expand_home_dir(value: &str, home_dir: Option<&Path>) -> PathBuf {
  let value = value.trim();
  if let Some(home_dir) = home_dir {
    if value == "~" {
      return home_dir.to_path_buf();
    }
    if let Some(rest) = value.strip_prefix("~/").or_else(|| value.strip_prefix("~\\")) {
      return home_dir.join(rest);
    }
  }
  PathBuf::from(value)
}

/// Gets if the configured entry should be used as a path instead of a
/// name to search for in the repository.
pub fn is_path_entry(entry: &str) -> bool {
  let entry = entry.trim();
  entry.starts_with('/') || entry.starts_with('~') || Path::new(entry).is_absolute()
}

/// Syntactic check for a file name or relative path (ex. `.venv/bin/black`).
pub fn is_valid_file_name(name: &str) -> bool {
  if name.trim().is_empty() {
    return false;
  }
  !name.chars().any(|c| c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*'))
}

/// Wraps the path in double quotes so the shell sees it as a single argument.
///
/// On unix `"`, `$`, `` ` `` and `\` are escaped so the shell does not expand
/// them inside the quotes. `cmd` has no such expansion and paths there use
/// `\` as a separator, so it is only wrapped.
pub fn quote_path(path: &Path) -> String {
  let text = path.display().to_string();
  if cfg!(windows) {
    return format!("\"{}\"", text);
  }
  let mut quoted = String::with_capacity(text.len() + 2);
  quoted.push('"');
  for c in text.chars() {
    if matches!(c, '"' | '$' | '`' | '\\') {
      quoted.push('\\');
    }
    quoted.push(c);
  }
  quoted.push('"');
  quoted
}

/// Quotes the path only when the shell would otherwise split or expand it.
pub fn quote_path_if_needed(path: &Path) -> String {
  let text = path.display().to_string();
  if text.chars().any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '$' | '`' | '&' | ';' | '|' | '(' | ')' | '<' | '>')) {
    quote_path(path)
  } else {
    text
  }
}
