use std::fs;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "grammar-chat";

fn env_dir(var: &str) -> Option<PathBuf> {
  let value = std::env::var(var).ok()?;
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return None;
  }
  Some(PathBuf::from(trimmed))
}

fn fallback_dir() -> PathBuf {
  std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Explicit override, else the platform base joined with the app name, else
/// the current directory. The directory is created if missing.
fn resolve_dir(explicit: Option<PathBuf>, env_var: &str, platform: Option<PathBuf>) -> PathBuf {
  let dir = explicit
    .or_else(|| env_dir(env_var))
    .or_else(|| platform.map(|base| base.join(APP_DIR_NAME)))
    .unwrap_or_else(fallback_dir);
  let _ = fs::create_dir_all(&dir);
  dir
}

pub(crate) fn resolve_config_dir(explicit: Option<PathBuf>) -> PathBuf {
  resolve_dir(explicit, "GRAMMAR_CHAT_CONFIG_DIR", dirs::config_dir())
}

pub(crate) fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
  resolve_dir(explicit, "GRAMMAR_CHAT_DATA_DIR", dirs::data_local_dir())
}
