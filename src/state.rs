use crate::constants::{DEFAULT_ENDPOINT, DEFAULT_LANGUAGE};
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

pub(crate) const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub endpoint: String,
  pub default_language: String,
  pub log_level: String,
  pub log_to_file: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      endpoint: DEFAULT_ENDPOINT.to_string(),
      default_language: DEFAULT_LANGUAGE.to_string(),
      log_level: "warn".to_string(),
      log_to_file: false,
    }
  }
}

impl Settings {
  /// Replace anything unusable with its default.
  pub fn normalize(&mut self) {
    let endpoint = self.endpoint.trim();
    if endpoint.is_empty() {
      self.endpoint = DEFAULT_ENDPOINT.to_string();
    } else if let Err(e) = url::Url::parse(endpoint) {
      warn!("Invalid endpoint '{}' ({}), using default", endpoint, e);
      self.endpoint = DEFAULT_ENDPOINT.to_string();
    } else {
      self.endpoint = endpoint.to_string();
    }

    match Language::from_code(&self.default_language) {
      Some(lang) => self.default_language = lang.code().to_string(),
      None => {
        warn!(
          "Unknown default language '{}', using {}",
          self.default_language, DEFAULT_LANGUAGE
        );
        self.default_language = DEFAULT_LANGUAGE.to_string();
      }
    }

    if self.log_level.trim().is_empty() {
      self.log_level = "warn".to_string();
    }
  }

  /// Environment overrides (`GRAMMAR_CHAT_ENDPOINT`, `GRAMMAR_CHAT_LANGUAGE`).
  pub fn apply_env(&mut self) {
    if let Ok(endpoint) = std::env::var("GRAMMAR_CHAT_ENDPOINT") {
      if !endpoint.trim().is_empty() {
        self.endpoint = endpoint;
      }
    }
    if let Ok(language) = std::env::var("GRAMMAR_CHAT_LANGUAGE") {
      if !language.trim().is_empty() {
        self.default_language = language;
      }
    }
  }
}

pub(crate) fn load_settings(config_dir: &Path) -> Settings {
  let path = config_dir.join(SETTINGS_FILE);
  let mut settings = match fs::read_to_string(&path) {
    Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
      warn!("Ignoring unreadable {}: {}", path.display(), e);
      Settings::default()
    }),
    Err(_) => Settings::default(),
  };
  settings.normalize();
  settings
}

pub(crate) fn save_settings_file(config_dir: &Path, settings: &Settings) -> Result<(), String> {
  fs::create_dir_all(config_dir).map_err(|e| e.to_string())?;
  let raw = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
  fs::write(config_dir.join(SETTINGS_FILE), raw).map_err(|e| e.to_string())?;
  Ok(())
}
