use crate::errors::AppError;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Durable string-keyed storage, the local-storage boundary of the client.
pub trait KeyValueStore {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
  fn remove(&mut self, key: &str) -> Result<(), AppError>;
}

/// One `<key>.json` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn path_for(&self, key: &str) -> PathBuf {
    self.dir.join(format!("{}.json", key))
  }
}

impl KeyValueStore for FileStore {
  fn get(&self, key: &str) -> Option<String> {
    fs::read_to_string(self.path_for(key)).ok()
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
    fs::create_dir_all(&self.dir)?;
    fs::write(self.path_for(key), value)?;
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<(), AppError> {
    match fs::remove_file(self.path_for(key)) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

/// In-process store. Clones share the same map, so a test can keep a handle
/// after giving one to a [`crate::history::HistoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    self.values.lock().unwrap().get(key).cloned()
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
    self
      .values
      .lock()
      .unwrap()
      .insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<(), AppError> {
    self.values.lock().unwrap().remove(key);
    Ok(())
  }
}
