use crate::constants::{HISTORY_KEY, HISTORY_LIMIT};
use crate::errors::AppError;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub query: String,
  pub timestamp: String,
}

/// Most-recent-first log of submitted queries, unique by exact query text.
pub struct HistoryStore {
  entries: Vec<HistoryEntry>,
  store: Box<dyn KeyValueStore>,
}

impl HistoryStore {
  /// Read the persisted log. Missing or unparsable data yields an empty history.
  pub fn load(store: Box<dyn KeyValueStore>) -> Self {
    let entries = match store.get(HISTORY_KEY) {
      Some(raw) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
        Ok(mut entries) => {
          entries.truncate(HISTORY_LIMIT);
          entries
        }
        Err(e) => {
          warn!("Discarding unreadable history: {}", e);
          Vec::new()
        }
      },
      None => Vec::new(),
    };
    Self { entries, store }
  }

  pub fn entries(&self) -> &[HistoryEntry] {
    &self.entries
  }

  pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
    self.entries.get(index)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Move `query` to the front with the current time, evicting past the limit.
  ///
  /// The in-memory log is updated even when persisting fails.
  pub fn record(&mut self, query: &str) -> Result<&[HistoryEntry], AppError> {
    self.record_at(query, crate::util::now_iso8601())
  }

  pub(crate) fn record_at(
    &mut self,
    query: &str,
    timestamp: String,
  ) -> Result<&[HistoryEntry], AppError> {
    if let Some(existing) = self.entries.iter().position(|e| e.query == query) {
      self.entries.remove(existing);
    }
    self.entries.insert(
      0,
      HistoryEntry {
        query: query.to_string(),
        timestamp,
      },
    );
    self.entries.truncate(HISTORY_LIMIT);
    self.persist()?;
    Ok(&self.entries)
  }

  /// Empty the log and drop the persisted record. Does nothing unless `confirmed`.
  ///
  /// Returns whether anything was cleared.
  pub fn clear(&mut self, confirmed: bool) -> Result<bool, AppError> {
    if !confirmed {
      return Ok(false);
    }
    self.entries.clear();
    self.store.remove(HISTORY_KEY)?;
    Ok(true)
  }

  fn persist(&mut self) -> Result<(), AppError> {
    let raw = serde_json::to_string_pretty(&self.entries)
      .map_err(|e| AppError::Storage(e.to_string()))?;
    self.store.set(HISTORY_KEY, &raw)
  }
}
