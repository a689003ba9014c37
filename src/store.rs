//! Slot-based persistent store for history, favorites, the response cache,
//! and the search-mode preference.
//!
//! Values are JSON-encoded into a single SQLite table, one row per slot. The
//! public accessors are fail-soft: a read that cannot be decoded yields the
//! empty default and a write failure is a logged no-op, so business logic
//! always observes a well-formed (possibly empty) structure. Concurrent
//! processes race read-modify-write; last write wins.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::api::types::{CacheEntry, CreatureRecord, FavoriteEntry, HistoryEntry};

/// Most recent searches kept, newest first.
pub const HISTORY_LIMIT: usize = 20;

const SLOT_HISTORY: &str = "history";
const SLOT_FAVORITES: &str = "favorites";
const SLOT_CACHE: &str = "cache";
const SLOT_SEARCH_MODE: &str = "last_search_mode";

/// What a bare `search` looks up; persisted between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SearchMode {
  #[default]
  Creature,
  Ability,
}

impl SearchMode {
  fn as_str(self) -> &'static str {
    match self {
      SearchMode::Creature => "creature",
      SearchMode::Ability => "ability",
    }
  }

  fn parse(s: &str) -> Option<Self> {
    match s {
      "creature" => Some(SearchMode::Creature),
      "ability" => Some(SearchMode::Ability),
      _ => None,
    }
  }
}

const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS slots (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// SQLite-backed slot store.
pub struct Store {
  conn: Mutex<Connection>,
}

impl Store {
  /// Open or create the store, in `data_dir` if given, else at the platform
  /// default location.
  pub fn open(data_dir: Option<&Path>) -> Result<Self> {
    let path = match data_dir {
      Some(dir) => dir.join("store.db"),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create data directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open store at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// In-memory store for tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory store: {}", e))?;
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;
    Ok(store)
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("pokedex").join("store.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(STORE_SCHEMA)
      .map_err(|e| eyre!("Failed to run store migrations: {}", e))?;

    Ok(())
  }

  // ==========================================================================
  // Raw slot access. Result-returning internally; failures are folded into
  // defaults/no-ops at the public boundary below.
  // ==========================================================================

  fn read_slot<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT value FROM slots WHERE name = ?")
      .map_err(|e| eyre!("Failed to prepare slot query: {}", e))?;

    let raw: Option<String> = stmt.query_row(params![name], |row| row.get(0)).ok();

    match raw {
      Some(raw) => {
        let value =
          serde_json::from_str(&raw).map_err(|e| eyre!("Failed to decode slot {}: {}", name, e))?;
        Ok(Some(value))
      }
      None => Ok(None),
    }
  }

  fn write_slot<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
    let raw =
      serde_json::to_string(value).map_err(|e| eyre!("Failed to encode slot {}: {}", name, e))?;

    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO slots (name, value) VALUES (?, ?)",
        params![name, raw],
      )
      .map_err(|e| eyre!("Failed to write slot {}: {}", name, e))?;

    Ok(())
  }

  fn load_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> T {
    match self.read_slot(name) {
      Ok(Some(value)) => value,
      Ok(None) => T::default(),
      Err(err) => {
        warn!(slot = name, %err, "failed to load slot, treating as empty");
        T::default()
      }
    }
  }

  fn save<T: Serialize>(&self, name: &str, value: &T) {
    if let Err(err) = self.write_slot(name, value) {
      warn!(slot = name, %err, "failed to save slot");
    }
  }

  // ==========================================================================
  // History
  // ==========================================================================

  pub fn history(&self) -> Vec<HistoryEntry> {
    self.load_or_default(SLOT_HISTORY)
  }

  pub fn save_history(&self, history: &[HistoryEntry]) {
    self.save(SLOT_HISTORY, &history)
  }

  /// Record an access. An already-present id moves to the front with the new
  /// timestamp and origin flag; a new id pushes the oldest entry out beyond
  /// the limit.
  pub fn add_to_history(&self, entry: HistoryEntry) -> Vec<HistoryEntry> {
    let mut history = self.history();

    if let Some(pos) = history.iter().position(|e| e.id == entry.id) {
      history.remove(pos);
      history.insert(0, entry);
    } else {
      history.insert(0, entry);
      history.truncate(HISTORY_LIMIT);
    }

    self.save_history(&history);
    history
  }

  /// Remove one history entry. The cached response for that id goes with it.
  pub fn remove_from_history(&self, id: u32) -> Vec<HistoryEntry> {
    let mut history = self.history();
    history.retain(|e| e.id != id);
    self.save_history(&history);

    self.remove_cached(id);

    history
  }

  // ==========================================================================
  // Favorites
  // ==========================================================================

  pub fn favorites(&self) -> Vec<FavoriteEntry> {
    self.load_or_default(SLOT_FAVORITES)
  }

  pub fn save_favorites(&self, favorites: &[FavoriteEntry]) {
    self.save(SLOT_FAVORITES, &favorites)
  }

  /// Idempotent: adding an id that is already present changes nothing.
  pub fn add_to_favorites(&self, entry: FavoriteEntry) -> Vec<FavoriteEntry> {
    let mut favorites = self.favorites();

    if !favorites.iter().any(|e| e.id == entry.id) {
      favorites.push(entry);
      self.save_favorites(&favorites);
    }

    favorites
  }

  /// No-op when the id is not a favorite.
  pub fn remove_from_favorites(&self, id: u32) -> Vec<FavoriteEntry> {
    let mut favorites = self.favorites();
    favorites.retain(|e| e.id != id);
    self.save_favorites(&favorites);
    favorites
  }

  pub fn is_favorite(&self, id: u32) -> bool {
    self.favorites().iter().any(|e| e.id == id)
  }

  // ==========================================================================
  // Response cache
  // ==========================================================================

  pub fn cache_map(&self) -> HashMap<u32, CacheEntry> {
    self.load_or_default(SLOT_CACHE)
  }

  pub fn save_cache(&self, cache: &HashMap<u32, CacheEntry>) {
    self.save(SLOT_CACHE, cache)
  }

  pub fn get_cached(&self, id: u32) -> Option<CacheEntry> {
    self.cache_map().remove(&id)
  }

  /// Overwrite the cache slot for the record's id with a fresh timestamp.
  /// Last write wins; there is no merge with a previous entry.
  pub fn put_cached(&self, record: &CreatureRecord) {
    self.put_cached_at(record, Utc::now());
  }

  pub(crate) fn put_cached_at(&self, record: &CreatureRecord, cached_at: DateTime<Utc>) {
    let mut cache = self.cache_map();
    cache.insert(
      record.id,
      CacheEntry {
        record: record.clone(),
        cached_at,
      },
    );
    self.save_cache(&cache);
  }

  pub fn remove_cached(&self, id: u32) {
    let mut cache = self.cache_map();
    if cache.remove(&id).is_some() {
      self.save_cache(&cache);
    }
  }

  // ==========================================================================
  // Search-mode preference
  // ==========================================================================

  pub fn last_search_mode(&self) -> SearchMode {
    let raw: String = self.load_or_default(SLOT_SEARCH_MODE);
    SearchMode::parse(&raw).unwrap_or_default()
  }

  pub fn set_last_search_mode(&self, mode: SearchMode) {
    self.save(SLOT_SEARCH_MODE, &mode.as_str());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(id: u32, name: &str) -> HistoryEntry {
    HistoryEntry {
      id,
      name: name.to_string(),
      sprite: format!("sprite-{}", id),
      types: vec!["NORMAL".to_string()],
      timestamp: Utc::now(),
      from_cache: false,
    }
  }

  fn favorite(id: u32, name: &str) -> FavoriteEntry {
    FavoriteEntry {
      id,
      name: name.to_string(),
      sprite: format!("sprite-{}", id),
      types: vec!["NORMAL".to_string()],
    }
  }

  fn record(id: u32, name: &str) -> CreatureRecord {
    CreatureRecord {
      id,
      name: name.to_string(),
      types: vec!["normal".to_string()],
      abilities: vec![],
      stats: vec![],
      sprite: format!("sprite-{}", id),
    }
  }

  #[test]
  fn test_history_readd_moves_to_front_without_growing() {
    let store = Store::open_in_memory().unwrap();

    store.add_to_history(entry(1, "bulbasaur"));
    store.add_to_history(entry(2, "ivysaur"));
    store.add_to_history(entry(1, "bulbasaur"));

    let history = store.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, 1);
    assert_eq!(history[1].id, 2);
  }

  #[test]
  fn test_history_evicts_oldest_beyond_limit() {
    let store = Store::open_in_memory().unwrap();

    for id in 1..=21 {
      store.add_to_history(entry(id, &format!("creature-{}", id)));
    }

    let history = store.history();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history[0].id, 21);
    // The first-added entry is gone.
    assert!(!history.iter().any(|e| e.id == 1));
  }

  #[test]
  fn test_favorites_add_is_idempotent() {
    let store = Store::open_in_memory().unwrap();

    store.add_to_favorites(favorite(25, "pikachu"));
    let favorites = store.add_to_favorites(favorite(25, "pikachu"));

    assert_eq!(favorites.len(), 1);
    assert!(store.is_favorite(25));
  }

  #[test]
  fn test_favorites_remove_nonmember_is_noop() {
    let store = Store::open_in_memory().unwrap();

    store.add_to_favorites(favorite(25, "pikachu"));
    let favorites = store.remove_from_favorites(99);

    assert_eq!(favorites.len(), 1);
  }

  #[test]
  fn test_favorites_preserve_insertion_order() {
    let store = Store::open_in_memory().unwrap();

    store.add_to_favorites(favorite(7, "squirtle"));
    store.add_to_favorites(favorite(4, "charmander"));

    let favorites = store.favorites();
    assert_eq!(favorites[0].id, 7);
    assert_eq!(favorites[1].id, 4);
  }

  #[test]
  fn test_history_delete_drops_cache_entry() {
    let store = Store::open_in_memory().unwrap();

    store.put_cached(&record(25, "pikachu"));
    store.add_to_history(entry(25, "pikachu"));

    store.remove_from_history(25);

    assert!(store.history().is_empty());
    assert!(store.get_cached(25).is_none());
  }

  #[test]
  fn test_cache_put_get_roundtrip() {
    let store = Store::open_in_memory().unwrap();

    let rec = record(25, "pikachu");
    store.put_cached(&rec);

    let cached = store.get_cached(25).unwrap();
    assert_eq!(cached.record, rec);
  }

  #[test]
  fn test_search_mode_roundtrip_and_default() {
    let store = Store::open_in_memory().unwrap();

    assert_eq!(store.last_search_mode(), SearchMode::Creature);
    store.set_last_search_mode(SearchMode::Ability);
    assert_eq!(store.last_search_mode(), SearchMode::Ability);
  }
}
