//! Domain records shared by the store, cache, and presentation layers.
//!
//! These are separate from the wire schemas in `api_types` so the rest of the
//! application never sees raw API payload shapes. There is exactly one
//! creature shape: both the search path and the vs path read and write the
//! same `CreatureRecord`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upstream sprite repository, used when a payload carries no sprite URL.
const SPRITE_FALLBACK_BASE: &str =
  "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Sprite URL for a creature id when the API sprite field is null.
pub fn fallback_sprite(id: u32) -> String {
  format!("{}/{}.png", SPRITE_FALLBACK_BASE, id)
}

/// An ability as listed on a creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
  pub name: String,
  pub is_hidden: bool,
}

/// A single base stat (values are 0-255 upstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
  pub name: String,
  pub value: u16,
}

/// Canonical creature record. Immutable upstream data: the id uniquely
/// determines every other field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
  pub id: u32,
  pub name: String,
  /// One or two entries, primary type first.
  pub types: Vec<String>,
  pub abilities: Vec<AbilitySlot>,
  pub stats: Vec<StatValue>,
  pub sprite: String,
}

impl CreatureRecord {
  /// Uppercased type tags as stored in history and favorites.
  pub fn display_types(&self) -> Vec<String> {
    self.types.iter().map(|t| t.to_uppercase()).collect()
  }
}

/// A cached creature plus the instant it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
  pub record: CreatureRecord,
  pub cached_at: DateTime<Utc>,
}

/// One localized effect description of an ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectEntry {
  pub language: String,
  pub text: String,
}

/// Unresolved reference to a creature that can hold an ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityHolderRef {
  pub name: String,
  pub url: String,
  pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRecord {
  pub id: u32,
  pub name: String,
  pub effect_entries: Vec<EffectEntry>,
  pub holders: Vec<AbilityHolderRef>,
}

impl AbilityRecord {
  /// Effect text in the preferred language, falling back to the first entry.
  /// None means no description is available at all.
  pub fn effect_text(&self, language: &str) -> Option<&str> {
    self
      .effect_entries
      .iter()
      .find(|e| e.language == language)
      .or_else(|| self.effect_entries.first())
      .map(|e| e.text.as_str())
  }
}

/// Resolved ability holder, minimal fields for the holder grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureSummary {
  pub id: u32,
  pub name: String,
  pub sprite: String,
  pub is_hidden: bool,
}

/// One entry of the recency-ordered search history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub id: u32,
  pub name: String,
  pub sprite: String,
  /// Uppercase type tags.
  pub types: Vec<String>,
  pub timestamp: DateTime<Utc>,
  /// Whether this access was served from the local cache.
  pub from_cache: bool,
}

impl HistoryEntry {
  pub fn from_record(record: &CreatureRecord, from_cache: bool) -> Self {
    Self {
      id: record.id,
      name: record.name.clone(),
      sprite: record.sprite.clone(),
      types: record.display_types(),
      timestamp: Utc::now(),
      from_cache,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
  pub id: u32,
  pub name: String,
  pub sprite: String,
  pub types: Vec<String>,
}

impl FavoriteEntry {
  pub fn from_record(record: &CreatureRecord) -> Self {
    Self {
      id: record.id,
      name: record.name.clone(),
      sprite: record.sprite.clone(),
      types: record.display_types(),
    }
  }
}

/// One node of the flattened evolution tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionNode {
  pub id: u32,
  pub name: String,
  pub sprite: String,
  /// Depth in the chain, root = 0.
  pub level: usize,
  /// Parent creature id; None for the root.
  pub evolves_from: Option<u32>,
}
