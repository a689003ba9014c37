//! Cached PokeAPI client that wraps PokeClient with the response cache,
//! history bookkeeping, and the composite lookups the views consume.

use chrono::Duration;
use color_eyre::Result;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::api_types::{flatten_chain, ApiCreaturePreview, ApiEvolutionChain};
use crate::api::client::PokeClient;
use crate::api::error::ApiError;
use crate::api::types::{
  AbilityRecord, CreatureRecord, CreatureSummary, EvolutionNode, HistoryEntry,
};
use crate::cache::CacheLayer;
use crate::config::Config;
use crate::store::Store;

/// A creature together with its lineage and origin flag.
#[derive(Debug, Clone)]
pub struct CreatureLookup {
  pub record: CreatureRecord,
  /// Empty when the lineage could not be fetched; lineage is enrichment only.
  pub lineage: Vec<EvolutionNode>,
  /// True when the record was served from the local cache.
  pub cache_sourced: bool,
}

/// An ability together with its resolved holder list.
#[derive(Debug, Clone)]
pub struct AbilityLookup {
  pub record: AbilityRecord,
  pub holders: Vec<CreatureSummary>,
}

/// PokeAPI client with transparent caching support.
///
/// Wraps the underlying PokeClient with the same lookup surface, consulting
/// the cache before the network and recording history as a side effect.
#[derive(Clone)]
pub struct CachedPokeClient {
  inner: PokeClient,
  cache: CacheLayer,
  store: Arc<Store>,
}

impl CachedPokeClient {
  pub fn new(config: &Config, store: Arc<Store>) -> Result<Self> {
    let inner = PokeClient::new(config)?;
    let ttl = Duration::seconds(config.cache.ttl_secs as i64);
    let cache = CacheLayer::new(Arc::clone(&store), ttl);

    Ok(Self {
      inner,
      cache,
      store,
    })
  }

  pub fn store(&self) -> &Store {
    &self.store
  }

  /// Fetch a creature, cache first. The flag is true when served from cache.
  pub async fn fetch_creature(&self, query: &str) -> Result<(CreatureRecord, bool), ApiError> {
    if let Some(record) = self.cache.resolve(query) {
      debug!(query, "creature served from cache");
      return Ok((record, true));
    }

    let record = self.inner.fetch_creature(query).await?.into_record();
    self.cache.store(&record);

    Ok((record, false))
  }

  /// Fetch a creature, record the access in history, then enrich with the
  /// evolution lineage. History is written before the lineage fetch so a
  /// lineage failure cannot prevent the access from being recorded.
  pub async fn fetch_creature_with_lineage(&self, query: &str) -> Result<CreatureLookup, ApiError> {
    let (record, cache_sourced) = self.fetch_creature(query).await?;

    self
      .store
      .add_to_history(HistoryEntry::from_record(&record, cache_sourced));

    let lineage = self.fetch_evolution_lineage(record.id).await;

    Ok(CreatureLookup {
      record,
      lineage,
      cache_sourced,
    })
  }

  /// Ability responses are deliberately not cached: holder lists are large
  /// and ability lookups comparatively rare.
  pub async fn fetch_ability(&self, query: &str) -> Result<AbilityRecord, ApiError> {
    Ok(self.inner.fetch_ability(query).await?.into_record())
  }

  pub async fn fetch_ability_with_holders(&self, query: &str) -> Result<AbilityLookup, ApiError> {
    let record = self.fetch_ability(query).await?;
    let holders = self.fetch_ability_holders(&record).await;

    Ok(AbilityLookup { record, holders })
  }

  /// Resolve every holder reference concurrently, best-effort: a failed
  /// detail fetch drops that holder instead of failing the batch.
  pub async fn fetch_ability_holders(&self, record: &AbilityRecord) -> Vec<CreatureSummary> {
    let fetches = record.holders.iter().map(|holder| {
      let client = self.inner.clone();
      let holder = holder.clone();
      async move {
        match client.fetch_url::<ApiCreaturePreview>(&holder.url).await {
          Ok(preview) => Some(preview.into_summary(holder.is_hidden)),
          Err(err) => {
            debug!(holder = %holder.name, %err, "dropping holder after failed detail fetch");
            None
          }
        }
      }
    });

    let mut holders: Vec<CreatureSummary> =
      join_all(fetches).await.into_iter().flatten().collect();
    sort_holders(&mut holders);
    holders
  }

  /// Lineage is optional enrichment: any failure yields an empty list.
  pub async fn fetch_evolution_lineage(&self, creature_id: u32) -> Vec<EvolutionNode> {
    match self.try_fetch_lineage(creature_id).await {
      Ok(nodes) => nodes,
      Err(err) => {
        warn!(creature_id, %err, "failed to fetch evolution lineage");
        Vec::new()
      }
    }
  }

  async fn try_fetch_lineage(&self, creature_id: u32) -> Result<Vec<EvolutionNode>, ApiError> {
    let species = self.inner.fetch_species(creature_id).await?;
    let chain_url = species.evolution_chain.ok_or(ApiError::NotFound)?.url;
    let chain: ApiEvolutionChain = self.inner.fetch_url(&chain_url).await?;

    Ok(flatten_chain(chain))
  }
}

/// Display order: hidden-ability holders first, then ascending id within
/// each group.
fn sort_holders(holders: &mut [CreatureSummary]) {
  holders.sort_by_key(|h| (!h.is_hidden, h.id));
}
