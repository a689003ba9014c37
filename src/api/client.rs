//! PokeAPI transport client.

use crate::api::api_types::{ApiAbility, ApiCreature, ApiSpecies};
use crate::api::error::ApiError;
use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Thin typed client around the PokeAPI REST endpoints. All requests are
/// anonymous GETs with a bounded wait; the timeout aborts the request.
#[derive(Clone)]
pub struct PokeClient {
  http: reqwest::Client,
  base_url: Url,
}

impl PokeClient {
  pub fn new(config: &Config) -> Result<Self> {
    // A trailing slash makes Url::join treat the last segment as a directory.
    let mut base = config.api.url.clone();
    if !base.ends_with('/') {
      base.push('/');
    }
    let base_url =
      Url::parse(&base).map_err(|e| eyre!("Invalid API base URL {}: {}", base, e))?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  /// GET `/pokemon/{query}` (lowercased).
  pub async fn fetch_creature(&self, query: &str) -> Result<ApiCreature, ApiError> {
    let url = self.endpoint("pokemon", &query.trim().to_lowercase())?;
    self.get_json(url).await
  }

  /// GET `/ability/{query}` (lowercased).
  pub async fn fetch_ability(&self, query: &str) -> Result<ApiAbility, ApiError> {
    let url = self.endpoint("ability", &query.trim().to_lowercase())?;
    self.get_json(url).await
  }

  /// GET `/pokemon-species/{id}`.
  pub async fn fetch_species(&self, id: u32) -> Result<ApiSpecies, ApiError> {
    let url = self.endpoint("pokemon-species", &id.to_string())?;
    self.get_json(url).await
  }

  /// GET an absolute URL returned inside an earlier payload (evolution chain,
  /// per-holder creature detail).
  pub async fn fetch_url<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
    let url = Url::parse(url).map_err(|e| ApiError::Decode(format!("bad resource url: {}", e)))?;
    self.get_json(url).await
  }

  fn endpoint(&self, resource: &str, id_or_name: &str) -> Result<Url, ApiError> {
    self
      .base_url
      .join(&format!("{}/{}", resource, id_or_name))
      .map_err(|e| ApiError::Decode(format!("bad endpoint: {}", e)))
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
    let response = self.http.get(url).send().await.map_err(ApiError::from)?;

    match response.status() {
      StatusCode::NOT_FOUND => Err(ApiError::NotFound),
      status if !status.is_success() => Err(ApiError::Http(status.as_u16())),
      _ => response.json::<T>().await.map_err(ApiError::from),
    }
  }
}
