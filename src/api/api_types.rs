//! Serde-deserializable types matching PokeAPI responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs. Nothing outside
//! this module handles raw payload shapes.

use serde::Deserialize;

use super::types::{
  fallback_sprite, AbilityHolderRef, AbilityRecord, AbilitySlot, CreatureRecord, CreatureSummary,
  EffectEntry, EvolutionNode, StatValue,
};

// ============================================================================
// Common nested field types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiNamedResource {
  pub name: String,
  #[serde(default)]
  pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResourceLink {
  pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSprites {
  pub front_default: Option<String>,
}

// ============================================================================
// /pokemon/{name-or-id}
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiTypeSlot {
  pub slot: u8,
  #[serde(rename = "type")]
  pub type_ref: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiAbilitySlot {
  pub ability: ApiNamedResource,
  #[serde(default)]
  pub is_hidden: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiStat {
  pub base_stat: u16,
  pub stat: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiCreature {
  pub id: u32,
  pub name: String,
  #[serde(default)]
  pub sprites: ApiSprites,
  #[serde(default)]
  pub types: Vec<ApiTypeSlot>,
  #[serde(default)]
  pub abilities: Vec<ApiAbilitySlot>,
  #[serde(default)]
  pub stats: Vec<ApiStat>,
}

impl ApiCreature {
  pub fn into_record(self) -> CreatureRecord {
    let mut types = self.types;
    // Slot order is the primary/secondary order.
    types.sort_by_key(|t| t.slot);

    let sprite = self
      .sprites
      .front_default
      .unwrap_or_else(|| fallback_sprite(self.id));

    CreatureRecord {
      id: self.id,
      name: self.name,
      types: types.into_iter().map(|t| t.type_ref.name).collect(),
      abilities: self
        .abilities
        .into_iter()
        .map(|a| AbilitySlot {
          name: a.ability.name,
          is_hidden: a.is_hidden,
        })
        .collect(),
      stats: self
        .stats
        .into_iter()
        .map(|s| StatValue {
          name: s.stat.name,
          value: s.base_stat,
        })
        .collect(),
      sprite,
    }
  }
}

/// Minimal creature payload for resolving ability holders; the full record
/// is not needed for the holder grid.
#[derive(Debug, Deserialize)]
pub struct ApiCreaturePreview {
  pub id: u32,
  pub name: String,
  #[serde(default)]
  pub sprites: ApiSprites,
}

impl ApiCreaturePreview {
  pub fn into_summary(self, is_hidden: bool) -> CreatureSummary {
    let sprite = self
      .sprites
      .front_default
      .unwrap_or_else(|| fallback_sprite(self.id));
    CreatureSummary {
      id: self.id,
      name: self.name,
      sprite,
      is_hidden,
    }
  }
}

// ============================================================================
// /ability/{name-or-id}
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiEffectEntry {
  pub effect: String,
  pub language: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiAbilityHolder {
  #[serde(default)]
  pub is_hidden: bool,
  pub pokemon: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiAbility {
  pub id: u32,
  pub name: String,
  #[serde(default)]
  pub effect_entries: Vec<ApiEffectEntry>,
  #[serde(default)]
  pub pokemon: Vec<ApiAbilityHolder>,
}

impl ApiAbility {
  pub fn into_record(self) -> AbilityRecord {
    AbilityRecord {
      id: self.id,
      name: self.name,
      effect_entries: self
        .effect_entries
        .into_iter()
        .map(|e| EffectEntry {
          language: e.language.name,
          text: e.effect,
        })
        .collect(),
      holders: self
        .pokemon
        .into_iter()
        .map(|h| AbilityHolderRef {
          name: h.pokemon.name,
          url: h.pokemon.url,
          is_hidden: h.is_hidden,
        })
        .collect(),
    }
  }
}

// ============================================================================
// /pokemon-species/{id} and /evolution-chain/{id}
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiSpecies {
  pub evolution_chain: Option<ApiResourceLink>,
}

#[derive(Debug, Deserialize)]
pub struct ApiChainLink {
  pub species: ApiNamedResource,
  #[serde(default)]
  pub evolves_to: Vec<ApiChainLink>,
}

#[derive(Debug, Deserialize)]
pub struct ApiEvolutionChain {
  pub chain: ApiChainLink,
}

/// Extract the trailing numeric id from a PokeAPI resource URL
/// (e.g. `https://pokeapi.co/api/v2/pokemon-species/25/` -> 25).
pub fn resource_id(url: &str) -> Option<u32> {
  url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

/// Flatten the evolution chain tree into a node list, pre-order with the root
/// first. Iterative with an explicit stack and a visited set; siblings are
/// visited in payload order (children pushed in reverse).
pub fn flatten_chain(chain: ApiEvolutionChain) -> Vec<EvolutionNode> {
  let mut nodes = Vec::new();
  let mut visited = std::collections::HashSet::new();
  let mut stack = vec![(chain.chain, 0usize, None::<u32>)];

  while let Some((link, level, evolves_from)) = stack.pop() {
    let Some(id) = resource_id(&link.species.url) else {
      continue;
    };
    if !visited.insert(id) {
      continue;
    }

    nodes.push(EvolutionNode {
      id,
      name: link.species.name,
      sprite: fallback_sprite(id),
      level,
      evolves_from,
    });

    for next in link.evolves_to.into_iter().rev() {
      stack.push((next, level + 1, Some(id)));
    }
  }

  nodes
}

#[cfg(test)]
mod tests {
  use super::*;

  fn species(name: &str, id: u32) -> ApiNamedResource {
    ApiNamedResource {
      name: name.to_string(),
      url: format!("https://pokeapi.co/api/v2/pokemon-species/{}/", id),
    }
  }

  fn link(name: &str, id: u32, evolves_to: Vec<ApiChainLink>) -> ApiChainLink {
    ApiChainLink {
      species: species(name, id),
      evolves_to,
    }
  }

  #[test]
  fn test_resource_id() {
    assert_eq!(
      resource_id("https://pokeapi.co/api/v2/pokemon-species/25/"),
      Some(25)
    );
    assert_eq!(
      resource_id("https://pokeapi.co/api/v2/evolution-chain/67"),
      Some(67)
    );
    assert_eq!(resource_id("https://pokeapi.co/api/v2/pokemon/"), None);
  }

  #[test]
  fn test_flatten_linear_chain() {
    let chain = ApiEvolutionChain {
      chain: link(
        "bulbasaur",
        1,
        vec![link("ivysaur", 2, vec![link("venusaur", 3, vec![])])],
      ),
    };

    let nodes = flatten_chain(chain);
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].name, "bulbasaur");
    assert_eq!(nodes[0].level, 0);
    assert_eq!(nodes[0].evolves_from, None);
    assert_eq!(nodes[1].name, "ivysaur");
    assert_eq!(nodes[1].evolves_from, Some(1));
    assert_eq!(nodes[2].level, 2);
    assert_eq!(nodes[2].evolves_from, Some(2));
  }

  #[test]
  fn test_flatten_branching_chain_preorder() {
    let chain = ApiEvolutionChain {
      chain: link(
        "oddish",
        43,
        vec![link(
          "gloom",
          44,
          vec![link("vileplume", 45, vec![]), link("bellossom", 182, vec![])],
        )],
      ),
    };

    let nodes = flatten_chain(chain);
    let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    // Pre-order: root, then each subtree in payload order.
    assert_eq!(names, vec!["oddish", "gloom", "vileplume", "bellossom"]);
    assert_eq!(nodes[2].evolves_from, Some(44));
    assert_eq!(nodes[3].evolves_from, Some(44));
    assert_eq!(nodes[3].level, 2);
  }

  #[test]
  fn test_creature_payload_into_record() {
    let payload = serde_json::json!({
      "id": 25,
      "name": "pikachu",
      "sprites": { "front_default": null },
      "types": [
        { "slot": 1, "type": { "name": "electric", "url": "" } }
      ],
      "abilities": [
        { "ability": { "name": "static", "url": "" }, "is_hidden": false },
        { "ability": { "name": "lightning-rod", "url": "" }, "is_hidden": true }
      ],
      "stats": [
        { "base_stat": 35, "stat": { "name": "hp", "url": "" } },
        { "base_stat": 90, "stat": { "name": "speed", "url": "" } }
      ]
    });

    let creature: ApiCreature = serde_json::from_value(payload).unwrap();
    let record = creature.into_record();

    assert_eq!(record.id, 25);
    assert_eq!(record.types, vec!["electric"]);
    assert!(record.abilities[1].is_hidden);
    assert_eq!(record.stats[1].value, 90);
    // Null sprite falls back to the sprite repository URL.
    assert!(record.sprite.ends_with("/25.png"));
  }

  #[test]
  fn test_ability_payload_into_record() {
    let payload = serde_json::json!({
      "id": 9,
      "name": "static",
      "effect_entries": [
        { "effect": "Paralyzes on contact.", "language": { "name": "en", "url": "" } },
        { "effect": "Paraliza al contacto.", "language": { "name": "es", "url": "" } }
      ],
      "pokemon": [
        {
          "is_hidden": true,
          "pokemon": { "name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon/25/" }
        }
      ]
    });

    let ability: ApiAbility = serde_json::from_value(payload).unwrap();
    let record = ability.into_record();

    assert_eq!(record.effect_text("es"), Some("Paraliza al contacto."));
    assert_eq!(record.effect_text("de"), Some("Paralyzes on contact."));
    assert!(record.holders[0].is_hidden);
  }
}
