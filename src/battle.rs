//! Head-to-head comparison: type effectiveness and aggregate stat scores.
//!
//! Pure and deterministic; no I/O. The vs view keeps its two selections in an
//! explicit `VsSession` value rather than module state.

use crate::api::types::CreatureRecord;

/// Score differences below this are reported as a draw.
const DRAW_EPSILON: f64 = 0.01;

struct TypeEntry {
  name: &'static str,
  super_effective: &'static [&'static str],
  not_very_effective: &'static [&'static str],
  no_effect: &'static [&'static str],
}

/// Simplified effectiveness chart, one entry per attacking type.
/// Unlisted pairings are neutral (x1).
const TYPE_CHART: &[TypeEntry] = &[
  TypeEntry {
    name: "normal",
    super_effective: &[],
    not_very_effective: &["rock", "steel"],
    no_effect: &["ghost"],
  },
  TypeEntry {
    name: "fire",
    super_effective: &["grass", "ice", "bug", "steel"],
    not_very_effective: &["fire", "water", "rock", "dragon"],
    no_effect: &[],
  },
  TypeEntry {
    name: "water",
    super_effective: &["fire", "ground", "rock"],
    not_very_effective: &["water", "grass", "dragon"],
    no_effect: &[],
  },
  TypeEntry {
    name: "grass",
    super_effective: &["water", "ground", "rock"],
    not_very_effective: &["fire", "grass", "poison", "flying", "bug", "dragon", "steel"],
    no_effect: &[],
  },
  TypeEntry {
    name: "electric",
    super_effective: &["water", "flying"],
    not_very_effective: &["electric", "grass", "dragon"],
    no_effect: &["ground"],
  },
  TypeEntry {
    name: "ice",
    super_effective: &["grass", "ground", "flying", "dragon"],
    not_very_effective: &["fire", "water", "ice", "steel"],
    no_effect: &[],
  },
  TypeEntry {
    name: "fighting",
    super_effective: &["normal", "ice", "rock", "dark", "steel"],
    not_very_effective: &["poison", "flying", "psychic", "bug", "fairy"],
    no_effect: &["ghost"],
  },
  TypeEntry {
    name: "poison",
    super_effective: &["grass", "fairy"],
    not_very_effective: &["poison", "ground", "rock", "ghost"],
    no_effect: &["steel"],
  },
  TypeEntry {
    name: "ground",
    super_effective: &["fire", "electric", "poison", "rock", "steel"],
    not_very_effective: &["grass", "bug"],
    no_effect: &["flying"],
  },
  TypeEntry {
    name: "flying",
    super_effective: &["grass", "fighting", "bug"],
    not_very_effective: &["electric", "rock", "steel"],
    no_effect: &[],
  },
  TypeEntry {
    name: "psychic",
    super_effective: &["fighting", "poison"],
    not_very_effective: &["psychic", "steel"],
    no_effect: &["dark"],
  },
  TypeEntry {
    name: "bug",
    super_effective: &["grass", "psychic", "dark"],
    not_very_effective: &["fire", "fighting", "poison", "flying", "ghost", "steel", "fairy"],
    no_effect: &[],
  },
  TypeEntry {
    name: "rock",
    super_effective: &["fire", "ice", "flying", "bug"],
    not_very_effective: &["fighting", "ground", "steel"],
    no_effect: &[],
  },
  TypeEntry {
    name: "ghost",
    super_effective: &["psychic", "ghost"],
    not_very_effective: &["dark"],
    no_effect: &["normal"],
  },
  TypeEntry {
    name: "dragon",
    super_effective: &["dragon"],
    not_very_effective: &["steel"],
    no_effect: &["fairy"],
  },
  TypeEntry {
    name: "dark",
    super_effective: &["psychic", "ghost"],
    not_very_effective: &["fighting", "dark", "fairy"],
    no_effect: &[],
  },
  TypeEntry {
    name: "steel",
    super_effective: &["ice", "rock", "fairy"],
    not_very_effective: &["fire", "water", "electric", "steel"],
    no_effect: &[],
  },
  TypeEntry {
    name: "fairy",
    super_effective: &["fighting", "dragon", "dark"],
    not_very_effective: &["fire", "poison", "steel"],
    no_effect: &[],
  },
];

/// Multiplier for one attack type against one defending type.
/// Unknown attack types are neutral.
pub fn type_effectiveness(attack_type: &str, defend_type: &str) -> f64 {
  let Some(entry) = TYPE_CHART.iter().find(|e| e.name == attack_type) else {
    return 1.0;
  };

  if entry.no_effect.contains(&defend_type) {
    0.0
  } else if entry.super_effective.contains(&defend_type) {
    2.0
  } else if entry.not_very_effective.contains(&defend_type) {
    0.5
  } else {
    1.0
  }
}

/// Effectiveness of an attacker's primary type against a full defender.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMatchup {
  pub attack_type: String,
  pub multiplier: f64,
}

/// The attacker's first listed type is the effective attack type; the
/// per-type factors multiply across all of the defender's types, so a
/// dual-typed defender can land anywhere in {0, 0.25, 0.5, 1, 2, 4}.
pub fn combined_multiplier(attacker: &CreatureRecord, defender: &CreatureRecord) -> TypeMatchup {
  let attack_type = attacker.types.first().cloned().unwrap_or_default();
  let multiplier: f64 = defender
    .types
    .iter()
    .map(|def| type_effectiveness(&attack_type, def))
    .product();

  TypeMatchup {
    attack_type,
    multiplier,
  }
}

pub fn base_stat_total(creature: &CreatureRecord) -> u32 {
  creature.stats.iter().map(|s| u32::from(s.value)).sum()
}

pub fn score(creature: &CreatureRecord, opponent: &CreatureRecord) -> f64 {
  f64::from(base_stat_total(creature)) * combined_multiplier(creature, opponent).multiplier
}

/// Which side a comparison favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  First,
  Second,
  Draw,
}

/// Full comparison between two creatures.
#[derive(Debug, Clone)]
pub struct BattleReport {
  pub totals: [u32; 2],
  pub matchups: [TypeMatchup; 2],
  pub scores: [f64; 2],
  pub outcome: Outcome,
}

pub fn compare(first: &CreatureRecord, second: &CreatureRecord) -> BattleReport {
  let totals = [base_stat_total(first), base_stat_total(second)];
  let matchups = [
    combined_multiplier(first, second),
    combined_multiplier(second, first),
  ];
  let scores = [
    f64::from(totals[0]) * matchups[0].multiplier,
    f64::from(totals[1]) * matchups[1].multiplier,
  ];

  let outcome = if (scores[0] - scores[1]).abs() < DRAW_EPSILON {
    Outcome::Draw
  } else if scores[0] > scores[1] {
    Outcome::First
  } else {
    Outcome::Second
  };

  BattleReport {
    totals,
    matchups,
    scores,
    outcome,
  }
}

/// Explicit two-slot selection state for the vs view.
#[derive(Debug, Clone, Default)]
pub struct VsSession {
  slots: [Option<CreatureRecord>; 2],
}

impl VsSession {
  pub fn set_slot(&mut self, slot: usize, record: CreatureRecord) {
    self.slots[slot] = Some(record);
  }

  pub fn clear(&mut self) {
    self.slots = [None, None];
  }

  pub fn slot(&self, slot: usize) -> Option<&CreatureRecord> {
    self.slots[slot].as_ref()
  }

  /// None until both slots are filled.
  pub fn report(&self) -> Option<BattleReport> {
    match (&self.slots[0], &self.slots[1]) {
      (Some(first), Some(second)) => Some(compare(first, second)),
      _ => None,
    }
  }
}
