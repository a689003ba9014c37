//! Plain-text card rendering for the CLI surface.
//!
//! Templating/glue only: every layout decision that matters (lineage shapes,
//! holder order, draw detection) is made upstream and rendered verbatim here.

use chrono::{DateTime, Local, Utc};

use crate::api::types::{
  AbilityRecord, CreatureRecord, CreatureSummary, EvolutionNode, FavoriteEntry, HistoryEntry,
};
use crate::battle::{BattleReport, Outcome};
use crate::lineage::LineageLayout;

/// Longest effect paragraph shown before truncation.
const EFFECT_MAX_CHARS: usize = 200;

const NO_DESCRIPTION: &str = "No description available";

pub fn creature_card(
  record: &CreatureRecord,
  layout: Option<&LineageLayout>,
  cache_sourced: bool,
  is_favorite: bool,
) -> String {
  let mut out = String::new();

  let badge = if cache_sourced { "FROM CACHE" } else { "FROM API" };
  let heart = if is_favorite { " ♥" } else { "" };
  out.push_str(&format!(
    "#{} {}{}  [{}]\n",
    record.id,
    record.name.to_uppercase(),
    heart,
    badge
  ));
  out.push_str(&format!("types: {}\n", record.types.join(", ")));
  out.push_str(&format!("sprite: {}\n", record.sprite));

  out.push_str("\nabilities:\n");
  for ability in &record.abilities {
    if ability.is_hidden {
      out.push_str(&format!("  {} (hidden)\n", ability.name));
    } else {
      out.push_str(&format!("  {}\n", ability.name));
    }
  }

  out.push_str("\nstats:\n");
  for stat in &record.stats {
    out.push_str(&format!(
      "  {:<16} {:>3} {}\n",
      stat.name,
      stat.value,
      stat_bar(stat.value)
    ));
  }

  if let Some(layout) = layout {
    out.push_str("\nevolution chain:\n");
    out.push_str(&lineage_section(layout, record.id));
  }

  out
}

/// Scaled bar; values cap at 100 so the gauge width is bounded.
fn stat_bar(value: u16) -> String {
  let width = usize::from(value.min(100)) / 5;
  "█".repeat(width)
}

fn node_label(node: &EvolutionNode, current_id: u32) -> String {
  if node.id == current_id {
    format!("[#{} {}]", node.id, node.name)
  } else {
    format!("#{} {}", node.id, node.name)
  }
}

fn row(nodes: &[EvolutionNode], current_id: u32) -> String {
  nodes
    .iter()
    .map(|n| node_label(n, current_id))
    .collect::<Vec<_>>()
    .join("   ")
}

pub fn lineage_section(layout: &LineageLayout, current_id: u32) -> String {
  match layout {
    LineageLayout::Linear { chain } => {
      let labels: Vec<String> = chain.iter().map(|n| node_label(n, current_id)).collect();
      format!("  {}\n", labels.join(" → "))
    }
    LineageLayout::ParentBranch {
      parent,
      children,
      stacked,
    } => {
      if *stacked {
        format!(
          "  {} →\n    {}\n",
          node_label(parent, current_id),
          row(children, current_id)
        )
      } else {
        format!(
          "  {} → {}\n",
          node_label(parent, current_id),
          row(children, current_id)
        )
      }
    }
    LineageLayout::RootBranch { root, rows } => {
      let mut out = format!("  {} →\n", node_label(root, current_id));
      for chunk in rows {
        out.push_str(&format!("    {}\n", row(chunk, current_id)));
      }
      out
    }
    LineageLayout::Single { node } => format!("  {}\n", node_label(node, current_id)),
  }
}

pub fn ability_card(record: &AbilityRecord, holders: &[CreatureSummary], language: &str) -> String {
  let mut out = String::new();

  out.push_str(&format!("{}  #{}\n", record.name.to_uppercase(), record.id));

  let effect = record
    .effect_text(language)
    .map(effect_paragraph)
    .unwrap_or_else(|| NO_DESCRIPTION.to_string());
  out.push_str(&format!("\neffect: {}\n", effect));

  out.push_str(&format!("\ncreatures with this ability ({}):\n", holders.len()));
  for holder in holders {
    if holder.is_hidden {
      out.push_str(&format!("  #{} {} (hidden)\n", holder.id, holder.name));
    } else {
      out.push_str(&format!("  #{} {}\n", holder.id, holder.name));
    }
  }

  out
}

/// First paragraph of the effect text, capped at 200 characters.
fn effect_paragraph(text: &str) -> String {
  let paragraph = text.split('\n').next().unwrap_or("");
  if paragraph.chars().count() > EFFECT_MAX_CHARS {
    let truncated: String = paragraph.chars().take(EFFECT_MAX_CHARS).collect();
    format!("{}...", truncated)
  } else {
    paragraph.to_string()
  }
}

pub fn history_list(entries: &[HistoryEntry], favorite_ids: &[u32]) -> String {
  if entries.is_empty() {
    return "No recent searches\n".to_string();
  }

  let mut out = String::new();
  for entry in entries {
    let heart = if favorite_ids.contains(&entry.id) {
      " ♥"
    } else {
      ""
    };
    let origin = if entry.from_cache { "cache" } else { "api" };
    out.push_str(&format!(
      "#{:<5} {:<14}{} {:<24} {}  ({})\n",
      entry.id,
      entry.name,
      heart,
      entry.types.join("/"),
      format_timestamp(entry.timestamp),
      origin
    ));
  }
  out
}

pub fn favorites_list(entries: &[FavoriteEntry]) -> String {
  if entries.is_empty() {
    return "No favorite creatures\n".to_string();
  }

  let mut out = String::new();
  for entry in entries {
    out.push_str(&format!(
      "#{:<5} {:<14} {}\n",
      entry.id,
      entry.name,
      entry.types.join("/")
    ));
  }
  out
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
  ts.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

pub fn battle_report(
  first: &CreatureRecord,
  second: &CreatureRecord,
  report: &BattleReport,
) -> String {
  let mut out = String::new();

  match report.outcome {
    Outcome::Draw => out.push_str(&format!(
      "DRAW  ({:.1} vs {:.1})\n",
      report.scores[0], report.scores[1]
    )),
    Outcome::First => out.push_str(&format!(
      "WINNER: {}  ({:.1})\n",
      first.name.to_uppercase(),
      report.scores[0]
    )),
    Outcome::Second => out.push_str(&format!(
      "WINNER: {}  ({:.1})\n",
      second.name.to_uppercase(),
      report.scores[1]
    )),
  }

  for (i, creature) in [first, second].into_iter().enumerate() {
    out.push_str(&format!(
      "\n{}\n  stats: {}\n  x effectiveness: {:.2}\n  score: {:.1}\n",
      creature.name.to_uppercase(),
      report.totals[i],
      report.matchups[i].multiplier,
      report.scores[i]
    ));
  }

  out.push('\n');
  out.push_str(&effectiveness_line(
    &first.name,
    &second.name,
    &report.matchups[0].attack_type,
    report.matchups[0].multiplier,
  ));
  out.push_str(&effectiveness_line(
    &second.name,
    &first.name,
    &report.matchups[1].attack_type,
    report.matchups[1].multiplier,
  ));

  out
}

fn effectiveness_line(
  attacker: &str,
  defender: &str,
  attack_type: &str,
  multiplier: f64,
) -> String {
  let description = if multiplier == 0.0 {
    "has no effect against"
  } else if multiplier < 1.0 {
    "is not very effective against"
  } else if multiplier > 1.0 {
    "is super effective against"
  } else {
    "has normal effectiveness against"
  };

  format!(
    "{} vs {}: x{:.2} ({} {} {})\n",
    attacker.to_uppercase(),
    defender.to_uppercase(),
    multiplier,
    attack_type.to_uppercase(),
    description,
    defender.to_uppercase()
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::fallback_sprite;
  use crate::lineage::classify;

  fn node(id: u32, name: &str, level: usize, evolves_from: Option<u32>) -> EvolutionNode {
    EvolutionNode {
      id,
      name: name.to_string(),
      sprite: fallback_sprite(id),
      level,
      evolves_from,
    }
  }

  #[test]
  fn test_effect_paragraph_truncates_at_200_chars() {
    let long = "x".repeat(250);
    let rendered = effect_paragraph(&long);
    assert_eq!(rendered.chars().count(), 203);
    assert!(rendered.ends_with("..."));
  }

  #[test]
  fn test_effect_paragraph_keeps_first_paragraph_only() {
    assert_eq!(effect_paragraph("first line\nsecond line"), "first line");
  }

  #[test]
  fn test_linear_lineage_renders_connectors_and_highlight() {
    let nodes = vec![
      node(1, "bulbasaur", 0, None),
      node(2, "ivysaur", 1, Some(1)),
      node(3, "venusaur", 2, Some(2)),
    ];
    let layout = classify(&nodes, 2).unwrap();

    let rendered = lineage_section(&layout, 2);
    // Two connectors between three stages, current stage bracketed.
    assert_eq!(rendered.matches('→').count(), 2);
    assert!(rendered.contains("[#2 ivysaur]"));
  }

  #[test]
  fn test_root_branch_renders_one_line_per_row() {
    let nodes = vec![
      node(43, "oddish", 0, None),
      node(45, "vileplume", 1, Some(43)),
      node(182, "bellossom", 1, Some(43)),
    ];
    let layout = classify(&nodes, 43).unwrap();

    let rendered = lineage_section(&layout, 43);
    assert_eq!(rendered.lines().count(), 2);
    assert!(rendered.starts_with("  [#43 oddish] →"));
  }

  #[test]
  fn test_empty_history_message() {
    assert_eq!(history_list(&[], &[]), "No recent searches\n");
  }
}
