//! Rendering-shape classification of an evolution lineage.
//!
//! The flat node list from the gateway is normalized, tested for linearity,
//! and mapped to one of a small number of layout shapes. The wrap thresholds
//! and the bytewise name tie-break are part of the visual contract: they
//! decide which row a creature lands on.

use std::collections::HashSet;

use crate::api::types::EvolutionNode;

/// Parent-branch child groups larger than this stack under the parent row.
const PARENT_GROUP_INLINE_MAX: usize = 3;
/// Root-branch children per wrapped row.
const ROOT_ROW_WIDTH: usize = 4;

/// How a lineage should be laid out around the currently displayed creature.
/// Every node carries its id and name so a rendered box can re-query that
/// creature on selection.
#[derive(Debug, Clone, PartialEq)]
pub enum LineageLayout {
  /// No node branches: the whole chain in one horizontal row, root first.
  Linear { chain: Vec<EvolutionNode> },
  /// The current creature has a parent: parent on the left, one arrow, then
  /// all of the parent's children (current included) in name order. `stacked`
  /// moves the child group onto its own row below the parent.
  ParentBranch {
    parent: EvolutionNode,
    children: Vec<EvolutionNode>,
    stacked: bool,
  },
  /// The current creature is a branching root: root alone on the left, one
  /// arrow, then children in wrapped rows.
  RootBranch {
    root: EvolutionNode,
    rows: Vec<Vec<EvolutionNode>>,
  },
  /// Chain of one: just the current creature.
  Single { node: EvolutionNode },
}

/// Classify the lineage around `current_id`.
///
/// Returns None when the node list is empty or does not contain the current
/// creature; the caller omits the lineage section in that case.
pub fn classify(nodes: &[EvolutionNode], current_id: u32) -> Option<LineageLayout> {
  // Normalization: level ascending, then name (bytewise).
  let mut nodes = nodes.to_vec();
  nodes.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name)));

  let current = nodes.iter().find(|n| n.id == current_id)?.clone();
  let parent = current
    .evolves_from
    .and_then(|pid| nodes.iter().find(|n| n.id == pid))
    .cloned();

  let chain = complete_chain(&nodes);
  if is_linear(&nodes) && chain.len() > 1 {
    return Some(LineageLayout::Linear { chain });
  }

  if let Some(parent) = parent {
    // Siblings render alongside the current creature.
    let children = children_of(&nodes, parent.id);
    let stacked = children.len() > PARENT_GROUP_INLINE_MAX;
    return Some(LineageLayout::ParentBranch {
      parent,
      children,
      stacked,
    });
  }

  let children = children_of(&nodes, current.id);
  if !children.is_empty() {
    let rows = children
      .chunks(ROOT_ROW_WIDTH)
      .map(|row| row.to_vec())
      .collect();
    return Some(LineageLayout::RootBranch {
      root: current,
      rows,
    });
  }

  Some(LineageLayout::Single { node: current })
}

/// Direct children of `id`, name-sorted (bytewise).
fn children_of(nodes: &[EvolutionNode], id: u32) -> Vec<EvolutionNode> {
  let mut children: Vec<EvolutionNode> = nodes
    .iter()
    .filter(|n| n.evolves_from == Some(id))
    .cloned()
    .collect();
  children.sort_by(|a, b| a.name.cmp(&b.name));
  children
}

/// A chain is linear when no node has more than one child.
fn is_linear(nodes: &[EvolutionNode]) -> bool {
  nodes.iter().all(|node| {
    nodes
      .iter()
      .filter(|c| c.evolves_from == Some(node.id))
      .count()
      <= 1
  })
}

/// Depth-first walk from the root (pre-order), children in name order.
/// Iterative with an explicit stack and a visited set; children are pushed
/// in reverse so the name order is preserved on pop.
fn complete_chain(nodes: &[EvolutionNode]) -> Vec<EvolutionNode> {
  let Some(root) = nodes.iter().find(|n| n.evolves_from.is_none()) else {
    return Vec::new();
  };

  let mut chain = Vec::new();
  let mut visited = HashSet::new();
  let mut stack = vec![root.clone()];

  while let Some(node) = stack.pop() {
    if !visited.insert(node.id) {
      continue;
    }

    let children = children_of(nodes, node.id);
    chain.push(node);

    for child in children.into_iter().rev() {
      stack.push(child);
    }
  }

  chain
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::fallback_sprite;

  fn node(id: u32, name: &str, level: usize, evolves_from: Option<u32>) -> EvolutionNode {
    EvolutionNode {
      id,
      name: name.to_string(),
      sprite: fallback_sprite(id),
      level,
      evolves_from,
    }
  }

  fn three_stage_line() -> Vec<EvolutionNode> {
    vec![
      node(1, "bulbasaur", 0, None),
      node(2, "ivysaur", 1, Some(1)),
      node(3, "venusaur", 2, Some(2)),
    ]
  }

  fn branching_pair() -> Vec<EvolutionNode> {
    vec![
      node(43, "oddish", 0, None),
      node(45, "vileplume", 1, Some(43)),
      node(182, "bellossom", 1, Some(43)),
    ]
  }

  #[test]
  fn test_linear_chain_renders_one_row_in_level_order() {
    let layout = classify(&three_stage_line(), 2).unwrap();

    match layout {
      LineageLayout::Linear { chain } => {
        let names: Vec<&str> = chain.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["bulbasaur", "ivysaur", "venusaur"]);
      }
      other => panic!("expected linear layout, got {:?}", other),
    }
  }

  #[test]
  fn test_linear_regardless_of_selected_stage() {
    for id in [1, 2, 3] {
      assert!(matches!(
        classify(&three_stage_line(), id),
        Some(LineageLayout::Linear { .. })
      ));
    }
  }

  #[test]
  fn test_branching_root_renders_root_then_wrapped_row() {
    let layout = classify(&branching_pair(), 43).unwrap();

    match layout {
      LineageLayout::RootBranch { root, rows } => {
        assert_eq!(root.name, "oddish");
        assert_eq!(rows.len(), 1);
        let names: Vec<&str> = rows[0].iter().map(|n| n.name.as_str()).collect();
        // Name order, bytewise.
        assert_eq!(names, vec!["bellossom", "vileplume"]);
      }
      other => panic!("expected root-branch layout, got {:?}", other),
    }
  }

  #[test]
  fn test_branch_member_renders_parent_and_sibling_group() {
    let layout = classify(&branching_pair(), 45).unwrap();

    match layout {
      LineageLayout::ParentBranch {
        parent,
        children,
        stacked,
      } => {
        assert_eq!(parent.name, "oddish");
        let names: Vec<&str> = children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["bellossom", "vileplume"]);
        // Two children fit inline next to the parent.
        assert!(!stacked);
      }
      other => panic!("expected parent-branch layout, got {:?}", other),
    }
  }

  #[test]
  fn test_parent_branch_stacks_beyond_three_children() {
    let nodes = vec![
      node(280, "ralts", 0, None),
      node(281, "kirlia", 1, Some(280)),
      node(282, "gardevoir", 2, Some(281)),
      node(475, "gallade", 2, Some(281)),
      node(999, "impostor", 2, Some(281)),
      node(998, "decoy", 2, Some(281)),
    ];

    match classify(&nodes, 282).unwrap() {
      LineageLayout::ParentBranch {
        children, stacked, ..
      } => {
        assert_eq!(children.len(), 4);
        assert!(stacked);
      }
      other => panic!("expected parent-branch layout, got {:?}", other),
    }
  }

  #[test]
  fn test_root_branch_wraps_rows_of_four() {
    // Eevee-style fan: one root, eight children.
    let mut nodes = vec![node(133, "eevee", 0, None)];
    let names = [
      "vaporeon", "jolteon", "flareon", "espeon", "umbreon", "leafeon", "glaceon", "sylveon",
    ];
    for (i, name) in names.iter().enumerate() {
      nodes.push(node(200 + i as u32, name, 1, Some(133)));
    }

    match classify(&nodes, 133).unwrap() {
      LineageLayout::RootBranch { rows, .. } => {
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 4);
        assert_eq!(rows[1].len(), 4);
        // First row starts at the bytewise-smallest name.
        assert_eq!(rows[0][0].name, "espeon");
      }
      other => panic!("expected root-branch layout, got {:?}", other),
    }
  }

  #[test]
  fn test_chain_of_one_is_single() {
    let nodes = vec![node(132, "ditto", 0, None)];

    assert_eq!(
      classify(&nodes, 132),
      Some(LineageLayout::Single {
        node: node(132, "ditto", 0, None)
      })
    );
  }

  #[test]
  fn test_missing_current_yields_none() {
    assert_eq!(classify(&three_stage_line(), 999), None);
    assert_eq!(classify(&[], 1), None);
  }

  #[test]
  fn test_complete_chain_visits_branches_in_name_order() {
    // Branch at level 1: the DFS must take the bytewise-smaller name first.
    let nodes = vec![
      node(43, "oddish", 0, None),
      node(44, "gloom", 1, Some(43)),
      node(999, "aaa", 1, Some(43)),
      node(45, "vileplume", 2, Some(44)),
    ];

    let chain = complete_chain(&nodes);
    let names: Vec<&str> = chain.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["oddish", "aaa", "gloom", "vileplume"]);
  }
}
