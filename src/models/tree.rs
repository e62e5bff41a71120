//! Pure operations over feature forests.
//!
//! A "forest" is an ordered slice of `Feature` nodes (a project's top-level
//! features, or any node's `subfeatures`). Every operation here returns a new
//! forest and never mutates its input, so callers can compare old and new
//! values to decide whether anything changed before persisting.
//!
//! Lookups are by id alone and scan the whole tree in pre-order; if duplicate
//! ids slip in (e.g., through a hand-edited import), the first match wins.
//! Migration re-keys duplicates so this stays a non-issue in practice.

use serde::{Deserialize, Serialize};

use super::{Feature, LifecycleState};

/// Aggregate node counts over a forest, including all descendants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total number of nodes at all depths
    pub total: usize,
    /// Nodes in `BACKLOG`
    pub backlog: usize,
    /// Nodes in `CREATING`
    pub creating: usize,
    /// Nodes in `FIX/POLISH`
    pub polishing: usize,
    /// Nodes in `EXPANDING`
    pub expanding: usize,
    /// Nodes in `STABLE`
    pub stable: usize,
}

impl TreeStats {
    /// Completion percentage: stable nodes over all nodes, rounded.
    ///
    /// Defined as 0 when the forest is empty.
    pub fn percent_complete(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (100.0 * self.stable as f64 / self.total as f64).round() as u32
    }
}

/// Find a feature by id anywhere in the forest (pre-order, first match).
pub fn find<'a>(forest: &'a [Feature], id: &str) -> Option<&'a Feature> {
    for feature in forest {
        if feature.id == id {
            return Some(feature);
        }
        if let Some(found) = find(&feature.subfeatures, id) {
            return Some(found);
        }
    }
    None
}

/// Rebuild the forest with the feature matching `id` replaced by `patch(node)`.
///
/// At most one node is patched (the first pre-order match). Nodes outside the
/// path to the match are cloned unchanged. The patch function must preserve
/// the node's id. If no node matches, the result equals the input.
pub fn update<F>(forest: &[Feature], id: &str, patch: F) -> Vec<Feature>
where
    F: Fn(Feature) -> Feature,
{
    update_inner(forest, id, &patch, &mut false)
}

fn update_inner<F>(forest: &[Feature], id: &str, patch: &F, done: &mut bool) -> Vec<Feature>
where
    F: Fn(Feature) -> Feature,
{
    forest
        .iter()
        .map(|feature| {
            if !*done && feature.id == id {
                *done = true;
                return patch(feature.clone());
            }
            if feature.subfeatures.is_empty() {
                feature.clone()
            } else {
                let mut rebuilt = feature.clone();
                rebuilt.subfeatures = update_inner(&feature.subfeatures, id, patch, done);
                rebuilt
            }
        })
        .collect()
}

/// Remove the feature matching `id` from the forest, wherever it sits.
///
/// Removal cascades: the node's entire subtree goes with it, since the
/// subtree is embedded in the node. Survivors keep their relative order.
pub fn delete(forest: &[Feature], id: &str) -> Vec<Feature> {
    forest
        .iter()
        .filter(|feature| feature.id != id)
        .map(|feature| {
            let mut kept = feature.clone();
            kept.subfeatures = delete(&feature.subfeatures, id);
            kept
        })
        .collect()
}

/// Count every node in the forest and all descendants into per-state buckets.
pub fn aggregate(forest: &[Feature]) -> TreeStats {
    let mut stats = TreeStats::default();
    accumulate(forest, &mut stats);
    stats
}

fn accumulate(forest: &[Feature], stats: &mut TreeStats) {
    for feature in forest {
        stats.total += 1;
        match feature.state {
            LifecycleState::Backlog => stats.backlog += 1,
            LifecycleState::Creating => stats.creating += 1,
            LifecycleState::FixPolish => stats.polishing += 1,
            LifecycleState::Expanding => stats.expanding += 1,
            LifecycleState::Stable => stats.stable += 1,
        }
        accumulate(&feature.subfeatures, stats);
    }
}

/// Move the element at `from` to position `to`, preserving the relative
/// order of everything else (classic array-move).
///
/// Only meaningful for a single sibling list; the store applies it to the
/// top-level list. Out-of-range indices return the input unchanged.
pub fn reorder(forest: &[Feature], from: usize, to: usize) -> Vec<Feature> {
    if from >= forest.len() || to >= forest.len() {
        return forest.to_vec();
    }
    let mut reordered = forest.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    reordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, state: LifecycleState) -> Feature {
        Feature {
            id: id.to_string(),
            name: format!("Feature {}", id),
            state,
            notes: String::new(),
            subfeatures: Vec::new(),
            is_expanded: false,
            context_files: Vec::new(),
        }
    }

    fn node(id: &str, state: LifecycleState, children: Vec<Feature>) -> Feature {
        Feature {
            subfeatures: children,
            ..leaf(id, state)
        }
    }

    /// Forest used by most tests:
    /// a (CREATING)
    ///   a1 (STABLE)
    ///   a2 (BACKLOG)
    ///     a2x (STABLE)
    /// b (STABLE)
    fn sample_forest() -> Vec<Feature> {
        vec![
            node(
                "a",
                LifecycleState::Creating,
                vec![
                    leaf("a1", LifecycleState::Stable),
                    node(
                        "a2",
                        LifecycleState::Backlog,
                        vec![leaf("a2x", LifecycleState::Stable)],
                    ),
                ],
            ),
            leaf("b", LifecycleState::Stable),
        ]
    }

    #[test]
    fn test_find_top_level() {
        let forest = sample_forest();
        assert_eq!(find(&forest, "b").unwrap().id, "b");
    }

    #[test]
    fn test_find_nested() {
        let forest = sample_forest();
        let found = find(&forest, "a2x").unwrap();
        assert_eq!(found.id, "a2x");
        assert_eq!(found.state, LifecycleState::Stable);
    }

    #[test]
    fn test_find_absent_id() {
        let forest = sample_forest();
        assert!(find(&forest, "nope").is_none());
    }

    #[test]
    fn test_find_first_preorder_match_on_duplicates() {
        let forest = vec![
            node("dup", LifecycleState::Creating, vec![]),
            node("x", LifecycleState::Stable, vec![leaf("dup", LifecycleState::Backlog)]),
        ];
        assert_eq!(find(&forest, "dup").unwrap().state, LifecycleState::Creating);
    }

    #[test]
    fn test_update_nested_node() {
        let forest = sample_forest();
        let updated = update(&forest, "a2", |mut f| {
            f.state = LifecycleState::Stable;
            f
        });
        assert_eq!(find(&updated, "a2").unwrap().state, LifecycleState::Stable);
        // Untouched nodes survive intact, input is unchanged.
        assert_eq!(find(&updated, "a2x").unwrap().state, LifecycleState::Stable);
        assert_eq!(find(&forest, "a2").unwrap().state, LifecycleState::Backlog);
    }

    #[test]
    fn test_update_absent_id_is_noop() {
        let forest = sample_forest();
        let updated = update(&forest, "nope", |mut f| {
            f.name = "changed".to_string();
            f
        });
        assert_eq!(updated, forest);
    }

    #[test]
    fn test_update_patches_at_most_one_node() {
        let forest = vec![
            leaf("dup", LifecycleState::Creating),
            leaf("dup", LifecycleState::Creating),
        ];
        let updated = update(&forest, "dup", |mut f| {
            f.state = LifecycleState::Stable;
            f
        });
        assert_eq!(updated[0].state, LifecycleState::Stable);
        assert_eq!(updated[1].state, LifecycleState::Creating);
    }

    #[test]
    fn test_delete_cascades_to_subtree() {
        let forest = sample_forest();
        assert_eq!(aggregate(&forest).total, 5);

        let remaining = delete(&forest, "a2");
        assert!(find(&remaining, "a2").is_none());
        assert!(find(&remaining, "a2x").is_none());
        // 5 nodes minus a2 and its one descendant.
        assert_eq!(aggregate(&remaining).total, 3);
        assert!(find(&remaining, "a1").is_some());
        assert!(find(&remaining, "b").is_some());
    }

    #[test]
    fn test_delete_absent_id_is_noop() {
        let forest = sample_forest();
        assert_eq!(delete(&forest, "nope"), forest);
    }

    #[test]
    fn test_aggregate_counts_all_depths() {
        let stats = aggregate(&sample_forest());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.creating, 1);
        assert_eq!(stats.backlog, 1);
        assert_eq!(stats.stable, 3);
        assert_eq!(stats.polishing, 0);
        assert_eq!(stats.expanding, 0);
        assert_eq!(
            stats.backlog + stats.creating + stats.polishing + stats.expanding + stats.stable,
            stats.total
        );
    }

    #[test]
    fn test_aggregate_empty_forest() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.percent_complete(), 0);
    }

    #[test]
    fn test_percent_complete_half_done() {
        let forest = vec![
            leaf("1", LifecycleState::Creating),
            leaf("2", LifecycleState::Stable),
        ];
        let stats = aggregate(&forest);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.creating, 1);
        assert_eq!(stats.stable, 1);
        assert_eq!(stats.percent_complete(), 50);
    }

    #[test]
    fn test_percent_complete_rounds() {
        let forest = vec![
            leaf("1", LifecycleState::Stable),
            leaf("2", LifecycleState::Stable),
            leaf("3", LifecycleState::Creating),
        ];
        // 66.67 rounds to 67.
        assert_eq!(aggregate(&forest).percent_complete(), 67);
    }

    #[test]
    fn test_reorder_forward() {
        let forest = vec![
            leaf("A", LifecycleState::Creating),
            leaf("B", LifecycleState::Creating),
            leaf("C", LifecycleState::Creating),
            leaf("D", LifecycleState::Creating),
        ];
        let moved = reorder(&forest, 0, 2);
        let ids: Vec<&str> = moved.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn test_reorder_last_to_first_rotates() {
        let forest = vec![
            leaf("A", LifecycleState::Creating),
            leaf("B", LifecycleState::Creating),
            leaf("C", LifecycleState::Creating),
        ];
        let moved = reorder(&forest, 2, 0);
        let ids: Vec<&str> = moved.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let forest = vec![leaf("A", LifecycleState::Creating)];
        assert_eq!(reorder(&forest, 0, 5), forest);
        assert_eq!(reorder(&forest, 5, 0), forest);
    }
}
