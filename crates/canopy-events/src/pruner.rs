#![forbid(unsafe_code)]

//! Obsolescence pruning: removing or shrinking buffered events that a later
//! (or, for insert coverage, an earlier) event makes redundant.
//!
//! Two linear passes run over the drained buffer before any same-kind
//! merging:
//!
//! 1. **Insert coverage** (forward). An insert is serialized from the
//!    collection's current state, so it already carries everything that
//!    happened to the inserted subtree within the cycle. Later events whose
//!    nodes are covered by an earlier insert shrink accordingly, and a
//!    delete whose common parent sits inside an earlier-inserted subtree is
//!    dropped outright. Delete-family events cancel coverage for their
//!    recursive closure so that a re-insertion is reported again.
//!
//! 2. **Supersession** (reverse). A later selection discards earlier ones.
//!    A delete-family event removes its recursive node closure from all
//!    earlier non-delete events; a node removed this way from an earlier
//!    insert is also cancelled out of the nearest later delete, so an
//!    insert/delete pair inside one cycle annihilates. Delete-family events
//!    themselves always retain their full node set — pruning them too
//!    corrupts repeated delete/insert cycles, which is why this is an
//!    explicit invariant and not an optimization. A recursive
//!    expand/collapse discards earlier expansion-family events within its
//!    closure.
//!
//! Events whose node list becomes empty are dropped. Both passes use hashed
//! membership only; cost is linear in events plus node references plus the
//! touched subtree sizes.

use std::collections::{HashMap, HashSet};

use crate::event::{TreeEvent, TreeEventKind};
use crate::node::{NodeId, TreeTopology, collect_subtree};

/// Run both pruning passes. `None` slots are events that have been dropped.
pub(crate) fn prune_obsolete<T: TreeTopology>(tree: &T, events: &mut [Option<TreeEvent>]) {
    prune_covered(tree, events);
    prune_superseded(tree, events);
}

/// Forward pass: subsume events under earlier inserts of the same cycle.
fn prune_covered<T: TreeTopology>(tree: &T, events: &mut [Option<TreeEvent>]) {
    let mut covered: HashSet<NodeId> = HashSet::new();
    for slot in events.iter_mut() {
        let Some(mut ev) = slot.take() else { continue };

        if ev.kind.is_delete_family() {
            if ancestor_covered(tree, ev.common_parent, &covered) {
                // The earlier insert renders the subtree in its current,
                // post-delete state; the delete never reaches the remote.
                #[cfg(feature = "tracing")]
                tracing::debug!(kind = %ev.kind, seq = ev.seq, "delete subsumed by earlier insert");
                continue;
            }
            for id in collect_subtree(tree, &ev.nodes) {
                covered.remove(&id);
            }
            *slot = Some(ev);
            continue;
        }

        if ev.kind.policy().insert_coverage {
            ev.nodes.retain(|id| !covered.contains(id));
            if ev.nodes.is_empty() {
                continue;
            }
        }
        if ev.kind == TreeEventKind::Inserted {
            for id in collect_subtree(tree, &ev.nodes) {
                covered.insert(id);
            }
        }
        *slot = Some(ev);
    }
}

/// Whether `start` or any of its ancestors is in the covered set.
fn ancestor_covered<T: TreeTopology>(
    tree: &T,
    start: Option<NodeId>,
    covered: &HashSet<NodeId>,
) -> bool {
    let mut cur = start;
    while let Some(id) = cur {
        if covered.contains(&id) {
            return true;
        }
        cur = tree.parent_of(id);
    }
    false
}

/// Reverse pass: later events invalidate earlier ones.
fn prune_superseded<T: TreeTopology>(tree: &T, events: &mut [Option<TreeEvent>]) {
    let mut selection_seen = false;
    // Recursive closure of all later delete-family events.
    let mut deleted: HashSet<NodeId> = HashSet::new();
    // Top-level delete nodes -> indices of the deletes naming them, nearest
    // (smallest index) last. Feeds insert/delete cancellation.
    let mut delete_sources: HashMap<NodeId, Vec<usize>> = HashMap::new();
    // Recursive closure of all later recursive expand/collapse events.
    let mut expansion_closed: HashSet<NodeId> = HashSet::new();

    for i in (0..events.len()).rev() {
        let Some(mut ev) = events[i].take() else {
            continue;
        };

        if ev.kind.is_delete_family() {
            // Deletes keep their full node set; only register them.
            for id in collect_subtree(tree, &ev.nodes) {
                deleted.insert(id);
            }
            for &id in &ev.nodes {
                delete_sources.entry(id).or_default().push(i);
            }
            events[i] = Some(ev);
            continue;
        }

        if ev.kind.policy().override_previous {
            if selection_seen {
                continue;
            }
            selection_seen = true;
        }

        if ev.kind == TreeEventKind::Inserted {
            ev.nodes.retain(|id| {
                if !deleted.contains(id) {
                    return true;
                }
                // Inserted here, deleted later: cancel the node out of the
                // nearest later delete as well, as if never touched.
                if let Some(stack) = delete_sources.get_mut(id)
                    && let Some(di) = stack.pop()
                    && let Some(del) = events[di].as_mut()
                {
                    del.nodes.retain(|d| d != id);
                    if del.nodes.is_empty() {
                        events[di] = None;
                    }
                }
                false
            });
        } else {
            ev.nodes.retain(|id| !deleted.contains(id));
        }

        if ev.kind.is_expansion() {
            ev.nodes.retain(|id| !expansion_closed.contains(id));
        }

        if ev.nodes.is_empty() {
            continue;
        }

        if ev.kind.is_recursive_expansion() {
            for id in collect_subtree(tree, &ev.nodes) {
                expansion_closed.insert(id);
            }
        }

        events[i] = Some(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapTree {
        parents: HashMap<NodeId, NodeId>,
        children: HashMap<NodeId, Vec<NodeId>>,
    }

    impl MapTree {
        fn new(edges: &[(u64, u64)]) -> Self {
            let mut parents = HashMap::new();
            let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
            for &(parent, child) in edges {
                parents.insert(NodeId::new(child), NodeId::new(parent));
                children
                    .entry(NodeId::new(parent))
                    .or_default()
                    .push(NodeId::new(child));
            }
            Self { parents, children }
        }
    }

    impl TreeTopology for MapTree {
        fn parent_of(&self, id: NodeId) -> Option<NodeId> {
            self.parents.get(&id).copied()
        }

        fn children_of(&self, id: NodeId) -> Vec<NodeId> {
            self.children.get(&id).cloned().unwrap_or_default()
        }

        fn resolved_target(&self, _id: NodeId) -> Option<NodeId> {
            None
        }
    }

    fn id(raw: u64) -> NodeId {
        NodeId::new(raw)
    }

    fn ev(kind: TreeEventKind, parent: Option<u64>, nodes: &[u64]) -> Option<TreeEvent> {
        Some(TreeEvent::new(
            kind,
            parent.map(NodeId::new),
            nodes.iter().map(|&n| id(n)).collect(),
        ))
    }

    fn kinds(events: &[Option<TreeEvent>]) -> Vec<TreeEventKind> {
        events.iter().flatten().map(TreeEvent::kind).collect()
    }

    #[test]
    fn later_delete_empties_earlier_references() {
        let tree = MapTree::new(&[(1, 2), (1, 3), (2, 4)]);
        let mut events = vec![
            ev(TreeEventKind::Expanded, None, &[2]),
            ev(TreeEventKind::Updated, None, &[4]),
            ev(TreeEventKind::Deleted, Some(1), &[2, 3]),
        ];
        prune_obsolete(&tree, &mut events);
        assert_eq!(kinds(&events), vec![TreeEventKind::Deleted]);
        // The delete keeps its full node set.
        assert_eq!(events[2].as_ref().map(TreeEvent::node_count), Some(2));
    }

    #[test]
    fn insert_then_delete_annihilates_but_reinsert_survives() {
        let tree = MapTree::new(&[(1, 2)]);
        let mut events = vec![
            ev(TreeEventKind::Inserted, Some(1), &[2]),
            ev(TreeEventKind::Deleted, Some(1), &[2]),
            ev(TreeEventKind::Inserted, Some(1), &[2]),
        ];
        prune_obsolete(&tree, &mut events);
        assert_eq!(kinds(&events), vec![TreeEventKind::Inserted]);
    }

    #[test]
    fn earlier_deletes_are_not_pruned_by_later_ones() {
        let tree = MapTree::new(&[(1, 2)]);
        let mut events = vec![
            ev(TreeEventKind::Deleted, Some(1), &[2]),
            ev(TreeEventKind::Inserted, Some(1), &[2]),
            ev(TreeEventKind::Deleted, Some(1), &[2]),
            ev(TreeEventKind::Inserted, Some(1), &[2]),
        ];
        prune_obsolete(&tree, &mut events);
        assert_eq!(
            kinds(&events),
            vec![TreeEventKind::Deleted, TreeEventKind::Inserted]
        );
        assert_eq!(events[0].as_ref().map(TreeEvent::node_count), Some(1));
    }

    #[test]
    fn updates_of_covered_nodes_fold_into_the_insert() {
        let tree = MapTree::new(&[(1, 2), (2, 3)]);
        let mut events = vec![
            ev(TreeEventKind::Inserted, None, &[2]),
            // 3 sits inside the inserted subtree, 9 does not.
            ev(TreeEventKind::Updated, None, &[3, 9]),
        ];
        prune_obsolete(&tree, &mut events);
        assert_eq!(
            kinds(&events),
            vec![TreeEventKind::Inserted, TreeEventKind::Updated]
        );
        assert_eq!(events[1].as_ref().map(TreeEvent::nodes), Some(&[id(9)][..]));
    }

    #[test]
    fn delete_under_freshly_inserted_parent_is_subsumed() {
        let tree = MapTree::new(&[(1, 2), (2, 3)]);
        let mut events = vec![
            ev(TreeEventKind::Inserted, Some(1), &[2]),
            ev(TreeEventKind::AllChildrenDeleted, Some(2), &[3]),
        ];
        prune_obsolete(&tree, &mut events);
        assert_eq!(kinds(&events), vec![TreeEventKind::Inserted]);
    }

    #[test]
    fn recursive_collapse_discards_expansion_history_below_it() {
        let tree = MapTree::new(&[(1, 2), (1, 3), (2, 4)]);
        let mut events = vec![
            ev(TreeEventKind::CollapsedRecursive, None, &[1]),
            ev(TreeEventKind::Expanded, None, &[2]),
            ev(TreeEventKind::Collapsed, None, &[4]),
            // Updates under the ancestor still matter to the remote view.
            ev(TreeEventKind::Updated, None, &[3]),
            ev(TreeEventKind::CollapsedRecursive, None, &[1]),
        ];
        prune_obsolete(&tree, &mut events);
        assert_eq!(
            kinds(&events),
            vec![TreeEventKind::Updated, TreeEventKind::CollapsedRecursive]
        );
    }

    #[test]
    fn later_selection_overrides_earlier_ones() {
        let tree = MapTree::new(&[]);
        let mut events = vec![
            ev(TreeEventKind::Selected, None, &[1]),
            ev(TreeEventKind::ChildrenOrderChanged, None, &[4]),
            ev(TreeEventKind::Selected, None, &[2]),
        ];
        prune_obsolete(&tree, &mut events);
        assert_eq!(
            kinds(&events),
            vec![TreeEventKind::ChildrenOrderChanged, TreeEventKind::Selected]
        );
        assert_eq!(events[2].as_ref().map(TreeEvent::nodes), Some(&[id(2)][..]));
    }
}
