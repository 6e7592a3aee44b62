#![forbid(unsafe_code)]

//! The tree event buffer: accumulate change events during one mutation
//! cycle, then drain them as the shortest semantically equivalent sequence.
//!
//! Mutation logic appends one [`EventInput`] per discrete change, in the
//! order the changes occurred. Placeholder references are resolved and a
//! defensive, order-stable copy of the node list is stored immediately, so
//! the buffered sequence is self-contained. On flush the dispatcher calls
//! [`consume_and_coalesce`](TreeEventBuffer::consume_and_coalesce), which
//! prunes obsolete events, removes identical repeats, merges same-kind
//! runs, and leaves the buffer empty for the next cycle.
//!
//! # Thread Safety
//!
//! `TreeEventBuffer` is not thread-safe. The owning context must ensure
//! `add` calls and the subsequent `consume_and_coalesce` are not
//! interleaved with another thread's access; the buffer itself never
//! locks, blocks, or suspends.
//!
//! # Performance
//!
//! `add` is O(nodes in the event). `consume_and_coalesce` is near-linear in
//! the number of buffered events plus total node references (plus the
//! subtree sizes touched by deletes and recursive expansion events): every
//! pass uses hashed lookups — the merge pass keeps the open merger per
//! (run, parent) in a map instead of rescanning — so cycles with tens of
//! thousands of buffered events stay on the hot path.

use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::hash_map::Entry;
use std::mem;

use crate::error::AddEventError;
use crate::event::{EventInput, TreeEvent, TreeEventKind};
use crate::merger::EventMerger;
use crate::node::{NodeId, TreeTopology, collect_subtree, resolve_id};
use crate::policy::MergeRule;
use crate::pruner;

/// Buffers tree change events for one flush cycle and coalesces them on
/// demand.
#[derive(Debug, Default)]
pub struct TreeEventBuffer {
    events: Vec<TreeEvent>,
    next_seq: u64,
}

impl TreeEventBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discard all buffered events without coalescing them.
    pub fn clear(&mut self) {
        self.events.clear();
        self.next_seq = 0;
    }

    /// Append one change event.
    ///
    /// Placeholder references are resolved here, once, so later stages only
    /// ever see concrete identities. The stored copy is deduplicated with
    /// first-occurrence order preserved and stamped with the next arrival
    /// index. When no common parent is supplied, one is derived if every
    /// affected node reports the same parent.
    ///
    /// # Errors
    ///
    /// [`AddEventError::UnresolvedReference`] if a placeholder has no
    /// resolved target yet; [`AddEventError::MissingCommonParent`] if the
    /// kind requires a common parent and none was supplied or derivable.
    /// The buffer is unchanged on error.
    pub fn add<T: TreeTopology>(&mut self, tree: &T, input: EventInput) -> Result<(), AddEventError> {
        let EventInput {
            kind,
            common_parent,
            nodes,
        } = input;

        let mut seen = HashSet::with_capacity(nodes.len());
        let mut resolved = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let id = node.resolve()?;
            if seen.insert(id) {
                resolved.push(id);
            }
        }

        let parent = match common_parent {
            Some(p) => Some(p.resolve()?),
            None => derive_common_parent(tree, &resolved),
        };
        if parent.is_none() && kind.policy().requires_common_parent {
            return Err(AddEventError::MissingCommonParent { kind });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(TreeEvent {
            kind,
            common_parent: parent,
            nodes: resolved,
            seq,
        });
        Ok(())
    }

    /// Drain the buffer and return the coalesced, order-preserving event
    /// sequence.
    ///
    /// Obsolete events are pruned first (deletions cancelling inserts and
    /// emptying earlier references, selection override, recursive
    /// expansion supersession, insert coverage), then identical repeats
    /// within same-kind runs are removed, then same-kind runs are merged
    /// per the classification table. The buffer is empty afterwards and
    /// ready for the next cycle.
    pub fn consume_and_coalesce<T: TreeTopology>(&mut self, tree: &T) -> Vec<TreeEvent> {
        let drained = mem::take(&mut self.events);
        self.next_seq = 0;
        #[cfg(feature = "tracing")]
        let buffered = drained.len();

        let mut slots: Vec<Option<TreeEvent>> = drained
            .into_iter()
            .map(|ev| if ev.nodes.is_empty() { None } else { Some(ev) })
            .collect();
        pruner::prune_obsolete(tree, &mut slots);

        let mut events: Vec<TreeEvent> = slots.into_iter().flatten().collect();
        Self::remove_identical(&mut events);
        Self::coalesce_same_type(&mut events);

        #[cfg(feature = "tracing")]
        tracing::trace!(buffered, coalesced = events.len(), "consumed event buffer");
        events
    }

    /// Collect `roots` and all of their descendants, substituting resolved
    /// nodes for placeholders, in first-visit order.
    ///
    /// This is the closure the recursive expand/collapse and deletion rules
    /// operate on; it is exposed for collaborators and tests.
    #[must_use]
    pub fn collect_all_nodes_rec<T: TreeTopology>(&self, tree: &T, roots: &[NodeId]) -> Vec<NodeId> {
        collect_subtree(tree, roots)
    }

    /// Drop events that repeat an identical earlier event (same kind,
    /// parent and node list) within a maximal same-kind run, keeping the
    /// oldest. Command kinds are exempt per the classification table.
    fn remove_identical(events: &mut Vec<TreeEvent>) {
        let mut run_kind: Option<TreeEventKind> = None;
        let mut seen: HashSet<(Option<NodeId>, Vec<NodeId>)> = HashSet::new();
        events.retain(|ev| {
            if run_kind != Some(ev.kind) {
                run_kind = Some(ev.kind);
                seen.clear();
            }
            if !ev.kind.policy().dedup_identical {
                return true;
            }
            seen.insert((ev.common_parent, ev.nodes.clone()))
        });
    }

    /// Merge maximal runs of consecutive same-kind events per the
    /// classification table.
    pub(crate) fn coalesce_same_type(events: &mut Vec<TreeEvent>) {
        let n = events.len();
        let mut slots: Vec<Option<TreeEvent>> =
            mem::take(events).into_iter().map(Some).collect();
        let mut i = 0;
        while i < n {
            let Some(kind) = slots[i].as_ref().map(TreeEvent::kind) else {
                i += 1;
                continue;
            };
            let mut j = i + 1;
            while j < n && slots[j].as_ref().map(TreeEvent::kind) == Some(kind) {
                j += 1;
            }
            if j - i > 1 {
                match kind.policy().merge {
                    MergeRule::None => {}
                    MergeRule::AdjacentRun => merge_run(&mut slots[i..j]),
                    MergeRule::ByCommonParent => merge_run_by_parent(&mut slots[i..j]),
                }
            }
            i = j;
        }
        events.extend(slots.into_iter().flatten());
    }
}

/// Parent shared by every node in `nodes`, if there is exactly one.
fn derive_common_parent<T: TreeTopology>(tree: &T, nodes: &[NodeId]) -> Option<NodeId> {
    let first = *nodes.first()?;
    let parent = resolve_id(tree, tree.parent_of(first)?);
    for &node in &nodes[1..] {
        if tree.parent_of(node).map(|p| resolve_id(tree, p)) != Some(parent) {
            return None;
        }
    }
    Some(parent)
}

/// Merge a whole same-kind run into its last event.
fn merge_run(run: &mut [Option<TreeEvent>]) {
    let last = run.len() - 1;
    let Some(seed) = run[last].take() else { return };
    let mut merger = EventMerger::new(seed);
    for slot in run[..last].iter_mut().rev() {
        if let Some(ev) = slot.take()
            && merger.merge(&ev).is_err()
        {
            unreachable!("event merger sealed before its run completed");
        }
    }
    run[last] = Some(merger.into_event());
}

/// Merge a same-kind run group-wise by common parent. Each group's seed is
/// its last event, found first when walking right-to-left; groups of other
/// parents interleaved in the run are untouched by each other.
fn merge_run_by_parent(run: &mut [Option<TreeEvent>]) {
    let mut open: HashMap<Option<NodeId>, (usize, EventMerger)> = HashMap::new();
    for k in (0..run.len()).rev() {
        let Some(ev) = run[k].take() else { continue };
        match open.entry(ev.common_parent) {
            Entry::Occupied(mut o) => {
                if o.get_mut().1.merge(&ev).is_err() {
                    unreachable!("event merger sealed before its run completed");
                }
            }
            Entry::Vacant(v) => {
                v.insert((k, EventMerger::new(ev)));
            }
        }
    }
    for (k, merger) in open.into_values() {
        run[k] = Some(merger.into_event());
    }
}
