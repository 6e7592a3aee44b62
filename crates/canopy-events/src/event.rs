#![forbid(unsafe_code)]

//! Tree change events: the closed kind enumeration, the inbound event
//! description, and the buffered event record.
//!
//! Mutation logic describes each change as an [`EventInput`] holding
//! [`NodeRef`]s, which may still be placeholders. The buffer resolves the
//! references and stores a [`TreeEvent`]: kind, optional common parent,
//! the deduplicated affected-node list, and the arrival sequence index.
//! Buffered events only ever carry concrete identities.

use std::collections::HashSet;
use std::fmt;

use crate::node::{NodeId, NodeRef};

/// The closed set of change event kinds emitted by the tree collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeEventKind {
    /// Nodes were inserted under a parent.
    Inserted,
    /// Nodes were deleted.
    Deleted,
    /// Every child of the common parent was deleted.
    AllChildrenDeleted,
    /// Node content was updated.
    Updated,
    /// A single node's presentation changed.
    Changed,
    /// The selection changed to the affected nodes.
    Selected,
    /// A node was expanded.
    Expanded,
    /// A node and its whole subtree were expanded.
    ExpandedRecursive,
    /// A node was collapsed.
    Collapsed,
    /// A node and its whole subtree were collapsed.
    CollapsedRecursive,
    /// Check state of children of the common parent changed.
    Checked,
    /// The order of a parent's children changed.
    ChildrenOrderChanged,
    /// A node was activated.
    Action,
    /// Nodes were offered for a drag operation.
    DragRequest,
}

impl TreeEventKind {
    /// Stable lowercase name, used in logs and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Deleted => "deleted",
            Self::AllChildrenDeleted => "all-children-deleted",
            Self::Updated => "updated",
            Self::Changed => "changed",
            Self::Selected => "selected",
            Self::Expanded => "expanded",
            Self::ExpandedRecursive => "expanded-recursive",
            Self::Collapsed => "collapsed",
            Self::CollapsedRecursive => "collapsed-recursive",
            Self::Checked => "checked",
            Self::ChildrenOrderChanged => "children-order-changed",
            Self::Action => "action",
            Self::DragRequest => "drag-request",
        }
    }

    /// Whether this kind removes nodes from the tree.
    #[must_use]
    pub const fn is_delete_family(self) -> bool {
        matches!(self, Self::Deleted | Self::AllChildrenDeleted)
    }

    /// Whether this kind toggles expansion state.
    #[must_use]
    pub const fn is_expansion(self) -> bool {
        matches!(
            self,
            Self::Expanded | Self::ExpandedRecursive | Self::Collapsed | Self::CollapsedRecursive
        )
    }

    /// Whether this kind applies to a whole subtree at once.
    #[must_use]
    pub const fn is_recursive_expansion(self) -> bool {
        matches!(self, Self::ExpandedRecursive | Self::CollapsedRecursive)
    }
}

impl fmt::Display for TreeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One change as described by mutation logic, before buffering.
///
/// Node references may still be placeholders; the buffer resolves them when
/// the input is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    /// What happened.
    pub kind: TreeEventKind,
    /// Parent the affected nodes belong to, for kinds whose payload is
    /// "these children of this parent changed". Derived from the nodes when
    /// absent.
    pub common_parent: Option<NodeRef>,
    /// The affected nodes, in the order the mutation touched them.
    pub nodes: Vec<NodeRef>,
}

impl EventInput {
    /// Describe a change without an explicit common parent.
    #[must_use]
    pub fn new(kind: TreeEventKind, nodes: Vec<NodeRef>) -> Self {
        Self {
            kind,
            common_parent: None,
            nodes,
        }
    }

    /// Describe a change to children of `parent`.
    #[must_use]
    pub fn with_parent(kind: TreeEventKind, parent: NodeRef, nodes: Vec<NodeRef>) -> Self {
        Self {
            kind,
            common_parent: Some(parent),
            nodes,
        }
    }
}

/// A buffered change event, fully resolved to concrete node identities.
///
/// Produced by [`TreeEventBuffer`](crate::buffer::TreeEventBuffer); also
/// constructible directly for dispatcher-side tests. The node list is
/// deduplicated with first-occurrence order preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEvent {
    pub(crate) kind: TreeEventKind,
    pub(crate) common_parent: Option<NodeId>,
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) seq: u64,
}

impl TreeEvent {
    /// Build an event from concrete identities.
    ///
    /// Duplicate nodes are removed, keeping the first occurrence. The
    /// sequence index starts at zero; the buffer stamps the real arrival
    /// index when it stores a copy.
    #[must_use]
    pub fn new(kind: TreeEventKind, common_parent: Option<NodeId>, nodes: Vec<NodeId>) -> Self {
        let mut seen = HashSet::with_capacity(nodes.len());
        let mut deduped = Vec::with_capacity(nodes.len());
        for id in nodes {
            if seen.insert(id) {
                deduped.push(id);
            }
        }
        Self {
            kind,
            common_parent,
            nodes: deduped,
            seq: 0,
        }
    }

    /// What happened.
    #[must_use]
    pub fn kind(&self) -> TreeEventKind {
        self.kind
    }

    /// The common parent, if the event has a single meaningful one.
    #[must_use]
    pub fn common_parent(&self) -> Option<NodeId> {
        self.common_parent
    }

    /// Affected nodes, deduplicated, in stable order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of affected nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `id` is among the affected nodes.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Arrival position of the event within its flush cycle. Coalesced
    /// events keep the index of their last contributor.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}
