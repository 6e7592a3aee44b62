#![forbid(unsafe_code)]

//! Node identity, placeholder resolution, and the tree query surface.
//!
//! The engine never owns nodes. It records [`NodeId`] values handed to it by
//! the owning collection and reads parent/child structure back through the
//! [`TreeTopology`] trait when it needs to reason about subtrees. Nodes that
//! are materialized lazily enter the system as [`NodeRef::Placeholder`]
//! references; the buffer substitutes the concrete identity at append time,
//! so no later stage ever sees a placeholder.

use std::collections::HashSet;
use std::fmt;

use crate::error::AddEventError;

/// Stable identity of a tree node, allocated by the owning collection.
///
/// The engine only compares, hashes and copies ids; it attaches no meaning
/// to the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a raw id value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A reference to a node as seen by mutation logic.
///
/// Placeholders stand in for nodes that have not been materialized yet. Once
/// the collection materializes one, the placeholder carries the concrete
/// identity in `resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    /// A fully materialized node.
    Concrete(NodeId),
    /// A lightweight stand-in, optionally resolved to a concrete node.
    Placeholder {
        /// Identity of the placeholder itself.
        id: NodeId,
        /// Concrete node this placeholder now stands for, if materialized.
        resolved: Option<NodeId>,
    },
}

impl NodeRef {
    /// The identity to record for this reference.
    ///
    /// Concrete references resolve to their own id, placeholders to their
    /// materialized target. A placeholder without a target cannot be
    /// recorded without corrupting identity, so resolution fails.
    pub fn resolve(&self) -> Result<NodeId, AddEventError> {
        match *self {
            Self::Concrete(id) => Ok(id),
            Self::Placeholder {
                resolved: Some(target),
                ..
            } => Ok(target),
            Self::Placeholder { id, resolved: None } => {
                Err(AddEventError::UnresolvedReference { id })
            }
        }
    }

    /// The raw identity of the reference itself (placeholder id for
    /// unresolved placeholders).
    #[must_use]
    pub const fn id(&self) -> NodeId {
        match *self {
            Self::Concrete(id) | Self::Placeholder { id, .. } => id,
        }
    }
}

impl From<NodeId> for NodeRef {
    fn from(id: NodeId) -> Self {
        Self::Concrete(id)
    }
}

/// Read-only query surface of the hierarchical collection.
///
/// Implementations must describe an acyclic hierarchy. Results are treated
/// as snapshots of the collection's last-known state; the engine never
/// mutates the collection through this trait.
pub trait TreeTopology {
    /// Parent of `id`, or `None` for roots (and unknown ids).
    fn parent_of(&self, id: NodeId) -> Option<NodeId>;

    /// Ordered children of `id`. Unknown ids yield no children.
    fn children_of(&self, id: NodeId) -> Vec<NodeId>;

    /// Concrete node behind `id` if `id` names a placeholder that has been
    /// materialized, `None` otherwise.
    fn resolved_target(&self, id: NodeId) -> Option<NodeId>;
}

/// Substitute the materialized node for a placeholder id.
pub(crate) fn resolve_id<T: TreeTopology>(tree: &T, id: NodeId) -> NodeId {
    tree.resolved_target(id).unwrap_or(id)
}

/// Collect `roots` and all of their descendants in first-visit (preorder)
/// order, substituting materialized nodes for placeholder ids along the way.
pub(crate) fn collect_subtree<T: TreeTopology>(tree: &T, roots: &[NodeId]) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut stack: Vec<NodeId> = roots.iter().rev().map(|&r| resolve_id(tree, r)).collect();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        let children = tree.children_of(id);
        for &child in children.iter().rev() {
            stack.push(resolve_id(tree, child));
        }
    }
    out
}
