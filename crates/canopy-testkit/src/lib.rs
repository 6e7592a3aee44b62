#![forbid(unsafe_code)]

//! Test support for the canopy event engine: a label-addressed mock tree
//! collection and event-construction helpers.
//!
//! Tests describe nodes by short labels ("A", "B", ...) instead of raw ids.
//! [`MockTree`] implements [`TreeTopology`] and hands out [`NodeRef`]s, so
//! integration tests and benches can drive the real
//! [`TreeEventBuffer`](canopy_events::TreeEventBuffer) API without a real
//! collection behind it.
//!
//! Helpers panic on unknown labels; this crate is test-only by design.

use std::collections::HashMap;

use canopy_events::{EventInput, NodeId, NodeRef, TreeEventKind, TreeTopology};

#[derive(Debug, Default)]
struct MockNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    resolved: Option<NodeId>,
    placeholder: bool,
}

/// An in-memory tree collection addressed by node labels.
#[derive(Debug, Default)]
pub struct MockTree {
    nodes: Vec<MockNode>,
    labels: HashMap<String, NodeId>,
}

impl MockTree {
    /// Create an empty mock collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard fixture used across the engine's tests:
    ///
    /// ```text
    /// A
    /// +-B
    /// | +-E
    /// |   +-F
    /// +-C
    /// | +-G
    /// +-D
    /// ```
    #[must_use]
    pub fn sample() -> Self {
        let mut tree = Self::new();
        tree.set_children("A", &["B", "C", "D"]);
        tree.set_children("B", &["E"]);
        tree.set_children("E", &["F"]);
        tree.set_children("C", &["G"]);
        tree
    }

    /// Get or create the concrete node with this label.
    pub fn node(&mut self, label: &str) -> NodeId {
        self.intern(label, false)
    }

    /// Get or create a placeholder node with this label.
    pub fn placeholder(&mut self, label: &str) -> NodeId {
        self.intern(label, true)
    }

    /// Mark the placeholder `label` as materialized into `target`.
    ///
    /// # Panics
    ///
    /// Panics if `label` is not a placeholder.
    pub fn resolve_to(&mut self, label: &str, target: &str) {
        let target_id = self.node(target);
        let ph = self.id(label);
        let node = &mut self.nodes[ph.raw() as usize];
        assert!(node.placeholder, "{label} is not a placeholder");
        node.resolved = Some(target_id);
    }

    /// Install `children` under `parent`, creating nodes as needed.
    ///
    /// Replaces the parent's child list; previous children keep their stale
    /// parent back-reference, matching a collection that detaches children
    /// without reparenting them.
    pub fn set_children(&mut self, parent: &str, children: &[&str]) {
        let parent_id = self.node(parent);
        let child_ids: Vec<NodeId> = children.iter().map(|c| self.node(c)).collect();
        for &child in &child_ids {
            self.nodes[child.raw() as usize].parent = Some(parent_id);
        }
        self.nodes[parent_id.raw() as usize].children = child_ids;
    }

    /// The id of an existing label.
    ///
    /// # Panics
    ///
    /// Panics if the label is unknown.
    #[must_use]
    pub fn id(&self, label: &str) -> NodeId {
        match self.labels.get(label) {
            Some(&id) => id,
            None => panic!("unknown node label {label:?}"),
        }
    }

    /// Ids of several existing labels.
    #[must_use]
    pub fn ids(&self, labels: &[&str]) -> Vec<NodeId> {
        labels.iter().map(|l| self.id(l)).collect()
    }

    /// A [`NodeRef`] for an existing label: concrete nodes yield
    /// [`NodeRef::Concrete`], placeholders carry their resolution state.
    #[must_use]
    pub fn node_ref(&self, label: &str) -> NodeRef {
        let id = self.id(label);
        let node = &self.nodes[id.raw() as usize];
        if node.placeholder {
            NodeRef::Placeholder {
                id,
                resolved: node.resolved,
            }
        } else {
            NodeRef::Concrete(id)
        }
    }

    /// [`NodeRef`]s for several existing labels.
    #[must_use]
    pub fn refs(&self, labels: &[&str]) -> Vec<NodeRef> {
        labels.iter().map(|l| self.node_ref(l)).collect()
    }

    /// An [`EventInput`] without an explicit common parent.
    #[must_use]
    pub fn input(&self, kind: TreeEventKind, labels: &[&str]) -> EventInput {
        EventInput::new(kind, self.refs(labels))
    }

    /// An [`EventInput`] with an explicit common parent.
    #[must_use]
    pub fn input_with_parent(
        &self,
        kind: TreeEventKind,
        parent: &str,
        labels: &[&str],
    ) -> EventInput {
        EventInput::with_parent(kind, self.node_ref(parent), self.refs(labels))
    }

    fn intern(&mut self, label: &str, placeholder: bool) -> NodeId {
        if let Some(&id) = self.labels.get(label) {
            return id;
        }
        let id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(MockNode {
            placeholder,
            ..MockNode::default()
        });
        self.labels.insert(label.to_owned(), id);
        id
    }
}

impl TreeTopology for MockTree {
    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.raw() as usize)?.parent
    }

    fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id.raw() as usize)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn resolved_target(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.raw() as usize)?.resolved
    }
}
