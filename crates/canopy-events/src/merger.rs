#![forbid(unsafe_code)]

//! Incremental merging of same-kind events.
//!
//! [`EventMerger`] is seeded with one event — the one that will survive —
//! and absorbs the affected nodes of further events into it. The buffer
//! drives it right-to-left over a run, so the seed is the *last* event of
//! its group and earlier contributions are prepended; the finished node
//! list therefore reads in original arrival order.
//!
//! A merger is sealed by [`complete`](EventMerger::complete). Sealing is
//! idempotent; merging into a sealed merger is a coalescing-logic bug and
//! fails with [`SealedMergerError`].

use std::collections::HashSet;

use crate::error::SealedMergerError;
use crate::event::TreeEvent;
use crate::node::NodeId;

/// Accumulates a group of same-kind events into a single surviving event.
#[derive(Debug)]
pub struct EventMerger {
    target: TreeEvent,
    /// Nodes already accounted for, across the target and all chunks.
    known: HashSet<NodeId>,
    /// Newly contributed nodes per merge call, in merge order.
    chunks: Vec<Vec<NodeId>>,
    parent_differs: bool,
    completed: bool,
}

impl EventMerger {
    /// Seed a merger with the event that will carry the merged result.
    #[must_use]
    pub fn new(target: TreeEvent) -> Self {
        let known = target.nodes.iter().copied().collect();
        Self {
            target,
            known,
            chunks: Vec::new(),
            parent_differs: false,
            completed: false,
        }
    }

    /// Absorb `event` into the target.
    ///
    /// Nodes already present are skipped; the remaining ones end up ahead
    /// of all previously accumulated nodes once the merger completes. An
    /// event with no nodes is accepted as a no-op. Merging events whose
    /// common parents differ clears the merged parent on completion, since
    /// the result no longer has a single meaningful one.
    pub fn merge(&mut self, event: &TreeEvent) -> Result<(), SealedMergerError> {
        if self.completed {
            return Err(SealedMergerError);
        }
        if event.nodes.is_empty() {
            return Ok(());
        }
        if event.common_parent != self.target.common_parent {
            self.parent_differs = true;
        }
        let mut chunk = Vec::new();
        for &id in &event.nodes {
            if self.known.insert(id) {
                chunk.push(id);
            }
        }
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
        Ok(())
    }

    /// Seal the merger and finalize the target event in place.
    ///
    /// Later contributions come first, the seed event's own nodes last.
    /// Calling this more than once has no further effect.
    pub fn complete(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        if self.parent_differs {
            self.target.common_parent = None;
        }
        if self.chunks.is_empty() {
            return;
        }
        let added: usize = self.chunks.iter().map(Vec::len).sum();
        let mut nodes = Vec::with_capacity(added + self.target.nodes.len());
        for chunk in self.chunks.drain(..).rev() {
            nodes.extend(chunk);
        }
        nodes.append(&mut self.target.nodes);
        self.target.nodes = nodes;
    }

    /// Seal the merger (if not already sealed) and return the merged event.
    #[must_use]
    pub fn into_event(mut self) -> TreeEvent {
        self.complete();
        self.target
    }

    /// The event being merged into, as accumulated so far.
    #[must_use]
    pub fn target(&self) -> &TreeEvent {
        &self.target
    }
}
