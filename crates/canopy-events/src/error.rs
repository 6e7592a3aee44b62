#![forbid(unsafe_code)]

//! Error types for event buffering and coalescing.

use std::fmt;

use crate::event::TreeEventKind;
use crate::node::NodeId;

/// Errors raised when appending an event to the buffer.
///
/// Both kinds are synchronous and local to the failing `add` call; the
/// buffer contents are unchanged when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddEventError {
    /// The event kind requires a common parent node, but none was supplied
    /// and none could be derived from the affected nodes.
    MissingCommonParent {
        /// Kind of the rejected event.
        kind: TreeEventKind,
    },
    /// A placeholder node has no resolved target at the time it must be
    /// recorded. Proceeding would silently corrupt identity, so the caller
    /// decides whether to abort the cycle.
    UnresolvedReference {
        /// Identity of the unresolved placeholder.
        id: NodeId,
    },
}

impl fmt::Display for AddEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommonParent { kind } => {
                write!(f, "{kind} event requires a common parent node")
            }
            Self::UnresolvedReference { id } => {
                write!(f, "placeholder node {id} has no resolved target")
            }
        }
    }
}

impl std::error::Error for AddEventError {}

/// Returned when [`EventMerger::merge`](crate::merger::EventMerger::merge)
/// is called on a merger that was already completed.
///
/// The buffer never constructs this state itself; observing this error
/// indicates a coalescing-logic bug, not bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealedMergerError;

impl fmt::Display for SealedMergerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("merge called on a completed event merger")
    }
}

impl std::error::Error for SealedMergerError {}
