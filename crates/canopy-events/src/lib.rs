#![forbid(unsafe_code)]

//! Event buffering and coalescing for remote-view tree synchronization.
//!
//! A mutable tree collection emits one fine-grained change event per
//! mutation: nodes inserted, deleted, updated, selected, expanded, checked,
//! reordered. Forwarding every micro-event across the process boundary to a
//! remote view is wasteful and can be semantically wrong — a node inserted
//! and deleted within the same cycle must never reach the remote at all.
//! This crate accumulates the events of one mutation cycle and, on flush,
//! rewrites them into the shortest equivalent sequence.
//!
//! # Key Components
//!
//! - [`TreeEventBuffer`] - the public surface: append events, consume the
//!   coalesced sequence
//! - [`TreeEventKind`] / [`CoalescePolicy`] - the closed event enumeration
//!   and its per-kind classification table
//! - [`EventMerger`] - incremental merging of same-kind event runs
//! - [`NodeRef`] / [`TreeTopology`] - node identity, placeholder
//!   resolution, and the read-only query surface of the owning collection
//!
//! The collection itself, the dispatch transport, and the threading model
//! are collaborators outside this crate: the engine is a pure, synchronous,
//! in-memory component for single-writer single-consumer use.
//!
//! # Usage
//!
//! ```
//! use canopy_events::{
//!     EventInput, NodeId, NodeRef, TreeEventBuffer, TreeEventKind, TreeTopology,
//! };
//!
//! // A collection with no hierarchy, for brevity.
//! struct FlatTree;
//!
//! impl TreeTopology for FlatTree {
//!     fn parent_of(&self, _id: NodeId) -> Option<NodeId> {
//!         None
//!     }
//!     fn children_of(&self, _id: NodeId) -> Vec<NodeId> {
//!         Vec::new()
//!     }
//!     fn resolved_target(&self, _id: NodeId) -> Option<NodeId> {
//!         None
//!     }
//! }
//!
//! let mut buffer = TreeEventBuffer::new();
//! let a = NodeRef::from(NodeId::new(1));
//! let b = NodeRef::from(NodeId::new(2));
//!
//! buffer
//!     .add(&FlatTree, EventInput::new(TreeEventKind::Updated, vec![a]))
//!     .unwrap();
//! buffer
//!     .add(&FlatTree, EventInput::new(TreeEventKind::Updated, vec![b]))
//!     .unwrap();
//!
//! // Two adjacent updates coalesce into one.
//! let coalesced = buffer.consume_and_coalesce(&FlatTree);
//! assert_eq!(coalesced.len(), 1);
//! assert_eq!(coalesced[0].nodes(), &[NodeId::new(1), NodeId::new(2)]);
//! assert!(buffer.is_empty());
//! ```

pub mod buffer;
pub mod error;
pub mod event;
pub mod merger;
pub mod node;
pub mod policy;

mod pruner;

pub use buffer::TreeEventBuffer;
pub use error::{AddEventError, SealedMergerError};
pub use event::{EventInput, TreeEvent, TreeEventKind};
pub use merger::EventMerger;
pub use node::{NodeId, NodeRef, TreeTopology};
pub use policy::{CoalescePolicy, MergeRule};
