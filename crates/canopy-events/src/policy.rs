#![forbid(unsafe_code)]

//! The event classification table.
//!
//! Every [`TreeEventKind`] maps to a fixed [`CoalescePolicy`] describing how
//! the buffer may combine or discard events of that kind. The table is the
//! single place where per-kind coalescing behavior is decided; the buffer
//! and pruner only ever consult it, never the kind directly.
//!
//! | Kind | Merge | Parent required | Overrides previous | Insert coverage | Identical dedup |
//! |------|-------|-----------------|--------------------|-----------------|-----------------|
//! | inserted | by common parent | no | no | yes | yes |
//! | deleted | by common parent | no | no | no | yes |
//! | all-children-deleted | no | yes | no | no | yes |
//! | updated | adjacent run | no | no | yes | yes |
//! | changed | no | no | no | yes | yes |
//! | selected | no | no | yes | no | yes |
//! | expanded / collapsed | no | no | no | no | yes |
//! | expanded/collapsed-recursive | no | no | no | no | yes |
//! | checked | by common parent | yes | no | yes | yes |
//! | children-order-changed | no | no | no | no | yes |
//! | action / drag-request | no | no | no | no | no |
//!
//! Deletion pruning and recursive-expansion supersession are keyed off the
//! kind families (`is_delete_family`, `is_recursive_expansion`) rather than
//! policy flags, since they are structural rules, not per-kind options.

use crate::event::TreeEventKind;

/// How events of one kind combine with others of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    /// Never merged with any other event, including one of the same kind.
    None,
    /// A maximal run of consecutive same-kind events merges into one event.
    AdjacentRun,
    /// Within a maximal same-kind run, events sharing a common-parent value
    /// merge into one event at the position of the group's last
    /// contributor. Events of other parents in the run do not break a
    /// group; an event of a different kind ends the run.
    ByCommonParent,
}

/// The coalescing rules for one event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescePolicy {
    /// Same-kind merge behavior.
    pub merge: MergeRule,
    /// Appending without a supplied or derivable common parent is an error.
    pub requires_common_parent: bool,
    /// A later event of this kind discards every earlier buffered event of
    /// the kind outright.
    pub override_previous: bool,
    /// Nodes already transmitted by an earlier buffered insert (anywhere in
    /// the inserted subtree) are dropped from events of this kind, since
    /// the insert is serialized from current state.
    pub insert_coverage: bool,
    /// Within a same-kind run, an event identical to an earlier one is
    /// dropped, keeping the oldest.
    pub dedup_identical: bool,
}

impl TreeEventKind {
    /// The classification-table entry for this kind.
    #[must_use]
    pub const fn policy(self) -> CoalescePolicy {
        match self {
            Self::Inserted => CoalescePolicy {
                merge: MergeRule::ByCommonParent,
                requires_common_parent: false,
                override_previous: false,
                insert_coverage: true,
                dedup_identical: true,
            },
            Self::Deleted => CoalescePolicy {
                merge: MergeRule::ByCommonParent,
                requires_common_parent: false,
                override_previous: false,
                insert_coverage: false,
                dedup_identical: true,
            },
            Self::AllChildrenDeleted => CoalescePolicy {
                merge: MergeRule::None,
                requires_common_parent: true,
                override_previous: false,
                insert_coverage: false,
                dedup_identical: true,
            },
            Self::Updated => CoalescePolicy {
                merge: MergeRule::AdjacentRun,
                requires_common_parent: false,
                override_previous: false,
                insert_coverage: true,
                dedup_identical: true,
            },
            Self::Changed => CoalescePolicy {
                merge: MergeRule::None,
                requires_common_parent: false,
                override_previous: false,
                insert_coverage: true,
                dedup_identical: true,
            },
            Self::Selected => CoalescePolicy {
                merge: MergeRule::None,
                requires_common_parent: false,
                override_previous: true,
                insert_coverage: false,
                dedup_identical: true,
            },
            Self::Checked => CoalescePolicy {
                merge: MergeRule::ByCommonParent,
                requires_common_parent: true,
                override_previous: false,
                insert_coverage: true,
                dedup_identical: true,
            },
            Self::Expanded
            | Self::ExpandedRecursive
            | Self::Collapsed
            | Self::CollapsedRecursive
            | Self::ChildrenOrderChanged => CoalescePolicy {
                merge: MergeRule::None,
                requires_common_parent: false,
                override_previous: false,
                insert_coverage: false,
                dedup_identical: true,
            },
            Self::Action | Self::DragRequest => CoalescePolicy {
                merge: MergeRule::None,
                requires_common_parent: false,
                override_previous: false,
                insert_coverage: false,
                dedup_identical: false,
            },
        }
    }
}
