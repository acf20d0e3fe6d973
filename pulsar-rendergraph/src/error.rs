use derive_more::{Display, Error};
use crate::transition::{TransitionEntryId, TransitionId};

pub type Result<T, E = RenderGraphError> = std::result::Result<T, E>;

/// Construction and validation failures of a render graph.
///
/// All of them describe a mistake in the graph description and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RenderGraphError {
    #[display("render operation `{operation}` already exists")]
    DuplicateOperation { operation: String },

    #[display("render operation `{operation}` already has an entry named `{entry}`")]
    DuplicateEntry { operation: String, entry: String },

    #[display("render operation `{operation}` already has a depth {role} entry `{existing}`")]
    DuplicateDepthEntry {
        operation: String,
        role: &'static str,
        existing: String,
    },

    #[display("there is no render operation named `{operation}`")]
    UnknownOperation { operation: String },

    #[display("render operation `{operation}` has no entry named `{entry}`")]
    UnknownEntry { operation: String, entry: String },

    #[display("there is no resource transition with rteid {rteid}")]
    UnknownTransition { rteid: TransitionEntryId },

    #[display("entry `{operation}.{entry}` cannot be used as {expected}")]
    InvalidEntryRole {
        operation: String,
        entry: String,
        expected: &'static str,
    },

    #[display("entries `{first_operation}.{first_entry}` and `{second_operation}.{second_entry}` do not describe the same resource")]
    ResourceConflict {
        first_operation: String,
        first_entry: String,
        second_operation: String,
        second_entry: String,
    },

    #[display("`{first_operation}.{first_entry}` and `{second_operation}.{second_entry}` write overlapping ranges of tid {tid}")]
    OverlappingRanges {
        tid: TransitionId,
        first_operation: String,
        first_entry: String,
        second_operation: String,
        second_entry: String,
    },

    #[display("entry `{operation}.{entry}` is already bound to tid {tid}")]
    EntryAlreadyBound {
        operation: String,
        entry: String,
        tid: TransitionId,
    },

    #[display("tid {tid} is bound to external memory object {existing:?}, cannot bind it to `{requested}`")]
    ExternalNameConflict {
        tid: TransitionId,
        existing: Option<String>,
        requested: String,
    },

    #[display("resolve entry `{operation}.{entry}` names missing source entry `{source_entry}`")]
    DanglingResolve {
        operation: String,
        entry: String,
        source_entry: String,
    },

    #[display("render graph `{graph}` is not complete, run add_missing_resource_transitions first")]
    Incomplete { graph: String },

    #[display("render graph `{graph}` is frozen")]
    Frozen { graph: String },

    #[display("render graph `{graph}` has a dependency cycle through {operations:?}")]
    CyclicGraph { graph: String, operations: Vec<String> },
}
