use std::fmt;
use crate::graph::RenderGraph;
use crate::node::{EntryId, OperationId, RenderOperation, RenderOperationEntry};

/// Groups every transition that refers to one physical resource.
pub type TransitionId = u32;

/// Identifies a single transition record, one per bound (operation, entry) pair.
pub type TransitionEntryId = u32;

/// Edge record binding one operation entry to a physical resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTransition {
    rteid: TransitionEntryId,
    tid: TransitionId,
    operation: OperationId,
    entry: EntryId,
    external_memory_object_name: Option<String>,
}

impl ResourceTransition {
    pub(crate) fn new(
        rteid: TransitionEntryId,
        tid: TransitionId,
        operation: OperationId,
        entry: EntryId,
        external_memory_object_name: Option<String>,
    ) -> Self {
        Self {
            rteid,
            tid,
            operation,
            entry,
            external_memory_object_name,
        }
    }

    #[inline]
    pub fn rteid(&self) -> TransitionEntryId {
        self.rteid
    }

    #[inline]
    pub fn tid(&self) -> TransitionId {
        self.tid
    }

    #[inline]
    pub fn operation_id(&self) -> OperationId {
        self.operation
    }

    #[inline]
    pub fn entry_id(&self) -> EntryId {
        self.entry
    }

    pub fn external_memory_object_name(&self) -> Option<&str> {
        self.external_memory_object_name.as_deref()
    }

    pub(crate) fn set_external_memory_object_name(&mut self, name: Option<String>) {
        self.external_memory_object_name = name;
    }
}

/// A transition together with the graph owning its operation and entry.
#[derive(Clone, Copy)]
pub struct TransitionRef<'g> {
    graph: &'g RenderGraph,
    transition: &'g ResourceTransition,
}

impl fmt::Debug for TransitionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRef")
            .field("rteid", &self.rteid())
            .field("tid", &self.tid())
            .field("operation", &self.operation_name())
            .field("entry", &self.entry_name())
            .field("external_memory_object_name", &self.external_memory_object_name())
            .finish()
    }
}

impl<'g> TransitionRef<'g> {
    pub(crate) fn new(graph: &'g RenderGraph, transition: &'g ResourceTransition) -> Self {
        Self { graph, transition }
    }

    #[inline]
    pub fn rteid(&self) -> TransitionEntryId {
        self.transition.rteid
    }

    #[inline]
    pub fn tid(&self) -> TransitionId {
        self.transition.tid
    }

    #[inline]
    pub fn transition(&self) -> &'g ResourceTransition {
        self.transition
    }

    pub fn operation(&self) -> &'g RenderOperation {
        self.graph.operation_by_id(self.transition.operation)
    }

    pub fn entry(&self) -> &'g RenderOperationEntry {
        self.operation().entry_by_id(self.transition.entry)
    }

    pub fn operation_name(&self) -> &'g str {
        self.operation().name()
    }

    pub fn entry_name(&self) -> &'g str {
        self.operation().entry_name_by_id(self.transition.entry)
    }

    pub fn external_memory_object_name(&self) -> Option<&'g str> {
        self.transition.external_memory_object_name()
    }
}

/// Names one producing entry and one consuming entry of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceTransitionDescription {
    pub generating_operation: String,
    pub generating_entry: String,
    pub consuming_operation: String,
    pub consuming_entry: String,
}

impl ResourceTransitionDescription {
    pub fn new(
        generating_operation: impl Into<String>,
        generating_entry: impl Into<String>,
        consuming_operation: impl Into<String>,
        consuming_entry: impl Into<String>,
    ) -> Self {
        Self {
            generating_operation: generating_operation.into(),
            generating_entry: generating_entry.into(),
            consuming_operation: consuming_operation.into(),
            consuming_entry: consuming_entry.into(),
        }
    }
}
