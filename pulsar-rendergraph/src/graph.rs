use std::collections::BTreeMap;
use std::sync::Arc;
use derive_builder::Builder;
use pulsar_core::collections::hashmap::HashMap;
use pulsar_core::collections::SmallVec;
use crate::error::{RenderGraphError, Result};
use crate::interface::OperationEntryTypes;
use crate::node::{EntryId, OperationId, RenderOperation, RenderOperationNode};
use crate::resource::{ResourceDefinition, DEFAULT_SWAPCHAIN_NAME};
use crate::transition::{ResourceTransition, TransitionEntryId, TransitionId, TransitionRef};

/// Construction context of a render graph.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into), default)]
pub struct RenderGraphConfig {
    /// Name reserved for the presentation surface.
    pub swapchain_name: String,
    /// Named images must also agree on their shape to share a tid.
    pub strict_resource_shapes: bool,
}

impl Default for RenderGraphConfig {
    fn default() -> Self {
        Self {
            swapchain_name: DEFAULT_SWAPCHAIN_NAME.to_owned(),
            strict_resource_shapes: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntryHandle {
    pub(crate) operation: OperationId,
    pub(crate) entry: EntryId,
}

/// Operations and the resource transitions flowing between them.
///
/// The graph is append-only while it is built. Once the completion pass succeeded it is frozen:
/// identifiers, tid groupings and traversal results no longer change, so it can be shared between
/// threads for read-only queries.
#[derive(Debug)]
pub struct RenderGraph {
    name: String,
    config: RenderGraphConfig,
    pub(crate) operations: Vec<RenderOperation>,
    pub(crate) operation_lookup: BTreeMap<String, OperationId>,
    pub(crate) transitions: Vec<ResourceTransition>,
    pub(crate) entry_transitions: HashMap<EntryHandle, usize>,
    pub(crate) tid_members: HashMap<TransitionId, SmallVec<[usize; 4]>>,
    next_transition_id: TransitionId,
    next_transition_entry_id: TransitionEntryId,
    pub(crate) valid: bool,
}

impl RenderGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, RenderGraphConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: RenderGraphConfig) -> Self {
        Self {
            name: name.into(),
            config,
            operations: Vec::new(),
            operation_lookup: BTreeMap::new(),
            transitions: Vec::new(),
            entry_transitions: HashMap::default(),
            tid_members: HashMap::default(),
            next_transition_id: 1,
            next_transition_entry_id: 1,
            valid: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn config(&self) -> &RenderGraphConfig {
        &self.config
    }

    /// Whether the completion pass succeeded and the graph is frozen.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Definition of the presentation image for this graph.
    pub fn swapchain_definition(&self, format: wgpu::TextureFormat, array_layers: u32) -> ResourceDefinition {
        ResourceDefinition::swapchain(self.config.swapchain_name.as_str(), format, array_layers)
    }

    pub fn is_swapchain(&self, definition: &ResourceDefinition) -> bool {
        definition.name() == self.config.swapchain_name
    }

    /// Operation names in name order.
    pub fn render_operation_names(&self) -> Vec<&str> {
        self.operation_lookup.keys().map(String::as_str).collect()
    }

    /// Operations in name order.
    pub fn render_operations(&self) -> impl Iterator<Item = &RenderOperation> {
        self.operation_lookup
            .values()
            .map(move |id| self.operation_by_id(*id))
    }

    pub fn render_operation(&self, op_name: &str) -> Result<&RenderOperation> {
        let id = self.lookup_operation(op_name)?;
        Ok(self.operation_by_id(id))
    }

    /// Mutable access for adding entries to a registered operation. Fails once the graph is frozen.
    pub fn render_operation_mut(&mut self, op_name: &str) -> Result<&mut RenderOperation> {
        self.ensure_mutable()?;
        let id = self.lookup_operation(op_name)?;
        Ok(&mut self.operations[id.index()])
    }

    pub fn operation_id(&self, op_name: &str) -> Option<OperationId> {
        self.operation_lookup.get(op_name).copied()
    }

    /// Attaching a node does not change the graph shape, so like external names it can be bound on a
    /// frozen graph.
    pub fn set_render_operation_node(&mut self, op_name: &str, node: &Arc<dyn RenderOperationNode>) -> Result<()> {
        let id = self.lookup_operation(op_name)?;
        self.operations[id.index()].set_render_operation_node(node);
        Ok(())
    }

    pub fn render_operation_node(&self, op_name: &str) -> Result<Option<Arc<dyn RenderOperationNode>>> {
        Ok(self.render_operation(op_name)?.render_operation_node())
    }

    /// Transitions in registration order.
    pub fn transitions(&self) -> impl Iterator<Item = TransitionRef<'_>> {
        self.transitions
            .iter()
            .map(move |transition| TransitionRef::new(self, transition))
    }

    #[inline]
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn transition(&self, rteid: TransitionEntryId) -> Result<TransitionRef<'_>> {
        self.transition_index(rteid)
            .map(|index| TransitionRef::new(self, &self.transitions[index]))
            .ok_or(RenderGraphError::UnknownTransition { rteid })
    }

    /// Transition bound to the given entry, if any.
    pub fn entry_transition(&self, op_name: &str, entry_name: &str) -> Result<Option<TransitionRef<'_>>> {
        let handle = self.resolve_entry(op_name, entry_name)?;
        Ok(self
            .entry_transitions
            .get(&handle)
            .map(|index| TransitionRef::new(self, &self.transitions[*index])))
    }

    /// Transitions of one operation whose entry role matches `entry_types`.
    pub fn operation_io(&self, op_name: &str, entry_types: OperationEntryTypes) -> Result<Vec<TransitionRef<'_>>> {
        let id = self.lookup_operation(op_name)?;
        Ok(self.operation_io_by_id(id, entry_types).collect())
    }

    /// Transitions sharing `tid` whose entry role matches `entry_types`.
    pub fn transition_io(&self, tid: TransitionId, entry_types: OperationEntryTypes) -> Vec<TransitionRef<'_>> {
        self.transition_io_iter(tid, entry_types).collect()
    }

    /// Late binding of an external resource. Allowed on a frozen graph, the shape is not affected.
    pub fn set_external_memory_object_name(&mut self, rteid: TransitionEntryId, name: Option<&str>) -> Result<()> {
        let index = self
            .transition_index(rteid)
            .ok_or(RenderGraphError::UnknownTransition { rteid })?;
        self.transitions[index].set_external_memory_object_name(normalize_external_name(name));
        Ok(())
    }

    pub(crate) fn operation_by_id(&self, id: OperationId) -> &RenderOperation {
        &self.operations[id.index()]
    }

    pub(crate) fn operation_io_by_id(
        &self,
        id: OperationId,
        entry_types: OperationEntryTypes,
    ) -> impl Iterator<Item = TransitionRef<'_>> {
        self.transitions()
            .filter(move |transition| {
                transition.transition().operation_id() == id && transition.entry().kind().matches(entry_types)
            })
    }

    pub(crate) fn transition_io_iter(
        &self,
        tid: TransitionId,
        entry_types: OperationEntryTypes,
    ) -> impl Iterator<Item = TransitionRef<'_>> {
        self.tid_members
            .get(&tid)
            .into_iter()
            .flatten()
            .map(move |index| TransitionRef::new(self, &self.transitions[*index]))
            .filter(move |transition| transition.entry().kind().matches(entry_types))
    }

    pub(crate) fn lookup_operation(&self, op_name: &str) -> Result<OperationId> {
        self.operation_id(op_name)
            .ok_or_else(|| RenderGraphError::UnknownOperation { operation: op_name.to_owned() })
    }

    pub(crate) fn resolve_entry(&self, op_name: &str, entry_name: &str) -> Result<EntryHandle> {
        let operation = self.lookup_operation(op_name)?;
        let entry = self
            .operation_by_id(operation)
            .entry_id(entry_name)
            .ok_or_else(|| RenderGraphError::UnknownEntry {
                operation: op_name.to_owned(),
                entry: entry_name.to_owned(),
            })?;

        Ok(EntryHandle { operation, entry })
    }

    pub(crate) fn entry_names(&self, handle: EntryHandle) -> (String, String) {
        let operation = self.operation_by_id(handle.operation);
        (
            operation.name().to_owned(),
            operation.entry_name_by_id(handle.entry).to_owned(),
        )
    }

    pub(crate) fn bound_tid(&self, handle: EntryHandle) -> Option<TransitionId> {
        self.entry_transitions
            .get(&handle)
            .map(|index| self.transitions[*index].tid())
    }

    pub(crate) fn ensure_mutable(&self) -> Result<()> {
        if self.valid {
            return Err(RenderGraphError::Frozen { graph: self.name.clone() });
        }
        Ok(())
    }

    pub(crate) fn ensure_complete(&self) -> Result<()> {
        if !self.valid {
            return Err(RenderGraphError::Incomplete { graph: self.name.clone() });
        }
        Ok(())
    }

    pub(crate) fn generate_transition_id(&mut self) -> TransitionId {
        let tid = self.next_transition_id;
        self.next_transition_id += 1;
        tid
    }

    pub(crate) fn push_transition(&mut self, tid: TransitionId, handle: EntryHandle, external: Option<String>) -> TransitionEntryId {
        let rteid = self.next_transition_entry_id;
        self.next_transition_entry_id += 1;

        let index = self.transitions.len();
        self.transitions.push(ResourceTransition::new(rteid, tid, handle.operation, handle.entry, external));
        self.entry_transitions.insert(handle, index);
        self.tid_members.entry(tid).or_default().push(index);
        rteid
    }

    fn transition_index(&self, rteid: TransitionEntryId) -> Option<usize> {
        let index = (rteid as usize).checked_sub(1)?;
        self.transitions
            .get(index)
            .filter(|transition| transition.rteid() == rteid)
            .map(|_| index)
    }
}

pub(crate) fn normalize_external_name(name: Option<&str>) -> Option<String> {
    name.filter(|name| !name.is_empty()).map(str::to_owned)
}
