use log::{debug, info};
use pulsar_core::collections::SmallVec;
use crate::error::{RenderGraphError, Result};
use crate::graph::{normalize_external_name, EntryHandle, RenderGraph};
use crate::node::{OperationId, RenderOperation, RenderOperationEntry};
use crate::transition::{ResourceTransitionDescription, TransitionId};

type Handles = SmallVec<[EntryHandle; 4]>;

impl RenderGraph {
    /// Registers a vertex. Operation names are unique within a graph.
    pub fn add_render_operation(&mut self, operation: RenderOperation) -> Result<OperationId> {
        self.ensure_mutable()?;

        if self.operation_lookup.contains_key(operation.name()) {
            return Err(RenderGraphError::DuplicateOperation {
                operation: operation.name().to_owned(),
            });
        }

        let id = OperationId::from(self.operations.len() as u32);
        debug!(
            "Render graph[{}] registers operation[{}] with {} entries",
            self.name(),
            operation.name(),
            operation.entry_count()
        );
        self.operation_lookup.insert(operation.name().to_owned(), id);
        self.operations.push(operation);

        Ok(id)
    }

    /// Links one producing entry to one consuming entry.
    ///
    /// If either side is already bound its tid is reused, which chains the lifetime of a resource
    /// over several operations. Returns the tid both entries end up in.
    pub fn add_resource_transition(
        &mut self,
        generating_operation: &str,
        generating_entry: &str,
        consuming_operation: &str,
        consuming_entry: &str,
        external_memory_object_name: Option<&str>,
    ) -> Result<TransitionId> {
        let producer = self.resolve_entry(generating_operation, generating_entry)?;
        let consumer = self.resolve_entry(consuming_operation, consuming_entry)?;

        self.bind_entries(&[producer], &[consumer], external_memory_object_name)
    }

    pub fn add_resource_transition_desc(
        &mut self,
        description: &ResourceTransitionDescription,
        external_memory_object_name: Option<&str>,
    ) -> Result<TransitionId> {
        self.add_resource_transition(
            &description.generating_operation,
            &description.generating_entry,
            &description.consuming_operation,
            &description.consuming_entry,
            external_memory_object_name,
        )
    }

    /// Binds several producers and their consumers to a single physical resource.
    ///
    /// The producers must write pairwise disjoint subresource ranges.
    pub fn add_resource_transitions(
        &mut self,
        descriptions: &[ResourceTransitionDescription],
        external_memory_object_name: Option<&str>,
    ) -> Result<TransitionId> {
        let mut producers = Handles::new();
        let mut consumers = Handles::new();

        for description in descriptions {
            let producer = self.resolve_entry(&description.generating_operation, &description.generating_entry)?;
            let consumer = self.resolve_entry(&description.consuming_operation, &description.consuming_entry)?;

            if !producers.contains(&producer) {
                producers.push(producer);
            }
            if !consumers.contains(&consumer) {
                consumers.push(consumer);
            }
        }

        self.bind_entries(&producers, &consumers, external_memory_object_name)
    }

    /// Anchors a single entry with no counterpart inside the graph.
    ///
    /// Without an external name this is an "empty" transition: a transient resource owned by the graph.
    pub fn add_entry_transition(
        &mut self,
        operation: &str,
        entry: &str,
        external_memory_object_name: Option<&str>,
    ) -> Result<TransitionId> {
        self.ensure_mutable()?;
        let handle = self.resolve_entry(operation, entry)?;

        if let Some(tid) = self.bound_tid(handle) {
            let (operation, entry) = self.entry_names(handle);
            return Err(RenderGraphError::EntryAlreadyBound { operation, entry, tid });
        }

        let tid = self.generate_transition_id();
        let rteid = self.push_transition(tid, handle, normalize_external_name(external_memory_object_name));
        debug!("Render graph[{}] anchors {operation}.{entry} as tid {tid} (rteid {rteid})", self.name());

        Ok(tid)
    }

    /// Completion pass: every entry without a transition receives an empty one with a fresh tid.
    ///
    /// Must run before the graph is handed to a scheduler. The graph is validated first and frozen on
    /// success; a frozen graph is left untouched.
    pub fn add_missing_resource_transitions(&mut self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }

        self.validate()?;

        let missing: Vec<EntryHandle> = self
            .operation_lookup
            .values()
            .flat_map(|operation| {
                self.operations[operation.index()]
                    .entries()
                    .map(move |(entry, _, _)| EntryHandle { operation: *operation, entry })
            })
            .filter(|handle| !self.entry_transitions.contains_key(handle))
            .collect();

        for handle in &missing {
            let tid = self.generate_transition_id();
            self.push_transition(tid, *handle, None);
        }

        self.valid = true;
        info!(
            "Render graph[{}] completed: {} operations, {} transitions ({} synthesized)",
            self.name(),
            self.operations.len(),
            self.transitions.len(),
            missing.len()
        );

        Ok(())
    }

    fn bind_entries(
        &mut self,
        producers: &[EntryHandle],
        consumers: &[EntryHandle],
        external_memory_object_name: Option<&str>,
    ) -> Result<TransitionId> {
        self.ensure_mutable()?;

        for producer in producers {
            self.check_role(*producer, true)?;
        }
        for consumer in consumers {
            self.check_role(*consumer, false)?;
        }

        let participants: Handles = producers.iter().chain(consumers).copied().collect();
        let existing_tid = self.common_tid(&participants)?;

        let Some(reference) = participants.first().copied() else {
            return Err(RenderGraphError::Incomplete { graph: self.name().to_owned() });
        };

        // new participants plus everything already grouped under the tid must name one resource
        let mut members: Handles = participants.clone();
        if let Some(tid) = existing_tid {
            members.extend(self.tid_handles(tid));
        }
        for member in &members {
            self.check_same_resource(reference, *member)?;
        }

        let mut writers: Handles = producers.iter().copied().collect();
        if let Some(tid) = existing_tid {
            for handle in self.tid_handles(tid) {
                if self.entry(handle).kind().is_output() && !writers.contains(&handle) {
                    writers.push(handle);
                }
            }
        }
        self.check_disjoint_writers(existing_tid, &writers)?;

        let requested = normalize_external_name(external_memory_object_name);
        let external = match existing_tid {
            Some(tid) => self.joined_external_name(tid, requested)?,
            None => requested,
        };

        let tid = existing_tid.unwrap_or_else(|| self.generate_transition_id());
        let mut rteids = SmallVec::<[u32; 4]>::new();
        for handle in participants {
            if self.bound_tid(handle).is_none() {
                rteids.push(self.push_transition(tid, handle, external.clone()));
            }
        }

        debug!("Render graph[{}] binds tid {tid} with rteids {:?}", self.name(), rteids.as_slice());
        Ok(tid)
    }

    /// A tid names one physical resource, so every transition joining it carries the same external
    /// binding. No name inherits the existing one, a different name is rejected.
    fn joined_external_name(&self, tid: TransitionId, requested: Option<String>) -> Result<Option<String>> {
        let existing = self
            .tid_members
            .get(&tid)
            .and_then(|members| members.first())
            .and_then(|index| self.transitions[*index].external_memory_object_name())
            .map(str::to_owned);

        match requested {
            None => Ok(existing),
            Some(requested) if existing.as_deref() == Some(requested.as_str()) => Ok(existing),
            Some(requested) => Err(RenderGraphError::ExternalNameConflict { tid, existing, requested }),
        }
    }

    fn entry(&self, handle: EntryHandle) -> &RenderOperationEntry {
        self.operations[handle.operation.index()].entry_by_id(handle.entry)
    }

    fn tid_handles(&self, tid: TransitionId) -> Handles {
        self.tid_members
            .get(&tid)
            .into_iter()
            .flatten()
            .map(|index| {
                let transition = &self.transitions[*index];
                EntryHandle {
                    operation: transition.operation_id(),
                    entry: transition.entry_id(),
                }
            })
            .collect()
    }

    fn check_role(&self, handle: EntryHandle, producer: bool) -> Result<()> {
        let kind = self.entry(handle).kind();
        let ok = if producer { kind.is_output() } else { kind.is_input() };
        if ok {
            return Ok(());
        }

        let (operation, entry) = self.entry_names(handle);
        Err(RenderGraphError::InvalidEntryRole {
            operation,
            entry,
            expected: if producer { "a producer" } else { "a consumer" },
        })
    }

    /// The tid already shared by the participants, if any. Participants bound to two different tids
    /// cannot be merged.
    fn common_tid(&self, participants: &[EntryHandle]) -> Result<Option<TransitionId>> {
        let mut common: Option<TransitionId> = None;
        for handle in participants {
            match (common, self.bound_tid(*handle)) {
                (None, Some(tid)) => common = Some(tid),
                (Some(expected), Some(tid)) if expected != tid => {
                    let (operation, entry) = self.entry_names(*handle);
                    return Err(RenderGraphError::EntryAlreadyBound { operation, entry, tid });
                }
                _ => {}
            }
        }
        Ok(common)
    }

    fn check_same_resource(&self, first: EntryHandle, second: EntryHandle) -> Result<()> {
        let strict = self.config().strict_resource_shapes;
        if self
            .entry(first)
            .resource_definition()
            .same_resource(self.entry(second).resource_definition(), strict)
        {
            return Ok(());
        }

        let (first_operation, first_entry) = self.entry_names(first);
        let (second_operation, second_entry) = self.entry_names(second);
        Err(RenderGraphError::ResourceConflict {
            first_operation,
            first_entry,
            second_operation,
            second_entry,
        })
    }

    fn check_disjoint_writers(&self, tid: Option<TransitionId>, writers: &[EntryHandle]) -> Result<()> {
        for (index, first) in writers.iter().enumerate() {
            for second in &writers[index + 1..] {
                if self.entry(*first).overlaps(self.entry(*second)) {
                    let (first_operation, first_entry) = self.entry_names(*first);
                    let (second_operation, second_entry) = self.entry_names(*second);
                    return Err(RenderGraphError::OverlappingRanges {
                        tid: tid.unwrap_or(0),
                        first_operation,
                        first_entry,
                        second_operation,
                        second_entry,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;
    use super::*;
    use crate::interface::{LoadOp, OperationEntryTypes};
    use crate::resource::{AttachmentType, BufferSubresourceRange, ImageSize, ResourceDefinition};

    fn albedo() -> ResourceDefinition {
        ResourceDefinition::image(wgpu::TextureFormat::Rgba8Unorm, ImageSize::default(), AttachmentType::Color)
    }

    fn hdr() -> ResourceDefinition {
        ResourceDefinition::image(wgpu::TextureFormat::Rgba16Float, ImageSize::default(), AttachmentType::Color)
    }

    fn layer_range(layer: u32) -> wgpu::ImageSubresourceRange {
        wgpu::ImageSubresourceRange {
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        }
    }

    fn deferred() -> RenderGraph {
        let mut graph = RenderGraph::new("deferred");

        let mut gbuffer = RenderOperation::graphics("GBuffer");
        gbuffer.add_attachment_output("albedo", albedo(), LoadOp::clear_color(Vec4::ZERO)).unwrap();
        graph.add_render_operation(gbuffer).unwrap();

        let mut lighting = RenderOperation::graphics("Lighting");
        lighting.add_attachment_input("albedoIn", albedo(), LoadOp::Load).unwrap();
        lighting.add_attachment_output("hdr", hdr(), LoadOp::DontCare).unwrap();
        graph.add_render_operation(lighting).unwrap();

        let mut tonemap = RenderOperation::graphics("Tonemap");
        tonemap.add_attachment_input("hdrIn", hdr(), LoadOp::Load).unwrap();
        tonemap.add_attachment_input("albedoDebug", albedo(), LoadOp::Load).unwrap();
        graph.add_render_operation(tonemap).unwrap();

        graph
    }

    #[test]
    fn duplicate_operation_is_rejected() {
        let mut graph = deferred();
        let err = graph.add_render_operation(RenderOperation::compute("Lighting")).unwrap_err();
        assert_eq!(err, RenderGraphError::DuplicateOperation { operation: "Lighting".to_string() });
        assert_eq!(graph.render_operation_names().len(), 3);
    }

    #[test]
    fn producer_consumer_transition() {
        let mut graph = deferred();
        let tid = graph.add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", None).unwrap();

        assert_eq!(tid, 1);
        assert_eq!(graph.transition_count(), 2);
        assert_eq!(graph.entry_transition("GBuffer", "albedo").unwrap().unwrap().tid(), tid);
        assert_eq!(graph.entry_transition("Lighting", "albedoIn").unwrap().unwrap().tid(), tid);
        assert!(graph.entry_transition("Lighting", "hdr").unwrap().is_none());
    }

    #[test]
    fn producer_tid_is_reused_for_more_consumers() {
        let mut graph = deferred();
        let first = graph.add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", None).unwrap();
        let second = graph.add_resource_transition("GBuffer", "albedo", "Tonemap", "albedoDebug", None).unwrap();

        assert_eq!(first, second);
        assert_eq!(graph.transition_count(), 3);
        assert_eq!(graph.transition_io(first, OperationEntryTypes::ALL_INPUTS).len(), 2);
        assert_eq!(graph.transition_io(first, OperationEntryTypes::ALL_OUTPUTS).len(), 1);
    }

    #[test]
    fn consumer_bound_elsewhere_is_rejected() {
        let mut graph = deferred();
        graph.add_entry_transition("Tonemap", "albedoDebug", Some("debug-view")).unwrap();
        graph.add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", None).unwrap();

        let err = graph
            .add_resource_transition("GBuffer", "albedo", "Tonemap", "albedoDebug", None)
            .unwrap_err();
        assert!(matches!(err, RenderGraphError::EntryAlreadyBound { ref entry, .. } if entry == "albedoDebug"));
        assert_eq!(graph.transition_count(), 3);
    }

    #[test]
    fn mismatched_resources_are_rejected() {
        let mut graph = deferred();
        let err = graph
            .add_resource_transition("Lighting", "hdr", "Tonemap", "albedoDebug", None)
            .unwrap_err();

        assert_eq!(
            err,
            RenderGraphError::ResourceConflict {
                first_operation: "Lighting".to_string(),
                first_entry: "hdr".to_string(),
                second_operation: "Tonemap".to_string(),
                second_entry: "albedoDebug".to_string(),
            }
        );
        assert_eq!(graph.transition_count(), 0);
    }

    #[test]
    fn unknown_references_are_rejected() {
        let mut graph = deferred();
        assert!(matches!(
            graph.add_resource_transition("Shadow", "depth", "Lighting", "albedoIn", None),
            Err(RenderGraphError::UnknownOperation { .. })
        ));
        assert!(matches!(
            graph.add_resource_transition("GBuffer", "normals", "Lighting", "albedoIn", None),
            Err(RenderGraphError::UnknownEntry { .. })
        ));
        assert!(matches!(
            graph.add_entry_transition("GBuffer", "normals", None),
            Err(RenderGraphError::UnknownEntry { .. })
        ));
    }

    #[test]
    fn roles_are_checked() {
        let mut graph = deferred();
        let err = graph
            .add_resource_transition("Lighting", "albedoIn", "GBuffer", "albedo", None)
            .unwrap_err();
        assert!(matches!(err, RenderGraphError::InvalidEntryRole { expected: "a producer", .. }));
    }

    #[test]
    fn disjoint_producers_share_a_tid() {
        let mut graph = RenderGraph::new("tiles");
        let atlas = || albedo().named("shadow-atlas");

        for (index, name) in ["TileA", "TileB"].into_iter().enumerate() {
            let mut tile = RenderOperation::graphics(name);
            tile.add_attachment_output("atlas", atlas(), LoadOp::DontCare)
                .unwrap()
                .with_image_range(layer_range(index as u32));
            graph.add_render_operation(tile).unwrap();
        }
        let mut resolve = RenderOperation::graphics("Resolve");
        resolve.add_attachment_input("atlas", atlas(), LoadOp::Load).unwrap();
        graph.add_render_operation(resolve).unwrap();

        let tid = graph
            .add_resource_transitions(
                &[
                    ResourceTransitionDescription::new("TileA", "atlas", "Resolve", "atlas"),
                    ResourceTransitionDescription::new("TileB", "atlas", "Resolve", "atlas"),
                ],
                Some("shadow-atlas"),
            )
            .unwrap();

        let writers = graph.transition_io(tid, OperationEntryTypes::ALL_OUTPUTS);
        let names: Vec<_> = writers.iter().map(|t| t.operation_name()).collect();
        assert_eq!(names, ["TileA", "TileB"]);
        assert_eq!(graph.transition_io(tid, OperationEntryTypes::ALL_INPUTS).len(), 1);
        assert!(graph
            .transitions()
            .all(|t| t.external_memory_object_name() == Some("shadow-atlas")));
    }

    #[test]
    fn overlapping_producers_are_rejected() {
        let mut graph = RenderGraph::new("tiles");
        for name in ["TileA", "TileB"] {
            let mut tile = RenderOperation::compute(name);
            tile.add_buffer_output("histogram", ResourceDefinition::buffer("histogram"))
                .unwrap()
                .with_buffer_range(BufferSubresourceRange::new(if name == "TileA" { 0 } else { 128 }, 256));
            graph.add_render_operation(tile).unwrap();
        }
        let mut reduce = RenderOperation::compute("Reduce");
        reduce.add_buffer_input("histogram", ResourceDefinition::buffer("histogram")).unwrap();
        graph.add_render_operation(reduce).unwrap();

        let err = graph
            .add_resource_transitions(
                &[
                    ResourceTransitionDescription::new("TileA", "histogram", "Reduce", "histogram"),
                    ResourceTransitionDescription::new("TileB", "histogram", "Reduce", "histogram"),
                ],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, RenderGraphError::OverlappingRanges { .. }));
        assert_eq!(graph.transition_count(), 0);
    }

    #[test]
    fn second_writer_joining_existing_tid_is_checked() {
        let mut graph = RenderGraph::new("tiles");
        for name in ["TileA", "TileB"] {
            let mut tile = RenderOperation::graphics(name);
            tile.add_attachment_output("atlas", albedo().named("atlas"), LoadOp::DontCare).unwrap();
            graph.add_render_operation(tile).unwrap();
        }
        let mut resolve = RenderOperation::graphics("Resolve");
        resolve.add_attachment_input("a", albedo().named("atlas"), LoadOp::Load).unwrap();
        resolve.add_attachment_input("b", albedo().named("atlas"), LoadOp::Load).unwrap();
        graph.add_render_operation(resolve).unwrap();

        graph.add_resource_transition("TileA", "atlas", "Resolve", "a", None).unwrap();
        let err = graph.add_resource_transition("TileB", "atlas", "Resolve", "a", None).unwrap_err();
        assert!(matches!(err, RenderGraphError::OverlappingRanges { tid: 1, .. }));
    }

    #[test]
    fn producer_joining_a_consumer_tid() {
        let mut graph = RenderGraph::new("tiles");
        for (index, name) in ["TileA", "TileB"].into_iter().enumerate() {
            let mut tile = RenderOperation::graphics(name);
            tile.add_attachment_output("atlas", albedo().named("atlas"), LoadOp::DontCare)
                .unwrap()
                .with_image_range(layer_range(index as u32));
            graph.add_render_operation(tile).unwrap();
        }
        let mut resolve = RenderOperation::graphics("Resolve");
        resolve.add_attachment_input("atlas", albedo().named("atlas"), LoadOp::Load).unwrap();
        graph.add_render_operation(resolve).unwrap();

        let first = graph.add_resource_transition("TileA", "atlas", "Resolve", "atlas", None).unwrap();
        let second = graph.add_resource_transition("TileB", "atlas", "Resolve", "atlas", None).unwrap();

        assert_eq!(first, second);
        assert_eq!(graph.transition_count(), 3);
        let writers: Vec<_> = graph
            .transition_io(first, OperationEntryTypes::ALL_OUTPUTS)
            .iter()
            .map(|t| t.operation_name())
            .collect();
        assert_eq!(writers, ["TileA", "TileB"]);
    }

    #[test]
    fn joined_transitions_inherit_external_name() {
        let mut graph = deferred();
        let tid = graph
            .add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", Some("imported"))
            .unwrap();
        graph.add_resource_transition("GBuffer", "albedo", "Tonemap", "albedoDebug", None).unwrap();

        let names: Vec<_> = graph
            .transition_io(tid, OperationEntryTypes::ALL_INPUTS_OUTPUTS)
            .iter()
            .map(|t| (t.operation_name(), t.external_memory_object_name()))
            .collect();
        assert_eq!(
            names,
            [
                ("GBuffer", Some("imported")),
                ("Lighting", Some("imported")),
                ("Tonemap", Some("imported")),
            ]
        );
    }

    #[test]
    fn conflicting_external_name_is_rejected() {
        let mut graph = deferred();
        graph
            .add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", Some("imported"))
            .unwrap();

        let err = graph
            .add_resource_transition("GBuffer", "albedo", "Tonemap", "albedoDebug", Some("other"))
            .unwrap_err();
        assert_eq!(
            err,
            RenderGraphError::ExternalNameConflict {
                tid: 1,
                existing: Some("imported".to_string()),
                requested: "other".to_string(),
            }
        );
        assert_eq!(graph.transition_count(), 2);
        assert!(graph.entry_transition("Tonemap", "albedoDebug").unwrap().is_none());
    }

    #[test]
    fn naming_an_already_bound_pair_is_rejected() {
        let mut graph = deferred();
        let tid = graph.add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", None).unwrap();

        let err = graph
            .add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", Some("late"))
            .unwrap_err();
        assert_eq!(
            err,
            RenderGraphError::ExternalNameConflict {
                tid,
                existing: None,
                requested: "late".to_string(),
            }
        );
        assert!(graph.transitions().all(|t| t.external_memory_object_name().is_none()));

        // repeating the binding unchanged is accepted
        assert_eq!(
            graph.add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", None),
            Ok(tid)
        );
        assert_eq!(graph.transition_count(), 2);
    }

    #[test]
    fn external_anchor_and_empty_transitions() {
        let mut graph = deferred();
        let swapchain_tid = graph.add_entry_transition("Lighting", "hdr", Some("capture")).unwrap();
        let empty_tid = graph.add_entry_transition("GBuffer", "albedo", None).unwrap();
        assert_ne!(swapchain_tid, empty_tid);

        let hdr = graph.entry_transition("Lighting", "hdr").unwrap().unwrap();
        assert_eq!(hdr.external_memory_object_name(), Some("capture"));
        let albedo = graph.entry_transition("GBuffer", "albedo").unwrap().unwrap();
        assert_eq!(albedo.external_memory_object_name(), None);

        assert!(matches!(
            graph.add_entry_transition("GBuffer", "albedo", None),
            Err(RenderGraphError::EntryAlreadyBound { .. })
        ));
    }

    #[test]
    fn completion_binds_every_entry_once() {
        let mut graph = deferred();
        graph.add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", None).unwrap();
        let used_tids: Vec<_> = graph.transitions().map(|t| t.tid()).collect();

        graph.add_missing_resource_transitions().unwrap();
        assert!(graph.is_valid());

        for operation in graph.render_operations() {
            for (_, entry, _) in operation.entries() {
                let bound = graph
                    .transitions()
                    .filter(|t| t.operation_name() == operation.name() && t.entry_name() == entry)
                    .count();
                assert_eq!(bound, 1, "{}.{entry}", operation.name());
            }
        }

        let synthesized = graph.entry_transition("Lighting", "hdr").unwrap().unwrap();
        assert!(!used_tids.contains(&synthesized.tid()));
        assert_eq!(synthesized.external_memory_object_name(), None);
        assert_eq!(graph.transition_io(synthesized.tid(), OperationEntryTypes::ALL_INPUTS_OUTPUTS).len(), 1);

        // a second run is a no-op on a frozen graph
        let count = graph.transition_count();
        graph.add_missing_resource_transitions().unwrap();
        assert_eq!(graph.transition_count(), count);
        assert!(matches!(
            graph.add_entry_transition("Tonemap", "hdrIn", None),
            Err(RenderGraphError::Frozen { .. })
        ));
    }

    #[test]
    fn tids_sharing_a_group_compare_equal() {
        let mut graph = deferred();
        graph.add_resource_transition("GBuffer", "albedo", "Lighting", "albedoIn", None).unwrap();
        graph.add_resource_transition("GBuffer", "albedo", "Tonemap", "albedoDebug", None).unwrap();
        graph.add_resource_transition("Lighting", "hdr", "Tonemap", "hdrIn", None).unwrap();
        graph.add_missing_resource_transitions().unwrap();

        for transition in graph.transitions() {
            for other in graph.transition_io(transition.tid(), OperationEntryTypes::ALL_INPUTS_OUTPUTS) {
                assert_eq!(transition.entry().resource_definition(), other.entry().resource_definition());
            }
        }
    }

    #[test]
    fn dangling_resolve_fails_completion() {
        let mut graph = RenderGraph::new("msaa");
        let mut forward = RenderOperation::graphics("Forward");
        forward.add_attachment_output("color", albedo(), LoadOp::DontCare).unwrap();
        forward
            .add_attachment_resolve_output("resolved", albedo(), LoadOp::DontCare, "colour")
            .unwrap();
        graph.add_render_operation(forward).unwrap();

        let err = graph.add_missing_resource_transitions().unwrap_err();
        assert_eq!(
            err,
            RenderGraphError::DanglingResolve {
                operation: "Forward".to_string(),
                entry: "resolved".to_string(),
                source_entry: "colour".to_string(),
            }
        );
        assert!(!graph.is_valid());
        assert_eq!(graph.transition_count(), 0);
    }

    #[test]
    fn resolve_without_source_completes() {
        let mut graph = RenderGraph::new("msaa");
        let mut forward = RenderOperation::graphics("Forward");
        forward.add_attachment_resolve_output("resolved", albedo(), LoadOp::DontCare, "").unwrap();
        graph.add_render_operation(forward).unwrap();

        graph.add_missing_resource_transitions().unwrap();
        assert!(graph.is_valid());
        assert_eq!(graph.transition_count(), 1);
    }

    #[test]
    fn strict_shapes_reject_named_mismatch() {
        let config = crate::graph::RenderGraphConfigBuilder::default()
            .strict_resource_shapes(true)
            .build()
            .unwrap();
        let mut graph = RenderGraph::with_config("strict", config);

        let mut writer = RenderOperation::graphics("Writer");
        writer.add_attachment_output("out", albedo().named("shared"), LoadOp::DontCare).unwrap();
        graph.add_render_operation(writer).unwrap();
        let mut reader = RenderOperation::graphics("Reader");
        reader.add_attachment_input("in", hdr().named("shared"), LoadOp::Load).unwrap();
        graph.add_render_operation(reader).unwrap();

        assert!(matches!(
            graph.add_resource_transition("Writer", "out", "Reader", "in", None),
            Err(RenderGraphError::ResourceConflict { .. })
        ));
    }
}
