use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use derive_more::{From, Into};
use log::warn;
use pulsar_core::collections::hashmap::HashMap;
use crate::error::{RenderGraphError, Result};
use crate::interface::{EntryKind, ImageCreateFlags, LoadOp, OperationEntryTypes, OperationType, StoreOp};
use crate::resource::{whole_image_range, BufferSubresourceRange, ImageSize, ResourceDefinition};

/// Handle of a render operation inside the graph that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
pub struct OperationId(u32);

/// Handle of an entry inside its render operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
pub struct EntryId(u32);

impl OperationId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl EntryId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Command recording logic attached to an operation.
///
/// The graph only stores and forwards it, it never calls into it.
pub trait RenderOperationNode: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Generic buffer access used when the caller does not narrow it.
pub const DEFAULT_BUFFER_ACCESS: wgpu::BufferUses = wgpu::BufferUses::UNIFORM
    .union(wgpu::BufferUses::STORAGE_READ_ONLY)
    .union(wgpu::BufferUses::COPY_SRC);

#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntryUsage {
    pub load_op: LoadOp,
    pub store_attachment: bool,
    pub resolve_source_entry_name: Option<String>,
    pub image_range: wgpu::ImageSubresourceRange,
    /// Target state of the image while the operation runs.
    pub layout: wgpu::TextureUses,
    pub image_usage: wgpu::TextureUsages,
    pub image_create: ImageCreateFlags,
    /// `None` lets the executor pick the view dimension.
    pub view_dimension: Option<wgpu::TextureViewDimension>,
}

impl ImageEntryUsage {
    fn new(load_op: LoadOp, image_range: wgpu::ImageSubresourceRange, layout: wgpu::TextureUses) -> Self {
        Self {
            load_op,
            store_attachment: false,
            resolve_source_entry_name: None,
            image_range,
            layout,
            image_usage: wgpu::TextureUsages::empty(),
            image_create: ImageCreateFlags::empty(),
            view_dimension: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BufferEntryUsage {
    pub buffer_range: BufferSubresourceRange,
    pub pipeline_stage: wgpu::ShaderStages,
    pub access: wgpu::BufferUses,
    /// Texel format, for texel buffers only.
    pub buffer_format: Option<wgpu::TextureFormat>,
}

impl Default for BufferEntryUsage {
    fn default() -> Self {
        Self {
            buffer_range: BufferSubresourceRange::default(),
            pipeline_stage: wgpu::ShaderStages::all(),
            access: DEFAULT_BUFFER_ACCESS,
            buffer_format: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryUsage {
    Image(ImageEntryUsage),
    Buffer(BufferEntryUsage),
}

/// One usage of a resource by one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOperationEntry {
    kind: EntryKind,
    resource_definition: ResourceDefinition,
    usage: EntryUsage,
}

impl RenderOperationEntry {
    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    #[inline]
    pub fn entry_type(&self) -> OperationEntryTypes {
        self.kind.entry_type()
    }

    #[inline]
    pub fn resource_definition(&self) -> &ResourceDefinition {
        &self.resource_definition
    }

    #[inline]
    pub fn usage(&self) -> &EntryUsage {
        &self.usage
    }

    pub fn image_usage(&self) -> Option<&ImageEntryUsage> {
        match &self.usage {
            EntryUsage::Image(image) => Some(image),
            EntryUsage::Buffer(_) => None,
        }
    }

    pub fn buffer_usage(&self) -> Option<&BufferEntryUsage> {
        match &self.usage {
            EntryUsage::Buffer(buffer) => Some(buffer),
            EntryUsage::Image(_) => None,
        }
    }

    pub fn resolve_source_entry_name(&self) -> Option<&str> {
        self.image_usage()
            .and_then(|image| image.resolve_source_entry_name.as_deref())
    }

    pub fn store_op(&self) -> StoreOp {
        match self.image_usage() {
            Some(image) if image.store_attachment => StoreOp::Store,
            _ => StoreOp::DontCare,
        }
    }

    /// Whether the subresources this entry touches intersect the ones of `other`.
    pub fn overlaps(&self, other: &RenderOperationEntry) -> bool {
        match (&self.usage, &other.usage) {
            (EntryUsage::Image(a), EntryUsage::Image(b)) => {
                crate::resource::image_ranges_overlap(&a.image_range, &b.image_range)
            }
            (EntryUsage::Buffer(a), EntryUsage::Buffer(b)) => a.buffer_range.overlaps(&b.buffer_range),
            _ => true,
        }
    }

    pub fn with_image_range(&mut self, image_range: wgpu::ImageSubresourceRange) -> &mut Self {
        self.edit_image("image range", |image| image.image_range = image_range)
    }

    pub fn with_layout(&mut self, layout: wgpu::TextureUses) -> &mut Self {
        self.edit_image("layout", |image| image.layout = layout)
    }

    pub fn with_image_usage(&mut self, image_usage: wgpu::TextureUsages) -> &mut Self {
        self.edit_image("image usage", |image| image.image_usage = image_usage)
    }

    pub fn with_image_create(&mut self, image_create: ImageCreateFlags) -> &mut Self {
        self.edit_image("image create flags", |image| image.image_create = image_create)
    }

    pub fn with_view_dimension(&mut self, view_dimension: wgpu::TextureViewDimension) -> &mut Self {
        self.edit_image("view dimension", |image| image.view_dimension = Some(view_dimension))
    }

    pub fn with_store(&mut self, store_attachment: bool) -> &mut Self {
        self.edit_image("store flag", |image| image.store_attachment = store_attachment)
    }

    /// Only meaningful on resolve outputs.
    pub fn with_resolve_source(&mut self, source_entry_name: &str) -> &mut Self {
        if self.kind != EntryKind::AttachmentResolveOutput {
            warn!("Try to set resolve source on a {:?} entry, ignored!", self.kind);
            return self;
        }
        self.edit_image("resolve source", |image| {
            image.resolve_source_entry_name = resolve_source(source_entry_name)
        })
    }

    pub fn with_buffer_range(&mut self, buffer_range: BufferSubresourceRange) -> &mut Self {
        self.edit_buffer("buffer range", |buffer| buffer.buffer_range = buffer_range)
    }

    pub fn with_pipeline_stage(&mut self, pipeline_stage: wgpu::ShaderStages) -> &mut Self {
        self.edit_buffer("pipeline stage", |buffer| buffer.pipeline_stage = pipeline_stage)
    }

    pub fn with_access(&mut self, access: wgpu::BufferUses) -> &mut Self {
        self.edit_buffer("access", |buffer| buffer.access = access)
    }

    pub fn with_buffer_format(&mut self, format: wgpu::TextureFormat) -> &mut Self {
        self.edit_buffer("buffer format", |buffer| buffer.buffer_format = Some(format))
    }

    fn edit_image(&mut self, field: &str, edit: impl FnOnce(&mut ImageEntryUsage)) -> &mut Self {
        match &mut self.usage {
            EntryUsage::Image(image) => edit(image),
            EntryUsage::Buffer(_) => warn!("Try to set {field} on a buffer entry, ignored!"),
        }
        self
    }

    fn edit_buffer(&mut self, field: &str, edit: impl FnOnce(&mut BufferEntryUsage)) -> &mut Self {
        match &mut self.usage {
            EntryUsage::Buffer(buffer) => edit(buffer),
            EntryUsage::Image(_) => warn!("Try to set {field} on an image entry, ignored!"),
        }
        self
    }
}

/// A vertex of the render graph: a graphics pass or a compute dispatch.
#[derive(Clone)]
pub struct RenderOperation {
    name: String,
    operation_type: OperationType,
    attachment_size: ImageSize,
    multi_view_mask: u32,
    enabled: bool,
    entries: Vec<(String, RenderOperationEntry)>,
    entry_lookup: HashMap<String, EntryId>,
    node: Option<Weak<dyn RenderOperationNode>>,
}

impl fmt::Debug for RenderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOperation")
            .field("name", &self.name)
            .field("operation_type", &self.operation_type)
            .field("attachment_size", &self.attachment_size)
            .field("multi_view_mask", &self.multi_view_mask)
            .field("enabled", &self.enabled)
            .field("entries", &self.entries)
            .field("has_node", &self.node.is_some())
            .finish()
    }
}

impl RenderOperation {
    pub fn new(name: impl Into<String>, operation_type: OperationType) -> Self {
        Self {
            name: name.into(),
            operation_type,
            attachment_size: ImageSize::default(),
            multi_view_mask: 0,
            enabled: true,
            entries: Vec::new(),
            entry_lookup: HashMap::default(),
            node: None,
        }
    }

    pub fn graphics(name: impl Into<String>) -> Self {
        Self::new(name, OperationType::Graphics)
    }

    pub fn compute(name: impl Into<String>) -> Self {
        Self::new(name, OperationType::Compute)
    }

    pub fn with_attachment_size(mut self, attachment_size: ImageSize) -> Self {
        self.attachment_size = attachment_size;
        self
    }

    pub fn with_multi_view_mask(mut self, multi_view_mask: u32) -> Self {
        self.multi_view_mask = multi_view_mask;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    #[inline]
    pub fn attachment_size(&self) -> &ImageSize {
        &self.attachment_size
    }

    #[inline]
    pub fn multi_view_mask(&self) -> u32 {
        self.multi_view_mask
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn add_attachment_input(
        &mut self,
        entry_name: &str,
        resource_definition: ResourceDefinition,
        load_op: LoadOp,
    ) -> Result<&mut RenderOperationEntry> {
        let usage = ImageEntryUsage::new(load_op, whole_image_range(wgpu::TextureAspect::All), wgpu::TextureUses::RESOURCE);
        self.insert_entry(entry_name, EntryKind::AttachmentInput, resource_definition, EntryUsage::Image(usage))
    }

    pub fn add_attachment_output(
        &mut self,
        entry_name: &str,
        resource_definition: ResourceDefinition,
        load_op: LoadOp,
    ) -> Result<&mut RenderOperationEntry> {
        let usage = ImageEntryUsage::new(load_op, whole_image_range(wgpu::TextureAspect::All), wgpu::TextureUses::COLOR_TARGET);
        self.insert_entry(entry_name, EntryKind::AttachmentOutput, resource_definition, EntryUsage::Image(usage))
    }

    /// Multisample resolve target. `source_entry_name` must name an entry of this operation,
    /// which is checked when the graph is completed.
    pub fn add_attachment_resolve_output(
        &mut self,
        entry_name: &str,
        resource_definition: ResourceDefinition,
        load_op: LoadOp,
        source_entry_name: &str,
    ) -> Result<&mut RenderOperationEntry> {
        let mut usage = ImageEntryUsage::new(load_op, whole_image_range(wgpu::TextureAspect::All), wgpu::TextureUses::COLOR_TARGET);
        usage.resolve_source_entry_name = resolve_source(source_entry_name);
        self.insert_entry(entry_name, EntryKind::AttachmentResolveOutput, resource_definition, EntryUsage::Image(usage))
    }

    pub fn set_attachment_depth_input(
        &mut self,
        entry_name: &str,
        resource_definition: ResourceDefinition,
        load_op: LoadOp,
    ) -> Result<&mut RenderOperationEntry> {
        self.ensure_single_depth(EntryKind::AttachmentDepthInput, "input")?;
        let usage = ImageEntryUsage::new(load_op, depth_range(), wgpu::TextureUses::DEPTH_STENCIL_READ);
        self.insert_entry(entry_name, EntryKind::AttachmentDepthInput, resource_definition, EntryUsage::Image(usage))
    }

    pub fn set_attachment_depth_output(
        &mut self,
        entry_name: &str,
        resource_definition: ResourceDefinition,
        load_op: LoadOp,
    ) -> Result<&mut RenderOperationEntry> {
        self.ensure_single_depth(EntryKind::AttachmentDepthOutput, "output")?;
        let usage = ImageEntryUsage::new(load_op, depth_range(), wgpu::TextureUses::DEPTH_STENCIL_WRITE);
        self.insert_entry(entry_name, EntryKind::AttachmentDepthOutput, resource_definition, EntryUsage::Image(usage))
    }

    pub fn add_image_input(
        &mut self,
        entry_name: &str,
        resource_definition: ResourceDefinition,
        load_op: LoadOp,
    ) -> Result<&mut RenderOperationEntry> {
        let usage = ImageEntryUsage::new(load_op, whole_image_range(wgpu::TextureAspect::All), wgpu::TextureUses::UNINITIALIZED);
        self.insert_entry(entry_name, EntryKind::ImageInput, resource_definition, EntryUsage::Image(usage))
    }

    pub fn add_image_output(
        &mut self,
        entry_name: &str,
        resource_definition: ResourceDefinition,
        load_op: LoadOp,
    ) -> Result<&mut RenderOperationEntry> {
        let usage = ImageEntryUsage::new(load_op, whole_image_range(wgpu::TextureAspect::All), wgpu::TextureUses::UNINITIALIZED);
        self.insert_entry(entry_name, EntryKind::ImageOutput, resource_definition, EntryUsage::Image(usage))
    }

    pub fn add_buffer_input(
        &mut self,
        entry_name: &str,
        resource_definition: ResourceDefinition,
    ) -> Result<&mut RenderOperationEntry> {
        self.insert_entry(entry_name, EntryKind::BufferInput, resource_definition, EntryUsage::Buffer(BufferEntryUsage::default()))
    }

    pub fn add_buffer_output(
        &mut self,
        entry_name: &str,
        resource_definition: ResourceDefinition,
    ) -> Result<&mut RenderOperationEntry> {
        self.insert_entry(entry_name, EntryKind::BufferOutput, resource_definition, EntryUsage::Buffer(BufferEntryUsage::default()))
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &str, &RenderOperationEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, (name, entry))| (EntryId(index as u32), name.as_str(), entry))
    }

    /// Entries whose role matches `entry_types`, in insertion order.
    pub fn get_entries(&self, entry_types: OperationEntryTypes) -> impl Iterator<Item = (EntryId, &str, &RenderOperationEntry)> {
        self.entries()
            .filter(move |(_, _, entry)| entry.kind().matches(entry_types))
    }

    pub fn entry(&self, entry_name: &str) -> Option<&RenderOperationEntry> {
        self.entry_id(entry_name).map(|id| self.entry_by_id(id))
    }

    pub fn entry_id(&self, entry_name: &str) -> Option<EntryId> {
        self.entry_lookup.get(entry_name).copied()
    }

    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry_by_id(&self, id: EntryId) -> &RenderOperationEntry {
        &self.entries[id.index()].1
    }

    pub(crate) fn entry_name_by_id(&self, id: EntryId) -> &str {
        &self.entries[id.index()].0
    }

    pub fn set_render_operation_node(&mut self, node: &Arc<dyn RenderOperationNode>) {
        self.node = Some(Arc::downgrade(node));
    }

    /// The attached node, if one was set and its owner still keeps it alive.
    pub fn render_operation_node(&self) -> Option<Arc<dyn RenderOperationNode>> {
        self.node.as_ref().and_then(Weak::upgrade)
    }

    fn ensure_single_depth(&self, kind: EntryKind, role: &'static str) -> Result<()> {
        if let Some((_, existing, _)) = self.entries().find(|(_, _, entry)| entry.kind() == kind) {
            return Err(RenderGraphError::DuplicateDepthEntry {
                operation: self.name.clone(),
                role,
                existing: existing.to_owned(),
            });
        }
        Ok(())
    }

    fn insert_entry(
        &mut self,
        entry_name: &str,
        kind: EntryKind,
        resource_definition: ResourceDefinition,
        usage: EntryUsage,
    ) -> Result<&mut RenderOperationEntry> {
        if self.entry_lookup.contains_key(entry_name) {
            return Err(RenderGraphError::DuplicateEntry {
                operation: self.name.clone(),
                entry: entry_name.to_owned(),
            });
        }

        let id = EntryId(self.entries.len() as u32);
        self.entry_lookup.insert(entry_name.to_owned(), id);
        self.entries.push((
            entry_name.to_owned(),
            RenderOperationEntry {
                kind,
                resource_definition,
                usage,
            },
        ));

        Ok(&mut self.entries[id.index()].1)
    }
}

/// An empty source name means the resolve has no source.
fn resolve_source(source_entry_name: &str) -> Option<String> {
    (!source_entry_name.is_empty()).then(|| source_entry_name.to_owned())
}

fn depth_range() -> wgpu::ImageSubresourceRange {
    wgpu::ImageSubresourceRange {
        aspect: wgpu::TextureAspect::DepthOnly,
        base_mip_level: 0,
        mip_level_count: Some(1),
        base_array_layer: 0,
        array_layer_count: Some(1),
    }
}
