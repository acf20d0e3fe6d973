mod builder;
mod error;
mod graph;
mod interface;
mod node;
mod resource;
mod transition;
mod traversal;

pub use error::{RenderGraphError, Result};
pub use resource::{
    DEFAULT_SWAPCHAIN_NAME, SizeKind, ImageSize, AttachmentType, ResourceMetaType, ComponentSwizzle, Swizzles,
    AttachmentDefinition, ResourceDefinition, BufferSubresourceRange, whole_image_range, image_ranges_overlap,
};
pub use interface::{OperationEntryTypes, EntryKind, LoadOp, StoreOp, OperationType, ImageCreateFlags};
pub use node::{
    OperationId, EntryId, RenderOperationNode, ImageEntryUsage, BufferEntryUsage, EntryUsage, RenderOperationEntry,
    RenderOperation, DEFAULT_BUFFER_ACCESS,
};
pub use transition::{TransitionId, TransitionEntryId, ResourceTransition, TransitionRef, ResourceTransitionDescription};
pub use graph::{RenderGraph, RenderGraphConfig, RenderGraphConfigBuilder};
pub use traversal::RenderOperationSet;
