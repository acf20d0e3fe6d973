use bitflags::bitflags;
use glam::Vec4;

bitflags! {
    /// Filterable role flags of operation entries.
    ///
    /// Every entry carries exactly one [`EntryKind`]; the composite constants are query filters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OperationEntryTypes: u32 {
        const ATTACHMENT_INPUT = 1;
        const ATTACHMENT_OUTPUT = 1 << 1;
        const ATTACHMENT_RESOLVE_OUTPUT = 1 << 2;
        const ATTACHMENT_DEPTH_OUTPUT = 1 << 3;
        const ATTACHMENT_DEPTH_INPUT = 1 << 4;
        const BUFFER_INPUT = 1 << 5;
        const BUFFER_OUTPUT = 1 << 6;
        const IMAGE_INPUT = 1 << 7;
        const IMAGE_OUTPUT = 1 << 8;

        const ALL_ATTACHMENTS = Self::ATTACHMENT_INPUT.bits()
            | Self::ATTACHMENT_OUTPUT.bits()
            | Self::ATTACHMENT_RESOLVE_OUTPUT.bits()
            | Self::ATTACHMENT_DEPTH_INPUT.bits()
            | Self::ATTACHMENT_DEPTH_OUTPUT.bits();
        const ALL_IMAGES = Self::IMAGE_INPUT.bits() | Self::IMAGE_OUTPUT.bits();
        const ALL_BUFFERS = Self::BUFFER_INPUT.bits() | Self::BUFFER_OUTPUT.bits();
        const ALL_ATTACHMENT_INPUTS = Self::ATTACHMENT_INPUT.bits() | Self::ATTACHMENT_DEPTH_INPUT.bits();
        const ALL_ATTACHMENT_OUTPUTS = Self::ATTACHMENT_OUTPUT.bits()
            | Self::ATTACHMENT_RESOLVE_OUTPUT.bits()
            | Self::ATTACHMENT_DEPTH_OUTPUT.bits();
        const ALL_INPUTS = Self::ALL_ATTACHMENT_INPUTS.bits()
            | Self::BUFFER_INPUT.bits()
            | Self::IMAGE_INPUT.bits();
        const ALL_OUTPUTS = Self::ALL_ATTACHMENT_OUTPUTS.bits()
            | Self::BUFFER_OUTPUT.bits()
            | Self::IMAGE_OUTPUT.bits();
        const ALL_INPUTS_OUTPUTS = Self::ALL_INPUTS.bits() | Self::ALL_OUTPUTS.bits();
    }
}

/// Role of a single entry inside its operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    AttachmentInput,
    AttachmentOutput,
    AttachmentResolveOutput,
    AttachmentDepthInput,
    AttachmentDepthOutput,
    BufferInput,
    BufferOutput,
    ImageInput,
    ImageOutput,
}

impl EntryKind {
    pub fn entry_type(self) -> OperationEntryTypes {
        match self {
            EntryKind::AttachmentInput => OperationEntryTypes::ATTACHMENT_INPUT,
            EntryKind::AttachmentOutput => OperationEntryTypes::ATTACHMENT_OUTPUT,
            EntryKind::AttachmentResolveOutput => OperationEntryTypes::ATTACHMENT_RESOLVE_OUTPUT,
            EntryKind::AttachmentDepthInput => OperationEntryTypes::ATTACHMENT_DEPTH_INPUT,
            EntryKind::AttachmentDepthOutput => OperationEntryTypes::ATTACHMENT_DEPTH_OUTPUT,
            EntryKind::BufferInput => OperationEntryTypes::BUFFER_INPUT,
            EntryKind::BufferOutput => OperationEntryTypes::BUFFER_OUTPUT,
            EntryKind::ImageInput => OperationEntryTypes::IMAGE_INPUT,
            EntryKind::ImageOutput => OperationEntryTypes::IMAGE_OUTPUT,
        }
    }

    #[inline]
    pub fn matches(self, filter: OperationEntryTypes) -> bool {
        filter.intersects(self.entry_type())
    }

    #[inline]
    pub fn is_input(self) -> bool {
        self.matches(OperationEntryTypes::ALL_INPUTS)
    }

    #[inline]
    pub fn is_output(self) -> bool {
        self.matches(OperationEntryTypes::ALL_OUTPUTS)
    }

    #[inline]
    pub fn is_buffer(self) -> bool {
        self.matches(OperationEntryTypes::ALL_BUFFERS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LoadOp {
    Load,
    Clear(Vec4),
    #[default]
    DontCare,
}

impl LoadOp {
    pub fn clear_color(color: Vec4) -> Self {
        LoadOp::Clear(color)
    }

    /// Depth goes to the first channel, stencil to the second.
    pub fn clear_depth(depth: f32, stencil: f32) -> Self {
        LoadOp::Clear(Vec4::new(depth, stencil, 0.0, 0.0))
    }

    pub fn clear_value(&self) -> Option<Vec4> {
        match self {
            LoadOp::Clear(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreOp {
    Store,
    #[default]
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationType {
    #[default]
    Graphics,
    Compute,
}

bitflags! {
    /// Extra creation flags requested for an image.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ImageCreateFlags: u32 {
        const CUBE_COMPATIBLE = 1;
        const ARRAY_2D_COMPATIBLE = 1 << 1;
        const MUTABLE_FORMAT = 1 << 2;
    }
}
