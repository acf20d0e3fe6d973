use glam::{Vec2, Vec3};

/// Name the presentation surface is registered under unless a graph is configured otherwise.
pub const DEFAULT_SWAPCHAIN_NAME: &str = "SWAPCHAIN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeKind {
    Absolute,
    #[default]
    SurfaceDependent,
}

/// Logical size of an image.
///
/// For [`SizeKind::SurfaceDependent`] the `size` is a scale applied to the presentation surface
/// extent, for [`SizeKind::Absolute`] it is the extent in texels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub kind: SizeKind,
    pub size: Vec3,
    pub array_layers: u32,
    pub mip_levels: u32,
    pub samples: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            kind: SizeKind::SurfaceDependent,
            size: Vec3::ONE,
            array_layers: 1,
            mip_levels: 1,
            samples: 1,
        }
    }
}

impl ImageSize {
    pub fn absolute(width: u32, height: u32) -> Self {
        Self {
            kind: SizeKind::Absolute,
            size: Vec3::new(width as f32, height as f32, 1.0),
            ..Default::default()
        }
    }

    pub fn surface_dependent(scale: Vec2) -> Self {
        Self {
            kind: SizeKind::SurfaceDependent,
            size: scale.extend(1.0),
            ..Default::default()
        }
    }

    pub fn with_array_layers(mut self, array_layers: u32) -> Self {
        self.array_layers = array_layers;
        self
    }

    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    #[inline]
    pub fn is_surface_dependent(&self) -> bool {
        self.kind == SizeKind::SurfaceDependent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentType {
    #[default]
    Undefined,
    Color,
    Depth,
    DepthStencil,
    Stencil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceMetaType {
    Image,
    Buffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentSwizzle {
    Red,
    Green,
    Blue,
    Alpha,
    Zero,
    One,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swizzles {
    pub r: ComponentSwizzle,
    pub g: ComponentSwizzle,
    pub b: ComponentSwizzle,
    pub a: ComponentSwizzle,
}

impl Swizzles {
    pub const IDENTITY: Swizzles = Swizzles {
        r: ComponentSwizzle::Red,
        g: ComponentSwizzle::Green,
        b: ComponentSwizzle::Blue,
        a: ComponentSwizzle::Alpha,
    };
}

impl Default for Swizzles {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Shape of an image or attachment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachmentDefinition {
    pub format: wgpu::TextureFormat,
    pub size: ImageSize,
    pub attachment_type: AttachmentType,
    pub swizzles: Swizzles,
}

impl AttachmentDefinition {
    pub fn new(format: wgpu::TextureFormat, size: ImageSize, attachment_type: AttachmentType) -> Self {
        Self {
            format,
            size,
            attachment_type,
            swizzles: Swizzles::IDENTITY,
        }
    }
}

/// Identity of a resource, independent of the operations using it.
///
/// Two definitions describe the same physical resource when they compare equal:
/// - buffers are matched by name only, an anonymous buffer never matches anything;
/// - two images with the same name are the same resource;
/// - otherwise images are matched by attachment shape.
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    meta_type: ResourceMetaType,
    attachment: Option<AttachmentDefinition>,
    name: String,
}

impl ResourceDefinition {
    /// Definition of an image or attachment.
    pub fn image(format: wgpu::TextureFormat, size: ImageSize, attachment_type: AttachmentType) -> Self {
        Self {
            meta_type: ResourceMetaType::Image,
            attachment: Some(AttachmentDefinition::new(format, size, attachment_type)),
            name: String::new(),
        }
    }

    /// Definition of a buffer. Buffers have no shape, so they must be named to be shared.
    pub fn buffer(name: impl Into<String>) -> Self {
        Self {
            meta_type: ResourceMetaType::Buffer,
            attachment: None,
            name: name.into(),
        }
    }

    /// Definition of the presentation image registered under `name`.
    pub fn swapchain(name: impl Into<String>, format: wgpu::TextureFormat, array_layers: u32) -> Self {
        Self::image(
            format,
            ImageSize::default().with_array_layers(array_layers),
            AttachmentType::Color,
        )
        .named(name)
    }

    /// Turns this definition into an external resource supplied from outside the graph.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_swizzles(mut self, swizzles: Swizzles) -> Self {
        if let Some(attachment) = self.attachment.as_mut() {
            attachment.swizzles = swizzles;
        }
        self
    }

    #[inline]
    pub fn meta_type(&self) -> ResourceMetaType {
        self.meta_type
    }

    #[inline]
    pub fn attachment(&self) -> Option<&AttachmentDefinition> {
        self.attachment.as_ref()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        !self.name.is_empty()
    }

    /// Equality rule used when binding entries to one physical resource.
    ///
    /// With `strict_shapes` two named images must agree on both name and attachment shape.
    pub fn same_resource(&self, other: &ResourceDefinition, strict_shapes: bool) -> bool {
        if self.meta_type != other.meta_type {
            return false;
        }

        match self.meta_type {
            ResourceMetaType::Buffer => self.is_external() && self.name == other.name,
            ResourceMetaType::Image => {
                let same_shape = self.attachment == other.attachment;
                if !(self.is_external() && other.is_external()) {
                    return same_shape;
                }
                if self.name == other.name {
                    !strict_shapes || same_shape
                } else {
                    !strict_shapes && same_shape
                }
            }
        }
    }
}

impl PartialEq for ResourceDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.same_resource(other, false)
    }
}

/// Byte range of a buffer. `size == None` extends to the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferSubresourceRange {
    pub offset: wgpu::BufferAddress,
    pub size: Option<wgpu::BufferAddress>,
}

impl BufferSubresourceRange {
    pub fn new(offset: wgpu::BufferAddress, size: wgpu::BufferAddress) -> Self {
        Self {
            offset,
            size: Some(size),
        }
    }

    pub fn overlaps(&self, other: &BufferSubresourceRange) -> bool {
        spans_overlap(self.offset, self.size, other.offset, other.size)
    }
}

/// Whole-resource image range for the given aspect.
pub fn whole_image_range(aspect: wgpu::TextureAspect) -> wgpu::ImageSubresourceRange {
    wgpu::ImageSubresourceRange {
        aspect,
        ..Default::default()
    }
}

pub fn image_ranges_overlap(a: &wgpu::ImageSubresourceRange, b: &wgpu::ImageSubresourceRange) -> bool {
    aspects_overlap(a.aspect, b.aspect)
        && spans_overlap(
            a.base_mip_level as u64,
            a.mip_level_count.map(u64::from),
            b.base_mip_level as u64,
            b.mip_level_count.map(u64::from),
        )
        && spans_overlap(
            a.base_array_layer as u64,
            a.array_layer_count.map(u64::from),
            b.base_array_layer as u64,
            b.array_layer_count.map(u64::from),
        )
}

fn aspects_overlap(a: wgpu::TextureAspect, b: wgpu::TextureAspect) -> bool {
    a == wgpu::TextureAspect::All || b == wgpu::TextureAspect::All || a == b
}

fn spans_overlap(a_start: u64, a_count: Option<u64>, b_start: u64, b_count: Option<u64>) -> bool {
    let a_end = a_count.map_or(u64::MAX, |count| a_start.saturating_add(count));
    let b_end = b_count.map_or(u64::MAX, |count| b_start.saturating_add(count));
    a_start.max(b_start) < a_end.min(b_end)
}
