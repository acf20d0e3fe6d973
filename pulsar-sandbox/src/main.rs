use std::any::Any;
use std::sync::Arc;
use glam::{Vec2, Vec4};
use pulsar_core::log::{info, warn};
use pulsar_rendergraph::{
    AttachmentType, ImageSize, LoadOp, OperationEntryTypes, RenderGraph, RenderOperation, RenderOperationNode,
    ResourceDefinition, ResourceTransitionDescription,
};

struct FullscreenNode {
    shader: &'static str,
}

impl RenderOperationNode for FullscreenNode {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn image(format: wgpu::TextureFormat, attachment_type: AttachmentType) -> ResourceDefinition {
    ResourceDefinition::image(format, ImageSize::default(), attachment_type)
}

fn build_deferred_graph() -> Result<RenderGraph, anyhow::Error> {
    let albedo = image(wgpu::TextureFormat::Rgba8Unorm, AttachmentType::Color);
    let normals = image(wgpu::TextureFormat::Rgba16Float, AttachmentType::Color);
    let depth = image(wgpu::TextureFormat::Depth32Float, AttachmentType::Depth);
    let occlusion = ResourceDefinition::image(
        wgpu::TextureFormat::R8Unorm,
        ImageSize::surface_dependent(Vec2::splat(0.5)),
        AttachmentType::Color,
    );
    let hdr = image(wgpu::TextureFormat::Rgba16Float, AttachmentType::Color).named("hdr");
    let camera = ResourceDefinition::buffer("camera");

    let mut graph = RenderGraph::new("deferred");
    let swapchain = graph.swapchain_definition(wgpu::TextureFormat::Bgra8UnormSrgb, 1);

    let mut gbuffer = RenderOperation::graphics("gbuffer");
    gbuffer.add_buffer_input("camera", camera.clone())?
        .with_pipeline_stage(wgpu::ShaderStages::VERTEX);
    gbuffer.add_attachment_output("albedo", albedo.clone(), LoadOp::clear_color(Vec4::ZERO))?;
    gbuffer.add_attachment_output("normals", normals.clone(), LoadOp::clear_color(Vec4::ZERO))?;
    gbuffer.set_attachment_depth_output("depth", depth.clone(), LoadOp::clear_depth(1.0, 0.0))?;
    graph.add_render_operation(gbuffer)?;

    let mut ssao = RenderOperation::compute("ssao");
    ssao.add_image_input("depth", depth, LoadOp::Load)?
        .with_image_usage(wgpu::TextureUsages::TEXTURE_BINDING);
    ssao.add_image_input("normals", normals.clone(), LoadOp::Load)?;
    ssao.add_image_output("occlusion", occlusion.clone(), LoadOp::DontCare)?
        .with_image_usage(wgpu::TextureUsages::STORAGE_BINDING);
    graph.add_render_operation(ssao)?;

    let mut lighting = RenderOperation::graphics("lighting");
    lighting.add_buffer_input("camera", camera)?;
    lighting.add_attachment_input("albedo", albedo, LoadOp::Load)?;
    lighting.add_attachment_input("normals", normals, LoadOp::Load)?;
    lighting.add_image_input("occlusion", occlusion, LoadOp::Load)?;
    lighting.add_attachment_output("hdr", hdr.clone(), LoadOp::DontCare)?;
    graph.add_render_operation(lighting)?;

    let mut tonemap = RenderOperation::graphics("tonemap");
    tonemap.add_attachment_input("hdr", hdr, LoadOp::Load)?;
    tonemap.add_attachment_output("color", swapchain, LoadOp::DontCare)?;
    graph.add_render_operation(tonemap)?;

    // camera uniforms are owned by the application and only read here
    graph.add_entry_transition("gbuffer", "camera", Some("camera-uniforms"))?;
    graph.add_entry_transition("lighting", "camera", Some("camera-uniforms"))?;
    graph.add_resource_transition("gbuffer", "depth", "ssao", "depth", None)?;
    graph.add_resource_transitions(
        &[
            ResourceTransitionDescription::new("gbuffer", "normals", "ssao", "normals"),
            ResourceTransitionDescription::new("gbuffer", "normals", "lighting", "normals"),
        ],
        None,
    )?;
    graph.add_resource_transition("gbuffer", "albedo", "lighting", "albedo", None)?;
    graph.add_resource_transition("ssao", "occlusion", "lighting", "occlusion", None)?;
    graph.add_resource_transition("lighting", "hdr", "tonemap", "hdr", None)?;
    let swapchain_name = graph.config().swapchain_name.clone();
    graph.add_entry_transition("tonemap", "color", Some(swapchain_name.as_str()))?;

    Ok(graph)
}

fn main() -> Result<(), anyhow::Error> {
    pulsar_core::log::initialize()?;

    let mut graph = build_deferred_graph()?;
    graph.add_missing_resource_transitions()?;

    let node: Arc<dyn RenderOperationNode> = Arc::new(FullscreenNode { shader: "tonemap.wgsl" });
    graph.set_render_operation_node("tonemap", &node)?;

    info!("Initial operations: {:?}", graph.initial_operations()?.names());
    info!("Final operations: {:?}", graph.final_operations()?.names());
    for name in graph.render_operation_names() {
        info!(
            "{name}: previous {:?}, next {:?}, depends on {:?}",
            graph.previous_operations(name)?.names(),
            graph.next_operations(name)?.names(),
            graph.all_previous_operations(name)?.names(),
        );
    }

    for transition in graph.transitions() {
        let producers = graph.transition_io(transition.tid(), OperationEntryTypes::ALL_OUTPUTS).len();
        info!(
            "rteid {:>2} tid {:>2} {}.{} [{:?}] external: {:?}, producers: {producers}",
            transition.rteid(),
            transition.tid(),
            transition.operation_name(),
            transition.entry_name(),
            transition.entry().kind(),
            transition.external_memory_object_name(),
        );
    }

    match graph
        .render_operation_node("tonemap")?
        .as_ref()
        .and_then(|node| node.as_any().downcast_ref::<FullscreenNode>())
    {
        Some(node) => info!("tonemap records with {}", node.shader),
        None => warn!("tonemap has no node attached"),
    }

    Ok(())
}
