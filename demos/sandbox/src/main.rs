// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Vesta Sandbox
// Builds a small deferred renderer on a recording device and renders a few
// frames, logging what reached the device.

use anyhow::{Context, Result};
use vesta_core::device::{
    Capability, ClearRequest, ColorAttachment, FramebufferHandle, FramebufferTarget,
    ProgramHandle, TextureHandle, VertexArrayHandle, Viewport,
};
use vesta_core::{ComponentId, RenderSettings, ResourceId};
use vesta_graph::operation::{
    BindTexture, ClearFramebuffer, DrawMesh, MeshSource, SetCapability, ShaderInput,
    TextureSource,
};
use vesta_graph::{
    FrameBufferStage, NodePass, OperationList, PassRef, RenderManager, ShaderProgramPass,
};
use vesta_infra::{CpuTimestampQueries, RecordingDevice};
use vesta_telemetry::init_logging;

const FRAMES: u64 = 4;

const GBUFFER: FramebufferHandle = FramebufferHandle(1);
const ALBEDO: TextureHandle = TextureHandle(10);
const NORMALS: TextureHandle = TextureHandle(11);
const DEPTH: TextureHandle = TextureHandle(12);

const GEOMETRY_PROGRAM: ProgramHandle = ProgramHandle(1);
const LIGHTING_PROGRAM: ProgramHandle = ProgramHandle(2);

/// One drawable of the scene: the component backing it, its mesh and its
/// diffuse texture.
struct Prop {
    name: &'static str,
    component: ComponentId,
    vertex_array: VertexArrayHandle,
    index_count: u32,
    diffuse: TextureHandle,
}

const PROPS: [Prop; 3] = [
    Prop {
        name: "crate",
        component: ComponentId(1),
        vertex_array: VertexArrayHandle(1),
        index_count: 36,
        diffuse: TextureHandle(20),
    },
    Prop {
        name: "barrel",
        component: ComponentId(2),
        vertex_array: VertexArrayHandle(2),
        index_count: 360,
        diffuse: TextureHandle(20),
    },
    Prop {
        name: "lamp",
        component: ComponentId(3),
        vertex_array: VertexArrayHandle(3),
        index_count: 96,
        diffuse: TextureHandle(21),
    },
];

fn build_scene(manager: &mut RenderManager) -> Result<()> {
    let graph = manager.graph_mut();

    // G-buffer: every prop writes albedo, normals and depth.
    let gbuffer = graph.add_stage(FrameBufferStage::new("gbuffer"));
    graph.set_framebuffer(
        gbuffer,
        FramebufferTarget::Both,
        GBUFFER,
        vec![ColorAttachment(0), ColorAttachment(1)],
    )?;
    graph.push_operation(
        PassRef::Stage(gbuffer),
        OperationList::Startup,
        SetCapability::enable(Capability::DepthTest),
    )?;
    graph.push_operation(
        PassRef::Stage(gbuffer),
        OperationList::Startup,
        ClearFramebuffer::new(ClearRequest::color_and_depth([0.0, 0.0, 0.0, 1.0])).of(GBUFFER),
    )?;
    let geometry = graph.add_program_pass(
        gbuffer,
        ShaderProgramPass::new("geometry")
            .writing(ResourceId::Texture(ALBEDO))
            .writing(ResourceId::Texture(NORMALS))
            .writing(ResourceId::Texture(DEPTH)),
    )?;
    graph.set_program(geometry, GEOMETRY_PROGRAM)?;
    for prop in &PROPS {
        let node = graph.add_node_pass(geometry, NodePass::new(prop.name))?;
        graph.push_operation(
            PassRef::Node(node),
            OperationList::Operations,
            BindTexture::new(
                Some(TextureSource::new(prop.diffuse).owned_by(prop.component)),
                Some(ShaderInput::new(GEOMETRY_PROGRAM, 0, 0)),
            ),
        )?;
        graph.push_operation(
            PassRef::Node(node),
            OperationList::Operations,
            DrawMesh::new(Some(
                MeshSource::indexed(prop.vertex_array, prop.index_count).owned_by(prop.component),
            )),
        )?;
    }

    // Lighting: a fullscreen pass reading the g-buffer into the screen.
    let lighting = graph.add_stage(FrameBufferStage::new("lighting"));
    graph.set_framebuffer(lighting, FramebufferTarget::Both, FramebufferHandle::NONE, Vec::new())?;
    graph.push_operation(
        PassRef::Stage(lighting),
        OperationList::Startup,
        SetCapability::disable(Capability::DepthTest),
    )?;
    let resolve = graph.add_program_pass(lighting, ShaderProgramPass::new("resolve"))?;
    graph.set_program(resolve, LIGHTING_PROGRAM)?;
    let quad = graph.add_node_pass(resolve, NodePass::new("fullscreen-quad"))?;
    for (unit, texture) in [ALBEDO, NORMALS, DEPTH].into_iter().enumerate() {
        let unit = unit as u32;
        graph.push_operation(
            PassRef::Node(quad),
            OperationList::Operations,
            BindTexture::new(
                Some(TextureSource::new(texture)),
                Some(ShaderInput::new(LIGHTING_PROGRAM, unit as i32, unit)),
            ),
        )?;
    }
    graph.push_operation(
        PassRef::Node(quad),
        OperationList::Operations,
        DrawMesh::new(Some(MeshSource::indexed(VertexArrayHandle(100), 6))),
    )?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging(log::LevelFilter::Info);

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/sandbox.ron").to_owned());
    let settings = RenderSettings::load(&path)
        .with_context(|| format!("loading sandbox settings from '{path}'"))?;
    let (width, height) = settings.screen_resolution;

    let device = RecordingDevice::new();
    let mut manager = RenderManager::new(Box::new(device.clone()), settings)
        .with_timestamp_queries(Box::new(CpuTimestampQueries::default()));
    manager.set_viewport(Viewport::from_size(width, height))?;
    build_scene(&mut manager)?;

    for frame in 1..=FRAMES {
        if frame == 3 {
            // The lamp leaves the scene between frames.
            let pruned = manager.on_remove_component(ComponentId(3));
            log::info!("Lamp removed, {pruned} operations pruned");
        }
        device.clear();
        let stats = manager.render_frame().clone();
        log::info!(
            "Frame {}: {} ops planned, {} device calls, {} skipped, reoptimized={}",
            stats.frame_number,
            stats.operations_planned,
            stats.device_calls_issued,
            stats.redundant_calls_skipped,
            stats.reoptimized,
        );
        for (pass, ms) in manager.pass_durations() {
            log::info!("  {pass}: {ms:.3} ms");
        }
    }

    log::info!(
        "Rendered {FRAMES} frames with '{}' at {:?}",
        manager.optimizer_name(),
        manager.render_resolution()
    );
    manager.shutdown();
    Ok(())
}
