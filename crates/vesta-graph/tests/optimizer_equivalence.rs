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

//! The state-sorting optimizer must leave the device in the same state at
//! every draw as plain flattening does.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::collections::HashMap;
use vesta_core::device::{
    Capability, ColorAttachment, ColorMask, FramebufferHandle, FramebufferTarget, ProgramHandle,
    TextureHandle, VertexArrayHandle,
};
use vesta_core::{OptimizerKind, RenderSettings};
use vesta_graph::operation::{
    BindTexture, DrawMesh, MeshSource, SetCapability, ShaderInput, TextureSource,
};
use vesta_graph::{
    FrameBufferStage, NodePass, OperationList, PassGraph, PassRef, ProgramPassId, RenderManager,
    ShaderProgramPass, StageId,
};
use vesta_infra::{DeviceCall, RecordingDevice};

/// Device state as seen by one draw.
#[derive(Debug, Clone, Default, PartialEq)]
struct DrawState {
    vertex_array: Option<VertexArrayHandle>,
    framebuffer: Option<FramebufferHandle>,
    program: Option<ProgramHandle>,
    active_unit: u32,
    textures: HashMap<u32, TextureHandle>,
    capabilities: HashMap<Capability, bool>,
    color_mask: Option<ColorMask>,
    uniforms: HashMap<(Option<ProgramHandle>, i32), i32>,
}

impl DrawState {
    fn capability(&self, capability: Capability) -> Option<bool> {
        self.capabilities.get(&capability).copied()
    }

    /// Draws with this state give the same pixels whatever their order.
    fn order_free(&self) -> bool {
        self.capability(Capability::Blend) == Some(false)
            && self.capability(Capability::DepthTest) == Some(true)
            && self.capability(Capability::StencilTest) == Some(false)
    }
}

/// Replays the recorded calls and returns the state at every draw, in order.
fn draw_states(calls: &[DeviceCall]) -> Vec<DrawState> {
    let mut state = DrawState::default();
    let mut draws = Vec::new();
    for call in calls {
        match call {
            DeviceCall::ActiveTexture(unit) => state.active_unit = *unit,
            DeviceCall::BindTexture { texture, .. } => {
                state.textures.insert(state.active_unit, *texture);
            }
            DeviceCall::BindFramebuffer { target, framebuffer } => {
                if *target != FramebufferTarget::Read {
                    state.framebuffer = Some(*framebuffer);
                }
            }
            DeviceCall::BindVertexArray(vao) => state.vertex_array = Some(*vao),
            DeviceCall::UseProgram(program) => state.program = Some(*program),
            DeviceCall::SetCapability { capability, enabled } => {
                state.capabilities.insert(*capability, *enabled);
            }
            DeviceCall::SetColorMask(mask) => state.color_mask = Some(*mask),
            DeviceCall::SetUniformI32 { location, value } => {
                state.uniforms.insert((state.program, *location), *value);
            }
            DeviceCall::Draw(_) => draws.push(state.clone()),
            _ => {}
        }
    }
    draws
}

fn render_once(kind: OptimizerKind, build: &dyn Fn(&mut PassGraph)) -> Vec<DrawState> {
    let device = RecordingDevice::new();
    let settings = RenderSettings {
        optimizer: kind,
        ..RenderSettings::default()
    };
    let mut manager = RenderManager::new(Box::new(device.clone()), settings);
    build(manager.graph_mut());
    manager.render_frame();
    draw_states(&device.calls())
}

fn vertex_arrays(draws: &[DrawState]) -> Vec<u32> {
    draws
        .iter()
        .filter_map(|draw| draw.vertex_array.map(|vao| vao.0))
        .collect()
}

fn by_vertex_array(draws: &[DrawState]) -> HashMap<Option<VertexArrayHandle>, DrawState> {
    draws
        .iter()
        .map(|draw| (draw.vertex_array, draw.clone()))
        .collect()
}

/// Asserts every draw sees the same state under both optimizers, and draws
/// whose result depends on their order keep it.
fn assert_equivalent(simple: &[DrawState], sorted: &[DrawState]) {
    assert_eq!(simple.len(), sorted.len());
    assert_eq!(by_vertex_array(simple), by_vertex_array(sorted));

    let position: HashMap<_, _> = sorted
        .iter()
        .enumerate()
        .map(|(index, draw)| (draw.vertex_array, index))
        .collect();
    for (i, earlier) in simple.iter().enumerate() {
        for later in &simple[i + 1..] {
            if !(earlier.order_free() && later.order_free()) {
                assert!(
                    position[&earlier.vertex_array] < position[&later.vertex_array],
                    "{:?} moved after {:?}",
                    earlier.vertex_array,
                    later.vertex_array
                );
            }
        }
    }
}

fn stage(graph: &mut PassGraph, name: &str, framebuffer: u32) -> StageId {
    let stage = graph.add_stage(FrameBufferStage::new(name));
    graph
        .set_framebuffer(
            stage,
            FramebufferTarget::Both,
            FramebufferHandle(framebuffer),
            vec![ColorAttachment(0)],
        )
        .unwrap();
    stage
}

fn program_pass(graph: &mut PassGraph, stage: StageId, name: &str, program: u32) -> ProgramPassId {
    let pass = graph
        .add_program_pass(stage, ShaderProgramPass::new(name))
        .unwrap();
    graph.set_program(pass, ProgramHandle(program)).unwrap();
    pass
}

fn draw(graph: &mut PassGraph, pass: ProgramPassId, vao: u32) {
    let node = graph.add_node_pass(pass, NodePass::new("mesh")).unwrap();
    graph
        .push_operation(
            PassRef::Node(node),
            OperationList::Operations,
            DrawMesh::new(Some(MeshSource::indexed(VertexArrayHandle(vao), 6))),
        )
        .unwrap();
}

fn set(graph: &mut PassGraph, owner: PassRef, list: OperationList, capability: Capability, on: bool) {
    let op = if on {
        SetCapability::enable(capability)
    } else {
        SetCapability::disable(capability)
    };
    graph.push_operation(owner, list, op).unwrap();
}

#[test]
fn inherited_blending_survives_program_grouping() {
    // --- 1. ARRANGE ---
    let build = |graph: &mut PassGraph| {
        let main = stage(graph, "forward", 1);
        let opaque = program_pass(graph, main, "opaque", 1);
        set(graph, PassRef::Program(opaque), OperationList::Startup, Capability::Blend, false);
        draw(graph, opaque, 1);
        let transparent = program_pass(graph, main, "transparent", 2);
        set(graph, PassRef::Program(transparent), OperationList::Startup, Capability::Blend, true);
        draw(graph, transparent, 2);
        // Shares the opaque program but draws with the blending left on.
        let props = program_pass(graph, main, "props", 1);
        draw(graph, props, 3);
    };

    // --- 2. ACT ---
    let simple = render_once(OptimizerKind::Simple, &build);
    let sorted = render_once(OptimizerKind::StateSorting, &build);

    // --- 3. ASSERT ---
    assert_eq!(vertex_arrays(&sorted), vec![1, 2, 3]);
    assert_eq!(sorted[2].capability(Capability::Blend), Some(true));
    assert_equivalent(&simple, &sorted);
}

#[test]
fn order_free_passes_are_still_grouped() {
    // --- 1. ARRANGE ---
    let build = |graph: &mut PassGraph| {
        let main = stage(graph, "gbuffer", 1);
        let owner = PassRef::Stage(main);
        set(graph, owner, OperationList::Startup, Capability::Blend, false);
        set(graph, owner, OperationList::Startup, Capability::DepthTest, true);
        set(graph, owner, OperationList::Startup, Capability::StencilTest, false);
        for (name, program, vao) in [("rock", 1, 1), ("foliage", 2, 2), ("wall", 1, 3)] {
            let pass = program_pass(graph, main, name, program);
            draw(graph, pass, vao);
        }
    };

    // --- 2. ACT ---
    let simple = render_once(OptimizerKind::Simple, &build);
    let sorted = render_once(OptimizerKind::StateSorting, &build);

    // --- 3. ASSERT ---
    assert_eq!(vertex_arrays(&simple), vec![1, 2, 3]);
    assert_eq!(vertex_arrays(&sorted), vec![1, 3, 2]);
    assert_equivalent(&simple, &sorted);
}

#[test]
fn pass_setting_state_after_drawing_keeps_its_place() {
    // --- 1. ARRANGE ---
    let build = |graph: &mut PassGraph| {
        let main = stage(graph, "forward", 1);
        let sky = program_pass(graph, main, "sky", 1);
        draw(graph, sky, 1);
        // Leaves depth testing on for everything drawn after it.
        set(graph, PassRef::Program(sky), OperationList::Finish, Capability::DepthTest, true);
        let terrain = program_pass(graph, main, "terrain", 2);
        draw(graph, terrain, 2);
        let clouds = program_pass(graph, main, "clouds", 1);
        set(graph, PassRef::Program(clouds), OperationList::Startup, Capability::DepthTest, false);
        draw(graph, clouds, 3);
    };

    // --- 2. ACT ---
    let simple = render_once(OptimizerKind::Simple, &build);
    let sorted = render_once(OptimizerKind::StateSorting, &build);

    // --- 3. ASSERT ---
    assert_eq!(sorted[1].capability(Capability::DepthTest), Some(true));
    assert_equivalent(&simple, &sorted);
}

/// Builds a random layout: a few stages of passes that toggle capabilities
/// in their startup and finish lists, bind textures and draw.
fn random_layout(seed: u64) -> impl Fn(&mut PassGraph) {
    move |graph: &mut PassGraph| {
        const CAPABILITIES: [Capability; 3] =
            [Capability::Blend, Capability::DepthTest, Capability::StencilTest];
        let mut rng = StdRng::seed_from_u64(seed);
        let mut vao = 0;
        for stage_index in 0..rng.random_range(1..3u32) {
            let main = stage(graph, "stage", stage_index + 1);
            for capability in CAPABILITIES {
                if rng.random_range(0..3) == 0 {
                    let on = rng.random_range(0..2) == 0;
                    set(graph, PassRef::Stage(main), OperationList::Startup, capability, on);
                }
            }
            for _ in 0..rng.random_range(2..6) {
                let program = rng.random_range(1..4u32);
                let pass = program_pass(graph, main, "pass", program);
                let owner = PassRef::Program(pass);
                for _ in 0..rng.random_range(0..3) {
                    let capability = CAPABILITIES[rng.random_range(0..3usize)];
                    let on = rng.random_range(0..2) == 0;
                    set(graph, owner, OperationList::Startup, capability, on);
                }
                if rng.random_range(0..4) != 0 {
                    let node = graph.add_node_pass(pass, NodePass::new("mesh")).unwrap();
                    if rng.random_range(0..2) == 0 {
                        let unit = rng.random_range(0..2u32);
                        let texture = rng.random_range(10..13u32);
                        graph
                            .push_operation(
                                PassRef::Node(node),
                                OperationList::Operations,
                                BindTexture::new(
                                    Some(TextureSource::new(TextureHandle(texture))),
                                    Some(ShaderInput::new(ProgramHandle(program), unit as i32, unit)),
                                ),
                            )
                            .unwrap();
                    }
                    vao += 1;
                    graph
                        .push_operation(
                            PassRef::Node(node),
                            OperationList::Operations,
                            DrawMesh::new(Some(MeshSource::indexed(VertexArrayHandle(vao), 3))),
                        )
                        .unwrap();
                }
                if rng.random_range(0..4) == 0 {
                    let capability = CAPABILITIES[rng.random_range(0..3usize)];
                    let on = rng.random_range(0..2) == 0;
                    set(graph, owner, OperationList::Finish, capability, on);
                }
            }
        }
    }
}

#[test]
fn random_layouts_draw_with_identical_state() {
    for seed in 0..64 {
        let build = random_layout(seed);

        let simple = render_once(OptimizerKind::Simple, &build);
        let sorted = render_once(OptimizerKind::StateSorting, &build);

        assert_equivalent(&simple, &sorted);
    }
}
