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

use std::collections::HashSet;
use vesta_core::device::{
    BufferHandle, BufferTarget, ProgramHandle, TextureHandle, VertexArrayHandle,
};
use vesta_core::{ComponentId, RenderSettings};
use vesta_graph::operation::{
    BindBuffer, BindTexture, BufferSource, DispatchCompute, DrawMesh, FunctionOperation,
    MeshSource, ShaderInput, TextureSource,
};
use vesta_graph::{
    FrameBufferStage, NodePass, OperationId, OperationList, Optimizer, PassRef, PlanStep,
    RenderManager, ShaderProgramPass, SimpleOptimizer, StateSortingOptimizer,
};
use vesta_graph::optimizer::FramePlan;
use vesta_infra::RecordingDevice;

const DOOMED: ComponentId = ComponentId(7);
const SURVIVOR: ComponentId = ComponentId(8);

fn texture_op(texture: u32, owner: ComponentId) -> BindTexture {
    BindTexture::new(
        Some(TextureSource::new(TextureHandle(texture)).owned_by(owner)),
        Some(ShaderInput::new(ProgramHandle(1), 0, 0)),
    )
}

fn mesh_op(vao: u32, owner: ComponentId) -> DrawMesh {
    DrawMesh::new(Some(MeshSource::indexed(VertexArrayHandle(vao), 36).owned_by(owner)))
}

/// A stage with two program passes and operations of both components spread
/// over every user list. Returns the manager, the operations that depend on
/// [`DOOMED`] and those that do not.
fn populated() -> (RenderManager, HashSet<OperationId>, HashSet<OperationId>) {
    let mut manager = RenderManager::new(Box::new(RecordingDevice::new()), RenderSettings::default());
    let graph = manager.graph_mut();
    let stage = graph.add_stage(FrameBufferStage::new("scene"));
    let mut doomed = HashSet::new();
    let mut kept = HashSet::new();

    kept.insert(
        graph
            .push_operation(PassRef::Stage(stage), OperationList::Startup, DispatchCompute::new([4, 4, 1]))
            .unwrap(),
    );
    doomed.insert(
        graph
            .push_operation(
                PassRef::Stage(stage),
                OperationList::Finish,
                FunctionOperation::new("readback", |_| Ok(())).owned_by(DOOMED),
            )
            .unwrap(),
    );

    for (pass_name, program) in [("opaque", 1), ("transparent", 2)] {
        let pass = graph
            .add_program_pass(stage, ShaderProgramPass::new(pass_name))
            .unwrap();
        graph.set_program(pass, ProgramHandle(program)).unwrap();
        kept.extend(graph.own_operations(PassRef::Program(pass)));
        doomed.insert(
            graph
                .push_operation(
                    PassRef::Program(pass),
                    OperationList::Startup,
                    BindBuffer::new(
                        BufferTarget::ArrayBuffer,
                        Some(BufferSource::new(BufferHandle(program)).owned_by(DOOMED)),
                    ),
                )
                .unwrap(),
        );
        for (index, owner) in [DOOMED, SURVIVOR, DOOMED].into_iter().enumerate() {
            let node = graph
                .add_node_pass(pass, NodePass::new(format!("{pass_name}-{index}")))
                .unwrap();
            let texture = graph
                .push_operation(PassRef::Node(node), OperationList::Operations, texture_op(index as u32 + 10, owner))
                .unwrap();
            let draw = graph
                .push_operation(PassRef::Node(node), OperationList::Operations, mesh_op(index as u32 + 1, owner))
                .unwrap();
            let bucket = if owner == DOOMED { &mut doomed } else { &mut kept };
            bucket.insert(texture);
            bucket.insert(draw);
        }
    }
    (manager, doomed, kept)
}

fn plan_operations(plan: &FramePlan) -> HashSet<OperationId> {
    plan.operations().collect()
}

#[test]
fn removing_a_component_prunes_exactly_its_operations() {
    // --- 1. ARRANGE ---
    let (mut manager, doomed, kept) = populated();
    let total = manager.graph().operation_count();
    assert_eq!(total, doomed.len() + kept.len());

    // --- 2. ACT ---
    let pruned = manager.on_remove_component(DOOMED);

    // --- 3. ASSERT ---
    assert_eq!(pruned, doomed.len());
    assert_eq!(manager.graph().operation_count(), kept.len());
    for id in &kept {
        assert!(manager.graph().contains_operation(*id));
    }
    for id in &doomed {
        assert!(!manager.graph().contains_operation(*id));
    }

    // No optimizer ever plans an operation of the removed component.
    let optimizers: [Box<dyn Optimizer>; 2] =
        [Box::new(SimpleOptimizer), Box::new(StateSortingOptimizer::default())];
    for optimizer in optimizers {
        let plan = optimizer.optimize(manager.graph(), &FramePlan::default());
        let planned = plan_operations(&plan);
        assert!(planned.is_disjoint(&doomed), "{} kept a pruned operation", optimizer.name());
        for id in planned {
            let op = manager.graph().operation(id).unwrap();
            assert!(!op.depends_on(DOOMED));
        }
    }
}

#[test]
fn removal_is_synchronous_with_the_next_frame() {
    let (mut manager, doomed, _) = populated();
    manager.render_frame();
    let before = manager.current_plan().map(plan_operations).unwrap_or_default();
    assert!(!before.is_disjoint(&doomed));

    manager.on_remove_component(DOOMED);
    let stats = manager.render_frame().clone();

    assert!(stats.reoptimized);
    let after = manager.current_plan().map(plan_operations).unwrap_or_default();
    assert!(after.is_disjoint(&doomed));
}

#[test]
fn swapping_passes_is_a_pure_reorder() {
    // --- 1. ARRANGE ---
    let (mut manager, _, _) = populated();
    let stage = manager.graph().stages()[0];
    let passes = manager.graph().stage(stage).unwrap().program_passes().to_vec();
    let before = SimpleOptimizer.optimize(manager.graph(), &FramePlan::default());

    // --- 2. ACT ---
    assert!(manager.graph_mut().swap_program_passes(passes[0], passes[1]));
    let after = SimpleOptimizer.optimize(manager.graph(), &FramePlan::default());

    // --- 3. ASSERT ---
    assert_eq!(plan_operations(&before), plan_operations(&after));
    let begins = |plan: &FramePlan| -> Vec<_> {
        plan.steps()
            .iter()
            .filter_map(|step| match step {
                PlanStep::PassBegin(id) => Some(*id),
                _ => None,
            })
            .collect()
    };
    assert_eq!(begins(&before), vec![passes[0], passes[1]]);
    assert_eq!(begins(&after), vec![passes[1], passes[0]]);
}

#[test]
fn swapping_with_an_absent_pass_changes_nothing() {
    let (mut manager, _, _) = populated();
    let stage = manager.graph().stages()[0];
    let passes = manager.graph().stage(stage).unwrap().program_passes().to_vec();
    manager.remove_program_pass(passes[1]);
    let revision = manager.graph().revision();

    assert!(!manager.graph_mut().swap_program_passes(passes[0], passes[1]));
    assert_eq!(manager.graph().revision(), revision);
    assert_eq!(manager.graph().stage(stage).unwrap().program_passes(), &[passes[0]]);
}

#[test]
fn removing_a_program_pass_tears_down_its_binds() {
    // --- 1. ARRANGE ---
    let device = RecordingDevice::new();
    let mut manager = RenderManager::new(Box::new(device.clone()), RenderSettings::default());
    let stage = manager.graph_mut().add_stage(FrameBufferStage::new("scene"));
    let pass = manager
        .graph_mut()
        .add_program_pass(stage, ShaderProgramPass::new("opaque"))
        .unwrap();
    let node = manager.graph_mut().add_node_pass(pass, NodePass::new("crate")).unwrap();
    manager
        .graph_mut()
        .push_operation(PassRef::Node(node), OperationList::Operations, texture_op(5, SURVIVOR))
        .unwrap();
    manager.render_frame();
    device.clear();

    // --- 2. ACT ---
    let removed = manager.remove_program_pass(pass);

    // --- 3. ASSERT ---
    assert_eq!(removed, 1);
    assert!(!manager.graph().contains(PassRef::Node(node)));
    // The texture slot goes back to the neutral texture.
    assert_eq!(device.count("bind_texture"), 1);
    assert_eq!(
        manager
            .state()
            .cache()
            .texture(0, vesta_core::TextureTarget::Texture2D),
        Some(TextureHandle::NONE)
    );
}

#[test]
fn removing_a_node_keeps_its_siblings() {
    let (mut manager, _, _) = populated();
    let stage = manager.graph().stages()[0];
    let pass = manager.graph().stage(stage).unwrap().program_passes()[0];
    let nodes = manager.graph().program_pass(pass).unwrap().node_passes().to_vec();

    assert_eq!(manager.remove_node_pass(nodes[1]), 2);

    assert_eq!(
        manager.graph().program_pass(pass).unwrap().node_passes(),
        &[nodes[0], nodes[2]]
    );
    assert_eq!(manager.remove_node_pass(nodes[1]), 0);
}
