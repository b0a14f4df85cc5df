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

use super::{flatten, FramePlan, Optimizer, PlanStep};
use crate::operation::{OperationKind, StateAssignment, StateEffect, StateSlot, StateValue};
use crate::pass::{OperationId, OperationList, PassGraph, PassRef, ProgramPassId, StageId};
use std::collections::{HashMap, HashSet};
use vesta_core::device::{BufferTarget, Capability, ProgramHandle};
use vesta_core::graph::topological_sort_with;
use vesta_core::ResourceId;

/// Groups program passes by program and drops redundant state operations.
///
/// Inside each stage, program passes are put in a stable topological order.
/// Two passes keep their declared order when:
///
/// - one reads what the other writes, or both write the same resource;
/// - one draws with state the other sets (capabilities, masks, bindings...),
///   or both set state that outlives the stage;
/// - both draw and either one draws with blending on, depth testing off or
///   stencil testing on (or not known to be off/on);
/// - either holds an operation with an unknown effect.
///
/// Among the passes free to go next, one sharing the program of the pass just
/// placed is preferred.
///
/// The flattened plan is then simulated from an unknown device state; a state
/// operation whose every assignment already holds is dropped.
#[derive(Debug, Clone, Copy)]
pub struct StateSortingOptimizer {
    /// Reorder program passes inside stages.
    pub group_programs: bool,
    /// Drop state operations that change nothing.
    pub elide_redundant: bool,
}

impl Default for StateSortingOptimizer {
    fn default() -> Self {
        Self {
            group_programs: true,
            elide_redundant: true,
        }
    }
}

impl Optimizer for StateSortingOptimizer {
    fn name(&self) -> &'static str {
        "StateSorting"
    }

    fn optimize(&self, graph: &PassGraph, previous: &FramePlan) -> FramePlan {
        let frame = if self.group_programs {
            FrameFootprints::of(graph)
        } else {
            FrameFootprints::default()
        };
        let mut plan = flatten(graph, |stage, passes| {
            if self.group_programs {
                order_stage(graph, &frame, stage, passes)
            } else {
                passes
            }
        });
        if self.elide_redundant {
            let before = plan.steps.len();
            plan.steps = elide(graph, plan.steps);
            log::trace!(
                "StateSorting dropped {} of {} steps (previous plan had {})",
                before - plan.steps.len(),
                before,
                previous.steps.len()
            );
        }
        plan
    }
}

/// A slot an operation changed, with the value it left there. `None` when
/// the change is a side effect whose value is not known.
type SlotValues = HashMap<StateSlot, Option<StateValue>>;

/// One piece of work and the slots already set when it runs.
type WorkRecord = (OperationKind, HashSet<StateSlot>);

/// Records every slot an assignment changes, side effects included.
fn touch(slots: &mut SlotValues, assignment: &StateAssignment) {
    match assignment.slot {
        StateSlot::ReadFramebuffer | StateSlot::DrawFramebuffer => {
            slots.insert(StateSlot::Program, None);
            if assignment.slot == StateSlot::DrawFramebuffer {
                slots.insert(StateSlot::DrawBuffers, None);
            }
        }
        StateSlot::VertexArray => {
            slots.insert(StateSlot::Buffer(BufferTarget::ElementArrayBuffer), None);
        }
        StateSlot::BufferBase { target, .. } => {
            slots.insert(StateSlot::Buffer(target), Some(assignment.value.clone()));
        }
        _ => {}
    }
    slots.insert(assignment.slot, Some(assignment.value.clone()));
}

/// `true` if work of this kind depends on the value held by `slot`.
fn work_reads(kind: OperationKind, slot: &StateSlot) -> bool {
    match kind {
        OperationKind::ClearFramebuffer => matches!(
            slot,
            StateSlot::DrawFramebuffer
                | StateSlot::DrawBuffers
                | StateSlot::ColorMask
                | StateSlot::Capability(_)
        ),
        OperationKind::DispatchCompute => matches!(
            slot,
            StateSlot::Program
                | StateSlot::Texture { .. }
                | StateSlot::Sampler { .. }
                | StateSlot::Buffer(_)
                | StateSlot::BufferBase { .. }
                | StateSlot::Uniform { .. }
                | StateSlot::ImageUnit(_)
        ),
        _ => true,
    }
}

/// Capability values under which draws into the same framebuffer give the
/// same pixels in any order.
const ORDER_FREE_DRAWING: [(Capability, bool); 3] = [
    (Capability::Blend, false),
    (Capability::DepthTest, true),
    (Capability::StencilTest, false),
];

/// What a run of operations does to device state.
#[derive(Debug, Default)]
struct Effects {
    /// Slots changed, with the value left behind.
    leaves: SlotValues,
    /// Every piece of work submitted, in order.
    work: Vec<WorkRecord>,
    /// Slot values in place when the first work is submitted.
    before_work: Option<SlotValues>,
    unknown: bool,
}

impl Effects {
    fn record(&mut self, graph: &PassGraph, id: OperationId) {
        let Some(op) = graph.operation(id).filter(|op| op.is_valid()) else {
            return;
        };
        let kind = op.kind();
        match op.state_effect() {
            StateEffect::State(assignments) => {
                assignments.iter().for_each(|a| touch(&mut self.leaves, a));
                return;
            }
            StateEffect::Work(assignments) => {
                assignments.iter().for_each(|a| touch(&mut self.leaves, a));
            }
            StateEffect::Unknown => {
                self.unknown = true;
            }
        }
        if self.before_work.is_none() {
            self.before_work = Some(self.leaves.clone());
        }
        self.work.push((kind, self.leaves.keys().copied().collect()));
    }

    /// `true` if some work runs with the value an earlier operation left in
    /// `slot`.
    fn inherits(&self, slot: &StateSlot) -> bool {
        self.work
            .iter()
            .any(|(kind, set)| work_reads(*kind, slot) && !set.contains(slot))
    }
}

#[derive(Debug, Default)]
struct Footprint {
    program: Option<ProgramHandle>,
    reads: HashSet<ResourceId>,
    writes: HashSet<ResourceId>,
    effects: Effects,
}

impl Footprint {
    fn of(graph: &PassGraph, pass_id: ProgramPassId) -> Self {
        let mut footprint = Footprint::default();
        let Some(pass) = graph.program_pass(pass_id) else {
            return footprint;
        };
        footprint.program = pass.program();
        footprint.reads.extend(pass.declared_reads().iter().copied());
        footprint.writes.extend(pass.declared_writes().iter().copied());

        let own = PassRef::Program(pass_id);
        let mut ids: Vec<OperationId> = Vec::new();
        ids.extend_from_slice(graph.operations_of(own, OperationList::InternalStartup));
        ids.extend_from_slice(graph.operations_of(own, OperationList::Startup));
        for node in pass.node_passes() {
            if !graph.is_skipped(PassRef::Node(*node)) {
                ids.extend(graph.own_operations(PassRef::Node(*node)));
            }
        }
        ids.extend_from_slice(graph.operations_of(own, OperationList::Finish));
        ids.extend_from_slice(graph.operations_of(own, OperationList::InternalFinish));

        for id in ids {
            if let Some(op) = graph.operation(id) {
                footprint.reads.extend(op.reads());
                footprint.writes.extend(op.writes());
            }
            footprint.effects.record(graph, id);
        }
        footprint
    }

    fn must_precede(&self, later: &Footprint) -> bool {
        self.effects.unknown
            || later.effects.unknown
            || !self.writes.is_disjoint(&later.reads)
            || !self.reads.is_disjoint(&later.writes)
            || !self.writes.is_disjoint(&later.writes)
    }

    fn submits_work(&self) -> bool {
        !self.effects.work.is_empty()
    }

    /// `true` if the pass only draws, and with state under which its draws
    /// commute with other such draws. `seen` is the state it would inherit.
    fn draws_order_free(&self, seen: &SlotValues) -> bool {
        let Some(before_work) = &self.effects.before_work else {
            return true;
        };
        if self.effects.work.iter().any(|(kind, _)| *kind != OperationKind::DrawMesh) {
            return false;
        }
        ORDER_FREE_DRAWING.iter().all(|(capability, enabled)| {
            let slot = StateSlot::Capability(*capability);
            let value = before_work.get(&slot).or_else(|| seen.get(&slot));
            value == Some(&Some(StateValue::Enabled(*enabled)))
        })
    }
}

/// The stage lists that run before a stage's passes.
fn stage_prelude(graph: &PassGraph, stage: StageId) -> Effects {
    let own = PassRef::Stage(stage);
    let mut effects = Effects::default();
    for id in graph
        .operations_of(own, OperationList::InternalStartup)
        .iter()
        .chain(graph.operations_of(own, OperationList::Startup))
    {
        let known = !effects.unknown;
        effects.record(graph, *id);
        if known && effects.unknown {
            effects.leaves.clear();
        }
    }
    effects
}

/// Footprints of every pass the frame runs, and which state slots some work
/// of the frame reads without setting first.
#[derive(Debug, Default)]
struct FrameFootprints {
    passes: HashMap<ProgramPassId, Footprint>,
    preludes: HashMap<StageId, Effects>,
}

impl FrameFootprints {
    fn of(graph: &PassGraph) -> Self {
        let mut frame = FrameFootprints::default();
        for stage_id in graph.stages() {
            if graph.is_skipped(PassRef::Stage(*stage_id)) {
                continue;
            }
            frame.preludes.insert(*stage_id, stage_prelude(graph, *stage_id));
            let Some(stage) = graph.stage(*stage_id) else {
                continue;
            };
            for pass in stage.program_passes() {
                if !graph.is_skipped(PassRef::Program(*pass)) {
                    frame.passes.insert(*pass, Footprint::of(graph, *pass));
                }
            }
        }
        frame
    }

    /// `true` if the value a stage leaves in `slot` can reach later work,
    /// in this frame or the next.
    fn outlives_stage(&self, slot: &StateSlot) -> bool {
        self.passes.values().any(|pass| pass.effects.inherits(slot))
            || self.preludes.values().any(|prelude| prelude.inherits(slot))
    }
}

/// Ordering edges without duplicates, in the order they were found.
#[derive(Debug, Default)]
struct Edges {
    list: Vec<(ProgramPassId, ProgramPassId)>,
    seen: HashSet<(ProgramPassId, ProgramPassId)>,
}

impl Edges {
    fn add(&mut self, earlier: ProgramPassId, later: ProgramPassId) {
        if earlier != later && self.seen.insert((earlier, later)) {
            self.list.push((earlier, later));
        }
    }
}

/// Keeps every pass that runs on inherited state behind the pass it
/// inherits from, and keeps the last pass setting a slot last when the slot
/// outlives the stage.
fn state_edges(passes: &[(ProgramPassId, &Footprint)], frame: &FrameFootprints, edges: &mut Edges) {
    let mut slots: Vec<StateSlot> = Vec::new();
    for (_, footprint) in passes {
        for slot in footprint.effects.leaves.keys() {
            if !slots.contains(slot) {
                slots.push(*slot);
            }
        }
    }
    for slot in slots {
        let mut setters: Vec<ProgramPassId> = Vec::new();
        let mut inheritors: Vec<ProgramPassId> = Vec::new();
        for (pass, footprint) in passes {
            if footprint.effects.inherits(&slot) {
                if let Some((last, earlier)) = setters.split_last() {
                    edges.add(*last, *pass);
                    earlier.iter().for_each(|setter| edges.add(*setter, *last));
                }
                inheritors.push(*pass);
            }
            if footprint.effects.leaves.contains_key(&slot) {
                inheritors.iter().for_each(|reader| edges.add(*reader, *pass));
                setters.push(*pass);
            }
        }
        // Program passes bind their own program, and the next stage's
        // framebuffer bind drops it.
        if slot != StateSlot::Program && frame.outlives_stage(&slot) {
            if let Some((last, earlier)) = setters.split_last() {
                earlier.iter().for_each(|setter| edges.add(*setter, *last));
            }
        }
    }
}

/// Keeps work whose result depends on submission order in declared order
/// relative to every other pass that submits work.
fn work_order_edges(passes: &[(ProgramPassId, &Footprint)], mut seen: SlotValues, edges: &mut Edges) {
    let mut working: Vec<(ProgramPassId, bool)> = Vec::new();
    for (pass, footprint) in passes {
        if footprint.submits_work() {
            let free = footprint.draws_order_free(&seen);
            for (earlier, earlier_free) in &working {
                if !(free && *earlier_free) {
                    edges.add(*earlier, *pass);
                }
            }
            working.push((*pass, free));
        }
        if footprint.effects.unknown {
            seen.clear();
        }
        seen.extend(footprint.effects.leaves.iter().map(|(k, v)| (*k, v.clone())));
    }
}

fn order_stage(
    graph: &PassGraph,
    frame: &FrameFootprints,
    stage: StageId,
    passes: Vec<ProgramPassId>,
) -> Vec<ProgramPassId> {
    if passes.len() < 2 {
        return passes;
    }
    let empty = Footprint::default();
    let footprints: Vec<(ProgramPassId, &Footprint)> = passes
        .iter()
        .map(|id| (*id, frame.passes.get(id).unwrap_or(&empty)))
        .collect();

    let mut edges = Edges::default();
    for (i, (earlier, footprint)) in footprints.iter().enumerate() {
        for (later, later_footprint) in &footprints[i + 1..] {
            if footprint.must_precede(later_footprint) {
                edges.add(*earlier, *later);
            }
        }
    }
    state_edges(&footprints, frame, &mut edges);
    let entry = frame
        .preludes
        .get(&stage)
        .map(|prelude| prelude.leaves.clone())
        .unwrap_or_default();
    work_order_edges(&footprints, entry, &mut edges);

    let program_of = |id: &ProgramPassId| frame.passes.get(id).and_then(|f| f.program);
    let sorted = topological_sort_with(passes.iter().copied(), edges.list, |last, ready| {
        let Some(program) = last.and_then(program_of) else {
            return 0;
        };
        ready
            .iter()
            .position(|id| program_of(id) == Some(program))
            .unwrap_or(0)
    });
    match sorted {
        Ok(order) => order,
        Err(_) => {
            // Edges only go forward in insertion order, so this cannot
            // happen; keep the insertion order if it ever does.
            log::warn!(
                "Pass dependencies of stage '{}' form a cycle, keeping insertion order",
                graph.describe(PassRef::Stage(stage))
            );
            passes
        }
    }
}

/// Device state as far as the preceding operations of the plan tell.
#[derive(Debug, Default)]
struct Simulation {
    known: HashMap<StateSlot, StateValue>,
}

impl Simulation {
    fn holds(&self, assignment: &StateAssignment) -> bool {
        self.known.get(&assignment.slot) == Some(&assignment.value)
    }

    fn apply(&mut self, assignment: &StateAssignment) {
        if self.holds(assignment) {
            return;
        }
        match assignment.slot {
            StateSlot::ReadFramebuffer => {
                self.known.remove(&StateSlot::Program);
            }
            StateSlot::DrawFramebuffer => {
                self.known.remove(&StateSlot::Program);
                self.known.remove(&StateSlot::DrawBuffers);
            }
            StateSlot::VertexArray => {
                self.known
                    .remove(&StateSlot::Buffer(BufferTarget::ElementArrayBuffer));
            }
            StateSlot::BufferBase { target, .. } => {
                if let StateValue::Buffer(buffer) = assignment.value {
                    self.known
                        .insert(StateSlot::Buffer(target), StateValue::Buffer(buffer));
                }
            }
            _ => {}
        }
        self.known.insert(assignment.slot, assignment.value.clone());
    }

    fn clear(&mut self) {
        self.known.clear();
    }
}

fn elide(graph: &PassGraph, steps: Vec<PlanStep>) -> Vec<PlanStep> {
    let mut simulation = Simulation::default();
    let mut kept = Vec::with_capacity(steps.len());
    for step in steps {
        let PlanStep::Operation(id) = step else {
            kept.push(step);
            continue;
        };
        let Some(op) = graph.operation(id) else {
            continue;
        };
        if !op.is_valid() {
            // Executes as a no-op.
            kept.push(step);
            continue;
        }
        match op.state_effect() {
            StateEffect::State(assignments) => {
                if !assignments.is_empty() && assignments.iter().all(|a| simulation.holds(a)) {
                    continue;
                }
                assignments.iter().for_each(|a| simulation.apply(a));
            }
            StateEffect::Work(assignments) => {
                assignments.iter().for_each(|a| simulation.apply(a));
            }
            StateEffect::Unknown => simulation.clear(),
        }
        kept.push(step);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{
        BindTexture, DispatchCompute, DrawMesh, MeshSource, SetCapability, ShaderInput, TextureSource,
    };
    use crate::optimizer::SimpleOptimizer;
    use crate::pass::{FrameBufferStage, NodePass, OperationList, ShaderProgramPass};
    use vesta_core::device::{
        ColorAttachment, FramebufferHandle, FramebufferTarget, TextureHandle, VertexArrayHandle,
    };

    fn program_pass(graph: &mut PassGraph, stage: StageId, name: &str, program: u32) -> ProgramPassId {
        let pass = graph
            .add_program_pass(stage, ShaderProgramPass::new(name))
            .unwrap();
        graph.set_program(pass, ProgramHandle(program)).unwrap();
        pass
    }

    fn pass_order(plan: &FramePlan) -> Vec<ProgramPassId> {
        plan.steps()
            .iter()
            .filter_map(|step| match step {
                PlanStep::PassBegin(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn passes_sharing_a_program_become_adjacent() {
        let mut graph = PassGraph::new();
        let stage = graph.add_stage(FrameBufferStage::new("forward"));
        let a1 = program_pass(&mut graph, stage, "opaque", 1);
        let b = program_pass(&mut graph, stage, "skin", 2);
        let a2 = program_pass(&mut graph, stage, "props", 1);

        let plan = StateSortingOptimizer::default().optimize(&graph, &FramePlan::default());

        assert_eq!(pass_order(&plan), vec![a1, a2, b]);
        // The second UseProgram(1) is redundant once the passes are adjacent.
        assert_eq!(plan.operation_count(), 2);
    }

    #[test]
    fn pass_drawing_with_inherited_blending_is_not_hoisted() {
        let mut graph = PassGraph::new();
        let stage = graph.add_stage(FrameBufferStage::new("forward"));
        let mut passes = Vec::new();
        for (name, program, blend, vao) in [
            ("opaque", 1, Some(false), 1),
            ("transparent", 2, Some(true), 2),
            ("props", 1, None, 3),
        ] {
            let pass = program_pass(&mut graph, stage, name, program);
            if let Some(on) = blend {
                let op = if on {
                    SetCapability::enable(Capability::Blend)
                } else {
                    SetCapability::disable(Capability::Blend)
                };
                graph
                    .push_operation(PassRef::Program(pass), OperationList::Startup, op)
                    .unwrap();
            }
            let node = graph.add_node_pass(pass, NodePass::new(name)).unwrap();
            graph
                .push_operation(
                    PassRef::Node(node),
                    OperationList::Operations,
                    DrawMesh::new(Some(MeshSource::indexed(VertexArrayHandle(vao), 6))),
                )
                .unwrap();
            passes.push(pass);
        }

        let plan = StateSortingOptimizer::default().optimize(&graph, &FramePlan::default());

        assert_eq!(pass_order(&plan), passes);
    }

    #[test]
    fn depth_consumer_stays_after_depth_producer() {
        let mut graph = PassGraph::new();
        let stage = graph.add_stage(FrameBufferStage::new("deferred"));
        let depth = TextureHandle(40);

        let prepass = graph
            .add_program_pass(
                stage,
                ShaderProgramPass::new("depth-prepass").writing(ResourceId::Texture(depth)),
            )
            .unwrap();
        graph.set_program(prepass, ProgramHandle(1)).unwrap();
        let lighting = program_pass(&mut graph, stage, "lighting", 2);
        let lighting_node = graph.add_node_pass(lighting, NodePass::new("fullscreen")).unwrap();
        graph
            .push_operation(
                PassRef::Node(lighting_node),
                OperationList::Operations,
                BindTexture::new(
                    Some(TextureSource::new(depth)),
                    Some(ShaderInput::new(ProgramHandle(2), 0, 0)),
                ),
            )
            .unwrap();
        let decals = program_pass(&mut graph, stage, "decals", 1);

        let plan = StateSortingOptimizer::default().optimize(&graph, &FramePlan::default());

        assert_eq!(pass_order(&plan), vec![prepass, decals, lighting]);
    }

    #[test]
    fn writers_of_the_same_resource_keep_their_order() {
        let mut graph = PassGraph::new();
        let stage = graph.add_stage(FrameBufferStage::new("hud"));
        let target = ResourceId::Framebuffer(FramebufferHandle(3));
        let first = graph
            .add_program_pass(stage, ShaderProgramPass::new("text").writing(target))
            .unwrap();
        graph.set_program(first, ProgramHandle(1)).unwrap();
        let second = graph
            .add_program_pass(stage, ShaderProgramPass::new("icons").writing(target))
            .unwrap();
        graph.set_program(second, ProgramHandle(2)).unwrap();
        let third = graph
            .add_program_pass(stage, ShaderProgramPass::new("text-shadow").writing(target))
            .unwrap();
        graph.set_program(third, ProgramHandle(1)).unwrap();

        let plan = StateSortingOptimizer::default().optimize(&graph, &FramePlan::default());

        assert_eq!(pass_order(&plan), vec![first, second, third]);
    }

    #[test]
    fn framebuffer_switch_forgets_the_program() {
        let mut graph = PassGraph::new();
        for (name, fb) in [("shadow", 1), ("main", 2)] {
            let stage = graph.add_stage(FrameBufferStage::new(name));
            graph
                .set_framebuffer(stage, FramebufferTarget::Both, FramebufferHandle(fb), vec![ColorAttachment(0)])
                .unwrap();
            program_pass(&mut graph, stage, name, 7);
        }

        let plan = StateSortingOptimizer::default().optimize(&graph, &FramePlan::default());

        // Both binds and both UseProgram(7) survive.
        assert_eq!(plan.operation_count(), 4);
    }

    #[test]
    fn unknown_effects_reset_the_simulation() {
        let mut graph = PassGraph::new();
        let stage = graph.add_stage(FrameBufferStage::new("main"));
        let first = program_pass(&mut graph, stage, "a", 5);
        let node = graph.add_node_pass(first, NodePass::new("n")).unwrap();
        graph
            .push_operation(
                PassRef::Node(node),
                OperationList::Operations,
                crate::operation::FunctionOperation::new("raw", |_| Ok(())),
            )
            .unwrap();
        program_pass(&mut graph, stage, "b", 5);

        let plan = StateSortingOptimizer::default().optimize(&graph, &FramePlan::default());

        assert_eq!(plan.operation_count(), 3);
    }

    #[test]
    fn work_is_never_dropped() {
        let mut graph = PassGraph::new();
        let stage = graph.add_stage(FrameBufferStage::new("main"));
        let pass = program_pass(&mut graph, stage, "draw", 1);
        let node = graph.add_node_pass(pass, NodePass::new("quad")).unwrap();
        for _ in 0..2 {
            graph
                .push_operation(
                    PassRef::Node(node),
                    OperationList::Operations,
                    DrawMesh::new(Some(MeshSource::indexed(VertexArrayHandle(2), 6))),
                )
                .unwrap();
            graph
                .push_operation(PassRef::Node(node), OperationList::Operations, DispatchCompute::new([1, 1, 1]))
                .unwrap();
        }

        let sorted = StateSortingOptimizer::default().optimize(&graph, &FramePlan::default());
        let simple = SimpleOptimizer.optimize(&graph, &FramePlan::default());

        assert_eq!(sorted.steps(), simple.steps());
    }

    #[test]
    fn grouping_can_be_turned_off() {
        let mut graph = PassGraph::new();
        let stage = graph.add_stage(FrameBufferStage::new("forward"));
        let a1 = program_pass(&mut graph, stage, "opaque", 1);
        let b = program_pass(&mut graph, stage, "skin", 2);
        let a2 = program_pass(&mut graph, stage, "props", 1);
        let optimizer = StateSortingOptimizer {
            group_programs: false,
            elide_redundant: true,
        };

        let plan = optimizer.optimize(&graph, &FramePlan::default());

        assert_eq!(pass_order(&plan), vec![a1, b, a2]);
        assert_eq!(plan.operation_count(), 3);
    }
}
