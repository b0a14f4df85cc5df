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

//! Optimizers: strategies that flatten the pass hierarchy into one ordered
//! plan per frame.
//!
//! Every optimizer walks the hierarchy depth first. Stages come in order,
//! then each stage's program passes, then each pass's node passes; every level
//! contributes its lists as
//! `internal_startup, startup, <children>, finish, internal_finish`. Run-once
//! passes that already executed are left out together with their children.
//! Strategies differ only in how they reorder program passes inside a stage
//! and in which operations they drop.

mod simple;
mod state_sorting;

pub use simple::SimpleOptimizer;
pub use state_sorting::StateSortingOptimizer;

use crate::pass::{ExecutionType, OperationId, OperationList, PassGraph, PassRef, ProgramPassId, StageId};
use std::fmt::Debug;
use vesta_core::OptimizerKind;

/// One step of a [`FramePlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanStep {
    /// Execute an operation.
    Operation(OperationId),
    /// A program pass starts. Used to scope profiling.
    PassBegin(ProgramPassId),
    /// A program pass ends.
    PassEnd(ProgramPassId),
}

/// The flattened, ordered work of one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    pub(crate) steps: Vec<PlanStep>,
    pub(crate) revision: u64,
    pub(crate) emitted: Vec<PassRef>,
    pub(crate) fired_once: Vec<PassRef>,
}

impl FramePlan {
    /// The steps, in execution order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// The graph revision the plan was built from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Every pass the plan walks through.
    pub fn emitted(&self) -> &[PassRef] {
        &self.emitted
    }

    /// The run-once passes the plan fires. Once they execute, the plan is
    /// stale.
    pub fn fired_once(&self) -> &[PassRef] {
        &self.fired_once
    }

    /// The operations of the plan, in execution order.
    pub fn operations(&self) -> impl Iterator<Item = OperationId> + '_ {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::Operation(id) => Some(*id),
            _ => None,
        })
    }

    /// Number of operation steps.
    pub fn operation_count(&self) -> usize {
        self.operations().count()
    }

    /// Returns `true` if the plan still describes `graph`: same revision and
    /// no pending run-once passes.
    pub fn is_current_for(&self, graph: &PassGraph) -> bool {
        self.revision == graph.revision() && self.fired_once.is_empty()
    }
}

/// A strategy turning the pass hierarchy into a frame plan.
pub trait Optimizer: Debug + Send {
    /// A short name for logs.
    fn name(&self) -> &'static str;

    /// Builds the plan for the coming frame.
    ///
    /// `previous` is the plan of the last optimized frame (empty on the first
    /// one). Replaying the returned plan must leave the device in the same
    /// state as running every operation of the hierarchy in walk order.
    fn optimize(&self, graph: &PassGraph, previous: &FramePlan) -> FramePlan;
}

/// Creates the optimizer selected in the settings.
pub fn from_kind(kind: OptimizerKind) -> Box<dyn Optimizer> {
    match kind {
        OptimizerKind::Simple => Box::new(SimpleOptimizer),
        OptimizerKind::StateSorting => Box::new(StateSortingOptimizer::default()),
    }
}

/// Walks the hierarchy in order, letting `order_passes` rearrange the visible
/// program passes of each stage.
pub(crate) fn flatten<F>(graph: &PassGraph, mut order_passes: F) -> FramePlan
where
    F: FnMut(StageId, Vec<ProgramPassId>) -> Vec<ProgramPassId>,
{
    let mut walk = Walk {
        graph,
        plan: FramePlan {
            revision: graph.revision(),
            ..FramePlan::default()
        },
    };

    for &stage_id in graph.stages() {
        let stage_ref = PassRef::Stage(stage_id);
        let Some(stage) = graph.stage(stage_id) else {
            continue;
        };
        if graph.is_skipped(stage_ref) {
            continue;
        }
        walk.enter(stage_ref);
        walk.lists(stage_ref, &[OperationList::InternalStartup, OperationList::Startup]);

        let visible: Vec<ProgramPassId> = stage
            .program_passes()
            .iter()
            .copied()
            .filter(|id| !graph.is_skipped(PassRef::Program(*id)))
            .collect();
        for pass_id in order_passes(stage_id, visible) {
            walk.program_pass(pass_id);
        }

        walk.lists(stage_ref, &[OperationList::Finish, OperationList::InternalFinish]);
    }
    walk.plan
}

struct Walk<'g> {
    graph: &'g PassGraph,
    plan: FramePlan,
}

impl Walk<'_> {
    fn enter(&mut self, pass: PassRef) {
        self.plan.emitted.push(pass);
        if self.graph.execution_type(pass) == Some(ExecutionType::Once) {
            self.plan.fired_once.push(pass);
        }
    }

    fn lists(&mut self, pass: PassRef, lists: &[OperationList]) {
        for list in lists {
            self.plan.steps.extend(
                self.graph
                    .operations_of(pass, *list)
                    .iter()
                    .map(|id| PlanStep::Operation(*id)),
            );
        }
    }

    fn program_pass(&mut self, pass_id: ProgramPassId) {
        let Some(pass) = self.graph.program_pass(pass_id) else {
            return;
        };
        let pass_ref = PassRef::Program(pass_id);
        self.enter(pass_ref);
        self.plan.steps.push(PlanStep::PassBegin(pass_id));
        self.lists(pass_ref, &[OperationList::InternalStartup, OperationList::Startup]);
        for &node_id in pass.node_passes() {
            let node_ref = PassRef::Node(node_id);
            if self.graph.is_skipped(node_ref) {
                continue;
            }
            self.enter(node_ref);
            self.lists(
                node_ref,
                &[
                    OperationList::InternalStartup,
                    OperationList::Startup,
                    OperationList::Operations,
                    OperationList::Finish,
                    OperationList::InternalFinish,
                ],
            );
        }
        self.lists(pass_ref, &[OperationList::Finish, OperationList::InternalFinish]);
        self.plan.steps.push(PlanStep::PassEnd(pass_id));
    }
}
