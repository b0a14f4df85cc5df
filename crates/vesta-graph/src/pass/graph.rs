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

use super::passes::{FrameBufferStage, NodePass, OperationLists, ShaderProgramPass};
use super::{
    ExecutionType, InsertPosition, NodePassId, OperationId, OperationList, PassRef,
    ProgramPassId, StageId,
};
use crate::operation::{BindFramebuffer, Operation, UseProgram};
use slotmap::SlotMap;
use vesta_core::device::{ColorAttachment, FramebufferHandle, FramebufferTarget, ProgramHandle};
use vesta_core::error::{RenderError, Result};
use vesta_core::ComponentId;

#[derive(Debug)]
struct OperationEntry {
    operation: Box<dyn Operation>,
    owner: PassRef,
    list: OperationList,
}

/// Owns the whole pass hierarchy and every operation in it.
///
/// Structural changes (adding, removing, swapping, reconnecting) bump the
/// [`revision`](Self::revision), which the render manager compares against
/// its last plan to decide whether to optimize again.
#[derive(Debug, Default)]
pub struct PassGraph {
    stages: SlotMap<StageId, FrameBufferStage>,
    program_passes: SlotMap<ProgramPassId, ShaderProgramPass>,
    node_passes: SlotMap<NodePassId, NodePass>,
    operations: SlotMap<OperationId, OperationEntry>,
    stage_order: Vec<StageId>,
    revision: u64,
}

impl PassGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter of structural changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // --- Lookup ---

    /// Stages, in execution order.
    pub fn stages(&self) -> &[StageId] {
        &self.stage_order
    }

    /// Returns a stage.
    pub fn stage(&self, id: StageId) -> Option<&FrameBufferStage> {
        self.stages.get(id)
    }

    /// Returns a program pass.
    pub fn program_pass(&self, id: ProgramPassId) -> Option<&ShaderProgramPass> {
        self.program_passes.get(id)
    }

    /// Returns a node pass.
    pub fn node_pass(&self, id: NodePassId) -> Option<&NodePass> {
        self.node_passes.get(id)
    }

    /// Returns `true` if the pass is part of the graph.
    pub fn contains(&self, pass: PassRef) -> bool {
        match pass {
            PassRef::Stage(id) => self.stages.contains_key(id),
            PassRef::Program(id) => self.program_passes.contains_key(id),
            PassRef::Node(id) => self.node_passes.contains_key(id),
        }
    }

    /// Returns `true` if the operation is part of the graph.
    pub fn contains_operation(&self, id: OperationId) -> bool {
        self.operations.contains_key(id)
    }

    /// Total number of operations, internal ones included.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Returns an operation.
    pub fn operation(&self, id: OperationId) -> Option<&(dyn Operation + 'static)> {
        self.operations.get(id).map(|entry| entry.operation.as_ref())
    }

    /// Returns an operation for reconnection. Counts as a structural change.
    pub fn operation_mut(&mut self, id: OperationId) -> Option<&mut (dyn Operation + 'static)> {
        if !self.operations.contains_key(id) {
            return None;
        }
        self.touch();
        self.operations
            .get_mut(id)
            .map(|entry| entry.operation.as_mut())
    }

    /// Returns an operation as its concrete type.
    pub fn operation_as<T: Operation>(&self, id: OperationId) -> Option<&T> {
        self.operation(id)?.downcast_ref::<T>()
    }

    /// Returns an operation as its concrete type, for reconnection.
    pub fn operation_as_mut<T: Operation>(&mut self, id: OperationId) -> Option<&mut T> {
        self.operation_mut(id)?.downcast_mut::<T>()
    }

    /// The pass and list holding an operation.
    pub fn operation_owner(&self, id: OperationId) -> Option<(PassRef, OperationList)> {
        self.operations
            .get(id)
            .map(|entry| (entry.owner, entry.list))
    }

    /// The operations of one list of a pass. Empty if the pass is unknown.
    pub fn operations_of(&self, pass: PassRef, list: OperationList) -> &[OperationId] {
        self.lists(pass)
            .map_or(&[][..], |lists| lists.get(list).as_slice())
    }

    /// Every operation of a pass, its own lists only, in list order.
    pub fn own_operations(&self, pass: PassRef) -> Vec<OperationId> {
        self.lists(pass)
            .map(|lists| lists.all().collect())
            .unwrap_or_default()
    }

    /// The execution type of a pass.
    pub fn execution_type(&self, pass: PassRef) -> Option<ExecutionType> {
        match pass {
            PassRef::Stage(id) => self.stages.get(id).map(|s| s.execution),
            PassRef::Program(id) => self.program_passes.get(id).map(|p| p.execution),
            PassRef::Node(id) => self.node_passes.get(id).map(|n| n.execution),
        }
    }

    /// Returns `true` if the pass runs once and already has.
    pub fn is_skipped(&self, pass: PassRef) -> bool {
        let (execution, executed) = match pass {
            PassRef::Stage(id) => match self.stages.get(id) {
                Some(s) => (s.execution, s.executed),
                None => return true,
            },
            PassRef::Program(id) => match self.program_passes.get(id) {
                Some(p) => (p.execution, p.executed),
                None => return true,
            },
            PassRef::Node(id) => match self.node_passes.get(id) {
                Some(n) => (n.execution, n.executed),
                None => return true,
            },
        };
        execution == ExecutionType::Once && executed
    }

    fn lists(&self, pass: PassRef) -> Option<&OperationLists> {
        match pass {
            PassRef::Stage(id) => self.stages.get(id).map(|s| &s.lists),
            PassRef::Program(id) => self.program_passes.get(id).map(|p| &p.lists),
            PassRef::Node(id) => self.node_passes.get(id).map(|n| &n.lists),
        }
    }

    fn lists_mut(&mut self, pass: PassRef) -> Option<&mut OperationLists> {
        match pass {
            PassRef::Stage(id) => self.stages.get_mut(id).map(|s| &mut s.lists),
            PassRef::Program(id) => self.program_passes.get_mut(id).map(|p| &mut p.lists),
            PassRef::Node(id) => self.node_passes.get_mut(id).map(|n| &mut n.lists),
        }
    }

    fn pass_name(&self, pass: PassRef) -> String {
        match pass {
            PassRef::Stage(id) => self.stages.get(id).map(|s| s.name.clone()),
            PassRef::Program(id) => self.program_passes.get(id).map(|p| p.name.clone()),
            PassRef::Node(id) => self.node_passes.get(id).map(|n| n.name.clone()),
        }
        .unwrap_or_else(|| format!("{pass:?}"))
    }

    // --- Insertion ---

    /// Appends a stage.
    pub fn add_stage(&mut self, stage: FrameBufferStage) -> StageId {
        let id = self.stages.insert(stage);
        self.stage_order.push(id);
        self.touch();
        id
    }

    /// Inserts a stage at `position`.
    pub fn insert_stage(
        &mut self,
        stage: FrameBufferStage,
        position: InsertPosition<StageId>,
    ) -> Result<StageId> {
        let index = resolve(&self.stage_order, position)
            .ok_or_else(|| missing_anchor(&stage.name, position))?;
        let id = self.stages.insert(stage);
        self.stage_order.insert(index, id);
        self.touch();
        Ok(id)
    }

    /// Appends a program pass to a stage.
    pub fn add_program_pass(
        &mut self,
        stage: StageId,
        pass: ShaderProgramPass,
    ) -> Result<ProgramPassId> {
        self.insert_program_pass(stage, pass, InsertPosition::Back)
    }

    /// Inserts a program pass into a stage at `position`.
    pub fn insert_program_pass(
        &mut self,
        stage: StageId,
        mut pass: ShaderProgramPass,
        position: InsertPosition<ProgramPassId>,
    ) -> Result<ProgramPassId> {
        let Some(parent) = self.stages.get(stage) else {
            return Err(RenderError::invalid_operation(pass.name, "unknown stage"));
        };
        let index =
            resolve(&parent.passes, position).ok_or_else(|| missing_anchor(&pass.name, position))?;
        pass.stage = stage;
        let id = self.program_passes.insert(pass);
        if let Some(parent) = self.stages.get_mut(stage) {
            parent.passes.insert(index, id);
        }
        self.touch();
        Ok(id)
    }

    /// Appends a node pass to a program pass.
    pub fn add_node_pass(&mut self, program_pass: ProgramPassId, node: NodePass) -> Result<NodePassId> {
        self.insert_node_pass(program_pass, node, InsertPosition::Back)
    }

    /// Inserts a node pass into a program pass at `position`.
    pub fn insert_node_pass(
        &mut self,
        program_pass: ProgramPassId,
        mut node: NodePass,
        position: InsertPosition<NodePassId>,
    ) -> Result<NodePassId> {
        let Some(parent) = self.program_passes.get(program_pass) else {
            return Err(RenderError::invalid_operation(node.name, "unknown program pass"));
        };
        let index =
            resolve(&parent.nodes, position).ok_or_else(|| missing_anchor(&node.name, position))?;
        node.program_pass = program_pass;
        let id = self.node_passes.insert(node);
        if let Some(parent) = self.program_passes.get_mut(program_pass) {
            parent.nodes.insert(index, id);
        }
        self.touch();
        Ok(id)
    }

    /// Appends an operation to a user list of a pass.
    pub fn push_operation(
        &mut self,
        owner: PassRef,
        list: OperationList,
        operation: impl Operation,
    ) -> Result<OperationId> {
        self.insert_operation(owner, list, operation, InsertPosition::Back)
    }

    /// Inserts an operation into a user list of a pass at `position`.
    ///
    /// # Errors
    /// [`RenderError::InvalidOperation`] if the pass is unknown, the list is
    /// internal, `Operations` is used on anything but a node pass, or the
    /// anchor is not in the list.
    pub fn insert_operation(
        &mut self,
        owner: PassRef,
        list: OperationList,
        operation: impl Operation,
        position: InsertPosition<OperationId>,
    ) -> Result<OperationId> {
        let operation: Box<dyn Operation> = Box::new(operation);
        if list.is_internal() {
            return Err(RenderError::invalid_operation(
                operation.label(),
                format!("{list:?} is managed by the graph"),
            ));
        }
        if list == OperationList::Operations && !matches!(owner, PassRef::Node(_)) {
            return Err(RenderError::invalid_operation(
                operation.label(),
                "only node passes hold an operation list, stages and program passes have children",
            ));
        }
        self.attach(owner, list, operation, position)
    }

    fn attach(
        &mut self,
        owner: PassRef,
        list: OperationList,
        operation: Box<dyn Operation>,
        position: InsertPosition<OperationId>,
    ) -> Result<OperationId> {
        let Some(lists) = self.lists(owner) else {
            return Err(RenderError::invalid_operation(
                operation.label(),
                format!("unknown owner {owner:?}"),
            ));
        };
        let index = resolve(lists.get(list), position)
            .ok_or_else(|| missing_anchor(&operation.label(), position))?;
        let id = self.operations.insert(OperationEntry {
            operation,
            owner,
            list,
        });
        if let Some(lists) = self.lists_mut(owner) {
            lists.get_mut(list).insert(index, id);
        }
        self.touch();
        Ok(id)
    }

    // --- Configuration ---

    /// Sets the framebuffer a stage renders into and the color attachments it
    /// was created with. All of them become active.
    ///
    /// Installs (or reconnects) the stage's internal framebuffer bind, so the
    /// framebuffer is bound before any of the stage's own operations.
    pub fn set_framebuffer(
        &mut self,
        stage: StageId,
        target: FramebufferTarget,
        framebuffer: FramebufferHandle,
        attachments: Vec<ColorAttachment>,
    ) -> Result<()> {
        let Some(entry) = self.stages.get_mut(stage) else {
            return Err(RenderError::invalid_operation(
                format!("{stage:?}"),
                "unknown stage",
            ));
        };
        entry.framebuffer = Some((target, framebuffer));
        entry.configured_attachments = attachments.clone();
        entry.active_attachments = attachments.clone();
        let bind = BindFramebuffer::new(target, Some(framebuffer), attachments);
        self.install_stage_bind(stage, bind)
    }

    /// Selects which of the configured attachments the stage draws into.
    ///
    /// # Errors
    /// [`RenderError::InvalidOperation`] if the stage has no framebuffer or an
    /// attachment was not configured. The previous set stays active.
    pub fn set_active_attachments(
        &mut self,
        stage: StageId,
        attachments: Vec<ColorAttachment>,
    ) -> Result<()> {
        let Some(entry) = self.stages.get_mut(stage) else {
            return Err(RenderError::invalid_operation(
                format!("{stage:?}"),
                "unknown stage",
            ));
        };
        let Some((target, framebuffer)) = entry.framebuffer else {
            return Err(RenderError::invalid_operation(
                entry.name.clone(),
                "stage has no framebuffer",
            ));
        };
        if let Some(stray) = attachments
            .iter()
            .find(|a| !entry.configured_attachments.contains(*a))
        {
            return Err(RenderError::invalid_operation(
                entry.name.clone(),
                format!(
                    "attachment {:#06x} is not configured on framebuffer {}",
                    stray.raw(),
                    framebuffer.raw()
                ),
            ));
        }
        entry.active_attachments = attachments.clone();
        let bind = BindFramebuffer::new(target, Some(framebuffer), attachments);
        self.install_stage_bind(stage, bind)
    }

    fn install_stage_bind(&mut self, stage: StageId, bind: BindFramebuffer) -> Result<()> {
        let existing = self.stages.get(stage).and_then(|s| s.bind_operation);
        if let Some(entry) = existing.and_then(|id| self.operations.get_mut(id)) {
            entry.operation = Box::new(bind);
            self.touch();
            return Ok(());
        }
        let id = self.attach(
            PassRef::Stage(stage),
            OperationList::InternalStartup,
            Box::new(bind),
            InsertPosition::Front,
        )?;
        if let Some(entry) = self.stages.get_mut(stage) {
            entry.bind_operation = Some(id);
        }
        Ok(())
    }

    /// Sets the program a program pass makes active before any of its
    /// operations.
    pub fn set_program(&mut self, pass: ProgramPassId, program: ProgramHandle) -> Result<()> {
        let Some(entry) = self.program_passes.get_mut(pass) else {
            return Err(RenderError::invalid_operation(
                format!("{pass:?}"),
                "unknown program pass",
            ));
        };
        entry.program = Some(program);
        let existing = entry.program_operation;
        if let Some(op) = existing.and_then(|id| self.operations.get_mut(id)) {
            op.operation = Box::new(UseProgram::new(Some(program)));
            self.touch();
            return Ok(());
        }
        let id = self.attach(
            PassRef::Program(pass),
            OperationList::InternalStartup,
            Box::new(UseProgram::new(Some(program))),
            InsertPosition::Front,
        )?;
        if let Some(entry) = self.program_passes.get_mut(pass) {
            entry.program_operation = Some(id);
        }
        Ok(())
    }

    /// Changes when a pass is emitted. Clears its executed flag.
    pub fn set_execution_type(&mut self, pass: PassRef, execution: ExecutionType) -> Result<()> {
        let slot = match pass {
            PassRef::Stage(id) => self.stages.get_mut(id).map(|s| (&mut s.execution, &mut s.executed)),
            PassRef::Program(id) => self
                .program_passes
                .get_mut(id)
                .map(|p| (&mut p.execution, &mut p.executed)),
            PassRef::Node(id) => self
                .node_passes
                .get_mut(id)
                .map(|n| (&mut n.execution, &mut n.executed)),
        };
        let Some((current, executed)) = slot else {
            return Err(RenderError::invalid_operation(
                format!("{pass:?}"),
                "unknown pass",
            ));
        };
        *current = execution;
        *executed = false;
        self.touch();
        Ok(())
    }

    // --- Reordering ---

    /// Exchanges two stages. Returns `false` (and changes nothing) if either
    /// is not in the graph.
    pub fn swap_stages(&mut self, a: StageId, b: StageId) -> bool {
        let swapped = swap_in(&mut self.stage_order, a, b);
        if swapped {
            self.touch();
        }
        swapped
    }

    /// Exchanges two program passes of the same stage. Returns `false` if
    /// either is absent or they belong to different stages.
    pub fn swap_program_passes(&mut self, a: ProgramPassId, b: ProgramPassId) -> bool {
        let (Some(pa), Some(pb)) = (self.program_passes.get(a), self.program_passes.get(b)) else {
            return false;
        };
        if pa.stage != pb.stage {
            return false;
        }
        let stage = pa.stage;
        let swapped = self
            .stages
            .get_mut(stage)
            .is_some_and(|s| swap_in(&mut s.passes, a, b));
        if swapped {
            self.touch();
        }
        swapped
    }

    /// Exchanges two node passes of the same program pass. Returns `false` if
    /// either is absent or they belong to different program passes.
    pub fn swap_node_passes(&mut self, a: NodePassId, b: NodePassId) -> bool {
        let (Some(na), Some(nb)) = (self.node_passes.get(a), self.node_passes.get(b)) else {
            return false;
        };
        if na.program_pass != nb.program_pass {
            return false;
        }
        let parent = na.program_pass;
        let swapped = self
            .program_passes
            .get_mut(parent)
            .is_some_and(|p| swap_in(&mut p.nodes, a, b));
        if swapped {
            self.touch();
        }
        swapped
    }

    /// Exchanges two operations of the same list of the same pass. Returns
    /// `false` if either is absent or they live in different lists.
    pub fn swap_operations(&mut self, a: OperationId, b: OperationId) -> bool {
        let (Some(ea), Some(eb)) = (self.operations.get(a), self.operations.get(b)) else {
            return false;
        };
        if ea.owner != eb.owner || ea.list != eb.list {
            return false;
        }
        let (owner, list) = (ea.owner, ea.list);
        let swapped = self
            .lists_mut(owner)
            .is_some_and(|lists| swap_in(lists.get_mut(list), a, b));
        if swapped {
            self.touch();
        }
        swapped
    }

    // --- Removal ---

    /// Removes one operation from a user list and returns it for teardown.
    /// Returns `Ok(None)` if `id` is not in the graph.
    ///
    /// # Errors
    /// [`RenderError::InvalidOperation`] if the operation lives in an internal
    /// list. Those follow the stage framebuffer and the pass program; change
    /// or remove the pass instead.
    pub fn remove_operation(&mut self, id: OperationId) -> Result<Option<Box<dyn Operation>>> {
        let Some(entry) = self.operations.get(id) else {
            return Ok(None);
        };
        if entry.list.is_internal() {
            return Err(RenderError::invalid_operation(
                entry.operation.label(),
                format!("{:?} is managed by the graph", entry.list),
            ));
        }
        Ok(self.detach_operation(id))
    }

    fn detach_operation(&mut self, id: OperationId) -> Option<Box<dyn Operation>> {
        let entry = self.operations.remove(id)?;
        if let Some(lists) = self.lists_mut(entry.owner) {
            lists.get_mut(entry.list).retain(|op| *op != id);
        }
        match entry.owner {
            PassRef::Stage(stage) => {
                if let Some(s) = self.stages.get_mut(stage) {
                    if s.bind_operation == Some(id) {
                        s.bind_operation = None;
                    }
                }
            }
            PassRef::Program(pass) => {
                if let Some(p) = self.program_passes.get_mut(pass) {
                    if p.program_operation == Some(id) {
                        p.program_operation = None;
                    }
                }
            }
            PassRef::Node(_) => {}
        }
        self.touch();
        Some(entry.operation)
    }

    /// Removes a node pass with its operations, returned in list order.
    pub fn remove_node_pass(&mut self, id: NodePassId) -> Vec<Box<dyn Operation>> {
        let Some(node) = self.node_passes.remove(id) else {
            return Vec::new();
        };
        if let Some(parent) = self.program_passes.get_mut(node.program_pass) {
            parent.nodes.retain(|n| *n != id);
        }
        self.touch();
        self.take_operations(&node.lists)
    }

    /// Removes a program pass, its node passes and all their operations.
    pub fn remove_program_pass(&mut self, id: ProgramPassId) -> Vec<Box<dyn Operation>> {
        let Some(pass) = self.program_passes.remove(id) else {
            return Vec::new();
        };
        if let Some(parent) = self.stages.get_mut(pass.stage) {
            parent.passes.retain(|p| *p != id);
        }
        self.touch();
        self.take_pass_operations(&pass)
    }

    /// Removes a stage and everything below it.
    pub fn remove_stage(&mut self, id: StageId) -> Vec<Box<dyn Operation>> {
        let Some(stage) = self.stages.remove(id) else {
            return Vec::new();
        };
        self.stage_order.retain(|s| *s != id);
        self.touch();
        let mut removed = Vec::new();
        let lists = &stage.lists;
        removed.extend(self.take_ids(lists.get(OperationList::InternalStartup)));
        removed.extend(self.take_ids(lists.get(OperationList::Startup)));
        for pass_id in &stage.passes {
            if let Some(pass) = self.program_passes.remove(*pass_id) {
                removed.extend(self.take_pass_operations(&pass));
            }
        }
        removed.extend(self.take_ids(lists.get(OperationList::Finish)));
        removed.extend(self.take_ids(lists.get(OperationList::InternalFinish)));
        removed
    }

    /// Prunes every operation that depends on `component`, from every list of
    /// every pass. Passes stay in place, possibly empty.
    pub fn remove_component(&mut self, component: ComponentId) -> Vec<Box<dyn Operation>> {
        let doomed: Vec<OperationId> = self
            .operations
            .iter()
            .filter(|(_, entry)| entry.operation.depends_on(component))
            .map(|(id, _)| id)
            .collect();
        doomed
            .into_iter()
            .filter_map(|id| self.detach_operation(id))
            .collect()
    }

    /// Empties the graph and returns every operation, in execution order.
    pub fn clear(&mut self) -> Vec<Box<dyn Operation>> {
        let stages = self.stage_order.clone();
        let mut removed = Vec::new();
        for stage in stages {
            removed.extend(self.remove_stage(stage));
        }
        // Anything left was orphaned by a bad back-reference; drop it too.
        removed.extend(self.operations.drain().map(|(_, entry)| entry.operation));
        self.program_passes.clear();
        self.node_passes.clear();
        removed
    }

    fn take_pass_operations(&mut self, pass: &ShaderProgramPass) -> Vec<Box<dyn Operation>> {
        let lists = &pass.lists;
        let mut removed = Vec::new();
        removed.extend(self.take_ids(lists.get(OperationList::InternalStartup)));
        removed.extend(self.take_ids(lists.get(OperationList::Startup)));
        for node_id in &pass.nodes {
            if let Some(node) = self.node_passes.remove(*node_id) {
                removed.extend(self.take_operations(&node.lists));
            }
        }
        removed.extend(self.take_ids(lists.get(OperationList::Finish)));
        removed.extend(self.take_ids(lists.get(OperationList::InternalFinish)));
        removed
    }

    fn take_operations(&mut self, lists: &OperationLists) -> Vec<Box<dyn Operation>> {
        let ids: Vec<OperationId> = lists.all().collect();
        self.take_ids(&ids)
    }

    fn take_ids(&mut self, ids: &[OperationId]) -> Vec<Box<dyn Operation>> {
        ids.iter()
            .filter_map(|id| self.operations.remove(*id))
            .map(|entry| entry.operation)
            .collect()
    }

    // --- Frame life cycle ---

    /// Starts a frame: every-frame passes go back to not executed and every
    /// operation clears its per-frame state.
    pub fn begin_frame(&mut self) {
        for stage in self.stages.values_mut() {
            if stage.execution == ExecutionType::EveryFrame {
                stage.executed = false;
            }
        }
        for pass in self.program_passes.values_mut() {
            if pass.execution == ExecutionType::EveryFrame {
                pass.executed = false;
            }
        }
        for node in self.node_passes.values_mut() {
            if node.execution == ExecutionType::EveryFrame {
                node.executed = false;
            }
        }
        for entry in self.operations.values_mut() {
            entry.operation.reset();
        }
    }

    /// Flags passes as executed. Unknown passes are ignored.
    pub fn mark_executed(&mut self, passes: &[PassRef]) {
        for pass in passes {
            match *pass {
                PassRef::Stage(id) => {
                    if let Some(s) = self.stages.get_mut(id) {
                        s.executed = true;
                    }
                }
                PassRef::Program(id) => {
                    if let Some(p) = self.program_passes.get_mut(id) {
                        p.executed = true;
                    }
                }
                PassRef::Node(id) => {
                    if let Some(n) = self.node_passes.get_mut(id) {
                        n.executed = true;
                    }
                }
            }
        }
    }

    /// Operation access for execution, without counting as a change.
    pub(crate) fn operation_for_execution(
        &mut self,
        id: OperationId,
    ) -> Option<&mut Box<dyn Operation>> {
        self.operations.get_mut(id).map(|entry| &mut entry.operation)
    }

    /// Describes a pass for logs.
    pub fn describe(&self, pass: PassRef) -> String {
        self.pass_name(pass)
    }
}

fn resolve<K: Copy + PartialEq>(list: &[K], position: InsertPosition<K>) -> Option<usize> {
    match position {
        InsertPosition::Front => Some(0),
        InsertPosition::Back => Some(list.len()),
        InsertPosition::Before(anchor) => list.iter().position(|k| *k == anchor),
        InsertPosition::After(anchor) => list.iter().position(|k| *k == anchor).map(|i| i + 1),
    }
}

fn swap_in<K: Copy + PartialEq>(list: &mut [K], a: K, b: K) -> bool {
    let (Some(i), Some(j)) = (
        list.iter().position(|k| *k == a),
        list.iter().position(|k| *k == b),
    ) else {
        return false;
    };
    list.swap(i, j);
    true
}

fn missing_anchor<K: std::fmt::Debug>(name: &str, position: InsertPosition<K>) -> RenderError {
    RenderError::invalid_operation(name, format!("anchor of {position:?} is not in the list"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{DispatchCompute, FunctionOperation, SetViewport};
    use crate::pass::PassState;
    use vesta_core::device::Viewport;

    fn dispatch(component: u64) -> DispatchCompute {
        DispatchCompute::new([1, 1, 1]).owned_by(ComponentId(component))
    }

    fn scaffold() -> (PassGraph, StageId, ProgramPassId, NodePassId) {
        let mut graph = PassGraph::new();
        let stage = graph.add_stage(FrameBufferStage::new("gbuffer"));
        let pass = graph
            .add_program_pass(stage, ShaderProgramPass::new("geometry"))
            .unwrap();
        let node = graph.add_node_pass(pass, NodePass::new("teapot")).unwrap();
        (graph, stage, pass, node)
    }

    #[test]
    fn insert_respects_anchor() {
        let (mut graph, _, _, node) = scaffold();
        let owner = PassRef::Node(node);
        let a = graph
            .push_operation(owner, OperationList::Operations, dispatch(1))
            .unwrap();
        let c = graph
            .push_operation(owner, OperationList::Operations, dispatch(3))
            .unwrap();
        let b = graph
            .insert_operation(owner, OperationList::Operations, dispatch(2), InsertPosition::After(a))
            .unwrap();
        let front = graph
            .insert_operation(owner, OperationList::Operations, dispatch(0), InsertPosition::Before(a))
            .unwrap();

        assert_eq!(
            graph.operations_of(owner, OperationList::Operations),
            &[front, a, b, c]
        );
        assert_eq!(graph.operation_owner(b), Some((owner, OperationList::Operations)));
    }

    #[test]
    fn missing_anchor_is_rejected_without_side_effects() {
        let (mut graph, _, _, node) = scaffold();
        let other = graph
            .push_operation(PassRef::Node(node), OperationList::Startup, dispatch(1))
            .unwrap();
        let before = graph.operation_count();
        let err = graph
            .insert_operation(
                PassRef::Node(node),
                OperationList::Operations,
                dispatch(2),
                InsertPosition::Before(other),
            )
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidOperation { .. }));
        assert_eq!(graph.operation_count(), before);
    }

    #[test]
    fn internal_lists_are_not_user_editable() {
        let (mut graph, stage, pass, _) = scaffold();
        assert!(graph
            .push_operation(PassRef::Stage(stage), OperationList::InternalStartup, dispatch(1))
            .is_err());
        assert!(graph
            .push_operation(PassRef::Program(pass), OperationList::Operations, dispatch(1))
            .is_err());
        assert_eq!(graph.operation_count(), 0);
    }

    #[test]
    fn framebuffer_installs_one_internal_bind() {
        let (mut graph, stage, _, _) = scaffold();
        let attachments = vec![ColorAttachment(0), ColorAttachment(1)];
        graph
            .set_framebuffer(stage, FramebufferTarget::Both, FramebufferHandle(4), attachments.clone())
            .unwrap();
        graph
            .set_framebuffer(stage, FramebufferTarget::Both, FramebufferHandle(5), attachments)
            .unwrap();

        let internal = graph.operations_of(PassRef::Stage(stage), OperationList::InternalStartup);
        assert_eq!(internal.len(), 1);
        let bind = graph.operation_as::<BindFramebuffer>(internal[0]).unwrap();
        assert_eq!(bind.draw_buffers().len(), 2);
        assert_eq!(
            graph.stage(stage).unwrap().framebuffer(),
            Some((FramebufferTarget::Both, FramebufferHandle(5)))
        );
    }

    #[test]
    fn active_attachments_must_be_configured() {
        let (mut graph, stage, _, _) = scaffold();
        assert!(graph
            .set_active_attachments(stage, vec![ColorAttachment(0)])
            .is_err());

        graph
            .set_framebuffer(
                stage,
                FramebufferTarget::Draw,
                FramebufferHandle(2),
                vec![ColorAttachment(0), ColorAttachment(1)],
            )
            .unwrap();
        graph
            .set_active_attachments(stage, vec![ColorAttachment(1)])
            .unwrap();
        let err = graph
            .set_active_attachments(stage, vec![ColorAttachment(1), ColorAttachment(3)])
            .unwrap_err();

        assert!(matches!(err, RenderError::InvalidOperation { .. }));
        assert_eq!(
            graph.stage(stage).unwrap().active_attachments(),
            &[ColorAttachment(1)]
        );
        let bind_id = graph.operations_of(PassRef::Stage(stage), OperationList::InternalStartup)[0];
        let bind = graph.operation_as::<BindFramebuffer>(bind_id).unwrap();
        assert_eq!(bind.draw_buffers(), &[ColorAttachment(1)]);
    }

    #[test]
    fn program_installs_use_program() {
        let (mut graph, _, pass, _) = scaffold();
        graph.set_program(pass, ProgramHandle(9)).unwrap();
        let internal = graph.operations_of(PassRef::Program(pass), OperationList::InternalStartup);
        assert_eq!(internal.len(), 1);
        assert_eq!(
            graph.operation_as::<UseProgram>(internal[0]).unwrap().program(),
            Some(ProgramHandle(9))
        );
    }

    #[test]
    fn internal_binds_cannot_be_removed_one_by_one() {
        let (mut graph, stage, pass, node) = scaffold();
        graph
            .set_framebuffer(stage, FramebufferTarget::Both, FramebufferHandle(4), vec![ColorAttachment(0)])
            .unwrap();
        graph.set_program(pass, ProgramHandle(9)).unwrap();
        let user = graph
            .push_operation(PassRef::Node(node), OperationList::Operations, dispatch(1))
            .unwrap();
        let bind = graph.operations_of(PassRef::Stage(stage), OperationList::InternalStartup)[0];
        let use_program = graph.operations_of(PassRef::Program(pass), OperationList::InternalStartup)[0];

        for internal in [bind, use_program] {
            let err = graph.remove_operation(internal).unwrap_err();
            assert!(matches!(err, RenderError::InvalidOperation { .. }));
        }
        assert_eq!(graph.operation_count(), 3);
        assert_eq!(graph.program_pass(pass).unwrap().program(), Some(ProgramHandle(9)));

        assert!(graph.remove_operation(user).unwrap().is_some());
        assert!(graph.remove_operation(user).unwrap().is_none());
        assert_eq!(graph.operation_count(), 2);
    }

    #[test]
    fn swap_requires_both_in_same_list() {
        let (mut graph, stage, pass, node) = scaffold();
        let second = graph
            .add_program_pass(stage, ShaderProgramPass::new("lighting"))
            .unwrap();
        let other_stage = graph.add_stage(FrameBufferStage::new("post"));
        let foreign = graph
            .add_program_pass(other_stage, ShaderProgramPass::new("tonemap"))
            .unwrap();

        assert!(graph.swap_program_passes(pass, second));
        assert_eq!(graph.stage(stage).unwrap().program_passes(), &[second, pass]);
        assert!(!graph.swap_program_passes(pass, foreign));

        let a = graph
            .push_operation(PassRef::Node(node), OperationList::Startup, dispatch(1))
            .unwrap();
        let b = graph
            .push_operation(PassRef::Node(node), OperationList::Finish, dispatch(2))
            .unwrap();
        let revision = graph.revision();
        assert!(!graph.swap_operations(a, b));
        assert_eq!(graph.revision(), revision);
    }

    #[test]
    fn removing_a_stage_cascades() {
        let (mut graph, stage, pass, node) = scaffold();
        graph
            .set_framebuffer(stage, FramebufferTarget::Both, FramebufferHandle(1), vec![ColorAttachment(0)])
            .unwrap();
        graph
            .push_operation(PassRef::Stage(stage), OperationList::Startup, SetViewport(Viewport::from_size(8, 8)))
            .unwrap();
        graph
            .push_operation(PassRef::Node(node), OperationList::Operations, dispatch(1))
            .unwrap();

        let removed = graph.remove_stage(stage);

        assert_eq!(removed.len(), 3);
        assert_eq!(graph.operation_count(), 0);
        assert!(!graph.contains(PassRef::Program(pass)));
        assert!(!graph.contains(PassRef::Node(node)));
        assert!(graph.stages().is_empty());
    }

    #[test]
    fn remove_component_prunes_only_dependents() {
        let (mut graph, stage, pass, node) = scaffold();
        let keep = graph
            .push_operation(PassRef::Node(node), OperationList::Operations, dispatch(1))
            .unwrap();
        graph
            .push_operation(PassRef::Node(node), OperationList::Operations, dispatch(2))
            .unwrap();
        graph
            .push_operation(
                PassRef::Stage(stage),
                OperationList::Finish,
                FunctionOperation::new("readback", |_| Ok(())).owned_by(ComponentId(2)),
            )
            .unwrap();

        let removed = graph.remove_component(ComponentId(2));

        assert_eq!(removed.len(), 2);
        assert_eq!(graph.operations_of(PassRef::Node(node), OperationList::Operations), &[keep]);
        assert!(graph.operations_of(PassRef::Stage(stage), OperationList::Finish).is_empty());
        assert!(graph.contains(PassRef::Program(pass)));
    }

    #[test]
    fn run_once_stays_executed_across_frames() {
        let (mut graph, stage, _, node) = scaffold();
        graph
            .set_execution_type(PassRef::Node(node), ExecutionType::Once)
            .unwrap();
        graph
            .push_operation(PassRef::Node(node), OperationList::Operations, dispatch(1))
            .unwrap();

        graph.begin_frame();
        graph.mark_executed(&[PassRef::Stage(stage), PassRef::Node(node)]);
        assert_eq!(graph.node_pass(node).unwrap().state(), PassState::Executed);

        graph.begin_frame();
        assert!(graph.is_skipped(PassRef::Node(node)));
        assert!(!graph.is_skipped(PassRef::Stage(stage)));
        assert_eq!(graph.stage(stage).unwrap().state(), PassState::Configured);
    }

    #[test]
    fn empty_pass_is_idle() {
        let mut graph = PassGraph::new();
        let stage = graph.add_stage(FrameBufferStage::new("empty"));
        assert_eq!(graph.stage(stage).unwrap().state(), PassState::Idle);
    }
}
