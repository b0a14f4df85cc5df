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

use super::{ExecutionType, NodePassId, OperationId, OperationList, PassState, ProgramPassId, StageId};
use vesta_core::device::{ColorAttachment, FramebufferHandle, FramebufferTarget, ProgramHandle};
use vesta_core::ResourceId;

#[derive(Debug, Clone, Default)]
pub(crate) struct OperationLists {
    internal_startup: Vec<OperationId>,
    startup: Vec<OperationId>,
    operations: Vec<OperationId>,
    finish: Vec<OperationId>,
    internal_finish: Vec<OperationId>,
}

impl OperationLists {
    pub(crate) fn get(&self, list: OperationList) -> &Vec<OperationId> {
        match list {
            OperationList::InternalStartup => &self.internal_startup,
            OperationList::Startup => &self.startup,
            OperationList::Operations => &self.operations,
            OperationList::Finish => &self.finish,
            OperationList::InternalFinish => &self.internal_finish,
        }
    }

    pub(crate) fn get_mut(&mut self, list: OperationList) -> &mut Vec<OperationId> {
        match list {
            OperationList::InternalStartup => &mut self.internal_startup,
            OperationList::Startup => &mut self.startup,
            OperationList::Operations => &mut self.operations,
            OperationList::Finish => &mut self.finish,
            OperationList::InternalFinish => &mut self.internal_finish,
        }
    }

    /// Every operation, in list order.
    pub(crate) fn all(&self) -> impl Iterator<Item = OperationId> + '_ {
        self.internal_startup
            .iter()
            .chain(&self.startup)
            .chain(&self.operations)
            .chain(&self.finish)
            .chain(&self.internal_finish)
            .copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.all().next().is_none()
    }
}

/// The top level of the hierarchy: everything rendered into one framebuffer.
#[derive(Debug, Clone)]
pub struct FrameBufferStage {
    pub(crate) name: String,
    pub(crate) execution: ExecutionType,
    pub(crate) executed: bool,
    pub(crate) framebuffer: Option<(FramebufferTarget, FramebufferHandle)>,
    pub(crate) configured_attachments: Vec<ColorAttachment>,
    pub(crate) active_attachments: Vec<ColorAttachment>,
    pub(crate) bind_operation: Option<OperationId>,
    pub(crate) lists: OperationLists,
    pub(crate) passes: Vec<ProgramPassId>,
}

impl FrameBufferStage {
    /// Creates an empty stage that runs every frame.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            execution: ExecutionType::EveryFrame,
            executed: false,
            framebuffer: None,
            configured_attachments: Vec::new(),
            active_attachments: Vec::new(),
            bind_operation: None,
            lists: OperationLists::default(),
            passes: Vec::new(),
        }
    }

    /// Sets the execution type.
    pub fn with_execution(mut self, execution: ExecutionType) -> Self {
        self.execution = execution;
        self
    }

    /// The stage name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The execution type.
    pub fn execution_type(&self) -> ExecutionType {
        self.execution
    }

    /// Whether the stage has executed (this frame, or ever for run-once).
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// The framebuffer the stage renders into, with its binding target.
    pub fn framebuffer(&self) -> Option<(FramebufferTarget, FramebufferHandle)> {
        self.framebuffer
    }

    /// The color attachments the framebuffer was configured with.
    pub fn configured_attachments(&self) -> &[ColorAttachment] {
        &self.configured_attachments
    }

    /// The color attachments currently drawn into.
    pub fn active_attachments(&self) -> &[ColorAttachment] {
        &self.active_attachments
    }

    /// Child program passes, in execution order.
    pub fn program_passes(&self) -> &[ProgramPassId] {
        &self.passes
    }

    /// The operations of one list, in execution order.
    pub fn operations(&self, list: OperationList) -> &[OperationId] {
        self.lists.get(list)
    }

    /// Derived life-cycle state.
    pub fn state(&self) -> PassState {
        derive_state(self.executed, self.lists.is_empty() && self.passes.is_empty())
    }
}

/// A group of operations sharing one shader program.
#[derive(Debug, Clone)]
pub struct ShaderProgramPass {
    pub(crate) name: String,
    pub(crate) stage: StageId,
    pub(crate) execution: ExecutionType,
    pub(crate) executed: bool,
    pub(crate) program: Option<ProgramHandle>,
    pub(crate) program_operation: Option<OperationId>,
    pub(crate) reads: Vec<ResourceId>,
    pub(crate) writes: Vec<ResourceId>,
    pub(crate) lists: OperationLists,
    pub(crate) nodes: Vec<NodePassId>,
}

impl ShaderProgramPass {
    /// Creates an empty pass that runs every frame.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage: StageId::default(),
            execution: ExecutionType::EveryFrame,
            executed: false,
            program: None,
            program_operation: None,
            reads: Vec::new(),
            writes: Vec::new(),
            lists: OperationLists::default(),
            nodes: Vec::new(),
        }
    }

    /// Sets the execution type.
    pub fn with_execution(mut self, execution: ExecutionType) -> Self {
        self.execution = execution;
        self
    }

    /// Declares a resource the pass reads beyond what its operations report,
    /// such as a depth buffer sampled through a shader.
    pub fn reading(mut self, resource: ResourceId) -> Self {
        self.reads.push(resource);
        self
    }

    /// Declares a resource the pass writes beyond what its operations report,
    /// such as a depth attachment filled by its draws.
    pub fn writing(mut self, resource: ResourceId) -> Self {
        self.writes.push(resource);
        self
    }

    /// The pass name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stage that owns the pass.
    pub fn stage(&self) -> StageId {
        self.stage
    }

    /// The execution type.
    pub fn execution_type(&self) -> ExecutionType {
        self.execution
    }

    /// Whether the pass has executed (this frame, or ever for run-once).
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// The program the pass makes active.
    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    /// Resources declared as read.
    pub fn declared_reads(&self) -> &[ResourceId] {
        &self.reads
    }

    /// Resources declared as written.
    pub fn declared_writes(&self) -> &[ResourceId] {
        &self.writes
    }

    /// Child node passes, in execution order.
    pub fn node_passes(&self) -> &[NodePassId] {
        &self.nodes
    }

    /// The operations of one list, in execution order.
    pub fn operations(&self, list: OperationList) -> &[OperationId] {
        self.lists.get(list)
    }

    /// Derived life-cycle state.
    pub fn state(&self) -> PassState {
        derive_state(self.executed, self.lists.is_empty() && self.nodes.is_empty())
    }
}

/// The finest grouping of operations, typically one drawable object.
#[derive(Debug, Clone)]
pub struct NodePass {
    pub(crate) name: String,
    pub(crate) program_pass: ProgramPassId,
    pub(crate) execution: ExecutionType,
    pub(crate) executed: bool,
    pub(crate) lists: OperationLists,
}

impl NodePass {
    /// Creates an empty node pass that runs every frame.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program_pass: ProgramPassId::default(),
            execution: ExecutionType::EveryFrame,
            executed: false,
            lists: OperationLists::default(),
        }
    }

    /// Sets the execution type.
    pub fn with_execution(mut self, execution: ExecutionType) -> Self {
        self.execution = execution;
        self
    }

    /// The node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The program pass that owns the node.
    pub fn program_pass(&self) -> ProgramPassId {
        self.program_pass
    }

    /// The execution type.
    pub fn execution_type(&self) -> ExecutionType {
        self.execution
    }

    /// Whether the node has executed (this frame, or ever for run-once).
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// The operations of one list, in execution order.
    pub fn operations(&self, list: OperationList) -> &[OperationId] {
        self.lists.get(list)
    }

    /// Derived life-cycle state.
    pub fn state(&self) -> PassState {
        derive_state(self.executed, self.lists.is_empty())
    }
}

fn derive_state(executed: bool, empty: bool) -> PassState {
    if executed {
        PassState::Executed
    } else if empty {
        PassState::Idle
    } else {
        PassState::Configured
    }
}
