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

//! The three-level pass hierarchy.
//!
//! A [`PassGraph`] owns every stage, program pass, node pass and operation in
//! slotmap arenas. Parents refer to children by key, in execution order;
//! children and operations keep a back-reference to their owner for removal.
//!
//! Each level has four operation lists. The internal lists are written by the
//! graph only and wrap the user lists:
//!
//! ```text
//! internal_startup, startup, <children>, finish, internal_finish
//! ```
//!
//! Node passes have no children; their own operation list takes that place.

mod graph;
mod passes;

pub use graph::PassGraph;
pub use passes::{FrameBufferStage, NodePass, ShaderProgramPass};

use slotmap::new_key_type;

new_key_type! {
    /// Identifies a [`FrameBufferStage`] in a [`PassGraph`].
    pub struct StageId;
    /// Identifies a [`ShaderProgramPass`] in a [`PassGraph`].
    pub struct ProgramPassId;
    /// Identifies a [`NodePass`] in a [`PassGraph`].
    pub struct NodePassId;
    /// Identifies an operation in a [`PassGraph`].
    pub struct OperationId;
}

/// A reference to a pass at any level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassRef {
    /// A framebuffer stage.
    Stage(StageId),
    /// A shader program pass.
    Program(ProgramPassId),
    /// A node pass.
    Node(NodePassId),
}

/// One of the operation lists of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationList {
    /// Engine-managed, runs before `Startup`.
    InternalStartup,
    /// Runs before the children.
    Startup,
    /// The operations of a node pass. Stages and program passes have child
    /// passes instead.
    Operations,
    /// Runs after the children.
    Finish,
    /// Engine-managed, runs after `Finish`.
    InternalFinish,
}

impl OperationList {
    /// Returns `true` for the lists only the graph may write.
    pub fn is_internal(self) -> bool {
        matches!(
            self,
            OperationList::InternalStartup | OperationList::InternalFinish
        )
    }
}

/// Where to insert into an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition<K> {
    /// At the start.
    Front,
    /// At the end.
    Back,
    /// Right before an existing element.
    Before(K),
    /// Right after an existing element.
    After(K),
}

/// When a pass is emitted by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionType {
    /// Every frame.
    #[default]
    EveryFrame,
    /// Only until it has executed once.
    Once,
}

/// Where a pass is in its frame life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassState {
    /// Holds no operations and no children.
    Idle,
    /// Holds operations or children and has not executed this frame.
    Configured,
    /// Executed this frame; for run-once passes, executed for good.
    Executed,
}
