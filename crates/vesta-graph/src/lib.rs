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

//! # Vesta Graph
//!
//! The runtime of the render graph.
//!
//! - [`state`]: the shadow of device state and the wrappers that consult it
//!   before every state-changing call.
//! - [`operation`]: the units of work (binds, draws, dispatches).
//! - [`pass`]: the three-level pass hierarchy that owns the operations.
//! - [`optimizer`]: strategies that flatten the hierarchy into a frame plan.
//! - [`manager`]: the [`RenderManager`] that ties them together and renders
//!   one frame per call.

pub mod manager;
pub mod operation;
pub mod optimizer;
pub mod pass;
pub mod state;

pub use manager::RenderManager;
pub use operation::{Operation, OperationKind, StateAssignment, StateEffect, StateSlot, StateValue};
pub use optimizer::{FramePlan, Optimizer, PlanStep, SimpleOptimizer, StateSortingOptimizer};
pub use pass::{
    ExecutionType, FrameBufferStage, InsertPosition, NodePass, NodePassId, OperationId,
    OperationList, PassGraph, PassRef, PassState, ProgramPassId, ShaderProgramPass, StageId,
};
pub use state::{StateCache, StateTracker};
