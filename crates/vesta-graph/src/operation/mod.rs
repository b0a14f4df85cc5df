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

//! Operations: the atomic, replayable units of work the passes hold.
//!
//! Every operation follows the same life cycle. It is built, then connected
//! to its inputs; a missing input leaves it invalid, and an invalid operation
//! executes as a no-op until it is connected again. While valid, it applies
//! its effect through the [`StateTracker`] only. When it is removed from the
//! graph the manager tears it down, restoring the slots it bound to a neutral
//! value on a best-effort basis.

mod bind;
mod function;
mod inputs;
mod toggles;
mod work;

pub use bind::{
    promote_image_format, BindBuffer, BindBufferBase, BindFramebuffer, BindImageTexture,
    BindTexture, UseProgram,
};
pub use function::FunctionOperation;
pub use inputs::{BufferSource, MeshSource, ShaderInput, TextureSource};
pub use toggles::{SetCapability, SetColorMask, SetViewport};
pub use work::{ClearFramebuffer, DispatchCompute, DrawMesh};

use crate::state::StateTracker;
use std::any::Any;
use std::fmt::Debug;
use vesta_core::device::{
    BufferHandle, BufferTarget, Capability, ColorAttachment, ColorMask, FramebufferHandle,
    ImageBinding, ProgramHandle, SamplerHandle, TextureHandle, TextureTarget, VertexArrayHandle,
    Viewport,
};
use vesta_core::error::{RenderError, Result};
use vesta_core::{ComponentId, ResourceId};

/// The type tag of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum OperationKind {
    BindTexture,
    BindImageTexture,
    BindBuffer,
    BindBufferBase,
    UseProgram,
    BindFramebuffer,
    SetCapability,
    SetColorMask,
    SetViewport,
    DrawMesh,
    DispatchCompute,
    ClearFramebuffer,
    Function,
}

/// A cached (or simulated) slot of device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum StateSlot {
    Program,
    ReadFramebuffer,
    DrawFramebuffer,
    DrawBuffers,
    Texture { unit: u32, target: TextureTarget },
    Sampler { unit: u32 },
    Buffer(BufferTarget),
    BufferBase { target: BufferTarget, index: u32 },
    VertexArray,
    Capability(Capability),
    ColorMask,
    Viewport,
    /// An integer uniform of one program. Uniform values survive program
    /// switches.
    Uniform { program: ProgramHandle, location: i32 },
    ImageUnit(u32),
}

/// The value held by a [`StateSlot`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum StateValue {
    Program(ProgramHandle),
    Framebuffer(FramebufferHandle),
    DrawBuffers(Vec<ColorAttachment>),
    Texture(TextureHandle),
    Sampler(SamplerHandle),
    Buffer(BufferHandle),
    VertexArray(VertexArrayHandle),
    Enabled(bool),
    ColorMask(ColorMask),
    Viewport(Viewport),
    Int(i32),
    Image(ImageBinding),
}

/// One slot set to one value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateAssignment {
    /// The slot.
    pub slot: StateSlot,
    /// The value it ends up holding.
    pub value: StateValue,
}

impl StateAssignment {
    /// Creates an assignment.
    pub fn new(slot: StateSlot, value: StateValue) -> Self {
        Self { slot, value }
    }
}

/// What executing an operation does to device state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEffect {
    /// Only sets the listed slots. Executing it is redundant when every slot
    /// already holds its value.
    State(Vec<StateAssignment>),
    /// Sets the listed slots, then submits work. Never redundant.
    Work(Vec<StateAssignment>),
    /// May change anything.
    Unknown,
}

/// Helper giving every operation `Any` access for typed lookups.
pub trait AsAny: Any {
    /// `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The common contract of every operation.
pub trait Operation: AsAny + Debug + Send {
    /// The type tag.
    fn kind(&self) -> OperationKind;

    /// A human-readable name for logs.
    fn label(&self) -> String {
        format!("{:?}", self.kind())
    }

    /// `true` if every required input is connected.
    fn is_valid(&self) -> bool;

    /// Explains why the operation is invalid.
    fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(RenderError::invalid_operation(
                self.label(),
                "required inputs are not connected",
            ))
        }
    }

    /// Applies the operation through the state wrappers. Only called on valid
    /// operations.
    fn execute(&self, state: &mut StateTracker) -> Result<()>;

    /// Refreshes parameters derived from the connected inputs. Called right
    /// before every execution.
    fn update(&mut self) {}

    /// Clears per-frame transient state. Called once at the start of every
    /// frame.
    fn reset(&mut self) {}

    /// `true` if the operation refers to `component`, and must go when the
    /// component goes.
    fn depends_on(&self, component: ComponentId) -> bool;

    /// What executing the operation does to device state.
    fn state_effect(&self) -> StateEffect {
        StateEffect::Unknown
    }

    /// Resources the operation reads.
    fn reads(&self) -> Vec<ResourceId> {
        Vec::new()
    }

    /// Resources the operation writes.
    fn writes(&self) -> Vec<ResourceId> {
        Vec::new()
    }

    /// Restores whatever the operation bound to a neutral value. Failures are
    /// logged and swallowed.
    fn teardown(&mut self, _state: &mut StateTracker) {}
}

impl dyn Operation {
    /// Downcasts to a concrete operation type.
    pub fn downcast_ref<T: Operation>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts to a concrete operation type, mutably.
    pub fn downcast_mut<T: Operation>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Logs and swallows a teardown failure.
pub(crate) fn swallow(label: &str, result: Result<bool>) {
    if let Err(err) = result {
        log::debug!("Teardown of '{label}' failed: {err}");
    }
}
