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

//! Operations that submit work.

use super::inputs::MeshSource;
use super::{swallow, Operation, OperationKind, StateAssignment, StateEffect, StateSlot, StateValue};
use crate::state::StateTracker;
use vesta_core::device::{ClearRequest, FramebufferHandle, VertexArrayHandle};
use vesta_core::error::Result;
use vesta_core::{ComponentId, ResourceId};

/// Draws a mesh with the active program.
#[derive(Debug, Clone, Default)]
pub struct DrawMesh {
    mesh: Option<MeshSource>,
}

impl DrawMesh {
    /// Creates the operation and connects it.
    pub fn new(mesh: Option<MeshSource>) -> Self {
        Self { mesh }
    }

    /// Connects a mesh. `None` turns the operation into a no-op.
    pub fn connect(&mut self, mesh: Option<MeshSource>) {
        self.mesh = mesh;
    }

    /// The connected mesh.
    pub fn mesh(&self) -> Option<&MeshSource> {
        self.mesh.as_ref()
    }
}

impl Operation for DrawMesh {
    fn kind(&self) -> OperationKind {
        OperationKind::DrawMesh
    }

    fn is_valid(&self) -> bool {
        self.mesh.is_some()
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        let Some(mesh) = &self.mesh else {
            return Ok(());
        };
        state.bind_vertex_array(mesh.vertex_array)?;
        state.draw(&mesh.draw)
    }

    fn depends_on(&self, component: ComponentId) -> bool {
        self.mesh
            .is_some_and(|mesh| mesh.component == Some(component))
    }

    fn state_effect(&self) -> StateEffect {
        StateEffect::Work(
            self.mesh
                .iter()
                .map(|mesh| {
                    StateAssignment::new(
                        StateSlot::VertexArray,
                        StateValue::VertexArray(mesh.vertex_array),
                    )
                })
                .collect(),
        )
    }

    fn teardown(&mut self, state: &mut StateTracker) {
        if self.mesh.is_some() {
            swallow(&self.label(), state.bind_vertex_array(VertexArrayHandle::NONE));
        }
    }
}

/// Dispatches compute work groups with the active program.
#[derive(Debug, Clone)]
pub struct DispatchCompute {
    groups: [u32; 3],
    component: Option<ComponentId>,
}

impl DispatchCompute {
    /// Creates a dispatch of `groups` work groups.
    pub fn new(groups: [u32; 3]) -> Self {
        Self {
            groups,
            component: None,
        }
    }

    /// Records the component the dispatch works for.
    pub fn owned_by(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }
}

impl Operation for DispatchCompute {
    fn kind(&self) -> OperationKind {
        OperationKind::DispatchCompute
    }

    fn is_valid(&self) -> bool {
        self.groups.iter().all(|&n| n > 0)
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        state.dispatch_compute(self.groups)
    }

    fn depends_on(&self, component: ComponentId) -> bool {
        self.component == Some(component)
    }

    fn state_effect(&self) -> StateEffect {
        StateEffect::Work(Vec::new())
    }
}

/// Clears the bound draw framebuffer.
#[derive(Debug, Clone)]
pub struct ClearFramebuffer {
    request: ClearRequest,
    framebuffer: Option<FramebufferHandle>,
}

impl ClearFramebuffer {
    /// Creates a clear.
    pub fn new(request: ClearRequest) -> Self {
        Self {
            request,
            framebuffer: None,
        }
    }

    /// Declares which framebuffer the clear is expected to hit, so passes that
    /// read it are ordered after it.
    pub fn of(mut self, framebuffer: FramebufferHandle) -> Self {
        self.framebuffer = Some(framebuffer);
        self
    }
}

impl Operation for ClearFramebuffer {
    fn kind(&self) -> OperationKind {
        OperationKind::ClearFramebuffer
    }

    fn is_valid(&self) -> bool {
        !self.request.is_empty()
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        state.clear(&self.request)
    }

    fn depends_on(&self, _component: ComponentId) -> bool {
        false
    }

    fn state_effect(&self) -> StateEffect {
        StateEffect::Work(Vec::new())
    }

    fn writes(&self) -> Vec<ResourceId> {
        self.framebuffer
            .iter()
            .map(|fb| ResourceId::Framebuffer(*fb))
            .collect()
    }
}
