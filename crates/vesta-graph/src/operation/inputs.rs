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

//! Inputs operations are connected to.

use vesta_core::device::{
    BufferHandle, DrawCall, IndexFormat, PrimitiveMode, ProgramHandle, SamplerHandle,
    TextureHandle, TextureTarget, VertexArrayHandle,
};
use vesta_core::ComponentId;

/// A sampler or image uniform of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderInput {
    /// The program the uniform belongs to.
    pub program: ProgramHandle,
    /// Uniform location.
    pub location: i32,
    /// Texture or image unit the uniform reads from.
    pub unit: u32,
}

impl ShaderInput {
    /// Creates a shader input.
    pub fn new(program: ProgramHandle, location: i32, unit: u32) -> Self {
        Self {
            program,
            location,
            unit,
        }
    }
}

/// A texture as provided by a scene component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSource {
    /// The texture.
    pub texture: TextureHandle,
    /// Its binding target.
    pub target: TextureTarget,
    /// Sampler used with it. [`SamplerHandle::NONE`] uses the texture's own
    /// sampling state.
    pub sampler: SamplerHandle,
    /// Internal format code of the texture.
    pub internal_format: u32,
    /// Component that owns the texture, if any.
    pub component: Option<ComponentId>,
}

impl TextureSource {
    /// A 2D texture in `RGBA8` with no separate sampler.
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            target: TextureTarget::Texture2D,
            sampler: SamplerHandle::NONE,
            internal_format: 0x8058,
            component: None,
        }
    }

    /// Sets the binding target.
    pub fn with_target(mut self, target: TextureTarget) -> Self {
        self.target = target;
        self
    }

    /// Sets the sampler.
    pub fn with_sampler(mut self, sampler: SamplerHandle) -> Self {
        self.sampler = sampler;
        self
    }

    /// Sets the internal format code.
    pub fn with_format(mut self, internal_format: u32) -> Self {
        self.internal_format = internal_format;
        self
    }

    /// Records the owning component.
    pub fn owned_by(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }
}

/// A buffer as provided by a scene component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferSource {
    /// The buffer.
    pub buffer: BufferHandle,
    /// Component that owns the buffer, if any.
    pub component: Option<ComponentId>,
}

impl BufferSource {
    /// A buffer with no owning component.
    pub fn new(buffer: BufferHandle) -> Self {
        Self {
            buffer,
            component: None,
        }
    }

    /// Records the owning component.
    pub fn owned_by(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }
}

/// Geometry of a mesh component, ready to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshSource {
    /// Vertex array holding the vertex layout and element buffer.
    pub vertex_array: VertexArrayHandle,
    /// How to draw it.
    pub draw: DrawCall,
    /// The mesh component.
    pub component: Option<ComponentId>,
}

impl MeshSource {
    /// An indexed triangle mesh with `index_count` 32-bit indices.
    pub fn indexed(vertex_array: VertexArrayHandle, index_count: u32) -> Self {
        Self {
            vertex_array,
            draw: DrawCall::Elements {
                mode: PrimitiveMode::Triangles,
                count: index_count,
                index_format: IndexFormat::U32,
                offset: 0,
            },
            component: None,
        }
    }

    /// A non-indexed mesh.
    pub fn arrays(vertex_array: VertexArrayHandle, mode: PrimitiveMode, vertex_count: u32) -> Self {
        Self {
            vertex_array,
            draw: DrawCall::Arrays {
                mode,
                first: 0,
                count: vertex_count,
            },
            component: None,
        }
    }

    /// Records the owning component.
    pub fn owned_by(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }
}
