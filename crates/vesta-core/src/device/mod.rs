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

//! The abstract device capability set the render graph drives.

mod handles;
pub mod targets;
mod types;

pub use handles::*;
pub use targets::{BufferTarget, Capability, FramebufferTarget, TextureTarget};
pub use types::*;

use crate::error::DeviceError;
use std::fmt::Debug;

/// The low-level state-changing and work-submitting calls of a graphics device.
///
/// Every call is synchronous and side-effect only. Implementations do not
/// deduplicate anything: issuing the same call twice performs the work twice.
/// Skipping redundant calls is the job of the state tracker that owns the
/// device.
///
/// A call returning `Err` must leave the device state unchanged.
pub trait GraphicsDevice: Debug + Send {
    /// Selects the texture unit subsequent texture binds apply to.
    fn active_texture(&mut self, unit: u32) -> Result<(), DeviceError>;

    /// Binds `texture` to `target` of the active texture unit.
    fn bind_texture(
        &mut self,
        target: TextureTarget,
        texture: TextureHandle,
    ) -> Result<(), DeviceError>;

    /// Binds `sampler` to texture unit `unit`.
    fn bind_sampler(&mut self, unit: u32, sampler: SamplerHandle) -> Result<(), DeviceError>;

    /// Binds `buffer` to a non-indexed buffer target.
    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferHandle)
        -> Result<(), DeviceError>;

    /// Binds `buffer` to binding point `index` of an indexed buffer target.
    /// ## Arguments
    /// * `target` - One of the indexed targets (see [`BufferTarget::is_indexed`]).
    /// * `index` - The binding point, already checked against the device limits.
    /// * `buffer` - The buffer to bind.
    fn bind_buffer_base(
        &mut self,
        target: BufferTarget,
        index: u32,
        buffer: BufferHandle,
    ) -> Result<(), DeviceError>;

    /// Binds `framebuffer` to `target`. Binding [`FramebufferHandle::NONE`]
    /// restores the default framebuffer.
    fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: FramebufferHandle,
    ) -> Result<(), DeviceError>;

    /// Binds a vertex array object.
    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> Result<(), DeviceError>;

    /// Makes `program` the active shader program.
    fn use_program(&mut self, program: ProgramHandle) -> Result<(), DeviceError>;

    /// Enables or disables a capability.
    fn set_capability(&mut self, capability: Capability, enabled: bool)
        -> Result<(), DeviceError>;

    /// Sets the color write mask.
    fn set_color_mask(&mut self, mask: ColorMask) -> Result<(), DeviceError>;

    /// Sets the viewport rectangle.
    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), DeviceError>;

    /// Selects the color attachments fragment outputs are written to.
    fn set_draw_buffers(&mut self, attachments: &[ColorAttachment]) -> Result<(), DeviceError>;

    /// Binds one texture level to an image unit.
    fn bind_image_texture(&mut self, binding: &ImageBinding) -> Result<(), DeviceError>;

    /// Writes an integer uniform of the active program.
    fn set_uniform_i32(&mut self, location: i32, value: i32) -> Result<(), DeviceError>;

    /// Submits a draw.
    fn draw(&mut self, call: &DrawCall) -> Result<(), DeviceError>;

    /// Dispatches compute work groups.
    fn dispatch_compute(&mut self, groups: [u32; 3]) -> Result<(), DeviceError>;

    /// Clears the bound draw framebuffer.
    fn clear(&mut self, request: &ClearRequest) -> Result<(), DeviceError>;
}
