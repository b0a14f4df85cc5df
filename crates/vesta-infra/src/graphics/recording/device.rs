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

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use vesta_core::device::{
    BufferHandle, BufferTarget, Capability, ClearRequest, ColorAttachment, ColorMask, DrawCall,
    FramebufferHandle, FramebufferTarget, GraphicsDevice, ImageBinding, ProgramHandle,
    SamplerHandle, TextureHandle, TextureTarget, VertexArrayHandle, Viewport,
};
use vesta_core::DeviceError;

/// One call received by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum DeviceCall {
    ActiveTexture(u32),
    BindTexture {
        target: TextureTarget,
        texture: TextureHandle,
    },
    BindSampler {
        unit: u32,
        sampler: SamplerHandle,
    },
    BindBuffer {
        target: BufferTarget,
        buffer: BufferHandle,
    },
    BindBufferBase {
        target: BufferTarget,
        index: u32,
        buffer: BufferHandle,
    },
    BindFramebuffer {
        target: FramebufferTarget,
        framebuffer: FramebufferHandle,
    },
    BindVertexArray(VertexArrayHandle),
    UseProgram(ProgramHandle),
    SetCapability {
        capability: Capability,
        enabled: bool,
    },
    SetColorMask(ColorMask),
    SetViewport(Viewport),
    SetDrawBuffers(Vec<ColorAttachment>),
    BindImageTexture(ImageBinding),
    SetUniformI32 {
        location: i32,
        value: i32,
    },
    Draw(DrawCall),
    DispatchCompute([u32; 3]),
    Clear(ClearRequest),
}

impl DeviceCall {
    /// The name of the [`GraphicsDevice`] entry point this call went through.
    pub fn name(&self) -> &'static str {
        match self {
            DeviceCall::ActiveTexture(_) => "active_texture",
            DeviceCall::BindTexture { .. } => "bind_texture",
            DeviceCall::BindSampler { .. } => "bind_sampler",
            DeviceCall::BindBuffer { .. } => "bind_buffer",
            DeviceCall::BindBufferBase { .. } => "bind_buffer_base",
            DeviceCall::BindFramebuffer { .. } => "bind_framebuffer",
            DeviceCall::BindVertexArray(_) => "bind_vertex_array",
            DeviceCall::UseProgram(_) => "use_program",
            DeviceCall::SetCapability { .. } => "set_capability",
            DeviceCall::SetColorMask(_) => "set_color_mask",
            DeviceCall::SetViewport(_) => "set_viewport",
            DeviceCall::SetDrawBuffers(_) => "set_draw_buffers",
            DeviceCall::BindImageTexture(_) => "bind_image_texture",
            DeviceCall::SetUniformI32 { .. } => "set_uniform_i32",
            DeviceCall::Draw(_) => "draw",
            DeviceCall::DispatchCompute(_) => "dispatch_compute",
            DeviceCall::Clear(_) => "clear",
        }
    }
}

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<DeviceCall>,
    failing: HashSet<&'static str>,
}

/// A [`GraphicsDevice`] that records every call it receives.
///
/// Clones share the same log, so a test can keep one clone and hand the other
/// to the render manager. Calls can be made to fail by entry-point name with
/// [`fail_on`](Self::fail_on); a failing call is not recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    recorder: Arc<Mutex<Recorder>>,
}

impl RecordingDevice {
    /// Creates a device with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorder> {
        self.recorder
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: DeviceCall) -> Result<(), DeviceError> {
        let mut recorder = self.lock();
        let name = call.name();
        if recorder.failing.contains(name) {
            log::debug!("RecordingDevice: injected failure for '{name}'");
            return Err(DeviceError::new(name, "injected failure"));
        }
        recorder.calls.push(call);
        Ok(())
    }

    /// A copy of every call recorded so far, in order.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().calls.clone()
    }

    /// Total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of recorded calls that went through entry point `name`.
    pub fn count(&self, name: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.name() == name)
            .count()
    }

    /// Forgets every recorded call.
    pub fn clear(&self) {
        self.lock().calls.clear();
    }

    /// Makes every call through entry point `name` fail from now on.
    pub fn fail_on(&self, name: &'static str) {
        self.lock().failing.insert(name);
    }

    /// Removes every injected failure.
    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }
}

impl GraphicsDevice for RecordingDevice {
    fn active_texture(&mut self, unit: u32) -> Result<(), DeviceError> {
        self.record(DeviceCall::ActiveTexture(unit))
    }

    fn bind_texture(
        &mut self,
        target: TextureTarget,
        texture: TextureHandle,
    ) -> Result<(), DeviceError> {
        self.record(DeviceCall::BindTexture { target, texture })
    }

    fn bind_sampler(&mut self, unit: u32, sampler: SamplerHandle) -> Result<(), DeviceError> {
        self.record(DeviceCall::BindSampler { unit, sampler })
    }

    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: BufferHandle,
    ) -> Result<(), DeviceError> {
        self.record(DeviceCall::BindBuffer { target, buffer })
    }

    fn bind_buffer_base(
        &mut self,
        target: BufferTarget,
        index: u32,
        buffer: BufferHandle,
    ) -> Result<(), DeviceError> {
        self.record(DeviceCall::BindBufferBase {
            target,
            index,
            buffer,
        })
    }

    fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: FramebufferHandle,
    ) -> Result<(), DeviceError> {
        self.record(DeviceCall::BindFramebuffer {
            target,
            framebuffer,
        })
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> Result<(), DeviceError> {
        self.record(DeviceCall::BindVertexArray(vertex_array))
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), DeviceError> {
        self.record(DeviceCall::UseProgram(program))
    }

    fn set_capability(
        &mut self,
        capability: Capability,
        enabled: bool,
    ) -> Result<(), DeviceError> {
        self.record(DeviceCall::SetCapability {
            capability,
            enabled,
        })
    }

    fn set_color_mask(&mut self, mask: ColorMask) -> Result<(), DeviceError> {
        self.record(DeviceCall::SetColorMask(mask))
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), DeviceError> {
        self.record(DeviceCall::SetViewport(viewport))
    }

    fn set_draw_buffers(&mut self, attachments: &[ColorAttachment]) -> Result<(), DeviceError> {
        self.record(DeviceCall::SetDrawBuffers(attachments.to_vec()))
    }

    fn bind_image_texture(&mut self, binding: &ImageBinding) -> Result<(), DeviceError> {
        self.record(DeviceCall::BindImageTexture(*binding))
    }

    fn set_uniform_i32(&mut self, location: i32, value: i32) -> Result<(), DeviceError> {
        self.record(DeviceCall::SetUniformI32 { location, value })
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), DeviceError> {
        self.record(DeviceCall::Draw(*call))
    }

    fn dispatch_compute(&mut self, groups: [u32; 3]) -> Result<(), DeviceError> {
        self.record(DeviceCall::DispatchCompute(groups))
    }

    fn clear(&mut self, request: &ClearRequest) -> Result<(), DeviceError> {
        self.record(DeviceCall::Clear(*request))
    }
}
