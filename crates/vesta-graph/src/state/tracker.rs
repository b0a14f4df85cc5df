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

use super::cache::StateCache;
use vesta_core::device::{
    BufferHandle, BufferTarget, Capability, ClearRequest, ColorAttachment, ColorMask, DrawCall,
    FramebufferHandle, FramebufferTarget, GraphicsDevice, ImageBinding, IndexFormat,
    PrimitiveMode, ProgramHandle, SamplerHandle, TextureHandle, TextureTarget,
    VertexArrayHandle, Viewport,
};
use vesta_core::error::{RenderError, Result};
use vesta_core::DeviceLimits;

/// Owns the device and its shadow state.
///
/// Every cached wrapper returns `Ok(true)` when it issued a device call and
/// `Ok(false)` when the cache already held the requested value. The cache is
/// only written after the device call succeeded. Invalid requests fail with
/// [`RenderError::InvalidTarget`] before anything is touched.
#[derive(Debug)]
pub struct StateTracker {
    device: Box<dyn GraphicsDevice>,
    cache: StateCache,
    limits: DeviceLimits,
    issued: u64,
    skipped: u64,
}

impl StateTracker {
    /// Wraps `device`, assuming it is in its initial state.
    pub fn new(device: Box<dyn GraphicsDevice>, limits: DeviceLimits) -> Self {
        Self {
            device,
            cache: StateCache::new(&limits),
            limits,
            issued: 0,
            skipped: 0,
        }
    }

    /// The shadow state.
    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// The binding-point limits requests are checked against.
    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Replaces the limits. The cache is resized and everything in it is
    /// forgotten.
    pub fn set_limits(&mut self, limits: DeviceLimits) {
        self.limits = limits;
        self.cache = StateCache::new(&limits);
        self.cache.invalidate();
    }

    /// Forgets every cached value, so the next request for each slot reaches
    /// the device. Call this after code outside the tracker touched the device.
    pub fn invalidate(&mut self) {
        log::debug!("State cache invalidated");
        self.cache.invalidate();
    }

    /// Number of device calls issued so far.
    pub fn issued_calls(&self) -> u64 {
        self.issued
    }

    /// Number of redundant calls skipped so far.
    pub fn skipped_calls(&self) -> u64 {
        self.skipped
    }

    fn issued(&mut self) -> bool {
        self.issued += 1;
        true
    }

    fn skipped(&mut self, call: &'static str) -> bool {
        log::trace!("Skipping redundant '{call}'");
        self.skipped += 1;
        false
    }

    fn check_unit(&self, unit: u32) -> Result<()> {
        if unit < self.limits.max_texture_units {
            return Ok(());
        }
        let err = RenderError::invalid_target(
            "texture unit",
            format!(
                "unit {unit} is out of range (max {})",
                self.limits.max_texture_units
            ),
        );
        log::warn!("{err}");
        Err(err)
    }

    /// Makes `unit` the active texture unit.
    pub fn active_texture(&mut self, unit: u32) -> Result<bool> {
        self.check_unit(unit)?;
        if self.cache.active_unit == Some(unit) {
            return Ok(self.skipped("active_texture"));
        }
        self.device.active_texture(unit)?;
        self.cache.active_unit = Some(unit);
        Ok(self.issued())
    }

    /// Binds `texture` to `target` of texture unit `unit`.
    ///
    /// The active unit is switched first, and only if it differs.
    pub fn bind_texture(
        &mut self,
        unit: u32,
        target: TextureTarget,
        texture: TextureHandle,
    ) -> Result<bool> {
        self.check_unit(unit)?;
        if self.cache.texture(unit, target) == Some(texture) {
            return Ok(self.skipped("bind_texture"));
        }
        self.active_texture(unit)?;
        self.device.bind_texture(target, texture)?;
        self.cache.textures[unit as usize][target.index()] = Some(texture);
        Ok(self.issued())
    }

    /// Binds `texture` to `target` of whichever unit is active. If the active
    /// unit is unknown, unit 0 is selected first.
    pub fn bind_texture_on_active_unit(
        &mut self,
        target: TextureTarget,
        texture: TextureHandle,
    ) -> Result<bool> {
        let unit = self.cache.active_unit.unwrap_or(0);
        self.bind_texture(unit, target, texture)
    }

    /// Like [`bind_texture`](Self::bind_texture), with the target given as an
    /// external enum value.
    pub fn bind_texture_raw(&mut self, unit: u32, target: u32, texture: TextureHandle) -> Result<bool> {
        let target = TextureTarget::try_from(target).inspect_err(|err| log::warn!("{err}"))?;
        self.bind_texture(unit, target, texture)
    }

    /// Binds `sampler` to texture unit `unit`.
    pub fn bind_sampler(&mut self, unit: u32, sampler: SamplerHandle) -> Result<bool> {
        self.check_unit(unit)?;
        if self.cache.sampler(unit) == Some(sampler) {
            return Ok(self.skipped("bind_sampler"));
        }
        self.device.bind_sampler(unit, sampler)?;
        self.cache.samplers[unit as usize] = Some(sampler);
        Ok(self.issued())
    }

    /// Binds `buffer` to the generic binding point of `target`.
    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferHandle) -> Result<bool> {
        if self.cache.buffer(target) == Some(buffer) {
            return Ok(self.skipped("bind_buffer"));
        }
        self.device.bind_buffer(target, buffer)?;
        self.cache.buffers[target.index()] = Some(buffer);
        Ok(self.issued())
    }

    /// Like [`bind_buffer`](Self::bind_buffer), with the target given as an
    /// external enum value.
    pub fn bind_buffer_raw(&mut self, target: u32, buffer: BufferHandle) -> Result<bool> {
        let target = BufferTarget::try_from(target).inspect_err(|err| log::warn!("{err}"))?;
        self.bind_buffer(target, buffer)
    }

    /// Binds `buffer` to binding point `index` of an indexed target.
    ///
    /// The generic binding point of `target` changes along with it, as it does
    /// on the device.
    pub fn bind_buffer_base(
        &mut self,
        target: BufferTarget,
        index: u32,
        buffer: BufferHandle,
    ) -> Result<bool> {
        let points = match self.limits.indexed_bindings(target) {
            Some(points) => points,
            None => {
                let err = RenderError::invalid_target(
                    "indexed buffer",
                    format!("{target:?} has no indexed binding points"),
                );
                log::warn!("{err}");
                return Err(err);
            }
        };
        if index >= points {
            let err = RenderError::invalid_target(
                "indexed buffer",
                format!("binding point {index} of {target:?} is out of range (max {points})"),
            );
            log::warn!("{err}");
            return Err(err);
        }

        if self.cache.indexed_buffer(target, index) == Some(buffer)
            && self.cache.buffer(target) == Some(buffer)
        {
            return Ok(self.skipped("bind_buffer_base"));
        }
        self.device.bind_buffer_base(target, index, buffer)?;
        if let Some(slot) = self.cache.indexed_buffers[target.index()].get_mut(index as usize) {
            *slot = Some(buffer);
        }
        self.cache.buffers[target.index()] = Some(buffer);
        Ok(self.issued())
    }

    /// Binds `framebuffer` to `target`.
    ///
    /// Switching framebuffers unsets the cached program. Switching the draw
    /// framebuffer also forgets the draw buffers, which belong to the
    /// framebuffer object.
    pub fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: FramebufferHandle,
    ) -> Result<bool> {
        if self.cache.framebuffer(target) == Some(framebuffer) {
            return Ok(self.skipped("bind_framebuffer"));
        }
        self.device.bind_framebuffer(target, framebuffer)?;

        let (read, draw) = match target {
            FramebufferTarget::Both => (true, true),
            FramebufferTarget::Read => (true, false),
            FramebufferTarget::Draw => (false, true),
        };
        if read {
            self.cache.read_framebuffer = Some(framebuffer);
        }
        if draw {
            self.cache.draw_framebuffer = Some(framebuffer);
            self.cache.draw_buffers = None;
        }
        self.cache.program = None;
        Ok(self.issued())
    }

    /// Binds a vertex array. The element buffer binding belongs to the vertex
    /// array, so it is forgotten when the vertex array changes.
    pub fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> Result<bool> {
        if self.cache.vertex_array == Some(vertex_array) {
            return Ok(self.skipped("bind_vertex_array"));
        }
        self.device.bind_vertex_array(vertex_array)?;
        self.cache.vertex_array = Some(vertex_array);
        self.cache.buffers[BufferTarget::ElementArrayBuffer.index()] = None;
        Ok(self.issued())
    }

    /// Makes `program` the active shader program.
    pub fn use_program(&mut self, program: ProgramHandle) -> Result<bool> {
        if self.cache.program == Some(program) {
            return Ok(self.skipped("use_program"));
        }
        self.device.use_program(program)?;
        self.cache.program = Some(program);
        Ok(self.issued())
    }

    /// Enables or disables a capability. The first request for each
    /// capability always reaches the device.
    pub fn set_capability(&mut self, capability: Capability, enabled: bool) -> Result<bool> {
        if self.cache.capability(capability) == Some(enabled) {
            return Ok(self.skipped("set_capability"));
        }
        self.device.set_capability(capability, enabled)?;
        self.cache.capabilities[capability.index()] = Some(enabled);
        Ok(self.issued())
    }

    /// Sets the color write mask.
    pub fn set_color_mask(&mut self, mask: ColorMask) -> Result<bool> {
        if self.cache.color_mask == Some(mask) {
            return Ok(self.skipped("set_color_mask"));
        }
        self.device.set_color_mask(mask)?;
        self.cache.color_mask = Some(mask);
        Ok(self.issued())
    }

    /// Sets the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<bool> {
        if self.cache.viewport == Some(viewport) {
            return Ok(self.skipped("set_viewport"));
        }
        self.device.set_viewport(viewport)?;
        self.cache.viewport = Some(viewport);
        Ok(self.issued())
    }

    /// Selects the color attachments of the bound draw framebuffer that
    /// fragment outputs go to.
    pub fn set_draw_buffers(&mut self, attachments: &[ColorAttachment]) -> Result<bool> {
        if let Some(bad) = attachments
            .iter()
            .find(|a| u32::from(a.0) >= self.limits.max_color_attachments)
        {
            let err = RenderError::invalid_target(
                "color attachment",
                format!(
                    "{bad:?} is out of range (max {})",
                    self.limits.max_color_attachments
                ),
            );
            log::warn!("{err}");
            return Err(err);
        }
        if self.cache.draw_buffers() == Some(attachments) {
            return Ok(self.skipped("set_draw_buffers"));
        }
        self.device.set_draw_buffers(attachments)?;
        self.cache.draw_buffers = Some(attachments.to_vec());
        Ok(self.issued())
    }

    // Work calls below are not cached: repeating them repeats the work.

    /// Binds a texture level to an image unit.
    pub fn bind_image_texture(&mut self, binding: &ImageBinding) -> Result<()> {
        self.device.bind_image_texture(binding)?;
        self.issued();
        Ok(())
    }

    /// Writes an integer uniform of the active program.
    pub fn set_uniform_i32(&mut self, location: i32, value: i32) -> Result<()> {
        self.device.set_uniform_i32(location, value)?;
        self.issued();
        Ok(())
    }

    /// Draws indexed primitives from the bound element buffer.
    pub fn draw_elements(
        &mut self,
        mode: PrimitiveMode,
        count: u32,
        index_format: IndexFormat,
        offset: u64,
    ) -> Result<()> {
        self.draw(&DrawCall::Elements {
            mode,
            count,
            index_format,
            offset,
        })
    }

    /// Draws non-indexed primitives.
    pub fn draw_arrays(&mut self, mode: PrimitiveMode, first: u32, count: u32) -> Result<()> {
        self.draw(&DrawCall::Arrays { mode, first, count })
    }

    /// Submits a prepared draw call.
    pub fn draw(&mut self, call: &DrawCall) -> Result<()> {
        self.device.draw(call)?;
        self.issued();
        Ok(())
    }

    /// Dispatches compute work groups with the active program.
    pub fn dispatch_compute(&mut self, groups: [u32; 3]) -> Result<()> {
        self.device.dispatch_compute(groups)?;
        self.issued();
        Ok(())
    }

    /// Clears the bound draw framebuffer.
    pub fn clear(&mut self, request: &ClearRequest) -> Result<()> {
        self.device.clear(request)?;
        self.issued();
        Ok(())
    }
}
