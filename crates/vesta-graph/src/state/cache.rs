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

use vesta_core::device::{
    BufferHandle, BufferTarget, Capability, ColorAttachment, ColorMask, FramebufferHandle,
    FramebufferTarget, ProgramHandle, SamplerHandle, TextureHandle, TextureTarget,
    VertexArrayHandle, Viewport,
};
use vesta_core::DeviceLimits;

/// The last value submitted to the device for every cached slot.
///
/// `None` means the value is unknown (or, for the program, unset): the next
/// request for that slot always reaches the device. A fresh cache starts from
/// the state a newly created device is documented to have: every texture,
/// sampler, buffer and framebuffer slot holds the neutral handle, texture unit
/// 0 is active and all color channels are writable. The program, viewport,
/// draw buffers and capabilities start unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct StateCache {
    pub(crate) active_unit: Option<u32>,
    pub(crate) textures: Vec<[Option<TextureHandle>; TextureTarget::COUNT]>,
    pub(crate) samplers: Vec<Option<SamplerHandle>>,
    pub(crate) buffers: [Option<BufferHandle>; BufferTarget::COUNT],
    /// Indexed binding points; empty for targets that are not indexed.
    pub(crate) indexed_buffers: [Vec<Option<BufferHandle>>; BufferTarget::COUNT],
    pub(crate) read_framebuffer: Option<FramebufferHandle>,
    pub(crate) draw_framebuffer: Option<FramebufferHandle>,
    pub(crate) vertex_array: Option<VertexArrayHandle>,
    pub(crate) program: Option<ProgramHandle>,
    pub(crate) color_mask: Option<ColorMask>,
    pub(crate) viewport: Option<Viewport>,
    pub(crate) draw_buffers: Option<Vec<ColorAttachment>>,
    pub(crate) capabilities: [Option<bool>; Capability::COUNT],
}

impl StateCache {
    /// Creates a cache sized for `limits`, holding the initial device state.
    pub fn new(limits: &DeviceLimits) -> Self {
        let units = limits.max_texture_units as usize;
        Self {
            active_unit: Some(0),
            textures: vec![[Some(TextureHandle::NONE); TextureTarget::COUNT]; units],
            samplers: vec![Some(SamplerHandle::NONE); units],
            buffers: [Some(BufferHandle::NONE); BufferTarget::COUNT],
            indexed_buffers: std::array::from_fn(|index| {
                let points = limits
                    .indexed_bindings(BufferTarget::ALL[index])
                    .unwrap_or(0);
                vec![Some(BufferHandle::NONE); points as usize]
            }),
            read_framebuffer: Some(FramebufferHandle::NONE),
            draw_framebuffer: Some(FramebufferHandle::NONE),
            vertex_array: Some(VertexArrayHandle::NONE),
            program: None,
            color_mask: Some(ColorMask::ALL),
            viewport: None,
            draw_buffers: None,
            capabilities: [None; Capability::COUNT],
        }
    }

    /// Forgets every cached value, keeping the table sizes.
    pub fn invalidate(&mut self) {
        self.active_unit = None;
        self.textures
            .iter_mut()
            .for_each(|unit| *unit = [None; TextureTarget::COUNT]);
        self.samplers.iter_mut().for_each(|s| *s = None);
        self.buffers = [None; BufferTarget::COUNT];
        self.indexed_buffers
            .iter_mut()
            .flat_map(|points| points.iter_mut())
            .for_each(|b| *b = None);
        self.read_framebuffer = None;
        self.draw_framebuffer = None;
        self.vertex_array = None;
        self.program = None;
        self.color_mask = None;
        self.viewport = None;
        self.draw_buffers = None;
        self.capabilities = [None; Capability::COUNT];
    }

    /// The active texture unit.
    pub fn active_unit(&self) -> Option<u32> {
        self.active_unit
    }

    /// The texture bound to `target` of texture unit `unit`.
    pub fn texture(&self, unit: u32, target: TextureTarget) -> Option<TextureHandle> {
        self.textures
            .get(unit as usize)
            .and_then(|slots| slots[target.index()])
    }

    /// The sampler bound to texture unit `unit`.
    pub fn sampler(&self, unit: u32) -> Option<SamplerHandle> {
        self.samplers.get(unit as usize).copied().flatten()
    }

    /// The buffer bound to the generic binding point of `target`.
    pub fn buffer(&self, target: BufferTarget) -> Option<BufferHandle> {
        self.buffers[target.index()]
    }

    /// The buffer bound to binding point `index` of an indexed target.
    pub fn indexed_buffer(&self, target: BufferTarget, index: u32) -> Option<BufferHandle> {
        self.indexed_buffers[target.index()]
            .get(index as usize)
            .copied()
            .flatten()
    }

    /// The framebuffer bound to `target`. For [`FramebufferTarget::Both`] this
    /// is only known when the read and draw bindings agree.
    pub fn framebuffer(&self, target: FramebufferTarget) -> Option<FramebufferHandle> {
        match target {
            FramebufferTarget::Read => self.read_framebuffer,
            FramebufferTarget::Draw => self.draw_framebuffer,
            FramebufferTarget::Both => match (self.read_framebuffer, self.draw_framebuffer) {
                (Some(read), Some(draw)) if read == draw => Some(read),
                _ => None,
            },
        }
    }

    /// The bound vertex array.
    pub fn vertex_array(&self) -> Option<VertexArrayHandle> {
        self.vertex_array
    }

    /// The active shader program, or `None` if it is unset.
    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    /// The color write mask.
    pub fn color_mask(&self) -> Option<ColorMask> {
        self.color_mask
    }

    /// The viewport.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// The draw buffers of the bound draw framebuffer.
    pub fn draw_buffers(&self) -> Option<&[ColorAttachment]> {
        self.draw_buffers.as_deref()
    }

    /// Whether `capability` is enabled, if known.
    pub fn capability(&self, capability: Capability) -> Option<bool> {
        self.capabilities[capability.index()]
    }

    /// Number of texture units the cache tracks.
    pub fn texture_units(&self) -> u32 {
        self.textures.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cache_mirrors_initial_device_state() {
        let cache = StateCache::new(&DeviceLimits::default());
        assert_eq!(cache.active_unit(), Some(0));
        assert_eq!(
            cache.texture(31, TextureTarget::TextureCubeMap),
            Some(TextureHandle::NONE)
        );
        assert_eq!(cache.texture(32, TextureTarget::Texture2D), None);
        assert_eq!(
            cache.indexed_buffer(BufferTarget::UniformBuffer, 35),
            Some(BufferHandle::NONE)
        );
        assert_eq!(cache.indexed_buffer(BufferTarget::ArrayBuffer, 0), None);
        assert_eq!(
            cache.framebuffer(FramebufferTarget::Both),
            Some(FramebufferHandle::NONE)
        );
        assert_eq!(cache.program(), None);
        assert_eq!(cache.capability(Capability::DepthTest), None);
    }

    #[test]
    fn invalidate_forgets_everything() {
        let mut cache = StateCache::new(&DeviceLimits::default());
        cache.program = Some(ProgramHandle(3));
        cache.invalidate();
        assert_eq!(cache.active_unit(), None);
        assert_eq!(cache.program(), None);
        assert_eq!(cache.texture(0, TextureTarget::Texture2D), None);
        assert_eq!(cache.buffer(BufferTarget::ArrayBuffer), None);
        assert_eq!(cache.texture_units(), 32);
    }

    #[test]
    fn both_framebuffer_needs_agreement() {
        let mut cache = StateCache::new(&DeviceLimits::default());
        cache.read_framebuffer = Some(FramebufferHandle(1));
        assert_eq!(cache.framebuffer(FramebufferTarget::Both), None);
        assert_eq!(
            cache.framebuffer(FramebufferTarget::Draw),
            Some(FramebufferHandle::NONE)
        );
    }
}
