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

//! Operations that bind resources.

use super::inputs::{BufferSource, ShaderInput, TextureSource};
use super::{swallow, Operation, OperationKind, StateAssignment, StateEffect, StateSlot, StateValue};
use crate::state::StateTracker;
use vesta_core::device::{
    BufferHandle, BufferTarget, ColorAttachment, FramebufferHandle, FramebufferTarget,
    ImageAccess, ImageBinding, ProgramHandle, SamplerHandle, TextureHandle,
};
use vesta_core::error::{RenderError, Result};
use vesta_core::{ComponentId, ResourceId};

/// Internal format -> image format. Image units only accept 1-, 2- and
/// 4-component formats, so 3-component formats map to their 4-component
/// counterpart.
const IMAGE_FORMAT_PROMOTIONS: &[(u32, u32)] = &[
    (0x1907, 0x8058), // RGB -> RGBA8
    (0x804F, 0x8058), // RGB4 -> RGBA8
    (0x8050, 0x8058), // RGB5 -> RGBA8
    (0x8051, 0x8058), // RGB8 -> RGBA8
    (0x8F96, 0x8F97), // RGB8_SNORM -> RGBA8_SNORM
    (0x8052, 0x805A), // RGB10 -> RGBA12
    (0x8053, 0x805A), // RGB12 -> RGBA12
    (0x8054, 0x805B), // RGB16 -> RGBA16
    (0x8C3A, 0x805B), // R11F_G11F_B10F -> RGBA16
    (0x8F9A, 0x8F9B), // RGB16_SNORM -> RGBA16_SNORM
    (0x881B, 0x881A), // RGB16F -> RGBA16F
    (0x8815, 0x8814), // RGB32F -> RGBA32F
    (0x8D8F, 0x8D8E), // RGB8I -> RGBA8I
    (0x8D7D, 0x8D7C), // RGB8UI -> RGBA8UI
    (0x8D89, 0x8D88), // RGB16I -> RGBA16I
    (0x8D77, 0x8D76), // RGB16UI -> RGBA16UI
    (0x8D83, 0x8D82), // RGB32I -> RGBA32I
    (0x8D71, 0x8D70), // RGB32UI -> RGBA32UI
];

/// Maps a texture internal format to the format an image unit binds it as.
/// Formats that need no promotion are returned unchanged.
pub fn promote_image_format(internal_format: u32) -> u32 {
    IMAGE_FORMAT_PROMOTIONS
        .iter()
        .find(|(from, _)| *from == internal_format)
        .map_or(internal_format, |&(_, to)| to)
}

fn uniform_assignment(input: &ShaderInput) -> StateAssignment {
    StateAssignment::new(
        StateSlot::Uniform {
            program: input.program,
            location: input.location,
        },
        StateValue::Int(input.unit as i32),
    )
}

/// Binds a texture and its sampler to the unit a sampler uniform reads from.
#[derive(Debug, Clone, Default)]
pub struct BindTexture {
    source: Option<TextureSource>,
    input: Option<ShaderInput>,
}

impl BindTexture {
    /// Creates the operation and connects it.
    pub fn new(source: Option<TextureSource>, input: Option<ShaderInput>) -> Self {
        let mut op = Self::default();
        op.connect(source, input);
        op
    }

    /// Connects a texture to a sampler uniform. If either is missing the
    /// operation becomes a no-op.
    pub fn connect(&mut self, source: Option<TextureSource>, input: Option<ShaderInput>) {
        match (source, input) {
            (Some(source), Some(input)) => {
                self.source = Some(source);
                self.input = Some(input);
            }
            _ => {
                self.source = None;
                self.input = None;
            }
        }
    }

    /// The connected texture.
    pub fn source(&self) -> Option<&TextureSource> {
        self.source.as_ref()
    }
}

impl Operation for BindTexture {
    fn kind(&self) -> OperationKind {
        OperationKind::BindTexture
    }

    fn is_valid(&self) -> bool {
        self.source.is_some() && self.input.is_some()
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        let (Some(source), Some(input)) = (&self.source, &self.input) else {
            return Ok(());
        };
        state.use_program(input.program)?;
        state.set_uniform_i32(input.location, input.unit as i32)?;
        state.bind_texture(input.unit, source.target, source.texture)?;
        state.bind_sampler(input.unit, source.sampler)?;
        Ok(())
    }

    fn depends_on(&self, component: ComponentId) -> bool {
        self.source
            .is_some_and(|source| source.component == Some(component))
    }

    fn state_effect(&self) -> StateEffect {
        let (Some(source), Some(input)) = (&self.source, &self.input) else {
            return StateEffect::State(Vec::new());
        };
        StateEffect::State(vec![
            StateAssignment::new(StateSlot::Program, StateValue::Program(input.program)),
            uniform_assignment(input),
            StateAssignment::new(
                StateSlot::Texture {
                    unit: input.unit,
                    target: source.target,
                },
                StateValue::Texture(source.texture),
            ),
            StateAssignment::new(
                StateSlot::Sampler { unit: input.unit },
                StateValue::Sampler(source.sampler),
            ),
        ])
    }

    fn reads(&self) -> Vec<ResourceId> {
        self.source
            .iter()
            .map(|source| ResourceId::Texture(source.texture))
            .collect()
    }

    fn teardown(&mut self, state: &mut StateTracker) {
        let (Some(source), Some(input)) = (&self.source, &self.input) else {
            return;
        };
        let label = self.label();
        swallow(
            &label,
            state.bind_texture(input.unit, source.target, TextureHandle::NONE),
        );
        swallow(&label, state.bind_sampler(input.unit, SamplerHandle::NONE));
    }
}

/// Binds one level of a texture to the image unit an image uniform uses.
#[derive(Debug, Clone, Default)]
pub struct BindImageTexture {
    source: Option<TextureSource>,
    input: Option<ShaderInput>,
    access: ImageAccess,
}

impl BindImageTexture {
    /// Creates the operation and connects it.
    pub fn new(
        source: Option<TextureSource>,
        input: Option<ShaderInput>,
        access: ImageAccess,
    ) -> Self {
        let mut op = Self::default();
        op.connect(source, input, access);
        op
    }

    /// Connects a texture to an image uniform. If either is missing the
    /// operation becomes a no-op.
    pub fn connect(
        &mut self,
        source: Option<TextureSource>,
        input: Option<ShaderInput>,
        access: ImageAccess,
    ) {
        self.access = access;
        match (source, input) {
            (Some(source), Some(input)) => {
                self.source = Some(source);
                self.input = Some(input);
            }
            _ => {
                self.source = None;
                self.input = None;
            }
        }
    }

    /// The image binding the operation submits, if connected.
    pub fn binding(&self) -> Option<ImageBinding> {
        let (source, input) = (self.source.as_ref()?, self.input.as_ref()?);
        Some(ImageBinding {
            unit: input.unit,
            texture: source.texture,
            level: 0,
            layered: true,
            layer: 0,
            access: self.access,
            format: promote_image_format(source.internal_format),
        })
    }
}

impl Operation for BindImageTexture {
    fn kind(&self) -> OperationKind {
        OperationKind::BindImageTexture
    }

    fn is_valid(&self) -> bool {
        self.source.is_some() && self.input.is_some()
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        let (Some(input), Some(binding)) = (&self.input, self.binding()) else {
            return Ok(());
        };
        state.use_program(input.program)?;
        state.set_uniform_i32(input.location, input.unit as i32)?;
        state.bind_image_texture(&binding)
    }

    fn depends_on(&self, component: ComponentId) -> bool {
        self.source
            .is_some_and(|source| source.component == Some(component))
    }

    fn state_effect(&self) -> StateEffect {
        let (Some(input), Some(binding)) = (&self.input, self.binding()) else {
            return StateEffect::State(Vec::new());
        };
        StateEffect::State(vec![
            StateAssignment::new(StateSlot::Program, StateValue::Program(input.program)),
            uniform_assignment(input),
            StateAssignment::new(StateSlot::ImageUnit(input.unit), StateValue::Image(binding)),
        ])
    }

    fn reads(&self) -> Vec<ResourceId> {
        match (&self.source, self.access) {
            (Some(source), ImageAccess::ReadOnly | ImageAccess::ReadWrite) => {
                vec![ResourceId::Texture(source.texture)]
            }
            _ => Vec::new(),
        }
    }

    fn writes(&self) -> Vec<ResourceId> {
        match (&self.source, self.access) {
            (Some(source), ImageAccess::WriteOnly | ImageAccess::ReadWrite) => {
                vec![ResourceId::Texture(source.texture)]
            }
            _ => Vec::new(),
        }
    }

    fn teardown(&mut self, state: &mut StateTracker) {
        let Some(binding) = self.binding() else {
            return;
        };
        let neutral = ImageBinding::neutral(binding.unit, binding.format);
        if let Err(err) = state.bind_image_texture(&neutral) {
            log::debug!("Teardown of '{}' failed: {err}", self.label());
        }
    }
}

/// Binds a buffer to the generic binding point of a target.
#[derive(Debug, Clone)]
pub struct BindBuffer {
    target: BufferTarget,
    source: Option<BufferSource>,
}

impl BindBuffer {
    /// Creates the operation and connects it.
    pub fn new(target: BufferTarget, source: Option<BufferSource>) -> Self {
        Self { target, source }
    }

    /// Connects a buffer. `None` turns the operation into a no-op.
    pub fn connect(&mut self, source: Option<BufferSource>) {
        self.source = source;
    }

    /// The target the buffer is bound to.
    pub fn target(&self) -> BufferTarget {
        self.target
    }
}

impl Operation for BindBuffer {
    fn kind(&self) -> OperationKind {
        OperationKind::BindBuffer
    }

    fn label(&self) -> String {
        format!("BindBuffer({:?})", self.target)
    }

    fn is_valid(&self) -> bool {
        self.source.is_some()
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        if let Some(source) = &self.source {
            state.bind_buffer(self.target, source.buffer)?;
        }
        Ok(())
    }

    fn depends_on(&self, component: ComponentId) -> bool {
        self.source
            .is_some_and(|source| source.component == Some(component))
    }

    fn state_effect(&self) -> StateEffect {
        StateEffect::State(
            self.source
                .iter()
                .map(|source| {
                    StateAssignment::new(
                        StateSlot::Buffer(self.target),
                        StateValue::Buffer(source.buffer),
                    )
                })
                .collect(),
        )
    }

    fn reads(&self) -> Vec<ResourceId> {
        self.source
            .iter()
            .map(|source| ResourceId::Buffer(source.buffer))
            .collect()
    }

    fn teardown(&mut self, state: &mut StateTracker) {
        if self.source.is_some() {
            swallow(&self.label(), state.bind_buffer(self.target, BufferHandle::NONE));
        }
    }
}

/// Binds a buffer to one binding point of an indexed target.
#[derive(Debug, Clone)]
pub struct BindBufferBase {
    target: BufferTarget,
    index: u32,
    source: Option<BufferSource>,
}

impl BindBufferBase {
    /// Creates the operation and connects it. A target without indexed
    /// binding points leaves the operation invalid.
    pub fn new(target: BufferTarget, index: u32, source: Option<BufferSource>) -> Self {
        Self {
            target,
            index,
            source,
        }
    }

    /// Connects a buffer. `None` turns the operation into a no-op.
    pub fn connect(&mut self, source: Option<BufferSource>) {
        self.source = source;
    }
}

impl Operation for BindBufferBase {
    fn kind(&self) -> OperationKind {
        OperationKind::BindBufferBase
    }

    fn label(&self) -> String {
        format!("BindBufferBase({:?}[{}])", self.target, self.index)
    }

    fn is_valid(&self) -> bool {
        self.source.is_some() && self.target.is_indexed()
    }

    fn validate(&self) -> Result<()> {
        if !self.target.is_indexed() {
            return Err(RenderError::invalid_operation(
                self.label(),
                format!("{:?} has no indexed binding points", self.target),
            ));
        }
        if self.source.is_none() {
            return Err(RenderError::invalid_operation(self.label(), "no buffer connected"));
        }
        Ok(())
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        if let Some(source) = &self.source {
            state.bind_buffer_base(self.target, self.index, source.buffer)?;
        }
        Ok(())
    }

    fn depends_on(&self, component: ComponentId) -> bool {
        self.source
            .is_some_and(|source| source.component == Some(component))
    }

    fn state_effect(&self) -> StateEffect {
        let Some(source) = &self.source else {
            return StateEffect::State(Vec::new());
        };
        StateEffect::State(vec![
            StateAssignment::new(
                StateSlot::BufferBase {
                    target: self.target,
                    index: self.index,
                },
                StateValue::Buffer(source.buffer),
            ),
            StateAssignment::new(
                StateSlot::Buffer(self.target),
                StateValue::Buffer(source.buffer),
            ),
        ])
    }

    fn reads(&self) -> Vec<ResourceId> {
        self.source
            .iter()
            .map(|source| ResourceId::Buffer(source.buffer))
            .collect()
    }

    fn writes(&self) -> Vec<ResourceId> {
        if self.target == BufferTarget::UniformBuffer {
            return Vec::new();
        }
        self.reads()
    }

    fn teardown(&mut self, state: &mut StateTracker) {
        if self.is_valid() {
            swallow(
                &self.label(),
                state.bind_buffer_base(self.target, self.index, BufferHandle::NONE),
            );
        }
    }
}

/// Makes a shader program active.
#[derive(Debug, Clone, Default)]
pub struct UseProgram {
    program: Option<ProgramHandle>,
}

impl UseProgram {
    /// Creates the operation and connects it.
    pub fn new(program: Option<ProgramHandle>) -> Self {
        Self { program }
    }

    /// Connects a program. `None` turns the operation into a no-op.
    pub fn connect(&mut self, program: Option<ProgramHandle>) {
        self.program = program;
    }

    /// The connected program.
    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }
}

impl Operation for UseProgram {
    fn kind(&self) -> OperationKind {
        OperationKind::UseProgram
    }

    fn is_valid(&self) -> bool {
        self.program.is_some()
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        if let Some(program) = self.program {
            state.use_program(program)?;
        }
        Ok(())
    }

    fn depends_on(&self, _component: ComponentId) -> bool {
        false
    }

    fn state_effect(&self) -> StateEffect {
        StateEffect::State(
            self.program
                .iter()
                .map(|p| StateAssignment::new(StateSlot::Program, StateValue::Program(*p)))
                .collect(),
        )
    }

    fn teardown(&mut self, state: &mut StateTracker) {
        if self.program.is_some() {
            swallow(&self.label(), state.use_program(ProgramHandle::NONE));
        }
    }
}

/// Binds a framebuffer and selects its draw buffers.
#[derive(Debug, Clone)]
pub struct BindFramebuffer {
    target: FramebufferTarget,
    framebuffer: Option<FramebufferHandle>,
    draw_buffers: Vec<ColorAttachment>,
}

impl BindFramebuffer {
    /// Creates the operation. `Some(FramebufferHandle::NONE)` binds the
    /// default framebuffer; `None` leaves the operation unconnected. An empty
    /// `draw_buffers` keeps whatever the framebuffer already uses.
    pub fn new(
        target: FramebufferTarget,
        framebuffer: Option<FramebufferHandle>,
        draw_buffers: Vec<ColorAttachment>,
    ) -> Self {
        Self {
            target,
            framebuffer,
            draw_buffers,
        }
    }

    /// Connects a framebuffer. `None` turns the operation into a no-op.
    pub fn connect(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.framebuffer = framebuffer;
    }

    /// The draw buffers selected after binding.
    pub fn draw_buffers(&self) -> &[ColorAttachment] {
        &self.draw_buffers
    }

    fn sets_draw_buffers(&self) -> bool {
        !self.draw_buffers.is_empty() && self.target != FramebufferTarget::Read
    }
}

impl Operation for BindFramebuffer {
    fn kind(&self) -> OperationKind {
        OperationKind::BindFramebuffer
    }

    fn label(&self) -> String {
        match self.framebuffer {
            Some(fb) => format!("BindFramebuffer({:?}, {})", self.target, fb.raw()),
            None => "BindFramebuffer(unconnected)".to_string(),
        }
    }

    fn is_valid(&self) -> bool {
        self.framebuffer.is_some()
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        let Some(framebuffer) = self.framebuffer else {
            return Ok(());
        };
        state.bind_framebuffer(self.target, framebuffer)?;
        if self.sets_draw_buffers() {
            state.set_draw_buffers(&self.draw_buffers)?;
        }
        Ok(())
    }

    fn depends_on(&self, _component: ComponentId) -> bool {
        false
    }

    fn state_effect(&self) -> StateEffect {
        let Some(framebuffer) = self.framebuffer else {
            return StateEffect::State(Vec::new());
        };
        let value = StateValue::Framebuffer(framebuffer);
        let mut assignments = Vec::new();
        if self.target != FramebufferTarget::Draw {
            assignments.push(StateAssignment::new(StateSlot::ReadFramebuffer, value.clone()));
        }
        if self.target != FramebufferTarget::Read {
            assignments.push(StateAssignment::new(StateSlot::DrawFramebuffer, value));
        }
        if self.sets_draw_buffers() {
            assignments.push(StateAssignment::new(
                StateSlot::DrawBuffers,
                StateValue::DrawBuffers(self.draw_buffers.clone()),
            ));
        }
        StateEffect::State(assignments)
    }

    fn writes(&self) -> Vec<ResourceId> {
        match self.framebuffer {
            Some(fb) if self.target != FramebufferTarget::Read => {
                vec![ResourceId::Framebuffer(fb)]
            }
            _ => Vec::new(),
        }
    }

    fn teardown(&mut self, state: &mut StateTracker) {
        if self.framebuffer.is_some() {
            swallow(
                &self.label(),
                state.bind_framebuffer(self.target, FramebufferHandle::NONE),
            );
        }
    }
}
