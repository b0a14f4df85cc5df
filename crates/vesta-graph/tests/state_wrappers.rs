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
    BufferHandle, BufferTarget, Capability, ColorMask, FramebufferHandle, FramebufferTarget,
    ProgramHandle, SamplerHandle, TextureHandle, TextureTarget, VertexArrayHandle, Viewport,
};
use vesta_core::{DeviceLimits, RenderError};
use vesta_graph::StateTracker;
use vesta_infra::RecordingDevice;

fn tracker() -> (StateTracker, RecordingDevice) {
    let device = RecordingDevice::new();
    let state = StateTracker::new(Box::new(device.clone()), DeviceLimits::default());
    (state, device)
}

#[test]
fn every_wrapper_is_idempotent() {
    // --- 1. ARRANGE ---
    let (mut state, device) = tracker();

    // --- 2. ACT ---
    // Each request twice in a row.
    for _ in 0..2 {
        state.bind_texture(2, TextureTarget::TextureCubeMap, TextureHandle(7)).unwrap();
        state.bind_sampler(2, SamplerHandle(3)).unwrap();
        state.bind_buffer(BufferTarget::ArrayBuffer, BufferHandle(11)).unwrap();
        state
            .bind_buffer_base(BufferTarget::UniformBuffer, 4, BufferHandle(12))
            .unwrap();
        state
            .bind_framebuffer(FramebufferTarget::Both, FramebufferHandle(9))
            .unwrap();
        state.bind_vertex_array(VertexArrayHandle(5)).unwrap();
        state.use_program(ProgramHandle(8)).unwrap();
        state.set_capability(Capability::DepthTest, true).unwrap();
        state.set_color_mask(ColorMask::new(true, true, true, false)).unwrap();
        state.set_viewport(Viewport::from_size(800, 600)).unwrap();
    }

    // --- 3. ASSERT ---
    // One call per request, plus the single unit switch of the texture bind.
    assert_eq!(device.count("active_texture"), 1);
    for call in [
        "bind_texture",
        "bind_sampler",
        "bind_buffer",
        "bind_buffer_base",
        "bind_framebuffer",
        "bind_vertex_array",
        "use_program",
        "set_capability",
        "set_color_mask",
        "set_viewport",
    ] {
        assert_eq!(device.count(call), 1, "'{call}' should reach the device once");
    }
    assert_eq!(state.issued_calls(), 11);
    assert_eq!(state.skipped_calls(), 10);
}

#[test]
fn texture_slots_track_the_last_bound_handle() {
    let (mut state, device) = tracker();
    let triples = [
        (0, TextureTarget::Texture2D, TextureHandle(1)),
        (0, TextureTarget::Texture3D, TextureHandle(2)),
        (5, TextureTarget::Texture2D, TextureHandle(3)),
        (31, TextureTarget::Texture2DArray, TextureHandle(4)),
    ];

    for (unit, target, texture) in triples {
        // Bind: the slot reports the handle.
        assert!(state.bind_texture(unit, target, texture).unwrap());
        assert_eq!(state.cache().texture(unit, target), Some(texture));

        // Rebind with a different handle: the slot follows.
        let other = TextureHandle(texture.raw() + 100);
        assert!(state.bind_texture(unit, target, other).unwrap());
        assert_eq!(state.cache().texture(unit, target), Some(other));

        // Same handle again: nothing reaches the device.
        let before = device.call_count();
        assert!(!state.bind_texture(unit, target, other).unwrap());
        assert_eq!(device.call_count(), before);
    }
}

#[test]
fn framebuffer_rebind_unsets_the_program() {
    // --- 1. ARRANGE ---
    let (mut state, _device) = tracker();
    state
        .bind_framebuffer(FramebufferTarget::Both, FramebufferHandle(1))
        .unwrap();
    state.use_program(ProgramHandle(4)).unwrap();
    assert_eq!(state.cache().program(), Some(ProgramHandle(4)));

    // --- 2. ACT ---
    state
        .bind_framebuffer(FramebufferTarget::Both, FramebufferHandle(2))
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(state.cache().program(), None);
    // The same program now reaches the device again.
    assert!(state.use_program(ProgramHandle(4)).unwrap());
}

#[test]
fn invalid_targets_are_rejected_without_mutation() {
    let (mut state, device) = tracker();

    let not_indexed = state
        .bind_buffer_base(BufferTarget::ArrayBuffer, 0, BufferHandle(1))
        .unwrap_err();
    let out_of_range = state
        .bind_buffer_base(BufferTarget::ShaderStorageBuffer, 8, BufferHandle(1))
        .unwrap_err();
    let unknown_code = state.bind_buffer_raw(0x1234, BufferHandle(1)).unwrap_err();
    let bad_unit = state
        .bind_texture(32, TextureTarget::Texture2D, TextureHandle(1))
        .unwrap_err();

    for err in [not_indexed, out_of_range, unknown_code, bad_unit] {
        assert!(matches!(err, RenderError::InvalidTarget { .. }), "{err}");
        assert!(err.is_recoverable());
    }
    assert_eq!(device.call_count(), 0);
    assert_eq!(
        state.cache().buffer(BufferTarget::ShaderStorageBuffer),
        Some(BufferHandle::NONE)
    );
}

#[test]
fn raw_codes_resolve_to_typed_targets() {
    let (mut state, _device) = tracker();

    // 0x8892 is the array buffer, 0x0DE1 the 2D texture target.
    state.bind_buffer_raw(0x8892, BufferHandle(6)).unwrap();
    state.bind_texture_raw(1, 0x0DE1, TextureHandle(9)).unwrap();

    assert_eq!(state.cache().buffer(BufferTarget::ArrayBuffer), Some(BufferHandle(6)));
    assert_eq!(
        state.cache().texture(1, TextureTarget::Texture2D),
        Some(TextureHandle(9))
    );
}

#[test]
fn failed_device_calls_leave_the_cache_alone() {
    let (mut state, device) = tracker();
    state.use_program(ProgramHandle(1)).unwrap();
    device.fail_on("use_program");

    let err = state.use_program(ProgramHandle(2)).unwrap_err();

    assert!(matches!(err, RenderError::Device(_)));
    assert_eq!(state.cache().program(), Some(ProgramHandle(1)));

    device.clear_failures();
    assert!(state.use_program(ProgramHandle(2)).unwrap());
}

#[test]
fn invalidate_forces_every_slot_to_the_device() {
    let (mut state, device) = tracker();
    state.set_viewport(Viewport::from_size(64, 64)).unwrap();
    state.bind_vertex_array(VertexArrayHandle(3)).unwrap();

    state.invalidate();
    device.clear();
    state.set_viewport(Viewport::from_size(64, 64)).unwrap();
    state.bind_vertex_array(VertexArrayHandle(3)).unwrap();

    assert_eq!(device.call_count(), 2);
}
