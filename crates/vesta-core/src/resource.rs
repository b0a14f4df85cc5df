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

//! Identifiers operations use to refer to things they do not own.

use crate::device::{BufferHandle, FramebufferHandle, TextureHandle};

/// Identifies a scene component (mesh, material, transform...) that backs one
/// or more operations.
///
/// Components are owned by the scene, not by the render graph. Operations keep
/// a `ComponentId` only so the graph can prune them when the component goes
/// away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u64);

/// A device resource an operation reads or writes.
///
/// Used by the optimizers to find ordering constraints between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    /// A texture, including framebuffer attachments.
    Texture(TextureHandle),
    /// A buffer.
    Buffer(BufferHandle),
    /// A framebuffer as a whole.
    Framebuffer(FramebufferHandle),
}
