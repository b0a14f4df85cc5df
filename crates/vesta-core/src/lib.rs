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

//! # Vesta Core
//!
//! Foundational crate containing the contracts the render graph is built on:
//! the abstract [`GraphicsDevice`] capability set, typed binding targets and
//! their raw-code lookup tables, the timestamp-query interface, settings, frame
//! statistics and the shared error taxonomy.
//!
//! Nothing in this crate talks to a real graphics API. Concrete devices live in
//! `vesta-infra` (or in an application), and the runtime that drives them lives
//! in `vesta-graph`.

#![warn(missing_docs)]

pub mod device;
pub mod error;
pub mod graph;
pub mod resource;
pub mod settings;
pub mod stats;
pub mod timing;

pub use device::{
    BufferHandle, BufferTarget, Capability, ColorAttachment, ColorMask, FramebufferHandle,
    FramebufferTarget, GraphicsDevice, ProgramHandle, SamplerHandle, TextureHandle,
    TextureTarget, VertexArrayHandle, Viewport,
};
pub use error::{DeviceError, RenderError, Result};
pub use resource::{ComponentId, ResourceId};
pub use settings::{DeviceLimits, OptimizerKind, RenderSettings};
pub use stats::FrameStats;
pub use timing::{QueryId, TimestampQueries};
