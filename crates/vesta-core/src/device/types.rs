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

//! Plain value types passed to [`GraphicsDevice`](super::GraphicsDevice) calls.

use super::handles::TextureHandle;
use serde::{Deserialize, Serialize};

/// Per-channel color write mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorMask {
    /// Write the red channel.
    pub red: bool,
    /// Write the green channel.
    pub green: bool,
    /// Write the blue channel.
    pub blue: bool,
    /// Write the alpha channel.
    pub alpha: bool,
}

impl ColorMask {
    /// Every channel enabled.
    pub const ALL: Self = Self::new(true, true, true, true);
    /// Every channel disabled.
    pub const NONE: Self = Self::new(false, false, false, false);

    /// Creates a mask from individual channel flags.
    pub const fn new(red: bool, green: bool, blue: bool, alpha: bool) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

impl Default for ColorMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// A viewport rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport anchored at the origin.
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Returns `(width, height)`.
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A color attachment slot of a framebuffer, `COLOR_ATTACHMENT0 + n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColorAttachment(pub u8);

impl ColorAttachment {
    const BASE: u32 = 0x8CE0;

    /// The external enum value of this attachment.
    pub const fn raw(self) -> u32 {
        Self::BASE + self.0 as u32
    }

    /// Resolves an external enum value. Anything below `COLOR_ATTACHMENT0` or
    /// above `COLOR_ATTACHMENT31` yields `None`.
    pub fn from_raw(raw: u32) -> Option<Self> {
        raw.checked_sub(Self::BASE)
            .filter(|n| *n < 32)
            .map(|n| Self(n as u8))
    }
}

/// Access mode of an image unit binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageAccess {
    /// The shader only loads from the image.
    ReadOnly,
    /// The shader only stores to the image.
    WriteOnly,
    /// The shader loads and stores.
    #[default]
    ReadWrite,
}

impl ImageAccess {
    /// The external enum value of this access mode.
    pub const fn raw(self) -> u32 {
        match self {
            ImageAccess::ReadOnly => 0x88B8,
            ImageAccess::WriteOnly => 0x88B9,
            ImageAccess::ReadWrite => 0x88BA,
        }
    }
}

/// Everything needed to bind one texture level to an image unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageBinding {
    /// Image unit index.
    pub unit: u32,
    /// Texture to bind. [`TextureHandle::NONE`] unbinds the unit.
    pub texture: TextureHandle,
    /// Mip level.
    pub level: u32,
    /// Bind all layers of an array/cube/3D texture.
    pub layered: bool,
    /// Layer to bind when `layered` is `false`.
    pub layer: u32,
    /// Access mode.
    pub access: ImageAccess,
    /// Image format code the shader sees the texture as.
    pub format: u32,
}

impl ImageBinding {
    /// The binding that detaches whatever is bound to `unit`.
    pub const fn neutral(unit: u32, format: u32) -> Self {
        Self {
            unit,
            texture: TextureHandle::NONE,
            level: 0,
            layered: true,
            layer: 0,
            access: ImageAccess::ReadWrite,
            format,
        }
    }
}

/// Primitive topology for draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
    Patches,
}

/// Size of the indices in an element buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum IndexFormat {
    U8,
    U16,
    #[default]
    U32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn size(self) -> u64 {
        match self {
            IndexFormat::U8 => 1,
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// A draw submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawCall {
    /// Indexed draw from the bound element buffer.
    Elements {
        /// Topology.
        mode: PrimitiveMode,
        /// Number of indices.
        count: u32,
        /// Index size.
        index_format: IndexFormat,
        /// Byte offset into the element buffer.
        offset: u64,
    },
    /// Non-indexed draw.
    Arrays {
        /// Topology.
        mode: PrimitiveMode,
        /// First vertex.
        first: u32,
        /// Number of vertices.
        count: u32,
    },
}

/// Which buffers a clear touches, and with which values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearRequest {
    /// Clear color, if the color buffers are cleared.
    pub color: Option<[f32; 4]>,
    /// Clear depth, if the depth buffer is cleared.
    pub depth: Option<f32>,
    /// Clear stencil, if the stencil buffer is cleared.
    pub stencil: Option<i32>,
}

impl ClearRequest {
    /// Clears color to `color` and depth to `1.0`.
    pub const fn color_and_depth(color: [f32; 4]) -> Self {
        Self {
            color: Some(color),
            depth: Some(1.0),
            stencil: None,
        }
    }

    /// Returns `true` if nothing would be cleared.
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.depth.is_none() && self.stencil.is_none()
    }
}
