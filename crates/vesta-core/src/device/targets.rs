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

//! Binding targets and the tables that map external enum values onto them.
//!
//! Every target family is a dense enum whose discriminant doubles as the
//! compact index used by the state cache. The raw code of each variant is the
//! value the external device API uses for it. Raw codes coming from outside
//! (asset metadata, user code) are resolved through a `const` lookup table;
//! [`verify_tables`] re-checks those tables at startup.

use crate::error::RenderError;

macro_rules! binding_targets {
    (
        $(#[$meta:meta])*
        pub enum $name:ident in $table:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $raw:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        #[doc = concat!("Raw-code lookup table for [`", stringify!($name), "`].")]
        pub const $table: &[(u32, $name)] = &[ $( ($raw, $name::$variant) ),+ ];

        impl $name {
            /// Every variant, in index order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Number of variants; the size of any per-target cache table.
            pub const COUNT: usize = Self::ALL.len();

            /// Compact index of this target.
            #[inline]
            pub const fn index(self) -> usize {
                self as usize
            }

            /// The external enum value of this target.
            #[inline]
            pub const fn raw(self) -> u32 {
                match self {
                    $( $name::$variant => $raw ),+
                }
            }

            /// Resolves an external enum value through the lookup table.
            pub fn from_raw(raw: u32) -> Option<Self> {
                $table
                    .iter()
                    .find(|(code, _)| *code == raw)
                    .map(|&(_, target)| target)
            }
        }

        impl TryFrom<u32> for $name {
            type Error = RenderError;

            fn try_from(raw: u32) -> Result<Self, Self::Error> {
                Self::from_raw(raw).ok_or_else(|| {
                    RenderError::invalid_target(
                        stringify!($name),
                        format!("unknown code {raw:#06x}"),
                    )
                })
            }
        }

        const _: () = assert!($table.len() == $name::COUNT);
    };
}

binding_targets! {
    /// Texture binding targets. Each texture unit has one slot per target.
    pub enum TextureTarget in TEXTURE_TARGET_TABLE {
        /// One-dimensional texture.
        Texture1D = 0x0DE0,
        /// Two-dimensional texture.
        Texture2D = 0x0DE1,
        /// Three-dimensional texture.
        Texture3D = 0x806F,
        /// Array of one-dimensional textures.
        Texture1DArray = 0x8C18,
        /// Array of two-dimensional textures.
        Texture2DArray = 0x8C1A,
        /// Rectangle texture (non-normalized coordinates).
        TextureRectangle = 0x84F5,
        /// Cube map.
        TextureCubeMap = 0x8513,
        /// Array of cube maps.
        TextureCubeMapArray = 0x9009,
        /// Buffer texture.
        TextureBuffer = 0x8C2A,
        /// Multisampled two-dimensional texture.
        Texture2DMultisample = 0x9100,
        /// Array of multisampled two-dimensional textures.
        Texture2DMultisampleArray = 0x9102,
    }
}

binding_targets! {
    /// Buffer binding targets.
    pub enum BufferTarget in BUFFER_TARGET_TABLE {
        /// Vertex attribute data.
        ArrayBuffer = 0x8892,
        /// Atomic counter storage (indexed).
        AtomicCounterBuffer = 0x92C0,
        /// Source of buffer copies.
        CopyReadBuffer = 0x8F36,
        /// Destination of buffer copies.
        CopyWriteBuffer = 0x8F37,
        /// Indirect draw arguments.
        DrawIndirectBuffer = 0x8F3F,
        /// Indirect compute dispatch arguments.
        DispatchIndirectBuffer = 0x90EE,
        /// Vertex indices.
        ElementArrayBuffer = 0x8893,
        /// Pixel read-back target.
        PixelPackBuffer = 0x88EB,
        /// Texture upload source.
        PixelUnpackBuffer = 0x88EC,
        /// Shader storage (indexed).
        ShaderStorageBuffer = 0x90D2,
        /// Texture buffer backing store.
        TextureBuffer = 0x8C2A,
        /// Transform feedback output (indexed).
        TransformFeedbackBuffer = 0x8C8E,
        /// Uniform block storage (indexed).
        UniformBuffer = 0x8A11,
    }
}

binding_targets! {
    /// Framebuffer binding targets.
    pub enum FramebufferTarget in FRAMEBUFFER_TARGET_TABLE {
        /// Binds both the read and the draw framebuffer.
        Both = 0x8D40,
        /// The framebuffer read operations source from.
        Read = 0x8CA8,
        /// The framebuffer draw operations write to.
        Draw = 0x8CA9,
    }
}

binding_targets! {
    /// Device capabilities that can be toggled on or off.
    pub enum Capability in CAPABILITY_TABLE {
        /// Color blending.
        Blend = 0x0BE2,
        /// Face culling.
        CullFace = 0x0B44,
        /// Depth testing.
        DepthTest = 0x0B71,
        /// Stencil testing.
        StencilTest = 0x0B90,
        /// Scissor testing.
        ScissorTest = 0x0C11,
        /// Polygon offset for filled primitives.
        PolygonOffsetFill = 0x8037,
        /// Multisample rasterization.
        Multisample = 0x809D,
        /// Discard primitives before rasterization.
        RasterizerDiscard = 0x8C89,
        /// Point size written by the vertex stage.
        ProgramPointSize = 0x8642,
        /// Seamless filtering across cube map faces.
        TextureCubeMapSeamless = 0x884F,
        /// Primitive restart.
        PrimitiveRestart = 0x8F9D,
        /// Depth clamping.
        DepthClamp = 0x864F,
    }
}

impl BufferTarget {
    /// Returns `true` for targets that have indexed binding points.
    pub const fn is_indexed(self) -> bool {
        matches!(
            self,
            BufferTarget::AtomicCounterBuffer
                | BufferTarget::ShaderStorageBuffer
                | BufferTarget::TransformFeedbackBuffer
                | BufferTarget::UniformBuffer
        )
    }
}

/// Re-checks every lookup table against its enum.
///
/// The tables are generated next to their enums so a mismatch should never
/// survive compilation, but hand edits to a table can still break the one
/// property the compiler does not see: that each raw code is unique and each
/// compact index is covered exactly once. Every problem found becomes a
/// [`RenderError::ConfigurationWarning`]; an empty vector means all is well.
pub fn verify_tables() -> Vec<RenderError> {
    let mut warnings = Vec::new();
    verify_table(
        "texture target",
        TEXTURE_TARGET_TABLE,
        TextureTarget::COUNT,
        TextureTarget::index,
        &mut warnings,
    );
    verify_table(
        "buffer target",
        BUFFER_TARGET_TABLE,
        BufferTarget::COUNT,
        BufferTarget::index,
        &mut warnings,
    );
    verify_table(
        "framebuffer target",
        FRAMEBUFFER_TARGET_TABLE,
        FramebufferTarget::COUNT,
        FramebufferTarget::index,
        &mut warnings,
    );
    verify_table(
        "capability",
        CAPABILITY_TABLE,
        Capability::COUNT,
        Capability::index,
        &mut warnings,
    );
    warnings
}

fn verify_table<T: Copy + std::fmt::Debug>(
    family: &str,
    table: &[(u32, T)],
    count: usize,
    index_of: fn(T) -> usize,
    warnings: &mut Vec<RenderError>,
) {
    if table.len() != count {
        warnings.push(RenderError::ConfigurationWarning(format!(
            "not all {family}s were added to the lookup table ({} of {count})",
            table.len()
        )));
    }

    let mut covered = vec![false; count];
    for (position, &(raw, target)) in table.iter().enumerate() {
        if table[..position].iter().any(|(other, _)| *other == raw) {
            warnings.push(RenderError::ConfigurationWarning(format!(
                "{family} code {raw:#06x} appears more than once"
            )));
        }
        match covered.get_mut(index_of(target)) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => warnings.push(RenderError::ConfigurationWarning(format!(
                "{family} {target:?} is mapped more than once"
            ))),
            None => warnings.push(RenderError::ConfigurationWarning(format!(
                "{family} {target:?} has an index outside the table"
            ))),
        }
    }
}
