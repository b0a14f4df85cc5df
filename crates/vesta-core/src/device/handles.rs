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

//! Opaque handles to device-side objects.
//!
//! The render graph never creates or destroys these objects; the resource
//! loader hands fully-initialized handles in and the graph only binds them.

macro_rules! device_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub u32);

        impl $name {
            /// The neutral handle. Binding it detaches whatever occupied the slot.
            pub const NONE: Self = Self(0);

            /// Returns `true` for the neutral handle.
            #[inline]
            pub const fn is_none(self) -> bool {
                self.0 == 0
            }

            /// The raw device name of the object.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

device_handle! {
    /// An opaque handle to a texture object.
    TextureHandle
}

device_handle! {
    /// An opaque handle to a buffer object.
    BufferHandle
}

device_handle! {
    /// An opaque handle to a sampler object.
    SamplerHandle
}

device_handle! {
    /// An opaque handle to a framebuffer object. [`FramebufferHandle::NONE`]
    /// is the default (window) framebuffer.
    FramebufferHandle
}

device_handle! {
    /// An opaque handle to a linked shader program.
    ProgramHandle
}

device_handle! {
    /// An opaque handle to a vertex array object.
    VertexArrayHandle
}
