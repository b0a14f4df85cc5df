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

//! Operations that set fixed-function state.

use super::{Operation, OperationKind, StateAssignment, StateEffect, StateSlot, StateValue};
use crate::state::StateTracker;
use vesta_core::device::{Capability, ColorMask, Viewport};
use vesta_core::error::Result;
use vesta_core::ComponentId;

/// Enables or disables a device capability.
#[derive(Debug, Clone, Copy)]
pub struct SetCapability {
    capability: Capability,
    enabled: bool,
}

impl SetCapability {
    /// Enables `capability`.
    pub fn enable(capability: Capability) -> Self {
        Self {
            capability,
            enabled: true,
        }
    }

    /// Disables `capability`.
    pub fn disable(capability: Capability) -> Self {
        Self {
            capability,
            enabled: false,
        }
    }
}

impl Operation for SetCapability {
    fn kind(&self) -> OperationKind {
        OperationKind::SetCapability
    }

    fn label(&self) -> String {
        let verb = if self.enabled { "Enable" } else { "Disable" };
        format!("{verb}({:?})", self.capability)
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        state.set_capability(self.capability, self.enabled)?;
        Ok(())
    }

    fn depends_on(&self, _component: ComponentId) -> bool {
        false
    }

    fn state_effect(&self) -> StateEffect {
        StateEffect::State(vec![StateAssignment::new(
            StateSlot::Capability(self.capability),
            StateValue::Enabled(self.enabled),
        )])
    }
}

/// Sets the color write mask.
#[derive(Debug, Clone, Copy)]
pub struct SetColorMask(pub ColorMask);

impl Operation for SetColorMask {
    fn kind(&self) -> OperationKind {
        OperationKind::SetColorMask
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        state.set_color_mask(self.0)?;
        Ok(())
    }

    fn depends_on(&self, _component: ComponentId) -> bool {
        false
    }

    fn state_effect(&self) -> StateEffect {
        StateEffect::State(vec![StateAssignment::new(
            StateSlot::ColorMask,
            StateValue::ColorMask(self.0),
        )])
    }
}

/// Sets the viewport.
#[derive(Debug, Clone, Copy)]
pub struct SetViewport(pub Viewport);

impl Operation for SetViewport {
    fn kind(&self) -> OperationKind {
        OperationKind::SetViewport
    }

    fn is_valid(&self) -> bool {
        self.0.width > 0 && self.0.height > 0
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        state.set_viewport(self.0)?;
        Ok(())
    }

    fn depends_on(&self, _component: ComponentId) -> bool {
        false
    }

    fn state_effect(&self) -> StateEffect {
        StateEffect::State(vec![StateAssignment::new(
            StateSlot::Viewport,
            StateValue::Viewport(self.0),
        )])
    }
}
