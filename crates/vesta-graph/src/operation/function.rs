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

use super::{Operation, OperationKind, StateEffect};
use crate::state::StateTracker;
use std::fmt;
use vesta_core::error::Result;
use vesta_core::{ComponentId, ResourceId};

type Callback = Box<dyn Fn(&mut StateTracker) -> Result<()> + Send>;

/// Runs a user callback against the state tracker.
///
/// The callback may touch any state, so optimizers treat this operation as a
/// barrier unless it declares what it reads and writes.
pub struct FunctionOperation {
    label: String,
    callback: Callback,
    component: Option<ComponentId>,
    reads: Vec<ResourceId>,
    writes: Vec<ResourceId>,
}

impl FunctionOperation {
    /// Wraps `callback` under `label`.
    pub fn new<F>(label: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut StateTracker) -> Result<()> + Send + 'static,
    {
        Self {
            label: label.into(),
            callback: Box::new(callback),
            component: None,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Records the component the callback works for.
    pub fn owned_by(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }

    /// Declares a resource the callback reads.
    pub fn reading(mut self, resource: ResourceId) -> Self {
        self.reads.push(resource);
        self
    }

    /// Declares a resource the callback writes.
    pub fn writing(mut self, resource: ResourceId) -> Self {
        self.writes.push(resource);
        self
    }
}

impl fmt::Debug for FunctionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionOperation")
            .field("label", &self.label)
            .field("component", &self.component)
            .field("reads", &self.reads)
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}

impl Operation for FunctionOperation {
    fn kind(&self) -> OperationKind {
        OperationKind::Function
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn execute(&self, state: &mut StateTracker) -> Result<()> {
        (self.callback)(state)
    }

    fn depends_on(&self, component: ComponentId) -> bool {
        self.component == Some(component)
    }

    fn state_effect(&self) -> StateEffect {
        StateEffect::Unknown
    }

    fn reads(&self) -> Vec<ResourceId> {
        self.reads.clone()
    }

    fn writes(&self) -> Vec<ResourceId> {
        self.writes.clone()
    }
}
