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

use super::{flatten, FramePlan, Optimizer};
use crate::pass::PassGraph;

/// Flattens the hierarchy as is. No reordering, nothing dropped besides
/// run-once passes that already executed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleOptimizer;

impl Optimizer for SimpleOptimizer {
    fn name(&self) -> &'static str {
        "Simple"
    }

    fn optimize(&self, graph: &PassGraph, _previous: &FramePlan) -> FramePlan {
        flatten(graph, |_, passes| passes)
    }
}
