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

//! Per-frame statistics of the render manager.

/// Counters collected while rendering a single frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// A sequential counter for rendered frames, starting at 1.
    pub frame_number: u64,
    /// Number of operation steps in the frame plan.
    pub operations_planned: u32,
    /// Number of operations that ran.
    pub operations_executed: u32,
    /// Number of planned operations skipped because they were not connected.
    pub invalid_operations_skipped: u32,
    /// Number of operations whose execution returned an error.
    pub failed_operations: u32,
    /// Device state calls actually issued during the frame.
    pub device_calls_issued: u64,
    /// Device state calls skipped because the cache already held the value.
    pub redundant_calls_skipped: u64,
    /// `true` if the optimizer ran this frame instead of replaying the
    /// previous plan.
    pub reoptimized: bool,
    /// CPU time spent in the optimizer.
    pub cpu_optimize_time_ms: f32,
    /// CPU time spent executing the plan.
    pub cpu_execute_time_ms: f32,
}
