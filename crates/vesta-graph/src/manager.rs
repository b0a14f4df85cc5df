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

//! The render manager: the one owner of the device, its shadow state and the
//! pass hierarchy.

use crate::operation::Operation;
use crate::optimizer::{self, FramePlan, Optimizer, PlanStep};
use crate::pass::{NodePassId, OperationId, PassGraph, PassRef, ProgramPassId, StageId};
use crate::state::StateTracker;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use vesta_core::device::{targets, GraphicsDevice, Viewport};
use vesta_core::error::Result;
use vesta_core::{ComponentId, FrameStats, OptimizerKind, QueryId, RenderSettings, TimestampQueries};
use vesta_telemetry::GpuTimer;

#[derive(Debug, Default)]
struct ExecutionCounts {
    executed: u32,
    invalid: u32,
    failed: u32,
}

/// Drives the render graph one frame at a time.
///
/// Configuration (optimizer, profiling, resolution) is set between frames;
/// [`render_frame`](Self::render_frame) takes no arguments. Every state change,
/// from operations or from outside callers, goes through the manager's
/// [`StateTracker`].
#[derive(Debug)]
pub struct RenderManager {
    state: StateTracker,
    graph: PassGraph,
    optimizer: Box<dyn Optimizer>,
    settings: RenderSettings,
    timer: Option<GpuTimer>,
    pass_queries: HashMap<ProgramPassId, QueryId>,
    pass_durations: BTreeMap<String, f64>,
    plan: Option<FramePlan>,
    frame_number: u64,
    last_stats: FrameStats,
}

impl RenderManager {
    /// Creates a manager over `device`, assumed to be in its initial state.
    ///
    /// Startup checks (binding-target tables, settings) are logged as
    /// warnings and never abort construction.
    pub fn new(device: Box<dyn GraphicsDevice>, settings: RenderSettings) -> Self {
        for warning in targets::verify_tables().into_iter().chain(settings.validate()) {
            log::warn!("{warning}");
        }
        let optimizer = optimizer::from_kind(settings.optimizer);
        log::info!(
            "RenderManager: created with optimizer '{}' at {}x{}",
            optimizer.name(),
            settings.screen_resolution.0,
            settings.screen_resolution.1,
        );
        Self {
            state: StateTracker::new(device, settings.limits),
            graph: PassGraph::new(),
            optimizer,
            settings,
            timer: None,
            pass_queries: HashMap::new(),
            pass_durations: BTreeMap::new(),
            plan: None,
            frame_number: 0,
            last_stats: FrameStats::default(),
        }
    }

    /// Attaches a timestamp query backend, enabling GPU profiling.
    pub fn with_timestamp_queries(mut self, queries: Box<dyn TimestampQueries>) -> Self {
        self.timer = Some(GpuTimer::new(queries));
        self
    }

    // --- Configuration ---

    /// The current settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Replaces the optimizer. The next frame is optimized from scratch.
    pub fn set_optimizer(&mut self, optimizer: Box<dyn Optimizer>) {
        log::info!("RenderManager: optimizer set to '{}'", optimizer.name());
        self.optimizer = optimizer;
        self.plan = None;
    }

    /// Replaces the optimizer with one of the built-in strategies.
    pub fn set_optimizer_kind(&mut self, kind: OptimizerKind) {
        self.settings.optimizer = kind;
        self.set_optimizer(optimizer::from_kind(kind));
    }

    /// The name of the active optimizer.
    pub fn optimizer_name(&self) -> &'static str {
        self.optimizer.name()
    }

    /// Turns per-pass duration queries on or off.
    ///
    /// Without a timestamp backend the flag is stored but nothing is
    /// measured. Turning profiling off releases every pass query.
    pub fn set_gpu_profiling(&mut self, enabled: bool) {
        if enabled && self.timer.is_none() {
            log::warn!("GPU profiling requested, but no timestamp query backend is attached");
        }
        self.settings.gpu_profiling = enabled;
        if !enabled {
            self.release_pass_queries();
        }
    }

    /// Returns `true` if passes are being timed.
    pub fn is_profiling(&self) -> bool {
        self.settings.gpu_profiling && self.timer.is_some()
    }

    /// Applies a whole settings block between frames.
    pub fn apply_settings(&mut self, settings: RenderSettings) {
        for warning in settings.validate() {
            log::warn!("{warning}");
        }
        if settings.limits != self.settings.limits {
            log::debug!("Device limits changed, resetting the state cache");
            self.state.set_limits(settings.limits);
        }
        if settings.optimizer != self.settings.optimizer {
            self.set_optimizer_kind(settings.optimizer);
        }
        self.set_gpu_profiling(settings.gpu_profiling);
        self.settings = settings;
    }

    /// The screen resolution, `(width, height)`.
    pub fn screen_resolution(&self) -> (u32, u32) {
        self.settings.screen_resolution
    }

    /// Records a new screen resolution. The viewport is left alone.
    pub fn set_screen_resolution(&mut self, width: u32, height: u32) {
        self.settings.screen_resolution = (width, height);
    }

    /// Sets the viewport through the state cache.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<bool> {
        self.state.set_viewport(viewport)
    }

    /// The size of the area being rendered to: the viewport if one was set,
    /// the screen resolution otherwise.
    pub fn render_resolution(&self) -> (u32, u32) {
        self.state
            .cache()
            .viewport()
            .map_or(self.settings.screen_resolution, |viewport| viewport.size())
    }

    // --- Access ---

    /// The pass hierarchy.
    pub fn graph(&self) -> &PassGraph {
        &self.graph
    }

    /// The pass hierarchy, for configuration. Structural changes are picked
    /// up by the next frame.
    pub fn graph_mut(&mut self) -> &mut PassGraph {
        &mut self.graph
    }

    /// The state tracker.
    pub fn state(&self) -> &StateTracker {
        &self.state
    }

    /// The state tracker, for state changes requested outside the graph.
    pub fn state_mut(&mut self) -> &mut StateTracker {
        &mut self.state
    }

    /// The plan executed by the last frame.
    pub fn current_plan(&self) -> Option<&FramePlan> {
        self.plan.as_ref()
    }

    /// Statistics of the last rendered frame.
    pub fn last_frame_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    /// The last resolved duration of every timed program pass, in
    /// milliseconds, keyed by pass name. Passes sharing a name share an entry.
    pub fn pass_durations(&self) -> &BTreeMap<String, f64> {
        &self.pass_durations
    }

    // --- Removal ---

    /// Removes a stage and everything below it, tearing down its operations.
    /// Returns how many operations were removed.
    pub fn remove_stage(&mut self, stage: StageId) -> usize {
        let removed = self.graph.remove_stage(stage);
        self.retire(removed)
    }

    /// Removes a program pass and everything below it.
    pub fn remove_program_pass(&mut self, pass: ProgramPassId) -> usize {
        let removed = self.graph.remove_program_pass(pass);
        self.retire(removed)
    }

    /// Removes a node pass and its operations.
    pub fn remove_node_pass(&mut self, node: NodePassId) -> usize {
        let removed = self.graph.remove_node_pass(node);
        self.retire(removed)
    }

    /// Removes one operation. Returns `false` if it was not in the graph.
    ///
    /// # Errors
    /// [`RenderError::InvalidOperation`](vesta_core::RenderError::InvalidOperation)
    /// for the framebuffer and program
    /// binds the graph manages itself.
    pub fn remove_operation(&mut self, operation: OperationId) -> Result<bool> {
        let removed: Vec<_> = self.graph.remove_operation(operation)?.into_iter().collect();
        Ok(self.retire(removed) == 1)
    }

    /// Prunes every operation depending on a component that is going away.
    ///
    /// Runs synchronously; the next frame never sees the pruned operations.
    pub fn on_remove_component(&mut self, component: ComponentId) -> usize {
        let removed = self.graph.remove_component(component);
        if !removed.is_empty() {
            log::debug!(
                "Component {component:?} removed, pruned {} operations",
                removed.len()
            );
        }
        self.retire(removed)
    }

    /// Tears down and drops every operation of the graph.
    pub fn shutdown(&mut self) {
        let removed = self.graph.clear();
        let count = self.retire(removed);
        self.plan = None;
        if count > 0 {
            log::info!("RenderManager: shut down, {count} operations torn down");
        }
    }

    fn retire(&mut self, mut removed: Vec<Box<dyn Operation>>) -> usize {
        for operation in &mut removed {
            operation.teardown(&mut self.state);
        }
        if let Some(timer) = self.timer.as_mut() {
            let graph = &self.graph;
            self.pass_queries.retain(|pass, query| {
                let alive = graph.contains(PassRef::Program(*pass));
                if !alive {
                    release_query(timer, *query);
                }
                alive
            });
        }
        removed.len()
    }

    fn release_pass_queries(&mut self) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        for (_, query) in self.pass_queries.drain() {
            release_query(timer, query);
        }
        self.pass_durations.clear();
    }

    // --- Frame ---

    /// Renders one frame: optimizes the hierarchy if it changed, then executes
    /// the plan in order.
    ///
    /// Nothing in here aborts the frame. Unconnected operations are skipped,
    /// failing ones are logged, and both are counted in the returned stats.
    pub fn render_frame(&mut self) -> &FrameStats {
        self.frame_number += 1;
        let issued_before = self.state.issued_calls();
        let skipped_before = self.state.skipped_calls();

        // Step 1: Start the frame.
        self.graph.begin_frame();

        // Step 2: Optimize, or replay the previous plan if nothing changed.
        let optimize_start = Instant::now();
        let previous = self.plan.take();
        let reoptimized = !previous
            .as_ref()
            .is_some_and(|plan| plan.is_current_for(&self.graph));
        let plan = match previous {
            Some(plan) if !reoptimized => plan,
            previous => {
                let plan = self
                    .optimizer
                    .optimize(&self.graph, &previous.unwrap_or_default());
                log::debug!(
                    "Frame {}: '{}' planned {} operations (revision {})",
                    self.frame_number,
                    self.optimizer.name(),
                    plan.operation_count(),
                    plan.revision(),
                );
                plan
            }
        };
        let cpu_optimize_time_ms = optimize_start.elapsed().as_secs_f32() * 1000.0;

        // Step 3: Execute.
        let execute_start = Instant::now();
        let counts = self.execute(&plan);
        let cpu_execute_time_ms = execute_start.elapsed().as_secs_f32() * 1000.0;

        // Step 4: Record what ran, so run-once passes stay quiet.
        self.graph.mark_executed(plan.emitted());

        // Step 5: Poll profiling results without waiting.
        self.collect_durations();

        self.last_stats = FrameStats {
            frame_number: self.frame_number,
            operations_planned: plan.operation_count() as u32,
            operations_executed: counts.executed,
            invalid_operations_skipped: counts.invalid,
            failed_operations: counts.failed,
            device_calls_issued: self.state.issued_calls() - issued_before,
            redundant_calls_skipped: self.state.skipped_calls() - skipped_before,
            reoptimized,
            cpu_optimize_time_ms,
            cpu_execute_time_ms,
        };
        self.plan = Some(plan);
        &self.last_stats
    }

    fn execute(&mut self, plan: &FramePlan) -> ExecutionCounts {
        let profiling = self.is_profiling();
        let mut counts = ExecutionCounts::default();
        for step in plan.steps() {
            match *step {
                PlanStep::Operation(id) => {
                    let Some(operation) = self.graph.operation_for_execution(id) else {
                        continue;
                    };
                    if !operation.is_valid() {
                        log::trace!("Skipping unconnected operation '{}'", operation.label());
                        counts.invalid += 1;
                        continue;
                    }
                    operation.update();
                    match operation.execute(&mut self.state) {
                        Ok(()) => counts.executed += 1,
                        Err(err) => {
                            log::warn!("Operation '{}' failed: {err}", operation.label());
                            counts.failed += 1;
                        }
                    }
                }
                PlanStep::PassBegin(pass) if profiling => self.begin_pass_timing(pass),
                PlanStep::PassEnd(pass) if profiling => self.end_pass_timing(pass),
                PlanStep::PassBegin(_) | PlanStep::PassEnd(_) => {}
            }
        }
        counts
    }

    fn begin_pass_timing(&mut self, pass: ProgramPassId) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        let query = match self.pass_queries.get(&pass) {
            Some(query) => *query,
            None => match timer.create_query() {
                Ok(query) => {
                    self.pass_queries.insert(pass, query);
                    query
                }
                Err(err) => {
                    log::warn!("Could not create a timestamp query: {err}");
                    return;
                }
            },
        };
        let name = self.graph.describe(PassRef::Program(pass));
        if let Err(err) = timer.start_duration(&name, query) {
            log::warn!("Could not start timing pass '{name}': {err}");
        }
    }

    fn end_pass_timing(&mut self, pass: ProgramPassId) {
        let (Some(timer), Some(query)) = (self.timer.as_mut(), self.pass_queries.get(&pass)) else {
            return;
        };
        if let Err(err) = timer.end_duration(*query) {
            log::warn!("Could not end timing of pass {pass:?}: {err}");
        }
    }

    fn collect_durations(&mut self) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        if timer.pending_count() == 0 {
            return;
        }
        timer.check_results();
        for (pass, query) in &self.pass_queries {
            if let Ok(ms) = timer.duration_ms(*query) {
                let name = self.graph.describe(PassRef::Program(*pass));
                self.pass_durations.insert(name, ms);
            }
        }
    }
}

/// Releases a pass query whether or not its duration ever ended.
fn release_query(timer: &mut GpuTimer, query: QueryId) {
    timer.remove_duration(query);
    timer.remove_result(query);
}

impl Drop for RenderManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
