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

//! Non-blocking GPU timestamp and duration queries.
//!
//! Timestamps are recorded into device query objects and resolved later by
//! polling with [`GpuTimer::check_results`]. Nothing here ever waits on the
//! device: a result that has not resolved yet is reported as
//! [`RenderError::ResourceNotReady`] and the caller polls again next frame.

use std::collections::{HashMap, HashSet};
use vesta_core::error::{RenderError, Result};
use vesta_core::timing::{QueryId, TimestampQueries};

/// Raw sentinel for "no timing result yet", for callers that need a plain
/// integer instead of a `Result`.
pub const TIMING_NOT_AVAILABLE: u64 = u64::MAX;

/// A resolved duration query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationResult {
    /// The query that recorded the start timestamp. Identifies the duration.
    pub start_query: QueryId,
    /// The name given to [`GpuTimer::start_duration`].
    pub name: String,
    /// Elapsed device time in nanoseconds.
    pub duration_ns: u64,
}

impl DurationResult {
    /// Elapsed device time in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ns as f64 / 1_000_000.0
    }
}

/// Tracks timestamp queries from recording to resolution.
#[derive(Debug)]
pub struct GpuTimer {
    backend: Box<dyn TimestampQueries>,
    /// Recorded but not yet resolved, in recording order.
    pending: Vec<QueryId>,
    names: HashMap<QueryId, String>,
    timestamps: HashMap<QueryId, u64>,
    /// Start query -> end query.
    durations: HashMap<QueryId, QueryId>,
    /// Durations whose current start was skipped because the previous
    /// measurement is still in flight.
    skipped: HashSet<QueryId>,
}

impl GpuTimer {
    /// Creates a timer over a query backend.
    pub fn new(backend: Box<dyn TimestampQueries>) -> Self {
        Self {
            backend,
            pending: Vec::new(),
            names: HashMap::new(),
            timestamps: HashMap::new(),
            durations: HashMap::new(),
            skipped: HashSet::new(),
        }
    }

    /// Allocates a fresh query object from the backend.
    pub fn create_query(&mut self) -> Result<QueryId> {
        Ok(self.backend.create_query()?)
    }

    /// Records a timestamp into `query` under `name`.
    ///
    /// If `query` is still pending from an earlier recording, the call is
    /// ignored: a query object can only be in flight once. Re-recording a
    /// resolved query discards its previous result.
    pub fn query_timestamp(&mut self, name: &str, query: QueryId) -> Result<()> {
        if self.pending.contains(&query) {
            log::trace!("Timestamp query {query:?} is still pending, skipping");
            return Ok(());
        }
        self.backend.record_timestamp(query)?;
        self.timestamps.remove(&query);
        self.pending.push(query);
        self.names.insert(query, name.to_owned());
        Ok(())
    }

    /// Polls every pending query and moves the resolved ones to the results.
    ///
    /// Returns how many queries resolved during this call.
    pub fn check_results(&mut self) -> usize {
        let mut resolved = 0;
        let backend = &mut self.backend;
        let timestamps = &mut self.timestamps;
        self.pending.retain(|&query| match backend.poll_result(query) {
            Some(value) => {
                timestamps.insert(query, value);
                resolved += 1;
                false
            }
            None => true,
        });
        resolved
    }

    /// Returns `true` if `query` has a resolved timestamp.
    pub fn is_available(&self, query: QueryId) -> bool {
        self.timestamps.contains_key(&query)
    }

    /// Returns the resolved timestamp of `query` in nanoseconds.
    pub fn result(&self, query: QueryId) -> Result<u64> {
        self.timestamps
            .get(&query)
            .copied()
            .ok_or(RenderError::ResourceNotReady { query })
    }

    /// Returns the name `query` was recorded under.
    pub fn query_name(&self, query: QueryId) -> Option<&str> {
        self.names.get(&query).map(String::as_str)
    }

    /// Forgets the result of `query` and releases it on the device.
    ///
    /// A duration keyed by `query` keeps its end query; use
    /// [`remove_duration`](Self::remove_duration) to release both.
    pub fn remove_result(&mut self, query: QueryId) {
        self.backend.delete_query(query);
        self.pending.retain(|&q| q != query);
        self.names.remove(&query);
        self.timestamps.remove(&query);
        self.skipped.remove(&query);
    }

    /// Records the start timestamp of a duration identified by `start_query`.
    ///
    /// While either timestamp of the previous measurement is pending, the
    /// call is ignored and so is the matching [`end_duration`](Self::end_duration).
    /// The two timestamps of a duration always come from the same measurement.
    pub fn start_duration(&mut self, name: &str, start_query: QueryId) -> Result<()> {
        let end_query = self.durations.get(&start_query).copied();
        let in_flight = self.pending.contains(&start_query)
            || end_query.is_some_and(|end| self.pending.contains(&end));
        if in_flight {
            log::trace!("Duration {start_query:?} is still in flight, skipping");
            self.skipped.insert(start_query);
            return Ok(());
        }
        self.skipped.remove(&start_query);
        self.query_timestamp(name, start_query)?;
        if let Some(end_query) = end_query {
            self.timestamps.remove(&end_query);
        }
        Ok(())
    }

    /// Records the end timestamp of the duration started with `start_query`.
    ///
    /// The end query is allocated on the first call and reused afterwards.
    /// Returns the end query.
    pub fn end_duration(&mut self, start_query: QueryId) -> Result<QueryId> {
        let end_query = match self.durations.get(&start_query) {
            Some(&end_query) if self.skipped.remove(&start_query) => return Ok(end_query),
            Some(&end_query) => end_query,
            None => {
                let end_query = self.backend.create_query()?;
                self.durations.insert(start_query, end_query);
                end_query
            }
        };
        self.query_timestamp("", end_query)?;
        Ok(end_query)
    }

    /// Elapsed device time between the start and end of a duration, in
    /// nanoseconds.
    ///
    /// Fails with [`RenderError::ResourceNotReady`] until `end_duration` was
    /// called and both timestamps resolved.
    pub fn duration_ns(&self, start_query: QueryId) -> Result<u64> {
        let end_query = self
            .durations
            .get(&start_query)
            .copied()
            .ok_or(RenderError::ResourceNotReady { query: start_query })?;
        let start = self.result(start_query)?;
        let end = self.result(end_query)?;
        Ok(end.saturating_sub(start))
    }

    /// Like [`duration_ns`](Self::duration_ns), but returns
    /// [`TIMING_NOT_AVAILABLE`] instead of an error.
    pub fn duration_ns_or_sentinel(&self, start_query: QueryId) -> u64 {
        self.duration_ns(start_query).unwrap_or(TIMING_NOT_AVAILABLE)
    }

    /// Elapsed device time of a duration, in milliseconds.
    pub fn duration_ms(&self, start_query: QueryId) -> Result<f64> {
        self.duration_ns(start_query)
            .map(|ns| ns as f64 / 1_000_000.0)
    }

    /// Every duration whose two timestamps have resolved, ordered by start
    /// query.
    pub fn duration_results(&self) -> Vec<DurationResult> {
        let mut results: Vec<DurationResult> = self
            .durations
            .keys()
            .filter_map(|&start_query| {
                let duration_ns = self.duration_ns(start_query).ok()?;
                Some(DurationResult {
                    start_query,
                    name: self.query_name(start_query).unwrap_or_default().to_owned(),
                    duration_ns,
                })
            })
            .collect();
        results.sort_by_key(|r| r.start_query);
        results
    }

    /// Forgets a duration and releases both of its queries. Unknown start
    /// queries are ignored.
    pub fn remove_duration(&mut self, start_query: QueryId) {
        let Some(end_query) = self.durations.remove(&start_query) else {
            return;
        };
        self.remove_result(start_query);
        self.remove_result(end_query);
    }

    /// Number of recorded queries that have not resolved yet.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for GpuTimer {
    fn drop(&mut self) {
        let mut queries: Vec<QueryId> = self
            .names
            .keys()
            .chain(self.durations.values())
            .copied()
            .collect();
        queries.sort();
        queries.dedup();
        for query in queries {
            self.backend.delete_query(query);
        }
    }
}
