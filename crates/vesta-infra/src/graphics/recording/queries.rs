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

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use vesta_core::timing::{QueryId, TimestampQueries};
use vesta_core::DeviceError;

#[derive(Debug, Default)]
struct ManualState {
    next_id: u32,
    live: HashSet<QueryId>,
    /// Recorded, waiting for a value.
    recorded: Vec<QueryId>,
    resolved: HashMap<QueryId, u64>,
    record_counts: HashMap<QueryId, usize>,
}

/// Timestamp queries whose results are supplied by hand.
///
/// Nothing resolves on its own: a test records through the timer, then calls
/// [`resolve`](Self::resolve) to make a value available. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ManualTimestampQueries {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTimestampQueries {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolves a recorded query with `timestamp_ns`. Queries that are not
    /// waiting for a value are left alone.
    pub fn resolve(&self, query: QueryId, timestamp_ns: u64) {
        let mut state = self.lock();
        if let Some(position) = state.recorded.iter().position(|q| *q == query) {
            state.recorded.remove(position);
            state.resolved.insert(query, timestamp_ns);
        }
    }

    /// Resolves every waiting query, asking `timestamp` for each value.
    pub fn resolve_pending(&self, mut timestamp: impl FnMut(QueryId) -> u64) {
        let mut state = self.lock();
        let recorded = std::mem::take(&mut state.recorded);
        for query in recorded {
            let value = timestamp(query);
            state.resolved.insert(query, value);
        }
    }

    /// Queries recorded and still waiting for a value, in recording order.
    pub fn waiting(&self) -> Vec<QueryId> {
        self.lock().recorded.clone()
    }

    /// How many times `query` was recorded.
    pub fn record_count(&self, query: QueryId) -> usize {
        self.lock().record_counts.get(&query).copied().unwrap_or(0)
    }

    /// Number of allocated and not yet deleted queries.
    pub fn live_queries(&self) -> usize {
        self.lock().live.len()
    }
}

impl TimestampQueries for ManualTimestampQueries {
    fn create_query(&mut self) -> Result<QueryId, DeviceError> {
        let mut state = self.lock();
        state.next_id += 1;
        let query = QueryId(state.next_id);
        state.live.insert(query);
        Ok(query)
    }

    fn record_timestamp(&mut self, query: QueryId) -> Result<(), DeviceError> {
        let mut state = self.lock();
        if !state.live.contains(&query) {
            return Err(DeviceError::new(
                "record_timestamp",
                format!("{query:?} was never created"),
            ));
        }
        state.resolved.remove(&query);
        if !state.recorded.contains(&query) {
            state.recorded.push(query);
        }
        *state.record_counts.entry(query).or_default() += 1;
        Ok(())
    }

    fn poll_result(&mut self, query: QueryId) -> Option<u64> {
        self.lock().resolved.get(&query).copied()
    }

    fn delete_query(&mut self, query: QueryId) {
        let mut state = self.lock();
        state.live.remove(&query);
        state.recorded.retain(|q| *q != query);
        state.resolved.remove(&query);
    }
}

/// Timestamp queries backed by the CPU clock.
///
/// Every timestamp resolves immediately with the nanoseconds elapsed since the
/// backend was created. Useful where no GPU timer exists.
#[derive(Debug)]
pub struct CpuTimestampQueries {
    epoch: Instant,
    next_id: u32,
    results: HashMap<QueryId, Option<u64>>,
}

impl CpuTimestampQueries {
    /// Creates a backend whose clock starts now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            next_id: 0,
            results: HashMap::new(),
        }
    }
}

impl Default for CpuTimestampQueries {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampQueries for CpuTimestampQueries {
    fn create_query(&mut self) -> Result<QueryId, DeviceError> {
        self.next_id += 1;
        let query = QueryId(self.next_id);
        self.results.insert(query, None);
        Ok(query)
    }

    fn record_timestamp(&mut self, query: QueryId) -> Result<(), DeviceError> {
        let slot = self.results.get_mut(&query).ok_or_else(|| {
            DeviceError::new("record_timestamp", format!("{query:?} was never created"))
        })?;
        let elapsed = self.epoch.elapsed().as_nanos();
        *slot = Some(u64::try_from(elapsed).unwrap_or(u64::MAX - 1));
        Ok(())
    }

    fn poll_result(&mut self, query: QueryId) -> Option<u64> {
        self.results.get(&query).copied().flatten()
    }

    fn delete_query(&mut self, query: QueryId) {
        self.results.remove(&query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_queries_resolve_on_demand() {
        let handle = ManualTimestampQueries::new();
        let mut queries = handle.clone();
        let q = queries.create_query().unwrap();
        queries.record_timestamp(q).unwrap();
        assert_eq!(queries.poll_result(q), None);
        assert_eq!(handle.waiting(), vec![q]);

        handle.resolve(q, 42);
        assert_eq!(queries.poll_result(q), Some(42));

        // Re-recording discards the old value.
        queries.record_timestamp(q).unwrap();
        assert_eq!(queries.poll_result(q), None);
        assert_eq!(handle.record_count(q), 2);
    }

    #[test]
    fn unknown_query_cannot_be_recorded() {
        let mut queries = ManualTimestampQueries::new();
        assert!(queries.record_timestamp(QueryId(5)).is_err());
        let mut cpu = CpuTimestampQueries::new();
        assert!(cpu.record_timestamp(QueryId(5)).is_err());
    }

    #[test]
    fn cpu_queries_are_monotonic() {
        let mut cpu = CpuTimestampQueries::new();
        let a = cpu.create_query().unwrap();
        let b = cpu.create_query().unwrap();
        cpu.record_timestamp(a).unwrap();
        cpu.record_timestamp(b).unwrap();
        let (ta, tb) = (cpu.poll_result(a).unwrap(), cpu.poll_result(b).unwrap());
        assert!(tb >= ta);
    }
}
