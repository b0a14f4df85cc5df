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

//! Device-side timestamp queries.

use crate::error::DeviceError;
use std::fmt::Debug;

/// Device name of a timestamp query object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryId(pub u32);

/// Raw timestamp query objects, as exposed by the device.
///
/// Results are polled, never waited on: [`poll_result`](Self::poll_result)
/// returns `None` until the device has resolved the query.
pub trait TimestampQueries: Debug + Send {
    /// Allocates a new query object.
    fn create_query(&mut self) -> Result<QueryId, DeviceError>;

    /// Records the current device time into `query`.
    fn record_timestamp(&mut self, query: QueryId) -> Result<(), DeviceError>;

    /// Returns the resolved timestamp of `query` in nanoseconds, if available.
    fn poll_result(&mut self, query: QueryId) -> Option<u64>;

    /// Releases a query object. Deleting an unknown query is a no-op.
    fn delete_query(&mut self, query: QueryId);
}
