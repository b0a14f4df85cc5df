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

//! Shadow device state.
//!
//! [`StateCache`] holds the last value submitted for every bindable slot.
//! [`StateTracker`] owns the device and the cache and is the only way to change
//! device state: each wrapper compares the request against the cache and only
//! calls the device when they differ.

mod cache;
mod tracker;

pub use cache::StateCache;
pub use tracker::StateTracker;
