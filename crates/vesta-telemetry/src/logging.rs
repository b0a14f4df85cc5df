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

//! Logger initialization.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs an `env_logger` logger as the global logger.
///
/// `RUST_LOG` takes precedence over `default_level`. Returns `false` if a
/// logger was already installed, in which case nothing changes; calling it
/// twice is harmless.
pub fn init_logging(default_level: LevelFilter) -> bool {
    Builder::from_env(Env::default().default_filter_or(default_level.as_str()))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
