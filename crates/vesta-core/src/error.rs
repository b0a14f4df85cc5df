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

//! Defines the error taxonomy shared by every Vesta crate.
//!
//! All variants except the settings-loading ones are *recoverable*: the render
//! manager logs them and keeps running in a degraded but safe state instead of
//! aborting the frame.

use crate::timing::QueryId;
use thiserror::Error;

/// A failure reported by a [`GraphicsDevice`](crate::GraphicsDevice) call.
///
/// When a device call fails, the state wrappers leave their cache untouched so
/// the cache never claims a value the device did not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("device call '{call}' failed: {message}")]
pub struct DeviceError {
    /// Name of the device entry point that failed (e.g. `bind_texture`).
    pub call: &'static str,
    /// Backend-specific description of the failure.
    pub message: String,
}

impl DeviceError {
    /// Creates a new device error for the given entry point.
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

/// The main error type of the render graph.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An unrecognized binding target, or a binding point outside the
    /// configured limits. The call is skipped and no state is mutated.
    #[error("invalid {kind} target: {detail}")]
    InvalidTarget {
        /// The family of target that was looked up (e.g. `BufferTarget`).
        kind: &'static str,
        /// What exactly was wrong with it.
        detail: String,
    },

    /// An operation is missing required inputs, or a pass was configured
    /// inconsistently. The operation stays a no-op until reconnected.
    #[error("invalid operation '{operation}': {reason}")]
    InvalidOperation {
        /// Label of the offending operation or pass.
        operation: String,
        /// Why it is invalid.
        reason: String,
    },

    /// A query or timing result was requested before it resolved.
    /// The caller is expected to poll again later.
    #[error("result for {query:?} is not available yet")]
    ResourceNotReady {
        /// The query whose result is still pending.
        query: QueryId,
    },

    /// Something about the startup configuration looks wrong. Logged only.
    #[error("configuration warning: {0}")]
    ConfigurationWarning(String),

    /// The underlying device rejected a call.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A settings file could not be read.
    #[error("failed to read settings file '{path}': {source}")]
    SettingsIo {
        /// Path of the settings file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A settings document could not be parsed.
    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] ron::error::SpannedError),
}

impl RenderError {
    /// Shorthand for an [`RenderError::InvalidTarget`].
    pub fn invalid_target(kind: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidTarget {
            kind,
            detail: detail.into(),
        }
    }

    /// Shorthand for an [`RenderError::InvalidOperation`].
    pub fn invalid_operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the frame loop may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            RenderError::SettingsIo { .. } | RenderError::SettingsParse(_)
        )
    }
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn invalid_target_display() {
        let err = RenderError::invalid_target("BufferTarget", "unknown code 0x1234");
        assert_eq!(
            format!("{err}"),
            "invalid BufferTarget target: unknown code 0x1234"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn device_error_is_transparent() {
        let err: RenderError = DeviceError::new("use_program", "context lost").into();
        assert_eq!(
            format!("{err}"),
            "device call 'use_program' failed: context lost"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn settings_errors_are_not_recoverable() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = RenderError::SettingsIo {
            path: "vesta.ron".to_string(),
            source: io,
        };
        assert!(!err.is_recoverable());
        assert!(err.source().is_some());
    }

    #[test]
    fn resource_not_ready_mentions_query() {
        let err = RenderError::ResourceNotReady { query: QueryId(7) };
        assert_eq!(
            format!("{err}"),
            "result for QueryId(7) is not available yet"
        );
    }
}
