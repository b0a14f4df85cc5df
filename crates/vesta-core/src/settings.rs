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

//! Settings for the render graph runtime.

use crate::device::BufferTarget;
use crate::error::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The optimizer strategy used to flatten the pass hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OptimizerKind {
    /// Flatten and skip executed run-once nodes. No reordering.
    #[default]
    Simple,
    /// Group passes by program where dependencies allow it and drop state
    /// changes the previous operations already made.
    StateSorting,
}

/// Binding-point limits of the device.
///
/// The defaults are the minimums a 4.3-class device guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceLimits {
    /// Number of texture (and sampler) units.
    pub max_texture_units: u32,
    /// Number of atomic counter buffer binding points.
    pub max_atomic_counter_bindings: u32,
    /// Number of uniform buffer binding points.
    pub max_uniform_bindings: u32,
    /// Number of shader storage buffer binding points.
    pub max_shader_storage_bindings: u32,
    /// Number of transform feedback buffer binding points.
    pub max_transform_feedback_bindings: u32,
    /// Number of color attachments a framebuffer may have.
    pub max_color_attachments: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_texture_units: 32,
            max_atomic_counter_bindings: 8,
            max_uniform_bindings: 36,
            max_shader_storage_bindings: 8,
            max_transform_feedback_bindings: 4,
            max_color_attachments: 8,
        }
    }
}

impl DeviceLimits {
    /// Number of binding points of an indexed buffer target, or `None` if the
    /// target is not indexed.
    pub fn indexed_bindings(&self, target: BufferTarget) -> Option<u32> {
        match target {
            BufferTarget::AtomicCounterBuffer => Some(self.max_atomic_counter_bindings),
            BufferTarget::UniformBuffer => Some(self.max_uniform_bindings),
            BufferTarget::ShaderStorageBuffer => Some(self.max_shader_storage_bindings),
            BufferTarget::TransformFeedbackBuffer => Some(self.max_transform_feedback_bindings),
            _ => None,
        }
    }
}

/// A collection of settings that configure the render manager.
///
/// Settings are applied before rendering starts (or between frames), never
/// per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Which optimizer flattens the pass hierarchy.
    pub optimizer: OptimizerKind,
    /// If `true`, every shader program pass is wrapped in a duration query.
    pub gpu_profiling: bool,
    /// Initial screen resolution, `(width, height)`.
    pub screen_resolution: (u32, u32),
    /// Device binding-point limits.
    pub limits: DeviceLimits,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            optimizer: OptimizerKind::Simple,
            gpu_profiling: false,
            screen_resolution: (1280, 720),
            limits: DeviceLimits::default(),
        }
    }
}

impl RenderSettings {
    /// Parses settings from a RON document. Missing fields keep their defaults.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Reads and parses a RON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::SettingsIo {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_ron_str(&source)?;
        log::debug!("Loaded render settings from '{}'", path.display());
        Ok(settings)
    }

    /// Checks the settings for values that will not work well.
    ///
    /// Returns one [`RenderError::ConfigurationWarning`] per problem. None of
    /// them prevents the manager from starting.
    pub fn validate(&self) -> Vec<RenderError> {
        let mut warnings = Vec::new();
        let (width, height) = self.screen_resolution;
        if width == 0 || height == 0 {
            warnings.push(RenderError::ConfigurationWarning(format!(
                "screen resolution {width}x{height} has a zero dimension"
            )));
        }
        let limits = [
            ("max_texture_units", self.limits.max_texture_units),
            (
                "max_atomic_counter_bindings",
                self.limits.max_atomic_counter_bindings,
            ),
            ("max_uniform_bindings", self.limits.max_uniform_bindings),
            (
                "max_shader_storage_bindings",
                self.limits.max_shader_storage_bindings,
            ),
            (
                "max_transform_feedback_bindings",
                self.limits.max_transform_feedback_bindings,
            ),
            ("max_color_attachments", self.limits.max_color_attachments),
        ];
        for (name, value) in limits {
            if value == 0 {
                warnings.push(RenderError::ConfigurationWarning(format!(
                    "{name} is 0, every bind against it will be rejected"
                )));
            }
        }
        if self.limits.max_color_attachments > 32 {
            warnings.push(RenderError::ConfigurationWarning(format!(
                "max_color_attachments is {}, only 32 attachment codes exist",
                self.limits.max_color_attachments
            )));
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_keeps_defaults() {
        let settings = RenderSettings::from_ron_str(
            "(optimizer: StateSorting, limits: (max_uniform_bindings: 12))",
        )
        .unwrap();
        assert_eq!(settings.optimizer, OptimizerKind::StateSorting);
        assert!(!settings.gpu_profiling);
        assert_eq!(settings.limits.max_uniform_bindings, 12);
        assert_eq!(settings.limits.max_texture_units, 32);
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        let err = RenderSettings::from_ron_str("(optimizer: Fastest)").unwrap_err();
        assert!(matches!(err, RenderError::SettingsParse(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RenderSettings::load("/definitely/not/here/vesta.ron").unwrap_err();
        assert!(matches!(err, RenderError::SettingsIo { .. }));
    }

    #[test]
    fn default_settings_are_clean() {
        assert!(RenderSettings::default().validate().is_empty());
    }

    #[test]
    fn zero_limits_warn() {
        let mut settings = RenderSettings::default();
        settings.limits.max_shader_storage_bindings = 0;
        settings.screen_resolution = (0, 600);
        assert_eq!(settings.validate().len(), 2);
    }

    #[test]
    fn indexed_bindings_only_for_indexed_targets() {
        let limits = DeviceLimits::default();
        assert_eq!(limits.indexed_bindings(BufferTarget::AtomicCounterBuffer), Some(8));
        assert_eq!(limits.indexed_bindings(BufferTarget::ArrayBuffer), None);
    }
}
