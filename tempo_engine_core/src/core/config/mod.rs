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

//! Engine Configuration Module
//!
//! Startup-time configuration for the pacing scheduler. The configuration is
//! consumed once when the run loop is constructed and is read-only
//! thereafter; the loop state it seeds can be rebuilt fresh for every run.

use serde::{Deserialize, Serialize};

use crate::core::pacing::TimingPolicy;

/// Startup configuration for the update/draw scheduler.
///
/// An unknown `policy` string in a JSON document fails loudly at
/// deserialization; there is no fallback policy, since silently picking one
/// would corrupt pacing guarantees invisibly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Timing policy to run the loop under.
    #[serde(default = "default_policy")]
    pub policy: TimingPolicy,
    /// Requested fixed timestep in seconds (fixed and fixed-adaptive
    /// policies).
    #[serde(default = "default_fixed_timestep")]
    pub fixed_timestep_seconds: f64,
    /// Floor timestep in seconds: minimum update interval for the variable
    /// policy, smallest value the adaptive timestep may shrink to otherwise.
    #[serde(default = "default_smallest_timestep")]
    pub smallest_timestep_seconds: f64,
    /// Run a partial catch-up update just before each draw.
    #[serde(default = "default_true")]
    pub process_fractional_update_before_draw: bool,
    /// Gate draws on at least one update since the previous draw.
    #[serde(default = "default_true")]
    pub require_one_update_before_draw: bool,
    /// Frame-rate measurement window length in seconds.
    #[serde(default = "default_frame_rate_window")]
    pub frame_rate_window_seconds: f64,
    /// Interval between pacing summary log lines in seconds; zero disables
    /// the summary.
    #[serde(default = "default_summary_interval")]
    pub summary_interval_seconds: f64,
}

fn default_policy() -> TimingPolicy {
    TimingPolicy::Fixed
}

fn default_fixed_timestep() -> f64 {
    1.0 / 60.0
}

fn default_smallest_timestep() -> f64 {
    1.0 / 240.0
}

fn default_true() -> bool {
    true
}

fn default_frame_rate_window() -> f64 {
    1.0
}

fn default_summary_interval() -> f64 {
    10.0
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            fixed_timestep_seconds: default_fixed_timestep(),
            smallest_timestep_seconds: default_smallest_timestep(),
            process_fractional_update_before_draw: default_true(),
            require_one_update_before_draw: default_true(),
            frame_rate_window_seconds: default_frame_rate_window(),
            summary_interval_seconds: default_summary_interval(),
        }
    }
}

impl PacingConfig {
    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Checks the numeric invariants the scheduler relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixed_timestep_seconds <= 0.0 {
            return Err(ConfigError::NonPositiveTimestep {
                field: "fixed_timestep_seconds",
                value: self.fixed_timestep_seconds,
            });
        }
        if self.smallest_timestep_seconds <= 0.0 {
            return Err(ConfigError::NonPositiveTimestep {
                field: "smallest_timestep_seconds",
                value: self.smallest_timestep_seconds,
            });
        }
        if self.policy != TimingPolicy::Variable
            && self.smallest_timestep_seconds > self.fixed_timestep_seconds
        {
            return Err(ConfigError::SmallestExceedsFixed {
                smallest: self.smallest_timestep_seconds,
                fixed: self.fixed_timestep_seconds,
            });
        }
        if self.frame_rate_window_seconds <= 0.0 {
            return Err(ConfigError::NonPositiveWindow {
                value: self.frame_rate_window_seconds,
            });
        }
        if self.summary_interval_seconds < 0.0 {
            return Err(ConfigError::NegativeSummaryInterval {
                value: self.summary_interval_seconds,
            });
        }
        Ok(())
    }
}

/// Configuration values the scheduler cannot run under.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveTimestep { field: &'static str, value: f64 },
    SmallestExceedsFixed { smallest: f64, fixed: f64 },
    NonPositiveWindow { value: f64 },
    NegativeSummaryInterval { value: f64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NonPositiveTimestep { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            ConfigError::SmallestExceedsFixed { smallest, fixed } => write!(
                f,
                "smallest_timestep_seconds ({smallest}) exceeds fixed_timestep_seconds ({fixed})"
            ),
            ConfigError::NonPositiveWindow { value } => {
                write!(f, "frame_rate_window_seconds must be positive, got {value}")
            }
            ConfigError::NegativeSummaryInterval { value } => write!(
                f,
                "summary_interval_seconds must be zero or positive, got {value}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
