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

use crate::core::config::PacingConfig;
use crate::core::pacing::TimingPolicy;

/// Lowest fixed timestep the adaptive policy may start from. The analysis
/// machinery needs a few real steps per window to produce a meaningful
/// utilization figure, so an adaptive run never begins below 1/120 s.
pub const MIN_ADAPTIVE_STARTING_TIMESTEP: f64 = 1.0 / 120.0;

/// The single source of truth for run-loop timing state.
///
/// Owned exclusively by the loop controller and passed by mutable reference
/// to the active update-period strategy and nowhere else. Constructed fresh
/// from a [`PacingConfig`] for every run, so tests can build and drive one
/// without any global state.
///
/// Time fields are monotonically non-decreasing. `last_update_time` advances
/// only in increments of exactly one processed step, never to the current
/// timer reading, so leftover sub-timestep time carries into the next loop
/// iteration instead of being skipped or double-counted.
#[derive(Debug, Clone)]
pub struct LoopState {
    /// Timing policy in effect. Immutable once the loop starts.
    pub policy: TimingPolicy,
    /// Whether to run a partial catch-up update just before drawing.
    pub process_fractional_update_before_draw: bool,
    /// User-supplied floor: the minimum interval between updates under the
    /// variable policy, and the smallest value the adaptive timestep may
    /// shrink to under the fixed policies.
    pub smallest_timestep_seconds: f64,
    /// The timestep currently in effect. Mutated only by the fixed-adaptive
    /// strategy's analysis, and never below `smallest_timestep_seconds`.
    pub current_fixed_timestep_seconds: f64,
    /// Whether drawing is gated on at least one update having occurred since
    /// the previous draw. The controller forces this on for the first loop
    /// iteration regardless of the configured preference.
    pub require_one_update_before_draw: bool,
    /// False terminates the loop after the current iteration.
    pub running: bool,
    /// Simulation time of the last completed update step, in timer seconds.
    pub last_update_time: f64,
    /// Timer reading at the last completed draw.
    pub last_draw_time: f64,
    /// Set after any update step; cleared after each draw.
    pub updated_since_last_draw: bool,
}

impl LoopState {
    /// Builds fresh loop state from the validated configuration, applying
    /// the adaptive starting-timestep floor.
    pub fn from_config(config: &PacingConfig) -> Self {
        let mut current_fixed_timestep_seconds = config.fixed_timestep_seconds;
        if config.policy == TimingPolicy::FixedAdaptive {
            current_fixed_timestep_seconds =
                current_fixed_timestep_seconds.max(MIN_ADAPTIVE_STARTING_TIMESTEP);
        }

        Self {
            policy: config.policy,
            process_fractional_update_before_draw: config.process_fractional_update_before_draw,
            smallest_timestep_seconds: config.smallest_timestep_seconds,
            current_fixed_timestep_seconds,
            require_one_update_before_draw: config.require_one_update_before_draw,
            running: false,
            last_update_time: 0.0,
            last_draw_time: 0.0,
            updated_since_last_draw: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(policy: TimingPolicy) -> PacingConfig {
        PacingConfig {
            policy,
            fixed_timestep_seconds: 1.0 / 60.0,
            smallest_timestep_seconds: 1.0 / 240.0,
            ..PacingConfig::default()
        }
    }

    #[test]
    fn fresh_state_starts_stopped_with_zeroed_clocks() {
        let state = LoopState::from_config(&config(TimingPolicy::Fixed));
        assert!(!state.running);
        assert_eq!(state.last_update_time, 0.0);
        assert_eq!(state.last_draw_time, 0.0);
        assert!(!state.updated_since_last_draw);
    }

    #[test]
    fn fixed_policy_keeps_the_requested_timestep() {
        let mut cfg = config(TimingPolicy::Fixed);
        cfg.fixed_timestep_seconds = 1.0 / 500.0;
        cfg.smallest_timestep_seconds = 1.0 / 1000.0;

        let state = LoopState::from_config(&cfg);
        assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 500.0);
    }

    #[test]
    fn adaptive_policy_clamps_the_starting_timestep() {
        let mut cfg = config(TimingPolicy::FixedAdaptive);
        cfg.fixed_timestep_seconds = 1.0 / 500.0;
        cfg.smallest_timestep_seconds = 1.0 / 1000.0;

        let state = LoopState::from_config(&cfg);
        assert_relative_eq!(
            state.current_fixed_timestep_seconds,
            MIN_ADAPTIVE_STARTING_TIMESTEP
        );
    }

    #[test]
    fn adaptive_policy_keeps_requested_timestep_when_above_the_floor() {
        let state = LoopState::from_config(&config(TimingPolicy::FixedAdaptive));
        assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 60.0);
    }
}
