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

use crate::core::frame_monitor::FrameRateMonitor;
use crate::core::loop_state::LoopState;
use crate::core::pacing::{
    run_measured_step, PacingAnalytics, TimingPolicy, UpdatePacing, UtilizationWindow,
    OVER_UTILIZATION_THRESHOLD, UNDER_UTILIZATION_THRESHOLD,
};
use crate::core::timer::LoopTimer;

/// Consecutive over-utilized windows required before the timestep doubles.
const DOUBLE_AFTER_WINDOWS: u32 = 8;

/// Consecutive under-utilized windows required before the timestep halves.
const HALVE_AFTER_WINDOWS: u32 = 120;

/// Fixed-timestep stepping with utilization-driven self-tuning.
///
/// Steps exactly like the fixed strategy, but every analysis window feeds two
/// independent hysteresis counters. Sustained overload (more than
/// [`DOUBLE_AFTER_WINDOWS`] consecutive windows above the over threshold)
/// doubles the timestep; doubling reacts quickly because an overloaded
/// simulation falls further behind every window it is left alone. Halving
/// requires more than [`HALVE_AFTER_WINDOWS`] consecutive windows below the
/// under threshold, and never takes the timestep below
/// `state.smallest_timestep_seconds`. Each counter resets whenever its own
/// threshold is not met, so bursty load cannot walk the timestep around.
#[derive(Debug)]
pub struct FixedAdaptivePacing {
    window: UtilizationWindow,
    over_utilized_streak: u32,
    under_utilized_streak: u32,
    analytics: PacingAnalytics,
}

impl FixedAdaptivePacing {
    pub fn new() -> Self {
        Self {
            window: UtilizationWindow::default(),
            over_utilized_streak: 0,
            under_utilized_streak: 0,
            analytics: PacingAnalytics::empty(TimingPolicy::FixedAdaptive),
        }
    }

    /// Applies one completed analysis window's utilization to the hysteresis
    /// counters, retuning the timestep when a trigger fires.
    fn apply_window_utilization(&mut self, utilization: f64, state: &mut LoopState) {
        if utilization > OVER_UTILIZATION_THRESHOLD {
            self.over_utilized_streak += 1;
            if self.over_utilized_streak > DOUBLE_AFTER_WINDOWS {
                state.current_fixed_timestep_seconds *= 2.0;
                self.over_utilized_streak = 0;
                log::debug!(
                    "pacing: sustained overload, timestep doubled to {:.5}s",
                    state.current_fixed_timestep_seconds
                );
            }
        } else {
            self.over_utilized_streak = 0;
        }

        if utilization < UNDER_UTILIZATION_THRESHOLD {
            self.under_utilized_streak += 1;
            if self.under_utilized_streak > HALVE_AFTER_WINDOWS {
                let halved = state.current_fixed_timestep_seconds * 0.5;
                if halved >= state.smallest_timestep_seconds {
                    state.current_fixed_timestep_seconds = halved;
                    log::debug!(
                        "pacing: sustained headroom, timestep halved to {:.5}s",
                        state.current_fixed_timestep_seconds
                    );
                }
                self.under_utilized_streak = 0;
            }
        } else {
            self.under_utilized_streak = 0;
        }

        debug_assert!(
            state.current_fixed_timestep_seconds >= state.smallest_timestep_seconds,
            "adaptive timestep fell below the configured floor"
        );
    }
}

impl Default for FixedAdaptivePacing {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdatePacing for FixedAdaptivePacing {
    fn policy(&self) -> TimingPolicy {
        TimingPolicy::FixedAdaptive
    }

    fn process_required_updates(
        &mut self,
        elapsed_seconds: f64,
        state: &mut LoopState,
        monitor: &mut FrameRateMonitor,
        update: &mut dyn FnMut(f64) -> bool,
        timer: &LoopTimer,
    ) {
        let mut remaining = elapsed_seconds;
        while remaining > state.current_fixed_timestep_seconds && state.running {
            let step = state.current_fixed_timestep_seconds;
            run_measured_step(&mut self.window, step, state, monitor, update, timer);
            remaining -= step;
        }
    }

    fn process_single_update(
        &mut self,
        period_seconds: f64,
        state: &mut LoopState,
        monitor: &mut FrameRateMonitor,
        update: &mut dyn FnMut(f64) -> bool,
        timer: &LoopTimer,
    ) {
        run_measured_step(&mut self.window, period_seconds, state, monitor, update, timer);
    }

    fn mark_analysis_start(&mut self, timer: &LoopTimer) {
        self.window.mark_start(timer.seconds());
    }

    fn analyse_period(&mut self, timer: &LoopTimer, state: &mut LoopState) {
        let utilization = self.window.utilization(timer.seconds());
        self.apply_window_utilization(utilization, state);

        self.analytics = PacingAnalytics {
            policy: TimingPolicy::FixedAdaptive,
            average_step_seconds: self.window.mean_step_cost(),
            step_variance: self.window.step_cost_variance(),
            utilization,
            overutilized: utilization > OVER_UTILIZATION_THRESHOLD,
            underutilized: utilization < UNDER_UTILIZATION_THRESHOLD,
        };
    }

    fn analytics(&self) -> PacingAnalytics {
        self.analytics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PacingConfig;
    use crate::core::loop_state::MIN_ADAPTIVE_STARTING_TIMESTEP;
    use approx::assert_relative_eq;

    fn running_state(timestep: f64, smallest: f64) -> LoopState {
        let config = PacingConfig {
            policy: TimingPolicy::FixedAdaptive,
            fixed_timestep_seconds: timestep,
            smallest_timestep_seconds: smallest,
            ..PacingConfig::default()
        };
        let mut state = LoopState::from_config(&config);
        state.running = true;
        state
    }

    #[test]
    fn doubling_fires_on_the_ninth_consecutive_window() {
        let mut pacing = FixedAdaptivePacing::new();
        let mut state = running_state(1.0 / 120.0, 1.0 / 240.0);

        for _ in 0..8 {
            pacing.apply_window_utilization(0.98, &mut state);
            assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 120.0);
        }

        pacing.apply_window_utilization(0.98, &mut state);
        assert_relative_eq!(
            state.current_fixed_timestep_seconds,
            1.0 / 60.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn doubling_trigger_resets_its_own_counter() {
        let mut pacing = FixedAdaptivePacing::new();
        let mut state = running_state(1.0 / 120.0, 1.0 / 240.0);

        for _ in 0..9 {
            pacing.apply_window_utilization(0.98, &mut state);
        }
        assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 60.0);

        // The tenth window must not double again; a fresh run of nine is
        // required.
        pacing.apply_window_utilization(0.98, &mut state);
        assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 60.0);

        for _ in 0..8 {
            pacing.apply_window_utilization(0.98, &mut state);
        }
        assert_relative_eq!(
            state.current_fixed_timestep_seconds,
            1.0 / 30.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn a_calm_window_resets_the_over_counter() {
        let mut pacing = FixedAdaptivePacing::new();
        let mut state = running_state(1.0 / 120.0, 1.0 / 240.0);

        for _ in 0..8 {
            pacing.apply_window_utilization(0.98, &mut state);
        }
        pacing.apply_window_utilization(0.70, &mut state);

        // Eight more overloaded windows are not enough after the reset.
        for _ in 0..8 {
            pacing.apply_window_utilization(0.98, &mut state);
        }
        assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 120.0);

        pacing.apply_window_utilization(0.98, &mut state);
        assert_relative_eq!(
            state.current_fixed_timestep_seconds,
            1.0 / 60.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn halving_fires_on_the_hundred_twenty_first_consecutive_window() {
        let mut pacing = FixedAdaptivePacing::new();
        let mut state = running_state(1.0 / 30.0, 1.0 / 240.0);

        for _ in 0..120 {
            pacing.apply_window_utilization(0.10, &mut state);
            assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 30.0);
        }

        pacing.apply_window_utilization(0.10, &mut state);
        assert_relative_eq!(
            state.current_fixed_timestep_seconds,
            1.0 / 60.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn halving_never_crosses_the_smallest_timestep_floor() {
        let mut pacing = FixedAdaptivePacing::new();
        let mut state = running_state(1.0 / 120.0, 1.0 / 120.0);

        // Two full halving streaks; the floor blocks both.
        for _ in 0..242 {
            pacing.apply_window_utilization(0.05, &mut state);
        }
        assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 120.0);
        assert!(state.current_fixed_timestep_seconds >= state.smallest_timestep_seconds);
    }

    #[test]
    fn a_busy_window_resets_the_under_counter() {
        let mut pacing = FixedAdaptivePacing::new();
        let mut state = running_state(1.0 / 30.0, 1.0 / 240.0);

        for _ in 0..120 {
            pacing.apply_window_utilization(0.10, &mut state);
        }
        pacing.apply_window_utilization(0.60, &mut state);

        // The streak starts over: 120 more low windows do not halve yet.
        for _ in 0..120 {
            pacing.apply_window_utilization(0.10, &mut state);
        }
        assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 30.0);

        pacing.apply_window_utilization(0.10, &mut state);
        assert_relative_eq!(
            state.current_fixed_timestep_seconds,
            1.0 / 60.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn overload_then_recovery_walks_the_timestep_both_ways() {
        let mut pacing = FixedAdaptivePacing::new();
        let mut state = running_state(1.0 / 120.0, 1.0 / 240.0);

        // Nine overloaded windows at 98%: 1/120 -> 1/60.
        for _ in 0..9 {
            pacing.apply_window_utilization(0.98, &mut state);
        }
        assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 60.0);

        // Load collapses to 10%. The under counter starts from zero, so a
        // full 121-window streak is needed before any halving.
        for _ in 0..120 {
            pacing.apply_window_utilization(0.10, &mut state);
            assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 60.0);
        }
        pacing.apply_window_utilization(0.10, &mut state);
        assert_relative_eq!(
            state.current_fixed_timestep_seconds,
            1.0 / 120.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn moderate_utilization_touches_neither_counter_target() {
        let mut pacing = FixedAdaptivePacing::new();
        let mut state = running_state(1.0 / 60.0, 1.0 / 240.0);

        for _ in 0..500 {
            pacing.apply_window_utilization(0.70, &mut state);
        }
        assert_relative_eq!(state.current_fixed_timestep_seconds, 1.0 / 60.0);
    }

    #[test]
    fn stepping_matches_the_fixed_accumulator() {
        let mut pacing = FixedAdaptivePacing::new();
        let mut state = running_state(0.01, 0.0025);
        let mut monitor = FrameRateMonitor::default();
        let timer = LoopTimer::new();

        let mut calls = 0u32;
        pacing.process_required_updates(
            0.035,
            &mut state,
            &mut monitor,
            &mut |_| {
                calls += 1;
                true
            },
            &timer,
        );

        assert_eq!(calls, 3);
        assert_relative_eq!(state.last_update_time, 0.03, epsilon = 1e-12);
    }

    #[test]
    fn adaptive_state_construction_respects_the_starting_floor() {
        let state = running_state(1.0 / 500.0, 1.0 / 1000.0);
        assert_relative_eq!(
            state.current_fixed_timestep_seconds,
            MIN_ADAPTIVE_STARTING_TIMESTEP
        );
    }
}
