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

/// Classic fixed-timestep accumulator stepping.
///
/// Consumes elapsed time one whole timestep at a time; leftover sub-timestep
/// time stays encoded in `state.last_update_time` and carries into the next
/// call. The timestep itself never changes; the over-utilization streak this
/// strategy keeps is purely diagnostic.
#[derive(Debug)]
pub struct FixedPacing {
    window: UtilizationWindow,
    over_utilized_streak: u32,
    analytics: PacingAnalytics,
}

impl FixedPacing {
    pub fn new() -> Self {
        Self {
            window: UtilizationWindow::default(),
            over_utilized_streak: 0,
            analytics: PacingAnalytics::empty(TimingPolicy::Fixed),
        }
    }

    /// Consecutive over-utilized analysis windows, decremented (floored at
    /// zero) by any window that is not over-utilized.
    pub fn over_utilized_streak(&self) -> u32 {
        self.over_utilized_streak
    }

    fn note_window_utilization(&mut self, utilization: f64) {
        if utilization > OVER_UTILIZATION_THRESHOLD {
            self.over_utilized_streak += 1;
        } else {
            self.over_utilized_streak = self.over_utilized_streak.saturating_sub(1);
        }
    }
}

impl Default for FixedPacing {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdatePacing for FixedPacing {
    fn policy(&self) -> TimingPolicy {
        TimingPolicy::Fixed
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

    fn analyse_period(&mut self, timer: &LoopTimer, _state: &mut LoopState) {
        let utilization = self.window.utilization(timer.seconds());
        self.note_window_utilization(utilization);

        self.analytics = PacingAnalytics {
            policy: TimingPolicy::Fixed,
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
    use approx::assert_relative_eq;

    fn running_state(timestep: f64) -> LoopState {
        let config = PacingConfig {
            policy: TimingPolicy::Fixed,
            fixed_timestep_seconds: timestep,
            smallest_timestep_seconds: timestep / 4.0,
            ..PacingConfig::default()
        };
        let mut state = LoopState::from_config(&config);
        state.running = true;
        state
    }

    #[test]
    fn consumes_whole_timesteps_only() {
        let mut pacing = FixedPacing::new();
        let mut state = running_state(0.01);
        let mut monitor = FrameRateMonitor::default();
        let timer = LoopTimer::new();

        let mut steps: Vec<f64> = Vec::new();
        pacing.process_required_updates(
            0.035,
            &mut state,
            &mut monitor,
            &mut |step| {
                steps.push(step);
                true
            },
            &timer,
        );

        assert_eq!(steps.len(), 3, "0.035s at 0.01s steps is three whole steps");
        for step in &steps {
            assert_relative_eq!(*step, 0.01);
        }
        assert_relative_eq!(state.last_update_time, 0.03, epsilon = 1e-12);
        assert!(state.updated_since_last_draw);
    }

    #[test]
    fn fifty_milliseconds_at_sixty_hertz_is_three_steps() {
        let mut pacing = FixedPacing::new();
        let mut state = running_state(1.0 / 60.0);
        let mut monitor = FrameRateMonitor::default();
        let timer = LoopTimer::new();

        let mut calls = 0u32;
        pacing.process_required_updates(
            0.05,
            &mut state,
            &mut monitor,
            &mut |_| {
                calls += 1;
                true
            },
            &timer,
        );

        assert_eq!(calls, 3);
        assert_relative_eq!(state.last_update_time, 0.05, epsilon = 1e-9);
    }

    #[test]
    fn remainder_carries_into_the_next_call() {
        let mut pacing = FixedPacing::new();
        let mut state = running_state(0.01);
        let mut monitor = FrameRateMonitor::default();
        let timer = LoopTimer::new();

        let calls = std::cell::Cell::new(0u32);
        let mut count = |_: f64| {
            calls.set(calls.get() + 1);
            true
        };

        // 0.015s consumes one step and leaves 0.005s of simulated remainder.
        pacing.process_required_updates(0.015, &mut state, &mut monitor, &mut count, &timer);
        assert_eq!(calls.get(), 1);
        assert_relative_eq!(state.last_update_time, 0.01, epsilon = 1e-12);

        // The controller derives the next elapsed value from last_update_time,
        // so the 0.005s remainder plus 0.008s of new time crosses one more
        // whole step.
        let now = 0.023;
        let elapsed = now - state.last_update_time;
        pacing.process_required_updates(elapsed, &mut state, &mut monitor, &mut count, &timer);
        assert_eq!(calls.get(), 2, "remainder plus new elapsed must yield one more step");
        assert_relative_eq!(state.last_update_time, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn sub_timestep_elapsed_runs_nothing() {
        let mut pacing = FixedPacing::new();
        let mut state = running_state(0.01);
        let mut monitor = FrameRateMonitor::default();
        let timer = LoopTimer::new();

        let mut calls = 0u32;
        pacing.process_required_updates(
            0.009,
            &mut state,
            &mut monitor,
            &mut |_| {
                calls += 1;
                true
            },
            &timer,
        );

        assert_eq!(calls, 0);
        assert_eq!(state.last_update_time, 0.0);
        assert!(!state.updated_since_last_draw);
    }

    #[test]
    fn update_time_advances_by_exactly_one_step_per_call() {
        let mut pacing = FixedPacing::new();
        let mut state = running_state(1.0 / 60.0);
        let mut monitor = FrameRateMonitor::default();
        let timer = LoopTimer::new();

        let mut observed: Vec<f64> = Vec::new();
        pacing.process_required_updates(
            0.05,
            &mut state,
            &mut monitor,
            &mut |step| {
                observed.push(step);
                true
            },
            &timer,
        );

        // Simulation time is the exact sum of the issued steps, never the
        // wall-clock "now".
        let total: f64 = observed.iter().sum();
        assert_relative_eq!(state.last_update_time, total, epsilon = 1e-12);
        for step in &observed {
            assert_relative_eq!(*step, 1.0 / 60.0);
        }
    }

    #[test]
    fn host_termination_stops_the_batch_mid_way() {
        let mut pacing = FixedPacing::new();
        let mut state = running_state(0.01);
        let mut monitor = FrameRateMonitor::default();
        let timer = LoopTimer::new();

        let mut calls = 0u32;
        // Enough elapsed time for five steps; the host quits on the second.
        pacing.process_required_updates(
            0.055,
            &mut state,
            &mut monitor,
            &mut |_| {
                calls += 1;
                calls < 2
            },
            &timer,
        );

        assert_eq!(calls, 2, "the failing step completes, the rest are skipped");
        assert!(!state.running);
        assert_relative_eq!(state.last_update_time, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn single_update_advances_by_the_given_period() {
        let mut pacing = FixedPacing::new();
        let mut state = running_state(0.01);
        let mut monitor = FrameRateMonitor::default();
        let timer = LoopTimer::new();

        pacing.process_single_update(0.004, &mut state, &mut monitor, &mut |_| true, &timer);

        assert_relative_eq!(state.last_update_time, 0.004, epsilon = 1e-12);
        assert!(state.updated_since_last_draw);
    }

    #[test]
    fn over_utilized_streak_decrements_floored_at_zero() {
        let mut pacing = FixedPacing::new();

        pacing.note_window_utilization(0.97);
        pacing.note_window_utilization(0.98);
        pacing.note_window_utilization(0.99);
        assert_eq!(pacing.over_utilized_streak(), 3);

        pacing.note_window_utilization(0.50);
        assert_eq!(pacing.over_utilized_streak(), 2);

        for _ in 0..5 {
            pacing.note_window_utilization(0.10);
        }
        assert_eq!(pacing.over_utilized_streak(), 0, "streak must floor at zero");
    }

    #[test]
    fn analyse_never_touches_the_timestep() {
        let mut pacing = FixedPacing::new();
        let mut state = running_state(0.01);
        let mut monitor = FrameRateMonitor::default();
        let timer = LoopTimer::new();

        pacing.mark_analysis_start(&timer);
        pacing.process_required_updates(0.1, &mut state, &mut monitor, &mut |_| true, &timer);
        pacing.analyse_period(&timer, &mut state);

        assert_relative_eq!(state.current_fixed_timestep_seconds, 0.01);
    }

    #[test]
    fn analytics_report_the_fixed_policy_label() {
        let pacing = FixedPacing::new();
        assert_eq!(pacing.analytics().policy, TimingPolicy::Fixed);
        assert_eq!(pacing.policy().label(), "fixed");
    }
}
