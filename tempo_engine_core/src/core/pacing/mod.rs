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

//! Update-period strategies.
//!
//! One strategy is selected at startup from the closed [`TimingPolicy`]
//! enumeration and drives every simulation step for the lifetime of the run
//! loop. The strategy decides how many steps to run for a given amount of
//! elapsed wall time, measures how expensive those steps were, and (for the
//! adaptive policy) retunes the fixed timestep from the measured utilization.

pub mod fixed;
pub mod fixed_adaptive;
pub mod variable;

pub use fixed::FixedPacing;
pub use fixed_adaptive::FixedAdaptivePacing;
pub use variable::VariablePacing;

use serde::{Deserialize, Serialize};

use crate::core::frame_monitor::FrameRateMonitor;
use crate::core::loop_state::LoopState;
use crate::core::timer::LoopTimer;

/// Utilization above which an analysis window counts as over-utilized.
pub const OVER_UTILIZATION_THRESHOLD: f64 = 0.95;

/// Utilization below which an analysis window counts as under-utilized.
pub const UNDER_UTILIZATION_THRESHOLD: f64 = 0.40;

/// Timing policy for the update/draw scheduler.
///
/// Selected once at startup; the run loop never re-selects a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingPolicy {
    /// Constant-size update steps, classic accumulator stepping.
    Fixed,
    /// Fixed stepping whose timestep is doubled/halved from measured
    /// utilization.
    FixedAdaptive,
    /// One variable-length step per loop iteration, gated on a minimum
    /// interval.
    Variable,
}

impl TimingPolicy {
    /// Human-readable label for diagnostics output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::FixedAdaptive => "fixed-adaptive",
            Self::Variable => "variable",
        }
    }
}

/// Read-only pacing statistics published by the active strategy.
///
/// Refreshed by [`UpdatePacing::analyse_period`] (or, for the variable
/// policy, every time its sample ring fills); consumed by diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingAnalytics {
    /// Policy that produced this snapshot.
    pub policy: TimingPolicy,
    /// Mean step duration over the last analysis window, in seconds.
    pub average_step_seconds: f64,
    /// Variance of the step durations over the last analysis window.
    pub step_variance: f64,
    /// Fraction of the window's wall-clock time spent inside update steps.
    pub utilization: f64,
    /// Whether the last window exceeded [`OVER_UTILIZATION_THRESHOLD`].
    pub overutilized: bool,
    /// Whether the last window fell below [`UNDER_UTILIZATION_THRESHOLD`].
    pub underutilized: bool,
}

impl PacingAnalytics {
    pub(crate) fn empty(policy: TimingPolicy) -> Self {
        Self {
            policy,
            average_step_seconds: 0.0,
            step_variance: 0.0,
            utilization: 0.0,
            overutilized: false,
            underutilized: false,
        }
    }
}

/// Shared contract for the three update-period strategies.
///
/// The strategy is the only component that advances `state.last_update_time`,
/// and it advances it by exactly the step size of each processed step, never
/// to "time now", so simulation time can neither skip nor double-count a
/// partial step.
pub trait UpdatePacing: std::fmt::Debug {
    /// The policy this strategy implements.
    fn policy(&self) -> TimingPolicy;

    /// Runs zero or more update steps to consume `elapsed_seconds` according
    /// to policy. `update` returning `false` requests termination: the
    /// strategy sets `state.running = false` and stops issuing further steps
    /// within the same call.
    fn process_required_updates(
        &mut self,
        elapsed_seconds: f64,
        state: &mut LoopState,
        monitor: &mut FrameRateMonitor,
        update: &mut dyn FnMut(f64) -> bool,
        timer: &LoopTimer,
    );

    /// Runs exactly one step of `period_seconds`, measuring its wall-clock
    /// cost for utilization accounting.
    fn process_single_update(
        &mut self,
        period_seconds: f64,
        state: &mut LoopState,
        monitor: &mut FrameRateMonitor,
        update: &mut dyn FnMut(f64) -> bool,
        timer: &LoopTimer,
    );

    /// Resets the internal accumulators and records the start of a new
    /// analysis window.
    fn mark_analysis_start(&mut self, timer: &LoopTimer);

    /// Computes utilization statistics for the window opened by the last
    /// [`mark_analysis_start`] call. The adaptive policy may mutate
    /// `state.current_fixed_timestep_seconds` here.
    ///
    /// [`mark_analysis_start`]: UpdatePacing::mark_analysis_start
    fn analyse_period(&mut self, timer: &LoopTimer, state: &mut LoopState);

    /// The latest published analytics snapshot.
    fn analytics(&self) -> PacingAnalytics;
}

/// Instantiates the strategy for `policy`.
///
/// The match is exhaustive over the closed enumeration: an unrepresentable
/// policy cannot reach this point, and an unrecognized policy *string* is
/// rejected earlier, at configuration deserialization.
pub fn strategy_for_policy(policy: TimingPolicy) -> Box<dyn UpdatePacing> {
    match policy {
        TimingPolicy::Fixed => Box::new(FixedPacing::new()),
        TimingPolicy::FixedAdaptive => Box::new(FixedAdaptivePacing::new()),
        TimingPolicy::Variable => Box::new(VariablePacing::new()),
    }
}

/// Wall-clock accounting for one analysis window of fixed-step updates.
///
/// Accumulates the measured cost of every step run since the window opened,
/// together with the moments needed for mean/variance, and turns them into a
/// utilization fraction when the window is analysed.
#[derive(Debug, Clone, Default)]
pub(crate) struct UtilizationWindow {
    window_start_seconds: f64,
    update_seconds: f64,
    step_count: u32,
    step_cost_sum: f64,
    step_cost_sum_sq: f64,
}

impl UtilizationWindow {
    /// Opens a new window at `now_seconds`, discarding prior accumulation.
    pub(crate) fn mark_start(&mut self, now_seconds: f64) {
        self.window_start_seconds = now_seconds;
        self.update_seconds = 0.0;
        self.step_count = 0;
        self.step_cost_sum = 0.0;
        self.step_cost_sum_sq = 0.0;
    }

    /// Records the wall-clock cost of one completed step.
    pub(crate) fn record_step_cost(&mut self, cost_seconds: f64) {
        self.update_seconds += cost_seconds;
        self.step_count += 1;
        self.step_cost_sum += cost_seconds;
        self.step_cost_sum_sq += cost_seconds * cost_seconds;
    }

    /// Fraction of the window spent inside update steps. Zero-length windows
    /// report zero utilization rather than dividing by zero.
    pub(crate) fn utilization(&self, now_seconds: f64) -> f64 {
        let span = now_seconds - self.window_start_seconds;
        if span <= 0.0 {
            return 0.0;
        }
        self.update_seconds / span
    }

    /// Mean step cost over the window.
    pub(crate) fn mean_step_cost(&self) -> f64 {
        if self.step_count == 0 {
            return 0.0;
        }
        self.step_cost_sum / f64::from(self.step_count)
    }

    /// Population variance of the step costs over the window.
    pub(crate) fn step_cost_variance(&self) -> f64 {
        if self.step_count == 0 {
            return 0.0;
        }
        let n = f64::from(self.step_count);
        let mean = self.step_cost_sum / n;
        (self.step_cost_sum_sq / n - mean * mean).max(0.0)
    }
}

/// Runs one measured update step for the fixed-step strategies.
///
/// Advances `state.last_update_time` by exactly `period_seconds`, flags
/// `updated_since_last_draw`, registers the tick with the monitor, and stops
/// the loop if the host requested termination.
pub(crate) fn run_measured_step(
    window: &mut UtilizationWindow,
    period_seconds: f64,
    state: &mut LoopState,
    monitor: &mut FrameRateMonitor,
    update: &mut dyn FnMut(f64) -> bool,
    timer: &LoopTimer,
) {
    let step_began = timer.seconds();
    let keep_running = update(period_seconds);
    window.record_step_cost(timer.seconds() - step_began);

    state.last_update_time += period_seconds;
    state.updated_since_last_draw = true;
    monitor.register_update_frame();

    if !keep_running {
        state.running = false;
    }
}
