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
use crate::core::pacing::{PacingAnalytics, TimingPolicy, UpdatePacing};
use crate::core::timer::LoopTimer;

/// Number of recent step lengths kept for the analytics ring.
const SAMPLE_CAPACITY: usize = 60;

/// Variable-length stepping.
///
/// Runs at most one update per call, of length exactly the elapsed time since
/// the last update, and only once that elapsed time has reached
/// `state.smallest_timestep_seconds`; below the floor the call is a no-op
/// and the loop simply spins to the next iteration. There is no self-tuning;
/// the strategy never reports over-utilization.
///
/// A fixed-size ring of the most recent step lengths backs the analytics
/// snapshot: every [`SAMPLE_CAPACITY`]th recorded step republishes the mean
/// and variance over the ring.
#[derive(Debug)]
pub struct VariablePacing {
    samples: [f64; SAMPLE_CAPACITY],
    next_sample: usize,
    filled: usize,
    recorded_steps: u64,
    analytics: PacingAnalytics,
}

impl VariablePacing {
    pub fn new() -> Self {
        Self {
            samples: [0.0; SAMPLE_CAPACITY],
            next_sample: 0,
            filled: 0,
            recorded_steps: 0,
            analytics: PacingAnalytics::empty(TimingPolicy::Variable),
        }
    }

    fn record_step(&mut self, period_seconds: f64) {
        self.samples[self.next_sample] = period_seconds;
        self.next_sample = (self.next_sample + 1) % SAMPLE_CAPACITY;
        self.filled = (self.filled + 1).min(SAMPLE_CAPACITY);
        self.recorded_steps += 1;

        if self.recorded_steps % SAMPLE_CAPACITY as u64 == 0 {
            self.republish_analytics();
        }
    }

    fn republish_analytics(&mut self) {
        let samples = &self.samples[..self.filled];
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|sample| {
                let deviation = sample - mean;
                deviation * deviation
            })
            .sum::<f64>()
            / n;

        self.analytics = PacingAnalytics {
            policy: TimingPolicy::Variable,
            average_step_seconds: mean,
            step_variance: variance,
            utilization: 0.0,
            overutilized: false,
            underutilized: false,
        };
    }
}

impl Default for VariablePacing {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdatePacing for VariablePacing {
    fn policy(&self) -> TimingPolicy {
        TimingPolicy::Variable
    }

    fn process_required_updates(
        &mut self,
        elapsed_seconds: f64,
        state: &mut LoopState,
        monitor: &mut FrameRateMonitor,
        update: &mut dyn FnMut(f64) -> bool,
        timer: &LoopTimer,
    ) {
        if !state.running || elapsed_seconds < state.smallest_timestep_seconds {
            return;
        }
        self.process_single_update(elapsed_seconds, state, monitor, update, timer);
    }

    fn process_single_update(
        &mut self,
        period_seconds: f64,
        state: &mut LoopState,
        monitor: &mut FrameRateMonitor,
        update: &mut dyn FnMut(f64) -> bool,
        _timer: &LoopTimer,
    ) {
        let keep_running = update(period_seconds);
        self.record_step(period_seconds);

        state.last_update_time += period_seconds;
        state.updated_since_last_draw = true;
        monitor.register_update_frame();

        if !keep_running {
            state.running = false;
        }
    }

    fn mark_analysis_start(&mut self, _timer: &LoopTimer) {
        // The ring republishes on its own cadence; there is no per-window
        // accumulator to reset.
    }

    fn analyse_period(&mut self, _timer: &LoopTimer, _state: &mut LoopState) {
        // No utilization accounting and no self-tuning under this policy.
    }

    fn analytics(&self) -> PacingAnalytics {
        self.analytics
    }
}
