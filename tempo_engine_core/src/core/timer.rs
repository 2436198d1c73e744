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

use std::time::Instant;

/// A resettable, polled monotonic clock for the run loop.
///
/// `LoopTimer` accumulates elapsed wall-clock seconds while started. It is a
/// purely polled clock: callers decide when to sample [`seconds`], and the
/// value never goes backwards (it is built on [`Instant`], which is immune to
/// hardware clock rollback).
///
/// A freshly constructed or [`reset`] timer reads zero and does not advance
/// until [`start`] is called.
///
/// [`seconds`]: LoopTimer::seconds
/// [`reset`]: LoopTimer::reset
/// [`start`]: LoopTimer::start
#[derive(Debug, Clone)]
pub struct LoopTimer {
    accumulated_seconds: f64,
    started_at: Option<Instant>,
}

impl LoopTimer {
    /// Creates a stopped timer reading zero elapsed seconds.
    pub fn new() -> Self {
        Self {
            accumulated_seconds: 0.0,
            started_at: None,
        }
    }

    /// Zeroes the elapsed time without starting the timer.
    pub fn reset(&mut self) {
        self.accumulated_seconds = 0.0;
        self.started_at = None;
    }

    /// Begins advancing. Calling `start` on a running timer is a no-op.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Freezes the accumulated total. Calling `stop` on a stopped timer is a
    /// no-op.
    pub fn stop(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.accumulated_seconds += started.elapsed().as_secs_f64();
        }
    }

    /// Returns whether the timer is currently advancing.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Returns elapsed seconds since the last reset, as a monotonically
    /// non-decreasing `f64`.
    #[inline]
    pub fn seconds(&self) -> f64 {
        let running = self
            .started_at
            .map(|started| started.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        self.accumulated_seconds + running
    }
}

impl Default for LoopTimer {
    fn default() -> Self {
        Self::new()
    }
}
