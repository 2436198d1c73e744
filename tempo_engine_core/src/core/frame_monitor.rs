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

/// Rolling update/draw rate monitor.
///
/// Tracks two independent counters (update ticks and draw ticks) over a
/// wall-clock measurement window. [`update`] is called once per loop
/// iteration; when the configured period has elapsed the monitor recomputes
/// both rates as `count / period`, then resets the counters and the window
/// start. There is no smoothing beyond this periodic reset-and-recompute, so
/// the published rates are stable for the whole period.
///
/// Time is injected as seconds from the loop timer rather than sampled
/// internally, which keeps the monitor deterministic under test.
///
/// [`update`]: FrameRateMonitor::update
#[derive(Debug, Clone)]
pub struct FrameRateMonitor {
    period_seconds: f64,
    window_start_seconds: f64,
    update_count: u32,
    draw_count: u32,
    update_fps: f64,
    draw_fps: f64,
}

impl FrameRateMonitor {
    /// Default measurement window length in seconds.
    pub const DEFAULT_PERIOD_SECONDS: f64 = 1.0;

    /// Creates a monitor with the given measurement window, starting at time
    /// zero. Non-positive periods fall back to the default window.
    pub fn new(period_seconds: f64) -> Self {
        let period_seconds = if period_seconds > 0.0 {
            period_seconds
        } else {
            Self::DEFAULT_PERIOD_SECONDS
        };
        Self {
            period_seconds,
            window_start_seconds: 0.0,
            update_count: 0,
            draw_count: 0,
            update_fps: 0.0,
            draw_fps: 0.0,
        }
    }

    /// Records one completed update tick.
    #[inline]
    pub fn register_update_frame(&mut self) {
        self.update_count += 1;
    }

    /// Records one completed draw tick.
    #[inline]
    pub fn register_draw_frame(&mut self) {
        self.draw_count += 1;
    }

    /// Advances the measurement window. Called once per loop iteration with
    /// the current loop-timer reading; recomputes the published rates when
    /// the window has elapsed.
    pub fn update(&mut self, now_seconds: f64) {
        if now_seconds - self.window_start_seconds < self.period_seconds {
            return;
        }

        self.update_fps = f64::from(self.update_count) / self.period_seconds;
        self.draw_fps = f64::from(self.draw_count) / self.period_seconds;
        self.update_count = 0;
        self.draw_count = 0;
        self.window_start_seconds = now_seconds;
    }

    /// Smoothed update rate from the last completed window.
    #[inline]
    pub fn update_fps(&self) -> f64 {
        self.update_fps
    }

    /// Smoothed draw rate from the last completed window.
    #[inline]
    pub fn draw_fps(&self) -> f64 {
        self.draw_fps
    }

    /// The configured measurement window length in seconds.
    #[inline]
    pub fn period_seconds(&self) -> f64 {
        self.period_seconds
    }
}

impl Default for FrameRateMonitor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD_SECONDS)
    }
}
