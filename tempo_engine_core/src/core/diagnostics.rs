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

/// Scheduler for the periodic pacing summary log line.
///
/// Time is injected as loop-timer seconds, so the cadence is deterministic
/// under test. An interval of zero disables the summary entirely.
#[derive(Debug, Clone)]
pub struct SummaryScheduler {
    interval_seconds: f64,
    last_logged_seconds: f64,
}

impl SummaryScheduler {
    /// Creates a scheduler with the given interval; zero disables it.
    pub fn new(interval_seconds: f64) -> Self {
        Self {
            interval_seconds,
            last_logged_seconds: 0.0,
        }
    }

    /// Whether summaries are enabled at all.
    pub fn enabled(&self) -> bool {
        self.interval_seconds > 0.0
    }

    /// Checks if it's time to log a summary.
    pub fn should_log(&self, now_seconds: f64) -> bool {
        self.enabled() && now_seconds - self.last_logged_seconds >= self.interval_seconds
    }

    /// Marks that a summary has been logged, restarting the interval.
    pub fn mark_logged(&mut self, now_seconds: f64) {
        self.last_logged_seconds = now_seconds;
    }

    /// The configured interval in seconds.
    pub fn interval_seconds(&self) -> f64 {
        self.interval_seconds
    }
}
