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

use anyhow::Result;

/// The host application driven by the engine's run loop.
///
/// The engine calls these hooks on a single thread, in a fixed order per
/// iteration: zero or more `update` steps, then (readiness permitting) one
/// `draw`. Hook panics are not caught by the engine; they propagate to the
/// process boundary.
pub trait Application {
    /// Messages delivered through the application-level deferred queue,
    /// drained once per update tick.
    type Event;

    /// One-time startup hook, invoked once before any resources exist.
    fn startup(&mut self) {}

    /// Creates the host's device-dependent resources. A failure here is a
    /// fatal startup error: the loop never starts and the engine proceeds
    /// straight to shutdown.
    fn create_resources(&mut self) -> Result<()> {
        Ok(())
    }

    /// Advances the simulation by exactly `step_seconds`. Returning `false`
    /// requests cooperative shutdown; the engine stops issuing steps and
    /// never draws again.
    fn update(&mut self, step_seconds: f64) -> bool;

    /// Populates the render queue for one frame. Called only when the render
    /// backend reports itself idle and not mid-reinitialization.
    fn draw(&mut self, seconds_since_draw: f64, seconds_since_update: f64);

    /// Applies one message from the application-level deferred queue.
    fn on_event(&mut self, _event: Self::Event) {}

    /// Final teardown. Invoked before the engine releases graphics
    /// resources, so the application may still reference them here.
    fn shutdown(&mut self) {}
}
