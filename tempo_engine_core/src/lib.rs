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

//! Tempo Engine core: the frame pacing and update/draw scheduler at the
//! heart of an interactive rendering host.
//!
//! The engine decouples the simulation update cadence from the rendering
//! draw cadence: a user-chosen timing policy decides how many update steps
//! each loop iteration owes, while drawing is gated on render-backend
//! readiness. Everything runs on one thread, cooperatively.

pub mod application;
pub mod core;
pub mod event;
pub mod subsystems;
pub mod window;

pub use crate::application::Application;
pub use crate::core::config::{ConfigError, PacingConfig};
pub use crate::core::engine::{Engine, EngineError, LifecycleState};
pub use crate::core::frame_monitor::FrameRateMonitor;
pub use crate::core::loop_state::LoopState;
pub use crate::core::pacing::{PacingAnalytics, TimingPolicy, UpdatePacing};
pub use crate::core::timer::LoopTimer;
pub use crate::event::{MessageBus, SystemEvent};
pub use crate::subsystems::renderer::{NullRenderBackend, RenderBackend, RenderError};
pub use crate::window::{TempoWindow, WindowHost, WinitWindowHost};
