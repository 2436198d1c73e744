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

//! `core` module – immediate runtime nucleus.
//!
//! Contents:
//! * [`engine`]: the loop controller (initialization, run loop, update/draw
//!   dispatch, shutdown)
//! * [`pacing`]: the three update-period strategies and their analytics
//! * [`loop_state`]: the shared mutable timing record
//! * [`timer`]: the resettable monotonic loop clock
//! * [`frame_monitor`]: rolling update/draw rate measurement
//! * [`diagnostics`]: periodic pacing summary scheduling
//! * [`config`]: startup configuration consumed when the loop is built

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod frame_monitor;
pub mod loop_state;
pub mod pacing;
pub mod timer;
