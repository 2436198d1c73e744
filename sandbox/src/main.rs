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

// Tempo Engine Sandbox
// Opens a window and drives a trivial simulation through the pacing loop.

use anyhow::Result;
use tempo_engine_core::{
    Application, Engine, MessageBus, NullRenderBackend, PacingConfig, WinitWindowHost,
};

/// A minimal host: integrates an angle at simulation rate and reports how
/// stale each drawn frame is. Runs until the window is closed.
#[derive(Default)]
struct OrbitApp {
    angle_radians: f64,
    simulated_seconds: f64,
    frames_drawn: u64,
}

impl Application for OrbitApp {
    type Event = ();

    fn startup(&mut self) {
        log::info!("OrbitApp: starting up");
    }

    fn update(&mut self, step_seconds: f64) -> bool {
        self.angle_radians =
            (self.angle_radians + step_seconds * std::f64::consts::TAU).rem_euclid(
                std::f64::consts::TAU,
            );
        self.simulated_seconds += step_seconds;
        true
    }

    fn draw(&mut self, _seconds_since_draw: f64, seconds_since_update: f64) {
        self.frames_drawn += 1;
        if self.frames_drawn % 600 == 0 {
            log::info!(
                "OrbitApp: frame {}: angle {:.3} rad, {:.1}s simulated, {:.2}ms stale",
                self.frames_drawn,
                self.angle_radians,
                self.simulated_seconds,
                seconds_since_update * 1000.0
            );
        }
    }

    fn shutdown(&mut self) {
        log::info!(
            "OrbitApp: shutting down after {:.1}s of simulation and {} frames",
            self.simulated_seconds,
            self.frames_drawn
        );
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => PacingConfig::from_file(&path)
            .map_err(|error| anyhow::anyhow!("failed to load pacing config: {error}"))?,
        None => PacingConfig::default(),
    };
    log::info!("pacing policy: {}", config.policy.label());

    let system_bus = MessageBus::new();
    let window = WinitWindowHost::new("Tempo Sandbox", 1024, 768, system_bus.sender())?;

    let mut engine = Engine::with_system_bus(
        config,
        OrbitApp::default(),
        Box::new(window),
        Box::new(NullRenderBackend::default()),
        system_bus,
    )?;
    engine.run()?;
    Ok(())
}
