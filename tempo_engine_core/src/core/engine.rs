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

use crate::application::Application;
use crate::core::config::{ConfigError, PacingConfig};
use crate::core::diagnostics::SummaryScheduler;
use crate::core::frame_monitor::FrameRateMonitor;
use crate::core::loop_state::LoopState;
use crate::core::pacing::{strategy_for_policy, PacingAnalytics, UpdatePacing};
use crate::core::timer::LoopTimer;
use crate::event::{MessageBus, SystemEvent};
use crate::subsystems::renderer::{RenderBackend, RenderError};
use crate::window::WindowHost;

/// Lifecycle of the loop controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Running,
    ShuttingDown,
    Terminated,
}

/// Errors that prevent the run loop from starting.
#[derive(Debug)]
pub enum EngineError {
    InvalidConfig(ConfigError),
    BackendInitializationFailed(RenderError),
    ResourceCreationFailed(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidConfig(e) => write!(f, "invalid pacing configuration: {e}"),
            EngineError::BackendInitializationFailed(e) => {
                write!(f, "render backend initialization failed: {e}")
            }
            EngineError::ResourceCreationFailed(s) => {
                write!(f, "host resource creation failed: {s}")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::InvalidConfig(e) => Some(e),
            EngineError::BackendInitializationFailed(e) => Some(e),
            EngineError::ResourceCreationFailed(_) => None,
        }
    }
}

/// The loop controller: owns the run loop and everything it schedules.
///
/// One engine drives one host application through a single-threaded,
/// cooperative cycle: ask the active pacing strategy to run the update steps
/// owed for the elapsed time, then (if the render backend is ready and the
/// one-update-before-draw gate passes) run the optional fractional catch-up
/// step, analyse the closing window, draw, and open a new analysis window.
/// The frame-rate monitor advances every iteration whether or not a draw
/// happened.
///
/// All collaborators are polled; nothing mutates loop state from a nested
/// callback. Cancellation is cooperative: any in-flight update step
/// completes before the loop observes `running == false`.
pub struct Engine<A: Application> {
    lifecycle: LifecycleState,
    state: LoopState,
    strategy: Box<dyn UpdatePacing>,
    monitor: FrameRateMonitor,
    timer: LoopTimer,
    summary: SummaryScheduler,
    system_bus: MessageBus<SystemEvent>,
    app_bus: MessageBus<A::Event>,
    window: Box<dyn WindowHost>,
    backend: Box<dyn RenderBackend>,
    app: A,
    user_require_one_update_before_draw: bool,
    first_update_forced: bool,
}

impl<A: Application> Engine<A> {
    /// Builds an engine with an internally owned system bus.
    pub fn new(
        config: PacingConfig,
        app: A,
        window: Box<dyn WindowHost>,
        backend: Box<dyn RenderBackend>,
    ) -> Result<Self, EngineError> {
        Self::with_system_bus(config, app, window, backend, MessageBus::new())
    }

    /// Builds an engine around an externally created system bus, for hosts
    /// that need to hand out senders before the engine exists (the winit
    /// host forwards resize events this way).
    pub fn with_system_bus(
        config: PacingConfig,
        app: A,
        window: Box<dyn WindowHost>,
        backend: Box<dyn RenderBackend>,
        system_bus: MessageBus<SystemEvent>,
    ) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;

        let state = LoopState::from_config(&config);
        let strategy = strategy_for_policy(config.policy);
        let monitor = FrameRateMonitor::new(config.frame_rate_window_seconds);
        let summary = SummaryScheduler::new(config.summary_interval_seconds);
        let user_require_one_update_before_draw = config.require_one_update_before_draw;

        Ok(Self {
            lifecycle: LifecycleState::Uninitialized,
            state,
            strategy,
            monitor,
            timer: LoopTimer::new(),
            summary,
            system_bus,
            app_bus: MessageBus::new(),
            window,
            backend,
            app,
            user_require_one_update_before_draw,
            first_update_forced: false,
        })
    }

    /// Current lifecycle phase.
    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    /// Read-only view of the loop state.
    pub fn loop_state(&self) -> &LoopState {
        &self.state
    }

    /// The latest pacing analytics snapshot from the active strategy.
    pub fn analytics(&self) -> PacingAnalytics {
        self.strategy.analytics()
    }

    /// Smoothed (update, draw) rates from the frame-rate monitor.
    pub fn frame_rates(&self) -> (f64, f64) {
        (self.monitor.update_fps(), self.monitor.draw_fps())
    }

    /// Sender for the system-level deferred queue.
    pub fn system_events(&self) -> flume::Sender<SystemEvent> {
        self.system_bus.sender()
    }

    /// Sender for the application-level deferred queue.
    pub fn app_events(&self) -> flume::Sender<A::Event> {
        self.app_bus.sender()
    }

    /// The hosted application.
    pub fn application(&self) -> &A {
        &self.app
    }

    /// Mutable access to the hosted application.
    pub fn application_mut(&mut self) -> &mut A {
        &mut self.app
    }

    /// Runs the loop to completion.
    ///
    /// Returns `Ok(())` for every cooperative termination path (host hook
    /// returning `false`, window closed, shutdown request) and an error only
    /// for fatal startup failures. Either way the shutdown path has run by
    /// the time this returns.
    pub fn run(&mut self) -> Result<(), EngineError> {
        if let Err(error) = self.initialize() {
            log::error!("startup failed: {error}");
            self.shutdown();
            return Err(error);
        }

        log::info!(
            "engine running ({} policy, timestep {:.5}s)",
            self.state.policy.label(),
            self.state.current_fixed_timestep_seconds
        );

        while self.state.running {
            self.tick();
        }

        self.shutdown();
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), EngineError> {
        debug_assert_eq!(
            self.lifecycle,
            LifecycleState::Uninitialized,
            "run() called twice on the same engine"
        );
        self.lifecycle = LifecycleState::Initializing;

        self.timer.reset();
        self.timer.start();

        self.app.startup();

        self.backend
            .init()
            .map_err(EngineError::BackendInitializationFailed)?;

        self.app
            .create_resources()
            .map_err(|error| EngineError::ResourceCreationFailed(format!("{error:#}")))?;

        // The first draw must never observe an un-initialized simulation, so
        // the one-update gate is forced on for the first iteration regardless
        // of the configured preference.
        self.state.require_one_update_before_draw = true;
        self.first_update_forced = true;

        self.state.running = true;
        self.strategy.mark_analysis_start(&self.timer);
        self.summary.mark_logged(self.timer.seconds());
        self.lifecycle = LifecycleState::Running;
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.lifecycle == LifecycleState::Terminated {
            return;
        }
        self.lifecycle = LifecycleState::ShuttingDown;
        self.state.running = false;

        // The application may still reference graphics resources during its
        // own teardown, so its hook runs before the backend releases
        // anything.
        self.app.shutdown();
        self.backend.shutdown();

        self.timer.stop();
        self.lifecycle = LifecycleState::Terminated;
        log::info!("engine terminated");
    }

    fn tick(&mut self) {
        let Self {
            state,
            strategy,
            monitor,
            timer,
            summary,
            system_bus,
            app_bus,
            window,
            backend,
            app,
            user_require_one_update_before_draw,
            first_update_forced,
            ..
        } = self;

        let elapsed = timer.seconds() - state.last_update_time;
        {
            let mut update = |step_seconds: f64| {
                host_update_tick(
                    window.as_mut(),
                    backend.as_mut(),
                    system_bus,
                    app_bus,
                    app,
                    step_seconds,
                )
            };
            strategy.process_required_updates(elapsed, state, monitor, &mut update, timer);
        }

        if state.running
            && (!state.require_one_update_before_draw || state.updated_since_last_draw)
        {
            if *first_update_forced && state.updated_since_last_draw {
                state.require_one_update_before_draw = *user_require_one_update_before_draw;
                *first_update_forced = false;
            }

            if backend.is_idle() && !backend.is_reinitializing() {
                if state.process_fractional_update_before_draw {
                    let catch_up = timer.seconds() - state.last_update_time;
                    if catch_up > 0.0 {
                        let mut update = |step_seconds: f64| {
                            host_update_tick(
                                window.as_mut(),
                                backend.as_mut(),
                                system_bus,
                                app_bus,
                                app,
                                step_seconds,
                            )
                        };
                        strategy.process_single_update(
                            catch_up, state, monitor, &mut update, timer,
                        );
                    }
                }

                // A host that quit during the catch-up step must not be asked
                // to draw.
                if state.running {
                    strategy.analyse_period(timer, state);

                    let now = timer.seconds();
                    app.draw(now - state.last_draw_time, now - state.last_update_time);
                    state.last_draw_time = now;
                    state.updated_since_last_draw = false;
                    monitor.register_draw_frame();

                    strategy.mark_analysis_start(timer);
                }
            }
        }

        monitor.update(timer.seconds());

        let now = timer.seconds();
        if summary.should_log(now) {
            let analytics = strategy.analytics();
            log::info!(
                "pacing: policy={} update_fps={:.1} draw_fps={:.1} utilization={:.2} timestep={:.5}s",
                analytics.policy.label(),
                monitor.update_fps(),
                monitor.draw_fps(),
                analytics.utilization,
                state.current_fixed_timestep_seconds
            );
            summary.mark_logged(now);
        }
    }
}

/// One host update tick, as composed by the loop controller.
///
/// Pumps the window system, checks liveness, drains both deferred queues,
/// then forwards the step to the application's update hook. `false` from the
/// hook, or a closed window, or a drained shutdown request, propagates out
/// so the strategy stops the remaining steps of its batch.
fn host_update_tick<A: Application>(
    window: &mut dyn WindowHost,
    backend: &mut dyn RenderBackend,
    system_bus: &MessageBus<SystemEvent>,
    app_bus: &MessageBus<A::Event>,
    app: &mut A,
    step_seconds: f64,
) -> bool {
    window.pump_events();
    if !window.is_open() {
        log::info!("window closed; requesting shutdown");
        return false;
    }

    let mut keep_running = true;
    for event in system_bus.drain() {
        match event {
            SystemEvent::ShutdownRequested => {
                log::info!("shutdown requested via system bus");
                keep_running = false;
            }
            SystemEvent::WindowResized { width, height } => backend.resize(width, height),
            SystemEvent::BackendResetRequested => backend.begin_reset(),
        }
    }
    for event in app_bus.drain() {
        app.on_event(event);
    }
    if !keep_running {
        return false;
    }

    app.update(step_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pacing::TimingPolicy;
    use crate::subsystems::renderer::NullRenderBackend;

    struct NoopApp;

    impl Application for NoopApp {
        type Event = ();

        fn update(&mut self, _step_seconds: f64) -> bool {
            false
        }

        fn draw(&mut self, _seconds_since_draw: f64, _seconds_since_update: f64) {}
    }

    struct AlwaysOpenWindow;

    impl WindowHost for AlwaysOpenWindow {
        fn is_open(&self) -> bool {
            true
        }

        fn pump_events(&mut self) {}
    }

    fn engine_with_config(config: PacingConfig) -> Result<Engine<NoopApp>, EngineError> {
        Engine::new(
            config,
            NoopApp,
            Box::new(AlwaysOpenWindow),
            Box::new(NullRenderBackend::default()),
        )
    }

    #[test]
    fn construction_rejects_invalid_config() {
        let mut config = PacingConfig::default();
        config.fixed_timestep_seconds = -1.0;

        let result = engine_with_config(config);
        assert!(
            matches!(result, Err(EngineError::InvalidConfig(_))),
            "a non-positive timestep must be rejected at construction"
        );
    }

    #[test]
    fn fresh_engine_is_uninitialized_and_stopped() {
        let engine = engine_with_config(PacingConfig::default()).unwrap();
        assert_eq!(engine.lifecycle(), LifecycleState::Uninitialized);
        assert!(!engine.loop_state().running);
    }

    #[test]
    fn engine_carries_the_configured_policy() {
        let config = PacingConfig {
            policy: TimingPolicy::Variable,
            ..PacingConfig::default()
        };
        let engine = engine_with_config(config).unwrap();
        assert_eq!(engine.loop_state().policy, TimingPolicy::Variable);
        assert_eq!(engine.analytics().policy, TimingPolicy::Variable);
    }

    #[test]
    fn startup_errors_format_with_their_cause() {
        let error = EngineError::ResourceCreationFailed("out of device memory".to_string());
        assert!(error.to_string().contains("out of device memory"));
    }
}
