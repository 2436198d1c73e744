//! Render backend call boundary.
//!
//! The scheduler never talks to a GPU. It consults the backend's readiness
//! predicates before every draw attempt and forwards structural requests
//! (resize, reset, release) that were drained from the deferred queues.
//! Everything behind these calls (command encoding, swapchains, pipelines)
//! is out of scope for the engine core.

/// Errors surfaced by a render backend.
#[derive(Debug)]
pub enum RenderError {
    InitializationFailed(String),
    ResourceCreationFailed(String),
    ResetFailed(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::InitializationFailed(s) => {
                write!(f, "RenderBackend Initialization Failed: {}", s)
            }
            RenderError::ResourceCreationFailed(s) => {
                write!(f, "RenderBackend Resource Creation Failed: {}", s)
            }
            RenderError::ResetFailed(s) => write!(f, "RenderBackend Reset Failed: {}", s),
        }
    }
}

impl std::error::Error for RenderError {}

/// Trait representing the graphics backend as the scheduler sees it.
///
/// The readiness predicates are non-blocking: the loop controller checks
/// them every iteration instead of waiting on a device fence, and simply
/// skips the draw when the backend is busy.
pub trait RenderBackend: std::fmt::Debug {
    /// Initialize backend device state. Called once during engine startup;
    /// failure is a fatal startup error.
    fn init(&mut self) -> Result<(), RenderError>;

    /// True when no frame is in flight and the backend can accept new
    /// rendering work.
    fn is_idle(&self) -> bool;

    /// True while the backend is rebuilding device-level state.
    fn is_reinitializing(&self) -> bool;

    /// Begins a device-level reinitialization. Only ever invoked from inside
    /// an update tick, never mid-draw.
    fn begin_reset(&mut self);

    /// Adjusts backend surfaces to a new window size.
    fn resize(&mut self, width: u32, height: u32);

    /// Releases owned device resources. Invoked after the application's own
    /// shutdown hook has run.
    fn shutdown(&mut self);
}

/// A backend that accepts everything and renders nothing.
///
/// Always idle, never reinitializing. Stands in for a real device in tests
/// and in hosts that only need the scheduling behavior.
#[derive(Debug, Default)]
pub struct NullRenderBackend {
    frames_resized: u64,
    resets_requested: u64,
}

impl RenderBackend for NullRenderBackend {
    fn init(&mut self) -> Result<(), RenderError> {
        log::info!("null render backend initialized (no device state)");
        Ok(())
    }

    fn is_idle(&self) -> bool {
        true
    }

    fn is_reinitializing(&self) -> bool {
        false
    }

    fn begin_reset(&mut self) {
        self.resets_requested += 1;
        log::info!(
            "null render backend: reset requested (nothing to rebuild, {} so far)",
            self.resets_requested
        );
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.frames_resized += 1;
        log::debug!(
            "null render backend: resize to {width}x{height} ({} resizes)",
            self.frames_resized
        );
    }

    fn shutdown(&mut self) {
        log::info!("null render backend released");
    }
}
