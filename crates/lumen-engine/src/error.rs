//! Engine error taxonomy.
//!
//! Every creation path returns one of these after releasing whatever it had
//! already created. Nothing here is retried by the engine.

use std::path::PathBuf;

use crate::memory::ArenaError;

/// Errors surfaced by engine subsystems.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Arena or backing-heap exhaustion.
    #[error(transparent)]
    Allocation(#[from] ArenaError),

    /// Window or event-loop creation failed.
    #[error("platform failure: {0}")]
    Platform(String),

    /// Adapter, device or surface could not be created.
    #[error("device creation failed: {0}")]
    DeviceCreation(String),

    /// A texture, view, buffer, shader or input layout could not be created.
    #[error("failed to create {what}: {reason}")]
    ResourceCreation { what: String, reason: String },

    /// A shader source (or other asset) is missing or unreadable.
    #[error("failed to load `{}`", path.display())]
    FileLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The swapchain can no longer hand out back buffers.
    #[error("surface failure: {0}")]
    Surface(String),

    /// Swapchain or render-target rebuild after a resize failed.
    #[error("resize to {width}x{height} failed: {reason}")]
    Resize {
        width: u32,
        height: u32,
        reason: String,
    },
}

impl EngineError {
    pub(crate) fn resource(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceCreation {
            what: what.into(),
            reason: reason.into(),
        }
    }
}
