//! Lumen engine crate.
//!
//! A single-window renderer: arena memory, a winit window, a wgpu device and
//! the fixed HDR scene + bloom pipeline. [`run`] drives the whole lifecycle.

pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod logging;
pub mod memory;
pub mod render;
pub mod resources;
pub mod window;

pub use config::{EngineConfig, RenderConfig};
pub use self::core::{run, ShutdownReason};
pub use error::EngineError;
