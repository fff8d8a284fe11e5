//! Engine entry point and main loop.

mod runtime;

pub use runtime::{run, ShutdownReason};
