//! Graphics device and swapchain.
//!
//! [`GraphicsDevice`] owns the wgpu instance, adapter, device, queue and the
//! window surface. A resize reconfigures the surface only; the device and
//! queue live until shutdown.
//!
//! Object creation runs inside wgpu error scopes (see [`capture`]) so a
//! validation or out-of-memory failure comes back as an error value.

mod frame;
mod gpu;
mod init;
mod scope;
mod surface;

pub use frame::GpuFrame;
pub use gpu::GraphicsDevice;
pub use init::GpuInit;
pub use scope::{capture, log_uncaptured_errors};
pub(crate) use scope::create_resource;
#[cfg(test)]
pub(crate) use scope::noop_device;
pub use surface::SurfaceErrorAction;
