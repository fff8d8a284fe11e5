use std::sync::Arc;

use crate::error::EngineError;

/// Runs `create` inside out-of-memory and validation error scopes.
///
/// Returns the value only if neither scope captured an error. A failed
/// object is still returned by wgpu as an invalid handle; it is dropped here.
pub fn capture<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> Result<T, wgpu::Error> {
    let oom = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = create();

    // Innermost first.
    let validation = pollster::block_on(validation.pop());
    let oom = pollster::block_on(oom.pop());
    match validation.or(oom) {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

/// [`capture`] with the failure reported as [`EngineError::ResourceCreation`].
pub(crate) fn create_resource<T>(
    device: &wgpu::Device,
    what: &str,
    create: impl FnOnce() -> T,
) -> Result<T, EngineError> {
    capture(device, create).map_err(|err| {
        log::error!("{what}: {err}");
        EngineError::resource(what, err.to_string())
    })
}

/// Sends errors raised outside any scope to the log.
///
/// wgpu's default handler panics.
pub fn log_uncaptured_errors(device: &wgpu::Device) {
    device.on_uncaptured_error(Arc::new(|error: wgpu::Error| match error {
        wgpu::Error::OutOfMemory { .. } => log::error!("uncaptured GPU error: out of GPU memory"),
        other => log::error!("uncaptured GPU error: {other}"),
    }));
}

/// A device on wgpu's noop backend, for tests that need real validation.
#[cfg(test)]
pub(crate) fn noop_device() -> (wgpu::Device, wgpu::Queue) {
    let (device, queue) = wgpu::Device::noop(&wgpu::DeviceDescriptor::default());
    log_uncaptured_errors(&device);
    (device, queue)
}
