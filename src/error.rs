//! # Errors (`error.rs`)
//!
//! Every fallible step of the viewer reports through [`ViewerError`]. Setup failures
//! (no adapter, no device, surface creation) end the program with a message, while
//! per-frame surface hiccups are handled inside the renderer and never surface here
//! except for the unrecoverable out-of-memory case.

/// Errors raised while configuring, initializing or running the viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// A [`ViewerConfig`](crate::ViewerConfig) value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A camera setter was called with a value that would break the projection.
    #[error("invalid camera parameter: {0}")]
    InvalidCamera(String),

    /// The window could not be turned into a rendering surface.
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No adapter is compatible with the window surface.
    #[error("no compatible graphics adapter found. Can your hardware handle WebGPU/Vulkan/Metal/DX12?")]
    NoAdapter,

    /// The adapter refused to hand out a device with the requested limits.
    #[error("failed to request a device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The surface offers nothing of the named kind for the chosen adapter.
    #[error("surface supports no {0} on this adapter")]
    UnsupportedSurface(&'static str),

    /// The surface reports that it can no longer allocate frames.
    #[error("surface is out of memory")]
    SurfaceOutOfMemory,

    /// The window could not be created by the event loop.
    #[error("failed to create window: {0}")]
    CreateWindow(#[from] winit::error::OsError),

    /// The event loop failed to start or terminated abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = ViewerError::InvalidConfig("grid width must be non-zero".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration: grid width must be non-zero"
        );

        let err = ViewerError::InvalidCamera("field of view 190 outside (0, 180)".into());
        assert!(err.to_string().starts_with("invalid camera parameter"));

        let err = ViewerError::UnsupportedSurface("present mode");
        assert_eq!(err.to_string(), "surface supports no present mode on this adapter");
    }
}
