//! Error types for drift.
//!
//! One enum per failure domain: controller configuration, canvas creation
//! and export, and (with the `window` feature) the on-screen host.

use thiserror::Error;

/// Errors raised while building a [`Controller`](crate::Controller).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither a render surface nor a custom draw function was supplied.
    #[error("controller requires a render surface or a custom draw function")]
    MissingRenderTarget,
}

/// Errors from the software [`Canvas`](crate::Canvas).
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Width or height was zero.
    #[error("canvas dimensions must be non-zero, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    /// Failed to encode the image.
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    /// Failed to write the file.
    #[error("failed to write image file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when running the windowed host.
#[cfg(feature = "window")]
#[derive(Debug, Error)]
pub enum WindowError {
    /// Failed to create or run the event loop.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// Failed to create a GPU surface for the window.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; a WebGPU/Vulkan/Metal/DX12 capable GPU is required")]
    NoAdapter,
    /// Failed to create the GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The window surface does not support any usable configuration.
    #[error("window surface is not supported by the selected adapter")]
    UnsupportedSurface,
    /// The canvas could not be created.
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_missing_render_target_message() {
        let message = ConfigError::MissingRenderTarget.to_string();
        assert!(message.contains("render surface"));
    }

    #[test]
    fn test_io_error_is_chained() {
        let err = CanvasError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert!(matches!(err, CanvasError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_zero_size_has_no_source() {
        let err = CanvasError::ZeroSize { width: 0, height: 10 };
        assert_eq!(err.to_string(), "canvas dimensions must be non-zero, got 0x10");
        assert!(err.source().is_none());
    }
}
