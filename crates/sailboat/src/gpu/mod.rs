//! GPU services: error type, device-lost tracking, shader compilation and the
//! water compute backend.

pub mod water;

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag indicating GPU device was lost
static GPU_DEVICE_LOST: AtomicBool = AtomicBool::new(false);

/// Check if the GPU device has been lost
pub fn is_device_lost() -> bool {
    GPU_DEVICE_LOST.load(Ordering::SeqCst)
}

/// Reset the device lost flag (call after recreating device)
pub fn reset_device_lost() {
    GPU_DEVICE_LOST.store(false, Ordering::SeqCst);
}

pub(crate) fn mark_device_lost() {
    GPU_DEVICE_LOST.store(true, Ordering::SeqCst);
}

/// Failures surfaced while starting up or presenting.
#[derive(Debug)]
pub enum RenderError {
    EventLoop(String),
    WindowCreation(String),
    SurfaceCreation(wgpu::CreateSurfaceError),
    NoAdapter,
    UnsupportedSurface,
    DeviceRequest(wgpu::RequestDeviceError),
    ShaderCompile { label: String, message: String },
    Surface(wgpu::SurfaceError),
    DeviceLost,
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::EventLoop(msg) => write!(f, "Event loop error: {}", msg),
            RenderError::WindowCreation(msg) => write!(f, "Failed to create window: {}", msg),
            RenderError::SurfaceCreation(e) => write!(f, "Failed to create surface: {}", e),
            RenderError::NoAdapter => write!(f, "No compatible GPU adapter found"),
            RenderError::UnsupportedSurface => write!(f, "Surface reports no supported formats"),
            RenderError::DeviceRequest(e) => write!(f, "Failed to create device: {}", e),
            RenderError::ShaderCompile { label, message } => {
                write!(f, "Shader '{}' failed to compile:\n{}", label, message)
            }
            RenderError::Surface(e) => write!(f, "Surface error: {}", e),
            RenderError::DeviceLost => write!(f, "GPU device lost"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::SurfaceCreation(e) => Some(e),
            RenderError::DeviceRequest(e) => Some(e),
            RenderError::Surface(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for RenderError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        RenderError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        RenderError::DeviceRequest(e)
    }
}

/// Compile a WGSL module, turning validation errors into [`RenderError::ShaderCompile`].
pub fn compile_shader(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => {
            log::error!("Shader '{}' failed to compile: {}", label, error);
            Err(RenderError::ShaderCompile {
                label: label.to_string(),
                message: error.to_string(),
            })
        }
        None => {
            log::debug!("Compiled shader '{}'", label);
            Ok(module)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_error_message_names_shader() {
        let err = RenderError::ShaderCompile {
            label: "water".into(),
            message: "unknown identifier".into(),
        };
        let text = err.to_string();
        assert!(text.contains("water"));
        assert!(text.contains("unknown identifier"));
    }

    #[test]
    fn test_device_lost_flag() {
        reset_device_lost();
        assert!(!is_device_lost());
        mark_device_lost();
        assert!(is_device_lost());
        reset_device_lost();
        assert!(!is_device_lost());
    }
}
