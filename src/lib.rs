pub mod config;
pub mod device_context;
pub mod diagnostics;
pub mod error;
pub mod gpu;
pub mod logging;
pub mod queue;
pub mod queue_family;
pub mod selection;
pub mod surface;
pub mod vulkan;
pub mod window;

pub use config::{AppConfig, WindowConfig, VALIDATION_ENABLED};
pub use device_context::{DeviceContext, Stage};
pub use error::BringUpError;
pub use queue_family::QueueFamilyIndices;
