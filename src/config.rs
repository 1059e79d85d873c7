use ash::vk;
use std::ffi::CString;

/// Validation layers and the debug messenger follow the build profile.
pub const VALIDATION_ENABLED: bool = cfg!(debug_assertions);

pub const KHRONOS_VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Instance-level application settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub application_name: CString,
    pub engine_name: CString,
    pub application_version: u32,
    pub api_version: u32,
    /// Enables validation layers, the debug-utils extension and the messenger.
    pub validation: bool,
    pub validation_layers: Vec<CString>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            application_name: c"Vulkan Engine".to_owned(),
            engine_name: c"NA".to_owned(),
            application_version: vk::make_api_version(0, 1, 0, 0),
            api_version: vk::API_VERSION_1_0,
            validation: VALIDATION_ENABLED,
            validation_layers: vec![c"VK_LAYER_KHRONOS_validation".to_owned()],
        }
    }
}

/// Window settings handed to the windowing collaborator.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan Engine".to_string(),
            width: 800,
            height: 600,
            resizable: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_follows_build_profile() {
        let config = AppConfig::default();
        assert_eq!(config.validation, cfg!(debug_assertions));
        assert_eq!(
            config.validation_layers[0].to_str().unwrap(),
            KHRONOS_VALIDATION_LAYER
        );
    }
}
