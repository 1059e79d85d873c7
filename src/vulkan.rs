use ash::vk::{ApplicationInfo, ExtensionProperties, InstanceCreateFlags, InstanceCreateInfo, LayerProperties};
use ash::{Entry, Instance};
use std::ffi::{c_char, CStr, CString};

use crate::config::AppConfig;
use crate::diagnostics::MessageSink;
use crate::error::{vk_check, BringUpError, Result};

/// Loads the Vulkan library.
pub fn load_entry() -> Result<Entry> {
    Ok(unsafe { Entry::load()? })
}

pub fn available_instance_layers(entry: &Entry) -> Vec<LayerProperties> {
    vk_check("vkEnumerateInstanceLayerProperties", unsafe {
        entry.enumerate_instance_layer_properties()
    })
}

pub fn available_instance_extensions(entry: &Entry) -> Vec<ExtensionProperties> {
    vk_check("vkEnumerateInstanceExtensionProperties", unsafe {
        entry.enumerate_instance_extension_properties(None)
    })
}

/// Requested layers that are not present on the host, by exact name.
pub fn missing_layers(requested: &[CString], available: &[LayerProperties]) -> Vec<String> {
    requested
        .iter()
        .filter(|wanted| {
            !available
                .iter()
                .any(|layer| layer.layer_name_as_c_str() == Ok(wanted.as_c_str()))
        })
        .map(|layer| layer.to_string_lossy().into_owned())
        .collect()
}

/// Window-system extensions, then debug utils when validating, then
/// portability enumeration.
pub fn required_extensions(window_extensions: &[&'static CStr], validation: bool) -> Vec<&'static CStr> {
    let mut extensions = window_extensions.to_vec();

    if validation {
        extensions.push(ash::ext::debug_utils::NAME);
    }

    extensions.push(ash::khr::portability_enumeration::NAME);

    extensions
}

/// Assembles the Vulkan instance for an [`AppConfig`].
pub struct InstanceBuilder<'a> {
    config: &'a AppConfig,
    window_extensions: Vec<&'static CStr>,
}

impl<'a> InstanceBuilder<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self {
            config,
            window_extensions: Vec::new(),
        }
    }

    /// Extensions the windowing collaborator needs for presentation.
    pub fn window_extensions(mut self, extensions: &[&'static CStr]) -> Self {
        self.window_extensions.extend_from_slice(extensions);
        self
    }

    pub fn extensions(&self) -> Vec<&'static CStr> {
        required_extensions(&self.window_extensions, self.config.validation)
    }

    /// Layers enabled on the instance; empty unless validation is on.
    pub fn layers(&self) -> &[CString] {
        if self.config.validation {
            &self.config.validation_layers
        } else {
            &[]
        }
    }

    /// Fails with [`BringUpError::ValidationLayersUnavailable`] unless every
    /// requested layer is available on the host.
    pub fn check_layers(&self, available: &[LayerProperties]) -> Result<()> {
        let missing = missing_layers(self.layers(), available);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BringUpError::ValidationLayersUnavailable { missing })
        }
    }

    /// Creates the instance.
    ///
    /// `sink` is chained onto the create info so messages emitted while the
    /// instance is created and destroyed are captured too; it must outlive
    /// the instance.
    pub fn build(&self, entry: &Entry, sink: Option<&MessageSink>) -> Result<Instance> {
        if self.config.validation {
            self.check_layers(&available_instance_layers(entry))?;
        }

        let appinfo = ApplicationInfo::default()
            .application_name(&self.config.application_name)
            .application_version(self.config.application_version)
            .engine_name(&self.config.engine_name)
            .engine_version(self.config.application_version)
            .api_version(self.config.api_version);

        let extensions = self.extensions();
        let extension_names_raw: Vec<*const c_char> =
            extensions.iter().map(|ext| ext.as_ptr()).collect();

        let layers = self.layers();
        let layers_names_raw: Vec<*const c_char> =
            layers.iter().map(|layer| layer.as_ptr()).collect();

        log::info!("[vulkan] Extensions enabled: {}", extensions.len());
        for extension in &extensions {
            log::info!(" - {}", extension.to_string_lossy());
        }

        if !layers.is_empty() {
            log::info!("[vulkan] Validation layers enabled: {}", layers.len());
            for layer in layers {
                log::info!(" - {}", layer.to_string_lossy());
            }
        }

        let mut debug_info = sink.map(MessageSink::create_info);

        let mut create_info = InstanceCreateInfo::default()
            .flags(InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR)
            .application_info(&appinfo)
            .enabled_layer_names(&layers_names_raw)
            .enabled_extension_names(&extension_names_raw);

        if self.config.validation {
            if let Some(debug_info) = debug_info.as_mut() {
                create_info = create_info.push_next(debug_info);
            }
        }

        Ok(vk_check("vkCreateInstance", unsafe {
            entry.create_instance(&create_info, None)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(name: &CStr) -> LayerProperties {
        let mut properties = LayerProperties::default();
        for (dst, src) in properties.layer_name.iter_mut().zip(name.to_bytes()) {
            *dst = *src as c_char;
        }
        properties
    }

    fn validating() -> AppConfig {
        AppConfig {
            validation: true,
            ..Default::default()
        }
    }

    #[test]
    fn all_requested_layers_present() {
        let config = validating();
        let available = [layer(c"VK_LAYER_MESA_overlay"), layer(c"VK_LAYER_KHRONOS_validation")];

        assert!(InstanceBuilder::new(&config).check_layers(&available).is_ok());
    }

    #[test]
    fn a_single_missing_layer_fails() {
        let config = AppConfig {
            validation_layers: vec![
                c"VK_LAYER_KHRONOS_validation".to_owned(),
                c"VK_LAYER_LUNARG_api_dump".to_owned(),
            ],
            ..validating()
        };
        let available = [layer(c"VK_LAYER_KHRONOS_validation")];

        match InstanceBuilder::new(&config).check_layers(&available) {
            Err(BringUpError::ValidationLayersUnavailable { missing }) => {
                assert_eq!(missing, vec!["VK_LAYER_LUNARG_api_dump".to_owned()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn layer_names_match_case_sensitively() {
        let requested = [c"VK_LAYER_KHRONOS_validation".to_owned()];
        let available = [layer(c"vk_layer_khronos_validation")];

        assert_eq!(missing_layers(&requested, &available).len(), 1);
        assert_eq!(missing_layers(&requested, &[]).len(), 1);
    }

    #[test]
    fn layers_are_ignored_without_validation() {
        let config = AppConfig {
            validation: false,
            ..Default::default()
        };
        let builder = InstanceBuilder::new(&config);

        assert!(builder.layers().is_empty());
        assert!(builder.check_layers(&[]).is_ok());
    }

    #[test]
    fn extension_list_follows_validation() {
        let window = [ash::khr::surface::NAME, ash::khr::xlib_surface::NAME];

        let with = required_extensions(&window, true);
        assert_eq!(
            with,
            vec![
                ash::khr::surface::NAME,
                ash::khr::xlib_surface::NAME,
                ash::ext::debug_utils::NAME,
                ash::khr::portability_enumeration::NAME,
            ]
        );

        let without = required_extensions(&window, false);
        assert!(!without.contains(&ash::ext::debug_utils::NAME));
        assert_eq!(without.last(), Some(&ash::khr::portability_enumeration::NAME));
    }

    #[test]
    fn builder_collects_window_extensions() {
        let config = validating();
        let builder = InstanceBuilder::new(&config).window_extensions(&[ash::khr::surface::NAME]);

        assert_eq!(builder.extensions()[0], ash::khr::surface::NAME);
        assert!(builder.extensions().contains(&ash::ext::debug_utils::NAME));
    }
}
