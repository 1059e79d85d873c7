use ash::vk::{
    PhysicalDevice, PhysicalDeviceFeatures, PhysicalDeviceLimits, PhysicalDeviceProperties,
    PhysicalDeviceType, QueueFamilyProperties, FALSE,
};

use crate::queue_family::{self, QueueFamilyIndices};
use crate::surface::Surface;

/// Score bonus for dedicated hardware.
pub const DISCRETE_GPU_BONUS: u32 = 1000;

/// Snapshot of a physical device's properties, features and queue layout.
///
/// The handle is borrowed from the instance's device table and is never freed
/// here.
#[derive(Clone)]
pub struct Gpu {
    physical_device: PhysicalDevice,
    features: PhysicalDeviceFeatures,
    properties: PhysicalDeviceProperties,
    queue_family_properties: Vec<QueueFamilyProperties>,
}

impl Gpu {
    pub(crate) fn new(instance: &ash::Instance, physical_device: PhysicalDevice) -> Self {
        unsafe {
            Self::from_parts(
                physical_device,
                instance.get_physical_device_properties(physical_device),
                instance.get_physical_device_features(physical_device),
                instance.get_physical_device_queue_family_properties(physical_device),
            )
        }
    }

    pub(crate) fn from_parts(
        physical_device: PhysicalDevice,
        properties: PhysicalDeviceProperties,
        features: PhysicalDeviceFeatures,
        queue_family_properties: Vec<QueueFamilyProperties>,
    ) -> Self {
        Self {
            physical_device,
            features,
            properties,
            queue_family_properties,
        }
    }

    pub fn vk_physical_device(&self) -> PhysicalDevice {
        self.physical_device
    }

    pub fn name(&self) -> String {
        self.properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn device_type(&self) -> PhysicalDeviceType {
        self.properties.device_type
    }

    pub fn is_discrete(&self) -> bool {
        self.properties.device_type == PhysicalDeviceType::DISCRETE_GPU
    }

    pub fn supports_geometry_shader(&self) -> bool {
        self.features.geometry_shader != FALSE
    }

    pub fn limits(&self) -> PhysicalDeviceLimits {
        self.properties.limits
    }

    pub fn queue_family_count(&self) -> u32 {
        self.queue_family_properties.len() as u32
    }

    pub fn queue_family_properties(&self) -> &[QueueFamilyProperties] {
        &self.queue_family_properties
    }

    /// Resolves the queue families this device offers for the current
    /// requirement set. Presentation is only required when `surface` is given.
    pub fn queue_families(&self, surface: Option<&Surface>) -> QueueFamilyIndices {
        let present_support = surface.map(|surface| {
            move |index: u32| surface.supports_present(self.physical_device, index)
        });

        queue_family::resolve(&self.queue_family_properties, present_support)
    }

    /// Suitability score. Zero means the device can not be used at all.
    pub fn score(&self, surface: Option<&Surface>) -> u32 {
        score(self, &self.queue_families(surface))
    }
}

/// Scores a device given its resolved queue families.
///
/// Devices without geometry shaders or with incomplete queue families get 0.
/// Otherwise the score is the maximum 2D image dimension plus
/// [`DISCRETE_GPU_BONUS`] for discrete devices.
pub fn score(gpu: &Gpu, indices: &QueueFamilyIndices) -> u32 {
    if !gpu.supports_geometry_shader() || !indices.is_complete() {
        return 0;
    }

    let mut score = 0u32;

    if gpu.is_discrete() {
        score += DISCRETE_GPU_BONUS;
    }

    score.saturating_add(gpu.limits().max_image_dimension2_d)
}
