use ash::vk::{DeviceCreateInfo, DeviceQueueCreateInfo, PhysicalDeviceFeatures};
use ash::{Device, Entry, Instance};
use std::ffi::{c_char, CString};

use crate::config::AppConfig;
use crate::diagnostics::{DiagnosticsChannel, MessageSink};
use crate::error::{vk_check, BringUpError, Result};
use crate::gpu::Gpu;
use crate::queue::Queues;
use crate::queue_family::QueueFamilyIndices;
use crate::selection::select_physical_device;
use crate::surface::{self, Surface, WindowTarget};
use crate::vulkan::InstanceBuilder;

/// Bring-up stages, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Uninitialized,
    InstanceCreated,
    DiagnosticsAttached,
    SurfaceCreated,
    PhysicalDeviceChosen,
    LogicalDeviceCreated,
    Running,
    TornDown,
}

/// Stages to unwind on teardown, most recent first. Optional stages that
/// never happened are left out.
pub fn teardown_plan(has_diagnostics: bool, has_surface: bool) -> Vec<Stage> {
    let mut plan = vec![Stage::LogicalDeviceCreated];
    if has_surface {
        plan.push(Stage::SurfaceCreated);
    }
    if has_diagnostics {
        plan.push(Stage::DiagnosticsAttached);
    }
    plan.push(Stage::InstanceCreated);
    plan
}

/// One queue-create descriptor per distinct family in `indices`.
pub fn queue_create_infos<'a>(
    indices: &QueueFamilyIndices,
    priorities: &'a [f32],
) -> Vec<DeviceQueueCreateInfo<'a>> {
    indices
        .unique_families()
        .into_iter()
        .map(|family| {
            DeviceQueueCreateInfo::default()
                .queue_family_index(family)
                .queue_priorities(priorities)
        })
        .collect()
}

fn advance(stage: &mut Stage, next: Stage) {
    debug_assert!(next > *stage, "stage {next:?} reached after {stage:?}");
    log::trace!("{stage:?} -> {next:?}");
    *stage = next;
}

/// Instance-level resources. Dropping it destroys them in reverse order,
/// which also cleans up after a bring-up that failed half way.
struct InstanceContext {
    entry: Entry,
    instance: Instance,
    diagnostics: Option<DiagnosticsChannel>,
    surface: Option<Surface>,
    // Referenced by the driver until the instance is gone.
    sink: Option<MessageSink>,
    stage: Stage,
}

impl InstanceContext {
    fn new(config: &AppConfig, window: Option<&dyn WindowTarget>) -> Result<Self> {
        let mut stage = Stage::Uninitialized;
        let entry = crate::vulkan::load_entry()?;

        let window_extensions = match window {
            Some(window) => surface::required_extensions(window)?,
            None => Vec::new(),
        };

        let sink = config.validation.then(MessageSink::logging);
        let instance = InstanceBuilder::new(config)
            .window_extensions(&window_extensions)
            .build(&entry, sink.as_ref())?;
        advance(&mut stage, Stage::InstanceCreated);

        let mut context = Self {
            entry,
            instance,
            diagnostics: None,
            surface: None,
            sink,
            stage,
        };

        if let Some(sink) = context.sink.as_ref() {
            context.diagnostics = Some(DiagnosticsChannel::new(&context.entry, &context.instance, sink)?);
            advance(&mut context.stage, Stage::DiagnosticsAttached);
        }

        if let Some(window) = window {
            context.surface = Some(Surface::new(&context.entry, &context.instance, window)?);
            advance(&mut context.stage, Stage::SurfaceCreated);
        }

        Ok(context)
    }
}

impl Drop for InstanceContext {
    fn drop(&mut self) {
        let plan = teardown_plan(self.diagnostics.is_some(), self.surface.is_some());
        for stage in plan {
            unsafe {
                match stage {
                    Stage::SurfaceCreated => {
                        if let Some(surface) = self.surface.take() {
                            surface.destroy();
                        }
                    }
                    Stage::DiagnosticsAttached => {
                        if let Some(diagnostics) = self.diagnostics.take() {
                            diagnostics.destroy();
                        }
                    }
                    Stage::InstanceCreated => self.instance.destroy_instance(None),
                    // Owned and destroyed by DeviceContext.
                    _ => {}
                }
            }
        }
        self.stage = Stage::TornDown;
    }
}

/// Owns the instance, the optional debug messenger and surface, the chosen
/// physical device, the logical device and its queues.
///
/// Everything is destroyed in reverse acquisition order when the context is
/// dropped.
pub struct DeviceContext {
    gpu: Gpu,
    queue_families: QueueFamilyIndices,
    handle: Device,
    queues: Queues,
    stage: Stage,
    // Dropped after the logical device is destroyed.
    base: InstanceContext,
}

impl DeviceContext {
    /// Brings up a context without presentation support.
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::bring_up(config, None)
    }

    /// Brings up a context that can present to `window`.
    ///
    /// The window must outlive the context.
    pub fn with_window(config: &AppConfig, window: &dyn WindowTarget) -> Result<Self> {
        Self::bring_up(config, Some(window))
    }

    fn bring_up(config: &AppConfig, window: Option<&dyn WindowTarget>) -> Result<Self> {
        let base = InstanceContext::new(config, window)?;
        let mut stage = base.stage;

        let gpu = select_physical_device(&base.instance, base.surface.as_ref())?;
        advance(&mut stage, Stage::PhysicalDeviceChosen);

        let queue_families = gpu.queue_families(base.surface.as_ref());
        let graphics_family = match queue_families.graphics {
            Some(family) if queue_families.is_complete() => family,
            _ => return Err(BringUpError::NoSuitableDevice),
        };

        let handle = create_logical_device(&base.instance, &gpu, &queue_families, config);
        let queues = Queues::retrieve(graphics_family, queue_families.present, |family, index| unsafe {
            handle.get_device_queue(family, index)
        });
        advance(&mut stage, Stage::LogicalDeviceCreated);

        log::info!(
            "logical device created on {} (graphics family {}, present family {:?})",
            gpu.name(),
            graphics_family,
            queue_families.present
        );

        Ok(Self {
            gpu,
            queue_families,
            handle,
            queues,
            stage,
            base,
        })
    }

    /// Marks the hand-over to the event pump.
    pub fn enter_running(&mut self) {
        advance(&mut self.stage, Stage::Running);
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn wait(&self) {
        vk_check("vkDeviceWaitIdle", unsafe { self.handle.device_wait_idle() });
    }

    pub fn entry(&self) -> &Entry {
        &self.base.entry
    }

    pub fn instance(&self) -> &Instance {
        &self.base.instance
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.base.surface.as_ref()
    }

    pub fn has_diagnostics(&self) -> bool {
        self.base.diagnostics.is_some()
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn queue_families(&self) -> &QueueFamilyIndices {
        &self.queue_families
    }

    pub fn handle(&self) -> &Device {
        &self.handle
    }

    pub fn queues(&self) -> &Queues {
        &self.queues
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        self.wait();
        unsafe { self.handle.destroy_device(None) };
        log::debug!("logical device destroyed");
        self.stage = Stage::TornDown;
    }
}

fn create_logical_device(
    instance: &Instance,
    gpu: &Gpu,
    indices: &QueueFamilyIndices,
    config: &AppConfig,
) -> Device {
    let priorities = [1.0f32];
    let queue_infos = queue_create_infos(indices, &priorities);

    let features = PhysicalDeviceFeatures::default();

    let layers: &[CString] = if config.validation {
        &config.validation_layers
    } else {
        &[]
    };
    let layer_names_raw: Vec<*const c_char> = layers.iter().map(|layer| layer.as_ptr()).collect();

    // Device layers are ignored by current loaders but honoured by old ones.
    #[allow(deprecated)]
    let create_info = DeviceCreateInfo::default()
        .queue_create_infos(&queue_infos)
        .enabled_features(&features)
        .enabled_layer_names(&layer_names_raw);

    vk_check("vkCreateDevice", unsafe {
        instance.create_device(gpu.vk_physical_device(), &create_info, None)
    })
}
