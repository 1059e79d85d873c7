use ash::vk::{PhysicalDevice, SurfaceKHR};
use ash::{Entry, Instance};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle};
use std::ffi::CStr;

use crate::error::{vk_check, Result};

/// Anything that can host a presentation surface.
pub trait WindowTarget: HasDisplayHandle + HasWindowHandle {}

impl<T: HasDisplayHandle + HasWindowHandle + ?Sized> WindowTarget for T {}

/// Instance extensions the window system needs for presentation.
pub fn required_extensions(display: &(impl HasDisplayHandle + ?Sized)) -> Result<Vec<&'static CStr>> {
    let raw = display.display_handle()?.as_raw();
    Ok(required_extensions_for(raw))
}

fn required_extensions_for(display: RawDisplayHandle) -> Vec<&'static CStr> {
    vk_check(
        "vkEnumerateInstanceExtensionProperties",
        ash_window::enumerate_required_extensions(display),
    )
    .iter()
    // ash-window hands out pointers to static, nul terminated names.
    .map(|name| unsafe { CStr::from_ptr(*name) })
    .collect()
}

/// A presentation surface bound to a window.
pub struct Surface {
    loader: ash::khr::surface::Instance,
    handle: SurfaceKHR,
}

impl Surface {
    /// Creates a surface for `window` on `instance`.
    ///
    /// The window must outlive the surface.
    pub fn new<W>(entry: &Entry, instance: &Instance, window: &W) -> Result<Self>
    where
        W: WindowTarget + ?Sized,
    {
        let display = window.display_handle()?.as_raw();
        let window = window.window_handle()?.as_raw();

        let handle = vk_check("vkCreateSurfaceKHR", unsafe {
            ash_window::create_surface(entry, instance, display, window, None)
        });

        Ok(Self {
            loader: ash::khr::surface::Instance::new(entry, instance),
            handle,
        })
    }

    pub fn handle(&self) -> SurfaceKHR {
        self.handle
    }

    /// Whether queue family `queue_family_index` of `physical_device` can
    /// present to this surface.
    pub fn supports_present(&self, physical_device: PhysicalDevice, queue_family_index: u32) -> bool {
        vk_check("vkGetPhysicalDeviceSurfaceSupportKHR", unsafe {
            self.loader.get_physical_device_surface_support(
                physical_device,
                queue_family_index,
                self.handle,
            )
        })
    }

    /// # Safety
    /// Must be called once, before the owning instance is destroyed, and after
    /// every object using the surface is gone.
    pub(crate) unsafe fn destroy(&self) {
        self.loader.destroy_surface(self.handle, None);
    }
}
