use ash::prelude::VkResult;
use ash::vk;
use thiserror::Error;

/// Conditions that stop device bring-up. None of them are retried.
#[derive(Debug, Error)]
pub enum BringUpError {
    #[error("Could not load Vulkan: {0}")]
    Loading(#[from] ash::LoadingError),
    #[error("no GPU with Vulkan support")]
    NoDevice,
    #[error("failed to find a suitable GPU")]
    NoSuitableDevice,
    #[error("validation layers requested, but not available on this platform: {missing:?}")]
    ValidationLayersUnavailable { missing: Vec<String> },
    #[error("extension entry point {0} is not available")]
    ExtensionUnavailable(&'static str),
    #[error("window does not expose a usable raw handle: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),
}

pub type Result<T> = std::result::Result<T, BringUpError>;

/// Reports a driver status. Negative statuses are fatal and abort the process.
pub fn check_vk_result(call: &str, result: vk::Result) {
    if result == vk::Result::SUCCESS {
        return;
    }

    log::error!(target: "vulkan", "{call} failed: VkResult = {result:?} ({})", result.as_raw());

    if result.as_raw() < 0 {
        std::process::abort();
    }
}

/// Unwraps the value of a driver call, aborting on error.
///
/// ash only surfaces non-success codes through `Err`, and without a value the
/// bring-up cannot continue, so every `Err` ends here.
pub fn vk_check<T>(call: &str, result: VkResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(status) => {
            check_vk_result(call, status);
            log::error!(target: "vulkan", "{call} returned no value");
            std::process::abort()
        }
    }
}
