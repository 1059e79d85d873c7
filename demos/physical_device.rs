use vk_context::logging::{init_logging, LoggingConfig};
use vk_context::selection::physical_devices;
use vk_context::vulkan::{load_entry, InstanceBuilder};
use vk_context::AppConfig;

pub fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = AppConfig {
        validation: false,
        ..Default::default()
    };
    let entry = load_entry()?;
    let instance = InstanceBuilder::new(&config).build(&entry, None)?;

    for device in physical_devices(&instance) {
        println!(
            "{} ({:?}) score {} queue families {}",
            device.name(),
            device.device_type(),
            device.score(None),
            device.queue_family_count()
        );
    }

    unsafe { instance.destroy_instance(None) };
    Ok(())
}
