use vk_context::logging::{init_logging, LoggingConfig};
use vk_context::{AppConfig, DeviceContext};

pub fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let context = DeviceContext::new(&AppConfig::default())?;
    println!("Device: {}", context.gpu().name());
    println!("Graphics family: {:?}", context.queue_families().graphics);
    println!("Diagnostics attached: {}", context.has_diagnostics());

    context.wait();
    Ok(())
}
