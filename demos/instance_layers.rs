use vk_context::vulkan::{available_instance_extensions, available_instance_layers, load_entry};

pub fn main() -> anyhow::Result<()> {
    let entry = load_entry()?;

    println!("Layers:");
    for layer in available_instance_layers(&entry) {
        if let Ok(name) = layer.layer_name_as_c_str() {
            println!(" - {}", name.to_string_lossy());
        }
    }

    println!("Extensions:");
    for extension in available_instance_extensions(&entry) {
        if let Ok(name) = extension.extension_name_as_c_str() {
            println!(" - {}", name.to_string_lossy());
        }
    }

    Ok(())
}
