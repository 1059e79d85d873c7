use ash::Instance;

use crate::error::{vk_check, BringUpError, Result};
use crate::gpu::Gpu;
use crate::surface::Surface;

/// Picks the candidate with the highest score.
///
/// Among equal top scores the one enumerated last wins. Fails with
/// [`BringUpError::NoDevice`] for an empty set and
/// [`BringUpError::NoSuitableDevice`] when the best score is 0.
pub fn pick_best<T>(candidates: impl IntoIterator<Item = (u32, T)>) -> Result<T> {
    let mut best: Option<(u32, T)> = None;

    for (score, candidate) in candidates {
        if best.as_ref().map_or(true, |(best_score, _)| score >= *best_score) {
            best = Some((score, candidate));
        }
    }

    match best {
        None => Err(BringUpError::NoDevice),
        Some((0, _)) => Err(BringUpError::NoSuitableDevice),
        Some((_, candidate)) => Ok(candidate),
    }
}

pub fn physical_devices(instance: &Instance) -> Vec<Gpu> {
    vk_check("vkEnumeratePhysicalDevices", unsafe {
        instance.enumerate_physical_devices()
    })
    .into_iter()
    .map(|physical_device| Gpu::new(instance, physical_device))
    .collect()
}

/// Enumerates the physical devices of `instance` and returns the best one.
pub fn select_physical_device(instance: &Instance, surface: Option<&Surface>) -> Result<Gpu> {
    let devices = physical_devices(instance);

    if devices.is_empty() {
        return Err(BringUpError::NoDevice);
    }

    let candidates: Vec<(u32, Gpu)> = devices
        .into_iter()
        .map(|gpu| {
            let score = gpu.score(surface);
            log::debug!("candidate {} ({:?}): score {}", gpu.name(), gpu.device_type(), score);
            (score, gpu)
        })
        .collect();

    let gpu = pick_best(candidates)?;
    log::info!("Chosen device: {}", gpu.name());

    Ok(gpu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::tests::fake_gpu;
    use crate::gpu::score;
    use crate::queue_family;
    use ash::vk::{Handle, PhysicalDeviceType, QueueFlags};

    #[test]
    fn highest_score_wins() {
        assert_eq!(pick_best([(0, "A"), (0, "B"), (5, "C")]).unwrap(), "C");
        assert_eq!(pick_best([(7, "A"), (2, "B"), (5, "C")]).unwrap(), "A");
    }

    #[test]
    fn ties_go_to_the_last_enumerated() {
        assert_eq!(pick_best([(3, "A"), (3, "B")]).unwrap(), "B");
        assert_eq!(pick_best([(3, "A"), (3, "B"), (1, "C")]).unwrap(), "B");
    }

    #[test]
    fn all_zero_is_unsuitable() {
        assert!(matches!(
            pick_best([(0, "A"), (0, "B")]),
            Err(BringUpError::NoSuitableDevice)
        ));
    }

    #[test]
    fn empty_set_has_no_device() {
        assert!(matches!(
            pick_best(Vec::<(u32, &str)>::new()),
            Err(BringUpError::NoDevice)
        ));
    }

    #[test]
    fn discrete_device_with_shared_family() {
        let gpu = fake_gpu(42, PhysicalDeviceType::DISCRETE_GPU, 16384, true, &[QueueFlags::GRAPHICS]);
        let indices = queue_family::resolve(gpu.queue_family_properties(), Some(|_: u32| true));
        let integrated = fake_gpu(7, PhysicalDeviceType::INTEGRATED_GPU, 8192, true, &[QueueFlags::GRAPHICS]);
        let integrated_indices =
            queue_family::resolve(integrated.queue_family_properties(), Some(|_: u32| true));

        assert_eq!(score(&gpu, &indices), 17384);
        assert_eq!(indices.graphics, Some(0));
        assert_eq!(indices.present, Some(0));

        let chosen = pick_best([
            (score(&integrated, &integrated_indices), integrated),
            (score(&gpu, &indices), gpu),
        ])
        .unwrap();
        assert_eq!(chosen.vk_physical_device().as_raw(), 42);
    }
}
