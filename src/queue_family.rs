use ash::vk::{QueueFamilyProperties, QueueFlags};
use std::collections::BTreeSet;

/// Queue family slots that satisfy the application's requirements.
///
/// `present` is only required when a surface takes part in bring-up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
    needs_present: bool,
}

impl QueueFamilyIndices {
    pub fn new(needs_present: bool) -> Self {
        Self {
            graphics: None,
            present: None,
            needs_present,
        }
    }

    pub fn needs_present(&self) -> bool {
        self.needs_present
    }

    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && (!self.needs_present || self.present.is_some())
    }

    /// Distinct family indices across all required roles, ascending.
    pub fn unique_families(&self) -> BTreeSet<u32> {
        let mut families = BTreeSet::new();
        families.extend(self.graphics);
        if self.needs_present {
            families.extend(self.present);
        }
        families
    }
}

/// Scans `families` in index order and records the first family fulfilling
/// each requirement.
///
/// `present_support` is only consulted when given, and is asked about one
/// family index at a time. The scan stops as soon as the result is complete.
pub fn resolve<F>(families: &[QueueFamilyProperties], mut present_support: Option<F>) -> QueueFamilyIndices
where
    F: FnMut(u32) -> bool,
{
    let mut indices = QueueFamilyIndices::new(present_support.is_some());

    for (index, family) in families.iter().enumerate() {
        let index = index as u32;

        if indices.graphics.is_none() && family.queue_flags.contains(QueueFlags::GRAPHICS) {
            indices.graphics = Some(index);
        }

        if let Some(supports) = present_support.as_mut() {
            if indices.present.is_none() && supports(index) {
                indices.present = Some(index);
            }
        }

        if indices.is_complete() {
            break;
        }
    }

    indices
}
