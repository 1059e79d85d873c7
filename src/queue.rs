use ash::vk::Queue;

/// A device queue together with the family it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandQueue {
    handle: Queue,
    queue_family_index: u32,
}

impl CommandQueue {
    pub fn family_type_index(&self) -> u32 {
        self.queue_family_index
    }

    pub fn handle(&self) -> Queue {
        self.handle
    }
}

/// Queues retrieved after logical-device creation, one per role.
#[derive(Debug, Clone, Copy)]
pub struct Queues {
    graphics: CommandQueue,
    present: Option<CommandQueue>,
}

impl Queues {
    /// Takes queue 0 of every role's family through `get_queue`.
    ///
    /// A family serving both roles is fetched once and shared.
    pub(crate) fn retrieve<F>(graphics_family: u32, present_family: Option<u32>, mut get_queue: F) -> Self
    where
        F: FnMut(u32, u32) -> Queue,
    {
        let graphics = CommandQueue {
            handle: get_queue(graphics_family, 0),
            queue_family_index: graphics_family,
        };

        let present = present_family.map(|family| {
            if family == graphics_family {
                graphics
            } else {
                CommandQueue {
                    handle: get_queue(family, 0),
                    queue_family_index: family,
                }
            }
        });

        Self { graphics, present }
    }

    pub fn graphics(&self) -> CommandQueue {
        self.graphics
    }

    /// Present queue; `None` for headless contexts.
    pub fn present(&self) -> Option<CommandQueue> {
        self.present
    }
}
