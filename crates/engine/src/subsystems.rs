use std::any::{Any, TypeId};

use scene::MapWorld;
use tracing::debug;

/// Optional engine add-on, created on first use and kept until shutdown.
pub trait Subsystem: Any {
    fn name(&self) -> &'static str;

    /// The engine replaced its world; cached indices must be dropped.
    fn on_map_reloaded(&mut self, _world: &MapWorld) {}

    fn shutdown(&mut self) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Lazily constructed subsystems keyed by type.
#[derive(Default)]
pub struct Subsystems {
    entries: Vec<(TypeId, Box<dyn Subsystem>)>,
}

impl Subsystems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains<T: Subsystem>(&self) -> bool {
        self.position::<T>().is_some()
    }

    /// Existing instance of `T`, without creating one.
    pub fn get<T: Subsystem>(&self) -> Option<&T> {
        let i = self.position::<T>()?;
        self.entries[i].1.as_any().downcast_ref::<T>()
    }

    /// Instance of `T`, built with `init` on first access. `None` means the
    /// slot keyed by `T` holds something else, which `get_or_init` never
    /// stores.
    pub fn get_or_init<T: Subsystem>(&mut self, init: impl FnOnce() -> T) -> Option<&mut T> {
        let i = match self.position::<T>() {
            Some(i) => i,
            None => {
                let subsystem = init();
                debug!(name = subsystem.name(), "subsystem created");
                self.entries.push((TypeId::of::<T>(), Box::new(subsystem)));
                self.entries.len() - 1
            }
        };
        self.entries[i].1.as_any_mut().downcast_mut::<T>()
    }

    pub fn on_map_reloaded(&mut self, world: &MapWorld) {
        for (_, subsystem) in &mut self.entries {
            subsystem.on_map_reloaded(world);
        }
    }

    /// Shuts every subsystem down in reverse creation order and drops them.
    pub fn shutdown(&mut self) {
        while let Some((_, mut subsystem)) = self.entries.pop() {
            debug!(name = subsystem.name(), "subsystem shut down");
            subsystem.shutdown();
        }
    }

    fn position<T: Subsystem>(&self) -> Option<usize> {
        let id = TypeId::of::<T>();
        self.entries.iter().position(|(t, _)| *t == id)
    }
}
