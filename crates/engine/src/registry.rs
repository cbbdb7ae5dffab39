use std::collections::BTreeMap;

use tracing::info;

use crate::engine::MapEngine;

/// Engines addressed by name. Hosts that show several maps keep one entry
/// per map instead of looking engines up globally.
#[derive(Default)]
pub struct MapRegistry {
    engines: BTreeMap<String, MapEngine>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `engine`; a previous engine with the same name is shut down
    /// and returned.
    pub fn insert(&mut self, name: impl Into<String>, engine: MapEngine) -> Option<MapEngine> {
        let name = name.into();
        info!(name = %name, "map engine registered");
        let mut previous = self.engines.insert(name, engine)?;
        previous.shutdown();
        Some(previous)
    }

    pub fn get(&self, name: &str) -> Option<&MapEngine> {
        self.engines.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MapEngine> {
        self.engines.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<MapEngine> {
        let mut engine = self.engines.remove(name)?;
        engine.shutdown();
        Some(engine)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.engines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut MapEngine)> + '_ {
        self.engines.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn shutdown_all(&mut self) {
        for engine in self.engines.values_mut() {
            engine.shutdown();
        }
        self.engines.clear();
    }
}
