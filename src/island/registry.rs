use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;

use super::{Island, IslandDescriptor};

/// Descriptor and implementation pair stored by the registry / 注册项
#[derive(Clone)]
pub struct RegisteredIsland {
    descriptor: IslandDescriptor,
    island: Arc<dyn Island>,
}

impl RegisteredIsland {
    pub fn descriptor(&self) -> &IslandDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn island(&self) -> Arc<dyn Island> {
        Arc::clone(&self.island)
    }
}

/// Island registry, populated once at startup / 补充内容块注册表
///
/// Iteration order is registration order; it is the display order contract
/// for composed islands.
#[derive(Default)]
pub struct IslandRegistry {
    islands: Vec<RegisteredIsland>,
    index: HashMap<String, usize>,
}

impl IslandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register island / 注册补充内容块
    pub fn register(&mut self, island: Arc<dyn Island>) -> Result<(), RegistryError> {
        let descriptor = island.descriptor();
        let id = descriptor.id.clone();
        if id.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.index.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }

        self.index.insert(id.clone(), self.islands.len());
        self.islands.push(RegisteredIsland { descriptor, island });
        tracing::info!("Island registered: {}", id);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredIsland> {
        self.index.get(id).map(|&i| &self.islands[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Islands in registration order / 按注册顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredIsland> {
        self.islands.iter()
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }
}
