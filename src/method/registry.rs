use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::island::IslandRegistry;
use crate::models::Supports;

use super::{MethodDescriptor, SearchMethod};

/// Node metadata surface, derived from the registry / 节点元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    pub methods: Vec<String>,
    pub method_capabilities: BTreeMap<String, Supports>,
}

struct RegisteredMethod {
    descriptor: MethodDescriptor,
    method: Arc<dyn SearchMethod>,
}

/// Search method registry (populated at startup, read-only afterwards) / 搜索方法注册表
pub struct SearchMethodRegistry {
    methods: Vec<RegisteredMethod>,
    index: HashMap<String, usize>,
    islands: Arc<IslandRegistry>,
}

impl SearchMethodRegistry {
    /// Allow-lists are validated against `islands` / 允许列表依据岛屿注册表校验
    pub fn new(islands: Arc<IslandRegistry>) -> Self {
        Self {
            methods: Vec::new(),
            index: HashMap::new(),
            islands,
        }
    }

    /// Register search method / 注册搜索方法
    pub fn register(&mut self, method: Arc<dyn SearchMethod>) -> Result<(), RegistryError> {
        let descriptor = method.descriptor();
        let key = descriptor.key.clone();
        if key.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.index.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        if let Some(unknown) = descriptor
            .allowed_islands
            .iter()
            .find(|id| !self.islands.contains(id))
        {
            return Err(RegistryError::UnknownIsland {
                method: key,
                island: unknown.clone(),
            });
        }

        let federated = method.supports_federation();
        self.index.insert(key.clone(), self.methods.len());
        self.methods.push(RegisteredMethod { descriptor, method });
        tracing::info!("Search method registered: {} (federated: {})", key, federated);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn SearchMethod>> {
        self.index.get(key).map(|&i| Arc::clone(&self.methods[i].method))
    }

    pub fn descriptor(&self, key: &str) -> Option<&MethodDescriptor> {
        self.index.get(key).map(|&i| &self.methods[i].descriptor)
    }

    /// Registered keys in registration order / 已注册的方法
    pub fn keys(&self) -> Vec<String> {
        self.methods.iter().map(|m| m.descriptor.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn islands(&self) -> &Arc<IslandRegistry> {
        &self.islands
    }

    /// Derive the metadata surface; pure, recomputed on every call / 生成节点元数据
    pub fn metadata(&self, name: &str, description: &str) -> NodeMetadata {
        NodeMetadata {
            name: name.to_string(),
            description: description.to_string(),
            features: self
                .methods
                .iter()
                .map(|m| m.descriptor.description.clone())
                .collect(),
            methods: self.keys(),
            method_capabilities: self
                .methods
                .iter()
                .map(|m| (m.descriptor.key.clone(), m.descriptor.supports.clone()))
                .collect(),
        }
    }
}
