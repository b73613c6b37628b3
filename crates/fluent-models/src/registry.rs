//! In-memory model registry
//!
//! Fitted models are kept for the lifetime of the process under a random
//! UUID so later prediction requests can replay them. The registry is
//! bounded: once full, inserting evicts the least recently used model.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::base::{FittedModel, ModelError, Result};
use crate::config::RegistryConfig;


/// Shared store of fitted models keyed by identifier
pub struct ModelRegistry {
    models: Mutex<LruCache<String, Arc<FittedModel>>>,
}

impl ModelRegistry {
    /// Capacity used by [`ModelRegistry::new`]
    pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1023);

    /// Create a registry with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a registry holding at most `capacity` models
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            models: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Create a registry from configuration
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.capacity)
            .ok_or_else(|| ModelError::config("registry capacity must be at least 1"))?;
        Ok(Self::with_capacity(capacity))
    }

    /// Store a model under a fresh identifier and return the identifier
    pub fn insert(&self, model: FittedModel) -> String {
        let id = Uuid::new_v4().to_string();
        let evicted = self.models.lock().push(id.clone(), Arc::new(model));

        if let Some((old_id, _)) = evicted {
            warn!(model_id = %old_id, "Registry full, evicted least recently used model");
        }
        info!(model_id = %id, "Registered model");
        id
    }

    /// Look a model up, marking it as recently used
    pub fn get(&self, id: &str) -> Option<Arc<FittedModel>> {
        self.models.lock().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<FittedModel>> {
        self.models.lock().pop(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.models.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.models.lock().cap().get()
    }

    pub fn clear(&self) {
        self.models.lock().clear();
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
