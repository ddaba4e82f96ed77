//! Instance store backing the notification pipeline.
//!
//! Notifiers only ever read the store; registration and status mutation
//! happen elsewhere in the admin system. `InMemoryInstanceStore` is the
//! default backing for tests and single-process deployments, kept behind the
//! `InstanceStore` trait so a networked store can be swapped in.

use crate::core::{Instance, InstanceId, InstanceStore};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("instance lookup failed: {0}")]
    Lookup(String),
}

/// A map-backed `InstanceStore`.
#[derive(Default)]
pub struct InMemoryInstanceStore {
    instances: RwLock<HashMap<InstanceId, Instance>>,
}

impl InMemoryInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an instance.
    ///
    /// Not part of `InstanceStore`; the notification layer never writes.
    pub async fn save(&self, instance: Instance) {
        self.instances
            .write()
            .await
            .insert(instance.id.clone(), instance);
    }
}

#[async_trait]
impl InstanceStore for InMemoryInstanceStore {
    async fn find(&self, id: &InstanceId) -> Result<Option<Instance>, StoreError> {
        Ok(self.instances.read().await.get(id).cloned())
    }
}
