use std::sync::Arc;

use crate::config::{EnvConfig, ResolverConfig};
use crate::container::provider::ServiceResolver;
use crate::container::registry::{ServiceCollection, ServiceStore};
use crate::errors::ContainerError;

/// Resolves services from several collections as if they were one.
///
/// Collections are searched in insertion order at every step of a resolution,
/// so when two collections register the same identifier the one added first
/// wins, and a dependency graph may span collections in both directions.
#[derive(Debug, Default)]
pub struct ServiceMultiCollection {
    collections: Vec<Arc<ServiceCollection>>,
    config: ResolverConfig,
}

impl ServiceMultiCollection {
    pub fn new(collections: impl IntoIterator<Item = Arc<ServiceCollection>>) -> Self {
        let mut multi = Self::default();
        multi.add_collections(collections);
        multi
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Result<Self, ContainerError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Append collections in order; ones already held keep their priority
    pub fn add_collections(
        &mut self,
        collections: impl IntoIterator<Item = Arc<ServiceCollection>>,
    ) -> &mut Self {
        for collection in collections {
            if !self.holds(&collection) {
                self.collections.push(collection);
            }
        }
        tracing::debug!(collections = self.collections.len(), "Added service collections");
        self
    }

    pub fn remove_collections<'c>(
        &mut self,
        collections: impl IntoIterator<Item = &'c Arc<ServiceCollection>>,
    ) -> &mut Self {
        for collection in collections {
            self.collections.retain(|held| !Arc::ptr_eq(held, collection));
        }
        self
    }

    pub fn clear_collections(&mut self) -> &mut Self {
        self.collections.clear();
        self
    }

    /// Held collections, highest priority first
    pub fn collections(&self) -> &[Arc<ServiceCollection>] {
        &self.collections
    }

    pub fn holds(&self, collection: &Arc<ServiceCollection>) -> bool {
        self.collections.iter().any(|held| Arc::ptr_eq(held, collection))
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl ServiceResolver for ServiceMultiCollection {
    fn stores(&self) -> Vec<&ServiceStore> {
        self.collections.iter().map(|collection| collection.store()).collect()
    }

    fn config(&self) -> &ResolverConfig {
        &self.config
    }
}
