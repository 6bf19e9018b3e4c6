use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::{EnvConfig, ResolverConfig};
use crate::container::autowiring::Injectable;
use crate::container::descriptor::{Constructor, ServiceDescriptor};
use crate::container::ident::ServiceIdent;
use crate::container::scope::Lifetime;
use crate::errors::ContainerError;

/// Ordered map of identifiers to descriptors
#[derive(Debug, Default)]
pub struct ServiceStore {
    services: IndexMap<ServiceIdent, ServiceDescriptor>,
}

impl ServiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor; identifiers are unique within a store
    pub fn insert(
        &mut self,
        ident: ServiceIdent,
        descriptor: ServiceDescriptor,
    ) -> Result<(), ContainerError> {
        if !ident.is_valid() {
            return Err(ContainerError::InvalidIdentifier { ident });
        }
        if self.services.contains_key(&ident) {
            return Err(ContainerError::duplicate_registration(ident));
        }
        self.services.insert(ident, descriptor);
        Ok(())
    }

    pub fn get(&self, ident: &ServiceIdent) -> Option<&ServiceDescriptor> {
        self.services.get(ident)
    }

    pub fn contains(&self, ident: &ServiceIdent) -> bool {
        self.services.contains_key(ident)
    }

    /// Registrations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&ServiceIdent, &ServiceDescriptor)> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Append-only registry of services.
///
/// Registration needs `&mut self`; once built the collection can be shared
/// behind an `Arc` and resolved from any thread.
#[derive(Debug, Default)]
pub struct ServiceCollection {
    store: ServiceStore,
    config: ResolverConfig,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection resolving with `config`
    pub fn with_config(config: ResolverConfig) -> Result<Self, ContainerError> {
        config.validate()?;
        Ok(Self {
            store: ServiceStore::new(),
            config,
        })
    }

    pub fn store(&self) -> &ServiceStore {
        &self.store
    }

    pub fn resolver_config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn contains(&self, ident: impl Into<ServiceIdent>) -> bool {
        self.store.contains(&ident.into())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Register a descriptor under an identifier
    pub fn add(
        &mut self,
        ident: impl Into<ServiceIdent>,
        descriptor: ServiceDescriptor,
    ) -> Result<&mut Self, ContainerError> {
        let ident = ident.into();
        tracing::debug!(
            service = %ident,
            kind = %descriptor.kind(),
            lifetime = ?descriptor.lifetime(),
            "Registering service"
        );
        self.store.insert(ident, descriptor)?;
        Ok(self)
    }

    /// Register an injectable type, bound to itself unless an identifier is given
    pub fn add_constructible<T: Injectable>(
        &mut self,
        ident: Option<ServiceIdent>,
        lifetime: Lifetime,
    ) -> Result<&mut Self, ContainerError> {
        let ident = ident.unwrap_or_else(ServiceIdent::of::<T>);
        let constructor = Constructor::of::<T>()?;
        self.add_constructible_with(ident, constructor, lifetime)
    }

    /// Register a pre-built constructor
    pub fn add_constructible_with(
        &mut self,
        ident: impl Into<ServiceIdent>,
        constructor: Constructor,
        lifetime: Lifetime,
    ) -> Result<&mut Self, ContainerError> {
        self.add(ident, ServiceDescriptor::constructible(constructor, lifetime))
    }

    /// Register `T` under the abstract identifier of `I`, upcast through `cast`
    pub fn add_abstract<I, T>(
        &mut self,
        cast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
        lifetime: Lifetime,
    ) -> Result<&mut Self, ContainerError>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable,
    {
        let constructor = Constructor::of_as::<T, I>(cast)?;
        self.add_constructible_with(ServiceIdent::of_abstract::<I>(), constructor, lifetime)
    }

    pub fn add_transient<T: Injectable>(&mut self) -> Result<&mut Self, ContainerError> {
        self.add_constructible::<T>(None, Lifetime::Transient)
    }

    pub fn add_scoped<T: Injectable>(&mut self) -> Result<&mut Self, ContainerError> {
        self.add_constructible::<T>(None, Lifetime::Scoped)
    }

    pub fn add_singleton<T: Injectable>(&mut self) -> Result<&mut Self, ContainerError> {
        self.add_constructible::<T>(None, Lifetime::Singleton)
    }

    pub fn add_transient_as<T: Injectable>(
        &mut self,
        ident: impl Into<ServiceIdent>,
    ) -> Result<&mut Self, ContainerError> {
        self.add_constructible::<T>(Some(ident.into()), Lifetime::Transient)
    }

    pub fn add_scoped_as<T: Injectable>(
        &mut self,
        ident: impl Into<ServiceIdent>,
    ) -> Result<&mut Self, ContainerError> {
        self.add_constructible::<T>(Some(ident.into()), Lifetime::Scoped)
    }

    pub fn add_singleton_as<T: Injectable>(
        &mut self,
        ident: impl Into<ServiceIdent>,
    ) -> Result<&mut Self, ContainerError> {
        self.add_constructible::<T>(Some(ident.into()), Lifetime::Singleton)
    }

    /// Register a zero-argument producer
    pub fn add_factory<T, F>(
        &mut self,
        ident: impl Into<ServiceIdent>,
        producer: F,
        lifetime: Lifetime,
    ) -> Result<&mut Self, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        self.add(ident, ServiceDescriptor::factory(producer, lifetime))
    }

    pub fn add_transient_factory<T, F>(
        &mut self,
        ident: impl Into<ServiceIdent>,
        producer: F,
    ) -> Result<&mut Self, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        self.add_factory(ident, producer, Lifetime::Transient)
    }

    pub fn add_scoped_factory<T, F>(
        &mut self,
        ident: impl Into<ServiceIdent>,
        producer: F,
    ) -> Result<&mut Self, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        self.add_factory(ident, producer, Lifetime::Scoped)
    }

    pub fn add_singleton_factory<T, F>(
        &mut self,
        ident: impl Into<ServiceIdent>,
        producer: F,
    ) -> Result<&mut Self, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        self.add_factory(ident, producer, Lifetime::Singleton)
    }

    /// Register a value returned as-is on every resolution
    pub fn add_fixed<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        ident: impl Into<ServiceIdent>,
        value: Arc<T>,
    ) -> Result<&mut Self, ContainerError> {
        self.add(ident, ServiceDescriptor::fixed(value))
    }
}
