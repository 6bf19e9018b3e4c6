use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::container::debug::{ContainerInspector, ServiceInfo};
use crate::container::ident::ServiceIdent;
use crate::container::instance::Instance;
use crate::container::registry::{ServiceCollection, ServiceStore};
use crate::container::resolver;
use crate::container::scope::ResolutionContext;
use crate::container::validation::{DependencyValidator, ValidationError};
use crate::errors::ContainerError;

/// Anything services can be resolved from.
///
/// Implementors expose their stores in priority order; every resolution
/// searches them in that order at each step of the dependency walk.
pub trait ServiceResolver {
    /// Stores searched during resolution, highest priority first
    fn stores(&self) -> Vec<&ServiceStore>;

    fn config(&self) -> &ResolverConfig;

    /// Resolve an identifier with a fresh resolution context
    fn get_instance(&self, ident: &ServiceIdent) -> Result<Instance, ContainerError> {
        let mut context = ResolutionContext::new();
        resolver::resolve(&self.stores(), self.config(), &mut context, ident)
    }

    /// Resolve an identifier as an `Arc<T>`
    fn get<T>(&self, ident: impl Into<ServiceIdent>) -> Result<Arc<T>, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let ident = ident.into();
        self.get_instance(&ident)?.typed::<T>(&ident)
    }

    /// Resolve a service registered under its own type
    fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        self.get::<T>(ServiceIdent::of::<T>())
    }

    /// Resolve, discarding the failure reason
    fn try_get<T>(&self, ident: impl Into<ServiceIdent>) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get::<T>(ident).ok()
    }

    /// Start a scope that shares scoped instances across several calls
    fn create_scope(&self) -> Scope<'_> {
        Scope::new(self.stores(), self.config())
    }

    /// Check the registered graph without constructing anything
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        DependencyValidator::new(&self.stores()).validate()
    }

    /// Describe every registration visible to this resolver
    fn describe(&self) -> Vec<ServiceInfo> {
        ContainerInspector::new(self.stores()).services()
    }

    /// Human-readable summary of the registrations
    fn generate_report(&self) -> String {
        ContainerInspector::new(self.stores()).generate_report()
    }
}

impl ServiceResolver for ServiceCollection {
    fn stores(&self) -> Vec<&ServiceStore> {
        vec![self.store()]
    }

    fn config(&self) -> &ResolverConfig {
        self.resolver_config()
    }
}

/// Resolution scope spanning several calls.
///
/// Scoped services are shared by every call made through the same scope and
/// dropped with it. Singletons and transients behave as usual.
#[derive(Debug)]
pub struct Scope<'a> {
    id: uuid::Uuid,
    stores: Vec<&'a ServiceStore>,
    config: &'a ResolverConfig,
    context: ResolutionContext,
}

impl<'a> Scope<'a> {
    fn new(stores: Vec<&'a ServiceStore>, config: &'a ResolverConfig) -> Self {
        let id = uuid::Uuid::new_v4();
        tracing::debug!(scope_id = %id, "Created resolution scope");
        Self {
            id,
            stores,
            config,
            context: ResolutionContext::new(),
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn get_instance(&mut self, ident: &ServiceIdent) -> Result<Instance, ContainerError> {
        resolver::resolve(&self.stores, self.config, &mut self.context, ident)
    }

    pub fn get<T>(&mut self, ident: impl Into<ServiceIdent>) -> Result<Arc<T>, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let ident = ident.into();
        self.get_instance(&ident)?.typed::<T>(&ident)
    }

    pub fn resolve<T: Send + Sync + 'static>(&mut self) -> Result<Arc<T>, ContainerError> {
        self.get::<T>(ServiceIdent::of::<T>())
    }

    /// Number of scoped instances built so far
    pub fn scoped_count(&self) -> usize {
        self.context.len()
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        tracing::trace!(
            scope_id = %self.id,
            instances = self.context.len(),
            "Disposing resolution scope"
        );
    }
}
