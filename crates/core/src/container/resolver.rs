use crate::config::ResolverConfig;
use crate::container::autowiring::{Arguments, Property};
use crate::container::descriptor::{ServiceDescriptor, SingletonCell};
use crate::container::ident::ServiceIdent;
use crate::container::instance::Instance;
use crate::container::registry::ServiceStore;
use crate::container::scope::{Lifetime, ResolutionContext};
use crate::errors::ContainerError;

/// Dependency resolution path for cycle detection and error reporting
#[derive(Debug, Clone, Default)]
pub struct ResolutionPath {
    services: Vec<ServiceIdent>,
}

impl ResolutionPath {
    /// Create a new resolution path
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service to the resolution path
    pub fn push(&mut self, ident: ServiceIdent) {
        self.services.push(ident);
    }

    /// Remove the last service from the resolution path
    pub fn pop(&mut self) -> Option<ServiceIdent> {
        self.services.pop()
    }

    /// Check if the path contains a service (for cycle detection)
    pub fn contains(&self, ident: &ServiceIdent) -> bool {
        self.services.contains(ident)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// The chain that closes a cycle at `ident`
    pub fn cycle_with(&self, ident: &ServiceIdent) -> Vec<ServiceIdent> {
        let mut chain = self.services.clone();
        chain.push(ident.clone());
        chain
    }

    /// Get the path as a string for log messages
    pub fn path_string(&self) -> String {
        self.services
            .iter()
            .map(|ident| ident.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Resolve `ident` against `stores`, searched in order at every step
pub(crate) fn resolve(
    stores: &[&ServiceStore],
    config: &ResolverConfig,
    context: &mut ResolutionContext,
    ident: &ServiceIdent,
) -> Result<Instance, ContainerError> {
    let mut resolver = Resolver {
        stores,
        config,
        context,
        path: ResolutionPath::new(),
    };
    resolver.path.push(ident.clone());
    resolver.resolve_one(ident)
}

struct Resolver<'a> {
    stores: &'a [&'a ServiceStore],
    config: &'a ResolverConfig,
    context: &'a mut ResolutionContext,
    path: ResolutionPath,
}

impl<'a> Resolver<'a> {
    fn find(&self, ident: &ServiceIdent) -> Option<&'a ServiceDescriptor> {
        let stores: &'a [&'a ServiceStore] = self.stores;
        stores.iter().copied().find_map(|store| store.get(ident))
    }

    /// Resolve the identifier on top of the path
    fn resolve_one(&mut self, ident: &ServiceIdent) -> Result<Instance, ContainerError> {
        if self.path.len() > self.config.max_resolution_depth {
            return Err(ContainerError::ResolutionDepthExceeded {
                ident: ident.clone(),
                max_depth: self.config.max_resolution_depth,
            });
        }

        let descriptor = match self.find(ident) {
            Some(descriptor) => descriptor,
            None => {
                tracing::warn!(
                    service = %ident,
                    path = %self.path.path_string(),
                    "Service not found"
                );
                return Err(ContainerError::service_not_found(ident));
            }
        };

        match descriptor {
            ServiceDescriptor::Fixed { value } => Ok(value.clone()),
            ServiceDescriptor::Factory {
                producer,
                lifetime,
                cache,
            } => {
                if let Some(instance) = self.cached(ident, *lifetime, cache) {
                    return Ok(instance);
                }
                let instance = producer()?;
                Ok(self.keep(ident, *lifetime, cache, instance))
            }
            ServiceDescriptor::Constructible {
                constructor,
                lifetime,
                cache,
            } => {
                if let Some(instance) = self.cached(ident, *lifetime, cache) {
                    return Ok(instance);
                }

                let dependencies = constructor.dependencies();
                let mut args = Vec::with_capacity(dependencies.params.len());
                for dependency in &dependencies.params {
                    let value = self.resolve_dependency(dependency)?;
                    args.push((dependency.clone(), value));
                }
                let mut properties = Vec::with_capacity(dependencies.properties.len());
                for &(key, ref dependency) in &dependencies.properties {
                    let value = self.resolve_dependency(dependency)?;
                    properties.push(Property::new(key, dependency.clone(), value));
                }

                if self.config.trace_resolution {
                    tracing::debug!(
                        service = %ident,
                        implementation = constructor.type_name(),
                        lifetime = %lifetime,
                        depth = self.path.len(),
                        "Constructing service"
                    );
                }
                let instance = constructor.build(
                    Arguments::new(constructor.type_name(), args),
                    properties,
                )?;
                Ok(self.keep(ident, *lifetime, cache, instance))
            }
        }
    }

    fn resolve_dependency(&mut self, ident: &ServiceIdent) -> Result<Instance, ContainerError> {
        if self.path.contains(ident) {
            let chain = self.path.cycle_with(ident);
            tracing::warn!(
                service = %ident,
                path = %self.path.path_string(),
                "Circular dependency detected"
            );
            return Err(ContainerError::CircularDependency { chain });
        }

        self.path.push(ident.clone());
        let result = self.resolve_one(ident);
        self.path.pop();
        result
    }

    fn cached(
        &self,
        ident: &ServiceIdent,
        lifetime: Lifetime,
        cache: &SingletonCell,
    ) -> Option<Instance> {
        let hit = match lifetime {
            Lifetime::Transient => None,
            Lifetime::Scoped => self.context.get(ident).cloned(),
            Lifetime::Singleton => cache.get().cloned(),
        };
        if hit.is_some() {
            tracing::trace!(service = %ident, lifetime = %lifetime, "Cache hit");
        }
        hit
    }

    fn keep(
        &mut self,
        ident: &ServiceIdent,
        lifetime: Lifetime,
        cache: &SingletonCell,
        instance: Instance,
    ) -> Instance {
        match lifetime {
            Lifetime::Transient => instance,
            Lifetime::Scoped => {
                self.context.insert(ident.clone(), instance.clone());
                instance
            }
            Lifetime::Singleton => cache.claim(instance),
        }
    }
}
