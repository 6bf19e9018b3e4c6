use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;

use crate::container::ident::ServiceIdent;
use crate::container::registry::ServiceStore;
use crate::container::scope::Lifetime;

/// Problems found by walking the registered graph without constructing anything
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A dependency has no registration in any store
    #[error("{service} is not registered (required by {required_by})")]
    MissingRegistration {
        service: ServiceIdent,
        required_by: ServiceIdent,
    },

    /// Dependencies form a cycle
    #[error("Circular dependency: {}", format_cycle(.cycle))]
    CircularDependency { cycle: Vec<ServiceIdent> },

    /// A singleton would capture a scoped instance forever
    #[error("{service} ({service_lifetime}) depends on {dependency} ({dependency_lifetime})")]
    LifetimeIncompatibility {
        service: ServiceIdent,
        service_lifetime: Lifetime,
        dependency: ServiceIdent,
        dependency_lifetime: Lifetime,
    },
}

fn format_cycle(cycle: &[ServiceIdent]) -> String {
    cycle
        .iter()
        .map(|ident| ident.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Debug)]
struct Node {
    lifetime: Option<Lifetime>,
    dependencies: Vec<ServiceIdent>,
}

/// Static dependency validator over one or more stores
#[derive(Debug)]
pub struct DependencyValidator {
    graph: IndexMap<ServiceIdent, Node>,
}

impl DependencyValidator {
    /// Build the graph visible from `stores`; registrations shadowed by an
    /// earlier store are ignored
    pub fn new(stores: &[&ServiceStore]) -> Self {
        let mut graph = IndexMap::new();
        for store in stores {
            for (ident, descriptor) in store.iter() {
                if graph.contains_key(ident) {
                    continue;
                }
                let dependencies = descriptor
                    .dependencies()
                    .map(|deps| deps.all().cloned().collect())
                    .unwrap_or_default();
                graph.insert(
                    ident.clone(),
                    Node {
                        lifetime: descriptor.lifetime(),
                        dependencies,
                    },
                );
            }
        }
        Self { graph }
    }

    /// Validate all dependencies and return any errors
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        errors.extend(self.validate_registrations());
        errors.extend(self.validate_circular_dependencies());
        errors.extend(self.validate_lifetime_compatibility());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_registrations(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (ident, node) in &self.graph {
            for dependency in &node.dependencies {
                if !self.graph.contains_key(dependency) {
                    errors.push(ValidationError::MissingRegistration {
                        service: dependency.clone(),
                        required_by: ident.clone(),
                    });
                }
            }
        }
        errors
    }

    fn validate_circular_dependencies(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        for ident in self.graph.keys() {
            if !visited.contains(ident) {
                self.detect_cycles(ident, &mut visited, &mut path, &mut errors);
            }
        }
        errors
    }

    /// DFS; a dependency already on `path` is a back edge
    fn detect_cycles(
        &self,
        ident: &ServiceIdent,
        visited: &mut HashSet<ServiceIdent>,
        path: &mut Vec<ServiceIdent>,
        errors: &mut Vec<ValidationError>,
    ) {
        visited.insert(ident.clone());
        path.push(ident.clone());

        if let Some(node) = self.graph.get(ident) {
            for dependency in &node.dependencies {
                if let Some(start) = path.iter().position(|entry| entry == dependency) {
                    let mut cycle = path[start..].to_vec();
                    cycle.push(dependency.clone());
                    errors.push(ValidationError::CircularDependency { cycle });
                } else if !visited.contains(dependency) {
                    self.detect_cycles(dependency, visited, path, errors);
                }
            }
        }

        path.pop();
    }

    fn validate_lifetime_compatibility(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (ident, node) in &self.graph {
            let Some(service_lifetime) = node.lifetime else {
                continue;
            };
            for dependency in &node.dependencies {
                let dependency_lifetime = self.graph.get(dependency).and_then(|dep| dep.lifetime);
                if let Some(dependency_lifetime) = dependency_lifetime {
                    if !is_lifetime_compatible(service_lifetime, dependency_lifetime) {
                        errors.push(ValidationError::LifetimeIncompatibility {
                            service: ident.clone(),
                            service_lifetime,
                            dependency: dependency.clone(),
                            dependency_lifetime,
                        });
                    }
                }
            }
        }
        errors
    }

    /// Identifiers in an order where every dependency precedes its dependents.
    /// Missing dependencies are skipped; cycles yield `None`.
    pub fn resolution_order(&self) -> Option<Vec<ServiceIdent>> {
        if !self.validate_circular_dependencies().is_empty() {
            return None;
        }

        let mut order = Vec::with_capacity(self.graph.len());
        let mut visited = HashSet::new();
        for ident in self.graph.keys() {
            self.visit_for_order(ident, &mut visited, &mut order);
        }
        Some(order)
    }

    fn visit_for_order(
        &self,
        ident: &ServiceIdent,
        visited: &mut HashSet<ServiceIdent>,
        order: &mut Vec<ServiceIdent>,
    ) {
        if !visited.insert(ident.clone()) {
            return;
        }
        let Some(node) = self.graph.get(ident) else {
            return;
        };
        for dependency in &node.dependencies {
            self.visit_for_order(dependency, visited, order);
        }
        order.push(ident.clone());
    }
}

/// Singletons outlive every scope, so they must not hold scoped services
fn is_lifetime_compatible(service: Lifetime, dependency: Lifetime) -> bool {
    !(service.is_singleton() && dependency.is_scoped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::autowiring::{Arguments, Declaration, Injectable};
    use crate::container::descriptor::{Constructor, ServiceDescriptor};
    use crate::errors::ContainerError;
    use std::sync::Arc;

    /// Service depending on the names listed by `deps(N)`
    struct Named<const N: usize>;

    fn deps(n: usize) -> &'static [&'static str] {
        match n {
            0 => &[],
            1 => &["b"],
            2 => &["c"],
            3 => &["a"],
            _ => &["scoped"],
        }
    }

    impl<const N: usize> Injectable for Named<N> {
        fn declare(declaration: &mut Declaration) -> Result<(), ContainerError> {
            declaration.mark_injectable()?;
            for (index, name) in deps(N).iter().enumerate() {
                declaration.inject_param(index, Some(ServiceIdent::name(*name)))?;
            }
            Ok(())
        }

        fn construct(_args: &mut Arguments) -> Result<Self, ContainerError> {
            Ok(Named)
        }
    }

    fn constructible<const N: usize>(lifetime: Lifetime) -> ServiceDescriptor {
        ServiceDescriptor::constructible(Constructor::of::<Named<N>>().unwrap(), lifetime)
    }

    #[test]
    fn test_valid_graph() {
        let mut store = ServiceStore::new();
        store.insert("c".into(), constructible::<0>(Lifetime::Singleton)).unwrap();
        store.insert("b".into(), constructible::<2>(Lifetime::Transient)).unwrap();

        let validator = DependencyValidator::new(&[&store]);
        assert!(validator.validate().is_ok());
        assert_eq!(
            validator.resolution_order(),
            Some(vec![ServiceIdent::name("c"), ServiceIdent::name("b")])
        );
    }

    #[test]
    fn test_missing_dependency() {
        let mut store = ServiceStore::new();
        store.insert("a".into(), constructible::<1>(Lifetime::Transient)).unwrap();

        let errors = DependencyValidator::new(&[&store]).validate().unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingRegistration {
                service: ServiceIdent::name("b"),
                required_by: ServiceIdent::name("a"),
            }]
        );
    }

    #[test]
    fn test_circular_dependency() {
        let mut store = ServiceStore::new();
        store.insert("a".into(), constructible::<1>(Lifetime::Transient)).unwrap();
        store.insert("b".into(), constructible::<2>(Lifetime::Transient)).unwrap();
        store.insert("c".into(), constructible::<3>(Lifetime::Transient)).unwrap();

        let validator = DependencyValidator::new(&[&store]);
        let errors = validator.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "Circular dependency: a -> b -> c -> a"
        );
        assert!(validator.resolution_order().is_none());
    }

    #[test]
    fn test_singleton_depending_on_scoped() {
        let mut store = ServiceStore::new();
        store
            .insert(
                "scoped".into(),
                ServiceDescriptor::factory(|| Ok(Arc::new(0u8)), Lifetime::Scoped),
            )
            .unwrap();
        store.insert("root".into(), constructible::<4>(Lifetime::Singleton)).unwrap();
        store.insert("other".into(), constructible::<4>(Lifetime::Transient)).unwrap();

        let errors = DependencyValidator::new(&[&store]).validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::LifetimeIncompatibility {
                service_lifetime: Lifetime::Singleton,
                dependency_lifetime: Lifetime::Scoped,
                ..
            }
        ));
    }

    #[test]
    fn test_shadowed_registrations_are_ignored() {
        let mut first = ServiceStore::new();
        first.insert("a".into(), ServiceDescriptor::fixed(Arc::new(1u8))).unwrap();
        let mut second = ServiceStore::new();
        second.insert("a".into(), constructible::<1>(Lifetime::Transient)).unwrap();

        assert!(DependencyValidator::new(&[&first, &second]).validate().is_ok());
        assert!(DependencyValidator::new(&[&second, &first]).validate().is_err());
    }
}
