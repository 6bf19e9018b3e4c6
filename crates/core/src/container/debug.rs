use std::collections::HashSet;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::container::descriptor::{ServiceDescriptor, ServiceKind};
use crate::container::ident::ServiceIdent;
use crate::container::registry::ServiceStore;
use crate::container::scope::Lifetime;

/// Registration as seen by a resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub identifier: String,
    pub kind: ServiceKind,
    pub lifetime: Option<Lifetime>,
    pub implementation: Option<String>,
    pub dependencies: Vec<String>,
    pub properties: Vec<PropertyInfo>,
    /// Index of the store holding the registration, in priority order
    pub store: usize,
    /// A shared instance exists (built singleton or fixed value)
    pub cached: bool,
    /// An earlier store registers the same identifier
    pub shadowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    pub service: String,
}

/// Container statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub service_count: usize,
    pub singleton_count: usize,
    pub scoped_count: usize,
    pub transient_count: usize,
    pub fixed_count: usize,
    pub cached_instances: usize,
    pub shadowed_count: usize,
}

/// Read-only view over the stores of a resolver
#[derive(Debug)]
pub struct ContainerInspector<'a> {
    stores: Vec<&'a ServiceStore>,
}

impl<'a> ContainerInspector<'a> {
    pub fn new(stores: Vec<&'a ServiceStore>) -> Self {
        Self { stores }
    }

    /// Every registration, store by store, in priority order
    pub fn services(&self) -> Vec<ServiceInfo> {
        self.entries().into_iter().map(|(_, info)| info).collect()
    }

    /// The registration an identifier resolves to
    pub fn inspect_service(&self, ident: &ServiceIdent) -> Option<ServiceInfo> {
        self.entries()
            .into_iter()
            .find(|(registered, info)| !info.shadowed && *registered == ident)
            .map(|(_, info)| info)
    }

    fn entries(&self) -> Vec<(&'a ServiceIdent, ServiceInfo)> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (index, store) in self.stores.iter().copied().enumerate() {
            for (ident, descriptor) in store.iter() {
                let shadowed = !seen.insert(ident);
                entries.push((ident, describe(index, ident, descriptor, shadowed)));
            }
        }

        entries
    }

    pub fn get_container_info(&self) -> ContainerInfo {
        let mut info = ContainerInfo::default();
        for service in self.services() {
            if service.shadowed {
                info.shadowed_count += 1;
                continue;
            }
            info.service_count += 1;
            match service.lifetime {
                Some(Lifetime::Singleton) => info.singleton_count += 1,
                Some(Lifetime::Scoped) => info.scoped_count += 1,
                Some(Lifetime::Transient) => info.transient_count += 1,
                None => info.fixed_count += 1,
            }
            if service.cached {
                info.cached_instances += 1;
            }
        }
        info
    }

    /// Registrations as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.services())
    }

    /// Generate a human-readable report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        let info = self.get_container_info();

        let _ = writeln!(report, "Container Report");
        let _ = writeln!(report, "================");
        let _ = writeln!(report, "Stores: {}", self.stores.len());
        let _ = writeln!(report, "Total Services: {}", info.service_count);
        let _ = writeln!(report, "  - Singletons: {}", info.singleton_count);
        let _ = writeln!(report, "  - Scoped: {}", info.scoped_count);
        let _ = writeln!(report, "  - Transient: {}", info.transient_count);
        let _ = writeln!(report, "  - Fixed: {}", info.fixed_count);
        let _ = writeln!(report, "Cached Instances: {}", info.cached_instances);
        if info.shadowed_count > 0 {
            let _ = writeln!(report, "Shadowed Registrations: {}", info.shadowed_count);
        }
        let _ = writeln!(report);

        let _ = writeln!(report, "Registered Services:");
        let _ = writeln!(report, "-------------------");
        for (i, service) in self.services().iter().enumerate() {
            let lifetime = service
                .lifetime
                .map_or_else(|| "-".to_string(), |lifetime| lifetime.to_string());
            let _ = write!(
                report,
                "{}. {} [{}, {}]",
                i + 1,
                service.identifier,
                service.kind,
                lifetime
            );
            if service.shadowed {
                let _ = write!(report, " (shadowed)");
            }
            let _ = writeln!(report);

            for dependency in &service.dependencies {
                let _ = writeln!(report, "     <- {}", dependency);
            }
            for property in &service.properties {
                let _ = writeln!(report, "     .{} <- {}", property.name, property.service);
            }
        }

        report
    }
}

fn describe(
    store: usize,
    ident: &ServiceIdent,
    descriptor: &ServiceDescriptor,
    shadowed: bool,
) -> ServiceInfo {
    let (dependencies, properties) = match descriptor.dependencies() {
        Some(deps) => (
            deps.params.iter().map(|dep| dep.to_string()).collect(),
            deps.properties
                .iter()
                .map(|(name, dep)| PropertyInfo {
                    name: name.to_string(),
                    service: dep.to_string(),
                })
                .collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    ServiceInfo {
        identifier: ident.to_string(),
        kind: descriptor.kind(),
        lifetime: descriptor.lifetime(),
        implementation: descriptor.implementation().map(str::to_string),
        dependencies,
        properties,
        store,
        cached: descriptor.shared_instance().is_some(),
        shadowed,
    }
}
