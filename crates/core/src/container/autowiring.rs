use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::container::ident::{ServiceIdent, TypeKey};
use crate::container::instance::Instance;
use crate::errors::{ContainerError, InjectionSite};

/// Trait for types the container can construct and wire.
///
/// Usually generated by `#[injectable]`. A hand-written implementation must
/// call [`Declaration::mark_injectable`] from `declare`, otherwise
/// registration fails with `NotInjectable`.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Describe the constructor parameters and properties to inject
    fn declare(declaration: &mut Declaration) -> Result<(), ContainerError>;

    /// Build an instance from the resolved constructor parameters, in order
    fn construct(args: &mut Arguments) -> Result<Self, ContainerError>;

    /// Assign a resolved property after construction
    fn assign(&mut self, property: Property) -> Result<(), ContainerError> {
        Err(ContainerError::unknown_property(
            std::any::type_name::<Self>(),
            property.key(),
        ))
    }
}

/// Type declared for a constructor parameter or property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Concrete(TypeKey),
    Abstract(TypeKey),
}

impl DeclaredType {
    pub fn of<T: 'static>() -> Self {
        DeclaredType::Concrete(TypeKey::of::<T>())
    }

    pub fn of_abstract<T: ?Sized + 'static>() -> Self {
        DeclaredType::Abstract(TypeKey::of::<T>())
    }

    /// The identifier inferred from this type, if it qualifies as one
    pub fn to_ident(&self) -> Option<ServiceIdent> {
        let ident = match self {
            DeclaredType::Concrete(key) => ServiceIdent::Type(*key),
            DeclaredType::Abstract(key) => ServiceIdent::Abstract(*key),
        };
        ident.is_valid().then_some(ident)
    }
}

/// Injection points collected for one constructible type
#[derive(Debug, Clone)]
pub struct Declaration {
    type_name: &'static str,
    injectable: bool,
    param_types: Vec<DeclaredType>,
    params: BTreeMap<usize, ServiceIdent>,
    properties: IndexMap<&'static str, ServiceIdent>,
}

impl Declaration {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            injectable: false,
            param_types: Vec::new(),
            params: BTreeMap::new(),
            properties: IndexMap::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Mark the type as injectable; may only happen once
    pub fn mark_injectable(&mut self) -> Result<(), ContainerError> {
        if self.injectable {
            return Err(ContainerError::MultipleDecoration {
                type_name: self.type_name,
            });
        }
        self.injectable = true;
        Ok(())
    }

    pub fn is_injectable(&self) -> bool {
        self.injectable
    }

    /// Record the declared type of every constructor parameter, in order
    pub fn param_types(&mut self, types: impl IntoIterator<Item = DeclaredType>) {
        self.param_types = types.into_iter().collect();
    }

    /// Inject a constructor parameter, inferring the identifier from its
    /// declared type when none is given
    pub fn inject_param(
        &mut self,
        index: usize,
        ident: Option<ServiceIdent>,
    ) -> Result<(), ContainerError> {
        let ident = match ident {
            Some(ident) => ident,
            None => self
                .param_types
                .get(index)
                .and_then(DeclaredType::to_ident)
                .ok_or(ContainerError::IdentifierInferenceFailure {
                    type_name: self.type_name,
                    site: InjectionSite::Parameter(index),
                })?,
        };
        self.params.insert(index, ident);
        Ok(())
    }

    /// Inject a property assigned after construction
    pub fn inject_property(
        &mut self,
        key: &'static str,
        ident: Option<ServiceIdent>,
        declared: DeclaredType,
    ) -> Result<(), ContainerError> {
        let ident = match ident {
            Some(ident) => ident,
            None => declared
                .to_ident()
                .ok_or(ContainerError::IdentifierInferenceFailure {
                    type_name: self.type_name,
                    site: InjectionSite::Property(key),
                })?,
        };
        self.properties.insert(key, ident);
        Ok(())
    }

    /// Resolve every parameter to an identifier.
    ///
    /// Parameters without an explicit entry fall back to their declared type.
    pub fn finish(self) -> Result<DependencyDescriptor, ContainerError> {
        let count = self
            .params
            .keys()
            .next_back()
            .map_or(0, |last| last + 1)
            .max(self.param_types.len());

        let mut params = Vec::with_capacity(count);
        for index in 0..count {
            let ident = match self.params.get(&index) {
                Some(ident) => ident.clone(),
                None => self
                    .param_types
                    .get(index)
                    .and_then(DeclaredType::to_ident)
                    .ok_or(ContainerError::IdentifierInferenceFailure {
                        type_name: self.type_name,
                        site: InjectionSite::Parameter(index),
                    })?,
            };
            params.push(ident);
        }

        Ok(DependencyDescriptor {
            params,
            properties: self.properties.into_iter().collect(),
        })
    }
}

/// Identifiers a constructible type depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyDescriptor {
    pub params: Vec<ServiceIdent>,
    pub properties: Vec<(&'static str, ServiceIdent)>,
}

impl DependencyDescriptor {
    /// All dependencies: parameters first, then properties
    pub fn all(&self) -> impl Iterator<Item = &ServiceIdent> {
        self.params
            .iter()
            .chain(self.properties.iter().map(|(_, ident)| ident))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.properties.is_empty()
    }
}

/// Resolved constructor parameters, consumed in order
#[derive(Debug)]
pub struct Arguments {
    type_name: &'static str,
    values: Vec<(ServiceIdent, Instance)>,
    cursor: usize,
}

impl Arguments {
    pub fn new(type_name: &'static str, values: Vec<(ServiceIdent, Instance)>) -> Self {
        Self {
            type_name,
            values,
            cursor: 0,
        }
    }

    /// Take the next parameter as an `Arc<T>`
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>, ContainerError> {
        let (ident, instance) =
            self.values
                .get(self.cursor)
                .ok_or(ContainerError::MissingArgument {
                    type_name: self.type_name,
                    index: self.cursor,
                    available: self.values.len(),
                })?;
        let value = instance.typed::<T>(ident)?;
        self.cursor += 1;
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameters not yet taken
    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }
}

/// A resolved property waiting to be assigned
#[derive(Debug, Clone)]
pub struct Property {
    key: &'static str,
    ident: ServiceIdent,
    value: Instance,
}

impl Property {
    pub fn new(key: &'static str, ident: ServiceIdent, value: Instance) -> Self {
        Self { key, ident, value }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn ident(&self) -> &ServiceIdent {
        &self.ident
    }

    /// The resolved value as an `Arc<T>`
    pub fn value<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        self.value.typed::<T>(&self.ident)
    }
}
