use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::container::ident::ServiceIdent;
use crate::container::instance::Instance;
use crate::errors::ContainerError;

/// Instance sharing policy of a registered service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// New instance for every resolution
    Transient,
    /// One instance per resolution context
    Scoped,
    /// Single instance shared for the lifetime of the registration
    Singleton,
}

impl Lifetime {
    /// Check if the lifetime is singleton
    pub fn is_singleton(&self) -> bool {
        matches!(self, Lifetime::Singleton)
    }

    /// Check if the lifetime is scoped
    pub fn is_scoped(&self) -> bool {
        matches!(self, Lifetime::Scoped)
    }

    /// Get the lifetime name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Transient => "transient",
            Lifetime::Scoped => "scoped",
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Lifetime {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(Lifetime::Singleton),
            "transient" => Ok(Lifetime::Transient),
            "scoped" => Ok(Lifetime::Scoped),
            _ => Err(crate::config::ConfigError::invalid_value(
                "lifetime",
                s,
                "transient, scoped, or singleton",
            )
            .into()),
        }
    }
}

/// Cache of scoped instances for one resolution context
#[derive(Debug, Default)]
pub struct ResolutionContext {
    instances: HashMap<ServiceIdent, Instance>,
}

impl ResolutionContext {
    /// Create a new, empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the scoped instance cached for an identifier
    pub fn get(&self, ident: &ServiceIdent) -> Option<&Instance> {
        self.instances.get(ident)
    }

    /// Cache a scoped instance
    pub fn insert(&mut self, ident: ServiceIdent, instance: Instance) {
        self.instances.insert(ident, instance);
    }

    /// Get the number of cached instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
