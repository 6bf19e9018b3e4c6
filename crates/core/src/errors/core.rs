use thiserror::Error;

use crate::config::ConfigError;
use crate::container::ident::ServiceIdent;

/// Error type for registration and resolution failures
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Service already registered in this collection: {ident}")]
    DuplicateRegistration { ident: ServiceIdent },

    #[error("Type {type_name} has not been declared injectable")]
    NotInjectable { type_name: &'static str },

    #[error("Type {type_name} has already been declared injectable")]
    MultipleDecoration { type_name: &'static str },

    #[error("Cannot determine the identifier of {site} for type {type_name}; declare an explicit identifier or change its type")]
    IdentifierInferenceFailure {
        type_name: &'static str,
        site: InjectionSite,
    },

    #[error("Service not found: {ident}")]
    ServiceNotFound { ident: ServiceIdent },

    #[error("Circular dependency detected: {}", format_chain(.chain))]
    CircularDependency { chain: Vec<ServiceIdent> },

    #[error("Not a valid service identifier: {ident}")]
    InvalidIdentifier { ident: ServiceIdent },

    #[error("Service {ident} holds a value of type {actual}, requested {expected}")]
    TypeMismatch {
        ident: ServiceIdent,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Constructor of {type_name} requested parameter {index}, but only {available} were resolved")]
    MissingArgument {
        type_name: &'static str,
        index: usize,
        available: usize,
    },

    #[error("Type {type_name} has no injectable property '{key}'")]
    UnknownProperty {
        type_name: &'static str,
        key: String,
    },

    #[error("Resolution of {ident} exceeded the maximum depth of {max_depth}")]
    ResolutionDepthExceeded { ident: ServiceIdent, max_depth: usize },

    #[error("Service initialization failed for '{ident}': {source}")]
    ServiceInitializationFailed {
        ident: ServiceIdent,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Constructor parameter or property an identifier belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionSite {
    Parameter(usize),
    Property(&'static str),
}

impl std::fmt::Display for InjectionSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InjectionSite::Parameter(index) => write!(f, "constructor parameter {}", index),
            InjectionSite::Property(key) => write!(f, "property '{}'", key),
        }
    }
}

fn format_chain(chain: &[ServiceIdent]) -> String {
    chain
        .iter()
        .map(|ident| ident.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ContainerError {
    /// Create a new service not found error
    pub fn service_not_found(ident: impl Into<ServiceIdent>) -> Self {
        Self::ServiceNotFound {
            ident: ident.into(),
        }
    }

    /// Create a new duplicate registration error
    pub fn duplicate_registration(ident: impl Into<ServiceIdent>) -> Self {
        Self::DuplicateRegistration {
            ident: ident.into(),
        }
    }

    /// Wrap a failure reported by a factory
    pub fn initialization_failed(
        ident: impl Into<ServiceIdent>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ServiceInitializationFailed {
            ident: ident.into(),
            source: source.into(),
        }
    }

    /// Create an unknown property error
    pub fn unknown_property(type_name: &'static str, key: impl Into<String>) -> Self {
        Self::UnknownProperty {
            type_name,
            key: key.into(),
        }
    }

    /// Check if the error is a missing service
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ServiceNotFound { .. })
    }

    /// Check if the error is a dependency cycle
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// Check if the error was raised while registering rather than resolving
    pub fn is_registration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRegistration { .. }
                | Self::NotInjectable { .. }
                | Self::MultipleDecoration { .. }
                | Self::IdentifierInferenceFailure { .. }
                | Self::InvalidIdentifier { .. }
        )
    }

    /// The offending chain of a circular dependency error
    pub fn cycle(&self) -> Option<&[ServiceIdent]> {
        match self {
            Self::CircularDependency { chain } => Some(chain),
            _ => None,
        }
    }
}
