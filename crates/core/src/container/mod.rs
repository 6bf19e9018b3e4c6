pub mod autowiring;
pub mod debug;
pub mod descriptor;
pub mod ident;
pub mod instance;
pub mod multi;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod validation;

pub use autowiring::{Arguments, Declaration, DeclaredType, DependencyDescriptor, Injectable, Property};
pub use debug::{ContainerInfo, ContainerInspector, PropertyInfo, ServiceInfo};
pub use descriptor::{Constructor, Producer, ServiceDescriptor, ServiceKind, SingletonCell};
pub use ident::{ServiceIdent, Token, TypeKey};
pub use instance::Instance;
pub use multi::ServiceMultiCollection;
pub use provider::{Scope, ServiceResolver};
pub use registry::{ServiceCollection, ServiceStore};
pub use resolver::ResolutionPath;
pub use scope::{Lifetime, ResolutionContext};
pub use validation::{DependencyValidator, ValidationError};
