//! Dependency injection resolution engine.
//!
//! Services are registered in a [`ServiceCollection`] under a [`ServiceIdent`]
//! and resolved on demand, with their constructor and property dependencies
//! walked recursively. Lifetimes control sharing, cycles are reported with the
//! full dependency chain, and a [`ServiceMultiCollection`] resolves across
//! several collections in priority order.

pub mod config;
pub mod container;
pub mod errors;

pub use config::{ConfigError, ConfigSource, EnvConfig, ResolverConfig};
pub use container::{
    Constructor, Declaration, DeclaredType, Injectable, Instance, Lifetime, Scope,
    ServiceCollection, ServiceIdent, ServiceMultiCollection, ServiceResolver, Token,
};
pub use errors::{ContainerError, InjectionSite};
