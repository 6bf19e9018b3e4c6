//! Service identifiers
//!
//! A [`ServiceIdent`] is the key a service is registered and requested under.
//! It can be a plain string name, a unique [`Token`], a concrete type, or an
//! abstract type such as a trait object.

use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Type reference compared by `TypeId` only
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Unique symbolic identifier
///
/// Two tokens are equal only if one is a clone of the other, even when their
/// descriptions match.
#[derive(Debug, Clone)]
pub struct Token {
    id: u64,
    description: Arc<str>,
}

impl Token {
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self {
            id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Key under which a service is registered and resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceIdent {
    /// Opaque string name
    Name(Arc<str>),
    /// Unique symbolic token
    Token(Token),
    /// Concrete, constructible type
    Type(TypeKey),
    /// Abstract type, usually a trait object
    Abstract(TypeKey),
}

impl ServiceIdent {
    /// Identifier for a concrete type
    pub fn of<T: 'static>() -> Self {
        ServiceIdent::Type(TypeKey::of::<T>())
    }

    /// Identifier for an abstract type such as `dyn Trait`
    pub fn of_abstract<T: ?Sized + 'static>() -> Self {
        ServiceIdent::Abstract(TypeKey::of::<T>())
    }

    /// Identifier for a string name
    pub fn name(name: impl Into<Arc<str>>) -> Self {
        ServiceIdent::Name(name.into())
    }

    /// Identifier for a token
    pub fn token(token: &Token) -> Self {
        ServiceIdent::Token(token.clone())
    }

    /// Whether the identifier may key a registration.
    ///
    /// The unconstrained `dyn Any` object types are rejected: they carry no
    /// information about the service and would match any declared value.
    pub fn is_valid(&self) -> bool {
        match self {
            ServiceIdent::Abstract(key) => {
                let id = key.type_id();
                id != TypeId::of::<dyn Any>()
                    && id != TypeId::of::<dyn Any + Send>()
                    && id != TypeId::of::<dyn Any + Send + Sync>()
            }
            _ => true,
        }
    }

    /// Whether this identifier refers to a type
    pub fn is_type(&self) -> bool {
        matches!(self, ServiceIdent::Type(_) | ServiceIdent::Abstract(_))
    }

    /// Check if this identifier is the concrete type `T`
    pub fn is<T: 'static>(&self) -> bool {
        matches!(self, ServiceIdent::Type(key) if key.type_id() == TypeId::of::<T>())
    }
}

impl std::fmt::Display for ServiceIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceIdent::Name(name) => write!(f, "{}", name),
            ServiceIdent::Token(token) => write!(f, "Token({})", token.description()),
            ServiceIdent::Type(key) | ServiceIdent::Abstract(key) => {
                write!(f, "{}", key.type_name())
            }
        }
    }
}

impl From<&str> for ServiceIdent {
    fn from(name: &str) -> Self {
        ServiceIdent::Name(name.into())
    }
}

impl From<String> for ServiceIdent {
    fn from(name: String) -> Self {
        ServiceIdent::Name(name.into())
    }
}

impl From<Token> for ServiceIdent {
    fn from(token: Token) -> Self {
        ServiceIdent::Token(token)
    }
}

impl From<&Token> for ServiceIdent {
    fn from(token: &Token) -> Self {
        ServiceIdent::Token(token.clone())
    }
}

impl From<&ServiceIdent> for ServiceIdent {
    fn from(ident: &ServiceIdent) -> Self {
        ident.clone()
    }
}
