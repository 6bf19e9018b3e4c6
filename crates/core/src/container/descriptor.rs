use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::container::autowiring::{Arguments, Declaration, DependencyDescriptor, Injectable, Property};
use crate::container::instance::Instance;
use crate::container::scope::Lifetime;
use crate::errors::ContainerError;

type BuildFn = dyn Fn(Arguments, Vec<Property>) -> Result<Instance, ContainerError> + Send + Sync;

/// Zero-argument function producing a service value
pub type Producer = Box<dyn Fn() -> Result<Instance, ContainerError> + Send + Sync>;

/// Recipe for building an [`Injectable`] type from its resolved dependencies
pub struct Constructor {
    type_name: &'static str,
    dependencies: DependencyDescriptor,
    build: Box<BuildFn>,
}

impl Constructor {
    /// Constructor for `T`, resolved as `Arc<T>`
    pub fn of<T: Injectable>() -> Result<Self, ContainerError> {
        Self::of_as::<T, T>(|value| value)
    }

    /// Constructor for `T`, resolved as `Arc<I>` through `cast`.
    ///
    /// Used to bind an implementation to an abstract identifier:
    /// `Constructor::of_as::<Smtp, dyn Mailer>(|s| s as Arc<dyn Mailer>)`.
    pub fn of_as<T, I>(
        cast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    ) -> Result<Self, ContainerError>
    where
        T: Injectable,
        I: ?Sized + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let mut declaration = Declaration::new(type_name);
        T::declare(&mut declaration)?;
        if !declaration.is_injectable() {
            return Err(ContainerError::NotInjectable { type_name });
        }
        let dependencies = declaration.finish()?;

        Ok(Self {
            type_name,
            dependencies,
            build: Box::new(move |mut args: Arguments, properties: Vec<Property>| {
                let mut value = T::construct(&mut args)?;
                for property in properties {
                    value.assign(property)?;
                }
                Ok(Instance::new(cast(Arc::new(value))))
            }),
        })
    }

    /// Name of the implementation type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn dependencies(&self) -> &DependencyDescriptor {
        &self.dependencies
    }

    pub(crate) fn build(
        &self,
        args: Arguments,
        properties: Vec<Property>,
    ) -> Result<Instance, ContainerError> {
        (self.build)(args, properties)
    }
}

impl std::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("type_name", &self.type_name)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Cache for a singleton instance. The first stored instance wins.
#[derive(Debug, Default)]
pub struct SingletonCell {
    value: OnceLock<Instance>,
}

impl SingletonCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&Instance> {
        self.value.get()
    }

    /// Store `instance` unless another one got there first, returning the
    /// instance held by the cell
    pub fn claim(&self, instance: Instance) -> Instance {
        self.value.get_or_init(|| instance).clone()
    }
}

/// Kind of a registered service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Constructible,
    Factory,
    Fixed,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Constructible => write!(f, "constructible"),
            ServiceKind::Factory => write!(f, "factory"),
            ServiceKind::Fixed => write!(f, "fixed"),
        }
    }
}

/// How a registered service is produced
pub enum ServiceDescriptor {
    /// Built from an injectable type's constructor
    Constructible {
        constructor: Constructor,
        lifetime: Lifetime,
        cache: SingletonCell,
    },
    /// Produced by a zero-argument function
    Factory {
        producer: Producer,
        lifetime: Lifetime,
        cache: SingletonCell,
    },
    /// A single value returned on every resolution
    Fixed { value: Instance },
}

impl ServiceDescriptor {
    pub fn constructible(constructor: Constructor, lifetime: Lifetime) -> Self {
        ServiceDescriptor::Constructible {
            constructor,
            lifetime,
            cache: SingletonCell::new(),
        }
    }

    pub fn factory<T, F>(producer: F, lifetime: Lifetime) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        ServiceDescriptor::Factory {
            producer: Box::new(move || producer().map(Instance::new)),
            lifetime,
            cache: SingletonCell::new(),
        }
    }

    pub fn fixed<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        ServiceDescriptor::Fixed {
            value: Instance::new(value),
        }
    }

    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceDescriptor::Constructible { .. } => ServiceKind::Constructible,
            ServiceDescriptor::Factory { .. } => ServiceKind::Factory,
            ServiceDescriptor::Fixed { .. } => ServiceKind::Fixed,
        }
    }

    /// Lifetime policy; fixed values have none
    pub fn lifetime(&self) -> Option<Lifetime> {
        match self {
            ServiceDescriptor::Constructible { lifetime, .. }
            | ServiceDescriptor::Factory { lifetime, .. } => Some(*lifetime),
            ServiceDescriptor::Fixed { .. } => None,
        }
    }

    /// Dependencies resolved before construction
    pub fn dependencies(&self) -> Option<&DependencyDescriptor> {
        match self {
            ServiceDescriptor::Constructible { constructor, .. } => Some(constructor.dependencies()),
            _ => None,
        }
    }

    /// Instance shared by every resolution, if one exists yet
    pub fn shared_instance(&self) -> Option<&Instance> {
        match self {
            ServiceDescriptor::Constructible { cache, .. }
            | ServiceDescriptor::Factory { cache, .. } => cache.get(),
            ServiceDescriptor::Fixed { value } => Some(value),
        }
    }

    /// Name of the implementation type, when known
    pub fn implementation(&self) -> Option<&'static str> {
        match self {
            ServiceDescriptor::Constructible { constructor, .. } => Some(constructor.type_name()),
            ServiceDescriptor::Factory { .. } => None,
            ServiceDescriptor::Fixed { value } => Some(value.type_name()),
        }
    }
}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceDescriptor::Constructible {
                constructor,
                lifetime,
                cache,
            } => f
                .debug_struct("Constructible")
                .field("constructor", constructor)
                .field("lifetime", lifetime)
                .field("cached", &cache.get().is_some())
                .finish(),
            ServiceDescriptor::Factory { lifetime, cache, .. } => f
                .debug_struct("Factory")
                .field("producer", &"<producer_fn>")
                .field("lifetime", lifetime)
                .field("cached", &cache.get().is_some())
                .finish(),
            ServiceDescriptor::Fixed { value } => {
                f.debug_struct("Fixed").field("value", value).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::autowiring::DeclaredType;
    use crate::container::ident::ServiceIdent;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    #[derive(Default)]
    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    impl Injectable for English {
        fn declare(declaration: &mut Declaration) -> Result<(), ContainerError> {
            declaration.mark_injectable()
        }

        fn construct(_args: &mut Arguments) -> Result<Self, ContainerError> {
            Ok(English)
        }
    }

    struct Undeclared;

    impl Injectable for Undeclared {
        fn declare(_declaration: &mut Declaration) -> Result<(), ContainerError> {
            Ok(())
        }

        fn construct(_args: &mut Arguments) -> Result<Self, ContainerError> {
            Ok(Undeclared)
        }
    }

    struct Welcome {
        greeter: Arc<dyn Greeter>,
    }

    impl Injectable for Welcome {
        fn declare(declaration: &mut Declaration) -> Result<(), ContainerError> {
            declaration.mark_injectable()?;
            declaration.param_types([DeclaredType::of_abstract::<dyn Greeter>()]);
            Ok(())
        }

        fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
            Ok(Welcome {
                greeter: args.next::<dyn Greeter>()?,
            })
        }
    }

    #[test]
    fn test_constructor_requires_injectable_declaration() {
        assert!(Constructor::of::<English>().is_ok());
        assert!(matches!(
            Constructor::of::<Undeclared>(),
            Err(ContainerError::NotInjectable { .. })
        ));
    }

    #[test]
    fn test_constructor_builds_from_arguments() {
        let constructor = Constructor::of::<Welcome>().unwrap();
        assert_eq!(
            constructor.dependencies().params,
            vec![ServiceIdent::of_abstract::<dyn Greeter>()]
        );

        let greeter: Arc<dyn Greeter> = Arc::new(English);
        let args = Arguments::new(
            constructor.type_name(),
            vec![(ServiceIdent::of_abstract::<dyn Greeter>(), Instance::new(greeter))],
        );
        let built = constructor.build(args, Vec::new()).unwrap();

        assert_eq!(built.downcast::<Welcome>().unwrap().greeter.greet(), "hello");
    }

    #[test]
    fn test_constructor_casts_to_abstract_type() {
        let constructor =
            Constructor::of_as::<English, dyn Greeter>(|e| e as Arc<dyn Greeter>).unwrap();
        let built = constructor
            .build(Arguments::new(constructor.type_name(), Vec::new()), Vec::new())
            .unwrap();

        assert_eq!(built.downcast::<dyn Greeter>().unwrap().greet(), "hello");
        assert!(built.downcast::<English>().is_none());
    }

    #[test]
    fn test_unknown_property_is_rejected() {
        let constructor = Constructor::of::<English>().unwrap();
        let property = Property::new("extra", ServiceIdent::name("extra"), Instance::new(Arc::new(1u8)));
        let result = constructor.build(Arguments::new(constructor.type_name(), Vec::new()), vec![property]);

        assert!(matches!(result, Err(ContainerError::UnknownProperty { .. })));
    }

    #[test]
    fn test_singleton_cell_first_claim_wins() {
        let cell = SingletonCell::new();
        let first = Instance::new(Arc::new(1u32));
        let second = Instance::new(Arc::new(2u32));

        assert!(cell.get().is_none());
        assert!(cell.claim(first.clone()).ptr_eq(&first));
        assert!(cell.claim(second).ptr_eq(&first));
    }

    #[test]
    fn test_descriptor_metadata() {
        let fixed = ServiceDescriptor::fixed(Arc::new("value".to_string()));
        assert_eq!(fixed.kind(), ServiceKind::Fixed);
        assert_eq!(fixed.lifetime(), None);
        assert!(fixed.shared_instance().is_some());

        let factory = ServiceDescriptor::factory(|| Ok(Arc::new(5u8)), Lifetime::Singleton);
        assert_eq!(factory.kind(), ServiceKind::Factory);
        assert_eq!(factory.lifetime(), Some(Lifetime::Singleton));
        assert!(factory.shared_instance().is_none());
        assert!(factory.dependencies().is_none());

        let constructible =
            ServiceDescriptor::constructible(Constructor::of::<Welcome>().unwrap(), Lifetime::Scoped);
        assert_eq!(constructible.kind().to_string(), "constructible");
        assert_eq!(constructible.dependencies().map(|d| d.params.len()), Some(1));
        assert!(constructible.implementation().unwrap().ends_with("Welcome"));
    }
}
