use graft_core::container::{Declaration, Injectable, ServiceCollection, ServiceIdent, ServiceResolver, Token};
use graft_core::errors::{ContainerError, InjectionSite};
use graft_core_derive::injectable;
use std::any::Any;
use std::sync::{Arc, OnceLock};

#[injectable]
pub struct UserRepository {
    name: String,
}

impl UserRepository {
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

pub trait EmailTransport: Send + Sync {
    fn server(&self) -> String;
}

#[injectable]
pub struct SmtpTransport {}

impl EmailTransport for SmtpTransport {
    fn server(&self) -> String {
        "localhost:587".to_string()
    }
}

pub struct MetricsCollector {
    enabled: bool,
}

fn audit_token() -> &'static Token {
    static AUDIT: OnceLock<Token> = OnceLock::new();
    AUDIT.get_or_init(|| Token::new("audit"))
}

#[injectable]
pub struct UserService {
    #[inject]
    user_repo: Arc<UserRepository>,
    #[inject]
    transport: Arc<dyn EmailTransport>,
    #[inject(name = "sender")]
    sender: Arc<String>,
    #[property]
    metrics: Option<Arc<MetricsCollector>>,
    #[property(ident = audit_token())]
    audit: Option<Arc<Vec<String>>>,
    retries: u32,
}

impl UserService {
    pub fn get_user_repo_name(&self) -> &str {
        self.user_repo.get_name()
    }

    pub fn is_metrics_enabled(&self) -> Option<bool> {
        self.metrics.as_ref().map(|m| m.enabled)
    }
}

fn user_services() -> ServiceCollection {
    let mut collection = ServiceCollection::new();
    collection
        .add_singleton::<UserRepository>()
        .unwrap()
        .add_abstract::<dyn EmailTransport, SmtpTransport>(|t| t as Arc<dyn EmailTransport>, graft_core::Lifetime::Singleton)
        .unwrap()
        .add_fixed("sender", Arc::new("noreply@example.com".to_string()))
        .unwrap()
        .add_fixed(ServiceIdent::of::<MetricsCollector>(), Arc::new(MetricsCollector { enabled: true }))
        .unwrap()
        .add_fixed(audit_token(), Arc::new(vec!["created".to_string()]))
        .unwrap()
        .add_transient::<UserService>()
        .unwrap();
    collection
}

#[test]
fn test_injectable_macro_declares_dependencies() {
    let mut declaration = Declaration::new("UserService");
    UserService::declare(&mut declaration).unwrap();
    assert!(declaration.is_injectable());

    let descriptor = declaration.finish().unwrap();
    assert_eq!(
        descriptor.params,
        vec![
            ServiceIdent::of::<UserRepository>(),
            ServiceIdent::of_abstract::<dyn EmailTransport>(),
            ServiceIdent::name("sender"),
        ]
    );
    assert_eq!(
        descriptor.properties,
        vec![
            ("metrics", ServiceIdent::of::<MetricsCollector>()),
            ("audit", ServiceIdent::token(audit_token())),
        ]
    );
}

#[test]
fn test_injectable_resolves_constructor_and_properties() {
    let collection = user_services();
    let service = collection.resolve::<UserService>().unwrap();

    assert_eq!(service.get_user_repo_name(), "");
    assert_eq!(service.transport.server(), "localhost:587");
    assert_eq!(service.sender.as_str(), "noreply@example.com");
    assert_eq!(service.is_metrics_enabled(), Some(true));
    assert_eq!(service.audit.as_deref(), Some(&vec!["created".to_string()]));
    assert_eq!(service.retries, 0);
}

#[test]
fn test_singleton_dependencies_are_shared_between_transients() {
    let collection = user_services();
    let first = collection.resolve::<UserService>().unwrap();
    let second = collection.resolve::<UserService>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.user_repo, &second.user_repo));
    assert!(Arc::ptr_eq(&first.transport, &second.transport));
}

#[test]
fn test_missing_property_dependency_fails() {
    let mut collection = ServiceCollection::new();
    collection
        .add_singleton::<UserRepository>()
        .unwrap()
        .add_abstract::<dyn EmailTransport, SmtpTransport>(|t| t as Arc<dyn EmailTransport>, graft_core::Lifetime::Singleton)
        .unwrap()
        .add_fixed("sender", Arc::new(String::new()))
        .unwrap()
        .add_transient::<UserService>()
        .unwrap();

    match collection.resolve::<UserService>() {
        Err(ContainerError::ServiceNotFound { ident }) => {
            assert_eq!(ident, ServiceIdent::of::<MetricsCollector>())
        }
        other => panic!("expected a missing service, got {:?}", other.map(|_| ())),
    }
}

#[injectable]
pub struct UntypedPayload {
    #[inject]
    payload: Arc<dyn Any + Send + Sync>,
}

#[injectable]
pub struct NamedPayload {
    #[inject(name = "payload")]
    payload: Arc<dyn Any + Send + Sync>,
}

#[test]
fn test_object_typed_field_needs_explicit_identifier() {
    let mut collection = ServiceCollection::new();
    let error = collection.add_transient::<UntypedPayload>().err().unwrap();
    assert!(matches!(
        error,
        ContainerError::IdentifierInferenceFailure {
            site: InjectionSite::Parameter(0),
            ..
        }
    ));

    let payload: Arc<dyn Any + Send + Sync> = Arc::new(5u8);
    collection
        .add_fixed("payload", payload)
        .unwrap()
        .add_transient::<NamedPayload>()
        .unwrap();
    let resolved = collection.resolve::<NamedPayload>().unwrap();
    assert_eq!(resolved.payload.downcast_ref::<u8>(), Some(&5));
}

#[injectable]
pub struct Node<T> {
    #[inject]
    value: Arc<T>,
}

#[test]
fn test_generic_injectable() {
    let mut collection = ServiceCollection::new();
    collection
        .add_fixed(ServiceIdent::of::<u64>(), Arc::new(42u64))
        .unwrap()
        .add_scoped::<Node<u64>>()
        .unwrap();

    assert_eq!(*collection.resolve::<Node<u64>>().unwrap().value, 42);
}

#[test]
fn test_macro_marks_once() {
    let mut declaration = Declaration::new("UserRepository");
    UserRepository::declare(&mut declaration).unwrap();

    // Declaring again on the same declaration is a second marking
    assert!(matches!(
        UserRepository::declare(&mut declaration),
        Err(ContainerError::MultipleDecoration { .. })
    ));
}
