use graft_core_derive::injectable;
use std::sync::Arc;

pub struct DatabaseService;
pub struct LoggingService;

// Single type parameter
#[injectable]
pub struct GenericService<T> {
    #[inject]
    db: Arc<DatabaseService>,
    #[inject]
    logger: Arc<LoggingService>,
    _phantom: std::marker::PhantomData<T>,
}

// Multiple generics and a where clause
#[injectable]
pub struct ComplexService<T, U>
where
    T: Clone,
    U: std::fmt::Debug,
{
    #[inject]
    db: Arc<DatabaseService>,
    #[property]
    logger: Option<Arc<LoggingService>>,
    _phantom: std::marker::PhantomData<(T, U)>,
}

// Const generics
#[injectable]
pub struct ArrayService<const N: usize> {
    #[inject]
    db: Arc<DatabaseService>,
}

fn main() {}
